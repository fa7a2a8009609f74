// Run driver
//
// Samples are split across scoped worker threads. Each worker owns its
// reaction system, detector array and random stream; finished events travel
// over a bounded channel to the single writer on the calling thread.

use crate::config::Config;
use crate::detectors::{DeadChannelMap, DetectorArray};
use crate::error::Result;
use crate::mass_table::MassTable;
use crate::nucleus::ReactionRole;
use crate::output::EventWriter;
use crate::system::{Event, ReactionSystem};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::mpsc::{self, SyncSender};
use std::thread;

/// Events buffered between the workers and the writer.
const CHANNEL_CAPACITY: usize = 1024;

/// Detection counts accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub events: u64,
    /// Events with at least one detected particle
    pub events_with_detection: u64,
    pub detected_by_role: BTreeMap<ReactionRole, u64>,
    pub detected_by_stage: BTreeMap<&'static str, u64>,
}

impl RunSummary {
    pub fn record(&mut self, event: &Event) {
        self.events += 1;
        let mut any = false;
        for nucleus in event.detected() {
            any = true;
            *self.detected_by_role.entry(nucleus.role).or_insert(0) += 1;
            if let Some(stage) = nucleus.detection.stage {
                *self.detected_by_stage.entry(stage.label()).or_insert(0) += 1;
            }
        }
        if any {
            self.events_with_detection += 1;
        }
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.events += other.events;
        self.events_with_detection += other.events_with_detection;
        for (role, count) in other.detected_by_role {
            *self.detected_by_role.entry(role).or_insert(0) += count;
        }
        for (stage, count) in other.detected_by_stage {
            *self.detected_by_stage.entry(stage).or_insert(0) += count;
        }
    }

    /// Fraction of events in which the particle with `role` was detected.
    pub fn efficiency(&self, role: ReactionRole) -> f64 {
        if self.events == 0 {
            return 0.0;
        }
        self.detected_by_role.get(&role).copied().unwrap_or(0) as f64 / self.events as f64
    }

    pub fn any_detection_efficiency(&self) -> f64 {
        if self.events == 0 {
            return 0.0;
        }
        self.events_with_detection as f64 / self.events as f64
    }
}

/// Split `samples` over `workers`; the first worker takes the remainder.
pub fn partition(samples: usize, workers: usize) -> Vec<usize> {
    let workers = workers.max(1);
    let base = samples / workers;
    let mut counts = vec![base; workers];
    counts[0] += samples % workers;
    counts
}

pub struct Simulation {
    config: Config,
    table: MassTable,
    dead_channels: DeadChannelMap,
    equation: String,
}

impl Simulation {
    /// Load the mass table and dead-channel map and check that the chain
    /// can be built, so that configuration errors surface before any
    /// worker starts.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let table = match &config.mass_file {
            Some(path) => {
                let table = MassTable::from_file(path)?;
                info!("loaded {} isotopes from {}", table.len(), path.display());
                table
            }
            None => MassTable::global().clone(),
        };

        let dead_channels = match &config.array.dead_channel_map {
            Some(path) => match DeadChannelMap::from_file(path) {
                Ok(map) => {
                    info!("{} dead channels read from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!(
                        "could not read dead channel map {}: {}; all channels treated as alive",
                        path.display(),
                        e
                    );
                    DeadChannelMap::new()
                }
            },
            None => DeadChannelMap::new(),
        };

        let gas = config.target.build()?;
        let system = ReactionSystem::new(config.system.clone(), gas, &table)?;
        let equation = system.equation().to_string();
        info!(
            "reaction system {} ({:?}), beam {} MeV at the reaction",
            equation,
            system.topology(),
            system.rxn_beam_energy()
        );

        Ok(Self {
            config,
            table,
            dead_channels,
            equation,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn equation(&self) -> &str {
        &self.equation
    }

    /// Run and write events to the configured output file, if any.
    pub fn run(&self) -> Result<RunSummary> {
        match &self.config.output {
            Some(path) => {
                let mut writer = EventWriter::create(path)?;
                let summary = self.run_with_sink(Some(&mut writer))?;
                info!("wrote {} events to {}", writer.written(), path.display());
                Ok(summary)
            }
            None => self.run_with_sink::<std::io::Sink>(None),
        }
    }

    pub fn run_with_sink<W: Write>(&self, sink: Option<&mut EventWriter<W>>) -> Result<RunSummary> {
        let counts = partition(self.config.samples, self.config.threads);
        info!(
            "generating {} events on {} worker(s)",
            self.config.samples,
            counts.len()
        );
        let writing = sink.is_some();
        let (tx, rx) = mpsc::sync_channel::<Event>(CHANNEL_CAPACITY);

        thread::scope(|scope| {
            let handles: Vec<_> = counts
                .iter()
                .enumerate()
                .map(|(index, &count)| {
                    let sender = if writing { Some(tx.clone()) } else { None };
                    scope.spawn(move || self.run_worker(index, count, sender))
                })
                .collect();
            drop(tx);

            let mut written = Ok(());
            if let Some(writer) = sink {
                for event in rx.iter() {
                    if let Err(e) = writer.write(&event) {
                        written = Err(e);
                        break;
                    }
                }
                if written.is_ok() {
                    written = writer.flush();
                }
            }
            // Workers blocked on a full channel see the receiver go away
            drop(rx);

            let mut summary = RunSummary::default();
            let mut failure = None;
            for handle in handles {
                match handle.join() {
                    Ok(Ok(partial)) => summary.merge(partial),
                    Ok(Err(e)) => {
                        if failure.is_none() {
                            failure = Some(e);
                        }
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            if let Some(e) = failure {
                return Err(e);
            }
            written?;

            info!(
                "{} events, {:.2}% with at least one detection",
                summary.events,
                100.0 * summary.any_detection_efficiency()
            );
            Ok(summary)
        })
    }

    fn run_worker(&self, index: usize, count: usize, sender: Option<SyncSender<Event>>) -> Result<RunSummary> {
        let gas = self.config.target.build()?;
        let mut system = ReactionSystem::new(self.config.system.clone(), gas.clone(), &self.table)?;
        let array = DetectorArray::anasen(gas, self.config.array.settings, self.config.array.smearing)
            .with_dead_channels(self.dead_channels.clone());
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        };

        let report_every = (count / 10).max(1);
        let mut summary = RunSummary::default();
        for i in 0..count {
            let mut event = system.generate(&mut rng)?;
            array.detect_event(&mut event, &mut rng);
            summary.record(&event);
            match &sender {
                Some(tx) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                None => system.recycle(event),
            }
            if count >= 10 && (i + 1) % report_every == 0 {
                info!("worker {}: {}/{} events", index, i + 1, count);
            }
        }
        Ok(summary)
    }
}
