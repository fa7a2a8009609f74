// Reaction chains
//
// A `ReactionSystem` owns the template particle list for one of three
// chain shapes and produces fully populated events by rejection sampling
// the kinematic parameters against every threshold in the chain.

use crate::eloss::EnergyLoss;
use crate::error::{Result, SimError};
use crate::kinematics::{StepSlots, TwoBodyReaction};
use crate::mass_table::MassTable;
use crate::nucleus::{Nucleus, ReactionRole};
use crate::vec4::FourMomentum;
use log::debug;
use nalgebra::Point3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RxnType {
    Decay,
    Reaction,
}

/// One step of a chain. A reaction lists (target, projectile, ejectile), a
/// decay lists (parent, light fragment); the last particle is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepParameters {
    pub rxn_type: RxnType,
    pub z: Vec<u32>,
    pub a: Vec<u32>,
    /// Mean excitation of the heavy product (MeV)
    #[serde(default)]
    pub mean_excitation: f64,
    /// Gaussian width of the excitation (MeV)
    #[serde(default)]
    pub sigma_excitation: f64,
}

impl StepParameters {
    pub fn reaction(z: [u32; 3], a: [u32; 3]) -> Self {
        Self {
            rxn_type: RxnType::Reaction,
            z: z.to_vec(),
            a: a.to_vec(),
            mean_excitation: 0.0,
            sigma_excitation: 0.0,
        }
    }

    pub fn decay(z: [u32; 2], a: [u32; 2]) -> Self {
        Self {
            rxn_type: RxnType::Decay,
            z: z.to_vec(),
            a: a.to_vec(),
            mean_excitation: 0.0,
            sigma_excitation: 0.0,
        }
    }

    pub fn with_excitation(mut self, mean: f64, sigma: f64) -> Self {
        self.mean_excitation = mean;
        self.sigma_excitation = sigma;
        self
    }

    fn isotopes(&self) -> usize {
        self.z.len()
    }
}

fn default_max_attempts() -> usize {
    10_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemParameters {
    /// Beam kinetic energy at the entrance window (MeV)
    #[serde(default)]
    pub initial_beam_energy: f64,
    /// Beam kinetic energy at the reaction when not sampled (MeV)
    #[serde(default)]
    pub rxn_beam_energy: f64,
    /// Draw the reaction energy uniformly below the initial energy
    #[serde(default)]
    pub sample_beam: bool,
    pub steps: Vec<StepParameters>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl SystemParameters {
    pub fn new(steps: Vec<StepParameters>) -> Self {
        Self {
            initial_beam_energy: 0.0,
            rxn_beam_energy: 0.0,
            sample_beam: false,
            steps,
            max_attempts: default_max_attempts(),
        }
    }

    pub fn with_beam(mut self, initial: f64, at_reaction: f64) -> Self {
        self.initial_beam_energy = initial;
        self.rxn_beam_energy = at_reaction;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    DecayOnly,
    SingleReaction,
    ReactionThenDecay,
}

impl Topology {
    pub fn particle_count(&self) -> usize {
        match self {
            Topology::DecayOnly => 3,
            Topology::SingleReaction => 4,
            Topology::ReactionThenDecay => 6,
        }
    }

    fn from_steps(steps: &[StepParameters]) -> Result<Self> {
        for (i, step) in steps.iter().enumerate() {
            if step.z.len() != step.a.len() {
                return Err(SimError::InvalidChain(format!(
                    "step {} lists {} charges but {} mass numbers",
                    i + 1,
                    step.z.len(),
                    step.a.len()
                )));
            }
        }
        let shape: Vec<(RxnType, usize)> = steps.iter().map(|s| (s.rxn_type, s.isotopes())).collect();
        match shape.as_slice() {
            [(RxnType::Decay, 2)] => Ok(Topology::DecayOnly),
            [(RxnType::Reaction, 3)] => Ok(Topology::SingleReaction),
            [(RxnType::Reaction, 3), (RxnType::Decay, 2)] => Ok(Topology::ReactionThenDecay),
            _ => Err(SimError::InvalidChain(format!(
                "unsupported chain {:?}",
                shape
            ))),
        }
    }
}

/// Sampled particles of one event, in chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub nuclei: Vec<Nucleus>,
}

impl Event {
    pub fn detected(&self) -> impl Iterator<Item = &Nucleus> {
        self.nuclei.iter().filter(|n| n.detection.detected)
    }

    pub fn by_role(&self, role: ReactionRole) -> Option<&Nucleus> {
        self.nuclei.iter().find(|n| n.role == role)
    }
}

fn residual_of(z: i64, a: i64, step: usize) -> Result<(u32, u32)> {
    if z < 0 || a <= 0 || z > a {
        return Err(SimError::InvalidChain(format!(
            "step {} leaves an impossible residual (Z={}, A={})",
            step, z, a
        )));
    }
    Ok((z as u32, a as u32))
}

fn excitation_distribution(step: &StepParameters, index: usize) -> Result<Normal<f64>> {
    // Normal::new only rejects a non-finite width
    if !(step.sigma_excitation >= 0.0) || !step.mean_excitation.is_finite() {
        return Err(SimError::InvalidChain(format!(
            "step {} excitation {} MeV with width {} MeV",
            index + 1,
            step.mean_excitation,
            step.sigma_excitation
        )));
    }
    Normal::new(step.mean_excitation, step.sigma_excitation).map_err(|e| {
        SimError::InvalidChain(format!("step {} excitation width: {}", index + 1, e))
    })
}

/// Per-draw kinematic parameters.
#[derive(Debug, Clone, Copy)]
struct Draw {
    theta_cm: f64,
    phi_cm: f64,
    excitation: f64,
}

pub struct ReactionSystem<E: EnergyLoss> {
    params: SystemParameters,
    target: E,
    topology: Topology,
    template: Vec<Nucleus>,
    steps: Vec<TwoBodyReaction>,
    excitations: Vec<Normal<f64>>,
    equation: String,
    rxn_beam_energy: f64,
    rxn_path_length: f64,
    beam_straggling: f64,
    spare: Option<Vec<Nucleus>>,
}

impl<E: EnergyLoss> ReactionSystem<E> {
    /// Build the chain and its particle list. `target` provides the beam
    /// energy loss before the reaction point.
    pub fn new(params: SystemParameters, target: E, table: &MassTable) -> Result<Self> {
        let topology = Topology::from_steps(&params.steps)?;
        let excitations = params
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| excitation_distribution(s, i))
            .collect::<Result<Vec<_>>>()?;
        if params.max_attempts == 0 {
            return Err(SimError::InvalidChain("max_attempts must be positive".to_string()));
        }

        let first = &params.steps[0];
        let make = |z: u32, a: u32, role: ReactionRole| Nucleus::new(z, a, role, table);
        let (template, steps) = match topology {
            Topology::DecayOnly => {
                let (zb, ab) = residual_of(
                    first.z[0] as i64 - first.z[1] as i64,
                    first.a[0] as i64 - first.a[1] as i64,
                    1,
                )?;
                let nuclei = vec![
                    make(first.z[0], first.a[0], ReactionRole::Target)?,
                    make(first.z[1], first.a[1], ReactionRole::BreakupLight)?,
                    make(zb, ab, ReactionRole::BreakupHeavy)?,
                ];
                (nuclei, vec![TwoBodyReaction::bound(StepSlots::decay(0, 1, 2))])
            }
            Topology::SingleReaction | Topology::ReactionThenDecay => {
                let (zr, ar) = residual_of(
                    first.z[0] as i64 + first.z[1] as i64 - first.z[2] as i64,
                    first.a[0] as i64 + first.a[1] as i64 - first.a[2] as i64,
                    1,
                )?;
                let mut nuclei = vec![
                    make(first.z[0], first.a[0], ReactionRole::Target)?,
                    make(first.z[1], first.a[1], ReactionRole::Projectile)?,
                    make(first.z[2], first.a[2], ReactionRole::Ejectile)?,
                    make(zr, ar, ReactionRole::Residual)?,
                ];
                let mut steps = vec![TwoBodyReaction::bound(StepSlots::reaction(0, 1, 2, 3))];

                if topology == Topology::ReactionThenDecay {
                    let second = &params.steps[1];
                    if second.z[0] != zr || second.a[0] != ar {
                        return Err(SimError::InvalidChain(format!(
                            "step 1 residual (Z={}, A={}) does not match step 2 parent (Z={}, A={})",
                            zr, ar, second.z[0], second.a[0]
                        )));
                    }
                    let (zb, ab) = residual_of(
                        second.z[0] as i64 - second.z[1] as i64,
                        second.a[0] as i64 - second.a[1] as i64,
                        2,
                    )?;
                    nuclei.push(make(second.z[1], second.a[1], ReactionRole::BreakupLight)?);
                    nuclei.push(make(zb, ab, ReactionRole::BreakupHeavy)?);
                    steps.push(TwoBodyReaction::bound(StepSlots::decay(3, 4, 5)));
                }
                (nuclei, steps)
            }
        };

        debug_assert_eq!(template.len(), topology.particle_count());
        let equation = Self::format_equation(topology, &template);
        let mut system = Self {
            params,
            target,
            topology,
            template,
            steps,
            excitations,
            equation,
            rxn_beam_energy: 0.0,
            rxn_path_length: 0.0,
            beam_straggling: 0.0,
            spare: None,
        };
        if topology != Topology::DecayOnly {
            if !(system.params.initial_beam_energy > 0.0) {
                return Err(SimError::InvalidChain(
                    "reaction chains need a positive initial beam energy".to_string(),
                ));
            }
            if !system.params.sample_beam {
                system.set_beam_energy(system.params.rxn_beam_energy);
            }
        }
        debug!("built reaction system {}", system.equation);
        Ok(system)
    }

    fn format_equation(topology: Topology, nuclei: &[Nucleus]) -> String {
        let s = |i: usize| nuclei[i].symbol.as_str();
        match topology {
            Topology::DecayOnly => format!("{}->{}+{}", s(0), s(1), s(2)),
            Topology::SingleReaction => format!("{}({}, {}){}", s(0), s(1), s(2), s(3)),
            Topology::ReactionThenDecay => format!(
                "{}({}, {}){}->{}+{}",
                s(0),
                s(1),
                s(2),
                s(3),
                s(4),
                s(5)
            ),
        }
    }

    /// Set the beam energy at the reaction point and recompute the path
    /// travelled through the target and the beam straggling.
    fn set_beam_energy(&mut self, energy: f64) {
        let projectile = &self.template[1];
        let initial = self.params.initial_beam_energy;
        self.rxn_beam_energy = energy;
        self.rxn_path_length = self.target.path_length(projectile.z, projectile.a, initial, energy);
        self.beam_straggling = self.target.angular_straggling(
            projectile.z,
            projectile.a,
            initial,
            self.rxn_path_length,
        );
    }

    pub fn equation(&self) -> &str {
        &self.equation
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Particle list as built, before any sampling.
    pub fn template(&self) -> &[Nucleus] {
        &self.template
    }

    pub fn rxn_beam_energy(&self) -> f64 {
        self.rxn_beam_energy
    }

    pub fn rxn_path_length(&self) -> f64 {
        self.rxn_path_length
    }

    pub fn beam_straggling(&self) -> f64 {
        self.beam_straggling
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> Vec<Draw> {
        self.excitations
            .iter()
            .map(|excitation| Draw {
                theta_cm: (2.0 * rng.gen::<f64>() - 1.0).acos(),
                phi_cm: 2.0 * PI * rng.gen::<f64>(),
                excitation: excitation.sample(&mut *rng),
            })
            .collect()
    }

    fn feasible(&self, nuclei: &[Nucleus], draws: &[Draw], beam_energy: f64) -> bool {
        match self.topology {
            Topology::DecayOnly => {
                self.steps[0].check_decay_threshold(nuclei, 0.0, draws[0].excitation)
            }
            Topology::SingleReaction => {
                self.steps[0].check_reaction_threshold(nuclei, beam_energy, draws[0].excitation)
            }
            Topology::ReactionThenDecay => {
                self.steps[0].check_reaction_threshold(nuclei, beam_energy, draws[0].excitation)
                    && self.steps[1].check_decay_threshold(
                        nuclei,
                        draws[0].excitation,
                        draws[1].excitation,
                    )
            }
        }
    }

    /// Sample one event. Draws failing any threshold are redrawn, up to the
    /// configured number of attempts.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Result<Event> {
        let mut nuclei = match self.spare.take() {
            Some(buffer) => buffer,
            None => self.template.clone(),
        };

        for _ in 0..self.params.max_attempts {
            let draws = self.draw(rng);
            let beam_energy = if self.params.sample_beam && self.topology != Topology::DecayOnly {
                rng.gen::<f64>() * self.params.initial_beam_energy
            } else {
                self.rxn_beam_energy
            };
            if !self.feasible(&nuclei, &draws, beam_energy) {
                continue;
            }

            if self.params.sample_beam && self.topology != Topology::DecayOnly {
                self.set_beam_energy(beam_energy);
            }
            let beam_theta = rng.gen::<f64>() * self.beam_straggling;
            let beam_phi = 2.0 * PI * rng.gen::<f64>();

            if self.topology == Topology::DecayOnly {
                nuclei[0].vec4 = FourMomentum::at_rest(nuclei[0].ground_state_mass);
            }
            for (step, draw) in self.steps.iter_mut().zip(&draws) {
                step.set_emission_angles(draw.theta_cm, draw.phi_cm);
                step.set_excitation(draw.excitation);
                if !step.is_decay() {
                    step.set_beam_kinetic_energy(beam_energy);
                    step.set_beam_direction(beam_theta, beam_phi);
                }
            }
            for step in &self.steps {
                step.calculate(&mut nuclei)?;
            }

            let rxn_point = if self.topology == Topology::DecayOnly {
                Point3::origin()
            } else {
                let l = self.rxn_path_length;
                Point3::new(
                    beam_theta.sin() * beam_phi.cos() * l,
                    beam_theta.sin() * beam_phi.sin() * l,
                    beam_theta.cos() * l,
                )
            };
            for nucleus in nuclei.iter_mut() {
                nucleus.rxn_point = rxn_point;
            }
            return Ok(Event { nuclei });
        }

        self.spare = Some(nuclei);
        Err(SimError::InfeasibleConfiguration {
            attempts: self.params.max_attempts,
        })
    }

    /// Hand an event's buffer back for reuse. Detection fields are cleared.
    pub fn recycle(&mut self, mut event: Event) {
        // Buffers from another chain are dropped
        if event.nuclei.len() != self.topology.particle_count() {
            debug!(
                "dropping {}-particle buffer recycled into {}",
                event.nuclei.len(),
                self.equation
            );
            return;
        }
        for nucleus in event.nuclei.iter_mut() {
            nucleus.reset_detection();
        }
        self.spare = Some(event.nuclei);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Beam provider with a fixed path and straggling.
    struct FixedPath;

    impl EnergyLoss for FixedPath {
        fn energy_loss(&self, _z: u32, _a: u32, _start_energy: f64, _path_length: f64) -> f64 {
            0.0
        }

        fn reverse_energy_loss(&self, _z: u32, _a: u32, _final_energy: f64, _path_length: f64) -> f64 {
            0.0
        }

        fn path_length(&self, _z: u32, _a: u32, _start_energy: f64, _final_energy: f64) -> f64 {
            0.2
        }

        fn angular_straggling(&self, _z: u32, _a: u32, _energy: f64, _path_length: f64) -> f64 {
            0.01
        }
    }

    fn build(params: SystemParameters) -> Result<ReactionSystem<FixedPath>> {
        ReactionSystem::new(params, FixedPath, MassTable::global())
    }

    fn d_p() -> SystemParameters {
        SystemParameters::new(vec![StepParameters::reaction([6, 1, 1], [12, 2, 1])])
            .with_beam(12.0, 10.0)
    }

    #[test]
    fn test_single_reaction_chain() {
        let mut system = build(d_p()).unwrap();
        assert_eq!(system.topology(), Topology::SingleReaction);
        assert_eq!(system.equation(), "12C(2H, 1H)13C");
        assert_eq!(system.rxn_path_length(), 0.2);

        let mut rng = StdRng::seed_from_u64(42);
        let event = system.generate(&mut rng).unwrap();
        assert_eq!(event.nuclei.len(), 4);
        let roles: Vec<ReactionRole> = event.nuclei.iter().map(|n| n.role).collect();
        assert_eq!(
            roles,
            vec![
                ReactionRole::Target,
                ReactionRole::Projectile,
                ReactionRole::Ejectile,
                ReactionRole::Residual
            ]
        );
        let point = event.nuclei[0].rxn_point;
        assert!((point.coords.norm() - 0.2).abs() < 1e-12);
        assert!(point.z > 0.2 * 0.01f64.cos() - 1e-12);
        assert!(event.nuclei.iter().all(|n| n.rxn_point == point));
        assert!((event.nuclei[1].kinetic_energy() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_step_chain_conserves_momentum() {
        let params = SystemParameters::new(vec![
            StepParameters::reaction([3, 2, 2], [7, 3, 4]).with_excitation(2.186, 0.0),
            StepParameters::decay([3, 1], [6, 2]),
        ])
        .with_beam(10.0, 8.0);
        let mut system = build(params).unwrap();
        assert_eq!(system.equation(), "7Li(3He, 4He)6Li->2H+4He");

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let event = system.generate(&mut rng).unwrap();
            assert_eq!(event.nuclei.len(), 6);
            let n = &event.nuclei;
            let before = n[0].vec4 + n[1].vec4;
            let after = n[2].vec4 + n[4].vec4 + n[5].vec4;
            assert!((before.p - after.p).norm() < 1e-5);
            assert!((before.e - after.e).abs() < 1e-5);
            assert!((n[3].excitation_energy() - 2.186).abs() < 1e-5);
            system.recycle(event);
        }
    }

    #[test]
    fn test_decay_only_chain() {
        let params = SystemParameters::new(vec![StepParameters::decay([3, 1], [5, 1])]);
        let mut system = build(params).unwrap();
        assert_eq!(system.equation(), "5Li->1H+4He");
        let mut rng = StdRng::seed_from_u64(42);
        let event = system.generate(&mut rng).unwrap();
        assert_eq!(event.nuclei.len(), 3);
        assert_eq!(event.nuclei[0].rxn_point, Point3::origin());
        assert_eq!(event.nuclei[0].vec4.momentum(), 0.0);
        let total = event.nuclei[1].vec4.p + event.nuclei[2].vec4.p;
        assert!(total.norm() < 1e-6);
        assert!((event.nuclei[1].theta_cm - event.nuclei[1].theta()).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_chains() {
        let too_many = SystemParameters::new(vec![
            StepParameters::decay([3, 1], [5, 1]),
            StepParameters::decay([3, 1], [5, 1]),
            StepParameters::decay([3, 1], [5, 1]),
        ]);
        assert!(matches!(build(too_many), Err(SimError::InvalidChain(_))));

        let wrong_count = SystemParameters::new(vec![StepParameters {
            rxn_type: RxnType::Reaction,
            z: vec![3, 1],
            a: vec![5, 1],
            mean_excitation: 0.0,
            sigma_excitation: 0.0,
        }])
        .with_beam(1.0, 1.0);
        assert!(matches!(build(wrong_count), Err(SimError::InvalidChain(_))));

        let not_sequential = SystemParameters::new(vec![
            StepParameters::reaction([6, 1, 1], [12, 2, 1]),
            StepParameters::decay([3, 1], [5, 1]),
        ])
        .with_beam(12.0, 10.0);
        assert!(matches!(build(not_sequential), Err(SimError::InvalidChain(_))));

        let negative_residual = SystemParameters::new(vec![StepParameters::decay([1, 2], [1, 4])]);
        assert!(matches!(build(negative_residual), Err(SimError::InvalidChain(_))));

        let unknown = SystemParameters::new(vec![StepParameters::reaction([6, 1, 1], [40, 2, 1])])
            .with_beam(12.0, 10.0);
        assert!(matches!(build(unknown), Err(SimError::UnknownIsotope { .. })));

        let bad_width = SystemParameters::new(vec![
            StepParameters::decay([3, 1], [5, 1]).with_excitation(0.0, -1.0)
        ]);
        assert!(matches!(build(bad_width), Err(SimError::InvalidChain(_))));

        for (mean, sigma) in [(0.0, f64::NAN), (f64::INFINITY, 0.1), (1.0, -1e-9)] {
            let bad = SystemParameters::new(vec![
                StepParameters::decay([3, 1], [5, 1]).with_excitation(mean, sigma)
            ]);
            assert!(matches!(build(bad), Err(SimError::InvalidChain(_))), "{} {}", mean, sigma);
        }
        let zero_width = SystemParameters::new(vec![
            StepParameters::decay([3, 1], [5, 1]).with_excitation(0.5, 0.0)
        ]);
        assert!(build(zero_width).is_ok());

        let no_beam = SystemParameters::new(vec![StepParameters::reaction([6, 1, 1], [12, 2, 1])]);
        assert!(build(no_beam).is_err());
    }

    #[test]
    fn test_infeasible_configuration_is_reported() {
        // 12C cannot split into 4He + 8Be without excitation
        let mut params = SystemParameters::new(vec![StepParameters::decay([6, 2], [12, 4])]);
        params.max_attempts = 25;
        let mut system = build(params).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        match system.generate(&mut rng) {
            Err(SimError::InfeasibleConfiguration { attempts }) => assert_eq!(attempts, 25),
            other => panic!("unexpected {:?}", other.map(|e| e.nuclei.len())),
        }
    }

    #[test]
    fn test_recycle_clears_detection() {
        let mut system = build(d_p()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut event = system.generate(&mut rng).unwrap();
        event.nuclei[2].detection.detected = true;
        event.nuclei[2].detection.silicon_energy = 3.0;
        system.recycle(event);
        let event = system.generate(&mut rng).unwrap();
        assert!(event.nuclei.iter().all(|n| !n.detection.detected));
        assert!(event.nuclei.iter().all(|n| n.detection.silicon_energy == 0.0));
    }

    #[test]
    fn test_recycle_ignores_foreign_buffer() {
        let mut system = build(d_p()).unwrap();
        assert_eq!(system.template().len(), Topology::SingleReaction.particle_count());
        let mut decay = build(SystemParameters::new(vec![StepParameters::decay([3, 1], [5, 1])])).unwrap();
        assert_eq!(decay.template().len(), Topology::DecayOnly.particle_count());

        let mut rng = StdRng::seed_from_u64(11);
        let foreign = decay.generate(&mut rng).unwrap();
        system.recycle(foreign);
        let event = system.generate(&mut rng).unwrap();
        assert_eq!(event.nuclei.len(), 4);
        for (nucleus, template) in event.nuclei.iter().zip(system.template()) {
            assert_eq!((nucleus.z, nucleus.a), (template.z, template.a));
        }
    }

    #[test]
    fn test_sampled_beam_energy_below_initial() {
        let mut params = d_p();
        params.sample_beam = true;
        let mut system = build(params).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let event = system.generate(&mut rng).unwrap();
            let beam = event.nuclei[1].kinetic_energy();
            assert!(beam >= 0.0 && beam < 12.0);
            assert!((beam - system.rxn_beam_energy()).abs() < 1e-9);
            system.recycle(event);
        }
    }

    #[test]
    fn test_parameters_from_json() {
        let json = r#"{
            "initial_beam_energy": 12.0,
            "rxn_beam_energy": 10.0,
            "steps": [
                {"rxn_type": "Reaction", "z": [6, 1, 1], "a": [12, 2, 1], "mean_excitation": 3.09}
            ]
        }"#;
        let params: SystemParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.max_attempts, 10_000);
        assert!(!params.sample_beam);
        assert_eq!(params.steps[0].sigma_excitation, 0.0);
        assert!(build(params).is_ok());
    }
}
