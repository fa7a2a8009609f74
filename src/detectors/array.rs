// Full detector array and its response to a particle.
//
// Two barrels of twelve strip sensors and a forward cap of four annular
// sensors surround the wire chamber. The silicon stages are tried in a
// fixed order and the first geometric hit decides the outcome.

use super::dead_channel::{ArrayComponent, ChannelSide, DeadChannelMap};
use super::pc::WireChamber;
use super::qqq::{self, AnnularDetector};
use super::sx3::{self, StripDetector};
use super::SmearMode;
use crate::eloss::{EnergyLoss, Target};
use crate::error::Result;
use crate::nucleus::{DetectorStage, Nucleus};
use crate::system::Event;
use crate::vec4::{point_angles, spherical_direction};
use log::debug;
use nalgebra::{Point3, Vector3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const SX3_PER_BARREL: usize = 12;
pub const QQQ_COUNT: usize = 4;
/// Length of the chamber along the beam axis (m)
pub const CHAMBER_LENGTH: f64 = 0.554;
/// Gap between the frames of the two barrels (m)
pub const BARREL_GAP: f64 = 0.0254;
/// Dead space at each end of a barrel frame (m)
pub const SX3_FRAME_GAP: f64 = 0.049;
pub const QQQ_Z: f64 = CHAMBER_LENGTH;
pub const BARREL1_Z: f64 = QQQ_Z - (0.0125 + sx3::TOTAL_LENGTH * 0.5);
pub const BARREL2_Z: f64 = BARREL1_Z - (sx3::TOTAL_LENGTH + BARREL_GAP + SX3_FRAME_GAP * 2.0);

pub const BARREL_PHI: [f64; SX3_PER_BARREL] = [
    4.97426, 5.49739, 6.02132, 0.261868, 0.785398, 1.30893, 1.83266, 2.35619, 2.87972, 3.40346,
    3.92699, 4.45052,
];
pub const BARREL_RHO: [f64; SX3_PER_BARREL] = [
    0.0890601, 0.0889871, 0.0890354, 0.0890247, 0.0890354, 0.0890354, 0.0890247, 0.0890354,
    0.0890354, 0.0890247, 0.0890354, 0.0890354,
];
pub const QQQ_PHI: [f64; QQQ_COUNT] = [5.49779, 0.785398, 2.35619, 3.92699];

/// Below this incidence cosine the effective silicon thickness is undefined.
const GRAZING_COSINE: f64 = 1.0e-6;

/// Rounding allowance on the kinetic-energy floor, in MeV.
const FLOOR_TOLERANCE: f64 = 1.0e-9;

fn default_energy_floor() -> f64 {
    0.6
}

fn default_detection_threshold() -> f64 {
    0.6
}

fn default_silicon_thickness() -> f64 {
    1.0e-3
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArraySettings {
    /// Particles at or below this kinetic energy (MeV) are not tracked
    #[serde(default = "default_energy_floor")]
    pub energy_floor: f64,
    /// Silicon energy (MeV) that must be exceeded for a detection
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f64,
    /// Silicon thickness (m)
    #[serde(default = "default_silicon_thickness")]
    pub silicon_thickness: f64,
}

impl Default for ArraySettings {
    fn default() -> Self {
        Self {
            energy_floor: default_energy_floor(),
            detection_threshold: default_detection_threshold(),
            silicon_thickness: default_silicon_thickness(),
        }
    }
}

/// Geometric hit on one silicon sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiliconHit {
    pub stage: DetectorStage,
    pub detector: usize,
    /// Front strip, or ring for annular sensors
    pub front: usize,
    /// Back strip, or wedge for annular sensors
    pub back: Option<usize>,
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

/// One silicon stage of the array.
pub trait SiliconStage {
    fn stage(&self) -> DetectorStage;

    /// First sensor of the stage crossed by the ray from `origin`.
    fn locate(
        &self,
        origin: &Point3<f64>,
        theta: f64,
        phi: f64,
        rng: &mut dyn RngCore,
    ) -> Option<SiliconHit>;
}

#[derive(Debug, Clone)]
pub struct Barrel {
    stage: DetectorStage,
    detectors: Vec<StripDetector>,
}

impl Barrel {
    pub fn new(stage: DetectorStage, center_z: f64, mode: SmearMode) -> Self {
        let detectors = BARREL_PHI
            .iter()
            .zip(BARREL_RHO.iter())
            .map(|(&phi, &rho)| StripDetector::new(phi, center_z, rho, mode))
            .collect();
        Self { stage, detectors }
    }

    pub fn detectors(&self) -> &[StripDetector] {
        &self.detectors
    }
}

impl SiliconStage for Barrel {
    fn stage(&self) -> DetectorStage {
        self.stage
    }

    fn locate(
        &self,
        origin: &Point3<f64>,
        theta: f64,
        phi: f64,
        rng: &mut dyn RngCore,
    ) -> Option<SiliconHit> {
        self.detectors.iter().enumerate().find_map(|(index, sx3)| {
            let hit = sx3.channel_ratio(origin, theta, phi);
            let front = hit.front?;
            let position = sx3.hit_coordinates(front, hit.ratio, &mut *rng)?;
            Some(SiliconHit {
                stage: self.stage,
                detector: index,
                front,
                back: hit.back,
                position,
                normal: sx3.normal(),
            })
        })
    }
}

#[derive(Debug, Clone)]
pub struct ForwardCap {
    detectors: Vec<AnnularDetector>,
}

impl ForwardCap {
    pub fn new(mode: SmearMode) -> Self {
        let detectors = QQQ_PHI
            .iter()
            .map(|&phi| AnnularDetector::new(phi, QQQ_Z, mode))
            .collect();
        Self { detectors }
    }

    pub fn detectors(&self) -> &[AnnularDetector] {
        &self.detectors
    }
}

impl SiliconStage for ForwardCap {
    fn stage(&self) -> DetectorStage {
        DetectorStage::Forward
    }

    fn locate(
        &self,
        origin: &Point3<f64>,
        theta: f64,
        phi: f64,
        rng: &mut dyn RngCore,
    ) -> Option<SiliconHit> {
        self.detectors.iter().enumerate().find_map(|(index, qqq)| {
            let hit = qqq.ring_wedge(origin, theta, phi)?;
            let position = qqq.hit_coordinates(hit.ring, hit.wedge, &mut *rng)?;
            Some(SiliconHit {
                stage: DetectorStage::Forward,
                detector: index,
                front: hit.ring,
                back: Some(hit.wedge),
                position,
                normal: qqq.normal(),
            })
        })
    }
}

/// Fixed layout of the array.
#[derive(Debug, Clone)]
pub struct ArrayGeometry {
    barrel1: Barrel,
    barrel2: Barrel,
    forward: ForwardCap,
    wires: WireChamber,
}

impl ArrayGeometry {
    pub fn new(mode: SmearMode) -> Self {
        Self {
            barrel1: Barrel::new(DetectorStage::Barrel1, BARREL1_Z, mode),
            barrel2: Barrel::new(DetectorStage::Barrel2, BARREL2_Z, mode),
            forward: ForwardCap::new(mode),
            wires: WireChamber::new(),
        }
    }

    /// Silicon stages in detection priority order.
    pub fn stages(&self) -> [&dyn SiliconStage; 3] {
        [&self.barrel1, &self.barrel2, &self.forward]
    }

    pub fn barrel1(&self) -> &Barrel {
        &self.barrel1
    }

    pub fn barrel2(&self) -> &Barrel {
        &self.barrel2
    }

    pub fn forward(&self) -> &ForwardCap {
        &self.forward
    }

    pub fn wires(&self) -> &WireChamber {
        &self.wires
    }

    /// Whether a ray from `origin` crosses any active silicon.
    pub fn covers(&self, origin: &Point3<f64>, theta: f64, phi: f64) -> bool {
        let barrels = self.barrel1.detectors.iter().chain(&self.barrel2.detectors);
        barrels
            .into_iter()
            .any(|sx3| sx3.channel_ratio(origin, theta, phi).is_hit())
            || self
                .forward
                .detectors
                .iter()
                .any(|qqq| qqq.ring_wedge(origin, theta, phi).is_some())
    }

    /// Fraction of channel centres that map back onto themselves when the
    /// ray from the origin through them is classified again.
    pub fn consistency_ratio(&self) -> f64 {
        let origin = Point3::origin();
        let mut total = 0usize;
        let mut matched = 0usize;

        for barrel in [&self.barrel1, &self.barrel2] {
            for sx3 in &barrel.detectors {
                for front in 0..sx3::STRIP_COUNT {
                    let Some(point) = sx3.channel_center(front, 0.0) else {
                        continue;
                    };
                    total += 1;
                    let (theta, phi) = point_angles(&point);
                    let found = barrel.detectors.iter().any(|candidate| {
                        let hit = candidate.channel_ratio(&origin, theta, phi);
                        hit.front
                            .and_then(|f| candidate.channel_center(f, hit.ratio))
                            .map_or(false, |p| (p - point).norm() < super::GEOMETRY_EPSILON)
                    });
                    if found {
                        matched += 1;
                    }
                }
            }
        }

        for qqq_detector in &self.forward.detectors {
            for ring in 0..qqq::RING_COUNT {
                for wedge in 0..qqq::WEDGE_COUNT {
                    let Some(point) = qqq_detector.channel_center(ring, wedge) else {
                        continue;
                    };
                    total += 1;
                    let (theta, phi) = point_angles(&point);
                    let found = self.forward.detectors.iter().any(|candidate| {
                        candidate
                            .ring_wedge(&origin, theta, phi)
                            .and_then(|hit| candidate.channel_center(hit.ring, hit.wedge))
                            .map_or(false, |p| (p - point).norm() < super::GEOMETRY_EPSILON)
                    });
                    if found {
                        matched += 1;
                    }
                }
            }
        }

        if total == 0 {
            return 0.0;
        }
        matched as f64 / total as f64
    }

    /// Dump every channel corner followed by every channel centre, one
    /// `x y z` triple per line.
    pub fn write_coordinates<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "ANASEN Geometry File -- Coordinates for Detectors")?;
        let mut centers = Vec::new();

        for barrel in [&self.barrel1, &self.barrel2] {
            for sx3 in &barrel.detectors {
                for strip in 0..sx3::STRIP_COUNT {
                    for corner in 0..sx3::CORNER_COUNT {
                        for point in [sx3.front_corner(strip, corner), sx3.back_corner(strip, corner)]
                            .into_iter()
                            .flatten()
                        {
                            write_point(writer, &point)?;
                        }
                    }
                    centers.extend(sx3.channel_center(strip, 0.0));
                }
            }
        }

        for qqq_detector in &self.forward.detectors {
            for channel in 0..qqq::RING_COUNT {
                for corner in 0..4 {
                    for point in [
                        qqq_detector.ring_corner(channel, corner),
                        qqq_detector.wedge_corner(channel, corner),
                    ]
                    .into_iter()
                    .flatten()
                    {
                        write_point(writer, &point)?;
                    }
                }
                for wedge in 0..qqq::WEDGE_COUNT {
                    centers.extend(qqq_detector.channel_center(channel, wedge));
                }
            }
        }

        for point in &centers {
            write_point(writer, point)?;
        }
        Ok(())
    }
}

fn write_point<W: Write>(writer: &mut W, point: &Point3<f64>) -> Result<()> {
    writeln!(writer, "{} {} {}", point.x, point.y, point.z)?;
    Ok(())
}

/// Detector response: geometry, energy-loss providers for the gas and the
/// silicon, and the dead-channel mask.
#[derive(Debug, Clone)]
pub struct DetectorArray<E: EnergyLoss> {
    geometry: ArrayGeometry,
    gas: E,
    silicon: E,
    settings: ArraySettings,
    dead_channels: DeadChannelMap,
}

impl DetectorArray<Target> {
    /// Array with natural silicon sensors in the given fill gas.
    pub fn anasen(gas: Target, settings: ArraySettings, mode: SmearMode) -> Self {
        Self::new(gas, Target::silicon(), settings, mode)
    }
}

impl<E: EnergyLoss> DetectorArray<E> {
    pub fn new(gas: E, silicon: E, settings: ArraySettings, mode: SmearMode) -> Self {
        Self {
            geometry: ArrayGeometry::new(mode),
            gas,
            silicon,
            settings,
            dead_channels: DeadChannelMap::default(),
        }
    }

    pub fn with_dead_channels(mut self, dead_channels: DeadChannelMap) -> Self {
        self.dead_channels = dead_channels;
        self
    }

    pub fn geometry(&self) -> &ArrayGeometry {
        &self.geometry
    }

    pub fn settings(&self) -> &ArraySettings {
        &self.settings
    }

    pub fn dead_channels(&self) -> &DeadChannelMap {
        &self.dead_channels
    }

    /// Run the detector response on every particle of an event. Returns the
    /// number of detected particles.
    pub fn detect_event<R: Rng>(&self, event: &mut Event, rng: &mut R) -> usize {
        event
            .nuclei
            .iter_mut()
            .map(|nucleus| self.is_detected(nucleus, &mut *rng))
            .filter(|&detected| detected)
            .count()
    }

    /// Decide whether `nucleus` is detected and fill its detection record.
    pub fn is_detected<R: Rng>(&self, nucleus: &mut Nucleus, rng: &mut R) -> bool {
        if nucleus.role.is_entrance_channel() {
            return false;
        }
        if nucleus.kinetic_energy() <= self.settings.energy_floor + FLOOR_TOLERANCE {
            return false;
        }
        if nucleus.rxn_point.z > CHAMBER_LENGTH {
            return false;
        }

        let theta = nucleus.theta();
        let phi = nucleus.phi();
        let origin = nucleus.rxn_point;
        for stage in self.geometry.stages() {
            if let Some(hit) = stage.locate(&origin, theta, phi, &mut *rng) {
                return self.respond(nucleus, &hit, theta, phi, rng);
            }
        }
        false
    }

    fn silicon_dead(&self, hit: &SiliconHit) -> bool {
        let component = match hit.stage {
            DetectorStage::Barrel1 => ArrayComponent::Barrel1,
            DetectorStage::Barrel2 => ArrayComponent::Barrel2,
            DetectorStage::Forward => ArrayComponent::Qqq,
        };
        let (detector, front) = (hit.detector as u32, hit.front as u32);
        match hit.back {
            Some(back) => self
                .dead_channels
                .is_channel_pair_dead(component, detector, front, back as u32),
            None => self
                .dead_channels
                .is_channel_dead(component, detector, front, ChannelSide::Front),
        }
    }

    /// Energy left in the silicon by a particle arriving with
    /// `energy_at_silicon`. A grazing track deposits everything it carries.
    fn silicon_deposit(&self, z: u32, a: u32, energy_at_silicon: f64, cos_incidence: f64) -> f64 {
        if cos_incidence < GRAZING_COSINE {
            return energy_at_silicon;
        }
        let effective_thickness = self.settings.silicon_thickness / cos_incidence;
        self.silicon
            .energy_loss(z, a, energy_at_silicon, effective_thickness)
    }

    fn respond<R: Rng>(
        &self,
        nucleus: &mut Nucleus,
        hit: &SiliconHit,
        theta: f64,
        phi: f64,
        rng: &mut R,
    ) -> bool {
        let label = hit.stage.label();
        if self.silicon_dead(hit) {
            debug!("{} {} hit dead channel on {} {}", nucleus.symbol, nucleus.role, label, hit.detector);
            return false;
        }

        let origin = nucleus.rxn_point;
        let wire = match self.geometry.wires.assign(&origin, theta, phi, nucleus.z, nucleus.a, rng) {
            Some(wire) => wire,
            None => {
                debug!("{} {} missed the wire chamber", nucleus.symbol, nucleus.role);
                return false;
            }
        };
        if self.dead_channels.is_wire_dead(wire.wire as u32) {
            debug!("{} {} hit dead wire {}", nucleus.symbol, nucleus.role, wire.wire);
            return false;
        }

        let (z, a) = (nucleus.z, nucleus.a);
        let ke = nucleus.kinetic_energy();
        let cos_incidence = spherical_direction(theta, phi).dot(&hit.normal).abs();
        let wire_energy = self
            .gas
            .energy_loss(z, a, ke, (wire.position - origin).norm());
        let energy_at_silicon = ke - self.gas.energy_loss(z, a, ke, (hit.position - origin).norm());
        let silicon_energy = self.silicon_deposit(z, a, energy_at_silicon, cos_incidence);

        if !(silicon_energy > self.settings.detection_threshold) {
            debug!(
                "{} {} below threshold in {}: {} MeV",
                nucleus.symbol, nucleus.role, label, silicon_energy
            );
            return false;
        }

        let detection = &mut nucleus.detection;
        detection.detected = true;
        detection.stage = Some(hit.stage);
        detection.silicon_hit = Some(hit.position);
        detection.wire_hit = Some(wire.position);
        detection.wire_energy = wire_energy;
        detection.silicon_energy = silicon_energy;
        true
    }
}
