use crate::error::{Result, SimError};
use crate::mass_table::MassTable;
use crate::vec4::FourMomentum;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Place of a particle within a reaction chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReactionRole {
    Target,
    Projectile,
    Ejectile,
    Residual,
    BreakupLight,
    BreakupHeavy,
}

impl ReactionRole {
    /// Roles describing the entrance channel, never detected.
    pub fn is_entrance_channel(&self) -> bool {
        matches!(self, ReactionRole::Target | ReactionRole::Projectile)
    }
}

impl fmt::Display for ReactionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReactionRole::Target => "target",
            ReactionRole::Projectile => "projectile",
            ReactionRole::Ejectile => "ejectile",
            ReactionRole::Residual => "residual",
            ReactionRole::BreakupLight => "breakup_light",
            ReactionRole::BreakupHeavy => "breakup_heavy",
        };
        write!(f, "{}", name)
    }
}

/// Silicon stage that recorded a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorStage {
    Barrel1,
    Barrel2,
    Forward,
}

impl DetectorStage {
    pub fn label(&self) -> &'static str {
        match self {
            DetectorStage::Barrel1 => "R1",
            DetectorStage::Barrel2 => "R2",
            DetectorStage::Forward => "FQQQ",
        }
    }
}

/// Detection outcome of a single particle. Everything is zero/None until the
/// detector array accepts the particle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    pub detected: bool,
    pub stage: Option<DetectorStage>,
    pub silicon_hit: Option<Point3<f64>>,
    pub wire_hit: Option<Point3<f64>>,
    /// Energy lost in the gas between the reaction point and the wire (MeV)
    pub wire_energy: f64,
    /// Energy deposited in the silicon (MeV)
    pub silicon_energy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nucleus {
    pub z: u32,
    pub a: u32,
    /// Ground-state nuclear mass in MeV
    pub ground_state_mass: f64,
    pub symbol: String,
    pub role: ReactionRole,
    pub vec4: FourMomentum,
    /// Reaction vertex in metres
    pub rxn_point: Point3<f64>,
    /// Centre-of-mass emission angle, set on the light product of each step
    pub theta_cm: f64,
    pub detection: Detection,
}

impl Nucleus {
    /// Build a nucleus from its isotope identity. Unknown isotopes are a
    /// configuration error.
    pub fn new(z: u32, a: u32, role: ReactionRole, table: &MassTable) -> Result<Self> {
        let data = table.find(z, a).ok_or(SimError::UnknownIsotope {
            z: z as i64,
            a: a as i64,
        })?;
        Ok(Self {
            z,
            a,
            ground_state_mass: data.mass,
            symbol: data.symbol.clone(),
            role,
            vec4: FourMomentum::at_rest(data.mass),
            rxn_point: Point3::origin(),
            theta_cm: 0.0,
            detection: Detection::default(),
        })
    }

    pub fn set_vec4_spherical(&mut self, theta: f64, phi: f64, p: f64, e: f64) {
        self.vec4 = FourMomentum::from_spherical(theta, phi, p, e);
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.vec4.kinetic_energy()
    }

    /// Invariant mass above the ground state.
    pub fn excitation_energy(&self) -> f64 {
        self.vec4.mass() - self.ground_state_mass
    }

    pub fn theta(&self) -> f64 {
        self.vec4.theta()
    }

    pub fn phi(&self) -> f64 {
        self.vec4.phi()
    }

    pub fn is_detected(&self) -> bool {
        self.detection.detected
    }

    pub fn reset_detection(&mut self) {
        self.detection = Detection::default();
    }
}
