// Relativistic two-body kinematics
//
// A `TwoBodyReaction` does not own any particles. It is bound to slot
// indices of a particle buffer held by the caller and writes four-momenta
// into those slots when asked to calculate.

use crate::error::{Result, SimError};
use crate::nucleus::Nucleus;
use crate::vec4::FourMomentum;

/// Indices of the particles taking part in one two-body step. A step without
/// a projectile is a decay of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSlots {
    pub target: usize,
    pub projectile: Option<usize>,
    pub ejectile: usize,
    pub residual: usize,
}

impl StepSlots {
    pub fn reaction(target: usize, projectile: usize, ejectile: usize, residual: usize) -> Self {
        Self {
            target,
            projectile: Some(projectile),
            ejectile,
            residual,
        }
    }

    pub fn decay(parent: usize, light: usize, heavy: usize) -> Self {
        Self {
            target: parent,
            projectile: None,
            ejectile: light,
            residual: heavy,
        }
    }

    fn max_index(&self) -> usize {
        let m = self.target.max(self.ejectile).max(self.residual);
        match self.projectile {
            Some(p) => m.max(p),
            None => m,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TwoBodyReaction {
    slots: Option<StepSlots>,
    beam_kinetic_energy: f64,
    beam_theta: f64,
    beam_phi: f64,
    theta_cm: f64,
    phi_cm: f64,
    excitation: f64,
}

impl TwoBodyReaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(slots: StepSlots) -> Self {
        let mut step = Self::new();
        step.bind(slots);
        step
    }

    pub fn bind(&mut self, slots: StepSlots) {
        self.slots = Some(slots);
    }

    pub fn is_bound(&self) -> bool {
        self.slots.is_some()
    }

    /// True when no projectile is bound. An unbound step is neither.
    pub fn is_decay(&self) -> bool {
        matches!(self.slots, Some(StepSlots { projectile: None, .. }))
    }

    pub fn set_beam_kinetic_energy(&mut self, energy: f64) {
        self.beam_kinetic_energy = energy;
    }

    pub fn set_beam_direction(&mut self, theta: f64, phi: f64) {
        self.beam_theta = theta;
        self.beam_phi = phi;
    }

    pub fn set_emission_angles(&mut self, theta_cm: f64, phi_cm: f64) {
        self.theta_cm = theta_cm;
        self.phi_cm = phi_cm;
    }

    /// Excitation energy of the residual in MeV
    pub fn set_excitation(&mut self, excitation: f64) {
        self.excitation = excitation;
    }

    fn checked_slots(&self, nuclei: &[Nucleus]) -> Result<StepSlots> {
        match self.slots {
            Some(slots) if slots.max_index() < nuclei.len() => Ok(slots),
            _ => Err(SimError::UnboundReaction),
        }
    }

    /// Fill the four-momenta of the bound particles.
    ///
    /// No feasibility check is made here; a configuration below threshold
    /// produces NaN kinematics. Call the matching threshold check first.
    pub fn calculate(&self, nuclei: &mut [Nucleus]) -> Result<()> {
        let slots = self.checked_slots(nuclei)?;
        match slots.projectile {
            Some(projectile) => self.calculate_reaction(slots, projectile, nuclei),
            None => self.calculate_decay(slots, nuclei),
        }
        Ok(())
    }

    fn calculate_reaction(&self, slots: StepSlots, projectile: usize, nuclei: &mut [Nucleus]) {
        let target_mass = nuclei[slots.target].ground_state_mass;
        let projectile_mass = nuclei[projectile].ground_state_mass;
        let ejectile_mass = nuclei[slots.ejectile].ground_state_mass;
        let residual_mass = nuclei[slots.residual].ground_state_mass + self.excitation;

        nuclei[slots.target].vec4 = FourMomentum::at_rest(target_mass);
        let t = self.beam_kinetic_energy;
        let beam_p = (t * (t + 2.0 * projectile_mass)).sqrt();
        nuclei[projectile].set_vec4_spherical(
            self.beam_theta,
            self.beam_phi,
            beam_p,
            t + projectile_mass,
        );

        let parent = nuclei[slots.target].vec4 + nuclei[projectile].vec4;
        let ejectile = self.emit(&parent, ejectile_mass, residual_mass);
        nuclei[slots.residual].vec4 = parent - ejectile;

        // Rebuild the ejectile on its mass shell to remove drift from the boosts.
        let ke = ejectile.e - ejectile.mass();
        let p = (ke * (ke + 2.0 * ejectile_mass)).sqrt();
        nuclei[slots.ejectile].set_vec4_spherical(
            ejectile.theta(),
            ejectile.phi(),
            p,
            ke + ejectile_mass,
        );
        nuclei[slots.ejectile].theta_cm = self.theta_cm;
    }

    fn calculate_decay(&self, slots: StepSlots, nuclei: &mut [Nucleus]) {
        let ejectile_mass = nuclei[slots.ejectile].ground_state_mass;
        let residual_mass = nuclei[slots.residual].ground_state_mass + self.excitation;

        let parent = nuclei[slots.target].vec4;
        let ejectile = self.emit(&parent, ejectile_mass, residual_mass);
        nuclei[slots.ejectile].vec4 = ejectile;
        nuclei[slots.ejectile].theta_cm = self.theta_cm;
        nuclei[slots.residual].vec4 = parent - ejectile;
    }

    /// Ejectile four-momentum in the lab for a parent system splitting into
    /// `ejectile_mass` + `residual_mass` at the configured CM angles.
    fn emit(&self, parent: &FourMomentum, ejectile_mass: f64, residual_mass: f64) -> FourMomentum {
        let beta = parent.boost_to_cm();
        let sqrt_s = parent.boosted(&beta).e;
        let e_cm = (ejectile_mass.powi(2) - residual_mass.powi(2) + sqrt_s.powi(2)) / (2.0 * sqrt_s);
        let p_cm = (e_cm * e_cm - ejectile_mass * ejectile_mass).sqrt();
        FourMomentum::from_spherical(self.theta_cm, self.phi_cm, p_cm, e_cm).boosted(&-beta)
    }

    /// Whether a reaction with the given beam kinetic energy can populate the
    /// residual at `excitation`. Returns false for an unbound step or a decay.
    pub fn check_reaction_threshold(
        &self,
        nuclei: &[Nucleus],
        beam_energy: f64,
        excitation: f64,
    ) -> bool {
        let slots = match self.checked_slots(nuclei) {
            Ok(slots) => slots,
            Err(_) => return false,
        };
        let projectile = match slots.projectile {
            Some(p) => p,
            None => return false,
        };
        if excitation < 0.0 || beam_energy < 0.0 {
            return false;
        }

        let mt = nuclei[slots.target].ground_state_mass;
        let mp = nuclei[projectile].ground_state_mass;
        let me = nuclei[slots.ejectile].ground_state_mass;
        let mr = nuclei[slots.residual].ground_state_mass;

        let q = mt + mp - (me + mr + excitation);
        if q >= 0.0 {
            return true;
        }
        let threshold = -q * (me + mr) / (me + mr - mp);
        let s = mt * mt + mp * mp + 2.0 * mt * (beam_energy + mp);
        beam_energy > threshold && s.sqrt() > me + mr + excitation
    }

    /// Whether the bound parent, excited by `target_excitation`, can split
    /// into the ejectile and a residual excited by `residual_excitation`.
    pub fn check_decay_threshold(
        &self,
        nuclei: &[Nucleus],
        target_excitation: f64,
        residual_excitation: f64,
    ) -> bool {
        let slots = match self.checked_slots(nuclei) {
            Ok(slots) => slots,
            Err(_) => return false,
        };
        if target_excitation < 0.0 || residual_excitation < 0.0 {
            return false;
        }
        let q = nuclei[slots.target].ground_state_mass + target_excitation
            - nuclei[slots.ejectile].ground_state_mass
            - (nuclei[slots.residual].ground_state_mass + residual_excitation);
        q > 0.0
    }
}
