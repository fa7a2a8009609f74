// Energy loss of charged particles in matter
//
// The detector response and the reaction system only see the `EnergyLoss`
// trait. `Target` implements it for a compound material with a Bethe-Bloch
// stopping power integrated in small energy steps.

use crate::error::{Result, SimError};
use crate::mass_table::{MassTable, U_TO_MEV};
use serde::{Deserialize, Serialize};

/// Energy-loss provider. Energies in MeV, path lengths in metres.
pub trait EnergyLoss {
    /// Energy lost by a particle entering with `start_energy` over `path_length`.
    fn energy_loss(&self, z: u32, a: u32, start_energy: f64, path_length: f64) -> f64;

    /// Energy a particle must have lost over `path_length` to leave with
    /// `final_energy`.
    fn reverse_energy_loss(&self, z: u32, a: u32, final_energy: f64, path_length: f64) -> f64;

    /// Distance over which a particle slows from `start_energy` to `final_energy`.
    fn path_length(&self, z: u32, a: u32, start_energy: f64, final_energy: f64) -> f64;

    /// Width (radians) of the angular straggling distribution.
    fn angular_straggling(&self, z: u32, a: u32, energy: f64, path_length: f64) -> f64;
}

impl<T: EnergyLoss + ?Sized> EnergyLoss for &T {
    fn energy_loss(&self, z: u32, a: u32, start_energy: f64, path_length: f64) -> f64 {
        (**self).energy_loss(z, a, start_energy, path_length)
    }

    fn reverse_energy_loss(&self, z: u32, a: u32, final_energy: f64, path_length: f64) -> f64 {
        (**self).reverse_energy_loss(z, a, final_energy, path_length)
    }

    fn path_length(&self, z: u32, a: u32, start_energy: f64, final_energy: f64) -> f64 {
        (**self).path_length(z, a, start_energy, final_energy)
    }

    fn angular_straggling(&self, z: u32, a: u32, energy: f64, path_length: f64) -> f64 {
        (**self).angular_straggling(z, a, energy, path_length)
    }
}

const BETHE_K: f64 = 0.307075; // MeV cm^2 / mol
const ELECTRON_MASS_MEV: f64 = 0.5109989461;
const MAX_STEP_FRACTION: f64 = 0.01;
const STOPPED_ENERGY: f64 = 1.0e-4;
const MAX_STEPS: usize = 100_000;
const SEARCH_ITERATIONS: usize = 50;
const SEARCH_DOUBLINGS: usize = 60;

/// One element of a compound target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetElement {
    pub z: u32,
    pub a: u32,
    /// Atoms of this element per molecule
    pub stoichiometry: u32,
}

impl TargetElement {
    pub fn new(z: u32, a: u32, stoichiometry: u32) -> Self {
        Self {
            z,
            a,
            stoichiometry,
        }
    }

    /// Mean excitation energy in MeV
    fn mean_excitation(&self) -> f64 {
        let z = self.z as f64;
        let ev = if self.z == 1 {
            19.2
        } else if self.z < 13 {
            11.2 + 11.7 * z
        } else {
            52.8 + 8.71 * z
        };
        ev * 1.0e-6
    }

    /// Radiation length in g/cm^2
    fn radiation_length(&self) -> f64 {
        let z = self.z as f64;
        716.408 * self.a as f64 / (z * (z + 1.0) * (287.0 / z.sqrt()).ln())
    }
}

/// A homogeneous compound material.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    elements: Vec<TargetElement>,
    /// Mass fraction of each element
    fractions: Vec<f64>,
    /// g/cm^3
    density: f64,
    radiation_length: f64,
}

impl Target {
    pub fn new(elements: Vec<TargetElement>, density: f64) -> Result<Self> {
        if elements.is_empty() {
            return Err(SimError::InvalidMaterial("no elements".to_string()));
        }
        if !(density > 0.0) {
            return Err(SimError::InvalidMaterial(format!(
                "density must be positive, got {}",
                density
            )));
        }
        for element in &elements {
            if element.z == 0 || element.a < element.z || element.stoichiometry == 0 {
                return Err(SimError::InvalidMaterial(format!(
                    "bad element (Z={}, A={}, stoichiometry={})",
                    element.z, element.a, element.stoichiometry
                )));
            }
        }

        let total: f64 = elements
            .iter()
            .map(|e| e.stoichiometry as f64 * e.a as f64)
            .sum();
        let fractions: Vec<f64> = elements
            .iter()
            .map(|e| e.stoichiometry as f64 * e.a as f64 / total)
            .collect();
        let inverse_x0: f64 = elements
            .iter()
            .zip(&fractions)
            .map(|(e, w)| w / e.radiation_length())
            .sum();

        Ok(Self {
            elements,
            fractions,
            density,
            radiation_length: 1.0 / inverse_x0,
        })
    }

    /// Natural silicon at 2.33 g/cm^3.
    pub fn silicon() -> Self {
        Self {
            elements: vec![TargetElement::new(14, 28, 1)],
            fractions: vec![1.0],
            density: 2.33,
            radiation_length: TargetElement::new(14, 28, 1).radiation_length(),
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn elements(&self) -> &[TargetElement] {
        &self.elements
    }

    fn projectile_mass(z: u32, a: u32) -> f64 {
        MassTable::global()
            .find_mass(z, a)
            .unwrap_or(a as f64 * U_TO_MEV)
    }

    /// Linear stopping power in MeV/m.
    fn stopping_power(&self, z: u32, mass: f64, energy: f64) -> f64 {
        if energy <= 0.0 {
            return 0.0;
        }
        let gamma = 1.0 + energy / mass;
        let beta2 = 1.0 - 1.0 / (gamma * gamma);
        let beta = beta2.sqrt();
        let zp = z as f64;
        let z_eff = zp * (1.0 - (-125.0 * beta * zp.powf(-2.0 / 3.0)).exp());
        let mass_stopping: f64 = self
            .elements
            .iter()
            .zip(&self.fractions)
            .map(|(element, w)| {
                let arg = 2.0 * ELECTRON_MASS_MEV * beta2 * gamma * gamma / element.mean_excitation();
                let log_term = (arg.ln() - beta2).max(0.1);
                w * element.z as f64 / element.a as f64 * log_term
            })
            .sum();
        BETHE_K * z_eff * z_eff / beta2 * mass_stopping * self.density * 100.0
    }

    /// Energy after crossing `path_length`, integrating forwards.
    fn exit_energy(&self, z: u32, mass: f64, start_energy: f64, path_length: f64) -> f64 {
        let mut energy = start_energy;
        let mut remaining = path_length;
        let mut steps = 0;
        while remaining > 0.0 && steps < MAX_STEPS {
            if energy < STOPPED_ENERGY {
                return 0.0;
            }
            let dedx = self.stopping_power(z, mass, energy);
            if dedx <= 0.0 {
                break;
            }
            let dx = remaining.min(MAX_STEP_FRACTION * energy / dedx);
            energy -= dedx * dx;
            remaining -= dx;
            steps += 1;
        }
        energy.max(0.0)
    }
}

impl EnergyLoss for Target {
    fn energy_loss(&self, z: u32, a: u32, start_energy: f64, path_length: f64) -> f64 {
        if start_energy <= 0.0 || path_length <= 0.0 {
            return 0.0;
        }
        let mass = Self::projectile_mass(z, a);
        start_energy - self.exit_energy(z, mass, start_energy, path_length)
    }

    fn reverse_energy_loss(&self, z: u32, a: u32, final_energy: f64, path_length: f64) -> f64 {
        if final_energy <= STOPPED_ENERGY || path_length <= 0.0 {
            return 0.0;
        }
        let mass = Self::projectile_mass(z, a);
        let mut energy = final_energy;
        let mut remaining = path_length;
        let mut steps = 0;
        while remaining > 0.0 && steps < MAX_STEPS {
            let dedx = self.stopping_power(z, mass, energy);
            if dedx <= 0.0 {
                break;
            }
            let dx = remaining.min(MAX_STEP_FRACTION * energy / dedx);
            energy += dedx * dx;
            remaining -= dx;
            steps += 1;
        }
        energy - final_energy
    }

    fn path_length(&self, z: u32, a: u32, start_energy: f64, final_energy: f64) -> f64 {
        if start_energy <= 0.0 || final_energy >= start_energy {
            return 0.0;
        }
        let final_energy = final_energy.max(0.0);
        let mass = Self::projectile_mass(z, a);
        let exit = |x: f64| self.exit_energy(z, mass, start_energy, x);

        let mut low = 0.0;
        let mut high = 1.0e-3;
        let mut doublings = 0;
        while exit(high) > final_energy && doublings < SEARCH_DOUBLINGS {
            low = high;
            high *= 2.0;
            doublings += 1;
        }
        for _ in 0..SEARCH_ITERATIONS {
            let mid = 0.5 * (low + high);
            if exit(mid) > final_energy {
                low = mid;
            } else {
                high = mid;
            }
        }
        0.5 * (low + high)
    }

    fn angular_straggling(&self, z: u32, a: u32, energy: f64, path_length: f64) -> f64 {
        if energy <= 0.0 || path_length <= 0.0 {
            return 0.0;
        }
        let mass = Self::projectile_mass(z, a);
        let p = (energy * (energy + 2.0 * mass)).sqrt();
        let beta = p / (energy + mass);
        let zp = z as f64;
        let areal_density = self.density * path_length * 100.0;
        let t = areal_density / self.radiation_length;
        let correction = (1.0 + 0.038 * (t * zp * zp / (beta * beta)).ln()).max(0.0);
        13.6 / (beta * p) * zp * t.sqrt() * correction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helium_gas() -> Target {
        Target::new(vec![TargetElement::new(2, 4, 1)], 1.6e-4).unwrap()
    }

    #[test]
    fn test_invalid_material() {
        assert!(Target::new(vec![], 1.0).is_err());
        assert!(Target::new(vec![TargetElement::new(2, 4, 1)], 0.0).is_err());
        assert!(Target::new(vec![TargetElement::new(2, 4, 0)], 1.0).is_err());
    }

    #[test]
    fn test_proton_range_in_silicon() {
        // 5 MeV protons stop in roughly a fifth of a millimetre of silicon
        let si = Target::silicon();
        let range = si.path_length(1, 1, 5.0, 0.0);
        assert!(range > 1.0e-4 && range < 4.0e-4, "range {}", range);
        assert!((si.energy_loss(1, 1, 5.0, 2.0 * range) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_length_inverts_energy_loss() {
        let si = Target::silicon();
        let x = si.path_length(1, 1, 8.0, 6.0);
        let loss = si.energy_loss(1, 1, 8.0, x);
        assert!((loss - 2.0).abs() < 0.02, "loss {}", loss);
    }

    #[test]
    fn test_reverse_energy_loss() {
        let si = Target::silicon();
        let loss = si.energy_loss(2, 4, 20.0, 5.0e-5);
        assert!(loss > 0.0 && loss < 20.0);
        let reverse = si.reverse_energy_loss(2, 4, 20.0 - loss, 5.0e-5);
        assert!((reverse - loss).abs() / loss < 0.02, "{} vs {}", reverse, loss);
        assert_eq!(si.reverse_energy_loss(2, 4, 0.0, 5.0e-5), 0.0);
    }

    #[test]
    fn test_heavier_ions_lose_more() {
        let gas = helium_gas();
        let proton = gas.energy_loss(1, 1, 5.0, 0.1);
        let alpha = gas.energy_loss(2, 4, 5.0, 0.1);
        assert!(proton > 0.0);
        assert!(alpha > proton);
    }

    #[test]
    fn test_zero_inputs() {
        let gas = helium_gas();
        assert_eq!(gas.energy_loss(1, 1, 0.0, 0.1), 0.0);
        assert_eq!(gas.energy_loss(1, 1, 5.0, 0.0), 0.0);
        assert_eq!(gas.path_length(1, 1, 5.0, 6.0), 0.0);
        assert_eq!(gas.angular_straggling(1, 1, 5.0, 0.0), 0.0);
    }

    #[test]
    fn test_straggling_grows_with_thickness() {
        let si = Target::silicon();
        let thin = si.angular_straggling(1, 1, 10.0, 1.0e-5);
        let thick = si.angular_straggling(1, 1, 10.0, 1.0e-4);
        assert!(thin > 0.0);
        assert!(thick > thin);
        assert!(thick < 0.1);
    }
}
