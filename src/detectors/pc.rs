// Proportional counter: anode wires on a cylinder around the beam axis.

use crate::vec4::spherical_direction;
use nalgebra::Point3;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

pub const WIRE_COUNT: usize = 24;
/// Radius of the anode cylinder (m)
pub const WIRE_RADIUS: f64 = 0.03846264509;
pub const WIRE_DELTA_PHI: f64 = 2.0 * PI / WIRE_COUNT as f64;
/// Axial position resolution for protons (m)
pub const Z_SIGMA_PROTON: f64 = 0.066666;
/// Axial position resolution for every other species (m)
pub const Z_SIGMA_OTHER: f64 = 0.033333333;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireHit {
    pub wire: usize,
    /// Wire position at the crossing depth
    pub position: Point3<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct WireChamber;

impl WireChamber {
    pub fn new() -> Self {
        Self
    }

    pub fn wire_phi(wire: usize) -> f64 {
        (wire % WIRE_COUNT) as f64 * WIRE_DELTA_PHI
    }

    pub fn wire_position(wire: usize, z: f64) -> Point3<f64> {
        let phi = Self::wire_phi(wire);
        Point3::new(WIRE_RADIUS * phi.cos(), WIRE_RADIUS * phi.sin(), z)
    }

    pub fn contains(origin: &Point3<f64>) -> bool {
        origin.x.hypot(origin.y) < WIRE_RADIUS
    }

    /// Crossing of the wire cylinder by the ray leaving `origin` along
    /// (theta, phi), snapped to the nearest wire.
    ///
    /// The origin must be inside the cylinder. Rays along the beam axis
    /// never cross it.
    pub fn intersect(&self, origin: &Point3<f64>, theta: f64, phi: f64) -> Option<WireHit> {
        if !Self::contains(origin) {
            return None;
        }
        let direction = spherical_direction(theta, phi);
        let a = direction.x * direction.x + direction.y * direction.y;
        if a < 1e-12 {
            return None;
        }
        let b = 2.0 * (origin.x * direction.x + origin.y * direction.y);
        let c = origin.x * origin.x + origin.y * origin.y - WIRE_RADIUS * WIRE_RADIUS;
        let radicand = b * b - 4.0 * a * c;
        if radicand < 0.0 {
            return None;
        }
        let t = (-b + radicand.sqrt()) / (2.0 * a);
        if t <= 0.0 {
            return None;
        }
        let crossing = origin + direction * t;

        let crossing_phi = crossing.y.atan2(crossing.x).rem_euclid(2.0 * PI);
        let wire = ((crossing_phi / WIRE_DELTA_PHI).round() as usize) % WIRE_COUNT;
        Some(WireHit {
            wire,
            position: Self::wire_position(wire, crossing.z),
        })
    }

    /// As [`WireChamber::intersect`], with the axial coordinate smeared by
    /// the species-dependent resolution.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        origin: &Point3<f64>,
        theta: f64,
        phi: f64,
        z: u32,
        a: u32,
        rng: &mut R,
    ) -> Option<WireHit> {
        let mut hit = self.intersect(origin, theta, phi)?;
        let sigma = if z == 1 && a == 1 {
            Z_SIGMA_PROTON
        } else {
            Z_SIGMA_OTHER
        };
        let noise: f64 = rng.sample(StandardNormal);
        hit.position.z += sigma * noise;
        Some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_perpendicular_crossing() {
        let pc = WireChamber::new();
        let hit = pc.intersect(&Point3::new(0.0, 0.0, 0.1), FRAC_PI_2, 0.0).unwrap();
        assert_eq!(hit.wire, 0);
        assert!((hit.position.x - WIRE_RADIUS).abs() < 1e-12);
        assert!((hit.position.z - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_wire() {
        let pc = WireChamber::new();
        let phi = 5.2 * WIRE_DELTA_PHI;
        let hit = pc.intersect(&Point3::origin(), 1.0, phi).unwrap();
        assert_eq!(hit.wire, 5);
        let z = WIRE_RADIUS / 1.0f64.tan();
        assert!((hit.position.z - z).abs() < 1e-9);

        // Just below 2*pi rounds onto wire 0
        let hit = pc.intersect(&Point3::origin(), 1.0, -0.1 * WIRE_DELTA_PHI).unwrap();
        assert_eq!(hit.wire, 0);
    }

    #[test]
    fn test_off_axis_origin() {
        let pc = WireChamber::new();
        let origin = Point3::new(0.01, 0.0, 0.0);
        let hit = pc.intersect(&origin, FRAC_PI_2, FRAC_PI_2).unwrap();
        let expected_y = (WIRE_RADIUS * WIRE_RADIUS - 0.01 * 0.01).sqrt();
        let expected_wire = ((expected_y.atan2(0.01) / WIRE_DELTA_PHI).round()) as usize;
        assert_eq!(hit.wire, expected_wire);
    }

    #[test]
    fn test_misses() {
        let pc = WireChamber::new();
        assert!(pc.intersect(&Point3::origin(), 0.0, 0.0).is_none());
        assert!(pc.intersect(&Point3::new(0.05, 0.0, 0.0), 1.0, 0.0).is_none());
    }

    #[test]
    fn test_axial_smear_width_by_species() {
        let pc = WireChamber::new();
        let mut rng = StdRng::seed_from_u64(42);
        let spread = |z: u32, a: u32, rng: &mut StdRng| {
            let n = 4000;
            let sum_sq: f64 = (0..n)
                .map(|_| {
                    let hit = pc.assign(&Point3::origin(), FRAC_PI_2, 0.3, z, a, &mut *rng).unwrap();
                    hit.position.z * hit.position.z
                })
                .sum();
            (sum_sq / n as f64).sqrt()
        };
        let proton = spread(1, 1, &mut rng);
        let alpha = spread(2, 4, &mut rng);
        assert!((proton - Z_SIGMA_PROTON).abs() < 0.1 * Z_SIGMA_PROTON, "{}", proton);
        assert!((alpha - Z_SIGMA_OTHER).abs() < 0.1 * Z_SIGMA_OTHER, "{}", alpha);
        let deuteron = spread(1, 2, &mut rng);
        assert!((deuteron - Z_SIGMA_OTHER).abs() < 0.1 * Z_SIGMA_OTHER);
    }
}
