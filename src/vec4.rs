// Relativistic four-vector algebra (natural units, MeV)

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// Four-momentum (px, py, pz, E) in MeV.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    pub p: Vector3<f64>,
    pub e: f64,
}

impl FourMomentum {
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            p: Vector3::new(px, py, pz),
            e,
        }
    }

    /// A particle of mass `mass` at rest.
    pub fn at_rest(mass: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, mass)
    }

    /// Build from spherical momentum components: polar angle `theta`,
    /// azimuth `phi`, momentum magnitude `p` and total energy `e`.
    pub fn from_spherical(theta: f64, phi: f64, p: f64, e: f64) -> Self {
        Self {
            p: spherical_direction(theta, phi) * p,
            e,
        }
    }

    /// Invariant mass. Space-like vectors return a negative value, matching
    /// the usual physics-library convention.
    pub fn mass(&self) -> f64 {
        let m2 = self.e * self.e - self.p.norm_squared();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    pub fn momentum(&self) -> f64 {
        self.p.norm()
    }

    /// Kinetic energy, E - M, evaluated as p² / (E + M) so that a slow
    /// heavy particle does not lose its energy to cancellation.
    pub fn kinetic_energy(&self) -> f64 {
        let mass = self.mass();
        let denominator = self.e + mass;
        if denominator > 0.0 {
            self.p.norm_squared() / denominator
        } else {
            self.e - mass
        }
    }

    pub fn theta(&self) -> f64 {
        polar_angles(&self.p).0
    }

    pub fn phi(&self) -> f64 {
        polar_angles(&self.p).1
    }

    /// Velocity of the frame in which this four-vector is at rest, negated:
    /// boosting by the returned vector takes the system to its
    /// center-of-momentum frame.
    pub fn boost_to_cm(&self) -> Vector3<f64> {
        -self.p / self.e
    }

    /// Apply a pure Lorentz boost with velocity `beta` (units of c).
    pub fn boosted(&self, beta: &Vector3<f64>) -> Self {
        let b2 = beta.norm_squared();
        if b2 <= 0.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = beta.dot(&self.p);
        let gamma2 = (gamma - 1.0) / b2;
        Self {
            p: self.p + beta * (gamma2 * bp + gamma * self.e),
            e: gamma * (self.e + bp),
        }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            p: self.p + rhs.p,
            e: self.e + rhs.e,
        }
    }
}

impl Sub for FourMomentum {
    type Output = FourMomentum;

    fn sub(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            p: self.p - rhs.p,
            e: self.e - rhs.e,
        }
    }
}

impl Neg for FourMomentum {
    type Output = FourMomentum;

    fn neg(self) -> FourMomentum {
        FourMomentum {
            p: -self.p,
            e: -self.e,
        }
    }
}

/// Unit vector for polar angle `theta` and azimuth `phi`.
pub fn spherical_direction(theta: f64, phi: f64) -> Vector3<f64> {
    let sin_theta = theta.sin();
    Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), theta.cos())
}

/// (theta, phi) of a vector. phi is in (-pi, pi]; a null vector gives (0, 0).
pub fn polar_angles(v: &Vector3<f64>) -> (f64, f64) {
    let rho = v.x.hypot(v.y);
    if rho == 0.0 && v.z == 0.0 {
        return (0.0, 0.0);
    }
    (rho.atan2(v.z), v.y.atan2(v.x))
}

/// (theta, phi) of a point seen from the coordinate origin.
pub fn point_angles(point: &Point3<f64>) -> (f64, f64) {
    polar_angles(&point.coords)
}
