// QQQ annular sensor: one quadrant of a ring/wedge segmented disk
// perpendicular to the beam axis.

use super::SmearMode;
use crate::vec4::spherical_direction;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

pub const RING_COUNT: usize = 16;
pub const WEDGE_COUNT: usize = 16;
/// Inner active radius (m)
pub const INNER_RADIUS: f64 = 0.0501;
/// Outer active radius (m)
pub const OUTER_RADIUS: f64 = 0.0990;
pub const RING_PITCH: f64 = (OUTER_RADIUS - INNER_RADIUS) / RING_COUNT as f64;
/// Azimuthal coverage of one sensor
pub const COVERAGE: f64 = FRAC_PI_2;
pub const WEDGE_PITCH: f64 = COVERAGE / WEDGE_COUNT as f64;

/// Ring and wedge crossed by a trajectory. Ring 0 is innermost, wedge 0 is
/// at the low-azimuth edge of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingWedgeHit {
    pub ring: usize,
    pub wedge: usize,
}

#[derive(Debug, Clone)]
pub struct AnnularDetector {
    center_phi: f64,
    z: f64,
    phi_min: f64,
    mode: SmearMode,
}

impl AnnularDetector {
    pub fn new(center_phi: f64, z: f64, mode: SmearMode) -> Self {
        Self {
            center_phi,
            z,
            phi_min: center_phi - FRAC_PI_4,
            mode,
        }
    }

    pub fn center_phi(&self) -> f64 {
        self.center_phi
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn normal(&self) -> Vector3<f64> {
        Vector3::z()
    }

    fn polar_point(&self, r: f64, phi: f64) -> Point3<f64> {
        Point3::new(r * phi.cos(), r * phi.sin(), self.z)
    }

    /// Corners of a ring: 0 and 1 on the inner radius, 2 and 3 on the outer,
    /// even indices at the low-azimuth edge.
    pub fn ring_corner(&self, ring: usize, corner: usize) -> Option<Point3<f64>> {
        if ring >= RING_COUNT || corner >= 4 {
            return None;
        }
        let r = INNER_RADIUS + (ring + corner / 2) as f64 * RING_PITCH;
        let phi = self.phi_min + (corner % 2) as f64 * COVERAGE;
        Some(self.polar_point(r, phi))
    }

    /// Corners of a wedge, same ordering as [`AnnularDetector::ring_corner`].
    pub fn wedge_corner(&self, wedge: usize, corner: usize) -> Option<Point3<f64>> {
        if wedge >= WEDGE_COUNT || corner >= 4 {
            return None;
        }
        let r = if corner < 2 { INNER_RADIUS } else { OUTER_RADIUS };
        let phi = self.phi_min + (wedge + corner % 2) as f64 * WEDGE_PITCH;
        Some(self.polar_point(r, phi))
    }

    pub fn hit_coordinates<R: Rng + ?Sized>(
        &self,
        ring: usize,
        wedge: usize,
        rng: &mut R,
    ) -> Option<Point3<f64>> {
        if ring >= RING_COUNT || wedge >= WEDGE_COUNT {
            return None;
        }
        let (ring_offset, wedge_offset) = match self.mode {
            SmearMode::Fixed => (0.5, 0.5),
            SmearMode::Smeared => (rng.gen::<f64>(), rng.gen::<f64>()),
        };
        Some(self.channel_point(ring, wedge, ring_offset, wedge_offset))
    }

    pub fn channel_center(&self, ring: usize, wedge: usize) -> Option<Point3<f64>> {
        if ring >= RING_COUNT || wedge >= WEDGE_COUNT {
            return None;
        }
        Some(self.channel_point(ring, wedge, 0.5, 0.5))
    }

    fn channel_point(&self, ring: usize, wedge: usize, ring_offset: f64, wedge_offset: f64) -> Point3<f64> {
        let r = INNER_RADIUS + (ring as f64 + ring_offset) * RING_PITCH;
        let phi = self.phi_min + (wedge as f64 + wedge_offset) * WEDGE_PITCH;
        self.polar_point(r, phi)
    }

    /// Lab intersection of the ray with the sensor plane, if in front of
    /// the origin.
    pub fn intersection(&self, origin: &Point3<f64>, theta: f64, phi: f64) -> Option<Point3<f64>> {
        let direction = spherical_direction(theta, phi);
        if direction.z.abs() < 1e-12 {
            return None;
        }
        let t = (self.z - origin.z) / direction.z;
        if t <= 0.0 {
            return None;
        }
        Some(origin + direction * t)
    }

    pub fn ring_wedge(&self, origin: &Point3<f64>, theta: f64, phi: f64) -> Option<RingWedgeHit> {
        let hit = self.intersection(origin, theta, phi)?;
        let r = hit.x.hypot(hit.y);
        if !(INNER_RADIUS..=OUTER_RADIUS).contains(&r) {
            return None;
        }
        let local_phi = (hit.y.atan2(hit.x) - self.phi_min).rem_euclid(2.0 * PI);
        if local_phi > COVERAGE {
            return None;
        }
        let ring = (((r - INNER_RADIUS) / RING_PITCH) as usize).min(RING_COUNT - 1);
        let wedge = ((local_phi / WEDGE_PITCH) as usize).min(WEDGE_COUNT - 1);
        Some(RingWedgeHit { ring, wedge })
    }
}
