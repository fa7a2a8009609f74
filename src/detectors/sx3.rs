// Super X3 resistive strip sensor
//
// Unrotated frame, looking from outside the barrel towards the beam axis:
//
//   0--------------------------2
//   |                          |
//   |     strip s (front)      |        y
//   |                          |        ^
//   1--------------------------3        |
//                                       +----> z
//
// Front strips run along z and are stacked in y. Back strips are segments
// along z spanning the full width. The sensor face lies in the plane
// x = rho and is rotated by phi about the beam axis.

use super::{SmearMode, GEOMETRY_EPSILON};
use crate::vec4::spherical_direction;
use nalgebra::{Point3, Rotation3, Vector3};
use rand::Rng;

pub const STRIP_COUNT: usize = 4;
pub const CORNER_COUNT: usize = 4;
/// Active length along the beam axis (m)
pub const TOTAL_LENGTH: f64 = 0.075;
/// Active width across the strips (m)
pub const TOTAL_WIDTH: f64 = 0.0403;
pub const FRONT_STRIP_WIDTH: f64 = TOTAL_WIDTH / STRIP_COUNT as f64;
pub const BACK_STRIP_LENGTH: f64 = TOTAL_LENGTH / STRIP_COUNT as f64;

/// Channels crossed by a trajectory. `ratio` is the position along the
/// front strip, -1 at the upstream end and +1 at the downstream end.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StripHit {
    pub front: Option<usize>,
    pub ratio: f64,
    pub back: Option<usize>,
}

impl StripHit {
    pub fn is_hit(&self) -> bool {
        self.front.is_some()
    }
}

type Corners = [[Point3<f64>; CORNER_COUNT]; STRIP_COUNT];

#[derive(Debug, Clone)]
pub struct StripDetector {
    center_phi: f64,
    center_z: f64,
    center_rho: f64,
    rotation: Rotation3<f64>,
    front_corners: Corners,
    back_corners: Corners,
    rotated_front_corners: Corners,
    rotated_back_corners: Corners,
    normal: Vector3<f64>,
    mode: SmearMode,
}

impl StripDetector {
    pub fn new(center_phi: f64, center_z: f64, center_rho: f64, mode: SmearMode) -> Self {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), center_phi);
        let z_min = center_z - TOTAL_LENGTH / 2.0;
        let z_max = center_z + TOTAL_LENGTH / 2.0;
        let rect = |y_min: f64, y_max: f64, z_lo: f64, z_hi: f64| {
            [
                Point3::new(center_rho, y_min, z_hi),
                Point3::new(center_rho, y_min, z_lo),
                Point3::new(center_rho, y_max, z_hi),
                Point3::new(center_rho, y_max, z_lo),
            ]
        };

        let mut front_corners = [[Point3::origin(); CORNER_COUNT]; STRIP_COUNT];
        let mut back_corners = [[Point3::origin(); CORNER_COUNT]; STRIP_COUNT];
        for s in 0..STRIP_COUNT {
            let y_min = -TOTAL_WIDTH / 2.0 + s as f64 * FRONT_STRIP_WIDTH;
            front_corners[s] = rect(y_min, y_min + FRONT_STRIP_WIDTH, z_min, z_max);
            let z_lo = z_min + s as f64 * BACK_STRIP_LENGTH;
            back_corners[s] = rect(
                -TOTAL_WIDTH / 2.0,
                TOTAL_WIDTH / 2.0,
                z_lo,
                z_lo + BACK_STRIP_LENGTH,
            );
        }

        let rotate = |corners: &Corners| corners.map(|strip| strip.map(|p| rotation * p));
        Self {
            center_phi,
            center_z,
            center_rho,
            rotation,
            rotated_front_corners: rotate(&front_corners),
            rotated_back_corners: rotate(&back_corners),
            front_corners,
            back_corners,
            normal: rotation * Vector3::x(),
            mode,
        }
    }

    pub fn center_phi(&self) -> f64 {
        self.center_phi
    }

    pub fn center_z(&self) -> f64 {
        self.center_z
    }

    pub fn center_rho(&self) -> f64 {
        self.center_rho
    }

    /// Outward normal of the sensor face in the lab frame.
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn front_corner(&self, strip: usize, corner: usize) -> Option<Point3<f64>> {
        self.rotated_front_corners.get(strip)?.get(corner).copied()
    }

    pub fn back_corner(&self, strip: usize, corner: usize) -> Option<Point3<f64>> {
        self.rotated_back_corners.get(strip)?.get(corner).copied()
    }

    fn valid_channel(front: usize) -> bool {
        front < STRIP_COUNT
    }

    fn valid_ratio(ratio: f64) -> bool {
        (-1.0..=1.0).contains(&ratio)
    }

    /// Lab position of a front-strip hit at `ratio` along the strip.
    pub fn hit_coordinates<R: Rng + ?Sized>(
        &self,
        front: usize,
        ratio: f64,
        rng: &mut R,
    ) -> Option<Point3<f64>> {
        if !Self::valid_channel(front) || !Self::valid_ratio(ratio) {
            return None;
        }
        let offset = match self.mode {
            SmearMode::Fixed => 0.5,
            SmearMode::Smeared => rng.gen::<f64>(),
        };
        Some(self.local_to_lab(front, offset, ratio))
    }

    /// Centre of the front strip at `ratio`, independent of the smear mode.
    pub fn channel_center(&self, front: usize, ratio: f64) -> Option<Point3<f64>> {
        if !Self::valid_channel(front) || !Self::valid_ratio(ratio) {
            return None;
        }
        Some(self.local_to_lab(front, 0.5, ratio))
    }

    fn local_to_lab(&self, front: usize, offset: f64, ratio: f64) -> Point3<f64> {
        let y = -TOTAL_WIDTH / 2.0 + (front as f64 + offset) * FRONT_STRIP_WIDTH;
        let z = ratio * TOTAL_LENGTH / 2.0 + self.center_z;
        self.rotation * Point3::new(self.center_rho, y, z)
    }

    /// Intersection of the sensor face with the ray leaving `origin` along
    /// (theta, phi), in the lab frame.
    pub fn intersection(&self, origin: &Point3<f64>, theta: f64, phi: f64) -> Option<Point3<f64>> {
        let direction = spherical_direction(theta, phi);
        let denom = self.normal.dot(&direction);
        if denom.abs() < 1e-12 {
            return None;
        }
        let corner = self.rotated_front_corners[0][0];
        let t = (self.normal.dot(&corner.coords) - self.normal.dot(&origin.coords)) / denom;
        if t <= 0.0 {
            return None;
        }
        Some(origin + direction * t)
    }

    /// Front and back channels crossed by the ray leaving `origin` along
    /// (theta, phi). Points on a boundary between two strips go to the
    /// first strip in search order.
    pub fn channel_ratio(&self, origin: &Point3<f64>, theta: f64, phi: f64) -> StripHit {
        let mut hit = StripHit::default();
        let lab = match self.intersection(origin, theta, phi) {
            Some(p) => p,
            None => return hit,
        };
        let local = self.rotation.inverse() * lab;
        if (local.x - self.center_rho).abs() > GEOMETRY_EPSILON {
            return hit;
        }

        let contains = |corners: &[Point3<f64>; CORNER_COUNT]| {
            local.y >= corners[1].y
                && local.y <= corners[2].y
                && local.z >= corners[1].z
                && local.z <= corners[0].z
        };
        if let Some(s) = self.front_corners.iter().position(contains) {
            hit.front = Some(s);
            hit.ratio = (local.z - self.center_z) / (TOTAL_LENGTH / 2.0);
        }
        hit.back = self.back_corners.iter().position(contains);
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec4::point_angles;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_2;

    fn detector(mode: SmearMode) -> StripDetector {
        StripDetector::new(0.785398, 0.504, 0.0890354, mode)
    }

    #[test]
    fn test_front_strips_tile_width() {
        let d = detector(SmearMode::Fixed);
        for s in 0..STRIP_COUNT - 1 {
            let upper = d.front_corners[s][2].y;
            let lower_next = d.front_corners[s + 1][1].y;
            assert!((upper - lower_next).abs() < 1e-12);
        }
        assert!((d.front_corners[0][1].y + TOTAL_WIDTH / 2.0).abs() < 1e-12);
        assert!((d.front_corners[3][2].y - TOTAL_WIDTH / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_preserves_z() {
        let d = detector(SmearMode::Fixed);
        for s in 0..STRIP_COUNT {
            for c in 0..CORNER_COUNT {
                let rotated = d.front_corner(s, c).unwrap();
                assert!((rotated.z - d.front_corners[s][c].z).abs() < 1e-12);
            }
        }
        assert!(d.front_corner(4, 0).is_none());
    }

    #[test]
    fn test_round_trip_every_strip() {
        let d = detector(SmearMode::Fixed);
        for s in 0..STRIP_COUNT {
            for &ratio in &[-0.8, -0.3, 0.1, 0.45, 0.9] {
                let point = d.channel_center(s, ratio).unwrap();
                let (theta, phi) = point_angles(&point);
                let hit = d.channel_ratio(&Point3::origin(), theta, phi);
                assert_eq!(hit.front, Some(s));
                assert!((hit.ratio - ratio).abs() < 1e-9);
                let back = ((ratio + 1.0) / 2.0 * STRIP_COUNT as f64).floor() as usize;
                assert_eq!(hit.back, Some(back.min(STRIP_COUNT - 1)));
            }
        }
    }

    #[test]
    fn test_invalid_channel_or_ratio() {
        let d = detector(SmearMode::Fixed);
        let mut rng = StdRng::seed_from_u64(42);
        assert!(d.hit_coordinates(4, 0.0, &mut rng).is_none());
        assert!(d.hit_coordinates(0, 1.5, &mut rng).is_none());
        assert!(d.channel_center(0, -1.01).is_none());
    }

    #[test]
    fn test_smeared_hit_stays_in_strip() {
        let d = detector(SmearMode::Smeared);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let point = d.hit_coordinates(2, 0.25, &mut rng).unwrap();
            let (theta, phi) = point_angles(&point);
            let hit = d.channel_ratio(&Point3::origin(), theta, phi);
            assert_eq!(hit.front, Some(2));
        }
    }

    #[test]
    fn test_ray_away_from_sensor_misses() {
        let d = detector(SmearMode::Fixed);
        let point = d.channel_center(1, 0.0).unwrap();
        let (theta, phi) = point_angles(&point);
        // Opposite direction crosses the plane behind the origin
        let hit = d.channel_ratio(&Point3::origin(), std::f64::consts::PI - theta, phi + std::f64::consts::PI);
        assert!(!hit.is_hit());
        assert!(hit.back.is_none());
    }

    #[test]
    fn test_ray_along_beam_misses() {
        let d = detector(SmearMode::Fixed);
        let hit = d.channel_ratio(&Point3::origin(), 0.0, 0.0);
        assert!(!hit.is_hit());
        let side = d.channel_ratio(&Point3::origin(), FRAC_PI_2, 0.785398 + FRAC_PI_2);
        assert!(!side.is_hit());
    }

    #[test]
    fn test_normal_points_outward() {
        let d = detector(SmearMode::Fixed);
        let center = d.channel_center(1, 0.0).unwrap();
        let radial = Vector3::new(center.x, center.y, 0.0).normalize();
        assert!(d.normal().dot(&radial) > 0.99);
    }
}
