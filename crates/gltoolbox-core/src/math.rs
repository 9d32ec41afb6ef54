//! Vector math helpers and spherical coordinates.
//!
//! All angles taken or returned by this module are in degrees. Spherical
//! coordinates use the physics convention: `phi` is the azimuth measured in
//! the XY plane from +X, `theta` the polar angle measured from +Z.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolboxError};

/// Smallest polar angle a spherical coordinate may hold.
///
/// Keeps `theta` off the pole where the azimuth is undefined and a look-at
/// built from the eye position degenerates.
pub const MIN_THETA: f64 = 0.000_001;

/// Largest polar angle a spherical coordinate may hold.
pub const MAX_THETA: f64 = 180.0;

/// A cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All axes in X, Y, Z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the component index of this axis (0, 1 or 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Returns the unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }

    /// Returns display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Rotates `point` around this axis (through the origin) by `angle` degrees.
    ///
    /// Uses the standard right-handed rotation matrices.
    #[must_use]
    pub fn rotate(self, point: DVec3, angle: f64) -> DVec3 {
        let (sin, cos) = angle.to_radians().sin_cos();
        match self {
            Axis::X => DVec3::new(
                point.x,
                point.y * cos - point.z * sin,
                point.y * sin + point.z * cos,
            ),
            Axis::Y => DVec3::new(
                point.x * cos + point.z * sin,
                point.y,
                -point.x * sin + point.z * cos,
            ),
            Axis::Z => DVec3::new(
                point.x * cos - point.y * sin,
                point.x * sin + point.y * cos,
                point.z,
            ),
        }
    }
}

/// A point in spherical coordinates, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    /// Distance from the origin.
    pub radius: f64,
    /// Azimuth in `[0, 360)`.
    pub phi: f64,
    /// Polar angle in `[MIN_THETA, 180]`.
    pub theta: f64,
}

impl Spherical {
    /// Creates a spherical coordinate without validating it.
    #[must_use]
    pub fn new(radius: f64, phi: f64, theta: f64) -> Self {
        Self { radius, phi, theta }
    }

    /// Converts to cartesian coordinates.
    #[must_use]
    pub fn to_cartesian(self) -> DVec3 {
        spherical_to_cartesian(self.radius, self.phi, self.theta)
    }

    /// Converts from cartesian coordinates.
    #[must_use]
    pub fn from_cartesian(point: DVec3) -> Self {
        cartesian_to_spherical(point)
    }
}

/// Converts spherical coordinates (degrees) to cartesian.
#[must_use]
pub fn spherical_to_cartesian(radius: f64, phi: f64, theta: f64) -> DVec3 {
    let (sin_phi, cos_phi) = phi.to_radians().sin_cos();
    let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
    DVec3::new(
        radius * sin_theta * cos_phi,
        radius * sin_theta * sin_phi,
        radius * cos_theta,
    )
}

/// Converts cartesian coordinates to spherical (degrees).
///
/// This is the `atan2` form of the piecewise `atan` derivation: for z > 0,
/// z = 0 and z < 0 the polar angle is `atan(rho/z)`, 90° and `180° + atan(rho/z)`
/// respectively, and the azimuth picks the quadrant from the signs of x and y.
/// Both forms agree everywhere except at the origin, which maps to
/// `theta = 90°, phi = 0°` as in the piecewise form. The polar angle is clamped
/// to `[MIN_THETA, 180]`; on the Z axis the azimuth is undefined and reported as 0.
#[must_use]
pub fn cartesian_to_spherical(point: DVec3) -> Spherical {
    let radius = point.length();
    let rho = point.x.hypot(point.y);

    let theta = if rho == 0.0 && point.z == 0.0 {
        90.0
    } else {
        rho.atan2(point.z).to_degrees()
    };
    let phi = wrap_degrees(point.y.atan2(point.x).to_degrees());

    Spherical {
        radius,
        phi,
        theta: clamp_theta(theta),
    }
}

/// Reduces an angle in degrees to `[0, 360)`.
#[must_use]
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Clamps a polar angle to `[MIN_THETA, MAX_THETA]`.
#[must_use]
pub fn clamp_theta(theta: f64) -> f64 {
    theta.clamp(MIN_THETA, MAX_THETA)
}

/// Returns the unit normal of the triangle `(a, b, c)`.
///
/// The normal is `(a - c) x (b - c)`, so counter-clockwise triangles face the
/// viewer. Negative zeros are flushed to positive zero.
///
/// # Errors
///
/// Returns [`ToolboxError::InvalidArgument`] if the points are collinear.
pub fn normal_3_points(a: DVec3, b: DVec3, c: DVec3) -> Result<DVec3> {
    let normal = (a - c).cross(b - c).try_normalize().ok_or_else(|| {
        ToolboxError::InvalidArgument(format!(
            "points {a}, {b}, {c} are collinear and have no normal"
        ))
    })?;
    Ok(DVec3::new(
        flush_negative_zero(normal.x),
        flush_negative_zero(normal.y),
        flush_negative_zero(normal.z),
    ))
}

fn flush_negative_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn assert_vec_eq(actual: DVec3, expected: DVec3) {
        assert!(
            actual.abs_diff_eq(expected, EPS),
            "expected {expected}, got {actual}"
        );
    }

    /// Smallest difference between two angles on the circle.
    fn angle_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_cross_product() {
        assert_eq!(DVec3::X.cross(DVec3::Y), DVec3::Z);
        assert_eq!(DVec3::Y.cross(DVec3::Z), DVec3::X);
        assert_eq!(DVec3::Y.cross(DVec3::X), -DVec3::Z);
    }

    #[test]
    fn test_vector_identities() {
        let v = DVec3::new(3.0, -4.0, 12.0);
        assert!((v.length() - 13.0).abs() < EPS);
        assert!((v.normalize().length() - 1.0).abs() < EPS);
        assert!((v.dot(v) - 169.0).abs() < EPS);
        assert_vec_eq(v * 2.0, DVec3::new(6.0, -8.0, 24.0));
        assert!(v.cross(DVec3::X).dot(v).abs() < EPS);
    }

    #[test]
    fn test_spherical_to_cartesian_axes() {
        assert_vec_eq(spherical_to_cartesian(1.0, 0.0, 90.0), DVec3::X);
        assert_vec_eq(spherical_to_cartesian(1.0, 90.0, 90.0), DVec3::Y);
        assert_vec_eq(spherical_to_cartesian(2.0, 0.0, 0.0), DVec3::new(0.0, 0.0, 2.0));
        assert_vec_eq(spherical_to_cartesian(1.0, 0.0, 180.0), -DVec3::Z);
    }

    #[test]
    fn test_cartesian_to_spherical_quadrants() {
        let s = cartesian_to_spherical(DVec3::new(0.0, -1.0, 0.0));
        assert!((s.phi - 270.0).abs() < EPS);
        assert!((s.theta - 90.0).abs() < EPS);

        let s = cartesian_to_spherical(DVec3::new(-1.0, 0.0, 0.0));
        assert!((s.phi - 180.0).abs() < EPS);

        let s = cartesian_to_spherical(DVec3::new(1.0, -1.0, 0.0));
        assert!((s.phi - 315.0).abs() < EPS);

        let s = cartesian_to_spherical(DVec3::new(1.0, 0.0, -1.0));
        assert!((s.theta - 135.0).abs() < EPS);
        assert!((s.radius - 2f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_cartesian_to_spherical_poles_clamp_theta() {
        let north = cartesian_to_spherical(DVec3::new(0.0, 0.0, 5.0));
        assert_eq!(north.theta, MIN_THETA);
        assert!((north.radius - 5.0).abs() < EPS);

        let south = cartesian_to_spherical(DVec3::new(0.0, 0.0, -5.0));
        assert!((south.theta - 180.0).abs() < EPS);
    }

    #[test]
    fn test_cartesian_to_spherical_origin() {
        let s = cartesian_to_spherical(DVec3::ZERO);
        assert_eq!(s.radius, 0.0);
        assert_eq!(s.phi, 0.0);
        assert_eq!(s.theta, 90.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-10.0), 350.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!(wrap_degrees(-1e-17) < 360.0);
    }

    #[test]
    fn test_axis_rotation() {
        assert_vec_eq(Axis::Z.rotate(DVec3::X, 90.0), DVec3::Y);
        assert_vec_eq(Axis::X.rotate(DVec3::Y, 90.0), DVec3::Z);
        assert_vec_eq(Axis::Y.rotate(DVec3::Z, 90.0), DVec3::X);
        let p = DVec3::new(1.0, 2.0, 3.0);
        assert_vec_eq(Axis::Y.rotate(p, 0.0), p);
        assert_vec_eq(Axis::X.rotate(Axis::X.rotate(p, 30.0), -30.0), p);
    }

    #[test]
    fn test_normal_3_points() {
        let n = normal_3_points(DVec3::X, DVec3::Y, DVec3::ZERO).unwrap();
        assert_eq!(n, DVec3::Z);
        assert!(n.x.is_sign_positive() && n.y.is_sign_positive());

        let flipped = normal_3_points(DVec3::Y, DVec3::X, DVec3::ZERO).unwrap();
        assert_eq!(flipped, -DVec3::Z);
        assert!(flipped.x.is_sign_positive());
    }

    #[test]
    fn test_normal_3_points_collinear() {
        let result = normal_3_points(DVec3::ZERO, DVec3::X, DVec3::X * 2.0);
        assert!(matches!(result, Err(ToolboxError::InvalidArgument(_))));
    }

    proptest! {
        #[test]
        fn spherical_round_trip(
            radius in 0.01f64..5000.0,
            phi in 0.0f64..359.9,
            theta in 0.01f64..179.99,
        ) {
            let back = cartesian_to_spherical(spherical_to_cartesian(radius, phi, theta));
            prop_assert!((back.radius - radius).abs() <= 1e-9 * radius.max(1.0));
            prop_assert!((back.theta - theta).abs() < 1e-6);
            prop_assert!(angle_distance(back.phi, phi) < 1e-6);
            prop_assert!(back.phi >= 0.0 && back.phi < 360.0);
        }

        #[test]
        fn normalized_vectors_have_unit_length(
            x in -1000.0f64..1000.0,
            y in -1000.0f64..1000.0,
            z in -1000.0f64..1000.0,
        ) {
            let v = DVec3::new(x, y, z);
            prop_assume!(v.length() > 1e-6);
            prop_assert!((v.normalize().length() - 1.0).abs() < 1e-9);
        }
    }
}
