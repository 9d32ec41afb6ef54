//! Camera and view management.
//!
//! Two independent cameras are provided. [`CameraXyz`] stores its eye as a
//! cartesian point, [`CameraSpherical`] as a radius and two angles around the
//! origin. Both look at a movable center whose z coordinate is kept inside
//! [`CenterLimits`], and both emit their view through [`Camera::place`].

use std::fmt;

use glam::{DMat4, DVec3};
use gltoolbox_core::math::{clamp_theta, wrap_degrees, Axis, Spherical};
use gltoolbox_core::{CenterLimits, Result, ToolboxError};

use crate::backend::RenderBackend;

/// Radial velocity cameras start with.
pub const DEFAULT_RADIAL_VELOCITY: f64 = 1.0;

/// Behaviour shared by every camera.
pub trait Camera {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: &str);

    /// Returns the eye position.
    fn eye(&self) -> DVec3;
    /// Returns the look-at target.
    fn center(&self) -> DVec3;
    fn up(&self) -> DVec3;

    /// Rotates the eye around `axis` through the origin by `angle` degrees.
    fn rotate_eye(&mut self, axis: Axis, angle: f64);
    /// Moves the eye one radial step toward the origin.
    fn zoom_in(&mut self);
    /// Moves the eye one radial step away from the origin.
    fn zoom_out(&mut self);
    /// Moves the center by `delta` along `axis`. Moves along z are clamped.
    fn move_center(&mut self, axis: Axis, delta: f64);

    /// Resets the model-view matrix and loads this camera's view into it.
    fn place(&self, backend: &mut dyn RenderBackend) {
        backend.load_identity();
        backend.look_at(self.eye(), self.center(), self.up());
    }

    /// Returns the right-handed view matrix `place` produces.
    fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.eye(), self.center(), self.up())
    }
}

fn move_center_clamped(center: &mut DVec3, limits: &CenterLimits, axis: Axis, delta: f64) {
    match axis {
        Axis::Z => match limits.step_z(center.z, delta) {
            Some(z) => center.z = z,
            None => log::trace!("center move blocked at z = {}", center.z),
        },
        _ => center[axis.index()] += delta,
    }
}

fn require_positive(what: &str, value: f64) -> Result<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ToolboxError::InvalidArgument(format!(
            "{what} must be greater than zero, got {value}"
        )))
    }
}

fn require_range(what: &str, value: f64, max: f64) -> Result<f64> {
    if (0.0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ToolboxError::InvalidArgument(format!(
            "{what} must be between 0 and {max} degrees, got {value}"
        )))
    }
}

/// A camera whose eye is a cartesian point.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraXyz {
    name: String,
    position: DVec3,
    center: DVec3,
    up: DVec3,
    velocity: DVec3,
    center_velocity: DVec3,
    radial_velocity: f64,
    limits: CenterLimits,
    // Unit direction of the eye, kept while the eye sits at the origin
    direction: DVec3,
}

impl CameraXyz {
    /// Creates a camera at `position` looking at `center`.
    ///
    /// `up` is normalized; a zero `up` is rejected.
    pub fn new(position: DVec3, center: DVec3, up: DVec3) -> Result<Self> {
        Ok(Self {
            name: "unnamed".to_string(),
            position,
            center,
            up: normalize_up(up)?,
            velocity: DVec3::ONE,
            center_velocity: DVec3::ONE,
            radial_velocity: DEFAULT_RADIAL_VELOCITY,
            limits: CenterLimits::default(),
            direction: position.try_normalize().unwrap_or(DVec3::X),
        })
    }

    /// Sets the center limits, consuming and returning self.
    #[must_use]
    pub fn with_limits(mut self, limits: CenterLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the eye position.
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    pub fn set_center(&mut self, center: DVec3) {
        self.center = center;
    }

    /// Sets the up vector, normalizing it.
    pub fn set_up(&mut self, up: DVec3) -> Result<()> {
        self.up = normalize_up(up)?;
        Ok(())
    }

    /// Returns the limits on the center's z coordinate.
    #[must_use]
    pub fn limits(&self) -> CenterLimits {
        self.limits
    }

    /// Returns the signed per-axis eye velocity.
    #[must_use]
    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// Returns the per-axis center velocity.
    #[must_use]
    pub fn center_velocity(&self) -> DVec3 {
        self.center_velocity
    }

    /// Returns the zoom step.
    #[must_use]
    pub fn radial_velocity(&self) -> f64 {
        self.radial_velocity
    }

    /// Moves the eye along `axis` by its velocity times `direction`.
    pub fn move_axis(&mut self, axis: Axis, direction: f64) {
        let i = axis.index();
        self.position[i] += self.velocity[i] * direction;
    }

    /// Sets the signed eye velocity along `axis`.
    pub fn set_axis_velocity(&mut self, axis: Axis, velocity: f64) {
        self.velocity[axis.index()] = velocity;
    }

    /// Sets the center velocity on every axis to `|velocity|`.
    pub fn set_center_velocity(&mut self, velocity: f64) {
        self.center_velocity = DVec3::splat(velocity.abs());
    }

    /// Sets the radial velocity used by the zoom operations.
    pub fn set_radial_velocity(&mut self, velocity: f64) -> Result<()> {
        self.radial_velocity = require_positive("radial velocity", velocity)?;
        Ok(())
    }

    /// Moves the center one step of its velocity along `axis`.
    pub fn move_center_step(&mut self, axis: Axis, direction: f64) {
        let delta = self.center_velocity[axis.index()] * direction;
        self.move_center(axis, delta);
    }

    /// Translates the center by the center velocity times `direction`.
    ///
    /// Earlier camera revisions zoomed this way. Unlike [`Camera::zoom_in`]
    /// it moves the target instead of the eye and ignores the limits.
    pub fn translate_center(&mut self, direction: f64) {
        self.center += self.center_velocity * direction;
    }

    fn change_radius(&mut self, delta: f64) {
        if let Some(direction) = self.position.try_normalize() {
            self.direction = direction;
        }
        let radius = (self.position.length() + delta).max(0.0);
        self.position = self.direction * radius;
    }
}

fn normalize_up(up: DVec3) -> Result<DVec3> {
    up.try_normalize()
        .ok_or_else(|| ToolboxError::InvalidArgument("up vector must not be zero".to_string()))
}

impl Default for CameraXyz {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            position: DVec3::ONE,
            center: DVec3::ZERO,
            up: DVec3::Z,
            velocity: DVec3::ONE,
            center_velocity: DVec3::ONE,
            radial_velocity: DEFAULT_RADIAL_VELOCITY,
            limits: CenterLimits::default(),
            direction: DVec3::ONE.normalize(),
        }
    }
}

impl Camera for CameraXyz {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn eye(&self) -> DVec3 {
        self.position
    }

    fn center(&self) -> DVec3 {
        self.center
    }

    fn up(&self) -> DVec3 {
        self.up
    }

    fn rotate_eye(&mut self, axis: Axis, angle: f64) {
        self.position = axis.rotate(self.position, angle);
        self.direction = axis.rotate(self.direction, angle);
    }

    /// Moves the eye one radial step toward the origin, stopping there.
    ///
    /// At the origin the eye coincides with a centre at the origin and the
    /// view is degenerate. The eye keeps its last direction, so the next
    /// [`zoom_out`](Camera::zoom_out) returns along the same ray.
    fn zoom_in(&mut self) {
        self.change_radius(-self.radial_velocity);
    }

    fn zoom_out(&mut self) {
        self.change_radius(self.radial_velocity);
    }

    fn move_center(&mut self, axis: Axis, delta: f64) {
        move_center_clamped(&mut self.center, &self.limits, axis, delta);
    }
}

impl fmt::Display for CameraXyz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, c, u) = (self.position, self.center, self.up);
        writeln!(f, "Camera: {}", self.name)?;
        writeln!(f, "XYZ eye pos: ({:.2},{:.2},{:.2})", p.x, p.y, p.z)?;
        writeln!(f, "XYZ center pos: ({:.2},{:.2},{:.2})", c.x, c.y, c.z)?;
        write!(f, "XYZ up vector: ({:.2},{:.2},{:.2})", u.x, u.y, u.z)
    }
}

/// A camera whose eye sits on a sphere around the origin.
///
/// `phi` is kept in `[0, 360)` and `theta` in `[MIN_THETA, 180]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSpherical {
    name: String,
    radius: f64,
    phi: f64,
    theta: f64,
    center: DVec3,
    up: DVec3,
    radial_velocity: f64,
    limits: CenterLimits,
}

impl CameraSpherical {
    /// Creates a camera looking at the origin with +Z up.
    ///
    /// Fails unless `radius > 0`, `0 <= phi <= 360` and `0 <= theta <= 180`.
    /// A `phi` of 360 is stored as 0 and a `theta` of 0 as the smallest
    /// allowed polar angle.
    pub fn new(radius: f64, phi: f64, theta: f64) -> Result<Self> {
        Ok(Self {
            name: "unnamed".to_string(),
            radius: require_positive("radius", radius)?,
            phi: wrap_degrees(require_range("phi", phi, 360.0)?),
            theta: clamp_theta(require_range("theta", theta, 180.0)?),
            center: DVec3::ZERO,
            up: DVec3::Z,
            radial_velocity: DEFAULT_RADIAL_VELOCITY,
            limits: CenterLimits::default(),
        })
    }

    /// Sets the look-at target, consuming and returning self.
    #[must_use]
    pub fn with_center(mut self, center: DVec3) -> Self {
        self.center = center;
        self
    }

    /// Sets the up vector, consuming and returning self.
    #[must_use]
    pub fn with_up(mut self, up: DVec3) -> Self {
        self.up = up;
        self
    }

    /// Sets the center limits, consuming and returning self.
    #[must_use]
    pub fn with_limits(mut self, limits: CenterLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the distance from the origin to the eye.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Sets the radius. Fails unless `radius > 0`.
    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.radius = require_positive("radius", radius)?;
        Ok(())
    }

    /// Returns the azimuth in degrees.
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Sets the azimuth. Fails unless `0 <= phi <= 360`.
    pub fn set_phi(&mut self, phi: f64) -> Result<()> {
        self.phi = wrap_degrees(require_range("phi", phi, 360.0)?);
        Ok(())
    }

    /// Returns the polar angle in degrees.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Sets the polar angle. Fails unless `0 <= theta <= 180`.
    pub fn set_theta(&mut self, theta: f64) -> Result<()> {
        self.theta = clamp_theta(require_range("theta", theta, 180.0)?);
        Ok(())
    }

    pub fn set_center(&mut self, center: DVec3) {
        self.center = center;
    }

    pub fn set_up(&mut self, up: DVec3) {
        self.up = up;
    }

    /// Returns the limits on the center's z coordinate.
    #[must_use]
    pub fn limits(&self) -> CenterLimits {
        self.limits
    }

    /// Returns the zoom step.
    #[must_use]
    pub fn radial_velocity(&self) -> f64 {
        self.radial_velocity
    }

    /// Sets the radial velocity used by the zoom operations.
    pub fn set_radial_velocity(&mut self, velocity: f64) -> Result<()> {
        self.radial_velocity = require_positive("radial velocity", velocity)?;
        Ok(())
    }

    /// Returns the eye position in cartesian coordinates.
    #[must_use]
    pub fn to_cartesian(&self) -> DVec3 {
        Spherical::new(self.radius, self.phi, self.theta).to_cartesian()
    }
}

impl Default for CameraSpherical {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            radius: 1.0,
            phi: 45.0,
            theta: 45.0,
            center: DVec3::ZERO,
            up: DVec3::Z,
            radial_velocity: DEFAULT_RADIAL_VELOCITY,
            limits: CenterLimits::default(),
        }
    }
}

impl Camera for CameraSpherical {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn eye(&self) -> DVec3 {
        self.to_cartesian()
    }

    fn center(&self) -> DVec3 {
        self.center
    }

    fn up(&self) -> DVec3 {
        self.up
    }

    fn rotate_eye(&mut self, axis: Axis, angle: f64) {
        match axis {
            Axis::X => {
                let rotated = Axis::X.rotate(self.to_cartesian(), angle);
                let spherical = Spherical::from_cartesian(rotated);
                self.radius = spherical.radius;
                self.phi = spherical.phi;
                self.theta = spherical.theta;
            }
            Axis::Y => self.theta = clamp_theta(self.theta + angle),
            Axis::Z => self.phi = wrap_degrees(self.phi + angle),
        }
    }

    /// Shrinks the radius by the radial velocity. A step that would make the
    /// radius negative is skipped.
    fn zoom_in(&mut self) {
        let radius = self.radius - self.radial_velocity;
        if radius < 0.0 {
            log::trace!("zoom in blocked at radius {}", self.radius);
        } else {
            self.radius = radius;
        }
    }

    fn zoom_out(&mut self) {
        self.radius += self.radial_velocity;
    }

    fn move_center(&mut self, axis: Axis, delta: f64) {
        move_center_clamped(&mut self.center, &self.limits, axis, delta);
    }
}

impl fmt::Display for CameraSpherical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (e, c, u) = (self.to_cartesian(), self.center, self.up);
        writeln!(f, "Camera: {}", self.name)?;
        writeln!(f, "Radius: {:.2}", self.radius)?;
        writeln!(f, "Phi angle: {:.2}, Theta angle: {:.2}", self.phi, self.theta)?;
        writeln!(f, "XYZ eye pos: ({:.2},{:.2},{:.2})", e.x, e.y, e.z)?;
        writeln!(f, "XYZ center pos: ({:.2},{:.2},{:.2})", c.x, c.y, c.z)?;
        write!(f, "XYZ up vector: ({:.2},{:.2},{:.2})", u.x, u.y, u.z)
    }
}
