//! Core types for gltoolbox-rs.
//!
//! This crate holds everything that does not talk to a rendering backend:
//! - Vector helpers and spherical coordinates ([`math`])
//! - Kinematic particles with a dynamic property bag ([`particle`])
//! - Serializable configuration ([`options`])
//! - The shared error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Exact comparisons against 0.0 are intended for no-op checks
#![allow(clippy::float_cmp)]

pub mod error;
pub mod math;
pub mod options;
pub mod particle;

pub use error::{Result, ToolboxError};
pub use math::{
    cartesian_to_spherical, clamp_theta, normal_3_points, spherical_to_cartesian, wrap_degrees,
    Axis, Spherical, MAX_THETA, MIN_THETA,
};
pub use options::{CenterLimits, GlOptions, LightConfig, ProjectionConfig, MAX_LIGHTS};
pub use particle::{
    Particle, ParticleCallback, PropertyFn, PropertyKey, PropertyOperator, PropertyValue,
};

// Re-export glam types for convenience
pub use glam::{DMat4, DVec3, Mat4, Vec2, Vec3, Vec4};
