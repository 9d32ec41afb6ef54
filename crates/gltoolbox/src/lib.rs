//! gltoolbox-rs: a thin convenience layer for fixed-function 3D rendering.
//!
//! It bundles the pieces a small interactive 3D program keeps rewriting:
//! cameras that orbit a target, primitive meshes, classic material presets,
//! shader and texture loading, and kinematic particles. All drawing goes
//! through a [`RenderBackend`] supplied by the host.
//!
//! # Quick Start
//!
//! ```
//! use gltoolbox::*;
//!
//! fn main() -> RenderResult<()> {
//!     let mut backend = RecordingBackend::new();
//!     init(
//!         &mut backend,
//!         &GlOptions::default(),
//!         &LightConfig::default(),
//!         &ProjectionConfig::default(),
//!         640,
//!         480,
//!     )?;
//!
//!     let mut camera = CameraSpherical::new(500.0, 45.0, 45.0)?;
//!     let cube = compile_mesh(&mut backend, &mesh::cube()?);
//!
//!     // One frame
//!     camera.rotate_eye(Axis::Z, 2.5);
//!     RenderState::clear(&mut backend);
//!     camera.place(&mut backend);
//!     draw_list(&mut backend, cube, &DrawTransform::at(DVec3::ZERO));
//!     Ok(())
//! }
//! ```
//!
//! # Cameras
//!
//! - [`CameraXyz`] - eye stored as a cartesian point
//! - [`CameraSpherical`] - eye stored as radius, azimuth and polar angle
//!
//! Both implement [`Camera`], which [`CameraController`] drives from the
//! keyboard.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]

mod controller;
mod init;

pub use controller::{CameraAction, CameraController, ControllerConfig};
pub use init::{init, init_logging};

// Re-export core types
pub use gltoolbox_core::{
    cartesian_to_spherical, math, normal_3_points, options, particle, spherical_to_cartesian,
    Axis, CenterLimits, GlOptions, LightConfig, Particle, ProjectionConfig, PropertyKey,
    PropertyOperator, PropertyValue, Result, Spherical, ToolboxError, MAX_LIGHTS,
};
pub use gltoolbox_core::{DMat4, DVec3, Mat4, Vec2, Vec3, Vec4};

// Re-export render types
pub use gltoolbox_render::{
    backend, compile_mesh, draw_buffer, draw_list, load_obj, load_shader, load_texture, materials,
    mesh, upload_mesh, BufferId, Camera, CameraSpherical, CameraXyz, Capability, Command,
    DrawTransform, Face, ListId, Material, MaterialRegistry, MeshData, Primitive, ProgramId,
    RecordingBackend, RenderBackend, RenderError, RenderResult, RenderState, Shader,
    ShaderProgram, ShaderStage, TextureId, TextureImage, TextureWrap, VertexBuffer,
};
