//! Rendering helpers for gltoolbox-rs.
//!
//! This crate provides everything that draws through a [`RenderBackend`]:
//! - The backend trait and an in-memory recording backend
//! - Cartesian and spherical cameras
//! - Classic material presets
//! - Primitive meshes and OBJ import
//! - Shader programs and textures
//! - Fixed-function state setup, draw-list and vertex-buffer helpers

// Graphics code intentionally uses casts for indices, colors, and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Exact comparisons against 0.0 are intended for no-op checks
#![allow(clippy::float_cmp)]

pub mod backend;
pub mod camera;
pub mod draw;
pub mod error;
pub mod materials;
pub mod mesh;
pub mod shader;
pub mod state;
pub mod texture;

pub use backend::{
    BufferId, Capability, Command, Face, ListId, ProgramId, RecordingBackend, RenderBackend,
    ShaderId, ShaderStage, TextureId, UniformValue,
};
pub use camera::{Camera, CameraSpherical, CameraXyz, DEFAULT_RADIAL_VELOCITY};
pub use draw::{compile_mesh, draw_buffer, draw_list, upload_mesh, DrawTransform, VertexBuffer};
pub use error::{RenderError, RenderResult};
pub use materials::{Material, MaterialRegistry};
pub use mesh::{load_obj, MeshData, Primitive, Vertex};
pub use shader::{load_shader, Shader, ShaderProgram};
pub use state::RenderState;
pub use texture::{load_texture, TextureImage, TextureWrap};
