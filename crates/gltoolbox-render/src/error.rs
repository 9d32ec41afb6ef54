//! Rendering error types.

use std::path::PathBuf;

use gltoolbox_core::ToolboxError;
use thiserror::Error;

use crate::backend::ShaderStage;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Error from the core crate (argument validation, config loading).
    #[error(transparent)]
    Core(#[from] ToolboxError),

    /// Reading a shader source file failed.
    #[error("failed to load shader '{}': {source}", path.display())]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shader was attached to the wrong program slot.
    #[error("expected a {expected} shader, got a {actual} shader")]
    ShaderStageMismatch {
        expected: ShaderStage,
        actual: ShaderStage,
    },

    /// The shader was already compiled.
    #[error("shader '{0}' is already compiled")]
    ShaderAlreadyCompiled(String),

    /// The shader or program has not been compiled yet.
    #[error("shader '{0}' is not compiled")]
    ShaderNotCompiled(String),

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Program linking failed.
    #[error("program link failed: {0}")]
    ProgramLinkFailed(String),

    /// A uniform was given an unsupported number of values.
    #[error("invalid uniform: {0}")]
    InvalidUniform(String),

    /// Texture decoding failed.
    #[error("texture load failed: {0}")]
    TextureLoadFailed(#[from] image::ImageError),

    /// Mesh file parsing failed.
    #[error("mesh load failed: {0}")]
    MeshLoadFailed(#[from] tobj::LoadError),

    /// Light index outside the fixed-function range.
    #[error("light index {0} out of range")]
    InvalidLight(u8),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
