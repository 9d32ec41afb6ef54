//! Initialization helpers.

use gltoolbox_core::{GlOptions, LightConfig, ProjectionConfig};
use gltoolbox_render::{RenderBackend, RenderResult, RenderState};

/// Installs the `env_logger` logger.
///
/// Safe to call more than once; only the first call has an effect. Filter
/// output with `RUST_LOG`, e.g. `RUST_LOG=gltoolbox_render=debug`.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Sets up the backend for drawing.
///
/// Installs logging, applies `options`, configures one light per enabled
/// light slot with `light`, and sets the projection for a `width` x
/// `height` window.
///
/// # Errors
///
/// Returns an error if `options` fail validation.
///
/// # Example
///
/// ```
/// use gltoolbox::*;
///
/// let mut backend = RecordingBackend::new();
/// let options = GlOptions {
///     lighting: true,
///     num_lights: 1,
///     ..GlOptions::default()
/// };
/// let state = init(
///     &mut backend,
///     &options,
///     &LightConfig::default(),
///     &ProjectionConfig::default(),
///     800,
///     600,
/// )?;
/// assert!(state.is_lighting_enabled());
/// # Ok::<(), RenderError>(())
/// ```
pub fn init(
    backend: &mut dyn RenderBackend,
    options: &GlOptions,
    light: &LightConfig,
    projection: &ProjectionConfig,
    width: u32,
    height: u32,
) -> RenderResult<RenderState> {
    init_logging();
    let state = RenderState::init(backend, options)?;
    for index in 0..state.light_count() {
        RenderState::init_light(backend, index, light)?;
    }
    RenderState::reshape(backend, width, height, projection);
    log::info!(
        "gltoolbox initialized ({width}x{height}, {} lights)",
        state.light_count()
    );
    Ok(state)
}
