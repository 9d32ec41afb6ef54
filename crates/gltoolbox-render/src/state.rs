//! Fixed-function render state.
//!
//! [`RenderState`] is created by [`RenderState::init`] and remembers whether
//! lighting was switched on, so drawing code can temporarily step outside of
//! it with [`RenderState::without_lighting`].

use gltoolbox_core::{GlOptions, LightConfig, ProjectionConfig, MAX_LIGHTS};

use crate::backend::{Capability, RenderBackend};
use crate::error::{RenderError, RenderResult};

/// Lighting state established at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderState {
    lighting_enabled: bool,
    light_count: u8,
}

impl RenderState {
    /// Applies `options` to the backend.
    ///
    /// Every switch is issued explicitly, so calling this again with other
    /// options fully replaces the previous setup.
    pub fn init(backend: &mut dyn RenderBackend, options: &GlOptions) -> RenderResult<Self> {
        options.validate()?;
        log::debug!("initializing render state");

        if options.print_version {
            log::info!("backend: {}", backend.version_info());
        }

        backend.clear_color(options.background_color);
        backend.clear_depth(options.background_depth);

        toggle(backend, Capability::Blend, options.transparency);
        toggle(backend, Capability::Smooth, options.smooth);
        toggle(backend, Capability::DepthTest, options.depth_test);
        toggle(backend, Capability::PolygonSmoothHint, options.antialiasing);
        toggle(backend, Capability::Normalize, options.normalize_normals);
        toggle(backend, Capability::PolygonOffsetFill, options.surface_fill);

        let light_count = if options.lighting { options.num_lights } else { 0 };
        toggle(backend, Capability::Lighting, options.lighting);
        for index in 0..MAX_LIGHTS {
            toggle(backend, Capability::Light(index), index < light_count);
        }

        toggle(backend, Capability::FillBothFaces, options.polygon_fill);
        toggle(backend, Capability::ColorMaterial, options.material_color);
        toggle(
            backend,
            Capability::PerspectiveCorrectionHint,
            options.perspective_correction,
        );
        toggle(backend, Capability::Texture2D, options.textures);

        log::debug!("render state initialized");
        Ok(Self {
            lighting_enabled: options.lighting,
            light_count,
        })
    }

    /// Sets the viewport and perspective projection for a window size.
    ///
    /// A zero height is treated as 1.
    pub fn reshape(
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
        projection: &ProjectionConfig,
    ) {
        let height = height.max(1);
        backend.load_identity();
        backend.viewport(width, height);
        backend.perspective(
            projection.fov,
            f64::from(width) / f64::from(height),
            projection.near,
            projection.far,
        );
        backend.load_identity();
    }

    /// Configures light `index`.
    pub fn init_light(
        backend: &mut dyn RenderBackend,
        index: u8,
        config: &LightConfig,
    ) -> RenderResult<()> {
        if index >= MAX_LIGHTS {
            return Err(RenderError::InvalidLight(index));
        }
        backend.light(index, config);
        Ok(())
    }

    /// Clears the color and depth buffers.
    pub fn clear(backend: &mut dyn RenderBackend) {
        backend.clear();
    }

    #[must_use]
    pub fn is_lighting_enabled(&self) -> bool {
        self.lighting_enabled
    }

    /// Number of individual lights switched on by [`init`](Self::init).
    #[must_use]
    pub fn light_count(&self) -> u8 {
        self.light_count
    }

    /// Turns lighting on or off after initialization.
    pub fn set_lighting(&mut self, backend: &mut dyn RenderBackend, enabled: bool) {
        toggle(backend, Capability::Lighting, enabled);
        self.lighting_enabled = enabled;
    }

    /// Runs `draw` with lighting switched off, restoring it afterwards.
    pub fn without_lighting<R>(
        &self,
        backend: &mut dyn RenderBackend,
        draw: impl FnOnce(&mut dyn RenderBackend) -> R,
    ) -> R {
        if !self.lighting_enabled {
            return draw(backend);
        }
        backend.disable(Capability::Lighting);
        let result = draw(&mut *backend);
        backend.enable(Capability::Lighting);
        result
    }
}

fn toggle(backend: &mut dyn RenderBackend, capability: Capability, on: bool) {
    if on {
        log::debug!("enable {capability:?}");
        backend.enable(capability);
    } else {
        backend.disable(capability);
    }
}
