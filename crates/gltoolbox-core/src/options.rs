//! Configuration options for gltoolbox.

use std::fs;
use std::path::Path;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolboxError};

/// Maximum number of fixed-function lights.
pub const MAX_LIGHTS: u8 = 8;

/// Fixed-function initialization switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlOptions {
    /// Whether to request nicest polygon smoothing.
    pub antialiasing: bool,

    /// Clear color.
    pub background_color: Vec4,

    /// Clear depth value.
    pub background_depth: f64,

    /// Whether to enable depth testing.
    pub depth_test: bool,

    /// Whether to enable lighting.
    pub lighting: bool,

    /// Number of lights to enable when lighting is on (0..=8).
    pub num_lights: u8,

    /// Whether vertex colors drive material colors.
    pub material_color: bool,

    /// Whether normals are renormalized after transformation.
    pub normalize_normals: bool,

    /// Whether to request nicest perspective correction.
    pub perspective_correction: bool,

    /// Whether both polygon faces are filled.
    pub polygon_fill: bool,

    /// Whether to use smooth shading.
    pub smooth: bool,

    /// Whether polygon offset fill is enabled.
    pub surface_fill: bool,

    /// Whether 2D texturing is enabled.
    pub textures: bool,

    /// Whether alpha blending is enabled.
    pub transparency: bool,

    /// Whether to log backend version information at startup.
    pub print_version: bool,
}

impl Default for GlOptions {
    fn default() -> Self {
        Self {
            antialiasing: true,
            background_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            background_depth: 1.0,
            depth_test: true,
            lighting: false,
            num_lights: 0,
            material_color: true,
            normalize_normals: true,
            perspective_correction: false,
            polygon_fill: true,
            smooth: true,
            surface_fill: true,
            textures: false,
            transparency: true,
            print_version: false,
        }
    }
}

impl GlOptions {
    /// Checks that the options are consistent.
    pub fn validate(&self) -> Result<()> {
        if self.num_lights > MAX_LIGHTS {
            return Err(ToolboxError::InvalidArgument(format!(
                "num_lights must be at most {MAX_LIGHTS}, got {}",
                self.num_lights
            )));
        }
        if !(0.0..=1.0).contains(&self.background_depth) {
            return Err(ToolboxError::InvalidArgument(format!(
                "background_depth must be in [0, 1], got {}",
                self.background_depth
            )));
        }
        Ok(())
    }

    /// Parses options from JSON. Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = Self::from_json_str(&fs::read_to_string(path)?)?;
        log::info!("loaded GL options from {}", path.display());
        Ok(options)
    }

    /// Saves options to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

/// Properties of a fixed-function light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Ambient color.
    pub ambient: Vec4,
    /// Diffuse color.
    pub diffuse: Vec4,
    /// Specular color.
    pub specular: Vec4,
    /// Spot cutoff angle in degrees (180 = omnidirectional).
    pub spot_cutoff: f32,
    /// Spot exponent.
    pub spot_exponent: f32,
    /// Spot direction.
    pub spot_direction: Vec3,
    /// Constant attenuation factor.
    pub constant_attenuation: f32,
    /// Linear attenuation factor.
    pub linear_attenuation: f32,
    /// Quadratic attenuation factor.
    pub quadratic_attenuation: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Vec4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vec4::new(1.0, 1.0, 1.0, 1.0),
            spot_cutoff: 180.0,
            spot_exponent: 1.0,
            spot_direction: Vec3::new(0.0, 0.0, -1.0),
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
        }
    }
}

impl LightConfig {
    /// Sets the ambient, diffuse and specular colors.
    #[must_use]
    pub fn with_colors(mut self, ambient: Vec4, diffuse: Vec4, specular: Vec4) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Sets the spot cone.
    #[must_use]
    pub fn with_spot(mut self, cutoff: f32, exponent: f32, direction: Vec3) -> Self {
        self.spot_cutoff = cutoff;
        self.spot_exponent = exponent;
        self.spot_direction = direction;
        self
    }

    /// Sets the attenuation factors.
    #[must_use]
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant_attenuation = constant;
        self.linear_attenuation = linear;
        self.quadratic_attenuation = quadratic;
        self
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees.
    pub fov: f64,
    /// Near clipping plane.
    pub near: f64,
    /// Far clipping plane.
    pub far: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 10.0,
            far: 10000.0,
        }
    }
}

/// Limits applied to a camera's look-at center along the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterLimits {
    /// Lowest z the center may be moved to.
    pub z_down: f64,
    /// Highest z the center may be moved to.
    pub z_up: f64,
}

impl CenterLimits {
    /// Creates the symmetric range `[-limit, limit]`.
    #[must_use]
    pub fn symmetric(limit: f64) -> Self {
        let limit = limit.abs();
        Self {
            z_down: -limit,
            z_up: limit,
        }
    }

    /// Returns `z + delta` if the move is allowed, `None` if it is blocked.
    ///
    /// A move is blocked when it would carry z past the limit in its own
    /// direction. Moves back toward the range are always allowed.
    #[must_use]
    pub fn step_z(&self, z: f64, delta: f64) -> Option<f64> {
        let target = z + delta;
        let allowed = if delta > 0.0 {
            target <= self.z_up
        } else if delta < 0.0 {
            target >= self.z_down
        } else {
            false
        };
        allowed.then_some(target)
    }
}

impl Default for CenterLimits {
    fn default() -> Self {
        Self::symmetric(3500.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gl_options_defaults() {
        let options = GlOptions::default();
        assert!(options.depth_test);
        assert!(!options.lighting);
        assert_eq!(options.num_lights, 0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_gl_options_json_partial() {
        let options = GlOptions::from_json_str(r#"{"lighting": true, "num_lights": 2}"#).unwrap();
        assert!(options.lighting);
        assert_eq!(options.num_lights, 2);
        assert!(options.smooth);
    }

    #[test]
    fn test_gl_options_json_rejects_too_many_lights() {
        let result = GlOptions::from_json_str(r#"{"num_lights": 9}"#);
        assert!(matches!(result, Err(ToolboxError::InvalidArgument(_))));
    }

    #[test]
    fn test_gl_options_json_round_trip() {
        let options = GlOptions {
            lighting: true,
            num_lights: 3,
            background_color: Vec4::new(0.1, 0.2, 0.3, 1.0),
            ..GlOptions::default()
        };
        let json = options.to_json_string().unwrap();
        assert_eq!(GlOptions::from_json_str(&json).unwrap(), options);
    }

    #[test]
    fn test_gl_options_save_load() {
        let path = std::env::temp_dir().join("gltoolbox_options_test.json");
        let options = GlOptions {
            textures: true,
            ..GlOptions::default()
        };
        options.save(&path).unwrap();
        let loaded = GlOptions::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, options);
    }

    #[test]
    fn test_light_config_builders() {
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let light = LightConfig::default()
            .with_colors(red, red, red)
            .with_attenuation(1.0, 0.5, 0.25);
        assert_eq!(light.diffuse, red);
        assert_eq!(light.linear_attenuation, 0.5);
        assert_eq!(light.spot_cutoff, 180.0);
    }

    #[test]
    fn test_center_limits_step() {
        let limits = CenterLimits::default();
        assert_eq!(limits.step_z(0.0, 10.0), Some(10.0));
        assert_eq!(limits.step_z(3500.0, 10.0), None);
        assert_eq!(limits.step_z(3495.0, 10.0), None);
        assert_eq!(limits.step_z(3500.0, -10.0), Some(3490.0));
        assert_eq!(limits.step_z(-3500.0, -1.0), None);
        assert_eq!(limits.step_z(-3500.0, 1.0), Some(-3499.0));
        assert_eq!(limits.step_z(5000.0, -10.0), Some(4990.0));
        assert_eq!(limits.step_z(0.0, 0.0), None);
    }

    #[test]
    fn test_center_limits_symmetric() {
        let limits = CenterLimits::symmetric(-100.0);
        assert_eq!(limits.z_down, -100.0);
        assert_eq!(limits.z_up, 100.0);
    }
}
