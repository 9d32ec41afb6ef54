//! Material system for fixed-function lighting.
//!
//! A material is the classic ambient/diffuse/specular/emission quadruple plus
//! a specular exponent. The built-in presets are the well known measured
//! metal, gem, plastic and rubber tables.

use std::collections::HashMap;

use glam::{Vec3, Vec4};

use crate::backend::{Face, RenderBackend};

/// Emission of every preset unless overridden.
pub const DEFAULT_EMISSION: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// A material definition for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name.
    pub name: String,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    /// Specular exponent, `0..=128`.
    pub shininess: f32,
    pub emission: Vec4,
}

impl Material {
    /// Creates a new material with the default emission.
    pub fn new(
        name: impl Into<String>,
        ambient: Vec4,
        diffuse: Vec4,
        specular: Vec4,
        shininess: f32,
    ) -> Self {
        Self {
            name: name.into(),
            ambient,
            diffuse,
            specular,
            shininess,
            emission: DEFAULT_EMISSION,
        }
    }

    /// Returns the built-in material called `name`.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        BUILTIN_MATERIALS
            .iter()
            .find(|preset| preset.name == name)
            .map(Preset::material)
    }

    /// Sets the emission color, consuming and returning self.
    #[must_use]
    pub fn with_emission(mut self, emission: Vec4) -> Self {
        self.emission = emission;
        self
    }

    /// Makes this the current material for `face`.
    pub fn apply(&self, backend: &mut dyn RenderBackend, face: Face) {
        backend.material(face, self);
    }
}

impl Default for Material {
    /// The fixed-function pipeline's initial material.
    fn default() -> Self {
        Self::new(
            "default",
            Vec4::new(0.2, 0.2, 0.2, 1.0),
            Vec4::new(0.8, 0.8, 0.8, 1.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            0.0,
        )
    }
}

struct Preset {
    name: &'static str,
    ambient: [f32; 3],
    diffuse: [f32; 3],
    specular: [f32; 3],
    /// Fraction of the maximum exponent (128).
    shininess: f32,
}

impl Preset {
    fn material(&self) -> Material {
        Material::new(
            self.name,
            Vec3::from(self.ambient).extend(1.0),
            Vec3::from(self.diffuse).extend(1.0),
            Vec3::from(self.specular).extend(1.0),
            self.shininess * 128.0,
        )
    }
}

const fn preset(
    name: &'static str,
    ambient: [f32; 3],
    diffuse: [f32; 3],
    specular: [f32; 3],
    shininess: f32,
) -> Preset {
    Preset {
        name,
        ambient,
        diffuse,
        specular,
        shininess,
    }
}

#[rustfmt::skip]
const BUILTIN_MATERIALS: [Preset; 25] = [
    preset("obsidian", [0.05375, 0.05, 0.0625], [0.18275, 0.17, 0.25525], [0.332741, 0.328634, 0.346435], 0.3),
    preset("silver", [0.19225, 0.19225, 0.19225], [0.50754, 0.50754, 0.50754], [0.508273, 0.508273, 0.508273], 0.4),
    preset("copper", [0.19125, 0.0735, 0.0225], [0.7038, 0.27048, 0.0828], [0.256777, 0.137622, 0.086014], 0.1),
    preset("emerald", [0.0215, 0.1745, 0.0215], [0.07568, 0.61424, 0.007568], [0.633, 0.727811, 0.633], 0.6),
    preset("jade", [0.135, 0.2225, 0.1575], [0.54, 0.89, 0.63], [0.316228, 0.316228, 0.316228], 0.1),
    preset("pearl", [0.25, 0.20725, 0.20725], [1.0, 0.829, 0.829], [0.296648, 0.296648, 0.296648], 0.088),
    preset("turquoise", [0.1, 0.18725, 0.1745], [0.396, 0.74161, 0.69102], [0.29754, 0.30829, 0.306678], 0.1),
    preset("ruby", [0.1745, 0.01175, 0.01175], [0.61424, 0.04136, 0.04136], [0.727811, 0.626959, 0.626959], 0.6),
    preset("brass", [0.329, 0.223529, 0.027451], [0.780392, 0.568627, 0.113725], [0.992157, 0.941176, 0.807843], 0.217_948_7),
    preset("bronze", [0.2125, 0.1275, 0.054], [0.714, 0.4284, 0.18144], [0.393548, 0.271906, 0.166721], 0.2),
    preset("chrome", [0.25, 0.25, 0.25], [0.4, 0.4, 0.4], [0.774597, 0.774957, 0.774957], 0.6),
    preset("gold", [0.24725, 0.1995, 0.0745], [0.75164, 0.60648, 0.22648], [0.628281, 0.555802, 0.366065], 0.4),
    preset("black_plastic", [0.0, 0.0, 0.0], [0.01, 0.01, 0.01], [0.5, 0.5, 0.5], 0.25),
    preset("cyan_plastic", [0.0, 0.1, 0.06], [0.0, 0.509_803_9, 0.509_803_9], [0.501_960_8, 0.501_960_8, 0.501_960_8], 0.25),
    preset("green_plastic", [0.0, 0.0, 0.0], [0.1, 0.35, 0.1], [0.45, 0.55, 0.45], 0.25),
    preset("red_plastic", [0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.7, 0.6, 0.6], 0.25),
    preset("white_plastic", [0.0, 0.0, 0.0], [0.55, 0.55, 0.55], [0.7, 0.7, 0.7], 0.25),
    preset("yellow_plastic", [0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.6, 0.6, 0.5], 0.25),
    preset("black_rubber", [0.02, 0.02, 0.02], [0.01, 0.01, 0.1], [0.4, 0.4, 0.4], 0.078125),
    preset("cyan_rubber", [0.0, 0.05, 0.05], [0.4, 0.5, 0.5], [0.04, 0.7, 0.7], 0.078125),
    preset("green_rubber", [0.0, 0.05, 0.0], [0.4, 0.5, 0.4], [0.04, 0.7, 0.04], 0.078125),
    preset("red_rubber", [0.05, 0.0, 0.0], [0.5, 0.4, 0.4], [0.7, 0.04, 0.04], 0.078125),
    preset("white_rubber", [0.05, 0.05, 0.05], [0.5, 0.5, 0.5], [0.7, 0.7, 0.7], 0.078125),
    preset("yellow_rubber", [0.05, 0.05, 0.0], [0.5, 0.5, 0.4], [0.7, 0.7, 0.04], 0.078125),
    preset("natural_white", [1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0], 1.0),
];

/// Names of the built-in materials in canonical order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_MATERIALS.iter().map(|preset| preset.name)
}

/// Registry for managing materials.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HashMap<String, Material>,
    default_material: String,
}

impl MaterialRegistry {
    /// Creates a new material registry with the built-in materials.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            materials: HashMap::new(),
            default_material: "natural_white".to_string(),
        };
        for preset in &BUILTIN_MATERIALS {
            registry.register(preset.material());
        }
        registry
    }

    /// Registers a material, replacing any material with the same name.
    pub fn register(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Gets a material by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Returns true if a material with the given name is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// Gets the default material, if any material is registered.
    #[must_use]
    pub fn default_material(&self) -> Option<&Material> {
        self.materials
            .get(&self.default_material)
            .or_else(|| self.names().first().and_then(|name| self.materials.get(*name)))
    }

    /// Sets the default material name. Unknown names are ignored.
    pub fn set_default(&mut self, name: &str) {
        if self.materials.contains_key(name) {
            self.default_material = name.to_string();
        }
    }

    /// Applies the material called `name`. Returns false if it is unknown.
    pub fn apply(&self, name: &str, backend: &mut dyn RenderBackend, face: Face) -> bool {
        match self.get(name) {
            Some(material) => {
                material.apply(backend, face);
                true
            }
            None => {
                log::warn!("unknown material '{name}'");
                false
            }
        }
    }

    /// Returns all material names, with built-in materials first in a stable order,
    /// followed by custom materials sorted alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = builtin_names()
            .filter(|name| self.materials.contains_key(*name))
            .collect();
        let mut custom: Vec<&str> = self
            .materials
            .keys()
            .map(String::as_str)
            .filter(|name| !builtin_names().any(|builtin| builtin == *name))
            .collect();
        custom.sort_unstable();
        names.extend(custom);
        names
    }

    /// Returns the number of registered materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns true if no materials are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
