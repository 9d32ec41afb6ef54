//! Rendering backend abstraction.
//!
//! The toolbox never talks to a graphics API directly. Everything it draws
//! goes through [`RenderBackend`], a fixed-function style surface with a
//! model-view matrix stack, draw lists, vertex buffers, textures and shader
//! programs.
//! [`RecordingBackend`] implements it in memory for tests and headless use.

use std::collections::{HashMap, HashSet};
use std::fmt;

use glam::{DMat4, DVec3, Mat4, Vec4};
use gltoolbox_core::LightConfig;

use crate::error::{RenderError, RenderResult};
use crate::materials::Material;
use crate::mesh::{MeshData, Primitive, Vertex};
use crate::texture::{TextureImage, TextureWrap};

/// Handle to a compiled draw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(pub u32);

/// Handle to an uploaded vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Handle to an uploaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Handle to a compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// Handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Fixed-function state that can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Lighting,
    /// A single light, `0..8`.
    Light(u8),
    DepthTest,
    Blend,
    Normalize,
    PolygonOffsetFill,
    ColorMaterial,
    Texture2D,
    /// Smooth (as opposed to flat) shading.
    Smooth,
    PolygonSmoothHint,
    PerspectiveCorrectionHint,
    /// Fill both front and back polygon faces.
    FillBothFaces,
}

/// Polygon faces a material applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Face {
    Front,
    Back,
    #[default]
    FrontAndBack,
}

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Returns the conventional source file extension for this stage.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vsh",
            ShaderStage::Fragment => "fsh",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Value uploaded to a shader uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// One to four floats.
    Float(Vec<f32>),
    /// One to four integers.
    Int(Vec<i32>),
    /// A 4x4 matrix.
    Matrix(Mat4),
}

/// The graphics surface the toolbox renders through.
///
/// Angles are in degrees. Matrix operations post-multiply the current
/// model-view matrix, as a fixed-function pipeline does.
pub trait RenderBackend {
    /// Returns a human readable description of the backend.
    fn version_info(&self) -> String {
        "unknown backend".to_string()
    }

    fn load_identity(&mut self);
    fn look_at(&mut self, eye: DVec3, target: DVec3, up: DVec3);
    /// Replaces the projection matrix with a perspective projection.
    fn perspective(&mut self, fov_deg: f64, aspect: f64, near: f64, far: f64);
    fn viewport(&mut self, width: u32, height: u32);
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn translate(&mut self, offset: DVec3);
    fn scale(&mut self, factors: DVec3);
    fn rotate(&mut self, angle_deg: f64, axis: DVec3);

    fn color(&mut self, rgba: Vec4);
    fn clear_color(&mut self, rgba: Vec4);
    fn clear_depth(&mut self, depth: f64);
    /// Clears the color and depth buffers.
    fn clear(&mut self);
    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);

    fn material(&mut self, face: Face, material: &Material);
    fn light(&mut self, index: u8, config: &LightConfig);
    fn light_position(&mut self, index: u8, position: Vec4);

    /// Compiles mesh geometry into a reusable draw list.
    fn compile_list(&mut self, mesh: &MeshData) -> ListId;
    fn call_list(&mut self, list: ListId);

    /// Uploads `vertex_count` interleaved [`Vertex`](crate::mesh::Vertex)s
    /// from `bytes` into a triangle buffer.
    fn create_vertex_buffer(&mut self, bytes: &[u8], vertex_count: usize) -> BufferId;
    /// Draws `count` vertices of `buffer` as triangles, starting at `first`.
    fn draw_arrays(&mut self, buffer: BufferId, first: usize, count: usize);

    fn create_texture(&mut self, image: &TextureImage) -> TextureId;
    /// Binds `texture` to `unit`, or unbinds the unit with `None`.
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderId>;
    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> RenderResult<ProgramId>;
    /// Makes `program` current, or returns to fixed function with `None`.
    fn use_program(&mut self, program: Option<ProgramId>);
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue);
}

/// A call recorded by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadIdentity,
    LookAt {
        eye: DVec3,
        target: DVec3,
        up: DVec3,
    },
    Perspective {
        fov: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    Viewport {
        width: u32,
        height: u32,
    },
    PushMatrix,
    PopMatrix,
    Translate(DVec3),
    Scale(DVec3),
    Rotate {
        angle: f64,
        axis: DVec3,
    },
    Color(Vec4),
    ClearColor(Vec4),
    ClearDepth(f64),
    Clear,
    Enable(Capability),
    Disable(Capability),
    Material {
        face: Face,
        material: Material,
    },
    Light {
        index: u8,
        config: LightConfig,
    },
    LightPosition {
        index: u8,
        position: Vec4,
    },
    CompileList {
        list: ListId,
        primitive: Primitive,
        vertex_count: usize,
    },
    CallList(ListId),
    CreateVertexBuffer {
        buffer: BufferId,
        byte_len: usize,
        vertex_count: usize,
    },
    DrawArrays {
        buffer: BufferId,
        first: usize,
        count: usize,
    },
    CreateTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        wrap: TextureWrap,
    },
    BindTexture {
        unit: u32,
        texture: Option<TextureId>,
    },
    CompileShader {
        shader: ShaderId,
        stage: ShaderStage,
    },
    LinkProgram {
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
    },
    UseProgram(Option<ProgramId>),
    SetUniform {
        program: ProgramId,
        name: String,
        value: UniformValue,
    },
}

/// In-memory backend that records every call.
///
/// It keeps a CPU copy of the model-view matrix stack and of the toggled
/// state so tests can check both the call sequence and its outcome.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    model_view: DMat4,
    projection: DMat4,
    stack: Vec<DMat4>,
    enabled: HashSet<Capability>,
    bound_textures: HashMap<u32, TextureId>,
    shaders: HashMap<ShaderId, ShaderStage>,
    lists: HashMap<ListId, usize>,
    buffers: HashMap<BufferId, usize>,
    current_program: Option<ProgramId>,
    next_handle: u32,
}

impl RecordingBackend {
    /// Creates an empty recording backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            model_view: DMat4::IDENTITY,
            projection: DMat4::IDENTITY,
            stack: Vec::new(),
            enabled: HashSet::new(),
            bound_textures: HashMap::new(),
            shaders: HashMap::new(),
            lists: HashMap::new(),
            buffers: HashMap::new(),
            current_program: None,
            next_handle: 1,
        }
    }

    /// Returns every call recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns and forgets the recorded calls. State is kept.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Returns the current model-view matrix.
    #[must_use]
    pub fn model_view(&self) -> DMat4 {
        self.model_view
    }

    /// Returns the current projection matrix.
    #[must_use]
    pub fn projection(&self) -> DMat4 {
        self.projection
    }

    /// Returns the number of matrices pushed and not yet popped.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }

    #[must_use]
    pub fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.bound_textures.get(&unit).copied()
    }

    #[must_use]
    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    /// Returns the vertex count of a compiled list.
    #[must_use]
    pub fn list_vertex_count(&self, list: ListId) -> Option<usize> {
        self.lists.get(&list).copied()
    }

    /// Returns the vertex count of an uploaded buffer.
    #[must_use]
    pub fn buffer_vertex_count(&self, buffer: BufferId) -> Option<usize> {
        self.buffers.get(&buffer).copied()
    }

    fn next_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for RecordingBackend {
    fn version_info(&self) -> String {
        format!("gltoolbox recording backend {}", env!("CARGO_PKG_VERSION"))
    }

    fn load_identity(&mut self) {
        self.model_view = DMat4::IDENTITY;
        self.commands.push(Command::LoadIdentity);
    }

    fn look_at(&mut self, eye: DVec3, target: DVec3, up: DVec3) {
        self.model_view *= DMat4::look_at_rh(eye, target, up);
        self.commands.push(Command::LookAt { eye, target, up });
    }

    fn perspective(&mut self, fov_deg: f64, aspect: f64, near: f64, far: f64) {
        self.projection = DMat4::perspective_rh_gl(fov_deg.to_radians(), aspect, near, far);
        self.commands.push(Command::Perspective {
            fov: fov_deg,
            aspect,
            near,
            far,
        });
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.commands.push(Command::Viewport { width, height });
    }

    fn push_matrix(&mut self) {
        self.stack.push(self.model_view);
        self.commands.push(Command::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        match self.stack.pop() {
            Some(matrix) => self.model_view = matrix,
            None => log::warn!("pop_matrix called on an empty matrix stack"),
        }
        self.commands.push(Command::PopMatrix);
    }

    fn translate(&mut self, offset: DVec3) {
        self.model_view *= DMat4::from_translation(offset);
        self.commands.push(Command::Translate(offset));
    }

    fn scale(&mut self, factors: DVec3) {
        self.model_view *= DMat4::from_scale(factors);
        self.commands.push(Command::Scale(factors));
    }

    fn rotate(&mut self, angle_deg: f64, axis: DVec3) {
        if let Some(axis) = axis.try_normalize() {
            self.model_view *= DMat4::from_axis_angle(axis, angle_deg.to_radians());
        }
        self.commands.push(Command::Rotate {
            angle: angle_deg,
            axis,
        });
    }

    fn color(&mut self, rgba: Vec4) {
        self.commands.push(Command::Color(rgba));
    }

    fn clear_color(&mut self, rgba: Vec4) {
        self.commands.push(Command::ClearColor(rgba));
    }

    fn clear_depth(&mut self, depth: f64) {
        self.commands.push(Command::ClearDepth(depth));
    }

    fn clear(&mut self) {
        self.commands.push(Command::Clear);
    }

    fn enable(&mut self, capability: Capability) {
        self.enabled.insert(capability);
        self.commands.push(Command::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.enabled.remove(&capability);
        self.commands.push(Command::Disable(capability));
    }

    fn material(&mut self, face: Face, material: &Material) {
        self.commands.push(Command::Material {
            face,
            material: material.clone(),
        });
    }

    fn light(&mut self, index: u8, config: &LightConfig) {
        self.commands.push(Command::Light {
            index,
            config: config.clone(),
        });
    }

    fn light_position(&mut self, index: u8, position: Vec4) {
        self.commands.push(Command::LightPosition { index, position });
    }

    fn compile_list(&mut self, mesh: &MeshData) -> ListId {
        let list = ListId(self.next_handle());
        self.lists.insert(list, mesh.vertices.len());
        self.commands.push(Command::CompileList {
            list,
            primitive: mesh.primitive,
            vertex_count: mesh.vertices.len(),
        });
        list
    }

    fn call_list(&mut self, list: ListId) {
        if !self.lists.contains_key(&list) {
            log::warn!("calling unknown draw list {}", list.0);
        }
        self.commands.push(Command::CallList(list));
    }

    fn create_vertex_buffer(&mut self, bytes: &[u8], vertex_count: usize) -> BufferId {
        let buffer = BufferId(self.next_handle());
        if bytes.len() != vertex_count * std::mem::size_of::<Vertex>() {
            log::warn!(
                "vertex buffer {} holds {} bytes, expected {} vertices",
                buffer.0,
                bytes.len(),
                vertex_count
            );
        }
        self.buffers.insert(buffer, vertex_count);
        self.commands.push(Command::CreateVertexBuffer {
            buffer,
            byte_len: bytes.len(),
            vertex_count,
        });
        buffer
    }

    fn draw_arrays(&mut self, buffer: BufferId, first: usize, count: usize) {
        match self.buffers.get(&buffer) {
            None => log::warn!("drawing unknown vertex buffer {}", buffer.0),
            Some(&len) if first + count > len => log::warn!(
                "drawing vertices {first}..{} of buffer {} with {len} vertices",
                first + count,
                buffer.0
            ),
            Some(_) => {}
        }
        self.commands.push(Command::DrawArrays {
            buffer,
            first,
            count,
        });
    }

    fn create_texture(&mut self, image: &TextureImage) -> TextureId {
        let texture = TextureId(self.next_handle());
        self.commands.push(Command::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
            wrap: image.wrap,
        });
        texture
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        match texture {
            Some(id) => self.bound_textures.insert(unit, id),
            None => self.bound_textures.remove(&unit),
        };
        self.commands.push(Command::BindTexture { unit, texture });
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> RenderResult<ShaderId> {
        if source.trim().is_empty() {
            return Err(RenderError::ShaderCompilationFailed(format!(
                "empty {stage} shader source"
            )));
        }
        let shader = ShaderId(self.next_handle());
        self.shaders.insert(shader, stage);
        self.commands.push(Command::CompileShader { shader, stage });
        Ok(shader)
    }

    fn link_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> RenderResult<ProgramId> {
        for (shader, expected) in [(vertex, ShaderStage::Vertex), (fragment, ShaderStage::Fragment)] {
            match self.shaders.get(&shader) {
                Some(&stage) if stage == expected => {}
                Some(&stage) => {
                    return Err(RenderError::ProgramLinkFailed(format!(
                        "shader {} is a {stage} shader, expected {expected}",
                        shader.0
                    )))
                }
                None => {
                    return Err(RenderError::ProgramLinkFailed(format!(
                        "unknown shader {}",
                        shader.0
                    )))
                }
            }
        }
        let program = ProgramId(self.next_handle());
        self.commands.push(Command::LinkProgram {
            program,
            vertex,
            fragment,
        });
        Ok(program)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.current_program = program;
        self.commands.push(Command::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) {
        self.commands.push(Command::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_stack() {
        let mut backend = RecordingBackend::new();
        backend.push_matrix();
        backend.translate(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(backend.stack_depth(), 1);
        assert_eq!(
            backend.model_view().transform_point3(DVec3::ZERO),
            DVec3::new(1.0, 2.0, 3.0)
        );
        backend.pop_matrix();
        assert_eq!(backend.stack_depth(), 0);
        assert_eq!(backend.model_view(), DMat4::IDENTITY);
    }

    #[test]
    fn test_pop_empty_stack_is_noop() {
        let mut backend = RecordingBackend::new();
        backend.translate(DVec3::X);
        let before = backend.model_view();
        backend.pop_matrix();
        assert_eq!(backend.model_view(), before);
        assert_eq!(backend.commands().last(), Some(&Command::PopMatrix));
    }

    #[test]
    fn test_handles_are_unique() {
        let mut backend = RecordingBackend::new();
        let vs = backend
            .compile_shader(ShaderStage::Vertex, "void main() {}")
            .unwrap();
        let fs = backend
            .compile_shader(ShaderStage::Fragment, "void main() {}")
            .unwrap();
        assert_ne!(vs, fs);
        let program = backend.link_program(vs, fs).unwrap();
        assert_ne!(program.0, vs.0);
        assert_ne!(program.0, fs.0);
    }

    #[test]
    fn test_link_rejects_swapped_stages() {
        let mut backend = RecordingBackend::new();
        let vs = backend.compile_shader(ShaderStage::Vertex, "v").unwrap();
        let fs = backend.compile_shader(ShaderStage::Fragment, "f").unwrap();
        assert!(matches!(
            backend.link_program(fs, vs),
            Err(RenderError::ProgramLinkFailed(_))
        ));
        assert!(matches!(
            backend.link_program(vs, ShaderId(999)),
            Err(RenderError::ProgramLinkFailed(_))
        ));
    }

    #[test]
    fn test_empty_shader_fails() {
        let mut backend = RecordingBackend::new();
        assert!(matches!(
            backend.compile_shader(ShaderStage::Vertex, "   "),
            Err(RenderError::ShaderCompilationFailed(_))
        ));
    }

    #[test]
    fn test_enable_disable_tracking() {
        let mut backend = RecordingBackend::new();
        backend.enable(Capability::Light(2));
        assert!(backend.is_enabled(Capability::Light(2)));
        assert!(!backend.is_enabled(Capability::Light(1)));
        backend.disable(Capability::Light(2));
        assert!(!backend.is_enabled(Capability::Light(2)));
    }

    #[test]
    fn test_texture_binding() {
        let mut backend = RecordingBackend::new();
        backend.bind_texture(0, Some(TextureId(7)));
        assert_eq!(backend.bound_texture(0), Some(TextureId(7)));
        backend.bind_texture(0, None);
        assert_eq!(backend.bound_texture(0), None);
    }

    #[test]
    fn test_vertex_buffer_tracking() {
        let mut backend = RecordingBackend::new();
        let vertices = [Vertex::new(DVec3::ZERO, DVec3::Z); 3];
        let buffer = backend.create_vertex_buffer(bytemuck::cast_slice(&vertices), 3);
        assert_eq!(backend.buffer_vertex_count(buffer), Some(3));
        assert_eq!(
            backend.commands()[0],
            Command::CreateVertexBuffer {
                buffer,
                byte_len: 3 * std::mem::size_of::<Vertex>(),
                vertex_count: 3,
            }
        );

        backend.draw_arrays(buffer, 0, 3);
        assert_eq!(
            backend.commands().last(),
            Some(&Command::DrawArrays {
                buffer,
                first: 0,
                count: 3,
            })
        );
        assert_eq!(backend.buffer_vertex_count(BufferId(999)), None);
    }

    #[test]
    fn test_take_commands_keeps_state() {
        let mut backend = RecordingBackend::new();
        backend.push_matrix();
        assert_eq!(backend.take_commands(), vec![Command::PushMatrix]);
        assert!(backend.commands().is_empty());
        assert_eq!(backend.stack_depth(), 1);
    }
}
