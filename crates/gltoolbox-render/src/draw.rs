//! Draw-list and vertex-buffer helpers.

use glam::{DVec3, Vec4};
use gltoolbox_core::ToolboxError;

use crate::backend::{BufferId, Capability, ListId, RenderBackend, TextureId};
use crate::error::RenderResult;
use crate::mesh::MeshData;

/// Placement of a draw list in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawTransform {
    pub position: DVec3,
    /// Angle in degrees and rotation axis.
    pub rotation: Option<(f64, DVec3)>,
    pub scale: Option<DVec3>,
    pub color: Option<Vec4>,
}

impl DrawTransform {
    /// Creates a transform that only translates.
    #[must_use]
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, angle: f64, axis: DVec3) -> Self {
        self.rotation = Some((angle, axis));
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = Some(color);
        self
    }
}

fn apply_transform(backend: &mut dyn RenderBackend, transform: &DrawTransform) {
    backend.translate(transform.position);
    if let Some(scale) = transform.scale {
        backend.scale(scale);
    }
    if let Some((angle, axis)) = transform.rotation {
        backend.rotate(angle, axis);
    }
    if let Some(color) = transform.color {
        backend.color(color);
    }
}

fn bind_textures(backend: &mut dyn RenderBackend, textures: &[TextureId]) {
    if textures.is_empty() {
        return;
    }
    backend.enable(Capability::Texture2D);
    for (unit, &texture) in (0u32..).zip(textures) {
        backend.bind_texture(unit, Some(texture));
    }
}

fn release_textures(backend: &mut dyn RenderBackend, textures: &[TextureId]) {
    if textures.is_empty() {
        return;
    }
    for (unit, _) in (0u32..).zip(textures) {
        backend.bind_texture(unit, None);
    }
    backend.disable(Capability::Texture2D);
}

/// Draws a compiled list inside its own matrix scope.
///
/// Order: translate, scale, rotate, colour, call.
pub fn draw_list(backend: &mut dyn RenderBackend, list: ListId, transform: &DrawTransform) {
    backend.push_matrix();
    apply_transform(backend, transform);
    backend.call_list(list);
    backend.pop_matrix();
}

/// Compiles a mesh into a draw list.
///
/// The mesh textures are bound to units `0..n` while compiling and released
/// afterwards.
pub fn compile_mesh(backend: &mut dyn RenderBackend, mesh: &MeshData) -> ListId {
    bind_textures(backend, &mesh.textures);
    let list = backend.compile_list(mesh);
    release_textures(backend, &mesh.textures);
    log::debug!(
        "compiled draw list {} ({} vertices, {} textures)",
        list.0,
        mesh.vertex_count(),
        mesh.textures.len()
    );
    list
}

/// Triangle geometry uploaded to a vertex buffer.
///
/// Unlike a draw list the textures are not baked in: they are bound to
/// units `0..n` on every [`draw_buffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBuffer {
    buffer: BufferId,
    vertex_count: usize,
    color: Option<Vec4>,
    textures: Vec<TextureId>,
}

impl VertexBuffer {
    #[must_use]
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[must_use]
    pub fn textures(&self) -> &[TextureId] {
        &self.textures
    }
}

/// Uploads a mesh into a vertex buffer, triangulating it first.
///
/// # Errors
///
/// Fails for line meshes and for meshes without any triangle.
pub fn upload_mesh(
    backend: &mut dyn RenderBackend,
    mesh: &MeshData,
) -> RenderResult<VertexBuffer> {
    let triangles = mesh.triangulated()?;
    if triangles.vertices.is_empty() {
        return Err(ToolboxError::InvalidArgument(
            "cannot upload a mesh without triangles".to_string(),
        )
        .into());
    }
    let buffer = backend.create_vertex_buffer(triangles.vertex_bytes(), triangles.vertex_count());
    log::debug!(
        "uploaded vertex buffer {} ({} vertices, {} textures)",
        buffer.0,
        triangles.vertex_count(),
        triangles.textures.len()
    );
    Ok(VertexBuffer {
        buffer,
        vertex_count: triangles.vertex_count(),
        color: triangles.color,
        textures: triangles.textures,
    })
}

/// Draws a vertex buffer inside its own matrix scope.
///
/// Order: translate, scale, rotate, colour, bind textures, draw, release
/// textures. The transform colour overrides the mesh colour.
pub fn draw_buffer(
    backend: &mut dyn RenderBackend,
    buffer: &VertexBuffer,
    transform: &DrawTransform,
) {
    let transform = DrawTransform {
        color: transform.color.or(buffer.color),
        ..*transform
    };
    backend.push_matrix();
    apply_transform(backend, &transform);
    bind_textures(backend, &buffer.textures);
    backend.draw_arrays(buffer.buffer, 0, buffer.vertex_count);
    release_textures(backend, &buffer.textures);
    backend.pop_matrix();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, RecordingBackend};
    use crate::mesh::{self, Primitive};

    #[test]
    fn test_draw_list_order() {
        let mut backend = RecordingBackend::new();
        let list = compile_mesh(&mut backend, &mesh::cube().unwrap());
        backend.take_commands();

        let transform = DrawTransform::at(DVec3::new(1.0, 2.0, 3.0))
            .with_rotation(90.0, DVec3::Z)
            .with_scale(DVec3::splat(2.0))
            .with_color(Vec4::ONE);
        draw_list(&mut backend, list, &transform);

        assert_eq!(
            backend.commands(),
            [
                Command::PushMatrix,
                Command::Translate(DVec3::new(1.0, 2.0, 3.0)),
                Command::Scale(DVec3::splat(2.0)),
                Command::Rotate {
                    angle: 90.0,
                    axis: DVec3::Z,
                },
                Command::Color(Vec4::ONE),
                Command::CallList(list),
                Command::PopMatrix,
            ]
        );
        assert_eq!(backend.stack_depth(), 0);
    }

    #[test]
    fn test_draw_list_restores_matrix() {
        let mut backend = RecordingBackend::new();
        let list = compile_mesh(&mut backend, &mesh::diamond().unwrap());
        let before = backend.model_view();
        draw_list(
            &mut backend,
            list,
            &DrawTransform::at(DVec3::X).with_rotation(45.0, DVec3::Y),
        );
        assert_eq!(backend.model_view(), before);
    }

    #[test]
    fn test_draw_list_skips_unset_parts() {
        let mut backend = RecordingBackend::new();
        let list = compile_mesh(&mut backend, &mesh::cube().unwrap());
        backend.take_commands();

        draw_list(&mut backend, list, &DrawTransform::default());
        assert_eq!(backend.commands().len(), 4);
    }

    #[test]
    fn test_upload_mesh() {
        let mut backend = RecordingBackend::new();
        let pyramid = mesh::pyramid().unwrap();
        let buffer = upload_mesh(&mut backend, &pyramid).unwrap();
        assert_eq!(buffer.vertex_count(), 18);
        assert_eq!(backend.buffer_vertex_count(buffer.buffer()), Some(18));
        assert_eq!(
            backend.commands(),
            [Command::CreateVertexBuffer {
                buffer: buffer.buffer(),
                byte_len: pyramid.vertex_bytes().len(),
                vertex_count: 18,
            }]
        );

        // Quads are split into two triangles each
        let cube = upload_mesh(&mut backend, &mesh::cube().unwrap()).unwrap();
        assert_eq!(cube.vertex_count(), 36);
        assert_ne!(cube.buffer(), buffer.buffer());
    }

    #[test]
    fn test_upload_mesh_rejects_lines_and_empty() {
        let mut backend = RecordingBackend::new();
        assert!(upload_mesh(&mut backend, &mesh::axes(1.0, true).unwrap()).is_err());
        assert!(upload_mesh(&mut backend, &MeshData::new(Primitive::Triangles)).is_err());
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_draw_buffer_binds_textures_per_unit() {
        let mut backend = RecordingBackend::new();
        let textures = [TextureId(4), TextureId(5)];
        let tetra = mesh::tetrahedron(2.0).unwrap().with_textures(&textures);
        let buffer = upload_mesh(&mut backend, &tetra).unwrap();
        backend.take_commands();

        draw_buffer(&mut backend, &buffer, &DrawTransform::at(DVec3::Z));
        assert_eq!(
            backend.commands(),
            [
                Command::PushMatrix,
                Command::Translate(DVec3::Z),
                Command::Enable(Capability::Texture2D),
                Command::BindTexture {
                    unit: 0,
                    texture: Some(TextureId(4)),
                },
                Command::BindTexture {
                    unit: 1,
                    texture: Some(TextureId(5)),
                },
                Command::DrawArrays {
                    buffer: buffer.buffer(),
                    first: 0,
                    count: 12,
                },
                Command::BindTexture {
                    unit: 0,
                    texture: None,
                },
                Command::BindTexture {
                    unit: 1,
                    texture: None,
                },
                Command::Disable(Capability::Texture2D),
                Command::PopMatrix,
            ]
        );
        assert_eq!(backend.stack_depth(), 0);
        assert_eq!(backend.bound_texture(0), None);
    }

    #[test]
    fn test_draw_buffer_color() {
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let mut backend = RecordingBackend::new();
        let pyramid = mesh::pyramid().unwrap().with_color(red);
        let buffer = upload_mesh(&mut backend, &pyramid).unwrap();

        backend.take_commands();
        draw_buffer(&mut backend, &buffer, &DrawTransform::default());
        assert!(backend.commands().contains(&Command::Color(red)));

        backend.take_commands();
        let white = DrawTransform::default().with_color(Vec4::ONE);
        draw_buffer(&mut backend, &buffer, &white);
        assert!(backend.commands().contains(&Command::Color(Vec4::ONE)));
        assert!(!backend.commands().contains(&Command::Color(red)));
    }

    #[test]
    fn test_compile_mesh_binds_textures() {
        let mut backend = RecordingBackend::new();
        let textures = [TextureId(7), TextureId(8)];
        let mesh = mesh::cube_textured(&textures).unwrap();
        let list = compile_mesh(&mut backend, &mesh);

        let commands = backend.commands();
        assert_eq!(commands[0], Command::Enable(Capability::Texture2D));
        assert_eq!(
            commands[1],
            Command::BindTexture {
                unit: 0,
                texture: Some(TextureId(7)),
            }
        );
        assert_eq!(
            commands[2],
            Command::BindTexture {
                unit: 1,
                texture: Some(TextureId(8)),
            }
        );
        assert_eq!(
            commands[3],
            Command::CompileList {
                list,
                primitive: Primitive::Quads,
                vertex_count: 24,
            }
        );
        assert_eq!(backend.bound_texture(0), None);
        assert_eq!(backend.bound_texture(1), None);
        assert!(!backend.is_enabled(Capability::Texture2D));
        assert_eq!(backend.list_vertex_count(list), Some(24));
    }
}
