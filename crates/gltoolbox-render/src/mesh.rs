//! Primitive meshes and OBJ import.
//!
//! Every builder returns a [`MeshData`] ready for
//! [`RenderBackend::compile_list`](crate::backend::RenderBackend::compile_list).
//! Flat faces share the normal of their first three corners, so corners are
//! listed counter-clockwise as seen from outside the solid. Curved surfaces
//! (sphere, cone, torus) carry smooth per-vertex normals instead.

use std::f64::consts::{PI, TAU};
use std::path::Path;

use glam::{DVec3, Vec3, Vec4};
use gltoolbox_core::{normal_3_points, ToolboxError};

use crate::backend::TextureId;
use crate::error::{RenderError, RenderResult};

const WHITE: [f32; 4] = [1.0; 4];

/// Corner texture coordinates of a square face.
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Corner texture coordinates of a pyramid side.
const TRIANGLE_UVS: [[f32; 2]; 3] = [[0.0, 0.0], [0.5, 1.0], [1.0, 0.0]];

/// How the vertices of a mesh are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Primitive {
    /// Independent triangles.
    #[default]
    Triangles,
    /// Independent quads.
    Quads,
    /// A single convex polygon.
    Polygon,
    /// Independent line segments.
    Lines,
}

impl Primitive {
    /// Vertices consumed per face, `None` for a polygon of any size.
    #[must_use]
    pub fn vertices_per_face(self) -> Option<usize> {
        match self {
            Self::Triangles => Some(3),
            Self::Quads => Some(4),
            Self::Lines => Some(2),
            Self::Polygon => None,
        }
    }
}

/// A single mesh vertex, laid out for direct upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Creates a white vertex with zero texture coordinates.
    #[must_use]
    pub fn new(position: DVec3, normal: DVec3) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            normal: normal.as_vec3().to_array(),
            uv: [0.0; 2],
            color: WHITE,
        }
    }

    /// Sets the texture coordinates.
    #[must_use]
    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv = uv;
        self
    }

    /// Sets the vertex colour.
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color.to_array();
        self
    }

    /// Returns the position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Returns the normal as a vector.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        Vec3::from(self.normal)
    }
}

/// CPU-side geometry for one draw list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub primitive: Primitive,
    pub vertices: Vec<Vertex>,
    /// Colour set once before the vertices are emitted.
    pub color: Option<Vec4>,
    /// Textures bound to consecutive units while the list is compiled.
    pub textures: Vec<TextureId>,
}

impl MeshData {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            ..Self::default()
        }
    }

    /// Sets the mesh colour.
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the textures bound while compiling.
    #[must_use]
    pub fn with_textures(mut self, textures: &[TextureId]) -> Self {
        self.textures = textures.to_vec();
        self
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces (or segments for lines).
    #[must_use]
    pub fn face_count(&self) -> usize {
        match self.primitive.vertices_per_face() {
            Some(n) => self.vertices.len() / n,
            None => usize::from(!self.vertices.is_empty()),
        }
    }

    /// Returns the raw vertex buffer.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the mesh as independent triangles.
    ///
    /// Quads and polygons are fan-triangulated; a polygon with fewer than
    /// three vertices yields no triangles.
    ///
    /// # Errors
    ///
    /// Line meshes have no triangle form.
    pub fn triangulated(&self) -> RenderResult<MeshData> {
        let corners = match self.primitive {
            Primitive::Triangles => return Ok(self.clone()),
            Primitive::Lines => {
                return Err(invalid("line meshes cannot be triangulated".to_string()))
            }
            Primitive::Quads => 4,
            Primitive::Polygon => self.vertices.len(),
        };
        let mut triangles = MeshData {
            primitive: Primitive::Triangles,
            vertices: Vec::new(),
            color: self.color,
            textures: self.textures.clone(),
        };
        if corners >= 3 {
            for face in self.vertices.chunks_exact(corners) {
                for i in 1..corners - 1 {
                    triangles.vertices.extend([face[0], face[i], face[i + 1]]);
                }
            }
        }
        Ok(triangles)
    }

    /// Returns the axis-aligned bounding box, `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position();
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.position()), max.max(v.position()))
        }))
    }

    fn push_smooth(&mut self, position: DVec3, normal: DVec3) {
        self.vertices.push(Vertex::new(position, normal));
    }

    /// Appends a flat face. Triangle meshes fan-triangulate larger faces.
    fn push_face(&mut self, corners: &[DVec3], uvs: &[[f32; 2]]) -> RenderResult<()> {
        let normal = normal_3_points(corners[0], corners[1], corners[2])?;
        let vertex = |i: usize| {
            Vertex::new(corners[i], normal).with_uv(uvs.get(i).copied().unwrap_or_default())
        };
        if self.primitive == Primitive::Triangles {
            for i in 1..corners.len() - 1 {
                self.vertices.extend([vertex(0), vertex(i), vertex(i + 1)]);
            }
        } else {
            self.vertices.extend((0..corners.len()).map(vertex));
        }
        Ok(())
    }

    /// Appends a flat face, flipping it first if it faces the origin.
    fn push_outward(&mut self, corners: &mut [DVec3]) -> RenderResult<()> {
        let centroid = corners.iter().copied().sum::<DVec3>() / corners.len() as f64;
        if normal_3_points(corners[0], corners[1], corners[2])?.dot(centroid) < 0.0 {
            corners.reverse();
        }
        self.push_face(corners, &[])
    }
}

fn invalid(message: String) -> RenderError {
    ToolboxError::InvalidArgument(message).into()
}

/// Creates a unit sphere from `lats` latitude bands and `longs` meridians.
///
/// # Errors
///
/// Fails unless `lats >= 3` and `longs >= 10`.
pub fn sphere(lats: u32, longs: u32) -> RenderResult<MeshData> {
    if lats < 3 || longs < 10 {
        return Err(invalid(format!(
            "sphere needs lats >= 3 and longs >= 10, got {lats} and {longs}"
        )));
    }
    let point = |lat: f64, long: f64| {
        DVec3::new(long.cos() * lat.cos(), long.sin() * lat.cos(), lat.sin())
    };
    let mut mesh = MeshData::new(Primitive::Triangles);
    for i in 1..=lats {
        let lat0 = PI * (-0.5 + f64::from(i - 1) / f64::from(lats));
        let lat1 = PI * (-0.5 + f64::from(i) / f64::from(lats));
        for j in 0..longs {
            let long0 = TAU * f64::from(j) / f64::from(longs);
            let long1 = TAU * f64::from(j + 1) / f64::from(longs);
            let quad = [
                point(lat0, long0),
                point(lat0, long1),
                point(lat1, long1),
                point(lat1, long0),
            ];
            for k in [0, 1, 2, 0, 2, 3] {
                mesh.push_smooth(quad[k], quad[k]);
            }
        }
    }
    Ok(mesh)
}

/// Creates a flat circle in the XY plane as a single polygon.
///
/// Vertices are placed every `step` degrees from 0 up to and including 360.
///
/// # Errors
///
/// Fails if `step` is not positive or `normal` is zero.
pub fn circle(radius: f64, step: f64, normal: DVec3) -> RenderResult<MeshData> {
    if step.is_nan() || step <= 0.0 {
        return Err(invalid(format!("circle step must be positive, got {step}")));
    }
    let normal = normal
        .try_normalize()
        .ok_or_else(|| invalid("circle normal must not be zero".to_string()))?;
    let count = (360.0 / step).floor() as u64;
    let mut mesh = MeshData::new(Primitive::Polygon);
    for k in 0..=count {
        let angle = (k as f64 * step).to_radians();
        mesh.push_smooth(
            DVec3::new(angle.sin() * radius, angle.cos() * radius, 0.0),
            normal,
        );
    }
    Ok(mesh)
}

/// Creates a cone standing on the XY plane with its apex at `z = height`.
///
/// The side is split into `lat` slices and `lng` stacks. A base disc slightly
/// smaller than `base` closes the bottom.
///
/// # Errors
///
/// Fails unless `lat >= 3` and `lng >= 10`.
pub fn cone(base: f64, height: f64, lat: u32, lng: u32) -> RenderResult<MeshData> {
    if lat < 3 || lng < 10 {
        return Err(invalid(format!(
            "cone needs lat >= 3 and lng >= 10, got {lat} and {lng}"
        )));
    }
    let slice = |s: u32| TAU * f64::from(s) / f64::from(lat);
    let ring = |radius: f64, z: f64, angle: f64| {
        DVec3::new(radius * angle.cos(), radius * angle.sin(), z)
    };
    let side_normal =
        |angle: f64| DVec3::new(angle.cos() * height, angle.sin() * height, base).normalize_or_zero();

    let mut mesh = MeshData::new(Primitive::Triangles);
    for k in 0..lng {
        let t0 = f64::from(k) / f64::from(lng);
        let t1 = f64::from(k + 1) / f64::from(lng);
        let (r0, z0) = (base * (1.0 - t0), height * t0);
        let (r1, z1) = (base * (1.0 - t1), height * t1);
        for s in 0..lat {
            let (a0, a1) = (slice(s), slice(s + 1));
            let quad = [
                (ring(r0, z0, a0), a0),
                (ring(r0, z0, a1), a1),
                (ring(r1, z1, a1), a1),
                (ring(r1, z1, a0), a0),
            ];
            for i in [0, 1, 2, 0, 2, 3] {
                mesh.push_smooth(quad[i].0, side_normal(quad[i].1));
            }
        }
    }

    let disc = (base - 0.05).max(0.0);
    for s in 0..lat {
        let (a0, a1) = (slice(s), slice(s + 1));
        for point in [DVec3::ZERO, ring(disc, 0.0, a1), ring(disc, 0.0, a0)] {
            mesh.push_smooth(point, DVec3::NEG_Z);
        }
    }
    Ok(mesh)
}

fn cube_corners() -> [DVec3; 8] {
    [
        DVec3::new(-1.0, -1.0, -1.0),
        DVec3::new(1.0, -1.0, -1.0),
        DVec3::new(1.0, -1.0, 1.0),
        DVec3::new(-1.0, -1.0, 1.0),
        DVec3::new(-1.0, 1.0, -1.0),
        DVec3::new(1.0, 1.0, -1.0),
        DVec3::new(1.0, 1.0, 1.0),
        DVec3::new(-1.0, 1.0, 1.0),
    ]
}

fn build_cube(uvs: &[[f32; 2]]) -> RenderResult<MeshData> {
    let [a, b, c, d, e, f, g, h] = cube_corners();
    let mut mesh = MeshData::new(Primitive::Quads);
    for face in [
        [a, b, c, d],
        [b, f, g, c],
        [f, e, h, g],
        [e, a, d, h],
        [d, c, g, h],
        [a, e, f, b],
    ] {
        mesh.push_face(&face, uvs)?;
    }
    Ok(mesh)
}

/// Creates a cube spanning `[-1, 1]` on every axis.
pub fn cube() -> RenderResult<MeshData> {
    build_cube(&[])
}

/// Creates a cube with every face mapped to the full texture.
pub fn cube_textured(textures: &[TextureId]) -> RenderResult<MeshData> {
    Ok(build_cube(&QUAD_UVS)?.with_textures(textures))
}

fn build_pyramid(base_uvs: &[[f32; 2]], side_uvs: &[[f32; 2]]) -> RenderResult<MeshData> {
    let edge = 2.0;
    let a = DVec3::new(-0.5, -0.5, -0.333) * edge;
    let b = DVec3::new(0.5, -0.5, -0.333) * edge;
    let c = DVec3::new(0.5, 0.5, -0.333) * edge;
    let d = DVec3::new(-0.5, 0.5, -0.333) * edge;
    let e = DVec3::new(0.0, 0.0, 0.666) * edge;

    let mut mesh = MeshData::new(Primitive::Triangles);
    mesh.push_face(&[d, c, b, a], base_uvs)?;
    for side in [[a, b, e], [b, c, e], [c, d, e], [d, a, e]] {
        mesh.push_face(&side, side_uvs)?;
    }
    Ok(mesh)
}

/// Creates a square pyramid with edge 2 and its apex on +Z.
pub fn pyramid() -> RenderResult<MeshData> {
    build_pyramid(&[], &[])
}

/// Creates a textured square pyramid.
pub fn pyramid_textured(textures: &[TextureId]) -> RenderResult<MeshData> {
    Ok(build_pyramid(&QUAD_UVS, &TRIANGLE_UVS)?.with_textures(textures))
}

/// Creates a double pyramid over the square `[-1, 1]²`, tips at `z = ±1`.
pub fn diamond() -> RenderResult<MeshData> {
    let a = DVec3::new(-1.0, -1.0, 0.0);
    let b = DVec3::new(1.0, -1.0, 0.0);
    let c = DVec3::new(1.0, 1.0, 0.0);
    let d = DVec3::new(-1.0, 1.0, 0.0);
    let e = DVec3::Z;
    let f = DVec3::NEG_Z;

    let mut mesh = MeshData::new(Primitive::Triangles);
    for face in [
        [a, b, e],
        [b, c, e],
        [c, d, e],
        [d, a, e],
        [b, a, f],
        [c, b, f],
        [d, c, f],
        [a, d, f],
    ] {
        mesh.push_face(&face, &[])?;
    }
    Ok(mesh)
}

/// Creates a torus around the Z axis.
///
/// `minr` is the tube radius and `maxr` the distance from the axis to the
/// tube centre. The tube is split into `lat` sides and the ring into `lng`
/// segments.
///
/// # Errors
///
/// Fails unless `lat >= 3` and `lng >= 3`.
pub fn torus(minr: f64, maxr: f64, lat: u32, lng: u32) -> RenderResult<MeshData> {
    if lat < 3 || lng < 3 {
        return Err(invalid(format!(
            "torus needs lat >= 3 and lng >= 3, got {lat} and {lng}"
        )));
    }
    let normal = |u: f64, v: f64| DVec3::new(v.cos() * u.cos(), v.cos() * u.sin(), v.sin());
    let point = |u: f64, v: f64| {
        let n = normal(u, v);
        DVec3::new(u.cos() * maxr, u.sin() * maxr, 0.0) + n * minr
    };
    let mut mesh = MeshData::new(Primitive::Triangles);
    for i in 0..lng {
        let u0 = TAU * f64::from(i) / f64::from(lng);
        let u1 = TAU * f64::from(i + 1) / f64::from(lng);
        for j in 0..lat {
            let v0 = TAU * f64::from(j) / f64::from(lat);
            let v1 = TAU * f64::from(j + 1) / f64::from(lat);
            let quad = [(u0, v0), (u1, v0), (u1, v1), (u0, v1)];
            for k in [0, 1, 2, 0, 2, 3] {
                let (u, v) = quad[k];
                mesh.push_smooth(point(u, v), normal(u, v));
            }
        }
    }
    Ok(mesh)
}

/// Creates a regular tetrahedron centred on the origin, apex on +Z.
///
/// # Errors
///
/// Fails if `edge` is not positive.
pub fn tetrahedron(edge: f64) -> RenderResult<MeshData> {
    if edge.is_nan() || edge <= 0.0 {
        return Err(invalid(format!("tetrahedron edge must be positive, got {edge}")));
    }
    // Base inradius, circumradius and the solid's height, for edge 1
    let inradius = 3f64.sqrt() / 6.0;
    let height = (2.0f64 / 3.0).sqrt();
    let base_z = -height / 4.0;
    let a = DVec3::new(-0.5, -inradius, base_z) * edge;
    let b = DVec3::new(0.5, -inradius, base_z) * edge;
    let c = DVec3::new(0.0, 2.0 * inradius, base_z) * edge;
    let d = DVec3::new(0.0, 0.0, base_z + height) * edge;

    let mut mesh = MeshData::new(Primitive::Triangles);
    for face in [[a, b, d], [b, c, d], [c, a, d], [c, b, a]] {
        mesh.push_face(&face, &[])?;
    }
    Ok(mesh)
}

/// Creates a regular octahedron with unit circumradius.
pub fn octahedron() -> RenderResult<MeshData> {
    let mut mesh = MeshData::new(Primitive::Triangles);
    for sx in [1.0, -1.0] {
        for sy in [1.0, -1.0] {
            for sz in [1.0, -1.0] {
                mesh.push_outward(&mut [DVec3::X * sx, DVec3::Y * sy, DVec3::Z * sz])?;
            }
        }
    }
    Ok(mesh)
}

fn golden_ratio() -> f64 {
    (1.0 + 5f64.sqrt()) / 2.0
}

/// Icosahedron corners with edge length 2.
fn icosahedron_corners() -> Vec<DVec3> {
    let phi = golden_ratio();
    let mut corners = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-phi, phi] {
            corners.push(DVec3::new(0.0, a, b));
            corners.push(DVec3::new(a, b, 0.0));
            corners.push(DVec3::new(b, 0.0, a));
        }
    }
    corners
}

/// The 20 icosahedron faces, found as the corner triples at edge distance.
fn icosahedron_faces(corners: &[DVec3]) -> Vec<[DVec3; 3]> {
    let is_edge = |p: DVec3, q: DVec3| (p.distance(q) - 2.0).abs() < 1e-9;
    let mut faces = Vec::with_capacity(20);
    for (i, &p) in corners.iter().enumerate() {
        for (j, &q) in corners.iter().enumerate().skip(i + 1) {
            if !is_edge(p, q) {
                continue;
            }
            for &r in corners.iter().skip(j + 1) {
                if is_edge(p, r) && is_edge(q, r) {
                    faces.push([p, q, r]);
                }
            }
        }
    }
    faces
}

/// Creates a regular icosahedron with unit circumradius.
pub fn icosahedron() -> RenderResult<MeshData> {
    let corners = icosahedron_corners();
    let mut mesh = MeshData::new(Primitive::Triangles);
    for face in icosahedron_faces(&corners) {
        mesh.push_outward(&mut face.map(DVec3::normalize))?;
    }
    Ok(mesh)
}

/// Creates a regular dodecahedron with circumradius `sqrt(3)`.
///
/// Built as the dual of the icosahedron: each icosahedron corner becomes a
/// pentagon joining the centres of the five faces around it.
pub fn dodecahedron() -> RenderResult<MeshData> {
    let corners = icosahedron_corners();
    let faces = icosahedron_faces(&corners);
    let radius = 3f64.sqrt();

    let mut mesh = MeshData::new(Primitive::Triangles);
    for apex in corners {
        let mut pentagon: Vec<DVec3> = faces
            .iter()
            .filter(|face| face.contains(&apex))
            .map(|face| (face[0] + face[1] + face[2]).normalize() * radius)
            .collect();
        sort_around(&mut pentagon, apex);
        mesh.push_outward(&mut pentagon)?;
    }
    Ok(mesh)
}

/// Orders points by their angle around `axis`.
fn sort_around(points: &mut [DVec3], axis: DVec3) {
    let Some(&first) = points.first() else {
        return;
    };
    let axis = axis.normalize();
    let u = (first - axis * first.dot(axis)).normalize();
    let w = axis.cross(u);
    let angle = |p: &DVec3| p.dot(w).atan2(p.dot(u));
    points.sort_by(|p, q| angle(p).total_cmp(&angle(q)));
}

/// Creates coloured axis lines: X red, Y green, Z blue.
///
/// The sign of `size` is ignored. With `both` the negative half-axes are
/// drawn too.
///
/// # Errors
///
/// Fails if `size` is zero or not finite.
pub fn axes(size: f64, both: bool) -> RenderResult<MeshData> {
    let size = size.abs();
    if size == 0.0 || !size.is_finite() {
        return Err(invalid(format!("axes size must be non-zero, got {size}")));
    }
    let colors = [
        Vec4::new(1.0, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 1.0, 0.0, 1.0),
        Vec4::new(0.0, 0.0, 1.0, 1.0),
    ];
    let signs: &[f64] = if both { &[1.0, -1.0] } else { &[1.0] };

    let mut mesh = MeshData::new(Primitive::Lines);
    for &sign in signs {
        for (unit, color) in [DVec3::X, DVec3::Y, DVec3::Z].into_iter().zip(colors) {
            mesh.vertices.push(Vertex::new(DVec3::ZERO, DVec3::ZERO).with_color(color));
            mesh.vertices
                .push(Vertex::new(unit * size * sign, DVec3::ZERO).with_color(color));
        }
    }
    Ok(mesh)
}

/// Loads a Wavefront OBJ file as a triangle mesh.
///
/// All models in the file are merged. Faces are triangulated and, when the
/// file has no normals, every triangle gets its flat face normal.
///
/// # Errors
///
/// Returns [`RenderError::MeshLoadFailed`] if the file cannot be read or
/// parsed.
pub fn load_obj(path: impl AsRef<Path>) -> RenderResult<MeshData> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let mut mesh = MeshData::new(Primitive::Triangles);
    for model in &models {
        let source = &model.mesh;
        let triple = |data: &[f32], i: usize| {
            DVec3::new(
                f64::from(data[3 * i]),
                f64::from(data[3 * i + 1]),
                f64::from(data[3 * i + 2]),
            )
        };
        for triangle in source.indices.chunks_exact(3) {
            let ids = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let face_normal = if source.normals.is_empty() {
                let [p, q, r] = ids.map(|i| triple(&source.positions, i));
                Some(normal_3_points(p, q, r).unwrap_or(DVec3::ZERO))
            } else {
                None
            };
            for i in ids {
                let normal = face_normal.unwrap_or_else(|| triple(&source.normals, i));
                let mut vertex = Vertex::new(triple(&source.positions, i), normal);
                if !source.texcoords.is_empty() {
                    vertex.uv = [source.texcoords[2 * i], source.texcoords[2 * i + 1]];
                }
                mesh.vertices.push(vertex);
            }
        }
    }

    log::info!(
        "loaded mesh '{}': {} models, {} triangles",
        path.display(),
        models.len(),
        mesh.face_count()
    );
    Ok(mesh)
}
