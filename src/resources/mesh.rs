use std::{
    collections::{HashMap, HashSet},
    io::{BufReader, Cursor},
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    gpu::{
        BufferHandle, BufferKind, DrawCall, GpuBackend, ObjectUniform, ProgramHandle,
        TextureHandle, VertexArrayHandle, VertexLayout,
    },
    math::{Vec2, Vec3},
    resources::texture::{Texture, load_texture},
};

/// Normal used for vertices the file gives none for.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// A contiguous index range drawn with one texture.
#[derive(Clone, Debug, PartialEq)]
pub struct SubMesh {
    pub index_offset: u32,
    pub index_count: u32,
    pub texture: Option<Texture>,
    pub material: Option<String>,
}

impl SubMesh {
    pub fn untextured(index_offset: u32, index_count: u32) -> Self {
        Self {
            index_offset,
            index_count,
            texture: None,
            material: None,
        }
    }
}

/// GPU objects owned by an uploaded [`Mesh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuMesh {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub vertex_array: VertexArrayHandle,
}

/// Parsed OBJ geometry before any GPU work.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub submeshes: Vec<SubMeshData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubMeshData {
    pub index_offset: u32,
    pub index_count: u32,
    pub material: Option<String>,
    /// Diffuse map, already resolved against the OBJ's directory.
    pub texture_path: Option<PathBuf>,
}

/// Triangle geometry with per-vertex UVs and normals, split into textured
/// submeshes.
///
/// A mesh owns its GPU objects and its submesh textures. They are only
/// released by [`Mesh::destroy`]; dropping an uploaded mesh leaks them.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub submeshes: Vec<SubMesh>,
    gpu: Option<GpuMesh>,
}

impl Mesh {
    /// Build a mesh from in-memory geometry.
    ///
    /// Empty `tex_coords` / `normals` are filled with (0, 0) and +Z.
    pub fn from_data(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        tex_coords: Vec<Vec2>,
        normals: Vec<Vec3>,
        indices: Vec<u32>,
        submeshes: Vec<SubMesh>,
    ) -> Result<Self> {
        let count = vertices.len();
        let tex_coords = if tex_coords.is_empty() {
            vec![Vec2::new(0.0, 0.0); count]
        } else {
            tex_coords
        };
        let normals = if normals.is_empty() {
            vec![DEFAULT_NORMAL.into(); count]
        } else {
            normals
        };

        let mesh = Self {
            name: name.into(),
            vertices,
            tex_coords,
            normals,
            indices,
            submeshes,
            gpu: None,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            Err(Error::InvalidMesh {
                name: self.name.clone(),
                reason,
            })
        };
        let count = self.vertices.len();
        if self.tex_coords.len() != count || self.normals.len() != count {
            return invalid(format!(
                "{count} positions but {} uvs and {} normals",
                self.tex_coords.len(),
                self.normals.len()
            ));
        }
        if self.indices.len() % 3 != 0 {
            return invalid(format!("{} indices is not a whole number of triangles", self.indices.len()));
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return invalid(format!("index {bad} out of range for {count} vertices"));
        }
        for sub in &self.submeshes {
            let end = sub.index_offset as usize + sub.index_count as usize;
            if end > self.indices.len() {
                return invalid(format!(
                    "submesh range {}..{end} exceeds {} indices",
                    sub.index_offset,
                    self.indices.len()
                ));
            }
        }
        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn gpu(&self) -> Option<&GpuMesh> {
        self.gpu.as_ref()
    }

    /// Position, uv, normal per vertex; see [`VertexLayout::position_uv_normal`].
    pub fn interleaved_vertices(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.vertices.len() * VertexLayout::FLOATS_PER_VERTEX);
        for ((p, uv), n) in self.vertices.iter().zip(&self.tex_coords).zip(&self.normals) {
            data.extend_from_slice(&[p.x, p.y, p.z, uv.x, uv.y, n.x, n.y, n.z]);
        }
        data
    }

    /// Create the vertex buffer, index buffer and vertex array.
    ///
    /// Uploading again replaces the previous GPU objects. If any step fails,
    /// whatever this call already allocated is released and the mesh is left
    /// without GPU objects.
    pub fn upload(&mut self, gpu: &mut dyn GpuBackend) -> Result<()> {
        self.release_gpu(gpu);

        let vertices = self.interleaved_vertices();
        let vertex_buffer = gpu.create_buffer(
            BufferKind::Vertex,
            bytemuck::cast_slice(&vertices),
            &format!("{} vertex buffer", self.name),
        )?;
        let index_buffer = match gpu.create_buffer(
            BufferKind::Index,
            bytemuck::cast_slice(&self.indices),
            &format!("{} index buffer", self.name),
        ) {
            Ok(buffer) => buffer,
            Err(e) => {
                gpu.delete_buffer(vertex_buffer);
                return Err(e);
            }
        };
        let vertex_array = match gpu.create_vertex_array(
            vertex_buffer,
            index_buffer,
            &VertexLayout::position_uv_normal(),
        ) {
            Ok(vertex_array) => vertex_array,
            Err(e) => {
                gpu.delete_buffer(index_buffer);
                gpu.delete_buffer(vertex_buffer);
                return Err(e);
            }
        };

        self.gpu = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            vertex_array,
        });
        Ok(())
    }

    /// One draw per submesh, or a single untextured draw over every index
    /// when the mesh has no submeshes.
    pub fn draw_calls(&self, program: ProgramHandle, uniforms: ObjectUniform) -> Result<Vec<DrawCall>> {
        let gpu = self.gpu.ok_or_else(|| {
            Error::GpuResource(format!("mesh '{}' drawn before upload", self.name))
        })?;
        let call = |first_index: u32, index_count: u32, texture: Option<TextureHandle>| DrawCall {
            program,
            vertex_array: gpu.vertex_array,
            texture,
            first_index,
            index_count,
            uniforms,
        };

        if self.submeshes.is_empty() {
            return Ok(vec![call(0, self.indices.len() as u32, None)]);
        }
        Ok(self
            .submeshes
            .iter()
            .filter(|sub| sub.index_count > 0)
            .map(|sub| call(sub.index_offset, sub.index_count, sub.texture.map(|t| t.handle)))
            .collect())
    }

    pub fn draw(&self, gpu: &mut dyn GpuBackend, program: ProgramHandle, uniforms: ObjectUniform) -> Result<()> {
        for call in self.draw_calls(program, uniforms)? {
            gpu.draw_indexed(&call)?;
        }
        Ok(())
    }

    /// Release GPU objects and every distinct submesh texture exactly once.
    /// Calling it again does nothing.
    pub fn destroy(&mut self, gpu: &mut dyn GpuBackend) {
        self.release_gpu(gpu);

        let mut released = HashSet::new();
        for sub in &mut self.submeshes {
            if let Some(texture) = sub.texture.take() {
                if released.insert(texture.handle) {
                    texture.destroy(gpu);
                }
            }
        }
    }

    fn release_gpu(&mut self, gpu: &mut dyn GpuBackend) {
        if let Some(objects) = self.gpu.take() {
            gpu.delete_vertex_array(objects.vertex_array);
            gpu.delete_buffer(objects.index_buffer);
            gpu.delete_buffer(objects.vertex_buffer);
        }
    }
}

/// Parse an OBJ file (and its MTL library) without touching the GPU.
///
/// Polygons are fan-triangulated and every position/uv/normal triple becomes
/// one vertex. V is flipped so image row 0 maps to the top of the texture.
/// A missing or broken MTL library only costs the textures. Faces with
/// fewer than three vertices are a load error. When only some faces of a
/// model carry UVs or normals, that stream is dropped for the whole model
/// with a warning.
pub fn load_mesh_data(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let obj_text = std::fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
    check_faces(path, &obj_text)?;
    let obj_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let (models, obj_materials) = tobj::load_obj_buf(
        &mut BufReader::new(Cursor::new(obj_text)),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |mtl| {
            let mtl_path = obj_dir.join(mtl);
            let text = std::fs::read_to_string(&mtl_path).map_err(|e| {
                log::warn!("material library {} unavailable: {}", mtl_path.display(), e);
                tobj::LoadError::OpenFileFailed
            })?;
            tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(text)))
        },
    )
    .map_err(|e| Error::load(path, e))?;

    let materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("{}: materials ignored ({})", path.display(), e);
        Vec::new()
    });

    let mut data = MeshData {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ..Default::default()
    };

    for model in &models {
        let m = &model.mesh;
        let base = data.vertices.len();
        let count = m.positions.len() / 3;
        let has_uvs = m.texcoords.len() == count * 2;
        let has_normals = m.normals.len() == count * 3;
        if !has_uvs && !m.texcoords.is_empty() {
            log::warn!(
                "{}: model '{}' has UVs on only some faces, using (0, 0) for all",
                path.display(),
                model.name
            );
        }
        if !has_normals && !m.normals.is_empty() {
            log::warn!(
                "{}: model '{}' has normals on only some faces, using +Z for all",
                path.display(),
                model.name
            );
        }

        for i in 0..count {
            data.vertices
                .push(Vec3::new(m.positions[i * 3], m.positions[i * 3 + 1], m.positions[i * 3 + 2]));
            data.tex_coords.push(if has_uvs {
                Vec2::new(m.texcoords[i * 2], 1.0 - m.texcoords[i * 2 + 1])
            } else {
                Vec2::new(0.0, 0.0)
            });
            data.normals.push(if has_normals {
                Vec3::new(m.normals[i * 3], m.normals[i * 3 + 1], m.normals[i * 3 + 2])
            } else {
                DEFAULT_NORMAL.into()
            });
        }

        if let Some(bad) = m.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::load(
                path,
                format!("face index {} out of range for {} vertices", bad + 1, count),
            ));
        }
        let index_offset = data.indices.len() as u32;
        data.indices.extend(m.indices.iter().map(|&i| i + base as u32));

        let material = m.material_id.and_then(|id| materials.get(id));
        data.submeshes.push(SubMeshData {
            index_offset,
            index_count: m.indices.len() as u32,
            material: material.map(|mat| mat.name.clone()),
            texture_path: material
                .and_then(|mat| mat.diffuse_texture.as_deref())
                .map(|tex| resolve_texture_path(&obj_dir, tex)),
        });
    }

    if data.indices.is_empty() {
        return Err(Error::load(path, "no faces"));
    }
    Ok(data)
}

/// tobj pads short faces into degenerate triangles; reject them instead.
fn check_faces(path: &Path, obj_text: &str) -> Result<()> {
    for (number, line) in obj_text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("f") {
            continue;
        }
        let corners = tokens.take_while(|t| !t.starts_with('#')).count();
        if corners < 3 {
            return Err(Error::load(
                path,
                format!("line {}: face has {} vertices, need at least 3", number + 1, corners),
            ));
        }
    }
    Ok(())
}

/// MTL files written on Windows use backslashes.
fn resolve_texture_path(obj_dir: &Path, texture: &str) -> PathBuf {
    obj_dir.join(texture.trim().replace('\\', "/"))
}

/// Load an OBJ file and its diffuse textures. Geometry is uploaded separately
/// with [`Mesh::upload`].
///
/// A texture file referenced by several materials is uploaded once and the
/// handle shared. Textures that fail to load leave their submesh untextured.
pub fn load_mesh(gpu: &mut dyn GpuBackend, path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let data = load_mesh_data(path)?;

    let mut cache: HashMap<PathBuf, Option<Texture>> = HashMap::new();
    let mut submeshes = Vec::with_capacity(data.submeshes.len());
    for sub in data.submeshes {
        let texture = match sub.texture_path {
            Some(texture_path) => *cache.entry(texture_path).or_insert_with_key(|texture_path| {
                load_texture(gpu, texture_path)
                    .inspect_err(|e| log::warn!("{}: drawing untextured, {}", path.display(), e))
                    .ok()
            }),
            None => None,
        };
        submeshes.push(SubMesh {
            index_offset: sub.index_offset,
            index_count: sub.index_count,
            texture,
            material: sub.material,
        });
    }

    let mesh = Mesh::from_data(
        data.name,
        data.vertices,
        data.tex_coords,
        data.normals,
        data.indices,
        submeshes,
    );
    let mesh = match mesh {
        Ok(mesh) => mesh,
        Err(e) => {
            for texture in cache.into_values().flatten() {
                texture.destroy(gpu);
            }
            return Err(e);
        }
    };

    log::info!(
        "loaded mesh {} ({} vertices, {} indices, {} submeshes, {} textures)",
        path.display(),
        mesh.vertices.len(),
        mesh.indices.len(),
        mesh.submeshes.len(),
        cache.values().flatten().count()
    );
    Ok(mesh)
}
