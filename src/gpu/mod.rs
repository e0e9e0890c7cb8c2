//! Explicit GPU resource API.
//!
//! Every operation takes the handle it works on; there is no "currently bound"
//! object. Resources are owned by exactly one holder which must release them
//! through the matching `delete_*` call.
//!
//! - [`GpuBackend`] is the seam every loader and draw routine goes through
//! - [`WgpuBackend`] is the wgpu implementation
//! - handle types ([`BufferHandle`], [`TextureHandle`], ...) are opaque ids
//!
//! All calls must come from the thread that owns the graphics context.

mod mipmap;
mod wgpu_backend;

pub use wgpu_backend::WgpuBackend;

use crate::{
    camera::{Camera, CameraUniform, Projection},
    error::Result,
    lighting::LightingUniform,
    math::{Mat3, Mat4},
};

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

gpu_handle!(
    /// A vertex, index or uniform buffer.
    BufferHandle
);
gpu_handle!(
    /// A vertex buffer + index buffer pair bound to a [`VertexLayout`].
    VertexArrayHandle
);
gpu_handle!(TextureHandle);
gpu_handle!(
    /// A compiled but unlinked shader stage.
    ShaderHandle
);
gpu_handle!(
    /// A linked vertex + fragment program.
    ProgramHandle
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// One float attribute inside an interleaved vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    /// Bytes per vertex.
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub const FLOATS_PER_VERTEX: usize = 8;

    /// position (3f, slot 0), uv (2f, slot 1), normal (3f, slot 2).
    pub fn position_uv_normal() -> Self {
        const F32: u32 = std::mem::size_of::<f32>() as u32;
        Self {
            stride: Self::FLOATS_PER_VERTEX as u32 * F32,
            attributes: vec![
                VertexAttribute {
                    location: 0,
                    components: 3,
                    offset: 0,
                },
                VertexAttribute {
                    location: 1,
                    components: 2,
                    offset: 3 * F32,
                },
                VertexAttribute {
                    location: 2,
                    components: 3,
                    offset: 5 * F32,
                },
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture sampling parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    /// `None` samples only the base level.
    pub mipmap_filter: Option<FilterMode>,
}

impl Default for SamplerConfig {
    /// Repeat wrapping, linear-mipmap-linear minification, linear magnification.
    fn default() -> Self {
        Self {
            wrap_u: WrapMode::Repeat,
            wrap_v: WrapMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: Some(FilterMode::Linear),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureDesc {
    pub label: Option<String>,
    pub generate_mipmaps: bool,
    /// Colour data is stored sRGB; data textures (normal maps) are linear.
    pub srgb: bool,
    pub sampler: SamplerConfig,
}

impl Default for TextureDesc {
    fn default() -> Self {
        Self {
            label: None,
            generate_mipmaps: true,
            srgb: true,
            sampler: SamplerConfig::default(),
        }
    }
}

impl TextureDesc {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Per-draw transforms, laid out for a uniform block.
///
/// `normal` is a 3x3 matrix stored as three 16-byte columns.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub view_position: [f32; 4],
}

impl ObjectUniform {
    pub fn new(view_proj: Mat4, model: Mat4, normal: Mat3, view_position: [f32; 3]) -> Self {
        let column = |c: cgmath::Vector3<f32>| [c.x, c.y, c.z, 0.0];
        Self {
            view_proj: view_proj.into(),
            model: model.into(),
            normal: [column(normal.x), column(normal.y), column(normal.z)],
            view_position: [view_position[0], view_position[1], view_position[2], 1.0],
        }
    }

    /// projection * view * model for `camera`.
    pub fn for_camera(camera: &Camera, projection: &Projection, model: Mat4, normal: Mat3) -> Self {
        let mut frame = CameraUniform::new();
        frame.update_view_proj(camera, projection);
        Self::with_camera(&frame, model, normal)
    }

    /// Reuse per-frame camera data computed once for many objects.
    pub fn with_camera(frame: &CameraUniform, model: Mat4, normal: Mat3) -> Self {
        let mut uniform = Self::new(Mat4::from(frame.view_proj), model, normal, [0.0; 3]);
        uniform.view_position = frame.view_position;
        uniform
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        use cgmath::SquareMatrix;
        Self::new(Mat4::identity(), Mat4::identity(), Mat3::identity(), [0.0; 3])
    }
}

/// One indexed triangle draw over `[first_index, first_index + index_count)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub program: ProgramHandle,
    pub vertex_array: VertexArrayHandle,
    /// `None` draws in the unlit/untextured state.
    pub texture: Option<TextureHandle>,
    pub first_index: u32,
    pub index_count: u32,
    pub uniforms: ObjectUniform,
}

/// The GPU operations the rest of the crate relies on.
///
/// Deleting an unknown or already-deleted handle is a no-op that logs a
/// warning; every other use of a stale handle is an
/// [`Error::GpuResource`](crate::error::Error::GpuResource).
pub trait GpuBackend {
    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8], label: &str) -> Result<BufferHandle>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    fn create_vertex_array(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle>;

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    fn create_texture(&mut self, image: &image::RgbaImage, desc: &TextureDesc) -> Result<TextureHandle>;

    fn delete_texture(&mut self, texture: TextureHandle);

    /// Fails with [`Error::Compile`](crate::error::Error::Compile) carrying the diagnostics.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Fails with [`Error::Link`](crate::error::Error::Link) carrying the diagnostics.
    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle>;

    fn delete_program(&mut self, program: ProgramHandle);

    fn draw_indexed(&mut self, call: &DrawCall) -> Result<()>;

    /// Light parameters shared by every draw until the next call.
    fn set_lighting(&mut self, lighting: &LightingUniform);
}
