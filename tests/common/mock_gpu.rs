use std::collections::{HashMap, HashSet};

use lab_ngin::{
    error::{Error, Result},
    gpu::{
        BufferHandle, BufferKind, DrawCall, GpuBackend, ProgramHandle, ShaderHandle, ShaderStage,
        TextureDesc, TextureHandle, VertexArrayHandle, VertexLayout,
    },
    lighting::LightingUniform,
};

/// Source text that the mock compiler rejects.
pub const BROKEN_SOURCE: &str = "this is not a shader";

/// Records every GPU call so resource lifecycles can be checked without a device.
#[derive(Default)]
pub struct MockGpu {
    next_id: u64,
    pub buffers: HashMap<BufferHandle, (BufferKind, Vec<u8>)>,
    pub vertex_arrays: HashMap<VertexArrayHandle, (BufferHandle, BufferHandle)>,
    pub textures: HashMap<TextureHandle, (u32, u32, TextureDesc)>,
    pub shaders: HashMap<ShaderHandle, ShaderStage>,
    pub programs: HashSet<ProgramHandle>,

    pub textures_created: usize,
    pub texture_deletes: HashMap<TextureHandle, usize>,
    pub buffer_deletes: usize,
    pub vertex_array_deletes: usize,
    pub shader_deletes: usize,
    pub program_deletes: usize,
    /// Deletes of handles that were not live.
    pub stale_deletes: usize,

    pub draws: Vec<DrawCall>,
    pub lighting: Option<LightingUniform>,

    pub fail_buffer: Option<BufferKind>,
    pub fail_vertex_array: bool,
    pub fail_link: bool,
}

impl MockGpu {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of resources that were created and not yet deleted.
    pub fn live_resources(&self) -> usize {
        self.buffers.len()
            + self.vertex_arrays.len()
            + self.textures.len()
            + self.shaders.len()
            + self.programs.len()
    }

    pub fn deletes_of(&self, texture: TextureHandle) -> usize {
        self.texture_deletes.get(&texture).copied().unwrap_or(0)
    }

    pub fn vertex_data(&self, buffer: BufferHandle) -> Vec<f32> {
        bytemuck::cast_slice(&self.buffers[&buffer].1).to_vec()
    }

    pub fn index_data(&self, buffer: BufferHandle) -> Vec<u32> {
        bytemuck::cast_slice(&self.buffers[&buffer].1).to_vec()
    }
}

impl GpuBackend for MockGpu {
    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8], label: &str) -> Result<BufferHandle> {
        if self.fail_buffer == Some(kind) || contents.is_empty() {
            return Err(Error::GpuResource(format!("mock refused buffer '{label}'")));
        }
        let handle = BufferHandle::from_raw(self.next_id());
        self.buffers.insert(handle, (kind, contents.to_vec()));
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(&buffer) {
            Some(_) => self.buffer_deletes += 1,
            None => self.stale_deletes += 1,
        }
    }

    fn create_vertex_array(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle> {
        assert_eq!(*layout, VertexLayout::position_uv_normal());
        if self.fail_vertex_array {
            return Err(Error::GpuResource("mock refused vertex array".to_string()));
        }
        if !self.buffers.contains_key(&vertices) || !self.buffers.contains_key(&indices) {
            return Err(Error::GpuResource("unknown buffer".to_string()));
        }
        let handle = VertexArrayHandle::from_raw(self.next_id());
        self.vertex_arrays.insert(handle, (vertices, indices));
        Ok(handle)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        match self.vertex_arrays.remove(&vertex_array) {
            Some(_) => self.vertex_array_deletes += 1,
            None => self.stale_deletes += 1,
        }
    }

    fn create_texture(&mut self, image: &image::RgbaImage, desc: &TextureDesc) -> Result<TextureHandle> {
        let handle = TextureHandle::from_raw(self.next_id());
        self.textures
            .insert(handle, (image.width(), image.height(), desc.clone()));
        self.textures_created += 1;
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        *self.texture_deletes.entry(texture).or_default() += 1;
        if self.textures.remove(&texture).is_none() {
            self.stale_deletes += 1;
        }
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        if source.trim().is_empty() || source.contains(BROKEN_SOURCE) {
            return Err(Error::Compile {
                stage,
                log: "1:1: expected global item".to_string(),
            });
        }
        let handle = ShaderHandle::from_raw(self.next_id());
        self.shaders.insert(handle, stage);
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        match self.shaders.remove(&shader) {
            Some(_) => self.shader_deletes += 1,
            None => self.stale_deletes += 1,
        }
    }

    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle> {
        if self.fail_link
            || self.shaders.get(&vertex) != Some(&ShaderStage::Vertex)
            || self.shaders.get(&fragment) != Some(&ShaderStage::Fragment)
        {
            return Err(Error::Link {
                log: "entry point mismatch".to_string(),
            });
        }
        let handle = ProgramHandle::from_raw(self.next_id());
        self.programs.insert(handle);
        Ok(handle)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program) {
            self.program_deletes += 1;
        } else {
            self.stale_deletes += 1;
        }
    }

    fn draw_indexed(&mut self, call: &DrawCall) -> Result<()> {
        if !self.programs.contains(&call.program) || !self.vertex_arrays.contains_key(&call.vertex_array) {
            return Err(Error::GpuResource("draw with stale handle".to_string()));
        }
        self.draws.push(*call);
        Ok(())
    }

    fn set_lighting(&mut self, lighting: &LightingUniform) {
        self.lighting = Some(*lighting);
    }
}
