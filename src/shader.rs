//! Shader compilation and program linking.
//!
//! Stages are compiled separately and linked into a [`ShaderProgram`]. The
//! intermediate shader objects are always released once linking has been
//! attempted, so a program is the only thing a caller ever owns.

use std::path::Path;

use crate::{
    error::{Error, Result},
    gpu::{GpuBackend, ProgramHandle, ShaderHandle, ShaderStage},
};

/// WGSL sources shipped with the crate.
pub mod shaders {
    /// Transforms `position_uv_normal` vertices into world and clip space.
    pub const LIT_VERTEX: &str = include_str!("shaders/lit_vertex.wgsl");
    /// Textured Blinn-Phong with optional toon shading.
    pub const LIT_FRAGMENT: &str = include_str!("shaders/lit_fragment.wgsl");
}

pub fn compile(gpu: &mut dyn GpuBackend, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
    gpu.compile_shader(stage, source)
}

pub fn link(gpu: &mut dyn GpuBackend, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle> {
    gpu.link_program(vertex, fragment)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderProgram {
    handle: ProgramHandle,
}

impl ShaderProgram {
    pub fn from_sources(gpu: &mut dyn GpuBackend, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex = compile(gpu, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile(gpu, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                gpu.delete_shader(vertex);
                return Err(e);
            }
        };

        let linked = link(gpu, vertex, fragment);
        gpu.delete_shader(vertex);
        gpu.delete_shader(fragment);

        let handle = linked?;
        log::debug!("linked shader program {:?}", handle);
        Ok(Self { handle })
    }

    /// Read both stages from disk. A missing or empty file is a load error.
    pub fn from_files(
        gpu: &mut dyn GpuBackend,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vertex_source = read_source(vertex_path.as_ref())?;
        let fragment_source = read_source(fragment_path.as_ref())?;
        Self::from_sources(gpu, &vertex_source, &fragment_source)
    }

    /// The bundled lit program.
    pub fn lit(gpu: &mut dyn GpuBackend) -> Result<Self> {
        Self::from_sources(gpu, shaders::LIT_VERTEX, shaders::LIT_FRAGMENT)
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn destroy(self, gpu: &mut dyn GpuBackend) {
        gpu.delete_program(self.handle);
    }
}

fn read_source(path: &Path) -> Result<String> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::load(path, e))?;
    if source.trim().is_empty() {
        return Err(Error::load(path, "shader file is empty"));
    }
    Ok(source)
}
