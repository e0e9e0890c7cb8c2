//! [`GpuBackend`] on top of wgpu.
//!
//! Handles index into per-kind maps owned by the backend. Draw calls are
//! validated when they are issued and queued until [`WgpuBackend::render`]
//! records them into a single render pass against the caller's target.
//!
//! Bind groups used by every linked program:
//! - group 0: [`ObjectUniform`](super::ObjectUniform), vertex + fragment
//! - group 1: diffuse texture and its sampler
//! - group 2: [`LightingUniform`]

use std::collections::HashMap;

use futures::executor::block_on;
use wgpu::util::DeviceExt;

use super::{
    BufferHandle, BufferKind, DrawCall, FilterMode, GpuBackend, ProgramHandle, SamplerConfig,
    ShaderHandle, ShaderStage, TextureDesc, TextureHandle, VertexArrayHandle, VertexLayout,
    WrapMode, mip_level_count, mipmap::MipmapGenerator,
};
use crate::{
    error::{Error, Result},
    lighting::{Lighting, LightingUniform},
};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

struct GpuBuffer {
    buffer: wgpu::Buffer,
    kind: BufferKind,
}

struct VertexArray {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct CompiledShader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
}

struct DepthTarget {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// Everything one queued draw needs, resolved before the pass begins.
struct PreparedDraw {
    pipeline: wgpu::RenderPipeline,
    object_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    range: std::ops::Range<u32>,
}

struct BindGroupLayouts {
    object: wgpu::BindGroupLayout,
    texture: wgpu::BindGroupLayout,
    lighting: wgpu::BindGroupLayout,
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    next_id: u64,
    buffers: HashMap<BufferHandle, GpuBuffer>,
    vertex_arrays: HashMap<VertexArrayHandle, VertexArray>,
    textures: HashMap<TextureHandle, GpuTexture>,
    shaders: HashMap<ShaderHandle, CompiledShader>,
    programs: HashMap<ProgramHandle, wgpu::RenderPipeline>,
    layouts: BindGroupLayouts,
    lighting_buffer: wgpu::Buffer,
    lighting_bind_group: wgpu::BindGroup,
    white_texture: GpuTexture,
    mipmaps: MipmapGenerator,
    depth: Option<DepthTarget>,
    pending: Vec<DrawCall>,
}

impl WgpuBackend {
    /// `color_format` is the format of the targets later passed to [`render`](Self::render).
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        let layouts = BindGroupLayouts::new(&device);
        let mut mipmaps = MipmapGenerator::new(&device);

        let lighting_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lighting buffer"),
            contents: bytemuck::cast_slice(&[Lighting::default().to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lighting_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lighting_bind_group"),
            layout: &layouts.lighting,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lighting_buffer.as_entire_binding(),
            }],
        });

        let white = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let white_desc = TextureDesc {
            label: Some("white texture".to_string()),
            generate_mipmaps: false,
            ..Default::default()
        };
        let white_texture = upload_texture(&device, &queue, &mut mipmaps, &layouts.texture, &white, &white_desc);

        log::info!("wgpu backend ready, target format {:?}", color_format);

        Self {
            device,
            queue,
            color_format,
            next_id: 1,
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            layouts,
            lighting_buffer,
            lighting_bind_group,
            white_texture,
            mipmaps,
            depth: None,
            pending: Vec::new(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Number of draws queued since the last [`render`](Self::render).
    pub fn pending_draws(&self) -> usize {
        self.pending.len()
    }

    /// Clear `target` and execute every queued draw into it.
    ///
    /// The queue is emptied even when a draw refers to a handle that has been
    /// deleted since it was issued; that case is reported as an error and
    /// nothing is submitted.
    pub fn render(&mut self, target: &wgpu::Texture, clear: wgpu::Color) -> Result<()> {
        let draws = std::mem::take(&mut self.pending);
        let prepared = draws
            .iter()
            .map(|call| self.prepare(call))
            .collect::<Result<Vec<_>>>()?;

        let size = target.size();
        let depth_view = self.depth_view(size.width, size.height);
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lab render encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lab render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &prepared {
                pass.set_pipeline(&draw.pipeline);
                pass.set_bind_group(0, &draw.object_bind_group, &[]);
                pass.set_bind_group(1, &draw.texture_bind_group, &[]);
                pass.set_bind_group(2, &self.lighting_bind_group, &[]);
                pass.set_vertex_buffer(0, draw.vertices.slice(..));
                pass.set_index_buffer(draw.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(draw.range.clone(), 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        log::debug!("rendered {} draws", prepared.len());
        Ok(())
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn prepare(&self, call: &DrawCall) -> Result<PreparedDraw> {
        let pipeline = self
            .programs
            .get(&call.program)
            .ok_or_else(|| Error::GpuResource(format!("unknown program {:?}", call.program)))?;
        let vertex_array = self.vertex_arrays.get(&call.vertex_array).ok_or_else(|| {
            Error::GpuResource(format!("unknown vertex array {:?}", call.vertex_array))
        })?;
        let texture = match call.texture {
            Some(handle) => self
                .textures
                .get(&handle)
                .ok_or_else(|| Error::GpuResource(format!("unknown texture {handle:?}")))?,
            None => &self.white_texture,
        };

        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("object uniform buffer"),
            contents: bytemuck::cast_slice(&[call.uniforms]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let object_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout: &self.layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(PreparedDraw {
            pipeline: pipeline.clone(),
            object_bind_group,
            texture_bind_group: texture.bind_group.clone(),
            vertices: vertex_array.vertices.clone(),
            indices: vertex_array.indices.clone(),
            range: call.first_index..call.first_index + call.index_count,
        })
    }

    /// The depth buffer is recreated whenever the target size changes.
    fn depth_view(&mut self, width: u32, height: u32) -> wgpu::TextureView {
        let (width, height) = (width.max(1), height.max(1));
        match &self.depth {
            Some(depth) if depth.width == width && depth.height == height => depth.view.clone(),
            _ => {
                let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("depth texture"),
                    size: wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: DEPTH_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.depth = Some(DepthTarget {
                    view: view.clone(),
                    width,
                    height,
                });
                view
            }
        }
    }

    fn create_pipeline(
        &self,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        label: &str,
    ) -> wgpu::RenderPipeline {
        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lab pipeline layout"),
            bind_group_layouts: &[
                Some(&self.layouts.object),
                Some(&self.layouts.texture),
                Some(&self.layouts.lighting),
            ],
            immediate_size: 0,
        });

        let vertex_layout = VertexLayout::position_uv_normal();
        let attributes = vertex_attributes(&vertex_layout);

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: vertex,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: vertex_layout.stride as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

impl GpuBackend for WgpuBackend {
    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8], label: &str) -> Result<BufferHandle> {
        if contents.is_empty() {
            return Err(Error::GpuResource(format!("buffer '{label}' has no contents")));
        }
        if kind == BufferKind::Index && contents.len() % std::mem::size_of::<u32>() != 0 {
            return Err(Error::GpuResource(format!(
                "index buffer '{label}' is not a whole number of u32 indices"
            )));
        }
        let max = self.device.limits().max_buffer_size;
        if contents.len() as u64 > max {
            return Err(Error::GpuResource(format!(
                "buffer '{label}' needs {} bytes, device allows {max}",
                contents.len()
            )));
        }

        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
            BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
        } | wgpu::BufferUsages::COPY_DST;
        let buffer = capture_errors(&self.device, label, || {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
        })?;

        let handle = BufferHandle::from_raw(self.next_id());
        self.buffers.insert(handle, GpuBuffer { buffer, kind });
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(&buffer) {
            Some(gpu_buffer) => gpu_buffer.buffer.destroy(),
            None => log::warn!("delete of unknown buffer {:?}", buffer),
        }
    }

    fn create_vertex_array(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle> {
        if *layout != VertexLayout::position_uv_normal() {
            return Err(Error::GpuResource(format!(
                "unsupported vertex layout (stride {})",
                layout.stride
            )));
        }
        let lookup = |handle: BufferHandle, kind: BufferKind| match self.buffers.get(&handle) {
            Some(buffer) if buffer.kind == kind => Ok(buffer.buffer.clone()),
            Some(buffer) => Err(Error::GpuResource(format!(
                "buffer {handle:?} is a {:?} buffer, expected {kind:?}",
                buffer.kind
            ))),
            None => Err(Error::GpuResource(format!("unknown buffer {handle:?}"))),
        };
        let vertices = lookup(vertices, BufferKind::Vertex)?;
        let indices = lookup(indices, BufferKind::Index)?;
        let index_count = (indices.size() / std::mem::size_of::<u32>() as u64) as u32;

        let handle = VertexArrayHandle::from_raw(self.next_id());
        self.vertex_arrays.insert(
            handle,
            VertexArray {
                vertices,
                indices,
                index_count,
            },
        );
        Ok(handle)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_arrays.remove(&vertex_array).is_none() {
            log::warn!("delete of unknown vertex array {:?}", vertex_array);
        }
    }

    fn create_texture(&mut self, image: &image::RgbaImage, desc: &TextureDesc) -> Result<TextureHandle> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::GpuResource(format!("texture size {width}x{height} is empty")));
        }

        let label = desc.label.as_deref().unwrap_or("texture");
        let texture = capture_errors(&self.device, label, || {
            upload_texture(
                &self.device,
                &self.queue,
                &mut self.mipmaps,
                &self.layouts.texture,
                image,
                desc,
            )
        })?;
        let handle = TextureHandle::from_raw(self.next_id());
        self.textures.insert(handle, texture);
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        match self.textures.remove(&texture) {
            Some(gpu_texture) => gpu_texture.texture.destroy(),
            None => log::warn!("delete of unknown texture {:?}", texture),
        }
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        let entry = match stage {
            ShaderStage::Vertex => VERTEX_ENTRY,
            ShaderStage::Fragment => FRAGMENT_ENTRY,
        };
        if source.trim().is_empty() {
            return Err(Error::Compile {
                stage,
                log: "empty shader source".to_string(),
            });
        }

        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{stage:?} shader")),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let info = block_on(module.get_compilation_info());
        let scope_error = block_on(scope.pop());

        let mut diagnostics: Vec<String> = info
            .messages
            .iter()
            .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
            .map(|m| match &m.location {
                Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, m.message),
                None => m.message.clone(),
            })
            .collect();
        if diagnostics.is_empty() {
            if let Some(err) = scope_error {
                diagnostics.push(err.to_string());
            }
        }
        if diagnostics.is_empty() && !source.contains(&format!("fn {entry}")) {
            diagnostics.push(format!("missing entry point `{entry}`"));
        }
        if !diagnostics.is_empty() {
            let log = diagnostics.join("\n");
            log::error!("{:?} shader failed to compile:\n{}", stage, log);
            return Err(Error::Compile { stage, log });
        }

        let handle = ShaderHandle::from_raw(self.next_id());
        self.shaders.insert(handle, CompiledShader { stage, module });
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(&shader).is_none() {
            log::warn!("delete of unknown shader {:?}", shader);
        }
    }

    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle> {
        let stage_module = |handle: ShaderHandle, stage: ShaderStage| match self.shaders.get(&handle) {
            Some(shader) if shader.stage == stage => Ok(&shader.module),
            Some(shader) => Err(Error::Link {
                log: format!("shader {handle:?} is a {:?} shader, expected {stage:?}", shader.stage),
            }),
            None => Err(Error::Link {
                log: format!("unknown shader {handle:?}"),
            }),
        };
        let vs = stage_module(vertex, ShaderStage::Vertex)?;
        let fs = stage_module(fragment, ShaderStage::Fragment)?;

        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.create_pipeline(vs, fs, "lab program");
        if let Some(err) = block_on(scope.pop()) {
            let log = err.to_string();
            log::error!("program failed to link:\n{}", log);
            return Err(Error::Link { log });
        }

        let handle = ProgramHandle::from_raw(self.next_id());
        self.programs.insert(handle, pipeline);
        Ok(handle)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_none() {
            log::warn!("delete of unknown program {:?}", program);
        }
    }

    fn draw_indexed(&mut self, call: &DrawCall) -> Result<()> {
        if !self.programs.contains_key(&call.program) {
            return Err(Error::GpuResource(format!("unknown program {:?}", call.program)));
        }
        if let Some(texture) = call.texture {
            if !self.textures.contains_key(&texture) {
                return Err(Error::GpuResource(format!("unknown texture {texture:?}")));
            }
        }
        let vertex_array = self.vertex_arrays.get(&call.vertex_array).ok_or_else(|| {
            Error::GpuResource(format!("unknown vertex array {:?}", call.vertex_array))
        })?;
        match call.first_index.checked_add(call.index_count) {
            Some(end) if end <= vertex_array.index_count => {}
            _ => {
                return Err(Error::GpuResource(format!(
                    "index range {}+{} exceeds {} indices",
                    call.first_index, call.index_count, vertex_array.index_count
                )));
            }
        }
        self.pending.push(*call);
        Ok(())
    }

    fn set_lighting(&mut self, lighting: &LightingUniform) {
        self.queue
            .write_buffer(&self.lighting_buffer, 0, bytemuck::cast_slice(&[*lighting]));
    }
}

impl BindGroupLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let uniform_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT)],
        });
        let lighting = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lighting_bind_group_layout"),
            entries: &[uniform_entry(wgpu::ShaderStages::FRAGMENT)],
        });
        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            object,
            texture,
            lighting,
        }
    }
}

/// Run `create` with out-of-memory and validation errors captured, so a
/// failed allocation comes back as [`Error::GpuResource`] instead of reaching
/// the device's uncaptured-error handler.
fn capture_errors<T>(device: &wgpu::Device, what: &str, create: impl FnOnce() -> T) -> Result<T> {
    let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let validation_error = block_on(validation.pop());
    let out_of_memory_error = block_on(out_of_memory.pop());

    match validation_error.or(out_of_memory_error) {
        Some(err) => {
            log::error!("failed to create '{}': {}", what, err);
            Err(Error::GpuResource(format!("'{what}': {err}")))
        }
        None => Ok(value),
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    mipmaps: &mut MipmapGenerator,
    layout: &wgpu::BindGroupLayout,
    image: &image::RgbaImage,
    desc: &TextureDesc,
) -> GpuTexture {
    let (width, height) = image.dimensions();
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let mip_level_count = if desc.generate_mipmaps {
        mip_level_count(width, height)
    } else {
        1
    };
    let format = if desc.srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
    if mip_level_count > 1 {
        usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: desc.label.as_deref(),
        size,
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    if mip_level_count > 1 {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mipmap encoder"),
        });
        mipmaps.generate(device, &mut encoder, &texture);
        queue.submit(std::iter::once(encoder.finish()));
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_sampler(device, &desc.sampler, desc.label.as_deref());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    GpuTexture { texture, bind_group }
}

fn create_sampler(device: &wgpu::Device, config: &SamplerConfig, label: Option<&str>) -> wgpu::Sampler {
    let address_mode = |wrap| match wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    };
    let filter = |mode| match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    };
    let (mipmap_filter, lod_max_clamp) = match config.mipmap_filter {
        Some(FilterMode::Linear) => (wgpu::MipmapFilterMode::Linear, 32.0),
        Some(FilterMode::Nearest) => (wgpu::MipmapFilterMode::Nearest, 32.0),
        None => (wgpu::MipmapFilterMode::Nearest, 0.0),
    };

    device.create_sampler(&wgpu::SamplerDescriptor {
        label,
        address_mode_u: address_mode(config.wrap_u),
        address_mode_v: address_mode(config.wrap_v),
        address_mode_w: address_mode(config.wrap_u),
        mag_filter: filter(config.mag_filter),
        min_filter: filter(config.min_filter),
        mipmap_filter,
        lod_min_clamp: 0.0,
        lod_max_clamp,
        ..Default::default()
    })
}

fn vertex_attributes(layout: &VertexLayout) -> Vec<wgpu::VertexAttribute> {
    layout
        .attributes
        .iter()
        .map(|attribute| wgpu::VertexAttribute {
            offset: attribute.offset as wgpu::BufferAddress,
            shader_location: attribute.location,
            format: match attribute.components {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                _ => wgpu::VertexFormat::Float32x4,
            },
        })
        .collect()
}
