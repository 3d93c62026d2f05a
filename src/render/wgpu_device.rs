//! The [`RenderDevice`] that drives a real GPU.
//!
//! Every resource lives in a pool indexed by its handle. Recorded passes are
//! replayed into one wgpu render pass each; per-draw uniforms are packed into
//! a single buffer and selected with dynamic offsets, so every draw in a pass
//! keeps its own matrices.
//!
//! # Bind groups
//!
//! - **Group 0**: [`DrawUniforms`], dynamic offset per draw
//! - **Group 1**: the draw's texture and the shared nearest/repeat sampler

use wgpu::util::DeviceExt;

use super::buffer::VertexLayout;
use super::command::{CommandList, DrawCall, DrawUniforms};
use super::device::{
    BufferId, ImageData, PassTarget, RenderDevice, RenderResult, RenderTargetId, ShaderId,
    TargetStatus, TextureId, TextureRegion,
};
use super::shader::ShaderSource;
use crate::color::Color;
use crate::error::RenderError;
use crate::gpu::{GpuContext, SurfaceErrorAction};

/// Depth/stencil format of every pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

const SAMPLED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
    /// Render target attachments use the surface format and reject texel uploads.
    writable: bool,
}

struct GpuTarget {
    color: TextureId,
    #[allow(dead_code)]
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    status: TargetStatus,
}

struct DepthBuffer {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    slots: u64,
    stride: u64,
}

pub struct WgpuDevice {
    gpu: GpuContext,
    buffers: Vec<wgpu::Buffer>,
    shaders: Vec<wgpu::RenderPipeline>,
    textures: Vec<Option<GpuTexture>>,
    targets: Vec<Option<GpuTarget>>,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    uniforms: UniformRing,
    blit_pipeline: wgpu::RenderPipeline,
    surface_depth: Option<DepthBuffer>,
}

impl WgpuDevice {
    pub fn new(gpu: GpuContext) -> Self {
        let device = &gpu.device;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        // nearest filtering keeps pixel art crisp, repeat addressing makes tiling work
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = (size_of::<DrawUniforms>() as u64).div_ceil(alignment) * alignment;
        let uniforms = create_uniform_ring(device, &uniform_layout, stride, 64);

        let blit_pipeline = create_blit_pipeline(device, &texture_layout, gpu.config.format);

        Self {
            gpu,
            buffers: Vec::new(),
            shaders: Vec::new(),
            textures: Vec::new(),
            targets: Vec::new(),
            uniform_layout,
            texture_layout,
            pipeline_layout,
            sampler,
            uniforms,
            blit_pipeline,
            surface_depth: None,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Resizes the window surface. Zero sizes are ignored.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// The raw view of a live texture, for UI layers that sample it directly.
    pub fn texture_view(&self, texture: TextureId) -> Option<&wgpu::TextureView> {
        self.texture(texture).ok().map(|t| &t.view)
    }

    fn texture(&self, texture: TextureId) -> RenderResult<&GpuTexture> {
        self.textures
            .get(texture.0)
            .and_then(Option::as_ref)
            .ok_or(RenderError::UnknownTexture(texture))
    }

    fn target(&self, target: RenderTargetId) -> RenderResult<&GpuTarget> {
        self.targets
            .get(target.0)
            .and_then(Option::as_ref)
            .ok_or(RenderError::UnknownRenderTarget(target))
    }

    fn push_texture(
        &mut self,
        label: &str,
        texture: wgpu::Texture,
        width: u32,
        height: u32,
        writable: bool,
    ) -> TextureId {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.textures.push(Some(GpuTexture {
            texture,
            view,
            bind_group,
            width,
            height,
            writable,
        }));
        TextureId(self.textures.len() - 1)
    }

    fn create_depth(&self, label: &str, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
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
        (texture, view)
    }

    fn ensure_surface_depth(&mut self) {
        let size = (self.gpu.width(), self.gpu.height());
        if self.surface_depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }
        let (texture, view) = self.create_depth("Surface Depth", size.0, size.1);
        self.surface_depth = Some(DepthBuffer {
            texture,
            view,
            size,
        });
    }

    fn ensure_uniform_capacity(&mut self, draws: usize) {
        let needed = draws as u64;
        if needed <= self.uniforms.slots {
            return;
        }
        let slots = needed.next_power_of_two();
        log::debug!("growing draw uniform buffer to {slots} slots");
        self.uniforms = create_uniform_ring(
            &self.gpu.device,
            &self.uniform_layout,
            self.uniforms.stride,
            slots,
        );
    }

    fn upload_uniforms(&mut self, draws: &[DrawCall]) {
        if draws.is_empty() {
            return;
        }
        self.ensure_uniform_capacity(draws.len());

        let stride = self.uniforms.stride as usize;
        let mut bytes = vec![0u8; stride * draws.len()];
        for (slot, draw) in bytes.chunks_exact_mut(stride).zip(draws) {
            let uniforms = bytemuck::bytes_of(&draw.uniforms);
            slot[..uniforms.len()].copy_from_slice(uniforms);
        }
        self.gpu.queue.write_buffer(&self.uniforms.buffer, 0, &bytes);
    }

    /// Keeps draws whose resources are all alive. A target's own color
    /// attachment cannot be sampled while it is being drawn into.
    fn usable_draw(&self, draw: &DrawCall, writing: Option<TextureId>) -> bool {
        let live = self.shader_exists(draw.shader)
            && draw.geometry.vertex.0 < self.buffers.len()
            && draw.geometry.index.0 < self.buffers.len()
            && self.texture(draw.texture).is_ok();
        if !live {
            log::warn!("skipping draw with released or unknown resources: {draw:?}");
            return false;
        }
        if writing == Some(draw.texture) {
            log::warn!("skipping draw sampling the attachment it renders into");
            return false;
        }
        true
    }

    fn encode_pass(
        &self,
        label: &str,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear: Option<Color>,
        draws: &[DrawCall],
    ) {
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: match clear {
                            Some(c) => wgpu::LoadOp::Clear(c.into()),
                            None => wgpu::LoadOp::Load,
                        },
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (i, draw) in draws.iter().enumerate() {
                let Ok(texture) = self.texture(draw.texture) else {
                    continue;
                };
                let offset = (i as u64 * self.uniforms.stride) as u32;
                pass.set_pipeline(&self.shaders[draw.shader.0]);
                pass.set_bind_group(0, &self.uniforms.bind_group, &[offset]);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                pass.set_vertex_buffer(0, self.buffers[draw.geometry.vertex.0].slice(..));
                pass.set_index_buffer(
                    self.buffers[draw.geometry.index.0].slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Acquires the next surface frame. `Ok(None)` means skip this frame.
    fn acquire_frame(&self) -> RenderResult<Option<wgpu::SurfaceTexture>> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(err) => match self.gpu.handle_surface_error(&err) {
                SurfaceErrorAction::Fatal => {
                    log::error!("surface failure: {err}");
                    Err(RenderError::Surface(err.to_string()))
                }
                action => {
                    log::warn!("skipping frame after surface error {err} ({action:?})");
                    Ok(None)
                }
            },
        }
    }
}

fn create_uniform_ring(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    slots: u64,
) -> UniformRing {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniforms"),
        size: stride * slots,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Uniform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(size_of::<DrawUniforms>() as u64),
            }),
        }],
    });
    UniformRing {
        buffer,
        bind_group,
        slots,
        stride,
    }
}

fn create_blit_pipeline(
    device: &wgpu::Device,
    texture_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Blit Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/blit.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Blit Pipeline Layout"),
        bind_group_layouts: &[texture_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Blit Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

impl RenderDevice for WgpuDevice {
    fn create_vertex_buffer(
        &mut self,
        contents: &[u8],
        _layout: &VertexLayout,
    ) -> RenderResult<BufferId> {
        let buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.push(buffer);
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> RenderResult<BufferId> {
        let buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.buffers.push(buffer);
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn create_shader(&mut self, source: &ShaderSource) -> RenderResult<ShaderId> {
        let attributes = source.layout.wgpu_attributes()?;
        let device = &self.gpu.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&source.name),
            source: wgpu::ShaderSource::Wgsl(source.wgsl.as_str().into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&source.name),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: source.layout.stride() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // sprites draw in submission order, depth is cleared but never tested
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompilation {
                name: source.name.clone(),
                message: err.to_string(),
            });
        }

        self.shaders.push(pipeline);
        Ok(ShaderId(self.shaders.len() - 1))
    }

    fn shader_exists(&self, shader: ShaderId) -> bool {
        shader.0 < self.shaders.len()
    }

    fn create_texture(&mut self, label: &str, image: &ImageData) -> RenderResult<TextureId> {
        let rgba = image.to_rgba8(label)?;
        let (width, height) = rgba.dimensions();

        let texture = self.gpu.device.create_texture_with_data(
            &self.gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: SAMPLED_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba.as_raw(),
        );

        Ok(self.push_texture(label, texture, width, height, true))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        let Some(slot) = self.textures.get_mut(texture.0) else {
            return;
        };
        // only render target attachments are created unwritable
        if slot.as_ref().is_some_and(|t| !t.writable) {
            log::warn!("texture {texture:?} belongs to a render target, not destroying it");
            return;
        }
        *slot = None;
    }

    fn write_texture(
        &mut self,
        texture: TextureId,
        region: TextureRegion,
        rgba: &[u8],
    ) -> RenderResult<()> {
        let target = self.texture(texture)?;
        if !target.writable {
            return Err(RenderError::InvalidRegion(
                "render target attachments cannot be written directly".into(),
            ));
        }
        region.validate(target.width, target.height, rgba.len())?;

        self.gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: region.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(region.width * 4),
                rows_per_image: Some(region.height),
            },
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.texture(texture).ok().map(|t| (t.width, t.height))
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> RenderResult<RenderTargetId> {
        let max = self.gpu.device.limits().max_texture_dimension_2d;
        let status = if width > max || height > max {
            TargetStatus::Incomplete(format!("{width}x{height} exceeds the {max} texel limit"))
        } else {
            TargetStatus::Complete
        };
        let (w, h) = if status == TargetStatus::Complete {
            (width, height)
        } else {
            (1, 1)
        };

        let color = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("FrameBuffer Color"),
            size: wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.gpu.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color = self.push_texture("FrameBuffer Color", color, w, h, false);
        let (depth, depth_view) = self.create_depth("FrameBuffer Depth", w, h);

        self.targets.push(Some(GpuTarget {
            color,
            depth,
            depth_view,
            status,
        }));
        Ok(RenderTargetId(self.targets.len() - 1))
    }

    fn destroy_render_target(&mut self, target: RenderTargetId) {
        if let Some(slot) = self.targets.get_mut(target.0)
            && let Some(old) = slot.take()
            && let Some(texture) = self.textures.get_mut(old.color.0)
        {
            *texture = None;
        }
    }

    fn render_target_status(&self, target: RenderTargetId) -> TargetStatus {
        match self.target(target) {
            Ok(t) => t.status.clone(),
            Err(err) => TargetStatus::Incomplete(err.to_string()),
        }
    }

    fn render_target_color(&self, target: RenderTargetId) -> Option<TextureId> {
        self.target(target).ok().map(|t| t.color)
    }

    fn submit(
        &mut self,
        target: PassTarget,
        clear: Option<Color>,
        commands: &CommandList,
    ) -> RenderResult<()> {
        let writing = match target {
            PassTarget::Offscreen(id) => Some(self.target(id)?.color),
            PassTarget::Screen => None,
        };
        let draws: Vec<DrawCall> = commands
            .resolve()
            .into_iter()
            .filter(|draw| self.usable_draw(draw, writing))
            .collect();
        self.upload_uniforms(&draws);

        match target {
            PassTarget::Offscreen(id) => {
                let target = self.target(id)?;
                let color = self.texture(target.color)?;
                self.encode_pass("Offscreen Pass", &color.view, &target.depth_view, clear, &draws);
            }
            PassTarget::Screen => {
                let Some(frame) = self.acquire_frame()? else {
                    return Ok(());
                };
                self.ensure_surface_depth();
                let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
                if let Some(depth) = &self.surface_depth {
                    self.encode_pass("Screen Pass", &view, &depth.view, clear, &draws);
                }
                frame.present();
            }
        }
        Ok(())
    }

    fn present(&mut self, texture: TextureId) -> RenderResult<()> {
        let source = self.texture(texture)?;
        let Some(frame) = self.acquire_frame()? else {
            return Ok(());
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Blit"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &source.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
