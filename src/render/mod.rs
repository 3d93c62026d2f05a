//! GPU resource wrappers, libraries and the sprite renderer.
//!
//! Everything here talks to the GPU through a [`RenderDevice`]. Wrappers such
//! as [`Texture`] or [`VertexArray`] only hold handles, so they are cheap to
//! copy into components and libraries.

mod buffer;
mod command;
mod device;
mod framebuffer;
mod headless;
mod pass;
mod pipeline;
mod renderer;
mod shader;
mod texture;
mod wgpu_device;

pub use buffer::{
    IndexBuffer, QUAD_INDICES, QUAD_VERTICES, ShaderDataType, SpriteVertex, VertexArray,
    VertexAttribute, VertexBuffer, VertexLayout,
};
pub use command::{BoundGeometry, CommandList, DrawCall, DrawUniforms, RenderCommand, TEXTURE_UNITS};
pub use device::{
    BufferId, ImageData, PassTarget, RenderDevice, RenderResult, RenderTargetId, ShaderId,
    TargetStatus, TextureId, TextureRegion,
};
pub use framebuffer::{DEFAULT_HEIGHT, DEFAULT_WIDTH, FrameBuffer, FrameBufferState};
pub use headless::{DEFAULT_MAX_DIMENSION, HeadlessDevice, SubmittedPass};
pub use pass::RenderPass;
pub use pipeline::Pipeline;
pub use renderer::{FrameRect, FrameStats, Renderer, RendererConfig, SOLID_CACHE_CAPACITY, frame_rect};
pub use shader::{SPRITE_SHADER, SPRITE_WGSL, Shader, ShaderLibrary, ShaderSource, shader_name_from_path};
pub use texture::{Texture, TextureLibrary};
pub use wgpu_device::{DEPTH_FORMAT, WgpuDevice};
