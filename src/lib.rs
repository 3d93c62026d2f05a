//! # Phalanx
//!
//! **A small 2D scene engine: entities, sprites, an orthographic camera and an
//! off-screen framebuffer, on top of wgpu.**
//!
//! ## Quick Start
//!
//! ```no_run
//! use phalanx::*;
//!
//! fn main() -> Result<(), AppError> {
//!     run(AppConfig::new().title("Hello"), |ctx| {
//!         let quad = ctx.scene.create_entity("quad");
//!         ctx.scene.add_component(quad, Sprite::new().color(Color::RED)).ok();
//!
//!         move |frame| {
//!             if let Ok(mut sprite) = frame.scene.get_component_mut::<Sprite>(quad) {
//!                 sprite.rotation.z += 45.0 * frame.dt;
//!             }
//!         }
//!     })
//! }
//! ```
//!
//! ## Layout
//!
//! - [`Scene`] owns entities and components; components refer to GPU
//!   resources by handle ([`TextureId`], [`ShaderId`]).
//! - [`Camera`] derives the orthographic projection-view matrix.
//! - [`Renderer`] turns sprites into draws recorded into a [`RenderPass`] that
//!   targets a [`FrameBuffer`].
//! - Every GPU object is created through a [`RenderDevice`]: [`WgpuDevice`]
//!   for a window, [`HeadlessDevice`] for tests and tools.

mod app;
mod camera;
mod color;
mod editor;
mod error;
mod gpu;
mod logging;
pub mod render;
pub mod scene;

pub use app::{AppConfig, Frame, SetupContext, run};
pub use camera::{Camera, MIN_ZOOM};
pub use color::Color;
pub use editor::{EDITOR_ZOOM, Editor, GameMode};
pub use error::{AppError, RenderError, SceneError};
pub use gpu::{GpuContext, SurfaceErrorAction};
pub use logging::{LoggingConfig, init_logging};
pub use render::{
    FrameBuffer, FrameBufferState, FrameStats, HeadlessDevice, ImageData, Pipeline, RenderDevice,
    RenderPass, RenderResult, Renderer, RendererConfig, Shader, ShaderId, ShaderLibrary,
    ShaderSource, Texture, TextureId, TextureLibrary, VertexArray, WgpuDevice,
};
pub use scene::{Aabb, AnimatedSprite, Circle, Entity, RenderInfo, Scene, Sprite, Tag, Transform};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
