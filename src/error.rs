//! Error types shared across the engine.
//!
//! Resource creation and configuration problems surface as [`RenderError`];
//! entity/component lookups surface as [`SceneError`]; [`AppError`] ends the
//! windowed host. Per-draw problems are never returned from a frame: the
//! renderer logs and skips them instead.

use thiserror::Error;

use crate::render::{RenderTargetId, ShaderId, TextureId};
use crate::scene::Entity;

/// Errors raised while creating or using GPU resources.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// No GPU adapter compatible with the window surface was found.
    #[error("no suitable GPU adapter found")]
    AdapterUnavailable,

    /// The adapter refused to create a logical device.
    #[error("failed to create GPU device: {0}")]
    DeviceRequest(String),

    /// The window surface could not be created or acquired.
    #[error("surface error: {0}")]
    Surface(String),

    /// A shader failed to compile or validate.
    #[error("shader '{name}' failed to compile: {message}")]
    ShaderCompilation { name: String, message: String },

    /// Shader text could not be read from disk.
    #[error("cannot read shader '{path}': {reason}")]
    ShaderRead { path: String, reason: String },

    /// A decoded pixel buffer does not describe a valid image.
    #[error("invalid image '{label}': {reason}")]
    InvalidImage { label: String, reason: String },

    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    #[error("unknown shader {0:?}")]
    UnknownShader(ShaderId),

    #[error("unknown render target {0:?}")]
    UnknownRenderTarget(RenderTargetId),

    /// The framebuffer attachments are missing or unusable.
    #[error("framebuffer incomplete: {0}")]
    IncompleteFramebuffer(String),

    #[error("framebuffer is not bound")]
    FramebufferNotBound,

    #[error("render pass has not begun")]
    PassNotBegun,

    #[error("render pass already begun")]
    PassAlreadyBegun,

    /// A texture write falls outside the texture or has the wrong byte length.
    #[error("invalid texture region: {0}")]
    InvalidRegion(String),

    /// A vertex attribute type that cannot be fed to a vertex shader.
    #[error("unsupported vertex attribute '{0}'")]
    UnsupportedAttribute(String),
}

/// Errors raised by entity and component lookups on a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The entity was destroyed or never existed.
    #[error("unknown entity {0}")]
    UnknownEntity(Entity),

    /// The entity belongs to a different scene.
    #[error("entity {0} belongs to another scene")]
    ForeignEntity(Entity),

    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },
}

/// Errors that stop the windowed host.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
