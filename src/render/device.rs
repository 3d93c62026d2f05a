//! The device seam every GPU resource is created through.
//!
//! A [`RenderDevice`] owns all GPU objects in pools and hands out small `Copy`
//! handles. Components, libraries and pipelines only ever hold handles, so a
//! texture or shader lives exactly as long as the device that created it.
//!
//! Two implementations ship with the crate:
//!
//! - [`WgpuDevice`](super::WgpuDevice) drives a real GPU through [`GpuContext`](crate::GpuContext).
//! - [`HeadlessDevice`](super::HeadlessDevice) keeps everything in memory and records
//!   submitted passes, for tests and tooling that run without a window.

use image::RgbaImage;

use super::buffer::VertexLayout;
use super::command::CommandList;
use super::shader::ShaderSource;
use crate::color::Color;
use crate::error::RenderError;

/// Result type for device operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Handle to a vertex or index buffer owned by a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) usize);

/// Handle to a compiled shader program owned by a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub(crate) usize);

/// Handle to a texture owned by a device.
///
/// Framebuffer color attachments are textures too, so the handle returned by
/// [`FrameBuffer::color_attachment`](super::FrameBuffer::color_attachment) can be
/// sampled or presented like any other texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

/// Handle to an off-screen color + depth/stencil target owned by a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub(crate) usize);

/// Where a submitted pass draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    /// The window surface.
    Screen,
    /// An off-screen target.
    Offscreen(RenderTargetId),
}

/// Completeness of an off-screen target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetStatus {
    Complete,
    Incomplete(String),
}

/// A rectangle of texels inside a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Checks the region lies inside a `tex_width` x `tex_height` texture and
    /// that `byte_len` matches its RGBA8 size.
    pub fn validate(&self, tex_width: u32, tex_height: u32, byte_len: usize) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidRegion("empty region".into()));
        }
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        match (right, bottom) {
            (Some(r), Some(b)) if r <= tex_width && b <= tex_height => {}
            _ => {
                return Err(RenderError::InvalidRegion(format!(
                    "{self:?} exceeds {tex_width}x{tex_height}"
                )));
            }
        }
        let expected = self.width as usize * self.height as usize * 4;
        if byte_len != expected {
            return Err(RenderError::InvalidRegion(format!(
                "expected {expected} bytes, got {byte_len}"
            )));
        }
        Ok(())
    }
}

/// A decoded pixel buffer handed over by the asset loader.
///
/// Rows are tightly packed, top row first. One to four 8-bit channels are
/// accepted; [`to_rgba8`](Self::to_rgba8) expands them for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            pixels,
        }
    }

    /// A `width` x `height` image filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self::new(width, height, 4, pixels)
    }

    /// Expands the pixels to RGBA8, validating dimensions and length.
    pub fn to_rgba8(&self, label: &str) -> RenderResult<RgbaImage> {
        let invalid = |reason: String| RenderError::InvalidImage {
            label: label.to_string(),
            reason,
        };

        if self.width == 0 || self.height == 0 {
            return Err(invalid(format!("zero size {}x{}", self.width, self.height)));
        }
        if !(1..=4).contains(&self.channels) {
            return Err(invalid(format!("unsupported channel count {}", self.channels)));
        }
        let texels = self.width as usize * self.height as usize;
        if self.pixels.len() != texels * self.channels as usize {
            return Err(invalid(format!(
                "expected {} bytes, got {}",
                texels * self.channels as usize,
                self.pixels.len()
            )));
        }

        let rgba: Vec<u8> = match self.channels {
            4 => self.pixels.clone(),
            3 => self
                .pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            2 => self
                .pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            _ => self.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        };

        RgbaImage::from_raw(self.width, self.height, rgba)
            .ok_or_else(|| invalid("pixel buffer too small".into()))
    }
}

impl From<RgbaImage> for ImageData {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, 4, image.into_raw())
    }
}

/// Creates and drives GPU resources.
///
/// All calls happen on the thread that owns the device; nothing here is
/// expected to be shared across threads.
pub trait RenderDevice {
    fn create_vertex_buffer(&mut self, contents: &[u8], layout: &VertexLayout)
    -> RenderResult<BufferId>;

    fn create_index_buffer(&mut self, indices: &[u32]) -> RenderResult<BufferId>;

    /// Compiles a shader program. Failures are reported, never panicked on.
    fn create_shader(&mut self, source: &ShaderSource) -> RenderResult<ShaderId>;

    /// Whether `shader` was compiled by this device.
    fn shader_exists(&self, shader: ShaderId) -> bool;

    fn create_texture(&mut self, label: &str, image: &ImageData) -> RenderResult<TextureId>;

    /// Frees a texture. Unknown ids and render target attachments are ignored.
    fn destroy_texture(&mut self, texture: TextureId);

    /// Overwrites a region of an existing texture with tightly packed RGBA8 texels.
    fn write_texture(
        &mut self,
        texture: TextureId,
        region: TextureRegion,
        rgba: &[u8],
    ) -> RenderResult<()>;

    /// Texel size of a live texture.
    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)>;

    /// Allocates a color + depth/stencil target.
    fn create_render_target(&mut self, width: u32, height: u32) -> RenderResult<RenderTargetId>;

    /// Releases a target and its attachments. Unknown ids are ignored.
    fn destroy_render_target(&mut self, target: RenderTargetId);

    fn render_target_status(&self, target: RenderTargetId) -> TargetStatus;

    /// The color attachment of a target, as a sampleable texture.
    fn render_target_color(&self, target: RenderTargetId) -> Option<TextureId>;

    /// Executes a recorded pass against `target`, clearing first when `clear` is set.
    fn submit(
        &mut self,
        target: PassTarget,
        clear: Option<Color>,
        commands: &CommandList,
    ) -> RenderResult<()>;

    /// Copies a texture onto the whole window surface and presents it.
    fn present(&mut self, texture: TextureId) -> RenderResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_validation() {
        let region = TextureRegion::new(2, 0, 2, 2);
        assert!(region.validate(4, 2, 16).is_ok());
        assert!(region.validate(3, 2, 16).is_err());
        assert!(region.validate(4, 2, 12).is_err());
        assert!(TextureRegion::new(0, 0, 0, 1).validate(4, 4, 0).is_err());
    }

    #[test]
    fn image_expands_to_rgba() {
        let rgb = ImageData::new(2, 1, 3, vec![1, 2, 3, 4, 5, 6]);
        let rgba = rgb.to_rgba8("rgb").unwrap();
        assert_eq!(rgba.into_raw(), vec![1, 2, 3, 255, 4, 5, 6, 255]);

        let gray = ImageData::new(1, 1, 1, vec![9]);
        assert_eq!(gray.to_rgba8("gray").unwrap().into_raw(), vec![9, 9, 9, 255]);
    }

    #[test]
    fn image_rejects_bad_buffers() {
        assert!(ImageData::new(2, 2, 4, vec![0; 15]).to_rgba8("short").is_err());
        assert!(ImageData::new(0, 2, 4, vec![]).to_rgba8("empty").is_err());
        assert!(ImageData::new(1, 1, 5, vec![0; 5]).to_rgba8("five").is_err());
    }
}
