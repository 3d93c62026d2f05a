//! An in-memory [`RenderDevice`] that records instead of drawing.
//!
//! Textures keep their texels as [`RgbaImage`]s and every submitted pass is
//! stored with its resolved draw calls, which makes the device useful for
//! tests and for tooling that runs without a GPU.
//!
//! # Example
//!
//! ```ignore
//! let mut device = HeadlessDevice::new();
//! let mut renderer = Renderer::new(&mut device, RendererConfig::default())?;
//! renderer.begin_frame()?;
//! renderer.render_sprite(&mut device, &Sprite::new(), Mat4::IDENTITY);
//! renderer.end_frame(&mut device)?;
//! assert_eq!(device.last_submission().unwrap().draws.len(), 1);
//! ```

use image::{Rgba, RgbaImage};

use super::buffer::VertexLayout;
use super::command::{CommandList, DrawCall};
use super::device::{
    BufferId, ImageData, PassTarget, RenderDevice, RenderResult, RenderTargetId, ShaderId,
    TargetStatus, TextureId, TextureRegion,
};
use super::shader::ShaderSource;
use crate::color::Color;
use crate::error::RenderError;

/// Largest texture edge accepted unless configured otherwise.
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// One pass as the device received it.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmittedPass {
    pub target: PassTarget,
    pub clear: Option<Color>,
    pub draws: Vec<DrawCall>,
}

#[derive(Debug)]
struct HeadlessTarget {
    color: TextureId,
    status: TargetStatus,
}

#[derive(Debug)]
pub struct HeadlessDevice {
    buffers: Vec<usize>,
    shaders: Vec<String>,
    textures: Vec<Option<RgbaImage>>,
    targets: Vec<Option<HeadlessTarget>>,
    max_dimension: u32,
    submissions: Vec<SubmittedPass>,
    presented: Vec<TextureId>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::with_max_dimension(DEFAULT_MAX_DIMENSION)
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose render targets are incomplete above `max_dimension` texels per edge.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            buffers: Vec::new(),
            shaders: Vec::new(),
            textures: Vec::new(),
            targets: Vec::new(),
            max_dimension,
            submissions: Vec::new(),
            presented: Vec::new(),
        }
    }

    pub fn texture_pixels(&self, texture: TextureId) -> Option<&RgbaImage> {
        self.textures.get(texture.0).and_then(Option::as_ref)
    }

    pub fn textures_created(&self) -> usize {
        self.textures.len()
    }

    /// Textures not yet destroyed, render target attachments included.
    pub fn live_textures(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }

    pub fn shader_name(&self, shader: ShaderId) -> Option<&str> {
        self.shaders.get(shader.0).map(String::as_str)
    }

    pub fn render_targets_created(&self) -> usize {
        self.targets.len()
    }

    pub fn live_render_targets(&self) -> usize {
        self.targets.iter().filter(|t| t.is_some()).count()
    }

    pub fn submissions(&self) -> &[SubmittedPass] {
        &self.submissions
    }

    pub fn last_submission(&self) -> Option<&SubmittedPass> {
        self.submissions.last()
    }

    /// Textures handed to [`present`](RenderDevice::present), oldest first.
    pub fn presented(&self) -> &[TextureId] {
        &self.presented
    }

    fn known_draw(&self, draw: &DrawCall) -> bool {
        self.shader_exists(draw.shader)
            && draw.geometry.vertex.0 < self.buffers.len()
            && draw.geometry.index.0 < self.buffers.len()
            && self.texture_pixels(draw.texture).is_some()
    }

    fn target(&self, target: RenderTargetId) -> RenderResult<&HeadlessTarget> {
        self.targets
            .get(target.0)
            .and_then(Option::as_ref)
            .ok_or(RenderError::UnknownRenderTarget(target))
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_vertex_buffer(
        &mut self,
        contents: &[u8],
        _layout: &VertexLayout,
    ) -> RenderResult<BufferId> {
        self.buffers.push(contents.len());
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> RenderResult<BufferId> {
        self.buffers.push(std::mem::size_of_val(indices));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn create_shader(&mut self, source: &ShaderSource) -> RenderResult<ShaderId> {
        let fail = |message: &str| RenderError::ShaderCompilation {
            name: source.name.clone(),
            message: message.to_string(),
        };
        if !source.wgsl.contains("fn vs") {
            return Err(fail("missing vertex entry point `vs`"));
        }
        if !source.wgsl.contains("fn fs") {
            return Err(fail("missing fragment entry point `fs`"));
        }
        source.layout.wgpu_attributes()?;

        self.shaders.push(source.name.clone());
        Ok(ShaderId(self.shaders.len() - 1))
    }

    fn shader_exists(&self, shader: ShaderId) -> bool {
        shader.0 < self.shaders.len()
    }

    fn create_texture(&mut self, label: &str, image: &ImageData) -> RenderResult<TextureId> {
        let rgba = image.to_rgba8(label)?;
        self.textures.push(Some(rgba));
        Ok(TextureId(self.textures.len() - 1))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        let attachment = self.targets.iter().flatten().any(|t| t.color == texture);
        if attachment {
            log::warn!("texture {texture:?} belongs to a render target, not destroying it");
            return;
        }
        if let Some(slot) = self.textures.get_mut(texture.0) {
            *slot = None;
        }
    }

    fn write_texture(
        &mut self,
        texture: TextureId,
        region: TextureRegion,
        rgba: &[u8],
    ) -> RenderResult<()> {
        let pixels = self
            .textures
            .get_mut(texture.0)
            .and_then(Option::as_mut)
            .ok_or(RenderError::UnknownTexture(texture))?;
        region.validate(pixels.width(), pixels.height(), rgba.len())?;

        for (i, texel) in rgba.chunks_exact(4).enumerate() {
            let x = region.x + i as u32 % region.width;
            let y = region.y + i as u32 / region.width;
            pixels.put_pixel(x, y, Rgba([texel[0], texel[1], texel[2], texel[3]]));
        }
        Ok(())
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.texture_pixels(texture).map(RgbaImage::dimensions)
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> RenderResult<RenderTargetId> {
        let status = if width > self.max_dimension || height > self.max_dimension {
            TargetStatus::Incomplete(format!(
                "{width}x{height} exceeds the {} texel limit",
                self.max_dimension
            ))
        } else {
            TargetStatus::Complete
        };

        // oversized targets keep a placeholder attachment so status can report on them
        let (w, h) = if status == TargetStatus::Complete {
            (width, height)
        } else {
            (1, 1)
        };
        self.textures.push(Some(RgbaImage::new(w, h)));
        let color = TextureId(self.textures.len() - 1);

        self.targets.push(Some(HeadlessTarget { color, status }));
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
        if let PassTarget::Offscreen(id) = target {
            let color = self.target(id)?.color;
            if let (Some(clear), Some(Some(pixels))) = (clear, self.textures.get_mut(color.0)) {
                let [r, g, b, a] = clear.to_rgba8();
                for texel in pixels.pixels_mut() {
                    *texel = Rgba([r, g, b, a]);
                }
            }
        }

        let draws = commands
            .resolve()
            .into_iter()
            .filter(|draw| {
                let known = self.known_draw(draw);
                if !known {
                    log::warn!("skipping draw with released or unknown resources: {draw:?}");
                }
                known
            })
            .collect();

        self.submissions.push(SubmittedPass {
            target,
            clear,
            draws,
        });
        Ok(())
    }

    fn present(&mut self, texture: TextureId) -> RenderResult<()> {
        if self.texture_pixels(texture).is_none() {
            return Err(RenderError::UnknownTexture(texture));
        }
        self.presented.push(texture);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_fills_the_color_attachment() {
        let mut device = HeadlessDevice::new();
        let target = device.create_render_target(4, 4).unwrap();
        device
            .submit(PassTarget::Offscreen(target), Some(Color::RED), &CommandList::new())
            .unwrap();

        let color = device.render_target_color(target).unwrap();
        let pixels = device.texture_pixels(color).unwrap();
        assert!(pixels.pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn destroyed_textures_stop_resolving() {
        let mut device = HeadlessDevice::new();
        let texture = device.create_texture("tile", &ImageData::filled(2, 2, [255; 4])).unwrap();
        let target = device.create_render_target(4, 4).unwrap();
        let color = device.render_target_color(target).unwrap();
        assert_eq!(device.live_textures(), 2);

        device.destroy_texture(texture);
        device.destroy_texture(color);
        device.destroy_texture(TextureId(99));

        assert_eq!(device.texture_size(texture), None);
        assert_eq!(device.texture_size(color), Some((4, 4)));
        assert_eq!(device.live_textures(), 1);
    }

    #[test]
    fn destroyed_targets_release_their_texture() {
        let mut device = HeadlessDevice::new();
        let target = device.create_render_target(4, 4).unwrap();
        let color = device.render_target_color(target).unwrap();

        device.destroy_render_target(target);
        assert_eq!(device.texture_size(color), None);
        assert!(matches!(
            device.render_target_status(target),
            TargetStatus::Incomplete(_)
        ));
        assert!(device.submit(PassTarget::Offscreen(target), None, &CommandList::new()).is_err());
        assert!(device.present(color).is_err());
    }
}
