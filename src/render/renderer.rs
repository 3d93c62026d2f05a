//! Per-frame sprite rendering.
//!
//! The [`Renderer`] owns one [`RenderPass`] whose framebuffer receives every
//! sprite drawn between [`begin_frame`](Renderer::begin_frame) and
//! [`end_frame`](Renderer::end_frame). Each sprite becomes one draw of the unit
//! quad: the renderer binds its texture to unit 0, uploads the model and
//! projection-view matrices and runs the quad pipeline.
//!
//! A sprite that cannot be drawn (released texture, empty atlas grid, pass not
//! begun) is logged and counted in [`FrameStats::skipped`]; the rest of the
//! frame carries on.
//!
//! # Example
//!
//! ```ignore
//! let mut renderer = Renderer::new(&mut device, RendererConfig::default())?;
//!
//! renderer.begin_frame()?;
//! renderer.render_sprite(&mut device, &sprite, camera.projection_view());
//! let stats = renderer.end_frame(&mut device)?;
//!
//! // Show the result in a window
//! renderer.present(&mut device)?;
//! ```

use std::collections::HashMap;

use glam::{Mat4, Vec4};

use super::buffer::VertexArray;
use super::command::DrawUniforms;
use super::device::{RenderDevice, RenderResult, TextureId};
use super::framebuffer::{DEFAULT_HEIGHT, DEFAULT_WIDTH, FrameBuffer};
use super::pass::RenderPass;
use super::pipeline::Pipeline;
use super::shader::{Shader, ShaderSource};
use super::texture::Texture;
use crate::color::Color;
use crate::error::RenderError;
use crate::scene::{AnimatedSprite, RenderInfo, Sprite};

/// Renderer settings.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Initial framebuffer size in pixels.
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            clear_color: Color::BLACK,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }
}

/// Draw counts for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: usize,
    pub skipped: usize,
}

/// Pixel rectangle of one frame inside an atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameRect {
    /// `(offset_u, offset_v, scale_u, scale_v)` of the rectangle in an atlas of the given size.
    pub fn uv_rect(&self, atlas_width: u32, atlas_height: u32) -> Vec4 {
        let (w, h) = (atlas_width as f32, atlas_height as f32);
        Vec4::new(
            self.x as f32 / w,
            self.y as f32 / h,
            self.width as f32 / w,
            self.height as f32 / h,
        )
    }
}

/// Locates `frame` in an atlas split into `h_frames` x `v_frames` cells, numbered
/// row-major from the top-left. Frame indices past the end wrap around.
///
/// Returns `None` for an empty grid or cells smaller than one texel.
pub fn frame_rect(
    frame: u32,
    h_frames: u32,
    v_frames: u32,
    atlas_width: u32,
    atlas_height: u32,
) -> Option<FrameRect> {
    let count = h_frames.checked_mul(v_frames).filter(|&c| c > 0)?;
    let width = atlas_width / h_frames;
    let height = atlas_height / v_frames;
    if width == 0 || height == 0 {
        return None;
    }

    let frame = frame % count;
    Some(FrameRect {
        x: (frame % h_frames) * width,
        y: (frame / h_frames) * height,
        width,
        height,
    })
}

/// Most solid-color textures kept alive at once.
pub const SOLID_CACHE_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug)]
struct SolidEntry {
    texture: TextureId,
    last_used: u64,
}

/// Solid-color textures keyed by 8-bit color, evicting the least recently used.
///
/// Evicted textures may still be referenced by draws recorded this frame, so
/// they are only destroyed once the frame has been submitted.
#[derive(Debug, Default)]
struct SolidCache {
    entries: HashMap<[u8; 4], SolidEntry>,
    evicted: Vec<TextureId>,
    clock: u64,
}

impl SolidCache {
    fn get(&mut self, key: [u8; 4], device: &dyn RenderDevice) -> Option<TextureId> {
        self.clock += 1;
        let entry = self.entries.get_mut(&key)?;
        if device.texture_size(entry.texture).is_none() {
            self.entries.remove(&key);
            return None;
        }
        entry.last_used = self.clock;
        Some(entry.texture)
    }

    fn insert(&mut self, key: [u8; 4], texture: TextureId) {
        if self.entries.len() >= SOLID_CACHE_CAPACITY {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(&key, _)| key);
            if let Some(entry) = oldest.and_then(|key| self.entries.remove(&key)) {
                self.evicted.push(entry.texture);
            }
        }
        self.entries.insert(
            key,
            SolidEntry {
                texture,
                last_used: self.clock,
            },
        );
    }

    /// Destroys textures evicted since the last call.
    fn flush(&mut self, device: &mut dyn RenderDevice) {
        for texture in self.evicted.drain(..) {
            device.destroy_texture(texture);
        }
    }

    fn clear(&mut self, device: &mut dyn RenderDevice) {
        self.flush(device);
        for (_, entry) in self.entries.drain() {
            device.destroy_texture(entry.texture);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct Renderer {
    pass: RenderPass,
    quad_pipeline: usize,
    shader: Shader,
    solid_textures: SolidCache,
    stats: FrameStats,
}

impl Renderer {
    /// Builds the quad, compiles the sprite shader and allocates the framebuffer.
    pub fn new(device: &mut dyn RenderDevice, config: RendererConfig) -> RenderResult<Self> {
        let shader = Shader::new(device, &ShaderSource::sprite())?;
        Self::with_shader(device, config, shader)
    }

    /// Like [`new`](Self::new) but draws sprites with a caller-provided shader.
    pub fn with_shader(
        device: &mut dyn RenderDevice,
        config: RendererConfig,
        shader: Shader,
    ) -> RenderResult<Self> {
        let quad = VertexArray::quad(device)?;
        let framebuffer = FrameBuffer::new(device, config.width, config.height)?;

        let mut pass = RenderPass::new("sprites", framebuffer).with_clear_color(config.clear_color);
        let quad_pipeline = pass.add_pipeline(Pipeline::new("sprite quad", shader.id(), quad));

        log::debug!(
            "renderer ready: {}x{} framebuffer, shader '{}'",
            config.width,
            config.height,
            shader.name()
        );

        Ok(Self {
            pass,
            quad_pipeline,
            shader,
            solid_textures: SolidCache::default(),
            stats: FrameStats::default(),
        })
    }

    /// Binds the framebuffer and clears it.
    pub fn begin_frame(&mut self) -> RenderResult<()> {
        self.stats = FrameStats::default();
        self.pass.begin()
    }

    /// Submits everything drawn since [`begin_frame`](Self::begin_frame).
    pub fn end_frame(&mut self, device: &mut dyn RenderDevice) -> RenderResult<FrameStats> {
        let submitted = self.pass.end(device);
        self.solid_textures.flush(device);
        submitted?;
        log::trace!("frame: {} draws, {} skipped", self.stats.draws, self.stats.skipped);
        Ok(self.stats)
    }

    /// Draws a static sprite. Untextured sprites use a 1x1 texture of their color.
    pub fn render_sprite(&mut self, device: &mut dyn RenderDevice, sprite: &Sprite, proj_view: Mat4) {
        let texture = match sprite.texture {
            Some(texture) if device.texture_size(texture).is_some() => texture,
            Some(texture) => {
                log::warn!("sprite texture {texture:?} is not loaded, skipping");
                self.stats.skipped += 1;
                return;
            }
            None => match self.solid_texture(device, sprite.color) {
                Ok(texture) => texture,
                Err(err) => {
                    log::warn!("cannot create solid texture for sprite: {err}");
                    self.stats.skipped += 1;
                    return;
                }
            },
        };

        let tiling = sprite.tiling_factor;
        let uniforms = DrawUniforms::new(sprite.model_matrix(), proj_view)
            .with_uv_rect(Vec4::new(0.0, 0.0, tiling, tiling));
        self.draw_quad(texture, uniforms);
    }

    /// Draws the current frame of an animated sprite.
    pub fn render_animated_sprite(
        &mut self,
        device: &mut dyn RenderDevice,
        sprite: &AnimatedSprite,
        proj_view: Mat4,
    ) {
        let Some(atlas) = sprite.sprite.texture else {
            log::warn!("animated sprite has no atlas texture, skipping");
            self.stats.skipped += 1;
            return;
        };
        let Some((width, height)) = device.texture_size(atlas) else {
            log::warn!("atlas texture {atlas:?} is not loaded, skipping");
            self.stats.skipped += 1;
            return;
        };
        let Some(rect) = frame_rect(sprite.current_frame, sprite.h_frames, sprite.v_frames, width, height)
        else {
            log::warn!(
                "cannot split {width}x{height} atlas into {}x{} frames, skipping",
                sprite.h_frames,
                sprite.v_frames
            );
            self.stats.skipped += 1;
            return;
        };

        let uniforms = DrawUniforms::new(sprite.model_matrix(), proj_view)
            .with_uv_rect(rect.uv_rect(width, height));
        self.draw_quad(atlas, uniforms);
    }

    /// Draws a [`RenderInfo`] bundle with its own shader and geometry.
    pub fn render_info(
        &mut self,
        device: &mut dyn RenderDevice,
        info: &RenderInfo,
        model: Mat4,
        proj_view: Mat4,
    ) {
        let texture = match info.texture {
            _ if !device.shader_exists(info.shader) => {
                Err(RenderError::UnknownShader(info.shader))
            }
            Some(texture) if device.texture_size(texture).is_some() => Ok(texture),
            Some(texture) => Err(RenderError::UnknownTexture(texture)),
            None => self.solid_texture(device, Color::WHITE),
        };
        let texture = match texture {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("skipping render info: {err}");
                self.stats.skipped += 1;
                return;
            }
        };

        let pipeline = Pipeline::new("render info", info.shader, info.vertex_array.clone());
        let uniforms = DrawUniforms::new(model, proj_view);
        let recorded = match self.pass.recording() {
            Ok((_, commands)) => {
                commands.bind_texture(0, texture);
                commands.set_uniforms(uniforms);
                pipeline.execute(commands)
            }
            Err(err) => {
                log::warn!("skipping render info: {err}");
                false
            }
        };

        if recorded {
            self.stats.draws += 1;
        } else {
            self.stats.skipped += 1;
        }
    }

    fn draw_quad(&mut self, texture: TextureId, uniforms: DrawUniforms) {
        let index = self.quad_pipeline;
        let recorded = match self.pass.recording() {
            Ok((pipelines, commands)) => match pipelines.get(index) {
                Some(pipeline) => {
                    commands.bind_texture(0, texture);
                    commands.set_uniforms(uniforms);
                    pipeline.execute(commands)
                }
                None => {
                    log::warn!("no sprite pipeline bound, skipping");
                    false
                }
            },
            Err(err) => {
                log::warn!("skipping sprite: {err}");
                false
            }
        };

        if recorded {
            self.stats.draws += 1;
        } else {
            self.stats.skipped += 1;
        }
    }

    /// A 1x1 texture of `color`, shared by every sprite of the same 8-bit color.
    fn solid_texture(&mut self, device: &mut dyn RenderDevice, color: Color) -> RenderResult<TextureId> {
        let key = color.to_rgba8();
        if let Some(texture) = self.solid_textures.get(key, device) {
            return Ok(texture);
        }
        let texture = Texture::solid(device, color)?.id();
        self.solid_textures.insert(key, texture);
        Ok(texture)
    }

    /// Number of solid-color textures currently cached.
    pub fn solid_texture_count(&self) -> usize {
        self.solid_textures.len()
    }

    /// Frees the framebuffer and every cached solid-color texture.
    ///
    /// The renderer draws nothing afterwards until [`resize`](Self::resize)
    /// gives the framebuffer a new target.
    pub fn release(&mut self, device: &mut dyn RenderDevice) {
        self.solid_textures.clear(device);
        self.pass.framebuffer_mut().release(device);
        log::debug!("renderer released");
    }

    /// Resizes the framebuffer; unchanged sizes are free.
    pub fn resize(&mut self, device: &mut dyn RenderDevice, width: u32, height: u32) -> RenderResult<()> {
        self.pass.framebuffer_mut().resize(device, width, height)
    }

    /// The framebuffer's color output for a viewport or window to display.
    pub fn color_attachment(&self) -> Option<TextureId> {
        self.pass.framebuffer().color_attachment()
    }

    /// Copies the last finished frame to the window.
    pub fn present(&self, device: &mut dyn RenderDevice) -> RenderResult<()> {
        let color = self.color_attachment().ok_or_else(|| {
            RenderError::IncompleteFramebuffer("nothing to present".into())
        })?;
        device.present(color)
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        self.pass.framebuffer()
    }

    pub fn pass(&self) -> &RenderPass {
        &self.pass
    }

    pub fn pass_mut(&mut self) -> &mut RenderPass {
        &mut self.pass
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{
        HeadlessDevice, ImageData, IndexBuffer, PassTarget, QUAD_VERTICES, SPRITE_WGSL, ShaderId,
        SpriteVertex, VertexBuffer,
    };
    use glam::Vec3;

    fn setup() -> (HeadlessDevice, Renderer) {
        let mut device = HeadlessDevice::new();
        let renderer = Renderer::new(&mut device, RendererConfig::new().size(320, 180)).unwrap();
        (device, renderer)
    }

    #[test]
    fn untextured_sprite_draws_once_with_its_color() {
        let (mut device, mut renderer) = setup();
        let sprite = Sprite::new().color(Color::rgba(0.2, 0.4, 0.6, 1.0));

        renderer.begin_frame().unwrap();
        renderer.render_sprite(&mut device, &sprite, Mat4::IDENTITY);
        let stats = renderer.end_frame(&mut device).unwrap();
        assert_eq!(stats, FrameStats { draws: 1, skipped: 0 });

        let pass = device.last_submission().unwrap();
        assert_eq!(pass.draws.len(), 1);
        let texels = device.texture_pixels(pass.draws[0].texture).unwrap();
        assert_eq!(texels.dimensions(), (1, 1));
        assert_eq!(texels.get_pixel(0, 0).0, [51, 102, 153, 255]);
    }

    #[test]
    fn solid_textures_are_cached_by_color() {
        let (mut device, mut renderer) = setup();
        let before = device.textures_created();

        renderer.begin_frame().unwrap();
        for _ in 0..3 {
            renderer.render_sprite(&mut device, &Sprite::new().color(Color::GREEN), Mat4::IDENTITY);
        }
        renderer.render_sprite(&mut device, &Sprite::new().color(Color::BLUE), Mat4::IDENTITY);
        renderer.end_frame(&mut device).unwrap();

        assert_eq!(device.textures_created(), before + 2);
        assert_eq!(device.last_submission().unwrap().draws.len(), 4);
    }

    #[test]
    fn sprite_uniforms_carry_model_and_proj_view() {
        let (mut device, mut renderer) = setup();
        let texture = Texture::from_image(&mut device, "tile", &ImageData::filled(8, 8, [255; 4])).unwrap();
        let sprite = Sprite::new()
            .position(Vec3::new(1.0, 2.0, 0.0))
            .texture(texture.id())
            .tiling(3.0);
        let proj_view = Mat4::from_scale(Vec3::splat(0.5));

        renderer.begin_frame().unwrap();
        renderer.render_sprite(&mut device, &sprite, proj_view);
        renderer.end_frame(&mut device).unwrap();

        let draw = device.last_submission().unwrap().draws[0];
        assert_eq!(draw.texture, texture.id());
        assert_eq!(draw.uniforms.model, sprite.model_matrix().to_cols_array_2d());
        assert_eq!(draw.uniforms.proj_view, proj_view.to_cols_array_2d());
        assert_eq!(draw.uniforms.uv_rect, [0.0, 0.0, 3.0, 3.0]);
        assert_eq!(draw.index_count, 6);
    }

    #[test]
    fn frame_rect_in_single_row_atlas() {
        let rect = frame_rect(3, 6, 1, 192, 32).unwrap();
        assert_eq!(rect, FrameRect { x: 96, y: 0, width: 32, height: 32 });
        assert_eq!(rect.x, 3 * rect.width);
    }

    #[test]
    fn frame_rect_in_grid_atlas() {
        let rect = frame_rect(4, 3, 2, 96, 64).unwrap();
        assert_eq!((rect.x, rect.y), (32, 32));
        assert_eq!(frame_rect(7, 3, 2, 96, 64).unwrap(), frame_rect(1, 3, 2, 96, 64).unwrap());
        assert_eq!(frame_rect(0, 0, 2, 96, 64), None);
        assert_eq!(frame_rect(0, 200, 1, 96, 64), None);
    }

    #[test]
    fn animated_sprite_samples_its_frame() {
        let (mut device, mut renderer) = setup();
        let atlas = Texture::from_image(&mut device, "run", &ImageData::filled(192, 32, [255; 4])).unwrap();
        let mut sprite = AnimatedSprite::new(atlas.id(), 6, 1, 0.1);
        sprite.current_frame = 3;

        renderer.begin_frame().unwrap();
        renderer.render_animated_sprite(&mut device, &sprite, Mat4::IDENTITY);
        renderer.end_frame(&mut device).unwrap();

        let draw = device.last_submission().unwrap().draws[0];
        assert_eq!(draw.texture, atlas.id());
        assert_eq!(draw.uniforms.uv_rect, [0.5, 0.0, 1.0 / 6.0, 1.0]);
    }

    #[test]
    fn bad_sprites_are_skipped_not_fatal() {
        let (mut device, mut renderer) = setup();
        let atlas = Texture::from_image(&mut device, "atlas", &ImageData::filled(4, 4, [255; 4])).unwrap();
        let mut no_atlas = AnimatedSprite::new(atlas.id(), 2, 2, 0.1);
        no_atlas.sprite.texture = None;
        let empty_grid = AnimatedSprite::new(atlas.id(), 0, 0, 0.1);
        let released = Sprite::new().texture(TextureId(9999));

        renderer.begin_frame().unwrap();
        renderer.render_animated_sprite(&mut device, &no_atlas, Mat4::IDENTITY);
        renderer.render_animated_sprite(&mut device, &empty_grid, Mat4::IDENTITY);
        renderer.render_sprite(&mut device, &released, Mat4::IDENTITY);
        renderer.render_sprite(&mut device, &Sprite::new(), Mat4::IDENTITY);
        let stats = renderer.end_frame(&mut device).unwrap();

        assert_eq!(stats, FrameStats { draws: 1, skipped: 3 });
        assert_eq!(device.last_submission().unwrap().draws.len(), 1);
    }

    #[test]
    fn drawing_outside_a_frame_is_skipped() {
        let (mut device, mut renderer) = setup();
        renderer.render_sprite(&mut device, &Sprite::new(), Mat4::IDENTITY);
        assert_eq!(renderer.stats().skipped, 1);
        assert!(device.submissions().is_empty());
    }

    #[test]
    fn frames_clear_into_the_framebuffer() {
        let (mut device, mut renderer) = setup();
        renderer.begin_frame().unwrap();
        renderer.end_frame(&mut device).unwrap();

        let pass = device.last_submission().unwrap();
        let target = renderer.framebuffer().target().unwrap();
        assert_eq!(pass.target, PassTarget::Offscreen(target));
        assert_eq!(pass.clear, Some(Color::BLACK));

        renderer.present(&mut device).unwrap();
        assert_eq!(device.presented(), &[renderer.color_attachment().unwrap()]);
    }

    #[test]
    fn resize_keeps_attachment_when_unchanged() {
        let (mut device, mut renderer) = setup();
        let color = renderer.color_attachment();
        renderer.resize(&mut device, 320, 180).unwrap();
        assert_eq!(renderer.color_attachment(), color);
        renderer.resize(&mut device, 640, 360).unwrap();
        assert_ne!(renderer.color_attachment(), color);
        assert_eq!(renderer.framebuffer().size(), (640, 360));
    }

    fn triangle(device: &mut HeadlessDevice) -> VertexArray {
        let vertex = VertexBuffer::new(device, &QUAD_VERTICES[..3], SpriteVertex::layout()).unwrap();
        let index = IndexBuffer::new(device, &[0, 1, 2]).unwrap();
        VertexArray::new(vertex, index)
    }

    #[test]
    fn render_info_draws_its_own_shader_and_geometry() {
        let (mut device, mut renderer) = setup();
        let source = ShaderSource::new("flat", SPRITE_WGSL, SpriteVertex::layout());
        let shader = Shader::new(&mut device, &source).unwrap();
        let texture = Texture::from_image(&mut device, "skin", &ImageData::filled(2, 2, [255; 4])).unwrap();
        let geometry = triangle(&mut device);
        let info = RenderInfo::new(shader.id(), geometry.clone()).with_texture(texture.id());
        let model = Mat4::from_translation(Vec3::new(2.0, -1.0, 0.0));

        renderer.begin_frame().unwrap();
        renderer.render_info(&mut device, &info, model, Mat4::IDENTITY);
        let stats = renderer.end_frame(&mut device).unwrap();
        assert_eq!(stats, FrameStats { draws: 1, skipped: 0 });

        let draw = device.last_submission().unwrap().draws[0];
        assert_eq!(draw.shader, shader.id());
        assert_eq!(draw.texture, texture.id());
        assert_eq!(draw.index_count, 3);
        assert_eq!(draw.geometry.index, geometry.index_buffer().id());
        assert_eq!(draw.uniforms.model, model.to_cols_array_2d());
    }

    #[test]
    fn untextured_render_info_samples_white() {
        let (mut device, mut renderer) = setup();
        let geometry = triangle(&mut device);
        let info = RenderInfo::new(renderer.shader().id(), geometry);

        renderer.begin_frame().unwrap();
        renderer.render_info(&mut device, &info, Mat4::IDENTITY, Mat4::IDENTITY);
        renderer.end_frame(&mut device).unwrap();

        let draw = device.last_submission().unwrap().draws[0];
        let texels = device.texture_pixels(draw.texture).unwrap();
        assert_eq!(texels.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn render_info_with_dead_resources_is_skipped() {
        let (mut device, mut renderer) = setup();
        let texture = Texture::from_image(&mut device, "gone", &ImageData::filled(2, 2, [255; 4])).unwrap();
        device.destroy_texture(texture.id());
        let released = RenderInfo::new(renderer.shader().id(), triangle(&mut device)).with_texture(texture.id());
        let unknown_shader = RenderInfo::new(ShaderId(999), triangle(&mut device));

        renderer.begin_frame().unwrap();
        renderer.render_info(&mut device, &released, Mat4::IDENTITY, Mat4::IDENTITY);
        renderer.render_info(&mut device, &unknown_shader, Mat4::IDENTITY, Mat4::IDENTITY);
        let stats = renderer.end_frame(&mut device).unwrap();

        assert_eq!(stats, FrameStats { draws: 0, skipped: 2 });
        assert!(device.last_submission().unwrap().draws.is_empty());
    }

    #[test]
    fn fading_sprite_keeps_texture_count_bounded() {
        let (mut device, mut renderer) = setup();
        let baseline = device.live_textures();

        for frame in 0..1000 {
            let t = frame as f32 / 999.0;
            let sprite = Sprite::new().color(Color::rgba(t, 1.0 - t, 0.5, 1.0));
            renderer.begin_frame().unwrap();
            renderer.render_sprite(&mut device, &sprite, Mat4::IDENTITY);
            let stats = renderer.end_frame(&mut device).unwrap();
            assert_eq!(stats.draws, 1);
            assert_eq!(device.last_submission().unwrap().draws.len(), 1);
        }

        assert!(device.textures_created() > baseline + SOLID_CACHE_CAPACITY);
        assert_eq!(renderer.solid_texture_count(), SOLID_CACHE_CAPACITY);
        assert_eq!(device.live_textures(), baseline + SOLID_CACHE_CAPACITY);
    }

    #[test]
    fn evicted_colors_survive_until_the_frame_is_submitted() {
        let (mut device, mut renderer) = setup();

        renderer.begin_frame().unwrap();
        for i in 0..=SOLID_CACHE_CAPACITY {
            let sprite = Sprite::new().color(Color::rgb(i as f32 / 255.0, 0.0, 0.0));
            renderer.render_sprite(&mut device, &sprite, Mat4::IDENTITY);
        }
        let stats = renderer.end_frame(&mut device).unwrap();

        assert_eq!(stats.draws, SOLID_CACHE_CAPACITY + 1);
        assert_eq!(device.last_submission().unwrap().draws.len(), SOLID_CACHE_CAPACITY + 1);
        assert_eq!(renderer.solid_texture_count(), SOLID_CACHE_CAPACITY);
    }

    #[test]
    fn release_frees_framebuffer_and_solid_textures() {
        let (mut device, mut renderer) = setup();
        let baseline = device.live_textures();
        renderer.begin_frame().unwrap();
        renderer.render_sprite(&mut device, &Sprite::new().color(Color::RED), Mat4::IDENTITY);
        renderer.end_frame(&mut device).unwrap();
        assert_eq!(device.live_textures(), baseline + 1);

        renderer.release(&mut device);
        assert_eq!(device.live_render_targets(), 0);
        assert_eq!(device.live_textures(), 0);
        assert_eq!(renderer.color_attachment(), None);
        assert!(renderer.begin_frame().is_err());

        renderer.resize(&mut device, 320, 180).unwrap();
        assert!(renderer.color_attachment().is_some());
    }
}
