//! Plain-data components attached to scene entities.
//!
//! Components hold only lightweight handles into device-owned resources
//! ([`TextureId`], [`ShaderId`], buffer ids inside [`VertexArray`]), so copying or
//! dropping a component never touches GPU memory.
//!
//! # Example
//!
//! ```ignore
//! let player = scene.create_entity("player");
//! scene.add_component(player, Transform::new().translation(Vec3::new(0.0, 1.0, 0.0)))?;
//! scene.add_component(player, Sprite::new().color(Color::RED).scale(Vec3::splat(0.5)))?;
//! ```

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::render::{ShaderId, TextureId, VertexArray};

/// Display name of an entity. Every entity gets one on creation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Translation, Euler rotation (radians) and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// translate * rotate_x * rotate_y * rotate_z * scale
    pub fn model_matrix(&self) -> Mat4 {
        euler_model(self.translation, self.rotation, self.scale)
    }
}

/// A textured or solid-colored quad.
///
/// `rotation` is in degrees per axis. Without a texture the quad is filled
/// with `color`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Vec3,
    pub color: Color,
    pub texture: Option<TextureId>,
    /// Texture repeats across the quad; 1.0 maps the texture once.
    pub tiling_factor: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            color: Color::WHITE,
            texture: None,
            tiling_factor: 1.0,
        }
    }
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn tiling(mut self, factor: f32) -> Self {
        self.tiling_factor = factor;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        let radians = Vec3::new(
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        );
        euler_model(self.position, radians, self.scale)
    }
}

/// A sprite that plays frames from a texture atlas.
///
/// The atlas is a grid of `h_frames` x `v_frames` equally sized frames,
/// numbered row-major from the top-left. [`advance`](Self::advance) steps the
/// frame; the renderer only reads `current_frame`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedSprite {
    pub sprite: Sprite,
    pub h_frames: u32,
    pub v_frames: u32,
    /// Seconds each frame stays on screen.
    pub frame_time: f32,
    pub elapsed: f32,
    pub current_frame: u32,
}

impl AnimatedSprite {
    pub fn new(atlas: TextureId, h_frames: u32, v_frames: u32, frame_time: f32) -> Self {
        Self {
            sprite: Sprite::new().texture(atlas),
            h_frames,
            v_frames,
            frame_time,
            elapsed: 0.0,
            current_frame: 0,
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn frame_count(&self) -> u32 {
        self.h_frames * self.v_frames
    }

    /// Accumulates `dt` seconds and moves one frame per whole `frame_time`,
    /// wrapping after the last frame.
    pub fn advance(&mut self, dt: f32) {
        let count = self.frame_count();
        if count == 0 || self.frame_time <= 0.0 {
            return;
        }
        self.elapsed += dt;
        let steps = (self.elapsed / self.frame_time).floor();
        if steps >= 1.0 {
            self.elapsed -= steps * self.frame_time;
            let steps = (steps as u64 % count as u64) as u32;
            self.current_frame = (self.current_frame % count + steps) % count;
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.sprite.model_matrix()
    }
}

/// Shader, texture and geometry bundled for a custom draw with the entity's [`Transform`].
#[derive(Clone, Debug, PartialEq)]
pub struct RenderInfo {
    pub shader: ShaderId,
    pub texture: Option<TextureId>,
    pub vertex_array: VertexArray,
}

impl RenderInfo {
    pub fn new(shader: ShaderId, vertex_array: VertexArray) -> Self {
        Self {
            shader,
            texture: None,
            vertex_array,
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }
}

/// Axis-aligned box: centre and full extents.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Aabb {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Aabb {
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    pub fn min(&self) -> Vec3 {
        self.position - self.scale * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.position + self.scale * 0.5
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Circle {
    pub position: Vec3,
    pub radius: f32,
}

impl Circle {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }
}

fn euler_model(translation: Vec3, radians: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(translation)
        * Mat4::from_rotation_x(radians.x)
        * Mat4::from_rotation_y(radians.y)
        * Mat4::from_rotation_z(radians.z)
        * Mat4::from_scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let transform = Transform {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        };
        assert_eq!(transform.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn transform_applies_scale_before_rotation_and_translation() {
        let transform = Transform::new()
            .translation(Vec3::new(10.0, 0.0, 0.0))
            .rotation(Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2))
            .scale(Vec3::new(2.0, 1.0, 1.0));
        let p = transform.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(10.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn sprite_rotation_is_in_degrees() {
        let sprite = Sprite::new().rotation(Vec3::new(0.0, 0.0, 180.0));
        let p = sprite.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(-Vec3::X, 1e-5));
    }

    #[test]
    fn animation_steps_and_wraps() {
        let mut anim = AnimatedSprite::new(TextureId(0), 3, 2, 0.1);
        anim.advance(0.05);
        assert_eq!(anim.current_frame, 0);
        anim.advance(0.06);
        assert_eq!(anim.current_frame, 1);
        anim.advance(0.45);
        assert_eq!(anim.current_frame, 5);
        anim.advance(0.1);
        assert_eq!(anim.current_frame, 0);
        assert!(anim.elapsed < anim.frame_time);
    }

    #[test]
    fn animation_without_frames_is_inert() {
        let mut anim = AnimatedSprite::new(TextureId(0), 0, 1, 0.1);
        anim.advance(10.0);
        assert_eq!(anim.current_frame, 0);
    }

    #[test]
    fn aabb_extents() {
        let aabb = Aabb::new(Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 4.0, 0.0));
        assert_eq!(aabb.min(), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(aabb.max(), Vec3::new(2.0, 3.0, 0.0));
    }
}
