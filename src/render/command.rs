//! Recorded bind/draw commands.
//!
//! Pipelines and the renderer never talk to the GPU directly while a pass is
//! open. They record into a [`CommandList`] using bind/unbind semantics, and the
//! device replays the list when the pass ends. [`CommandList::resolve`] turns
//! the recorded state changes into self-contained [`DrawCall`]s.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use super::buffer::VertexArray;
use super::device::{BufferId, ShaderId, TextureId};

/// Number of texture units a draw can address.
pub const TEXTURE_UNITS: usize = 4;

/// Per-draw uniform block consumed by the sprite shader.
///
/// `uv_rect` is `(offset_u, offset_v, scale_u, scale_v)`; the full texture is
/// `(0, 0, 1, 1)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub proj_view: [[f32; 4]; 4],
    pub uv_rect: [f32; 4],
    pub texture_unit: u32,
    pub _pad: [u32; 3],
}

impl DrawUniforms {
    pub fn new(model: Mat4, proj_view: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            proj_view: proj_view.to_cols_array_2d(),
            uv_rect: [0.0, 0.0, 1.0, 1.0],
            texture_unit: 0,
            _pad: [0; 3],
        }
    }

    pub fn with_uv_rect(mut self, uv_rect: Vec4) -> Self {
        self.uv_rect = uv_rect.to_array();
        self
    }
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// Vertex and index buffers bound for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundGeometry {
    pub vertex: BufferId,
    pub index: BufferId,
    pub index_count: u32,
}

impl From<&VertexArray> for BoundGeometry {
    fn from(va: &VertexArray) -> Self {
        Self {
            vertex: va.vertex_buffer().id(),
            index: va.index_buffer().id(),
            index_count: va.index_count(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderCommand {
    BindShader(ShaderId),
    UnbindShader,
    BindVertexArray(BoundGeometry),
    UnbindVertexArray,
    BindTexture { slot: u32, texture: TextureId },
    SetUniforms(DrawUniforms),
    DrawIndexed { index_count: u32 },
}

/// A fully specified indexed draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub shader: ShaderId,
    pub geometry: BoundGeometry,
    pub index_count: u32,
    pub texture: TextureId,
    pub uniforms: DrawUniforms,
}

/// Commands recorded for one pass.
#[derive(Clone, Debug, Default)]
pub struct CommandList {
    commands: Vec<RenderCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_shader(&mut self, shader: ShaderId) {
        self.commands.push(RenderCommand::BindShader(shader));
    }

    pub fn unbind_shader(&mut self) {
        self.commands.push(RenderCommand::UnbindShader);
    }

    pub fn bind_vertex_array(&mut self, va: &VertexArray) {
        self.commands.push(RenderCommand::BindVertexArray(va.into()));
    }

    pub fn unbind_vertex_array(&mut self) {
        self.commands.push(RenderCommand::UnbindVertexArray);
    }

    pub fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        self.commands.push(RenderCommand::BindTexture { slot, texture });
    }

    pub fn set_uniforms(&mut self, uniforms: DrawUniforms) {
        self.commands.push(RenderCommand::SetUniforms(uniforms));
    }

    pub fn draw_indexed(&mut self, index_count: u32) {
        self.commands.push(RenderCommand::DrawIndexed { index_count });
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of draw commands recorded, complete or not.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawIndexed { .. }))
            .count()
    }

    /// Replays the bind state machine and returns every complete draw.
    ///
    /// A draw needs a shader, a vertex array and a texture on the unit named by
    /// its uniforms. Draws missing any of these are logged and dropped.
    pub fn resolve(&self) -> Vec<DrawCall> {
        let mut shader = None;
        let mut geometry = None;
        let mut textures = [None; TEXTURE_UNITS];
        let mut uniforms = DrawUniforms::default();
        let mut draws = Vec::new();

        for command in &self.commands {
            match *command {
                RenderCommand::BindShader(id) => shader = Some(id),
                RenderCommand::UnbindShader => shader = None,
                RenderCommand::BindVertexArray(g) => geometry = Some(g),
                RenderCommand::UnbindVertexArray => geometry = None,
                RenderCommand::BindTexture { slot, texture } => match textures.get_mut(slot as usize) {
                    Some(unit) => *unit = Some(texture),
                    None => log::warn!("texture unit {slot} out of range, binding ignored"),
                },
                RenderCommand::SetUniforms(u) => uniforms = u,
                RenderCommand::DrawIndexed { index_count } => {
                    let texture = textures
                        .get(uniforms.texture_unit as usize)
                        .copied()
                        .flatten();
                    match (shader, geometry, texture) {
                        (Some(shader), Some(geometry), Some(texture)) => draws.push(DrawCall {
                            shader,
                            geometry,
                            index_count: index_count.min(geometry.index_count),
                            texture,
                            uniforms,
                        }),
                        _ => log::warn!(
                            "skipping draw: shader bound={}, vertex array bound={}, texture bound={}",
                            shader.is_some(),
                            geometry.is_some(),
                            texture.is_some()
                        ),
                    }
                }
            }
        }

        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> BoundGeometry {
        BoundGeometry {
            vertex: BufferId(0),
            index: BufferId(1),
            index_count: 6,
        }
    }

    #[test]
    fn resolve_captures_bound_state() {
        let mut list = CommandList::new();
        list.bind_shader(ShaderId(3));
        list.bind_texture(0, TextureId(7));
        list.set_uniforms(DrawUniforms::new(Mat4::from_scale(glam::Vec3::splat(2.0)), Mat4::IDENTITY));
        list.commands.push(RenderCommand::BindVertexArray(geometry()));
        list.draw_indexed(6);
        list.unbind_vertex_array();
        list.unbind_shader();

        let draws = list.resolve();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].shader, ShaderId(3));
        assert_eq!(draws[0].texture, TextureId(7));
        assert_eq!(draws[0].index_count, 6);
        assert_eq!(draws[0].uniforms.model[0][0], 2.0);
    }

    #[test]
    fn incomplete_draws_are_dropped() {
        let mut list = CommandList::new();
        list.bind_shader(ShaderId(0));
        list.commands.push(RenderCommand::BindVertexArray(geometry()));
        // no texture on unit 0
        list.draw_indexed(6);
        list.bind_texture(0, TextureId(1));
        list.unbind_shader();
        list.draw_indexed(6);

        assert_eq!(list.draw_count(), 2);
        assert!(list.resolve().is_empty());
    }

    #[test]
    fn texture_binding_outlives_unbinds() {
        let mut list = CommandList::new();
        list.bind_texture(0, TextureId(2));
        for _ in 0..2 {
            list.bind_shader(ShaderId(0));
            list.commands.push(RenderCommand::BindVertexArray(geometry()));
            list.draw_indexed(6);
            list.unbind_vertex_array();
            list.unbind_shader();
        }
        let draws = list.resolve();
        assert_eq!(draws.len(), 2);
        assert!(draws.iter().all(|d| d.texture == TextureId(2)));
    }
}
