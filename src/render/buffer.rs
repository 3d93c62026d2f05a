//! Vertex/index buffers and the vertex array that pairs them.
//!
//! # Vertex Layout
//!
//! A [`VertexLayout`] is a list of named, typed attributes. Offsets are packed
//! in declaration order and shader locations follow the same order:
//!
//! ```ignore
//! let layout = VertexLayout::new(vec![
//!     VertexAttribute::new(ShaderDataType::Float3, "position"),
//!     VertexAttribute::new(ShaderDataType::Float2, "uv"),
//! ]);
//! assert_eq!(layout.stride(), 20);
//! ```

use bytemuck::{Pod, Zeroable};

use super::device::{BufferId, RenderDevice, RenderResult};
use crate::error::RenderError;

/// Data types a shader input can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    Bool,
}

impl ShaderDataType {
    /// Size in bytes.
    pub const fn size(self) -> u32 {
        match self {
            ShaderDataType::Float | ShaderDataType::Int => 4,
            ShaderDataType::Float2 | ShaderDataType::Int2 => 8,
            ShaderDataType::Float3 | ShaderDataType::Int3 => 12,
            ShaderDataType::Float4 | ShaderDataType::Int4 => 16,
            ShaderDataType::Mat3 => 4 * 3 * 3,
            ShaderDataType::Mat4 => 4 * 4 * 4,
            ShaderDataType::Bool => 1,
        }
    }

    pub const fn component_count(self) -> u32 {
        match self {
            ShaderDataType::Float | ShaderDataType::Int | ShaderDataType::Bool => 1,
            ShaderDataType::Float2 | ShaderDataType::Int2 => 2,
            ShaderDataType::Float3 | ShaderDataType::Int3 => 3,
            ShaderDataType::Float4 | ShaderDataType::Int4 => 4,
            ShaderDataType::Mat3 => 3 * 3,
            ShaderDataType::Mat4 => 4 * 4,
        }
    }

    /// The wgpu vertex format, if the type can be a vertex attribute.
    pub fn vertex_format(self) -> Option<wgpu::VertexFormat> {
        match self {
            ShaderDataType::Float => Some(wgpu::VertexFormat::Float32),
            ShaderDataType::Float2 => Some(wgpu::VertexFormat::Float32x2),
            ShaderDataType::Float3 => Some(wgpu::VertexFormat::Float32x3),
            ShaderDataType::Float4 => Some(wgpu::VertexFormat::Float32x4),
            ShaderDataType::Int => Some(wgpu::VertexFormat::Sint32),
            ShaderDataType::Int2 => Some(wgpu::VertexFormat::Sint32x2),
            ShaderDataType::Int3 => Some(wgpu::VertexFormat::Sint32x3),
            ShaderDataType::Int4 => Some(wgpu::VertexFormat::Sint32x4),
            ShaderDataType::Mat3 | ShaderDataType::Mat4 | ShaderDataType::Bool => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttribute {
    pub ty: ShaderDataType,
    pub name: String,
    pub offset: u32,
}

impl VertexAttribute {
    pub fn new(ty: ShaderDataType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
            offset: 0,
        }
    }
}

/// Interleaved vertex layout with offsets computed from attribute order.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u32,
}

impl VertexLayout {
    pub fn new(mut attributes: Vec<VertexAttribute>) -> Self {
        let mut offset = 0;
        for attribute in &mut attributes {
            attribute.offset = offset;
            offset += attribute.ty.size();
        }
        Self {
            attributes,
            stride: offset,
        }
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Converts to wgpu attributes, one shader location per attribute.
    pub fn wgpu_attributes(&self) -> RenderResult<Vec<wgpu::VertexAttribute>> {
        self.attributes
            .iter()
            .enumerate()
            .map(|(location, attribute)| {
                let format = attribute
                    .ty
                    .vertex_format()
                    .ok_or_else(|| RenderError::UnsupportedAttribute(attribute.name.clone()))?;
                Ok(wgpu::VertexAttribute {
                    format,
                    offset: attribute.offset as u64,
                    shader_location: location as u32,
                })
            })
            .collect()
    }
}

/// Vertex format of the sprite quad: position followed by texture coordinates.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl SpriteVertex {
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv }
    }

    pub fn layout() -> VertexLayout {
        VertexLayout::new(vec![
            VertexAttribute::new(ShaderDataType::Float3, "position"),
            VertexAttribute::new(ShaderDataType::Float2, "uv"),
        ])
    }
}

/// Unit quad centred on the origin. UV (0, 0) is the top-left texel.
pub const QUAD_VERTICES: [SpriteVertex; 4] = [
    SpriteVertex::new([0.5, 0.5, 0.0], [1.0, 0.0]),
    SpriteVertex::new([0.5, -0.5, 0.0], [1.0, 1.0]),
    SpriteVertex::new([-0.5, -0.5, 0.0], [0.0, 1.0]),
    SpriteVertex::new([-0.5, 0.5, 0.0], [0.0, 0.0]),
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// A GPU vertex buffer and the layout of its contents.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexBuffer {
    id: BufferId,
    layout: VertexLayout,
    vertex_count: u32,
}

impl VertexBuffer {
    pub fn new<V: Pod>(
        device: &mut dyn RenderDevice,
        vertices: &[V],
        layout: VertexLayout,
    ) -> RenderResult<Self> {
        let id = device.create_vertex_buffer(bytemuck::cast_slice(vertices), &layout)?;
        Ok(Self {
            id,
            layout,
            vertex_count: vertices.len() as u32,
        })
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// A GPU buffer of `u32` indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexBuffer {
    id: BufferId,
    count: u32,
}

impl IndexBuffer {
    pub fn new(device: &mut dyn RenderDevice, indices: &[u32]) -> RenderResult<Self> {
        let id = device.create_index_buffer(indices)?;
        Ok(Self {
            id,
            count: indices.len() as u32,
        })
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// A vertex buffer paired with the index buffer that draws it.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexArray {
    vertex: VertexBuffer,
    index: IndexBuffer,
}

impl VertexArray {
    pub fn new(vertex: VertexBuffer, index: IndexBuffer) -> Self {
        Self { vertex, index }
    }

    /// Uploads the unit sprite quad.
    pub fn quad(device: &mut dyn RenderDevice) -> RenderResult<Self> {
        let vertex = VertexBuffer::new(device, &QUAD_VERTICES, SpriteVertex::layout())?;
        let index = IndexBuffer::new(device, &QUAD_INDICES)?;
        Ok(Self::new(vertex, index))
    }

    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex
    }

    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.index
    }

    pub fn index_count(&self) -> u32 {
        self.index.count()
    }
}
