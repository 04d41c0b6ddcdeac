use std::mem::{offset_of, size_of};

/// Interleaved vertex used by every mesh in the scene.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LitVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

pub const ATTRIB_POSITION: u32 = 0;
pub const ATTRIB_COLOR: u32 = 1;
pub const ATTRIB_TEX_COORDS: u32 = 2;
pub const ATTRIB_NORMAL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: i32,
    /// Byte offset from the start of the vertex.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: usize,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }

    /// Reads attribute `location` of vertex `index` back out of an interleaved
    /// buffer laid out with this layout.
    pub fn read_attribute(&self, bytes: &[u8], index: usize, location: u32) -> Option<Vec<f32>> {
        let attribute = self.attribute(location)?;
        let start = index
            .checked_mul(self.stride)?
            .checked_add(attribute.offset)?;
        let len = attribute.components as usize * size_of::<f32>();
        let raw = bytes.get(start..start.checked_add(len)?)?;
        Some(
            raw.chunks_exact(size_of::<f32>())
                .map(bytemuck::pod_read_unaligned::<f32>)
                .collect(),
        )
    }

    pub fn vertex_count(&self, bytes: &[u8]) -> usize {
        bytes.len() / self.stride
    }
}

impl LitVertex {
    pub const fn new(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            color: [1.0, 1.0, 1.0],
            tex_coords,
            normal,
        }
    }

    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: size_of::<LitVertex>(),
            attributes: vec![
                VertexAttribute {
                    location: ATTRIB_POSITION,
                    components: 3,
                    offset: offset_of!(LitVertex, position),
                },
                VertexAttribute {
                    location: ATTRIB_COLOR,
                    components: 3,
                    offset: offset_of!(LitVertex, color),
                },
                VertexAttribute {
                    location: ATTRIB_TEX_COORDS,
                    components: 2,
                    offset: offset_of!(LitVertex, tex_coords),
                },
                VertexAttribute {
                    location: ATTRIB_NORMAL,
                    components: 3,
                    offset: offset_of!(LitVertex, normal),
                },
            ],
        }
    }

    /// Same buffer, positions only. Used by the unlit light-source cubes.
    pub fn position_only_layout() -> VertexLayout {
        VertexLayout {
            stride: size_of::<LitVertex>(),
            attributes: vec![VertexAttribute {
                location: ATTRIB_POSITION,
                components: 3,
                offset: offset_of!(LitVertex, position),
            }],
        }
    }
}

const fn v(p: [f32; 3], uv: [f32; 2], n: [f32; 3]) -> LitVertex {
    LitVertex::new(p, uv, n)
}

/// Unit cube centred on the origin, two triangles per face, outward normals.
#[rustfmt::skip]
pub const CUBE_VERTICES: [LitVertex; 36] = [
    // -z
    v([-0.5, -0.5, -0.5], [0.0, 0.0], [0.0, 0.0, -1.0]),
    v([ 0.5, -0.5, -0.5], [1.0, 0.0], [0.0, 0.0, -1.0]),
    v([ 0.5,  0.5, -0.5], [1.0, 1.0], [0.0, 0.0, -1.0]),
    v([ 0.5,  0.5, -0.5], [1.0, 1.0], [0.0, 0.0, -1.0]),
    v([-0.5,  0.5, -0.5], [0.0, 1.0], [0.0, 0.0, -1.0]),
    v([-0.5, -0.5, -0.5], [0.0, 0.0], [0.0, 0.0, -1.0]),
    // +z
    v([-0.5, -0.5,  0.5], [0.0, 0.0], [0.0, 0.0, 1.0]),
    v([ 0.5, -0.5,  0.5], [1.0, 0.0], [0.0, 0.0, 1.0]),
    v([ 0.5,  0.5,  0.5], [1.0, 1.0], [0.0, 0.0, 1.0]),
    v([ 0.5,  0.5,  0.5], [1.0, 1.0], [0.0, 0.0, 1.0]),
    v([-0.5,  0.5,  0.5], [0.0, 1.0], [0.0, 0.0, 1.0]),
    v([-0.5, -0.5,  0.5], [0.0, 0.0], [0.0, 0.0, 1.0]),
    // -x
    v([-0.5,  0.5,  0.5], [1.0, 0.0], [-1.0, 0.0, 0.0]),
    v([-0.5,  0.5, -0.5], [1.0, 1.0], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [0.0, 1.0], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [0.0, 1.0], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5,  0.5], [0.0, 0.0], [-1.0, 0.0, 0.0]),
    v([-0.5,  0.5,  0.5], [1.0, 0.0], [-1.0, 0.0, 0.0]),
    // +x
    v([ 0.5,  0.5,  0.5], [1.0, 0.0], [1.0, 0.0, 0.0]),
    v([ 0.5,  0.5, -0.5], [1.0, 1.0], [1.0, 0.0, 0.0]),
    v([ 0.5, -0.5, -0.5], [0.0, 1.0], [1.0, 0.0, 0.0]),
    v([ 0.5, -0.5, -0.5], [0.0, 1.0], [1.0, 0.0, 0.0]),
    v([ 0.5, -0.5,  0.5], [0.0, 0.0], [1.0, 0.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [1.0, 0.0], [1.0, 0.0, 0.0]),
    // -y
    v([-0.5, -0.5, -0.5], [0.0, 1.0], [0.0, -1.0, 0.0]),
    v([ 0.5, -0.5, -0.5], [1.0, 1.0], [0.0, -1.0, 0.0]),
    v([ 0.5, -0.5,  0.5], [1.0, 0.0], [0.0, -1.0, 0.0]),
    v([ 0.5, -0.5,  0.5], [1.0, 0.0], [0.0, -1.0, 0.0]),
    v([-0.5, -0.5,  0.5], [0.0, 0.0], [0.0, -1.0, 0.0]),
    v([-0.5, -0.5, -0.5], [0.0, 1.0], [0.0, -1.0, 0.0]),
    // +y
    v([-0.5,  0.5, -0.5], [0.0, 1.0], [0.0, 1.0, 0.0]),
    v([ 0.5,  0.5, -0.5], [1.0, 1.0], [0.0, 1.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [1.0, 0.0], [0.0, 1.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [1.0, 0.0], [0.0, 1.0, 0.0]),
    v([-0.5,  0.5,  0.5], [0.0, 0.0], [0.0, 1.0, 0.0]),
    v([-0.5,  0.5, -0.5], [0.0, 1.0], [0.0, 1.0, 0.0]),
];
