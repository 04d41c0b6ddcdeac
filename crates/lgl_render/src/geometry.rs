use crate::gl::consts;
use crate::gl::{BufferHandle, Gl, VertexArrayHandle};
use crate::vertex::{LitVertex, VertexLayout};

/// A vertex array plus the array buffer it reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryBuffer {
    pub vao: VertexArrayHandle,
    pub vbo: BufferHandle,
    pub vertex_count: i32,
}

impl GeometryBuffer {
    /// Uploads `vertices` into a new buffer and describes `layout` on a new
    /// vertex array.
    pub fn create(gl: &dyn Gl, vertices: &[LitVertex], layout: &VertexLayout) -> Self {
        let vao = gl.gen_vertex_array();
        gl.bind_vertex_array(vao);

        let vbo = gl.gen_buffer();
        gl.bind_buffer(consts::ARRAY_BUFFER, vbo);
        gl.buffer_data(
            consts::ARRAY_BUFFER,
            bytemuck::cast_slice(vertices),
            consts::STATIC_DRAW,
        );
        describe_layout(gl, layout);

        log::debug!(
            "Geometry uploaded: {} vertices, {} bytes",
            vertices.len(),
            std::mem::size_of_val(vertices)
        );
        Self {
            vao,
            vbo,
            vertex_count: vertices.len() as i32,
        }
    }

    /// New vertex array over an existing buffer, e.g. to read only positions.
    pub fn with_shared_buffer(
        gl: &dyn Gl,
        vbo: BufferHandle,
        layout: &VertexLayout,
        vertex_count: i32,
    ) -> Self {
        let vao = gl.gen_vertex_array();
        gl.bind_vertex_array(vao);
        gl.bind_buffer(consts::ARRAY_BUFFER, vbo);
        describe_layout(gl, layout);
        Self {
            vao,
            vbo,
            vertex_count,
        }
    }

    pub fn bind(&self, gl: &dyn Gl) {
        gl.bind_vertex_array(self.vao);
    }

    pub fn draw(&self, gl: &dyn Gl) {
        gl.draw_arrays(consts::TRIANGLES, 0, self.vertex_count);
    }
}

fn describe_layout(gl: &dyn Gl, layout: &VertexLayout) {
    for attribute in &layout.attributes {
        gl.vertex_attrib_pointer(
            attribute.location,
            attribute.components,
            consts::FLOAT,
            false,
            layout.stride as i32,
            attribute.offset,
        );
        gl.enable_vertex_attrib_array(attribute.location);
    }
}
