//! Thin capability table over the graphics API.
//!
//! [`Gl`] mirrors the GL entry points this crate uses one-to-one; object names
//! are wrapped in typed handles so a texture can never be bound as a buffer.
//! [`GlFunctions`] is the real implementation backed by driver function
//! pointers. Tests drive the same code through a recording fake.

pub mod consts;
mod functions;
mod version;

use std::fmt;

pub use functions::{GlFunctions, LoadError};
pub use version::{check_version, VersionError};

pub type GLenum = u32;
pub type GLbitfield = u32;
pub type GLboolean = u8;
pub type GLint = i32;
pub type GLuint = u32;
pub type GLsizei = i32;
pub type GLsizeiptr = isize;
pub type GLfloat = f32;
pub type GLchar = std::ffi::c_char;

macro_rules! gl_handle {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub GLuint);

            impl $name {
                pub fn raw(self) -> GLuint {
                    self.0
                }
            }
        )*
    };
}

gl_handle! {
    /// A compiled (or failed) vertex or fragment stage.
    ShaderStageHandle;
    /// A linked program.
    ShaderProgramHandle;
    BufferHandle;
    VertexArrayHandle;
    TextureHandle;
}

/// Location of a uniform inside a linked program; `-1` means "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub GLint);

impl UniformLocation {
    pub const NONE: UniformLocation = UniformLocation(-1);

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

/// Every GL call the renderer makes.
pub trait Gl {
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&self, mask: GLbitfield);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn enable(&self, cap: GLenum);
    fn polygon_mode(&self, face: GLenum, mode: GLenum);
    fn get_error(&self) -> GLenum;
    fn get_string(&self, name: GLenum) -> Option<String>;

    fn create_shader(&self, kind: GLenum) -> ShaderStageHandle;
    fn shader_source(&self, shader: ShaderStageHandle, source: &str);
    fn compile_shader(&self, shader: ShaderStageHandle);
    fn get_shader_iv(&self, shader: ShaderStageHandle, pname: GLenum) -> GLint;
    fn get_shader_info_log(&self, shader: ShaderStageHandle) -> String;
    fn delete_shader(&self, shader: ShaderStageHandle);

    fn create_program(&self) -> ShaderProgramHandle;
    fn attach_shader(&self, program: ShaderProgramHandle, shader: ShaderStageHandle);
    fn link_program(&self, program: ShaderProgramHandle);
    fn get_program_iv(&self, program: ShaderProgramHandle, pname: GLenum) -> GLint;
    fn get_program_info_log(&self, program: ShaderProgramHandle) -> String;
    fn delete_program(&self, program: ShaderProgramHandle);
    fn use_program(&self, program: ShaderProgramHandle);

    fn get_uniform_location(&self, program: ShaderProgramHandle, name: &str) -> UniformLocation;
    fn uniform_1i(&self, location: UniformLocation, value: GLint);
    fn uniform_1f(&self, location: UniformLocation, value: f32);
    fn uniform_3f(&self, location: UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_3fv(&self, location: UniformLocation, value: &[f32; 3]);
    fn uniform_matrix_4fv(&self, location: UniformLocation, value: &[f32; 16]);

    fn gen_buffer(&self) -> BufferHandle;
    fn bind_buffer(&self, target: GLenum, buffer: BufferHandle);
    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum);

    fn gen_vertex_array(&self) -> VertexArrayHandle;
    fn bind_vertex_array(&self, vao: VertexArrayHandle);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );

    fn gen_texture(&self) -> TextureHandle;
    fn bind_texture(&self, target: GLenum, texture: TextureHandle);
    fn active_texture(&self, unit: GLenum);
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    fn pixel_store_i(&self, pname: GLenum, param: GLint);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        kind: GLenum,
        pixels: &[u8],
    );
    fn generate_mipmap(&self, target: GLenum);

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);
}

/// A GPU error code pulled off the driver's error queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlError(pub GLenum);

impl GlError {
    pub fn name(self) -> &'static str {
        match self.0 {
            consts::INVALID_ENUM => "GL_INVALID_ENUM",
            consts::INVALID_VALUE => "GL_INVALID_VALUE",
            consts::INVALID_OPERATION => "GL_INVALID_OPERATION",
            consts::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            consts::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            consts::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            consts::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            _ => "unknown GL error",
        }
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.name(), self.0)
    }
}

// A lost context can report errors forever.
const MAX_DRAINED_ERRORS: usize = 32;

/// Pulls every pending error off the queue.
pub fn drain_errors(gl: &dyn Gl) -> Vec<GlError> {
    let mut errors = Vec::new();
    while errors.len() < MAX_DRAINED_ERRORS {
        match gl.get_error() {
            consts::NO_ERROR => break,
            code => errors.push(GlError(code)),
        }
    }
    errors
}

/// Maps the whole client area. A minimised window reports a zero size and
/// keeps the previous viewport.
pub fn resize_viewport(gl: &dyn Gl, width: u32, height: u32) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    gl.viewport(0, 0, width as GLsizei, height as GLsizei);
    true
}

/// Drains the queue and reports anything found. Debug builds stop on the first
/// error; release builds log and carry on.
pub fn check_errors(gl: &dyn Gl, context: &str) {
    let errors = drain_errors(gl);
    for error in &errors {
        log::error!("GL error after {}: {}", context, error);
    }
    debug_assert!(
        errors.is_empty(),
        "GL reported {} error(s) after {}",
        errors.len(),
        context
    );
}
