use std::ffi::{c_void, CStr, CString};
use std::mem;
use std::ptr;

use super::consts;
use super::{
    BufferHandle, GLbitfield, GLboolean, GLchar, GLenum, GLfloat, GLint, GLsizei, GLsizeiptr,
    GLuint, Gl, ShaderProgramHandle, ShaderStageHandle, TextureHandle, UniformLocation,
    VertexArrayHandle,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("GL entry point {0} could not be resolved")]
    MissingFunction(String),
}

macro_rules! gl_functions {
    ($($field:ident = $name:literal : fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        /// Driver entry points, resolved once after the context is current.
        pub struct GlFunctions {
            $($field: unsafe extern "system" fn($($arg),*) $(-> $ret)?,)*
        }

        impl GlFunctions {
            /// Every entry point the table resolves, in load order.
            pub const NAMES: &'static [&'static CStr] = &[$($name),*];

            /// Resolves every entry point through `resolve`. A null result for
            /// any name fails the whole load.
            pub fn load(
                mut resolve: impl FnMut(&CStr) -> *const c_void,
            ) -> Result<Self, LoadError> {
                Ok(Self {
                    $($field: {
                        let name: &CStr = $name;
                        let addr = resolve(name);
                        if addr.is_null() {
                            return Err(LoadError::MissingFunction(
                                name.to_string_lossy().into_owned(),
                            ));
                        }
                        // SAFETY: the driver guarantees the exported symbol has the
                        // documented signature for this name.
                        unsafe {
                            mem::transmute::<*const c_void, unsafe extern "system" fn($($arg),*) $(-> $ret)?>(addr)
                        }
                    },)*
                })
            }
        }
    };
}

gl_functions! {
    clear_color_fn = c"glClearColor": fn(GLfloat, GLfloat, GLfloat, GLfloat);
    clear_fn = c"glClear": fn(GLbitfield);
    viewport_fn = c"glViewport": fn(GLint, GLint, GLsizei, GLsizei);
    enable_fn = c"glEnable": fn(GLenum);
    polygon_mode_fn = c"glPolygonMode": fn(GLenum, GLenum);
    get_error_fn = c"glGetError": fn() -> GLenum;
    get_string_fn = c"glGetString": fn(GLenum) -> *const u8;

    create_shader_fn = c"glCreateShader": fn(GLenum) -> GLuint;
    shader_source_fn = c"glShaderSource": fn(GLuint, GLsizei, *const *const GLchar, *const GLint);
    compile_shader_fn = c"glCompileShader": fn(GLuint);
    get_shader_iv_fn = c"glGetShaderiv": fn(GLuint, GLenum, *mut GLint);
    get_shader_info_log_fn = c"glGetShaderInfoLog": fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar);
    delete_shader_fn = c"glDeleteShader": fn(GLuint);

    create_program_fn = c"glCreateProgram": fn() -> GLuint;
    attach_shader_fn = c"glAttachShader": fn(GLuint, GLuint);
    link_program_fn = c"glLinkProgram": fn(GLuint);
    get_program_iv_fn = c"glGetProgramiv": fn(GLuint, GLenum, *mut GLint);
    get_program_info_log_fn = c"glGetProgramInfoLog": fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar);
    delete_program_fn = c"glDeleteProgram": fn(GLuint);
    use_program_fn = c"glUseProgram": fn(GLuint);

    get_uniform_location_fn = c"glGetUniformLocation": fn(GLuint, *const GLchar) -> GLint;
    uniform_1i_fn = c"glUniform1i": fn(GLint, GLint);
    uniform_1f_fn = c"glUniform1f": fn(GLint, GLfloat);
    uniform_3f_fn = c"glUniform3f": fn(GLint, GLfloat, GLfloat, GLfloat);
    uniform_3fv_fn = c"glUniform3fv": fn(GLint, GLsizei, *const GLfloat);
    uniform_matrix_4fv_fn = c"glUniformMatrix4fv": fn(GLint, GLsizei, GLboolean, *const GLfloat);

    gen_buffers_fn = c"glGenBuffers": fn(GLsizei, *mut GLuint);
    bind_buffer_fn = c"glBindBuffer": fn(GLenum, GLuint);
    buffer_data_fn = c"glBufferData": fn(GLenum, GLsizeiptr, *const c_void, GLenum);

    gen_vertex_arrays_fn = c"glGenVertexArrays": fn(GLsizei, *mut GLuint);
    bind_vertex_array_fn = c"glBindVertexArray": fn(GLuint);
    enable_vertex_attrib_array_fn = c"glEnableVertexAttribArray": fn(GLuint);
    vertex_attrib_pointer_fn = c"glVertexAttribPointer": fn(GLuint, GLint, GLenum, GLboolean, GLsizei, *const c_void);

    gen_textures_fn = c"glGenTextures": fn(GLsizei, *mut GLuint);
    bind_texture_fn = c"glBindTexture": fn(GLenum, GLuint);
    active_texture_fn = c"glActiveTexture": fn(GLenum);
    tex_parameter_i_fn = c"glTexParameteri": fn(GLenum, GLenum, GLint);
    pixel_store_i_fn = c"glPixelStorei": fn(GLenum, GLint);
    tex_image_2d_fn = c"glTexImage2D": fn(GLenum, GLint, GLint, GLsizei, GLsizei, GLint, GLenum, GLenum, *const c_void);
    generate_mipmap_fn = c"glGenerateMipmap": fn(GLenum);

    draw_arrays_fn = c"glDrawArrays": fn(GLenum, GLint, GLsizei);
}

fn bool_to_gl(value: bool) -> GLboolean {
    if value {
        consts::TRUE
    } else {
        consts::FALSE
    }
}

fn log_from_bytes(mut bytes: Vec<u8>, written: GLsizei) -> String {
    bytes.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&bytes).trim_end().to_string()
}

// SAFETY (all methods below): the table is only constructed by `load` after a
// context was made current on this thread, and every pointer argument points
// into a live Rust slice or local for the duration of the call.
impl Gl for GlFunctions {
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { (self.clear_color_fn)(r, g, b, a) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { (self.clear_fn)(mask) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { (self.viewport_fn)(x, y, width, height) }
    }

    fn enable(&self, cap: GLenum) {
        unsafe { (self.enable_fn)(cap) }
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        unsafe { (self.polygon_mode_fn)(face, mode) }
    }

    fn get_error(&self) -> GLenum {
        unsafe { (self.get_error_fn)() }
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        let raw = unsafe { (self.get_string_fn)(name) };
        if raw.is_null() {
            return None;
        }
        let text = unsafe { CStr::from_ptr(raw.cast()) };
        Some(text.to_string_lossy().into_owned())
    }

    fn create_shader(&self, kind: GLenum) -> ShaderStageHandle {
        ShaderStageHandle(unsafe { (self.create_shader_fn)(kind) })
    }

    fn shader_source(&self, shader: ShaderStageHandle, source: &str) {
        let text = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { (self.shader_source_fn)(shader.0, 1, &text, &len) }
    }

    fn compile_shader(&self, shader: ShaderStageHandle) {
        unsafe { (self.compile_shader_fn)(shader.0) }
    }

    fn get_shader_iv(&self, shader: ShaderStageHandle, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { (self.get_shader_iv_fn)(shader.0, pname, &mut value) };
        value
    }

    fn get_shader_info_log(&self, shader: ShaderStageHandle) -> String {
        let len = self.get_shader_iv(shader, consts::INFO_LOG_LENGTH);
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written = 0;
        unsafe {
            (self.get_shader_info_log_fn)(shader.0, len, &mut written, buf.as_mut_ptr().cast())
        };
        log_from_bytes(buf, written)
    }

    fn delete_shader(&self, shader: ShaderStageHandle) {
        unsafe { (self.delete_shader_fn)(shader.0) }
    }

    fn create_program(&self) -> ShaderProgramHandle {
        ShaderProgramHandle(unsafe { (self.create_program_fn)() })
    }

    fn attach_shader(&self, program: ShaderProgramHandle, shader: ShaderStageHandle) {
        unsafe { (self.attach_shader_fn)(program.0, shader.0) }
    }

    fn link_program(&self, program: ShaderProgramHandle) {
        unsafe { (self.link_program_fn)(program.0) }
    }

    fn get_program_iv(&self, program: ShaderProgramHandle, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { (self.get_program_iv_fn)(program.0, pname, &mut value) };
        value
    }

    fn get_program_info_log(&self, program: ShaderProgramHandle) -> String {
        let len = self.get_program_iv(program, consts::INFO_LOG_LENGTH);
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u8; len as usize];
        let mut written = 0;
        unsafe {
            (self.get_program_info_log_fn)(program.0, len, &mut written, buf.as_mut_ptr().cast())
        };
        log_from_bytes(buf, written)
    }

    fn delete_program(&self, program: ShaderProgramHandle) {
        unsafe { (self.delete_program_fn)(program.0) }
    }

    fn use_program(&self, program: ShaderProgramHandle) {
        unsafe { (self.use_program_fn)(program.0) }
    }

    fn get_uniform_location(&self, program: ShaderProgramHandle, name: &str) -> UniformLocation {
        let Ok(name) = CString::new(name) else {
            return UniformLocation::NONE;
        };
        UniformLocation(unsafe { (self.get_uniform_location_fn)(program.0, name.as_ptr()) })
    }

    fn uniform_1i(&self, location: UniformLocation, value: GLint) {
        unsafe { (self.uniform_1i_fn)(location.0, value) }
    }

    fn uniform_1f(&self, location: UniformLocation, value: f32) {
        unsafe { (self.uniform_1f_fn)(location.0, value) }
    }

    fn uniform_3f(&self, location: UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { (self.uniform_3f_fn)(location.0, x, y, z) }
    }

    fn uniform_3fv(&self, location: UniformLocation, value: &[f32; 3]) {
        unsafe { (self.uniform_3fv_fn)(location.0, 1, value.as_ptr()) }
    }

    fn uniform_matrix_4fv(&self, location: UniformLocation, value: &[f32; 16]) {
        unsafe { (self.uniform_matrix_4fv_fn)(location.0, 1, consts::FALSE, value.as_ptr()) }
    }

    fn gen_buffer(&self) -> BufferHandle {
        let mut name = 0;
        unsafe { (self.gen_buffers_fn)(1, &mut name) };
        BufferHandle(name)
    }

    fn bind_buffer(&self, target: GLenum, buffer: BufferHandle) {
        unsafe { (self.bind_buffer_fn)(target, buffer.0) }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        unsafe {
            (self.buffer_data_fn)(
                target,
                data.len() as GLsizeiptr,
                data.as_ptr().cast(),
                usage,
            )
        }
    }

    fn gen_vertex_array(&self) -> VertexArrayHandle {
        let mut name = 0;
        unsafe { (self.gen_vertex_arrays_fn)(1, &mut name) };
        VertexArrayHandle(name)
    }

    fn bind_vertex_array(&self, vao: VertexArrayHandle) {
        unsafe { (self.bind_vertex_array_fn)(vao.0) }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { (self.enable_vertex_attrib_array_fn)(index) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        // The "pointer" is a byte offset into the bound array buffer.
        unsafe {
            (self.vertex_attrib_pointer_fn)(
                index,
                size,
                kind,
                bool_to_gl(normalized),
                stride,
                offset as *const c_void,
            )
        }
    }

    fn gen_texture(&self) -> TextureHandle {
        let mut name = 0;
        unsafe { (self.gen_textures_fn)(1, &mut name) };
        TextureHandle(name)
    }

    fn bind_texture(&self, target: GLenum, texture: TextureHandle) {
        unsafe { (self.bind_texture_fn)(target, texture.0) }
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { (self.active_texture_fn)(unit) }
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { (self.tex_parameter_i_fn)(target, pname, param) }
    }

    fn pixel_store_i(&self, pname: GLenum, param: GLint) {
        unsafe { (self.pixel_store_i_fn)(pname, param) }
    }

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
    ) {
        let data = if pixels.is_empty() {
            ptr::null()
        } else {
            pixels.as_ptr().cast()
        };
        unsafe {
            (self.tex_image_2d_fn)(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                kind,
                data,
            )
        }
    }

    fn generate_mipmap(&self, target: GLenum) {
        unsafe { (self.generate_mipmap_fn)(target) }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { (self.draw_arrays_fn)(mode, first, count) }
    }
}
