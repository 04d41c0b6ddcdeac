//! Recording stand-in for the driver, used by tests.
//!
//! It tracks just enough object state to catch the mistakes a real driver
//! would flag: uniforms set on a program that is not current raise
//! `GL_INVALID_OPERATION`, uniform lookups only succeed for identifiers that
//! actually appear in the linked stage sources, and every draw records the
//! program, vertex array and texture units it ran with.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::gl::consts;
use crate::gl::{
    BufferHandle, GLbitfield, GLenum, GLint, GLsizei, GLuint, Gl, ShaderProgramHandle,
    ShaderStageHandle, TextureHandle, UniformLocation, VertexArrayHandle,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Mat4([f32; 16]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeTexture {
    pub params: HashMap<GLenum, GLint>,
    pub width: i32,
    pub height: i32,
    pub internal_format: GLint,
    pub format: GLenum,
    pub data_len: usize,
    pub unpack_alignment: GLint,
    pub mipmapped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeAttribute {
    pub index: GLuint,
    pub size: GLint,
    pub stride: GLsizei,
    pub offset: usize,
    pub buffer: GLuint,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: GLuint,
    pub vao: GLuint,
    pub count: GLsizei,
    /// Texture bound on units 0 and 1 at draw time.
    pub units: [GLuint; 2],
    pub model: Option<[f32; 16]>,
}

#[derive(Debug, Default)]
struct FakeShader {
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<GLuint>,
    linked: bool,
    source: String,
    uniforms: HashMap<String, GLint>,
}

#[derive(Debug, Default)]
struct FakeState {
    next_name: GLuint,
    next_location: GLint,
    errors: VecDeque<GLenum>,

    shaders: HashMap<GLuint, FakeShader>,
    deleted_shaders: Vec<GLuint>,
    programs: HashMap<GLuint, FakeProgram>,
    deleted_programs: Vec<GLuint>,
    current_program: GLuint,

    uniform_owner: HashMap<GLint, (GLuint, String)>,
    uniform_values: HashMap<GLint, UniformValue>,

    buffers: HashMap<GLuint, Vec<u8>>,
    bound_array_buffer: GLuint,
    vaos: HashMap<GLuint, Vec<FakeAttribute>>,
    bound_vao: GLuint,

    textures: HashMap<GLuint, FakeTexture>,
    active_unit: GLenum,
    unit_bindings: HashMap<GLenum, GLuint>,
    unpack_alignment: GLint,

    enabled: HashSet<GLenum>,
    clear_color: [f32; 4],
    clears: usize,
    polygon_mode: Option<GLenum>,
    viewport: Option<(GLint, GLint, GLsizei, GLsizei)>,
    draws: Vec<DrawRecord>,

    fail_compile_marker: Option<String>,
    fail_link: bool,
    version: String,
}

pub struct FakeGl {
    state: RefCell<FakeState>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(FakeState {
                next_name: 1,
                active_unit: consts::TEXTURE0,
                unpack_alignment: 4,
                version: "3.3.0 Fake".to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn push_error(&self, code: GLenum) {
        self.state.borrow_mut().errors.push_back(code);
    }

    /// Any stage whose source contains `marker` fails to compile.
    pub fn fail_compile_containing(&self, marker: &str) {
        self.state.borrow_mut().fail_compile_marker = Some(marker.to_string());
    }

    pub fn fail_next_links(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    /// Replaces the string reported for `GL_VERSION`.
    pub fn set_version(&self, version: &str) {
        self.state.borrow_mut().version = version.to_string();
    }

    pub fn live_shader_count(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn deleted_shaders(&self) -> Vec<GLuint> {
        self.state.borrow().deleted_shaders.clone()
    }

    pub fn deleted_programs(&self) -> Vec<GLuint> {
        self.state.borrow().deleted_programs.clone()
    }

    pub fn is_linked(&self, program: ShaderProgramHandle) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .is_some_and(|p| p.linked)
    }

    pub fn uniform(&self, program: ShaderProgramHandle, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let location = state.programs.get(&program.0)?.uniforms.get(name)?;
        state.uniform_values.get(location).copied()
    }

    pub fn texture(&self, texture: TextureHandle) -> Option<FakeTexture> {
        self.state.borrow().textures.get(&texture.0).cloned()
    }

    pub fn texture_count(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn buffer(&self, buffer: BufferHandle) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer.0).cloned()
    }

    pub fn attributes(&self, vao: VertexArrayHandle) -> Vec<FakeAttribute> {
        self.state
            .borrow()
            .vaos
            .get(&vao.0)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_enabled(&self, cap: GLenum) -> bool {
        self.state.borrow().enabled.contains(&cap)
    }

    pub fn clear_count(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn clear_color_value(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    pub fn polygon_mode_value(&self) -> Option<GLenum> {
        self.state.borrow().polygon_mode
    }

    pub fn viewport_value(&self) -> Option<(GLint, GLint, GLsizei, GLsizei)> {
        self.state.borrow().viewport
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    pub fn take_draws(&self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.state.borrow_mut().draws)
    }

    fn gen_name(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let name = state.next_name;
        state.next_name += 1;
        name
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue) {
        if !location.is_valid() {
            // GL silently ignores location -1.
            return;
        }
        let mut state = self.state.borrow_mut();
        let owner = state.uniform_owner.get(&location.0).map(|(program, _)| *program);
        if owner != Some(state.current_program) {
            state.errors.push_back(consts::INVALID_OPERATION);
            return;
        }
        state.uniform_values.insert(location.0, value);
    }
}

impl Default for FakeGl {
    fn default() -> Self {
        Self::new()
    }
}

/// True when every identifier in a uniform path such as `pointLights[2].position`
/// occurs in the program source.
fn source_declares(source: &str, name: &str) -> bool {
    if !source.contains("uniform") {
        return false;
    }
    name.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|part| !part.is_empty() && !part.chars().all(|c| c.is_ascii_digit()))
        .all(|part| {
            source
                .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .any(|word| word == part)
        })
}

impl Gl for FakeGl {
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.state.borrow_mut().clear_color = [r, g, b, a];
    }

    fn clear(&self, _mask: GLbitfield) {
        self.state.borrow_mut().clears += 1;
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.state.borrow_mut().viewport = Some((x, y, width, height));
    }

    fn enable(&self, cap: GLenum) {
        self.state.borrow_mut().enabled.insert(cap);
    }

    fn polygon_mode(&self, _face: GLenum, mode: GLenum) {
        self.state.borrow_mut().polygon_mode = Some(mode);
    }

    fn get_error(&self) -> GLenum {
        self.state
            .borrow_mut()
            .errors
            .pop_front()
            .unwrap_or(consts::NO_ERROR)
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        match name {
            consts::VERSION => Some(self.state.borrow().version.clone()),
            consts::VENDOR => Some("Fake Vendor".to_string()),
            consts::RENDERER => Some("Fake Renderer".to_string()),
            _ => None,
        }
    }

    fn create_shader(&self, _kind: GLenum) -> ShaderStageHandle {
        let name = self.gen_name();
        self.state
            .borrow_mut()
            .shaders
            .insert(name, FakeShader::default());
        ShaderStageHandle(name)
    }

    fn shader_source(&self, shader: ShaderStageHandle, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader.0) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderStageHandle) {
        let mut state = self.state.borrow_mut();
        let marker = state.fail_compile_marker.clone();
        if let Some(s) = state.shaders.get_mut(&shader.0) {
            s.compiled = marker.map_or(true, |m| !s.source.contains(&m));
        }
    }

    fn get_shader_iv(&self, shader: ShaderStageHandle, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let Some(s) = state.shaders.get(&shader.0) else {
            return 0;
        };
        match pname {
            consts::COMPILE_STATUS => s.compiled as GLint,
            _ => 0,
        }
    }

    fn get_shader_info_log(&self, shader: ShaderStageHandle) -> String {
        let state = self.state.borrow();
        match state.shaders.get(&shader.0) {
            Some(s) if !s.compiled => "0:1(1): error: syntax error".to_string(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: ShaderStageHandle) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(&shader.0);
        state.deleted_shaders.push(shader.0);
    }

    fn create_program(&self) -> ShaderProgramHandle {
        let name = self.gen_name();
        self.state
            .borrow_mut()
            .programs
            .insert(name, FakeProgram::default());
        ShaderProgramHandle(name)
    }

    fn attach_shader(&self, program: ShaderProgramHandle, shader: ShaderStageHandle) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program.0) {
            p.attached.push(shader.0);
        }
    }

    fn link_program(&self, program: ShaderProgramHandle) {
        let mut state = self.state.borrow_mut();
        let fail = state.fail_link;
        let Some(attached) = state.programs.get(&program.0).map(|p| p.attached.clone()) else {
            return;
        };
        let all_compiled = attached
            .iter()
            .all(|id| state.shaders.get(id).is_some_and(|s| s.compiled));
        let source = attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .map(|s| s.source.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if let Some(p) = state.programs.get_mut(&program.0) {
            p.linked = all_compiled && !fail && attached.len() >= 2;
            p.source = source;
        }
    }

    fn get_program_iv(&self, program: ShaderProgramHandle, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let Some(p) = state.programs.get(&program.0) else {
            return 0;
        };
        match pname {
            consts::LINK_STATUS => p.linked as GLint,
            _ => 0,
        }
    }

    fn get_program_info_log(&self, program: ShaderProgramHandle) -> String {
        if self.is_linked(program) {
            String::new()
        } else {
            "error: linking failed".to_string()
        }
    }

    fn delete_program(&self, program: ShaderProgramHandle) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program.0);
        state.deleted_programs.push(program.0);
    }

    fn use_program(&self, program: ShaderProgramHandle) {
        self.state.borrow_mut().current_program = program.0;
    }

    fn get_uniform_location(&self, program: ShaderProgramHandle, name: &str) -> UniformLocation {
        let mut state = self.state.borrow_mut();
        let next = state.next_location;
        let Some(p) = state.programs.get_mut(&program.0) else {
            return UniformLocation::NONE;
        };
        if !p.linked || !source_declares(&p.source, name) {
            return UniformLocation::NONE;
        }
        if let Some(existing) = p.uniforms.get(name) {
            return UniformLocation(*existing);
        }
        p.uniforms.insert(name.to_string(), next);
        state.next_location += 1;
        state
            .uniform_owner
            .insert(next, (program.0, name.to_string()));
        UniformLocation(next)
    }

    fn uniform_1i(&self, location: UniformLocation, value: GLint) {
        self.set_uniform(location, UniformValue::Int(value));
    }

    fn uniform_1f(&self, location: UniformLocation, value: f32) {
        self.set_uniform(location, UniformValue::Float(value));
    }

    fn uniform_3f(&self, location: UniformLocation, x: f32, y: f32, z: f32) {
        self.set_uniform(location, UniformValue::Vec3([x, y, z]));
    }

    fn uniform_3fv(&self, location: UniformLocation, value: &[f32; 3]) {
        self.set_uniform(location, UniformValue::Vec3(*value));
    }

    fn uniform_matrix_4fv(&self, location: UniformLocation, value: &[f32; 16]) {
        self.set_uniform(location, UniformValue::Mat4(*value));
    }

    fn gen_buffer(&self) -> BufferHandle {
        let name = self.gen_name();
        self.state.borrow_mut().buffers.insert(name, Vec::new());
        BufferHandle(name)
    }

    fn bind_buffer(&self, target: GLenum, buffer: BufferHandle) {
        if target == consts::ARRAY_BUFFER {
            self.state.borrow_mut().bound_array_buffer = buffer.0;
        }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], _usage: GLenum) {
        let mut state = self.state.borrow_mut();
        if target != consts::ARRAY_BUFFER || state.bound_array_buffer == 0 {
            state.errors.push_back(consts::INVALID_OPERATION);
            return;
        }
        let bound = state.bound_array_buffer;
        state.buffers.insert(bound, data.to_vec());
    }

    fn gen_vertex_array(&self) -> VertexArrayHandle {
        let name = self.gen_name();
        self.state.borrow_mut().vaos.insert(name, Vec::new());
        VertexArrayHandle(name)
    }

    fn bind_vertex_array(&self, vao: VertexArrayHandle) {
        self.state.borrow_mut().bound_vao = vao.0;
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        let mut state = self.state.borrow_mut();
        let vao = state.bound_vao;
        if let Some(attribs) = state.vaos.get_mut(&vao) {
            for attrib in attribs.iter_mut().filter(|a| a.index == index) {
                attrib.enabled = true;
            }
        }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        _kind: GLenum,
        _normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        let mut state = self.state.borrow_mut();
        let vao = state.bound_vao;
        let buffer = state.bound_array_buffer;
        if vao == 0 || buffer == 0 {
            state.errors.push_back(consts::INVALID_OPERATION);
            return;
        }
        if let Some(attribs) = state.vaos.get_mut(&vao) {
            attribs.retain(|a| a.index != index);
            attribs.push(FakeAttribute {
                index,
                size,
                stride,
                offset,
                buffer,
                enabled: false,
            });
        }
    }

    fn gen_texture(&self) -> TextureHandle {
        let name = self.gen_name();
        TextureHandle(name)
    }

    fn bind_texture(&self, _target: GLenum, texture: TextureHandle) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        state.unit_bindings.insert(unit, texture.0);
        if texture.0 == 0 {
            return;
        }
        let alignment = state.unpack_alignment;
        state.textures.entry(texture.0).or_insert(FakeTexture {
            params: HashMap::new(),
            width: 0,
            height: 0,
            internal_format: 0,
            format: 0,
            data_len: 0,
            unpack_alignment: alignment,
            mipmapped: false,
        });
    }

    fn active_texture(&self, unit: GLenum) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn tex_parameter_i(&self, _target: GLenum, pname: GLenum, param: GLint) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        let bound = state.unit_bindings.get(&unit).copied().unwrap_or(0);
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.params.insert(pname, param);
        }
    }

    fn pixel_store_i(&self, pname: GLenum, param: GLint) {
        if pname == consts::UNPACK_ALIGNMENT {
            self.state.borrow_mut().unpack_alignment = param;
        }
    }

    fn tex_image_2d(
        &self,
        _target: GLenum,
        _level: GLint,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        _kind: GLenum,
        pixels: &[u8],
    ) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        let alignment = state.unpack_alignment;
        let bound = state.unit_bindings.get(&unit).copied().unwrap_or(0);
        if !state.textures.contains_key(&bound) {
            state.errors.push_back(consts::INVALID_OPERATION);
            return;
        }
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.width = width;
            texture.height = height;
            texture.internal_format = internal_format;
            texture.format = format;
            texture.data_len = pixels.len();
            texture.unpack_alignment = alignment;
        }
    }

    fn generate_mipmap(&self, _target: GLenum) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        let bound = state.unit_bindings.get(&unit).copied().unwrap_or(0);
        if let Some(texture) = state.textures.get_mut(&bound) {
            texture.mipmapped = true;
        }
    }

    fn draw_arrays(&self, _mode: GLenum, _first: GLint, count: GLsizei) {
        let mut state = self.state.borrow_mut();
        if state.current_program == 0 || state.bound_vao == 0 {
            state.errors.push_back(consts::INVALID_OPERATION);
            return;
        }
        let program = state.current_program;
        let model = state
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.get("model"))
            .and_then(|loc| state.uniform_values.get(loc))
            .and_then(|value| match value {
                UniformValue::Mat4(m) => Some(*m),
                _ => None,
            });
        let unit = |n: u32| {
            state
                .unit_bindings
                .get(&(consts::TEXTURE0 + n))
                .copied()
                .unwrap_or(0)
        };
        let record = DrawRecord {
            program,
            vao: state.bound_vao,
            count,
            units: [unit(0), unit(1)],
            model,
        };
        state.draws.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_lookup_requires_identifiers_in_source() {
        let src = "uniform PointLight pointLights[4]; struct PointLight { vec3 position; };";
        assert!(source_declares(src, "pointLights[3].position"));
        assert!(!source_declares(src, "pointLights[0].cutOff"));
        assert!(!source_declares("void main() {}", "main"));
    }

    #[test]
    fn setting_a_uniform_on_another_program_raises_an_error() {
        let gl = FakeGl::new();
        let vs = gl.create_shader(consts::VERTEX_SHADER);
        gl.shader_source(vs, "uniform mat4 model;");
        gl.compile_shader(vs);
        let fs = gl.create_shader(consts::FRAGMENT_SHADER);
        gl.shader_source(fs, "void main() {}");
        gl.compile_shader(fs);
        let program = gl.create_program();
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        let model = gl.get_uniform_location(program, "model");
        gl.uniform_1f(model, 1.0);
        assert_eq!(gl.get_error(), consts::INVALID_OPERATION);

        gl.use_program(program);
        gl.uniform_1f(model, 1.0);
        assert_eq!(gl.get_error(), consts::NO_ERROR);
        assert_eq!(gl.uniform(program, "model"), Some(UniformValue::Float(1.0)));
    }
}
