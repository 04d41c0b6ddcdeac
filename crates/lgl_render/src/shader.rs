use std::collections::HashMap;
use std::fmt;

use crate::gl::consts;
use crate::gl::{GLenum, Gl, ShaderProgramHandle, ShaderStageHandle, UniformLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_kind(self) -> GLenum {
        match self {
            ShaderStage::Vertex => consts::VERTEX_SHADER,
            ShaderStage::Fragment => consts::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    Link { log: String },
    #[error("uniform `{name}` not found in shader program")]
    MissingUniform { name: String },
}

/// A linked program and the uniform locations resolved against it.
#[derive(Debug)]
pub struct ShaderProgram {
    handle: ShaderProgramHandle,
    uniforms: HashMap<String, UniformLocation>,
}

impl ShaderProgram {
    /// Compiles both stages, links them and resolves `uniforms`.
    ///
    /// The stage objects are deleted once linking has been attempted. Any
    /// failure deletes what was created and is returned to the caller.
    pub fn build(
        gl: &dyn Gl,
        vertex_src: &str,
        fragment_src: &str,
        uniforms: &[&str],
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(gl, ShaderStage::Vertex, vertex_src)?;
        let fragment = match compile_stage(gl, ShaderStage::Fragment, fragment_src) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl.delete_shader(vertex);
                return Err(err);
            }
        };

        let linked = link_program(gl, vertex, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
        let handle = linked?;

        let mut program = Self {
            handle,
            uniforms: HashMap::new(),
        };
        for name in uniforms {
            if let Err(err) = program.locate(gl, name) {
                gl.delete_program(handle);
                return Err(err);
            }
        }
        log::debug!(
            "Shader program {} linked with {} uniforms",
            handle.0,
            program.uniforms.len()
        );
        Ok(program)
    }

    pub fn handle(&self) -> ShaderProgramHandle {
        self.handle
    }

    pub fn use_program(&self, gl: &dyn Gl) {
        gl.use_program(self.handle);
    }

    /// Resolves `name`, caching the result. A uniform the linker dropped or
    /// that was never declared is an error.
    pub fn locate(&mut self, gl: &dyn Gl, name: &str) -> Result<UniformLocation, ShaderError> {
        if let Some(location) = self.uniforms.get(name) {
            return Ok(*location);
        }
        let location = gl.get_uniform_location(self.handle, name);
        if !location.is_valid() {
            return Err(ShaderError::MissingUniform {
                name: name.to_string(),
            });
        }
        self.uniforms.insert(name.to_string(), location);
        Ok(location)
    }

    /// A previously resolved location.
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }
}

fn compile_stage(
    gl: &dyn Gl,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderStageHandle, ShaderError> {
    let shader = gl.create_shader(stage.gl_kind());
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if gl.get_shader_iv(shader, consts::COMPILE_STATUS) == 0 {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        log::error!("{} shader compile failed: {}", stage, log);
        return Err(ShaderError::Compile { stage, log });
    }
    Ok(shader)
}

fn link_program(
    gl: &dyn Gl,
    vertex: ShaderStageHandle,
    fragment: ShaderStageHandle,
) -> Result<ShaderProgramHandle, ShaderError> {
    let program = gl.create_program();
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);

    if gl.get_program_iv(program, consts::LINK_STATUS) == 0 {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        log::error!("Shader link failed: {}", log);
        return Err(ShaderError::Link { log });
    }
    Ok(program)
}
