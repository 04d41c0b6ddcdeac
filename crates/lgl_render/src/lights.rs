//! Light descriptors and the uniform bundles they are uploaded through.
//!
//! Light values are literals re-sent every frame; only the uniform locations
//! are persistent.

use glam::Vec3;

use crate::gl::{Gl, UniformLocation};
use crate::shader::{ShaderError, ShaderProgram};

/// Must match the array size in the lit fragment stage, which is generated
/// from this constant.
pub const POINT_LIGHT_COUNT: usize = 4;

pub const POINT_LIGHT_POSITIONS: [Vec3; POINT_LIGHT_COUNT] = [
    Vec3::new(0.7, 0.2, 2.0),
    Vec3::new(2.3, -3.3, -4.0),
    Vec3::new(-4.0, 2.0, -12.0),
    Vec3::new(0.0, 0.0, -3.0),
];

/// Scale applied to the unit cube drawn at each point light.
pub const LIGHT_CUBE_SCALE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    /// Falloff tuned for a range of roughly 50 units.
    pub const RANGE_50: Attenuation = Attenuation {
        constant: 1.0,
        linear: 0.09,
        quadratic: 0.032,
    };

    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

impl PointLight {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(1.0),
            attenuation: Attenuation::RANGE_50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.4),
            specular: Vec3::splat(0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    /// Cosine of the inner cone half-angle.
    pub cut_off: f32,
    /// Cosine of the outer cone half-angle.
    pub outer_cut_off: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

impl SpotLight {
    pub const INNER_CONE_DEGREES: f32 = 12.5;
    pub const OUTER_CONE_DEGREES: f32 = 17.5;

    /// A torch held at `position` pointing along `direction`.
    pub fn flashlight(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
            cut_off: Self::INNER_CONE_DEGREES.to_radians().cos(),
            outer_cut_off: Self::OUTER_CONE_DEGREES.to_radians().cos(),
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(1.0),
            attenuation: Attenuation::RANGE_50,
        }
    }
}

fn upload_vec3(gl: &dyn Gl, location: UniformLocation, value: Vec3) {
    gl.uniform_3fv(location, &value.to_array());
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightUniforms {
    pub position: UniformLocation,
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
    pub constant: UniformLocation,
    pub linear: UniformLocation,
    pub quadratic: UniformLocation,
}

impl PointLightUniforms {
    pub fn resolve(
        gl: &dyn Gl,
        program: &mut ShaderProgram,
        slot: usize,
    ) -> Result<Self, ShaderError> {
        let mut field = |name: &str| program.locate(gl, &format!("pointLights[{slot}].{name}"));
        Ok(Self {
            position: field("position")?,
            ambient: field("ambient")?,
            diffuse: field("diffuse")?,
            specular: field("specular")?,
            constant: field("constant")?,
            linear: field("linear")?,
            quadratic: field("quadratic")?,
        })
    }

    /// One bundle per point light slot, in slot order.
    pub fn resolve_all(
        gl: &dyn Gl,
        program: &mut ShaderProgram,
    ) -> Result<Vec<Self>, ShaderError> {
        (0..POINT_LIGHT_COUNT)
            .map(|slot| Self::resolve(gl, program, slot))
            .collect()
    }

    pub fn upload(&self, gl: &dyn Gl, light: &PointLight) {
        upload_vec3(gl, self.position, light.position);
        upload_vec3(gl, self.ambient, light.ambient);
        upload_vec3(gl, self.diffuse, light.diffuse);
        upload_vec3(gl, self.specular, light.specular);
        gl.uniform_1f(self.constant, light.attenuation.constant);
        gl.uniform_1f(self.linear, light.attenuation.linear);
        gl.uniform_1f(self.quadratic, light.attenuation.quadratic);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightUniforms {
    pub direction: UniformLocation,
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
}

impl DirectionalLightUniforms {
    pub fn resolve(gl: &dyn Gl, program: &mut ShaderProgram) -> Result<Self, ShaderError> {
        Ok(Self {
            direction: program.locate(gl, "dirLight.direction")?,
            ambient: program.locate(gl, "dirLight.ambient")?,
            diffuse: program.locate(gl, "dirLight.diffuse")?,
            specular: program.locate(gl, "dirLight.specular")?,
        })
    }

    pub fn upload(&self, gl: &dyn Gl, light: &DirectionalLight) {
        upload_vec3(gl, self.direction, light.direction);
        upload_vec3(gl, self.ambient, light.ambient);
        upload_vec3(gl, self.diffuse, light.diffuse);
        upload_vec3(gl, self.specular, light.specular);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLightUniforms {
    pub position: UniformLocation,
    pub direction: UniformLocation,
    pub cut_off: UniformLocation,
    pub outer_cut_off: UniformLocation,
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
    pub constant: UniformLocation,
    pub linear: UniformLocation,
    pub quadratic: UniformLocation,
}

impl SpotLightUniforms {
    pub fn resolve(gl: &dyn Gl, program: &mut ShaderProgram) -> Result<Self, ShaderError> {
        Ok(Self {
            position: program.locate(gl, "spotLight.position")?,
            direction: program.locate(gl, "spotLight.direction")?,
            cut_off: program.locate(gl, "spotLight.cutOff")?,
            outer_cut_off: program.locate(gl, "spotLight.outerCutOff")?,
            ambient: program.locate(gl, "spotLight.ambient")?,
            diffuse: program.locate(gl, "spotLight.diffuse")?,
            specular: program.locate(gl, "spotLight.specular")?,
            constant: program.locate(gl, "spotLight.constant")?,
            linear: program.locate(gl, "spotLight.linear")?,
            quadratic: program.locate(gl, "spotLight.quadratic")?,
        })
    }

    pub fn upload(&self, gl: &dyn Gl, light: &SpotLight) {
        upload_vec3(gl, self.position, light.position);
        upload_vec3(gl, self.direction, light.direction);
        gl.uniform_1f(self.cut_off, light.cut_off);
        gl.uniform_1f(self.outer_cut_off, light.outer_cut_off);
        gl.uniform_3f(self.ambient, light.ambient.x, light.ambient.y, light.ambient.z);
        gl.uniform_3f(self.diffuse, light.diffuse.x, light.diffuse.y, light.diffuse.z);
        gl.uniform_3f(self.specular, light.specular.x, light.specular.y, light.specular.z);
        gl.uniform_1f(self.constant, light.attenuation.constant);
        gl.uniform_1f(self.linear, light.attenuation.linear);
        gl.uniform_1f(self.quadratic, light.attenuation.quadratic);
    }
}
