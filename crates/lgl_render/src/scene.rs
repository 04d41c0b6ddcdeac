//! The scene lifecycle: one-time resource setup, then a frame per update.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec2, Vec3};
use lgl_core::arena::ScratchAllocator;
use lgl_core::input::{InputState, Key};

use crate::camera::{CameraMovement, FreeLookCamera};
use crate::geometry::GeometryBuffer;
use crate::gl::consts;
use crate::gl::{check_errors, Gl, ShaderProgramHandle, TextureHandle, UniformLocation};
use crate::glsl;
use crate::lights::{
    DirectionalLight, DirectionalLightUniforms, PointLight, PointLightUniforms, SpotLight,
    SpotLightUniforms, LIGHT_CUBE_SCALE, POINT_LIGHT_POSITIONS,
};
use crate::shader::{ShaderError, ShaderProgram};
use crate::texture::{load_texture, TextureParams};
use crate::vertex::{LitVertex, CUBE_VERTICES};

pub const CLEAR_GREY: f32 = 0.1;
pub const MATERIAL_SHININESS: f32 = 32.0;
/// Degrees per second every crate spins around [`ROTATION_AXIS`].
pub const ROTATION_SPEED: f32 = 15.0;
pub const ROTATION_AXIS: Vec3 = Vec3::new(1.0, 0.3, 0.5);

pub const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

const NO_TEXTURE: TextureHandle = TextureHandle(0);

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("{program} program: {source}")]
    Shader {
        program: &'static str,
        #[source]
        source: ShaderError,
    },
}

fn shader_error(program: &'static str) -> impl Fn(ShaderError) -> SceneError {
    move |source| SceneError::Shader { program, source }
}

/// Image files read during setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneAssets {
    pub brick: PathBuf,
    pub face: PathBuf,
    pub crate_diffuse: PathBuf,
    pub crate_specular: PathBuf,
}

impl SceneAssets {
    pub fn in_dir(dir: &Path) -> Self {
        let defaults = Self::default();
        Self {
            brick: dir.join(defaults.brick),
            face: dir.join(defaults.face),
            crate_diffuse: dir.join(defaults.crate_diffuse),
            crate_specular: dir.join(defaults.crate_specular),
        }
    }
}

impl Default for SceneAssets {
    /// Relative to the working directory.
    fn default() -> Self {
        Self {
            brick: PathBuf::from("container.jpg"),
            face: PathBuf::from("awesomeface.png"),
            crate_diffuse: PathBuf::from("container2.png"),
            crate_specular: PathBuf::from("container2_specular.png"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneVariant {
    #[default]
    MultipleLights,
    TexturedBricks,
}

/// Everything the scene reads from the outside world in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Pixels, +y up.
    pub mouse_delta: Vec2,
    pub movement: CameraMovement,
    pub switch_to: Option<SceneVariant>,
    pub screen_size: (u32, u32),
}

impl FrameInput {
    pub fn from_input(input: &InputState, dt: f32) -> Self {
        let switch_to = if input.is_just_pressed(Key::Num1) {
            Some(SceneVariant::MultipleLights)
        } else if input.is_just_pressed(Key::Num2) {
            Some(SceneVariant::TexturedBricks)
        } else {
            None
        };
        Self {
            dt,
            mouse_delta: input.mouse_delta(),
            movement: CameraMovement::from_input(input),
            switch_to,
            screen_size: input.screen_size,
        }
    }
}

/// Texture objects; `None` where the image failed to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneTextures {
    pub brick: Option<TextureHandle>,
    pub face: Option<TextureHandle>,
    pub crate_diffuse: Option<TextureHandle>,
    pub crate_specular: Option<TextureHandle>,
}

impl SceneTextures {
    fn load<S, T>(gl: &dyn Gl, assets: &SceneAssets, storage: &mut S, scratch: &mut T) -> Self
    where
        S: ScratchAllocator,
        T: ScratchAllocator,
    {
        let mut load = |path: &Path, params: TextureParams| {
            match load_texture(gl, path, params, storage, scratch) {
                Ok(texture) => Some(texture),
                Err(err) => {
                    log::error!("Texture unavailable: {err}");
                    None
                }
            }
        };
        Self {
            brick: load(&assets.brick, TextureParams::BRICK),
            face: load(&assets.face, TextureParams::LINEAR),
            crate_diffuse: load(&assets.crate_diffuse, TextureParams::LINEAR),
            crate_specular: load(&assets.crate_specular, TextureParams::LINEAR),
        }
    }
}

/// GPU objects owned by a ready scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub lit_program: ShaderProgramHandle,
    pub light_program: ShaderProgramHandle,
    pub brick_program: ShaderProgramHandle,
    pub cube: GeometryBuffer,
    pub light_cube: GeometryBuffer,
    pub textures: SceneTextures,
}

/// Per-instance and per-frame locations shared by every program.
#[derive(Debug, Clone, Copy)]
struct Transforms {
    model: UniformLocation,
    view: UniformLocation,
}

impl Transforms {
    fn resolve(
        gl: &dyn Gl,
        program: &mut ShaderProgram,
        projection: &Mat4,
    ) -> Result<Self, ShaderError> {
        let transforms = Self {
            model: program.locate(gl, "model")?,
            view: program.locate(gl, "view")?,
        };
        let projection_location = program.locate(gl, "projection")?;
        program.use_program(gl);
        gl.uniform_matrix_4fv(projection_location, &projection.to_cols_array());
        Ok(transforms)
    }
}

fn bind_texture_unit(gl: &dyn Gl, unit: u32, texture: Option<TextureHandle>) {
    gl.active_texture(consts::TEXTURE0 + unit);
    gl.bind_texture(consts::TEXTURE_2D, texture.unwrap_or(NO_TEXTURE));
}

fn upload_mat4(gl: &dyn Gl, location: UniformLocation, value: &Mat4) {
    gl.uniform_matrix_4fv(location, &value.to_cols_array());
}

struct LitPass {
    program: ShaderProgram,
    transforms: Transforms,
    view_pos: UniformLocation,
    shininess: UniformLocation,
    directional: DirectionalLightUniforms,
    points: Vec<PointLightUniforms>,
    spot: SpotLightUniforms,
}

impl LitPass {
    fn build(gl: &dyn Gl, projection: &Mat4) -> Result<Self, ShaderError> {
        let mut program = ShaderProgram::build(
            gl,
            glsl::LIT_VERTEX,
            &glsl::lit_fragment(),
            &["viewPos", "material.diffuse", "material.specular"],
        )?;
        let transforms = Transforms::resolve(gl, &mut program, projection)?;
        let view_pos = program.locate(gl, "viewPos")?;
        let shininess = program.locate(gl, "material.shininess")?;
        let directional = DirectionalLightUniforms::resolve(gl, &mut program)?;
        let points = PointLightUniforms::resolve_all(gl, &mut program)?;
        let spot = SpotLightUniforms::resolve(gl, &mut program)?;

        program.use_program(gl);
        gl.uniform_1i(program.locate(gl, "material.diffuse")?, 0);
        gl.uniform_1i(program.locate(gl, "material.specular")?, 1);
        Ok(Self {
            program,
            transforms,
            view_pos,
            shininess,
            directional,
            points,
            spot,
        })
    }
}

/// A program that only needs the transform uniforms.
struct FlatPass {
    program: ShaderProgram,
    transforms: Transforms,
}

impl FlatPass {
    fn light_source(gl: &dyn Gl, projection: &Mat4) -> Result<Self, ShaderError> {
        let mut program =
            ShaderProgram::build(gl, glsl::LIT_VERTEX, glsl::LIGHT_SOURCE_FRAGMENT, &[])?;
        let transforms = Transforms::resolve(gl, &mut program, projection)?;
        Ok(Self {
            program,
            transforms,
        })
    }

    fn brick(gl: &dyn Gl, projection: &Mat4) -> Result<Self, ShaderError> {
        let mut program = ShaderProgram::build(
            gl,
            glsl::BRICK_VERTEX,
            glsl::BRICK_FRAGMENT,
            &["texture1", "texture2"],
        )?;
        let transforms = Transforms::resolve(gl, &mut program, projection)?;
        program.use_program(gl);
        gl.uniform_1i(program.locate(gl, "texture1")?, 0);
        gl.uniform_1i(program.locate(gl, "texture2")?, 1);
        Ok(Self {
            program,
            transforms,
        })
    }
}

/// Model matrix of a crate at `position` after `elapsed` seconds.
pub fn crate_model(position: Vec3, elapsed: f32) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_axis_angle(
            ROTATION_AXIS.normalize(),
            (elapsed * ROTATION_SPEED).to_radians(),
        )
}

pub fn light_cube_model(position: Vec3) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(LIGHT_CUBE_SCALE))
}

/// A fully initialised scene.
pub struct SceneState {
    lit: LitPass,
    light_source: FlatPass,
    brick: FlatPass,
    cube: GeometryBuffer,
    light_cube: GeometryBuffer,
    textures: SceneTextures,
    camera: FreeLookCamera,
    variant: SceneVariant,
    elapsed: f32,
}

impl SceneState {
    /// Builds every program, uploads geometry and loads textures.
    ///
    /// Shader failures abort setup. A texture that fails to load is logged and
    /// left unset; draws that sample it read from texture object zero.
    pub fn init<S, T>(
        gl: &dyn Gl,
        assets: &SceneAssets,
        screen_size: (u32, u32),
        storage: &mut S,
        scratch: &mut T,
    ) -> Result<Self, SceneError>
    where
        S: ScratchAllocator,
        T: ScratchAllocator,
    {
        let (width, height) = screen_size;
        let aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
        let projection = FreeLookCamera::projection(aspect_ratio);

        let lit = LitPass::build(gl, &projection).map_err(shader_error("lit"))?;
        let light_source =
            FlatPass::light_source(gl, &projection).map_err(shader_error("light source"))?;
        let brick = FlatPass::brick(gl, &projection).map_err(shader_error("brick"))?;
        check_errors(gl, "shader setup");

        let cube = GeometryBuffer::create(gl, &CUBE_VERTICES, &LitVertex::layout());
        let light_cube = GeometryBuffer::with_shared_buffer(
            gl,
            cube.vbo,
            &LitVertex::position_only_layout(),
            cube.vertex_count,
        );
        check_errors(gl, "geometry upload");

        let textures = SceneTextures::load(gl, assets, storage, scratch);
        check_errors(gl, "texture upload");

        gl.enable(consts::DEPTH_TEST);
        log::info!("Scene ready ({}x{})", width, height);

        Ok(Self {
            lit,
            light_source,
            brick,
            cube,
            light_cube,
            textures,
            camera: FreeLookCamera::default(),
            variant: SceneVariant::default(),
            elapsed: 0.0,
        })
    }

    pub fn render_frame(&mut self, gl: &dyn Gl, input: &FrameInput) {
        self.elapsed += input.dt;
        if let Some(variant) = input.switch_to {
            if variant != self.variant {
                log::info!("Switching scene to {:?}", variant);
                self.variant = variant;
            }
        }

        gl.clear_color(CLEAR_GREY, CLEAR_GREY, CLEAR_GREY, 1.0);
        gl.clear(consts::COLOR_BUFFER_BIT | consts::DEPTH_BUFFER_BIT);
        gl.polygon_mode(consts::FRONT_AND_BACK, consts::FILL);

        self.camera.update(input.mouse_delta, input.movement, input.dt);
        let view = self.camera.view_matrix();

        match self.variant {
            SceneVariant::MultipleLights => {
                self.draw_light_sources(gl, &view);
                self.draw_lit_crates(gl, &view);
            }
            SceneVariant::TexturedBricks => self.draw_bricks(gl, &view),
        }
        check_errors(gl, "frame");
    }

    fn draw_light_sources(&self, gl: &dyn Gl, view: &Mat4) {
        let pass = &self.light_source;
        pass.program.use_program(gl);
        upload_mat4(gl, pass.transforms.view, view);
        self.light_cube.bind(gl);
        for position in POINT_LIGHT_POSITIONS {
            upload_mat4(gl, pass.transforms.model, &light_cube_model(position));
            self.light_cube.draw(gl);
        }
    }

    fn draw_lit_crates(&self, gl: &dyn Gl, view: &Mat4) {
        let pass = &self.lit;
        pass.program.use_program(gl);
        bind_texture_unit(gl, 0, self.textures.crate_diffuse);
        bind_texture_unit(gl, 1, self.textures.crate_specular);

        upload_mat4(gl, pass.transforms.view, view);
        gl.uniform_3fv(pass.view_pos, &self.camera.position.to_array());
        gl.uniform_1f(pass.shininess, MATERIAL_SHININESS);

        pass.directional.upload(gl, &DirectionalLight::default());
        for (uniforms, position) in pass.points.iter().zip(POINT_LIGHT_POSITIONS) {
            uniforms.upload(gl, &PointLight::at(position));
        }
        let flashlight = SpotLight::flashlight(self.camera.position, self.camera.forward());
        pass.spot.upload(gl, &flashlight);

        self.cube.bind(gl);
        for position in CUBE_POSITIONS {
            upload_mat4(gl, pass.transforms.model, &crate_model(position, self.elapsed));
            self.cube.draw(gl);
        }
    }

    fn draw_bricks(&self, gl: &dyn Gl, view: &Mat4) {
        let pass = &self.brick;
        pass.program.use_program(gl);
        bind_texture_unit(gl, 0, self.textures.brick);
        bind_texture_unit(gl, 1, self.textures.face);
        upload_mat4(gl, pass.transforms.view, view);

        self.cube.bind(gl);
        for position in CUBE_POSITIONS {
            upload_mat4(gl, pass.transforms.model, &crate_model(position, self.elapsed));
            self.cube.draw(gl);
        }
    }

    pub fn camera(&self) -> &FreeLookCamera {
        &self.camera
    }

    /// Seconds of frame time accumulated since setup.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn variant(&self) -> SceneVariant {
        self.variant
    }

    pub fn handles(&self) -> SceneHandles {
        SceneHandles {
            lit_program: self.lit.program.handle(),
            light_program: self.light_source.program.handle(),
            brick_program: self.brick.program.handle(),
            cube: self.cube,
            light_cube: self.light_cube,
            textures: self.textures,
        }
    }
}

pub enum Scene {
    Uninitialized(SceneAssets),
    Ready(Box<SceneState>),
}

impl Scene {
    pub fn new(assets: SceneAssets) -> Self {
        Scene::Uninitialized(assets)
    }

    /// Sets the scene up on the first call, then renders one frame.
    pub fn update<S, T>(
        &mut self,
        gl: &dyn Gl,
        input: &FrameInput,
        storage: &mut S,
        scratch: &mut T,
    ) -> Result<(), SceneError>
    where
        S: ScratchAllocator,
        T: ScratchAllocator,
    {
        if let Scene::Uninitialized(assets) = self {
            let state = SceneState::init(gl, assets, input.screen_size, storage, scratch)?;
            *self = Scene::Ready(Box::new(state));
        }
        if let Scene::Ready(state) = self {
            state.render_frame(gl, input);
        }
        Ok(())
    }

    pub fn state(&self) -> Option<&SceneState> {
        match self {
            Scene::Ready(state) => Some(state.as_ref()),
            Scene::Uninitialized(_) => None,
        }
    }
}
