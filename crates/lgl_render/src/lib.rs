pub mod camera;
pub mod geometry;
pub mod gl;
pub mod glsl;
pub mod lights;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod vertex;

#[cfg(test)]
mod fake_gl;

pub use camera::{CameraMovement, FreeLookCamera};
pub use geometry::GeometryBuffer;
pub use gl::{Gl, GlFunctions, LoadError};
pub use scene::{FrameInput, Scene, SceneAssets, SceneError, SceneState, SceneVariant};
pub use shader::{ShaderError, ShaderProgram};
pub use texture::{load_texture, TextureError, TextureParams};
pub use vertex::LitVertex;
