//! First-person free-look camera.
//!
//! Y-up, right-handed. Yaw is measured from +X towards +Z, pitch from the XZ
//! plane (clamped short of the poles so the look-at basis never degenerates).

use glam::{Mat4, Vec2, Vec3};
use lgl_core::input::{InputState, Key};

/// Degrees of rotation per pixel of mouse travel.
pub const MOUSE_SENSITIVITY: f32 = 0.1;
/// World units per second.
pub const CAMERA_SPEED: f32 = 10.0;
pub const PITCH_LIMIT: f32 = 89.0;
pub const FOV_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
const WORLD_UP: Vec3 = Vec3::Y;

pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 3.0);

/// Movement keys held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraMovement {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl CameraMovement {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            forward: input.is_held(Key::W),
            backward: input.is_held(Key::S),
            left: input.is_held(Key::A),
            right: input.is_held(Key::D),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeLookCamera {
    pub position: Vec3,
    /// Degrees.
    pub yaw: f32,
    /// Degrees, within `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub pitch: f32,
}

impl Default for FreeLookCamera {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl FreeLookCamera {
    /// Applies one frame of mouse look and movement. `mouse_delta` is in
    /// pixels with +y pointing up.
    pub fn update(&mut self, mouse_delta: Vec2, movement: CameraMovement, dt: f32) {
        self.yaw += mouse_delta.x * MOUSE_SENSITIVITY;
        let pitch = self.pitch + mouse_delta.y * MOUSE_SENSITIVITY;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let forward = self.forward();
        let right = self.right();
        let step = CAMERA_SPEED * dt;
        if movement.forward {
            self.position += forward * step;
        }
        if movement.backward {
            self.position -= forward * step;
        }
        if movement.left {
            self.position -= right * step;
        }
        if movement.right {
            self.position += right * step;
        }
    }

    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(WORLD_UP).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), WORLD_UP)
    }

    /// GL clip-space perspective projection.
    pub fn projection(aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(FOV_DEGREES.to_radians(), aspect_ratio, NEAR_PLANE, FAR_PLANE)
    }
}
