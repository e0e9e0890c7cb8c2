//! Free-fly camera, projection and the uniform block fed to shaders.
//!
//! The [`Camera`] is an Euler-angle (yaw/pitch) first-person camera. Its
//! basis vectors are recomputed inside every mutator, so [`Camera::view_matrix`]
//! is a pure read that may be called any number of times per frame.

use cgmath::InnerSpace;

use crate::math::{self, Mat4, Vec3};

/// Pitch limit in degrees; looking straight up or down would flip the basis.
pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 90.0;

/// Discrete movement commands, one per held key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Start-up values for a [`Camera`].
#[derive(Clone, Copy, Debug)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Degrees. -90 looks down the negative Z axis.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    pub world_up: Vec3,
    /// World units per second.
    pub movement_speed: f32,
    /// Degrees per unit of look delta.
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            yaw: -90.0,
            pitch: 0.0,
            world_up: Vec3::unit_y(),
            movement_speed: 5.0,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
        }
    }
}

impl CameraConfig {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    world_up: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            position: config.position,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            world_up: math::normalize_or_zero(config.world_up),
            front: -Vec3::unit_z(),
            right: Vec3::unit_x(),
            up: Vec3::unit_y(),
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            zoom: config.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        };
        camera.update_vectors();
        camera
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(CameraConfig::at(position))
    }

    /// Move along the camera basis by `movement_speed * dt`.
    pub fn process_movement(&mut self, direction: Movement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
            Movement::Up => self.position += self.world_up * velocity,
            Movement::Down => self.position -= self.world_up * velocity,
        }
    }

    /// Turn the camera. Offsets are scaled by `mouse_sensitivity`.
    ///
    /// Yaw is left unbounded; only its sine and cosine are ever used.
    pub fn process_look(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Scrolling forward narrows the field of view.
    pub fn process_zoom(&mut self, scroll_delta: f32) {
        self.set_zoom(self.zoom - scroll_delta);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Point the camera; pitch is clamped to the usual limit.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Mat4 {
        math::look_at(self.position, self.position + self.front, self.up)
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = math::normalize_or_zero(self.front.cross(self.world_up));
        self.up = math::normalize_or_zero(self.right.cross(self.front));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

/// Aspect ratio and clip planes. The field of view is owned by the camera's zoom.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            znear,
            zfar,
        }
    }

    /// Zero-sized windows (minimized) keep the previous aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self, fovy_degrees: f32) -> Mat4 {
        math::perspective(fovy_degrees, self.aspect, self.znear, self.zfar)
    }

    pub fn for_camera(&self, camera: &Camera) -> Mat4 {
        self.calc_matrix(camera.zoom())
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(800, 600, 0.1, 200.0)
    }
}

/// Camera data laid out for a uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_position: [f32; 4],
    pub view: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: Mat4::identity().into(),
            view_proj: Mat4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view = camera.view_matrix();
        self.view_position = camera.position.extend(1.0).into();
        self.view = view.into();
        self.view_proj = (projection.for_camera(camera) * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
