//! Per-object placement in the world.
//!
//! A [`Transform`] stores position, Euler rotation (degrees) and scale and
//! turns them into the model matrix consumed by the vertex shader.

use std::ops::Mul;

use cgmath::{Matrix, SquareMatrix};

use crate::math::{self, Mat3, Mat4, Vec3};

/// Position, rotation (Euler angles in degrees, applied Z then Y then X) and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform: no move, rotate or scale.
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 0.0),
            rotation: Vec3::new(0.0, 0.0, 0.0),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, factor: f32) -> Self {
        self.with_scale(Vec3::new(factor, factor, factor))
    }

    /// `T * Rx * Ry * Rz * S`.
    pub fn to_matrix(&self) -> Mat4 {
        math::translate(self.position)
            * math::rotate_x(self.rotation.x)
            * math::rotate_y(self.rotation.y)
            * math::rotate_z(self.rotation.z)
            * math::scale(self.scale)
    }

    /// Inverse-transpose of the upper 3x3 of the model matrix.
    ///
    /// Degenerate scales have no inverse; the pure rotation is used instead.
    pub fn normal_matrix(&self) -> Mat3 {
        let m = math::upper_3x3(&self.to_matrix());
        match m.invert() {
            Some(inv) => inv.transpose(),
            None => math::upper_3x3(
                &(math::rotate_x(self.rotation.x)
                    * math::rotate_y(self.rotation.y)
                    * math::rotate_z(self.rotation.z)),
            ),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Parent-times-child composition, evaluated as matrices.
impl Mul<&Transform> for &Transform {
    type Output = Mat4;

    fn mul(self, rhs: &Transform) -> Self::Output {
        self.to_matrix() * rhs.to_matrix()
    }
}
