//! Math primitives on top of `cgmath`.
//!
//! All matrices are column-major `Matrix4<f32>`, directly uploadable to the GPU.
//! Composition follows right multiplication: `parent * child` applies the
//! child-most transform first.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, SquareMatrix, Zero};

pub type Vec2 = cgmath::Vector2<f32>;
pub type Vec3 = cgmath::Vector3<f32>;
pub type Vec4 = cgmath::Vector4<f32>;
pub type Mat3 = cgmath::Matrix3<f32>;
pub type Mat4 = cgmath::Matrix4<f32>;

/// Maps OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1]).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Mat4 = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub fn identity() -> Mat4 {
    Mat4::identity()
}

pub fn translate(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

pub fn scale(factors: Vec3) -> Mat4 {
    Mat4::from_nonuniform_scale(factors.x, factors.y, factors.z)
}

/// Rotation of `angle_degrees` around `axis` using the right-hand rule.
///
/// The axis does not need to be normalized. A zero axis yields identity.
pub fn rotate(angle_degrees: f32, axis: Vec3) -> Mat4 {
    let axis = normalize_or_zero(axis);
    if axis.is_zero() {
        return Mat4::identity();
    }
    Mat4::from_axis_angle(axis, Deg(angle_degrees))
}

pub fn rotate_x(angle_degrees: f32) -> Mat4 {
    Mat4::from_angle_x(Deg(angle_degrees))
}

pub fn rotate_y(angle_degrees: f32) -> Mat4 {
    Mat4::from_angle_y(Deg(angle_degrees))
}

pub fn rotate_z(angle_degrees: f32) -> Mat4 {
    Mat4::from_angle_z(Deg(angle_degrees))
}

/// Right-handed view matrix looking from `eye` towards `center`.
///
/// forward = normalize(center - eye), side = normalize(forward x up),
/// true up = side x forward.
pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(
        Point3::new(eye.x, eye.y, eye.z),
        Point3::new(center.x, center.y, center.z),
        up,
    )
}

/// Right-handed perspective projection in wgpu's depth convention.
pub fn perspective(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    OPENGL_TO_WGPU_MATRIX * perspective_gl(fovy_degrees, aspect, near, far)
}

/// Right-handed perspective projection with OpenGL's [-1, 1] depth range.
pub fn perspective_gl(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    cgmath::perspective(Deg(fovy_degrees), aspect, near, far)
}

/// `parent * child`.
pub fn multiply(parent: &Mat4, child: &Mat4) -> Mat4 {
    parent * child
}

/// Unit vector in the direction of `v`, or the zero vector if `v` has no length.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len2 = v.magnitude2();
    if len2 > 0.0 && len2.is_finite() {
        v / len2.sqrt()
    } else {
        Vec3::zero()
    }
}

/// Element-wise comparison with an absolute tolerance.
pub fn approx_eq(a: &Mat4, b: &Mat4, eps: f32) -> bool {
    let a: [[f32; 4]; 4] = (*a).into();
    let b: [[f32; 4]; 4] = (*b).into();
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .all(|(x, y)| (x - y).abs() <= eps)
}

/// Upper 3x3 of a matrix, e.g. for normal transforms.
pub fn upper_3x3(m: &Mat4) -> Mat3 {
    Mat3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
}
