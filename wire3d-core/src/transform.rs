/// Vector transforms: axis rotation, translation and the helpers built on them
use nalgebra::{Rotation3, Unit, Vector3};

/// Scene-space vector. Transforms never mutate, they return a new value.
pub type Vec3 = Vector3<f32>;

/// Principal axis selecting the rotation plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Unit<Vec3> {
        match self {
            Axis::X => Vec3::x_axis(),
            Axis::Y => Vec3::y_axis(),
            Axis::Z => Vec3::z_axis(),
        }
    }
}

/// Rotate `v` by `angle` radians about a principal axis.
///
/// Only the two components orthogonal to `axis` change.
pub fn rotate(v: Vec3, angle: f32, axis: Axis) -> Vec3 {
    Rotation3::from_axis_angle(&axis.unit(), angle) * v
}

/// Component-wise sum
pub fn translate(v: Vec3, delta: Vec3) -> Vec3 {
    v + delta
}

pub fn negate(v: Vec3) -> Vec3 {
    -v
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(&b)
}

/// Rotate `v` about `pivot` instead of the origin.
pub fn rotate_about(v: Vec3, pivot: Vec3, angle: f32, axis: Axis) -> Vec3 {
    let local = translate(v, negate(pivot));
    translate(rotate(local, angle, axis), pivot)
}

/// Unit direction an observer with the given yaw is facing.
///
/// Inverse of the view rotation: `rotate(heading(yaw), yaw, Axis::Y)` is `+z`.
pub fn heading(yaw: f32) -> Vec3 {
    rotate(Vec3::z(), -yaw, Axis::Y)
}
