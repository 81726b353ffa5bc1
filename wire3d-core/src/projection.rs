/// Perspective projection and near-plane clipping
use nalgebra::Point2;

use crate::transform::{dot, translate, Vec3};

/// Position on the 2D view, `(0, 0)` to `(view_size, view_size)` when on screen
pub type ScreenPoint = Point2<f32>;

/// Pinhole projector onto a square view.
///
/// Points with `z < 0` are behind the viewer and have no projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    scale: f32,
    half_view_size: f32,
    depth_epsilon: f32,
}

impl Projector {
    pub fn new(scale: f32, half_view_size: f32, depth_epsilon: f32) -> Self {
        Self {
            scale,
            half_view_size,
            depth_epsilon,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn half_view_size(&self) -> f32 {
        self.half_view_size
    }

    /// Project a view-space point to screen space.
    ///
    /// A depth of exactly zero, from `z == 0` or underflow, is replaced by
    /// `depth_epsilon`, so points on the viewing plane land far off screen
    /// instead of at an infinite coordinate. A NaN depth counts as behind.
    pub fn project(&self, v: Vec3) -> Option<ScreenPoint> {
        if v.z.is_nan() || v.z < 0.0 {
            return None;
        }

        let mut depth = v.z / self.scale;
        if depth == 0.0 {
            depth = self.depth_epsilon;
        }

        Some(ScreenPoint::new(
            v.x / depth + self.half_view_size,
            v.y / depth + self.half_view_size,
        ))
    }

    /// Project the visible part of the segment `a`-`b`.
    ///
    /// A segment crossing the viewing plane is cut at `z = 0` in 3D first; the
    /// result is then `(visible endpoint, plane crossing)`.
    pub fn clip_segment(&self, a: Vec3, b: Vec3) -> Option<(ScreenPoint, ScreenPoint)> {
        match (a.z < 0.0, b.z < 0.0) {
            (true, true) => None,
            (false, false) => Some((self.project(a)?, self.project(b)?)),
            (false, true) => self.clip_crossing(a, b),
            (true, false) => self.clip_crossing(b, a),
        }
    }

    fn clip_crossing(&self, near: Vec3, far: Vec3) -> Option<(ScreenPoint, ScreenPoint)> {
        let crossing = intersect_view_plane(near, far);
        Some((self.project(near)?, self.project(crossing)?))
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(400.0, 200.0, 1e-6)
    }
}

/// Point where the segment from `near` (z >= 0) to `far` (z < 0) crosses `z = 0`.
pub fn intersect_view_plane(near: Vec3, far: Vec3) -> Vec3 {
    let normal = Vec3::z();
    let direction = far - near;
    let t = -dot(near, normal) / dot(direction, normal);
    let mut crossing = translate(near, direction * t);
    // Rounding can leave the crossing a hair behind the plane.
    crossing.z = 0.0;
    crossing
}
