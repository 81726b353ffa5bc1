/// Drawing interface the host surface provides to the frame update
use crate::geometry::Color;
use crate::projection::ScreenPoint;

/// Host-side rasterizer. Coordinates are view-space screen points with y up.
pub trait RenderSink {
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color);

    /// Fill a quadrilateral; `alpha` is opacity in `0.0..=1.0`
    fn fill_quad(&mut self, points: [ScreenPoint; 4], color: Color, alpha: f32);

    fn draw_marker(&mut self, point: ScreenPoint, color: Color);
}

/// A primitive emitted during a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: ScreenPoint,
        to: ScreenPoint,
        color: Color,
    },
    Quad {
        points: [ScreenPoint; 4],
        color: Color,
        alpha: f32,
    },
    Marker {
        point: ScreenPoint,
        color: Color,
    },
}

/// Sink that keeps every primitive in emission order
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub primitives: Vec<Primitive>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn lines(&self) -> impl Iterator<Item = (ScreenPoint, ScreenPoint)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }

    pub fn quads(&self) -> impl Iterator<Item = &[ScreenPoint; 4]> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Quad { points, .. } => Some(points),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = ScreenPoint> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Marker { point, .. } => Some(*point),
            _ => None,
        })
    }
}

impl RenderSink for FrameRecorder {
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
        self.primitives.push(Primitive::Line { from, to, color });
    }

    fn fill_quad(&mut self, points: [ScreenPoint; 4], color: Color, alpha: f32) {
        self.primitives.push(Primitive::Quad {
            points,
            color,
            alpha,
        });
    }

    fn draw_marker(&mut self, point: ScreenPoint, color: Color) {
        self.primitives.push(Primitive::Marker { point, color });
    }
}
