/// Shape meshes: vertices, edges and quad faces plus per-instance animation state
use thiserror::Error;

use crate::transform::{translate, Vec3};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREY: Color = Color::rgb(128, 128, 128);
    pub const RED: Color = Color::rgb(220, 40, 40);
    pub const GREEN: Color = Color::rgb(40, 200, 80);
    pub const BLUE: Color = Color::rgb(50, 90, 230);
    pub const YELLOW: Color = Color::rgb(240, 220, 40);
    pub const CYAN: Color = Color::rgb(40, 210, 220);
    pub const MAGENTA: Color = Color::rgb(210, 50, 200);
    pub const ORANGE: Color = Color::rgb(250, 140, 30);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Look up one of the named constants, case-insensitively
    pub fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "grey" | "gray" => Self::GREY,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "yellow" => Self::YELLOW,
            "cyan" => Self::CYAN,
            "magenta" => Self::MAGENTA,
            "orange" => Self::ORANGE,
            _ => return None,
        };
        Some(color)
    }

    /// `#rrggbb` notation
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Direction a projectile was fired in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    /// Heading about the vertical axis, radians
    pub yaw: f32,
}

/// Mesh index that points past the vertex list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("edge {edge} references vertex {index} but the shape has {vertex_count} vertices")]
    EdgeOutOfRange {
        edge: usize,
        index: usize,
        vertex_count: usize,
    },
    #[error("face {face} references vertex {index} but the shape has {vertex_count} vertices")]
    FaceOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },
}

/// A rigid mesh instance in the scene.
///
/// Vertices are kept in model space; per-frame transforms never write back into
/// them. Faces are quads, so triangles repeat their last index.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub(crate) vertices: Vec<Vec3>,
    pub(crate) edges: Vec<(usize, usize)>,
    pub(crate) faces: Vec<[usize; 4]>,
    pub(crate) color: Color,
    pub(crate) center: Vec3,
    pub(crate) spins: bool,
    pub(crate) launch: Option<Launch>,
    pub(crate) age: f32,
    pub(crate) landed: bool,
    half_size: f32,
}

impl Shape {
    /// Build a shape, rejecting any edge or face index outside `vertices`.
    pub fn new(
        vertices: Vec<Vec3>,
        edges: Vec<(usize, usize)>,
        faces: Vec<[usize; 4]>,
        center: Vec3,
        color: Color,
    ) -> Result<Self, ShapeError> {
        let shape = Self::assemble(vertices, edges, faces, center, color);
        shape.validate()?;
        Ok(shape)
    }

    fn assemble(
        vertices: Vec<Vec3>,
        edges: Vec<(usize, usize)>,
        faces: Vec<[usize; 4]>,
        center: Vec3,
        color: Color,
    ) -> Self {
        let half_size = vertices
            .iter()
            .map(|v| (v.y - center.y).abs())
            .fold(0.0, f32::max);

        Self {
            vertices,
            edges,
            faces,
            color,
            center,
            spins: false,
            launch: None,
            age: 0.0,
            landed: false,
            half_size,
        }
    }

    /// Check every index against the vertex list
    pub fn validate(&self) -> Result<(), ShapeError> {
        let vertex_count = self.vertices.len();

        for (edge, &(i, j)) in self.edges.iter().enumerate() {
            if let Some(&index) = [i, j].iter().find(|&&index| index >= vertex_count) {
                return Err(ShapeError::EdgeOutOfRange {
                    edge,
                    index,
                    vertex_count,
                });
            }
        }

        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&index| index >= vertex_count) {
                return Err(ShapeError::FaceOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Axis-aligned box, `width` across in x and z, `height` tall
    pub fn cuboid(width: f32, height: f32, center: Vec3, color: Color) -> Self {
        let w = width / 2.0;
        let h = height / 2.0;

        // Bottom ring 0..4, top ring 4..8, same winding
        let corners = [
            Vec3::new(-w, -h, -w),
            Vec3::new(w, -h, -w),
            Vec3::new(w, -h, w),
            Vec3::new(-w, -h, w),
            Vec3::new(-w, h, -w),
            Vec3::new(w, h, -w),
            Vec3::new(w, h, w),
            Vec3::new(-w, h, w),
        ];
        let vertices = corners.iter().map(|&c| translate(c, center)).collect();

        let mut edges = Vec::with_capacity(12);
        for i in 0..4 {
            let next = (i + 1) % 4;
            edges.push((i, next));
            edges.push((i + 4, next + 4));
            edges.push((i, i + 4));
        }

        let faces = vec![
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
        ];

        Self::assemble(vertices, edges, faces, center, color)
    }

    /// Square-based pyramid of the given base width and height
    pub fn pyramid(size: f32, center: Vec3, color: Color) -> Self {
        let s = size / 2.0;
        let apex = 4;

        let points = [
            Vec3::new(-s, -s, -s),
            Vec3::new(s, -s, -s),
            Vec3::new(s, -s, s),
            Vec3::new(-s, -s, s),
            Vec3::new(0.0, s, 0.0),
        ];
        let vertices = points.iter().map(|&p| translate(p, center)).collect();

        let mut edges = Vec::with_capacity(8);
        let mut faces = Vec::with_capacity(4);
        for i in 0..4 {
            let next = (i + 1) % 4;
            edges.push((i, next));
            edges.push((i, apex));
            faces.push([i, next, apex, apex]);
        }

        Self::assemble(vertices, edges, faces, center, color)
    }

    /// `count` x `count` ground markers centred under the origin at `floor_height`.
    ///
    /// Only the outer ranks are connected: one edge spans each row and one
    /// spans each column, so the floor reads as a grid without a full mesh.
    pub fn grid_floor(count: usize, cell_size: f32, floor_height: f32, color: Color) -> Self {
        let offset = (count.saturating_sub(1)) as f32 * cell_size / 2.0;

        let mut vertices = Vec::with_capacity(count * count);
        for row in 0..count {
            for column in 0..count {
                vertices.push(Vec3::new(
                    column as f32 * cell_size - offset,
                    floor_height,
                    row as f32 * cell_size - offset,
                ));
            }
        }

        let mut edges = Vec::new();
        if count > 1 {
            let last = count - 1;
            for rank in 0..count {
                edges.push((rank * count, rank * count + last));
                edges.push((rank, last * count + rank));
            }
        }

        let center = Vec3::new(0.0, floor_height, 0.0);
        Self::assemble(vertices, edges, Vec::new(), center, color)
    }

    /// Small box fired from `origin` along heading `yaw`
    pub fn projectile(size: f32, origin: Vec3, yaw: f32, color: Color) -> Self {
        let mut shape = Self::cuboid(size, size, origin, color);
        shape.launch = Some(Launch { yaw });
        shape
    }

    /// Mark the shape as receiving the shared per-frame spin
    pub fn spinning(mut self) -> Self {
        self.spins = true;
        self
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn faces(&self) -> &[[usize; 4]] {
        &self.faces
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn spins(&self) -> bool {
        self.spins
    }

    pub fn launch(&self) -> Option<Launch> {
        self.launch
    }

    pub fn is_projectile(&self) -> bool {
        self.launch.is_some()
    }

    /// Simulated time since the shape was fired
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Whether a projectile has reached the floor and stopped ageing
    pub fn has_landed(&self) -> bool {
        self.landed
    }

    /// Largest vertical distance of a vertex from the centre
    pub fn half_size(&self) -> f32 {
        self.half_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_corners() {
        let center = Vec3::new(10.0, -5.0, 100.0);
        let shape = Shape::cuboid(40.0, 20.0, center, Color::RED);

        assert_eq!(shape.vertices().len(), 8);
        assert_eq!(shape.edges().len(), 12);
        assert_eq!(shape.faces().len(), 6);

        for v in shape.vertices() {
            let d = v - center;
            assert_eq!(d.x.abs(), 20.0);
            assert_eq!(d.y.abs(), 10.0);
            assert_eq!(d.z.abs(), 20.0);
        }

        // All eight sign combinations are present
        let mut signs: Vec<_> = shape
            .vertices()
            .iter()
            .map(|v| {
                let d = v - center;
                (d.x > 0.0, d.y > 0.0, d.z > 0.0)
            })
            .collect();
        signs.sort();
        signs.dedup();
        assert_eq!(signs.len(), 8);

        assert!(shape.edges().iter().all(|&(i, j)| i < 8 && j < 8 && i != j));
        assert_eq!(shape.half_size(), 10.0);
        assert!(shape.validate().is_ok());
    }

    #[test]
    fn test_cuboid_faces_are_planar() {
        let shape = Shape::cuboid(2.0, 2.0, Vec3::zeros(), Color::WHITE);
        for face in shape.faces() {
            let points: Vec<Vec3> = face.iter().map(|&i| shape.vertices()[i]).collect();
            let planar = (0..3).any(|axis| points.iter().all(|p| p[axis] == points[0][axis]));
            assert!(planar, "face {:?} is not axis-aligned", face);
        }
    }

    #[test]
    fn test_pyramid_layout() {
        let shape = Shape::pyramid(30.0, Vec3::new(0.0, 0.0, 50.0), Color::YELLOW);

        assert_eq!(shape.vertices().len(), 5);
        assert_eq!(shape.edges().len(), 8);
        assert_eq!(shape.faces().len(), 4);
        assert_eq!(shape.vertices()[4], Vec3::new(0.0, 15.0, 50.0));

        for face in shape.faces() {
            assert_eq!(face[2], 4);
            assert_eq!(face[3], 4);
        }
        assert_eq!(shape.edges().iter().filter(|&&(_, j)| j == 4).count(), 4);
        assert!(shape.validate().is_ok());
    }

    #[test]
    fn test_grid_floor() {
        let shape = Shape::grid_floor(5, 10.0, -200.0, Color::GREY);

        assert_eq!(shape.vertices().len(), 25);
        assert!(shape.faces().is_empty());
        assert_eq!(shape.edges().len(), 10);
        assert!(shape.vertices().iter().all(|v| v.y == -200.0));

        // Centred on the origin
        assert_eq!(shape.vertices()[0], Vec3::new(-20.0, -200.0, -20.0));
        assert_eq!(shape.vertices()[24], Vec3::new(20.0, -200.0, 20.0));

        // Each edge spans a full row or column
        for &(i, j) in shape.edges() {
            let (a, b) = (shape.vertices()[i], shape.vertices()[j]);
            let span = (a - b).abs();
            assert!((span.x == 40.0 && span.z == 0.0) || (span.x == 0.0 && span.z == 40.0));
        }
        assert!(shape.validate().is_ok());
    }

    #[test]
    fn test_tiny_grids() {
        assert!(Shape::grid_floor(0, 10.0, 0.0, Color::GREY).vertices().is_empty());

        let single = Shape::grid_floor(1, 10.0, 0.0, Color::GREY);
        assert_eq!(single.vertices().len(), 1);
        assert!(single.edges().is_empty());
    }

    #[test]
    fn test_new_rejects_bad_edge() {
        let vertices = vec![Vec3::zeros(), Vec3::x()];
        let err = Shape::new(vertices, vec![(0, 1), (1, 2)], vec![], Vec3::zeros(), Color::RED)
            .unwrap_err();
        assert_eq!(
            err,
            ShapeError::EdgeOutOfRange {
                edge: 1,
                index: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn test_new_rejects_bad_face() {
        let vertices = vec![Vec3::zeros(), Vec3::x(), Vec3::y()];
        let err = Shape::new(vertices, vec![], vec![[0, 1, 2, 3]], Vec3::zeros(), Color::RED)
            .unwrap_err();
        assert!(matches!(err, ShapeError::FaceOutOfRange { face: 0, index: 3, .. }));
        assert!(err.to_string().contains("3 vertices"));
    }

    #[test]
    fn test_projectile_state() {
        let shape = Shape::projectile(10.0, Vec3::new(0.0, 0.0, 0.0), 0.3, Color::ORANGE);
        assert!(shape.is_projectile());
        assert_eq!(shape.launch(), Some(Launch { yaw: 0.3 }));
        assert_eq!(shape.age(), 0.0);
        assert!(!shape.spins());
        assert_eq!(shape.half_size(), 5.0);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::named("Red"), Some(Color::RED));
        assert_eq!(Color::named("gray"), Some(Color::GREY));
        assert_eq!(Color::named("mauve"), None);
        assert_eq!(Color::rgb(255, 8, 171).to_hex(), "#ff08ab");
    }
}
