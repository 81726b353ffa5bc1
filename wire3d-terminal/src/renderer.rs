/// Character-cell rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use wire3d_core::{Color as SceneColor, RenderSink, ScreenPoint};

/// Character luminosity ramp for face opacity (faintest to densest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const MARKER: char = 'o';

/// Rasterizes projected primitives into a grid of coloured cells.
///
/// The square view `0..view_size` is stretched over the whole grid with y
/// flipped, since view space has y up and rows grow downward.
pub struct CellRenderer {
    width: usize,
    height: usize,
    view_size: f32,
    char_buffer: Vec<char>,
    color_buffer: Vec<SceneColor>,
}

impl CellRenderer {
    pub fn new(width: usize, height: usize, view_size: f32) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            view_size,
            char_buffer: vec![' '; size],
            color_buffer: vec![SceneColor::WHITE; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(SceneColor::WHITE);
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    fn to_cell(&self, point: ScreenPoint) -> (f32, f32) {
        let sx = self.width as f32 / self.view_size;
        let sy = self.height as f32 / self.view_size;
        (point.x * sx, (self.view_size - point.y) * sy)
    }

    fn plot(&mut self, x: i64, y: i64, character: char, color: SceneColor) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    fn rasterize_triangle(&mut self, v: [(f32, f32); 3], character: char, color: SceneColor) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        // Bounding box, clipped to the grid
        let min_x = v[0].0.min(v[1].0).min(v[2].0).floor().max(0.0) as usize;
        let max_x = v[0].0.max(v[1].0).max(v[2].0).ceil().min(self.width as f32 - 1.0);
        let min_y = v[0].1.min(v[1].1).min(v[2].1).floor().max(0.0) as usize;
        let max_y = v[0].1.max(v[1].1).max(v[2].1).ceil().min(self.height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }

        for y in min_y..=max_y as usize {
            for x in min_x..=max_x as usize {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric(v[0], v[1], v[2], p) else {
                    continue;
                };
                let idx = y * self.width + x;
                // Fills sit underneath anything already drawn
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 && self.char_buffer[idx] == ' ' {
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W, top_row: u16) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, top_row + y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let SceneColor { r, g, b } = self.color_buffer[idx];
                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderSink for CellRenderer {
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: SceneColor) {
        let (x0, y0) = self.to_cell(from);
        let (x1, y1) = self.to_cell(to);
        let x_max = self.width as f32 - 1.0;
        let y_max = self.height as f32 - 1.0;

        let Some(((x0, y0), (x1, y1))) = clip_to_rect((x0, y0), (x1, y1), x_max, y_max) else {
            return;
        };
        let character = line_char(x1 - x0, y1 - y0);

        // Bresenham over the clipped span
        let (mut x, mut y) = (x0.floor() as i64, y0.floor() as i64);
        let (end_x, end_y) = (x1.floor() as i64, y1.floor() as i64);
        let dx = (end_x - x).abs();
        let dy = -(end_y - y).abs();
        let step_x = if x < end_x { 1 } else { -1 };
        let step_y = if y < end_y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x, y, character, color);
            if x == end_x && y == end_y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += step_x;
            }
            if e2 <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    fn fill_quad(&mut self, points: [ScreenPoint; 4], color: SceneColor, alpha: f32) {
        let last = LUMINOSITY_RAMP.len() - 1;
        let level = (alpha.clamp(0.0, 1.0) * last as f32).round() as usize;
        let character = LUMINOSITY_RAMP[level.clamp(1, last)];

        let cells = points.map(|p| self.to_cell(p));
        self.rasterize_triangle([cells[0], cells[1], cells[2]], character, color);
        self.rasterize_triangle([cells[0], cells[2], cells[3]], character, color);
    }

    fn draw_marker(&mut self, point: ScreenPoint, color: SceneColor) {
        let (x, y) = self.to_cell(point);
        if x.is_finite() && y.is_finite() {
            self.plot(x.floor() as i64, y.floor() as i64, MARKER, color);
        }
    }
}

/// Pick a stroke character from a cell-space direction
fn line_char(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ay * 2.0 < ax {
        '-'
    } else if ax * 2.0 < ay {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Liang-Barsky clip of a segment to `[0, x_max] x [0, y_max]`
fn clip_to_rect(
    from: (f32, f32),
    to: (f32, f32),
    x_max: f32,
    y_max: f32,
) -> Option<((f32, f32), (f32, f32))> {
    if x_max < 0.0 || y_max < 0.0 {
        return None;
    }

    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    let bounds = [
        (-dx, from.0),
        (dx, x_max - from.0),
        (-dy, from.1),
        (dy, y_max - from.1),
    ];
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    if !(t0.is_finite() && t1.is_finite()) {
        return None;
    }

    Some((
        (from.0 + t0 * dx, from.1 + t0 * dy),
        (from.0 + t1 * dx, from.1 + t1 * dy),
    ))
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 || !denom.is_finite() {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
