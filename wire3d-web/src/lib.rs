/// Wire3D Web - Canvas 2D host for the Wire3D pipeline
///
/// The page owns the animation loop: it forwards `keydown`/`keyup` events to
/// `key_down`/`key_up` and calls `frame` from `requestAnimationFrame`.
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use wire3d_core::{Color, Command, Config, RenderSink, Scene, ScreenPoint, Simulation};

const MARKER_SIZE: f64 = 3.0;

/// Map a `KeyboardEvent.key` value to a command edge
pub fn key_command(key: &str, pressed: bool) -> Option<Command> {
    let command = match (key, pressed) {
        (" ", true) => Command::Fire,
        ("ArrowLeft" | "a", true) => Command::TurnLeftStart,
        ("ArrowLeft" | "a", false) => Command::TurnLeftStop,
        ("ArrowRight" | "d", true) => Command::TurnRightStart,
        ("ArrowRight" | "d", false) => Command::TurnRightStop,
        ("ArrowUp" | "w", true) => Command::MoveForwardStart,
        ("ArrowUp" | "w", false) => Command::MoveForwardStop,
        ("ArrowDown" | "s", true) => Command::MoveBackStart,
        ("ArrowDown" | "s", false) => Command::MoveBackStop,
        _ => return None,
    };
    Some(command)
}

/// Draws into a canvas, stretching the square view over it with y flipped
struct CanvasSink<'a> {
    context: &'a CanvasRenderingContext2d,
    width: f64,
    height: f64,
    view_size: f64,
}

impl CanvasSink<'_> {
    fn to_canvas(&self, point: ScreenPoint) -> (f64, f64) {
        let x = f64::from(point.x) * self.width / self.view_size;
        let y = (self.view_size - f64::from(point.y)) * self.height / self.view_size;
        (x, y)
    }
}

impl RenderSink for CanvasSink<'_> {
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Color) {
        let (x0, y0) = self.to_canvas(from);
        let (x1, y1) = self.to_canvas(to);
        self.context.set_stroke_style_str(&color.to_hex());
        self.context.begin_path();
        self.context.move_to(x0, y0);
        self.context.line_to(x1, y1);
        self.context.stroke();
    }

    fn fill_quad(&mut self, points: [ScreenPoint; 4], color: Color, alpha: f32) {
        let corners = points.map(|p| self.to_canvas(p));
        self.context.set_global_alpha(f64::from(alpha));
        self.context.set_fill_style_str(&color.to_hex());
        self.context.begin_path();
        self.context.move_to(corners[0].0, corners[0].1);
        for &(x, y) in &corners[1..] {
            self.context.line_to(x, y);
        }
        self.context.close_path();
        self.context.fill();
        self.context.set_global_alpha(1.0);
    }

    fn draw_marker(&mut self, point: ScreenPoint, color: Color) {
        let (x, y) = self.to_canvas(point);
        let half = MARKER_SIZE / 2.0;
        self.context.set_fill_style_str(&color.to_hex());
        self.context.fill_rect(x - half, y - half, MARKER_SIZE, MARKER_SIZE);
    }
}

#[wasm_bindgen]
pub struct WebViewer {
    simulation: Simulation,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl WebViewer {
    /// Attach to the canvas with the given element id and load the demo scene
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebViewer, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{}`", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("`{}` is not a canvas", canvas_id)))?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("unexpected context type"))?;

        let seed = window
            .performance()
            .map(|performance| (performance.now() * 1000.0) as u64)
            .unwrap_or(0);
        let config = Config {
            seed,
            ..Config::default()
        };
        let scene = Scene::demo(&config);

        Ok(WebViewer {
            simulation: Simulation::new(config, scene),
            canvas,
            context,
        })
    }

    /// Forward a `keydown`; returns whether the key was consumed
    pub fn key_down(&mut self, key: &str) -> bool {
        self.forward(key, true)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.forward(key, false)
    }

    /// Advance and draw one frame
    pub fn frame(&mut self) {
        let width = f64::from(self.canvas.width());
        let height = f64::from(self.canvas.height());

        self.context.set_fill_style_str("#000000");
        self.context.fill_rect(0.0, 0.0, width, height);

        let mut sink = CanvasSink {
            context: &self.context,
            width,
            height,
            view_size: f64::from(self.simulation.config().view_size),
        };
        self.simulation.frame(&mut sink);
    }

    pub fn projectile_count(&self) -> usize {
        self.simulation.scene().projectile_count()
    }
}

impl WebViewer {
    fn forward(&mut self, key: &str, pressed: bool) -> bool {
        match key_command(key, pressed) {
            Some(command) => {
                self.simulation.queue(command);
                true
            }
            None => false,
        }
    }
}
