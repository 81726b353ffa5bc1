/// Terminal host for the Wire3D pipeline: event loop, input and rasterizer
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::info;
use wire3d_core::{FrameStats, Simulation};

pub mod input;
pub mod renderer;

pub use input::{KeyTracker, DEFAULT_HOLD_TIMEOUT};
pub use renderer::CellRenderer;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    simulation: Simulation,
    renderer: CellRenderer,
    keys: KeyTracker,
    release_events: bool,
    frame_time: Duration,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    last_stats: FrameStats,
}

impl TerminalApp {
    pub fn new(simulation: Simulation, target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        // Row 0 is the status line
        let renderer = CellRenderer::new(
            width as usize,
            height.saturating_sub(1) as usize,
            simulation.config().view_size,
        );

        info!(width, height, release_events, target_fps, "Starting terminal host");

        Ok(Self {
            simulation,
            renderer,
            keys: KeyTracker::new(release_events, DEFAULT_HOLD_TIMEOUT),
            release_events,
            frame_time: Duration::from_secs(1) / target_fps.max(1),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            last_stats: FrameStats::default(),
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        if self.release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.main_loop();

        // Cleanup
        if self.release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        info!(frames = self.simulation.frame_count(), "Terminal host stopped");
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Drain input; commands take effect at the start of the next frame
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?, frame_start);
            }
            for stop in self.keys.expire(frame_start) {
                self.simulation.queue(stop);
            }
            if !self.running {
                break;
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) => {
                let mut quit = false;
                if let Some(command) = self.keys.handle(key, now, &mut quit) {
                    self.simulation.queue(command);
                }
                if quit {
                    self.running = false;
                }
            }
            Event::Resize(width, height) => {
                self.renderer = CellRenderer::new(
                    width as usize,
                    height.saturating_sub(1) as usize,
                    self.simulation.config().view_size,
                );
            }
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.last_stats = self.simulation.frame(&mut self.renderer);

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout, 1)?;

        // Draw UI overlay
        let camera = self.simulation.camera();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Wire3D | FPS: {:.1} | yaw {:+.2} | shots {} | lines {} quads {} | \
                 WASD/Arrows=Move Space=Fire Q=Quit",
                self.fps,
                camera.yaw,
                self.simulation.scene().projectile_count(),
                self.last_stats.lines,
                self.last_stats.quads,
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
