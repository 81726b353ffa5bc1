/// Wire3D Terminal Demo - Walk-through Wireframe Scene
///
/// Renders a scene of boxes, pyramids and a floor grid in the terminal.
/// Controls:
///   - W/S or Up/Down: Move forward/back
///   - A/D or Left/Right: Turn
///   - Space: Fire a projectile
///   - Q/ESC: Quit
use clap::Parser;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use wire3d_core::{load_scene, Config, Scene, SceneFileError, Simulation};
use wire3d_terminal::TerminalApp;

/// Wireframe 3D scene rendered in the terminal
#[derive(Parser, Debug)]
#[command(name = "wire3d-terminal")]
#[command(about = "Wireframe 3D scene rendered in the terminal", long_about = None)]
struct Args {
    /// Scene description file (built-in demo scene when omitted)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for aim jitter (clock-derived when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Projectiles kept alive before the oldest is removed
    #[arg(long, default_value_t = 64)]
    max_projectiles: usize,

    /// Write logs to this file (filter with RUST_LOG, default `info`)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = Config {
        max_projectiles: args.max_projectiles,
        seed: args.seed.unwrap_or_else(clock_seed),
        ..Config::default()
    };

    let scene = match &args.scene {
        Some(path) => {
            println!("Loading scene file: {}", path.display());
            load_scene(path, &config).map_err(scene_error)?
        }
        None => Scene::demo(&config),
    };

    println!("Loaded {} shapes", scene.len());
    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let fps = args.fps;
    let mut app = TerminalApp::new(Simulation::new(config, scene), fps)?;
    app.run()?;

    println!("Thank you for using Wire3D Terminal Renderer!");
    Ok(())
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

fn scene_error(err: SceneFileError) -> io::Error {
    match err {
        SceneFileError::Io(err) => err,
        other => io::Error::new(io::ErrorKind::InvalidData, format!("Failed to parse scene: {}", other)),
    }
}
