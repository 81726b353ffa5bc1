/// Example: Step a scene without a terminal and print primitive counts
///
/// Usage: cargo run --example headless -- [path/to/scene.txt] [frames]
use std::env;
use std::io;
use wire3d_core::{load_scene, Command, Config, FrameRecorder, Scene, Simulation};

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = Config::default();

    let scene = match args.get(1) {
        Some(path) => load_scene(path, &config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?,
        None => Scene::demo(&config),
    };
    let frames: usize = args.get(2).and_then(|n| n.parse().ok()).unwrap_or(120);

    let mut simulation = Simulation::new(config, scene);
    let mut recorder = FrameRecorder::new();

    simulation.queue(Command::MoveForwardStart);
    for frame in 0..frames {
        if frame % 30 == 0 {
            simulation.queue(Command::Fire);
        }
        if frame == frames / 2 {
            simulation.queue(Command::MoveForwardStop);
            simulation.queue(Command::TurnLeftStart);
        }

        recorder.clear();
        let stats = simulation.frame(&mut recorder);
        if frame % 10 == 0 {
            println!(
                "frame {:4}: {:3} lines {:3} quads {:3} markers, {} projectiles",
                frame,
                stats.lines,
                stats.quads,
                stats.markers,
                simulation.scene().projectile_count()
            );
        }
    }

    Ok(())
}
