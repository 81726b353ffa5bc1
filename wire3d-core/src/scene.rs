/// Scene container and the per-frame update pipeline
use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::camera::{Camera, Move, Turn};
use crate::config::Config;
use crate::geometry::{Color, Shape};
use crate::projection::{Projector, ScreenPoint};
use crate::render::RenderSink;
use crate::transform::{rotate, rotate_about, translate, Axis, Vec3};

const PROJECTILE_COLOR: Color = Color::ORANGE;

/// Ordered shapes; order is draw and update order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Built-in demo layout: floor grid, a spinning box and some scenery
    pub fn demo(config: &Config) -> Self {
        let floor = config.floor_height();
        let on_floor = |half_height: f32| floor + half_height;

        Self::with_shapes(vec![
            Shape::grid_floor(12, 60.0, floor, Color::GREY),
            Shape::cuboid(60.0, 60.0, Vec3::new(0.0, -50.0, 300.0), Color::CYAN).spinning(),
            Shape::pyramid(80.0, Vec3::new(-160.0, on_floor(40.0), 420.0), Color::YELLOW),
            Shape::cuboid(50.0, 120.0, Vec3::new(180.0, on_floor(60.0), 500.0), Color::GREEN),
            Shape::cuboid(40.0, 40.0, Vec3::new(-60.0, on_floor(20.0), -250.0), Color::MAGENTA),
            Shape::pyramid(50.0, Vec3::new(120.0, 0.0, 220.0), Color::RED).spinning(),
        ])
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn projectile_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.is_projectile()).count()
    }

    /// Remove the earliest-fired projectile, leaving scenery untouched
    pub fn evict_oldest_projectile(&mut self) -> Option<Shape> {
        let index = self.shapes.iter().position(Shape::is_projectile)?;
        Some(self.shapes.remove(index))
    }
}

/// Input edge reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TurnLeftStart,
    TurnLeftStop,
    TurnRightStart,
    TurnRightStop,
    MoveForwardStart,
    MoveForwardStop,
    MoveBackStart,
    MoveBackStop,
    Fire,
}

/// Primitive counts for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub lines: usize,
    pub quads: usize,
    pub markers: usize,
}

/// Ballistic displacement after `age` units of flight along heading `yaw`.
///
/// Falls as `-(age / 2)^3` and advances as `10 * age^2`.
pub fn projectile_offset(age: f32, yaw: f32) -> Vec3 {
    let drop = -(age / 2.0).powi(3);
    let advance = 10.0 * age * age;
    rotate(Vec3::new(0.0, drop, advance), -yaw, Axis::Y)
}

/// Model-space vertices after spin and projectile motion
pub fn world_vertices(shape: &Shape, spin_angle: f32) -> Vec<Vec3> {
    let offset = shape
        .launch()
        .map(|launch| projectile_offset(shape.age(), launch.yaw));

    shape
        .vertices()
        .iter()
        .map(|&v| {
            let v = if shape.spins() {
                rotate_about(v, shape.center(), spin_angle, Axis::Y)
            } else {
                v
            };
            match offset {
                Some(offset) => translate(v, offset),
                None => v,
            }
        })
        .collect()
}

/// Owns everything one frame update reads and writes.
///
/// Hosts queue [`Command`]s between frames; they are applied in order at the
/// start of the next [`Simulation::frame`].
pub struct Simulation {
    config: Config,
    projector: Projector,
    scene: Scene,
    camera: Camera,
    spin_angle: f32,
    commands: VecDeque<Command>,
    rng: SmallRng,
    frame_count: u64,
}

impl Simulation {
    pub fn new(config: Config, scene: Scene) -> Self {
        info!(
            shapes = scene.len(),
            seed = config.seed,
            "Creating simulation"
        );

        Self {
            projector: config.projector(),
            camera: Camera::new(config.turn_speed, config.move_speed),
            rng: SmallRng::seed_from_u64(config.seed),
            scene,
            spin_angle: 0.0,
            commands: VecDeque::new(),
            frame_count: 0,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn queue(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Advance one frame and draw it into `sink`.
    pub fn frame<S: RenderSink>(&mut self, sink: &mut S) -> FrameStats {
        while let Some(command) = self.commands.pop_front() {
            self.apply(command);
        }

        self.camera.tick();
        self.spin_angle += self.config.spin_rate;

        // Next-frame ages are collected here and committed after drawing
        let mut next_ages = Vec::with_capacity(self.scene.len());
        let mut stats = FrameStats::default();

        for shape in &self.scene.shapes {
            let world = world_vertices(shape, self.spin_angle);
            next_ages.push(self.next_age(shape));

            let view: Vec<Vec3> = world.iter().map(|&v| self.camera.view(v)).collect();
            emit_shape(&self.projector, shape, &view, self.config.face_alpha, sink, &mut stats);
        }

        for (shape, next_age) in self.scene.shapes.iter_mut().zip(next_ages) {
            if !shape.is_projectile() {
                continue;
            }
            if next_age == shape.age {
                if !shape.landed {
                    shape.landed = true;
                    debug!(age = shape.age, "Projectile landed");
                }
            } else {
                shape.age = next_age;
            }
        }

        self.frame_count += 1;
        trace!(
            frame = self.frame_count,
            lines = stats.lines,
            quads = stats.quads,
            markers = stats.markers,
            "Frame emitted"
        );

        stats
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::TurnLeftStart => self.camera.start_turn(Turn::Left),
            Command::TurnLeftStop => self.camera.stop_turn(Turn::Left),
            Command::TurnRightStart => self.camera.start_turn(Turn::Right),
            Command::TurnRightStop => self.camera.stop_turn(Turn::Right),
            Command::MoveForwardStart => self.camera.start_move(Move::Forward),
            Command::MoveForwardStop => self.camera.stop_move(Move::Forward),
            Command::MoveBackStart => self.camera.start_move(Move::Back),
            Command::MoveBackStop => self.camera.stop_move(Move::Back),
            Command::Fire => self.fire(),
        }
    }

    /// Append a projectile at the eye, aimed along the camera yaw plus jitter.
    fn fire(&mut self) {
        let capacity = self.config.max_projectiles;
        if capacity == 0 {
            debug!("Firing disabled, ignoring shot");
            return;
        }

        while self.scene.projectile_count() >= capacity {
            if let Some(evicted) = self.scene.evict_oldest_projectile() {
                debug!(age = evicted.age(), "Evicted oldest projectile");
            }
        }

        let jitter = self.config.launch_jitter;
        let aim_error = if jitter > 0.0 {
            self.rng.random_range(-jitter..=jitter)
        } else {
            0.0
        };
        let yaw = self.camera.yaw + aim_error;
        let origin = self.camera.eye();

        debug!(yaw, x = origin.x, z = origin.z, "Fired projectile");
        self.scene.push(Shape::projectile(
            self.config.projectile_size,
            origin,
            yaw,
            PROJECTILE_COLOR,
        ));
    }

    /// A projectile keeps ageing while its centre is above the floor.
    fn next_age(&self, shape: &Shape) -> f32 {
        let Some(launch) = shape.launch() else {
            return shape.age();
        };

        let height = shape.center().y + projectile_offset(shape.age(), launch.yaw).y;
        let rest_height = self.config.floor_height() + shape.half_size();

        if height > rest_height {
            shape.age() + self.config.age_step
        } else {
            shape.age()
        }
    }
}

/// Clip and draw edges, fill fully visible faces, mark visible vertices.
fn emit_shape<S: RenderSink>(
    projector: &Projector,
    shape: &Shape,
    view: &[Vec3],
    face_alpha: f32,
    sink: &mut S,
    stats: &mut FrameStats,
) {
    let color = shape.color();

    for &(i, j) in shape.edges() {
        if let Some((from, to)) = projector.clip_segment(view[i], view[j]) {
            sink.draw_line(from, to, color);
            stats.lines += 1;
        }
    }

    for face in shape.faces() {
        let corners: Option<Vec<ScreenPoint>> =
            face.iter().map(|&i| projector.project(view[i])).collect();
        if let Some(corners) = corners {
            sink.fill_quad([corners[0], corners[1], corners[2], corners[3]], color, face_alpha);
            stats.quads += 1;
        }
    }

    for &v in view {
        if let Some(point) = projector.project(v) {
            sink.draw_marker(point, color);
            stats.markers += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{FrameRecorder, Primitive};
    use crate::transform::heading;
    use approx::assert_relative_eq;

    fn simulation(shapes: Vec<Shape>) -> Simulation {
        Simulation::new(Config::default(), Scene::with_shapes(shapes))
    }

    #[test]
    fn test_projectile_offset_monotonic() {
        let mut previous = projectile_offset(0.0, 0.3);
        assert_eq!(previous, Vec3::zeros());

        for step in 1..40 {
            let age = step as f32 * 0.84;
            let offset = projectile_offset(age, 0.3);
            let forward = offset.dot(&heading(0.3));
            assert!(offset.y < previous.y);
            assert!(forward > previous.dot(&heading(0.3)));
            previous = offset;
        }
    }

    #[test]
    fn test_projectile_offset_follows_yaw() {
        let straight = projectile_offset(2.0, 0.0);
        assert_relative_eq!(straight, Vec3::new(0.0, -1.0, 40.0), epsilon = 1e-5);

        let turned = projectile_offset(2.0, std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(turned, Vec3::new(-40.0, -1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_static_box_in_front_fully_drawn() {
        let mut sim = simulation(vec![Shape::cuboid(
            40.0,
            40.0,
            Vec3::new(0.0, 0.0, 300.0),
            Color::GREEN,
        )]);
        let mut recorder = FrameRecorder::new();
        let stats = sim.frame(&mut recorder);

        assert_eq!(
            stats,
            FrameStats {
                lines: 12,
                quads: 6,
                markers: 8
            }
        );
        assert_eq!(recorder.primitives.len(), 26);
        // Edges, then faces, then vertices
        assert!(matches!(recorder.primitives[0], Primitive::Line { .. }));
        assert!(matches!(recorder.primitives[12], Primitive::Quad { .. }));
        assert!(matches!(recorder.primitives[25], Primitive::Marker { .. }));
    }

    #[test]
    fn test_box_straddling_view_plane() {
        let mut sim = simulation(vec![Shape::cuboid(20.0, 20.0, Vec3::zeros(), Color::RED)]);
        let mut recorder = FrameRecorder::new();
        let stats = sim.frame(&mut recorder);

        // Four edges in front, four crossing, four behind
        assert_eq!(stats.lines, 8);
        // Only the face at z = +10 is wholly in front
        assert_eq!(stats.quads, 1);
        assert_eq!(stats.markers, 4);
        assert!(recorder
            .lines()
            .all(|(a, b)| a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()));
    }

    #[test]
    fn test_box_behind_emits_nothing() {
        let mut sim = simulation(vec![Shape::cuboid(
            20.0,
            20.0,
            Vec3::new(0.0, 0.0, -100.0),
            Color::RED,
        )]);
        let mut recorder = FrameRecorder::new();
        assert_eq!(sim.frame(&mut recorder), FrameStats::default());
        assert!(recorder.primitives.is_empty());
    }

    #[test]
    fn test_spin_accumulates_about_center() {
        let center = Vec3::new(0.0, 0.0, 300.0);
        let mut sim = simulation(vec![Shape::cuboid(40.0, 40.0, center, Color::CYAN).spinning()]);
        let mut recorder = FrameRecorder::new();
        sim.frame(&mut recorder);
        sim.frame(&mut recorder);

        let spin = sim.spin_angle();
        assert_relative_eq!(spin, 2.0 * sim.config().spin_rate);

        let shape = &sim.scene().shapes()[0];
        let world = world_vertices(shape, spin);
        for (moved, model) in world.iter().zip(shape.vertices()) {
            assert_relative_eq!((moved - center).norm(), (model - center).norm(), epsilon = 1e-3);
            assert_relative_eq!(
                *moved,
                rotate_about(*model, center, spin, Axis::Y),
                epsilon = 1e-4
            );
        }
        // Model-space vertices are never rewritten
        assert_eq!(shape.vertices()[0], Vec3::new(-20.0, -20.0, 280.0));
    }

    #[test]
    fn test_commands_apply_at_frame_start() {
        let mut sim = simulation(vec![]);
        sim.queue(Command::TurnLeftStart);
        sim.queue(Command::MoveForwardStart);
        sim.frame(&mut FrameRecorder::new());

        let turn = sim.config().turn_speed;
        assert_relative_eq!(sim.camera().yaw, turn);
        assert_relative_eq!(
            sim.camera().eye(),
            heading(turn) * sim.config().move_speed,
            epsilon = 1e-4
        );

        sim.queue(Command::TurnLeftStop);
        sim.queue(Command::MoveForwardStop);
        sim.frame(&mut FrameRecorder::new());
        assert_relative_eq!(sim.camera().yaw, turn);
        assert_eq!(sim.camera().move_rate(), 0.0);
    }

    #[test]
    fn test_fire_appends_one_projectile() {
        let scenery = Shape::cuboid(40.0, 40.0, Vec3::new(0.0, 0.0, 300.0), Color::GREEN);
        let mut sim = simulation(vec![scenery.clone()]);
        sim.camera_mut().position = Vec3::new(-30.0, 0.0, 15.0);
        sim.camera_mut().yaw = 0.7;

        sim.queue(Command::Fire);
        let mut recorder = FrameRecorder::new();
        sim.frame(&mut recorder);

        let shapes = sim.scene().shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0], scenery);

        let projectile = &shapes[1];
        let launch = projectile.launch().unwrap();
        assert!((launch.yaw - 0.7).abs() <= sim.config().launch_jitter);
        assert_relative_eq!(projectile.center(), Vec3::new(30.0, 0.0, -15.0));

        // Visible in the frame it was fired
        assert!(recorder.primitives.iter().any(|p| matches!(
            p,
            Primitive::Quad { color, .. } if *color == PROJECTILE_COLOR
        )));
    }

    #[test]
    fn test_fire_is_reproducible_per_seed() {
        let fire_once = || {
            let mut sim = simulation(vec![]);
            sim.queue(Command::Fire);
            sim.frame(&mut FrameRecorder::new());
            sim.scene().shapes()[0].launch().unwrap().yaw
        };
        assert_eq!(fire_once(), fire_once());
    }

    #[test]
    fn test_projectile_falls_then_rests() {
        let config = Config::default();
        let mut sim = Simulation::new(config.clone(), Scene::new());
        sim.queue(Command::Fire);

        let mut ages = Vec::new();
        for _ in 0..60 {
            sim.frame(&mut FrameRecorder::new());
            ages.push(sim.scene().shapes()[0].age());
        }

        assert!(ages.windows(2).all(|w| w[1] >= w[0]));
        let projectile = &sim.scene().shapes()[0];
        assert!(projectile.has_landed());
        assert_eq!(ages[58], ages[59]);

        let launch = projectile.launch().unwrap();
        let rest = projectile.center().y + projectile_offset(projectile.age(), launch.yaw).y;
        assert!(rest <= config.floor_height() + projectile.half_size());

        let before = projectile.age() - config.age_step;
        let above = projectile.center().y + projectile_offset(before, launch.yaw).y;
        assert!(above > config.floor_height() + projectile.half_size());
    }

    #[test]
    fn test_frame_leaves_scenery_untouched() {
        let demo = Scene::demo(&Config::default());
        let mut sim = Simulation::new(Config::default(), demo.clone());
        for _ in 0..5 {
            sim.frame(&mut FrameRecorder::new());
        }
        assert_eq!(sim.scene(), &demo);
        assert_eq!(sim.frame_count(), 5);
    }

    #[test]
    fn test_oldest_projectile_evicted() {
        let config = Config {
            max_projectiles: 2,
            launch_jitter: 0.0,
            ..Config::default()
        };
        let scenery = Shape::grid_floor(3, 10.0, config.floor_height(), Color::GREY);
        let mut sim = Simulation::new(config, Scene::with_shapes(vec![scenery]));

        for yaw in [0.0, 1.0, 2.0] {
            sim.camera_mut().yaw = yaw;
            sim.queue(Command::Fire);
            sim.frame(&mut FrameRecorder::new());
        }

        let shapes = sim.scene().shapes();
        assert_eq!(shapes.len(), 3);
        assert!(!shapes[0].is_projectile());
        assert_eq!(sim.scene().projectile_count(), 2);
        let yaws: Vec<f32> = shapes[1..].iter().map(|s| s.launch().unwrap().yaw).collect();
        assert_eq!(yaws, vec![1.0, 2.0]);
    }

    #[test]
    fn test_zero_capacity_disables_fire() {
        let config = Config {
            max_projectiles: 0,
            ..Config::default()
        };
        let mut sim = Simulation::new(config, Scene::new());
        sim.queue(Command::Fire);
        sim.frame(&mut FrameRecorder::new());
        assert!(sim.scene().is_empty());
    }

    #[test]
    fn test_demo_scene_layout() {
        let scene = Scene::demo(&Config::default());
        assert!(scene.shapes()[0].faces().is_empty());
        assert!(scene.shapes().iter().any(Shape::spins));
        assert_eq!(scene.projectile_count(), 0);
        assert!(scene.shapes().iter().all(|s| s.validate().is_ok()));
    }
}
