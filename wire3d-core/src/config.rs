/// Tunable constants for projection, animation and input integration
use crate::projection::Projector;

/// Simulation configuration.
///
/// Rates are per frame, angles are radians, distances are scene units.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Width and height of the square view the projector maps into
    pub view_size: f32,
    /// Depth at which one scene unit projects to one view unit
    pub projection_scale: f32,
    /// Depth substituted for an exact `z == 0`
    pub depth_epsilon: f32,
    /// Spin added to the shared spin angle every frame
    pub spin_rate: f32,
    pub turn_speed: f32,
    pub move_speed: f32,
    /// Simulated time a falling projectile ages per frame
    pub age_step: f32,
    /// Half-width of the uniform aim jitter applied to shots
    pub launch_jitter: f32,
    /// Edge length of a fired projectile
    pub projectile_size: f32,
    /// Opacity passed to the sink for filled faces
    pub face_alpha: f32,
    /// Upper bound on live projectiles; the oldest is evicted beyond it
    pub max_projectiles: usize,
    pub seed: u64,
}

impl Config {
    pub fn half_view_size(&self) -> f32 {
        self.view_size / 2.0
    }

    /// Height of the ground plane
    pub fn floor_height(&self) -> f32 {
        -self.half_view_size()
    }

    pub fn projector(&self) -> Projector {
        Projector::new(self.projection_scale, self.half_view_size(), self.depth_epsilon)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view_size: 400.0,
            projection_scale: 400.0,
            depth_epsilon: 1e-6,
            spin_rate: 0.02,
            turn_speed: 0.05,
            move_speed: 6.0,
            age_step: 0.84,
            launch_jitter: 0.25,
            projectile_size: 10.0,
            face_alpha: 0.35,
            max_projectiles: 64,
            seed: 0,
        }
    }
}
