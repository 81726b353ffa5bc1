/// Yaw-only camera driven by turn and move rates
use crate::config::Config;
use crate::transform::{heading, negate, rotate, translate, Axis, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Forward,
    Back,
}

/// Camera state.
///
/// `position` is the offset applied to the world, i.e. the negated eye
/// location: the world moves opposite to the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    turn_rate: f32,
    move_rate: f32,
    turn_speed: f32,
    move_speed: f32,
}

impl Camera {
    pub fn new(turn_speed: f32, move_speed: f32) -> Self {
        Self {
            position: Vec3::zeros(),
            yaw: 0.0,
            turn_rate: 0.0,
            move_rate: 0.0,
            turn_speed,
            move_speed,
        }
    }

    pub fn turn_rate(&self) -> f32 {
        self.turn_rate
    }

    pub fn move_rate(&self) -> f32 {
        self.move_rate
    }

    /// Where the viewer stands in the world
    pub fn eye(&self) -> Vec3 {
        negate(self.position)
    }

    pub fn start_turn(&mut self, turn: Turn) {
        self.turn_rate = self.turn_velocity(turn);
    }

    /// Stop turning, unless the rate was since set by the other direction
    pub fn stop_turn(&mut self, turn: Turn) {
        if self.turn_rate == self.turn_velocity(turn) {
            self.turn_rate = 0.0;
        }
    }

    pub fn start_move(&mut self, step: Move) {
        self.move_rate = self.move_velocity(step);
    }

    pub fn stop_move(&mut self, step: Move) {
        if self.move_rate == self.move_velocity(step) {
            self.move_rate = 0.0;
        }
    }

    fn turn_velocity(&self, turn: Turn) -> f32 {
        match turn {
            Turn::Left => self.turn_speed,
            Turn::Right => -self.turn_speed,
        }
    }

    fn move_velocity(&self, step: Move) -> f32 {
        match step {
            Move::Forward => self.move_speed,
            Move::Back => -self.move_speed,
        }
    }

    /// Integrate one frame: turn first, then move along the new heading.
    pub fn tick(&mut self) {
        self.yaw += self.turn_rate;
        let step = heading(self.yaw) * self.move_rate;
        self.position = translate(self.position, negate(step));
    }

    /// World space to view space
    pub fn view(&self, v: Vec3) -> Vec3 {
        rotate(translate(v, self.position), self.yaw, Axis::Y)
    }
}

impl Default for Camera {
    fn default() -> Self {
        let config = Config::default();
        Self::new(config.turn_speed, config.move_speed)
    }
}
