/// Wire3D Core Library - Geometry and projection pipeline
///
/// This library provides the host-independent core of the renderer: vector
/// transforms, perspective projection with near-plane clipping, shape meshes,
/// the yaw camera and the per-frame scene update that emits 2D primitives.

pub mod camera;
pub mod config;
pub mod geometry;
pub mod projection;
pub mod render;
pub mod scene;
pub mod scene_file;
pub mod transform;

// Re-export commonly used types
pub use camera::{Camera, Move, Turn};
pub use config::Config;
pub use geometry::{Color, Launch, Shape, ShapeError};
pub use projection::{Projector, ScreenPoint};
pub use render::{FrameRecorder, Primitive, RenderSink};
pub use scene::{Command, FrameStats, Scene, Simulation};
pub use scene_file::{load_scene, parse_scene, SceneFileError};
pub use transform::{Axis, Vec3};
