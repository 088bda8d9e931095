pub mod config;
pub mod objects;
pub mod patch;
pub mod state;
pub mod surfaces;
pub mod trajectory;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{CrateConfig, FigureConfig, LotConfig, ObstacleConfig, RoadConfig, SceneConfig, ScatterConfig, VehicleConfig, WorldConfig};
pub use objects::{Crate, Obstacle, Vehicle};
pub use patch::{Patch, Renderable, Rgba, Scale, Shape, Style};
pub use state::SimulatorState;
pub use surfaces::{Lot, Road};
pub use trajectory::{Pose, Trajectory};
pub use vecmath::{Vec2, angle_to_vec, vec_to_angle};
