pub mod config;
pub mod flowers;
pub mod slip;
pub mod world;

pub use config::{SimConfig, DEFAULT_SIM_CONFIG};
pub use world::{Pose, SimWorld};
