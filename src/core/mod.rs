pub mod config;
pub mod error;
pub mod types;

pub use config::{GameConfig, RuntimeConfig, SimulationContext};
pub use error::{Result, SkirmishError, StateLoadError};
pub use types::{Cycle, Rgb, SubjectId, TilePosition, Timestamp};
