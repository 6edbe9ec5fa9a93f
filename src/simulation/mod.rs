pub mod behaviour;
pub mod cycle;
pub mod engage;
pub mod events;
pub mod firing;
pub mod look_around;
pub mod map;
pub mod visibility;

pub use behaviour::{decide, evaluate, is_due, Behaviour, BehaviourKind, RunOutcome};
pub use cycle::{CyclePhase, CycleReport, Simulation, SimulationClock, SubjectFailure};
pub use engage::{EngageOpponentBehaviour, EngagementDecision};
pub use events::{
    apply_subject_death, EventListener, EventLog, EventPipeline, LoggedEvent, SimulationEvent,
};
pub use firing::{FiringAnimation, WeaponFired, FIRING_FRAME_GAP};
pub use look_around::{LookAroundBehaviour, VisibilityDiff};
pub use map::{LineOfSight, Tile, TileMap, MAP_FILE_NAME};
pub use visibility::{OpponentVisibleMechanism, VisibleSubject, VisibleSubjects};
