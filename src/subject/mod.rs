//! Subjects: the simulated actors and the collection that owns them

pub mod actor;
pub mod collection;
pub mod kind;
pub mod properties;

pub use actor::{Collection, Subject};
pub use collection::Subjects;
pub use kind::{CombatMode, KindCapabilities, Mode, SubjectKind, UserAction, Weapon};
pub use properties::{Properties, PropertyValue, Side};
