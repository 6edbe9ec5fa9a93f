//! Persisted battle state (XML)

pub mod document;
pub mod dumper;
pub mod loader;

pub use dumper::StateDumper;
pub use loader::{State, StateLoader};
