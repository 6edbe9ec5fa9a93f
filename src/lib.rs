//! Skirmish - tile-based tactical combat simulation core
//!
//! Subjects observe opponents and engage them inside discrete cycles; every
//! state change flows through ordered simulation events.

pub mod core;
pub mod simulation;
pub mod state;
pub mod subject;
