//! Simulation events and the per-cycle event pipeline
//!
//! Behaviours emit events during their action phase; the pipeline hands each
//! one, in emission order, exactly once to every listener and then drops it.

use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::{Cycle, SubjectId, TilePosition, Timestamp};
use crate::simulation::firing::WeaponFired;
use crate::subject::{Subjects, Weapon};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SimulationEvent {
    NewVisibleOpponent {
        observer: SubjectId,
        observed: SubjectId,
    },
    NoLongerVisibleOpponent {
        observer: SubjectId,
        observed: SubjectId,
    },
    Fire {
        shooter: SubjectId,
        target_position: TilePosition,
        weapon: Option<Weapon>,
    },
    Die {
        shooter: SubjectId,
        victim: SubjectId,
    },
}

impl SimulationEvent {
    /// Subject whose behaviour emitted the event
    pub fn actor(&self) -> SubjectId {
        match self {
            SimulationEvent::NewVisibleOpponent { observer, .. }
            | SimulationEvent::NoLongerVisibleOpponent { observer, .. } => *observer,
            SimulationEvent::Fire { shooter, .. } | SimulationEvent::Die { shooter, .. } => {
                *shooter
            }
        }
    }
}

/// Kill a subject on behalf of a Die event.
///
/// Idempotent: returns false when the victim was already dead.
pub fn apply_subject_death(subjects: &mut Subjects, victim: SubjectId) -> Result<bool> {
    let died = subjects.apply_death(victim)?;
    if died {
        tracing::debug!("Subject {} died", victim);
    }
    Ok(died)
}

/// Presentation-side consumer of committed events
pub trait EventListener {
    fn on_event(&mut self, cycle: Cycle, at: Timestamp, event: &SimulationEvent);
}

/// Event as committed during a given cycle
#[derive(Debug, Clone, Serialize)]
pub struct LoggedEvent {
    pub cycle: Cycle,
    pub at: Timestamp,
    pub event: SimulationEvent,
}

/// Everything committed during one cycle
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    pub events: Vec<LoggedEvent>,
    pub weapon_fired: Vec<WeaponFired>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationEvent> {
        self.events.iter().map(|e| &e.event)
    }
}

/// Ordered queue of events awaiting dispatch
#[derive(Default)]
pub struct EventPipeline {
    pending: Vec<SimulationEvent>,
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn push(&mut self, events: impl IntoIterator<Item = SimulationEvent>) {
        self.pending.extend(events);
    }

    pub fn pending(&self) -> &[SimulationEvent] {
        &self.pending
    }

    /// Dispatch every pending event once, in order, then clear the queue
    pub fn commit(&mut self, cycle: Cycle, at: Timestamp) -> EventLog {
        let mut log = EventLog::new();

        for event in self.pending.drain(..) {
            tracing::debug!("cycle {}: {:?}", cycle, event);

            for listener in self.listeners.iter_mut() {
                listener.on_event(cycle, at, &event);
            }
            if let Some(fired) = WeaponFired::from_event(&event, at) {
                log.weapon_fired.push(fired);
            }
            log.events.push(LoggedEvent { cycle, at, event });
        }

        log
    }
}

impl std::fmt::Debug for EventPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPipeline")
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
