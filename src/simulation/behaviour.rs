//! Behaviour framework: per-subject decision units with a `run` (decide)
//! phase and an `action` (emit events) phase
//!
//! Gating shared by every behaviour:
//! - placement mode disables the behaviour entirely
//! - only living subjects behave
//! - a behaviour runs again only once its frequency has elapsed since its
//!   last execution, stored on the subject

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationContext;
use crate::core::error::Result;
use crate::core::types::{SubjectId, Timestamp};
use crate::simulation::events::SimulationEvent;
use crate::simulation::visibility::VisibleSubjects;
use crate::subject::{Subject, Subjects};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviourKind {
    LookAround,
    Engage,
}

/// What a `run` phase decided
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<D> {
    /// Nothing to decide; the timestamp is left untouched
    Skip,
    /// Executed but chose not to act; the timestamp advances
    Abstain,
    /// Decision handed to the action phase; the timestamp advances
    Decision(D),
}

pub trait Behaviour {
    type Decision;

    const KIND: BehaviourKind;

    /// Seconds between two eligible runs
    fn seconds_frequency(&self, ctx: &SimulationContext) -> f64;

    /// Decide from this cycle's mechanism output. Must not mutate subjects.
    fn run<R: Rng + ?Sized>(
        &self,
        subject: &Subject,
        visible: &VisibleSubjects,
        ctx: &SimulationContext,
        rng: &mut R,
    ) -> Result<RunOutcome<Self::Decision>>;

    /// Turn a decision into events, mutating subject state as it goes
    fn action(
        &self,
        subject_id: SubjectId,
        decision: Self::Decision,
        subjects: &mut Subjects,
        ctx: &SimulationContext,
    ) -> Result<Vec<SimulationEvent>>;
}

/// A never-run behaviour is always due
pub fn is_due(last_execution: Option<Timestamp>, frequency: f64, now: Timestamp) -> bool {
    match last_execution {
        Some(last) => now - last >= frequency,
        None => true,
    }
}

/// Gated `run` phase. Returns the decision to act on, if any.
pub fn decide<B: Behaviour, R: Rng + ?Sized>(
    behaviour: &B,
    subject_id: SubjectId,
    subjects: &mut Subjects,
    visible: &VisibleSubjects,
    ctx: &SimulationContext,
    rng: &mut R,
) -> Result<Option<B::Decision>> {
    if ctx.placement_mode() {
        return Ok(None);
    }

    let subject = subjects.require(subject_id)?;
    if !subject.is_alive() {
        return Ok(None);
    }

    let frequency = behaviour.seconds_frequency(ctx);
    if !is_due(subject.last_execution(B::KIND), frequency, ctx.now) {
        return Ok(None);
    }

    match behaviour.run(subject, visible, ctx, rng)? {
        RunOutcome::Skip => Ok(None),
        RunOutcome::Abstain => {
            tracing::debug!("{:?} abstained for subject {}", B::KIND, subject_id);
            subjects
                .require_mut(subject_id)?
                .set_last_execution(B::KIND, ctx.now);
            Ok(None)
        }
        RunOutcome::Decision(decision) => {
            subjects
                .require_mut(subject_id)?
                .set_last_execution(B::KIND, ctx.now);
            Ok(Some(decision))
        }
    }
}

/// Gated `run` followed immediately by `action`
pub fn evaluate<B: Behaviour, R: Rng + ?Sized>(
    behaviour: &B,
    subject_id: SubjectId,
    subjects: &mut Subjects,
    visible: &VisibleSubjects,
    ctx: &SimulationContext,
    rng: &mut R,
) -> Result<Vec<SimulationEvent>> {
    match decide(behaviour, subject_id, subjects, visible, ctx, rng)? {
        Some(decision) => behaviour.action(subject_id, decision, subjects, ctx),
        None => Ok(Vec::new()),
    }
}
