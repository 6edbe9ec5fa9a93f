//! Cycle execution
//!
//! One cycle runs to completion before the next starts:
//! visibility for every living subject -> every behaviour's run phase ->
//! every action phase, serially in subject order -> event commit.

use std::time::Instant;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::config::SimulationContext;
use crate::core::error::Result;
use crate::core::types::{Cycle, SubjectId, Timestamp};
use crate::simulation::behaviour::{decide, Behaviour, BehaviourKind};
use crate::simulation::engage::{EngageOpponentBehaviour, EngagementDecision};
use crate::simulation::events::{EventListener, EventLog, EventPipeline, SimulationEvent};
use crate::simulation::look_around::{LookAroundBehaviour, VisibilityDiff};
use crate::simulation::map::LineOfSight;
use crate::simulation::visibility::{OpponentVisibleMechanism, VisibleSubjects};
use crate::subject::Subjects;

/// Wall clock measured from simulation start
#[derive(Debug, Clone, Copy)]
pub struct SimulationClock {
    start: Instant,
}

impl SimulationClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.start.elapsed().as_secs_f64()
    }
}

/// Decision waiting for the action phase
#[derive(Debug, Clone)]
enum PendingDecision {
    LookAround(VisibilityDiff),
    Engage(EngagementDecision),
}

impl PendingDecision {
    fn kind(&self) -> BehaviourKind {
        match self {
            PendingDecision::LookAround(_) => BehaviourKind::LookAround,
            PendingDecision::Engage(_) => BehaviourKind::Engage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CyclePhase {
    Run,
    Action,
}

/// A subject whose contribution to a cycle was dropped
#[derive(Debug, Clone, Serialize)]
pub struct SubjectFailure {
    pub subject: SubjectId,
    pub behaviour: BehaviourKind,
    pub phase: CyclePhase,
    pub error: String,
}

/// Outcome of one cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: Cycle,
    pub at: Timestamp,
    pub log: EventLog,
    pub failures: Vec<SubjectFailure>,
    pub alive: usize,
}

impl CycleReport {
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.log.iter().cloned().collect()
    }
}

/// Owns the subjects, the geometry and the random source of a battle
pub struct Simulation {
    pub map_name: String,
    pub subjects: Subjects,
    geometry: Box<dyn LineOfSight>,
    rng: ChaCha8Rng,
    cycle: Cycle,
    pipeline: EventPipeline,
    visibility: OpponentVisibleMechanism,
    look_around: LookAroundBehaviour,
    engage: EngageOpponentBehaviour,
}

impl Simulation {
    /// Same seed, same subjects, same clock readings: same battle
    pub fn new(
        map_name: impl Into<String>,
        geometry: impl LineOfSight + 'static,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            map_name: map_name.into(),
            subjects: Subjects::new(),
            geometry: Box::new(geometry),
            rng,
            cycle: 0,
            pipeline: EventPipeline::new(),
            visibility: OpponentVisibleMechanism,
            look_around: LookAroundBehaviour,
            engage: EngageOpponentBehaviour,
        }
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn geometry(&self) -> &dyn LineOfSight {
        self.geometry.as_ref()
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.pipeline.add_listener(listener);
    }

    /// Mechanism output for one observer at this instant
    pub fn visible_subjects(
        &self,
        observer: SubjectId,
        ctx: &SimulationContext,
    ) -> Result<VisibleSubjects> {
        let observer = self.subjects.require(observer)?;
        Ok(self
            .visibility
            .run(observer, &self.subjects, self.geometry.as_ref(), ctx))
    }

    /// Run one full cycle at `ctx.now`
    pub fn run_cycle(&mut self, ctx: &SimulationContext) -> CycleReport {
        let mut failures = Vec::new();

        let pending = self.decide_all(ctx, &mut failures);
        self.act(pending, ctx, &mut failures);

        let log = self.pipeline.commit(self.cycle, ctx.now);
        let report = CycleReport {
            cycle: self.cycle,
            at: ctx.now,
            log,
            failures,
            alive: self.subjects.alive_count(),
        };
        self.cycle += 1;
        report
    }

    /// Visibility and run phases for every subject alive at cycle start
    fn decide_all(
        &mut self,
        ctx: &SimulationContext,
        failures: &mut Vec<SubjectFailure>,
    ) -> Vec<(SubjectId, PendingDecision)> {
        let ids = self.subjects.alive_ids();

        let mut visible: AHashMap<SubjectId, VisibleSubjects> = AHashMap::with_capacity(ids.len());
        for id in &ids {
            if let Some(observer) = self.subjects.get(*id) {
                let seen = self
                    .visibility
                    .run(observer, &self.subjects, self.geometry.as_ref(), ctx);
                visible.insert(*id, seen);
            }
        }

        let empty = VisibleSubjects::default();
        let mut pending = Vec::new();
        for id in &ids {
            let seen = visible.get(id).unwrap_or(&empty);

            match decide(&self.look_around, *id, &mut self.subjects, seen, ctx, &mut self.rng) {
                Ok(Some(diff)) => pending.push((*id, PendingDecision::LookAround(diff))),
                Ok(None) => {}
                Err(e) => failures.push(failure(*id, LookAroundBehaviour::KIND, CyclePhase::Run, e)),
            }

            match decide(&self.engage, *id, &mut self.subjects, seen, ctx, &mut self.rng) {
                Ok(Some(decision)) => pending.push((*id, PendingDecision::Engage(decision))),
                Ok(None) => {}
                Err(e) => failures.push(failure(*id, EngageOpponentBehaviour::KIND, CyclePhase::Run, e)),
            }
        }

        pending
    }

    /// Action phase, serially in decision order. Every decision is acted
    /// upon, including those of subjects killed earlier in this phase.
    fn act(
        &mut self,
        pending: Vec<(SubjectId, PendingDecision)>,
        ctx: &SimulationContext,
        failures: &mut Vec<SubjectFailure>,
    ) {
        for (id, decision) in pending {
            let kind = decision.kind();
            let result = match decision {
                PendingDecision::LookAround(diff) => {
                    self.look_around.action(id, diff, &mut self.subjects, ctx)
                }
                PendingDecision::Engage(decision) => {
                    self.engage.action(id, decision, &mut self.subjects, ctx)
                }
            };

            match result {
                Ok(events) => self.pipeline.push(events),
                Err(e) => failures.push(failure(id, kind, CyclePhase::Action, e)),
            }
        }
    }
}

fn failure(
    subject: SubjectId,
    behaviour: BehaviourKind,
    phase: CyclePhase,
    error: crate::core::error::SkirmishError,
) -> SubjectFailure {
    tracing::warn!(
        "{:?} {:?} phase failed for subject {}: {}",
        behaviour,
        phase,
        subject,
        error
    );
    SubjectFailure {
        subject,
        behaviour,
        phase,
        error: error.to_string(),
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("map_name", &self.map_name)
            .field("subjects", &self.subjects.len())
            .field("cycle", &self.cycle)
            .finish()
    }
}
