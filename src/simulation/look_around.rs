//! LookAround: reconcile what a subject knows it sees with what the
//! visibility mechanism reports this cycle

use rand::Rng;

use crate::core::config::SimulationContext;
use crate::core::error::Result;
use crate::core::types::SubjectId;
use crate::simulation::behaviour::{Behaviour, BehaviourKind, RunOutcome};
use crate::simulation::events::SimulationEvent;
use crate::simulation::visibility::VisibleSubjects;
use crate::subject::{Subject, Subjects};

/// Diff between stored and currently visible opponents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityDiff {
    pub new_visible: Vec<SubjectId>,
    pub no_longer_visible: Vec<SubjectId>,
}

impl VisibilityDiff {
    pub fn is_empty(&self) -> bool {
        self.new_visible.is_empty() && self.no_longer_visible.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LookAroundBehaviour;

impl Behaviour for LookAroundBehaviour {
    type Decision = VisibilityDiff;

    const KIND: BehaviourKind = BehaviourKind::LookAround;

    fn seconds_frequency(&self, ctx: &SimulationContext) -> f64 {
        ctx.config.game.look_around.frequency
    }

    /// Always decides when eligible, even with an empty diff
    fn run<R: Rng + ?Sized>(
        &self,
        subject: &Subject,
        visible: &VisibleSubjects,
        _ctx: &SimulationContext,
        _rng: &mut R,
    ) -> Result<RunOutcome<VisibilityDiff>> {
        let no_longer_visible = subject
            .visible_opponent_ids()
            .iter()
            .copied()
            .filter(|id| !visible.contains(*id))
            .collect();

        let new_visible = visible
            .subjects
            .iter()
            .map(|s| s.id)
            .filter(|id| !subject.sees(*id))
            .collect();

        Ok(RunOutcome::Decision(VisibilityDiff {
            new_visible,
            no_longer_visible,
        }))
    }

    /// Emits new-visible events first, then no-longer-visible ones
    fn action(
        &self,
        subject_id: SubjectId,
        diff: VisibilityDiff,
        subjects: &mut Subjects,
        _ctx: &SimulationContext,
    ) -> Result<Vec<SimulationEvent>> {
        let subject = subjects.require_mut(subject_id)?;
        let mut new_visible_events = Vec::with_capacity(diff.new_visible.len());
        let mut no_longer_visible_events = Vec::with_capacity(diff.no_longer_visible.len());

        for observed in diff.no_longer_visible {
            no_longer_visible_events.push(SimulationEvent::NoLongerVisibleOpponent {
                observer: subject_id,
                observed,
            });
            subject.remove_visible_opponent(observed);
        }

        for observed in diff.new_visible {
            new_visible_events.push(SimulationEvent::NewVisibleOpponent {
                observer: subject_id,
                observed,
            });
            subject.add_visible_opponent(observed);
        }

        new_visible_events.extend(no_longer_visible_events);
        Ok(new_visible_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GameConfig, RuntimeConfig};
    use crate::core::types::TilePosition;
    use crate::simulation::behaviour::evaluate;
    use crate::simulation::visibility::VisibleSubject;
    use crate::subject::SubjectKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn visible(ids: &[SubjectId]) -> VisibleSubjects {
        VisibleSubjects::new(
            ids.iter()
                .map(|id| VisibleSubject {
                    id: *id,
                    position: TilePosition::default(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_diff_against_stored_ids() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let (a, b, c) = (SubjectId::new(), SubjectId::new(), SubjectId::new());
        let mut observer = Subject::new(SubjectKind::Man);
        observer.add_visible_opponent(a);
        observer.add_visible_opponent(b);

        let outcome = LookAroundBehaviour
            .run(&observer, &visible(&[b, c]), &ctx, &mut rng)
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Decision(VisibilityDiff {
                new_visible: vec![c],
                no_longer_visible: vec![a],
            })
        );
    }

    #[test]
    fn test_new_visible_events_come_first() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let (a, b, c) = (SubjectId::new(), SubjectId::new(), SubjectId::new());
        let mut subjects = Subjects::new();
        let mut observer = Subject::new(SubjectKind::Man);
        observer.add_visible_opponent(a);
        observer.add_visible_opponent(b);
        let observer = subjects.push(observer).unwrap();

        let events = evaluate(
            &LookAroundBehaviour,
            observer,
            &mut subjects,
            &visible(&[b, c]),
            &ctx,
            &mut rng,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                SimulationEvent::NewVisibleOpponent {
                    observer,
                    observed: c
                },
                SimulationEvent::NoLongerVisibleOpponent {
                    observer,
                    observed: a
                },
            ]
        );

        let mut stored = subjects.require(observer).unwrap().visible_opponent_ids().to_vec();
        stored.sort_by_key(|id| id.0);
        let mut expected = vec![b, c];
        expected.sort_by_key(|id| id.0);
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_unchanged_visibility_emits_nothing_but_runs() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 4.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let a = SubjectId::new();
        let mut subjects = Subjects::new();
        let mut observer = Subject::new(SubjectKind::Man);
        observer.add_visible_opponent(a);
        let observer = subjects.push(observer).unwrap();

        let events = evaluate(
            &LookAroundBehaviour,
            observer,
            &mut subjects,
            &visible(&[a]),
            &ctx,
            &mut rng,
        )
        .unwrap();

        assert!(events.is_empty());
        assert_eq!(
            subjects
                .require(observer)
                .unwrap()
                .last_execution(BehaviourKind::LookAround),
            Some(4.0)
        );
    }

    #[test]
    fn test_frequency_gating() {
        let mut config = GameConfig::default();
        config.game.look_around.frequency = 1.0;
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let enemy = SubjectId::new();
        let mut subjects = Subjects::new();
        let observer = subjects.push(Subject::new(SubjectKind::Man)).unwrap();

        let first = evaluate(
            &LookAroundBehaviour,
            observer,
            &mut subjects,
            &visible(&[enemy]),
            &ctx,
            &mut rng,
        )
        .unwrap();
        assert_eq!(first.len(), 1);

        // Opponent vanished, but the frequency has not elapsed
        let second = evaluate(
            &LookAroundBehaviour,
            observer,
            &mut subjects,
            &visible(&[]),
            &ctx.at(10.5),
            &mut rng,
        )
        .unwrap();
        assert!(second.is_empty());
        assert!(subjects.require(observer).unwrap().sees(enemy));

        let third = evaluate(
            &LookAroundBehaviour,
            observer,
            &mut subjects,
            &visible(&[]),
            &ctx.at(11.0),
            &mut rng,
        )
        .unwrap();
        assert_eq!(
            third,
            vec![SimulationEvent::NoLongerVisibleOpponent {
                observer,
                observed: enemy
            }]
        );
    }

    #[test]
    fn test_disabled_in_placement_mode() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig {
            placement_mode: true,
            ..Default::default()
        };
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut subjects = Subjects::new();
        let observer = subjects.push(Subject::new(SubjectKind::Man)).unwrap();

        let events = evaluate(
            &LookAroundBehaviour,
            observer,
            &mut subjects,
            &visible(&[SubjectId::new()]),
            &ctx,
            &mut rng,
        )
        .unwrap();
        assert!(events.is_empty());
        assert_eq!(
            subjects
                .require(observer)
                .unwrap()
                .last_execution(BehaviourKind::LookAround),
            None
        );
    }
}
