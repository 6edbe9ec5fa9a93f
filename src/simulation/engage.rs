//! EngageOpponent: fire at a visible opponent, possibly killing it
//!
//! Targets are picked uniformly among visible opponents; a hit kills with
//! the configured kill probability.

use rand::Rng;

use crate::core::config::SimulationContext;
use crate::core::error::Result;
use crate::core::types::{SubjectId, TilePosition};
use crate::simulation::behaviour::{Behaviour, BehaviourKind, RunOutcome};
use crate::simulation::events::{apply_subject_death, SimulationEvent};
use crate::simulation::visibility::VisibleSubjects;
use crate::subject::{Subject, Subjects};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementDecision {
    pub kill: bool,
    pub target: SubjectId,
    /// Target position when the decision was taken
    pub target_position: TilePosition,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngageOpponentBehaviour;

impl Behaviour for EngageOpponentBehaviour {
    type Decision = EngagementDecision;

    const KIND: BehaviourKind = BehaviourKind::Engage;

    fn seconds_frequency(&self, ctx: &SimulationContext) -> f64 {
        ctx.config.game.engage.frequency
    }

    fn run<R: Rng + ?Sized>(
        &self,
        _subject: &Subject,
        visible: &VisibleSubjects,
        ctx: &SimulationContext,
        rng: &mut R,
    ) -> Result<RunOutcome<EngagementDecision>> {
        if visible.is_empty() {
            return Ok(RunOutcome::Skip);
        }

        let engage = &ctx.config.game.engage;

        // Stand-in for reload and morale
        if rng.gen::<f64>() < engage.abstain_probability {
            return Ok(RunOutcome::Abstain);
        }

        let target = visible.subjects[rng.gen_range(0..visible.len())];
        let kill = rng.gen::<f64>() < engage.kill_probability;

        Ok(RunOutcome::Decision(EngagementDecision {
            kill,
            target: target.id,
            target_position: target.position,
        }))
    }

    /// Always fires. Kills only if the target is still alive at action time,
    /// since another shooter may have killed it earlier this cycle.
    fn action(
        &self,
        subject_id: SubjectId,
        decision: EngagementDecision,
        subjects: &mut Subjects,
        _ctx: &SimulationContext,
    ) -> Result<Vec<SimulationEvent>> {
        let weapon = subjects.require(subject_id)?.primary_weapon();
        let target_alive = subjects.require(decision.target)?.is_alive();

        let mut events = vec![SimulationEvent::Fire {
            shooter: subject_id,
            target_position: decision.target_position,
            weapon,
        }];

        if decision.kill && target_alive {
            apply_subject_death(subjects, decision.target)?;
            events.push(SimulationEvent::Die {
                shooter: subject_id,
                victim: decision.target,
            });
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GameConfig, RuntimeConfig};
    use crate::core::error::SkirmishError;
    use crate::simulation::behaviour::{decide, evaluate};
    use crate::simulation::visibility::VisibleSubject;
    use crate::subject::{SubjectKind, Weapon};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn visible_of(subjects: &Subjects, ids: &[SubjectId]) -> VisibleSubjects {
        VisibleSubjects::new(
            ids.iter()
                .map(|id| VisibleSubject {
                    id: *id,
                    position: subjects.require(*id).unwrap().position,
                })
                .collect(),
        )
    }

    fn config_with(kill_probability: f64, abstain_probability: f64) -> GameConfig {
        let mut config = GameConfig::default();
        config.game.engage.kill_probability = kill_probability;
        config.game.engage.abstain_probability = abstain_probability;
        config
    }

    #[test]
    fn test_no_visible_opponent_is_noop() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 5.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut subjects = Subjects::new();
        let shooter = subjects.push(Subject::new(SubjectKind::Man)).unwrap();

        let events = evaluate(
            &EngageOpponentBehaviour,
            shooter,
            &mut subjects,
            &VisibleSubjects::default(),
            &ctx,
            &mut rng,
        )
        .unwrap();

        assert!(events.is_empty());
        assert_eq!(
            subjects
                .require(shooter)
                .unwrap()
                .last_execution(BehaviourKind::Engage),
            None
        );
    }

    #[test]
    fn test_certain_kill() {
        let config = config_with(1.0, 0.0);
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut subjects = Subjects::new();
        let shooter = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let target = subjects
            .push(Subject::new(SubjectKind::Man).at(TilePosition::new(4, 2)))
            .unwrap();
        let visible = visible_of(&subjects, &[target]);

        let events = evaluate(
            &EngageOpponentBehaviour,
            shooter,
            &mut subjects,
            &visible,
            &ctx,
            &mut rng,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                SimulationEvent::Fire {
                    shooter,
                    target_position: TilePosition::new(4, 2),
                    weapon: Some(Weapon::Rifle),
                },
                SimulationEvent::Die {
                    shooter,
                    victim: target
                },
            ]
        );
        assert!(!subjects.is_alive(target));
    }

    #[test]
    fn test_never_kill_still_fires() {
        let config = config_with(0.0, 0.0);
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut subjects = Subjects::new();
        let shooter = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let target = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let visible = visible_of(&subjects, &[target]);

        let events = evaluate(
            &EngageOpponentBehaviour,
            shooter,
            &mut subjects,
            &visible,
            &ctx,
            &mut rng,
        )
        .unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SimulationEvent::Fire { .. }));
        assert!(subjects.is_alive(target));
    }

    #[test]
    fn test_already_dead_target_gets_no_die_event() {
        let config = config_with(1.0, 0.0);
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut subjects = Subjects::new();
        let first = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let second = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let target = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let visible = visible_of(&subjects, &[target]);

        // Both decide before either acts, as within one cycle
        let first_decision = decide(
            &EngageOpponentBehaviour,
            first,
            &mut subjects,
            &visible,
            &ctx,
            &mut rng,
        )
        .unwrap()
        .unwrap();
        let second_decision = decide(
            &EngageOpponentBehaviour,
            second,
            &mut subjects,
            &visible,
            &ctx,
            &mut rng,
        )
        .unwrap()
        .unwrap();

        let first_events = EngageOpponentBehaviour
            .action(first, first_decision, &mut subjects, &ctx)
            .unwrap();
        let second_events = EngageOpponentBehaviour
            .action(second, second_decision, &mut subjects, &ctx)
            .unwrap();

        assert_eq!(first_events.len(), 2);
        assert_eq!(second_events.len(), 1);
        assert!(matches!(
            second_events[0],
            SimulationEvent::Fire { shooter, .. } if shooter == second
        ));
        assert!(!subjects.is_alive(target));
    }

    #[test]
    fn test_abstain_advances_timestamp() {
        let config = config_with(1.0, 1.0);
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 7.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut subjects = Subjects::new();
        let shooter = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let target = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let visible = visible_of(&subjects, &[target]);

        let events = evaluate(
            &EngageOpponentBehaviour,
            shooter,
            &mut subjects,
            &visible,
            &ctx,
            &mut rng,
        )
        .unwrap();

        assert!(events.is_empty());
        assert!(subjects.is_alive(target));
        assert_eq!(
            subjects
                .require(shooter)
                .unwrap()
                .last_execution(BehaviourKind::Engage),
            Some(7.0)
        );
    }

    #[test]
    fn test_frequency_gating() {
        let mut config = config_with(0.0, 0.0);
        config.game.engage.frequency = 2.0;
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut subjects = Subjects::new();
        let shooter = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let target = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let visible = visible_of(&subjects, &[target]);

        let first = decide(&EngageOpponentBehaviour, shooter, &mut subjects, &visible, &ctx, &mut rng)
            .unwrap();
        let second = decide(
            &EngageOpponentBehaviour,
            shooter,
            &mut subjects,
            &visible,
            &ctx.at(1.9),
            &mut rng,
        )
        .unwrap();
        let third = decide(
            &EngageOpponentBehaviour,
            shooter,
            &mut subjects,
            &visible,
            &ctx.at(2.0),
            &mut rng,
        )
        .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert!(third.is_some());
    }

    #[test]
    fn test_missing_target_is_a_fault() {
        let config = config_with(1.0, 0.0);
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);

        let mut subjects = Subjects::new();
        let shooter = subjects.push(Subject::new(SubjectKind::Man)).unwrap();
        let ghost = SubjectId::new();

        let result = EngageOpponentBehaviour.action(
            shooter,
            EngagementDecision {
                kill: true,
                target: ghost,
                target_position: TilePosition::default(),
            },
            &mut subjects,
            &ctx,
        );
        assert!(matches!(result, Err(SkirmishError::SubjectNotFound(id)) if id == ghost));
    }

    #[test]
    fn test_kill_rate_follows_configuration() {
        let config = config_with(0.25, 0.0);
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let shooter = Subject::new(SubjectKind::Man);
        let target = SubjectId::new();
        let visible = VisibleSubjects::new(vec![VisibleSubject {
            id: target,
            position: TilePosition::default(),
        }]);

        let trials = 4000;
        let kills = (0..trials)
            .filter(|_| {
                matches!(
                    EngageOpponentBehaviour.run(&shooter, &visible, &ctx, &mut rng),
                    Ok(RunOutcome::Decision(EngagementDecision { kill: true, .. }))
                )
            })
            .count();

        let rate = kills as f64 / trials as f64;
        assert!((0.2..0.3).contains(&rate), "kill rate {}", rate);
    }
}
