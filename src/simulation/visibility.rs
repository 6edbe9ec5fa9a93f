//! Opponent visibility mechanism
//!
//! Computes, per observer and per cycle, which living opponents are in line
//! of sight. Read-only: subject state only changes through behaviours.

use serde::Serialize;

use crate::core::config::SimulationContext;
use crate::core::types::{SubjectId, TilePosition};
use crate::simulation::map::LineOfSight;
use crate::subject::{Subject, Subjects};

/// An opponent perceived this cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisibleSubject {
    pub id: SubjectId,
    pub position: TilePosition,
}

/// Mechanism result for one observer, in subject iteration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisibleSubjects {
    pub subjects: Vec<VisibleSubject>,
}

impl VisibleSubjects {
    pub fn new(subjects: Vec<VisibleSubject>) -> Self {
        Self { subjects }
    }

    pub fn ids(&self) -> Vec<SubjectId> {
        self.subjects.iter().map(|s| s.id).collect()
    }

    pub fn contains(&self, id: SubjectId) -> bool {
        self.subjects.iter().any(|s| s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpponentVisibleMechanism;

impl OpponentVisibleMechanism {
    /// Living opponents of `observer` that it has line of sight to.
    ///
    /// Disabled in placement mode: returns an empty result.
    pub fn run<G: LineOfSight + ?Sized>(
        &self,
        observer: &Subject,
        subjects: &Subjects,
        geometry: &G,
        ctx: &SimulationContext,
    ) -> VisibleSubjects {
        if ctx.placement_mode() {
            return VisibleSubjects::default();
        }

        let visible = subjects
            .iter_alive()
            .filter(|other| other.id != observer.id)
            .filter(|other| observer.is_opponent_of(other))
            .filter(|other| geometry.has_line_of_sight(observer.position, other.position))
            .map(|other| VisibleSubject {
                id: other.id,
                position: other.position,
            })
            .collect();

        VisibleSubjects::new(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GameConfig, RuntimeConfig};
    use crate::simulation::map::{Tile, TileMap};
    use crate::subject::properties::SIDE;
    use crate::subject::SubjectKind;

    fn soldier(side: &str, x: i32, y: i32) -> Subject {
        let mut man = Subject::new(SubjectKind::Man).at(TilePosition::new(x, y));
        man.properties.set(SIDE, side);
        man
    }

    #[test]
    fn test_sees_opponents_only() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let map = TileMap::new(20, 20);

        let mut subjects = Subjects::new();
        let observer = subjects.push(soldier("AXIS", 1, 1)).unwrap();
        let friend = subjects.push(soldier("AXIS", 2, 2)).unwrap();
        let enemy = subjects.push(soldier("ALLIES", 10, 10)).unwrap();

        let result =
            OpponentVisibleMechanism.run(subjects.require(observer).unwrap(), &subjects, &map, &ctx);

        assert_eq!(result.ids(), vec![enemy]);
        assert!(!result.contains(friend));
        assert_eq!(result.subjects[0].position, TilePosition::new(10, 10));
    }

    #[test]
    fn test_obstacle_hides_opponent() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let mut map = TileMap::new(10, 3);
        map.set_tile(TilePosition::new(5, 1), Tile::Obstacle);

        let mut subjects = Subjects::new();
        let observer = subjects.push(soldier("AXIS", 0, 1)).unwrap();
        subjects.push(soldier("ALLIES", 9, 1)).unwrap();

        let result =
            OpponentVisibleMechanism.run(subjects.require(observer).unwrap(), &subjects, &map, &ctx);
        assert!(result.is_empty());
    }

    #[test]
    fn test_dead_opponents_invisible() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig::default();
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let map = TileMap::new(10, 10);

        let mut subjects = Subjects::new();
        let observer = subjects.push(soldier("AXIS", 0, 0)).unwrap();
        let enemy = subjects.push(soldier("ALLIES", 3, 3)).unwrap();
        subjects.apply_death(enemy).unwrap();

        let result =
            OpponentVisibleMechanism.run(subjects.require(observer).unwrap(), &subjects, &map, &ctx);
        assert!(result.is_empty());
    }

    #[test]
    fn test_disabled_in_placement_mode() {
        let config = GameConfig::default();
        let runtime = RuntimeConfig {
            placement_mode: true,
            ..Default::default()
        };
        let ctx = SimulationContext::new(&config, &runtime, 0.0);
        let map = TileMap::new(10, 10);

        let mut subjects = Subjects::new();
        let observer = subjects.push(soldier("AXIS", 0, 0)).unwrap();
        subjects.push(soldier("ALLIES", 3, 3)).unwrap();

        let result =
            OpponentVisibleMechanism.run(subjects.require(observer).unwrap(), &subjects, &map, &ctx);
        assert!(result.is_empty());
    }
}
