//! Per-actor mutable record

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SkirmishError};
use crate::core::types::{SubjectId, TilePosition, Timestamp};
use crate::simulation::behaviour::BehaviourKind;
use crate::subject::kind::{CombatMode, KindCapabilities, Mode, SubjectKind, UserAction, Weapon};
use crate::subject::properties::{Properties, Side, SIDE};

/// Named groups a subject belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Alive,
    Dead,
}

/// One simulated actor (soldier, vehicle)
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: SubjectId,
    pub kind: SubjectKind,
    pub position: TilePosition,
    /// Facing in degrees
    pub direction: f64,
    pub properties: Properties,
    mode: Mode,
    combat_mode: CombatMode,
    collections: Vec<Collection>,
    visible_opponent_ids: Vec<SubjectId>,
    last_execution: AHashMap<BehaviourKind, Timestamp>,
}

impl Subject {
    /// Create a living subject in its kind's default mode
    pub fn new(kind: SubjectKind) -> Self {
        Self {
            id: SubjectId::new(),
            kind,
            position: TilePosition::default(),
            direction: 0.0,
            properties: Properties::new(),
            mode: kind.capabilities().default_mode,
            combat_mode: CombatMode::default(),
            collections: vec![Collection::Alive],
            visible_opponent_ids: Vec::new(),
            last_execution: AHashMap::new(),
        }
    }

    pub fn at(mut self, position: TilePosition) -> Self {
        self.position = position;
        self
    }

    pub fn facing(mut self, direction: f64) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn capabilities(&self) -> &'static KindCapabilities {
        self.kind.capabilities()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Change stance; modes outside the kind's allowed set are rejected
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        let caps = self.capabilities();
        if !caps.allows_mode(mode) {
            return Err(SkirmishError::WrongMode(format!(
                "{:?} has no mode \"{}\" ({})",
                self.kind,
                mode,
                caps.mode_list()
            )));
        }
        self.mode = mode;
        Ok(())
    }

    pub fn set_mode_token(&mut self, token: &str) -> Result<()> {
        let mode = token.parse::<Mode>()?;
        self.set_mode(mode)
    }

    pub fn combat_mode(&self) -> CombatMode {
        self.combat_mode
    }

    pub fn set_combat_mode(&mut self, combat_mode: CombatMode) -> Result<()> {
        if !self.capabilities().allows_combat_mode(combat_mode) {
            return Err(SkirmishError::WrongMode(format!(
                "{:?} has no combat mode \"{}\"",
                self.kind, combat_mode
            )));
        }
        self.combat_mode = combat_mode;
        Ok(())
    }

    pub fn set_combat_mode_token(&mut self, token: &str) -> Result<()> {
        let combat_mode = token.parse::<CombatMode>()?;
        self.set_combat_mode(combat_mode)
    }

    pub fn mode_for_user_action(&self, action: UserAction) -> Mode {
        self.capabilities().mode_for_user_action(action)
    }

    pub fn weapons(&self) -> &'static [Weapon] {
        self.capabilities().weapons
    }

    /// Weapon used for firing (single slot in practice)
    pub fn primary_weapon(&self) -> Option<Weapon> {
        self.weapons().first().copied()
    }

    pub fn side(&self) -> Option<Side> {
        self.properties
            .get(SIDE)
            .and_then(|v| v.as_text())
            .and_then(Side::from_token)
    }

    /// Both sides known and different
    pub fn is_opponent_of(&self, other: &Subject) -> bool {
        match (self.side(), other.side()) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn is_alive(&self) -> bool {
        self.collections.contains(&Collection::Alive)
    }

    /// Move from alive to dead. Returns false if already dead.
    pub fn die(&mut self) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.collections.retain(|c| *c != Collection::Alive);
        self.collections.push(Collection::Dead);
        self.visible_opponent_ids.clear();
        true
    }

    pub fn visible_opponent_ids(&self) -> &[SubjectId] {
        &self.visible_opponent_ids
    }

    pub fn sees(&self, id: SubjectId) -> bool {
        self.visible_opponent_ids.contains(&id)
    }

    /// Record a perceived opponent; duplicates are ignored
    pub fn add_visible_opponent(&mut self, id: SubjectId) {
        if !self.sees(id) {
            self.visible_opponent_ids.push(id);
        }
    }

    pub fn remove_visible_opponent(&mut self, id: SubjectId) {
        self.visible_opponent_ids.retain(|v| *v != id);
    }

    pub fn last_execution(&self, kind: BehaviourKind) -> Option<Timestamp> {
        self.last_execution.get(&kind).copied()
    }

    pub fn set_last_execution(&mut self, kind: BehaviourKind, at: Timestamp) {
        self.last_execution.insert(kind, at);
    }
}
