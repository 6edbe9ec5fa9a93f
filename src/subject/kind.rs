//! Per-kind capability tables
//!
//! Every subject kind is described by a static [`KindCapabilities`] record:
//! which modes it may take, which weapons it carries, and which firing
//! frames the presentation layer has for it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::SkirmishError;

/// Locomotion stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Default,
    StandUp,
    Crawling,
}

impl Mode {
    pub fn token(&self) -> &'static str {
        match self {
            Mode::Default => "MODE_DEFAULT",
            Mode::StandUp => "MODE_MAN_STAND_UP",
            Mode::Crawling => "MODE_MAN_CRAWLING",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Mode {
    type Err = SkirmishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MODE_DEFAULT" => Ok(Mode::Default),
            "MODE_MAN_STAND_UP" => Ok(Mode::StandUp),
            "MODE_MAN_CRAWLING" => Ok(Mode::Crawling),
            other => Err(SkirmishError::WrongMode(format!("unknown mode {:?}", other))),
        }
    }
}

/// Combat posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatMode {
    #[default]
    Defend,
    Hide,
}

impl CombatMode {
    pub fn token(&self) -> &'static str {
        match self {
            CombatMode::Defend => "COMBAT_MODE_DEFEND",
            CombatMode::Hide => "COMBAT_MODE_HIDE",
        }
    }
}

impl fmt::Display for CombatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CombatMode {
    type Err = SkirmishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMBAT_MODE_DEFEND" => Ok(CombatMode::Defend),
            "COMBAT_MODE_HIDE" => Ok(CombatMode::Hide),
            other => Err(SkirmishError::WrongMode(format!(
                "unknown combat mode {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    Rifle,
}

impl Weapon {
    pub fn token(&self) -> &'static str {
        match self {
            Weapon::Rifle => "RIFLE",
        }
    }
}

/// Orders a player can give that imply a stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    OrderMove,
    OrderMoveFast,
    OrderMoveCrawl,
    OrderFire,
}

/// Firing animation frames for one (mode, weapon) pair
#[derive(Debug)]
pub struct FiringScheme {
    pub mode: Mode,
    pub weapon: Weapon,
    pub frames: &'static [&'static str],
}

/// Data-driven description of a subject kind
#[derive(Debug)]
pub struct KindCapabilities {
    pub modes: &'static [Mode],
    pub default_mode: Mode,
    pub combat_modes: &'static [CombatMode],
    pub weapons: &'static [Weapon],
    pub can_rotate_instant: bool,
    pub user_action_modes: &'static [(UserAction, Mode)],
    pub firing_schemes: &'static [FiringScheme],
}

const MAN_FIRING_FRAMES: &[&str] = &[
    "actors/man_weap1_firing1.png",
    "actors/man_weap1_firing2.png",
    "actors/man_weap1_firing3.png",
];

static MAN: KindCapabilities = KindCapabilities {
    modes: &[Mode::StandUp, Mode::Crawling],
    default_mode: Mode::StandUp,
    combat_modes: &[CombatMode::Defend, CombatMode::Hide],
    weapons: &[Weapon::Rifle],
    can_rotate_instant: true,
    user_action_modes: &[
        (UserAction::OrderMove, Mode::StandUp),
        (UserAction::OrderMoveFast, Mode::StandUp),
        (UserAction::OrderMoveCrawl, Mode::Crawling),
    ],
    firing_schemes: &[
        FiringScheme {
            mode: Mode::StandUp,
            weapon: Weapon::Rifle,
            frames: MAN_FIRING_FRAMES,
        },
        FiringScheme {
            mode: Mode::Crawling,
            weapon: Weapon::Rifle,
            frames: MAN_FIRING_FRAMES,
        },
    ],
};

static HEAVY_VEHICLE: KindCapabilities = KindCapabilities {
    modes: &[Mode::Default],
    default_mode: Mode::Default,
    combat_modes: &[CombatMode::Defend, CombatMode::Hide],
    weapons: &[Weapon::Rifle],
    can_rotate_instant: false,
    user_action_modes: &[],
    firing_schemes: &[],
};

/// Kinds of simulated actors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    Man,
    HeavyVehicle,
}

impl SubjectKind {
    pub fn capabilities(&self) -> &'static KindCapabilities {
        match self {
            SubjectKind::Man => &MAN,
            SubjectKind::HeavyVehicle => &HEAVY_VEHICLE,
        }
    }

    /// Token used in state files
    pub fn token(&self) -> &'static str {
        match self {
            SubjectKind::Man => "Man",
            SubjectKind::HeavyVehicle => "HeavyVehicle",
        }
    }
}

impl FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Man" => Ok(SubjectKind::Man),
            "HeavyVehicle" => Ok(SubjectKind::HeavyVehicle),
            other => Err(format!("unknown subject type {:?}", other)),
        }
    }
}

impl KindCapabilities {
    pub fn allows_mode(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    pub fn allows_combat_mode(&self, combat_mode: CombatMode) -> bool {
        self.combat_modes.contains(&combat_mode)
    }

    /// Stance implied by a user order, falling back to the default mode
    pub fn mode_for_user_action(&self, action: UserAction) -> Mode {
        self.user_action_modes
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, mode)| *mode)
            .unwrap_or(self.default_mode)
    }

    /// Firing frames for a mode and weapon, if the kind has any
    pub fn firing_frames(&self, mode: Mode, weapon: Weapon) -> Option<&'static [&'static str]> {
        self.firing_schemes
            .iter()
            .find(|s| s.mode == mode && s.weapon == weapon)
            .map(|s| s.frames)
            .filter(|frames| !frames.is_empty())
    }

    pub fn mode_list(&self) -> String {
        self.modes
            .iter()
            .map(Mode::token)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
