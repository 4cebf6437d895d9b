//! # Game Module
//!
//! The tick-driven simulation and the snapshot it produces.
//!
//! This module contains the building blocks of a Bastion run:
//! - Castle, economy and turret management
//! - Enemy registry, wave scheduling and typing combat
//! - Lane hazards and scripted mini-events
//! - Analytics aggregation and the read-only `GameState` snapshot

pub mod analytics;
pub mod autotype;
pub mod castle;
pub mod economy;
pub mod enemies;
pub mod engine;
pub mod events;
pub mod hazards;
pub mod state;
pub mod turrets;
pub mod tutorial;
pub mod typing;
pub mod waves;

pub use analytics::*;
pub use autotype::*;
pub use castle::*;
pub use economy::*;
pub use enemies::*;
pub use engine::*;
pub use events::*;
pub use hazards::*;
pub use state::*;
pub use turrets::*;
pub use tutorial::*;
pub use typing::*;
pub use waves::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a run.
pub type RunId = Uuid;

/// Creates a new unique run ID.
pub fn new_run_id() -> RunId {
    Uuid::new_v4()
}

/// Index of a lane, `0..config.lanes`.
pub type LaneIndex = usize;

/// Identifier of an enemy within a run.
///
/// Ids are handed out sequentially, so ordering by id is ordering by spawn time.
/// Targeting uses that as its stable tie-breaker.
///
/// # Examples
///
/// ```
/// use bastion::EnemyId;
///
/// assert!(EnemyId(3) < EnemyId(7));
/// assert_eq!(EnemyId(3).to_string(), "enemy-3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyId(pub u64);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy-{}", self.0)
    }
}

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Run created, waiting for the start command
    Menu,
    /// Simulation advancing
    Playing,
    /// All countdowns frozen
    Paused,
    /// Final campaign wave cleared
    Victory,
    /// Castle destroyed
    Defeat,
}

impl GameStatus {
    /// Whether the run has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Victory | GameStatus::Defeat)
    }

    /// Lowercase name as used in the snapshot.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Menu => "menu",
            GameStatus::Playing => "playing",
            GameStatus::Paused => "paused",
            GameStatus::Victory => "victory",
            GameStatus::Defeat => "defeat",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign runs end after the final wave; practice runs loop and never touch
/// campaign progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Campaign,
    Practice,
}

/// How a turret picks among enemies in its lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetingPriority {
    /// Closest to the castle
    #[default]
    First,
    /// Highest current health
    Strongest,
    /// Lowest current health
    Weakest,
}

impl TargetingPriority {
    /// Returns all priorities in HUD display order.
    pub fn all() -> [TargetingPriority; 3] {
        [
            TargetingPriority::First,
            TargetingPriority::Strongest,
            TargetingPriority::Weakest,
        ]
    }
}

/// Modifier attached to an enemy instance beyond its base tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Affix {
    /// Flat reduction applied to turret damage reaching health (minimum 1)
    Armored { reduction: f64 },
    /// Multiplies movement speed
    Swift { speed_multiplier: f64 },
    /// Heals while alive
    Regenerating { per_second: f64 },
    /// Spawns with a shield that blocks typed damage
    Shielded { amount: f64 },
}

impl Affix {
    /// Stable identifier used by the HUD.
    pub fn id(&self) -> &'static str {
        match self {
            Affix::Armored { .. } => "armored",
            Affix::Swift { .. } => "swift",
            Affix::Regenerating { .. } => "regenerating",
            Affix::Shielded { .. } => "shielded",
        }
    }

    /// Whether this affix grants a shield.
    pub fn is_shield(&self) -> bool {
        matches!(self, Affix::Shielded { .. })
    }
}
