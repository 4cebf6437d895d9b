//! # Game State Snapshot
//!
//! The read-only view of a run the HUD renders from.
//!
//! A `GameState` is assembled once at the end of every tick from the engine's
//! subsystems. It is a plain value: the HUD can keep it, diff it or serialize
//! it, and nothing it does to its copy reaches the engine. Field names
//! serialize in camelCase to match the browser HUD.

use crate::game::{
    Affix, EnemyId, GameMode, GameStatus, GoldEvent, HazardKind, LaneIndex, RunId,
    TargetingPriority,
};
use crate::BastionResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Complete snapshot of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub run_id: RunId,
    pub status: GameStatus,
    pub mode: GameMode,
    /// Simulated seconds since the run was created
    pub time: f64,
    pub castle: CastleState,
    pub resources: ResourceState,
    pub typing: TypingState,
    pub enemies: Vec<EnemyState>,
    pub turrets: Vec<TurretSlotState>,
    pub wave: WaveState,
    pub lane_hazards: Vec<LaneHazardState>,
    pub evacuation: EvacuationState,
    pub support_boost: SupportBoostState,
    pub analytics: AnalyticsState,
    pub tutorial: TutorialState,
}

impl GameState {
    /// Looks up an enemy by id.
    pub fn enemy(&self, id: EnemyId) -> Option<&EnemyState> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    /// Looks up a turret slot by id.
    pub fn slot(&self, id: &str) -> Option<&TurretSlotState> {
        self.turrets.iter().find(|slot| slot.id == id)
    }

    /// Turret placed in a slot, if any.
    pub fn turret(&self, slot_id: &str) -> Option<&TurretState> {
        self.slot(slot_id).and_then(|slot| slot.turret.as_ref())
    }

    /// Active hazard on a lane, if any.
    pub fn hazard(&self, lane: LaneIndex) -> Option<&LaneHazardState> {
        self.lane_hazards.iter().find(|hazard| hazard.lane == lane)
    }

    /// Serializes the snapshot to JSON for the HUD.
    pub fn to_json(&self) -> BastionResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the snapshot to indented JSON.
    pub fn to_json_pretty(&self) -> BastionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot back from JSON.
    pub fn from_json(json: &str) -> BastionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastleState {
    pub level: u32,
    pub max_level: u32,
    pub health: f64,
    pub max_health: f64,
    pub armor: f64,
    pub regen_per_second: f64,
    pub gold_bonus_percent: f64,
    pub passives: Vec<CastlePassive>,
    pub repair_cooldown_remaining: f64,
    /// `None` at max level
    pub next_upgrade_cost: Option<f64>,
}

/// A level-derived castle bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastlePassive {
    /// "regen", "armor" or "gold"
    pub id: String,
    /// Value at the current level
    pub total: f64,
    /// Gain over the previous level
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    pub gold: f64,
    /// Gold floored for display
    pub gold_display: u64,
    /// Most recent ledger entries, oldest first
    pub gold_events: Vec<GoldEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingState {
    pub buffer: String,
    pub active_enemy_id: Option<EnemyId>,
    pub combo: u32,
    pub best_combo: u32,
    pub combo_warning: bool,
    pub combo_timer: f64,
    /// Cumulative over the run, 1.0 before any input
    pub accuracy: f64,
    pub total_inputs: u64,
    pub correct_inputs: u64,
    pub errors: u64,
    /// Present only while fresh
    pub error_hint: Option<TypingErrorHint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingErrorHint {
    /// `None` when the keystroke matched no enemy at all
    pub expected: Option<char>,
    pub received: char,
    pub enemy_id: Option<EnemyId>,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyState {
    pub id: EnemyId,
    pub lane: LaneIndex,
    pub tier_id: String,
    pub word: String,
    pub typed: usize,
    pub health: f64,
    pub max_health: f64,
    pub progress: f64,
    pub speed: f64,
    pub shield: Option<ShieldState>,
    pub affixes: Vec<Affix>,
    /// Evacuation carrier
    pub evacuation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldState {
    pub current: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurretSlotState {
    pub id: String,
    pub lane: LaneIndex,
    pub unlocked: bool,
    pub unlock_level: u32,
    pub turret: Option<TurretState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurretState {
    pub type_id: String,
    pub level: u32,
    pub targeting_priority: TargetingPriority,
    pub cooldown: f64,
    pub shots_fired: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveState {
    /// 0-based index of the current or upcoming wave
    pub index: u32,
    /// Campaign length; `None` in practice
    pub total: Option<u32>,
    pub in_countdown: bool,
    pub countdown: f64,
    /// Seconds since the current wave started
    pub elapsed: f64,
    pub remaining_spawns: usize,
    pub enemies_alive: usize,
}

/// A spawn the HUD can show ahead of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSpawnPreview {
    pub lane: LaneIndex,
    pub tier_id: String,
    /// Seconds until the spawn
    pub time_until: f64,
    /// Shield amount, when the spawn carries one
    pub shield: Option<f64>,
    pub affixes: Vec<Affix>,
    pub is_next_wave: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneHazardState {
    pub lane: LaneIndex,
    pub kind: HazardKind,
    pub remaining: f64,
    pub duration: f64,
    pub fire_rate_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationState {
    pub active: bool,
    pub succeeded: bool,
    pub failed: bool,
    pub lane: Option<LaneIndex>,
    pub remaining: f64,
    pub duration: f64,
    pub word: Option<String>,
    pub enemy_id: Option<EnemyId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportBoostState {
    pub active: bool,
    pub succeeded: bool,
    pub failed: bool,
    pub lane: Option<LaneIndex>,
    pub remaining: f64,
    pub duration: f64,
    pub multiplier: f64,
    pub cooldown_remaining: f64,
}

/// Immutable rollup of one completed wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSummary {
    pub index: u32,
    pub mode: GameMode,
    pub duration: f64,
    pub enemies_defeated: u32,
    pub breaches: u32,
    pub accuracy: f64,
    pub perfect_words: u32,
    pub average_reaction: Option<f64>,
    pub dps: f64,
    pub turret_damage: f64,
    pub typing_damage: f64,
    pub turret_dps: f64,
    pub typing_dps: f64,
    pub shield_breaks: u32,
    pub repairs_used: u32,
    pub repair_health: f64,
    pub repair_gold: f64,
    pub gold_earned: f64,
    pub max_combo: u32,
    pub session_best_combo: u32,
}

/// A recorded typing drill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingDrillSummary {
    pub id: Uuid,
    pub mode: String,
    pub words_completed: u32,
    pub errors: u32,
    pub accuracy: f64,
    pub wpm: f64,
    pub best_combo: u32,
    pub duration: f64,
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsState {
    /// Running numbers of the wave in progress
    pub active_wave: Option<WaveSummary>,
    pub wave_history: Vec<WaveSummary>,
    pub session_best_combo: u32,
    pub session_breaches: u32,
    pub total_shield_breaks: u32,
    pub total_turret_damage: f64,
    pub total_typing_damage: f64,
    pub total_perfect_words: u32,
    pub total_repairs: u32,
    pub enemies_defeated: u32,
    pub waves_completed: u32,
    pub campaign_waves_cleared: u32,
    pub time_to_first_turret: Option<f64>,
    pub average_reaction: Option<f64>,
    pub typing_drills: Vec<TypingDrillSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialState {
    pub active: bool,
    pub step: usize,
    pub step_id: Option<String>,
    pub completed: bool,
    pub total_steps: usize,
}
