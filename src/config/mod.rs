//! # Configuration Module
//!
//! Static content tables and balancing knobs for a run.
//!
//! `GameConfig` is pure data. It is loaded once, validated, and then only read
//! by the engine. The default tables live in [`content`].

pub mod content;

pub use content::*;

use crate::game::{HazardKind, LaneIndex};
use crate::{BastionError, BastionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Complete configuration for a run.
///
/// # Examples
///
/// ```
/// use bastion::GameConfig;
///
/// let config = GameConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.turret("arrow").unwrap().placement_cost(), 40.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Number of lanes enemies walk down
    pub lanes: usize,
    /// Economy tuning
    pub economy: EconomyConfig,
    /// Turret archetypes
    pub turrets: Vec<TurretArchetype>,
    /// Castle level table, ordered from level 1
    pub castle_levels: Vec<CastleLevelConfig>,
    /// Turret slot layout
    pub turret_slots: Vec<TurretSlotConfig>,
    /// Enemy tiers
    pub enemy_tiers: Vec<EnemyTierConfig>,
    /// Affix parameters used by wave generation
    pub affixes: AffixConfig,
    /// Word bank enemies draw their words from
    pub words: Vec<String>,
    /// Typing combat tuning
    pub typing: TypingConfig,
    /// Castle repair tuning
    pub repair: CastleRepairConfig,
    /// Lane hazard tuning
    pub hazards: HazardConfig,
    /// Evacuation event tuning
    pub evacuation: EvacuationConfig,
    /// Support boost tuning
    pub support_boost: SupportBoostConfig,
    /// Wave composition and pacing
    pub waves: WaveConfig,
}

/// Starting funds and ledger retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyConfig {
    pub starting_gold: f64,
    /// Number of gold events the ledger keeps
    pub gold_event_history: usize,
}

/// A turret type and its level table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurretArchetype {
    pub id: String,
    pub name: String,
    /// Disabled archetypes cannot be placed
    pub enabled: bool,
    /// Level table; index 0 is level 1
    pub levels: Vec<TurretLevelConfig>,
    /// Damage multipliers keyed by enemy tier id
    #[serde(default)]
    pub affinity_multipliers: BTreeMap<String, f64>,
    /// Extra fraction of damage dealt into shields (1.0 = double)
    #[serde(default)]
    pub shield_bonus: f64,
}

impl TurretArchetype {
    /// Highest reachable level.
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Stats for a 1-based level.
    pub fn level(&self, level: u32) -> Option<&TurretLevelConfig> {
        if level == 0 {
            return None;
        }
        self.levels.get(level as usize - 1)
    }

    /// Cost of placing the turret (its level 1 cost).
    pub fn placement_cost(&self) -> f64 {
        self.levels.first().map(|level| level.cost).unwrap_or(0.0)
    }

    /// Cost of upgrading from `level` to `level + 1`, if that level exists.
    pub fn upgrade_cost(&self, level: u32) -> Option<f64> {
        self.level(level + 1).map(|next| next.cost)
    }

    /// Damage multiplier against an enemy tier; 1.0 when unlisted.
    pub fn affinity_for(&self, tier_id: &str) -> f64 {
        self.affinity_multipliers
            .get(tier_id)
            .copied()
            .unwrap_or(1.0)
    }
}

/// One row of a turret level table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurretLevelConfig {
    /// Gold paid to reach this level (placement cost for level 1)
    pub cost: f64,
    /// Damage per shot
    pub damage: f64,
    /// Shots per second before lane multipliers
    pub fire_rate: f64,
}

/// One row of the castle level table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastleLevelConfig {
    pub level: u32,
    pub max_health: f64,
    pub regen_per_second: f64,
    /// Flat reduction of breach damage
    pub armor: f64,
    /// Bonus applied to bounty gold
    pub gold_bonus_percent: f64,
    /// Cost of upgrading to the next level; `None` at the top of the table
    pub upgrade_cost: Option<f64>,
}

/// Position of a turret slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurretSlotConfig {
    pub id: String,
    pub lane: LaneIndex,
    /// Castle level that unlocks the slot
    pub unlock_level: u32,
}

/// Base stats of an enemy tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyTierConfig {
    pub id: String,
    pub name: String,
    pub health: f64,
    /// Lane progress per second (lane length is 1.0)
    pub speed: f64,
    /// Bounty on defeat
    pub reward: f64,
    /// Castle damage on breach, before armor
    pub damage: f64,
    pub min_word_length: usize,
    pub max_word_length: usize,
    /// First wave index (0-based) the tier may appear in
    pub first_wave: u32,
    /// Relative spawn weight once unlocked
    pub weight: f64,
    /// Whether wave generation may give this tier a shield
    pub shieldable: bool,
}

/// Parameters of the affixes wave generation hands out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffixConfig {
    pub armored_reduction: f64,
    pub swift_multiplier: f64,
    pub regen_per_second: f64,
    pub shield_amount: f64,
}

/// Typing combat tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingConfig {
    /// Flat damage of a completed word
    pub base_damage: f64,
    /// Extra damage per letter of the word
    pub damage_per_letter: f64,
    /// Damage bonus per combo step (0.1 = +10%)
    pub combo_damage_step: f64,
    /// Cap on the combo damage bonus
    pub combo_damage_cap: f64,
    /// Seconds a combo survives without a correct keystroke
    pub combo_window: f64,
    /// Remaining combo time below which the warning flag is raised
    pub combo_warning_window: f64,
    /// Seconds an error hint stays fresh
    pub error_hint_ttl: f64,
}

/// Castle repair tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastleRepairConfig {
    pub cost: f64,
    pub heal_amount: f64,
    pub cooldown_seconds: f64,
}

/// A hazard kind the controller may roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardKindConfig {
    pub kind: HazardKind,
    pub fire_rate_multiplier: f64,
    pub weight: f64,
}

/// Lane hazard scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardConfig {
    pub enabled: bool,
    /// First wave index hazards may appear in
    pub first_wave: u32,
    /// Chance a hazard-free lane gains a hazard on each roll
    pub chance: f64,
    /// Seconds of active wave time between rolls
    pub roll_interval: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub kinds: Vec<HazardKindConfig>,
}

impl HazardConfig {
    /// Configured multiplier for a kind, or the kind's built-in default.
    pub fn multiplier_for(&self, kind: HazardKind) -> f64 {
        self.kinds
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.fire_rate_multiplier)
            .unwrap_or_else(|| kind.default_multiplier())
    }
}

/// Evacuation event tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationConfig {
    pub enabled: bool,
    pub first_wave: u32,
    /// Chance a wave schedules an evacuation
    pub chance: f64,
    /// Seconds into the wave the evacuation starts
    pub trigger_offset: f64,
    pub duration: f64,
    pub reward: f64,
    pub penalty: f64,
    pub min_word_length: usize,
    pub max_word_length: usize,
    pub carrier_health: f64,
    pub carrier_speed: f64,
}

/// Support boost tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportBoostConfig {
    pub enabled: bool,
    /// Combo that triggers a boost on the lane of the completing word
    pub combo_threshold: u32,
    pub multiplier: f64,
    pub duration: f64,
    pub cooldown: f64,
}

/// Wave composition and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveConfig {
    /// Number of campaign waves
    pub campaign_waves: u32,
    /// Whether countdowns start waves on their own
    pub autostart: bool,
    pub base_enemies: u32,
    pub enemies_per_wave: u32,
    pub base_spawn_interval: f64,
    pub spawn_interval_step: f64,
    pub min_spawn_interval: f64,
    /// Seconds before the first wave
    pub first_countdown: f64,
    /// Seconds between waves
    pub break_seconds: f64,
    pub clear_bonus_base: f64,
    pub clear_bonus_per_wave: f64,
    /// Practice waves never get harder than this index
    pub practice_difficulty_cap: u32,
    /// First wave index that may roll shields
    pub shield_first_wave: u32,
    pub shield_chance: f64,
    pub affix_chance_per_wave: f64,
    pub affix_chance_cap: f64,
}

impl WaveConfig {
    /// Wave-clear bonus for a 0-based wave index.
    pub fn clear_bonus(&self, index: u32) -> f64 {
        self.clear_bonus_base + self.clear_bonus_per_wave * index as f64
    }
}

impl GameConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            lanes: 3,
            economy: EconomyConfig {
                starting_gold: 100.0,
                gold_event_history: 50,
            },
            turrets: default_turrets(),
            castle_levels: default_castle_levels(),
            turret_slots: default_turret_slots(),
            enemy_tiers: default_enemy_tiers(),
            affixes: AffixConfig {
                armored_reduction: 3.0,
                swift_multiplier: 1.4,
                regen_per_second: 2.0,
                shield_amount: 20.0,
            },
            words: default_words(),
            typing: TypingConfig {
                base_damage: 20.0,
                damage_per_letter: 2.0,
                combo_damage_step: 0.1,
                combo_damage_cap: 1.0,
                combo_window: 4.0,
                combo_warning_window: 1.25,
                error_hint_ttl: 2.0,
            },
            repair: CastleRepairConfig {
                cost: 60.0,
                heal_amount: 40.0,
                cooldown_seconds: 20.0,
            },
            hazards: HazardConfig {
                enabled: true,
                first_wave: 1,
                chance: 0.35,
                roll_interval: 15.0,
                min_duration: 10.0,
                max_duration: 18.0,
                kinds: default_hazard_kinds(),
            },
            evacuation: EvacuationConfig {
                enabled: true,
                first_wave: 1,
                chance: 0.5,
                trigger_offset: 6.0,
                duration: 18.0,
                reward: 60.0,
                penalty: 30.0,
                min_word_length: 8,
                max_word_length: 12,
                carrier_health: 45.0,
                carrier_speed: 0.035,
            },
            support_boost: SupportBoostConfig {
                enabled: true,
                combo_threshold: 6,
                multiplier: 1.5,
                duration: 8.0,
                cooldown: 30.0,
            },
            waves: WaveConfig {
                campaign_waves: 6,
                autostart: true,
                base_enemies: 5,
                enemies_per_wave: 2,
                base_spawn_interval: 2.6,
                spawn_interval_step: 0.2,
                min_spawn_interval: 0.9,
                first_countdown: 4.0,
                break_seconds: 6.0,
                clear_bonus_base: 15.0,
                clear_bonus_per_wave: 5.0,
                practice_difficulty_cap: 3,
                shield_first_wave: 2,
                shield_chance: 0.25,
                affix_chance_per_wave: 0.08,
                affix_chance_cap: 0.4,
            },
        }
    }

    /// Creates a configuration for deterministic tests.
    ///
    /// Waves wait for an explicit start command, and no hazards, evacuations
    /// or support boosts are rolled on their own.
    pub fn for_testing() -> Self {
        let mut config = Self::new();
        config.waves.autostart = false;
        config.hazards.enabled = false;
        config.evacuation.enabled = false;
        config.support_boost.enabled = false;
        config
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> BastionResult<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn load_from_file(path: impl AsRef<Path>) -> BastionResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> BastionResult<String> {
        serde_json::to_string_pretty(self).map_err(BastionError::from)
    }

    /// Looks up a turret archetype.
    pub fn turret(&self, id: &str) -> Option<&TurretArchetype> {
        self.turrets.iter().find(|turret| turret.id == id)
    }

    /// Looks up an enemy tier.
    pub fn tier(&self, id: &str) -> Option<&EnemyTierConfig> {
        self.enemy_tiers.iter().find(|tier| tier.id == id)
    }

    /// Looks up a castle level row by its 1-based level.
    pub fn castle_level(&self, level: u32) -> Option<&CastleLevelConfig> {
        self.castle_levels.iter().find(|row| row.level == level)
    }

    /// Highest castle level in the table.
    pub fn max_castle_level(&self) -> u32 {
        self.castle_levels
            .iter()
            .map(|row| row.level)
            .max()
            .unwrap_or(1)
    }

    /// Slot ids unlocked at exactly `level`.
    pub fn slots_unlocked_at(&self, level: u32) -> Vec<&str> {
        self.turret_slots
            .iter()
            .filter(|slot| slot.unlock_level == level)
            .map(|slot| slot.id.as_str())
            .collect()
    }

    /// Number of bank words whose length lies in `[min, max]`.
    pub fn words_in_range(&self, min: usize, max: usize) -> usize {
        self.words
            .iter()
            .filter(|word| {
                let len = word.chars().count();
                len >= min && len <= max
            })
            .count()
    }

    /// Checks the tables for inconsistencies the engine cannot recover from.
    pub fn validate(&self) -> BastionResult<()> {
        let invalid = |msg: String| Err(BastionError::InvalidConfig(msg));

        if self.lanes == 0 {
            return invalid("at least one lane is required".to_string());
        }
        if self.economy.starting_gold < 0.0 {
            return invalid("starting gold cannot be negative".to_string());
        }

        if self.turrets.is_empty() {
            return invalid("no turret archetypes defined".to_string());
        }
        for turret in &self.turrets {
            if turret.levels.is_empty() {
                return invalid(format!("turret {} has no levels", turret.id));
            }
            for (index, level) in turret.levels.iter().enumerate() {
                if level.fire_rate <= 0.0 || !level.fire_rate.is_finite() {
                    return invalid(format!(
                        "turret {} level {} has non-positive fire rate",
                        turret.id,
                        index + 1
                    ));
                }
                if level.cost < 0.0 || level.damage < 0.0 {
                    return invalid(format!(
                        "turret {} level {} has negative cost or damage",
                        turret.id,
                        index + 1
                    ));
                }
            }
            if turret.affinity_multipliers.values().any(|m| *m < 0.0) {
                return invalid(format!("turret {} has a negative affinity", turret.id));
            }
        }

        if self.castle_levels.is_empty() {
            return invalid("castle level table is empty".to_string());
        }
        for (index, row) in self.castle_levels.iter().enumerate() {
            if row.level != index as u32 + 1 {
                return invalid(format!(
                    "castle levels must be numbered from 1 in order, found {} at position {}",
                    row.level,
                    index + 1
                ));
            }
            if row.max_health <= 0.0 {
                return invalid(format!("castle level {} has no health", row.level));
            }
            if row.upgrade_cost.map(|cost| cost < 0.0).unwrap_or(false) {
                return invalid(format!("castle level {} has a negative cost", row.level));
            }
        }

        for slot in &self.turret_slots {
            if slot.lane >= self.lanes {
                return invalid(format!("slot {} uses unknown lane {}", slot.id, slot.lane));
            }
            if self.turret_slots.iter().filter(|s| s.id == slot.id).count() > 1 {
                return invalid(format!("duplicate slot id {}", slot.id));
            }
        }

        if self.enemy_tiers.is_empty() {
            return invalid("no enemy tiers defined".to_string());
        }
        for tier in &self.enemy_tiers {
            if tier.min_word_length == 0 || tier.min_word_length > tier.max_word_length {
                return invalid(format!("tier {} has an invalid word range", tier.id));
            }
            if self.words_in_range(tier.min_word_length, tier.max_word_length) == 0 {
                return invalid(format!("no bank words fit tier {}", tier.id));
            }
            if tier.health <= 0.0 || tier.speed < 0.0 || tier.weight < 0.0 {
                return invalid(format!("tier {} has invalid stats", tier.id));
            }
        }
        if !self.enemy_tiers.iter().any(|tier| tier.first_wave == 0) {
            return invalid("at least one tier must appear in the first wave".to_string());
        }

        if self.evacuation.enabled {
            let evac = &self.evacuation;
            if evac.min_word_length == 0 || evac.min_word_length > evac.max_word_length {
                return invalid("evacuation word range is invalid".to_string());
            }
            if self.words_in_range(evac.min_word_length, evac.max_word_length) == 0 {
                return invalid("no bank words fit evacuation carriers".to_string());
            }
        }

        if self.hazards.enabled {
            if self.hazards.kinds.is_empty() {
                return invalid("hazards enabled without hazard kinds".to_string());
            }
            if self.hazards.min_duration > self.hazards.max_duration {
                return invalid("hazard duration range is inverted".to_string());
            }
            if self.hazards.roll_interval <= 0.0 {
                return invalid("hazard roll interval must be positive".to_string());
            }
        }

        if self.support_boost.enabled && self.support_boost.combo_threshold == 0 {
            return invalid("support boost threshold must be positive".to_string());
        }

        if self.waves.campaign_waves == 0 {
            return invalid("campaign needs at least one wave".to_string());
        }
        if self.waves.min_spawn_interval < 0.0 {
            return invalid("spawn interval cannot be negative".to_string());
        }

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
