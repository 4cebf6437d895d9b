//! # Castle
//!
//! Health, level-derived passives, breach damage and the repair action.

use crate::config::CastleLevelConfig;
use crate::game::{CastlePassive, CastleState, EconomyLedger, GoldReason};
use crate::utils::Countdown;
use crate::{BastionError, BastionResult, GameConfig};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Independent reasons a repair is refused.
///
/// All three are checked every time, so the HUD can show each blocker on
/// its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairBlockers {
    pub on_cooldown: bool,
    pub insufficient_gold: bool,
    pub full_health: bool,
}

impl RepairBlockers {
    pub fn any(&self) -> bool {
        self.on_cooldown || self.insufficient_gold || self.full_health
    }
}

impl fmt::Display for RepairBlockers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reasons = Vec::new();
        if self.on_cooldown {
            reasons.push("on cooldown");
        }
        if self.insufficient_gold {
            reasons.push("insufficient gold");
        }
        if self.full_health {
            reasons.push("full health");
        }
        if reasons.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&reasons.join(", "))
        }
    }
}

/// The castle the enemies are marching on.
#[derive(Debug, Clone)]
pub struct Castle {
    stats: CastleLevelConfig,
    health: f64,
    max_level: u32,
    repair_cooldown: Countdown,
}

impl Castle {
    /// Creates a level 1 castle at full health.
    pub fn new(config: &GameConfig) -> BastionResult<Self> {
        let stats = config
            .castle_level(1)
            .cloned()
            .ok_or_else(|| BastionError::InvalidConfig("castle level 1 missing".to_string()))?;
        Ok(Self {
            health: stats.max_health,
            stats,
            max_level: config.max_castle_level(),
            repair_cooldown: Countdown::idle(),
        })
    }

    pub fn level(&self) -> u32 {
        self.stats.level
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.stats.max_health
    }

    pub fn armor(&self) -> f64 {
        self.stats.armor
    }

    pub fn gold_bonus_percent(&self) -> f64 {
        self.stats.gold_bonus_percent
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    pub fn repair_cooldown_remaining(&self) -> f64 {
        self.repair_cooldown.remaining()
    }

    /// Buys the next castle level. Health grows by the max-health gain.
    pub fn upgrade(
        &mut self,
        config: &GameConfig,
        ledger: &mut EconomyLedger,
        time: f64,
    ) -> BastionResult<u32> {
        let cost = self
            .stats
            .upgrade_cost
            .ok_or(BastionError::CastleMaxLevel(self.stats.level))?;
        let next = config
            .castle_level(self.stats.level + 1)
            .cloned()
            .ok_or(BastionError::CastleMaxLevel(self.stats.level))?;

        ledger.spend(cost, GoldReason::CastleUpgrade, time)?;

        let gained = next.max_health - self.stats.max_health;
        self.stats = next;
        self.health = (self.health + gained.max(0.0)).clamp(0.0, self.stats.max_health);
        ledger.set_bonus_percent(self.stats.gold_bonus_percent);

        info!("Castle upgraded to level {}", self.stats.level);
        Ok(self.stats.level)
    }

    /// Reports every condition currently blocking a repair.
    pub fn repair_blockers(&self, config: &GameConfig, ledger: &EconomyLedger) -> RepairBlockers {
        RepairBlockers {
            on_cooldown: self.repair_cooldown.is_running(),
            insufficient_gold: !ledger.can_afford(config.repair.cost),
            full_health: self.health >= self.stats.max_health,
        }
    }

    /// Pays for a repair and heals. Returns the health restored.
    pub fn repair(
        &mut self,
        config: &GameConfig,
        ledger: &mut EconomyLedger,
        time: f64,
    ) -> BastionResult<f64> {
        let blockers = self.repair_blockers(config, ledger);
        if blockers.any() {
            return Err(BastionError::RepairBlocked(blockers));
        }
        ledger.spend(config.repair.cost, GoldReason::CastleRepair, time)?;

        let healed = config
            .repair
            .heal_amount
            .min(self.stats.max_health - self.health)
            .max(0.0);
        self.health += healed;
        self.repair_cooldown.start(config.repair.cooldown_seconds);
        Ok(healed)
    }

    /// Applies breach damage after armor (minimum 1). Returns the damage taken.
    pub fn take_breach(&mut self, raw_damage: f64) -> f64 {
        let damage = (raw_damage - self.stats.armor).max(1.0).min(self.health);
        self.health -= damage;
        damage
    }

    /// Regenerates health and counts the repair cooldown down.
    pub fn tick(&mut self, dt: f64) {
        if self.health > 0.0 && self.stats.regen_per_second > 0.0 {
            self.health = (self.health + self.stats.regen_per_second * dt).min(self.stats.max_health);
        }
        self.repair_cooldown.tick(dt);
    }

    /// Passive bonuses granted by the current level, with the gain over the
    /// previous level.
    pub fn passives(&self, config: &GameConfig) -> Vec<CastlePassive> {
        let previous = config.castle_level(self.stats.level.saturating_sub(1));
        let delta = |current: f64, pick: fn(&CastleLevelConfig) -> f64| {
            current - previous.map(pick).unwrap_or(0.0)
        };

        let mut passives = Vec::new();
        let stats = &self.stats;
        if stats.regen_per_second > 0.0 {
            passives.push(CastlePassive {
                id: "regen".to_string(),
                total: stats.regen_per_second,
                delta: delta(stats.regen_per_second, |row| row.regen_per_second),
            });
        }
        if stats.armor > 0.0 {
            passives.push(CastlePassive {
                id: "armor".to_string(),
                total: stats.armor,
                delta: delta(stats.armor, |row| row.armor),
            });
        }
        if stats.gold_bonus_percent > 0.0 {
            passives.push(CastlePassive {
                id: "gold".to_string(),
                total: stats.gold_bonus_percent,
                delta: delta(stats.gold_bonus_percent, |row| row.gold_bonus_percent),
            });
        }
        passives
    }

    pub fn snapshot(&self, config: &GameConfig) -> CastleState {
        CastleState {
            level: self.stats.level,
            max_level: self.max_level,
            health: self.health,
            max_health: self.stats.max_health,
            armor: self.stats.armor,
            regen_per_second: self.stats.regen_per_second,
            gold_bonus_percent: self.stats.gold_bonus_percent,
            passives: self.passives(config),
            repair_cooldown_remaining: self.repair_cooldown.remaining(),
            next_upgrade_cost: self.stats.upgrade_cost,
        }
    }
}
