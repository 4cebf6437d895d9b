//! # Autotype Module
//!
//! A headless bot typist used by the CLI and soak tests. It reads the latest
//! snapshot and answers with the commands a steady player would issue: type
//! the word of the enemy closest to the castle, keep turrets built, and patch
//! up the castle when it gets low.

use crate::game::{EnemyState, GameState, GameStatus};
use crate::input::HudCommand;
use crate::GameConfig;
use log::trace;

/// Key sent for deliberate mistakes. No word starts with it, so it never
/// engages a new enemy.
const MISTAKE_KEY: char = '#';

/// Seconds between management decisions (builds, upgrades, repairs).
const MANAGE_INTERVAL: f64 = 1.0;

/// Castle health fraction under which the bot repairs.
const REPAIR_THRESHOLD: f64 = 0.5;

/// Bot typist state.
#[derive(Debug, Clone)]
pub struct AutotypeState {
    /// Whether the bot is issuing commands
    pub enabled: bool,
    /// Typing speed; one word is five keystrokes
    pub words_per_minute: f64,
    /// Sends a wrong key every N keystrokes; 0 never misses
    pub mistake_every: u32,
    /// Archetype the bot builds
    pub turret_type: String,
    keys_sent: u64,
    key_timer: f64,
    manage_timer: f64,
}

impl Default for AutotypeState {
    fn default() -> Self {
        Self::new(40.0)
    }
}

impl AutotypeState {
    /// Creates an enabled bot typing at `words_per_minute`.
    pub fn new(words_per_minute: f64) -> Self {
        Self {
            enabled: true,
            words_per_minute,
            mistake_every: 0,
            turret_type: "arrow".to_string(),
            keys_sent: 0,
            key_timer: 0.0,
            manage_timer: 0.0,
        }
    }

    pub fn with_mistakes(mut self, every: u32) -> Self {
        self.mistake_every = every;
        self
    }

    /// Toggles the bot on or off.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.key_timer = 0.0;
            self.manage_timer = 0.0;
        }
        self.enabled
    }

    /// Seconds between keystrokes.
    pub fn key_interval(&self) -> f64 {
        60.0 / (self.words_per_minute.max(1.0) * 5.0)
    }

    /// Keystrokes sent so far, mistakes included.
    pub fn keys_sent(&self) -> u64 {
        self.keys_sent
    }

    /// Commands to issue for the next `dt` seconds.
    pub fn next_commands(
        &mut self,
        dt: f64,
        state: &GameState,
        config: &GameConfig,
    ) -> Vec<HudCommand> {
        let mut commands = Vec::new();
        if !self.enabled || state.status != GameStatus::Playing {
            return commands;
        }

        self.manage_timer -= dt;
        if self.manage_timer <= 0.0 {
            self.manage_timer = MANAGE_INTERVAL;
            if let Some(command) = self.manage(state, config) {
                trace!("Autotype issues {}", command.name());
                commands.push(command);
            }
        }

        self.key_timer += dt.max(0.0);
        let interval = self.key_interval();
        let Some((target, typed)) = pick_target(state) else {
            // Nothing to type; do not bank keystrokes for later.
            self.key_timer = self.key_timer.min(interval);
            return commands;
        };

        let mut remaining = target.word.chars().skip(typed);
        while self.key_timer >= interval {
            self.keys_sent += 1;
            if self.mistake_every > 0 && self.keys_sent % self.mistake_every as u64 == 0 {
                self.key_timer -= interval;
                commands.push(HudCommand::Keystroke { key: MISTAKE_KEY });
                continue;
            }
            let Some(key) = remaining.next() else {
                // Word finished; wait for the next snapshot to pick a new one.
                self.keys_sent -= 1;
                break;
            };
            self.key_timer -= interval;
            commands.push(HudCommand::Keystroke { key });
        }
        commands
    }

    /// One build, upgrade or repair decision.
    fn manage(&self, state: &GameState, config: &GameConfig) -> Option<HudCommand> {
        let gold = state.resources.gold;
        let castle = &state.castle;

        if state.wave.in_countdown && !config.waves.autostart {
            return Some(HudCommand::StartWave);
        }

        if castle.health < castle.max_health * REPAIR_THRESHOLD
            && castle.repair_cooldown_remaining <= 0.0
            && gold >= config.repair.cost
        {
            return Some(HudCommand::RepairCastle);
        }

        let archetype = config.turret(&self.turret_type)?;
        if gold >= archetype.placement_cost() {
            if let Some(slot) = state
                .turrets
                .iter()
                .find(|slot| slot.unlocked && slot.turret.is_none())
            {
                return Some(HudCommand::PlaceTurret {
                    slot: slot.id.clone(),
                    type_id: self.turret_type.clone(),
                });
            }
        }

        if let Some(cost) = castle.next_upgrade_cost {
            if gold >= cost {
                return Some(HudCommand::UpgradeCastle);
            }
        }

        state
            .turrets
            .iter()
            .filter_map(|slot| {
                let turret = slot.turret.as_ref()?;
                let cost = config.turret(&turret.type_id)?.upgrade_cost(turret.level)?;
                Some((slot, turret.level, cost))
            })
            .filter(|(_, _, cost)| gold >= *cost)
            .min_by_key(|(_, level, _)| *level)
            .map(|(slot, _, _)| HudCommand::UpgradeTurret {
                slot: slot.id.clone(),
            })
    }
}

/// The enemy to type and how much of its word is already done.
///
/// Keeps the current engagement when there is one, otherwise takes the enemy
/// closest to the castle, which is also the one a first key would engage.
fn pick_target(state: &GameState) -> Option<(&EnemyState, usize)> {
    if let Some(enemy) = state
        .typing
        .active_enemy_id
        .and_then(|id| state.enemy(id))
    {
        return Some((enemy, enemy.typed));
    }
    state
        .enemies
        .iter()
        .filter(|enemy| enemy.health > 0.0 && !enemy.word.is_empty())
        .max_by(|a, b| {
            a.progress
                .total_cmp(&b.progress)
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|enemy| (enemy, 0))
}
