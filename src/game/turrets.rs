//! # Turrets
//!
//! Slot management (place, upgrade, refund, retarget) and automatic fire.
//!
//! A turret accumulates fire time scaled by its lane's multipliers and fires
//! once per `1 / fire_rate` seconds of that scaled time while it has a target.

use crate::constants::EPSILON;
use crate::game::{
    EconomyLedger, Enemy, EnemyId, EnemyRegistry, GoldReason, LaneIndex, TargetingPriority,
    TurretSlotState, TurretState,
};
use crate::{BastionError, BastionResult, GameConfig};
use log::{debug, trace};
use std::cmp::Ordering;

/// A turret occupying a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Turret {
    pub type_id: String,
    /// 1-based level
    pub level: u32,
    pub targeting_priority: TargetingPriority,
    /// Seconds of scaled fire time until the next shot
    pub cooldown: f64,
    pub shots_fired: u64,
}

/// A position a turret can be built on.
#[derive(Debug, Clone, PartialEq)]
pub struct TurretSlot {
    pub id: String,
    pub lane: LaneIndex,
    pub unlock_level: u32,
    pub turret: Option<Turret>,
}

impl TurretSlot {
    pub fn is_unlocked(&self, castle_level: u32) -> bool {
        castle_level >= self.unlock_level
    }
}

/// One resolved shot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotReport {
    pub slot_id: String,
    pub lane: LaneIndex,
    pub enemy_id: EnemyId,
    pub shield_damage: f64,
    pub health_damage: f64,
    pub shield_broken: bool,
    pub killed: bool,
}

/// Picks a target among live enemies in a lane.
///
/// `First` takes the enemy furthest along, `Strongest` the highest health and
/// `Weakest` the lowest health. Ties go to the lowest id, the earliest spawn.
pub fn select_target<'a>(
    priority: TargetingPriority,
    candidates: impl Iterator<Item = &'a Enemy>,
) -> Option<EnemyId> {
    let better = |a: &Enemy, b: &Enemy| -> Ordering {
        let primary = match priority {
            TargetingPriority::First => a.progress.total_cmp(&b.progress),
            TargetingPriority::Strongest => a.health.total_cmp(&b.health),
            TargetingPriority::Weakest => b.health.total_cmp(&a.health),
        };
        primary.then_with(|| b.id.cmp(&a.id))
    };
    candidates.max_by(|a, b| better(a, b)).map(|enemy| enemy.id)
}

/// All turret slots of a run.
#[derive(Debug, Clone)]
pub struct TurretGrid {
    slots: Vec<TurretSlot>,
}

impl TurretGrid {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            slots: config
                .turret_slots
                .iter()
                .map(|slot| TurretSlot {
                    id: slot.id.clone(),
                    lane: slot.lane,
                    unlock_level: slot.unlock_level,
                    turret: None,
                })
                .collect(),
        }
    }

    pub fn slots(&self) -> &[TurretSlot] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> Option<&TurretSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    fn slot_mut(&mut self, id: &str) -> BastionResult<&mut TurretSlot> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .ok_or_else(|| BastionError::UnknownSlot(id.to_string()))
    }

    /// Number of placed turrets.
    pub fn turret_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.turret.is_some()).count()
    }

    /// Builds a level 1 turret on an unlocked, empty slot.
    pub fn place(
        &mut self,
        slot_id: &str,
        type_id: &str,
        castle_level: u32,
        config: &GameConfig,
        ledger: &mut EconomyLedger,
        time: f64,
    ) -> BastionResult<()> {
        let slot = self.slot_mut(slot_id)?;
        if !slot.is_unlocked(castle_level) {
            return Err(BastionError::SlotLocked {
                slot: slot_id.to_string(),
                required: slot.unlock_level,
            });
        }
        if slot.turret.is_some() {
            return Err(BastionError::SlotOccupied(slot_id.to_string()));
        }
        let archetype = config
            .turret(type_id)
            .ok_or_else(|| BastionError::UnknownTurretType(type_id.to_string()))?;
        if !archetype.enabled {
            return Err(BastionError::TurretTypeDisabled(type_id.to_string()));
        }

        ledger.spend(archetype.placement_cost(), GoldReason::TurretPlaced, time)?;
        slot.turret = Some(Turret {
            type_id: type_id.to_string(),
            level: 1,
            targeting_priority: TargetingPriority::default(),
            cooldown: 0.0,
            shots_fired: 0,
        });
        debug!("Placed {} on slot {}", type_id, slot_id);
        Ok(())
    }

    /// Raises a turret one level. Returns the new level.
    pub fn upgrade(
        &mut self,
        slot_id: &str,
        config: &GameConfig,
        ledger: &mut EconomyLedger,
        time: f64,
    ) -> BastionResult<u32> {
        let slot = self.slot_mut(slot_id)?;
        let turret = slot
            .turret
            .as_mut()
            .ok_or_else(|| BastionError::SlotEmpty(slot_id.to_string()))?;
        let archetype = config
            .turret(&turret.type_id)
            .ok_or_else(|| BastionError::UnknownTurretType(turret.type_id.clone()))?;
        let cost = archetype
            .upgrade_cost(turret.level)
            .ok_or_else(|| BastionError::MaxLevel {
                slot: slot_id.to_string(),
                level: turret.level,
            })?;

        ledger.spend(cost, GoldReason::TurretUpgraded, time)?;
        turret.level += 1;
        debug!("Upgraded slot {} to level {}", slot_id, turret.level);
        Ok(turret.level)
    }

    /// Steps a turret down one level, or removes it at level 1.
    ///
    /// Refunds the full placement cost when removing, otherwise the cost paid
    /// for the current level. Returns the refund.
    pub fn downgrade(
        &mut self,
        slot_id: &str,
        config: &GameConfig,
        ledger: &mut EconomyLedger,
        time: f64,
    ) -> BastionResult<f64> {
        let slot = self.slot_mut(slot_id)?;
        let turret = slot
            .turret
            .as_mut()
            .ok_or_else(|| BastionError::SlotEmpty(slot_id.to_string()))?;
        let archetype = config
            .turret(&turret.type_id)
            .ok_or_else(|| BastionError::UnknownTurretType(turret.type_id.clone()))?;

        let refund = archetype
            .level(turret.level)
            .map(|level| level.cost)
            .unwrap_or(0.0);
        if turret.level <= 1 {
            slot.turret = None;
        } else {
            turret.level -= 1;
        }
        ledger.credit(refund, GoldReason::TurretRefund, time);
        debug!("Refunded {:.1} gold on slot {}", refund, slot_id);
        Ok(refund)
    }

    pub fn set_priority(&mut self, slot_id: &str, priority: TargetingPriority) -> BastionResult<()> {
        let slot = self.slot_mut(slot_id)?;
        let turret = slot
            .turret
            .as_mut()
            .ok_or_else(|| BastionError::SlotEmpty(slot_id.to_string()))?;
        turret.targeting_priority = priority;
        Ok(())
    }

    /// Runs one tick of automatic fire.
    ///
    /// `lane_multiplier` gives the combined fire-rate multiplier of a lane
    /// (hazards times support boosts).
    pub fn fire(
        &mut self,
        dt: f64,
        config: &GameConfig,
        enemies: &mut EnemyRegistry,
        lane_multiplier: impl Fn(LaneIndex) -> f64,
    ) -> Vec<ShotReport> {
        let mut shots = Vec::new();

        for slot in &mut self.slots {
            let Some(turret) = slot.turret.as_mut() else {
                continue;
            };
            let Some(archetype) = config.turret(&turret.type_id) else {
                continue;
            };
            let Some(stats) = archetype.level(turret.level) else {
                continue;
            };

            let multiplier = lane_multiplier(slot.lane).max(0.0);
            turret.cooldown -= dt * multiplier;

            while turret.cooldown <= EPSILON {
                let target = select_target(turret.targeting_priority, enemies.alive_in_lane(slot.lane));
                let Some(enemy) = target.and_then(|id| enemies.get_mut(id)) else {
                    turret.cooldown = 0.0;
                    break;
                };

                let damage = stats.damage * archetype.affinity_for(&enemy.tier_id);
                let outcome = enemy.apply_turret_damage(damage, archetype.shield_bonus);
                turret.cooldown += 1.0 / stats.fire_rate;
                turret.shots_fired += 1;

                trace!(
                    "Slot {} hit {} for {:.1} shield / {:.1} health",
                    slot.id,
                    enemy.id,
                    outcome.shield_damage,
                    outcome.health_damage
                );
                shots.push(ShotReport {
                    slot_id: slot.id.clone(),
                    lane: slot.lane,
                    enemy_id: enemy.id,
                    shield_damage: outcome.shield_damage,
                    health_damage: outcome.health_damage,
                    shield_broken: outcome.shield_broken,
                    killed: outcome.killed,
                });
            }
        }

        shots
    }

    pub fn snapshot(&self, castle_level: u32) -> Vec<TurretSlotState> {
        self.slots
            .iter()
            .map(|slot| TurretSlotState {
                id: slot.id.clone(),
                lane: slot.lane,
                unlocked: slot.is_unlocked(castle_level),
                unlock_level: slot.unlock_level,
                turret: slot.turret.as_ref().map(|turret| TurretState {
                    type_id: turret.type_id.clone(),
                    level: turret.level,
                    targeting_priority: turret.targeting_priority,
                    cooldown: turret.cooldown.max(0.0),
                    shots_fired: turret.shots_fired,
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EnemyBlueprint;

    fn grunt(lane: LaneIndex, health: f64, progress: f64) -> EnemyBlueprint {
        EnemyBlueprint {
            lane,
            tier_id: "grunt".to_string(),
            word: "oak".to_string(),
            health,
            base_speed: 0.0,
            shield: None,
            affixes: Vec::new(),
            reward: 8.0,
            damage: 10.0,
            progress,
            evacuation: false,
        }
    }

    fn setup() -> (GameConfig, TurretGrid, EconomyLedger) {
        let config = GameConfig::new();
        let grid = TurretGrid::new(&config);
        (config, grid, EconomyLedger::new(1000.0, 20))
    }

    #[test]
    fn test_place_checks_in_order() {
        let (config, mut grid, mut ledger) = setup();
        assert!(matches!(
            grid.place("nope", "arrow", 1, &config, &mut ledger, 0.0),
            Err(BastionError::UnknownSlot(_))
        ));
        assert!(matches!(
            grid.place("s4", "arrow", 1, &config, &mut ledger, 0.0),
            Err(BastionError::SlotLocked { required: 2, .. })
        ));
        assert!(matches!(
            grid.place("s1", "crystal", 1, &config, &mut ledger, 0.0),
            Err(BastionError::TurretTypeDisabled(_))
        ));
        assert!(matches!(
            grid.place("s1", "ballista", 1, &config, &mut ledger, 0.0),
            Err(BastionError::UnknownTurretType(_))
        ));
        grid.place("s1", "arrow", 1, &config, &mut ledger, 0.0).unwrap();
        assert!(matches!(
            grid.place("s1", "arrow", 1, &config, &mut ledger, 0.0),
            Err(BastionError::SlotOccupied(_))
        ));
        assert_eq!(ledger.gold(), 960.0);
    }

    #[test]
    fn test_upgrade_stops_at_max_level() {
        let (config, mut grid, mut ledger) = setup();
        grid.place("s1", "arrow", 1, &config, &mut ledger, 0.0).unwrap();
        assert_eq!(grid.upgrade("s1", &config, &mut ledger, 0.0).unwrap(), 2);
        assert_eq!(grid.upgrade("s1", &config, &mut ledger, 0.0).unwrap(), 3);
        let gold = ledger.gold();
        assert!(matches!(
            grid.upgrade("s1", &config, &mut ledger, 0.0),
            Err(BastionError::MaxLevel { level: 3, .. })
        ));
        assert_eq!(ledger.gold(), gold);
        assert_eq!(grid.slot("s1").unwrap().turret.as_ref().unwrap().level, 3);
    }

    #[test]
    fn test_downgrade_refunds_level_cost() {
        let (config, mut grid, mut ledger) = setup();
        grid.place("s2", "arrow", 1, &config, &mut ledger, 0.0).unwrap();
        grid.upgrade("s2", &config, &mut ledger, 0.0).unwrap();
        assert_eq!(grid.downgrade("s2", &config, &mut ledger, 0.0).unwrap(), 60.0);
        assert_eq!(grid.slot("s2").unwrap().turret.as_ref().unwrap().level, 1);
        assert_eq!(grid.downgrade("s2", &config, &mut ledger, 0.0).unwrap(), 40.0);
        assert!(grid.slot("s2").unwrap().turret.is_none());
        assert_eq!(ledger.gold(), 1000.0);
        assert!(matches!(
            grid.downgrade("s2", &config, &mut ledger, 0.0),
            Err(BastionError::SlotEmpty(_))
        ));
    }

    #[test]
    fn test_select_target_by_priority() {
        let mut registry = EnemyRegistry::new();
        let near = registry.insert(grunt(0, 10.0, 0.8), 0.0);
        let tough = registry.insert(grunt(0, 50.0, 0.2), 0.0);
        let weak = registry.insert(grunt(0, 5.0, 0.1), 0.0);
        registry.insert(grunt(1, 1.0, 0.99), 0.0);

        let lane = || registry.alive_in_lane(0);
        assert_eq!(select_target(TargetingPriority::First, lane()), Some(near));
        assert_eq!(select_target(TargetingPriority::Strongest, lane()), Some(tough));
        assert_eq!(select_target(TargetingPriority::Weakest, lane()), Some(weak));
        assert_eq!(select_target(TargetingPriority::First, registry.alive_in_lane(2)), None);
    }

    #[test]
    fn test_ties_break_by_spawn_order() {
        let mut registry = EnemyRegistry::new();
        let older = registry.insert(grunt(0, 10.0, 0.5), 0.0);
        registry.insert(grunt(0, 10.0, 0.5), 1.0);
        for priority in TargetingPriority::all() {
            assert_eq!(select_target(priority, registry.alive_in_lane(0)), Some(older));
        }
    }

    #[test]
    fn test_fire_rate_and_lane_multiplier() {
        let (config, mut grid, mut ledger) = setup();
        grid.place("s1", "arrow", 1, &config, &mut ledger, 0.0).unwrap();
        let mut registry = EnemyRegistry::new();
        registry.insert(grunt(0, 1e9, 0.5), 0.0);

        let mut shots = 0;
        for _ in 0..40 {
            shots += grid.fire(0.25, &config, &mut registry, |_| 1.0).len();
        }
        assert_eq!(shots, 10);

        let mut slowed = 0;
        for _ in 0..40 {
            slowed += grid.fire(0.25, &config, &mut registry, |_| 0.5).len();
        }
        assert_eq!(slowed, 5);
    }

    #[test]
    fn test_idle_turret_stays_ready() {
        let (config, mut grid, mut ledger) = setup();
        grid.place("s1", "arrow", 1, &config, &mut ledger, 0.0).unwrap();
        let mut registry = EnemyRegistry::new();
        for _ in 0..10 {
            assert!(grid.fire(0.5, &config, &mut registry, |_| 1.0).is_empty());
        }
        assert_eq!(grid.slot("s1").unwrap().turret.as_ref().unwrap().cooldown, 0.0);

        registry.insert(grunt(0, 100.0, 0.1), 0.0);
        assert_eq!(grid.fire(0.05, &config, &mut registry, |_| 1.0).len(), 1);
    }

    #[test]
    fn test_affinity_scales_damage() {
        let (config, mut grid, mut ledger) = setup();
        grid.place("s1", "flame", 1, &config, &mut ledger, 0.0).unwrap();
        let mut registry = EnemyRegistry::new();
        let mut brute = grunt(0, 100.0, 0.1);
        brute.tier_id = "brute".to_string();
        registry.insert(brute, 0.0);

        let shots = grid.fire(0.01, &config, &mut registry, |_| 1.0);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].health_damage, 9.0);
    }
}
