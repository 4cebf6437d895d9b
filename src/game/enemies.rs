//! # Enemies
//!
//! Live enemy instances and the registry that moves them down their lanes.
//!
//! Progress runs from 0.0 at the spawn point to [`LANE_END`] at the castle.
//! An enemy leaves the registry when its health reaches zero or it breaches.

use crate::constants::{EPSILON, LANE_END};
use crate::game::{Affix, EnemyId, EnemyState, LaneIndex, ShieldState};
use serde::{Deserialize, Serialize};

/// Result of applying damage to an enemy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageOutcome {
    pub shield_damage: f64,
    pub health_damage: f64,
    /// Shield reached zero for the first time on this hit
    pub shield_broken: bool,
    /// Typed damage stopped by an intact shield
    pub blocked: bool,
    pub killed: bool,
}

/// A single enemy walking a lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub lane: LaneIndex,
    pub tier_id: String,
    pub word: String,
    /// Characters of `word` already matched
    pub typed: usize,
    pub health: f64,
    pub max_health: f64,
    pub progress: f64,
    /// Effective speed, lane lengths per second
    pub speed: f64,
    pub shield: Option<ShieldState>,
    pub affixes: Vec<Affix>,
    /// Bounty paid on defeat
    pub reward: f64,
    /// Castle damage on breach, before armor
    pub damage: f64,
    pub spawned_at: f64,
    /// Evacuation carriers pay no bounty and never hurt the castle
    pub evacuation: bool,
    /// Set on the first correct keystroke against this enemy
    pub first_typed_at: Option<f64>,
    shield_break_counted: bool,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn has_reached_castle(&self) -> bool {
        self.progress >= LANE_END - EPSILON
    }

    /// Next character the player must type, if the word is unfinished.
    pub fn next_char(&self) -> Option<char> {
        self.word.chars().nth(self.typed)
    }

    /// Word length in characters.
    pub fn word_len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_word_complete(&self) -> bool {
        self.typed >= self.word_len()
    }

    /// Whether an intact shield is up.
    pub fn is_shielded(&self) -> bool {
        self.shield
            .map(|shield| shield.current > EPSILON)
            .unwrap_or(false)
    }

    /// Total flat reduction from `Armored` affixes.
    pub fn armor_reduction(&self) -> f64 {
        self.affixes
            .iter()
            .map(|affix| match affix {
                Affix::Armored { reduction } => *reduction,
                _ => 0.0,
            })
            .sum()
    }

    /// Total health regenerated per second.
    pub fn regen_per_second(&self) -> f64 {
        self.affixes
            .iter()
            .map(|affix| match affix {
                Affix::Regenerating { per_second } => *per_second,
                _ => 0.0,
            })
            .sum()
    }

    /// Replaces the word and clears typed progress.
    pub fn assign_word(&mut self, word: String) {
        self.word = word;
        self.typed = 0;
    }

    /// Applies turret damage.
    ///
    /// The shield soaks `amount * (1 + shield_bonus)` first. Whatever base
    /// damage is left over after breaking it reaches health, reduced by armor
    /// but never below 1 (or below the leftover amount when that is smaller).
    pub fn apply_turret_damage(&mut self, amount: f64, shield_bonus: f64) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        let mut remaining = amount.max(0.0);
        let multiplier = 1.0 + shield_bonus.max(0.0);

        if let Some(shield) = self.shield.as_mut() {
            if shield.current > EPSILON && remaining > 0.0 {
                let boosted = remaining * multiplier;
                if boosted >= shield.current {
                    outcome.shield_damage = shield.current;
                    remaining -= shield.current / multiplier;
                    shield.current = 0.0;
                    if !self.shield_break_counted {
                        self.shield_break_counted = true;
                        outcome.shield_broken = true;
                    }
                } else {
                    shield.current -= boosted;
                    outcome.shield_damage = boosted;
                    remaining = 0.0;
                }
            }
        }

        if remaining > EPSILON {
            let floor = remaining.min(1.0);
            let dealt = (remaining - self.armor_reduction()).max(floor);
            outcome.health_damage = self.apply_health_damage(dealt);
        }
        outcome.killed = !self.is_alive();
        outcome
    }

    /// Applies typed damage. An intact shield blocks all of it.
    pub fn apply_typed_damage(&mut self, amount: f64) -> DamageOutcome {
        if self.is_shielded() {
            return DamageOutcome {
                blocked: true,
                ..DamageOutcome::default()
            };
        }
        let health_damage = self.apply_health_damage(amount.max(0.0));
        DamageOutcome {
            health_damage,
            killed: !self.is_alive(),
            ..DamageOutcome::default()
        }
    }

    fn apply_health_damage(&mut self, amount: f64) -> f64 {
        let dealt = amount.min(self.health.max(0.0));
        self.health -= dealt;
        if self.health <= EPSILON {
            self.health = 0.0;
        }
        dealt
    }

    pub fn snapshot(&self) -> EnemyState {
        EnemyState {
            id: self.id,
            lane: self.lane,
            tier_id: self.tier_id.clone(),
            word: self.word.clone(),
            typed: self.typed,
            health: self.health,
            max_health: self.max_health,
            progress: self.progress,
            speed: self.speed,
            shield: self.shield,
            affixes: self.affixes.clone(),
            evacuation: self.evacuation,
        }
    }
}

/// Everything needed to put an enemy on the field.
///
/// Stats left unset come from the enemy tier; the word is picked from the
/// bank when not given.
///
/// # Examples
///
/// ```
/// use bastion::{Affix, EnemySpawn};
///
/// let spawn = EnemySpawn::new(1, "brute")
///     .with_word("rampart")
///     .with_shield(20.0)
///     .with_affix(Affix::Armored { reduction: 3.0 });
/// assert_eq!(spawn.lane, 1);
/// assert_eq!(spawn.shield, Some(20.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnemySpawn {
    pub lane: LaneIndex,
    pub tier_id: String,
    pub word: Option<String>,
    pub health: Option<f64>,
    pub speed: Option<f64>,
    pub shield: Option<f64>,
    pub affixes: Vec<Affix>,
    pub progress: f64,
    pub evacuation: bool,
}

impl EnemySpawn {
    pub fn new(lane: LaneIndex, tier_id: impl Into<String>) -> Self {
        Self {
            lane,
            tier_id: tier_id.into(),
            ..Self::default()
        }
    }

    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.word = Some(word.into());
        self
    }

    pub fn with_health(mut self, health: f64) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_shield(mut self, amount: f64) -> Self {
        self.shield = Some(amount);
        self
    }

    pub fn with_affix(mut self, affix: Affix) -> Self {
        self.affixes.push(affix);
        self
    }

    pub fn at_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn as_evacuation(mut self) -> Self {
        self.evacuation = true;
        self
    }
}

/// Resolved stats for a new enemy, handed to [`EnemyRegistry::insert`].
#[derive(Debug, Clone)]
pub struct EnemyBlueprint {
    pub lane: LaneIndex,
    pub tier_id: String,
    pub word: String,
    pub health: f64,
    pub base_speed: f64,
    pub shield: Option<f64>,
    pub affixes: Vec<Affix>,
    pub reward: f64,
    pub damage: f64,
    pub progress: f64,
    pub evacuation: bool,
}

/// Owns every live enemy in spawn order.
#[derive(Debug, Clone, Default)]
pub struct EnemyRegistry {
    enemies: Vec<Enemy>,
    next_id: u64,
}

impl EnemyRegistry {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
        }
    }

    /// Adds an enemy and returns its id. Swift affixes fold into speed here,
    /// and a `Shielded` affix without an explicit amount sets the shield.
    pub fn insert(&mut self, blueprint: EnemyBlueprint, time: f64) -> EnemyId {
        let id = EnemyId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let swift: f64 = blueprint
            .affixes
            .iter()
            .map(|affix| match affix {
                Affix::Swift { speed_multiplier } => *speed_multiplier,
                _ => 1.0,
            })
            .product();
        let shield = blueprint
            .shield
            .or_else(|| {
                blueprint.affixes.iter().find_map(|affix| match affix {
                    Affix::Shielded { amount } => Some(*amount),
                    _ => None,
                })
            })
            .filter(|amount| *amount > 0.0)
            .map(|amount| ShieldState {
                current: amount,
                max: amount,
            });

        let health = blueprint.health.max(EPSILON);
        self.enemies.push(Enemy {
            id,
            lane: blueprint.lane,
            tier_id: blueprint.tier_id,
            word: blueprint.word,
            typed: 0,
            health,
            max_health: health,
            progress: blueprint.progress.clamp(0.0, LANE_END),
            speed: blueprint.base_speed.max(0.0) * swift,
            shield,
            affixes: blueprint.affixes,
            reward: blueprint.reward,
            damage: blueprint.damage,
            spawned_at: time,
            evacuation: blueprint.evacuation,
            first_typed_at: None,
            shield_break_counted: false,
        });
        id
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Live enemies, evacuation carriers excluded.
    pub fn hostile_count(&self) -> usize {
        self.enemies
            .iter()
            .filter(|enemy| enemy.is_alive() && !enemy.evacuation)
            .count()
    }

    /// Live enemies in a lane.
    pub fn alive_in_lane(&self, lane: LaneIndex) -> impl Iterator<Item = &Enemy> {
        self.enemies
            .iter()
            .filter(move |enemy| enemy.lane == lane && enemy.is_alive())
    }

    /// First letter of every live enemy's current word, typed or not.
    pub fn taken_initials(&self) -> Vec<char> {
        self.enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .filter_map(|enemy| enemy.word.chars().next())
            .collect()
    }

    /// Enemy a fresh keystroke should engage: the live enemy whose word starts
    /// with `ch`, closest to the castle, lowest id on ties.
    pub fn find_engagement(&self, ch: char) -> Option<EnemyId> {
        self.enemies
            .iter()
            .filter(|enemy| enemy.is_alive() && enemy.word.starts_with(ch))
            .max_by(|a, b| {
                a.progress
                    .total_cmp(&b.progress)
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|enemy| enemy.id)
    }

    /// Moves every live enemy and applies regeneration.
    ///
    /// Returns the ids that reached the castle this tick, in spawn order.
    /// They stay in the registry until removed.
    pub fn advance(&mut self, dt: f64) -> Vec<EnemyId> {
        let mut breached = Vec::new();
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
            let regen = enemy.regen_per_second();
            if regen > 0.0 {
                enemy.health = (enemy.health + regen * dt).min(enemy.max_health);
            }
            enemy.progress = (enemy.progress + enemy.speed * dt).min(LANE_END);
            if enemy.has_reached_castle() {
                breached.push(enemy.id);
            }
        }
        breached
    }

    pub fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|enemy| enemy.id == id)?;
        Some(self.enemies.remove(index))
    }

    /// Removes and returns every enemy at zero health.
    pub fn take_defeated(&mut self) -> Vec<Enemy> {
        let (defeated, alive): (Vec<Enemy>, Vec<Enemy>) =
            std::mem::take(&mut self.enemies)
                .into_iter()
                .partition(|enemy| !enemy.is_alive());
        self.enemies = alive;
        defeated
    }

    /// Removes every enemy without resolving rewards.
    pub fn clear(&mut self) -> Vec<Enemy> {
        std::mem::take(&mut self.enemies)
    }

    pub fn snapshot(&self) -> Vec<EnemyState> {
        self.enemies.iter().map(Enemy::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint(lane: LaneIndex, word: &str) -> EnemyBlueprint {
        EnemyBlueprint {
            lane,
            tier_id: "grunt".to_string(),
            word: word.to_string(),
            health: 20.0,
            base_speed: 0.1,
            shield: None,
            affixes: Vec::new(),
            reward: 8.0,
            damage: 10.0,
            progress: 0.0,
            evacuation: false,
        }
    }

    #[test]
    fn test_ids_follow_spawn_order() {
        let mut registry = EnemyRegistry::new();
        let a = registry.insert(blueprint(0, "oak"), 0.0);
        let b = registry.insert(blueprint(0, "elm"), 0.0);
        assert!(a < b);
        assert_eq!(a, EnemyId(1));
    }

    #[test]
    fn test_advance_reports_breaches() {
        let mut registry = EnemyRegistry::new();
        let mut fast = blueprint(0, "oak");
        fast.progress = 0.95;
        let id = registry.insert(fast, 0.0);
        registry.insert(blueprint(1, "elm"), 0.0);

        assert_eq!(registry.advance(1.0), vec![id]);
        assert_eq!(registry.get(id).unwrap().progress, LANE_END);
    }

    #[test]
    fn test_engagement_prefers_closest_then_lowest_id() {
        let mut registry = EnemyRegistry::new();
        let first = registry.insert(blueprint(0, "oak"), 0.0);
        let second = registry.insert(blueprint(1, "owl"), 0.0);
        assert_eq!(registry.find_engagement('o'), Some(first));

        registry.get_mut(second).unwrap().progress = 0.5;
        assert_eq!(registry.find_engagement('o'), Some(second));
        assert_eq!(registry.find_engagement('z'), None);
    }

    #[test]
    fn test_shield_absorbs_turret_damage_with_bonus() {
        let mut registry = EnemyRegistry::new();
        let mut bp = blueprint(0, "oak");
        bp.shield = Some(20.0);
        let id = registry.insert(bp, 0.0);
        let enemy = registry.get_mut(id).unwrap();

        let hit = enemy.apply_turret_damage(8.0, 1.0);
        assert_eq!(hit.shield_damage, 16.0);
        assert_eq!(hit.health_damage, 0.0);
        assert!(!hit.shield_broken);

        let hit = enemy.apply_turret_damage(8.0, 1.0);
        assert_eq!(hit.shield_damage, 4.0);
        assert!(hit.shield_broken);
        assert!((hit.health_damage - 6.0).abs() < 1e-9);
        assert!(!enemy.is_shielded());

        let hit = enemy.apply_turret_damage(1.0, 1.0);
        assert!(!hit.shield_broken, "a shield break counts once");
    }

    #[test]
    fn test_armor_reduces_with_floor_of_one() {
        let mut registry = EnemyRegistry::new();
        let mut bp = blueprint(0, "oak");
        bp.affixes = vec![Affix::Armored { reduction: 3.0 }];
        let id = registry.insert(bp, 0.0);
        let enemy = registry.get_mut(id).unwrap();

        assert_eq!(enemy.apply_turret_damage(10.0, 0.0).health_damage, 7.0);
        assert_eq!(enemy.apply_turret_damage(2.0, 0.0).health_damage, 1.0);
    }

    #[test]
    fn test_typed_damage_blocked_by_shield() {
        let mut registry = EnemyRegistry::new();
        let mut bp = blueprint(0, "oak");
        bp.affixes = vec![Affix::Shielded { amount: 20.0 }];
        let id = registry.insert(bp, 0.0);
        let enemy = registry.get_mut(id).unwrap();
        assert!(enemy.is_shielded());

        let outcome = enemy.apply_typed_damage(50.0);
        assert!(outcome.blocked);
        assert_eq!(enemy.health, 20.0);
    }

    #[test]
    fn test_swift_and_regen_affixes() {
        let mut registry = EnemyRegistry::new();
        let mut bp = blueprint(0, "oak");
        bp.affixes = vec![
            Affix::Swift {
                speed_multiplier: 2.0,
            },
            Affix::Regenerating { per_second: 5.0 },
        ];
        let id = registry.insert(bp, 0.0);
        assert!((registry.get(id).unwrap().speed - 0.2).abs() < 1e-9);

        registry.get_mut(id).unwrap().health = 10.0;
        registry.advance(1.0);
        assert_eq!(registry.get(id).unwrap().health, 15.0);
    }

    #[test]
    fn test_taken_initials_ignore_typed_progress() {
        let mut registry = EnemyRegistry::new();
        let oak = registry.insert(blueprint(0, "oak"), 0.0);
        let elm = registry.insert(blueprint(1, "elm"), 0.0);
        registry.get_mut(oak).unwrap().typed = 2;
        registry.get_mut(elm).unwrap().health = 0.0;

        assert_eq!(registry.taken_initials(), vec!['o']);
    }

    #[test]
    fn test_take_defeated_keeps_survivors() {
        let mut registry = EnemyRegistry::new();
        let dead = registry.insert(blueprint(0, "oak"), 0.0);
        let alive = registry.insert(blueprint(0, "elm"), 0.0);
        registry.get_mut(dead).unwrap().apply_typed_damage(100.0);

        let defeated = registry.take_defeated();
        assert_eq!(defeated.len(), 1);
        assert_eq!(defeated[0].id, dead);
        assert!(registry.get(alive).is_some());
        assert_eq!(registry.len(), 1);
    }
}
