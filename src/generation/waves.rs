//! # Wave Generation
//!
//! Turns a wave index into an ordered spawn schedule. Enemy count and spawn
//! cadence scale with difficulty, tougher tiers unlock by wave, and affixes
//! (shields included) become more likely as the campaign goes on.

use crate::config::EnemyTierConfig;
use crate::game::{Affix, GameMode, LaneIndex};
use crate::{BastionError, BastionResult, GameConfig, Generator};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One scheduled spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSpawn {
    /// Seconds after the wave starts
    pub at: f64,
    pub lane: LaneIndex,
    pub tier_id: String,
    pub affixes: Vec<Affix>,
}

impl PlannedSpawn {
    /// Shield amount granted by a `Shielded` affix, if any.
    pub fn shield(&self) -> Option<f64> {
        self.affixes.iter().find_map(|affix| match affix {
            Affix::Shielded { amount } => Some(*amount),
            _ => None,
        })
    }
}

/// Complete spawn schedule of one wave, ordered by `at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WavePlan {
    pub index: u32,
    pub mode: GameMode,
    pub spawns: Vec<PlannedSpawn>,
}

impl WavePlan {
    /// Offset of the last spawn, 0 for an empty plan.
    pub fn span(&self) -> f64 {
        self.spawns.last().map(|spawn| spawn.at).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

/// Generates the plan for one wave index.
///
/// # Examples
///
/// ```
/// use bastion::{generation::utils, GameConfig, GameMode, Generator, WaveGenerator};
///
/// let config = GameConfig::default();
/// let mut rng = utils::create_rng(1);
/// let plan = WaveGenerator::new(0, GameMode::Campaign)
///     .generate(&config, &mut rng)
///     .unwrap();
/// assert_eq!(plan.spawns.len(), 5);
/// assert!(plan.spawns.iter().all(|s| s.tier_id == "grunt"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WaveGenerator {
    pub index: u32,
    pub mode: GameMode,
}

impl WaveGenerator {
    pub fn new(index: u32, mode: GameMode) -> Self {
        Self { index, mode }
    }

    /// Index used for scaling. Practice waves stop getting harder at the cap.
    pub fn difficulty(&self, config: &GameConfig) -> u32 {
        match self.mode {
            GameMode::Campaign => self.index,
            GameMode::Practice => self.index.min(config.waves.practice_difficulty_cap),
        }
    }

    /// Number of enemies in the wave.
    pub fn enemy_count(&self, config: &GameConfig) -> u32 {
        config.waves.base_enemies + config.waves.enemies_per_wave * self.difficulty(config)
    }

    /// Seconds between consecutive spawns.
    pub fn spawn_interval(&self, config: &GameConfig) -> f64 {
        let waves = &config.waves;
        (waves.base_spawn_interval - waves.spawn_interval_step * self.difficulty(config) as f64)
            .max(waves.min_spawn_interval)
    }

    fn pick_tier<'a>(
        &self,
        config: &'a GameConfig,
        rng: &mut StdRng,
    ) -> BastionResult<&'a EnemyTierConfig> {
        let difficulty = self.difficulty(config);
        let unlocked: Vec<&EnemyTierConfig> = config
            .enemy_tiers
            .iter()
            .filter(|tier| tier.first_wave <= difficulty && tier.weight > 0.0)
            .collect();
        let total: f64 = unlocked.iter().map(|tier| tier.weight).sum();
        if unlocked.is_empty() || total <= 0.0 {
            return Err(BastionError::InvalidConfig(format!(
                "no enemy tier available for wave {}",
                self.index
            )));
        }

        let mut roll = rng.gen_range(0.0..total);
        for tier in &unlocked {
            if roll < tier.weight {
                return Ok(tier);
            }
            roll -= tier.weight;
        }
        Ok(unlocked[unlocked.len() - 1])
    }

    fn roll_affixes(
        &self,
        tier: &EnemyTierConfig,
        config: &GameConfig,
        rng: &mut StdRng,
    ) -> Vec<Affix> {
        let difficulty = self.difficulty(config);
        let waves = &config.waves;
        let tuning = &config.affixes;
        let mut affixes = Vec::new();

        if tier.shieldable
            && difficulty >= waves.shield_first_wave
            && rng.gen_bool(waves.shield_chance.clamp(0.0, 1.0))
        {
            affixes.push(Affix::Shielded {
                amount: tuning.shield_amount,
            });
        }

        let chance = (waves.affix_chance_per_wave * difficulty as f64)
            .min(waves.affix_chance_cap)
            .clamp(0.0, 1.0);
        if chance > 0.0 && rng.gen_bool(chance) {
            let affix = match rng.gen_range(0..3) {
                0 => Affix::Armored {
                    reduction: tuning.armored_reduction,
                },
                1 => Affix::Swift {
                    speed_multiplier: tuning.swift_multiplier,
                },
                _ => Affix::Regenerating {
                    per_second: tuning.regen_per_second,
                },
            };
            affixes.push(affix);
        }

        affixes
    }
}

impl Generator<WavePlan> for WaveGenerator {
    fn generate(&self, config: &GameConfig, rng: &mut StdRng) -> BastionResult<WavePlan> {
        let count = self.enemy_count(config);
        let interval = self.spawn_interval(config);
        let mut spawns = Vec::with_capacity(count as usize);

        for i in 0..count {
            let tier = self.pick_tier(config, rng)?;
            let lane = rng.gen_range(0..config.lanes);
            let affixes = self.roll_affixes(tier, config, rng);
            spawns.push(PlannedSpawn {
                at: i as f64 * interval,
                lane,
                tier_id: tier.id.clone(),
                affixes,
            });
        }

        Ok(WavePlan {
            index: self.index,
            mode: self.mode,
            spawns,
        })
    }

    fn validate(&self, content: &WavePlan, config: &GameConfig) -> BastionResult<()> {
        if content.spawns.is_empty() {
            return Err(BastionError::InvalidState(format!(
                "wave {} has no spawns",
                content.index
            )));
        }
        for pair in content.spawns.windows(2) {
            if pair[1].at < pair[0].at {
                return Err(BastionError::InvalidState(format!(
                    "wave {} spawn times are not ordered",
                    content.index
                )));
            }
        }
        for spawn in &content.spawns {
            if spawn.lane >= config.lanes {
                return Err(BastionError::UnknownLane(spawn.lane));
            }
            if config.tier(&spawn.tier_id).is_none() {
                return Err(BastionError::InvalidState(format!(
                    "wave {} references unknown tier {}",
                    content.index, spawn.tier_id
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "WaveGenerator"
    }
}
