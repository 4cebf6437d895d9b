//! # Lane Hazards
//!
//! Timed per-lane modifiers that slow turret fire. A lane holds at most one
//! hazard; applying a new one overwrites whatever was there.

use crate::config::HazardConfig;
use crate::game::{LaneHazardState, LaneIndex};
use crate::utils::Countdown;
use crate::{BastionError, BastionResult};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kinds of lane hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Fog,
    Storm,
    Ash,
}

impl HazardKind {
    /// Fire-rate multiplier used when the config does not list the kind.
    pub fn default_multiplier(self) -> f64 {
        match self {
            HazardKind::Fog => 0.75,
            HazardKind::Storm => 0.5,
            HazardKind::Ash => 0.6,
        }
    }
}

/// An active hazard on one lane.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneHazard {
    pub lane: LaneIndex,
    pub kind: HazardKind,
    pub timer: Countdown,
    pub fire_rate_multiplier: f64,
}

/// Owns the per-lane hazard slots and the roll cadence.
#[derive(Debug, Clone)]
pub struct HazardController {
    lanes: Vec<Option<LaneHazard>>,
    roll_timer: Countdown,
}

impl HazardController {
    /// Creates a controller with every lane clear.
    pub fn new(lanes: usize, config: &HazardConfig) -> Self {
        Self {
            lanes: vec![None; lanes],
            roll_timer: Countdown::new(config.roll_interval),
        }
    }

    /// Places a hazard on a lane, replacing any hazard already there.
    pub fn apply(
        &mut self,
        lane: LaneIndex,
        kind: HazardKind,
        duration: f64,
        fire_rate_multiplier: f64,
    ) -> BastionResult<()> {
        if !fire_rate_multiplier.is_finite() {
            return Err(BastionError::InvalidState(format!(
                "hazard multiplier must be finite, got {}",
                fire_rate_multiplier
            )));
        }
        let slot = self
            .lanes
            .get_mut(lane)
            .ok_or(BastionError::UnknownLane(lane))?;
        *slot = Some(LaneHazard {
            lane,
            kind,
            timer: Countdown::new(duration),
            fire_rate_multiplier: fire_rate_multiplier.max(0.0),
        });
        debug!(
            "Hazard {:?} on lane {} for {:.1}s (x{:.2})",
            kind, lane, duration, fire_rate_multiplier
        );
        Ok(())
    }

    /// Removes any hazard on the lane.
    pub fn clear(&mut self, lane: LaneIndex) {
        if let Some(slot) = self.lanes.get_mut(lane) {
            *slot = None;
        }
    }

    /// Active hazard on a lane.
    pub fn hazard(&self, lane: LaneIndex) -> Option<&LaneHazard> {
        self.lanes.get(lane).and_then(|slot| slot.as_ref())
    }

    /// Fire-rate multiplier for a lane; 1.0 when clear.
    pub fn multiplier(&self, lane: LaneIndex) -> f64 {
        self.hazard(lane)
            .map(|hazard| hazard.fire_rate_multiplier)
            .unwrap_or(1.0)
    }

    /// Counts every hazard down and clears the ones that expire.
    ///
    /// Returns the lanes cleared this tick.
    pub fn tick(&mut self, dt: f64) -> Vec<LaneIndex> {
        let mut cleared = Vec::new();
        for slot in &mut self.lanes {
            let expired = match slot {
                Some(hazard) => hazard.timer.tick(dt) || !hazard.timer.is_running(),
                None => false,
            };
            if expired {
                if let Some(hazard) = slot.take() {
                    cleared.push(hazard.lane);
                }
            }
        }
        cleared
    }

    /// Advances the roll cadence during active wave time and rolls new hazards
    /// on clear lanes when it elapses.
    pub fn roll(
        &mut self,
        dt: f64,
        wave_index: u32,
        config: &HazardConfig,
        rng: &mut StdRng,
    ) -> Vec<LaneIndex> {
        if !config.enabled || wave_index < config.first_wave || config.kinds.is_empty() {
            return Vec::new();
        }
        if !self.roll_timer.tick(dt) {
            return Vec::new();
        }
        self.roll_timer.start(config.roll_interval);

        let chance = config.chance.clamp(0.0, 1.0);
        let mut started = Vec::new();
        for lane in 0..self.lanes.len() {
            if self.lanes[lane].is_some() || !rng.gen_bool(chance) {
                continue;
            }
            let Some(entry) = pick_kind(config, rng) else {
                continue;
            };
            let duration = if config.max_duration > config.min_duration {
                rng.gen_range(config.min_duration..=config.max_duration)
            } else {
                config.min_duration
            };
            if self
                .apply(lane, entry.0, duration, entry.1)
                .is_ok()
            {
                started.push(lane);
            }
        }
        started
    }

    /// Restarts the roll cadence, used when a wave begins.
    pub fn reset_roll(&mut self, config: &HazardConfig) {
        self.roll_timer.start(config.roll_interval);
    }

    /// Snapshot of every active hazard, ordered by lane.
    pub fn snapshot(&self) -> Vec<LaneHazardState> {
        self.lanes
            .iter()
            .flatten()
            .map(|hazard| LaneHazardState {
                lane: hazard.lane,
                kind: hazard.kind,
                remaining: hazard.timer.remaining(),
                duration: hazard.timer.duration(),
                fire_rate_multiplier: hazard.fire_rate_multiplier,
            })
            .collect()
    }
}

/// Weighted pick of a hazard kind and its multiplier.
fn pick_kind(config: &HazardConfig, rng: &mut StdRng) -> Option<(HazardKind, f64)> {
    let total: f64 = config.kinds.iter().map(|k| k.weight.max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.gen_range(0.0..total);
    for entry in &config.kinds {
        let weight = entry.weight.max(0.0);
        if roll < weight {
            return Some((entry.kind, entry.fire_rate_multiplier));
        }
        roll -= weight;
    }
    config
        .kinds
        .last()
        .map(|entry| (entry.kind, entry.fire_rate_multiplier))
}
