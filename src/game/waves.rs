//! # Wave Scheduling
//!
//! Drives the wave timeline `countdown -> active -> countdown(next) -> ...`.
//!
//! The scheduler always holds the plan of the current (or upcoming) wave and
//! the plan after it, so spawn previews are exact. Each plan is generated from
//! its own derived seed, which keeps the timeline independent of how much
//! randomness the rest of the run consumes.

use crate::constants::EPSILON;
use crate::game::{GameMode, WaveSpawnPreview, WaveState};
use crate::generation::utils::{create_rng, derive_seed};
use crate::generation::{PlannedSpawn, WaveGenerator, WavePlan};
use crate::utils::Countdown;
use crate::{BastionError, BastionResult, GameConfig, Generator};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Where the scheduler is in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavePhase {
    /// Waiting for the wave at `index` to start
    Countdown,
    /// Spawning and fighting the wave at `index`
    Active,
    /// Final campaign wave cleared
    Finished,
}

/// What happened during one scheduler advance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveAdvance {
    /// Index of a wave that started this tick
    pub started: Option<u32>,
    /// Spawns that came due this tick, in schedule order
    pub spawns: Vec<PlannedSpawn>,
}

/// Result of closing a cleared wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveCompletion {
    pub index: u32,
    /// The cleared wave was the last one of the campaign
    pub final_wave: bool,
}

/// Wave timeline for one run.
#[derive(Debug, Clone)]
pub struct WaveScheduler {
    mode: GameMode,
    seed: u64,
    index: u32,
    total: u32,
    phase: WavePhase,
    countdown: Countdown,
    elapsed: f64,
    current: WavePlan,
    cursor: usize,
    next: Option<WavePlan>,
    replays: u32,
    start_requested: bool,
}

impl WaveScheduler {
    /// Creates the scheduler with wave 0 in its opening countdown.
    pub fn new(config: &GameConfig, mode: GameMode, seed: u64) -> BastionResult<Self> {
        let mut scheduler = Self {
            mode,
            seed,
            index: 0,
            total: config.waves.campaign_waves,
            phase: WavePhase::Countdown,
            countdown: Countdown::new(config.waves.first_countdown),
            elapsed: 0.0,
            current: WavePlan {
                index: 0,
                mode,
                spawns: Vec::new(),
            },
            cursor: 0,
            next: None,
            replays: 0,
            start_requested: false,
        };
        scheduler.current = scheduler.plan_for(0, 0, config)?;
        scheduler.next = scheduler.plan_after(0, config)?;
        Ok(scheduler)
    }

    fn plan_for(&self, index: u32, replay: u32, config: &GameConfig) -> BastionResult<WavePlan> {
        let salt = ((index as u64) << 20) | replay as u64;
        let mut rng = create_rng(derive_seed(self.seed, salt));
        WaveGenerator::new(index, self.mode).generate_validated(config, &mut rng)
    }

    fn plan_after(&self, index: u32, config: &GameConfig) -> BastionResult<Option<WavePlan>> {
        if self.has_wave(index + 1) {
            self.plan_for(index + 1, 0, config).map(Some)
        } else {
            Ok(None)
        }
    }

    fn has_wave(&self, index: u32) -> bool {
        match self.mode {
            GameMode::Campaign => index < self.total,
            GameMode::Practice => true,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.phase == WavePhase::Active
    }

    pub fn current_plan(&self) -> &WavePlan {
        &self.current
    }

    pub fn next_plan(&self) -> Option<&WavePlan> {
        self.next.as_ref()
    }

    /// Spawns of the current wave not yet released.
    pub fn remaining_spawns(&self) -> usize {
        match self.phase {
            WavePhase::Finished => 0,
            _ => self.current.len().saturating_sub(self.cursor),
        }
    }

    /// Asks for the upcoming wave to start on the next advance.
    pub fn request_start(&mut self) -> BastionResult<()> {
        if self.phase != WavePhase::Countdown {
            return Err(BastionError::InvalidState(format!(
                "wave {} is not waiting to start",
                self.index
            )));
        }
        self.start_requested = true;
        Ok(())
    }

    /// Advances the timeline and releases due spawns.
    pub fn advance(&mut self, dt: f64, config: &GameConfig) -> WaveAdvance {
        let mut advance = WaveAdvance::default();
        match self.phase {
            WavePhase::Finished => return advance,
            WavePhase::Countdown => {
                let due = if self.start_requested {
                    true
                } else if config.waves.autostart {
                    self.countdown.tick(dt) || !self.countdown.is_running()
                } else {
                    false
                };
                if !due {
                    return advance;
                }
                self.begin();
                advance.started = Some(self.index);
            }
            WavePhase::Active => {
                self.elapsed += dt;
            }
        }

        while let Some(spawn) = self.current.spawns.get(self.cursor) {
            if spawn.at > self.elapsed + EPSILON {
                break;
            }
            advance.spawns.push(spawn.clone());
            self.cursor += 1;
        }
        advance
    }

    fn begin(&mut self) {
        self.phase = WavePhase::Active;
        self.countdown.clear();
        self.elapsed = 0.0;
        self.cursor = 0;
        self.start_requested = false;
        info!(
            "Wave {} started ({} spawns)",
            self.index + 1,
            self.current.len()
        );
    }

    /// Whether the active wave has released every spawn and nothing is left alive.
    pub fn is_cleared(&self, enemies_alive: usize) -> bool {
        self.phase == WavePhase::Active
            && self.cursor >= self.current.len()
            && enemies_alive == 0
    }

    /// Closes the active wave and moves to the next countdown, or finishes
    /// the campaign.
    pub fn complete(&mut self, config: &GameConfig) -> BastionResult<WaveCompletion> {
        if self.phase != WavePhase::Active {
            return Err(BastionError::InvalidState(
                "no active wave to complete".to_string(),
            ));
        }
        let index = self.index;
        info!("Wave {} cleared", index + 1);

        if !self.has_wave(index + 1) {
            self.phase = WavePhase::Finished;
            self.next = None;
            return Ok(WaveCompletion {
                index,
                final_wave: true,
            });
        }

        let upcoming = match self.next.take() {
            Some(plan) => plan,
            None => self.plan_for(index + 1, 0, config)?,
        };
        self.index = index + 1;
        self.current = upcoming;
        self.next = self.plan_after(self.index, config)?;
        self.cursor = 0;
        self.elapsed = 0.0;
        self.replays = 0;
        self.phase = WavePhase::Countdown;
        self.countdown.start(config.waves.break_seconds);
        Ok(WaveCompletion {
            index,
            final_wave: false,
        })
    }

    /// Regenerates the current practice wave with a fresh seed and puts it
    /// back into countdown.
    pub fn replay(&mut self, config: &GameConfig) -> BastionResult<u32> {
        if self.mode != GameMode::Practice {
            return Err(BastionError::InvalidState(
                "waves can only be replayed in practice".to_string(),
            ));
        }
        self.replays += 1;
        self.current = self.plan_for(self.index, self.replays, config)?;
        self.cursor = 0;
        self.elapsed = 0.0;
        self.start_requested = false;
        self.phase = WavePhase::Countdown;
        self.countdown.start(config.waves.break_seconds);
        debug!("Replaying practice wave {} (#{})", self.index + 1, self.replays);
        Ok(self.index)
    }

    /// Upcoming spawns: the rest of the current wave, then all of the next one.
    pub fn previews(&self, config: &GameConfig) -> Vec<WaveSpawnPreview> {
        let offset = match self.phase {
            WavePhase::Finished => return Vec::new(),
            WavePhase::Countdown => self.countdown.remaining(),
            WavePhase::Active => -self.elapsed,
        };

        let mut previews: Vec<WaveSpawnPreview> = self.current.spawns[self.cursor.min(self.current.len())..]
            .iter()
            .map(|spawn| preview(spawn, (offset + spawn.at).max(0.0), false))
            .collect();

        if let Some(next) = &self.next {
            let current_end = (offset + self.current.span()).max(0.0);
            let start = current_end + config.waves.break_seconds;
            previews.extend(
                next.spawns
                    .iter()
                    .map(|spawn| preview(spawn, start + spawn.at, true)),
            );
        }
        previews
    }

    pub fn snapshot(&self, enemies_alive: usize) -> WaveState {
        WaveState {
            index: self.index,
            total: match self.mode {
                GameMode::Campaign => Some(self.total),
                GameMode::Practice => None,
            },
            in_countdown: self.phase == WavePhase::Countdown,
            countdown: self.countdown.remaining(),
            elapsed: self.elapsed,
            remaining_spawns: self.remaining_spawns(),
            enemies_alive,
        }
    }
}

fn preview(spawn: &PlannedSpawn, time_until: f64, is_next_wave: bool) -> WaveSpawnPreview {
    WaveSpawnPreview {
        lane: spawn.lane,
        tier_id: spawn.tier_id.clone(),
        time_until,
        shield: spawn.shield(),
        affixes: spawn.affixes.clone(),
        is_next_wave,
    }
}
