//! # Analytics
//!
//! Per-wave accumulators and session totals. A wave's numbers are frozen
//! into a [`WaveSummary`] when it completes and never change afterwards.

use crate::constants::{MAX_TYPING_DRILLS, MAX_WAVE_HISTORY};
use crate::game::{AnalyticsState, GameMode, TypingDrillSummary, WaveSummary};
use crate::utils::{mean, ratio_or};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Typing drill result reported by the HUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingDrillReport {
    /// Drill flavour, e.g. "burst" or "endurance"
    pub mode: String,
    pub words_completed: u32,
    pub errors: u32,
    pub accuracy: f64,
    pub wpm: f64,
    pub best_combo: u32,
    pub duration: f64,
}

#[derive(Debug, Clone, Default)]
struct WaveAccumulator {
    index: u32,
    mode: GameMode,
    started_at: f64,
    turret_damage: f64,
    typing_damage: f64,
    shield_breaks: u32,
    repairs: u32,
    repair_health: f64,
    repair_gold: f64,
    perfect_words: u32,
    reactions: Vec<f64>,
    enemies_defeated: u32,
    breaches: u32,
    gold_earned: f64,
    max_combo: u32,
    correct_inputs: u64,
    total_inputs: u64,
}

impl WaveAccumulator {
    fn summarize(&self, now: f64, session_best_combo: u32) -> WaveSummary {
        let duration = (now - self.started_at).max(0.0);
        let dps = |damage: f64| ratio_or(damage, duration, 0.0);
        WaveSummary {
            index: self.index,
            mode: self.mode,
            duration,
            enemies_defeated: self.enemies_defeated,
            breaches: self.breaches,
            accuracy: ratio_or(self.correct_inputs as f64, self.total_inputs as f64, 1.0),
            perfect_words: self.perfect_words,
            average_reaction: mean(&self.reactions),
            dps: dps(self.turret_damage + self.typing_damage),
            turret_damage: self.turret_damage,
            typing_damage: self.typing_damage,
            turret_dps: dps(self.turret_damage),
            typing_dps: dps(self.typing_damage),
            shield_breaks: self.shield_breaks,
            repairs_used: self.repairs,
            repair_health: self.repair_health,
            repair_gold: self.repair_gold,
            gold_earned: self.gold_earned,
            max_combo: self.max_combo,
            session_best_combo,
        }
    }
}

/// Rolls up combat statistics for the run.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsAggregator {
    wave: Option<WaveAccumulator>,
    history: VecDeque<WaveSummary>,
    drills: VecDeque<TypingDrillSummary>,
    session_best_combo: u32,
    session_breaches: u32,
    total_shield_breaks: u32,
    total_turret_damage: f64,
    total_typing_damage: f64,
    total_perfect_words: u32,
    total_repairs: u32,
    enemies_defeated: u32,
    waves_completed: u32,
    campaign_waves_cleared: u32,
    time_to_first_turret: Option<f64>,
    reaction_total: f64,
    reaction_samples: u64,
}

impl AnalyticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh accumulator, discarding any unfinished one.
    pub fn begin_wave(&mut self, index: u32, mode: GameMode, time: f64) {
        self.wave = Some(WaveAccumulator {
            index,
            mode,
            started_at: time,
            ..WaveAccumulator::default()
        });
    }

    /// Drops the open accumulator without producing a summary.
    pub fn discard_wave(&mut self) {
        self.wave = None;
    }

    /// Closes the open wave and appends its summary to the history.
    pub fn finish_wave(&mut self, time: f64) -> Option<WaveSummary> {
        let wave = self.wave.take()?;
        let summary = wave.summarize(time, self.session_best_combo);
        self.waves_completed += 1;
        if summary.mode == GameMode::Campaign {
            self.campaign_waves_cleared += 1;
        }
        if self.history.len() == MAX_WAVE_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(summary.clone());
        Some(summary)
    }

    pub fn record_turret_damage(&mut self, amount: f64) {
        self.total_turret_damage += amount;
        if let Some(wave) = self.wave.as_mut() {
            wave.turret_damage += amount;
        }
    }

    pub fn record_typing_damage(&mut self, amount: f64) {
        self.total_typing_damage += amount;
        if let Some(wave) = self.wave.as_mut() {
            wave.typing_damage += amount;
        }
    }

    pub fn record_shield_break(&mut self) {
        self.total_shield_breaks += 1;
        if let Some(wave) = self.wave.as_mut() {
            wave.shield_breaks += 1;
        }
    }

    pub fn record_repair(&mut self, health: f64, gold: f64) {
        self.total_repairs += 1;
        if let Some(wave) = self.wave.as_mut() {
            wave.repairs += 1;
            wave.repair_health += health;
            wave.repair_gold += gold;
        }
    }

    pub fn record_perfect_word(&mut self) {
        self.total_perfect_words += 1;
        if let Some(wave) = self.wave.as_mut() {
            wave.perfect_words += 1;
        }
    }

    pub fn record_reaction(&mut self, seconds: f64) {
        self.reaction_total += seconds;
        self.reaction_samples += 1;
        if let Some(wave) = self.wave.as_mut() {
            wave.reactions.push(seconds);
        }
    }

    pub fn record_enemy_defeated(&mut self) {
        self.enemies_defeated += 1;
        if let Some(wave) = self.wave.as_mut() {
            wave.enemies_defeated += 1;
        }
    }

    pub fn record_breach(&mut self) {
        self.session_breaches += 1;
        if let Some(wave) = self.wave.as_mut() {
            wave.breaches += 1;
        }
    }

    pub fn record_gold(&mut self, amount: f64) {
        if let Some(wave) = self.wave.as_mut() {
            wave.gold_earned += amount;
        }
    }

    pub fn record_combo(&mut self, combo: u32) {
        self.session_best_combo = self.session_best_combo.max(combo);
        if let Some(wave) = self.wave.as_mut() {
            wave.max_combo = wave.max_combo.max(combo);
        }
    }

    pub fn record_input(&mut self, correct: bool) {
        if let Some(wave) = self.wave.as_mut() {
            wave.total_inputs += 1;
            if correct {
                wave.correct_inputs += 1;
            }
        }
    }

    /// Stores the first placement time. Later placements are ignored.
    pub fn record_turret_placed(&mut self, time: f64) {
        if self.time_to_first_turret.is_none() {
            self.time_to_first_turret = Some(time);
        }
    }

    /// Stores a typing drill result under a new id.
    pub fn record_typing_drill(&mut self, report: TypingDrillReport, time: f64) -> Uuid {
        let id = Uuid::new_v4();
        if self.drills.len() == MAX_TYPING_DRILLS {
            self.drills.pop_front();
        }
        self.drills.push_back(TypingDrillSummary {
            id,
            mode: report.mode,
            words_completed: report.words_completed,
            errors: report.errors,
            accuracy: report.accuracy.clamp(0.0, 1.0),
            wpm: report.wpm.max(0.0),
            best_combo: report.best_combo,
            duration: report.duration.max(0.0),
            timestamp: time,
        });
        id
    }

    pub fn wave_history(&self) -> impl Iterator<Item = &WaveSummary> {
        self.history.iter()
    }

    pub fn campaign_waves_cleared(&self) -> u32 {
        self.campaign_waves_cleared
    }

    pub fn time_to_first_turret(&self) -> Option<f64> {
        self.time_to_first_turret
    }

    pub fn snapshot(&self, time: f64) -> AnalyticsState {
        AnalyticsState {
            active_wave: self
                .wave
                .as_ref()
                .map(|wave| wave.summarize(time, self.session_best_combo)),
            wave_history: self.history.iter().cloned().collect(),
            session_best_combo: self.session_best_combo,
            session_breaches: self.session_breaches,
            total_shield_breaks: self.total_shield_breaks,
            total_turret_damage: self.total_turret_damage,
            total_typing_damage: self.total_typing_damage,
            total_perfect_words: self.total_perfect_words,
            total_repairs: self.total_repairs,
            enemies_defeated: self.enemies_defeated,
            waves_completed: self.waves_completed,
            campaign_waves_cleared: self.campaign_waves_cleared,
            time_to_first_turret: self.time_to_first_turret,
            average_reaction: (self.reaction_samples > 0)
                .then(|| self.reaction_total / self.reaction_samples as f64),
            typing_drills: self.drills.iter().cloned().collect(),
        }
    }
}
