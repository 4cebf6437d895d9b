//! # Scripted Lane Events
//!
//! Two timed mini-events share one lifecycle: `Idle -> Active -> Succeeded |
//! Failed`. A terminal phase stays visible in the snapshot until the next wave
//! starts (or, for boosts, the next trigger) and then returns to idle.
//!
//! - **Evacuation**: a carrier enemy with a long word walks a lane. Defeating
//!   it before the timer runs out pays a reward; letting the timer expire or
//!   the carrier reach the castle costs a penalty.
//! - **Support boost**: a long typing combo speeds up turret fire on one lane
//!   for a while, then cools down.

use crate::config::{EvacuationConfig, SupportBoostConfig};
use crate::game::{EnemyId, EvacuationState, LaneIndex, SupportBoostState};
use crate::utils::Countdown;
use crate::{BastionError, BastionResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lifecycle of a scripted event. `Succeeded` and `Failed` are exclusive by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
    #[default]
    Idle,
    Active,
    Succeeded,
    Failed,
}

impl EventPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, EventPhase::Succeeded | EventPhase::Failed)
    }
}

/// Evacuation event state.
///
/// An evacuation puts a carrier enemy on one lane. The lane's threat counts
/// as cleared once that carrier is defeated, by typing or by turrets, before
/// the timer runs out. Other enemies on the lane play no part. The evacuation
/// fails when the timer expires or the carrier reaches the castle.
#[derive(Debug, Clone, Default)]
pub struct EvacuationManager {
    phase: EventPhase,
    lane: Option<LaneIndex>,
    word: Option<String>,
    carrier: Option<EnemyId>,
    timer: Countdown,
    trigger: Option<Countdown>,
}

impl EvacuationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == EventPhase::Active
    }

    /// Carrier of the active evacuation.
    pub fn carrier(&self) -> Option<EnemyId> {
        if self.is_active() {
            self.carrier
        } else {
            None
        }
    }

    /// Whether an evacuation is queued for later in this wave.
    pub fn is_scheduled(&self) -> bool {
        self.trigger.is_some()
    }

    /// Clears the previous outcome and rolls whether this wave gets an evacuation.
    pub fn on_wave_start(&mut self, wave_index: u32, config: &EvacuationConfig, rng: &mut StdRng) {
        if !self.is_active() {
            *self = Self::default();
        }
        if config.enabled
            && wave_index >= config.first_wave
            && rng.gen_bool(config.chance.clamp(0.0, 1.0))
        {
            self.trigger = Some(Countdown::new(config.trigger_offset));
            debug!(
                "Evacuation scheduled {:.1}s into wave {}",
                config.trigger_offset, wave_index
            );
        }
    }

    /// Counts the scheduled trigger down. Returns true on the tick it is due.
    pub fn tick_schedule(&mut self, dt: f64) -> bool {
        let Some(trigger) = self.trigger.as_mut() else {
            return false;
        };
        if trigger.tick(dt) || !trigger.is_running() {
            self.trigger = None;
            return !self.is_active();
        }
        false
    }

    /// Starts an evacuation for a carrier that is already on the field.
    pub fn start(
        &mut self,
        lane: LaneIndex,
        word: String,
        carrier: EnemyId,
        config: &EvacuationConfig,
    ) -> BastionResult<()> {
        if self.is_active() {
            return Err(BastionError::InvalidState(
                "an evacuation is already running".to_string(),
            ));
        }
        info!("Evacuation started on lane {} ({})", lane, word);
        self.phase = EventPhase::Active;
        self.lane = Some(lane);
        self.word = Some(word);
        self.carrier = Some(carrier);
        self.timer = Countdown::new(config.duration);
        self.trigger = None;
        Ok(())
    }

    /// Counts the active timer down. Returns the carrier to remove when the
    /// evacuation fails by timeout.
    pub fn tick_active(&mut self, dt: f64) -> Option<EnemyId> {
        if !self.is_active() {
            return None;
        }
        if self.timer.tick(dt) || !self.timer.is_running() {
            info!("Evacuation failed: time ran out");
            self.phase = EventPhase::Failed;
            return self.carrier;
        }
        None
    }

    /// Resolves success when the defeated enemy is the carrier.
    pub fn on_enemy_defeated(&mut self, id: EnemyId) -> bool {
        if self.carrier() != Some(id) {
            return false;
        }
        info!("Evacuation succeeded");
        self.phase = EventPhase::Succeeded;
        self.timer.clear();
        true
    }

    /// Resolves failure when the breaching enemy is the carrier.
    pub fn on_enemy_breach(&mut self, id: EnemyId) -> bool {
        if self.carrier() != Some(id) {
            return false;
        }
        info!("Evacuation failed: carrier reached the castle");
        self.phase = EventPhase::Failed;
        self.timer.clear();
        true
    }

    /// Fails an active evacuation whose carrier vanished without resolution.
    pub fn abort(&mut self) -> Option<EnemyId> {
        if !self.is_active() {
            return None;
        }
        self.phase = EventPhase::Failed;
        self.timer.clear();
        self.carrier
    }

    pub fn snapshot(&self) -> EvacuationState {
        EvacuationState {
            active: self.phase == EventPhase::Active,
            succeeded: self.phase == EventPhase::Succeeded,
            failed: self.phase == EventPhase::Failed,
            lane: self.lane,
            remaining: self.timer.remaining(),
            duration: self.timer.duration(),
            word: self.word.clone(),
            enemy_id: self.carrier,
        }
    }
}

/// Support boost state.
#[derive(Debug, Clone, Default)]
pub struct SupportBoostManager {
    phase: EventPhase,
    lane: Option<LaneIndex>,
    multiplier: f64,
    timer: Countdown,
    cooldown: Countdown,
}

impl SupportBoostManager {
    pub fn new() -> Self {
        Self {
            multiplier: 1.0,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == EventPhase::Active
    }

    pub fn cooldown_remaining(&self) -> f64 {
        self.cooldown.remaining()
    }

    /// Whether a trigger would be accepted right now.
    pub fn can_trigger(&self) -> bool {
        !self.is_active() && !self.cooldown.is_running()
    }

    /// Starts a boost on a lane. Ignored while active or cooling down.
    pub fn trigger(&mut self, lane: LaneIndex, config: &SupportBoostConfig) -> BastionResult<()> {
        if self.is_active() {
            return Err(BastionError::InvalidState(
                "a support boost is already running".to_string(),
            ));
        }
        if self.cooldown.is_running() {
            return Err(BastionError::CooldownActive {
                what: "support boost",
                remaining: self.cooldown.remaining(),
            });
        }
        info!(
            "Support boost on lane {} (x{:.2} for {:.1}s)",
            lane, config.multiplier, config.duration
        );
        self.phase = EventPhase::Active;
        self.lane = Some(lane);
        self.multiplier = config.multiplier;
        self.timer = Countdown::new(config.duration);
        self.cooldown = Countdown::new(config.cooldown);
        Ok(())
    }

    /// Fire-rate multiplier the boost contributes to a lane.
    pub fn multiplier(&self, lane: LaneIndex) -> f64 {
        if self.is_active() && self.lane == Some(lane) {
            self.multiplier
        } else {
            1.0
        }
    }

    /// Advances the boost and its cooldown. Returns true when the boost ran
    /// its full course this tick.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.cooldown.tick(dt);
        if !self.is_active() {
            return false;
        }
        if self.timer.tick(dt) || !self.timer.is_running() {
            debug!("Support boost completed");
            self.phase = EventPhase::Succeeded;
            return true;
        }
        false
    }

    /// A breach on the boosted lane cancels the boost as failed.
    pub fn on_breach(&mut self, lane: LaneIndex) -> bool {
        if !self.is_active() || self.lane != Some(lane) {
            return false;
        }
        debug!("Support boost failed: lane {} breached", lane);
        self.phase = EventPhase::Failed;
        self.timer.clear();
        true
    }

    /// Clears a finished outcome at the start of a wave.
    pub fn on_wave_start(&mut self) {
        if self.phase.is_terminal() {
            self.phase = EventPhase::Idle;
            self.lane = None;
            self.timer = Countdown::idle();
        }
    }

    pub fn snapshot(&self) -> SupportBoostState {
        SupportBoostState {
            active: self.phase == EventPhase::Active,
            succeeded: self.phase == EventPhase::Succeeded,
            failed: self.phase == EventPhase::Failed,
            lane: self.lane,
            remaining: self.timer.remaining(),
            duration: self.timer.duration(),
            multiplier: if self.is_active() { self.multiplier } else { 1.0 },
            cooldown_remaining: self.cooldown.remaining(),
        }
    }
}
