//! # Input Module
//!
//! The two sides of the HUD contract.
//!
//! Inbound, the HUD calls fire-and-forget intent methods on [`HudCallbacks`].
//! Each call becomes a [`HudCommand`] on a [`CommandQueue`] that the engine
//! drains at the start of its next tick. Nothing is returned: whether an
//! intent was legal shows up only in the next snapshot.
//!
//! Outbound, the engine hands each finished snapshot to a [`HudSink`].

pub mod commands;

pub use commands::*;

use crate::game::{GameState, TargetingPriority, TypingDrillReport, WaveSpawnPreview};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Presentation hints forwarded to the HUD. They never affect the simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationOptions {
    pub color_blind_mode: bool,
    pub reduced_motion: bool,
    /// Host-supplied clock for HUD animations
    pub wall_clock_override: Option<f64>,
}

impl PresentationOptions {
    /// Applies a toggle from the HUD.
    pub fn set(&mut self, option: GameOption, enabled: bool) {
        match option {
            GameOption::ColorBlindMode => self.color_blind_mode = enabled,
            GameOption::ReducedMotion => self.reduced_motion = enabled,
        }
    }
}

/// Intent methods the HUD calls.
///
/// Implementors only provide [`dispatch`](HudCallbacks::dispatch); every
/// intent method forwards a tagged command to it.
pub trait HudCallbacks {
    /// Queues one command for the next tick.
    fn dispatch(&self, command: HudCommand);

    fn on_start(&self) {
        self.dispatch(HudCommand::Start);
    }

    fn on_pause(&self) {
        self.dispatch(HudCommand::Pause);
    }

    fn on_resume(&self) {
        self.dispatch(HudCommand::Resume);
    }

    fn on_toggle_pause(&self) {
        self.dispatch(HudCommand::TogglePause);
    }

    fn on_start_wave(&self) {
        self.dispatch(HudCommand::StartWave);
    }

    fn on_castle_upgrade(&self) {
        self.dispatch(HudCommand::UpgradeCastle);
    }

    fn on_castle_repair(&self) {
        self.dispatch(HudCommand::RepairCastle);
    }

    fn on_place_turret(&self, slot: &str, type_id: &str) {
        self.dispatch(HudCommand::PlaceTurret {
            slot: slot.to_string(),
            type_id: type_id.to_string(),
        });
    }

    fn on_upgrade_turret(&self, slot: &str) {
        self.dispatch(HudCommand::UpgradeTurret {
            slot: slot.to_string(),
        });
    }

    fn on_downgrade_turret(&self, slot: &str) {
        self.dispatch(HudCommand::DowngradeTurret {
            slot: slot.to_string(),
        });
    }

    fn on_targeting_change(&self, slot: &str, priority: TargetingPriority) {
        self.dispatch(HudCommand::SetTargetingPriority {
            slot: slot.to_string(),
            priority,
        });
    }

    fn on_keystroke(&self, key: char) {
        self.dispatch(HudCommand::Keystroke { key });
    }

    /// Queues one keystroke per character.
    fn on_text(&self, text: &str) {
        for key in text.chars() {
            self.on_keystroke(key);
        }
    }

    fn on_backspace(&self) {
        self.dispatch(HudCommand::Backspace);
    }

    fn on_purge_buffer(&self) {
        self.dispatch(HudCommand::PurgeBuffer);
    }

    fn on_replay_wave(&self) {
        self.dispatch(HudCommand::ReplayWave);
    }

    fn on_tutorial_advance(&self) {
        self.dispatch(HudCommand::AdvanceTutorial);
    }

    fn on_tutorial_replay(&self) {
        self.dispatch(HudCommand::ReplayTutorial);
    }

    fn on_tutorial_skip(&self) {
        self.dispatch(HudCommand::SkipTutorial);
    }

    fn on_option_toggle(&self, option: GameOption, enabled: bool) {
        self.dispatch(HudCommand::SetOption { option, enabled });
    }

    fn on_typing_drill_recorded(&self, report: TypingDrillReport) {
        self.dispatch(HudCommand::RecordTypingDrill { report });
    }
}

/// Shared handle to the engine's pending commands.
///
/// Cloning shares the same queue, so the HUD can keep one handle while the
/// engine keeps another. Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: Rc<RefCell<VecDeque<HudCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: HudCommand) {
        self.pending.borrow_mut().push_back(command);
    }

    /// Takes every pending command in arrival order.
    pub fn drain(&self) -> Vec<HudCommand> {
        self.pending.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl HudCallbacks for CommandQueue {
    fn dispatch(&self, command: HudCommand) {
        self.push(command);
    }
}

/// Receives one finished snapshot per tick.
pub trait HudSink {
    fn update(
        &mut self,
        state: &GameState,
        upcoming: &[WaveSpawnPreview],
        options: &PresentationOptions,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_queue() {
        let engine_side = CommandQueue::new();
        let hud_side = engine_side.clone();
        hud_side.on_place_turret("s1", "arrow");
        hud_side.on_text("ab");

        assert_eq!(engine_side.len(), 3);
        let drained = engine_side.drain();
        assert_eq!(drained[1], HudCommand::Keystroke { key: 'a' });
        assert!(hud_side.is_empty());
    }

    #[test]
    fn test_option_toggle() {
        let mut options = PresentationOptions::default();
        options.set(GameOption::ColorBlindMode, true);
        assert!(options.color_blind_mode);
        assert!(!options.reduced_motion);
    }
}
