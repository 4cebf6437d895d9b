//! # HUD Commands
//!
//! Tagged values for every intent the HUD can express. Commands are queued
//! and applied at the start of the next tick, never mid-tick.

use crate::game::{TargetingPriority, TypingDrillReport};
use serde::{Deserialize, Serialize};

/// Presentation toggles the HUD can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameOption {
    ColorBlindMode,
    ReducedMotion,
}

/// One player intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HudCommand {
    /// Leave the menu and begin the run
    Start,
    Pause,
    Resume,
    TogglePause,
    /// Skip the remaining countdown and start the upcoming wave
    StartWave,
    UpgradeCastle,
    RepairCastle,
    #[serde(rename_all = "camelCase")]
    PlaceTurret { slot: String, type_id: String },
    UpgradeTurret { slot: String },
    /// Step down one level, removing the turret at level 1
    DowngradeTurret { slot: String },
    SetTargetingPriority {
        slot: String,
        priority: TargetingPriority,
    },
    Keystroke { key: char },
    Backspace,
    /// Drop the engaged enemy and its typed progress
    PurgeBuffer,
    /// Regenerate and restart the current practice wave
    ReplayWave,
    AdvanceTutorial,
    ReplayTutorial,
    SkipTutorial,
    SetOption { option: GameOption, enabled: bool },
    RecordTypingDrill { report: TypingDrillReport },
}

impl HudCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            HudCommand::Start => "start",
            HudCommand::Pause => "pause",
            HudCommand::Resume => "resume",
            HudCommand::TogglePause => "togglePause",
            HudCommand::StartWave => "startWave",
            HudCommand::UpgradeCastle => "upgradeCastle",
            HudCommand::RepairCastle => "repairCastle",
            HudCommand::PlaceTurret { .. } => "placeTurret",
            HudCommand::UpgradeTurret { .. } => "upgradeTurret",
            HudCommand::DowngradeTurret { .. } => "downgradeTurret",
            HudCommand::SetTargetingPriority { .. } => "setTargetingPriority",
            HudCommand::Keystroke { .. } => "keystroke",
            HudCommand::Backspace => "backspace",
            HudCommand::PurgeBuffer => "purgeBuffer",
            HudCommand::ReplayWave => "replayWave",
            HudCommand::AdvanceTutorial => "advanceTutorial",
            HudCommand::ReplayTutorial => "replayTutorial",
            HudCommand::SkipTutorial => "skipTutorial",
            HudCommand::SetOption { .. } => "setOption",
            HudCommand::RecordTypingDrill { .. } => "recordTypingDrill",
        }
    }

    /// Whether the command changes the simulation. Presentation and tutorial
    /// commands are accepted in any status.
    pub fn is_gameplay(&self) -> bool {
        !matches!(
            self,
            HudCommand::Start
                | HudCommand::Pause
                | HudCommand::Resume
                | HudCommand::TogglePause
                | HudCommand::AdvanceTutorial
                | HudCommand::ReplayTutorial
                | HudCommand::SkipTutorial
                | HudCommand::SetOption { .. }
                | HudCommand::RecordTypingDrill { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_shape() {
        let command = HudCommand::PlaceTurret {
            slot: "s1".to_string(),
            type_id: "arrow".to_string(),
        };
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(json, r#"{"type":"placeTurret","slot":"s1","typeId":"arrow"}"#);

        let parsed: HudCommand = serde_json::from_str(r#"{"type":"keystroke","key":"a"}"#).unwrap();
        assert_eq!(parsed, HudCommand::Keystroke { key: 'a' });
    }

    #[test]
    fn test_gameplay_classification() {
        assert!(HudCommand::UpgradeCastle.is_gameplay());
        assert!(HudCommand::Keystroke { key: 'x' }.is_gameplay());
        assert!(!HudCommand::Pause.is_gameplay());
        assert!(!HudCommand::SetOption {
            option: GameOption::ReducedMotion,
            enabled: true
        }
        .is_gameplay());
    }
}
