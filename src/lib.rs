//! # Bastion
//!
//! Simulation engine for a typing tower-defense game.
//!
//! ## Architecture Overview
//!
//! Enemies walk lanes toward a castle. The player types the words they carry to
//! damage them directly, and places turrets that fire on their own. Everything
//! that changes during a run lives inside a single [`Engine`] instance:
//!
//! - **Config**: static content tables (turrets, castle levels, enemy tiers, tuning)
//! - **Game**: the tick-driven subsystems (waves, turrets, typing, economy,
//!   hazards, scripted events, analytics) and the snapshot they assemble
//! - **Generation**: seeded procedural wave composition and word picking
//! - **Input**: the command queue the HUD pushes intents into, and the
//!   outbound sink it renders from
//!
//! ## HUD contract
//!
//! The HUD never touches engine internals. It reads the [`GameState`] produced at
//! the end of each tick and forwards user intent through [`HudCallbacks`]. Queued
//! commands are applied at the start of the next tick.

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

// Core module re-exports
pub use config::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

// Explicit re-exports for the types hosts touch most often
pub use game::{
    // From engine
    Engine,
    // From identifiers
    EnemyId,
    GameMode,
    GameStatus,
    RunId,
    TargetingPriority,
    // From snapshot
    GameState,
    WaveSpawnPreview,
    WaveSummary,
};

pub use input::{CommandQueue, HudCallbacks, HudCommand, HudSink, PresentationOptions};

/// Core error type for the Bastion engine.
///
/// Most variants describe why a HUD command was rejected. The engine never
/// surfaces those to the HUD; they are logged and dropped, and the rejection
/// is visible only through unchanged state.
#[derive(thiserror::Error, Debug)]
pub enum BastionError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration tables are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Game state is invalid for the requested operation
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Not enough gold
    #[error("Insufficient gold: need {cost}, have {gold}")]
    InsufficientGold { cost: f64, gold: f64 },

    /// Slot id does not exist in the layout
    #[error("Unknown turret slot: {0}")]
    UnknownSlot(String),

    /// Slot exists but the castle level does not unlock it yet
    #[error("Turret slot {slot} unlocks at castle level {required}")]
    SlotLocked { slot: String, required: u32 },

    /// Slot already holds a turret
    #[error("Turret slot {0} is occupied")]
    SlotOccupied(String),

    /// Slot holds no turret
    #[error("Turret slot {0} is empty")]
    SlotEmpty(String),

    /// Turret archetype id does not exist
    #[error("Unknown turret type: {0}")]
    UnknownTurretType(String),

    /// Turret archetype exists but is disabled
    #[error("Turret type {0} is disabled")]
    TurretTypeDisabled(String),

    /// Upgrade requested past the archetype's last level
    #[error("Turret in slot {slot} is already at max level {level}")]
    MaxLevel { slot: String, level: u32 },

    /// Castle upgrade requested at the top of the level table
    #[error("Castle is already at max level {0}")]
    CastleMaxLevel(u32),

    /// Repair refused; every blocking condition is reported
    #[error("Castle repair blocked: {0}")]
    RepairBlocked(crate::game::RepairBlockers),

    /// A timed action is still cooling down
    #[error("{what} is on cooldown for {remaining:.2}s")]
    CooldownActive { what: &'static str, remaining: f64 },

    /// Lane index outside the configured lane count
    #[error("Unknown lane: {0}")]
    UnknownLane(usize),

    /// Command needs a different run status
    #[error("Command requires status {expected}, run is {actual}")]
    WrongStatus { expected: &'static str, actual: String },
}

/// Result type used throughout the Bastion codebase.
pub type BastionResult<T> = Result<T, BastionError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine-wide constants.
pub mod constants {
    /// Progress value at which an enemy reaches the castle.
    pub const LANE_END: f64 = 1.0;

    /// Tolerance used when comparing gold, health and countdowns.
    pub const EPSILON: f64 = 1e-9;

    /// Tier id given to evacuation carriers.
    pub const EVACUATION_TIER_ID: &str = "evacuee";

    /// Default simulation step for hosts that run a fixed-delta loop.
    pub const DEFAULT_TICK_SECONDS: f64 = 0.05;

    /// Maximum number of wave summaries kept in the analytics history.
    pub const MAX_WAVE_HISTORY: usize = 100;

    /// Maximum number of typing drill results kept in the analytics.
    pub const MAX_TYPING_DRILLS: usize = 100;
}
