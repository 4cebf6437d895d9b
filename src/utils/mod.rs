//! # Utilities Module
//!
//! Numeric helpers and countdown timers shared by the simulation systems.

pub mod math;
pub mod timers;

pub use math::*;
pub use timers::*;
