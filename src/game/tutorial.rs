//! # Tutorial
//!
//! Tracks which onboarding step the HUD should show. The engine only keeps
//! the position; the HUD owns the copy.

use crate::game::TutorialState;

/// Step ids in order.
pub const TUTORIAL_STEPS: [&str; 5] = [
    "welcome",
    "type-first-word",
    "place-turret",
    "upgrade-castle",
    "repair-castle",
];

#[derive(Debug, Clone)]
pub struct Tutorial {
    step: usize,
    completed: bool,
}

impl Default for Tutorial {
    fn default() -> Self {
        Self::new()
    }
}

impl Tutorial {
    pub fn new() -> Self {
        Self {
            step: 0,
            completed: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }

    pub fn current_step(&self) -> Option<&'static str> {
        if self.completed {
            None
        } else {
            TUTORIAL_STEPS.get(self.step).copied()
        }
    }

    /// Moves to the next step, completing after the last one.
    pub fn advance(&mut self) {
        if self.completed {
            return;
        }
        self.step += 1;
        if self.step >= TUTORIAL_STEPS.len() {
            self.step = TUTORIAL_STEPS.len();
            self.completed = true;
        }
    }

    /// Advances only if `step_id` is the current step.
    ///
    /// Lets gameplay milestones (first word, first turret) move the tutorial
    /// along without skipping steps the player has not seen.
    pub fn complete_step(&mut self, step_id: &str) {
        if self.current_step() == Some(step_id) {
            self.advance();
        }
    }

    pub fn replay(&mut self) {
        *self = Self::new();
    }

    pub fn skip(&mut self) {
        self.step = TUTORIAL_STEPS.len();
        self.completed = true;
    }

    pub fn snapshot(&self) -> TutorialState {
        TutorialState {
            active: self.is_active(),
            step: self.step,
            step_id: self.current_step().map(str::to_string),
            completed: self.completed,
            total_steps: TUTORIAL_STEPS.len(),
        }
    }
}
