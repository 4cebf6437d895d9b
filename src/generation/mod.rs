//! # Generation Module
//!
//! Seeded procedural content for a run: wave composition and enemy words.
//!
//! Every generator draws from an explicit `StdRng`, so the same seed always
//! yields the same waves and the same words. Generators never touch engine
//! state; they turn configuration plus randomness into plain data.

pub mod waves;
pub mod words;

pub use waves::*;
pub use words::*;

use crate::{BastionResult, GameConfig};
use rand::rngs::StdRng;

/// Trait for procedural generators.
///
/// All generation systems in Bastion implement this trait, allowing for
/// consistent interfaces and seeded, reproducible output.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GameConfig, rng: &mut StdRng) -> BastionResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GameConfig) -> BastionResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;

    /// Generates and validates in one step.
    fn generate_validated(&self, config: &GameConfig, rng: &mut StdRng) -> BastionResult<T> {
        let content = self.generate(config, rng)?;
        self.validate(&content, config)?;
        log::trace!("{} produced validated content", self.generator_type());
        Ok(content)
    }
}

/// Utility functions for generation algorithms.
pub mod utils {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Creates a seeded random number generator.
    pub fn create_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Derives an independent seed from a base seed and a salt.
    ///
    /// Used so each wave (and each practice replay) gets its own stream
    /// without consuming the run's main generator.
    pub fn derive_seed(base: u64, salt: u64) -> u64 {
        // splitmix64 finaliser
        let mut z = base ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}
