//! # Word Picking
//!
//! Chooses the words enemies carry. Words are drawn from the configured bank
//! by length, preferring initials no other live enemy is using so the first
//! keystroke engages an unambiguous target.

use crate::{BastionError, BastionResult, GameConfig, Generator};
use rand::rngs::StdRng;
use rand::Rng;

/// Picks a bank word with a length in `[min_length, max_length]`.
///
/// # Examples
///
/// ```
/// use bastion::{generation::utils, GameConfig, Generator, WordPicker};
///
/// let config = GameConfig::default();
/// let mut rng = utils::create_rng(7);
/// let word = WordPicker::new(3, 5).generate(&config, &mut rng).unwrap();
/// assert!((3..=5).contains(&word.len()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WordPicker {
    pub min_length: usize,
    pub max_length: usize,
    /// Initials already taken by live enemies
    pub avoid_initials: Vec<char>,
}

impl WordPicker {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
            avoid_initials: Vec::new(),
        }
    }

    /// Adds initials to steer away from.
    pub fn avoiding(mut self, initials: impl IntoIterator<Item = char>) -> Self {
        self.avoid_initials.extend(initials);
        self
    }

    fn fits(&self, word: &str) -> bool {
        let len = word.chars().count();
        len >= self.min_length && len <= self.max_length
    }
}

impl Generator<String> for WordPicker {
    fn generate(&self, config: &GameConfig, rng: &mut StdRng) -> BastionResult<String> {
        let candidates: Vec<&String> = config.words.iter().filter(|w| self.fits(w)).collect();
        if candidates.is_empty() {
            return Err(BastionError::InvalidConfig(format!(
                "no bank words between {} and {} letters",
                self.min_length, self.max_length
            )));
        }

        let fresh: Vec<&String> = candidates
            .iter()
            .copied()
            .filter(|w| {
                w.chars()
                    .next()
                    .map(|c| !self.avoid_initials.contains(&c))
                    .unwrap_or(false)
            })
            .collect();
        let pool = if fresh.is_empty() { &candidates } else { &fresh };

        let index = rng.gen_range(0..pool.len());
        Ok(pool[index].clone())
    }

    fn validate(&self, content: &String, _config: &GameConfig) -> BastionResult<()> {
        if !self.fits(content) {
            return Err(BastionError::InvalidState(format!(
                "picked word {} outside {}..={} letters",
                content, self.min_length, self.max_length
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "WordPicker"
    }
}
