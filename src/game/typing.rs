//! # Typing Combat
//!
//! Resolves keystrokes against the engaged enemy's word.
//!
//! The resolver binds to one enemy at a time. A correct keystroke advances
//! that enemy's typed prefix; finishing the word deals direct damage scaled by
//! the current combo. A wrong keystroke keeps the progress, breaks the combo
//! and leaves an error hint for the HUD.

use crate::config::TypingConfig;
use crate::game::{EnemyId, EnemyRegistry, LaneIndex, TypingErrorHint, TypingState};
use crate::utils::ratio_or;
use log::trace;

/// What a finished word did.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCompletion {
    pub enemy_id: EnemyId,
    pub lane: LaneIndex,
    pub word: String,
    /// Damage dealt to health
    pub damage: f64,
    /// An intact shield soaked the word
    pub blocked: bool,
    pub killed: bool,
    /// No misses while the word was engaged
    pub perfect: bool,
    /// Combo after the completion
    pub combo: u32,
    /// Reaction sample when this completion was also the first hit
    pub reaction: Option<f64>,
}

/// Result of a single keystroke.
#[derive(Debug, Clone, PartialEq)]
pub enum KeystrokeOutcome {
    /// Control character or nothing to act on
    Ignored,
    /// Matched the next character of the engaged word
    Correct {
        enemy_id: EnemyId,
        /// Seconds from spawn to the first correct key against this enemy
        reaction: Option<f64>,
    },
    /// Matched the final character
    Completed(WordCompletion),
    /// Did not match
    Miss {
        expected: Option<char>,
        enemy_id: Option<EnemyId>,
    },
}

/// Typing buffer, combo and accuracy counters.
#[derive(Debug, Clone, Default)]
pub struct TypingResolver {
    buffer: String,
    active: Option<EnemyId>,
    combo: u32,
    best_combo: u32,
    combo_timer: f64,
    total_inputs: u64,
    correct_inputs: u64,
    errors: u64,
    word_errors: u32,
    error_hint: Option<TypingErrorHint>,
}

impl TypingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_enemy(&self) -> Option<EnemyId> {
        self.active
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    pub fn combo_timer(&self) -> f64 {
        self.combo_timer
    }

    pub fn total_inputs(&self) -> u64 {
        self.total_inputs
    }

    pub fn correct_inputs(&self) -> u64 {
        self.correct_inputs
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn error_hint(&self) -> Option<&TypingErrorHint> {
        self.error_hint.as_ref()
    }

    /// Cumulative accuracy over the run; 1.0 before any input.
    pub fn accuracy(&self) -> f64 {
        ratio_or(self.correct_inputs as f64, self.total_inputs as f64, 1.0)
    }

    /// Whether the combo is about to lapse.
    pub fn combo_warning(&self, config: &TypingConfig) -> bool {
        self.combo > 0 && self.combo_timer > 0.0 && self.combo_timer <= config.combo_warning_window
    }

    /// Damage of a finished word of `len` letters at the current combo.
    pub fn word_damage(&self, len: usize, config: &TypingConfig) -> f64 {
        let bonus = (self.combo as f64 * config.combo_damage_step).min(config.combo_damage_cap);
        (config.base_damage + config.damage_per_letter * len as f64) * (1.0 + bonus.max(0.0))
    }

    /// Resolves one keystroke.
    pub fn keystroke(
        &mut self,
        ch: char,
        time: f64,
        enemies: &mut EnemyRegistry,
        config: &TypingConfig,
    ) -> KeystrokeOutcome {
        if ch.is_control() {
            return KeystrokeOutcome::Ignored;
        }
        let ch = ch.to_ascii_lowercase();

        // The engaged enemy may have died or breached since the last key.
        if let Some(id) = self.active {
            if !enemies.get(id).map(|e| e.is_alive()).unwrap_or(false) {
                self.release();
            }
        }

        let target = match self.active {
            Some(id) => Some(id),
            None => enemies.find_engagement(ch),
        };
        let Some(enemy_id) = target else {
            return self.miss(None, ch, None, time);
        };
        let Some(enemy) = enemies.get_mut(enemy_id) else {
            return self.miss(None, ch, None, time);
        };

        let expected = enemy.next_char();
        if expected != Some(ch) {
            return self.miss(expected, ch, Some(enemy_id), time);
        }

        if self.active.is_none() {
            self.active = Some(enemy_id);
            self.word_errors = 0;
            self.buffer.clear();
        }

        enemy.typed += 1;
        self.buffer.push(ch);
        self.correct_inputs += 1;
        self.total_inputs += 1;
        if self.combo > 0 {
            self.combo_timer = config.combo_window;
        }

        let reaction = match enemy.first_typed_at {
            Some(_) => None,
            None => {
                enemy.first_typed_at = Some(time);
                Some((time - enemy.spawned_at).max(0.0))
            }
        };

        if !enemy.is_word_complete() {
            return KeystrokeOutcome::Correct { enemy_id, reaction };
        }

        let word = enemy.word.clone();
        let lane = enemy.lane;
        let damage = self.word_damage(enemy.word_len(), config);
        let outcome = enemy.apply_typed_damage(damage);
        if outcome.blocked {
            enemy.typed = 0;
        }

        self.combo += 1;
        self.best_combo = self.best_combo.max(self.combo);
        self.combo_timer = config.combo_window;
        let perfect = self.word_errors == 0;
        self.release();

        trace!(
            "Completed {} on {} for {:.1} (combo {})",
            word,
            enemy_id,
            outcome.health_damage,
            self.combo
        );
        KeystrokeOutcome::Completed(WordCompletion {
            enemy_id,
            lane,
            word,
            damage: outcome.health_damage,
            blocked: outcome.blocked,
            killed: outcome.killed,
            perfect,
            combo: self.combo,
            reaction,
        })
    }

    fn miss(
        &mut self,
        expected: Option<char>,
        received: char,
        enemy_id: Option<EnemyId>,
        time: f64,
    ) -> KeystrokeOutcome {
        self.total_inputs += 1;
        self.errors += 1;
        self.combo = 0;
        self.combo_timer = 0.0;
        if self.active.is_some() {
            self.word_errors += 1;
        }
        self.error_hint = Some(TypingErrorHint {
            expected,
            received,
            enemy_id,
            timestamp: time,
        });
        KeystrokeOutcome::Miss { expected, enemy_id }
    }

    /// Removes the last typed character. Not counted as an input.
    pub fn backspace(&mut self, enemies: &mut EnemyRegistry) {
        let Some(id) = self.active else {
            return;
        };
        match enemies.get_mut(id) {
            Some(enemy) if enemy.typed > 0 => {
                enemy.typed -= 1;
                self.buffer.pop();
            }
            Some(_) => {}
            None => self.release(),
        }
    }

    /// Drops the engaged enemy and resets its progress.
    pub fn purge(&mut self, enemies: &mut EnemyRegistry) {
        if let Some(enemy) = self.active.and_then(|id| enemies.get_mut(id)) {
            enemy.typed = 0;
        }
        self.release();
    }

    /// Releases the engagement if it points at `id`.
    pub fn release_enemy(&mut self, id: EnemyId) {
        if self.active == Some(id) {
            self.release();
        }
    }

    fn release(&mut self) {
        self.active = None;
        self.buffer.clear();
        self.word_errors = 0;
    }

    /// Counts the combo window down and drops stale hints.
    pub fn tick(&mut self, dt: f64, time: f64, config: &TypingConfig) {
        if self.combo > 0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 {
                self.combo = 0;
                self.combo_timer = 0.0;
            }
        }
        if let Some(hint) = &self.error_hint {
            if time - hint.timestamp >= config.error_hint_ttl {
                self.error_hint = None;
            }
        }
    }

    pub fn snapshot(&self, config: &TypingConfig) -> TypingState {
        TypingState {
            buffer: self.buffer.clone(),
            active_enemy_id: self.active,
            combo: self.combo,
            best_combo: self.best_combo,
            combo_warning: self.combo_warning(config),
            combo_timer: self.combo_timer,
            accuracy: self.accuracy(),
            total_inputs: self.total_inputs,
            correct_inputs: self.correct_inputs,
            errors: self.errors,
            error_hint: self.error_hint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EnemyBlueprint;
    use crate::GameConfig;

    fn spawn(registry: &mut EnemyRegistry, word: &str, health: f64, shield: Option<f64>) -> EnemyId {
        registry.insert(
            EnemyBlueprint {
                lane: 0,
                tier_id: "grunt".to_string(),
                word: word.to_string(),
                health,
                base_speed: 0.05,
                shield,
                affixes: Vec::new(),
                reward: 8.0,
                damage: 10.0,
                progress: 0.0,
                evacuation: false,
            },
            0.0,
        )
    }

    fn type_word(
        resolver: &mut TypingResolver,
        word: &str,
        registry: &mut EnemyRegistry,
        config: &TypingConfig,
    ) -> Vec<KeystrokeOutcome> {
        word.chars()
            .map(|c| resolver.keystroke(c, 1.0, registry, config))
            .collect()
    }

    #[test]
    fn test_accuracy_defaults_to_one() {
        let resolver = TypingResolver::new();
        assert_eq!(resolver.accuracy(), 1.0);
    }

    #[test]
    fn test_five_letter_word_gives_combo_one() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        let id = spawn(&mut registry, "amber", 100.0, None);
        let mut resolver = TypingResolver::new();

        let outcomes = type_word(&mut resolver, "amber", &mut registry, &config);
        assert_eq!(resolver.combo(), 1);
        assert_eq!(resolver.correct_inputs(), 5);
        assert_eq!(resolver.total_inputs(), 5);
        assert_eq!(resolver.active_enemy(), None);

        match outcomes.last().unwrap() {
            KeystrokeOutcome::Completed(done) => {
                assert_eq!(done.enemy_id, id);
                assert_eq!(done.damage, 30.0);
                assert!(done.perfect);
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert_eq!(registry.get(id).unwrap().health, 70.0);
    }

    #[test]
    fn test_miss_resets_combo_and_keeps_progress() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        spawn(&mut registry, "oak", 100.0, None);
        let id = spawn(&mut registry, "ember", 100.0, None);
        let mut resolver = TypingResolver::new();

        type_word(&mut resolver, "oak", &mut registry, &config);
        assert_eq!(resolver.combo(), 1);

        resolver.keystroke('e', 2.0, &mut registry, &config);
        resolver.keystroke('m', 2.0, &mut registry, &config);
        let miss = resolver.keystroke('x', 2.5, &mut registry, &config);
        assert_eq!(
            miss,
            KeystrokeOutcome::Miss {
                expected: Some('b'),
                enemy_id: Some(id)
            }
        );
        assert_eq!(resolver.combo(), 0);
        assert_eq!(resolver.combo_timer(), 0.0);
        assert_eq!(registry.get(id).unwrap().typed, 2);
        assert_eq!(resolver.buffer(), "em");

        let hint = resolver.error_hint().unwrap();
        assert_eq!(hint.expected, Some('b'));
        assert_eq!(hint.received, 'x');
        assert_eq!(hint.timestamp, 2.5);
        assert!((resolver.accuracy() - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_miss_without_target_has_no_expectation() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        spawn(&mut registry, "oak", 100.0, None);
        let mut resolver = TypingResolver::new();

        let miss = resolver.keystroke('z', 0.0, &mut registry, &config);
        assert_eq!(
            miss,
            KeystrokeOutcome::Miss {
                expected: None,
                enemy_id: None
            }
        );
        assert_eq!(resolver.total_inputs(), 1);
        assert_eq!(resolver.correct_inputs(), 0);
    }

    #[test]
    fn test_imperfect_word_after_miss() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        spawn(&mut registry, "oak", 100.0, None);
        let mut resolver = TypingResolver::new();

        resolver.keystroke('o', 0.0, &mut registry, &config);
        resolver.keystroke('q', 0.0, &mut registry, &config);
        resolver.keystroke('a', 0.0, &mut registry, &config);
        match resolver.keystroke('k', 0.0, &mut registry, &config) {
            KeystrokeOutcome::Completed(done) => assert!(!done.perfect),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_shield_blocks_typed_damage_and_resets_progress() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        let id = spawn(&mut registry, "oak", 50.0, Some(20.0));
        let mut resolver = TypingResolver::new();

        match type_word(&mut resolver, "oak", &mut registry, &config).pop() {
            Some(KeystrokeOutcome::Completed(done)) => {
                assert!(done.blocked);
                assert_eq!(done.damage, 0.0);
            }
            other => panic!("expected completion, got {:?}", other),
        }
        let enemy = registry.get(id).unwrap();
        assert_eq!(enemy.health, 50.0);
        assert_eq!(enemy.typed, 0);
    }

    #[test]
    fn test_combo_scales_damage_and_expires() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        let id = spawn(&mut registry, "oak", 1000.0, None);
        let mut resolver = TypingResolver::new();

        type_word(&mut resolver, "oak", &mut registry, &config);
        registry.get_mut(id).unwrap().assign_word("oak".to_string());
        type_word(&mut resolver, "oak", &mut registry, &config);
        // 26 plain, then 26 * 1.1
        assert!((registry.get(id).unwrap().health - (1000.0 - 26.0 - 28.6)).abs() < 1e-9);
        assert_eq!(resolver.combo(), 2);
        assert_eq!(resolver.best_combo(), 2);

        resolver.tick(3.0, 4.0, &config);
        assert!(resolver.combo_warning(&config));
        resolver.tick(1.5, 5.5, &config);
        assert_eq!(resolver.combo(), 0);
        assert!(!resolver.combo_warning(&config));
        assert_eq!(resolver.best_combo(), 2);
    }

    #[test]
    fn test_error_hint_goes_stale() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        let mut resolver = TypingResolver::new();
        resolver.keystroke('q', 1.0, &mut registry, &config);
        resolver.tick(0.1, 2.5, &config);
        assert!(resolver.error_hint().is_some());
        resolver.tick(0.1, 3.0, &config);
        assert!(resolver.error_hint().is_none());
    }

    #[test]
    fn test_backspace_and_purge() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        let id = spawn(&mut registry, "ember", 100.0, None);
        let mut resolver = TypingResolver::new();

        resolver.keystroke('e', 0.0, &mut registry, &config);
        resolver.keystroke('m', 0.0, &mut registry, &config);
        resolver.backspace(&mut registry);
        assert_eq!(registry.get(id).unwrap().typed, 1);
        assert_eq!(resolver.buffer(), "e");
        assert_eq!(resolver.total_inputs(), 2);

        resolver.purge(&mut registry);
        assert_eq!(resolver.active_enemy(), None);
        assert_eq!(registry.get(id).unwrap().typed, 0);
    }

    #[test]
    fn test_reaction_sampled_once_per_enemy() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        spawn(&mut registry, "ember", 100.0, None);
        let mut resolver = TypingResolver::new();

        let first = resolver.keystroke('e', 1.5, &mut registry, &config);
        assert_eq!(
            first,
            KeystrokeOutcome::Correct {
                enemy_id: EnemyId(1),
                reaction: Some(1.5)
            }
        );
        match resolver.keystroke('m', 2.0, &mut registry, &config) {
            KeystrokeOutcome::Correct { reaction, .. } => assert_eq!(reaction, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_control_characters_are_ignored() {
        let config = GameConfig::new().typing;
        let mut registry = EnemyRegistry::new();
        let mut resolver = TypingResolver::new();
        assert_eq!(
            resolver.keystroke('\n', 0.0, &mut registry, &config),
            KeystrokeOutcome::Ignored
        );
        assert_eq!(resolver.total_inputs(), 0);
    }
}
