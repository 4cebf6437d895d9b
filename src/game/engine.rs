//! # Engine
//!
//! One [`Engine`] owns everything that changes during a run. Hosts drive it
//! with [`Engine::tick`]; the HUD pushes intents through the queue returned
//! by [`Engine::callbacks`] and reads the snapshot back.
//!
//! A tick runs in three phases:
//!
//! 1. Drain the command queue and apply each command atomically. Rejected
//!    commands are logged and counted, never reported to the HUD.
//! 2. If the run is playing, advance the simulation by `dt`.
//! 3. Rebuild the snapshot and spawn previews.
//!
//! The snapshot is only ever replaced as a whole, so a reader never sees a
//! half-applied tick.

use crate::constants::EVACUATION_TIER_ID;
use crate::game::{
    AnalyticsAggregator, Castle, EconomyLedger, EnemyBlueprint, EnemyId, EnemyRegistry,
    EnemySpawn, EvacuationManager, GameMode, GameState, GameStatus, GoldReason,
    HazardController, HazardKind, KeystrokeOutcome, LaneIndex, RunId, SupportBoostManager,
    Tutorial, TurretGrid, TypingResolver, WaveScheduler, WaveSpawnPreview, WordCompletion,
};
use crate::generation::utils::create_rng;
use crate::generation::{Generator, PlannedSpawn, WordPicker};
use crate::input::{CommandQueue, HudCallbacks, HudCommand, HudSink, PresentationOptions};
use crate::utils::sanitize_delta;
use crate::{BastionError, BastionResult, GameConfig};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Runs a single game session.
///
/// # Examples
///
/// ```
/// use bastion::{Engine, GameConfig, GameMode, GameStatus, HudCallbacks};
///
/// let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 7).unwrap();
/// let hud = engine.callbacks();
/// hud.on_start();
/// hud.on_place_turret("s1", "arrow");
/// engine.tick(0.05);
///
/// let state = engine.snapshot();
/// assert_eq!(state.status, GameStatus::Playing);
/// assert_eq!(state.resources.gold, 60.0);
/// ```
pub struct Engine {
    sim: Simulation,
    commands: CommandQueue,
    options: PresentationOptions,
    snapshot: GameState,
    previews: Vec<WaveSpawnPreview>,
    rejected: u64,
}

impl Engine {
    /// Creates a run in the menu state. Fails when the configuration does
    /// not validate.
    pub fn new(config: GameConfig, mode: GameMode, seed: u64) -> BastionResult<Self> {
        config.validate()?;
        let sim = Simulation::new(config, mode, seed)?;
        let snapshot = sim.assemble();
        let previews = sim.waves.previews(&sim.config);
        info!(
            "Created {:?} run {} with seed {}",
            mode, sim.run_id, seed
        );
        Ok(Self {
            sim,
            commands: CommandQueue::new(),
            options: PresentationOptions::default(),
            snapshot,
            previews,
            rejected: 0,
        })
    }

    /// Handle the HUD uses to send intents. Every clone feeds the same queue.
    pub fn callbacks(&self) -> CommandQueue {
        self.commands.clone()
    }

    /// Queues a command for the next tick.
    pub fn queue(&self, command: HudCommand) {
        self.commands.dispatch(command);
    }

    /// Applies queued commands, advances the simulation by `dt` seconds when
    /// playing, and rebuilds the snapshot.
    pub fn tick(&mut self, dt: f64) {
        for command in self.commands.drain() {
            let name = command.name();
            let result = match command {
                HudCommand::SetOption { option, enabled } => {
                    self.options.set(option, enabled);
                    Ok(())
                }
                other => self.sim.apply(other),
            };
            if let Err(err) = result {
                self.rejected += 1;
                debug!("Rejected {} command: {}", name, err);
            }
        }
        // Words finished by this tick's keystrokes settle even if play stops
        self.sim.resolve_defeated();

        if self.sim.status == GameStatus::Playing {
            if let Err(err) = self.sim.step(dt) {
                warn!("Simulation step failed: {}", err);
            }
        }

        self.refresh();
    }

    fn refresh(&mut self) {
        self.snapshot = self.sim.assemble();
        self.previews = self.sim.waves.previews(&self.sim.config);
    }

    /// The snapshot produced by the last tick.
    pub fn snapshot(&self) -> &GameState {
        &self.snapshot
    }

    /// Upcoming spawns as of the last tick.
    pub fn previews(&self) -> &[WaveSpawnPreview] {
        &self.previews
    }

    /// Hands the last snapshot to the HUD.
    pub fn render(&self, sink: &mut impl HudSink) {
        sink.update(&self.snapshot, &self.previews, &self.options);
    }

    /// Commands rejected since the run was created.
    pub fn rejected_commands(&self) -> u64 {
        self.rejected
    }

    pub fn status(&self) -> GameStatus {
        self.sim.status
    }

    pub fn mode(&self) -> GameMode {
        self.sim.mode
    }

    pub fn run_id(&self) -> RunId {
        self.sim.run_id
    }

    pub fn time(&self) -> f64 {
        self.sim.time
    }

    pub fn config(&self) -> &GameConfig {
        &self.sim.config
    }

    pub fn options(&self) -> &PresentationOptions {
        &self.options
    }

    /// Sets the clock the HUD should animate against.
    pub fn set_wall_clock_override(&mut self, seconds: Option<f64>) {
        self.options.wall_clock_override = seconds;
    }

    /// Puts an enemy on the field immediately. Missing stats come from its
    /// tier, and a missing word is picked from the bank.
    ///
    /// The change shows in the snapshot after the next tick.
    pub fn spawn_enemy(&mut self, spawn: EnemySpawn) -> BastionResult<EnemyId> {
        self.sim.spawn(spawn)
    }

    /// Places a hazard on a lane using the configured multiplier for its kind.
    pub fn apply_hazard(
        &mut self,
        lane: LaneIndex,
        kind: HazardKind,
        duration: f64,
    ) -> BastionResult<()> {
        let multiplier = self.sim.config.hazards.multiplier_for(kind);
        self.sim.hazards.apply(lane, kind, duration, multiplier)
    }

    /// Places a hazard with an explicit fire-rate multiplier.
    pub fn apply_hazard_with_multiplier(
        &mut self,
        lane: LaneIndex,
        kind: HazardKind,
        duration: f64,
        fire_rate_multiplier: f64,
    ) -> BastionResult<()> {
        self.sim
            .hazards
            .apply(lane, kind, duration, fire_rate_multiplier)
    }

    /// Starts an evacuation on a lane right away. Returns the carrier id.
    pub fn start_evacuation(&mut self, lane: LaneIndex) -> BastionResult<EnemyId> {
        self.sim.launch_evacuation(Some(lane))
    }

    /// Starts a support boost on a lane, bypassing the combo threshold.
    pub fn trigger_support_boost(&mut self, lane: LaneIndex) -> BastionResult<()> {
        self.sim.check_lane(lane)?;
        self.sim.support.trigger(lane, &self.sim.config.support_boost)
    }
}

/// Every piece of mutable run state.
struct Simulation {
    config: GameConfig,
    run_id: RunId,
    mode: GameMode,
    status: GameStatus,
    time: f64,
    rng: StdRng,
    castle: Castle,
    ledger: EconomyLedger,
    typing: TypingResolver,
    enemies: EnemyRegistry,
    turrets: TurretGrid,
    waves: WaveScheduler,
    hazards: HazardController,
    evacuation: EvacuationManager,
    support: SupportBoostManager,
    analytics: AnalyticsAggregator,
    tutorial: Tutorial,
}

impl Simulation {
    fn new(config: GameConfig, mode: GameMode, seed: u64) -> BastionResult<Self> {
        let castle = Castle::new(&config)?;
        let mut ledger = EconomyLedger::new(
            config.economy.starting_gold,
            config.economy.gold_event_history,
        );
        ledger.set_bonus_percent(castle.gold_bonus_percent());
        let waves = WaveScheduler::new(&config, mode, seed)?;
        let hazards = HazardController::new(config.lanes, &config.hazards);
        let turrets = TurretGrid::new(&config);

        Ok(Self {
            run_id: crate::game::new_run_id(),
            mode,
            status: GameStatus::Menu,
            time: 0.0,
            rng: create_rng(seed),
            castle,
            ledger,
            typing: TypingResolver::new(),
            enemies: EnemyRegistry::new(),
            turrets,
            waves,
            hazards,
            evacuation: EvacuationManager::new(),
            support: SupportBoostManager::new(),
            analytics: AnalyticsAggregator::new(),
            tutorial: Tutorial::new(),
            config,
        })
    }

    fn check_lane(&self, lane: LaneIndex) -> BastionResult<()> {
        if lane < self.config.lanes {
            Ok(())
        } else {
            Err(BastionError::UnknownLane(lane))
        }
    }

    fn require_status(&self, expected: GameStatus) -> BastionResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(BastionError::WrongStatus {
                expected: expected.as_str(),
                actual: self.status.to_string(),
            })
        }
    }

    fn apply(&mut self, command: HudCommand) -> BastionResult<()> {
        if command.is_gameplay() {
            self.require_status(GameStatus::Playing)?;
        }

        match command {
            HudCommand::Start => {
                self.require_status(GameStatus::Menu)?;
                self.status = GameStatus::Playing;
                info!("Run {} started", self.run_id);
            }
            HudCommand::Pause => {
                self.require_status(GameStatus::Playing)?;
                self.status = GameStatus::Paused;
            }
            HudCommand::Resume => {
                self.require_status(GameStatus::Paused)?;
                self.status = GameStatus::Playing;
            }
            HudCommand::TogglePause => match self.status {
                GameStatus::Playing => self.status = GameStatus::Paused,
                GameStatus::Paused => self.status = GameStatus::Playing,
                other => {
                    return Err(BastionError::WrongStatus {
                        expected: "playing or paused",
                        actual: other.to_string(),
                    })
                }
            },
            HudCommand::StartWave => self.waves.request_start()?,
            HudCommand::UpgradeCastle => {
                self.castle
                    .upgrade(&self.config, &mut self.ledger, self.time)?;
                self.tutorial.complete_step("upgrade-castle");
            }
            HudCommand::RepairCastle => {
                let cost = self.config.repair.cost;
                let healed = self
                    .castle
                    .repair(&self.config, &mut self.ledger, self.time)?;
                self.analytics.record_repair(healed, cost);
                self.tutorial.complete_step("repair-castle");
            }
            HudCommand::PlaceTurret { slot, type_id } => {
                self.turrets.place(
                    &slot,
                    &type_id,
                    self.castle.level(),
                    &self.config,
                    &mut self.ledger,
                    self.time,
                )?;
                self.analytics.record_turret_placed(self.time);
                self.tutorial.complete_step("place-turret");
            }
            HudCommand::UpgradeTurret { slot } => {
                self.turrets
                    .upgrade(&slot, &self.config, &mut self.ledger, self.time)?;
            }
            HudCommand::DowngradeTurret { slot } => {
                self.turrets
                    .downgrade(&slot, &self.config, &mut self.ledger, self.time)?;
            }
            HudCommand::SetTargetingPriority { slot, priority } => {
                self.turrets.set_priority(&slot, priority)?;
            }
            HudCommand::Keystroke { key } => self.keystroke(key)?,
            HudCommand::Backspace => self.typing.backspace(&mut self.enemies),
            HudCommand::PurgeBuffer => self.typing.purge(&mut self.enemies),
            HudCommand::ReplayWave => self.replay_wave()?,
            HudCommand::AdvanceTutorial => self.tutorial.advance(),
            HudCommand::ReplayTutorial => self.tutorial.replay(),
            HudCommand::SkipTutorial => self.tutorial.skip(),
            HudCommand::RecordTypingDrill { report } => {
                let id = self.analytics.record_typing_drill(report, self.time);
                debug!("Recorded typing drill {}", id);
            }
            HudCommand::SetOption { .. } => {}
        }
        Ok(())
    }

    fn keystroke(&mut self, key: char) -> BastionResult<()> {
        let outcome = self
            .typing
            .keystroke(key, self.time, &mut self.enemies, &self.config.typing);
        match outcome {
            KeystrokeOutcome::Ignored => {}
            KeystrokeOutcome::Correct { reaction, .. } => {
                self.analytics.record_input(true);
                if let Some(seconds) = reaction {
                    self.analytics.record_reaction(seconds);
                }
            }
            KeystrokeOutcome::Miss { .. } => self.analytics.record_input(false),
            KeystrokeOutcome::Completed(completion) => self.complete_word(completion)?,
        }
        Ok(())
    }

    fn complete_word(&mut self, completion: WordCompletion) -> BastionResult<()> {
        self.analytics.record_input(true);
        if let Some(seconds) = completion.reaction {
            self.analytics.record_reaction(seconds);
        }
        self.analytics.record_combo(completion.combo);
        if completion.damage > 0.0 {
            self.analytics.record_typing_damage(completion.damage);
        }
        if completion.perfect {
            self.analytics.record_perfect_word();
        }
        self.tutorial.complete_step("type-first-word");

        if !completion.blocked && !completion.killed {
            self.reassign_word(completion.enemy_id)?;
        }

        let boost = &self.config.support_boost;
        if boost.enabled && completion.combo >= boost.combo_threshold && self.support.can_trigger()
        {
            if let Err(err) = self.support.trigger(completion.lane, boost) {
                debug!("Support boost not triggered: {}", err);
            }
        }
        Ok(())
    }

    /// Gives a surviving enemy a fresh word. Carriers keep their evacuation
    /// word and start it over.
    fn reassign_word(&mut self, id: EnemyId) -> BastionResult<()> {
        let Some(enemy) = self.enemies.get(id) else {
            return Ok(());
        };
        if enemy.evacuation {
            let word = enemy.word.clone();
            if let Some(enemy) = self.enemies.get_mut(id) {
                enemy.assign_word(word);
            }
            return Ok(());
        }

        let (min, max) = match self.config.tier(&enemy.tier_id) {
            Some(tier) => (tier.min_word_length, tier.max_word_length),
            None => (enemy.word_len(), enemy.word_len()),
        };
        let word = WordPicker::new(min, max)
            .avoiding(self.enemies.taken_initials())
            .generate_validated(&self.config, &mut self.rng)?;
        if let Some(enemy) = self.enemies.get_mut(id) {
            enemy.assign_word(word);
        }
        Ok(())
    }

    fn replay_wave(&mut self) -> BastionResult<()> {
        let index = self.waves.replay(&self.config)?;
        for enemy in self.enemies.clear() {
            self.typing.release_enemy(enemy.id);
        }
        if self.evacuation.abort().is_some() {
            debug!("Evacuation abandoned by wave replay");
        }
        self.analytics.discard_wave();
        info!("Replaying practice wave {}", index + 1);
        Ok(())
    }

    /// Builds an enemy from a spawn request and puts it on the field.
    fn spawn(&mut self, spawn: EnemySpawn) -> BastionResult<EnemyId> {
        self.check_lane(spawn.lane)?;

        let (min, max, health, speed, reward, damage) = if spawn.evacuation {
            let evac = &self.config.evacuation;
            (
                evac.min_word_length,
                evac.max_word_length,
                evac.carrier_health,
                evac.carrier_speed,
                0.0,
                0.0,
            )
        } else {
            let tier = self.config.tier(&spawn.tier_id).ok_or_else(|| {
                BastionError::InvalidState(format!("unknown enemy tier {}", spawn.tier_id))
            })?;
            (
                tier.min_word_length,
                tier.max_word_length,
                tier.health,
                tier.speed,
                tier.reward,
                tier.damage,
            )
        };

        let word = match spawn.word {
            Some(word) => word.to_lowercase(),
            None => WordPicker::new(min, max)
                .avoiding(self.enemies.taken_initials())
                .generate_validated(&self.config, &mut self.rng)?,
        };
        if word.is_empty() {
            return Err(BastionError::InvalidState(
                "enemies need a non-empty word".to_string(),
            ));
        }

        let lane = spawn.lane;
        let id = self.enemies.insert(
            EnemyBlueprint {
                lane,
                tier_id: spawn.tier_id,
                word,
                health: spawn.health.unwrap_or(health),
                base_speed: spawn.speed.unwrap_or(speed),
                shield: spawn.shield,
                affixes: spawn.affixes,
                reward,
                damage,
                progress: spawn.progress,
                evacuation: spawn.evacuation,
            },
            self.time,
        );
        debug!("Spawned {} on lane {}", id, lane);
        Ok(id)
    }

    fn spawn_planned(&mut self, planned: PlannedSpawn) -> BastionResult<EnemyId> {
        let mut spawn = EnemySpawn::new(planned.lane, planned.tier_id);
        spawn.affixes = planned.affixes;
        self.spawn(spawn)
    }

    /// Spawns a carrier and starts the evacuation timer. Picks a random lane
    /// when none is given.
    fn launch_evacuation(&mut self, lane: Option<LaneIndex>) -> BastionResult<EnemyId> {
        if self.evacuation.is_active() {
            return Err(BastionError::InvalidState(
                "an evacuation is already running".to_string(),
            ));
        }
        let lane = match lane {
            Some(lane) => lane,
            None => self.rng.gen_range(0..self.config.lanes),
        };
        let carrier = self.spawn(EnemySpawn::new(lane, EVACUATION_TIER_ID).as_evacuation())?;
        let word = self
            .enemies
            .get(carrier)
            .map(|enemy| enemy.word.clone())
            .unwrap_or_default();
        self.evacuation
            .start(lane, word, carrier, &self.config.evacuation)?;
        Ok(carrier)
    }

    /// Advances the simulation by one tick of `dt` seconds.
    fn step(&mut self, dt: f64) -> BastionResult<()> {
        let dt = sanitize_delta(dt);
        self.time += dt;

        self.typing.tick(dt, self.time, &self.config.typing);
        self.castle.tick(dt);
        for lane in self.hazards.tick(dt) {
            debug!("Hazard cleared from lane {}", lane);
        }
        if self.waves.is_active() {
            self.hazards
                .roll(dt, self.waves.index(), &self.config.hazards, &mut self.rng);
        }
        self.support.tick(dt);
        if let Some(carrier) = self.evacuation.tick_active(dt) {
            self.enemies.remove(carrier);
            self.typing.release_enemy(carrier);
            self.ledger.penalize(
                self.config.evacuation.penalty,
                GoldReason::EvacuationPenalty,
                self.time,
            );
        }

        let advance = self.waves.advance(dt, &self.config);
        if let Some(index) = advance.started {
            self.begin_wave(index);
        }
        for planned in advance.spawns {
            let tier = planned.tier_id.clone();
            if let Err(err) = self.spawn_planned(planned) {
                warn!("Skipped {} spawn: {}", tier, err);
            }
        }
        if self.waves.is_active() && self.evacuation.tick_schedule(dt) {
            if let Err(err) = self.launch_evacuation(None) {
                warn!("Evacuation could not start: {}", err);
            }
        }

        self.resolve_movement(dt);
        if self.castle.is_destroyed() {
            self.resolve_defeated();
            self.status = GameStatus::Defeat;
            info!("Castle destroyed at {:.1}s", self.time);
            return Ok(());
        }

        self.resolve_turret_fire(dt);
        self.resolve_defeated();

        if self.waves.is_cleared(self.enemies.len()) {
            self.complete_wave()?;
        }
        Ok(())
    }

    fn begin_wave(&mut self, index: u32) {
        self.analytics.begin_wave(index, self.mode, self.time);
        self.evacuation
            .on_wave_start(index, &self.config.evacuation, &mut self.rng);
        self.support.on_wave_start();
        self.hazards.reset_roll(&self.config.hazards);
    }

    fn resolve_movement(&mut self, dt: f64) {
        for id in self.enemies.advance(dt) {
            let Some(enemy) = self.enemies.remove(id) else {
                continue;
            };
            self.typing.release_enemy(id);

            if enemy.evacuation {
                if self.evacuation.on_enemy_breach(id) {
                    self.ledger.penalize(
                        self.config.evacuation.penalty,
                        GoldReason::EvacuationPenalty,
                        self.time,
                    );
                }
                continue;
            }

            let taken = self.castle.take_breach(enemy.damage);
            self.analytics.record_breach();
            self.support.on_breach(enemy.lane);
            debug!(
                "{} breached lane {} for {:.1} damage",
                id, enemy.lane, taken
            );
        }
    }

    fn resolve_turret_fire(&mut self, dt: f64) {
        let hazards = &self.hazards;
        let support = &self.support;
        let shots = self
            .turrets
            .fire(dt, &self.config, &mut self.enemies, |lane| {
                hazards.multiplier(lane) * support.multiplier(lane)
            });
        for shot in shots {
            self.analytics
                .record_turret_damage(shot.shield_damage + shot.health_damage);
            if shot.shield_broken {
                self.analytics.record_shield_break();
            }
        }
    }

    fn resolve_defeated(&mut self) {
        for enemy in self.enemies.take_defeated() {
            self.typing.release_enemy(enemy.id);
            if enemy.evacuation {
                if self.evacuation.on_enemy_defeated(enemy.id) {
                    let paid = self.ledger.credit(
                        self.config.evacuation.reward,
                        GoldReason::EvacuationReward,
                        self.time,
                    );
                    self.analytics.record_gold(paid);
                }
                continue;
            }
            let paid = self
                .ledger
                .credit(enemy.reward, GoldReason::EnemyDefeated, self.time);
            self.analytics.record_gold(paid);
            self.analytics.record_enemy_defeated();
        }
    }

    fn complete_wave(&mut self) -> BastionResult<()> {
        let completion = self.waves.complete(&self.config)?;
        let bonus = self.config.waves.clear_bonus(completion.index);
        let paid = self
            .ledger
            .credit(bonus, GoldReason::WaveCleared, self.time);
        self.analytics.record_gold(paid);

        if let Some(summary) = self.analytics.finish_wave(self.time) {
            info!(
                "Wave {} summary: {} defeated, {} breaches, {:.0}% accuracy, {:.1} dps",
                summary.index + 1,
                summary.enemies_defeated,
                summary.breaches,
                summary.accuracy * 100.0,
                summary.dps
            );
        }

        if completion.final_wave {
            self.status = GameStatus::Victory;
            info!("Campaign won at {:.1}s", self.time);
        }
        Ok(())
    }

    fn assemble(&self) -> GameState {
        GameState {
            run_id: self.run_id,
            status: self.status,
            mode: self.mode,
            time: self.time,
            castle: self.castle.snapshot(&self.config),
            resources: self.ledger.snapshot(),
            typing: self.typing.snapshot(&self.config.typing),
            enemies: self.enemies.snapshot(),
            turrets: self.turrets.snapshot(self.castle.level()),
            wave: self.waves.snapshot(self.enemies.len()),
            lane_hazards: self.hazards.snapshot(),
            evacuation: self.evacuation.snapshot(),
            support_boost: self.support.snapshot(),
            analytics: self.analytics.snapshot(self.time),
            tutorial: self.tutorial.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TargetingPriority;

    fn playing_engine() -> Engine {
        let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 11).unwrap();
        engine.queue(HudCommand::Start);
        engine.tick(0.0);
        engine
    }

    #[test]
    fn test_new_run_waits_in_menu() {
        let engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
        let state = engine.snapshot();
        assert_eq!(state.status, GameStatus::Menu);
        assert_eq!(state.resources.gold, 100.0);
        assert_eq!(state.castle.health, 100.0);
        assert_eq!(state.wave.index, 0);
        assert!(state.wave.in_countdown);
        assert!(!engine.previews().is_empty());
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let mut config = GameConfig::for_testing();
        config.lanes = 0;
        assert!(Engine::new(config, GameMode::Campaign, 1).is_err());
    }

    #[test]
    fn test_gameplay_commands_need_playing_status() {
        let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
        engine.queue(HudCommand::PlaceTurret {
            slot: "s1".to_string(),
            type_id: "arrow".to_string(),
        });
        engine.tick(0.1);
        assert!(engine.snapshot().turret("s1").is_none());
        assert_eq!(engine.rejected_commands(), 1);
    }

    #[test]
    fn test_pause_freezes_time_and_countdowns() {
        let mut engine = playing_engine();
        let before = engine.snapshot().clone();

        engine.queue(HudCommand::Pause);
        for _ in 0..20 {
            engine.tick(0.5);
        }
        let paused = engine.snapshot();
        assert_eq!(paused.status, GameStatus::Paused);
        assert_eq!(paused.time, before.time);

        engine.queue(HudCommand::TogglePause);
        engine.tick(0.5);
        assert_eq!(engine.snapshot().status, GameStatus::Playing);
        assert_eq!(engine.snapshot().time, before.time + 0.5);
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let mut engine = playing_engine();
        engine.queue(HudCommand::UpgradeTurret {
            slot: "s1".to_string(),
        });
        engine.queue(HudCommand::PlaceTurret {
            slot: "s4".to_string(),
            type_id: "arrow".to_string(),
        });
        engine.queue(HudCommand::PlaceTurret {
            slot: "s1".to_string(),
            type_id: "crystal".to_string(),
        });
        engine.queue(HudCommand::SetTargetingPriority {
            slot: "nowhere".to_string(),
            priority: TargetingPriority::Weakest,
        });
        engine.tick(0.0);

        let state = engine.snapshot();
        assert_eq!(state.resources.gold, 100.0);
        assert!(state.turrets.iter().all(|slot| slot.turret.is_none()));
        assert_eq!(engine.rejected_commands(), 4);
    }

    #[test]
    fn test_snapshot_only_changes_on_tick() {
        let mut engine = playing_engine();
        engine
            .spawn_enemy(EnemySpawn::new(0, "grunt").with_word("oak"))
            .unwrap();
        assert!(engine.snapshot().enemies.is_empty());
        engine.tick(0.0);
        assert_eq!(engine.snapshot().enemies.len(), 1);
    }

    #[test]
    fn test_typed_kill_pays_bounty() {
        let mut engine = playing_engine();
        engine
            .spawn_enemy(EnemySpawn::new(1, "grunt").with_word("ember").with_speed(0.0))
            .unwrap();
        engine.tick(0.0);
        engine.callbacks().on_text("ember");
        engine.tick(0.0);

        let state = engine.snapshot();
        assert!(state.enemies.is_empty());
        assert_eq!(state.resources.gold, 108.0);
        assert_eq!(state.analytics.enemies_defeated, 1);
        assert_eq!(state.analytics.total_typing_damage, 20.0);
    }

    #[test]
    fn test_failed_spawn_does_not_stall_the_tick() {
        let mut engine = playing_engine();
        let target = engine
            .spawn_enemy(EnemySpawn::new(0, "brute").with_word("oak").with_speed(0.0))
            .unwrap();
        // Planned grunts can no longer be built
        for tier in engine.sim.config.enemy_tiers.iter_mut() {
            if tier.id == "grunt" {
                tier.id = "ghost".to_string();
            }
        }
        engine.callbacks().on_place_turret("s1", "arrow");
        engine.callbacks().on_start_wave();
        engine.tick(0.1);

        let state = engine.snapshot();
        assert!(!state.wave.in_countdown);
        assert_eq!(state.enemies.len(), 1);
        let enemy = state.enemy(target).unwrap();
        assert!(enemy.health < enemy.max_health);
        assert!(state.time > 0.0);
    }

    #[test]
    fn test_survivor_gets_fresh_word() {
        let mut engine = playing_engine();
        let id = engine
            .spawn_enemy(
                EnemySpawn::new(0, "brute")
                    .with_word("rampart")
                    .with_speed(0.0)
                    .with_health(500.0),
            )
            .unwrap();
        engine.tick(0.0);
        engine.callbacks().on_text("rampart");
        engine.tick(0.0);

        let enemy = engine.snapshot().enemy(id).unwrap().clone();
        assert_eq!(enemy.typed, 0);
        assert!((6..=9).contains(&enemy.word.len()));
        assert_eq!(enemy.health, 500.0 - 34.0);
    }

    #[test]
    fn test_support_boost_from_combo() {
        let mut config = GameConfig::for_testing();
        config.support_boost.enabled = true;
        config.support_boost.combo_threshold = 2;
        let mut engine = Engine::new(config, GameMode::Campaign, 3).unwrap();
        engine.queue(HudCommand::Start);
        engine
            .spawn_enemy(EnemySpawn::new(2, "grunt").with_word("oak").with_speed(0.0))
            .unwrap();
        engine
            .spawn_enemy(EnemySpawn::new(2, "grunt").with_word("elm").with_speed(0.0))
            .unwrap();
        engine.tick(0.0);
        engine.callbacks().on_text("oakelm");
        engine.tick(0.0);

        let boost = &engine.snapshot().support_boost;
        assert!(boost.active);
        assert_eq!(boost.lane, Some(2));
        assert_eq!(boost.multiplier, 1.5);
    }

    #[test]
    fn test_tutorial_follows_milestones() {
        let mut engine = playing_engine();
        let hud = engine.callbacks();
        hud.on_tutorial_advance();
        hud.on_place_turret("s2", "arrow");
        engine.tick(0.0);
        // Placing a turret does not skip the typing step.
        assert_eq!(
            engine.snapshot().tutorial.step_id.as_deref(),
            Some("type-first-word")
        );

        hud.on_tutorial_skip();
        engine.tick(0.0);
        assert!(engine.snapshot().tutorial.completed);
    }

    #[test]
    fn test_options_do_not_touch_simulation() {
        let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 5).unwrap();
        let before = engine.snapshot().clone();
        engine.queue(HudCommand::SetOption {
            option: crate::input::GameOption::ColorBlindMode,
            enabled: true,
        });
        engine.tick(1.0);
        assert!(engine.options().color_blind_mode);
        assert_eq!(engine.snapshot(), &before);
    }
}
