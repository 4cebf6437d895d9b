//! Property tests: random HUD input never breaks the snapshot invariants.

use bastion::{Engine, GameConfig, GameMode, GameState, HudCommand, TargetingPriority};
use proptest::prelude::*;

fn slot() -> impl Strategy<Value = String> {
    (1..=7u8).prop_map(|n| format!("s{}", n))
}

fn turret_type() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["arrow", "arcane", "flame", "crystal", "ballista"])
        .prop_map(str::to_string)
}

fn command() -> impl Strategy<Value = HudCommand> {
    prop_oneof![
        4 => prop::char::range('a', 'z').prop_map(|key| HudCommand::Keystroke { key }),
        1 => Just(HudCommand::Backspace),
        1 => Just(HudCommand::PurgeBuffer),
        1 => Just(HudCommand::StartWave),
        1 => Just(HudCommand::UpgradeCastle),
        1 => Just(HudCommand::RepairCastle),
        1 => Just(HudCommand::TogglePause),
        1 => Just(HudCommand::ReplayWave),
        2 => (slot(), turret_type()).prop_map(|(slot, type_id)| HudCommand::PlaceTurret { slot, type_id }),
        2 => slot().prop_map(|slot| HudCommand::UpgradeTurret { slot }),
        1 => slot().prop_map(|slot| HudCommand::DowngradeTurret { slot }),
        1 => (slot(), prop::sample::select(TargetingPriority::all().to_vec()))
            .prop_map(|(slot, priority)| HudCommand::SetTargetingPriority { slot, priority }),
    ]
}

/// One tick of input: some commands, then a step of `dt` seconds.
fn frame() -> impl Strategy<Value = (Vec<HudCommand>, f64)> {
    (prop::collection::vec(command(), 0..4), 0.0..0.5f64)
}

fn check_invariants(state: &GameState, config: &GameConfig) {
    let castle = &state.castle;
    assert!(castle.health >= 0.0, "health {}", castle.health);
    assert!(
        castle.health <= castle.max_health,
        "health {} over max {}",
        castle.health,
        castle.max_health
    );
    assert!(castle.level >= 1 && castle.level <= castle.max_level);

    assert!(state.resources.gold >= 0.0);
    assert_eq!(state.resources.gold_display, state.resources.gold.floor() as u64);

    for slot in &state.turrets {
        if let Some(turret) = &slot.turret {
            let max = config.turret(&turret.type_id).unwrap().max_level();
            assert!(turret.level >= 1 && turret.level <= max);
            assert!(slot.unlocked);
        }
    }

    let typing = &state.typing;
    assert_eq!(typing.correct_inputs + typing.errors, typing.total_inputs);
    if typing.total_inputs > 0 {
        let expected = typing.correct_inputs as f64 / typing.total_inputs as f64;
        assert!((typing.accuracy - expected).abs() < 1e-12);
    } else {
        assert_eq!(typing.accuracy, 1.0);
    }
    assert!(typing.best_combo >= typing.combo);

    for enemy in &state.enemies {
        assert!(enemy.typed <= enemy.word.len());
        assert!(enemy.health > 0.0 && enemy.health <= enemy.max_health);
        assert!(enemy.lane < config.lanes);
        if let Some(shield) = enemy.shield {
            assert!(shield.current >= 0.0 && shield.current <= shield.max);
        }
    }
    if let Some(id) = typing.active_enemy_id {
        assert!(state.enemy(id).is_some());
    }

    assert!(!(state.evacuation.succeeded && state.evacuation.failed));
    assert!(!(state.support_boost.succeeded && state.support_boost.failed));
    assert_eq!(state.wave.enemies_alive, state.enemies.len());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_random_input_keeps_invariants(
        seed in any::<u64>(),
        practice in any::<bool>(),
        frames in prop::collection::vec(frame(), 1..150),
    ) {
        let mode = if practice { GameMode::Practice } else { GameMode::Campaign };
        let config = GameConfig::default();
        let mut engine = Engine::new(config.clone(), mode, seed).unwrap();
        engine.queue(HudCommand::Start);
        engine.tick(0.0);

        for (commands, dt) in frames {
            for command in commands {
                engine.queue(command);
            }
            let before = engine.snapshot().time;
            engine.tick(dt);
            let state = engine.snapshot();
            prop_assert!(state.time >= before);
            check_invariants(state, &config);
        }
    }

    #[test]
    fn test_bad_deltas_are_harmless(dt in prop_oneof![
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        -100.0..0.0f64,
    ]) {
        let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
        engine.queue(HudCommand::Start);
        engine.tick(0.0);
        engine.tick(dt);

        let state = engine.snapshot();
        prop_assert!(state.time.is_finite());
        prop_assert!(state.time >= 0.0);
        check_invariants(state, engine.config());
    }

    #[test]
    fn test_failed_purchases_keep_gold(gold in 0.0..39.0f64) {
        let mut config = GameConfig::for_testing();
        config.economy.starting_gold = gold;
        let mut engine = Engine::new(config, GameMode::Campaign, 1).unwrap();
        engine.queue(HudCommand::Start);
        engine.queue(HudCommand::PlaceTurret { slot: "s1".to_string(), type_id: "arrow".to_string() });
        engine.queue(HudCommand::UpgradeCastle);
        engine.queue(HudCommand::RepairCastle);
        engine.tick(0.0);

        let state = engine.snapshot();
        prop_assert_eq!(state.resources.gold, gold);
        prop_assert!(state.turret("s1").is_none());
        prop_assert_eq!(engine.rejected_commands(), 3);
    }
}
