//! The HUD side of the engine: snapshots out, intents in.

use bastion::{
    Engine, EnemySpawn, GameConfig, GameMode, GameOption, GameState, GameStatus, HudCallbacks,
    HudCommand, HudSink, PresentationOptions, TypingDrillReport, WaveSpawnPreview,
};

/// Sink that keeps what it was handed.
#[derive(Default)]
struct RecordingHud {
    frames: Vec<GameState>,
    previews: usize,
    options: Option<PresentationOptions>,
}

impl HudSink for RecordingHud {
    fn update(
        &mut self,
        state: &GameState,
        upcoming: &[WaveSpawnPreview],
        options: &PresentationOptions,
    ) {
        self.frames.push(state.clone());
        self.previews = upcoming.len();
        self.options = Some(options.clone());
    }
}

#[test]
fn test_render_hands_over_last_snapshot() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    let mut hud = RecordingHud::default();

    engine.render(&mut hud);
    engine.callbacks().on_start();
    engine.tick(0.1);
    engine.render(&mut hud);

    assert_eq!(hud.frames.len(), 2);
    assert_eq!(hud.frames[0].status, GameStatus::Menu);
    assert_eq!(hud.frames[1].status, GameStatus::Playing);
    assert_eq!(&hud.frames[1], engine.snapshot());
    assert_eq!(hud.previews, engine.previews().len());
}

#[test]
fn test_snapshot_json_uses_camel_case() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    engine.callbacks().on_start();
    engine
        .spawn_enemy(EnemySpawn::new(0, "grunt").with_word("oak").with_shield(5.0))
        .unwrap();
    engine.tick(0.0);

    let json = engine.snapshot().to_json().unwrap();
    for key in [
        "\"runId\"",
        "\"goldEvents\"",
        "\"activeEnemyId\"",
        "\"comboWarning\"",
        "\"correctInputs\"",
        "\"maxHealth\"",
        "\"inCountdown\"",
        "\"laneHazards\"",
        "\"supportBoost\"",
        "\"waveHistory\"",
        "\"repairCooldownRemaining\"",
        "\"status\":\"playing\"",
    ] {
        assert!(json.contains(key), "missing {} in {}", key, json);
    }

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["enemies"][0]["word"], "oak");
    assert_eq!(value["enemies"][0]["shield"]["current"], 5.0);
    assert_eq!(value["castle"]["level"], 1);
}

#[test]
fn test_snapshot_survives_json_round_trip() {
    let mut engine = Engine::new(GameConfig::default(), GameMode::Practice, 17).unwrap();
    let hud = engine.callbacks();
    hud.on_start();
    hud.on_place_turret("s3", "arcane");
    engine.tick(0.0);
    for _ in 0..120 {
        engine.tick(0.05);
    }

    let state = engine.snapshot();
    let parsed = GameState::from_json(&state.to_json_pretty().unwrap()).unwrap();
    assert_eq!(parsed.run_id, state.run_id);
    assert_eq!(parsed.status, state.status);
    assert_eq!(parsed.mode, GameMode::Practice);
    assert_eq!(parsed.turrets, state.turrets);
    assert_eq!(parsed.wave.index, state.wave.index);
    assert_eq!(parsed.enemies.len(), state.enemies.len());
    for (parsed, original) in parsed.enemies.iter().zip(&state.enemies) {
        assert_eq!(parsed.id, original.id);
        assert_eq!(parsed.word, original.word);
        assert!((parsed.progress - original.progress).abs() < 1e-9);
    }
    assert!((parsed.time - state.time).abs() < 1e-9);
}

#[test]
fn test_hud_commands_parse_from_json() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    let incoming = [
        r#"{"type":"start"}"#,
        r#"{"type":"placeTurret","slot":"s2","typeId":"flame"}"#,
        r#"{"type":"setTargetingPriority","slot":"s2","priority":"strongest"}"#,
        r#"{"type":"setOption","option":"reducedMotion","enabled":true}"#,
    ];
    for line in incoming {
        let command: HudCommand = serde_json::from_str(line).unwrap();
        engine.queue(command);
    }
    engine.tick(0.0);

    let state = engine.snapshot();
    let turret = state.turret("s2").unwrap();
    assert_eq!(turret.type_id, "flame");
    assert_eq!(turret.targeting_priority, bastion::TargetingPriority::Strongest);
    assert!(engine.options().reduced_motion);
    assert_eq!(engine.rejected_commands(), 0);
}

#[test]
fn test_presentation_options_reach_the_sink() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    let mut hud = RecordingHud::default();
    engine
        .callbacks()
        .on_option_toggle(GameOption::ColorBlindMode, true);
    engine.set_wall_clock_override(Some(42.0));
    engine.tick(0.0);
    engine.render(&mut hud);

    let options = hud.options.unwrap();
    assert!(options.color_blind_mode);
    assert!(!options.reduced_motion);
    assert_eq!(options.wall_clock_override, Some(42.0));
    // Presentation never reaches the simulation
    assert_eq!(engine.snapshot().status, GameStatus::Menu);
}

#[test]
fn test_typing_drill_is_recorded_in_any_status() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    engine.callbacks().on_typing_drill_recorded(TypingDrillReport {
        mode: "burst".to_string(),
        words_completed: 12,
        errors: 2,
        accuracy: 0.94,
        wpm: 61.5,
        best_combo: 9,
        duration: 30.0,
    });
    engine.tick(0.0);

    let drills = &engine.snapshot().analytics.typing_drills;
    assert_eq!(drills.len(), 1);
    assert_eq!(drills[0].mode, "burst");
    assert_eq!(drills[0].words_completed, 12);
    assert_eq!(drills[0].wpm, 61.5);
}

#[test]
fn test_tutorial_commands_work_outside_play() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    let hud = engine.callbacks();
    assert!(engine.snapshot().tutorial.active);

    hud.on_tutorial_skip();
    engine.tick(0.0);
    assert!(engine.snapshot().tutorial.completed);
    assert!(!engine.snapshot().tutorial.active);

    hud.on_tutorial_replay();
    engine.tick(0.0);
    let tutorial = &engine.snapshot().tutorial;
    assert!(tutorial.active);
    assert!(!tutorial.completed);
    assert_eq!(tutorial.step, 0);
    assert_eq!(engine.rejected_commands(), 0);
}

#[test]
fn test_keystrokes_are_case_insensitive() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    let hud = engine.callbacks();
    hud.on_start();
    let id = engine
        .spawn_enemy(EnemySpawn::new(2, "grunt").with_word("Elm").with_health(500.0))
        .unwrap();
    engine.tick(0.0);
    assert_eq!(engine.snapshot().enemy(id).unwrap().word, "elm");

    hud.on_text("EL");
    hud.on_keystroke('\n');
    engine.tick(0.0);
    let state = engine.snapshot();
    assert_eq!(state.enemy(id).unwrap().typed, 2);
    assert_eq!(state.typing.buffer, "el");
    assert_eq!(state.typing.total_inputs, 2);
}

#[test]
fn test_gold_events_explain_every_change() {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1).unwrap();
    let hud = engine.callbacks();
    hud.on_start();
    hud.on_place_turret("s1", "arrow");
    hud.on_downgrade_turret("s1");
    engine.tick(0.0);

    let resources = &engine.snapshot().resources;
    let deltas: Vec<f64> = resources.gold_events.iter().map(|e| e.delta).collect();
    assert_eq!(deltas, vec![-40.0, 40.0]);
    assert_eq!(resources.gold_display, 100);
}
