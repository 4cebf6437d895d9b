//! Integration test to ensure an engine can be created and started without errors.

use bastion::{
    BastionResult, Engine, GameConfig, GameMode, GameStatus, HudCallbacks, HudCommand,
};

#[test]
fn test_basic_startup() -> BastionResult<()> {
    let mut engine = Engine::new(GameConfig::default(), GameMode::Campaign, 12345)?;

    // A new run waits in the menu with the configured starting values
    let state = engine.snapshot();
    assert_eq!(state.status, GameStatus::Menu);
    assert_eq!(state.time, 0.0);
    assert_eq!(state.resources.gold, 100.0);
    assert_eq!(state.castle.level, 1);
    assert_eq!(state.castle.health, state.castle.max_health);
    assert_eq!(state.wave.total, Some(6));
    assert!(state.enemies.is_empty());

    engine.callbacks().on_start();
    engine.tick(0.05);

    let state = engine.snapshot();
    assert_eq!(state.status, GameStatus::Playing);
    assert!(state.time > 0.0);
    assert_eq!(engine.rejected_commands(), 0);

    Ok(())
}

#[test]
fn test_slot_layout_follows_castle_level() -> BastionResult<()> {
    let engine = Engine::new(GameConfig::default(), GameMode::Campaign, 1)?;
    let state = engine.snapshot();

    assert_eq!(state.turrets.len(), 6);
    let unlocked: Vec<&str> = state
        .turrets
        .iter()
        .filter(|slot| slot.unlocked)
        .map(|slot| slot.id.as_str())
        .collect();
    assert_eq!(unlocked, vec!["s1", "s2", "s3"]);
    Ok(())
}

#[test]
fn test_practice_has_no_wave_total() -> BastionResult<()> {
    let engine = Engine::new(GameConfig::default(), GameMode::Practice, 1)?;
    assert_eq!(engine.snapshot().wave.total, None);
    assert_eq!(engine.mode(), GameMode::Practice);
    Ok(())
}

#[test]
fn test_start_twice_is_rejected() -> BastionResult<()> {
    let mut engine = Engine::new(GameConfig::for_testing(), GameMode::Campaign, 1)?;
    engine.queue(HudCommand::Start);
    engine.queue(HudCommand::Start);
    engine.tick(0.0);

    assert_eq!(engine.status(), GameStatus::Playing);
    assert_eq!(engine.rejected_commands(), 1);
    Ok(())
}

#[test]
fn test_config_file_round_trip() -> BastionResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bastion.json");

    let mut config = GameConfig::default();
    config.economy.starting_gold = 250.0;
    std::fs::write(&path, config.to_json()?)?;

    let loaded = GameConfig::load_from_file(&path)?;
    assert_eq!(loaded, config);

    let engine = Engine::new(loaded, GameMode::Campaign, 3)?;
    assert_eq!(engine.snapshot().resources.gold, 250.0);
    Ok(())
}

#[test]
fn test_invalid_config_file_is_refused() -> BastionResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.json");

    let mut config = GameConfig::default();
    config.lanes = 0;
    std::fs::write(&path, config.to_json()?)?;

    assert!(GameConfig::load_from_file(&path).is_err());
    assert!(GameConfig::load_from_file(dir.path().join("missing.json")).is_err());
    Ok(())
}
