//! # Bastion Headless Runner
//!
//! Runs a session without a HUD: a fixed-delta loop drives the engine, the
//! optional bot typist plays, and a console sink reports what happened.

use bastion::{
    AutotypeState, BastionError, BastionResult, Engine, GameConfig, GameMode, GameState,
    GameStatus, HudCallbacks, HudSink, PresentationOptions, WaveSpawnPreview,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;

/// Command line arguments for the Bastion runner.
#[derive(Parser, Debug)]
#[command(name = "bastion")]
#[command(about = "Headless runner for the Bastion typing tower-defense engine")]
#[command(version)]
struct Args {
    /// Random seed for wave composition and words
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Campaign ends after the last wave; practice loops forever
    #[arg(long, value_enum, default_value_t = ModeArg::Campaign)]
    mode: ModeArg,

    /// Simulated seconds to run before stopping
    #[arg(long, default_value_t = 300.0)]
    seconds: f64,

    /// Fixed tick length in milliseconds
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Let the bot typist play
    #[arg(long)]
    autotype: bool,

    /// Bot typing speed
    #[arg(long, default_value_t = 45.0)]
    wpm: f64,

    /// Bot sends a wrong key every N keys (0 = never)
    #[arg(long, default_value_t = 0)]
    mistake_every: u32,

    /// JSON configuration file; built-in tables when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Campaign,
    Practice,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Campaign => GameMode::Campaign,
            ModeArg::Practice => GameMode::Practice,
        }
    }
}

fn main() -> BastionResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Bastion v{}", bastion::VERSION);

    let config = match &args.config {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::default(),
    };
    run_session(&args, config)
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> BastionResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .try_init()
            .map_err(|err| BastionError::InvalidState(format!("logging: {}", err)))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .try_init()
            .map_err(|err| BastionError::InvalidState(format!("logging: {}", err)))?;
    }

    Ok(())
}

/// Runs one session to its end or the time limit.
fn run_session(args: &Args, config: GameConfig) -> BastionResult<()> {
    if args.tick_ms == 0 {
        return Err(BastionError::InvalidConfig(
            "tick length must be positive".to_string(),
        ));
    }
    let dt = args.tick_ms as f64 / 1000.0;

    let mut engine = Engine::new(config, args.mode.into(), args.seed)?;
    let hud = engine.callbacks();
    let mut console = ConsoleHud::default();
    let mut bot = args
        .autotype
        .then(|| AutotypeState::new(args.wpm).with_mistakes(args.mistake_every));

    hud.on_start();
    engine.tick(0.0);

    while engine.time() < args.seconds && !engine.status().is_terminal() {
        if let Some(bot) = bot.as_mut() {
            for command in bot.next_commands(dt, engine.snapshot(), engine.config()) {
                hud.dispatch(command);
            }
        }
        engine.tick(dt);
        engine.render(&mut console);
    }

    let state = engine.snapshot();
    report(state, engine.rejected_commands());
    if args.json {
        println!("{}", state.to_json_pretty()?);
    }
    Ok(())
}

/// Prints the outcome and per-wave summaries.
fn report(state: &GameState, rejected: u64) {
    println!(
        "Run {} ended {} after {:.1}s",
        state.run_id, state.status, state.time
    );
    for summary in &state.analytics.wave_history {
        println!(
            "  wave {:>2}: {:>5.1}s, {:>2} defeated, {} breaches, {:>5.1}% accuracy, {:>5.1} dps (turret {:.1} / typing {:.1}), +{:.0} gold",
            summary.index + 1,
            summary.duration,
            summary.enemies_defeated,
            summary.breaches,
            summary.accuracy * 100.0,
            summary.dps,
            summary.turret_dps,
            summary.typing_dps,
            summary.gold_earned
        );
    }
    println!(
        "Castle {:.0}/{:.0} at level {}, gold {}, best combo {}, {} rejected commands",
        state.castle.health,
        state.castle.max_health,
        state.castle.level,
        state.resources.gold_display,
        state.analytics.session_best_combo,
        rejected
    );
}

/// Logs status and wave transitions as they appear in the snapshots.
#[derive(Default)]
struct ConsoleHud {
    status: Option<GameStatus>,
    wave: Option<(u32, bool)>,
}

impl HudSink for ConsoleHud {
    fn update(
        &mut self,
        state: &GameState,
        upcoming: &[WaveSpawnPreview],
        _options: &PresentationOptions,
    ) {
        if self.status != Some(state.status) {
            info!("Status: {}", state.status);
            self.status = Some(state.status);
        }

        let wave = (state.wave.index, state.wave.in_countdown);
        if self.wave != Some(wave) {
            if state.wave.in_countdown {
                let next = upcoming.iter().filter(|spawn| !spawn.is_next_wave).count();
                info!(
                    "Wave {} in {:.1}s ({} enemies)",
                    state.wave.index + 1,
                    state.wave.countdown,
                    next
                );
            }
            self.wave = Some(wave);
        }

        if state.castle.health < state.castle.max_health * 0.25 && state.status == GameStatus::Playing
        {
            warn!("Castle at {:.0} health", state.castle.health);
        }
    }
}
