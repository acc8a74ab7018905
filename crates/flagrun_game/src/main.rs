//! Flagrun headless runner.
//!
//! Drives a [`GameSession`] frame by frame from a replay file (or idle input),
//! draws each frame into a command recorder, and reports how the level ended.
//! Every frame follows the same shape as an interactive host:
//!
//!   1. poll a few pending sprite loads
//!   2. `session.frame(dt)` runs the whole fixed steps owed
//!   3. draw the session into the render target
//!
//! With `--campaign`, a completed level moves straight on to the next one.

use std::path::PathBuf;

use clap::Parser;
use flagrun_core::input::ActionSet;
use flagrun_game::config::{load_config_from_path, GameConfig};
use flagrun_game::level::LevelCatalog;
use flagrun_game::render::{draw_frame, request_level_assets};
use flagrun_game::replay::load_replay_from_path;
use flagrun_game::session::{GameSession, GameState, LevelSummary, SessionSink};
use flagrun_render::{AssetRegistry, CommandRecorder, FileAssetProvider};

/// Headless platformer runner for replays and smoke tests
#[derive(Parser, Debug)]
#[command(name = "flagrun")]
#[command(about = "Run a level headlessly and report how it ended")]
struct Args {
    /// Level number to start on (1-based)
    #[arg(long, default_value_t = 1)]
    level: usize,

    /// Tuning config JSON; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay JSON with scripted input
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Directory holding sprite sheets (`<key>.png`)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Stop after this many display frames
    #[arg(long, default_value_t = 3600)]
    max_frames: usize,

    /// Display frame duration in milliseconds when no replay sets one
    #[arg(long, default_value_t = 16.667)]
    frame_ms: f64,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Move on to the next level after completing one
    #[arg(long)]
    campaign: bool,

    /// Print the final level summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,
}

/// Logs gameplay notifications as they are applied.
struct LogObserver;

impl SessionSink for LogObserver {
    fn on_score_delta(&mut self, points: u32) {
        log::debug!("+{points} points");
    }

    fn on_flag_collected(&mut self) {
        log::info!("Flag collected");
    }

    fn on_player_died(&mut self) {
        log::info!("Player died");
    }

    fn on_level_completed(&mut self) {
        log::debug!("Exit reached");
    }
}

fn run(args: &Args) -> Result<LevelSummary, String> {
    let mut config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let catalog = LevelCatalog::from_config(&config)?;

    let (inputs, frame_us) = match &args.replay {
        Some(path) => {
            let replay = load_replay_from_path(path)?;
            log::info!(
                "Loaded replay {} ({} frames)",
                path.display(),
                replay.expanded_inputs().len()
            );
            (replay.expanded_inputs(), replay.frame_us())
        }
        None => {
            if !(args.frame_ms > 0.0) {
                return Err(format!("--frame-ms must be > 0 (got {})", args.frame_ms));
            }
            (
                vec![ActionSet::none(); args.max_frames],
                (args.frame_ms * 1000.0).round() as u64,
            )
        }
    };

    let mut session = GameSession::new(config, catalog);
    session.set_observer(Box::new(LogObserver));
    session.start_level(args.level)?;

    let mut provider = args.assets.as_ref().map(FileAssetProvider::new);
    let mut assets = AssetRegistry::default();
    let mut recorder = CommandRecorder::new();
    let mut last_summary = session.summary();
    let mut requested_level = None;

    for input in inputs.iter().take(args.max_frames) {
        if requested_level != Some(session.current_level()) {
            if let Some(level) = session.level() {
                request_level_assets(&mut assets, session.config(), level);
                requested_level = Some(session.current_level());
            }
        }
        if let Some(provider) = provider.as_mut() {
            assets.poll(provider);
        }

        session.frame(frame_us, input);
        recorder.reset();
        draw_frame(&session, &assets, &mut recorder);

        match session.state() {
            GameState::Playing => {}
            GameState::LevelComplete if args.campaign => {
                last_summary = session.summary();
                log::info!("Level {} complete, continuing", last_summary.level);
                session.next_level()?;
                if session.state() == GameState::Menu {
                    break;
                }
            }
            _ => break,
        }
    }

    if session.state() != GameState::Menu {
        last_summary = session.summary();
    }
    log::info!(
        "Finished level {} ({:?}): score {}, flags {}/{}, {}s",
        last_summary.level,
        last_summary.state,
        last_summary.score,
        last_summary.flags_collected,
        last_summary.total_flags,
        last_summary.seconds
    );
    Ok(last_summary)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Flagrun starting...");

    let summary = match run(&args) {
        Ok(summary) => summary,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    if args.summary_json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                log::error!("Failed to serialize summary: {err}");
                std::process::exit(1);
            }
        }
    }
}
