//! arcadetui: Snake and Tetris in the terminal.

mod app;
mod config;
mod effects;
mod glyphs;
mod grid;
mod input;
mod rng;
mod session;
mod snake;
mod tetris;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::{ArcadeConfig, GameKind};
use log::{info, warn};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;
    info!("starting arcadetui {}", env!("CARGO_PKG_VERSION"));

    let path = config::config_path(args.config.as_deref());
    let file_config = match ArcadeConfig::load_from(&path) {
        Ok(c) => {
            info!("loaded config from {}", path.display());
            c
        }
        Err(e) => {
            warn!("using default config, {}: {e}", path.display());
            ArcadeConfig::default()
        }
    };
    let config = file_config.with_args(&args);

    if let Some(seed) = args.seed {
        info!("seeded run: {seed}");
    }
    let mut app = App::new(config, theme::Theme::default(), args.seed);
    app.run()?;
    info!("bye");
    Ok(())
}

/// The terminal belongs to the UI, so log records go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Snake and Tetris in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "arcadetui",
    version,
    about = "Snake and Tetris in the terminal.",
    long_about = "arcadetui bundles two small arcade games. Tab switches between them.\n\n\
        SNAKE:\n  Arrows / WASD  Steer    Enter/Space  Start    P  Pause/resume    R  Play again\n  \
        The board wraps at the edges. Eat 20 to win a collector card (PNG).\n\n\
        TETRIS:\n  Left/Right  Move    Down  Soft drop (hold)    Up / X  Rotate CW\n  \
        Z  Rotate CCW    Space  Hard drop    Enter  Start    P  Pause\n\n\
        Q / Esc quits. Settings are read from $ARCADETUI_CONFIG or the user config directory."
)]
pub struct Args {
    /// Game shown at startup.
    #[arg(short, long, value_name = "GAME")]
    pub game: Option<GameKind>,

    /// Handle printed on the Snake collector card.
    #[arg(long, value_name = "HANDLE")]
    pub player: Option<String>,

    /// Directory the collector card is written to.
    #[arg(long, value_name = "DIR")]
    pub card_dir: Option<PathBuf>,

    /// Seed for food and piece selection, for replayable runs.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Slow Snake down and skip the confetti and fade animations.
    #[arg(long)]
    pub reduced_motion: bool,

    /// Target render frames per second.
    #[arg(long, value_name = "RATE")]
    pub frame_rate: Option<f64>,

    /// Config file to use instead of the default location.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log file.
    #[arg(long, value_name = "FILE", default_value = "arcadetui.log")]
    pub log_file: PathBuf,
}
