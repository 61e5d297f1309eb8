//! Persistent settings in TOML, merged with command-line overrides.

use crate::Args;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "ARCADETUI_CONFIG";
const APP_DIR: &str = "arcadetui";
const FILE_NAME: &str = "config.toml";

/// Which game is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    #[default]
    Snake,
    Tetris,
}

impl GameKind {
    pub const fn other(self) -> Self {
        match self {
            Self::Snake => Self::Tetris,
            Self::Tetris => Self::Snake,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Tetris => "tetris",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    /// Handle printed on the collector card.
    pub player: String,
    /// Where the collector card is written; current directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_dir: Option<PathBuf>,
    pub reduced_motion: bool,
    /// Target render frames per second.
    pub frame_rate: f64,
    pub starting_game: GameKind,
    pub snake_tick_ms: u64,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            player: String::new(),
            card_dir: None,
            reduced_motion: false,
            frame_rate: 60.0,
            starting_game: GameKind::Snake,
            snake_tick_ms: 95,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Config file location: explicit path, then `$ARCADETUI_CONFIG`, then the
/// platform config directory, then the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(p);
    }
    dirs::config_dir().map_or_else(
        || PathBuf::from(APP_DIR).join(FILE_NAME),
        |d| d.join(APP_DIR).join(FILE_NAME),
    )
}

impl ArcadeConfig {
    /// Reads `path`; a missing file is created with the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies command-line values on top of the file values.
    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(player) = &args.player {
            self.player.clone_from(player);
        }
        if let Some(dir) = &args.card_dir {
            self.card_dir = Some(dir.clone());
        }
        if let Some(game) = args.game {
            self.starting_game = game;
        }
        if let Some(rate) = args.frame_rate {
            self.frame_rate = rate;
        }
        self.reduced_motion |= args.reduced_motion;
        self
    }

    /// Frame rate clamped to something a terminal can keep up with.
    pub fn frame_rate(&self) -> f64 {
        if self.frame_rate.is_finite() {
            self.frame_rate.clamp(5.0, 240.0)
        } else {
            60.0
        }
    }

    pub fn card_dir(&self) -> PathBuf {
        self.card_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
