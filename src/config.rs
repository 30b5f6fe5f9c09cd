use std::{fs, io, path::{Path, PathBuf}, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use simplelog::LevelFilter;

use crate::game::{tick_duration, TICK_RATE};

const CONFIG_ENV: &str = "SNAKE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "snake.json";

/// Optional overrides read from a JSON file. Every field has a default, so
/// the file may be absent or list only some keys.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Ticks per second, for both the menu poll and the game.
    pub tick_rate: u32,
    pub title_art: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            title_art: PathBuf::from("assets/word_art/main_menu.txt"),
            log_file: PathBuf::from("snake.log"),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn tick(&self) -> Duration {
        tick_duration(self.tick_rate)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .with_context(|| format!("unknown log level {:?}", self.log_level))
    }

    fn validate(self) -> Result<Self> {
        if self.tick_rate == 0 {
            bail!("tick_rate must be at least 1");
        }
        self.level_filter()?;
        Ok(self)
    }
}

pub fn settings_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// A missing file means defaults; a file that is present must parse.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(err) => return Err(err).with_context(|| format!("reading {}", path.display())),
    };

    parse_settings(&text).with_context(|| format!("invalid settings in {}", path.display()))
}

fn parse_settings(text: &str) -> Result<Settings> {
    serde_json::from_str::<Settings>(text)?.validate()
}
