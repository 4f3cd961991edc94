//! Session configuration loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use pokemon_defence_core::{Difficulty, MapLayout, Position, TimeOfDay, WorldSettings};
use pokemon_defence_system_spawning::{self as spawning, DEFAULT_BOSS_DELAY, DEFAULT_SPAWN_INTERVAL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while loading a session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read session config at {path}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML for a session.
    #[error("failed to parse session config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables of a game session. Every field falls back to its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Currency available at the start.
    pub starting_money: u32,
    /// Lives available at the start.
    pub starting_lives: u32,
    /// Enemy scaling table.
    pub difficulty: Difficulty,
    /// Initial game-speed multiplier.
    pub game_speed: f32,
    /// Seed of every random decision the session makes.
    pub seed: u64,
    /// Wave whose completion is a major clear.
    pub milestone_wave: u32,
    /// Delay between regular spawns in milliseconds.
    pub spawn_interval_ms: u64,
    /// Delay between the last regular spawn and the boss in milliseconds.
    pub boss_delay_ms: u64,
    /// Waypoint lists enemies follow.
    pub paths: Vec<Vec<Position>>,
    /// Fixed time of day; the local clock is consulted when absent.
    pub time_of_day: Option<TimeOfDay>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let settings = WorldSettings::default();
        Self {
            starting_money: settings.starting_money,
            starting_lives: settings.starting_lives,
            difficulty: settings.difficulty,
            game_speed: settings.game_speed,
            seed: 0,
            milestone_wave: settings.milestone_wave,
            spawn_interval_ms: millis(DEFAULT_SPAWN_INTERVAL),
            boss_delay_ms: millis(DEFAULT_BOSS_DELAY),
            paths: settings.map.paths().to_vec(),
            time_of_day: None,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// World-relevant subset of the configuration.
    #[must_use]
    pub fn world_settings(&self) -> WorldSettings {
        let map = if self.paths.iter().any(|path| !path.is_empty()) {
            MapLayout::new(self.paths.clone())
        } else {
            MapLayout::default()
        };
        WorldSettings {
            starting_money: self.starting_money,
            starting_lives: self.starting_lives,
            difficulty: self.difficulty,
            map,
            milestone_wave: self.milestone_wave,
            game_speed: self.game_speed,
        }
    }

    /// Spawner timing and seed.
    #[must_use]
    pub fn spawner_config(&self) -> spawning::Config {
        spawning::Config::new(
            Duration::from_millis(self.spawn_interval_ms),
            Duration::from_millis(self.boss_delay_ms),
            self.seed,
        )
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SessionConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.world_settings(), WorldSettings::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            starting_money = 900
            difficulty = "expert"
            seed = 42
            time_of_day = "night"
            paths = [[[0.0, 0.0], [64.0, 0.0]]]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.starting_money, 900);
        assert_eq!(config.starting_lives, 20);
        assert_eq!(config.difficulty, Difficulty::Expert);
        assert_eq!(config.time_of_day, Some(TimeOfDay::Night));
        assert_eq!(
            config.world_settings().map.path_for(3),
            Some(&[Position::new(0.0, 0.0), Position::new(64.0, 0.0)][..])
        );
    }

    #[test]
    fn unknown_difficulty_is_a_parse_error() {
        assert!(matches!(
            SessionConfig::from_toml_str("difficulty = \"nightmare\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = SessionConfig::load("/nonexistent/session.toml").expect_err("missing file");
        assert!(matches!(error, ConfigError::Io { ref path, .. } if path.ends_with("session.toml")));
    }
}
