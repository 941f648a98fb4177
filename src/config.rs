//! Configuration management for flap-track.
//!
//! Loaded with figment from defaults, an optional TOML file and
//! `FLAP_TRACK_`-prefixed environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flap-track";

/// Default session log file name.
const SESSION_LOG_FILE_NAME: &str = "game_log.csv";

/// Default diagnostics log file name.
const DIAGNOSTICS_FILE_NAME: &str = "flap-track.log";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`FLAP_TRACK_PHYSICS__GRAVITY=0.3`)
/// 2. TOML config file at `<config_dir>/flap-track/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub physics: PhysicsConfig,
    pub display: DisplayConfig,
    pub audio: AudioConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the session log.
    /// Defaults to `<data_local_dir>/flap-track/game_log.csv`
    pub log_path: Option<PathBuf>,
}

/// Bird and pipe tuning, in pixels per frame for a 48px tall playfield.
/// Values are scaled with the terminal height at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration per frame.
    pub gravity: f64,
    /// Vertical velocity set by a flap (negative is up).
    pub flap_velocity: f64,
    /// Terminal falling speed.
    pub max_fall_speed: f64,
    /// Horizontal pipe speed.
    pub pipe_speed: f64,
    /// Height of the opening between a pipe pair.
    pub pipe_gap: f64,
    /// Distance between pipe pairs as a fraction of the screen width.
    pub pipe_spacing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target frames per second.
    pub fps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Diagnostics file used while the game owns the terminal.
    /// Defaults to `<data_local_dir>/flap-track/flap-track.log`
    pub file: Option<PathBuf>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.20,
            flap_velocity: -2.0,
            max_fall_speed: 3.0,
            pipe_speed: 1.1,
            pipe_gap: 15.0,
            pipe_spacing: 0.42,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { fps: 30 }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.8,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLAP_TRACK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are out of range.
    pub fn validate(&self) -> Result<()> {
        let p = &self.physics;
        let positive = [
            ("gravity", p.gravity),
            ("max_fall_speed", p.max_fall_speed),
            ("pipe_speed", p.pipe_speed),
            ("pipe_gap", p.pipe_gap),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::invalid_config(format!(
                    "physics.{name} must be greater than 0 (got {value})"
                )));
            }
        }
        if !(p.flap_velocity.is_finite() && p.flap_velocity < 0.0) {
            return Err(Error::invalid_config(format!(
                "physics.flap_velocity must be negative (got {})",
                p.flap_velocity
            )));
        }
        if !(p.pipe_spacing > 0.0 && p.pipe_spacing <= 1.0) {
            return Err(Error::invalid_config(format!(
                "physics.pipe_spacing must be in (0, 1] (got {})",
                p.pipe_spacing
            )));
        }
        if !(1..=120).contains(&self.display.fps) {
            return Err(Error::invalid_config(format!(
                "display.fps must be between 1 and 120 (got {})",
                self.display.fps
            )));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(Error::invalid_config(format!(
                "audio.volume must be between 0 and 1 (got {})",
                self.audio.volume
            )));
        }
        Ok(())
    }

    /// Get the session log path, resolving defaults if not set.
    #[must_use]
    pub fn session_log_path(&self) -> PathBuf {
        self.storage
            .log_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SESSION_LOG_FILE_NAME))
    }

    /// Get the diagnostics log path, resolving defaults if not set.
    #[must_use]
    pub fn diagnostics_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DIAGNOSTICS_FILE_NAME))
    }

    /// Duration of one frame.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.display.fps.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.display.fps, 30);
        assert!(config.audio.enabled);
        assert!(config.storage.log_path.is_none());
    }

    #[test]
    fn test_default_paths_live_in_data_dir() {
        let config = Config::default();
        assert!(config.session_log_path().ends_with("flap-track/game_log.csv"));
        assert!(config.diagnostics_path().ends_with("flap-track/flap-track.log"));
    }

    #[test]
    fn test_explicit_log_path_wins() {
        let mut config = Config::default();
        config.storage.log_path = Some(PathBuf::from("/tmp/custom.csv"));
        assert_eq!(config.session_log_path(), PathBuf::from("/tmp/custom.csv"));
    }

    #[test]
    fn test_frame_duration() {
        let config = Config::default();
        let ms = config.frame_duration().as_millis();
        assert!((33..=34).contains(&ms));
    }

    #[test]
    fn test_validate_rejects_upward_gravity() {
        let mut config = Config::default();
        config.physics.gravity = -0.1;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("physics.gravity"));
    }

    #[test]
    fn test_validate_rejects_downward_flap() {
        let mut config = Config::default();
        config.physics.flap_velocity = 1.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("flap_velocity"));
    }

    #[test]
    fn test_validate_rejects_bad_spacing_fps_and_volume() {
        let mut config = Config::default();
        config.physics.pipe_spacing = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.fps = 0;
        assert!(config.validate().unwrap_err().to_string().contains("fps"));

        let mut config = Config::default();
        config.audio.volume = 2.0;
        assert!(config.validate().unwrap_err().to_string().contains("volume"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[physics]\ngravity = 0.3\n\n[display]\nfps = 60\n\n\
             [storage]\nlog_path = \"/tmp/games.csv\""
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.physics.gravity, 0.3);
        assert_eq!(config.physics.pipe_gap, 15.0);
        assert_eq!(config.display.fps, 60);
        assert_eq!(config.session_log_path(), PathBuf::from("/tmp/games.csv"));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nfps = 500\n").unwrap();
        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigValidation { .. })
        ));
    }
}
