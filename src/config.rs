use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between game ticks; also the input poll timeout
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_secs: f64,

    /// Leave the UI as soon as the command finishes
    #[serde(default = "default_false")]
    pub auto_quit: bool,

    #[serde(default)]
    pub game: GameKind,

    /// Stack the game above the output instead of side by side
    #[serde(default = "default_false")]
    pub horizontal_split: bool,

    /// Line written before the replayed output
    #[serde(default)]
    pub banner: Option<String>,

    #[serde(default)]
    pub shooter: ShooterConfig,

    #[serde(default)]
    pub words: WordGameConfig,
}

fn default_refresh_rate() -> f64 {
    0.3
}

fn default_false() -> bool {
    false
}

/// Which mini-game runs next to the command output
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Guess the hidden word
    #[default]
    Words,
    /// Steer a ship under a row of invaders
    Shooter,
}

/// Shooter game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShooterConfig {
    #[serde(default = "default_invader_count")]
    pub invader_count: usize,
}

/// Upper bound for `words.max_guesses`; more rows than any terminal shows.
pub const MAX_GUESSES_LIMIT: usize = 64;

fn default_invader_count() -> usize {
    3
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            invader_count: default_invader_count(),
        }
    }
}

/// Word game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordGameConfig {
    /// Guesses allowed per round. Defaults to twice the target word length.
    #[serde(default)]
    pub max_guesses: Option<usize>,

    /// File with one word per line, replacing the built-in list
    #[serde(default)]
    pub word_list: Option<PathBuf>,

    /// Seed for target word selection
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_rate_secs: default_refresh_rate(),
            auto_quit: false,
            game: GameKind::default(),
            horizontal_split: false,
            banner: None,
            shooter: ShooterConfig::default(),
            words: WordGameConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Tick period as a `Duration`
    pub fn refresh_rate(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_rate_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.refresh_rate_secs.is_finite() || self.refresh_rate_secs <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "refresh_rate_secs must be a positive number of seconds, got {}",
                self.refresh_rate_secs
            )));
        }

        // Duration::from_secs_f64 panics past this
        if self.refresh_rate_secs > 3600.0 {
            return Err(ConfigError::ValidationError(
                "refresh_rate_secs must be <= 3600".to_string(),
            ));
        }

        if self.shooter.invader_count == 0 {
            return Err(ConfigError::ValidationError(
                "shooter.invader_count must be greater than 0".to_string(),
            ));
        }

        if let Some(max_guesses) = self.words.max_guesses {
            if max_guesses == 0 || max_guesses > MAX_GUESSES_LIMIT {
                return Err(ConfigError::ValidationError(format!(
                    "words.max_guesses must be between 1 and {MAX_GUESSES_LIMIT}, got {max_guesses}"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
