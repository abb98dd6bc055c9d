//! Engine and logging configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! universe = 0
//! refresh_rate_hz = 40
//! channels = "1/3"
//! chase = "1000:255,0,0:500|1000:0,255,0:500"
//! repeat = -1
//!
//! [log]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use crate::dmx::{BaseChannel, Repeat, ValueSet};
use crate::{error::ControlError, Result};

/// Slowest supported refresh rate
pub const MIN_REFRESH_RATE_HZ: u32 = 1;
/// Fastest supported refresh rate
pub const MAX_REFRESH_RATE_HZ: u32 = 1000;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level filter (`RUST_LOG` takes precedence)
    pub level: String,
    pub console_output: bool,
    pub file_output: bool,
    pub log_dir: PathBuf,
    pub file_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            file_name: "dmx-runner.log".to_string(),
        }
    }
}

impl LogConfig {
    /// Parsed level, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    pub fn current_log_path(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }

    /// Create the log directory if file output is enabled
    pub fn ensure_log_directory(&self) -> Result<()> {
        if self.file_output {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }
}

/// Runtime configuration of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub universe: u16,
    pub refresh_rate_hz: u32,
    /// Channel address list, e.g. `"1/3,10"`
    pub channels: String,
    /// Optional chase, `|`-separated `fadeTime:values:holdTime` steps
    pub chase: Option<String>,
    /// Repeat count for chase steps: -1 infinite, 0 once, N repeats
    pub repeat: i32,
    pub log: LogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            universe: 0,
            refresh_rate_hz: 40,
            channels: "1".to_string(),
            chase: None,
            repeat: 0,
            log: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the address list and chase parse
    pub fn validate(&self) -> Result<()> {
        if self.refresh_rate_hz == 0 {
            return Err(ControlError::Config(
                "refresh_rate_hz must be positive".to_string(),
            ));
        }
        self.channel_list()?;
        self.chase_steps()?;
        Ok(())
    }

    /// Addresses of the driven channels, in the configured universe
    pub fn channel_list(&self) -> Result<Vec<BaseChannel>> {
        BaseChannel::from_str_list(&self.channels, i32::from(self.universe))
    }

    pub fn chase_steps(&self) -> Result<Vec<ValueSet>> {
        match &self.chase {
            Some(chase) => ValueSet::parse_steps(chase),
            None => Ok(Vec::new()),
        }
    }

    pub fn repeat(&self) -> Repeat {
        Repeat::from_count(self.repeat)
    }

    /// Poll interval for the configured refresh rate
    pub fn refresh_interval(&self) -> Duration {
        let rate = self
            .refresh_rate_hz
            .clamp(MIN_REFRESH_RATE_HZ, MAX_REFRESH_RATE_HZ);
        Duration::from_micros(1_000_000 / u64::from(rate))
    }
}
