//! Configuration module for Session Edge.
//!
//! Analysis settings are loaded from environment variables or a TOML file,
//! organized by concern: Sessions, Indicators, Model, Signals and Profile.

mod indicator_config;
mod model_config;
mod session_config;
mod signal_config;

pub use indicator_config::IndicatorConfig;
pub use model_config::ModelConfig;
pub use session_config::{SessionConfig, SessionWindow};
pub use signal_config::{ProfileConfig, SignalConfig};

use crate::domain::errors::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which session the morning direction is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyTarget {
    #[default]
    Afternoon,
    FullDay,
}

impl FromStr for AccuracyTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "afternoon" => Ok(AccuracyTarget::Afternoon),
            "full_day" | "fullday" | "day" => Ok(AccuracyTarget::FullDay),
            _ => Err(ConfigError::UnknownAccuracyTarget(s.to_string())),
        }
    }
}

impl fmt::Display for AccuracyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccuracyTarget::Afternoon => write!(f, "afternoon"),
            AccuracyTarget::FullDay => write!(f, "full_day"),
        }
    }
}

/// Reads typed values through a key lookup, falling back to defaults.
///
/// `AnalysisConfig::from_env` plugs in the process environment; tests plug
/// in a map so they never mutate global state.
pub(crate) struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvReader<'a> {
    pub(crate) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    pub(crate) fn parse_usize(&self, key: &str, default: usize) -> Result<usize> {
        self.get(key)
            .unwrap_or_else(|| default.to_string())
            .trim()
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    pub(crate) fn parse_f64(&self, key: &str, default: f64) -> Result<f64> {
        self.get(key)
            .unwrap_or_else(|| default.to_string())
            .trim()
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}

/// Complete analysis configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sessions: SessionConfig,
    pub indicators: IndicatorConfig,
    pub model: ModelConfig,
    pub signals: SignalConfig,
    pub profile: ProfileConfig,
    pub accuracy_target: AccuracyTarget,
}

impl AnalysisConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader::new(&lookup);

        let mut sessions = SessionConfig::default();
        if let Some(spec) = env.get("SUB_SESSIONS") {
            sessions.windows =
                SessionConfig::parse_windows(&spec).context("Failed to parse SUB_SESSIONS")?;
        }
        if let Some(name) = env.get("MORNING_SESSION") {
            sessions.morning = name.trim().to_string();
        }
        if let Some(name) = env.get("AFTERNOON_SESSION") {
            sessions.afternoon = name.trim().to_string();
        }

        let accuracy_target = env
            .get("ACCURACY_TARGET")
            .map(|raw| raw.parse::<AccuracyTarget>())
            .transpose()
            .context("Failed to parse ACCURACY_TARGET")?
            .unwrap_or_default();

        let config = Self {
            sessions,
            indicators: IndicatorConfig::from_reader(&env)
                .context("Failed to load indicator config")?,
            model: ModelConfig::from_reader(&env).context("Failed to load model config")?,
            signals: SignalConfig::from_reader(&env).context("Failed to load signal config")?,
            profile: ProfileConfig::from_reader(&env).context("Failed to load profile config")?,
            accuracy_target,
        };

        config.validate().context("Invalid analysis configuration")?;
        Ok(config)
    }

    /// Parses a TOML document; every section and field is optional
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("Failed to parse TOML configuration")?;
        config.validate().context("Invalid analysis configuration")?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sessions.validate()?;
        self.indicators.validate()?;
        self.model.validate()?;
        self.signals.validate()?;
        self.profile.validate()?;
        Ok(())
    }
}
