//! Sub-session window configuration.

use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// A named half-open `[start_hour, end_hour)` UTC window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub name: String,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl SessionWindow {
    pub fn new(name: &str, start_hour: u32, end_hour: u32) -> Self {
        Self {
            name: name.to_string(),
            start_hour,
            end_hour,
        }
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    fn overlaps(&self, other: &SessionWindow) -> bool {
        self.start_hour < other.end_hour && other.start_hour < self.end_hour
    }

    /// Parses `name:start-end`, e.g. `morning:8-10`
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidWindowSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let (name, hours) = spec
            .split_once(':')
            .ok_or_else(|| invalid("expected name:start-end"))?;
        let (start, end) = hours
            .split_once('-')
            .ok_or_else(|| invalid("expected start-end hours"))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("empty name"));
        }
        let start_hour = start
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid("start hour is not a number"))?;
        let end_hour = end
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid("end hour is not a number"))?;

        Ok(Self::new(name, start_hour, end_hour))
    }
}

/// Ordered list of sub-session windows plus the names used as
/// morning (predictor) and afternoon (target) sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub windows: Vec<SessionWindow>,
    pub morning: String,
    pub afternoon: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            windows: vec![
                SessionWindow::new("morning", 8, 10),
                SessionWindow::new("afternoon", 10, 22),
            ],
            morning: "morning".to_string(),
            afternoon: "afternoon".to_string(),
        }
    }
}

impl SessionConfig {
    /// Parses a comma-separated list such as `morning:8-10,afternoon:10-22`
    pub fn parse_windows(spec: &str) -> Result<Vec<SessionWindow>, ConfigError> {
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SessionWindow::parse)
            .collect()
    }

    /// Window containing this UTC hour, if any
    pub fn window_for_hour(&self, hour: u32) -> Option<&SessionWindow> {
        self.windows.iter().find(|w| w.contains_hour(hour))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, window) in self.windows.iter().enumerate() {
            if window.start_hour >= window.end_hour || window.end_hour > 24 {
                return Err(ConfigError::InvalidWindow {
                    name: window.name.clone(),
                    start_hour: window.start_hour,
                    end_hour: window.end_hour,
                });
            }

            for other in &self.windows[i + 1..] {
                if other.name == window.name {
                    return Err(ConfigError::DuplicateWindow {
                        name: window.name.clone(),
                    });
                }
                if window.overlaps(other) {
                    return Err(ConfigError::OverlappingWindows {
                        first: window.name.clone(),
                        second: other.name.clone(),
                    });
                }
            }
        }

        for required in [&self.morning, &self.afternoon] {
            if !self.windows.iter().any(|w| &w.name == required) {
                return Err(ConfigError::MissingWindow {
                    name: required.clone(),
                });
            }
        }

        Ok(())
    }
}
