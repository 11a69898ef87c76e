use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle granularity a store is queried at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    OneMin,
    FiveMin,
    FifteenMin,
    OneHour,
}

impl Timeframe {
    pub fn to_seconds(&self) -> i64 {
        match self {
            Timeframe::OneMin => 60,
            Timeframe::FiveMin => 300,
            Timeframe::FifteenMin => 900,
            Timeframe::OneHour => 3600,
        }
    }

    /// True when `unix_seconds` falls on a bucket boundary
    pub fn is_aligned(&self, unix_seconds: i64) -> bool {
        unix_seconds.rem_euclid(self.to_seconds()) == 0
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneMin => "1m",
            Timeframe::FiveMin => "5m",
            Timeframe::FifteenMin => "15m",
            Timeframe::OneHour => "1h",
        }
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "1m" | "1min" => Timeframe::OneMin,
            "5m" | "5min" => Timeframe::FiveMin,
            "15m" | "15min" => Timeframe::FifteenMin,
            "1h" | "60m" => Timeframe::OneHour,
            other => bail!("Unknown timeframe '{}' (expected 1m, 5m, 15m or 1h)", other),
        })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
