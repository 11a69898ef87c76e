use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Why a trading day was excluded from analysis.
///
/// A rejection only ever removes its own day; the rest of the batch keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectionReason {
    #[error("no candles supplied")]
    Empty,

    #[error("candle {index} has a non-finite value")]
    NonFiniteValue { index: usize },

    #[error("candle {index} has non-positive price component(s)")]
    NonPositivePrice { index: usize },

    #[error("candle {index} has low {low} > high {high}")]
    LowAboveHigh { index: usize, low: f64, high: f64 },

    #[error("candle {index} has {field} {value} outside [{low}, {high}]")]
    OhlcOutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("candle {index} has negative volume: {volume}")]
    NegativeVolume { index: usize, volume: f64 },

    #[error("candle {index} at {timestamp} belongs to {actual}, expected {expected}")]
    DateMismatch {
        index: usize,
        timestamp: DateTime<Utc>,
        expected: NaiveDate,
        actual: NaiveDate,
    },

    #[error("duplicate timestamp {timestamp} at candle {index}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },

    #[error("timestamp {timestamp} at candle {index} is earlier than {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("sub-session '{session}' has no candles")]
    IncompleteSession { session: String },
}

/// Errors raised when an analysis configuration is inconsistent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    ZeroPeriod { name: &'static str },

    #[error("MACD fast period {fast} must be below slow period {slow}")]
    MacdPeriods { fast: usize, slow: usize },

    #[error("sub-session '{name}' has invalid hours [{start_hour}, {end_hour})")]
    InvalidWindow {
        name: String,
        start_hour: u32,
        end_hour: u32,
    },

    #[error("sub-sessions '{first}' and '{second}' overlap")]
    OverlappingWindows { first: String, second: String },

    #[error("sub-session '{name}' is configured twice")]
    DuplicateWindow { name: String },

    #[error("sub-session '{name}' is referenced but not configured")]
    MissingWindow { name: String },

    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid sub-session spec '{spec}': {reason}")]
    InvalidWindowSpec { spec: String, reason: String },

    #[error("min_samples {min_samples} is below the {features} model features")]
    TooFewSamples { min_samples: usize, features: usize },

    #[error("unknown accuracy target '{0}', expected 'afternoon' or 'full_day'")]
    UnknownAccuracyTarget(String),
}

/// Errors related to fitting or querying the predictive model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("feature rows and labels differ in length: {rows} rows, {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("expected {expected} features per row, got {actual}")]
    FeatureWidth { expected: usize, actual: usize },

    #[error("no training rows supplied")]
    EmptyTrainingSet,

    #[error("matrix construction failed: {0}")]
    Matrix(String),

    #[error("model fit failed: {0}")]
    Fit(String),

    #[error("prediction failed: {0}")]
    Predict(String),
}
