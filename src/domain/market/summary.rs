use super::session::Direction;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Indicator readings sampled at one candle of the full-day series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub vwap: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub bb_position: Option<f64>,
    pub atr: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
}

/// Scalar reduction of a sub-session (or of the whole day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFeatureVector {
    pub name: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub range: f64,
    pub percent_move: f64,
    pub volume: f64,
    /// Share of the full day's volume in [0, 1]
    pub volume_share: f64,
    pub candle_count: usize,
    pub indicators: IndicatorSnapshot,
}

impl SessionFeatureVector {
    pub fn direction(&self) -> Direction {
        Direction::from_move(self.percent_move)
    }

    pub fn is_bullish(&self) -> bool {
        self.direction() == Direction::Up
    }

    pub fn is_bearish(&self) -> bool {
        self.direction() == Direction::Down
    }

    /// `Some(true)` when the closing price sits strictly above VWAP
    pub fn above_vwap(&self) -> Option<bool> {
        self.indicators.vwap.map(|vwap| self.close > vwap)
    }

    pub fn is_direction_aligned(&self, other: &SessionFeatureVector) -> bool {
        self.direction() == other.direction()
    }
}

/// A run of candles sharing the same fast/slow SMA ordering.
///
/// `price_change`, `max_high` and `min_low` are measured up to the first
/// candle of the next phase (the last candle for the final phase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPhase {
    /// `Flat` while either average is warming up or both are equal
    pub trend: Direction,
    /// Index of the first candle within the sub-session
    pub start: usize,
    pub candles: usize,
    pub price_change: f64,
    pub max_high: f64,
    pub min_low: f64,
}

/// Candles that k-means grouped together by shape and context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub count: usize,
    pub avg_body: f64,
    pub avg_range: f64,
    pub bullish_pct: f64,
    /// Sample σ of the member closes
    pub avg_volatility: f64,
}

/// Session-average, pattern and breakout metrics of one sub-session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionProfile {
    pub session_average: f64,
    pub closing_vwap: f64,
    pub time_at_average_pct: f64,
    pub candles_at_average: usize,
    pub average_crosses: usize,
    pub bullish_ratio: f64,
    pub bearish_ratio: f64,
    pub max_drawdown: f64,
    pub max_run_up: f64,
    pub close_volatility: f64,
    /// Highest high minus lowest low
    pub total_range: f64,
    pub avg_body_size: f64,
    pub avg_candle_range: f64,
    /// Sample σ of close-to-close returns
    pub returns_volatility: f64,
    /// Last close minus first close
    pub total_momentum: f64,
    pub bullish_breakouts: usize,
    pub bearish_breakouts: usize,
    pub swing_highs: usize,
    pub swing_lows: usize,
    pub trend_phases: Vec<TrendPhase>,
    /// Candles DBSCAN left outside every dense region
    pub anomalies: usize,
    pub clusters: Vec<ClusterSummary>,
}

/// Everything the downstream stages know about one complete day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub morning: SessionFeatureVector,
    pub afternoon: SessionFeatureVector,
    pub full_day: SessionFeatureVector,
    pub morning_profile: SessionProfile,
}

impl DaySummary {
    pub fn morning_direction(&self) -> Direction {
        self.morning.direction()
    }

    pub fn afternoon_direction(&self) -> Direction {
        self.afternoon.direction()
    }
}
