use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Raw candles for one calendar date as handed over by a candle store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCandles {
    pub date: NaiveDate,
    pub candles: Vec<Candle>,
}

impl DayCandles {
    pub fn new(date: NaiveDate, candles: Vec<Candle>) -> Self {
        Self { date, candles }
    }
}
