use crate::domain::market::{Candle, Timeframe};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of raw candles, implemented by storage or provider collaborators.
///
/// Implementations return the candles of one calendar date in any order;
/// ordering and integrity are enforced later by `DayValidator`.
#[async_trait]
pub trait CandleStore: Send + Sync {
    async fn fetch_day(&self, date: NaiveDate, timeframe: Timeframe) -> Result<Vec<Candle>>;

    /// Dates for which the store holds candles at this granularity, ascending
    async fn available_dates(&self, timeframe: Timeframe) -> Result<Vec<NaiveDate>>;
}
