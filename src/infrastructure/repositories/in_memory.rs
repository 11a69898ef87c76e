//! In-memory candle store.
//!
//! Thread-safe (`Arc<RwLock>`), filled up front by a loader or by tests and
//! then read by the day loader. Nothing is persisted.

use crate::domain::market::{Candle, Timeframe};
use crate::domain::ports::CandleStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type DayKey = (NaiveDate, Timeframe);

/// Candles keyed by calendar date and granularity
#[derive(Clone, Default)]
pub struct InMemoryCandleStore {
    days: Arc<RwLock<BTreeMap<DayKey, Vec<Candle>>>>,
}

impl InMemoryCandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends candles, bucketing each one by its UTC date
    pub async fn insert(&self, timeframe: Timeframe, candles: Vec<Candle>) {
        let mut days = self.days.write().await;
        for candle in candles {
            days.entry((candle.date(), timeframe))
                .or_default()
                .push(candle);
        }
    }

    /// Replaces the candles of one date, including an empty day
    pub async fn insert_day(&self, date: NaiveDate, timeframe: Timeframe, candles: Vec<Candle>) {
        self.days.write().await.insert((date, timeframe), candles);
    }

    pub async fn day_count(&self) -> usize {
        self.days.read().await.len()
    }
}

#[async_trait]
impl CandleStore for InMemoryCandleStore {
    async fn fetch_day(&self, date: NaiveDate, timeframe: Timeframe) -> Result<Vec<Candle>> {
        Ok(self
            .days
            .read()
            .await
            .get(&(date, timeframe))
            .cloned()
            .unwrap_or_default())
    }

    async fn available_dates(&self, timeframe: Timeframe) -> Result<Vec<NaiveDate>> {
        Ok(self
            .days
            .read()
            .await
            .keys()
            .filter(|(_, tf)| *tf == timeframe)
            .map(|(date, _)| *date)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::market_data::collect_all_days;
    use chrono::{Duration, TimeZone, Utc};

    fn candles(day: u32, count: i64) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                Candle::new(
                    start + Duration::minutes(5 * i),
                    100.0,
                    101.0,
                    99.0,
                    100.5,
                    10.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_fetch_by_date_and_timeframe() {
        tokio_test::block_on(async {
            let store = InMemoryCandleStore::new();
            let mut batch = candles(3, 4);
            batch.extend(candles(4, 2));
            store.insert(Timeframe::FiveMin, batch).await;
            store.insert(Timeframe::OneHour, candles(5, 1)).await;

            let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
            assert_eq!(store.fetch_day(monday, Timeframe::FiveMin).await.unwrap().len(), 4);
            assert!(store.fetch_day(monday, Timeframe::OneMin).await.unwrap().is_empty());

            let dates = store.available_dates(Timeframe::FiveMin).await.unwrap();
            assert_eq!(dates.len(), 2);
            assert!(dates.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(store.day_count().await, 3);
        });
    }

    #[test]
    fn test_collect_all_days_through_port() {
        tokio_test::block_on(async {
            let store = InMemoryCandleStore::new();
            store.insert(Timeframe::FiveMin, candles(5, 3)).await;
            store.insert(Timeframe::FiveMin, candles(3, 2)).await;
            let empty = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
            store.insert_day(empty, Timeframe::FiveMin, Vec::new()).await;

            let days = collect_all_days(&store, Timeframe::FiveMin).await.unwrap();
            let sizes: Vec<usize> = days.iter().map(|d| d.candles.len()).collect();
            assert_eq!(sizes, vec![2, 0, 3]);
            assert_eq!(days[1].date, empty);
        });
    }
}
