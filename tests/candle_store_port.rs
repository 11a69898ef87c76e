mod common;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use common::{aligned_days, trading_dates};
use session_edge::application::SessionAnalysisPipeline;
use session_edge::application::market_data::{collect_all_days, collect_days};
use session_edge::config::AnalysisConfig;
use session_edge::domain::market::{Candle, Timeframe};
use session_edge::domain::ports::CandleStore;
use session_edge::infrastructure::InMemoryCandleStore;
use std::collections::HashSet;

// --- Mocks ---

struct FlakyStore {
    failing: HashSet<NaiveDate>,
}

#[async_trait]
impl CandleStore for FlakyStore {
    async fn fetch_day(&self, date: NaiveDate, _timeframe: Timeframe) -> Result<Vec<Candle>> {
        if self.failing.contains(&date) {
            bail!("connection reset");
        }
        Ok(Vec::new())
    }

    async fn available_dates(&self, _timeframe: Timeframe) -> Result<Vec<NaiveDate>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_fetch_error_aborts_collection() {
    let dates = trading_dates(3);
    let store = FlakyStore {
        failing: HashSet::from([dates[1]]),
    };

    let err = collect_days(&store, &dates, Timeframe::FiveMin)
        .await
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("connection reset"));
    assert!(message.contains(&dates[1].to_string()));
}

#[tokio::test]
async fn test_store_feeds_pipeline() {
    let store = InMemoryCandleStore::new();
    for day in aligned_days(20) {
        store.insert(Timeframe::FiveMin, day.candles).await;
    }

    let days = collect_all_days(&store, Timeframe::FiveMin).await.unwrap();
    assert_eq!(days.len(), 20);
    assert!(days.windows(2).all(|w| w[0].date < w[1].date));

    let report = SessionAnalysisPipeline::new(AnalysisConfig::default())
        .unwrap()
        .run(days);
    assert_eq!(report.summaries.len(), 20);
    assert!(report.model.is_trained());
}

#[tokio::test]
async fn test_other_timeframes_stay_separate() {
    let store = InMemoryCandleStore::new();
    for day in aligned_days(2) {
        store.insert(Timeframe::FiveMin, day.candles).await;
    }

    let hourly = collect_all_days(&store, Timeframe::OneHour).await.unwrap();
    assert!(hourly.is_empty());
}
