use crate::domain::market::{DayCandles, Timeframe};
use crate::domain::ports::CandleStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

/// Fetches every requested date from the candle store.
///
/// Dates are processed in order and a fetch error aborts the collection;
/// days that come back empty are kept so the validator can report them.
pub async fn collect_days(
    store: &dyn CandleStore,
    dates: &[NaiveDate],
    timeframe: Timeframe,
) -> Result<Vec<DayCandles>> {
    let mut days = Vec::with_capacity(dates.len());

    for &date in dates {
        let candles = store
            .fetch_day(date, timeframe)
            .await
            .with_context(|| format!("Failed to fetch {} candles for {}", timeframe, date))?;
        days.push(DayCandles::new(date, candles));
    }

    info!(
        "DayLoader: Collected {} days of {} candles",
        days.len(),
        timeframe
    );
    Ok(days)
}

/// Collects every date the store advertises for this timeframe
pub async fn collect_all_days(
    store: &dyn CandleStore,
    timeframe: Timeframe,
) -> Result<Vec<DayCandles>> {
    let dates = store
        .available_dates(timeframe)
        .await
        .context("Failed to list available dates")?;
    collect_days(store, &dates, timeframe).await
}
