//! CSV candle import (`timestamp,open,high,low,close,volume`, RFC 3339 timestamps).

use super::repositories::InMemoryCandleStore;
use crate::domain::market::{Candle, DayCandles, Timeframe};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CandleRow> for Candle {
    fn from(row: CandleRow) -> Self {
        Candle::new(
            row.timestamp,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
        )
    }
}

/// Parses candles from any CSV source with a header row.
///
/// Rows are returned in file order; integrity checks are left to validation.
pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles = Vec::new();

    for (line, result) in rdr.deserialize::<CandleRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to parse candle row {}", line + 1))?;
        candles.push(row.into());
    }

    Ok(candles)
}

pub fn load_csv(path: &Path) -> Result<Vec<Candle>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let candles = read_candles(BufReader::new(file))
        .with_context(|| format!("Failed to read candles from {}", path.display()))?;
    info!(
        "CsvLoader: Read {} candles from {}",
        candles.len(),
        path.display()
    );
    Ok(candles)
}

/// Buckets candles by UTC calendar date, dates ascending
pub fn group_by_date(candles: Vec<Candle>) -> Vec<DayCandles> {
    let mut days: BTreeMap<NaiveDate, Vec<Candle>> = BTreeMap::new();
    for candle in candles {
        days.entry(candle.date()).or_default().push(candle);
    }
    days.into_iter()
        .map(|(date, candles)| DayCandles::new(date, candles))
        .collect()
}

/// Loads a CSV file into the store, returning the number of candles stored
pub async fn load_into_store(
    path: &Path,
    store: &InMemoryCandleStore,
    timeframe: Timeframe,
) -> Result<usize> {
    let candles = load_csv(path)?;
    let count = candles.len();
    let misaligned = candles
        .iter()
        .filter(|c| !timeframe.is_aligned(c.timestamp.timestamp()))
        .count();
    if misaligned > 0 {
        warn!(
            "CsvLoader: {} of {} candles are off the {} grid",
            misaligned, count, timeframe
        );
    }
    store.insert(timeframe, candles).await;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
timestamp,open,high,low,close,volume
2025-03-03T08:00:00Z,100.0,101.0,99.5,100.5,1200
2025-03-03T08:05:00Z,100.5,101.5,100.0,101.0,900
2025-03-04T08:00:00Z,101.0,102.0,100.5,101.5,1100
";

    #[test]
    fn test_reads_rows_in_order() {
        let candles = read_candles(SAMPLE.as_bytes()).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[1].close, 101.0);
        assert_eq!(candles[2].volume, 1100.0);
        assert_eq!(candles[0].timestamp.to_rfc3339(), "2025-03-03T08:00:00+00:00");
    }

    #[test]
    fn test_groups_by_date() {
        let days = group_by_date(read_candles(SAMPLE.as_bytes()).unwrap());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(days[0].candles.len(), 2);
        assert_eq!(days[1].candles.len(), 1);
    }

    #[test]
    fn test_bad_row_reports_line() {
        let raw = "timestamp,open,high,low,close,volume\nnot-a-date,1,1,1,1,1\n";
        let err = read_candles(raw.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("row 1"));
    }

    #[test]
    fn test_load_into_store() {
        let path = std::env::temp_dir().join(format!("candles-{}.csv", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();

        let store = InMemoryCandleStore::new();
        let count =
            tokio_test::block_on(load_into_store(&path, &store, Timeframe::FiveMin)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(count, 3);
        assert_eq!(tokio_test::block_on(store.day_count()), 2);
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(load_csv(Path::new("/nonexistent/candles.csv")).is_err());
    }
}
