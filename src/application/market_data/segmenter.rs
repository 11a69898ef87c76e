use crate::config::SessionConfig;
use crate::domain::errors::{ConfigError, RejectionReason};
use crate::domain::market::{SegmentedDay, SubSession, TradingDay};
use chrono::Timelike;
use tracing::debug;

/// Splits trading days into the configured sub-sessions.
#[derive(Debug, Clone)]
pub struct SessionSegmenter {
    config: SessionConfig,
}

impl SessionSegmenter {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Assigns each candle to the window containing its UTC hour.
    ///
    /// Candles outside every window are dropped. A window without candles
    /// makes the day incomplete.
    pub fn segment(&self, day: TradingDay) -> Result<SegmentedDay, RejectionReason> {
        let candles = day.candles();
        let mut sub_sessions = Vec::with_capacity(self.config.windows.len());

        for window in &self.config.windows {
            // Same-day candles are sorted, so hours never decrease and each
            // window maps onto one contiguous range.
            let start = candles.partition_point(|c| c.timestamp.hour() < window.start_hour);
            let end = candles.partition_point(|c| c.timestamp.hour() < window.end_hour);

            if start >= end {
                debug!(
                    "SessionSegmenter: {} has no candles in '{}' [{}, {})",
                    day.date(),
                    window.name,
                    window.start_hour,
                    window.end_hour
                );
                return Err(RejectionReason::IncompleteSession {
                    session: window.name.clone(),
                });
            }

            sub_sessions.push(SubSession {
                name: window.name.clone(),
                range: start..end,
            });
        }

        Ok(SegmentedDay::new(day, sub_sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionWindow;
    use crate::domain::market::{Candle, DayCandles};
    use crate::domain::validation::DayValidator;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn day_with_hours(first_hour: u32, last_hour: u32) -> TradingDay {
        let start = Utc.with_ymd_and_hms(2025, 3, 5, first_hour, 0, 0).unwrap();
        let count = ((last_hour - first_hour + 1) * 4) as i64;
        let candles = (0..count)
            .map(|i| {
                let p = 100.0 + i as f64 * 0.1;
                Candle::new(start + Duration::minutes(15 * i), p, p + 0.5, p - 0.5, p, 10.0)
            })
            .collect();
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        DayValidator::validate(DayCandles::new(date, candles)).unwrap()
    }

    #[test]
    fn test_default_windows() {
        let segmenter = SessionSegmenter::new(SessionConfig::default()).unwrap();
        let segmented = segmenter.segment(day_with_hours(7, 22)).unwrap();

        let morning = segmented.get("morning").unwrap();
        let afternoon = segmented.get("afternoon").unwrap();
        assert_eq!(morning.len(), 8);
        assert_eq!(afternoon.len(), 48);
        // 07:xx and 22:xx candles fall outside both windows
        assert_eq!(segmented.dropped_candles(), 8);
        assert_eq!(segmented.candles_of(morning)[0].timestamp.hour(), 8);
    }

    #[test]
    fn test_partition_law_with_exhaustive_windows() {
        let config = SessionConfig {
            windows: vec![
                SessionWindow::new("afternoon", 12, 24),
                SessionWindow::new("morning", 0, 12),
            ],
            ..Default::default()
        };
        let segmenter = SessionSegmenter::new(config).unwrap();
        let day = day_with_hours(6, 20);
        let expected: Vec<Candle> = day.candles().to_vec();
        let segmented = segmenter.segment(day).unwrap();

        let rebuilt: Vec<Candle> = segmented
            .sub_sessions()
            .iter()
            .flat_map(|s| segmented.candles_of(s).iter().copied())
            .collect();
        assert_eq!(rebuilt, expected);
        assert_eq!(segmented.dropped_candles(), 0);
    }

    #[test]
    fn test_empty_window_rejects_day() {
        let segmenter = SessionSegmenter::new(SessionConfig::default()).unwrap();
        let result = segmenter.segment(day_with_hours(10, 15));
        assert_eq!(
            result.unwrap_err(),
            RejectionReason::IncompleteSession {
                session: "morning".to_string()
            }
        );
    }
}
