use super::session_profile::profile;
use crate::application::market_data::DayIndicators;
use crate::config::{ProfileConfig, SessionConfig};
use crate::domain::errors::RejectionReason;
use crate::domain::market::{Candle, DaySummary, SegmentedDay, SessionFeatureVector};
use tracing::debug;

/// Reduces segmented days to their feature vectors.
#[derive(Debug, Clone)]
pub struct SessionSummarizer {
    morning: String,
    afternoon: String,
    profile: ProfileConfig,
}

impl SessionSummarizer {
    pub fn new(sessions: &SessionConfig, profile: ProfileConfig) -> Self {
        Self {
            morning: sessions.morning.clone(),
            afternoon: sessions.afternoon.clone(),
            profile,
        }
    }

    pub fn summarize(
        &self,
        segmented: &SegmentedDay,
        indicators: &DayIndicators,
    ) -> Result<DaySummary, RejectionReason> {
        let day = segmented.day();
        let day_candles = day.candles();
        let day_volume: f64 = day_candles.iter().map(|c| c.volume).sum();

        let morning_session = segmented.get(&self.morning).ok_or_else(|| {
            RejectionReason::IncompleteSession {
                session: self.morning.clone(),
            }
        })?;
        let afternoon_session = segmented.get(&self.afternoon).ok_or_else(|| {
            RejectionReason::IncompleteSession {
                session: self.afternoon.clone(),
            }
        })?;

        let morning_candles = segmented.candles_of(morning_session);
        let morning = feature_vector(
            &self.morning,
            morning_candles,
            day_volume,
            indicators,
            morning_session.last_index(),
        );
        let afternoon = feature_vector(
            &self.afternoon,
            segmented.candles_of(afternoon_session),
            day_volume,
            indicators,
            afternoon_session.last_index(),
        );
        let full_day = feature_vector(
            "full_day",
            day_candles,
            day_volume,
            indicators,
            day_candles.len() - 1,
        );

        debug!(
            "SessionSummarizer: {} morning {:+.3}% afternoon {:+.3}%",
            day.date(),
            morning.percent_move,
            afternoon.percent_move
        );

        Ok(DaySummary {
            date: day.date(),
            weekday: day.weekday(),
            morning,
            afternoon,
            full_day,
            morning_profile: profile(morning_candles, &self.profile),
        })
    }
}

/// Scalar reduction of `candles`, sampling indicators at `last_index` of the
/// full-day series.
///
/// `candles` must be non-empty; segmentation guarantees it.
pub fn feature_vector(
    name: &str,
    candles: &[Candle],
    day_volume: f64,
    indicators: &DayIndicators,
    last_index: usize,
) -> SessionFeatureVector {
    let open = candles.first().map(|c| c.open).unwrap_or_default();
    let close = candles.last().map(|c| c.close).unwrap_or_default();
    let high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let volume: f64 = candles.iter().map(|c| c.volume).sum();

    let percent_move = if open > 0.0 {
        (close - open) / open * 100.0
    } else {
        0.0
    };
    let volume_share = if day_volume > 0.0 {
        volume / day_volume
    } else {
        0.0
    };

    SessionFeatureVector {
        name: name.to_string(),
        open,
        close,
        high,
        low,
        range: high - low,
        percent_move,
        volume,
        volume_share,
        candle_count: candles.len(),
        indicators: indicators.snapshot(last_index),
    }
}
