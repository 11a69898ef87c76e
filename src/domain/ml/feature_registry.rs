use crate::domain::market::SessionFeatureVector;

/// Ordered list of model feature names.
/// Row vectors are built in exactly this order; reordering invalidates
/// any fitted scaler or regressor.
pub const FEATURE_NAMES: &[&str] = &[
    "percent_move",
    "range",
    "volume",
    "rsi",
    "vwap_position",
    "ema_fast_position",
    "ema_slow_position",
    "bb_position",
    "macd",
    "macd_signal",
    "stoch_k",
    "stoch_d",
];

/// +1 when `price` sits strictly above `reference`, -1 otherwise
fn relative_position(price: f64, reference: Option<f64>) -> Option<f64> {
    reference.map(|r| if price > r { 1.0 } else { -1.0 })
}

/// Builds the model row of a morning sub-session.
///
/// Returns `None` as soon as one feature is undefined (warm-up not covered);
/// such a day is excluded from training and receives no prediction.
pub fn features_to_vector(session: &SessionFeatureVector) -> Option<Vec<f64>> {
    let ind = &session.indicators;
    Some(vec![
        session.percent_move,
        session.range,
        session.volume,
        ind.rsi?,
        relative_position(session.close, ind.vwap)?,
        relative_position(session.close, ind.ema_fast)?,
        relative_position(session.close, ind.ema_slow)?,
        ind.bb_position?,
        ind.macd?,
        ind.macd_signal?,
        ind.stoch_k?,
        ind.stoch_d?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::IndicatorSnapshot;

    fn session(indicators: IndicatorSnapshot) -> SessionFeatureVector {
        SessionFeatureVector {
            name: "morning".to_string(),
            open: 100.0,
            close: 102.0,
            high: 102.5,
            low: 99.5,
            range: 3.0,
            percent_move: 2.0,
            volume: 500.0,
            volume_share: 0.4,
            candle_count: 24,
            indicators,
        }
    }

    fn complete() -> IndicatorSnapshot {
        IndicatorSnapshot {
            vwap: Some(101.0),
            ema_fast: Some(101.5),
            ema_slow: Some(102.5),
            rsi: Some(45.0),
            bb_position: Some(0.7),
            macd: Some(0.2),
            macd_signal: Some(0.1),
            stoch_k: Some(80.0),
            stoch_d: Some(75.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_feature_vector_length_and_order() {
        let row = features_to_vector(&session(complete())).unwrap();
        assert_eq!(row.len(), FEATURE_NAMES.len());
        assert_eq!(row[0], 2.0);
        assert_eq!(row[3], 45.0);
        // above VWAP and fast EMA, below slow EMA
        assert_eq!(row[4], 1.0);
        assert_eq!(row[5], 1.0);
        assert_eq!(row[6], -1.0);
        assert_eq!(row[11], 75.0);
    }

    #[test]
    fn test_missing_indicator_drops_row() {
        let mut indicators = complete();
        indicators.stoch_d = None;
        assert!(features_to_vector(&session(indicators)).is_none());
    }
}
