use crate::domain::errors::RejectionReason;
use crate::domain::market::{Candle, DayCandles, TradingDay};
use tracing::warn;

/// Gatekeeper between the candle store and the analysis core.
///
/// Rejects days containing physically impossible or inconsistent candles.
/// A rejection only ever concerns the day being validated.
pub struct DayValidator;

impl DayValidator {
    /// Validates a raw day and turns it into a `TradingDay`.
    pub fn validate(day: DayCandles) -> Result<TradingDay, RejectionReason> {
        let date = day.date;
        match Self::check(&day) {
            Ok(()) => Ok(TradingDay::from_validated(date, day.candles)),
            Err(reason) => {
                warn!("DayValidator: Rejected {}: {}", date, reason);
                Err(reason)
            }
        }
    }

    fn check(day: &DayCandles) -> Result<(), RejectionReason> {
        if day.candles.is_empty() {
            return Err(RejectionReason::Empty);
        }

        for (index, candle) in day.candles.iter().enumerate() {
            Self::validate_candle(index, candle)?;

            let actual = candle.date();
            if actual != day.date {
                return Err(RejectionReason::DateMismatch {
                    index,
                    timestamp: candle.timestamp,
                    expected: day.date,
                    actual,
                });
            }

            if index > 0 {
                let previous = day.candles[index - 1].timestamp;
                if candle.timestamp == previous {
                    return Err(RejectionReason::DuplicateTimestamp {
                        index,
                        timestamp: candle.timestamp,
                    });
                }
                if candle.timestamp < previous {
                    return Err(RejectionReason::NonMonotonicTimestamp {
                        index,
                        timestamp: candle.timestamp,
                        previous,
                    });
                }
            }
        }

        Ok(())
    }

    /// Validates a single candle in isolation.
    pub fn validate_candle(index: usize, candle: &Candle) -> Result<(), RejectionReason> {
        let values = [
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(RejectionReason::NonFiniteValue { index });
        }

        if candle.open <= 0.0 || candle.high <= 0.0 || candle.low <= 0.0 || candle.close <= 0.0 {
            return Err(RejectionReason::NonPositivePrice { index });
        }

        if candle.low > candle.high {
            return Err(RejectionReason::LowAboveHigh {
                index,
                low: candle.low,
                high: candle.high,
            });
        }

        for (field, value) in [("open", candle.open), ("close", candle.close)] {
            if value < candle.low || value > candle.high {
                return Err(RejectionReason::OhlcOutOfRange {
                    index,
                    field,
                    value,
                    low: candle.low,
                    high: candle.high,
                });
            }
        }

        if candle.volume < 0.0 {
            return Err(RejectionReason::NegativeVolume {
                index,
                volume: candle.volume,
            });
        }

        Ok(())
    }
}
