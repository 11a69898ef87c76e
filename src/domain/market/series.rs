use serde::{Deserialize, Serialize};

/// Indicator output aligned 1:1 with its input candles.
///
/// Warm-up positions hold `None`; they are never coerced to zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSeries {
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// Series of `len` positions without any defined value
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// Series that holds the same value at every position
    pub fn constant(len: usize, value: f64) -> Self {
        Self {
            values: vec![Some(value); len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Defined values only, in order
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    /// Number of leading positions without a value
    pub fn warmup_len(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }
}

impl From<Vec<Option<f64>>> for IndicatorSeries {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self::new(values)
    }
}
