//! Candle pattern detection inside one sub-session.
//!
//! Swing points are peaks filtered by prominence and trend phases compare a
//! fast and a slow SMA of the close. Behaviour clusters (k-means) and
//! anomalies (DBSCAN noise) both run on standardized per-candle features.

use crate::application::ml::FeatureScaler;
use crate::config::ProfileConfig;
use crate::domain::errors::ModelError;
use crate::domain::market::{Candle, ClusterSummary, Direction, TrendPhase};
use crate::domain::performance::Stats;
use smartcore::algorithm::neighbour::KNNAlgorithmName;
use smartcore::cluster::dbscan::{DBSCAN, DBSCANParameters};
use smartcore::cluster::kmeans::{KMeans, KMeansParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use std::cmp::Ordering;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::{debug, warn};

type Clusterer = KMeans<f64, usize, DenseMatrix<f64>, Vec<usize>>;
type DensityScan = DBSCAN<f64, usize, DenseMatrix<f64>, Vec<usize>, Euclidian<f64>>;

/// Everything pattern detection found in one sub-session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatterns {
    pub swing_highs: usize,
    pub swing_lows: usize,
    pub trend_phases: Vec<TrendPhase>,
    pub anomalies: usize,
    pub clusters: Vec<ClusterSummary>,
}

pub fn detect(candles: &[Candle], config: &ProfileConfig) -> SessionPatterns {
    let (swing_highs, swing_lows) = swing_points(candles, config.swing_prominence);
    let features = CandleFeatures::compute(candles, config.short_window, config.long_window);

    let clusters = cluster_behaviour(candles, &features, config).unwrap_or_else(|e| {
        warn!("PatternDetector: Clustering failed: {}", e);
        Vec::new()
    });
    let anomalies = anomaly_count(&features, config).unwrap_or_else(|e| {
        warn!("PatternDetector: Anomaly scan failed: {}", e);
        0
    });

    SessionPatterns {
        swing_highs,
        swing_lows,
        trend_phases: trend_phases(candles, config.trend_fast_period, config.trend_slow_period),
        anomalies,
        clusters,
    }
}

/// (swing highs, swing lows) with at least `prominence` points of prominence
pub fn swing_points(candles: &[Candle], prominence: f64) -> (usize, usize) {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let inverted_lows: Vec<f64> = candles.iter().map(|c| -c.low).collect();
    (
        peak_count(&highs, prominence),
        peak_count(&inverted_lows, prominence),
    )
}

/// Local maxima whose prominence reaches `prominence`.
///
/// A flat top counts once. The edges are never peaks.
pub fn peak_count(values: &[f64], prominence: f64) -> usize {
    let n = values.len();
    let mut count = 0;
    let mut i = 1;
    while i + 1 < n {
        if values[i - 1] >= values[i] {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < n && values[j] == values[i] {
            j += 1;
        }
        if j < n && values[j] < values[i] && peak_prominence(values, i, j - 1) >= prominence {
            count += 1;
        }
        i = j;
    }
    count
}

/// Height of the top `values[first..=last]` above the higher of its bases.
///
/// Each base is the lowest value before a strictly higher one (or the edge).
fn peak_prominence(values: &[f64], first: usize, last: usize) -> f64 {
    let peak = values[first];
    let lowest = |acc: f64, v: &f64| acc.min(*v);
    let left_base = values[..first]
        .iter()
        .rev()
        .take_while(|v| **v <= peak)
        .fold(peak, lowest);
    let right_base = values[last + 1..]
        .iter()
        .take_while(|v| **v <= peak)
        .fold(peak, lowest);
    peak - left_base.max(right_base)
}

/// Consecutive runs of SMA(fast) above, below or level with SMA(slow).
pub fn trend_phases(candles: &[Candle], fast_period: usize, slow_period: usize) -> Vec<TrendPhase> {
    if candles.is_empty() {
        return Vec::new();
    }
    let (mut fast, mut slow) = match (
        SimpleMovingAverage::new(fast_period),
        SimpleMovingAverage::new(slow_period),
    ) {
        (Ok(fast), Ok(slow)) => (fast, slow),
        _ => {
            debug!(
                "PatternDetector: SMA({}, {}) unavailable, no trend phases",
                fast_period, slow_period
            );
            return Vec::new();
        }
    };

    let warm_up = fast_period.max(slow_period) - 1;
    let trends: Vec<Direction> = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let fast_value = fast.next(candle.close);
            let slow_value = slow.next(candle.close);
            if i < warm_up {
                Direction::Flat
            } else {
                Direction::from_move(fast_value - slow_value)
            }
        })
        .collect();

    let last = candles.len() - 1;
    let mut phases = Vec::new();
    let mut start = 0;
    for i in 1..=candles.len() {
        if i < candles.len() && trends[i] == trends[start] {
            continue;
        }
        let end = i.min(last);
        let span = &candles[start..=end];
        phases.push(TrendPhase {
            trend: trends[start],
            start,
            candles: i - start,
            price_change: candles[end].close - candles[start].close,
            max_high: span.iter().map(|c| c.high).fold(f64::MIN, f64::max),
            min_low: span.iter().map(|c| c.low).fold(f64::MAX, f64::min),
        });
        start = i;
    }
    phases
}

/// Per-candle shape and context features; warm-up positions are zero.
struct CandleFeatures {
    body_pct: Vec<f64>,
    range: Vec<f64>,
    momentum: Vec<f64>,
    short_volatility: Vec<f64>,
    long_volatility: Vec<f64>,
    long_momentum: Vec<f64>,
    price_position: Vec<f64>,
}

impl CandleFeatures {
    fn compute(candles: &[Candle], short_window: usize, long_window: usize) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let momentum = (0..closes.len())
            .map(|i| if i == 0 { 0.0 } else { closes[i] - closes[i - 1] })
            .collect();

        let long_momentum = (0..closes.len())
            .map(|i| match i.checked_sub(long_window) {
                Some(base) if closes[base] > 0.0 => closes[i] / closes[base] - 1.0,
                _ => 0.0,
            })
            .collect();

        let price_position = (0..candles.len())
            .map(|i| {
                if long_window == 0 || i + 1 < long_window {
                    return 0.0;
                }
                let window = &candles[i + 1 - long_window..=i];
                let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
                let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
                let range = highest - lowest;
                if range > f64::EPSILON {
                    (candles[i].close - lowest) / range
                } else {
                    0.0
                }
            })
            .collect();

        Self {
            body_pct: candles
                .iter()
                .map(|c| (c.close - c.open) / c.open * 100.0)
                .collect(),
            range: candles.iter().map(|c| c.high - c.low).collect(),
            momentum,
            short_volatility: rolling_std(&closes, short_window),
            long_volatility: rolling_std(&closes, long_window),
            long_momentum,
            price_position,
        }
    }

    fn len(&self) -> usize {
        self.range.len()
    }

    fn cluster_rows(&self) -> Vec<Vec<f64>> {
        (0..self.len())
            .map(|i| {
                vec![
                    self.body_pct[i],
                    self.range[i],
                    self.long_volatility[i],
                    self.long_momentum[i],
                    self.price_position[i],
                ]
            })
            .collect()
    }

    fn anomaly_rows(&self) -> Vec<Vec<f64>> {
        (0..self.len())
            .map(|i| {
                vec![
                    self.body_pct[i],
                    self.range[i],
                    self.momentum[i],
                    self.short_volatility[i],
                    self.long_volatility[i],
                ]
            })
            .collect()
    }
}

/// Sample σ over a trailing window, zero until the window is full
fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if window >= 2 && i + 1 >= window {
                Stats::sample_std_dev(&values[i + 1 - window..=i])
            } else {
                0.0
            }
        })
        .collect()
}

fn standardize(rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
    FeatureScaler::fit(rows)?.transform(rows)
}

fn matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>, ModelError> {
    DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| ModelError::Matrix(e.to_string()))
}

fn distinct_rows(rows: &[Vec<f64>]) -> usize {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted.dedup();
    sorted.len()
}

/// Seeded k-means labels, `None` when fewer than `k` rows are distinct
pub fn cluster_labels(
    rows: &[Vec<f64>],
    k: usize,
    seed: u64,
) -> Result<Option<Vec<usize>>, ModelError> {
    if distinct_rows(rows) < k {
        return Ok(None);
    }
    let x = matrix(rows)?;
    let params = KMeansParameters {
        seed: Some(seed),
        ..KMeansParameters::default().with_k(k)
    };
    let model = Clusterer::fit(&x, params).map_err(|e| ModelError::Fit(e.to_string()))?;
    let labels = model
        .predict(&x)
        .map_err(|e| ModelError::Predict(e.to_string()))?;
    Ok(Some(labels))
}

/// True for every row whose neighbourhood DBSCAN classifies as noise
pub fn outlier_flags(
    rows: &[Vec<f64>],
    eps: f64,
    min_samples: usize,
) -> Result<Vec<bool>, ModelError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let x = matrix(rows)?;
    let params: DBSCANParameters<f64, Euclidian<f64>> = DBSCANParameters::default()
        .with_eps(eps)
        .with_min_samples(min_samples)
        .with_algorithm(KNNAlgorithmName::LinearSearch);
    let labels = DensityScan::fit(&x, params)
        .and_then(|model| model.predict(&x))
        .map_err(|e| ModelError::Fit(e.to_string()))?;
    // label 0 is noise, clusters are numbered from 1
    Ok(labels.into_iter().map(|label| label == 0).collect())
}

fn cluster_behaviour(
    candles: &[Candle],
    features: &CandleFeatures,
    config: &ProfileConfig,
) -> Result<Vec<ClusterSummary>, ModelError> {
    if candles.len() < config.cluster_count {
        return Ok(Vec::new());
    }
    let rows = standardize(&features.cluster_rows())?;
    let Some(labels) = cluster_labels(&rows, config.cluster_count, config.cluster_seed)? else {
        debug!(
            "PatternDetector: Fewer than {} distinct candles, no clusters",
            config.cluster_count
        );
        return Ok(Vec::new());
    };

    let summaries = (0..config.cluster_count)
        .filter_map(|cluster| {
            let members: Vec<&Candle> = candles
                .iter()
                .zip(&labels)
                .filter(|(_, label)| **label == cluster)
                .map(|(candle, _)| candle)
                .collect();
            if members.is_empty() {
                return None;
            }
            let count = members.len() as f64;
            let closes: Vec<f64> = members.iter().map(|c| c.close).collect();
            Some(ClusterSummary {
                cluster,
                count: members.len(),
                avg_body: members.iter().map(|c| c.close - c.open).sum::<f64>() / count,
                avg_range: members.iter().map(|c| c.high - c.low).sum::<f64>() / count,
                bullish_pct: members.iter().filter(|c| c.is_bullish()).count() as f64 / count
                    * 100.0,
                avg_volatility: Stats::sample_std_dev(&closes),
            })
        })
        .collect();
    Ok(summaries)
}

/// Noise candles; sessions shorter than `anomaly_min_samples` report none
fn anomaly_count(features: &CandleFeatures, config: &ProfileConfig) -> Result<usize, ModelError> {
    if features.len() < config.anomaly_min_samples {
        return Ok(0);
    }
    let rows = standardize(&features.anomaly_rows())?;
    let flags = outlier_flags(&rows, config.anomaly_eps, config.anomaly_min_samples)?;
    Ok(flags.into_iter().filter(|noise| *noise).count())
}
