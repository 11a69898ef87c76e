use crate::application::analysis::{
    SessionSummarizer, StatisticalAggregator, WeekdayStatistics, flatten,
};
use crate::application::market_data::{IndicatorEngine, SessionSegmenter};
use crate::application::ml::{
    ModelTrainer, TrainingOutcome, TrainingReport, TrainingSet, TrainingSkip,
};
use crate::application::signals::{SignalGenerator, SignalSummary};
use crate::config::AnalysisConfig;
use crate::domain::errors::{ConfigError, RejectionReason};
use crate::domain::market::{DayCandles, DaySummary};
use crate::domain::trading::{DayRejection, SignalRecord};
use crate::domain::validation::DayValidator;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// State of the predictive model after a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelStatus {
    Trained {
        name: String,
        version: String,
        report: TrainingReport,
    },
    Skipped(TrainingSkip),
}

impl ModelStatus {
    pub fn is_trained(&self) -> bool {
        matches!(self, ModelStatus::Trained { .. })
    }
}

/// Everything one batch run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub days_received: usize,
    pub summaries: Vec<DaySummary>,
    pub rejections: Vec<DayRejection>,
    pub weekday_statistics: Vec<WeekdayStatistics>,
    pub flat_statistics: BTreeMap<String, f64>,
    pub model: ModelStatus,
    pub predictions: BTreeMap<NaiveDate, f64>,
    pub signals: Vec<SignalRecord>,
    pub signal_summary: SignalSummary,
}

/// Batch driver: validates, segments and summarizes every day in parallel,
/// then aggregates, trains and emits signals over the complete days.
pub struct SessionAnalysisPipeline {
    segmenter: SessionSegmenter,
    engine: IndicatorEngine,
    summarizer: SessionSummarizer,
    aggregator: StatisticalAggregator,
    trainer: ModelTrainer,
    signals: SignalGenerator,
    min_samples: usize,
}

impl SessionAnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            segmenter: SessionSegmenter::new(config.sessions.clone())?,
            engine: IndicatorEngine::new(config.indicators.clone())?,
            summarizer: SessionSummarizer::new(&config.sessions, config.profile.clone()),
            aggregator: StatisticalAggregator::new(config.accuracy_target),
            min_samples: config.model.min_samples,
            trainer: ModelTrainer::new(config.model.clone()),
            signals: SignalGenerator::new(config.signals.clone())?,
        })
    }

    /// Validate, segment, compute indicators and summarize a single day
    pub fn process_day(&self, day: DayCandles) -> Result<DaySummary, RejectionReason> {
        let trading_day = DayValidator::validate(day)?;
        let segmented = self.segmenter.segment(trading_day)?;
        let indicators = self.engine.compute(segmented.day().candles());
        self.summarizer.summarize(&segmented, &indicators)
    }

    pub fn run(&self, days: Vec<DayCandles>) -> AnalysisReport {
        let started = Instant::now();
        let days_received = days.len();
        info!(
            "SessionAnalysisPipeline: Processing {} days on {} threads",
            days_received,
            rayon::current_num_threads()
        );

        let results: Vec<(NaiveDate, Result<DaySummary, RejectionReason>)> = days
            .into_par_iter()
            .map(|day| (day.date, self.process_day(day)))
            .collect();

        let mut summaries = Vec::with_capacity(results.len());
        let mut rejections = Vec::new();
        for (date, result) in results {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(reason) => {
                    debug!("SessionAnalysisPipeline: {} excluded: {}", date, reason);
                    rejections.push(DayRejection { date, reason });
                }
            }
        }
        summaries.sort_by_key(|s| s.date);
        rejections.sort_by_key(|r| r.date);
        info!(
            "SessionAnalysisPipeline: {} complete days, {} rejected",
            summaries.len(),
            rejections.len()
        );

        let weekday_statistics = self.aggregator.aggregate(&summaries);
        let flat_statistics = flatten(&weekday_statistics);
        info!(
            "SessionAnalysisPipeline: Aggregated {} weekdays into {} statistics",
            weekday_statistics.len(),
            flat_statistics.len()
        );

        let (model, predictions, fitted_dates) = self.train_and_predict(&summaries);

        let mut signals = self.signals.generate_all(&summaries, &predictions);
        for signal in &mut signals {
            signal.in_sample = fitted_dates.contains(&signal.date);
        }
        let signal_summary = SignalSummary::from_signals(&signals);
        info!(
            "SessionAnalysisPipeline: Done in {:?}: {} signals ({} in-sample), win rate {:.1}%",
            started.elapsed(),
            signal_summary.count,
            signal_summary.in_sample,
            signal_summary.win_rate
        );

        AnalysisReport {
            days_received,
            summaries,
            rejections,
            weekday_statistics,
            flat_statistics,
            model,
            predictions,
            signals,
            signal_summary,
        }
    }

    /// Model status, predictions by date and the dates the model was fitted on
    fn train_and_predict(
        &self,
        summaries: &[DaySummary],
    ) -> (ModelStatus, BTreeMap<NaiveDate, f64>, BTreeSet<NaiveDate>) {
        let set = TrainingSet::from_summaries(summaries);
        match self.trainer.train_set(&set) {
            Ok(TrainingOutcome::Trained { model, report }) => {
                let predictions = model.predict_days(summaries);
                let fitted_dates = set.dates[..report.train_size].iter().copied().collect();
                info!(
                    "SessionAnalysisPipeline: {} {} predicted {} days",
                    model.name(),
                    model.version(),
                    predictions.len()
                );
                let status = ModelStatus::Trained {
                    name: model.name().to_string(),
                    version: model.version().to_string(),
                    report,
                };
                (status, predictions, fitted_dates)
            }
            Ok(TrainingOutcome::Skipped(skip)) => {
                info!(
                    "SessionAnalysisPipeline: Model skipped ({}), signals run degraded",
                    skip.reason
                );
                (ModelStatus::Skipped(skip), BTreeMap::new(), BTreeSet::new())
            }
            Err(e) => {
                warn!("SessionAnalysisPipeline: Training failed: {}", e);
                let skip = TrainingSkip {
                    samples: set.len(),
                    min_samples: self.min_samples,
                    excluded_days: set.excluded,
                    reason: format!("training failed: {}", e),
                };
                (ModelStatus::Skipped(skip), BTreeMap::new(), BTreeSet::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::Candle;
    use chrono::Duration;

    fn day(date: NaiveDate, first_hour: u32, last_hour: u32, drift: f64) -> DayCandles {
        let start = date.and_hms_opt(first_hour, 0, 0).unwrap().and_utc();
        let steps = ((last_hour - first_hour) * 12) as usize;
        let mut price = 100.0;
        let candles = (0..steps)
            .map(|i| {
                let open = price;
                price += drift + ((i as f64) * 0.7).sin() * 0.05;
                Candle::new(
                    start + Duration::minutes(5 * i as i64),
                    open,
                    open.max(price) + 0.05,
                    open.min(price) - 0.05,
                    price,
                    1000.0 + (i % 7) as f64 * 10.0,
                )
            })
            .collect();
        DayCandles::new(date, candles)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_process_day_summarizes_complete_day() {
        let pipeline = SessionAnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let summary = pipeline.process_day(day(date(3), 6, 22, 0.01)).unwrap();

        assert_eq!(summary.date, date(3));
        assert_eq!(summary.morning.candle_count, 24);
        assert_eq!(summary.afternoon.candle_count, 144);
        assert!(summary.morning.percent_move > 0.0);
    }

    #[test]
    fn test_rejections_are_isolated() {
        let pipeline = SessionAnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let days = vec![
            day(date(3), 6, 22, 0.01),
            DayCandles::new(date(4), Vec::new()),
            day(date(5), 6, 10, 0.01),
            day(date(6), 6, 22, -0.01),
        ];

        let report = pipeline.run(days);
        assert_eq!(report.days_received, 4);
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.rejections.len(), 2);
        assert_eq!(report.rejections[0].reason, RejectionReason::Empty);
        assert_eq!(
            report.rejections[1].reason,
            RejectionReason::IncompleteSession {
                session: "afternoon".to_string()
            }
        );
        // Too few samples for the model, so every signal is degraded
        assert!(!report.model.is_trained());
        assert!(report.predictions.is_empty());
        assert!(report.signals.iter().all(|s| s.degraded));
    }

    #[test]
    fn test_summaries_sorted_by_date() {
        let pipeline = SessionAnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let days = vec![
            day(date(6), 6, 22, 0.01),
            day(date(3), 6, 22, 0.01),
            day(date(4), 6, 22, -0.01),
        ];
        let report = pipeline.run(days);
        let dates: Vec<NaiveDate> = report.summaries.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(3), date(4), date(6)]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AnalysisConfig::default();
        config.indicators.rsi_period = 0;
        assert!(SessionAnalysisPipeline::new(config).is_err());
    }
}
