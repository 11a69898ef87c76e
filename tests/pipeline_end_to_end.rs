mod common;

use common::{aligned_days, synthetic_day, trading_dates};
use session_edge::application::{ModelStatus, SessionAnalysisPipeline};
use session_edge::config::{AccuracyTarget, AnalysisConfig};
use session_edge::domain::errors::RejectionReason;
use session_edge::domain::market::DayCandles;
use session_edge::domain::trading::Side;

fn pipeline() -> SessionAnalysisPipeline {
    SessionAnalysisPipeline::new(AnalysisConfig::default()).unwrap()
}

#[test]
fn test_full_batch_trains_and_signals() {
    let report = pipeline().run(aligned_days(30));

    assert_eq!(report.days_received, 30);
    assert_eq!(report.summaries.len(), 30);
    assert!(report.rejections.is_empty());

    match &report.model {
        ModelStatus::Trained { report, .. } => {
            assert_eq!(report.samples, 30);
            assert_eq!(report.excluded_days, 0);
            assert_eq!(report.train_size + report.validation_size, 30);
        }
        ModelStatus::Skipped(skip) => panic!("model skipped: {}", skip.reason),
    }
    assert_eq!(report.predictions.len(), 30);
    assert!(report.signals.iter().all(|s| !s.degraded));

    for signal in &report.signals {
        match signal.side {
            Side::Long => assert!(signal.stop_loss < signal.entry && signal.entry < signal.target),
            Side::Short => assert!(signal.target < signal.entry && signal.entry < signal.stop_loss),
        }
        assert!(signal.confidence >= 0.0 && signal.confidence <= 95.0);
        assert!(signal.risk > 0.0);
    }
    assert_eq!(report.signal_summary.count, report.signals.len());
}

#[test]
fn test_aligned_days_give_full_predictive_accuracy() {
    let report = pipeline().run(aligned_days(10));

    assert_eq!(report.weekday_statistics.len(), 5);
    for stats in &report.weekday_statistics {
        assert_eq!(stats.days, 2);
        assert_eq!(stats.accuracy_target, AccuracyTarget::Afternoon);
        assert!((stats.predictive_accuracy - 100.0).abs() < 1e-9);
    }
    assert_eq!(report.flat_statistics.get("monday.predictive_accuracy"), Some(&100.0));
}

#[test]
fn test_opposed_afternoons_give_zero_accuracy() {
    let days: Vec<DayCandles> = trading_dates(5)
        .into_iter()
        .map(|date| synthetic_day(date, 1.0, -0.8))
        .collect();
    let report = pipeline().run(days);

    for stats in &report.weekday_statistics {
        assert_eq!(stats.predictive_accuracy, 0.0);
        assert_eq!(stats.bullish_mornings, 1);
    }
}

#[test]
fn test_small_batch_runs_degraded() {
    let report = pipeline().run(aligned_days(5));

    assert!(matches!(report.model, ModelStatus::Skipped(_)));
    assert!(report.predictions.is_empty());
    assert!(report.signals.iter().all(|s| s.degraded && s.model_prediction.is_none()));
    assert!(report.signals.iter().all(|s| !s.in_sample));
}

#[test]
fn test_signals_on_training_days_are_flagged_in_sample() {
    let report = pipeline().run(aligned_days(30));
    let ModelStatus::Trained { report: training, .. } = &report.model else {
        panic!("expected a trained model");
    };

    // the hold-out is the chronological tail
    let first_unseen = report.summaries[training.train_size].date;
    for signal in &report.signals {
        assert_eq!(signal.in_sample, signal.date < first_unseen);
    }
    assert_eq!(
        report.signal_summary.in_sample,
        report.signals.iter().filter(|s| s.in_sample).count()
    );
}

#[test]
fn test_bad_days_are_reported_not_fatal() {
    let mut days = aligned_days(20);
    days[3].candles.clear();
    days[7].candles[10].low = days[7].candles[10].high + 1.0;
    let date_seven = days[7].date;

    let report = pipeline().run(days);

    assert_eq!(report.summaries.len(), 18);
    assert_eq!(report.rejections.len(), 2);
    assert_eq!(report.rejections[0].reason, RejectionReason::Empty);
    assert_eq!(report.rejections[1].date, date_seven);
    assert!(matches!(
        report.rejections[1].reason,
        RejectionReason::LowAboveHigh { index: 10, .. }
    ));
}

#[test]
fn test_runs_are_deterministic() {
    let pipeline = pipeline();
    let first = pipeline.run(aligned_days(25));
    let second = pipeline.run(aligned_days(25));

    assert_eq!(first.summaries, second.summaries);
    assert_eq!(first.predictions, second.predictions);
    assert_eq!(first.signals, second.signals);
    assert_eq!(first.flat_statistics, second.flat_statistics);
}

#[test]
fn test_report_serializes() {
    let report = pipeline().run(aligned_days(20));
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["model"]["status"], "trained");
    assert_eq!(json["summaries"].as_array().unwrap().len(), 20);
    assert!(json["flat_statistics"]["monday.morning.percent_move.mean"].is_number());
}
