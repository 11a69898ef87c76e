use super::rules::{RuleContext, SignalRule, default_rules};
use crate::config::SignalConfig;
use crate::domain::errors::ConfigError;
use crate::domain::market::DaySummary;
use crate::domain::performance::Stats;
use crate::domain::trading::{Outcome, Side, SignalRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

const MIN_RISK: f64 = 1e-9;

/// Turns day summaries plus model predictions into trade signals.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    config: SignalConfig,
    rules: Vec<SignalRule>,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = default_rules(&config);
        Ok(Self { config, rules })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Rule table in evaluation order
    pub fn rules(&self) -> &[SignalRule] {
        &self.rules
    }

    /// Evaluates one day. Without a prediction each rule reads its own proxy
    /// and the signal is marked degraded.
    pub fn generate(&self, day: &DaySummary, prediction: Option<f64>) -> Option<SignalRecord> {
        let degraded = prediction.is_none();
        let (rule, ctx, conditions) = self.rules.iter().find_map(|rule| {
            let driver = prediction.unwrap_or_else(|| rule.proxy.estimate(day));
            let ctx = RuleContext::new(day, driver);
            rule.matches(&ctx, &self.config).map(|c| (rule, ctx, c))
        })?;

        let entry = day.morning.close;
        let stop_loss = match rule.side {
            Side::Long => day.morning.low,
            Side::Short => day.morning.high,
        };
        // The stop has to sit on the losing side of the entry
        let risk = match rule.side {
            Side::Long => entry - stop_loss,
            Side::Short => stop_loss - entry,
        };
        if risk < MIN_RISK {
            debug!(
                "SignalGenerator: {} {} stop {:.4} not beyond entry {:.4}, no signal",
                day.date, rule.name, stop_loss, entry
            );
            return None;
        }

        let target = match rule.side {
            Side::Long => entry + risk * rule.target_multiple,
            Side::Short => entry - risk * rule.target_multiple,
        };
        let reward = (target - entry).abs();

        let (mut confidence, bonuses) = rule.confidence(&ctx, &self.config);
        let mut reasoning = conditions;
        reasoning.extend(bonuses);
        if degraded {
            confidence = (confidence - self.config.degraded_penalty).max(0.0);
            reasoning.push(format!(
                "no model prediction, {} used as proxy (-{} confidence)",
                rule.proxy.label(),
                self.config.degraded_penalty
            ));
        }

        let actual = day.afternoon.percent_move;
        let outcome = Outcome::evaluate(rule.side, actual);

        debug!(
            "SignalGenerator: {} {} {} conf {:.1} -> {}",
            day.date, rule.name, rule.side, confidence, outcome
        );

        Some(SignalRecord {
            date: day.date,
            weekday: day.weekday,
            rule: rule.name.to_string(),
            side: rule.side,
            confidence,
            entry,
            stop_loss,
            target,
            risk,
            reward,
            risk_reward: reward / risk,
            model_prediction: prediction,
            morning_move: day.morning.percent_move,
            morning_rsi: day.morning.indicators.rsi,
            actual_afternoon_move: actual,
            outcome,
            degraded,
            in_sample: false,
            reasoning,
        })
    }

    /// Signals for every day, in the order the days are given
    pub fn generate_all(
        &self,
        days: &[DaySummary],
        predictions: &BTreeMap<NaiveDate, f64>,
    ) -> Vec<SignalRecord> {
        let signals: Vec<SignalRecord> = days
            .iter()
            .filter_map(|day| self.generate(day, predictions.get(&day.date).copied()))
            .collect();

        info!(
            "SignalGenerator: {} signals from {} days ({} with model predictions)",
            signals.len(),
            days.len(),
            signals.iter().filter(|s| !s.degraded).count()
        );
        signals
    }
}

/// Aggregate view over emitted signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage of winning signals
    pub win_rate: f64,
    pub mean_confidence: f64,
    pub mean_risk_reward: f64,
    pub degraded: usize,
    /// Signals on days the model was fitted on
    pub in_sample: usize,
    /// Win rate (%) over the signals on days the model never saw
    pub out_of_sample_win_rate: Option<f64>,
    pub by_rule: BTreeMap<String, usize>,
}

impl SignalSummary {
    pub fn from_signals(signals: &[SignalRecord]) -> Self {
        if signals.is_empty() {
            return Self::default();
        }

        let wins = signals
            .iter()
            .filter(|s| s.outcome == Outcome::Win)
            .count();
        let confidences: Vec<f64> = signals.iter().map(|s| s.confidence).collect();
        let risk_rewards: Vec<f64> = signals.iter().map(|s| s.risk_reward).collect();

        let unseen: Vec<&SignalRecord> = signals.iter().filter(|s| !s.in_sample).collect();
        let out_of_sample_win_rate = (!unseen.is_empty()).then(|| {
            let unseen_wins = unseen.iter().filter(|s| s.outcome == Outcome::Win).count();
            unseen_wins as f64 / unseen.len() as f64 * 100.0
        });

        let mut by_rule = BTreeMap::new();
        for signal in signals {
            *by_rule.entry(signal.rule.clone()).or_insert(0) += 1;
        }

        Self {
            count: signals.len(),
            wins,
            losses: signals.len() - wins,
            win_rate: wins as f64 / signals.len() as f64 * 100.0,
            mean_confidence: Stats::mean(&confidences),
            mean_risk_reward: Stats::mean(&risk_rewards),
            degraded: signals.iter().filter(|s| s.degraded).count(),
            in_sample: signals.len() - unseen.len(),
            out_of_sample_win_rate,
            by_rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{IndicatorSnapshot, SessionFeatureVector, SessionProfile};
    use chrono::Datelike;

    fn session(
        name: &str,
        open: f64,
        close: f64,
        low: f64,
        high: f64,
        rsi: Option<f64>,
        vwap: Option<f64>,
    ) -> SessionFeatureVector {
        SessionFeatureVector {
            name: name.to_string(),
            open,
            close,
            high,
            low,
            range: high - low,
            percent_move: (close - open) / open * 100.0,
            volume: 1000.0,
            volume_share: 0.5,
            candle_count: 24,
            indicators: IndicatorSnapshot {
                rsi,
                vwap,
                ..Default::default()
            },
        }
    }

    fn day(morning: SessionFeatureVector, afternoon_close: f64) -> DaySummary {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let afternoon = session(
            "afternoon",
            morning.close,
            afternoon_close,
            morning.close.min(afternoon_close) - 0.5,
            morning.close.max(afternoon_close) + 0.5,
            None,
            None,
        );
        DaySummary {
            date,
            weekday: date.weekday(),
            full_day: morning.clone(),
            morning,
            afternoon,
            morning_profile: SessionProfile::default(),
        }
    }

    fn bullish_day() -> DaySummary {
        day(
            session("morning", 100.0, 102.0, 99.5, 102.5, Some(45.0), Some(101.0)),
            103.0,
        )
    }

    fn generator() -> SignalGenerator {
        SignalGenerator::new(SignalConfig::default()).unwrap()
    }

    #[test]
    fn test_trend_long_end_to_end() {
        let signal = generator().generate(&bullish_day(), Some(0.3)).unwrap();

        assert_eq!(signal.rule, "trend_long");
        assert_eq!(signal.side, Side::Long);
        assert!(signal.confidence >= 70.0);
        // 50 + 0.3 * 20 + 10 (RSI) + 10 (VWAP)
        assert!((signal.confidence - 76.0).abs() < 1e-9);
        assert_eq!(signal.entry, 102.0);
        assert_eq!(signal.stop_loss, 99.5);
        assert!((signal.target - (102.0 + 3.0 * 2.5)).abs() < 1e-9);
        assert!((signal.risk_reward - 3.0).abs() < 1e-9);
        assert_eq!(signal.outcome, Outcome::Win);
        assert!(!signal.degraded);
        assert_eq!(signal.model_prediction, Some(0.3));
        assert!(signal.reasoning.iter().any(|r| r.contains("VWAP")));
    }

    #[test]
    fn test_trend_confidence_is_capped() {
        let config = SignalConfig {
            trend_base_confidence: 90.0,
            ..Default::default()
        };
        let generator = SignalGenerator::new(config).unwrap();
        let signal = generator.generate(&bullish_day(), Some(5.0)).unwrap();
        assert_eq!(signal.confidence, 95.0);
    }

    #[test]
    fn test_trend_short_below_vwap() {
        let summary = day(
            session("morning", 100.0, 98.0, 97.5, 100.5, Some(55.0), Some(99.0)),
            99.0,
        );
        let signal = generator().generate(&summary, Some(-0.4)).unwrap();

        assert_eq!(signal.rule, "trend_short");
        assert_eq!(signal.side, Side::Short);
        assert_eq!(signal.stop_loss, 100.5);
        assert!((signal.target - (98.0 - 3.0 * 2.5)).abs() < 1e-9);
        // Afternoon went up, so the short lost
        assert_eq!(signal.outcome, Outcome::Loss);
    }

    #[test]
    fn test_reversal_long_after_sell_off() {
        let summary = day(
            session("morning", 100.0, 99.0, 98.8, 100.2, Some(25.0), Some(99.5)),
            99.8,
        );
        let signal = generator().generate(&summary, Some(0.5)).unwrap();

        assert_eq!(signal.rule, "reversal_long");
        // 40 + 10 (prediction) + 10 (extreme RSI)
        assert!((signal.confidence - 60.0).abs() < 1e-9);
        assert!((signal.target - (99.0 + 2.5 * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_reversal_requires_rsi() {
        let summary = day(
            session("morning", 100.0, 99.0, 98.8, 100.2, None, Some(99.5)),
            99.8,
        );
        assert!(generator().generate(&summary, Some(0.5)).is_none());
    }

    #[test]
    fn test_no_rule_matches() {
        assert!(generator().generate(&bullish_day(), Some(0.05)).is_none());
    }

    #[test]
    fn test_zero_risk_emits_nothing() {
        let summary = day(
            session("morning", 100.0, 102.0, 102.0, 102.0, Some(45.0), Some(101.0)),
            103.0,
        );
        assert!(generator().generate(&summary, Some(0.3)).is_none());
    }

    #[test]
    fn test_degraded_mode_uses_morning_move() {
        let signal = generator().generate(&bullish_day(), None).unwrap();

        assert!(signal.degraded);
        assert_eq!(signal.model_prediction, None);
        assert_eq!(signal.rule, "trend_long");
        // Proxy is the 2% morning move: 50 + 20 (capped) + 10 + 10 - 15
        assert!((signal.confidence - 75.0).abs() < 1e-9);
        assert!(signal.reasoning.iter().any(|r| r.contains("proxy")));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let days: Vec<DaySummary> = (0..5).map(|_| bullish_day()).collect();
        let predictions = BTreeMap::from([(days[0].date, 0.3)]);
        let generator = generator();

        let first = generator.generate_all(&days, &predictions);
        let second = generator.generate_all(&days, &predictions);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_summary_counts() {
        let generator = generator();
        let winner = generator.generate(&bullish_day(), Some(0.3)).unwrap();
        let loser = generator
            .generate(&day(bullish_day().morning, 101.0), None)
            .unwrap();

        let summary = SignalSummary::from_signals(&[winner, loser]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 1);
        assert!((summary.win_rate - 50.0).abs() < 1e-9);
        assert!((summary.mean_confidence - 75.5).abs() < 1e-9);
        assert_eq!(summary.degraded, 1);
        assert_eq!(summary.by_rule.get("trend_long"), Some(&2));
        assert_eq!(summary.in_sample, 0);
        assert_eq!(summary.out_of_sample_win_rate, Some(50.0));

        assert_eq!(SignalSummary::from_signals(&[]), SignalSummary::default());
    }

    #[test]
    fn test_summary_separates_in_sample_signals() {
        let generator = generator();
        let mut seen = generator.generate(&bullish_day(), Some(0.3)).unwrap();
        seen.in_sample = true;
        let unseen = generator
            .generate(&day(bullish_day().morning, 101.0), Some(0.3))
            .unwrap();

        let summary = SignalSummary::from_signals(&[seen.clone(), unseen]);
        assert_eq!(summary.in_sample, 1);
        assert!((summary.win_rate - 50.0).abs() < 1e-9);
        assert_eq!(summary.out_of_sample_win_rate, Some(0.0));

        let only_seen = SignalSummary::from_signals(&[seen]);
        assert_eq!(only_seen.out_of_sample_win_rate, None);
    }

    #[test]
    fn test_reversal_reachable_without_model() {
        // close sits above VWAP, so trend_short does not claim the sell-off
        let summary = day(
            session("morning", 100.0, 99.0, 98.8, 100.2, Some(25.0), Some(98.9)),
            99.8,
        );
        let signal = generator().generate(&summary, None).unwrap();

        assert_eq!(signal.rule, "reversal_long");
        assert!(signal.degraded);
        // 40 + 20 (inverted 1% move, capped) + 10 (extreme RSI) - 15
        assert!((signal.confidence - 55.0).abs() < 1e-9);
        assert!(signal.reasoning.iter().any(|r| r.contains("inverted morning move")));
    }

    #[test]
    fn test_stop_on_wrong_side_emits_nothing() {
        // morning close below its own low
        let summary = day(
            session("morning", 100.0, 102.0, 102.5, 103.0, Some(45.0), Some(101.0)),
            103.0,
        );
        assert!(generator().generate(&summary, Some(0.3)).is_none());
    }
}
