use crate::config::AccuracyTarget;
use crate::domain::market::{DaySummary, Direction, SessionFeatureVector};
use crate::domain::performance::{DescriptiveStats, Stats};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Weekdays in reporting order
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Statistics of the three movement fields of one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub percent_move: Option<DescriptiveStats>,
    pub range: Option<DescriptiveStats>,
    pub volume: Option<DescriptiveStats>,
}

impl SessionStatistics {
    fn from_fields(moves: Vec<f64>, ranges: Vec<f64>, volumes: Vec<f64>) -> Self {
        Self {
            percent_move: DescriptiveStats::from_values(&moves),
            range: DescriptiveStats::from_values(&ranges),
            volume: DescriptiveStats::from_values(&volumes),
        }
    }

    fn entries(&self) -> [(&'static str, Option<&DescriptiveStats>); 3] {
        [
            ("percent_move", self.percent_move.as_ref()),
            ("range", self.range.as_ref()),
            ("volume", self.volume.as_ref()),
        ]
    }
}

/// Everything learned about one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStatistics {
    pub weekday: Weekday,
    pub days: usize,
    pub morning: SessionStatistics,
    pub afternoon: SessionStatistics,
    pub full_day: SessionStatistics,
    pub morning_rsi: Option<DescriptiveStats>,
    pub morning_max_drawdown: Option<DescriptiveStats>,
    pub morning_max_run_up: Option<DescriptiveStats>,
    pub accuracy_target: AccuracyTarget,
    pub aligned_days: usize,
    /// Percentage of days whose morning direction matched the target session
    pub predictive_accuracy: f64,
    pub bullish_mornings: usize,
    pub bearish_mornings: usize,
    /// Mean afternoon move following a bullish morning
    pub afternoon_after_bullish: Option<f64>,
    /// Mean afternoon move following a bearish morning
    pub afternoon_after_bearish: Option<f64>,
}

/// Groups day summaries by weekday and describes each group.
#[derive(Debug, Clone)]
pub struct StatisticalAggregator {
    target: AccuracyTarget,
}

impl StatisticalAggregator {
    pub fn new(target: AccuracyTarget) -> Self {
        Self { target }
    }

    /// Statistics for every weekday that has at least one day, Monday first
    pub fn aggregate(&self, days: &[DaySummary]) -> Vec<WeekdayStatistics> {
        let stats: Vec<WeekdayStatistics> = WEEKDAYS
            .iter()
            .filter_map(|&weekday| {
                let group: Vec<&DaySummary> =
                    days.iter().filter(|d| d.weekday == weekday).collect();
                (!group.is_empty()).then(|| self.describe(weekday, &group))
            })
            .collect();

        info!(
            "StatisticalAggregator: Aggregated {} days into {} weekday groups (target: {})",
            days.len(),
            stats.len(),
            self.target
        );
        stats
    }

    fn describe(&self, weekday: Weekday, group: &[&DaySummary]) -> WeekdayStatistics {
        let session = |select: fn(&DaySummary) -> &SessionFeatureVector| {
            SessionStatistics::from_fields(
                group.iter().map(|d| select(d).percent_move).collect(),
                group.iter().map(|d| select(d).range).collect(),
                group.iter().map(|d| select(d).volume).collect(),
            )
        };

        let aligned_days = group
            .iter()
            .filter(|d| {
                let target = match self.target {
                    AccuracyTarget::Afternoon => &d.afternoon,
                    AccuracyTarget::FullDay => &d.full_day,
                };
                d.morning.is_direction_aligned(target)
            })
            .count();

        let after = |direction: Direction| -> Vec<f64> {
            group
                .iter()
                .filter(|d| d.morning_direction() == direction)
                .map(|d| d.afternoon.percent_move)
                .collect()
        };
        let after_bullish = after(Direction::Up);
        let after_bearish = after(Direction::Down);

        WeekdayStatistics {
            weekday,
            days: group.len(),
            morning: session(|d| &d.morning),
            afternoon: session(|d| &d.afternoon),
            full_day: session(|d| &d.full_day),
            morning_rsi: DescriptiveStats::from_samples(
                group.iter().map(|d| d.morning.indicators.rsi),
            ),
            morning_max_drawdown: DescriptiveStats::from_values(
                &group
                    .iter()
                    .map(|d| d.morning_profile.max_drawdown)
                    .collect::<Vec<_>>(),
            ),
            morning_max_run_up: DescriptiveStats::from_values(
                &group
                    .iter()
                    .map(|d| d.morning_profile.max_run_up)
                    .collect::<Vec<_>>(),
            ),
            accuracy_target: self.target,
            aligned_days,
            predictive_accuracy: aligned_days as f64 / group.len() as f64 * 100.0,
            bullish_mornings: after_bullish.len(),
            bearish_mornings: after_bearish.len(),
            afternoon_after_bullish: (!after_bullish.is_empty())
                .then(|| Stats::mean(&after_bullish)),
            afternoon_after_bearish: (!after_bearish.is_empty())
                .then(|| Stats::mean(&after_bearish)),
        }
    }
}

/// Flattens weekday statistics into `weekday.session.field.stat` keys
pub fn flatten(stats: &[WeekdayStatistics]) -> BTreeMap<String, f64> {
    let mut flat = BTreeMap::new();

    for day in stats {
        let prefix = weekday_name(day.weekday);
        flat.insert(format!("{}.days", prefix), day.days as f64);
        flat.insert(format!("{}.aligned_days", prefix), day.aligned_days as f64);
        flat.insert(
            format!("{}.predictive_accuracy", prefix),
            day.predictive_accuracy,
        );
        flat.insert(
            format!("{}.bullish_mornings", prefix),
            day.bullish_mornings as f64,
        );
        flat.insert(
            format!("{}.bearish_mornings", prefix),
            day.bearish_mornings as f64,
        );
        if let Some(mean) = day.afternoon_after_bullish {
            flat.insert(format!("{}.afternoon_after_bullish.mean", prefix), mean);
        }
        if let Some(mean) = day.afternoon_after_bearish {
            flat.insert(format!("{}.afternoon_after_bearish.mean", prefix), mean);
        }

        for (session, values) in [
            ("morning", &day.morning),
            ("afternoon", &day.afternoon),
            ("full_day", &day.full_day),
        ] {
            for (field, stats) in values.entries() {
                if let Some(stats) = stats {
                    insert_stats(&mut flat, &format!("{}.{}.{}", prefix, session, field), stats);
                }
            }
        }

        for (field, stats) in [
            ("rsi", &day.morning_rsi),
            ("max_drawdown", &day.morning_max_drawdown),
            ("max_run_up", &day.morning_max_run_up),
        ] {
            if let Some(stats) = stats {
                insert_stats(&mut flat, &format!("{}.morning.{}", prefix, field), stats);
            }
        }
    }

    flat
}

fn insert_stats(flat: &mut BTreeMap<String, f64>, key: &str, stats: &DescriptiveStats) {
    for (name, value) in stats.entries() {
        flat.insert(format!("{}.{}", key, name), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{IndicatorSnapshot, SessionProfile};
    use chrono::{Datelike, Duration, NaiveDate};

    fn vector(name: &str, percent_move: f64) -> SessionFeatureVector {
        SessionFeatureVector {
            name: name.to_string(),
            open: 100.0,
            close: 100.0 * (1.0 + percent_move / 100.0),
            high: 101.0,
            low: 99.0,
            range: 2.0,
            percent_move,
            volume: 1000.0,
            volume_share: 0.5,
            candle_count: 24,
            indicators: IndicatorSnapshot::default(),
        }
    }

    fn summary(date: NaiveDate, morning: f64, afternoon: f64) -> DaySummary {
        DaySummary {
            date,
            weekday: date.weekday(),
            morning: vector("morning", morning),
            afternoon: vector("afternoon", afternoon),
            full_day: vector("full_day", morning + afternoon),
            morning_profile: SessionProfile::default(),
        }
    }

    fn mondays(n: usize) -> Vec<NaiveDate> {
        let first = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        (0..n).map(|i| first + Duration::weeks(i as i64)).collect()
    }

    #[test]
    fn test_aligned_days_give_full_accuracy() {
        let days: Vec<DaySummary> = mondays(10)
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let m = if i % 2 == 0 { 0.4 } else { -0.3 };
                summary(date, m, m * 0.5)
            })
            .collect();

        let stats = StatisticalAggregator::new(AccuracyTarget::Afternoon).aggregate(&days);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].weekday, Weekday::Mon);
        assert_eq!(stats[0].aligned_days, 10);
        assert_eq!(stats[0].predictive_accuracy, 100.0);
        assert_eq!(stats[0].bullish_mornings, 5);
        assert!((stats[0].afternoon_after_bullish.unwrap() - 0.2).abs() < 1e-12);
        assert!((stats[0].afternoon_after_bearish.unwrap() + 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_flat_day_only_aligns_with_flat() {
        let dates = mondays(2);
        let days = vec![summary(dates[0], 0.0, 0.0), summary(dates[1], 0.0, 0.2)];
        let stats = StatisticalAggregator::new(AccuracyTarget::Afternoon).aggregate(&days);
        assert_eq!(stats[0].aligned_days, 1);
        assert_eq!(stats[0].predictive_accuracy, 50.0);
    }

    #[test]
    fn test_full_day_target() {
        let dates = mondays(2);
        // afternoon reverses, but not enough to flip the full day
        let days = vec![summary(dates[0], 1.0, -0.4), summary(dates[1], -1.0, 0.4)];
        let afternoon = StatisticalAggregator::new(AccuracyTarget::Afternoon).aggregate(&days);
        let full_day = StatisticalAggregator::new(AccuracyTarget::FullDay).aggregate(&days);
        assert_eq!(afternoon[0].predictive_accuracy, 0.0);
        assert_eq!(full_day[0].predictive_accuracy, 100.0);
    }

    #[test]
    fn test_groups_ordered_monday_first() {
        let friday = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let days = vec![
            summary(friday, 0.1, 0.1),
            summary(tuesday, 0.1, 0.1),
            summary(monday, 0.1, 0.1),
        ];
        let stats = StatisticalAggregator::new(AccuracyTarget::Afternoon).aggregate(&days);
        let order: Vec<Weekday> = stats.iter().map(|s| s.weekday).collect();
        assert_eq!(order, vec![Weekday::Mon, Weekday::Tue, Weekday::Fri]);
    }

    #[test]
    fn test_flatten_keys() {
        let days: Vec<DaySummary> = mondays(4)
            .into_iter()
            .map(|date| summary(date, 0.5, 0.25))
            .collect();
        let stats = StatisticalAggregator::new(AccuracyTarget::Afternoon).aggregate(&days);
        let flat = flatten(&stats);

        assert_eq!(flat["monday.morning.percent_move.mean"], 0.5);
        assert_eq!(flat["monday.afternoon.percent_move.count"], 4.0);
        assert_eq!(flat["monday.predictive_accuracy"], 100.0);
        // RSI was never defined, so no statistics are reported for it
        assert!(!flat.contains_key("monday.morning.rsi.mean"));
        assert!(flat.contains_key("monday.morning.max_drawdown.p75"));
    }
}
