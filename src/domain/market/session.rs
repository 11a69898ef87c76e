use super::candle::Candle;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Sign of a percent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn from_move(percent_move: f64) -> Self {
        if percent_move > 0.0 {
            Direction::Up
        } else if percent_move < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
            Direction::Flat => write!(f, "FLAT"),
        }
    }
}

/// Validated candles of one calendar date.
///
/// Only `DayValidator` builds these, so the candles are always sorted
/// strictly ascending and share the same date.
#[derive(Debug, Clone)]
pub struct TradingDay {
    date: NaiveDate,
    weekday: Weekday,
    candles: Vec<Candle>,
}

impl TradingDay {
    pub(crate) fn from_validated(date: NaiveDate, candles: Vec<Candle>) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            candles,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }
}

/// A named slice of a trading day, stored as a range into the day's candles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSession {
    pub name: String,
    pub range: Range<usize>,
}

impl SubSession {
    /// Index of the last candle inside the full-day series
    pub fn last_index(&self) -> usize {
        self.range.end - 1
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A trading day partitioned into its configured sub-sessions.
#[derive(Debug, Clone)]
pub struct SegmentedDay {
    day: TradingDay,
    sub_sessions: Vec<SubSession>,
}

impl SegmentedDay {
    pub(crate) fn new(day: TradingDay, mut sub_sessions: Vec<SubSession>) -> Self {
        sub_sessions.sort_by_key(|s| s.range.start);
        Self { day, sub_sessions }
    }

    pub fn day(&self) -> &TradingDay {
        &self.day
    }

    /// Sub-sessions in chronological order
    pub fn sub_sessions(&self) -> &[SubSession] {
        &self.sub_sessions
    }

    pub fn get(&self, name: &str) -> Option<&SubSession> {
        self.sub_sessions.iter().find(|s| s.name == name)
    }

    pub fn candles_of(&self, sub_session: &SubSession) -> &[Candle] {
        &self.day.candles()[sub_session.range.clone()]
    }

    /// Number of day candles that fell outside every configured window
    pub fn dropped_candles(&self) -> usize {
        let kept: usize = self.sub_sessions.iter().map(SubSession::len).sum();
        self.day.candles().len() - kept
    }
}
