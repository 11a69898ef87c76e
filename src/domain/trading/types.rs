use crate::domain::errors::RejectionReason;
use crate::domain::market::Direction;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Price direction that makes this side profitable
    pub fn favourable_direction(&self) -> Direction {
        match self {
            Side::Long => Direction::Up,
            Side::Short => Direction::Down,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    /// WIN when the realized afternoon move went the way of the side
    pub fn evaluate(side: Side, actual_move: f64) -> Self {
        if Direction::from_move(actual_move) == side.favourable_direction() {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// One emitted trade signal, flat enough for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub rule: String,
    pub side: Side,
    pub confidence: f64,
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk: f64,
    pub reward: f64,
    pub risk_reward: f64,
    pub model_prediction: Option<f64>,
    pub morning_move: f64,
    pub morning_rsi: Option<f64>,
    pub actual_afternoon_move: f64,
    pub outcome: Outcome,
    pub degraded: bool,
    /// The model producing `model_prediction` was fitted on this day
    pub in_sample: bool,
    pub reasoning: Vec<String>,
}

/// A day excluded by validation or segmentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRejection {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: RejectionReason,
}

fn serialize_reason<S>(reason: &RejectionReason, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(reason)
}
