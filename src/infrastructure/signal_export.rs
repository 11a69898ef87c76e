//! Tabular export of emitted signals.

use crate::domain::trading::{Outcome, Side, SignalRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One CSV line per signal; reasoning is joined into a single column
#[derive(Debug, Serialize)]
struct SignalRow<'a> {
    date: NaiveDate,
    weekday: String,
    rule: &'a str,
    side: Side,
    confidence: f64,
    entry: f64,
    stop_loss: f64,
    target: f64,
    risk: f64,
    reward: f64,
    risk_reward: f64,
    model_prediction: Option<f64>,
    morning_move: f64,
    morning_rsi: Option<f64>,
    actual_afternoon_move: f64,
    outcome: Outcome,
    degraded: bool,
    in_sample: bool,
    reasoning: String,
}

impl<'a> From<&'a SignalRecord> for SignalRow<'a> {
    fn from(s: &'a SignalRecord) -> Self {
        Self {
            date: s.date,
            weekday: s.weekday.to_string(),
            rule: &s.rule,
            side: s.side,
            confidence: s.confidence,
            entry: s.entry,
            stop_loss: s.stop_loss,
            target: s.target,
            risk: s.risk,
            reward: s.reward,
            risk_reward: s.risk_reward,
            model_prediction: s.model_prediction,
            morning_move: s.morning_move,
            morning_rsi: s.morning_rsi,
            actual_afternoon_move: s.actual_afternoon_move,
            outcome: s.outcome,
            degraded: s.degraded,
            in_sample: s.in_sample,
            reasoning: s.reasoning.join("; "),
        }
    }
}

pub fn write_signals<W: Write>(writer: W, signals: &[SignalRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);
    for signal in signals {
        wtr.serialize(SignalRow::from(signal))
            .with_context(|| format!("Failed to serialize signal for {}", signal.date))?;
    }
    wtr.flush().context("Failed to flush signal CSV")?;
    Ok(())
}

pub fn export_signals(path: &Path, signals: &[SignalRecord]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_signals(file, signals)?;
    info!(
        "SignalExport: Wrote {} signals to {}",
        signals.len(),
        path.display()
    );
    Ok(())
}
