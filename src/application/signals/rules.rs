use crate::config::SignalConfig;
use crate::domain::market::DaySummary;
use crate::domain::trading::Side;

/// Inputs a rule looks at for one day
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub day: &'a DaySummary,
    /// Model prediction, or the rule's proxy when running without a model
    pub prediction: f64,
    pub rsi: Option<f64>,
    pub above_vwap: Option<bool>,
}

impl<'a> RuleContext<'a> {
    pub fn new(day: &'a DaySummary, prediction: f64) -> Self {
        Self {
            day,
            prediction,
            rsi: day.morning.indicators.rsi,
            above_vwap: day.morning.above_vwap(),
        }
    }

    pub fn morning_move(&self) -> f64 {
        self.day.morning.percent_move
    }
}

/// What stands in for the model prediction when no model was trained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proxy {
    /// The afternoon continues the morning move
    Momentum,
    /// The afternoon retraces the morning move
    MeanReversion,
}

impl Proxy {
    pub fn estimate(&self, day: &DaySummary) -> f64 {
        match self {
            Proxy::Momentum => day.morning.percent_move,
            Proxy::MeanReversion => -day.morning.percent_move,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Proxy::Momentum => "morning move",
            Proxy::MeanReversion => "inverted morning move",
        }
    }
}

type Predicate = fn(&RuleContext<'_>, &SignalConfig) -> Option<Vec<String>>;
type Confidence = fn(&RuleContext<'_>, &SignalConfig) -> (f64, Vec<String>);

/// One row of the signal rule table.
///
/// `predicate` returns the conditions that fired when the rule matches;
/// `confidence` returns the uncapped score and the bonuses that applied.
/// Without a model, `proxy` supplies the prediction: trend rules follow the
/// morning move and reversal rules bet against it, so both stay reachable.
#[derive(Clone)]
pub struct SignalRule {
    pub name: &'static str,
    pub side: Side,
    pub target_multiple: f64,
    pub confidence_cap: f64,
    pub proxy: Proxy,
    predicate: Predicate,
    confidence: Confidence,
}

impl SignalRule {
    pub fn matches(&self, ctx: &RuleContext<'_>, config: &SignalConfig) -> Option<Vec<String>> {
        (self.predicate)(ctx, config)
    }

    /// Confidence capped at this rule's ceiling, plus the reasons for it
    pub fn confidence(&self, ctx: &RuleContext<'_>, config: &SignalConfig) -> (f64, Vec<String>) {
        let (score, reasons) = (self.confidence)(ctx, config);
        (score.min(self.confidence_cap), reasons)
    }
}

impl std::fmt::Debug for SignalRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRule")
            .field("name", &self.name)
            .field("side", &self.side)
            .field("target_multiple", &self.target_multiple)
            .field("confidence_cap", &self.confidence_cap)
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// The rule table in priority order; the first match wins
pub fn default_rules(config: &SignalConfig) -> Vec<SignalRule> {
    vec![
        SignalRule {
            name: "trend_long",
            side: Side::Long,
            target_multiple: config.trend_target_multiple,
            confidence_cap: config.trend_confidence_cap,
            proxy: Proxy::Momentum,
            predicate: trend_long,
            confidence: trend_long_confidence,
        },
        SignalRule {
            name: "trend_short",
            side: Side::Short,
            target_multiple: config.trend_target_multiple,
            confidence_cap: config.trend_confidence_cap,
            proxy: Proxy::Momentum,
            predicate: trend_short,
            confidence: trend_short_confidence,
        },
        SignalRule {
            name: "reversal_long",
            side: Side::Long,
            target_multiple: config.reversal_target_multiple,
            confidence_cap: config.reversal_confidence_cap,
            proxy: Proxy::MeanReversion,
            predicate: reversal_long,
            confidence: reversal_long_confidence,
        },
        SignalRule {
            name: "reversal_short",
            side: Side::Short,
            target_multiple: config.reversal_target_multiple,
            confidence_cap: config.reversal_confidence_cap,
            proxy: Proxy::MeanReversion,
            predicate: reversal_short,
            confidence: reversal_short_confidence,
        },
    ]
}

fn prediction_bonus(prediction: f64, config: &SignalConfig) -> f64 {
    (prediction.abs() * config.prediction_scale).min(config.max_prediction_bonus)
}

fn trend_long(ctx: &RuleContext<'_>, config: &SignalConfig) -> Option<Vec<String>> {
    if ctx.prediction > config.trend_threshold
        && ctx.day.morning.is_bullish()
        && ctx.above_vwap == Some(true)
    {
        Some(vec![
            format!(
                "prediction {:+.3} above +{}",
                ctx.prediction, config.trend_threshold
            ),
            format!("morning bullish ({:+.2}%)", ctx.morning_move()),
            "morning close above VWAP".to_string(),
        ])
    } else {
        None
    }
}

fn trend_short(ctx: &RuleContext<'_>, config: &SignalConfig) -> Option<Vec<String>> {
    if ctx.prediction < -config.trend_threshold
        && ctx.day.morning.is_bearish()
        && ctx.above_vwap == Some(false)
    {
        Some(vec![
            format!(
                "prediction {:+.3} below -{}",
                ctx.prediction, config.trend_threshold
            ),
            format!("morning bearish ({:+.2}%)", ctx.morning_move()),
            "morning close below VWAP".to_string(),
        ])
    } else {
        None
    }
}

fn reversal_long(ctx: &RuleContext<'_>, config: &SignalConfig) -> Option<Vec<String>> {
    let rsi = ctx.rsi?;
    if ctx.prediction > config.reversal_threshold
        && ctx.morning_move() < -config.strong_move
        && rsi < config.reversal_rsi_long_max
    {
        Some(vec![
            format!(
                "prediction {:+.3} above +{}",
                ctx.prediction, config.reversal_threshold
            ),
            format!("strong morning sell-off ({:+.2}%)", ctx.morning_move()),
            format!("RSI {:.1} below {}", rsi, config.reversal_rsi_long_max),
        ])
    } else {
        None
    }
}

fn reversal_short(ctx: &RuleContext<'_>, config: &SignalConfig) -> Option<Vec<String>> {
    let rsi = ctx.rsi?;
    if ctx.prediction < -config.reversal_threshold
        && ctx.morning_move() > config.strong_move
        && rsi > config.reversal_rsi_short_min
    {
        Some(vec![
            format!(
                "prediction {:+.3} below -{}",
                ctx.prediction, config.reversal_threshold
            ),
            format!("strong morning rally ({:+.2}%)", ctx.morning_move()),
            format!("RSI {:.1} above {}", rsi, config.reversal_rsi_short_min),
        ])
    } else {
        None
    }
}

fn trend_long_confidence(ctx: &RuleContext<'_>, config: &SignalConfig) -> (f64, Vec<String>) {
    let mut score = config.trend_base_confidence + prediction_bonus(ctx.prediction, config);
    let mut reasons = Vec::new();
    if let Some(rsi) = ctx.rsi.filter(|rsi| *rsi < config.rsi_overbought) {
        score += config.rsi_bonus;
        reasons.push(format!("RSI {:.1} not overbought", rsi));
    }
    if ctx.above_vwap == Some(true) {
        score += config.vwap_bonus;
        reasons.push("VWAP confluence".to_string());
    }
    (score, reasons)
}

fn trend_short_confidence(ctx: &RuleContext<'_>, config: &SignalConfig) -> (f64, Vec<String>) {
    let mut score = config.trend_base_confidence + prediction_bonus(ctx.prediction, config);
    let mut reasons = Vec::new();
    if let Some(rsi) = ctx.rsi.filter(|rsi| *rsi > config.rsi_oversold) {
        score += config.rsi_bonus;
        reasons.push(format!("RSI {:.1} not oversold", rsi));
    }
    if ctx.above_vwap == Some(false) {
        score += config.vwap_bonus;
        reasons.push("VWAP confluence".to_string());
    }
    (score, reasons)
}

fn reversal_long_confidence(ctx: &RuleContext<'_>, config: &SignalConfig) -> (f64, Vec<String>) {
    let mut score = config.reversal_base_confidence + prediction_bonus(ctx.prediction, config);
    let mut reasons = Vec::new();
    if let Some(rsi) = ctx.rsi.filter(|rsi| *rsi < config.rsi_oversold) {
        score += config.extreme_rsi_bonus;
        reasons.push(format!("RSI {:.1} oversold", rsi));
    }
    (score, reasons)
}

fn reversal_short_confidence(ctx: &RuleContext<'_>, config: &SignalConfig) -> (f64, Vec<String>) {
    let mut score = config.reversal_base_confidence + prediction_bonus(ctx.prediction, config);
    let mut reasons = Vec::new();
    if let Some(rsi) = ctx.rsi.filter(|rsi| *rsi > config.rsi_overbought) {
        score += config.extreme_rsi_bonus;
        reasons.push(format!("RSI {:.1} overbought", rsi));
    }
    (score, reasons)
}
