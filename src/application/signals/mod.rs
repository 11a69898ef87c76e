// Rule-based trade signals on top of model predictions
pub mod generator;
pub mod rules;

pub use generator::{SignalGenerator, SignalSummary};
pub use rules::{Proxy, RuleContext, SignalRule, default_rules};
