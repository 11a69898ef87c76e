// Signal records and their vocabulary
pub mod types;

pub use types::{DayRejection, Outcome, Side, SignalRecord};
