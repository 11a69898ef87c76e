// Per-day summaries and weekday statistics
pub mod analysis;

// Candle loading, segmentation and indicators
pub mod market_data;

// Afternoon move regression
pub mod ml;

// Batch orchestration
pub mod pipeline;

// Trade signals
pub mod signals;

pub use pipeline::{AnalysisReport, ModelStatus, SessionAnalysisPipeline};
