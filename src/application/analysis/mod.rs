// Day summaries and multi-day statistics
pub mod aggregator;
pub mod patterns;
pub mod session_profile;
pub mod summarizer;

pub use aggregator::{StatisticalAggregator, WeekdayStatistics, flatten};
pub use patterns::SessionPatterns;
pub use summarizer::SessionSummarizer;
