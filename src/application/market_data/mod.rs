// Market data processing modules
pub mod day_loader;
pub mod indicators;
pub mod segmenter;

pub use day_loader::{collect_all_days, collect_days};
pub use indicators::{DayIndicators, IndicatorEngine};
pub use segmenter::SessionSegmenter;
