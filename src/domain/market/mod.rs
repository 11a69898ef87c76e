// Market data domain
pub mod candle;
pub mod series;
pub mod session;
pub mod summary;
pub mod timeframe;

pub use candle::{Candle, DayCandles};
pub use series::IndicatorSeries;
pub use session::{Direction, SegmentedDay, SubSession, TradingDay};
pub use summary::{
    ClusterSummary, DaySummary, IndicatorSnapshot, SessionFeatureVector, SessionProfile,
    TrendPhase,
};
pub use timeframe::Timeframe;
