pub mod stats;

pub use stats::{DescriptiveStats, Stats};
