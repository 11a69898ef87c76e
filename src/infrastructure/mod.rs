pub mod csv_loader;
pub mod repositories;
pub mod signal_export;

pub use repositories::InMemoryCandleStore;
