// Candles, trading days and session summaries
pub mod market;

// Model feature layout
pub mod ml;

// Descriptive statistics
pub mod performance;

// Port interfaces
pub mod ports;

// Signal records
pub mod trading;

// Day-level data integrity
pub mod validation;

// Domain-specific error types
pub mod errors;
