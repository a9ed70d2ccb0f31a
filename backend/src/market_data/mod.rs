pub mod bar;
pub mod source;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Series`).
pub use bar::{Bar, CandidateBar, CandidateSeries, Series};
pub use source::{BarRequest, MarketDataSource};
