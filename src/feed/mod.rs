//! Quote feed module
//!
//! Realtime quotes from the REST endpoint, or from the local price generator
//! in simulated-data mode

mod rest;
mod synthetic;
mod types;

pub use rest::RestQuoteClient;
pub use synthetic::SyntheticQuoteSource;
pub use types::{FeedError, Quote};

use async_trait::async_trait;

/// Trait for quote source implementations
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for `symbol`
    async fn fetch(&self, symbol: &str) -> Result<Quote, FeedError>;
}
