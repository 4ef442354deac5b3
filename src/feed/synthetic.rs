//! Simulated-data quote source backed by the local price generator

use super::{FeedError, Quote, QuoteSource};
use crate::clock::Clock;
use crate::model::PriceGenerator;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

/// Quote source that never fails: every fetch is a fresh synthetic quote
pub struct SyntheticQuoteSource {
    generator: Arc<PriceGenerator>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl SyntheticQuoteSource {
    pub fn new(generator: Arc<PriceGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(generator, clock, StdRng::from_os_rng())
    }

    /// Create a source whose randomness is reproducible from `seed`
    pub fn seeded(generator: Arc<PriceGenerator>, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(generator, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(generator: Arc<PriceGenerator>, clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        Self {
            generator,
            clock,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl QuoteSource for SyntheticQuoteSource {
    async fn fetch(&self, symbol: &str) -> Result<Quote, FeedError> {
        let now = self.clock.now();
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.generator.quote(symbol, now, &mut *rng))
    }
}
