//! Quote command implementation

use crate::config::Config;
use crate::model::PriceGenerator;
use chrono::Utc;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Symbol to quote
    pub symbol: String,
}

impl QuoteArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let generator = PriceGenerator::new(config.generator.clone());
        let mut rng = match config.polling.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let symbol = self.symbol.trim().to_uppercase();
        let quote = generator.quote(&symbol, Utc::now(), &mut rng);
        println!("{}", serde_json::to_string_pretty(&quote)?);
        Ok(())
    }
}
