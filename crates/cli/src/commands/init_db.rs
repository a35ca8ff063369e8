//! Init-db command handler.

use clap::Args;
use kba_core::{config::AppConfig, AppResult};
use kba_knowledge::ArticleStore;

/// Create the schema and seed sample articles
#[derive(Args, Debug)]
pub struct InitDbCommand {
    /// Only apply the schema
    #[arg(long)]
    pub no_seed: bool,

    /// Seed for the sample-data generator (default: from config)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl InitDbCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = ArticleStore::open(&config.database)?;

        store.init_schema()?;
        println!("Schema applied to {}", config.database.display());

        if !self.no_seed {
            let seed = self.seed.unwrap_or(config.seed);
            let inserted = store.seed(seed)?;
            if inserted.articles == 0 {
                println!("Articles already present; nothing seeded");
            } else {
                println!("Seeded {} articles (seed {})", inserted.articles, seed);
            }
        }

        let stats = store.stats()?;
        println!(
            "{} authors, {} categories, {} tags, {} articles, {} article tags",
            stats.authors, stats.categories, stats.tags, stats.articles, stats.article_tags
        );

        Ok(())
    }
}
