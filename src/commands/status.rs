use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::config::CrawlConfig;
use crate::index_store::IndexStore;

pub fn run(args: StatusArgs) -> Result<()> {
    let config = CrawlConfig::with_output_root(&args.output_root);
    info!(output_root = %args.output_root.display(), "status requested");

    if !config.index_path.exists() {
        warn!(path = %config.index_path.display(), "card index missing");
    }

    let summary = IndexStore::load(&config.index_path).summary();

    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("failed to serialize index summary")?;
        println!("{json}");
        return Ok(());
    }

    info!(
        path = %summary.index_path,
        total_cards = summary.total_cards,
        "index status"
    );
    for (rarity, count) in &summary.by_rarity {
        info!(rarity = %rarity, count, "cards by rarity");
    }
    for (card_type, count) in &summary.by_type {
        info!(card_type = %card_type, count, "cards by type");
    }

    Ok(())
}
