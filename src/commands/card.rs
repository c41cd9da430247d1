use anyhow::{Result, bail};
use tracing::info;

use crate::cli::CardArgs;
use crate::commands::crawl::{build_frontier, log_summary};
use crate::config::CrawlConfig;
use crate::extract::character_id_from_url;

pub fn run(args: CardArgs) -> Result<()> {
    let Some(character_id) = character_id_from_url(&args.url) else {
        bail!("not a card url (expected /cards/<id>): {}", args.url);
    };

    let config = CrawlConfig::from_card_args(&args);
    info!(
        url = %args.url,
        character_id = %character_id,
        follow_related = config.follow_related,
        "single card requested"
    );

    let mut frontier = build_frontier(config)?;
    let summary = frontier.run_single(&args.url);
    log_summary(&summary, frontier.index());
    Ok(())
}
