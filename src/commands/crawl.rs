use anyhow::Result;
use tracing::info;

use crate::cli::CrawlArgs;
use crate::config::CrawlConfig;
use crate::events::TracingEvents;
use crate::frontier::{CrawlSummary, Frontier};
use crate::index_store::IndexStore;
use crate::output::{HttpAssetFetcher, RecordWriter};
use crate::render::HttpRenderer;

pub fn run(args: CrawlArgs) -> Result<()> {
    let config = CrawlConfig::from_crawl_args(&args);
    info!(
        index_url = %config.index_url,
        output_root = %args.output.output_root.display(),
        max_pages = config.max_index_pages,
        max_new_cards = config.max_new_records,
        follow_related = config.follow_related,
        download_assets = config.download_assets,
        "crawl requested"
    );

    let mut frontier = build_frontier(config)?;
    let summary = frontier.run();
    log_summary(&summary, frontier.index());
    Ok(())
}

/// Wires the HTTP renderer, asset fetcher, writer and index into a frontier.
pub fn build_frontier(config: CrawlConfig) -> Result<Frontier<HttpRenderer, TracingEvents>> {
    let renderer = HttpRenderer::new(&config)?;
    let writer = RecordWriter::new(&config, Box::new(HttpAssetFetcher::new(&config)?));
    let index = IndexStore::load(&config.index_path);
    Frontier::new(config, renderer, writer, index, TracingEvents)
}

pub fn log_summary(summary: &CrawlSummary, index: &IndexStore) {
    info!(
        reason = summary.reason.as_str(),
        pages_processed = summary.pages_processed,
        new_records = summary.new_records,
        indexed_total = index.len(),
        index_path = %index.path().display(),
        "crawl completed"
    );
}
