use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::AssetsArgs;
use crate::config::CrawlConfig;
use crate::extract::classify_assets;
use crate::index_store::IndexStore;
use crate::model::CardRecord;
use crate::output::METADATA_FILE;
use crate::util::read_json;

pub fn run(args: AssetsArgs) -> Result<()> {
    let config = CrawlConfig::with_output_root(&args.output_root);
    let index = IndexStore::load(&config.index_path);
    let entry = index
        .get(&args.id)
        .with_context(|| format!("card {} is not in {}", args.id, index.path().display()))?;

    let metadata_path = PathBuf::from(&entry.folder).join(METADATA_FILE);
    let record: CardRecord = read_json(&metadata_path)?;
    let categories = classify_assets(record.character_id.as_deref(), &record.image_urls);

    info!(
        character_id = %args.id,
        images = record.image_urls.len(),
        path = %metadata_path.display(),
        "classified card assets"
    );
    let json =
        serde_json::to_string_pretty(&categories).context("failed to serialize asset categories")?;
    println!("{json}");
    Ok(())
}
