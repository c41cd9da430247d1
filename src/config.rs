use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{CardArgs, CrawlArgs, OutputArgs};

pub const DEFAULT_BASE_URL: &str = "https://dokkaninfo.com";
pub const DEFAULT_INDEX_URL: &str = "https://dokkaninfo.com/cards?sort=open_at";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const INDEX_FILE_NAME: &str = "CARDS_INDEX.json";

/// Everything the crawl pipeline needs, resolved once from the command line.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub base_url: String,
    pub index_url: String,
    pub cards_root: PathBuf,
    pub assets_root: PathBuf,
    pub index_path: PathBuf,
    pub max_index_pages: usize,
    pub max_new_records: usize,
    pub card_delay: Duration,
    pub page_timeout: Duration,
    pub settle_delay: Duration,
    pub user_agent: String,
    pub follow_related: bool,
    pub download_assets: bool,
    pub save_html: bool,
}

impl CrawlConfig {
    pub fn with_output_root(output_root: &Path) -> Self {
        let cards_root = output_root.join("cards");
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            index_path: cards_root.join(INDEX_FILE_NAME),
            assets_root: output_root.join("assets"),
            cards_root,
            max_index_pages: 200,
            max_new_records: 10,
            card_delay: Duration::from_millis(600),
            page_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_millis(700),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            follow_related: true,
            download_assets: true,
            save_html: false,
        }
    }

    pub fn from_crawl_args(args: &CrawlArgs) -> Self {
        let mut config = Self::from_output_args(&args.output);
        config.index_url = args.index_url.clone();
        config.max_index_pages = args.max_pages;
        config.max_new_records = args.max_new_cards;
        config.follow_related = !args.no_related;
        config
    }

    /// Single-card mode: one seeded page, no pagination.
    pub fn from_card_args(args: &CardArgs) -> Self {
        let mut config = Self::from_output_args(&args.output);
        config.index_url = args.url.clone();
        config.max_index_pages = 1;
        config.max_new_records = args.max_new_cards;
        config.follow_related = args.follow_related;
        config
    }

    fn from_output_args(args: &OutputArgs) -> Self {
        let mut config = Self::with_output_root(&args.output_root);
        config.base_url = args.base_url.trim_end_matches('/').to_string();
        config.card_delay = Duration::from_millis(args.card_delay_ms);
        config.page_timeout = Duration::from_millis(args.page_timeout_ms);
        config.settle_delay = Duration::from_millis(args.settle_ms);
        config.user_agent = args.user_agent.clone();
        config.download_assets = !args.skip_assets;
        config.save_html = args.save_html;
        config
    }

    pub fn card_url(&self, character_id: &str) -> String {
        format!("{}/cards/{character_id}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_root_derives_cards_assets_and_index_paths() {
        let config = CrawlConfig::with_output_root(Path::new("out"));
        assert_eq!(config.cards_root, PathBuf::from("out/cards"));
        assert_eq!(config.assets_root, PathBuf::from("out/assets"));
        assert_eq!(config.index_path, PathBuf::from("out/cards/CARDS_INDEX.json"));
        assert_eq!(config.card_url("42"), "https://dokkaninfo.com/cards/42");
    }
}
