use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_BASE_URL, DEFAULT_INDEX_URL, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "dokkan-harvest",
    version,
    about = "Crawl DokkanInfo card pages into structured records and assets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Crawl(CrawlArgs),
    Card(CardArgs),
    Extract(ExtractArgs),
    Status(StatusArgs),
    Assets(AssetsArgs),
}

/// Output location and fetch behavior shared by the crawling commands.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, default_value = "output")]
    pub output_root: PathBuf,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long, default_value_t = 600)]
    pub card_delay_ms: u64,

    #[arg(long, default_value_t = 60_000)]
    pub page_timeout_ms: u64,

    #[arg(long, default_value_t = 700)]
    pub settle_ms: u64,

    #[arg(long, default_value_t = false)]
    pub skip_assets: bool,

    #[arg(long, default_value_t = false)]
    pub save_html: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, default_value = DEFAULT_INDEX_URL)]
    pub index_url: String,

    #[arg(long, default_value_t = 200)]
    pub max_pages: usize,

    #[arg(long, default_value_t = 10)]
    pub max_new_cards: usize,

    #[arg(long, default_value_t = false)]
    pub no_related: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CardArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long)]
    pub url: String,

    #[arg(long, default_value_t = 10)]
    pub max_new_cards: usize,

    #[arg(long, default_value_t = false)]
    pub follow_related: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub html: PathBuf,

    /// Page URL the HTML was captured from; used for the character id and
    /// for resolving relative image paths.
    #[arg(long)]
    pub url: String,

    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "output")]
    pub output_root: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AssetsArgs {
    #[arg(long, default_value = "output")]
    pub output_root: PathBuf,

    #[arg(long)]
    pub id: String,
}
