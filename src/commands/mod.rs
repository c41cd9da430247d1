pub mod assets;
pub mod card;
pub mod crawl;
pub mod extract;
pub mod status;
