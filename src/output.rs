use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::REFERER;
use tracing::{debug, info, warn};
use url::Url;

use crate::assemble::AssembledCard;
use crate::config::CrawlConfig;
use crate::model::{AssetDescriptor, CardRecord, UNKNOWN_BUCKET};
use crate::render::RenderedPage;
use crate::util::{ensure_directory, sha256_hex, write_json_pretty, write_text};

pub const METADATA_FILE: &str = "METADATA.json";
pub const PAGE_TEXT_FILE: &str = "PAGE_TEXT.txt";
pub const ATTRIBUTION_FILE: &str = "ATTRIBUTION.txt";
pub const PAGE_HTML_FILE: &str = "page.html";
pub const ASSET_INFO_FILE: &str = "asset_info.json";
const ASSETS_DIR: &str = "assets";
const ASSET_TIMEOUT: Duration = Duration::from_secs(30);

pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpAssetFetcher {
    client: Client,
    referer: String,
}

impl HttpAssetFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(ASSET_TIMEOUT)
            .build()
            .context("failed to build asset http client")?;
        Ok(Self {
            client,
            referer: config.base_url.clone(),
        })
    }
}

impl AssetFetcher for HttpAssetFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(REFERER, &self.referer)
            .send()
            .with_context(|| format!("failed to request asset: {url}"))?
            .error_for_status()
            .with_context(|| format!("asset returned an error status: {url}"))?;
        let bytes = response
            .bytes()
            .with_context(|| format!("failed to read asset body: {url}"))?;
        Ok(bytes.to_vec())
    }
}

/// Writes the per-card file set and mirrors downloaded assets.
pub struct RecordWriter {
    cards_root: PathBuf,
    assets_root: PathBuf,
    download_assets: bool,
    save_html: bool,
    fetcher: Box<dyn AssetFetcher>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetTally {
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
}

impl RecordWriter {
    pub fn new(config: &CrawlConfig, fetcher: Box<dyn AssetFetcher>) -> Self {
        Self {
            cards_root: config.cards_root.clone(),
            assets_root: config.assets_root.clone(),
            download_assets: config.download_assets,
            save_html: config.save_html,
            fetcher,
        }
    }

    pub fn folder_name(record: &CardRecord) -> String {
        let id = record.character_id.as_deref().unwrap_or(UNKNOWN_BUCKET);
        sanitize_folder_name(&format!(
            "{} - {id}",
            record.identity.display_name_with_type_bracketed
        ))
    }

    /// Returns the card folder.
    pub fn write(&self, assembled: &AssembledCard, page: &RenderedPage) -> Result<PathBuf> {
        let record = &assembled.record;
        let folder = Self::folder_name(record);
        let card_dir = self.cards_root.join(&folder);
        ensure_directory(&card_dir)?;

        write_json_pretty(&card_dir.join(METADATA_FILE), record)?;
        write_text(&card_dir.join(PAGE_TEXT_FILE), &debug_dump(assembled, page)?)?;
        write_text(
            &card_dir.join(ATTRIBUTION_FILE),
            &attribution_text(&record.source_url),
        )?;
        if self.save_html {
            write_text(&card_dir.join(PAGE_HTML_FILE), &page.html)?;
        }

        if self.download_assets {
            let tally = self.download_assets(&record.image_urls, &card_dir.join(ASSETS_DIR));
            info!(
                folder = %folder,
                downloaded = tally.downloaded,
                already_present = tally.already_present,
                failed = tally.failed,
                "card assets processed"
            );
        }
        self.mirror_assets(record, &card_dir, &folder)?;

        Ok(card_dir)
    }

    fn download_assets(&self, image_urls: &[String], assets_dir: &Path) -> AssetTally {
        let mut tally = AssetTally::default();
        for url in image_urls {
            let Some(relative) = asset_relative_path(url) else {
                debug!(url = %url, "asset url has no usable path");
                continue;
            };
            let destination = assets_dir.join(relative);
            if fs::metadata(&destination).is_ok_and(|meta| meta.len() > 0) {
                tally.already_present += 1;
                continue;
            }
            let saved = self.fetcher.fetch(url).and_then(|bytes| {
                if let Some(parent) = destination.parent() {
                    ensure_directory(parent)?;
                }
                fs::write(&destination, bytes).with_context(|| {
                    format!("failed to write asset: {}", destination.display())
                })
            });
            match saved {
                Ok(()) => tally.downloaded += 1,
                Err(err) => {
                    warn!(url = %url, error = %err, "asset download failed");
                    tally.failed += 1;
                }
            }
        }
        tally
    }

    fn mirror_assets(&self, record: &CardRecord, card_dir: &Path, folder: &str) -> Result<()> {
        let mirror_dir = self.assets_root.join(folder);
        ensure_directory(&mirror_dir)?;

        let source = card_dir.join(ASSETS_DIR);
        let copied = if source.is_dir() {
            copy_tree(&source, &mirror_dir)?
        } else {
            0
        };

        let descriptor = AssetDescriptor {
            character_name: record.identity.display_name.clone(),
            character_id: record.character_id.clone(),
            rarity: record.rarity,
            card_type: record.type_token_upper.clone(),
            source_url: record.source_url.clone(),
            asset_count: record.image_urls.len(),
        };
        write_json_pretty(&mirror_dir.join(ASSET_INFO_FILE), &descriptor)?;
        debug!(mirror = %mirror_dir.display(), copied, "mirrored card assets");
        Ok(())
    }
}

/// Replaces characters that are unsafe in folder names, collapses
/// whitespace and trims trailing spaces and dots.
pub fn sanitize_folder_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            ':' => out.push_str(" -"),
            '/' | '\\' | '|' => out.push('-'),
            '*' => out.push('x'),
            '?' => {}
            '"' => out.push('\''),
            _ => out.push(ch),
        }
    }
    out.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches([' ', '.'])
        .to_string()
}

pub fn attribution_text(source_url: &str) -> String {
    format!(
        "Data and image asset links collected from DokkanInfo.\n\
         Source page: {source_url}\n\
         Site: https://dokkaninfo.com\n\
         \n\
         Notes:\n\
         - Personal/educational use.\n\
         - Respect the site's Terms and original owners' rights.\n\
         - If you share output, credit: 'Data/images via dokkaninfo.com'.\n"
    )
}

/// One `key: value` line per record field plus render provenance.
pub fn debug_dump(assembled: &AssembledCard, page: &RenderedPage) -> Result<String> {
    let mut lines = vec![
        format!("rendered_url: {}", page.url),
        format!("html_sha256: {}", sha256_hex(page.html.as_bytes())),
        format!("sections: {}", assembled.section_headers.join(", ")),
        format!("degraded_fields: {}", assembled.degraded_fields.join(", ")),
        format!("related_card_ids: {}", assembled.related_card_ids.join(", ")),
    ];

    let value = serde_json::to_value(&assembled.record).context("failed to serialize record")?;
    if let serde_json::Value::Object(fields) = value {
        for (key, field) in fields {
            let rendered = match field {
                serde_json::Value::Null => continue,
                serde_json::Value::String(text) => text,
                other => serde_json::to_string(&other).context("failed to serialize field")?,
            };
            lines.push(format!("{key}: {rendered}"));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

/// URL path segments, without empty or dot segments.
fn asset_relative_path(url: &str) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.iter().collect())
}

fn copy_tree(source: &Path, destination: &Path) -> Result<usize> {
    let mut copied = 0;
    let entries = fs::read_dir(source)
        .with_context(|| format!("failed to read directory: {}", source.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", source.display()))?;
        let path = entry.path();
        let target = destination.join(entry.file_name());
        if path.is_dir() {
            ensure_directory(&target)?;
            copied += copy_tree(&path, &target)?;
        } else {
            fs::copy(&path, &target).with_context(|| {
                format!("failed to copy {} to {}", path.display(), target.display())
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use anyhow::bail;

    use super::*;
    use crate::assemble::build_identity;
    use crate::model::{CardType, Rarity};
    use crate::util::read_json;

    struct CannedAssets {
        files: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl AssetFetcher for CannedAssets {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(url.to_string());
            match self.files.get(url) {
                Some(bytes) => Ok(bytes.clone()),
                None => bail!("404 for {url}"),
            }
        }
    }

    fn record() -> CardRecord {
        CardRecord {
            character_id: Some("4011".to_string()),
            identity: build_identity(
                Some("Goku: Super Saiyan?".to_string()),
                None,
                Some(Rarity::LR),
                Some(CardType::Str),
            ),
            release: Default::default(),
            leader_skill: Some("ATK +50%".to_string()),
            super_attack: Default::default(),
            ultra_super_attack: Default::default(),
            passive_skill: Default::default(),
            active_skill: Default::default(),
            link_skills: vec!["Prodigies".to_string()],
            categories: Vec::new(),
            stats: Default::default(),
            domains: Vec::new(),
            eza: Default::default(),
            rarity: Some(Rarity::LR),
            type_token: Some(CardType::Str),
            type_token_upper: Some("STR".to_string()),
            type_icon_filename: None,
            image_urls: vec![
                "https://dokkaninfo.com/assets/card/4011_bg.png".to_string(),
                "https://dokkaninfo.com/assets/card/missing.png".to_string(),
            ],
            source_url: "https://dokkaninfo.com/cards/4011".to_string(),
        }
    }

    fn page() -> RenderedPage {
        RenderedPage {
            url: "https://dokkaninfo.com/cards/4011".to_string(),
            html: "<html></html>".to_string(),
        }
    }

    #[test]
    fn sanitize_folder_name_replaces_unsafe_characters() {
        assert_eq!(
            sanitize_folder_name(r#"[LR] [STR] [Goku: "Kid"/Adult*?] - 1 ."#),
            "[LR] [STR] [Goku - 'Kid'-Adultx] - 1"
        );
    }

    #[test]
    fn writer_produces_file_set_and_asset_mirror() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CrawlConfig::with_output_root(dir.path());
        let fetcher = CannedAssets {
            files: HashMap::from([(
                "https://dokkaninfo.com/assets/card/4011_bg.png".to_string(),
                b"png".to_vec(),
            )]),
            requests: RefCell::new(Vec::new()),
        };
        let writer = RecordWriter::new(&config, Box::new(fetcher));
        let assembled = AssembledCard {
            record: record(),
            degraded_fields: vec!["stats"],
            section_headers: vec!["Leader Skill"],
            related_card_ids: Vec::new(),
        };

        let card_dir = writer.write(&assembled, &page()).expect("write");

        assert_eq!(
            card_dir.file_name().and_then(|name| name.to_str()),
            Some("[LR] [STR] [Goku - Super Saiyan] - 4011")
        );
        let saved: CardRecord = read_json(&card_dir.join(METADATA_FILE)).expect("metadata");
        assert_eq!(saved, assembled.record);

        let dump = fs::read_to_string(card_dir.join(PAGE_TEXT_FILE)).expect("dump");
        assert!(dump.contains("degraded_fields: stats"));
        assert!(dump.contains("leaderSkill: ATK +50%"));
        assert!(!dump.contains("typeIconFilename"));

        let attribution = fs::read_to_string(card_dir.join(ATTRIBUTION_FILE)).expect("attribution");
        assert!(attribution.contains("Source page: https://dokkaninfo.com/cards/4011"));

        assert!(card_dir.join("assets/assets/card/4011_bg.png").is_file());
        let mirror = config.assets_root.join("[LR] [STR] [Goku - Super Saiyan] - 4011");
        assert!(mirror.join("assets/card/4011_bg.png").is_file());
        let info: AssetDescriptor = read_json(&mirror.join(ASSET_INFO_FILE)).expect("asset info");
        assert_eq!(info.asset_count, 2);
        assert_eq!(info.card_type.as_deref(), Some("STR"));
    }

    #[test]
    fn existing_non_empty_assets_are_not_refetched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CrawlConfig::with_output_root(dir.path());
        let writer = RecordWriter::new(
            &config,
            Box::new(CannedAssets {
                files: HashMap::new(),
                requests: RefCell::new(Vec::new()),
            }),
        );
        let assets_dir = dir.path().join("assets-under-test");
        let existing = assets_dir.join("assets/card/4011_bg.png");
        fs::create_dir_all(existing.parent().expect("parent")).expect("mkdir");
        fs::write(&existing, b"cached").expect("seed asset");

        let tally = writer.download_assets(&record().image_urls, &assets_dir);

        assert_eq!(
            tally,
            AssetTally {
                downloaded: 0,
                already_present: 1,
                failed: 1,
            }
        );
    }
}
