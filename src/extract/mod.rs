mod categories;
mod classify;
mod dom;
mod domains;
mod eza;
mod identity;
pub mod normalize;
mod passive;
pub mod segment;
mod stats;
mod strategy;
mod text_fields;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::model::{
    ActiveSkill, AttackSkill, CardType, DomainEffect, EzaInfo, GeneralInfo, Rarity, ReleaseInfo,
};

pub use classify::classify_assets;
pub use identity::character_id_from_url;

use self::dom::compile_selector;
use self::segment::segment_sections;

/// Everything pulled out of one rendered card page. Fields that can fail are
/// kept as `Result` so the assembler decides how each failure degrades.
pub struct CardExtraction {
    pub source_url: String,
    pub character_id: Option<String>,
    pub page_title: Option<String>,
    pub display_name: Option<String>,
    pub section_headers: Vec<&'static str>,
    pub image_urls: Vec<String>,
    pub type_icon_filename: Option<String>,
    pub related_card_ids: Vec<String>,
    pub release: Result<ReleaseInfo>,
    pub leader_skill: Result<Option<String>>,
    pub super_attack: Result<AttackSkill>,
    pub ultra_super_attack: Result<AttackSkill>,
    pub passive_skill: Result<RawPassive>,
    pub active_skill: Result<ActiveSkill>,
    pub activation_conditions: Result<Option<String>>,
    pub link_skills: Result<Vec<String>>,
    pub categories: Result<Vec<String>>,
    pub stats: Result<RawStats>,
    pub rarity: Result<Option<Rarity>>,
    pub type_token: Result<Option<CardType>>,
    pub domains: Result<Vec<DomainEffect>>,
    pub eza: Result<EzaInfo>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPassive {
    pub name: Option<String>,
    pub sections: Vec<RawPassiveSection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPassiveSection {
    pub condition: Option<String>,
    pub effects: Vec<String>,
}

/// Labeled integers plus `stat -> column label -> value` rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStats {
    pub general: GeneralInfo,
    pub rows: IndexMap<String, IndexMap<String, i64>>,
}

struct Patterns {
    cost: Regex,
    max_level: Regex,
    super_attack_level: Regex,
    release: Regex,
    super_attack_run: Regex,
    ultra_super_attack_run: Regex,
    bare_percentage: Regex,
    super_attack_level_token: Regex,
    semicolon_spacing: Regex,
    raises_then_causes: Regex,
    exploding_rage: Regex,
    up_arrow_caption: Regex,
    rarity_icon: Regex,
    related_card_id: Regex,
    stat_text_row: Regex,
    domain_label: Regex,
    original_release: Regex,
    eza_release: Regex,
}

struct Selectors {
    title: Selector,
    heading: Selector,
    image: Selector,
    table: Selector,
    table_row: Selector,
    header_cell: Selector,
    any_cell: Selector,
    bold: Selector,
    div: Selector,
    row_div: Selector,
    multiselect_value: Selector,
    rarity_icon: Selector,
    type_row: Selector,
    category_anchor_image: Selector,
    category_label_image: Selector,
}

pub struct CardParser {
    patterns: Patterns,
    selectors: Selectors,
}

impl CardParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: Patterns::new()?,
            selectors: Selectors::new()?,
        })
    }

    /// `source_url` is the URL the card was requested under (identity);
    /// `page_url` is where the renderer ended up (relative link base).
    pub fn extract(&self, html: &str, source_url: &str, page_url: &str) -> CardExtraction {
        let document = Html::parse_document(html);
        let page_text = dom::flatten_text(&document);
        let sections = segment_sections(&page_text);
        let image_urls = self.image_urls(&document, page_url);

        debug!(
            url = %source_url,
            text_lines = page_text.lines().count(),
            sections = sections.headers().count(),
            images = image_urls.len(),
            "parsed card page"
        );

        CardExtraction {
            source_url: source_url.to_string(),
            character_id: character_id_from_url(source_url),
            page_title: self.page_title(&document),
            display_name: self.display_name(&document),
            section_headers: sections.headers().collect(),
            type_icon_filename: identity::type_icon_filename(&image_urls),
            related_card_ids: self.related_card_ids(&document),
            release: self.release(&page_text),
            leader_skill: self.leader_skill(&sections),
            super_attack: self.super_attack(&sections, &page_text),
            ultra_super_attack: self.ultra_super_attack(&sections, &page_text),
            passive_skill: self.passive_skill(&document),
            active_skill: self.active_skill(&sections),
            activation_conditions: self.activation_conditions(&sections),
            link_skills: self.link_skills(&sections),
            categories: self.categories(&document),
            stats: self.stats(&document, &sections, &page_text),
            rarity: self.rarity(&document, &image_urls),
            type_token: self.type_token(&document),
            domains: self.domains(&document),
            eza: self.eza(&document),
            image_urls,
        }
    }
}

impl Patterns {
    fn new() -> Result<Self> {
        Ok(Self {
            cost: compile(r"(?i)\bCost\s*:\s*(\d+)", "cost")?,
            max_level: compile(r"(?i)\bMax\s*Lv\s*:\s*(\d+)", "max level")?,
            super_attack_level: compile(r"(?i)\bSA\s*Lv\s*:\s*(\d+)", "super attack level")?,
            release: compile(
                r"(?i)Release Date\s+([0-9/.\-]+)\s+([0-9: ]+[APMapm]{2})\s+([A-Z]{2,4})",
                "release date",
            )?,
            super_attack_run: compile(
                r"(?i)Super Attack\s+([\s\S]*?)\s+Ultra Super Attack",
                "super attack run",
            )?,
            ultra_super_attack_run: compile(
                r"(?i)Ultra Super Attack\s+([\s\S]*?)\s+(?:Passive Skill|Active Skill|Link Skills|Categories|Stats|Transformation Condition\(s\))",
                "ultra super attack run",
            )?,
            bare_percentage: compile(r"^\d+\s*%$", "bare percentage")?,
            super_attack_level_token: compile(r"(?i)\bSA\s*Lv\b", "super attack level token")?,
            semicolon_spacing: compile(r"\s*;\s*", "semicolon spacing")?,
            raises_then_causes: compile(r"(?i)\s*Raises ATK & DEF\s*Causes", "raises/causes")?,
            exploding_rage: compile(
                r#"(?i)"Exploding Rage"\s*Category\s+Ki\s*\+\d+\s+and\s+HP,\s*ATK\s*&\s*DEF\s*\+\d+%"#,
                "repeated leader phrase",
            )?,
            up_arrow_caption: compile(r"(?i)\s*up green arrow\s*", "up arrow caption")?,
            rarity_icon: compile(r"cha_rare(?:_sm)?_(lr|ur|ssr|sr|r|n)\.png", "rarity icon")?,
            related_card_id: compile(r"(?i)card_(\d+)_", "related card id")?,
            stat_text_row: compile(
                r"^(HP|ATK|DEF)\s+([0-9,]+)\s+([0-9,]+)\s+([0-9,]+)\s+([0-9,]+)$",
                "stat text row",
            )?,
            domain_label: compile(r"(?i)^\s*Domain Effect\(s\)\s*$", "domain label")?,
            original_release: compile(
                r"Release Date\s+(\d+/\d+/\d+\s+\d+:\d+:\d+\s+[AP]M\s+[A-Z]+)",
                "original release date",
            )?,
            eza_release: compile(
                r"EZA Release Date\s+(\d+/\d+/\d+\s+\d+:\d+:\d+\s+[AP]M\s+[A-Z]+)",
                "eza release date",
            )?,
        })
    }
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title: compile_selector("title")?,
            heading: compile_selector("h1")?,
            image: compile_selector("img[src]")?,
            table: compile_selector("table")?,
            table_row: compile_selector("tr")?,
            header_cell: compile_selector("th")?,
            any_cell: compile_selector("th, td")?,
            bold: compile_selector("b")?,
            div: compile_selector("div")?,
            row_div: compile_selector("div.row")?,
            multiselect_value: compile_selector("span.multiselect__single")?,
            rarity_icon: compile_selector(
                "div.card-icon-item.card-icon-item-rarity.card-info-above-thumb img[src]",
            )?,
            type_row: compile_selector(
                "div.row.justify-content-center.align-items-center.padding-top-bottom-10.border.border-2",
            )?,
            category_anchor_image: compile_selector(r#"a[href*="/categories/"] img"#)?,
            category_label_image: compile_selector(r#"img[src*="/card_category/label/"]"#)?,
        })
    }
}

fn compile(pattern: &str, label: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("failed to compile {label} regex"))
}
