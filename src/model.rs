use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_BUCKET: &str = "unknown";
pub const UNKNOWN_CARD_NAME: &str = "Unknown Card";
pub const BASIC_EFFECT_CONDITION: &str = "Basic effect(s)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    LR,
    UR,
    SSR,
    SR,
    R,
    N,
}

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LR => "LR",
            Self::UR => "UR",
            Self::SSR => "SSR",
            Self::SR => "SR",
            Self::R => "R",
            Self::N => "N",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "lr" => Some(Self::LR),
            "ur" => Some(Self::UR),
            "ssr" => Some(Self::SSR),
            "sr" => Some(Self::SR),
            "r" => Some(Self::R),
            "n" => Some(Self::N),
            _ => None,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Str,
    Teq,
    Int,
    Agl,
    Phy,
}

impl CardType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "str" => Some(Self::Str),
            "teq" => Some(Self::Teq),
            "int" => Some(Self::Int),
            "agl" => Some(Self::Agl),
            "phy" => Some(Self::Phy),
            _ => None,
        }
    }

    pub fn as_upper(self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Teq => "TEQ",
            Self::Int => "INT",
            Self::Agl => "AGL",
            Self::Phy => "PHY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub character_id: Option<String>,
    pub identity: CardIdentity,
    pub release: ReleaseInfo,
    pub leader_skill: Option<String>,
    pub super_attack: AttackSkill,
    pub ultra_super_attack: AttackSkill,
    pub passive_skill: PassiveSkill,
    pub active_skill: ActiveSkill,
    pub link_skills: Vec<String>,
    pub categories: Vec<String>,
    pub stats: CardStats,
    pub domains: Vec<DomainEffect>,
    pub eza: EzaInfo,
    pub rarity: Option<Rarity>,
    pub type_token: Option<CardType>,
    pub type_token_upper: Option<String>,
    pub type_icon_filename: Option<String>,
    pub image_urls: Vec<String>,
    pub source_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardIdentity {
    pub display_name: String,
    pub display_name_with_type: String,
    pub display_name_with_type_bracketed: String,
    pub page_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub release_date: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackSkill {
    pub name: Option<String>,
    pub effect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassiveSkill {
    pub name: Option<String>,
    pub sections: Vec<PassiveSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassiveSection {
    pub condition: String,
    pub effects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSkill {
    pub name: Option<String>,
    pub effect: Option<String>,
    pub activation_conditions: Option<String>,
}

/// Stats split into the labeled integers, the base row pair, and one bucket
/// per hidden-potential column (`hidden_potential_55_percent`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardStats {
    #[serde(default)]
    pub general_info: GeneralInfo,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub base_stats: IndexMap<String, IndexMap<String, i64>>,
    #[serde(flatten)]
    pub hidden_potential: IndexMap<String, StatTriple>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralInfo {
    #[serde(rename = "Cost", default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(rename = "Max Lv", default, skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
    #[serde(rename = "SA Lv", default, skip_serializing_if = "Option::is_none")]
    pub super_attack_level: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTriple {
    #[serde(rename = "HP", default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i64>,
    #[serde(rename = "ATK", default, skip_serializing_if = "Option::is_none")]
    pub atk: Option<i64>,
    #[serde(rename = "DEF", default, skip_serializing_if = "Option::is_none")]
    pub def: Option<i64>,
}

impl StatTriple {
    pub fn set(&mut self, stat: &str, value: i64) {
        match stat {
            "HP" => self.hp = Some(value),
            "ATK" => self.atk = Some(value),
            "DEF" => self.def = Some(value),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainEffect {
    pub name: Option<String>,
    pub effect: Option<String>,
    #[serde(rename = "type")]
    pub domain_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EzaInfo {
    pub has_eza: bool,
    pub eza_step: Option<u32>,
    pub is_seza: bool,
    pub original_release_date: Option<String>,
    pub eza_release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub url: String,
    pub display_name: String,
    pub display_name_with_type: String,
    pub display_name_with_type_bracketed: String,
    pub rarity: Option<Rarity>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub folder: String,
    pub saved_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    pub character_name: String,
    pub character_id: Option<String>,
    pub rarity: Option<Rarity>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub source_url: String,
    pub asset_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCategories {
    pub rarity: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub background: Option<String>,
    pub character: Option<String>,
    pub effect: Option<String>,
    pub cutin: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub generated_at: String,
    pub index_path: String,
    pub total_cards: usize,
    pub by_rarity: IndexMap<String, usize>,
    pub by_type: IndexMap<String, usize>,
}
