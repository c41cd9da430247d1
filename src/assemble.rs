use anyhow::Result;
use indexmap::IndexMap;
use tracing::warn;

use crate::extract::{CardExtraction, RawPassive, RawStats};
use crate::model::{
    ActiveSkill, BASIC_EFFECT_CONDITION, CardIdentity, CardRecord, CardStats, CardType,
    PassiveSection, PassiveSkill, Rarity, StatTriple, UNKNOWN_CARD_NAME,
};

const BASE_COLUMNS: [&str; 2] = ["Base Min", "Base Max"];

pub struct AssembledCard {
    pub record: CardRecord,
    pub degraded_fields: Vec<&'static str>,
    pub section_headers: Vec<&'static str>,
    pub related_card_ids: Vec<String>,
}

/// Builds the canonical record. A field whose extraction failed is logged
/// and replaced by its default; assembly itself never fails.
pub fn assemble(extraction: CardExtraction) -> AssembledCard {
    let mut degraded = Vec::new();
    let url = extraction.source_url.as_str();

    let rarity = settle(url, "rarity", extraction.rarity, &mut degraded);
    let type_token = settle(url, "type", extraction.type_token, &mut degraded);
    let release = settle(url, "release", extraction.release, &mut degraded);
    let leader_skill = settle(url, "leaderSkill", extraction.leader_skill, &mut degraded);
    let super_attack = settle(url, "superAttack", extraction.super_attack, &mut degraded);
    let ultra_super_attack = settle(
        url,
        "ultraSuperAttack",
        extraction.ultra_super_attack,
        &mut degraded,
    );
    let passive = settle(url, "passiveSkill", extraction.passive_skill, &mut degraded);
    let active = settle(url, "activeSkill", extraction.active_skill, &mut degraded);
    let activation_conditions = settle(
        url,
        "activationConditions",
        extraction.activation_conditions,
        &mut degraded,
    );
    let link_skills = settle(url, "linkSkills", extraction.link_skills, &mut degraded);
    let categories = settle(url, "categories", extraction.categories, &mut degraded);
    let stats = settle(url, "stats", extraction.stats, &mut degraded);
    let domains = settle(url, "domains", extraction.domains, &mut degraded);
    let eza = settle(url, "eza", extraction.eza, &mut degraded);

    let record = CardRecord {
        character_id: extraction.character_id,
        identity: build_identity(extraction.display_name, extraction.page_title, rarity, type_token),
        release,
        leader_skill,
        super_attack,
        ultra_super_attack,
        passive_skill: build_passive(passive),
        active_skill: ActiveSkill {
            activation_conditions,
            ..active
        },
        link_skills,
        categories,
        stats: build_stats(stats),
        domains,
        eza,
        rarity,
        type_token,
        type_token_upper: type_token.map(|token| token.as_upper().to_string()),
        type_icon_filename: extraction.type_icon_filename,
        image_urls: extraction.image_urls,
        source_url: extraction.source_url,
    };

    AssembledCard {
        record,
        degraded_fields: degraded,
        section_headers: extraction.section_headers,
        related_card_ids: extraction.related_card_ids,
    }
}

fn settle<T: Default>(
    url: &str,
    field: &'static str,
    result: Result<T>,
    degraded: &mut Vec<&'static str>,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(url = %url, field, error = %err, "field extraction failed; using default");
            degraded.push(field);
            T::default()
        }
    }
}

pub fn build_identity(
    display_name: Option<String>,
    page_title: Option<String>,
    rarity: Option<Rarity>,
    type_token: Option<CardType>,
) -> CardIdentity {
    let name = display_name.unwrap_or_else(|| UNKNOWN_CARD_NAME.to_string());
    let (with_type, bracketed) = match (rarity, type_token) {
        (Some(rarity), Some(card_type)) => {
            let prefix = format!("[{rarity}] [{}]", card_type.as_upper());
            (format!("{prefix} {name}"), format!("{prefix} [{name}]"))
        }
        _ => (name.clone(), format!("[{name}]")),
    };

    CardIdentity {
        display_name: name,
        display_name_with_type: with_type,
        display_name_with_type_bracketed: bracketed,
        page_title,
    }
}

fn build_passive(raw: RawPassive) -> PassiveSkill {
    PassiveSkill {
        name: raw.name,
        sections: raw
            .sections
            .into_iter()
            .map(|section| PassiveSection {
                condition: section
                    .condition
                    .unwrap_or_else(|| BASIC_EFFECT_CONDITION.to_string()),
                effects: section.effects,
            })
            .collect(),
    }
}

/// Splits stat rows into `base_stats` and one `hidden_potential_*` bucket per
/// percentage column, buckets ordered by percentage.
pub fn build_stats(raw: RawStats) -> CardStats {
    let mut base_stats: IndexMap<String, IndexMap<String, i64>> = IndexMap::new();
    let mut buckets: Vec<(f64, String, StatTriple)> = Vec::new();

    for (stat, columns) in raw.rows {
        for (label, value) in columns {
            if BASE_COLUMNS.contains(&label.as_str()) {
                base_stats
                    .entry(stat.clone())
                    .or_default()
                    .insert(label, value);
                continue;
            }
            let Some(percent) = percentage_of(&label) else {
                continue;
            };
            let key = format!("hidden_potential_{}", label.trim().replace('%', "_percent"));
            let index = match buckets.iter().position(|(_, existing, _)| *existing == key) {
                Some(index) => index,
                None => {
                    buckets.push((percent, key, StatTriple::default()));
                    buckets.len() - 1
                }
            };
            buckets[index].2.set(&stat, value);
        }
    }

    buckets.sort_by(|left, right| left.0.total_cmp(&right.0));

    CardStats {
        general_info: raw.general,
        base_stats,
        hidden_potential: buckets
            .into_iter()
            .map(|(_, key, triple)| (key, triple))
            .collect(),
    }
}

fn percentage_of(label: &str) -> Option<f64> {
    label.trim().strip_suffix('%')?.trim().parse::<f64>().ok()
}
