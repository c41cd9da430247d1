use std::collections::HashSet;

use anyhow::Result;
use scraper::{ElementRef, Html};

use super::CardParser;
use super::dom::{
    ancestor_where, any_class, class_has_word, class_list, descendants_depth_first, find_by_tag,
    is_tag, raw_text, siblings_after, text_joined,
};
use super::identity::type_from_classes;
use super::normalize::non_empty;
use crate::model::DomainEffect;

const EFFECT_ROW_HOPS: usize = 3;

impl CardParser {
    pub(super) fn domains(&self, document: &Html) -> Result<Vec<DomainEffect>> {
        let mut seen = HashSet::new();
        let mut domains = Vec::new();

        for label in document.select(&self.selectors.bold) {
            if !self.patterns.domain_label.is_match(&raw_text(label)) {
                continue;
            }
            let Some(outer_row) = ancestor_where(label, |element| {
                is_tag(element, "div") && any_class(element, |class| class_has_word(class, "row"))
            }) else {
                continue;
            };

            let name = find_by_tag(outer_row, "b")
                .nth(1)
                .map(|bold| text_joined(bold, ""))
                .and_then(non_empty);
            let domain_type = ancestor_where(outer_row, |element| {
                is_tag(element, "div") && any_class(element, |class| class_has_word(class, "border"))
            })
            .and_then(|container| type_from_classes(class_list(container)))
            .map(|card_type| card_type.as_upper().to_string());
            let effect = domain_effect_text(outer_row);

            let key = (
                name.clone().unwrap_or_default(),
                effect.clone().unwrap_or_default(),
            );
            if seen.insert(key) {
                domains.push(DomainEffect {
                    name,
                    effect,
                    domain_type,
                });
            }
        }

        Ok(domains)
    }
}

/// First "level 2 background" block among the next few sibling rows,
/// either the row itself or any div nested inside it.
fn domain_effect_text(outer_row: ElementRef<'_>) -> Option<String> {
    siblings_after(outer_row)
        .filter(|sibling| is_tag(*sibling, "div"))
        .take(EFFECT_ROW_HOPS)
        .find_map(|row| {
            if any_class(row, is_level_two_background) {
                return non_empty(text_joined(row, " "));
            }
            descendants_depth_first(row)
                .find(|element| {
                    is_tag(*element, "div") && any_class(*element, is_level_two_background)
                })
                .and_then(|block| non_empty(text_joined(block, " ")))
        })
}

/// `bg-<anything>-2`, e.g. `bg-agl-2`.
fn is_level_two_background(class: &str) -> bool {
    class.starts_with("bg-") && class.ends_with("-2")
}
