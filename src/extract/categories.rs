use std::collections::HashSet;

use anyhow::Result;
use scraper::{ElementRef, Html};

use super::CardParser;
use super::dom::{find_by_tag, node_text, text_joined};
use super::normalize::filter_categories;
use super::segment::{CATEGORIES, is_section_header};

const LABEL_PATH: &str = "/card_category/label/";
const CATEGORY_PATH: &str = "/categories/";

impl CardParser {
    /// Category names from three DOM shapes, merged in order then filtered.
    pub(super) fn categories(&self, document: &Html) -> Result<Vec<String>> {
        let mut merged = Vec::new();
        let mut seen = HashSet::new();
        let strategies = [
            self.linked_category_images(document),
            self.labeled_category_images(document),
            categories_after_label(document),
        ];
        for token in strategies.into_iter().flatten() {
            let token = token.trim().to_string();
            if !token.is_empty() && seen.insert(token.clone()) {
                merged.push(token);
            }
        }
        Ok(filter_categories(merged))
    }

    fn linked_category_images(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.selectors.category_anchor_image)
            .filter_map(image_label)
            .collect()
    }

    fn labeled_category_images(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.selectors.category_label_image)
            .filter_map(image_label)
            .collect()
    }
}

/// Walks the siblings that follow the "Categories" label until the next
/// section header, collecting label images and category links.
fn categories_after_label(document: &Html) -> Vec<String> {
    let Some(label_parent) = document
        .root_element()
        .descendants()
        .find(|node| node_text(node.value()).is_some_and(|text| text.trim() == CATEGORIES))
        .and_then(|node| node.parent())
    else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for sibling in label_parent.next_siblings() {
        if let Some(text) = node_text(sibling.value()) {
            if is_section_header(text.trim()) {
                break;
            }
            continue;
        }
        let Some(element) = ElementRef::wrap(sibling) else {
            continue;
        };
        if is_section_header(&text_joined(element, "")) {
            break;
        }
        collect_category_tokens(element, &mut found);
    }
    found
}

fn collect_category_tokens(element: ElementRef<'_>, found: &mut Vec<String>) {
    let candidates = std::iter::once(element).chain(find_by_tag(element, "img"));
    for image in candidates.filter(|candidate| candidate.value().name() == "img") {
        let is_label = image
            .value()
            .attr("src")
            .is_some_and(|src| src.contains(LABEL_PATH));
        if !is_label {
            continue;
        }
        if let Some(label) = image_label(image) {
            found.push(label);
        }
    }

    let anchors = std::iter::once(element).chain(find_by_tag(element, "a"));
    for anchor in anchors.filter(|candidate| candidate.value().name() == "a") {
        let is_category = anchor
            .value()
            .attr("href")
            .is_some_and(|href| href.contains(CATEGORY_PATH));
        if is_category {
            let text = text_joined(anchor, " ");
            if !text.is_empty() {
                found.push(text);
            }
        }
    }
}

fn image_label(image: ElementRef<'_>) -> Option<String> {
    let pick = |name: &str| {
        image
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    pick("alt").or_else(|| pick("title")).map(str::to_string)
}
