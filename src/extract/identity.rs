use std::collections::HashSet;

use anyhow::Result;
use scraper::Html;
use url::Url;

use super::dom::{class_list, find_by_tag, has_class, text_joined};
use super::normalize::non_empty;
use super::strategy::{Strategy, first_present};
use super::CardParser;
use crate::model::{CardType, Rarity};

const RELATED_STRIP_CLASSES: [&str; 7] = [
    "row",
    "cursor-pointer",
    "unselectable",
    "border",
    "border-2",
    "border-dark",
    "margin-top-bottom-5",
];

/// Digits following the first `/cards/` segment that has any.
pub fn character_id_from_url(url: &str) -> Option<String> {
    url.match_indices("/cards/").find_map(|(idx, marker)| {
        let digits: String = url[idx + marker.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        non_empty(digits)
    })
}

/// Last path segment of the first type-icon image.
pub fn type_icon_filename(image_urls: &[String]) -> Option<String> {
    let icon = image_urls.iter().find(|url| url.contains("cha_type_icon_"))?;
    let segment = match Url::parse(icon) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => icon.rsplit('/').next().map(str::to_string),
    };
    segment.and_then(non_empty)
}

/// Suffix of the last `border-*`/`bg-*` class naming a card type. Expects
/// classes in attribute order.
pub fn type_from_classes<'c>(classes: impl Iterator<Item = &'c str>) -> Option<CardType> {
    classes
        .filter(|class| class.starts_with("border-") || class.starts_with("bg-"))
        .filter_map(|class| class.split_once('-'))
        .filter_map(|(_, suffix)| CardType::from_token(suffix.trim()))
        .last()
}

impl CardParser {
    pub(super) fn page_title(&self, document: &Html) -> Option<String> {
        document
            .select(&self.selectors.title)
            .next()
            .map(|title| text_joined(title, ""))
            .and_then(non_empty)
    }

    pub(super) fn display_name(&self, document: &Html) -> Option<String> {
        document
            .select(&self.selectors.heading)
            .next()
            .map(|heading| text_joined(heading, ""))
            .and_then(non_empty)
            .or_else(|| self.page_title(document))
    }

    pub(super) fn image_urls(&self, document: &Html, page_url: &str) -> Vec<String> {
        let base = Url::parse(page_url).ok();
        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        for image in document.select(&self.selectors.image) {
            let Some(src) = image.value().attr("src").map(str::trim) else {
                continue;
            };
            if src.is_empty() {
                continue;
            }
            let resolved = match &base {
                Some(base) => base.join(src).map(String::from).ok(),
                None => Url::parse(src).map(String::from).ok(),
            };
            let Some(resolved) = resolved else {
                continue;
            };
            if seen.insert(resolved.clone()) {
                urls.push(resolved);
            }
        }
        urls
    }

    pub(super) fn rarity(&self, document: &Html, image_urls: &[String]) -> Result<Option<Rarity>> {
        first_present(
            "rarity",
            vec![
                Strategy::new("rarity_icon", || {
                    Ok(document
                        .select(&self.selectors.rarity_icon)
                        .filter_map(|image| image.value().attr("src"))
                        .find_map(|src| self.rarity_from_src(src)))
                }),
                Strategy::new("image_urls", || {
                    Ok(image_urls.iter().find_map(|url| self.rarity_from_src(url)))
                }),
            ],
        )
    }

    fn rarity_from_src(&self, src: &str) -> Option<Rarity> {
        let lowered = src.to_lowercase();
        self.patterns
            .rarity_icon
            .captures(&lowered)
            .and_then(|caps| caps.get(1))
            .and_then(|token| Rarity::from_token(token.as_str()))
    }

    pub(super) fn type_token(&self, document: &Html) -> Result<Option<CardType>> {
        Ok(document
            .select(&self.selectors.type_row)
            .next()
            .and_then(|row| type_from_classes(class_list(row))))
    }

    /// Ids of the header tile strip, minus the first tile (the page's own card).
    pub(super) fn related_card_ids(&self, document: &Html) -> Vec<String> {
        let Some(strip) = document.select(&self.selectors.div).find(|div| {
            RELATED_STRIP_CLASSES
                .iter()
                .all(|class| has_class(*div, class))
        }) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for tile in find_by_tag(strip, "div")
            .filter(|div| has_class(*div, "col-5"))
            .skip(1)
        {
            let Some(src) = find_by_tag(tile, "img").find_map(|image| image.value().attr("src"))
            else {
                continue;
            };
            let Some(id) = self
                .patterns
                .related_card_id
                .captures(src)
                .and_then(|caps| caps.get(1))
                .map(|id| id.as_str().to_string())
            else {
                continue;
            };
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
        ids
    }
}
