use anyhow::Result;
use scraper::{ElementRef, Html, Node};

use super::dom::{
    ancestor_where, any_class, descendants_depth_first, find_by_class, has_class, is_tag,
    siblings_after, text_joined,
};
use super::normalize::{condense_whitespace, non_empty};
use super::segment::{PASSIVE_SKILL, is_section_header};
use super::strategy::{Strategy, first_present};
use super::{CardParser, RawPassive, RawPassiveSection};

impl CardParser {
    pub(super) fn passive_skill(&self, document: &Html) -> Result<RawPassive> {
        let Some(label) = document
            .select(&self.selectors.bold)
            .find(|bold| text_joined(*bold, "") == PASSIVE_SKILL)
        else {
            return Ok(RawPassive::default());
        };
        let Some(passive_row) = ancestor_where(label, |element| {
            is_tag(element, "div") && has_class(element, "row")
        }) else {
            return Ok(RawPassive::default());
        };

        let name = passive_name(passive_row)?;

        let Some(content_row) = siblings_after(passive_row)
            .filter(|sibling| is_tag(*sibling, "div"))
            .find(|sibling| any_class(*sibling, |class| class.contains("bg-")))
        else {
            return Ok(RawPassive {
                name,
                sections: Vec::new(),
            });
        };

        let content = find_by_class(content_row, "div", |class| class == "col")
            .or_else(|| find_by_class(content_row, "div", |class| class.contains("col")));
        let sections = content
            .map(|column| self.passive_sections(column))
            .unwrap_or_default();

        Ok(RawPassive { name, sections })
    }

    /// Depth-first walk: `strong` opens a section, `li` adds an effect to it.
    fn passive_sections(&self, column: ElementRef<'_>) -> Vec<RawPassiveSection> {
        let mut sections: Vec<RawPassiveSection> = Vec::new();
        let mut open = false;

        for element in descendants_depth_first(column) {
            match element.value().name() {
                "strong" => {
                    let label = text_joined(element, "");
                    if label.is_empty() || is_section_header(&label) {
                        continue;
                    }
                    sections.push(RawPassiveSection {
                        condition: Some(label),
                        effects: Vec::new(),
                    });
                    open = true;
                }
                "li" if open => {
                    let Some(section) = sections.last_mut() else {
                        continue;
                    };
                    let effect = self.effect_text(element);
                    if !effect.is_empty() && !section.effects.contains(&effect) {
                        section.effects.push(effect);
                    }
                }
                _ => {}
            }
        }

        sections
    }

    fn effect_text(&self, item: ElementRef<'_>) -> String {
        let mut pieces = Vec::new();
        for node in item.descendants() {
            match node.value() {
                Node::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        pieces.push(trimmed.to_string());
                    }
                }
                Node::Element(element) if element.name() == "img" => {
                    if let Some(alt) = element
                        .attr("alt")
                        .filter(|alt| self.patterns.up_arrow_caption.is_match(alt))
                    {
                        pieces.push(alt.trim().to_string());
                    }
                }
                _ => {}
            }
        }
        let joined = pieces.join(" ");
        let arrows = self.patterns.up_arrow_caption.replace_all(&joined, " ↑");
        condense_whitespace(&arrows)
    }
}

fn passive_name(passive_row: ElementRef<'_>) -> Result<Option<String>> {
    let Some(name_column) = find_by_class(passive_row, "div", |class| class == "col-sm-8") else {
        return Ok(None);
    };
    first_present(
        "passive_name",
        vec![
            Strategy::new("name_column_bold", || {
                Ok(descendants_depth_first(name_column)
                    .find(|element| is_tag(*element, "b"))
                    .and_then(|bold| non_empty(text_joined(bold, ""))))
            }),
            Strategy::new("name_column_text", || {
                Ok(non_empty(text_joined(name_column, "")))
            }),
        ],
    )
}
