use anyhow::Result;
use scraper::Html;

use super::CardParser;
use super::dom::{has_class, is_tag, raw_text, siblings_after, text_joined};
use super::normalize::non_empty;
use crate::model::EzaInfo;

/// Selected step that the site shows for a Super EZA. Unconfirmed against
/// real data; kept as an assumption.
const SUPER_EZA_STEP: u32 = 4;

impl CardParser {
    pub(super) fn eza(&self, document: &Html) -> Result<EzaInfo> {
        let mut info = EzaInfo::default();

        let toggle = document.select(&self.selectors.row_div).find(|row| {
            let text = raw_text(*row);
            text.contains("PRE-EZA") && text.contains("EZA")
        });

        if let Some(toggle) = toggle {
            info.has_eza = true;
            let step_row = siblings_after(toggle)
                .find(|sibling| is_tag(*sibling, "div") && has_class(*sibling, "row"));
            if let Some(step_row) = step_row.filter(|row| raw_text(*row).contains("Step:")) {
                info.eza_step = step_row
                    .select(&self.selectors.multiselect_value)
                    .next()
                    .and_then(|value| text_joined(value, "").parse::<u32>().ok());
                info.is_seza = info.eza_step == Some(SUPER_EZA_STEP);
            }
        }

        let release_block = document.select(&self.selectors.div).find(|div| {
            let text = raw_text(*div);
            text.contains("Release Date") && text.contains("EZA Release Date")
        });
        if let Some(block) = release_block {
            let text = text_joined(block, "\n");
            info.original_release_date = self
                .patterns
                .original_release
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .and_then(|value| non_empty(value.as_str().trim().to_string()));
            info.eza_release_date = self
                .patterns
                .eza_release
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .and_then(|value| non_empty(value.as_str().trim().to_string()));
        }

        Ok(info)
    }
}
