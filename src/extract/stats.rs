use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use scraper::{ElementRef, Html};

use super::dom::{raw_text, text_joined};
use super::segment::{STATS, Sections};
use super::strategy::{Strategy, first_present};
use super::{CardParser, RawStats};
use crate::model::GeneralInfo;

const STAT_NAMES: [&str; 3] = ["HP", "ATK", "DEF"];
const TEXT_ROW_COLUMNS: [&str; 4] = ["Base Min", "Base Max", "55%", "100%"];

type StatRows = IndexMap<String, IndexMap<String, i64>>;

impl CardParser {
    pub(super) fn stats(
        &self,
        document: &Html,
        sections: &Sections,
        page_text: &str,
    ) -> Result<RawStats> {
        let general = GeneralInfo {
            cost: labeled_integer(&self.patterns.cost, page_text, "Cost")?,
            max_level: labeled_integer(&self.patterns.max_level, page_text, "Max Lv")?,
            super_attack_level: labeled_integer(
                &self.patterns.super_attack_level,
                page_text,
                "SA Lv",
            )?,
        };

        let rows = first_present(
            "stats",
            vec![
                Strategy::new("table", || Ok(self.table_rows(document))),
                Strategy::new("text_rows", || {
                    Ok(sections
                        .non_empty(STATS)
                        .and_then(|lines| self.text_rows(lines)))
                }),
            ],
        )?
        .unwrap_or_default();

        Ok(RawStats { general, rows })
    }

    fn stats_table<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selectors.table).find(|table| {
            let titled = table.select(&self.selectors.table_row).next().is_some_and(|row| {
                row.select(&self.selectors.header_cell)
                    .any(|cell| text_joined(cell, "") == STATS)
            });
            if titled {
                return true;
            }
            let text = raw_text(*table);
            STAT_NAMES.iter().all(|stat| text.contains(stat))
        })
    }

    /// First row holds the column labels; each HP/ATK/DEF row pairs its
    /// cells with those labels. Cells that are not integers are skipped.
    fn table_rows(&self, document: &Html) -> Option<StatRows> {
        let table = self.stats_table(document)?;
        let mut table_rows = table.select(&self.selectors.table_row);
        let headers: Vec<String> = table_rows
            .next()?
            .select(&self.selectors.header_cell)
            .map(|cell| text_joined(cell, ""))
            .collect();

        let mut rows = StatRows::new();
        for row in table_rows {
            let cells: Vec<String> = row
                .select(&self.selectors.any_cell)
                .map(|cell| text_joined(cell, ""))
                .collect();
            if cells.len() < 2 || !STAT_NAMES.contains(&cells[0].as_str()) {
                continue;
            }
            for (header, cell) in headers.iter().zip(cells.iter()).skip(1) {
                let Ok(value) = cell.replace(',', "").parse::<i64>() else {
                    continue;
                };
                rows.entry(cells[0].clone())
                    .or_default()
                    .insert(header.clone(), value);
            }
        }

        if rows.is_empty() { None } else { Some(rows) }
    }

    /// `HP 1,000 2,000 3,000 4,000` style lines.
    fn text_rows(&self, lines: &[String]) -> Option<StatRows> {
        let mut rows = StatRows::new();
        for line in lines {
            let Some(caps) = self.patterns.stat_text_row.captures(line.trim()) else {
                continue;
            };
            let Some(stat) = caps.get(1).map(|value| value.as_str().to_string()) else {
                continue;
            };
            for (column, label) in TEXT_ROW_COLUMNS.iter().enumerate() {
                let Some(value) = caps
                    .get(column + 2)
                    .and_then(|value| value.as_str().replace(',', "").parse::<i64>().ok())
                else {
                    continue;
                };
                rows.entry(stat.clone())
                    .or_default()
                    .insert((*label).to_string(), value);
            }
        }

        if rows.is_empty() { None } else { Some(rows) }
    }
}

fn labeled_integer(pattern: &Regex, text: &str, label: &str) -> Result<Option<u32>> {
    let Some(digits) = pattern.captures(text).and_then(|caps| caps.get(1)) else {
        return Ok(None);
    };
    digits
        .as_str()
        .parse::<u32>()
        .map(Some)
        .with_context(|| format!("{label} value out of range: {}", digits.as_str()))
}
