use anyhow::Result;
use regex::Regex;

use super::CardParser;
use super::normalize::{condense_whitespace, dedup_sentences, distinct_lines, non_empty};
use super::segment::{
    ACTIVATION_CONDITIONS, ACTIVE_SKILL, LEADER_SKILL, LINK_SKILLS, SECTION_HEADERS, SUPER_ATTACK,
    Sections, ULTRA_SUPER_ATTACK, is_section_header,
};
use super::strategy::{Strategy, first_present};
use crate::model::{ActiveSkill, AttackSkill, ReleaseInfo};

impl CardParser {
    pub(super) fn leader_skill(&self, sections: &Sections) -> Result<Option<String>> {
        let Some(first) = sections.non_empty(LEADER_SKILL).and_then(|lines| lines.first()) else {
            return Ok(None);
        };
        let text = dedup_sentences(&condense_whitespace(first));
        let collapsed = collapse_repeated_match(&self.patterns.exploding_rage, &text);
        Ok(non_empty(condense_whitespace(&collapsed)))
    }

    pub(super) fn super_attack(&self, sections: &Sections, page_text: &str) -> Result<AttackSkill> {
        self.attack_skill(
            "super_attack",
            sections,
            SUPER_ATTACK,
            &self.patterns.super_attack_run,
            page_text,
        )
    }

    pub(super) fn ultra_super_attack(
        &self,
        sections: &Sections,
        page_text: &str,
    ) -> Result<AttackSkill> {
        self.attack_skill(
            "ultra_super_attack",
            sections,
            ULTRA_SUPER_ATTACK,
            &self.patterns.ultra_super_attack_run,
            page_text,
        )
    }

    fn attack_skill(
        &self,
        field: &'static str,
        sections: &Sections,
        header: &str,
        text_run: &Regex,
        page_text: &str,
    ) -> Result<AttackSkill> {
        let found = first_present(
            field,
            vec![
                Strategy::new("section", || {
                    Ok(sections
                        .non_empty(header)
                        .and_then(|lines| self.attack_from_lines(lines)))
                }),
                Strategy::new("text_run", || {
                    let Some(block) = text_run.captures(page_text).and_then(|caps| caps.get(1))
                    else {
                        return Ok(None);
                    };
                    let lines: Vec<&str> = block
                        .as_str()
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .collect();
                    Ok(self.attack_from_lines(lines.as_slice()))
                }),
            ],
        )?;
        Ok(found.unwrap_or_default())
    }

    fn attack_from_lines<S: AsRef<str>>(&self, lines: &[S]) -> Option<AttackSkill> {
        let (first, rest) = lines.split_first()?;
        let name = non_empty(condense_whitespace(first.as_ref()));

        let kept: Vec<&str> = rest
            .iter()
            .map(|line| line.as_ref().trim())
            .filter(|line| !line.is_empty())
            .filter(|line| !self.patterns.bare_percentage.is_match(line))
            .filter(|line| !self.patterns.super_attack_level_token.is_match(line))
            .collect();
        let joined = kept.join("; ");
        let spaced = self.patterns.semicolon_spacing.replace_all(&joined, "; ");
        let split = self
            .patterns
            .raises_then_causes
            .replace_all(&spaced, " Raises ATK & DEF; Causes");
        let effect = non_empty(condense_whitespace(&split));

        if name.is_none() && effect.is_none() {
            return None;
        }
        Some(AttackSkill { name, effect })
    }

    pub(super) fn active_skill(&self, sections: &Sections) -> Result<ActiveSkill> {
        let Some((first, rest)) = sections
            .non_empty(ACTIVE_SKILL)
            .and_then(|lines| lines.split_first())
        else {
            return Ok(ActiveSkill::default());
        };

        let body: Vec<String> = rest
            .iter()
            .take_while(|line| !is_section_header(line) && !line.eq_ignore_ascii_case(LINK_SKILLS))
            .map(|line| condense_whitespace(line))
            .filter(|line| !line.is_empty())
            .collect();

        Ok(ActiveSkill {
            name: non_empty(condense_whitespace(first)),
            effect: non_empty(condense_whitespace(&body.join("; "))),
            activation_conditions: None,
        })
    }

    pub(super) fn activation_conditions(&self, sections: &Sections) -> Result<Option<String>> {
        let Some(lines) = sections.non_empty(ACTIVATION_CONDITIONS) else {
            return Ok(None);
        };
        let mut text = condense_whitespace(&lines.join(" "));
        for header in SECTION_HEADERS {
            text = text.replace(header, "");
        }
        Ok(non_empty(condense_whitespace(&text)))
    }

    pub(super) fn link_skills(&self, sections: &Sections) -> Result<Vec<String>> {
        Ok(sections
            .get(LINK_SKILLS)
            .map(distinct_lines)
            .unwrap_or_default())
    }

    pub(super) fn release(&self, page_text: &str) -> Result<ReleaseInfo> {
        let Some(caps) = self.patterns.release.captures(page_text) else {
            return Ok(ReleaseInfo::default());
        };
        let date = format!(
            "{} {}",
            caps.get(1).map_or("", |value| value.as_str()),
            caps.get(2).map_or("", |value| value.as_str())
        );
        Ok(ReleaseInfo {
            release_date: non_empty(condense_whitespace(&date)),
            timezone: caps
                .get(3)
                .map(|value| value.as_str().trim().to_string())
                .and_then(non_empty),
        })
    }
}

/// Replaces `X X` with `X` for every match `X` of `pattern` that is
/// immediately repeated (whitespace allowed between the copies).
fn collapse_repeated_match(pattern: &Regex, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(found) = pattern.find_at(text, cursor) {
        out.push_str(&text[cursor..found.end()]);
        let rest = &text[found.end()..];
        let after_gap = rest.trim_start();
        cursor = if after_gap.starts_with(found.as_str()) {
            found.end() + (rest.len() - after_gap.len()) + found.as_str().len()
        } else {
            found.end()
        };
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_phrase_collapses_once_per_pair() {
        let pattern = Regex::new(r"ab\d").expect("regex");
        assert_eq!(collapse_repeated_match(&pattern, "x ab1 ab1 y ab2ab3"), "x ab1 y ab2ab3");
    }
}
