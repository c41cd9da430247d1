use super::normalize::condense_whitespace;

pub const LEADER_SKILL: &str = "Leader Skill";
pub const SUPER_ATTACK: &str = "Super Attack";
pub const ULTRA_SUPER_ATTACK: &str = "Ultra Super Attack";
pub const PASSIVE_SKILL: &str = "Passive Skill";
pub const ACTIVE_SKILL: &str = "Active Skill";
pub const ACTIVATION_CONDITIONS: &str = "Activation Condition(s)";
pub const TRANSFORMATION_CONDITIONS: &str = "Transformation Condition(s)";
pub const LINK_SKILLS: &str = "Link Skills";
pub const CATEGORIES: &str = "Categories";
pub const STATS: &str = "Stats";

pub const SECTION_HEADERS: [&str; 10] = [
    LEADER_SKILL,
    SUPER_ATTACK,
    ULTRA_SUPER_ATTACK,
    PASSIVE_SKILL,
    ACTIVE_SKILL,
    ACTIVATION_CONDITIONS,
    TRANSFORMATION_CONDITIONS,
    LINK_SKILLS,
    CATEGORIES,
    STATS,
];

pub fn is_section_header(line: &str) -> bool {
    SECTION_HEADERS.contains(&line)
}

/// Header-delimited runs of page text, in page order.
#[derive(Debug, Default)]
pub struct Sections {
    entries: Vec<(&'static str, Vec<String>)>,
}

impl Sections {
    /// Content of the last section with this header, if the header occurs.
    pub fn get(&self, header: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| *name == header)
            .map(|(_, lines)| lines.as_slice())
    }

    /// Same as `get`, but an empty section counts as missing.
    pub fn non_empty(&self, header: &str) -> Option<&[String]> {
        self.get(header).filter(|lines| !lines.is_empty())
    }

    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

pub fn segment_sections(text: &str) -> Sections {
    let lines: Vec<String> = text.lines().map(condense_whitespace).collect();

    let starts: Vec<(usize, &'static str)> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            SECTION_HEADERS
                .iter()
                .find(|header| **header == line.as_str())
                .map(|header| (idx, *header))
        })
        .collect();

    let mut entries = Vec::with_capacity(starts.len());
    for (position, (start, header)) in starts.iter().enumerate() {
        let end = starts
            .get(position + 1)
            .map(|(next, _)| *next)
            .unwrap_or(lines.len());
        let content = lines[start + 1..end]
            .iter()
            .filter(|line| !line.is_empty())
            .cloned()
            .collect();
        entries.push((*header, content));
    }

    Sections { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "Goku\nLeader Skill\n  ATK   +50% \n\nSuper Attack\nKamehameha\nRaises ATK\nStats\nHP 1 2 3 4";

    #[test]
    fn missing_header_yields_absent_section() {
        let sections = segment_sections(PAGE);
        assert!(sections.get(ACTIVE_SKILL).is_none());
        assert!(sections.get(LINK_SKILLS).is_none());
    }

    #[test]
    fn sections_run_until_next_header_and_drop_blank_lines() {
        let sections = segment_sections(PAGE);
        assert_eq!(sections.get(LEADER_SKILL), Some(&["ATK +50%".to_string()][..]));
        assert_eq!(
            sections.get(SUPER_ATTACK).map(|lines| lines.len()),
            Some(2)
        );
        assert_eq!(sections.get(STATS), Some(&["HP 1 2 3 4".to_string()][..]));
    }

    #[test]
    fn repeated_headers_keep_separate_occurrences() {
        let sections = segment_sections("Categories\nSaiyans\nStats\nCategories\nPure Saiyans");
        assert_eq!(
            sections.headers().collect::<Vec<_>>(),
            vec![CATEGORIES, STATS, CATEGORIES]
        );
        assert_eq!(sections.get(CATEGORIES), Some(&["Pure Saiyans".to_string()][..]));
        assert!(sections.non_empty(STATS).is_none());
    }
}
