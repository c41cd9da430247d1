use std::collections::HashSet;

use super::segment::is_section_header;

pub const CATEGORY_STOPWORDS: [&str; 10] = [
    "background",
    "icon",
    "rarity",
    "element",
    "eza",
    "undefined",
    "venatus",
    "show more",
    "links",
    "categories",
];

const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".webp"];

pub fn condense_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

/// Splits after `.`, `!` or `?` when followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut previous: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_whitespace() && matches!(previous, Some('.' | '!' | '?')) {
            sentences.push(&text[start..idx]);
            let mut end = idx + ch.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            start = end;
            previous = None;
            continue;
        }
        previous = Some(ch);
    }
    sentences.push(&text[start..]);
    sentences
}

pub fn dedup_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    split_sentences(text)
        .into_iter()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty() && seen.insert(*sentence))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Condensed, non-empty, first-occurrence-only lines.
pub fn distinct_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for line in lines {
        let condensed = condense_whitespace(line.as_ref());
        if !condensed.is_empty() && seen.insert(condensed.clone()) {
            out.push(condensed);
        }
    }
    out
}

pub fn filter_categories<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in tokens {
        let cleaned = token
            .as_ref()
            .trim()
            .trim_matches(|ch: char| matches!(ch, '•' | '·' | ' '));
        if is_category_noise(cleaned) {
            continue;
        }
        if seen.insert(cleaned.to_string()) {
            out.push(cleaned.to_string());
        }
    }
    out
}

fn is_category_noise(token: &str) -> bool {
    if token.is_empty() {
        return true;
    }
    let lowered = token.to_lowercase();
    if CATEGORY_STOPWORDS.contains(&lowered.as_str()) {
        return true;
    }
    if IMAGE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        return true;
    }
    if token
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch.is_whitespace() || ch == '%' || ch == ':')
    {
        return true;
    }
    if token.chars().all(|ch| !(ch.is_alphanumeric() || ch == '_')) {
        return true;
    }
    is_section_header(token) || token.contains("Links:") || token.contains("Show More")
}
