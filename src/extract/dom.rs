use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Node, Selector};

const HIDDEN_TEXT_PARENTS: [&str; 4] = ["script", "style", "noscript", "template"];

pub fn compile_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("failed to compile selector `{css}`: {err}"))
}

/// Visible text of the page, one trimmed text node per line.
pub fn flatten_text(document: &Html) -> String {
    let mut lines = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| HIDDEN_TEXT_PARENTS.contains(&parent.value().name()));
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }
    lines.join("\n")
}

/// Trimmed, non-empty text fragments joined with `separator`.
pub fn text_joined(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn raw_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub fn is_tag(element: ElementRef<'_>, tag: &str) -> bool {
    element.value().name() == tag
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|value| value == class)
}

/// Class tokens in attribute order. `Element::classes` yields them sorted.
pub fn class_list<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element
        .value()
        .attr("class")
        .unwrap_or("")
        .split_whitespace()
}

pub fn any_class(element: ElementRef<'_>, predicate: impl Fn(&str) -> bool) -> bool {
    element.value().classes().any(predicate)
}

/// True when `word` is a whole hyphen-separated piece of the class name, so
/// `row` matches `row` and `flex-row` but not `rows`.
pub fn class_has_word(class: &str, word: &str) -> bool {
    class
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .any(|piece| piece == word)
}

pub fn descendants_depth_first<'a>(root: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants().skip(1).filter_map(ElementRef::wrap)
}

pub fn find_by_tag<'a>(root: ElementRef<'a>, tag: &str) -> impl Iterator<Item = ElementRef<'a>> {
    descendants_depth_first(root).filter(move |element| is_tag(*element, tag))
}

pub fn find_by_class<'a>(
    root: ElementRef<'a>,
    tag: &str,
    predicate: impl Fn(&str) -> bool,
) -> Option<ElementRef<'a>> {
    find_by_tag(root, tag).find(|element| any_class(*element, &predicate))
}

pub fn siblings_after<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

pub fn ancestor_where<'a>(
    element: ElementRef<'a>,
    predicate: impl Fn(ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| predicate(*ancestor))
}

/// Text of a direct text node, if `node` is one.
pub fn node_text(node: &Node) -> Option<&str> {
    node.as_text().map(|text| &**text)
}
