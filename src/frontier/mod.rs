use std::collections::{HashSet, VecDeque};
use std::thread;

use anyhow::{Context, Result};
use tracing::error;
use url::Url;

use crate::assemble::{AssembledCard, assemble};
use crate::config::CrawlConfig;
use crate::events::{CrawlEvent, EventSink, SkipReason, StopReason};
use crate::extract::{CardParser, character_id_from_url};
use crate::index_store::IndexStore;
use crate::model::IndexEntry;
use crate::output::RecordWriter;
use crate::render::{RenderedPage, Renderer};
use crate::util::{ensure_directory, now_utc_string};


pub const CARD_LINK_SELECTOR: &str =
    r#"div.row.d-flex.flex-wrap.justify-content-center a.col-auto[href^="/cards/"]"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierState {
    AtIndexPage {
        url: String,
    },
    HasCardQueue {
        index_url: String,
        queue: VecDeque<String>,
    },
    Done(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub reason: StopReason,
    pub pages_processed: usize,
    pub new_records: usize,
}

pub struct Frontier<R, E> {
    config: CrawlConfig,
    parser: CardParser,
    renderer: R,
    writer: RecordWriter,
    index: IndexStore,
    events: E,
    seen_ids: HashSet<String>,
    seen_urls: HashSet<String>,
    pages_processed: usize,
    new_records: usize,
}

impl<R: Renderer, E: EventSink> Frontier<R, E> {
    /// Fails only when the output folders cannot be created.
    pub fn new(
        config: CrawlConfig,
        renderer: R,
        writer: RecordWriter,
        index: IndexStore,
        events: E,
    ) -> Result<Self> {
        ensure_directory(&config.cards_root).context("failed to prepare card output root")?;
        ensure_directory(&config.assets_root).context("failed to prepare asset output root")?;

        Ok(Self {
            config,
            parser: CardParser::new()?,
            renderer,
            writer,
            index,
            events,
            seen_ids: HashSet::new(),
            seen_urls: HashSet::new(),
            pages_processed: 0,
            new_records: 0,
        })
    }

    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn run(&mut self) -> CrawlSummary {
        let start = FrontierState::AtIndexPage {
            url: self.config.index_url.clone(),
        };
        self.run_from(start)
    }

    /// Seeds the queue with one card URL; with a page limit of one this is
    /// the single-card debug mode.
    pub fn run_single(&mut self, card_url: &str) -> CrawlSummary {
        let start = FrontierState::HasCardQueue {
            index_url: card_url.to_string(),
            queue: VecDeque::from([card_url.to_string()]),
        };
        self.run_from(start)
    }

    pub fn run_from(&mut self, start: FrontierState) -> CrawlSummary {
        let mut state = start;
        loop {
            if let FrontierState::Done(reason) = state {
                self.events.emit(CrawlEvent::Finished {
                    reason,
                    pages_processed: self.pages_processed,
                    new_records: self.new_records,
                });
                return CrawlSummary {
                    reason,
                    pages_processed: self.pages_processed,
                    new_records: self.new_records,
                };
            }
            state = self.step(state);
        }
    }

    pub fn step(&mut self, state: FrontierState) -> FrontierState {
        match state {
            FrontierState::Done(reason) => FrontierState::Done(reason),
            FrontierState::AtIndexPage { url } => self.open_index_page(url),
            FrontierState::HasCardQueue {
                index_url,
                mut queue,
            } => {
                if self.quota_reached() {
                    return FrontierState::Done(StopReason::QuotaReached);
                }
                match queue.pop_front() {
                    Some(card_url) => {
                        self.visit_with_related(&card_url);
                        FrontierState::HasCardQueue { index_url, queue }
                    }
                    None => self.advance(&index_url),
                }
            }
        }
    }

    fn open_index_page(&mut self, url: String) -> FrontierState {
        if self.quota_reached() {
            return FrontierState::Done(StopReason::QuotaReached);
        }
        if self.pages_processed >= self.config.max_index_pages {
            return FrontierState::Done(StopReason::PageLimitReached);
        }

        self.events.emit(CrawlEvent::IndexPageOpened {
            url: url.clone(),
            page_number: self.pages_processed + 1,
        });

        let links = match self
            .renderer
            .render(&url)
            .and_then(|page| self.card_links(&page))
        {
            Ok(links) => links,
            Err(err) => {
                self.events.emit(CrawlEvent::PageLost {
                    url: url.clone(),
                    error: format!("{err:#}"),
                });
                return self.advance(&url);
            }
        };

        self.events.emit(CrawlEvent::CardLinksFound {
            url: url.clone(),
            count: links.len(),
        });
        if links.is_empty() {
            return self.advance(&url);
        }
        FrontierState::HasCardQueue {
            index_url: url,
            queue: links.into(),
        }
    }

    fn advance(&mut self, current: &str) -> FrontierState {
        self.pages_processed += 1;
        let next = next_index_url(current);
        if next == current {
            return FrontierState::Done(StopReason::PaginationExhausted);
        }
        FrontierState::AtIndexPage { url: next }
    }

    /// Absolute, distinct card URLs from an index page.
    fn card_links(&self, page: &RenderedPage) -> Result<Vec<String>> {
        let base = Url::parse(&self.config.base_url)
            .with_context(|| format!("invalid base url: {}", self.config.base_url))?;
        let hrefs = self
            .renderer
            .attribute_values(page, CARD_LINK_SELECTOR, "href")?;

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for href in hrefs {
            let href = href.trim();
            if !href.starts_with("/cards/") {
                continue;
            }
            let Ok(joined) = base.join(href) else {
                continue;
            };
            let joined = joined.to_string();
            if seen.insert(joined.clone()) {
                links.push(joined);
            }
        }
        Ok(links)
    }

    /// Visits a card, then walks its related cards depth-first.
    fn visit_with_related(&mut self, card_url: &str) {
        let Some(related) = self.visit_card(card_url) else {
            return;
        };
        if !self.config.follow_related {
            return;
        }

        let mut pending: Vec<String> = related.into_iter().rev().collect();
        while let Some(id) = pending.pop() {
            if self.quota_reached() {
                return;
            }
            let url = self.config.card_url(&id);
            if let Some(more) = self.visit_card(&url) {
                pending.extend(more.into_iter().rev());
            }
        }
    }

    /// Renders, extracts and saves one card. Returns its related card ids,
    /// or `None` when the card was skipped or its page was lost.
    fn visit_card(&mut self, url: &str) -> Option<Vec<String>> {
        let url_id = character_id_from_url(url);
        if let Some(reason) = self.skip_reason(url, url_id.as_deref()) {
            self.events.emit(CrawlEvent::CardSkipped {
                url: url.to_string(),
                character_id: url_id,
                reason,
            });
            return None;
        }
        self.seen_urls.insert(url.to_string());

        let page = match self.renderer.render(url) {
            Ok(page) => page,
            Err(err) => {
                self.events.emit(CrawlEvent::PageLost {
                    url: url.to_string(),
                    error: format!("{err:#}"),
                });
                self.pause();
                return None;
            }
        };

        let assembled = assemble(self.parser.extract(&page.html, url, &page.url));
        self.commit(url, &assembled, &page);
        self.pause();

        let related = assembled.related_card_ids;
        if !related.is_empty() {
            self.events.emit(CrawlEvent::RelatedCardsFound {
                url: url.to_string(),
                ids: related.clone(),
            });
        }
        Some(related)
    }

    fn commit(&mut self, url: &str, assembled: &AssembledCard, page: &RenderedPage) {
        let record = &assembled.record;
        if let Some(id) = record.character_id.as_deref() {
            if let Some(reason) = self.skip_reason("", Some(id)) {
                self.events.emit(CrawlEvent::CardSkipped {
                    url: url.to_string(),
                    character_id: Some(id.to_string()),
                    reason,
                });
                return;
            }
            self.seen_ids.insert(id.to_string());
        }

        let folder = match self.writer.write(assembled, page) {
            Ok(folder) => folder,
            Err(err) => {
                self.events.emit(CrawlEvent::PageLost {
                    url: url.to_string(),
                    error: format!("{err:#}"),
                });
                return;
            }
        };

        if let Some(id) = record.character_id.as_deref() {
            let entry = IndexEntry {
                url: url.to_string(),
                display_name: record.identity.display_name.clone(),
                display_name_with_type: record.identity.display_name_with_type.clone(),
                display_name_with_type_bracketed: record
                    .identity
                    .display_name_with_type_bracketed
                    .clone(),
                rarity: record.rarity,
                card_type: record.type_token_upper.clone(),
                folder: folder.display().to_string(),
                saved_at: now_utc_string(),
            };
            if let Err(err) = self.index.upsert(id, entry) {
                error!(
                    character_id = id,
                    path = %self.index.path().display(),
                    error = %err,
                    "failed to persist card index"
                );
            }
        }

        self.new_records += 1;
        self.events.emit(CrawlEvent::CardSaved {
            url: url.to_string(),
            character_id: record.character_id.clone(),
            folder,
            degraded_fields: assembled.degraded_fields.clone(),
        });
    }

    fn skip_reason(&self, url: &str, character_id: Option<&str>) -> Option<SkipReason> {
        if let Some(id) = character_id {
            if self.index.has(id) {
                return Some(SkipReason::AlreadyIndexed);
            }
            if self.seen_ids.contains(id) {
                return Some(SkipReason::SeenThisRun);
            }
        }
        if self.seen_urls.contains(url) {
            return Some(SkipReason::SeenThisRun);
        }
        None
    }

    fn quota_reached(&self) -> bool {
        self.new_records >= self.config.max_new_records
    }

    fn pause(&self) {
        if !self.config.card_delay.is_zero() {
            thread::sleep(self.config.card_delay);
        }
    }
}

/// Same URL with `page` incremented (or set to 2). An unparsable URL comes
/// back unchanged, which ends pagination.
pub fn next_index_url(current: &str) -> String {
    let Ok(mut url) = Url::parse(current) else {
        return current.to_string();
    };

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut page_set = false;
    for (key, value) in url.query_pairs().into_owned() {
        if key != "page" {
            pairs.push((key, value));
            continue;
        }
        if page_set {
            continue;
        }
        let next = value
            .trim()
            .parse::<u64>()
            .map(|page| page.saturating_add(1))
            .unwrap_or(2);
        pairs.push((key, next.to_string()));
        page_set = true;
    }
    if !page_set {
        pairs.push(("page".to_string(), "2".to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs.iter());
    url.to_string()
}
