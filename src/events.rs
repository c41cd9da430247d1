use std::path::PathBuf;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuotaReached,
    PageLimitReached,
    PaginationExhausted,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuotaReached => "quota_reached",
            Self::PageLimitReached => "page_limit_reached",
            Self::PaginationExhausted => "pagination_exhausted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyIndexed,
    SeenThisRun,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyIndexed => "already_indexed",
            Self::SeenThisRun => "seen_this_run",
        }
    }
}

/// Progress notifications emitted by the crawl frontier.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    IndexPageOpened {
        url: String,
        page_number: usize,
    },
    CardLinksFound {
        url: String,
        count: usize,
    },
    CardSkipped {
        url: String,
        character_id: Option<String>,
        reason: SkipReason,
    },
    PageLost {
        url: String,
        error: String,
    },
    CardSaved {
        url: String,
        character_id: Option<String>,
        folder: PathBuf,
        degraded_fields: Vec<&'static str>,
    },
    RelatedCardsFound {
        url: String,
        ids: Vec<String>,
    },
    Finished {
        reason: StopReason,
        pages_processed: usize,
        new_records: usize,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: CrawlEvent);
}

/// Writes each event as a structured tracing record.
#[derive(Debug, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn emit(&mut self, event: CrawlEvent) {
        match event {
            CrawlEvent::IndexPageOpened { url, page_number } => {
                info!(url = %url, page = page_number, "opening index page");
            }
            CrawlEvent::CardLinksFound { url, count } => {
                info!(url = %url, count, "found card links");
            }
            CrawlEvent::CardSkipped {
                url,
                character_id,
                reason,
            } => {
                info!(
                    url = %url,
                    character_id = character_id.as_deref().unwrap_or("-"),
                    reason = reason.as_str(),
                    "skipping card"
                );
            }
            CrawlEvent::PageLost { url, error } => {
                warn!(url = %url, error = %error, "page lost");
            }
            CrawlEvent::CardSaved {
                url,
                character_id,
                folder,
                degraded_fields,
            } => {
                if !degraded_fields.is_empty() {
                    warn!(url = %url, fields = ?degraded_fields, "saved card with degraded fields");
                }
                info!(
                    url = %url,
                    character_id = character_id.as_deref().unwrap_or("-"),
                    folder = %folder.display(),
                    "saved card"
                );
            }
            CrawlEvent::RelatedCardsFound { url, ids } => {
                info!(url = %url, count = ids.len(), ids = ?ids, "found related cards");
            }
            CrawlEvent::Finished {
                reason,
                pages_processed,
                new_records,
            } => {
                info!(
                    reason = reason.as_str(),
                    pages_processed, new_records, "crawl finished"
                );
            }
        }
    }
}

#[cfg(test)]
impl EventSink for Vec<CrawlEvent> {
    fn emit(&mut self, event: CrawlEvent) {
        self.push(event);
    }
}
