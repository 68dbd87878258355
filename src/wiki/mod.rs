//! Wiki enrichment
//!
//! Character pages on the GameTora wiki carry what the Umapyoi API lacks:
//! card rarity, base stats, aptitude grades and skills. A [`WikiEnricher`]
//! fetches a page through its own [`Transport`] and turns it into an
//! [`Enrichment`]. Enrichment is best effort: every failure is logged and
//! yields whatever was recovered, possibly nothing.

mod infobox;
mod next_data;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::{CharacterRecord, Enrichment};
use crate::transport::Transport;

/// Above this many fields the embedded JSON counts as complete and the
/// infobox markup is only read for prose
const STRUCTURED_FIELD_THRESHOLD: usize = 10;

/// Pages with fewer recovered fields are logged as thin
const LIMITED_FIELD_COUNT: usize = 3;

/// Scrapes wiki character pages
#[derive(Clone)]
pub struct WikiEnricher {
    transport: Arc<dyn Transport>,
}

impl WikiEnricher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Page path for a game id; four-digit base ids get "01" appended to
    /// land on the default playable card
    pub fn page_path_for_id(id: u32) -> String {
        let mut page = id.to_string();
        if page.len() == 4 {
            page.push_str("01");
        }
        format!("/characters/{page}")
    }

    /// Page path for an English name, e.g. "Tosen Jordan" -> "tosen-jordan"
    pub fn page_path_for_name(name: &str) -> String {
        let slug = name
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect::<String>();
        format!("/characters/{slug}")
    }

    pub async fn enrich_by_id(&self, id: u32) -> Enrichment {
        self.scrape(&Self::page_path_for_id(id), &format!("id {id}"))
            .await
    }

    pub async fn enrich_by_name(&self, name: &str) -> Enrichment {
        if name.trim().is_empty() {
            return Enrichment::default();
        }
        self.scrape(&Self::page_path_for_name(name), &format!("name {name:?}"))
            .await
    }

    /// Enriches by game id, or by English name when the record has no id
    pub async fn enrich_record(&self, record: &CharacterRecord) -> Enrichment {
        if record.game_id > 0 {
            self.enrich_by_id(record.game_id).await
        } else {
            self.enrich_by_name(record.english_name()).await
        }
    }

    async fn scrape(&self, path: &str, identifier: &str) -> Enrichment {
        info!(%identifier, %path, "Scraping wiki page");

        let html = match self.transport.get(path).await {
            Ok(html) => html,
            Err(err) => {
                warn!(%identifier, error = %err, "Wiki scrape failed");
                return Enrichment::default();
            }
        };

        let enrichment = parse_page(&html);
        let fields = enrichment.field_count();
        if fields >= LIMITED_FIELD_COUNT {
            info!(%identifier, fields, "Scraped wiki page");
        } else {
            warn!(%identifier, fields, "Limited data extracted from wiki page");
        }
        enrichment
    }
}

/// Builds an enrichment from a character page
///
/// The embedded `__NEXT_DATA__` JSON is tried first. When it is missing or
/// incomplete the infobox markup fills the gaps; skills, biography and
/// relationships always come from the markup.
pub fn parse_page(html: &str) -> Enrichment {
    let mut enrichment = next_data::extract(html).unwrap_or_default();
    let structured_complete = enrichment.field_count() > STRUCTURED_FIELD_THRESHOLD;
    debug!(
        fields = enrichment.field_count(),
        structured_complete, "Read embedded page data"
    );

    enrichment.fill_from(infobox::extract(html, !structured_complete));
    enrichment
}
