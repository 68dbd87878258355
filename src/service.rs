//! Character service: the API client behind every command
//!
//! Combines the API [`Transport`], the shared [`LocalCache`] and the optional
//! [`WikiEnricher`]. Single lookups are cache-first. Bulk and search loops run
//! sequentially under the configured rate limit and tolerate per-id failures.
//! The async variants run on a bounded [`WorkerPool`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, LocalCache};
use crate::config::ServiceConfig;
use crate::data::{
    CharacterBirthday, CharacterImages, CharacterRecord, CharacterSummary, CharacterType,
    DomainCharacter, Enrichment,
};
use crate::pool::{PoolError, WorkerPool};
use crate::transport::{HttpTransport, Transport, TransportError};
use crate::wiki::WikiEnricher;

/// Search progress is logged every this many ids
const SEARCH_PROGRESS_INTERVAL: usize = 50;

/// Errors returned by [`CharacterService`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API has no character (or images) for this id
    #[error("Character {id} not found")]
    NotFound { id: u32 },

    /// Any other non-2xx status, or a network failure
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The body did not have the expected shape
    #[error("Unexpected response from {path}: {source}")]
    Deserialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache failure: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An async task could not run to completion
    #[error("Async task failed: {0}")]
    Pool(#[from] PoolError),
}

impl ApiError {
    /// Turns a 404 for `id` into [`ApiError::NotFound`]
    fn for_id(self, id: u32) -> Self {
        match self {
            ApiError::Transport(err) if err.is_not_found() => ApiError::NotFound { id },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Records gathered by a bulk fetch, search or filter
///
/// `requested` is the number of ids the operation set out to visit.
/// `interrupted` is set when the operation stopped early because the service
/// was interrupted; `records` then holds what was gathered up to that point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub records: Vec<CharacterRecord>,
    pub requested: usize,
    pub interrupted: bool,
}

impl FetchOutcome {
    fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Requested ids that produced no record
    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.records.len())
    }

    /// True when the operation ran to completion
    pub fn success(&self) -> bool {
        !self.interrupted
    }
}

/// Snapshot for status reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub cache_size: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Between 0.0 and 1.0
    pub cache_hit_rate: f64,
    pub pool_active: bool,
    pub pool_workers: usize,
    /// Async lookups submitted and not yet finished
    pub pool_in_flight: usize,
    pub max_requests_per_second: u32,
}

fn character_key(id: u32) -> String {
    format!("character_{id}")
}

fn images_key(id: u32) -> String {
    format!("character_images_{id}")
}

fn enrichment_key(id: u32) -> String {
    format!("wiki_{id}")
}

const BIRTHDAYS_KEY: &str = "current_birthdays";
const LIST_KEY: &str = "character_list";
const IDS_KEY: &str = "character_ids";

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Deserialization {
        path: path.to_string(),
        source,
    })
}

/// Whether a strengths blurb fits a type filter label
///
/// Known labels use their keyword list; anything else is a plain substring.
fn strengths_match(strengths: &str, label: &str) -> bool {
    let strengths = strengths.to_lowercase();
    match CharacterType::from_label(label) {
        Some(kind) => kind
            .strength_keywords()
            .iter()
            .any(|keyword| strengths.contains(keyword)),
        None => strengths.contains(&label.trim().to_lowercase()),
    }
}

/// Cheap to clone; clones share the cache, transports, pool and interrupt signal
#[derive(Clone)]
pub struct CharacterService {
    api: Arc<dyn Transport>,
    wiki: Option<WikiEnricher>,
    cache: Arc<LocalCache>,
    config: Arc<ServiceConfig>,
    pool: WorkerPool,
    interrupt: CancellationToken,
}

impl CharacterService {
    /// Builds HTTP transports for the API and the wiki from `config`
    pub fn new(config: ServiceConfig) -> Result<Self, ApiError> {
        let api = Arc::new(HttpTransport::new(&config.api)?);
        let wiki = Arc::new(HttpTransport::new(&config.wiki)?);
        Ok(Self::with_transports(api, Some(wiki), config))
    }

    /// Uses the given transports; without a wiki transport enrichment is off
    pub fn with_transports(
        api: Arc<dyn Transport>,
        wiki: Option<Arc<dyn Transport>>,
        config: ServiceConfig,
    ) -> Self {
        let wiki = wiki
            .filter(|_| config.enrichment_enabled)
            .map(WikiEnricher::new);

        info!(
            enrichment = wiki.is_some(),
            workers = config.worker_count,
            max_rps = config.rate_limit.max_requests_per_second,
            "CharacterService initialized"
        );

        Self {
            api,
            wiki,
            cache: Arc::new(LocalCache::new(config.ttls.default)),
            pool: WorkerPool::new(config.worker_count),
            config: Arc::new(config),
            interrupt: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Token that interrupts bulk and search loops when cancelled
    ///
    /// Once cancelled it stays cancelled: later loops stop before their first
    /// request and report `interrupted`.
    pub fn interrupt_handle(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    pub fn interrupt(&self) {
        self.interrupt.cancel();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_cancelled()
    }

    /// Returns the cached value for `key`, or fetches, decodes and caches `path`
    async fn fetch_cached<T>(&self, key: &str, path: &str, ttl: Duration) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(value) = self.cached(key) {
            return Ok(value);
        }

        let body = self.api.get(path).await?;
        let value: T = decode(path, &body)?;
        self.cache.put_with_ttl(key, &value, ttl)?;
        Ok(value)
    }

    /// Counted cache lookup; an unreadable entry is treated as a miss
    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.cache.has(key) {
            return None;
        }
        match self.cache.get(key) {
            Ok(value) => {
                debug!(%key, "Cache hit");
                Some(value)
            }
            Err(err) => {
                warn!(%key, error = %err, "Ignoring unusable cache entry");
                None
            }
        }
    }

    /// Fetches one character, cache first
    ///
    /// On a miss the record is fetched from `/character/{id}`, the wiki page is
    /// scraped (best effort, cached separately) and the record is cached for
    /// the character TTL.
    ///
    /// # Returns
    /// * `Err(ApiError::NotFound)` if the API answers 404
    /// * `Err(ApiError::Transport)` for any other failed request
    /// * `Err(ApiError::Deserialization)` if the body is not a character
    pub async fn get_by_id(&self, id: u32) -> Result<CharacterRecord, ApiError> {
        let key = character_key(id);
        if let Some(record) = self.cached(&key) {
            return Ok(record);
        }

        let path = format!("/character/{id}");
        info!(id, "Fetching character");
        let body = self
            .api
            .get(&path)
            .await
            .map_err(|err| ApiError::from(err).for_id(id))?;
        let record: CharacterRecord = decode(&path, &body)?;

        self.enrichment_for(id, &record).await;

        self.cache
            .put_with_ttl(&key, &record, self.config.ttls.character)?;
        debug!(id, name = record.english_name(), "Cached character");
        Ok(record)
    }

    /// Wiki data for `id`, from the cache or a fresh scrape
    ///
    /// Empty when enrichment is disabled or the scrape recovered nothing. Only
    /// non-empty results are cached.
    async fn enrichment_for(&self, id: u32, record: &CharacterRecord) -> Enrichment {
        let Some(wiki) = &self.wiki else {
            return Enrichment::default();
        };

        let key = enrichment_key(id);
        if let Some(enrichment) = self.cached(&key) {
            return enrichment;
        }

        let enrichment = wiki.enrich_record(record).await;
        if !enrichment.is_empty() {
            if let Err(err) = self
                .cache
                .put_with_ttl(&key, &enrichment, self.config.ttls.character)
            {
                warn!(id, error = %err, "Could not cache wiki enrichment");
            }
        }
        enrichment
    }

    /// The record merged with its wiki enrichment
    pub async fn get_domain_by_id(&self, id: u32) -> Result<DomainCharacter, ApiError> {
        let record = self.get_by_id(id).await?;
        let enrichment = self.enrichment_for(id, &record).await;
        Ok(DomainCharacter::merge(&record, &enrichment))
    }

    /// Waits out the rate-limit delay; false when interrupted
    async fn pause(&self) -> bool {
        let delay = self.config.rate_limit.delay();
        if delay.is_zero() {
            return !self.interrupt.is_cancelled();
        }
        tokio::select! {
            _ = self.interrupt.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    /// True when the loop may issue request number `index`
    async fn may_continue(&self, index: usize) -> bool {
        if self.interrupt.is_cancelled() {
            return false;
        }
        index == 0 || self.pause().await
    }

    /// Fetches `ids` one at a time in ascending order, pausing between requests
    ///
    /// Every requested id yields one lookup, so a repeated id appears once per
    /// request (the repeats are cache hits). Ids that fail are logged and
    /// skipped; the batch as a whole never fails.
    pub async fn get_bulk(&self, ids: &[u32]) -> FetchOutcome {
        let mut ids = ids.to_vec();
        ids.sort_unstable();

        let mut outcome = FetchOutcome::new(ids.len());
        for (index, &id) in ids.iter().enumerate() {
            if !self.may_continue(index).await {
                outcome.interrupted = true;
                warn!(
                    fetched = outcome.count(),
                    requested = outcome.requested,
                    "Bulk fetch interrupted"
                );
                break;
            }

            match self.get_by_id(id).await {
                Ok(record) => outcome.records.push(record),
                Err(err) => warn!(id, error = %err, "Failed to fetch character; skipping"),
            }
        }

        info!(
            fetched = outcome.count(),
            requested = outcome.requested,
            "Bulk fetch finished"
        );
        outcome
    }

    /// Scans the search range for `term`
    ///
    /// The first exact match on the English or Japanese name ends the scan
    /// and is returned alone. Without one, every record gathered is checked for
    /// a partial match on either name or the profile. An interrupted scan
    /// returns the partial matches among the records gathered so far.
    pub async fn search_by_name(&self, term: &str) -> Result<FetchOutcome, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ApiError::InvalidArgument(
                "search term cannot be empty".to_string(),
            ));
        }

        let range = self.config.search_range.clone();
        let total = range.clone().count();
        info!(%term, from = range.start(), to = range.end(), "Searching characters");

        let mut outcome = FetchOutcome::new(total);
        let mut scanned = Vec::new();

        for (index, id) in range.enumerate() {
            if !self.may_continue(index).await {
                outcome.interrupted = true;
                warn!(checked = index, total, "Search interrupted");
                break;
            }

            match self.get_by_id(id).await {
                Ok(record) if record.matches_name_exactly(term) => {
                    info!(id, name = record.english_name(), "Exact match found");
                    outcome.records.push(record);
                    return Ok(outcome);
                }
                Ok(record) => scanned.push(record),
                Err(err) => debug!(id, error = %err, "Skipping id"),
            }

            if (index + 1) % SEARCH_PROGRESS_INTERVAL == 0 {
                info!(checked = index + 1, total, "Search progress");
            }
        }

        outcome.records = scanned
            .into_iter()
            .filter(|record| record.matches_search(term))
            .collect();
        info!(%term, matches = outcome.count(), "Search completed");
        Ok(outcome)
    }

    /// Artwork URLs for a character, cached for a week
    pub async fn get_images(&self, id: u32) -> Result<CharacterImages, ApiError> {
        self.fetch_cached(
            &images_key(id),
            &format!("/character/images/{id}"),
            self.config.ttls.images,
        )
        .await
        .map_err(|err| err.for_id(id))
    }

    /// Characters whose birthday is today, cached for an hour
    pub async fn get_current_birthdays(&self) -> Result<Vec<CharacterBirthday>, ApiError> {
        let birthdays: Vec<CharacterBirthday> = self
            .fetch_cached(
                BIRTHDAYS_KEY,
                "/character/currentbirthdays",
                self.config.ttls.birthdays,
            )
            .await?;
        info!(count = birthdays.len(), "Current birthdays");
        Ok(birthdays)
    }

    /// Every character's id and name
    pub async fn get_character_list(&self) -> Result<Vec<CharacterSummary>, ApiError> {
        self.fetch_cached(LIST_KEY, "/character/list", self.config.ttls.default)
            .await
    }

    /// Every character id the API knows
    pub async fn get_all_character_ids(&self) -> Result<Vec<u32>, ApiError> {
        self.fetch_cached(IDS_KEY, "/character", self.config.ttls.default)
            .await
    }

    /// Bulk fetch over the popular seed ids
    pub async fn get_popular(&self) -> FetchOutcome {
        let ids = self.config.popular_ids.clone();
        self.get_bulk(&ids).await
    }

    /// The popular characters merged with their enrichment, highest rarity first
    ///
    /// Characters of equal rarity keep their id order.
    pub async fn get_popular_ranked(&self) -> Vec<DomainCharacter> {
        let mut characters = Vec::new();
        for record in self.get_popular().await.records {
            let enrichment = self.enrichment_for(record.game_id, &record).await;
            characters.push(DomainCharacter::merge(&record, &enrichment));
        }
        characters.sort_by(DomainCharacter::cmp_by_rarity_desc);
        characters
    }

    /// Popular characters with a height in `min..=max` centimeters
    ///
    /// Only the popular seed set is considered, not the full search range.
    pub async fn get_by_height_range(
        &self,
        min: u32,
        max: u32,
    ) -> Result<Vec<CharacterRecord>, ApiError> {
        if min > max {
            return Err(ApiError::InvalidArgument(format!(
                "minimum height {min} is above maximum {max}"
            )));
        }

        let matches: Vec<_> = self
            .get_popular()
            .await
            .records
            .into_iter()
            .filter(|record| (min..=max).contains(&record.height))
            .collect();
        info!(min, max, count = matches.len(), "Height filter");
        Ok(matches)
    }

    /// Popular characters whose strengths blurb suggests `label`
    ///
    /// A keyword heuristic over free text, limited to the popular seed set.
    pub async fn get_by_type(&self, label: &str) -> Result<Vec<CharacterRecord>, ApiError> {
        if label.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "type cannot be empty".to_string(),
            ));
        }

        let matches: Vec<_> = self
            .get_popular()
            .await
            .records
            .into_iter()
            .filter(|record| {
                record
                    .strengths
                    .as_deref()
                    .is_some_and(|strengths| strengths_match(strengths, label))
            })
            .collect();
        info!(%label, count = matches.len(), "Type filter");
        Ok(matches)
    }

    /// Submits `get_by_id` to the worker pool
    ///
    /// The request starts right away; the returned future resolves with its
    /// result, or with [`ApiError::Pool`] if the pool is shut down or cancels it.
    pub fn get_by_id_async(
        &self,
        id: u32,
    ) -> impl Future<Output = Result<CharacterRecord, ApiError>> + Send + 'static {
        let service = self.clone();
        let submitted = self.pool.spawn(async move { service.get_by_id(id).await });

        async move {
            let handle = submitted?;
            match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(err)) => Err(err.into()),
                Err(err) => Err(PoolError::Join(err.to_string()).into()),
            }
        }
    }

    /// One pool task per id; failed ids are dropped, order is not guaranteed
    pub async fn get_bulk_async(&self, ids: &[u32]) -> Vec<CharacterRecord> {
        let tasks: Vec<_> = ids.iter().map(|&id| self.get_by_id_async(id)).collect();
        let results = futures::future::join_all(tasks).await;

        results
            .into_iter()
            .zip(ids)
            .filter_map(|(result, id)| match result {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(id, error = %err, "Async fetch failed");
                    None
                }
            })
            .collect()
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            cache_size: self.cache.size(),
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
            cache_hit_rate: self.cache.hit_rate(),
            pool_active: self.pool.is_active(),
            pool_workers: self.pool.workers(),
            pool_in_flight: self.pool.in_flight(),
            max_requests_per_second: self.config.rate_limit.max_requests_per_second,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Cache cleared");
    }

    /// Uncached probe of the first popular character
    pub async fn test_connection(&self) -> bool {
        let id = self.config.popular_ids.first().copied().unwrap_or(1001);
        match self.api.get(&format!("/character/{id}")).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "Connection test failed");
                false
            }
        }
    }

    /// Stops the worker pool, waiting up to the configured grace period
    pub async fn shutdown(&self) {
        self.pool.shutdown(self.config.shutdown_grace).await;
        info!("CharacterService shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_outcome_counts() {
        let outcome = FetchOutcome {
            records: vec![CharacterRecord::default(); 2],
            requested: 3,
            interrupted: false,
        };

        assert_eq!(outcome.count(), 2);
        assert_eq!(outcome.missing(), 1);
        assert!(outcome.success());
    }

    #[test]
    fn test_not_found_mapping_only_applies_to_404() {
        let not_found = ApiError::from(TransportError::Status {
            status: 404,
            path: "/character/9999".to_string(),
            message: "Not Found".to_string(),
        })
        .for_id(9999);
        let server_error = ApiError::from(TransportError::Status {
            status: 503,
            path: "/character/1001".to_string(),
            message: "Service Unavailable".to_string(),
        })
        .for_id(1001);

        assert!(matches!(not_found, ApiError::NotFound { id: 9999 }));
        assert!(matches!(
            server_error,
            ApiError::Transport(TransportError::Status { status: 503, .. })
        ));
    }

    #[test]
    fn test_strengths_match_uses_type_keywords() {
        assert!(strengths_match("Incredibly fast on the straight", "speed"));
        assert!(strengths_match("Brave to the end", "guts"));
        assert!(strengths_match("Very smart", "Intelligence"));
        assert!(!strengths_match("Eating lots", "power"));
        assert!(strengths_match("Eating lots", "eating"));
    }

    #[test]
    fn test_unknown_labels_match_as_substrings() {
        assert!(strengths_match("Quick wit", "wit"));
        assert!(!strengths_match("Very smart", "wit"));
        assert!(strengths_match("Intelligent pacing", "intelligence"));
        assert!(!strengths_match("Fast from the gate", "runner"));
    }

    #[test]
    fn test_decode_error_names_the_path() {
        let err = decode::<CharacterRecord>("/character/1001", "<html>").unwrap_err();

        assert!(matches!(
            err,
            ApiError::Deserialization { ref path, .. } if path == "/character/1001"
        ));
    }
}
