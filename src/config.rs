//! Configuration for the character service
//!
//! Every externally meaningful setting (base URLs, timeouts, TTLs, rate limit)
//! is a plain struct with a `Default` impl, so callers override only what they need.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Base URL for the Umapyoi REST API
pub const DEFAULT_API_BASE_URL: &str = "https://umapyoi.net/api/v1";

/// Base URL for the GameTora wiki pages used for enrichment
pub const DEFAULT_WIKI_BASE_URL: &str = "https://gametora.com/umamusume";

const API_USER_AGENT: &str = "Project-Sephirah/1.0";
const WIKI_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Settings for one HTTP transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Prefix joined with every request path
    pub base_url: String,
    /// Sent as `User-Agent` on every request
    pub user_agent: String,
    /// Sent as `Accept` on every request
    pub accept: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl TransportConfig {
    /// JSON API transport settings (30s timeouts)
    pub fn api(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: API_USER_AGENT.to_string(),
            accept: "application/json".to_string(),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
        }
    }

    /// HTML wiki transport settings (browser user agent, 15s timeouts)
    pub fn wiki(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: WIKI_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml".to_string(),
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(15),
            write_timeout: Duration::from_secs(15),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::api(DEFAULT_API_BASE_URL)
    }
}

/// Time-to-live per endpoint family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Single character records and wiki enrichment (24 hours)
    pub character: Duration,
    /// Image URL sets (7 days)
    pub images: Duration,
    /// Today's birthdays (1 hour)
    pub birthdays: Duration,
    /// Everything else, including the character list (24 hours)
    pub default: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            character: HOUR * 24,
            images: HOUR * 24 * 7,
            birthdays: HOUR,
            default: HOUR * 24,
        }
    }
}

/// Request ceiling for sequential bulk and search loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Zero disables the pause between requests
    pub max_requests_per_second: u32,
}

impl RateLimit {
    pub fn per_second(max_requests_per_second: u32) -> Self {
        Self {
            max_requests_per_second,
        }
    }

    /// Fixed pause inserted between two consecutive requests
    pub fn delay(&self) -> Duration {
        match self.max_requests_per_second {
            0 => Duration::ZERO,
            n => Duration::from_millis(1000 / u64::from(n)),
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_second(10)
    }
}

/// Top-level configuration for [`crate::service::CharacterService`]
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api: TransportConfig,
    pub wiki: TransportConfig,
    pub ttls: CacheTtls,
    pub rate_limit: RateLimit,
    /// Candidate ids scanned by name search
    pub search_range: RangeInclusive<u32>,
    /// Seed set used by the height and type filters
    pub popular_ids: Vec<u32>,
    /// Concurrent tasks allowed in the async worker pool
    pub worker_count: usize,
    /// How long `shutdown` waits for in-flight tasks
    pub shutdown_grace: Duration,
    /// Whether `get_by_id` scrapes the wiki on a cache miss
    pub enrichment_enabled: bool,
}

impl ServiceConfig {
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    pub fn with_wiki_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.wiki.base_url = base_url.into();
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api: TransportConfig::api(DEFAULT_API_BASE_URL),
            wiki: TransportConfig::wiki(DEFAULT_WIKI_BASE_URL),
            ttls: CacheTtls::default(),
            rate_limit: RateLimit::default(),
            search_range: 1001..=1400,
            popular_ids: (1001..=1007).collect(),
            worker_count: 5,
            shutdown_grace: Duration::from_secs(5),
            enrichment_enabled: true,
        }
    }
}
