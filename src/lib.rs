//! Umapyoi character API client
//!
//! Cache-first lookups against the Umapyoi REST API, rate-limited bulk fetch
//! and name search, and best-effort enrichment from the GameTora wiki.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod pool;
pub mod service;
pub mod transport;
pub mod wiki;

pub use cache::{CacheError, LocalCache};
pub use config::{CacheTtls, RateLimit, ServiceConfig, TransportConfig};
pub use data::{CharacterRecord, DomainCharacter, Enrichment};
pub use service::{ApiError, CharacterService, FetchOutcome, ServiceStats};
pub use transport::{HttpTransport, Transport, TransportError};
