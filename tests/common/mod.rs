//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use umapyoi_cache::{CharacterService, RateLimit, ServiceConfig, Transport, TransportError};

/// Canned responses keyed by path, with a call log
///
/// Unknown paths answer 404 like the real API.
#[derive(Default)]
pub struct MockTransport {
    responses: HashMap<String, Result<String, TransportError>>,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, path: &str, body: impl Into<String>) -> Self {
        self.responses.insert(path.to_string(), Ok(body.into()));
        self
    }

    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.responses.insert(
            path.to_string(),
            Err(TransportError::Status {
                status,
                path: path.to_string(),
                message: "mocked".to_string(),
            }),
        );
        self
    }

    pub fn with_character(self, id: u32, name: &str, height: u32, strengths: &str) -> Self {
        let body = character_json(id, name, height, strengths);
        self.with_body(&format!("/character/{id}"), body)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.paths
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| requested.as_str() == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(path.to_string());

        self.responses.get(path).cloned().unwrap_or_else(|| {
            Err(TransportError::Status {
                status: 404,
                path: path.to_string(),
                message: "Not Found".to_string(),
            })
        })
    }
}

/// A `/character/{id}` body in the API's field naming
pub fn character_json(id: u32, name: &str, height: u32, strengths: &str) -> String {
    json!({
        "id": id + 3736,
        "game_id": id,
        "name_en": name,
        "name_jp": format!("{name} (JP)"),
        "profile": format!("{name} is a racer."),
        "height": height,
        "birth_month": 5,
        "birth_day": 2,
        "strengths": strengths,
        "thumb_img": format!("https://umapyoi.net/thumb/{id}.png")
    })
    .to_string()
}

/// Default config without the rate-limit pause
pub fn test_config() -> ServiceConfig {
    ServiceConfig::default().with_rate_limit(RateLimit::per_second(0))
}

/// Service over `api` with wiki enrichment disabled
pub fn service(api: &Arc<MockTransport>) -> CharacterService {
    CharacterService::with_transports(api.clone(), None, test_config())
}

/// Service over `api` that enriches through `wiki`
pub fn enriched_service(api: &Arc<MockTransport>, wiki: &Arc<MockTransport>) -> CharacterService {
    CharacterService::with_transports(api.clone(), Some(wiki.clone()), test_config())
}

/// The three popular characters the filter tests rely on
pub fn popular_api() -> MockTransport {
    MockTransport::new()
        .with_character(1001, "Special Week", 158, "Eating lots")
        .with_character(1002, "Silence Suzuka", 161, "Fast from the gate")
        .with_character(1003, "Tokai Teio", 150, "Brave heart")
        .with_character(1200, "Outside Seed", 156, "Fast and smart")
}
