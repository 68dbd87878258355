//! HttpTransport against a local mock server

use httpmock::MockServer;

use umapyoi_cache::{
    ApiError, CharacterService, HttpTransport, RateLimit, ServiceConfig, Transport,
    TransportConfig, TransportError,
};

#[tokio::test]
async fn test_sends_api_headers_and_returns_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/api/v1/character/1001")
                .header("user-agent", "Project-Sephirah/1.0")
                .header("accept", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"game_id": 1001}"#);
        })
        .await;

    let transport = HttpTransport::new(&TransportConfig::api(server.url("/api/v1")))
        .expect("client should build");
    let body = transport.get("/character/1001").await.expect("request");

    assert_eq!(body, r#"{"game_id": 1001}"#);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/character/9999");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/character/1001");
            then.status(500).body("boom");
        })
        .await;

    let transport =
        HttpTransport::new(&TransportConfig::api(server.base_url())).expect("client");

    let missing = transport.get("/character/9999").await.unwrap_err();
    let failed = transport.get("/character/1001").await.unwrap_err();

    assert!(missing.is_not_found());
    assert_eq!(failed.status(), Some(500));
    assert!(!failed.is_not_found());
}

#[tokio::test]
async fn test_refused_connection_is_a_network_error() {
    let transport =
        HttpTransport::new(&TransportConfig::api("http://127.0.0.1:1")).expect("client");

    let err = transport.get("/character/1001").await.unwrap_err();

    assert!(matches!(err, TransportError::Network { .. }), "got {err:?}");
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_service_end_to_end_over_http() {
    let server = MockServer::start_async().await;
    let character = server
        .mock_async(|when, then| {
            when.method("GET").path("/character/1002");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    r#"{"id": 3738, "game_id": 1002, "name_en": "Silence Suzuka",
                        "height": 161, "strengths": "Fast from the gate"}"#,
                );
        })
        .await;

    let config = ServiceConfig {
        enrichment_enabled: false,
        ..ServiceConfig::default()
    }
    .with_api_base_url(server.base_url())
    .with_rate_limit(RateLimit::per_second(0));
    let service = CharacterService::new(config).expect("service");

    let record = service.get_by_id(1002).await.expect("fetch");
    service.get_by_id(1002).await.expect("cached fetch");
    let missing = service.get_by_id(1003).await.unwrap_err();

    assert_eq!(record.english_name(), "Silence Suzuka");
    assert_eq!(record.height, 161);
    assert!(matches!(missing, ApiError::NotFound { id: 1003 }));
    character.assert_async().await;
    service.shutdown().await;
}
