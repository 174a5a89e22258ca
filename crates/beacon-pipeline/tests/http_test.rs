//! reqwest transports against an in-process axum server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use beacon_core::constants::VERSION;
use beacon_core::models::{Event, EventType};
use beacon_core::traits::{SiteConfigFetchError, SiteConfigSource};
use beacon_pipeline::{DeliveryEngine, DeliverySettings, HttpSiteConfigSource, HttpTransport, SiteConfigLoader};
use serde_json::{json, Map, Value};

struct Delivered {
    site: String,
    event: String,
    user_agent: String,
    body: Value,
}

type Received = Arc<Mutex<Vec<Delivered>>>;

async fn collect(
    State(received): State<Received>,
    Path((site, event)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let status = if event == "custom_reject" {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    };
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    received.lock().unwrap().push(Delivered {
        site,
        event,
        user_agent,
        body,
    });
    status
}

async fn site_config(Path(file): Path<String>) -> (StatusCode, String) {
    match file.as_str() {
        "fp-on.json" => (StatusCode::OK, r#"{"enable_fingerprint": true}"#.to_string()),
        "broken.json" => (StatusCode::OK, "not json".to_string()),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn serve() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/sites/:site/events/:event", post(collect))
        .route("/sites/:file", get(site_config))
        .with_state(received.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

fn engine(base: &str) -> DeliveryEngine {
    let transport = Arc::new(HttpTransport::new(Duration::from_secs(5)).unwrap());
    DeliveryEngine::new(
        transport,
        "site-1",
        DeliverySettings {
            api_base: base.to_string(),
            timeout: Duration::from_secs(5),
        },
    )
}

#[tokio::test]
async fn event_reaches_collector_with_wire_body() {
    let (base, received) = serve().await;
    let mut data = Map::new();
    data.insert("foo".into(), json!("bar"));
    let mut event = Event::new(EventType::Impression).with_data(data);
    event.enrich("browser_language", "en-GB");

    assert!(engine(&base).send(&event).await);

    let received = received.lock().unwrap();
    let Delivered {
        site,
        event: event_type,
        user_agent,
        body,
    } = &received[0];
    assert_eq!(site, "site-1");
    assert_eq!(event_type, "impression");
    assert_eq!(user_agent, &format!("beacon/{VERSION}"));
    assert_eq!(body["browser_language"], json!("en-GB"));
    let nested: Value = serde_json::from_str(body["arbitrary_data"].as_str().unwrap()).unwrap();
    assert_eq!(nested, json!({"foo": "bar"}));
    assert!(body.get("event_type").is_none());
    assert!(body.get("retry_count").is_none());
}

#[tokio::test]
async fn server_error_is_a_failed_send() {
    let (base, received) = serve().await;
    let event = Event::new(EventType::parse("reject").unwrap());
    assert!(!engine(&base).send(&event).await);
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_collector_is_a_failed_send() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    assert!(!engine(&format!("http://{addr}")).send(&Event::new(EventType::Click)).await);
}

#[tokio::test]
async fn site_config_source_and_loader() {
    let (base, _) = serve().await;
    let source = HttpSiteConfigSource::new(base.clone(), Duration::from_secs(5)).unwrap();
    assert_eq!(source.url_for("fp-on"), format!("{base}/sites/fp-on.json"));

    let body = source.fetch("fp-on").await.unwrap();
    assert!(body.contains("enable_fingerprint"));
    assert!(matches!(
        source.fetch("missing").await,
        Err(SiteConfigFetchError::Network(_))
    ));

    let loader = SiteConfigLoader::new(Arc::new(source), Duration::from_secs(5));
    let loaded = loader.load("fp-on").await;
    assert!(loaded.config.enable_fingerprint);
    assert!(!loaded.is_default());

    // Malformed body disables fingerprinting, a 404 counts as network failure.
    assert!(!loader.load("broken").await.config.enable_fingerprint);
    assert!(loader.load("missing").await.config.enable_fingerprint);
}
