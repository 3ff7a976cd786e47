// Mock outbound providers for integration tests
// One throwaway axum server stands in for Clerk, the email API and GA4.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use nexxa_auto::config::{AnalyticsConfig, AppConfig, ClerkConfig, EmailConfig};
use nexxa_auto::repositories::InMemoryStore;
use nexxa_auto::{create_app, AppState};

pub const CLERK_SECRET: &str = "sk_test_mock";
pub const EMAIL_API_KEY: &str = "re_test_mock";
pub const OPERATOR_EMAIL: &str = "ops@nexxaauto.com";

// ============================================================================
// Mock State
// ============================================================================

#[derive(Debug, Default)]
pub struct MockProviderState {
    /// Clerk users keyed by id, in Backend API shape
    pub clerk_users: HashMap<String, Value>,
    pub email_fails: bool,
    pub sent_emails: Vec<Value>,
    pub ga_events: Vec<Value>,
}

pub type SharedState = Arc<RwLock<MockProviderState>>;

// ============================================================================
// Mock Endpoints
// ============================================================================

async fn clerk_get_user(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let expected = format!("Bearer {}", CLERK_SECRET);
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let state = state.read().await;
    state
        .clerk_users
        .get(&user_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn send_email(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut state = state.write().await;
    if state.email_fails {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    state.sent_emails.push(payload);
    Ok(Json(json!({ "id": Uuid::new_v4() })))
}

async fn ga_collect(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
    Json(payload): Json<Value>,
) -> StatusCode {
    state.write().await.ga_events.push(json!({
        "measurement_id": query.get("measurement_id"),
        "payload": payload,
    }));
    StatusCode::NO_CONTENT
}

pub fn create_mock_provider_server(state: SharedState) -> Router {
    Router::new()
        .route("/v1/users/:user_id", get(clerk_get_user))
        .route("/emails", post(send_email))
        .route("/mp/collect", post(ga_collect))
        .with_state(state)
}

pub async fn start_mock_providers() -> (String, SharedState) {
    let state = Arc::new(RwLock::new(MockProviderState::default()));
    let app = create_mock_provider_server(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (url, state)
}

// ============================================================================
// App Under Test
// ============================================================================

pub fn test_config(provider_url: &str) -> AppConfig {
    AppConfig {
        clerk: ClerkConfig {
            api_url: provider_url.to_string(),
            secret_key: Some(CLERK_SECRET.to_string()),
            ..Default::default()
        },
        email: EmailConfig {
            api_url: provider_url.to_string(),
            api_key: Some(EMAIL_API_KEY.to_string()),
            operator_recipients: vec![OPERATOR_EMAIL.to_string()],
            ..Default::default()
        },
        analytics: AnalyticsConfig {
            api_url: provider_url.to_string(),
            measurement_id: Some("G-TEST123".to_string()),
            api_secret: Some("ga-secret".to_string()),
            ..Default::default()
        },
        submission_rate_limit: 1000,
        ..Default::default()
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    pub providers: SharedState,
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let (provider_url, providers) = start_mock_providers().await;
    let mut config = test_config(&provider_url);
    configure(&mut config);

    let store = Arc::new(InMemoryStore::with_sample_catalog());
    let state = AppState::in_memory(config, store.clone());
    let server = TestServer::new(create_app(state)).unwrap();

    TestApp { server, store, providers }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

// ============================================================================
// Clerk Helpers
// ============================================================================

pub fn clerk_user(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "email_addresses": [{ "email_address": email }],
        "first_name": "Casey",
        "last_name": "Mechanic",
        "profile_image_url": "https://img.clerk.com/casey.png",
        "phone_numbers": [{ "phone_number": "+15551230000" }],
        "updated_at": 1_700_000_000_000i64
    })
}

/// Unsigned-looking session token; only `sub` and `exp` matter
pub fn session_token(sub: &str, expires_in_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + expires_in_secs;
    encode(
        &Header::default(),
        &json!({ "sub": sub, "exp": exp, "sid": "sess_test" }),
        &EncodingKey::from_secret(b"clerk-signs-with-rs256-in-production"),
    )
    .unwrap()
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
