/// GA4 Measurement Protocol forwarding
///
/// Events are sent server side so form submissions are counted even when the
/// browser blocks the gtag script. Nothing here can fail a request: every
/// outcome collapses to `true` (accepted) or `false` (skipped or failed).

use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::net::IpAddr;
use uuid::Uuid;

use crate::config::AnalyticsConfig;

pub const CLIENT_ID_HEADER: &str = "x-ga-client-id";

/// Keys never forwarded to Google
const STRIPPED_PARAMS: [&str; 2] = ["ip_address", "user_agent"];

#[derive(Debug, Serialize)]
struct MeasurementEvent {
    name: String,
    params: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct MeasurementPayload {
    client_id: String,
    events: Vec<MeasurementEvent>,
}

/// Render a digest as 8-4-4-4-12 hex
fn uuid_shaped(seed: &str) -> String {
    let hex = hex::encode(Sha256::digest(seed.as_bytes()));
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Stable GA client id for a request:
/// frontend-supplied header, else the signed-in user, else ip + user agent
pub fn client_id(headers: &HeaderMap, user_id: Option<Uuid>, ip: Option<IpAddr>, user_agent: &str) -> String {
    if let Some(supplied) = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return supplied.to_string();
    }

    if let Some(user_id) = user_id {
        return uuid_shaped(&format!("user_{}", user_id));
    }

    let ip = ip.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string());
    let user_agent = if user_agent.is_empty() { "unknown" } else { user_agent };
    uuid_shaped(&format!("{}:{}", ip, user_agent))
}

pub struct AnalyticsService {
    http_client: reqwest::Client,
    config: AnalyticsConfig,
}

impl AnalyticsService {
    pub fn new(config: &AnalyticsConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            config: config.clone(),
        }
    }

    fn prepare_params(&self, params: Map<String, Value>) -> Map<String, Value> {
        let mut cleaned: Map<String, Value> = params
            .into_iter()
            .filter(|(key, _)| !STRIPPED_PARAMS.contains(&key.as_str()))
            .collect();
        if self.config.debug_mode {
            cleaned.insert("debug_mode".to_string(), Value::from(1));
        }
        cleaned
    }

    pub async fn send_event(&self, client_id: &str, event_name: &str, params: Map<String, Value>) -> bool {
        let (Some(measurement_id), Some(api_secret)) = (
            self.config.measurement_id.as_deref(),
            self.config.api_secret.as_deref(),
        ) else {
            tracing::warn!("Google Analytics not configured - skipping event {}", event_name);
            return false;
        };

        let payload = MeasurementPayload {
            client_id: client_id.to_string(),
            events: vec![MeasurementEvent {
                name: event_name.to_string(),
                params: self.prepare_params(params),
            }],
        };

        let result = self
            .http_client
            .post(format!("{}/mp/collect", self.config.api_url.trim_end_matches('/')))
            .query(&[("measurement_id", measurement_id), ("api_secret", api_secret)])
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!("GA event sent: {}", event_name);
                true
            }
            Ok(response) => {
                tracing::error!("GA event {} failed: HTTP {}", event_name, response.status());
                false
            }
            Err(e) => {
                tracing::error!("GA event {} error: {}", event_name, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;
    use std::time::Duration;

    fn config(debug_mode: bool) -> AnalyticsConfig {
        AnalyticsConfig {
            api_url: "http://127.0.0.1:9".into(),
            measurement_id: None,
            api_secret: None,
            debug_mode,
            timeout: Duration::from_secs(1),
        }
    }

    fn is_uuid_shaped(value: &str) -> bool {
        let lengths: Vec<usize> = value.split('-').map(str::len).collect();
        lengths == vec![8, 4, 4, 4, 12] && value.chars().all(|c| c == '-' || c.is_ascii_hexdigit())
    }

    #[test]
    fn test_client_id_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, HeaderValue::from_static("1234.5678"));

        assert_eq!(client_id(&headers, Some(Uuid::new_v4()), None, "ua"), "1234.5678");
    }

    #[test]
    fn test_client_id_for_user_is_stable() {
        let user = Uuid::new_v4();
        let first = client_id(&HeaderMap::new(), Some(user), None, "ua-1");
        let second = client_id(&HeaderMap::new(), Some(user), "10.0.0.1".parse().ok(), "ua-2");

        assert_eq!(first, second);
        assert!(is_uuid_shaped(&first));
    }

    #[test]
    fn test_client_id_from_ip_and_agent() {
        let ip = "203.0.113.5".parse().ok();
        let a = client_id(&HeaderMap::new(), None, ip, "Mozilla/5.0");
        let b = client_id(&HeaderMap::new(), None, ip, "curl/8.0");

        assert_ne!(a, b);
        assert!(is_uuid_shaped(&a));
    }

    #[test]
    fn test_params_strip_request_metadata() {
        let service = AnalyticsService::new(&config(true));
        let params = json!({ "form_type": "contact", "ip_address": "1.2.3.4", "user_agent": "x" });

        let cleaned = service.prepare_params(params.as_object().unwrap().clone());

        assert_eq!(cleaned.get("form_type"), Some(&json!("contact")));
        assert!(!cleaned.contains_key("ip_address"));
        assert!(!cleaned.contains_key("user_agent"));
        assert_eq!(cleaned.get("debug_mode"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_unconfigured_event_is_skipped() {
        let service = AnalyticsService::new(&config(false));
        assert!(!service.send_event("cid", "form_submit", Map::new()).await);
    }
}
