pub mod database;

use std::env;
use std::time::Duration;
use anyhow::Result;

pub use database::DatabaseConfig;

const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com";
const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com";
const DEFAULT_GA_API_URL: &str = "https://www.google-analytics.com";
const DEFAULT_EMAIL_FROM: &str = "Nexxa Auto Parts <noreply@nexxaauto.com>";
const DEFAULT_OPERATOR_RECIPIENT: &str = "nexxaautoleads@gmail.com";
const DEFAULT_SUBMISSION_RATE_LIMIT: u32 = 10;

/// Outbound identity provider settings
#[derive(Debug, Clone)]
pub struct ClerkConfig {
    pub api_url: String,
    pub secret_key: Option<String>,
    pub timeout: Duration,
}

/// Transactional email provider settings
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from_address: String,
    pub operator_recipients: Vec<String>,
    pub timeout: Duration,
}

/// GA4 Measurement Protocol settings
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub api_url: String,
    pub measurement_id: Option<String>,
    pub api_secret: Option<String>,
    pub debug_mode: bool,
    pub timeout: Duration,
}

impl AnalyticsConfig {
    pub fn is_configured(&self) -> bool {
        matches!((&self.measurement_id, &self.api_secret), (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty())
    }
}

impl Default for ClerkConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_CLERK_API_URL.to_string(),
            secret_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_EMAIL_API_URL.to_string(),
            api_key: None,
            from_address: DEFAULT_EMAIL_FROM.to_string(),
            operator_recipients: vec![DEFAULT_OPERATOR_RECIPIENT.to_string()],
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GA_API_URL.to_string(),
            measurement_id: None,
            api_secret: None,
            debug_mode: false,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the service against the in-memory store
    pub database: Option<DatabaseConfig>,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub clerk: ClerkConfig,
    pub email: EmailConfig,
    pub analytics: AnalyticsConfig,
    /// Submissions per minute per client IP
    pub submission_rate_limit: u32,
}

/// Local development settings: no database, no outbound credentials
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            clerk: ClerkConfig::default(),
            email: EmailConfig::default(),
            analytics: AnalyticsConfig::default(),
            submission_rate_limit: DEFAULT_SUBMISSION_RATE_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_origins),
            clerk: ClerkConfig {
                api_url: env::var("CLERK_API_URL").unwrap_or(defaults.clerk.api_url),
                secret_key: non_empty_var("CLERK_SECRET_KEY"),
                ..defaults.clerk
            },
            email: EmailConfig {
                api_url: env::var("EMAIL_API_URL").unwrap_or(defaults.email.api_url),
                api_key: non_empty_var("RESEND_API_KEY"),
                from_address: env::var("EMAIL_FROM").unwrap_or(defaults.email.from_address),
                operator_recipients: env::var("CONTACT_EMAIL_RECIPIENTS")
                    .map(|v| split_list(&v))
                    .unwrap_or(defaults.email.operator_recipients),
                ..defaults.email
            },
            analytics: AnalyticsConfig {
                api_url: env::var("GA_API_URL").unwrap_or(defaults.analytics.api_url),
                measurement_id: non_empty_var("GOOGLE_ANALYTICS_ID"),
                api_secret: non_empty_var("GOOGLE_ANALYTICS_API_SECRET"),
                debug_mode: env::var("GA_DEBUG_MODE")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
                ..defaults.analytics
            },
            submission_rate_limit: env::var("SUBMISSION_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.submission_rate_limit),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
