/// Clerk token verification
///
/// Clerk session tokens are decoded without checking the signature to find
/// the user id, and the user is then confirmed against the Clerk Backend API.
/// The API lookup is the actual proof of identity.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ClerkConfig;
use crate::models::user::ClerkIdentity;
use crate::utils::log_sanitizer::{redact_sensitive, sanitize_for_log};

#[derive(Debug, Error)]
pub enum ClerkError {
    #[error("Authentication is not configured")]
    NotConfigured,

    #[error("Invalid authorization header format. Use: Bearer <token>")]
    MalformedHeader,

    #[error("Authorization header must start with Bearer")]
    WrongScheme,

    #[error("Token has expired. Please sign in again.")]
    Expired,

    #[error("Invalid token: Missing user ID in token")]
    MissingSubject,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Authentication failed: Invalid Clerk credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Token verification failed: HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("Token verification timed out")]
    Timeout,

    #[error("Failed to verify token with Clerk")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid response from Clerk")]
    InvalidResponse(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    sub: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClerkEmailAddress {
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct ClerkPhoneNumber {
    phone_number: String,
}

/// The subset of the Clerk Backend API user object we read
#[derive(Debug, Deserialize)]
struct ClerkUser {
    id: String,
    #[serde(default)]
    email_addresses: Vec<ClerkEmailAddress>,
    first_name: Option<String>,
    last_name: Option<String>,
    profile_image_url: Option<String>,
    #[serde(default)]
    phone_numbers: Vec<ClerkPhoneNumber>,
    /// Milliseconds since the epoch
    updated_at: Option<i64>,
}

impl From<ClerkUser> for ClerkIdentity {
    fn from(user: ClerkUser) -> Self {
        let given_name = user.first_name.unwrap_or_default();
        let family_name = user.last_name.unwrap_or_default();
        Self {
            name: format!("{} {}", given_name, family_name).trim().to_string(),
            sub: user.id,
            email: user
                .email_addresses
                .into_iter()
                .next()
                .map(|e| e.email_address)
                .unwrap_or_default(),
            given_name,
            family_name,
            picture: user.profile_image_url.unwrap_or_default(),
            phone_number: user
                .phone_numbers
                .into_iter()
                .next()
                .map(|p| p.phone_number)
                .unwrap_or_default(),
            updated_at: user.updated_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}

/// Split `Authorization: Bearer <token>`; scheme is case-insensitive
pub fn bearer_token(header_value: &str) -> Result<&str, ClerkError> {
    let mut parts = header_value.split_whitespace();
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ClerkError::MalformedHeader);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ClerkError::WrongScheme);
    }
    Ok(token)
}

/// Read `sub` without verifying the signature. An `exp` in the past still
/// fails here so stale sessions never reach the Clerk API.
pub fn subject_from_token(token: &str) -> Result<String, ClerkError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_aud = false;
    validation.leeway = 0;

    let data = decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ClerkError::Expired,
            _ => ClerkError::InvalidToken(e.to_string()),
        })?;

    let sub = data
        .claims
        .sub
        .filter(|sub| !sub.is_empty())
        .ok_or(ClerkError::MissingSubject)?;
    check_user_id(&sub)?;
    Ok(sub)
}

/// Clerk ids are `[A-Za-z0-9_]+`; anything else would escape the `/v1/users/` path
fn check_user_id(user_id: &str) -> Result<(), ClerkError> {
    if !user_id.is_empty() && user_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(ClerkError::InvalidToken("Malformed user ID".to_string()))
    }
}

pub struct ClerkService {
    http_client: reqwest::Client,
    api_url: String,
    secret_key: Option<String>,
}

impl ClerkService {
    pub fn new(config: &ClerkConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Token → verified Clerk identity
    pub async fn verify_token(&self, token: &str) -> Result<ClerkIdentity, ClerkError> {
        let user_id = subject_from_token(token)?;
        tracing::debug!("Verifying Clerk token for user {}", sanitize_for_log(&user_id));
        self.fetch_user(&user_id).await
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<ClerkIdentity, ClerkError> {
        let secret_key = self.secret_key.as_deref().ok_or(ClerkError::NotConfigured)?;
        check_user_id(user_id)?;

        let response = self
            .http_client
            .get(format!("{}/v1/users/{}", self.api_url, user_id))
            .bearer_auth(secret_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::error!("Clerk API request timed out");
                    ClerkError::Timeout
                } else {
                    tracing::error!("Clerk API request failed: {}", e);
                    ClerkError::Transport(e)
                }
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                tracing::error!("Clerk rejected the configured secret key {}", redact_sensitive(secret_key));
                return Err(ClerkError::InvalidCredentials);
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!("User {} not found in Clerk", sanitize_for_log(user_id));
                return Err(ClerkError::UserNotFound);
            }
            status => {
                tracing::error!("Clerk API returned status {}", status);
                return Err(ClerkError::UnexpectedStatus(status.as_u16()));
            }
        }

        let user: ClerkUser = response.json().await.map_err(|e| {
            tracing::error!("Unexpected Clerk user payload: {}", e);
            ClerkError::InvalidResponse(e)
        })?;

        Ok(user.into())
    }
}
