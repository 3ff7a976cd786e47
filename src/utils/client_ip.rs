use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, Extensions, HeaderMap},
};

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const MAX_USER_AGENT_LENGTH: usize = 500;

/// Request facts stored alongside every inquiry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub ip_address: Option<IpAddr>,
    pub user_agent: String,
}

impl RequestMetadata {
    pub fn from_parts(headers: &HeaderMap, extensions: &Extensions) -> Self {
        Self {
            ip_address: client_ip(headers, peer_addr(extensions)),
            user_agent: user_agent(headers),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(&parts.headers, &parts.extensions))
    }
}

pub fn peer_addr(extensions: &Extensions) -> Option<IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// First `X-Forwarded-For` hop when it parses, otherwise the socket peer
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .or(peer)
}

/// User agent capped at 500 characters
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .chars()
        .take(MAX_USER_AGENT_LENGTH)
        .collect()
}
