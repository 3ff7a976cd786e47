use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::middleware::error_handling::AppError;
use crate::models::user::{AuthenticatedUser, UserProfile};
use crate::services::clerk_service::{bearer_token, ClerkError};
use crate::state::AppState;

pub const CREDENTIALS_NOT_PROVIDED: &str = "Authentication credentials were not provided.";

impl From<ClerkError> for AppError {
    fn from(err: ClerkError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

fn authorization_header(request: &Request) -> Option<Result<String, ClerkError>> {
    request.headers().get(header::AUTHORIZATION).map(|value| {
        value
            .to_str()
            .map(str::to_string)
            .map_err(|_| ClerkError::MalformedHeader)
    })
}

/// Bearer header → verified Clerk user → local profile
async fn authenticate(state: &AppState, header_value: &str) -> Result<UserProfile, AppError> {
    let token = bearer_token(header_value)?;
    let identity = state.clerk_service.verify_token(token).await?;
    state.user_service.get_or_create_from_clerk(&identity).await
}

/// Rejects anonymous requests with 401
pub async fn require_clerk_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = match authorization_header(&request) {
        Some(value) => value?,
        None => return Err(AppError::Unauthorized(CREDENTIALS_NOT_PROVIDED.to_string())),
    };

    let profile = authenticate(&state, &header_value).await.map_err(|e| {
        tracing::warn!("Rejected authentication attempt: {}", e);
        e
    })?;

    request.extensions_mut().insert(AuthenticatedUser(profile));
    Ok(next.run(request).await)
}

/// Attaches the user when a valid token is present; a bad token is logged
/// and the request continues anonymously
pub async fn optional_clerk_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(header_value) = authorization_header(&request) {
        let result = match header_value {
            Ok(value) => authenticate(&state, &value).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(profile) => {
                request.extensions_mut().insert(AuthenticatedUser(profile));
            }
            Err(e) => tracing::warn!("Ignoring invalid credentials on public route: {}", e),
        }
    }

    next.run(request).await
}
