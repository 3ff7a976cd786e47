use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::error_handling::Result,
    models::user::{AuthenticatedUser, UpdateProfileRequest, UserProfileResponse, UserStatsResponse},
    services::analytics_service::client_id,
    state::AppState,
    utils::RequestMetadata,
};

pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(profile)): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfileResponse>> {
    let profile = state.user_service.get_profile(profile).await?;
    Ok(Json(profile))
}

pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(profile)): Extension<AuthenticatedUser>,
    body: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserProfileResponse>> {
    let Json(request) = body?;
    let profile = state.user_service.update_profile(profile, request).await?;
    Ok(Json(profile))
}

pub async fn delete_current_user(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(profile)): Extension<AuthenticatedUser>,
) -> Result<StatusCode> {
    state.user_service.delete_profile(&profile).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_user_stats(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(profile)): Extension<AuthenticatedUser>,
) -> Result<Json<UserStatsResponse>> {
    let stats = state.user_service.stats(&profile).await?;
    Ok(Json(stats))
}

pub async fn record_signin(
    State(state): State<AppState>,
    headers: HeaderMap,
    metadata: RequestMetadata,
    Extension(AuthenticatedUser(profile)): Extension<AuthenticatedUser>,
) -> Result<Json<Value>> {
    let client_id = client_id(&headers, Some(profile.id), metadata.ip_address, &metadata.user_agent);
    let user = state.user_service.record_sign_in(&profile, &client_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Sign-in recorded",
        "user": user,
    })))
}
