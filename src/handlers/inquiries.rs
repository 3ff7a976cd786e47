use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};

use crate::{
    middleware::error_handling::Result,
    models::{
        contact::{ContactSubmissionRequest, ContactSubmissionResponse},
        parts_inquiry::{PartsInquiryRequest, PartsInquiryResponse},
        user::AuthenticatedUser,
    },
    services::analytics_service::client_id,
    state::AppState,
    utils::RequestMetadata,
};

fn analytics_client_id(
    headers: &HeaderMap,
    user: &Option<Extension<AuthenticatedUser>>,
    metadata: &RequestMetadata,
) -> String {
    client_id(
        headers,
        user.as_ref().map(|Extension(AuthenticatedUser(profile))| profile.id),
        metadata.ip_address,
        &metadata.user_agent,
    )
}

pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    metadata: RequestMetadata,
    user: Option<Extension<AuthenticatedUser>>,
    body: std::result::Result<Json<ContactSubmissionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactSubmissionResponse>)> {
    let Json(request) = body?;
    let client_id = analytics_client_id(&headers, &user, &metadata);

    let submission = state
        .inquiry_service
        .submit_contact(request, metadata, &client_id)
        .await?;

    Ok((StatusCode::CREATED, Json(ContactSubmissionResponse::from(&submission))))
}

pub async fn submit_parts_inquiry(
    State(state): State<AppState>,
    headers: HeaderMap,
    metadata: RequestMetadata,
    user: Option<Extension<AuthenticatedUser>>,
    body: std::result::Result<Json<PartsInquiryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PartsInquiryResponse>)> {
    let Json(request) = body?;
    let client_id = analytics_client_id(&headers, &user, &metadata);

    let (inquiry, details) = state
        .inquiry_service
        .submit_parts_inquiry(request, metadata, &client_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PartsInquiryResponse::new(&inquiry, details))))
}
