pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    health::health_check,
    inquiries::{submit_contact, submit_parts_inquiry},
    reference::{get_all_models, get_manufacturers, get_models_by_manufacturer, get_part_categories},
    user::{delete_current_user, get_current_user, get_user_stats, record_signin, update_current_user},
};
use crate::middleware::{
    optional_clerk_auth, request_id_middleware, require_clerk_auth, submission_rate_limit, REQUEST_ID_HEADER,
};
use crate::services::analytics_service::CLIENT_ID_HEADER;
pub use crate::state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    tracing::info!("CORS configured with {} allowed origins", allowed.len());

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_credentials(true)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(CLIENT_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER), header::RETRY_AFTER])
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let submissions = Router::new()
        .route("/api/contact/", post(submit_contact))
        .route("/api/parts-inquiry/", post(submit_parts_inquiry))
        .layer(from_fn_with_state(state.clone(), optional_clerk_auth))
        .layer(from_fn_with_state(state.clone(), submission_rate_limit));

    let catalog = Router::new()
        .route("/api/manufacturers/", get(get_manufacturers))
        .route("/api/manufacturers/:manufacturer_id/models/", get(get_models_by_manufacturer))
        .route("/api/models/", get(get_all_models))
        .route("/api/part-categories/", get(get_part_categories));

    let user = Router::new()
        .route("/api/user/me/", get(get_current_user).delete(delete_current_user))
        .route("/api/user/me/update/", put(update_current_user))
        .route("/api/user/stats/", get(get_user_stats))
        .route("/api/user/signin/", post(record_signin))
        .layer(from_fn_with_state(state.clone(), require_clerk_auth));

    Router::new()
        .route("/api/health/", get(health_check))
        .merge(submissions)
        .merge(catalog)
        .merge(user)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
