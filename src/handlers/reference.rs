use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    middleware::error_handling::{AppError, Result},
    models::reference::{
        ListResponse, ManufacturerModelsResponse, ManufacturerResponse, PartCategoryResponse, VehicleModelResponse,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ModelsQuery {
    pub manufacturer_id: Option<String>,
}

pub async fn get_manufacturers(State(state): State<AppState>) -> Result<Json<ListResponse<ManufacturerResponse>>> {
    let manufacturers = state.reference_service.list_manufacturers().await?;
    Ok(Json(ListResponse::new(manufacturers)))
}

pub async fn get_models_by_manufacturer(
    State(state): State<AppState>,
    Path(manufacturer_id): Path<String>,
) -> Result<Json<ManufacturerModelsResponse>> {
    // Non-numeric ids name no manufacturer
    let manufacturer_id: i32 = manufacturer_id
        .parse()
        .map_err(|_| AppError::NotFound("Manufacturer not found".to_string()))?;

    let response = state
        .reference_service
        .list_models_for_manufacturer(manufacturer_id)
        .await?;
    Ok(Json(response))
}

pub async fn get_all_models(
    State(state): State<AppState>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<ListResponse<VehicleModelResponse>>> {
    let manufacturer_id = match query.manufacturer_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i32>()
                .map_err(|_| AppError::BadRequest("manufacturer_id must be an integer".to_string()))?,
        ),
    };

    let models = state.reference_service.list_models(manufacturer_id).await?;
    Ok(Json(ListResponse::new(models)))
}

pub async fn get_part_categories(State(state): State<AppState>) -> Result<Json<ListResponse<PartCategoryResponse>>> {
    let categories = state.reference_service.list_part_categories().await?;
    Ok(Json(ListResponse::new(categories)))
}
