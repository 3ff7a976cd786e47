use std::sync::Arc;

use crate::middleware::error_handling::{AppError, Result};
use crate::models::reference::{
    ManufacturerModelsResponse, ManufacturerResponse, PartCategoryResponse, VehicleModelResponse,
};
use crate::repositories::ReferenceRepository;

/// Read-only catalog lookups for the inquiry form dropdowns
pub struct ReferenceService {
    reference_repo: Arc<dyn ReferenceRepository>,
}

impl ReferenceService {
    pub fn new(reference_repo: Arc<dyn ReferenceRepository>) -> Self {
        Self { reference_repo }
    }

    pub async fn list_manufacturers(&self) -> Result<Vec<ManufacturerResponse>> {
        let manufacturers = self.reference_repo.list_active_manufacturers().await?;
        Ok(manufacturers.into_iter().map(ManufacturerResponse::from).collect())
    }

    /// Active models of one active manufacturer
    pub async fn list_models_for_manufacturer(&self, manufacturer_id: i32) -> Result<ManufacturerModelsResponse> {
        let manufacturer = self
            .reference_repo
            .find_manufacturer(manufacturer_id)
            .await?
            .filter(|m| m.is_active)
            .ok_or_else(|| AppError::NotFound("Manufacturer not found".to_string()))?;

        let mut models = self.reference_repo.list_active_models(Some(manufacturer.id)).await?;
        models.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ManufacturerModelsResponse {
            success: true,
            manufacturer: manufacturer.name,
            data: models,
        })
    }

    pub async fn list_models(&self, manufacturer_id: Option<i32>) -> Result<Vec<VehicleModelResponse>> {
        self.reference_repo.list_active_models(manufacturer_id).await
    }

    pub async fn list_part_categories(&self) -> Result<Vec<PartCategoryResponse>> {
        let categories = self.reference_repo.list_active_part_categories().await?;
        Ok(categories.into_iter().map(PartCategoryResponse::from).collect())
    }
}
