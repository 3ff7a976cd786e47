use async_trait::async_trait;
use sqlx::PgPool;

use crate::middleware::error_handling::Result;
use crate::models::reference::{Manufacturer, PartCategory, VehicleModel, VehicleModelResponse};

/// Read-only access to the vehicle/part lookup tables
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Any manufacturer, active or not
    async fn find_manufacturer(&self, id: i32) -> Result<Option<Manufacturer>>;

    async fn find_vehicle_model(&self, id: i32) -> Result<Option<VehicleModel>>;

    async fn find_part_category(&self, id: i32) -> Result<Option<PartCategory>>;

    /// Active manufacturers ordered by name
    async fn list_active_manufacturers(&self) -> Result<Vec<Manufacturer>>;

    /// Active models ordered by (manufacturer name, model name)
    async fn list_active_models(&self, manufacturer_id: Option<i32>) -> Result<Vec<VehicleModelResponse>>;

    /// Active part categories ordered by name
    async fn list_active_part_categories(&self) -> Result<Vec<PartCategory>>;
}

pub struct PgReferenceRepository {
    pool: PgPool,
}

impl PgReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepository for PgReferenceRepository {
    async fn find_manufacturer(&self, id: i32) -> Result<Option<Manufacturer>> {
        let manufacturer = sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name, code, is_active, created_at FROM manufacturers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(manufacturer)
    }

    async fn find_vehicle_model(&self, id: i32) -> Result<Option<VehicleModel>> {
        let model = sqlx::query_as::<_, VehicleModel>(
            "SELECT id, manufacturer_id, name, code, is_active, created_at FROM vehicle_models WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(model)
    }

    async fn find_part_category(&self, id: i32) -> Result<Option<PartCategory>> {
        let category = sqlx::query_as::<_, PartCategory>(
            "SELECT id, name, description, is_active, created_at FROM part_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn list_active_manufacturers(&self) -> Result<Vec<Manufacturer>> {
        let manufacturers = sqlx::query_as::<_, Manufacturer>(
            r#"
            SELECT id, name, code, is_active, created_at
            FROM manufacturers
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(manufacturers)
    }

    async fn list_active_models(&self, manufacturer_id: Option<i32>) -> Result<Vec<VehicleModelResponse>> {
        let models = sqlx::query_as::<_, VehicleModelResponse>(
            r#"
            SELECT vm.id, vm.name, vm.code, vm.manufacturer_id AS manufacturer,
                   m.name AS manufacturer_name
            FROM vehicle_models vm
            JOIN manufacturers m ON m.id = vm.manufacturer_id
            WHERE vm.is_active = TRUE
              AND ($1::INTEGER IS NULL OR vm.manufacturer_id = $1)
            ORDER BY m.name, vm.name
            "#,
        )
        .bind(manufacturer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(models)
    }

    async fn list_active_part_categories(&self) -> Result<Vec<PartCategory>> {
        let categories = sqlx::query_as::<_, PartCategory>(
            r#"
            SELECT id, name, description, is_active, created_at
            FROM part_categories
            WHERE is_active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
