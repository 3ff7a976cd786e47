/// Vehicle and part lookup tables that constrain parts inquiries

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Manufacturer {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VehicleModel {
    pub id: i32,
    pub manufacturer_id: i32,
    pub name: String,
    pub code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PartCategory {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManufacturerResponse {
    pub id: i32,
    pub name: String,
    pub code: String,
}

impl From<Manufacturer> for ManufacturerResponse {
    fn from(manufacturer: Manufacturer) -> Self {
        Self {
            id: manufacturer.id,
            name: manufacturer.name,
            code: manufacturer.code,
        }
    }
}

/// Vehicle model joined with its manufacturer's name
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct VehicleModelResponse {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub manufacturer: i32,
    pub manufacturer_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartCategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<PartCategory> for PartCategoryResponse {
    fn from(category: PartCategory) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Serialize)]
pub struct ManufacturerModelsResponse {
    pub success: bool,
    pub manufacturer: String,
    pub data: Vec<VehicleModelResponse>,
}
