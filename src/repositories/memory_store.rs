/// In-process store implementing every repository trait.
///
/// Used when no database is configured and by the test suites. Each table
/// sits behind its own `RwLock`; no lock is held across an await.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    RwLock,
};
use async_trait::async_trait;
use anyhow::anyhow;
use chrono::Utc;
use uuid::Uuid;

use super::{InquiryRepository, ReferenceRepository, UserProfileRepository};
use crate::middleware::error_handling::{AppError, Result};
use crate::models::{
    contact::{ContactStatus, ContactSubmission, NewContactSubmission},
    parts_inquiry::{NewPartsInquiry, PartsInquiry, PartsInquiryStatus},
    reference::{Manufacturer, PartCategory, VehicleModel, VehicleModelResponse},
    user::{ClerkIdentity, InquiryCounts, UserProfile},
};

#[derive(Default)]
pub struct InMemoryStore {
    manufacturers: RwLock<Vec<Manufacturer>>,
    vehicle_models: RwLock<Vec<VehicleModel>>,
    part_categories: RwLock<Vec<PartCategory>>,
    contact_submissions: RwLock<Vec<ContactSubmission>>,
    parts_inquiries: RwLock<Vec<PartsInquiry>>,
    user_profiles: RwLock<HashMap<Uuid, UserProfile>>,
    fail_writes: AtomicBool,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal(anyhow!("in-memory store lock poisoned"))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalog for local runs without a database
    pub fn with_sample_catalog() -> Self {
        let store = Self::new();
        let honda = store.add_manufacturer("Honda", "HON", true);
        let acura = store.add_manufacturer("Acura", "ACU", true);
        let ford = store.add_manufacturer("Ford", "FRD", true);
        store.add_vehicle_model(honda, "Accord", "ACC", true);
        store.add_vehicle_model(honda, "Civic", "CIV", true);
        store.add_vehicle_model(acura, "CL", "CL", true);
        store.add_vehicle_model(acura, "MDX", "MDX", true);
        store.add_vehicle_model(ford, "F-150", "F150", true);
        store.add_part_category("Engine", "Complete engines and long blocks", true);
        store.add_part_category("Transmission", "Automatic and manual transmissions", true);
        store.add_part_category("Alternator", "", true);
        store
    }

    pub fn add_manufacturer(&self, name: &str, code: &str, is_active: bool) -> i32 {
        let mut manufacturers = self.manufacturers.write().unwrap_or_else(|e| e.into_inner());
        let id = manufacturers.len() as i32 + 1;
        manufacturers.push(Manufacturer {
            id,
            name: name.to_string(),
            code: code.to_string(),
            is_active,
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_vehicle_model(&self, manufacturer_id: i32, name: &str, code: &str, is_active: bool) -> i32 {
        let mut models = self.vehicle_models.write().unwrap_or_else(|e| e.into_inner());
        let id = models.len() as i32 + 1;
        models.push(VehicleModel {
            id,
            manufacturer_id,
            name: name.to_string(),
            code: code.to_string(),
            is_active,
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_part_category(&self, name: &str, description: &str, is_active: bool) -> i32 {
        let mut categories = self.part_categories.write().unwrap_or_else(|e| e.into_inner());
        let id = categories.len() as i32 + 1;
        categories.push(PartCategory {
            id,
            name: name.to_string(),
            description: description.to_string(),
            is_active,
            created_at: Utc::now(),
        });
        id
    }

    /// Make every inquiry write fail as a database error would
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contact_submissions(&self) -> Vec<ContactSubmission> {
        self.contact_submissions.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn parts_inquiries(&self) -> Vec<PartsInquiry> {
        self.parts_inquiries.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn user_profiles(&self) -> Vec<UserProfile> {
        self.user_profiles
            .read()
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl InquiryRepository for InMemoryStore {
    async fn create_contact_submission(&self, submission: NewContactSubmission) -> Result<ContactSubmission> {
        self.check_writable()?;
        let NewContactSubmission { form, metadata } = submission;
        let now = Utc::now();

        let row = ContactSubmission {
            id: Uuid::new_v4(),
            email: form.email,
            name: form.name,
            subject: form.subject,
            message: form.message,
            phone: form.phone,
            status: ContactStatus::New,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
        };

        self.contact_submissions.write().map_err(poisoned)?.push(row.clone());
        Ok(row)
    }

    async fn create_parts_inquiry(&self, inquiry: NewPartsInquiry) -> Result<PartsInquiry> {
        self.check_writable()?;
        let NewPartsInquiry { form, manufacturer_id, model_id, part_category_id, metadata } = inquiry;
        let now = Utc::now();

        let row = PartsInquiry {
            id: Uuid::new_v4(),
            year: form.year,
            manufacturer_id,
            model_id,
            part_category_id,
            name: form.name,
            email: form.email,
            phone: form.phone,
            zipcode: form.zipcode,
            additional_notes: form.additional_notes,
            status: PartsInquiryStatus::New,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
        };

        self.parts_inquiries.write().map_err(poisoned)?.push(row.clone());
        Ok(row)
    }

    async fn count_by_email(&self, email: &str) -> Result<InquiryCounts> {
        let email = email.to_lowercase();
        let contact_submissions = self
            .contact_submissions
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|s| s.email == email)
            .count() as i64;
        let parts_inquiries = self
            .parts_inquiries
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|i| i.email == email)
            .count() as i64;

        Ok(InquiryCounts { contact_submissions, parts_inquiries })
    }
}

#[async_trait]
impl ReferenceRepository for InMemoryStore {
    async fn find_manufacturer(&self, id: i32) -> Result<Option<Manufacturer>> {
        let manufacturers = self.manufacturers.read().map_err(poisoned)?;
        Ok(manufacturers.iter().find(|m| m.id == id).cloned())
    }

    async fn find_vehicle_model(&self, id: i32) -> Result<Option<VehicleModel>> {
        let models = self.vehicle_models.read().map_err(poisoned)?;
        Ok(models.iter().find(|m| m.id == id).cloned())
    }

    async fn find_part_category(&self, id: i32) -> Result<Option<PartCategory>> {
        let categories = self.part_categories.read().map_err(poisoned)?;
        Ok(categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_active_manufacturers(&self) -> Result<Vec<Manufacturer>> {
        let mut active: Vec<Manufacturer> = self
            .manufacturers
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|m| m.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    async fn list_active_models(&self, manufacturer_id: Option<i32>) -> Result<Vec<VehicleModelResponse>> {
        let manufacturers = self.manufacturers.read().map_err(poisoned)?;
        let models = self.vehicle_models.read().map_err(poisoned)?;

        let mut listed: Vec<VehicleModelResponse> = models
            .iter()
            .filter(|m| m.is_active)
            .filter(|m| manufacturer_id.map_or(true, |id| m.manufacturer_id == id))
            .filter_map(|m| {
                let manufacturer = manufacturers.iter().find(|mf| mf.id == m.manufacturer_id)?;
                Some(VehicleModelResponse {
                    id: m.id,
                    name: m.name.clone(),
                    code: m.code.clone(),
                    manufacturer: m.manufacturer_id,
                    manufacturer_name: manufacturer.name.clone(),
                })
            })
            .collect();

        listed.sort_by(|a, b| {
            a.manufacturer_name
                .cmp(&b.manufacturer_name)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(listed)
    }

    async fn list_active_part_categories(&self) -> Result<Vec<PartCategory>> {
        let mut active: Vec<PartCategory> = self
            .part_categories
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryStore {
    async fn upsert_from_clerk(&self, identity: &ClerkIdentity) -> Result<(UserProfile, bool)> {
        let mut profiles = self.user_profiles.write().map_err(poisoned)?;

        if let Some(existing) = profiles.values_mut().find(|p| p.clerk_id == identity.sub) {
            existing.sync_from_identity(identity);
            return Ok((existing.clone(), false));
        }

        let profile = UserProfile::from_identity(identity);
        profiles.insert(profile.id, profile.clone());
        Ok((profile, true))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.user_profiles.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn update(&self, profile: &UserProfile) -> Result<UserProfile> {
        let mut profiles = self.user_profiles.write().map_err(poisoned)?;
        let existing = profiles
            .get_mut(&profile.id)
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        existing.first_name = profile.first_name.clone();
        existing.last_name = profile.last_name.clone();
        existing.phone_number = profile.phone_number.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn record_sign_in(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let mut profiles = self.user_profiles.write().map_err(poisoned)?;
        Ok(profiles.get_mut(&id).map(|profile| {
            let now = Utc::now();
            profile.sign_in_count += 1;
            profile.last_sign_in_at = Some(now);
            profile.updated_at = now;
            profile.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.user_profiles.write().map_err(poisoned)?.remove(&id).is_some())
    }
}
