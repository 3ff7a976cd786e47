use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Datelike, Utc};

use super::NotificationService;
use crate::middleware::error_handling::{AppError, Result};
use crate::models::{
    contact::{ContactSubmission, ContactSubmissionRequest, NewContactSubmission},
    parts_inquiry::{
        missing_object_message, InquiryDetails, NewPartsInquiry, PartsInquiry, PartsInquiryRequest, ReferenceIds,
        ResolvedReferences, MODEL_MANUFACTURER_MISMATCH,
    },
    validation::FieldErrors,
};
use crate::repositories::{InquiryRepository, ReferenceRepository};
use crate::utils::{log_sanitizer::mask_email, RequestMetadata};

/// Validates, persists and announces customer inquiries
pub struct InquiryService {
    inquiry_repo: Arc<dyn InquiryRepository>,
    reference_repo: Arc<dyn ReferenceRepository>,
    notifications: Arc<NotificationService>,
}

impl InquiryService {
    pub fn new(
        inquiry_repo: Arc<dyn InquiryRepository>,
        reference_repo: Arc<dyn ReferenceRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            inquiry_repo,
            reference_repo,
            notifications,
        }
    }

    pub async fn submit_contact(
        &self,
        request: ContactSubmissionRequest,
        metadata: RequestMetadata,
        client_id: &str,
    ) -> Result<ContactSubmission> {
        let mut errors = FieldErrors::new();
        let form = request.check_fields(&mut errors);
        errors.into_result()?;
        let form = form.ok_or_else(|| AppError::Internal(anyhow!("contact form passed validation without a value")))?;

        let submission = self
            .inquiry_repo
            .create_contact_submission(NewContactSubmission { form, metadata })
            .await?;

        tracing::info!(
            "Contact submission {} received from {}",
            submission.id,
            mask_email(&submission.email)
        );

        self.notifications.contact_submitted(&submission, client_id).await;

        Ok(submission)
    }

    pub async fn submit_parts_inquiry(
        &self,
        request: PartsInquiryRequest,
        metadata: RequestMetadata,
        client_id: &str,
    ) -> Result<(PartsInquiry, InquiryDetails)> {
        self.submit_parts_inquiry_for_year(request, metadata, client_id, Utc::now().year())
            .await
    }

    async fn submit_parts_inquiry_for_year(
        &self,
        request: PartsInquiryRequest,
        metadata: RequestMetadata,
        client_id: &str,
        current_year: i32,
    ) -> Result<(PartsInquiry, InquiryDetails)> {
        let mut errors = FieldErrors::new();
        let form = request.check_fields(&mut errors, current_year);
        let ids = request.reference_ids(&mut errors);
        let references = self.resolve_references(ids, &mut errors).await?;
        errors.into_result()?;
        let form = form.ok_or_else(|| AppError::Internal(anyhow!("parts inquiry passed validation without a value")))?;

        if !references.model_matches_manufacturer() {
            let mut errors = FieldErrors::new();
            errors.add("model", "model_mismatch", MODEL_MANUFACTURER_MISMATCH);
            return Err(errors.into_inner().into());
        }

        let details = InquiryDetails::new(form.year, &references);
        let inquiry = self
            .inquiry_repo
            .create_parts_inquiry(NewPartsInquiry {
                form,
                manufacturer_id: references.manufacturer.as_ref().map(|m| m.id),
                model_id: references.model.as_ref().map(|m| m.id),
                part_category_id: references.part_category.as_ref().map(|c| c.id),
                metadata,
            })
            .await?;

        tracing::info!(
            "Parts inquiry {} received for {} from {}",
            inquiry.id,
            details.vehicle(),
            mask_email(&inquiry.email)
        );

        self.notifications
            .parts_inquiry_submitted(&inquiry, &details, client_id)
            .await;

        Ok((inquiry, details))
    }

    /// Look up every supplied id, reporting the ones with no row
    async fn resolve_references(&self, ids: ReferenceIds, errors: &mut FieldErrors) -> Result<ResolvedReferences> {
        let mut resolved = ResolvedReferences::default();

        if let Some(id) = ids.manufacturer {
            resolved.manufacturer = match i32::try_from(id) {
                Ok(key) => self.reference_repo.find_manufacturer(key).await?,
                Err(_) => None,
            };
            if resolved.manufacturer.is_none() {
                errors.add("manufacturer", "does_not_exist", missing_object_message(id));
            }
        }

        if let Some(id) = ids.model {
            resolved.model = match i32::try_from(id) {
                Ok(key) => self.reference_repo.find_vehicle_model(key).await?,
                Err(_) => None,
            };
            if resolved.model.is_none() {
                errors.add("model", "does_not_exist", missing_object_message(id));
            }
        }

        if let Some(id) = ids.part_category {
            resolved.part_category = match i32::try_from(id) {
                Ok(key) => self.reference_repo.find_part_category(key).await?,
                Err(_) => None,
            };
            if resolved.part_category.is_none() {
                errors.add("part_category", "does_not_exist", missing_object_message(id));
            }
        }

        Ok(resolved)
    }
}
