use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use super::NotificationService;
use crate::middleware::error_handling::{AppError, Result};
use crate::models::user::{
    ClerkIdentity, UpdateProfileRequest, UserProfile, UserProfileResponse, UserStatsResponse,
};
use crate::repositories::{InquiryRepository, UserProfileRepository};
use crate::utils::log_sanitizer::{mask_email, sanitize_for_log};

pub struct UserService {
    user_repo: Arc<dyn UserProfileRepository>,
    inquiry_repo: Arc<dyn InquiryRepository>,
    notifications: Arc<NotificationService>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserProfileRepository>,
        inquiry_repo: Arc<dyn InquiryRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            user_repo,
            inquiry_repo,
            notifications,
        }
    }

    /// Local profile for a verified Clerk identity, created on first sight
    pub async fn get_or_create_from_clerk(&self, identity: &ClerkIdentity) -> Result<UserProfile> {
        let (profile, created) = self.user_repo.upsert_from_clerk(identity).await?;
        if created {
            tracing::info!(
                "Created profile {} for Clerk user {} ({})",
                profile.id,
                sanitize_for_log(&identity.sub),
                mask_email(&profile.email)
            );
        }
        Ok(profile)
    }

    pub async fn get_profile(&self, profile: UserProfile) -> Result<UserProfileResponse> {
        Ok(profile.into())
    }

    pub async fn update_profile(
        &self,
        mut profile: UserProfile,
        request: UpdateProfileRequest,
    ) -> Result<UserProfileResponse> {
        request.validate()?;
        request.apply_to(&mut profile);

        let updated = self.user_repo.update(&profile).await?;
        tracing::info!("Profile {} updated", updated.id);
        Ok(updated.into())
    }

    /// Removes the local profile only; the Clerk account is untouched
    pub async fn delete_profile(&self, profile: &UserProfile) -> Result<()> {
        if !self.user_repo.delete(profile.id).await? {
            return Err(AppError::NotFound("User profile not found".to_string()));
        }
        tracing::info!("Profile {} deleted", profile.id);
        Ok(())
    }

    pub async fn stats(&self, profile: &UserProfile) -> Result<UserStatsResponse> {
        let counts = self.inquiry_repo.count_by_email(&profile.email).await?;
        Ok(UserStatsResponse::new(profile, counts, Utc::now()))
    }

    pub async fn record_sign_in(&self, profile: &UserProfile, client_id: &str) -> Result<UserProfileResponse> {
        let updated = self
            .user_repo
            .record_sign_in(profile.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

        tracing::info!("Sign-in #{} recorded for profile {}", updated.sign_in_count, updated.id);
        self.notifications
            .user_signed_in(client_id, updated.sign_in_count)
            .await;

        Ok(updated.into())
    }
}
