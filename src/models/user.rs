use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Local mirror of a Clerk account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub clerk_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: String,
    pub phone_number: String,
    pub sign_in_count: i32,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub clerk_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Fresh profile for a Clerk identity seen for the first time
    pub fn from_identity(identity: &ClerkIdentity) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            clerk_id: identity.sub.clone(),
            email: identity.email.clone(),
            first_name: identity.given_name.clone(),
            last_name: identity.family_name.clone(),
            profile_image_url: identity.picture.clone(),
            phone_number: identity.phone_number.clone(),
            sign_in_count: 0,
            last_sign_in_at: None,
            clerk_updated_at: identity.updated_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-sync from Clerk. Names and phone are user-editable here too, so
    /// they only follow Clerk when the Clerk record changed since the last sync.
    pub fn sync_from_identity(&mut self, identity: &ClerkIdentity) {
        self.email = identity.email.clone();
        self.profile_image_url = identity.picture.clone();

        if identity.updated_at > self.clerk_updated_at {
            self.first_name = identity.given_name.clone();
            self.last_name = identity.family_name.clone();
            self.phone_number = identity.phone_number.clone();
            self.clerk_updated_at = identity.updated_at;
        }
        self.updated_at = Utc::now();
    }
}

/// Standardised claims built from a verified Clerk user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClerkIdentity {
    pub sub: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub name: String,
    pub picture: String,
    pub phone_number: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The signed-in profile, placed in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserProfile);

#[derive(Debug, Serialize, Clone)]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub clerk_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub profile_image_url: String,
    pub phone_number: String,
    pub sign_in_count: i32,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            full_name: profile.full_name(),
            id: profile.id,
            clerk_id: profile.clerk_id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            profile_image_url: profile.profile_image_url,
            phone_number: profile.phone_number,
            sign_in_count: profile.sign_in_count,
            last_sign_in_at: profile.last_sign_in_at,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone_number: Option<String>,
}

impl UpdateProfileRequest {
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(first_name) = &self.first_name {
            profile.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &self.last_name {
            profile.last_name = last_name.trim().to_string();
        }
        if let Some(phone_number) = &self.phone_number {
            profile.phone_number = phone_number.trim().to_string();
        }
        profile.updated_at = Utc::now();
    }
}

/// How many inquiries have been filed under an email address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InquiryCounts {
    pub contact_submissions: i64,
    pub parts_inquiries: i64,
}

#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    pub sign_in_count: i32,
    pub member_since: DateTime<Utc>,
    pub last_sign_in: Option<DateTime<Utc>>,
    pub days_since_joined: i64,
    pub contact_submissions: i64,
    pub parts_inquiries: i64,
}

impl UserStatsResponse {
    pub fn new(profile: &UserProfile, counts: InquiryCounts, now: DateTime<Utc>) -> Self {
        Self {
            sign_in_count: profile.sign_in_count,
            member_since: profile.created_at,
            last_sign_in: profile.last_sign_in_at,
            days_since_joined: (now - profile.created_at).num_days(),
            contact_submissions: counts.contact_submissions,
            parts_inquiries: counts.parts_inquiries,
        }
    }
}
