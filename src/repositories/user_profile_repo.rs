use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::middleware::error_handling::Result;
use crate::models::user::{ClerkIdentity, UserProfile};

#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Insert a profile for a new Clerk user or re-sync an existing one.
    /// The flag is `true` when the profile was created.
    async fn upsert_from_clerk(&self, identity: &ClerkIdentity) -> Result<(UserProfile, bool)>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>>;

    /// Persist the user-editable fields
    async fn update(&self, profile: &UserProfile) -> Result<UserProfile>;

    async fn record_sign_in(&self, id: Uuid) -> Result<Option<UserProfile>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

const PROFILE_COLUMNS: &str = "id, clerk_id, email, first_name, last_name, profile_image_url, \
     phone_number, sign_in_count, last_sign_in_at, clerk_updated_at, created_at, updated_at";

const CLERK_RECORD_NEWER: &str = "(EXCLUDED.clerk_updated_at IS NOT NULL \
     AND (p.clerk_updated_at IS NULL OR EXCLUDED.clerk_updated_at > p.clerk_updated_at))";

pub struct PgUserProfileRepository {
    pool: PgPool,
}

impl PgUserProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserProfileRepository for PgUserProfileRepository {
    async fn upsert_from_clerk(&self, identity: &ClerkIdentity) -> Result<(UserProfile, bool)> {
        // xmax is zero only for a row this statement inserted.
        // Names and phone follow Clerk only when its record is newer than the last sync.
        let sql = format!(
            r#"
            INSERT INTO user_profiles AS p (
                id, clerk_id, email, first_name, last_name, profile_image_url,
                phone_number, clerk_updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (clerk_id) DO UPDATE SET
                email = EXCLUDED.email,
                profile_image_url = EXCLUDED.profile_image_url,
                first_name = CASE WHEN {newer} THEN EXCLUDED.first_name ELSE p.first_name END,
                last_name = CASE WHEN {newer} THEN EXCLUDED.last_name ELSE p.last_name END,
                phone_number = CASE WHEN {newer} THEN EXCLUDED.phone_number ELSE p.phone_number END,
                clerk_updated_at = CASE WHEN {newer} THEN EXCLUDED.clerk_updated_at ELSE p.clerk_updated_at END,
                updated_at = NOW()
            RETURNING {columns}, (xmax = 0) AS created
            "#,
            newer = CLERK_RECORD_NEWER,
            columns = PROFILE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(&identity.sub)
            .bind(&identity.email)
            .bind(&identity.given_name)
            .bind(&identity.family_name)
            .bind(&identity.picture)
            .bind(&identity.phone_number)
            .bind(identity.updated_at)
            .fetch_one(&self.pool)
            .await?;

        let profile = UserProfile {
            id: row.try_get("id")?,
            clerk_id: row.try_get("clerk_id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            profile_image_url: row.try_get("profile_image_url")?,
            phone_number: row.try_get("phone_number")?,
            sign_in_count: row.try_get("sign_in_count")?,
            last_sign_in_at: row.try_get("last_sign_in_at")?,
            clerk_updated_at: row.try_get("clerk_updated_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        };

        Ok((profile, row.try_get("created")?))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let sql = format!("SELECT {} FROM user_profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn update(&self, profile: &UserProfile) -> Result<UserProfile> {
        let sql = format!(
            r#"
            UPDATE user_profiles
            SET first_name = $2, last_name = $3, phone_number = $4, updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let updated = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(profile.id)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.phone_number)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn record_sign_in(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let sql = format!(
            r#"
            UPDATE user_profiles
            SET sign_in_count = sign_in_count + 1, last_sign_in_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
