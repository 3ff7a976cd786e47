use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::middleware::ip_rate_limiter::{RateLimitConfig, RateLimiter};
use crate::repositories::{
    InMemoryStore, InquiryRepository, PgInquiryRepository, PgReferenceRepository, PgUserProfileRepository,
    ReferenceRepository, UserProfileRepository,
};
use crate::services::{
    AnalyticsService, ClerkService, EmailService, InquiryService, NotificationService, ReferenceService,
    UserService,
};

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub inquiry_service: Arc<InquiryService>,
    pub reference_service: Arc<ReferenceService>,
    pub user_service: Arc<UserService>,
    pub clerk_service: Arc<ClerkService>,
    pub submission_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        inquiry_repo: Arc<dyn InquiryRepository>,
        reference_repo: Arc<dyn ReferenceRepository>,
        user_repo: Arc<dyn UserProfileRepository>,
    ) -> Self {
        let email = Arc::new(EmailService::new(&config.email));
        let analytics = Arc::new(AnalyticsService::new(&config.analytics));
        let notifications = Arc::new(NotificationService::new(email, analytics));

        Self {
            inquiry_service: Arc::new(InquiryService::new(
                inquiry_repo.clone(),
                reference_repo.clone(),
                notifications.clone(),
            )),
            reference_service: Arc::new(ReferenceService::new(reference_repo)),
            user_service: Arc::new(UserService::new(user_repo, inquiry_repo, notifications)),
            clerk_service: Arc::new(ClerkService::new(&config.clerk)),
            submission_limiter: Arc::new(RateLimiter::new(RateLimitConfig::submissions(
                config.submission_rate_limit,
            ))),
            config: Arc::new(config),
        }
    }

    pub fn with_postgres(config: AppConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgInquiryRepository::new(pool.clone())),
            Arc::new(PgReferenceRepository::new(pool.clone())),
            Arc::new(PgUserProfileRepository::new(pool)),
        )
    }

    pub fn in_memory(config: AppConfig, store: Arc<InMemoryStore>) -> Self {
        Self::new(config, store.clone(), store.clone(), store)
    }
}
