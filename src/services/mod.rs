pub mod analytics_service;
pub mod clerk_service;
pub mod email_service;
pub mod inquiry_service;
pub mod notification_service;
pub mod reference_service;
pub mod user_service;

pub use analytics_service::AnalyticsService;
pub use clerk_service::{ClerkError, ClerkService};
pub use email_service::{EmailError, EmailService};
pub use inquiry_service::InquiryService;
pub use notification_service::{NotificationOutcome, NotificationService};
pub use reference_service::ReferenceService;
pub use user_service::UserService;
