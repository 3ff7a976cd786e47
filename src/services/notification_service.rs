/// Notification Service
///
/// Post-persistence side effects of an inquiry:
/// - operator notification email
/// - confirmation email to the submitter
/// - `form_submit` analytics event
///
/// The three run concurrently. Failures are logged and reported in the
/// outcome; they never become errors for the caller.

use std::sync::Arc;
use serde_json::{json, Map, Value};

use super::{AnalyticsService, EmailError, EmailService};
use crate::models::{
    contact::ContactSubmission,
    parts_inquiry::{InquiryDetails, PartsInquiry},
};
use crate::utils::log_sanitizer::mask_email;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub operator_notified: bool,
    pub auto_reply_sent: bool,
    pub analytics_sent: bool,
}

pub struct NotificationService {
    email: Arc<EmailService>,
    analytics: Arc<AnalyticsService>,
}

fn log_email_result(kind: &str, reference: &str, result: Result<(), EmailError>) -> bool {
    match result {
        Ok(()) => {
            tracing::info!("{} sent for {}", kind, reference);
            true
        }
        Err(EmailError::NotConfigured) => {
            tracing::warn!("{} skipped for {}: email provider not configured", kind, reference);
            false
        }
        Err(e) => {
            tracing::warn!("Failed to send {} for {}: {}", kind, reference, e);
            false
        }
    }
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl NotificationService {
    pub fn new(email: Arc<EmailService>, analytics: Arc<AnalyticsService>) -> Self {
        Self { email, analytics }
    }

    pub async fn contact_submitted(&self, submission: &ContactSubmission, client_id: &str) -> NotificationOutcome {
        let reference = submission.id.to_string();
        let event_params = params(json!({
            "form_type": "contact",
            "submission_id": reference,
            "has_phone": !submission.phone.is_empty(),
            "has_subject": !submission.subject.is_empty(),
        }));

        let (operator, auto_reply, analytics_sent) = tokio::join!(
            self.email.send_contact_notification(submission),
            self.email.send_contact_auto_reply(submission),
            self.analytics.send_event(client_id, "form_submit", event_params),
        );

        let outcome = NotificationOutcome {
            operator_notified: log_email_result("Contact notification", &reference, operator),
            auto_reply_sent: log_email_result(
                "Contact auto-reply",
                &mask_email(&submission.email),
                auto_reply,
            ),
            analytics_sent,
        };
        tracing::debug!("Contact submission {} notifications: {:?}", reference, outcome);
        outcome
    }

    pub async fn parts_inquiry_submitted(
        &self,
        inquiry: &PartsInquiry,
        details: &InquiryDetails,
        client_id: &str,
    ) -> NotificationOutcome {
        let reference = inquiry.id.to_string();
        let event_params = params(json!({
            "form_type": "parts_inquiry",
            "inquiry_id": reference,
            "vehicle_year": details.year,
            "manufacturer": details.manufacturer,
            "model": details.model,
            "part_category": details.part,
        }));

        let (operator, auto_reply, analytics_sent) = tokio::join!(
            self.email.send_parts_inquiry_notification(inquiry, details),
            self.email.send_parts_inquiry_auto_reply(inquiry, details),
            self.analytics.send_event(client_id, "form_submit", event_params),
        );

        let outcome = NotificationOutcome {
            operator_notified: log_email_result("Parts inquiry notification", &reference, operator),
            auto_reply_sent: log_email_result(
                "Parts inquiry auto-reply",
                &mask_email(&inquiry.email),
                auto_reply,
            ),
            analytics_sent,
        };
        tracing::debug!("Parts inquiry {} notifications: {:?}", reference, outcome);
        outcome
    }

    /// Analytics only; sign-ins send no email
    pub async fn user_signed_in(&self, client_id: &str, sign_in_count: i32) -> bool {
        self.analytics
            .send_event(
                client_id,
                "user_signin",
                params(json!({ "method": "clerk", "sign_in_count": sign_in_count })),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyticsConfig, EmailConfig};
    use crate::models::contact::ContactStatus;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn unconfigured() -> NotificationService {
        let email = EmailService::new(&EmailConfig {
            api_url: "http://127.0.0.1:9".into(),
            api_key: None,
            from_address: "noreply@nexxaauto.com".into(),
            operator_recipients: vec!["ops@nexxaauto.com".into()],
            timeout: Duration::from_secs(1),
        });
        let analytics = AnalyticsService::new(&AnalyticsConfig {
            api_url: "http://127.0.0.1:9".into(),
            measurement_id: None,
            api_secret: None,
            debug_mode: false,
            timeout: Duration::from_secs(1),
        });
        NotificationService::new(Arc::new(email), Arc::new(analytics))
    }

    #[tokio::test]
    async fn test_unconfigured_providers_are_skipped_quietly() {
        let now = Utc::now();
        let submission = ContactSubmission {
            id: Uuid::new_v4(),
            email: "jane@example.com".into(),
            name: String::new(),
            subject: String::new(),
            message: "Do you have a hood for a 1999 Civic?".into(),
            phone: String::new(),
            status: ContactStatus::New,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
            ip_address: None,
            user_agent: String::new(),
        };

        let outcome = unconfigured().contact_submitted(&submission, "cid").await;

        assert_eq!(outcome, NotificationOutcome::default());
    }

    #[test]
    fn test_log_email_result() {
        assert!(log_email_result("x", "ref", Ok(())));
        assert!(!log_email_result("x", "ref", Err(EmailError::NoRecipients)));
    }
}
