use std::net::IpAddr;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::validation::FieldErrors;
use crate::utils::client_ip::RequestMetadata;

pub const MESSAGE_MIN_LENGTH: usize = 10;
pub const MESSAGE_MAX_LENGTH: usize = 5000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    InProgress,
    Resolved,
    Closed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::InProgress => "in_progress",
            ContactStatus::Resolved => "resolved",
            ContactStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(ContactStatus::New),
            "in_progress" => Some(ContactStatus::InProgress),
            "resolved" => Some(ContactStatus::Resolved),
            "closed" => Some(ContactStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub subject: String,
    pub message: String,
    pub phone: String,
    pub status: ContactStatus,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub ip_address: Option<IpAddr>,
    pub user_agent: String,
}

impl ContactSubmission {
    pub fn mark_as_resolved(&mut self) {
        let now = Utc::now();
        self.status = ContactStatus::Resolved;
        self.resolved_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_as_in_progress(&mut self) {
        self.status = ContactStatus::InProgress;
        self.updated_at = Utc::now();
    }

    pub fn is_new(&self) -> bool {
        self.status == ContactStatus::New
    }

    /// Time from submission to resolution, once resolved
    pub fn response_time(&self) -> Option<Duration> {
        self.resolved_at.map(|resolved| resolved - self.created_at)
    }

    /// Short reference quoted back to the submitter
    pub fn reference(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

/// Untrusted contact form body. Fields stay as raw JSON so a wrongly typed
/// value is reported against its field.
#[derive(Debug, Default, Deserialize)]
pub struct ContactSubmissionRequest {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub subject: Option<Value>,
    pub message: Option<Value>,
    pub phone: Option<Value>,
}

/// Contact form after field validation and normalisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: String,
}

impl ContactSubmissionRequest {
    /// Check every field, recording all failures in `errors`.
    /// Returns the cleaned form only when every field passed.
    pub fn check_fields(&self, errors: &mut FieldErrors) -> Option<ContactForm> {
        let email = errors.email("email", self.email.as_ref());
        let message = check_message(errors, self.message.as_ref());
        let name = errors.optional_text("name", self.name.as_ref(), Some(255));
        let subject = errors.optional_text("subject", self.subject.as_ref(), Some(255));
        let phone = errors.optional_text("phone", self.phone.as_ref(), Some(20));

        Some(ContactForm {
            name: name?,
            email: email?,
            subject: subject?,
            message: message?,
            phone: phone?,
        })
    }
}

/// Both length limits apply to the trimmed message
fn check_message(errors: &mut FieldErrors, value: Option<&Value>) -> Option<String> {
    let Some(raw) = errors.text_value("message", value)? else {
        errors.add("message", "required", super::validation::REQUIRED);
        return None;
    };

    let trimmed = raw.trim();
    if trimmed.chars().count() < MESSAGE_MIN_LENGTH {
        errors.add("message", "min_length", "Message must be at least 10 characters long");
        return None;
    }
    if trimmed.chars().count() > MESSAGE_MAX_LENGTH {
        errors.add("message", "max_length", "Message is too long (max 5000 characters)");
        return None;
    }

    Some(trimmed.to_string())
}

/// Row to insert: the cleaned form plus server-derived metadata
#[derive(Debug, Clone)]
pub struct NewContactSubmission {
    pub form: ContactForm,
    pub metadata: RequestMetadata,
}

#[derive(Debug, Serialize)]
pub struct ContactSubmissionResponse {
    pub success: bool,
    pub message: &'static str,
    pub submission_id: Uuid,
}

impl From<&ContactSubmission> for ContactSubmissionResponse {
    fn from(submission: &ContactSubmission) -> Self {
        Self {
            success: true,
            message: "Your message has been sent successfully! We will get back to you soon.",
            submission_id: submission.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::error_handling::field_errors_json;
    use crate::models::validation::INVALID_STRING;
    use serde_json::json;

    fn submission() -> ContactSubmission {
        let now = Utc::now();
        ContactSubmission {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            name: "Jane".to_string(),
            subject: String::new(),
            message: "Looking for a transmission".to_string(),
            phone: String::new(),
            status: ContactStatus::New,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
            ip_address: None,
            user_agent: String::new(),
        }
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            ContactStatus::New,
            ContactStatus::InProgress,
            ContactStatus::Resolved,
            ContactStatus::Closed,
        ] {
            assert_eq!(ContactStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ContactStatus::parse("archived"), None);
    }

    #[test]
    fn test_mark_as_resolved_sets_timestamp() {
        let mut submission = submission();
        assert!(submission.is_new());
        assert!(submission.response_time().is_none());

        submission.mark_as_resolved();

        assert_eq!(submission.status, ContactStatus::Resolved);
        assert!(!submission.is_new());
        assert!(submission.response_time().unwrap() >= Duration::zero());
    }

    #[test]
    fn test_mark_as_in_progress_leaves_resolved_at() {
        let mut submission = submission();
        submission.mark_as_in_progress();

        assert_eq!(submission.status, ContactStatus::InProgress);
        assert!(submission.resolved_at.is_none());
    }

    #[test]
    fn test_reference_is_first_eight_chars() {
        let submission = submission();
        assert_eq!(submission.reference().len(), 8);
        assert!(submission.id.to_string().starts_with(&submission.reference()));
    }

    #[test]
    fn test_valid_form_is_normalised() {
        let request = ContactSubmissionRequest {
            name: Some(json!("  Jane Doe ")),
            email: Some(json!("Jane@Example.com")),
            subject: None,
            message: Some(json!("  Need a 2004 Accord alternator  ")),
            phone: Some(json!(5551234567u64)),
        };
        let mut errors = FieldErrors::new();

        let form = request.check_fields(&mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(form.name, "Jane Doe");
        assert_eq!(form.email, "jane@example.com");
        assert_eq!(form.subject, "");
        assert_eq!(form.message, "Need a 2004 Accord alternator");
        assert_eq!(form.phone, "5551234567");
    }

    #[test]
    fn test_all_errors_reported_together() {
        let request = ContactSubmissionRequest {
            email: Some(json!("nope")),
            message: Some(json!("   short   ")),
            phone: Some(json!("1".repeat(25))),
            subject: Some(json!(["Brakes"])),
            ..Default::default()
        };
        let mut errors = FieldErrors::new();

        assert!(request.check_fields(&mut errors).is_none());

        let json = field_errors_json(&errors.into_inner());
        assert_eq!(json["email"], vec!["Please provide a valid email address"]);
        assert_eq!(json["message"], vec!["Message must be at least 10 characters long"]);
        assert_eq!(json["phone"], vec!["Ensure this field has no more than 20 characters."]);
        assert_eq!(json["subject"], vec![INVALID_STRING]);
    }

    #[test]
    fn test_message_upper_bound_ignores_surrounding_whitespace() {
        let padded = |len: usize| json!(format!("{}{}{}", " ".repeat(10), "a".repeat(len), "\n\n"));
        let mut errors = FieldErrors::new();

        let accepted = check_message(&mut errors, Some(&padded(MESSAGE_MAX_LENGTH))).unwrap();
        assert_eq!(accepted.chars().count(), MESSAGE_MAX_LENGTH);
        assert!(errors.is_empty());

        assert!(check_message(&mut errors, Some(&padded(MESSAGE_MAX_LENGTH + 1))).is_none());
        let json = field_errors_json(&errors.into_inner());
        assert_eq!(json["message"], vec!["Message is too long (max 5000 characters)"]);
    }
}
