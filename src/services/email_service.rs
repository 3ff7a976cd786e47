/// Transactional email over a Resend-compatible HTTP API
///
/// `POST {api_url}/emails` with a bearer API key. Bodies are plain text.

use serde::Serialize;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::{
    contact::ContactSubmission,
    parts_inquiry::{InquiryDetails, PartsInquiry},
};
use crate::utils::log_sanitizer::mask_email;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email provider is not configured")]
    NotConfigured,

    #[error("No recipients configured")]
    NoRecipients,

    #[error("Email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email provider rejected message: HTTP {status}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

pub fn contact_notification(submission: &ContactSubmission, from: &str, to: &[String]) -> OutgoingEmail {
    let text = format!(
        "New Contact Form Submission - Nexxa Auto Parts\n\n\
         Email: {email}\n\
         Name: {name}\n\
         Subject: {subject}\n\
         Phone: {phone}\n\n\
         Message:\n{message}\n\n\
         Submitted: {submitted}\n\
         Submission ID: {id}\n\n\
         Reply directly to this email to respond to the customer.\n",
        email = submission.email,
        name = or_placeholder(&submission.name, "Not provided"),
        subject = or_placeholder(&submission.subject, "No subject"),
        phone = or_placeholder(&submission.phone, "Not provided"),
        message = submission.message,
        submitted = submission.created_at.format("%B %d, %Y at %I:%M %p"),
        id = submission.id,
    );

    OutgoingEmail {
        from: from.to_string(),
        to: to.to_vec(),
        subject: format!(
            "New Contact Form Submission - {}",
            or_placeholder(&submission.subject, "No Subject")
        ),
        text,
        reply_to: Some(submission.email.clone()),
    }
}

pub fn contact_auto_reply(submission: &ContactSubmission, from: &str) -> OutgoingEmail {
    let text = format!(
        "Thank You for Contacting Us!\n\n\
         Hi {name},\n\n\
         Thank you for reaching out to Nexxa Auto Parts!\n\n\
         We have received your message and our team will review it shortly.\n\n\
         Your Message Summary:\n\
         Subject: {subject}\n\
         Reference ID: {reference}\n\n\
         If you have any urgent concerns, please feel free to call us or send another message.\n\n\
         Best regards,\n\
         The Nexxa Auto Parts Team\n",
        name = or_placeholder(&submission.name, "there"),
        subject = or_placeholder(&submission.subject, "General Inquiry"),
        reference = submission.reference(),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![submission.email.clone()],
        subject: "We received your message - Nexxa Auto Parts".to_string(),
        text,
        reply_to: None,
    }
}

pub fn parts_inquiry_notification(
    inquiry: &PartsInquiry,
    details: &InquiryDetails,
    from: &str,
    to: &[String],
) -> OutgoingEmail {
    let text = format!(
        "New Parts Request - Nexxa Auto Parts\n\n\
         VEHICLE INFORMATION\n\
         Year: {year}\n\
         Manufacturer: {manufacturer}\n\
         Model: {model}\n\
         Part Category: {part}\n\n\
         CUSTOMER INFORMATION\n\
         Name: {name}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         ZIP Code: {zipcode}\n\n\
         {notes}\
         REQUEST DETAILS\n\
         Submitted: {submitted}\n\
         Request ID: {id}\n\n\
         Reply to: {email}\n\
         Reference: {reference}\n",
        year = details.year,
        manufacturer = details.manufacturer.as_deref().unwrap_or("Not specified"),
        model = details.model.as_deref().unwrap_or("Not specified"),
        part = details.part.as_deref().unwrap_or("Not specified"),
        name = inquiry.name,
        email = inquiry.email,
        phone = inquiry.phone,
        zipcode = inquiry.zipcode,
        notes = if inquiry.additional_notes.is_empty() {
            String::new()
        } else {
            format!("ADDITIONAL NOTES\n{}\n\n", inquiry.additional_notes)
        },
        submitted = inquiry.created_at.format("%B %d, %Y at %I:%M %p"),
        id = inquiry.id,
        reference = inquiry.reference(),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: to.to_vec(),
        subject: format!("New Parts Request - {}", details.vehicle()),
        text,
        reply_to: Some(inquiry.email.clone()),
    }
}

pub fn parts_inquiry_auto_reply(inquiry: &PartsInquiry, details: &InquiryDetails, from: &str) -> OutgoingEmail {
    let text = format!(
        "Request Received - Nexxa Auto Parts\n\n\
         Hi {name},\n\n\
         Thank you for choosing Nexxa Auto Parts! We've received your parts request and our \
         team is already working on finding the right match for your vehicle.\n\n\
         YOUR REQUEST SUMMARY\n\
         Vehicle: {vehicle}\n\
         Part Category: {part}\n\
         Submitted: {submitted}\n\n\
         YOUR REFERENCE NUMBER\n\
         {reference}\n\
         (Please save this for future reference)\n\n\
         WHAT HAPPENS NEXT?\n\
         Our parts specialists will check availability and pricing and send you a detailed quote.\n\n\
         Need to add something or have questions? Just reply to this email!\n\n\
         Best regards,\n\
         The Nexxa Auto Parts Team\n",
        name = inquiry.name,
        vehicle = details.vehicle(),
        part = details.part.as_deref().unwrap_or("Not specified"),
        submitted = inquiry.created_at.format("%B %d, %Y"),
        reference = inquiry.reference(),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![inquiry.email.clone()],
        subject: "We're Finding Your Parts - Nexxa Auto Parts".to_string(),
        text,
        reply_to: None,
    }
}

pub struct EmailService {
    http_client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from_address: String,
    operator_recipients: Vec<String>,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            operator_recipients: config.operator_recipients.clone(),
        }
    }

    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let api_key = self.api_key.as_deref().ok_or(EmailError::NotConfigured)?;
        if email.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        let response = self
            .http_client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status: status.as_u16(), body });
        }

        tracing::info!(
            "Email sent to {} recipient(s): {}",
            email.to.len(),
            email.to.iter().map(|to| mask_email(to)).collect::<Vec<_>>().join(", ")
        );
        Ok(())
    }

    pub async fn send_contact_notification(&self, submission: &ContactSubmission) -> Result<(), EmailError> {
        self.send(&contact_notification(submission, &self.from_address, &self.operator_recipients))
            .await
    }

    pub async fn send_contact_auto_reply(&self, submission: &ContactSubmission) -> Result<(), EmailError> {
        self.send(&contact_auto_reply(submission, &self.from_address)).await
    }

    pub async fn send_parts_inquiry_notification(
        &self,
        inquiry: &PartsInquiry,
        details: &InquiryDetails,
    ) -> Result<(), EmailError> {
        self.send(&parts_inquiry_notification(
            inquiry,
            details,
            &self.from_address,
            &self.operator_recipients,
        ))
        .await
    }

    pub async fn send_parts_inquiry_auto_reply(
        &self,
        inquiry: &PartsInquiry,
        details: &InquiryDetails,
    ) -> Result<(), EmailError> {
        self.send(&parts_inquiry_auto_reply(inquiry, details, &self.from_address)).await
    }
}
