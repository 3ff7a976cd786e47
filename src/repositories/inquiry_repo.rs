use async_trait::async_trait;
use anyhow::anyhow;
use sqlx::{postgres::PgRow, types::ipnetwork::IpNetwork, PgPool, Row};

use crate::middleware::error_handling::{AppError, Result};
use crate::models::{
    contact::{ContactStatus, ContactSubmission, NewContactSubmission},
    parts_inquiry::{NewPartsInquiry, PartsInquiry, PartsInquiryStatus},
    user::InquiryCounts,
};

#[async_trait]
pub trait InquiryRepository: Send + Sync {
    async fn create_contact_submission(&self, submission: NewContactSubmission) -> Result<ContactSubmission>;

    async fn create_parts_inquiry(&self, inquiry: NewPartsInquiry) -> Result<PartsInquiry>;

    async fn count_by_email(&self, email: &str) -> Result<InquiryCounts>;
}

pub struct PgInquiryRepository {
    pool: PgPool,
}

impl PgInquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InquiryRepository for PgInquiryRepository {
    async fn create_contact_submission(&self, submission: NewContactSubmission) -> Result<ContactSubmission> {
        let NewContactSubmission { form, metadata } = submission;

        let row = sqlx::query(
            r#"
            INSERT INTO contact_submissions (
                id, email, name, subject, message, phone, status, ip_address, user_agent
            )
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, email, name, subject, message, phone, status, admin_notes,
                      created_at, updated_at, resolved_at, ip_address, user_agent
            "#,
        )
        .bind(&form.email)
        .bind(&form.name)
        .bind(&form.subject)
        .bind(&form.message)
        .bind(&form.phone)
        .bind(ContactStatus::New.as_str())
        .bind(metadata.ip_address.map(IpNetwork::from))
        .bind(&metadata.user_agent)
        .fetch_one(&self.pool)
        .await?;

        contact_from_row(&row)
    }

    async fn create_parts_inquiry(&self, inquiry: NewPartsInquiry) -> Result<PartsInquiry> {
        let NewPartsInquiry { form, manufacturer_id, model_id, part_category_id, metadata } = inquiry;

        let row = sqlx::query(
            r#"
            INSERT INTO parts_inquiries (
                id, year, manufacturer_id, model_id, part_category_id, name, email, phone,
                zipcode, additional_notes, status, ip_address, user_agent
            )
            VALUES (gen_random_uuid(), $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, year, manufacturer_id, model_id, part_category_id, name, email, phone,
                      zipcode, additional_notes, status, admin_notes, created_at, updated_at,
                      completed_at, ip_address, user_agent
            "#,
        )
        .bind(form.year)
        .bind(manufacturer_id)
        .bind(model_id)
        .bind(part_category_id)
        .bind(&form.name)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.zipcode)
        .bind(&form.additional_notes)
        .bind(PartsInquiryStatus::New.as_str())
        .bind(metadata.ip_address.map(IpNetwork::from))
        .bind(&metadata.user_agent)
        .fetch_one(&self.pool)
        .await?;

        parts_inquiry_from_row(&row)
    }

    async fn count_by_email(&self, email: &str) -> Result<InquiryCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM contact_submissions WHERE email = $1) AS contact_submissions,
                (SELECT COUNT(*) FROM parts_inquiries WHERE email = $1) AS parts_inquiries
            "#,
        )
        .bind(email.to_lowercase())
        .fetch_one(&self.pool)
        .await?;

        Ok(InquiryCounts {
            contact_submissions: row.try_get("contact_submissions")?,
            parts_inquiries: row.try_get("parts_inquiries")?,
        })
    }
}

fn contact_from_row(row: &PgRow) -> Result<ContactSubmission> {
    let status: String = row.try_get("status")?;
    let ip_address: Option<IpNetwork> = row.try_get("ip_address")?;

    Ok(ContactSubmission {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        subject: row.try_get("subject")?,
        message: row.try_get("message")?,
        phone: row.try_get("phone")?,
        status: ContactStatus::parse(&status)
            .ok_or_else(|| AppError::Internal(anyhow!("Unknown contact status: {}", status)))?,
        admin_notes: row.try_get("admin_notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        resolved_at: row.try_get("resolved_at")?,
        ip_address: ip_address.map(|network| network.ip()),
        user_agent: row.try_get("user_agent")?,
    })
}

fn parts_inquiry_from_row(row: &PgRow) -> Result<PartsInquiry> {
    let status: String = row.try_get("status")?;
    let ip_address: Option<IpNetwork> = row.try_get("ip_address")?;

    Ok(PartsInquiry {
        id: row.try_get("id")?,
        year: row.try_get("year")?,
        manufacturer_id: row.try_get("manufacturer_id")?,
        model_id: row.try_get("model_id")?,
        part_category_id: row.try_get("part_category_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        zipcode: row.try_get("zipcode")?,
        additional_notes: row.try_get("additional_notes")?,
        status: PartsInquiryStatus::parse(&status)
            .ok_or_else(|| AppError::Internal(anyhow!("Unknown parts inquiry status: {}", status)))?,
        admin_notes: row.try_get("admin_notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at: row.try_get("completed_at")?,
        ip_address: ip_address.map(|network| network.ip()),
        user_agent: row.try_get("user_agent")?,
    })
}
