use std::net::IpAddr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::reference::{Manufacturer, PartCategory, VehicleModel};
use super::validation::{json_type_name, parse_integer, FieldErrors, INVALID_INTEGER, REQUIRED};
use crate::utils::client_ip::RequestMetadata;

pub const MIN_YEAR: i32 = 1950;
/// Model years run this far ahead of the calendar
pub const YEARS_AHEAD: i32 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartsInquiryStatus {
    #[default]
    New,
    InProgress,
    Quoted,
    Completed,
    Cancelled,
}

impl PartsInquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartsInquiryStatus::New => "new",
            PartsInquiryStatus::InProgress => "in_progress",
            PartsInquiryStatus::Quoted => "quoted",
            PartsInquiryStatus::Completed => "completed",
            PartsInquiryStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(PartsInquiryStatus::New),
            "in_progress" => Some(PartsInquiryStatus::InProgress),
            "quoted" => Some(PartsInquiryStatus::Quoted),
            "completed" => Some(PartsInquiryStatus::Completed),
            "cancelled" => Some(PartsInquiryStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for PartsInquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PartsInquiry {
    pub id: Uuid,
    pub year: i32,
    pub manufacturer_id: Option<i32>,
    pub model_id: Option<i32>,
    pub part_category_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub zipcode: String,
    pub additional_notes: String,
    pub status: PartsInquiryStatus,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub ip_address: Option<IpAddr>,
    pub user_agent: String,
}

impl PartsInquiry {
    pub fn mark_as_completed(&mut self) {
        let now = Utc::now();
        self.status = PartsInquiryStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_as_in_progress(&mut self) {
        self.status = PartsInquiryStatus::InProgress;
        self.updated_at = Utc::now();
    }

    /// Uppercase short reference quoted back to the customer
    pub fn reference(&self) -> String {
        self.id.to_string()[..8].to_uppercase()
    }
}

/// Untrusted parts inquiry body.
///
/// Every field stays as raw JSON so a wrong type becomes a field error
/// instead of rejecting the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct PartsInquiryRequest {
    pub year: Option<Value>,
    pub manufacturer: Option<Value>,
    pub model: Option<Value>,
    pub part_category: Option<Value>,
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub zipcode: Option<Value>,
    pub additional_notes: Option<Value>,
}

/// Reference ids as submitted; unparseable ids are already reported
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceIds {
    pub manufacturer: Option<i64>,
    pub model: Option<i64>,
    pub part_category: Option<i64>,
}

/// Parts inquiry scalar fields after validation and normalisation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartsInquiryForm {
    pub year: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub zipcode: String,
    pub additional_notes: String,
}

impl PartsInquiryRequest {
    pub fn reference_ids(&self, errors: &mut FieldErrors) -> ReferenceIds {
        ReferenceIds {
            manufacturer: primary_key(errors, "manufacturer", self.manufacturer.as_ref()),
            model: primary_key(errors, "model", self.model.as_ref()),
            part_category: primary_key(errors, "part_category", self.part_category.as_ref()),
        }
    }

    pub fn check_fields(&self, errors: &mut FieldErrors, current_year: i32) -> Option<PartsInquiryForm> {
        let year = check_year(errors, self.year.as_ref(), current_year);
        let name = errors.text_with_min("name", self.name.as_ref(), 2, 255, "Please provide a valid name");
        let email = errors.email("email", self.email.as_ref());
        let phone = errors.text_with_min("phone", self.phone.as_ref(), 10, 20, "Please provide a valid phone number");
        let zipcode = errors.text_with_min("zipcode", self.zipcode.as_ref(), 5, 10, "Please provide a valid ZIP code");
        let additional_notes = errors.optional_text("additional_notes", self.additional_notes.as_ref(), None);

        Some(PartsInquiryForm {
            year: year?,
            name: name?,
            email: email?,
            phone: phone?,
            zipcode: zipcode?,
            additional_notes: additional_notes?,
        })
    }
}

fn check_year(errors: &mut FieldErrors, value: Option<&Value>, current_year: i32) -> Option<i32> {
    let Some(raw) = value else {
        errors.add("year", "required", REQUIRED);
        return None;
    };
    let Some(year) = parse_integer(raw) else {
        errors.add("year", "invalid", INVALID_INTEGER);
        return None;
    };

    let max_year = current_year + YEARS_AHEAD;
    if year < i64::from(MIN_YEAR) || year > i64::from(max_year) {
        errors.add(
            "year",
            "year_range",
            format!("Year must be between {} and {}", MIN_YEAR, max_year),
        );
        return None;
    }

    i32::try_from(year).ok()
}

fn primary_key(errors: &mut FieldErrors, field: &'static str, value: Option<&Value>) -> Option<i64> {
    let raw = value?;
    match parse_integer(raw) {
        Some(id) => Some(id),
        None => {
            errors.add(
                field,
                "incorrect_type",
                format!("Incorrect type. Expected pk value, received {}.", json_type_name(raw)),
            );
            None
        }
    }
}

pub fn missing_object_message(id: i64) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

pub const MODEL_MANUFACTURER_MISMATCH: &str = "Selected model does not belong to the selected manufacturer";

/// Reference rows resolved from the submitted ids
#[derive(Debug, Clone, Default)]
pub struct ResolvedReferences {
    pub manufacturer: Option<Manufacturer>,
    pub model: Option<VehicleModel>,
    pub part_category: Option<PartCategory>,
}

impl ResolvedReferences {
    /// A model supplied alongside a manufacturer must belong to it
    pub fn model_matches_manufacturer(&self) -> bool {
        match (&self.model, &self.manufacturer) {
            (Some(model), Some(manufacturer)) => model.manufacturer_id == manufacturer.id,
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPartsInquiry {
    pub form: PartsInquiryForm,
    pub manufacturer_id: Option<i32>,
    pub model_id: Option<i32>,
    pub part_category_id: Option<i32>,
    pub metadata: RequestMetadata,
}

/// Human readable vehicle/part summary echoed back and used in emails
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InquiryDetails {
    pub year: i32,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub part: Option<String>,
}

impl InquiryDetails {
    pub fn new(year: i32, references: &ResolvedReferences) -> Self {
        Self {
            year,
            manufacturer: references.manufacturer.as_ref().map(|m| m.name.clone()),
            model: references.model.as_ref().map(|m| m.name.clone()),
            part: references.part_category.as_ref().map(|c| c.name.clone()),
        }
    }

    pub fn vehicle(&self) -> String {
        [
            Some(self.year.to_string()),
            self.manufacturer.clone(),
            self.model.clone(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Serialize)]
pub struct PartsInquiryResponse {
    pub success: bool,
    pub message: &'static str,
    pub inquiry_id: Uuid,
    pub details: InquiryDetails,
}

impl PartsInquiryResponse {
    pub fn new(inquiry: &PartsInquiry, details: InquiryDetails) -> Self {
        Self {
            success: true,
            message: "Your parts inquiry has been submitted successfully! We will contact you soon with availability and pricing.",
            inquiry_id: inquiry.id,
            details,
        }
    }
}
