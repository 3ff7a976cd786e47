//! Field-level validation helpers shared by the intake forms.
//!
//! Every check records its failure and keeps going, so one response carries
//! the errors for all fields at once.

use std::borrow::Cow;
use serde_json::Value;
use validator::{ValidationError, ValidationErrors};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_STRING: &str = "Not a valid string.";

pub fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

/// Accumulates errors keyed by field name
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: ValidationErrors,
    count: usize,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, code: &'static str, message: impl Into<Cow<'static, str>>) {
        self.errors.add(field, field_error(code, message));
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn into_inner(self) -> ValidationErrors {
        self.errors
    }

    /// Text arrives as a JSON string or number; `null` counts as absent.
    /// Any other type is recorded as an error and yields `None`.
    pub fn text_value<'a>(&mut self, field: &'static str, value: Option<&'a Value>) -> Option<Option<Cow<'a, str>>> {
        match value {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(Cow::Borrowed(s.as_str()))),
            Some(Value::Number(n)) => Some(Some(Cow::Owned(n.to_string()))),
            Some(_) => {
                self.add(field, "invalid", INVALID_STRING);
                None
            }
        }
    }

    /// Required text: missing → required, whitespace only → blank, too long → max length.
    /// Returns the trimmed value when it passes.
    pub fn required_text(&mut self, field: &'static str, value: Option<&Value>, max: usize) -> Option<String> {
        let Some(raw) = self.text_value(field, value)? else {
            self.add(field, "required", REQUIRED);
            return None;
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.add(field, "blank", BLANK);
            return None;
        }
        if trimmed.chars().count() > max {
            self.add(field, "max_length", max_length_message(max));
            return None;
        }

        Some(trimmed.to_string())
    }

    /// Optional text; absent and blank both become an empty string
    pub fn optional_text(&mut self, field: &'static str, value: Option<&Value>, max: Option<usize>) -> Option<String> {
        let raw = self.text_value(field, value)?;
        let trimmed = raw.as_deref().map(str::trim).unwrap_or_default();
        if let Some(max) = max {
            if trimmed.chars().count() > max {
                self.add(field, "max_length", max_length_message(max));
                return None;
            }
        }
        Some(trimmed.to_string())
    }

    /// Required text that must be at least `min` characters once trimmed
    pub fn text_with_min(
        &mut self,
        field: &'static str,
        value: Option<&Value>,
        min: usize,
        max: usize,
        message: &'static str,
    ) -> Option<String> {
        let value = self.required_text(field, value, max)?;
        if value.chars().count() < min {
            self.add(field, "min_length", message);
            return None;
        }
        Some(value)
    }

    /// Email check used by both forms: must contain `@`, stored lowercase
    pub fn email(&mut self, field: &'static str, value: Option<&Value>) -> Option<String> {
        let value = self.required_text(field, value, 255)?;
        if !value.contains('@') {
            self.add(field, "email", "Please provide a valid email address");
            return None;
        }
        Some(value.to_lowercase())
    }
}

impl From<FieldErrors> for ValidationErrors {
    fn from(errors: FieldErrors) -> Self {
        errors.errors
    }
}

/// Integers arrive as JSON numbers or numeric strings
pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
