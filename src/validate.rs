use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Accumulates field errors so a request reports every problem at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trimmed, non-empty text.
    pub fn required_text(&mut self, field: &str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.error(field, &format!("{field} is required"));
        }
        trimmed.to_string()
    }

    pub fn email(&mut self, field: &str, value: &str) -> String {
        let normalized = value.trim().to_lowercase();
        if !EMAIL_RE.is_match(&normalized) {
            self.error(field, "A valid email is required");
        }
        normalized
    }

    pub fn password(&mut self, field: &str, value: &str) {
        if value.len() < MIN_PASSWORD_LEN {
            self.error(
                field,
                &format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
    }

    pub fn int_range(&mut self, field: &str, value: i32, min: i32, max: i32) -> i32 {
        if value < min || value > max {
            self.error(field, &format!("{field} must be between {min} and {max}"));
        }
        value
    }

    pub fn uuid(&mut self, field: &str, value: &str) -> Option<Uuid> {
        match Uuid::parse_str(value.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                self.error(field, &format!("{field} must be a valid id"));
                None
            }
        }
    }

    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        match parse_date(value) {
            Some(date) => Some(date),
            None => {
                self.error(field, &format!("{field} must be an ISO 8601 date"));
                None
            }
        }
    }

    pub fn optional_date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        match value {
            Some(v) if !v.trim().is_empty() => self.date(field, v),
            _ => None,
        }
    }

    pub fn date_order(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                self.error("endDate", "endDate must not be before startDate");
            }
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part is kept).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Trim optional free text, collapsing blank strings to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Field deserializer telling an explicit `null` (`Some(None)`) apart from a
/// missing field (`None`, via `#[serde(default)]`).
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(parse_date("2025-01-15"), Some(expected));
        assert_eq!(parse_date("2025-01-15T09:30:00Z"), Some(expected));
        assert_eq!(parse_date("15/01/2025"), None);
    }

    #[test]
    fn collects_every_error() {
        let mut v = Validator::new();
        v.required_text("name", "   ");
        v.email("email", "not-an-email");
        v.password("password", "short");
        v.int_range("allocatedHours", 0, 1, 16);
        match v.finish() {
            Err(AppError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["name", "email", "password", "allocatedHours"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut v = Validator::new();
        let start = v.date("startDate", "2025-03-01");
        let end = v.optional_date("endDate", Some("2025-02-01"));
        v.date_order(start, end);
        assert!(v.finish().is_err());
    }

    #[test]
    fn malformed_ids_are_field_errors() {
        let mut v = Validator::new();
        assert!(v.uuid("userId", "demo-user").is_none());
        let id = Uuid::now_v7();
        assert_eq!(v.uuid("projectId", &id.to_string()), Some(id));
        match v.finish() {
            Err(AppError::Validation(errors)) => assert_eq!(errors[0].field, "userId"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn email_is_normalized() {
        let mut v = Validator::new();
        assert_eq!(v.email("email", "  Alex@Demo.COM "), "alex@demo.com");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" hi ".to_string())), Some("hi".to_string()));
    }
}
