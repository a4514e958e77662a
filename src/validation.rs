//! Request validation rules and the JSON body extractor.
//!
//! Handlers deserialize the body into a typed payload (type mismatches are
//! rejected by [`AppJson`]), then run the remaining rules through a
//! [`Validator`]. Messages follow the wording the front end displays, e.g.
//! `"The title field is required."`.

use crate::errors::{Error, FieldErrors, Result};
use crate::query::parse_datetime;
use axum::extract::FromRequest;
use chrono::NaiveDateTime;

/// `Json` extractor whose rejection is a 422 validation error
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

fn label(field: &str) -> String {
    field.replace('_', " ")
}

/// Collects rule failures per field
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    /// Starts an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: String) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message);
    }

    /// Value must be present and not blank.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.fail(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    /// Value must be present.
    pub fn required_value<T>(&mut self, field: &str, value: Option<&T>) -> &mut Self {
        if value.is_none() {
            self.fail(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    /// Value, when present, must be an absolute http(s) URL.
    pub fn url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            let valid = reqwest::Url::parse(v)
                .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host());
            if !valid {
                self.fail(field, format!("The {} format is invalid.", label(field)));
            }
        }
        self
    }

    /// Value, when present, must parse as a date.
    pub fn date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDateTime> {
        let v = value?;
        let parsed = parse_datetime(v);
        if parsed.is_none() {
            self.fail(field, format!("The {} is not a valid date.", label(field)));
        }
        parsed
    }

    /// Records an `exists` failure when `found` is false.
    pub fn exists(&mut self, field: &str, found: bool) -> &mut Self {
        if !found {
            self.fail(field, format!("The selected {} is invalid.", label(field)));
        }
        self
    }

    /// Records a failure with a rule-specific message.
    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.fail(field, message.into());
        self
    }

    /// Whether any rule has failed so far.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Ends validation.
    ///
    /// # Errors
    /// Returns `Error::Validation` with every collected message if any rule failed.
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_missing_and_blank() {
        let mut v = Validator::new();
        v.required("title", None).required("description", Some("   "));
        v.required("name", Some("Taco Truck"));

        let Err(Error::Validation { errors }) = v.finish() else {
            panic!("expected validation error");
        };
        assert_eq!(errors["title"], vec!["The title field is required."]);
        assert!(errors.contains_key("description"));
        assert!(!errors.contains_key("name"));
    }

    #[test]
    fn test_url_rule() {
        let mut v = Validator::new();
        v.url("website", Some("https://foodfleet.com"))
            .url("twitter", None)
            .url("facebook", Some("not a url"))
            .url("instagram", Some("ftp://example.com"));

        let Err(Error::Validation { errors }) = v.finish() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["facebook"], vec!["The facebook format is invalid."]);
    }

    #[test]
    fn test_date_rule() {
        let mut v = Validator::new();
        assert!(v.date("expiration_at", Some("2021-01-01")).is_some());
        assert!(v.date("expiration_at", None).is_none());
        assert!(!v.has_errors());
        assert!(v.date("signed_at", Some("soon")).is_none());
        assert!(v.has_errors());
    }

    #[test]
    fn test_exists_and_empty_finish() {
        let mut v = Validator::new();
        v.exists("owner_uuid", true);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.exists("owner_uuid", false);
        let Err(Error::Validation { errors }) = v.finish() else {
            panic!("expected validation error");
        };
        assert_eq!(errors["owner_uuid"], vec!["The selected owner uuid is invalid."]);
    }
}
