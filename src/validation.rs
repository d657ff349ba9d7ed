//! Manual DTO validation producing the itemized `validationErrors` envelope.

use crate::error::{ApiError, FieldError};

/// Collects field failures across a DTO and finishes into a single 400.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "must not be empty"));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.errors
                .push(FieldError::new(field, format!("must be at most {max} characters")));
        }
        self
    }

    pub fn rating(&mut self, field: &str, value: i16) -> &mut Self {
        if !(1..=5).contains(&value) {
            self.errors.push(FieldError::new(field, "must be between 1 and 5"));
        }
        self
    }

    /// `xx` or `xx-XX`
    pub fn locale(&mut self, field: &str, value: &str) -> &mut Self {
        let bytes = value.as_bytes();
        let valid = match bytes.len() {
            2 => bytes.iter().all(u8::is_ascii_lowercase),
            5 => {
                bytes[..2].iter().all(u8::is_ascii_lowercase)
                    && bytes[2] == b'-'
                    && bytes[3..].iter().all(u8::is_ascii_uppercase)
            }
            _ => false,
        };
        if !valid {
            self.errors
                .push(FieldError::new(field, "must be a locale like 'en' or 'en-US'"));
        }
        self
    }

    /// Site-relative path: must start with `/`.
    pub fn relative_path(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.starts_with('/') {
            self.errors.push(FieldError::new(field, "must start with '/'"));
        }
        self
    }

    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            self.errors.push(FieldError::new(field, "must be an http(s) URL"));
        }
        self
    }

    /// URL-safe identifier segment: lowercase alphanumerics and hyphens.
    pub fn slug(&mut self, field: &str, value: &str) -> &mut Self {
        let valid = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            self.errors.push(FieldError::new(
                field,
                "must contain only lowercase letters, digits and hyphens",
            ));
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_multiple_field_errors() {
        let mut v = Validator::new();
        v.require_non_empty("name", " ").rating("rating", 9);
        let err = v.finish().unwrap_err();
        let body = err.to_json();
        assert_eq!(body["validationErrors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn locale_accepts_short_and_regional_forms() {
        let mut v = Validator::new();
        v.locale("locale", "en").locale("locale", "en-US");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.locale("locale", "EN").locale("locale", "en_us").locale("locale", "english");
        let err = v.finish().unwrap_err();
        assert_eq!(err.to_json()["validationErrors"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn slug_rejects_uppercase_and_spaces() {
        let mut v = Validator::new();
        v.slug("slug", "hero-banner-2");
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.slug("slug", "Hero Banner");
        assert!(v.finish().is_err());
    }
}
