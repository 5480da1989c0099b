//! Sign-in and registration forms, validated before any network call.

use crate::api::{LoginRequest, RegisterRequest};
use crate::{DashError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@.][^\s@]*\.[^\s@.]{2,}$").expect("email pattern compiles");
}

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Per-field validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DashError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest> {
        let mut errors = FieldErrors::new();
        if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email address");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result()?;

        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            remember_me: self.remember_me,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest> {
        let mut errors = FieldErrors::new();
        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            errors.add("name", "Full name must be at least 2 characters");
        }
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add("password", "Password must be at least 8 characters");
        }
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords don't match");
        }
        errors.into_result()?;

        Ok(RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// Structural email check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email(" ana.b@mail.example.org "));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana@@example.com"));
        assert!(!is_valid_email("an a@example.com"));
        assert!(!is_valid_email("ana@example.c"));
        assert!(!is_valid_email("ana@.example.com"));
        assert!(!is_valid_email("ana@mail.example.c"));
    }

    #[test]
    fn login_requires_email_and_password() {
        let err = LoginForm::default().validate().unwrap_err();
        match err {
            DashError::Validation(errors) => {
                assert_eq!(errors.get("email"), Some("Invalid email address"));
                assert_eq!(errors.get("password"), Some("Password is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let req = LoginForm {
            email: " ana@example.com".into(),
            password: "x".into(),
            remember_me: true,
        }
        .validate()
        .unwrap();
        assert_eq!(req.email, "ana@example.com");
        assert!(req.remember_me);
    }

    #[test]
    fn register_checks_every_field() {
        let form = RegisterForm {
            name: "A".into(),
            email: "".into(),
            password: "short".into(),
            confirm_password: "shorter".into(),
        };
        let DashError::Validation(errors) = form.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("confirmPassword"), Some("Passwords don't match"));
        assert!(errors.to_string().contains("name: Full name must be at least 2 characters"));
    }

    #[test]
    fn register_accepts_valid_form() {
        let form = RegisterForm {
            name: "Ana Lima".into(),
            email: "ana@example.com".into(),
            password: "correct horse".into(),
            confirm_password: "correct horse".into(),
        };
        let req = form.validate().unwrap();
        assert_eq!(req.name, "Ana Lima");
    }
}
