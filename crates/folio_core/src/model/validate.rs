//! Write-side validation shared by all entity payloads.
//!
//! # Responsibility
//! - Reject incomplete or out-of-range payloads before any store request.
//!
//! # Invariants
//! - Validation is pure: it never touches the store.
//! - Patches validate only the columns they carry.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Payload rejected before it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required column is absent or blank.
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    /// A numeric column is outside its allowed range.
    OutOfRange {
        entity: &'static str,
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    /// Contact message sender address is malformed.
    InvalidEmail(String),
    /// Update payload carries no column at all.
    EmptyPatch { entity: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { entity, field } => {
                write!(f, "{entity}.{field} is required")
            }
            Self::OutOfRange {
                entity,
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{entity}.{field} must be within {min}..={max}, got {value}"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::EmptyPatch { entity } => write!(f, "{entity} update carries no fields"),
        }
    }
}

impl Error for ValidationError {}

/// Validation contract for insert and update payloads.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_opt_text(
    entity: &'static str,
    field: &'static str,
    value: Option<&String>,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => require_text(entity, field, value),
        None => Ok(()),
    }
}

pub(crate) fn require_range(
    entity: &'static str,
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            entity,
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidEmail(value.to_string()));
    }
    Ok(())
}

/// Returns the value of a required patch column when building a full insert
/// payload out of a patch.
pub(crate) fn take_required<T>(
    entity: &'static str,
    field: &'static str,
    value: Option<T>,
) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { entity, field })
}

#[cfg(test)]
mod tests {
    use super::{require_email, require_range, require_text, ValidationError};

    #[test]
    fn blank_text_is_missing() {
        let err = require_text("profile", "name", "   ").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                entity: "profile",
                field: "name"
            }
        );
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(require_range("skill", "proficiency", 1, 1, 5).is_ok());
        assert!(require_range("skill", "proficiency", 5, 1, 5).is_ok());
        assert!(require_range("skill", "proficiency", 6, 1, 5).is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(require_email("ana@x.com").is_ok());
        assert!(require_email("ana@x").is_err());
        assert!(require_email("ana x@x.com").is_err());
        assert!(require_email("@x.com").is_err());
    }
}
