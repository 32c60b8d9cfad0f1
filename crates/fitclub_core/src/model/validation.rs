//! Field-level validation errors shared by all domain entities.
//!
//! # Invariants
//! - Every `FieldError` names exactly one wire field.
//! - `ValidationErrors` preserves the order in which checks ran.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// One failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required {
        field: &'static str,
    },
    TooLong {
        field: &'static str,
        max_chars: usize,
    },
    BelowMinimum {
        field: &'static str,
        min: i64,
        actual: i64,
    },
    AboveMaximum {
        field: &'static str,
        max: i64,
        actual: i64,
    },
    NilId {
        field: &'static str,
    },
    InvalidPhoneNumber,
    DuplicatePhoneNumber,
    InvalidUrl {
        field: &'static str,
        value: String,
    },
    InvalidMeasurement {
        field: &'static str,
        reason: &'static str,
    },
    FutureDate {
        field: &'static str,
        date: NaiveDate,
    },
    InvalidMembershipWindow {
        start: NaiveDate,
        end: NaiveDate,
    },
    UnknownReference {
        field: &'static str,
        id: Uuid,
    },
}

impl FieldError {
    /// Wire name of the field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::BelowMinimum { field, .. }
            | Self::AboveMaximum { field, .. }
            | Self::NilId { field }
            | Self::InvalidUrl { field, .. }
            | Self::InvalidMeasurement { field, .. }
            | Self::FutureDate { field, .. }
            | Self::UnknownReference { field, .. } => field,
            Self::InvalidPhoneNumber | Self::DuplicatePhoneNumber => "phone_number",
            Self::InvalidMembershipWindow { .. } => "membership_end",
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{field} is required"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::BelowMinimum { field, min, actual } => {
                write!(f, "{field} must be >= {min}, got {actual}")
            }
            Self::AboveMaximum { field, max, actual } => {
                write!(f, "{field} must be <= {max}, got {actual}")
            }
            Self::NilId { field } => write!(f, "{field} must not be the nil uuid"),
            Self::InvalidPhoneNumber => write!(
                f,
                "phone_number must look like `+999999999` with 9 to 15 digits"
            ),
            Self::DuplicatePhoneNumber => write!(f, "phone_number is already registered"),
            Self::InvalidUrl { field, value } => {
                write!(f, "{field} must be an http(s) url, got `{value}`")
            }
            Self::InvalidMeasurement { field, reason } => write!(f, "{field} {reason}"),
            Self::FutureDate { field, date } => write!(f, "{field} ({date}) is in the future"),
            Self::InvalidMembershipWindow { start, end } => write!(
                f,
                "membership_end ({end}) must be >= membership_start ({start})"
            ),
            Self::UnknownReference { field, id } => write!(f, "{field} references unknown id {id}"),
        }
    }
}

/// Ordered collection of field errors produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns whether any error was recorded against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field() == field)
    }

    /// Groups messages by field name for wire responses.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            grouped
                .entry(error.field().to_string())
                .or_default()
                .push(error.to_string());
        }
        grouped
    }

    /// Converts the collected errors into a result.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub(crate) fn check_text(&mut self, field: &'static str, value: &str, max_chars: usize) {
        if value.trim().is_empty() {
            self.push(FieldError::Required { field });
        } else if value.chars().count() > max_chars {
            self.push(FieldError::TooLong { field, max_chars });
        }
    }

    pub(crate) fn check_min(&mut self, field: &'static str, value: i64, min: i64) {
        if value < min {
            self.push(FieldError::BelowMinimum {
                field,
                min,
                actual: value,
            });
        }
    }

    pub(crate) fn check_range(&mut self, field: &'static str, value: i64, min: i64, max: i64) {
        if value > max {
            self.push(FieldError::AboveMaximum {
                field,
                max,
                actual: value,
            });
        } else {
            self.check_min(field, value, min);
        }
    }

    pub(crate) fn check_id(&mut self, field: &'static str, id: Uuid) {
        if id.is_nil() {
            self.push(FieldError::NilId { field });
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(value: FieldError) -> Self {
        Self {
            errors: vec![value],
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}
