// ⚠️ Clinic errors - one typed error for the whole library
//
// Form gates (missing/invalid fields) never touch the store.
// Lookup misses are reported but leave the collections untouched.

use thiserror::Error;

use crate::session::Role;

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Required field is empty: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid value for {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("Amount must be a positive number, got '{value}'")]
    InvalidAmount { value: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} is {status}, cannot {action}")]
    InvalidState {
        kind: &'static str,
        id: String,
        status: &'static str,
        action: &'static str,
    },

    #[error("Role '{role}' is not allowed to {action}")]
    Forbidden { role: &'static str, action: &'static str },

    #[error("No form is open for {form}")]
    NoOpenForm { form: &'static str },

    #[error("Session is not authenticated")]
    NotAuthenticated,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ClinicError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn forbidden(role: Role, action: &'static str) -> Self {
        Self::Forbidden {
            role: role.as_str(),
            action,
        }
    }

    /// True for the "fill in the form" alerts, as opposed to lookup or IO failures
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidField { .. } | Self::InvalidAmount { .. }
        )
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;
