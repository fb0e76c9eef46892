//! Application-wide error types.

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Every error is raised where it is detected and propagated unchanged to the
/// HTTP boundary. None of them is retryable.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level validation failures, keyed by field name.
    #[error("Validation error: invalid fields: {}", field_list(.0))]
    InvalidFields(BTreeMap<String, Vec<String>>),

    /// Business rule guard (e.g., account has ledger activity, unbalanced reconciliation).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Domain rule failure carrying its own status and code.
    #[error("{message}")]
    Rule {
        /// HTTP status (400, 404 or 409).
        status: u16,
        /// Domain error code, e.g. `ACCOUNT_HAS_ACTIVITY`.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn field_list(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields.keys().cloned().collect::<Vec<_>>().join(", ")
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::InvalidFields(_) => 400,
            Self::Conflict(_) => 409,
            Self::Rule { status, .. } => *status,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) | Self::InvalidFields(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Rule { status, .. } => match *status {
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                _ => "VALIDATION_ERROR",
            },
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the domain code of a rule failure.
    #[must_use]
    pub const fn domain_code(&self) -> Option<&'static str> {
        match self {
            Self::Rule { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the failing fields for field-level validation errors.
    #[must_use]
    pub const fn fields(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Self::InvalidFields(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns true for errors caused by infrastructure rather than the caller.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Builds a domain rule failure.
    #[must_use]
    pub fn rule(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self::Rule {
            status,
            code,
            message: message.into(),
        }
    }

    /// Builds a single-field validation error.
    #[must_use]
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::InvalidFields(fields)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), ToString::to_string)
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self::InvalidFields(fields)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
