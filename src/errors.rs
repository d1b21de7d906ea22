use crate::validation::FieldViolation;
use axum::{http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Caller-correctable rejections raised by the ledger. None of them leave a
/// partial change behind.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("entry rejected:\n{}", list(.0))]
    Validation(Vec<FieldViolation>),

    #[error("an entry dated {date} already exists; submit a correction for that date instead")]
    DuplicateDate {
        date: NaiveDate,
        violations: Vec<FieldViolation>,
    },

    #[error("no entry dated {0}")]
    NotFound(NaiveDate),
}

impl LedgerError {
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation(violations) => violations,
            Self::DuplicateDate { violations, .. } => violations,
            Self::NotFound(_) => &[],
        }
    }
}

fn list(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub violations: Vec<FieldViolation>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    violations: Vec<FieldViolation>,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            violations: Vec::new(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let status = match err {
            LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::DuplicateDate { .. } => StatusCode::CONFLICT,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let message = match &err {
            LedgerError::Validation(_) => "entry rejected".to_string(),
            other => other.to_string(),
        };
        Self {
            status,
            message,
            violations: err.violations().to_vec(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            error: self.message,
            violations: self.violations,
        };
        (self.status, Json(body)).into_response()
    }
}
