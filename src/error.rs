use std::collections::HashMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation {
        errors: HashMap<String, Vec<String>>,
    },

    #[error("Worker {worker_id} already has a record for {period}")]
    Duplicate { worker_id: String, period: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Duplicate { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        log::error!(
            "Request failed with status {}: {}",
            status_code,
            error_message
        );

        match self {
            // Validation carries the per-field detail map so the client can
            // annotate its form.
            AppError::Validation { errors } => HttpResponse::build(status_code)
                .json(ApiResponse::error_with_data(errors.clone(), &error_message)),
            _ => HttpResponse::build(status_code).json(ApiResponse::error(&error_message)),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::Database(error)
    }
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = HashMap::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        AppError::Validation { errors }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    /// True when the error is a unique-constraint violation on one of the
    /// per-period indexes, i.e. a concurrent writer won the race after our
    /// application-level duplicate check passed.
    pub fn is_period_conflict(error: &sqlx::Error) -> bool {
        match error {
            sqlx::Error::Database(db) => {
                db.code().as_deref() == Some("23505")
                    && db
                        .constraint()
                        .map(|c| c.starts_with("uniq_payroll_") || c.starts_with("uniq_billing_"))
                        .unwrap_or(false)
            }
            _ => false,
        }
    }
}
