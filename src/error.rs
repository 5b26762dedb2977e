use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Meta};

pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Login required")]
    Unauthorized,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    /// Text safe to show to the end user in a flash message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound | AppError::BadRequest(_) | AppError::Unauthorized => {
                self.to_string()
            }
            AppError::Validation(errors) => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_)
        )
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized => return Redirect::to(LOGIN_PATH).into_response(),
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                tracing::error!(error = ?self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();
        let fields = match self {
            AppError::Validation(fields) => fields,
            _ => Vec::new(),
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData {
                error: message,
                fields,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_redirects_to_login() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).unwrap(),
            LOGIN_PATH
        );
    }

    #[test]
    fn internal_errors_are_not_shown_to_users() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert!(err.is_internal());
        assert!(!err.user_message().contains("10.0.0.3"));
    }

    #[test]
    fn validation_message_joins_field_messages() {
        let err = AppError::Validation(vec![
            FieldError::new("username", "Username is required"),
            FieldError::new("password", "Password is required"),
        ]);
        assert_eq!(
            err.user_message(),
            "Username is required, Password is required"
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
