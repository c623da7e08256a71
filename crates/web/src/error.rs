use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
    NotFound,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::NotFound => write!(f, "Resource not found"),
        }
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(StorageError::DataIntegrity(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) | Self::NotFound => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(
                StorageError::ConstraintViolation(msg)
                | StorageError::InvalidInput(msg)
                | StorageError::DataIntegrity(msg),
            ) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(error: impl Into<WebError>) -> StatusCode {
        error.into().into_response().status()
    }

    #[test]
    fn test_storage_errors_map_to_status_codes() {
        assert_eq!(status(StorageError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(StorageError::ConstraintViolation("dup".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(StorageError::invalid_input("bad placement")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(StorageError::data_integrity("unknown multiplier")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(StorageError::Database(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_web_errors_map_to_status_codes() {
        assert_eq!(status(WebError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status(WebError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(WebError::BadRequest("week".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ValidationErrors::new()),
            StatusCode::BAD_REQUEST
        );
    }
}
