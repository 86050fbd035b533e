use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use snafu::Snafu;

use crate::database::InvalidReference;
use crate::service::aggregate::AggregateError;
use crate::service::catalog::CatalogError;
use crate::service::engagement::EngagementError;

/// The uniform failure envelope. Every service error is folded into one of
/// four classes before it leaves the request handler.
#[derive(Debug, Snafu)]
pub enum ApiError {
    #[snafu(display("{message}"))]
    Validation { message: String },

    #[snafu(display("{message}"))]
    NotFound { message: String },

    #[snafu(display("{message}"))]
    Forbidden { message: String },

    #[snafu(display("internal server error"))]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    status_code: u16,
    message: String,
    errors: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let envelope = ErrorEnvelope {
            status_code: status.as_u16(),
            message: self.to_string(),
            errors: Vec::new(),
        };

        (status, Json(envelope)).into_response()
    }
}

fn internal(error: impl std::fmt::Display) -> ApiError {
    tracing::error!(%error, "request failed");
    ApiError::Internal
}

impl From<InvalidReference> for ApiError {
    fn from(error: InvalidReference) -> Self {
        ApiError::Validation {
            message: error.to_string(),
        }
    }
}

impl From<EngagementError> for ApiError {
    fn from(error: EngagementError) -> Self {
        let message = error.to_string();
        match error {
            EngagementError::TargetNotFound { .. } | EngagementError::ChannelNotFound { .. } => {
                ApiError::NotFound { message }
            }
            EngagementError::SelfLike { .. } | EngagementError::SelfSubscription { .. } => {
                ApiError::Validation { message }
            }
            EngagementError::Database { .. } => internal(error),
        }
    }
}

impl From<AggregateError> for ApiError {
    fn from(error: AggregateError) -> Self {
        let message = error.to_string();
        match error {
            AggregateError::UserNotFound { .. } | AggregateError::VideoNotFound { .. } => {
                ApiError::NotFound { message }
            }
            AggregateError::Database { .. } => internal(error),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        let message = error.to_string();
        match error {
            CatalogError::MissingField { .. } => ApiError::Validation { message },
            CatalogError::VideoNotFound { .. } | CatalogError::CommentNotFound { .. } => {
                ApiError::NotFound { message }
            }
            CatalogError::NotOwner { .. } => ApiError::Forbidden { message },
            CatalogError::Database { .. } => internal(error),
        }
    }
}
