use axum::Json;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::middleware::{RateLimitHeaders, apply_rate_limit_headers};
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required parameter: query")]
    MissingQuery,
    #[error("per_page must be between 1 and 30")]
    PerPageOutOfRange,
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("Unsplash API key not configured")]
    MissingCredential,
    #[error("Too many requests")]
    RateLimited {
        headers: RateLimitHeaders,
        retry_after_secs: u64,
    },
    #[error("Failed to fetch images from Unsplash")]
    Upstream(#[from] UpstreamError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingQuery | AppError::PerPageOutOfRange | AppError::InvalidPage => {
                StatusCode::BAD_REQUEST
            }
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::MissingCredential | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut headers = HeaderMap::new();

        let body = match &self {
            AppError::MissingQuery | AppError::PerPageOutOfRange | AppError::InvalidPage => {
                ErrorResponse {
                    error: self.to_string(),
                    message: None,
                    retry_after: None,
                }
            }
            AppError::MissingCredential => ErrorResponse {
                error: self.to_string(),
                message: Some("Set UNSPLASH_ACCESS_KEY and restart the server".to_string()),
                retry_after: None,
            },
            AppError::RateLimited {
                headers: limit_headers,
                retry_after_secs,
            } => {
                apply_rate_limit_headers(&mut headers, limit_headers);
                headers.insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
                ErrorResponse {
                    error: self.to_string(),
                    message: Some(format!(
                        "Rate limit exceeded. Please try again in {} seconds.",
                        retry_after_secs
                    )),
                    retry_after: Some(*retry_after_secs),
                }
            }
            AppError::Upstream(cause) => ErrorResponse {
                error: self.to_string(),
                message: Some(cause.to_string()),
                retry_after: None,
            },
        };

        (status, headers, Json(body)).into_response()
    }
}
