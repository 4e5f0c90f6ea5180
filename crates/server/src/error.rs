use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;
use wordsim_common::WordSimError;

use crate::types::ErrorResponse;

/// HTTP-facing wrapper around `WordSimError`
#[derive(Debug)]
pub struct ApiError(pub WordSimError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WordSimError> for ApiError {
    fn from(err: WordSimError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self.status_code() {
            StatusCode::BAD_REQUEST => "invalid request",
            StatusCode::NOT_FOUND => "not found",
            _ => "internal error",
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error.to_string(),
            details: Some(self.0.to_string()),
        })
    }
}
