//! Error taxonomy shared by the services and the HTTP surface.
//!
//! Every failure a request can hit ends up as one [`ApiError`], which renders
//! itself as a status code plus a `{"error": "..."}` body. Storage failures
//! are logged in full but only ever reported to the client as `"DB error"`.

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder, status};
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

/// JSON body sent with every error response.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Authentication is missing or failed.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// The underlying database read or write failed.
    #[error("DB error")]
    Storage(#[from] diesel::result::Error),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Unauthorized(_) => Status::Unauthorized,
            ApiError::Storage(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        if let ApiError::Storage(ref e) = self {
            error!(
                "Storage error on {} {}: {:?}",
                req.method(),
                req.uri().path(),
                e
            );
        }
        let body = Json(ErrorResponse::new(self.to_string()));
        status::Custom(self.status(), body).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("Date and riderName required".into()).status(),
            Status::BadRequest
        );
        assert_eq!(
            ApiError::Unauthorized("Invalid password").status(),
            Status::Unauthorized
        );
        assert_eq!(
            ApiError::Storage(diesel::result::Error::NotFound).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn test_storage_error_hides_details() {
        let err = ApiError::from(diesel::result::Error::RollbackTransaction);
        assert_eq!(err.to_string(), "DB error");
    }
}
