use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::patch::PatchError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i32 },

    #[error("resource already registered: {0}")]
    DuplicateResource(String),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("resource {resource_id} has no revision {fingerprint}")]
    UnknownRevision {
        resource_id: i32,
        fingerprint: String,
    },

    /// The replayed content does not hash to the fingerprint stored with it.
    #[error("revision {expected} of resource {resource_id} reconstructs to {actual}")]
    RevisionMismatch {
        resource_id: i32,
        expected: String,
        actual: String,
    },

    #[error("edit {edit_id}: {source}")]
    Patch {
        edit_id: i32,
        #[source]
        source: PatchError,
    },

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Begin, commit or rollback of a poll cycle's transaction failed.
    #[error("transaction failed: {0}")]
    Transaction(#[source] DbErr),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error("scheduler is not running")]
    SchedulerClosed,
}

/// Who is to blame for an error, as far as an API client is concerned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    Internal,
}

impl ErrorClass {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::BadRequest => 400,
            ErrorClass::Internal => 500,
        }
    }
}

impl Error {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Error::NotFound { .. }
            | Error::DuplicateResource(_)
            | Error::InvalidUrl { .. }
            | Error::UnknownRevision { .. } => ErrorClass::BadRequest,
            Error::RevisionMismatch { .. }
            | Error::Patch { .. }
            | Error::Fetch(_)
            | Error::Transaction(_)
            | Error::Database(_)
            | Error::SchedulerClosed => ErrorClass::Internal,
        }
    }
}

/// Body the routing layer sends back for a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: u16,
    pub error: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        ErrorResponse {
            status: err.class().status_code(),
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_bad_requests() {
        let err = Error::UnknownRevision {
            resource_id: 3,
            fingerprint: "deadbeef".repeat(5),
        };
        let resp = ErrorResponse::from(&err);
        assert_eq!(resp.status, 400);
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            format!(r#"{{"error":"resource 3 has no revision {}"}}"#, "deadbeef".repeat(5))
        );

        assert_eq!(Error::not_found("resource", 9).class(), ErrorClass::BadRequest);
        assert_eq!(
            Error::DuplicateResource("http://x/a".into()).class(),
            ErrorClass::BadRequest
        );
    }

    #[test]
    fn store_corruption_is_internal() {
        let err = Error::RevisionMismatch {
            resource_id: 1,
            expected: "a".repeat(40),
            actual: "b".repeat(40),
        };
        assert_eq!(ErrorResponse::from(&err).status, 500);
        assert_eq!(
            Error::Transaction(DbErr::Custom("boom".into())).class(),
            ErrorClass::Internal
        );
    }
}
