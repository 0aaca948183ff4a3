use database::{DatabaseError, ErrorKind};
use serde::Serialize;

/// What the protocol layer sends back for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: u16,
    pub detail: String,
}

impl From<&DatabaseError> for ErrorResponse {
    fn from(err: &DatabaseError) -> Self {
        let (status, detail) = match (err.kind(), err) {
            (ErrorKind::Validation, DatabaseError::Validation(v)) => (400, v.to_string()),
            (ErrorKind::Validation, _) => (400, err.to_string()),
            (ErrorKind::NotFound, _) => (404, "slot corrupted or does not exist".to_string()),
            (ErrorKind::UniquenessConflict, _) => (
                409,
                "save conflicted with a concurrent request, try again".to_string(),
            ),
            (ErrorKind::Storage, _) => {
                tracing::error!("Storage failure: {}", err);
                (500, "storage failure".to_string())
            }
        };
        Self { status, detail }
    }
}
