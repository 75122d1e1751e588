use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Observation store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("No measurements in the observation store")]
    EmptyDataset,

    #[error("Stored date is not YYYY-MM-DD: {0}")]
    MalformedStoredDate(String),
}

impl DbError {
    /// HTTP status used when this error reaches a handler
    pub fn status_code(&self) -> StatusCode {
        match self {
            DbError::EmptyDataset => StatusCode::NOT_FOUND,
            DbError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DbError::MalformedStoredDate(_) | DbError::SqlxError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
