//! Error types for the eMarks site client.

#[derive(Debug, thiserror::Error)]
pub enum EmarksError {
    #[error("eMarks session is invalid or expired: {0}")]
    InvalidSession(String),
    #[error(transparent)]
    RequestFailed(#[from] anyhow::Error),
}
