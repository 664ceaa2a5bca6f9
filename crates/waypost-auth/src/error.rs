use thiserror::Error;

/// Result alias for session operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failures a login, registration, or header derivation can report.
/// Storage corruption is absent here - `TokenStore::load` degrades a corrupt
/// session to logged-out instead of returning an error.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to persist session: {0}")]
    Storage(anyhow::Error),

    #[error("Invalid authorization header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}
