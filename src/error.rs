use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowseError>;

/// Errors surfaced by the outer layers (CLI, config, script runner).
///
/// The browse engine itself never fails: selection and filter operations
/// degrade to no-ops or to the root state instead of returning errors.
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("category fetch failed: {0}")]
    Fetch(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("Error: {0}")]
    Generic(String),
}

impl From<String> for BrowseError {
    fn from(error: String) -> Self {
        BrowseError::Generic(error)
    }
}

impl From<&str> for BrowseError {
    fn from(error: &str) -> Self {
        BrowseError::Generic(error.to_string())
    }
}
