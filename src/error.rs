pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend answered with a non-success status. Carries the response
    /// body verbatim so it can be shown to the user as-is.
    #[error("{0}")]
    Request(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No response body from {0}")]
    EmptyResponse(String),

    #[error("Profile is not loaded yet")]
    ProfileNotLoaded,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn from_response_text(text: String) -> Self {
        if text.is_empty() {
            Error::Request("API error".to_string())
        } else {
            Error::Request(text)
        }
    }
}
