use thiserror::Error;

/// Failures that can reach an operator boundary.
///
/// A fenced-block miss during extraction is not an error; see
/// [`crate::extract::Extraction::Fallback`].
#[derive(Error, Debug)]
pub enum AssistError {
    #[error("remote service error: {0}")] RemoteService(String),
    #[error("lookup error: {0}")] Lookup(String),
    #[error("execution error: {0}")] Execution(String),
}

impl AssistError {
    pub fn remote(cause: impl std::fmt::Display) -> Self {
        AssistError::RemoteService(cause.to_string())
    }

    pub fn lookup(what: impl Into<String>) -> Self {
        AssistError::Lookup(what.into())
    }

    pub fn execution(cause: impl std::fmt::Display) -> Self {
        AssistError::Execution(cause.to_string())
    }
}

impl From<reqwest::Error> for AssistError {
    fn from(e: reqwest::Error) -> Self {
        AssistError::RemoteService(e.to_string())
    }
}
