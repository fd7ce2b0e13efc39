use thiserror::Error;

/// Errors produced by the browser, pipeline and collaborator layers.
///
/// The extractor itself never returns an error: malformed markup degrades to
/// fewer products instead.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    /// User supplied something that is not an absolute http(s) URL.
    /// The message is shown to the caller verbatim.
    #[error("{0}")]
    InvalidUrl(String),

    #[error("Summary failed: {0}")]
    SummaryFailed(String),

    #[error("{0}")]
    PersistenceFailed(String),

    #[error("No product at index {0}")]
    ProductNotFound(usize),
}

impl ScoutError {
    /// Whether this error happened while loading the page (as opposed to
    /// validating input or talking to a collaborator).
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ScoutError::LaunchFailed(_)
                | ScoutError::ConnectionFailed(_)
                | ScoutError::TabOperationFailed(_)
                | ScoutError::NavigationFailed(_)
                | ScoutError::EvaluationFailed(_)
                | ScoutError::DomParseFailed(_)
                | ScoutError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_message_is_verbatim() {
        let err = ScoutError::InvalidUrl("Please enter a valid URL.".to_string());
        assert_eq!(err.to_string(), "Please enter a valid URL.");
        assert!(!err.is_navigation());
    }

    #[test]
    fn test_navigation_classification() {
        assert!(ScoutError::NavigationFailed("refused".into()).is_navigation());
        assert!(ScoutError::Timeout(30_000).is_navigation());
        assert!(!ScoutError::PersistenceFailed("x".into()).is_navigation());
    }
}
