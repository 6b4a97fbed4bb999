use async_openai::error::OpenAIError;
use thiserror::Error;
use tokio::task::JoinError;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Extraction error: {0}")]
    Extraction(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Session error: {0}")]
    Session(String),
    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// True for failures that originate in the completion service.
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::OpenAI(_))
    }
}

impl From<axum_session::SessionError> for AppError {
    fn from(err: axum_session::SessionError) -> Self {
        Self::Session(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_class_covers_api_and_timeout_failures() {
        assert!(AppError::Upstream("timed out".into()).is_upstream());
        assert!(
            AppError::OpenAI(OpenAIError::InvalidArgument("bad model".into())).is_upstream()
        );
        assert!(!AppError::NotFound("7".into()).is_upstream());
        assert!(!AppError::Extraction("broken xref".into()).is_upstream());
    }
}
