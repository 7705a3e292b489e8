use thiserror::Error;

/// The target application answered, but not the way the journey expects:
/// wrong status, wrong landing URL, missing token, missing content or a
/// malformed JSON payload. Counted as `failed_journey`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub message: String,
    pub status: Option<u16>,
    pub url: Option<String>,
    pub missing: Vec<String>,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            url: None,
            missing: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_response(mut self, status: Option<u16>, url: impl Into<String>) -> Self {
        self.status = status;
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = missing;
        self
    }
}

/// The identity provider flow did not yield an authenticated session.
/// Counted as `auth_failure`, separately from application failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthenticationFailure {
    pub message: String,
    pub status: Option<u16>,
    pub url: Option<String>,
}

impl AuthenticationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            url: None,
        }
    }

    #[must_use]
    pub fn with_response(mut self, status: Option<u16>, url: impl Into<String>) -> Self {
        self.status = status;
        self.url = Some(url.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum JourneyError {
    #[error("Validation failure: {0}")]
    Validation(#[from] ValidationFailure),
    #[error("Authentication failure: {0}")]
    Authentication(#[from] AuthenticationFailure),
    /// A bug in the harness or its environment, never a measured outcome.
    #[error("Harness defect: {message}")]
    Defect { message: String },
}

impl JourneyError {
    pub fn defect(message: impl Into<String>) -> Self {
        JourneyError::Defect {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_classified(&self) -> bool {
        matches!(
            self,
            JourneyError::Validation(_) | JourneyError::Authentication(_)
        )
    }
}

impl From<url::ParseError> for JourneyError {
    fn from(err: url::ParseError) -> Self {
        JourneyError::defect(format!("Failed to build request URL: {}", err))
    }
}

pub type JourneyResult<T> = Result<T, JourneyError>;

/// Raised out of the orchestrator when an iteration hits a harness defect.
#[derive(Debug, Error)]
#[error("iteration for VU {vu} aborted in stage '{stage}': {message}")]
pub struct JourneyDefect {
    pub vu: u64,
    pub stage: &'static str,
    pub message: String,
}
