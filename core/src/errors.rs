use thiserror::Error;

/// Low-level errors raised while talking to Gemini or preparing a call
#[derive(Error, Debug)]
pub enum NoorError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Response Error: {0}")]
    ResponseError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error("Template Error: {0}")]
    TemplateError(String),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl From<minijinja::Error> for NoorError {
    fn from(err: minijinja::Error) -> Self {
        NoorError::TemplateError(err.to_string())
    }
}

/// Result type for low-level operations
pub type NoorResult<T> = Result<T, NoorError>;

/// The two failure kinds a guidance caller has to deal with.
///
/// `Validation` is raised before anything leaves the process. Everything that
/// goes wrong after that point collapses into `Upstream`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuidanceError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl GuidanceError {
    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            GuidanceError::Validation(msg) => msg.clone(),
            GuidanceError::Upstream(_) => "Failed to get guidance. Please try again.".to_string(),
        }
    }
}

impl From<NoorError> for GuidanceError {
    fn from(err: NoorError) -> Self {
        GuidanceError::Upstream(err.to_string())
    }
}

pub type GuidanceResult<T> = Result<T, GuidanceError>;
