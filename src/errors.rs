use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// Custom result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid_endpoint(url: &str) -> Self {
        Self::InvalidEndpoint {
            url: url.to_string(),
        }
    }

    pub fn initialization(reason: impl Into<String>) -> Self {
        Self::Initialization(reason.into())
    }
}

/// Why a single file could not be analysed.
///
/// The `Display` text is what ends up in the failure node, so keep it short
/// and readable. None of these abort the rest of the submission.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Could not read {file_name}: {source}")]
    Read {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Network error: could not reach the analysis service")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP error! Status: {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid response format")]
    InvalidFormat,

    #[error("No labels data received")]
    NoLabels,
}

impl UploadError {
    /// The endpoint answered but the body was not a usable analysis result.
    pub fn is_format(&self) -> bool {
        matches!(self, UploadError::InvalidFormat | UploadError::NoLabels)
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => UploadError::HttpStatus {
                status: status.as_u16(),
            },
            None => UploadError::Transport(error),
        }
    }
}
