use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Row source failure: {0}")]
    RowSourceError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid country pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// The three outcomes a caller of the lookup API can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    ServerError,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn row_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RowSourceError(Box::new(err))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BadRequest { .. } => ErrorKind::BadRequest,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::ServerError,
        }
    }

    /// Text handed back to API clients. Internal details stay in the logs.
    pub fn user_friendly_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::BadRequest => "invalid request received",
            ErrorKind::NotFound => "the requested resource was not found on this server",
            ErrorKind::ServerError => "an error occurred while processing that request",
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
