use thiserror::Error;

/// Core error type with minimal dependencies
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    MalformedDateTime(String),

    #[error("unknown timezone: {0}")]
    InvalidZone(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CoreError {
    /// Stable kind name used in `Error: <kind>: <detail>` report lines.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedDateTime(_) => "MalformedDateTime",
            Self::InvalidZone(_) => "InvalidZone",
            Self::ConfigError(_) => "ConfigError",
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
