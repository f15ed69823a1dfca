use std::{io, path::PathBuf};

use thiserror::Error;

/// Everything that can go wrong between typing a city name and holding a report.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The city name was empty or whitespace only.
    #[error("Please enter a city name.")]
    EmptyCity,

    /// Network-level failure: timeout, DNS, refused connection.
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-2xx status.
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The background fetch task ended without producing an outcome.
    #[error("Weather request did not complete: {0}")]
    TaskFailed(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to initialise HTTP client: {0}")]
    Client(String),

    /// A valid response for a city outside the supported country.
    #[error("Only {demonym} cities are supported.")]
    DomainRejection {
        demonym: String,
        country: Option<String>,
    },

    /// A required field was missing or had the wrong type.
    #[error("Failed to parse data: {field}: {problem}")]
    Parse { field: String, problem: String },

    /// Writing a report to disk failed.
    #[error("Failed to save file {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of [`WeatherError`], used by callers to decide how to surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Transport,
    DomainRejection,
    Parse,
    Persistence,
}

impl ErrorKind {
    /// Only transport failures may succeed when the same query is retried later.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transport)
    }
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::EmptyCity => ErrorKind::InvalidInput,
            WeatherError::Transport(_)
            | WeatherError::Status { .. }
            | WeatherError::TaskFailed(_)
            | WeatherError::Client(_) => ErrorKind::Transport,
            WeatherError::DomainRejection { .. } => ErrorKind::DomainRejection,
            WeatherError::Parse { .. } => ErrorKind::Parse,
            WeatherError::Persistence { .. } => ErrorKind::Persistence,
        }
    }

    pub(crate) fn parse(field: impl Into<String>, problem: impl Into<String>) -> Self {
        WeatherError::Parse {
            field: field.into(),
            problem: problem.into(),
        }
    }
}
