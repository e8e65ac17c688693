use std::error::Error as StdError;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors returned by [`WeatherClient`](crate::WeatherClient).
#[derive(Debug, Error)]
pub enum WeatherError {
    /// A mode or format outside the accepted set. Raised before any request is sent.
    #[error("{0}")]
    InvalidArgument(String),

    /// The transport failed. Carries the original message and code, and keeps the
    /// original error as the source.
    #[error("{message}")]
    Http {
        message: String,
        code: Option<u16>,
        #[source]
        source: TransportError,
    },

    /// A successful response whose body is not valid JSON.
    #[error("Failed to decode weather response as JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl WeatherError {
    /// Numeric code of an `Http` error, if the transport reported one.
    pub fn code(&self) -> Option<u16> {
        match self {
            WeatherError::Http { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<TransportError> for WeatherError {
    fn from(err: TransportError) -> Self {
        WeatherError::Http {
            message: err.message.clone(),
            code: err.code,
            source: err,
        }
    }
}

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    code: Option<u16>,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            source: None,
        }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for status failures, `None` for connection-level failures.
    pub fn code(&self) -> Option<u16> {
        self.code
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(mut err: reqwest::Error) -> Self {
        // The query string carries the API key.
        if let Some(url) = err.url_mut() {
            url.set_query(None);
        }

        Self {
            message: err.to_string(),
            code: err.status().map(|status| status.as_u16()),
            source: Some(Box::new(err)),
        }
    }
}
