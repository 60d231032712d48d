use remotepath_core::PathError;

/// A failure talking to the object store during `glob` or `open`.
///
/// Nothing here is retried; the first failure ends the operation.
#[derive(thiserror::Error, Debug)]
pub enum ObjectAccessError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Failure reported by a non-HTTP store.
    #[error("backend error: {message}")]
    Backend { message: String },
}

impl ObjectAccessError {
    /// The HTTP status, when the store answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ObjectAccessError::Status { status, .. } => Some(*status),
            ObjectAccessError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("object access error: {0}")]
    ObjectAccess(#[from] ObjectAccessError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("{feature} is not implemented")]
    NotImplemented { feature: &'static str },
}

impl Error {
    /// True if the store reported that the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectAccess(e) if e.status() == Some(404))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::ObjectAccess(ObjectAccessError::Transport(e))
    }
}
