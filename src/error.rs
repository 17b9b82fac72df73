use thiserror::Error;

/// Everything that can go wrong while talking to the search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider rejected the API key or engine id (HTTP 401/403).
    /// Retrying will not help, the configuration has to be fixed.
    #[error("authentication error (status {status}), API response: {body}")]
    Authentication { status: u16, body: String },

    /// Any other non-success answer from the provider.
    #[error("provider error, status code: {status}, response: {body}")]
    Provider { status: u16, body: String },

    /// Connection refused, timeout, DNS failure, broken body stream...
    /// The request url is stripped since it carries the API key.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A 2xx payload that does not carry the fields we require.
    #[error("malformed provider response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("search client is closed")]
    Closed,
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Transport(e.without_url())
    }
}

impl SearchError {
    /// Only credential problems are fatal; everything else is per-request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SearchError::Authentication { .. })
    }

    /// HTTP status reported by the provider, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Authentication { status, .. } | SearchError::Provider { status, .. } => {
                Some(*status)
            }
            SearchError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid search base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
