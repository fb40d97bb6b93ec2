/// Errors from catalog fetches and asset downloads.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed catalog response: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Whether a retry with backoff could plausibly succeed.
    ///
    /// Timeouts, connection failures and 5xx/429 statuses are transient;
    /// 404s and malformed payloads are not.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Http(e) => e.is_timeout() || e.is_connect(),
            CatalogError::Status { status } => *status == 429 || *status >= 500,
            CatalogError::Parse(_) | CatalogError::Io(_) => false,
        }
    }
}
