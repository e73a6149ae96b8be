//! Graph error types.

/// Errors returned by the Graph client.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// HTTP transport failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Graph answered with a non-success status.
    #[error("Graph API error ({status} {code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Graph error code (e.g. `Forbidden`), or `unknown`.
        code: String,
        /// Error message, or the raw body when no envelope was present.
        message: String,
    },

    /// A page of a paginated listing could not be fetched; items from
    /// earlier pages are discarded.
    #[error("failed to fetch page {page}: {source}")]
    RemotePageFetchFailed {
        /// 1-based page number that failed.
        page: usize,
        /// Underlying failure.
        #[source]
        source: Box<GraphError>,
    },
}

impl GraphError {
    /// HTTP status of an API error, looking through page failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RemotePageFetchFailed { source, .. } => source.status(),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Json(_) => None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GraphError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = GraphError::Api {
            status: 403,
            code: "Forbidden".into(),
            message: "Insufficient privileges".into(),
        };
        assert_eq!(
            err.to_string(),
            "Graph API error (403 Forbidden): Insufficient privileges"
        );
    }

    #[test]
    fn page_failure_exposes_inner_status() {
        let err = GraphError::RemotePageFetchFailed {
            page: 2,
            source: Box::new(GraphError::Api {
                status: 503,
                code: "unknown".into(),
                message: String::new(),
            }),
        };
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().starts_with("failed to fetch page 2"));
    }
}
