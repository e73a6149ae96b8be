//! Auth error types.

/// Errors that can occur while signing in or acquiring tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The token endpoint rejected a request.
    #[error("OAuth error ({status}): {message}")]
    OAuth {
        /// HTTP status code.
        status: u16,
        /// Error code and description from the response.
        message: String,
    },

    /// No account is signed in.
    #[error("sign-in required")]
    AuthRequired,

    /// A token cannot be obtained without user interaction.
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    /// The device code expired before the user completed sign-in.
    #[error("device code expired before sign-in completed")]
    DeviceCodeExpired,

    /// The user declined the sign-in request.
    #[error("sign-in was declined")]
    AuthorizationDeclined,

    /// The ID token could not be decoded into an account.
    #[error("invalid id token: {0}")]
    InvalidIdToken(String),

    /// A token was issued for a different account than the one requested.
    #[error("signed in as {actual}, expected {expected}")]
    AccountMismatch {
        /// Username of the requested account.
        expected: String,
        /// Username the identity provider returned.
        actual: String,
    },

    /// A required setting is missing.
    #[error("identity provider not configured: {0}")]
    NotConfigured(String),

    /// Both the silent and the interactive path failed.
    #[error("token acquisition failed (silent: {silent}; interactive: {interactive})")]
    TokenAcquisitionFailed {
        /// Why the silent path failed.
        silent: Box<AuthError>,
        /// Why the interactive fallback failed.
        interactive: Box<AuthError>,
    },
}

impl AuthError {
    /// Whether the caller should route the user to sign-in.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
