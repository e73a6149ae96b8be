//! Orchestration error taxonomy.

use planboard_auth::AuthError;
use planboard_graph::GraphError;

/// Errors surfaced to the screens.
///
/// Sub-fetch failures on read paths are not errors: they degrade to
/// defaults and are reported through [`DataSource`](crate::DataSource) /
/// [`ListingStatus`](crate::ListingStatus) instead.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// No active account; route to sign-in.
    #[error("sign-in required")]
    AuthRequired,

    /// A token could not be obtained.
    #[error("token acquisition failed: {0}")]
    TokenAcquisitionFailed(#[source] AuthError),

    /// A listing could not be drained.
    #[error("remote listing failed: {0}")]
    RemotePageFetchFailed(#[source] GraphError),

    /// Input rejected before any remote call.
    #[error("invalid {field}: {message}")]
    ValidationFailed {
        /// Name of the offending field.
        field: &'static str,
        /// Message for the user.
        message: &'static str,
    },

    /// The create call failed.
    #[error("failed to create task: {0}")]
    TaskCreationFailed(#[source] GraphError),
}

impl PlannerError {
    /// Text to show the user. Causes stay in `Display` for diagnostics.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Please sign in to continue.",
            Self::TokenAcquisitionFailed(_) | Self::RemotePageFetchFailed(_) => {
                "Failed to load data. Please try again."
            }
            Self::ValidationFailed { message, .. } => *message,
            Self::TaskCreationFailed(_) => "Error creating task. Please try again.",
        }
    }

    /// The rejected field, for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::ValidationFailed { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<AuthError> for PlannerError {
    fn from(e: AuthError) -> Self {
        if e.is_auth_required() {
            Self::AuthRequired
        } else {
            Self::TokenAcquisitionFailed(e)
        }
    }
}

/// Reads that must succeed (the bucket lookup behind a default-bucket
/// create) propagate with `?`. Best-effort reads handle the error at the
/// call site instead.
impl From<GraphError> for PlannerError {
    fn from(e: GraphError) -> Self {
        Self::RemotePageFetchFailed(e)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PlannerError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
