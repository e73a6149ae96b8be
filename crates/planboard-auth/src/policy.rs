//! Token acquisition fallback policy.

use tracing::{info, warn};

use crate::boundary::IdentityBoundary;
use crate::errors::AuthError;
use crate::types::{AccessToken, Account, ScopeSet};

/// How a token is obtained from an [`IdentityBoundary`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AcquisitionPolicy {
    /// Silent acquisition only; its failure is returned unchanged.
    SilentOnly,
    /// Silent first; any silent failure falls back to the interactive flow
    /// for the same scopes and account.
    #[default]
    SilentThenInteractive,
}

impl AcquisitionPolicy {
    /// Acquire a token according to this policy.
    ///
    /// With [`SilentThenInteractive`](Self::SilentThenInteractive), the
    /// interactive path is attempted exactly once, and a double failure is
    /// reported as [`AuthError::TokenAcquisitionFailed`].
    #[tracing::instrument(skip_all, fields(policy = ?self, scopes = %scopes))]
    pub async fn acquire(
        self,
        boundary: &dyn IdentityBoundary,
        scopes: &ScopeSet,
        account: &Account,
    ) -> Result<AccessToken, AuthError> {
        let silent = match boundary.acquire_token_silent(scopes, account).await {
            Ok(token) => return Ok(token),
            Err(e) => e,
        };

        match self {
            Self::SilentOnly => Err(silent),
            Self::SilentThenInteractive => {
                info!(error = %silent, "silent token acquisition failed, falling back to interactive");
                match boundary.acquire_token_interactive(scopes, account).await {
                    Ok(token) => Ok(token),
                    Err(interactive) => {
                        warn!(error = %interactive, "interactive token acquisition failed");
                        Err(AuthError::TokenAcquisitionFailed {
                            silent: Box::new(silent),
                            interactive: Box::new(interactive),
                        })
                    }
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
