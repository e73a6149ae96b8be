//! The identity provider capability interface.

use async_trait::async_trait;

use crate::errors::AuthError;
use crate::types::{AccessToken, Account, ScopeSet};

/// Capabilities consumed from an identity provider.
///
/// Implementations own whatever session storage they need; callers only see
/// accounts and tokens.
#[async_trait]
pub trait IdentityBoundary: Send + Sync {
    /// The currently active account, if any. No I/O.
    fn active_account(&self) -> Option<Account>;

    /// Acquire a token without user interaction.
    async fn acquire_token_silent(
        &self,
        scopes: &ScopeSet,
        account: &Account,
    ) -> Result<AccessToken, AuthError>;

    /// Acquire a token through an interactive flow for the same account.
    async fn acquire_token_interactive(
        &self,
        scopes: &ScopeSet,
        account: &Account,
    ) -> Result<AccessToken, AuthError>;

    /// Run an interactive sign-in and make the resulting account active.
    async fn sign_in(&self, scopes: &ScopeSet) -> Result<Account, AuthError>;

    /// Forget the active account and any stored session.
    async fn sign_out(&self) -> Result<(), AuthError>;
}
