//! Credential provider: identity boundary + fallback policy + default scopes.

use std::sync::Arc;

use crate::boundary::IdentityBoundary;
use crate::errors::AuthError;
use crate::policy::AcquisitionPolicy;
use crate::types::{AccessToken, Account, ScopeSet};

/// Hands out bearer tokens for the task-system API.
///
/// Every call re-requests a token from the boundary; caching, if any, is the
/// boundary's business.
#[derive(Clone)]
pub struct CredentialProvider {
    boundary: Arc<dyn IdentityBoundary>,
    policy: AcquisitionPolicy,
    default_scopes: ScopeSet,
}

impl CredentialProvider {
    /// Create a provider with the default (silent-then-interactive) policy.
    pub fn new(boundary: Arc<dyn IdentityBoundary>, default_scopes: ScopeSet) -> Self {
        Self {
            boundary,
            policy: AcquisitionPolicy::default(),
            default_scopes,
        }
    }

    /// Replace the acquisition policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AcquisitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The policy used by [`acquire_token`](Self::acquire_token).
    pub fn policy(&self) -> AcquisitionPolicy {
        self.policy
    }

    /// The full permission set the application needs.
    pub fn default_scopes(&self) -> &ScopeSet {
        &self.default_scopes
    }

    /// The active account, if any. No I/O.
    pub fn active_account(&self) -> Option<Account> {
        self.boundary.active_account()
    }

    /// The active account, or [`AuthError::AuthRequired`].
    pub fn require_account(&self) -> Result<Account, AuthError> {
        self.active_account().ok_or(AuthError::AuthRequired)
    }

    /// Obtain a token for `scopes` on behalf of `account`.
    pub async fn acquire_token(
        &self,
        scopes: &ScopeSet,
        account: &Account,
    ) -> Result<AccessToken, AuthError> {
        self.acquire_token_with(self.policy, scopes, account).await
    }

    /// Obtain a token with an explicit policy.
    pub async fn acquire_token_with(
        &self,
        policy: AcquisitionPolicy,
        scopes: &ScopeSet,
        account: &Account,
    ) -> Result<AccessToken, AuthError> {
        policy.acquire(self.boundary.as_ref(), scopes, account).await
    }

    /// Obtain a token for the default scope set.
    pub async fn acquire_default_token(&self, account: &Account) -> Result<AccessToken, AuthError> {
        self.acquire_token(&self.default_scopes, account).await
    }

    /// Sign in interactively with the default scope set.
    pub async fn sign_in(&self) -> Result<Account, AuthError> {
        self.boundary.sign_in(&self.default_scopes).await
    }

    /// Sign out of the active account.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.boundary.sign_out().await
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("policy", &self.policy)
            .field("default_scopes", &self.default_scopes)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
