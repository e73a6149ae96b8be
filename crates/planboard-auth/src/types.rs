//! Account, token, and scope types.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in identity-provider account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable account key (`{object id}.{tenant id}`).
    pub home_account_id: String,
    /// Sign-in name, usually an email address.
    pub username: String,
    /// Human-readable name, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Directory (tenant) the account signed in to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Account {
    /// Display name, falling back to the sign-in name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// An ordered, deduplicated set of permission scopes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(Vec<String>);

impl ScopeSet {
    /// Build from any string iterator, dropping blanks and duplicates.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for scope in scopes {
            let scope = scope.as_ref().trim();
            if !scope.is_empty() && !out.iter().any(|s| s == scope) {
                out.push(scope.to_string());
            }
        }
        Self(out)
    }

    /// Space-joined wire form.
    pub fn to_wire(&self) -> String {
        self.0.join(" ")
    }

    /// Iterate scopes in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether the set holds no scopes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every scope in `other` is present here (case-insensitive).
    pub fn covers(&self, other: &ScopeSet) -> bool {
        other
            .iter()
            .all(|o| self.iter().any(|s| s.eq_ignore_ascii_case(o)))
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

/// A bearer credential for a scope set.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    /// Scopes the token was requested for.
    pub scopes: ScopeSet,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token.
    pub fn new(secret: impl Into<String>, scopes: ScopeSet, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            scopes,
            expires_at,
        }
    }

    /// The raw bearer value.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether the token expires within `buffer` from now.
    pub fn expires_within(&self, buffer: Duration) -> bool {
        Utc::now() + buffer >= self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[redacted]")
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
