//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a settings
//! file may specify any subset of fields; the rest keep their defaults.

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "auth": { "clientId": "00000000-0000-0000-0000-000000000000", "tenantId": "contoso.onmicrosoft.com" },
///   "graph": { "requestTimeoutMs": 10000 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanboardSettings {
    /// Identity provider settings.
    pub auth: AuthSettings,
    /// Task-system API settings.
    pub graph: GraphSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Identity provider (Microsoft identity platform) settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthSettings {
    /// Authority host, without tenant.
    pub authority: String,
    /// Tenant ID or domain (`common`, `organizations`, a GUID, ...).
    pub tenant_id: String,
    /// Application (client) ID of the public client registration.
    pub client_id: String,
    /// Delegated permission scopes requested for every token.
    pub scopes: Vec<String>,
    /// Seconds before expiry at which a cached access token is considered stale.
    pub token_expiry_buffer_seconds: u64,
    /// Override for the session file location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            authority: "https://login.microsoftonline.com".to_string(),
            tenant_id: "common".to_string(),
            client_id: String::new(),
            scopes: vec![
                "User.Read".to_string(),
                "User.Read.All".to_string(),
                "Tasks.ReadWrite".to_string(),
                "Group.ReadWrite.All".to_string(),
            ],
            token_expiry_buffer_seconds: 300,
            session_file: None,
        }
    }
}

impl AuthSettings {
    /// `{authority}/{tenant}/oauth2/v2.0` endpoint prefix.
    pub fn endpoint_base(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

/// Remote task-system API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphSettings {
    /// Base URL every relative API path is joined onto.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Page size requested when listing directory users.
    pub user_page_size: u32,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            base_url: "https://graph.microsoft.com/v1.0".to_string(),
            request_timeout_ms: 30_000,
            user_page_size: 999,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
