//! Microsoft identity platform (v2.0 endpoints) implementation of
//! [`IdentityBoundary`].
//!
//! - Silent path: in-memory access-token cache keyed by scope set, then the
//!   OAuth2 `refresh_token` grant with the stored refresh token
//! - Interactive path: OAuth2 device authorization grant; the user code and
//!   verification URL are handed to a [`DeviceCodePrompt`]
//!
//! The account and the latest refresh token are persisted via
//! [`crate::session`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use planboard_settings::{PlanboardSettings, planboard_dir};

use crate::boundary::IdentityBoundary;
use crate::claims::account_from_id_token;
use crate::errors::AuthError;
use crate::session::{SessionRecord, clear_session, load_session, save_session, session_file_path};
use crate::types::{AccessToken, Account, ScopeSet};

/// Scopes added to every request so the response carries an ID token and a
/// refresh token.
const RESERVED_SCOPES: &str = "openid profile offline_access";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Added to the polling interval on a `slow_down` response.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Connection settings for [`MicrosoftIdentity`].
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    /// `{authority}/{tenant}/oauth2/v2.0`.
    pub endpoint_base: String,
    /// Public client application ID.
    pub client_id: String,
    /// Seconds before expiry at which a cached token is refreshed.
    pub expiry_buffer_seconds: u64,
    /// Where the session file lives.
    pub session_path: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl IdentityConfig {
    /// Derive the configuration from loaded settings.
    pub fn from_settings(settings: &PlanboardSettings) -> Self {
        let session_path = settings
            .auth
            .session_file
            .as_ref()
            .map_or_else(|| session_file_path(&planboard_dir()), PathBuf::from);
        Self {
            endpoint_base: settings.auth.endpoint_base(),
            client_id: settings.auth.client_id.clone(),
            expiry_buffer_seconds: settings.auth.token_expiry_buffer_seconds,
            session_path,
            timeout: Duration::from_millis(settings.graph.request_timeout_ms),
        }
    }
}

/// What the user needs to complete a device code sign-in.
#[derive(Clone, Debug)]
pub struct DeviceCode {
    /// Code to enter at the verification URL.
    pub user_code: String,
    /// Where to enter it.
    pub verification_uri: String,
    /// Ready-made instruction text from the provider.
    pub message: String,
    /// Seconds until the code expires.
    pub expires_in: u64,
}

/// Shows a device code to the user.
pub trait DeviceCodePrompt: Send + Sync {
    /// Present the code. Called once per interactive flow.
    fn show(&self, code: &DeviceCode);
}

impl<F> DeviceCodePrompt for F
where
    F: Fn(&DeviceCode) + Send + Sync,
{
    fn show(&self, code: &DeviceCode) {
        self(code);
    }
}

#[derive(Default)]
struct IdentityState {
    account: Option<Account>,
    refresh_token: Option<String>,
    tokens: HashMap<String, AccessToken>,
}

/// Identity boundary backed by the Microsoft identity platform.
pub struct MicrosoftIdentity {
    client: reqwest::Client,
    config: IdentityConfig,
    prompt: Arc<dyn DeviceCodePrompt>,
    state: Mutex<IdentityState>,
}

impl MicrosoftIdentity {
    /// Create the boundary, restoring any persisted session.
    pub fn new(config: IdentityConfig, prompt: Arc<dyn DeviceCodePrompt>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let mut state = IdentityState::default();
        if let Some(record) = load_session(&config.session_path) {
            debug!(account = %record.account.username, "restored session");
            state.account = Some(record.account);
            state.refresh_token = Some(record.refresh_token);
        }

        Ok(Self {
            client,
            config,
            prompt,
            state: Mutex::new(state),
        })
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.config.endpoint_base)
    }

    fn device_code_url(&self) -> String {
        format!("{}/devicecode", self.config.endpoint_base)
    }

    fn expiry_buffer(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.config.expiry_buffer_seconds).unwrap_or(0))
    }

    fn ensure_configured(&self) -> Result<(), AuthError> {
        if self.config.client_id.trim().is_empty() {
            return Err(AuthError::NotConfigured(
                "auth.clientId is empty (set PLANBOARD_CLIENT_ID)".into(),
            ));
        }
        Ok(())
    }

    /// Exchange a refresh token for a new access token.
    #[tracing::instrument(skip_all)]
    async fn refresh_grant(
        &self,
        refresh_token: &str,
        scopes: &ScopeSet,
    ) -> Result<TokenResponse, AuthError> {
        self.ensure_configured()?;
        let scope = request_scope(scopes);
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token),
            ("scope", scope.as_str()),
        ];

        let resp = self.client.post(self.token_url()).form(&form).send().await?;
        if !resp.status().is_success() {
            return Err(oauth_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// Run the device authorization grant to completion.
    ///
    /// With `expected` set, a token issued for any other account is rejected.
    #[tracing::instrument(skip_all)]
    async fn device_code_flow(
        &self,
        scopes: &ScopeSet,
        expected: Option<&Account>,
    ) -> Result<AccessToken, AuthError> {
        self.ensure_configured()?;
        let scope = request_scope(scopes);
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("scope", scope.as_str()),
        ];

        let resp = self
            .client
            .post(self.device_code_url())
            .form(&form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(oauth_error(resp).await);
        }
        let code: DeviceCodeResponse = resp.json().await?;

        self.prompt.show(&DeviceCode {
            user_code: code.user_code.clone(),
            verification_uri: code.verification_uri.clone(),
            message: code.message.clone().unwrap_or_else(|| {
                format!(
                    "To sign in, open {} and enter the code {}",
                    code.verification_uri, code.user_code
                )
            }),
            expires_in: code.expires_in,
        });

        let deadline = tokio::time::Instant::now() + Duration::from_secs(code.expires_in);
        let mut interval = Duration::from_secs(code.interval);

        loop {
            tokio::time::sleep(interval).await;
            if tokio::time::Instant::now() >= deadline {
                return Err(AuthError::DeviceCodeExpired);
            }

            let form = [
                ("grant_type", DEVICE_CODE_GRANT),
                ("client_id", self.config.client_id.as_str()),
                ("device_code", code.device_code.as_str()),
            ];
            let resp = self.client.post(self.token_url()).form(&form).send().await?;
            let status = resp.status().as_u16();
            if resp.status().is_success() {
                let data: TokenResponse = resp.json().await?;
                info!("device code sign-in completed");
                return self.absorb(data, scopes, expected);
            }

            let text = resp.text().await.unwrap_or_default();
            let body = serde_json::from_str::<OAuthErrorBody>(&text).ok();
            match body.as_ref().map(|b| b.error.as_str()) {
                Some("authorization_pending") => debug!("waiting for user to complete sign-in"),
                Some("slow_down") => {
                    interval += SLOW_DOWN_STEP;
                    debug!(interval_secs = interval.as_secs(), "token endpoint asked to slow down");
                }
                Some("expired_token") => return Err(AuthError::DeviceCodeExpired),
                Some("authorization_declined" | "access_denied") => {
                    return Err(AuthError::AuthorizationDeclined);
                }
                _ => {
                    return Err(AuthError::OAuth {
                        status,
                        message: body.map_or(text, |b| b.describe()),
                    });
                }
            }
        }
    }

    /// Record a token response: cache the access token, adopt the account
    /// and rotated refresh token, and persist the session when it changed.
    ///
    /// A response for an account other than `expected` leaves the state and
    /// the session file untouched.
    fn absorb(
        &self,
        data: TokenResponse,
        scopes: &ScopeSet,
        expected: Option<&Account>,
    ) -> Result<AccessToken, AuthError> {
        let decoded = data
            .id_token
            .as_deref()
            .map(account_from_id_token)
            .transpose()?;
        if let (Some(expected), Some(actual)) = (expected, decoded.as_ref()) {
            if actual.home_account_id != expected.home_account_id {
                warn!(
                    expected = %expected.username,
                    actual = %actual.username,
                    "token issued for a different account, discarding"
                );
                return Err(AuthError::AccountMismatch {
                    expected: expected.username.clone(),
                    actual: actual.username.clone(),
                });
            }
        }
        let expires_at = Utc::now() + chrono::Duration::seconds(data.expires_in);
        let token = AccessToken::new(data.access_token, scopes.clone(), expires_at);

        let record = {
            let mut state = self.state.lock();
            let mut changed = false;
            if let Some(account) = decoded {
                changed |= state.account.as_ref() != Some(&account);
                state.account = Some(account);
            }
            if let Some(refresh) = data.refresh_token {
                changed |= state.refresh_token.as_deref() != Some(refresh.as_str());
                state.refresh_token = Some(refresh);
            }
            let _ = state.tokens.insert(scopes.to_wire(), token.clone());

            match (&state.account, &state.refresh_token) {
                (Some(account), Some(refresh)) if changed => {
                    Some(SessionRecord::new(account.clone(), refresh.clone()))
                }
                _ => None,
            }
        };

        if let Some(mut record) = record {
            if let Err(e) = save_session(&self.config.session_path, &mut record) {
                warn!(error = %e, "failed to persist session");
            }
        }
        Ok(token)
    }
}

#[async_trait]
impl IdentityBoundary for MicrosoftIdentity {
    fn active_account(&self) -> Option<Account> {
        self.state.lock().account.clone()
    }

    async fn acquire_token_silent(
        &self,
        scopes: &ScopeSet,
        account: &Account,
    ) -> Result<AccessToken, AuthError> {
        let refresh_token = {
            let state = self.state.lock();
            match &state.account {
                Some(active) if active.home_account_id == account.home_account_id => {}
                _ => {
                    return Err(AuthError::InteractionRequired(
                        "account is not signed in".into(),
                    ));
                }
            }
            let buffer = self.expiry_buffer();
            if let Some(cached) = state
                .tokens
                .values()
                .find(|t| t.scopes.covers(scopes) && !t.expires_within(buffer))
            {
                debug!("using cached access token");
                return Ok(cached.clone());
            }
            state.refresh_token.clone()
        };

        let Some(refresh_token) = refresh_token else {
            return Err(AuthError::InteractionRequired("no refresh token".into()));
        };
        debug!("refreshing access token");
        let data = self.refresh_grant(&refresh_token, scopes).await?;
        self.absorb(data, scopes, Some(account))
    }

    async fn acquire_token_interactive(
        &self,
        scopes: &ScopeSet,
        account: &Account,
    ) -> Result<AccessToken, AuthError> {
        self.device_code_flow(scopes, Some(account)).await
    }

    async fn sign_in(&self, scopes: &ScopeSet) -> Result<Account, AuthError> {
        let _ = self.device_code_flow(scopes, None).await?;
        self.active_account().ok_or_else(|| {
            AuthError::InvalidIdToken("token response carried no id_token".into())
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.state.lock() = IdentityState::default();
        clear_session(&self.config.session_path)?;
        info!("signed out");
        Ok(())
    }
}

fn request_scope(scopes: &ScopeSet) -> String {
    if scopes.is_empty() {
        RESERVED_SCOPES.to_string()
    } else {
        format!("{} {RESERVED_SCOPES}", scopes.to_wire())
    }
}

async fn oauth_error(resp: reqwest::Response) -> AuthError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<OAuthErrorBody>(&text) {
        Ok(body) => body.describe(),
        Err(_) => text,
    };
    AuthError::OAuth { status, message }
}

/// Token endpoint response.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    expires_in: i64,
}

/// Device authorization endpoint response.
#[derive(Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_poll_interval")]
    interval: u64,
    #[serde(default)]
    message: Option<String>,
}

fn default_poll_interval() -> u64 {
    5
}

/// OAuth2 error body.
#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: String,
}

impl OAuthErrorBody {
    fn describe(&self) -> String {
        if self.error_description.is_empty() {
            self.error.clone()
        } else {
            format!("{}: {}", self.error, self.error_description)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
