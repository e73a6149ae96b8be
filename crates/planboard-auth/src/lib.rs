//! # planboard-auth
//!
//! Credential provider for the task-system API.
//!
//! - [`IdentityBoundary`]: the capability interface to an identity provider
//!   (active account, silent and interactive token acquisition, sign-in/out)
//! - [`AcquisitionPolicy`]: the silent-then-interactive fallback, as a value
//! - [`CredentialProvider`]: boundary + policy + default scope set
//! - [`MicrosoftIdentity`]: Microsoft identity platform v2.0 implementation
//!   (refresh-token grant for the silent path, device code grant for the
//!   interactive path)
//!
//! The signed-in account and its refresh token are persisted to
//! `~/.planboard/session.json` with secure file permissions. Access tokens
//! are only held in memory.

#![deny(unsafe_code)]

pub mod boundary;
pub mod claims;
pub mod errors;
pub mod microsoft;
pub mod policy;
pub mod provider;
pub mod session;
pub mod types;

pub use boundary::IdentityBoundary;
pub use errors::AuthError;
pub use microsoft::{DeviceCode, DeviceCodePrompt, IdentityConfig, MicrosoftIdentity};
pub use policy::AcquisitionPolicy;
pub use provider::CredentialProvider;
pub use session::{SessionRecord, clear_session, load_session, save_session, session_file_path};
pub use types::{AccessToken, Account, ScopeSet};
