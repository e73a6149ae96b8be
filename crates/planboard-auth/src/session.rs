//! Session file I/O.
//!
//! Reads and writes `~/.planboard/session.json` with secure file permissions
//! (0o600). The file holds the signed-in account and its refresh token;
//! access tokens are never written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::AuthError;
use crate::types::Account;

/// Default session file name.
const SESSION_FILE_NAME: &str = "session.json";

/// Current on-disk format version.
const SESSION_VERSION: u32 = 1;

/// Persisted sign-in state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Format version. Always 1.
    pub version: u32,
    /// The signed-in account.
    pub account: Account,
    /// Refresh token for the silent path.
    pub refresh_token: String,
    /// RFC 3339 timestamp of the last write.
    #[serde(default)]
    pub last_updated: String,
}

impl SessionRecord {
    /// Create a record for the current format version.
    pub fn new(account: Account, refresh_token: String) -> Self {
        Self {
            version: SESSION_VERSION,
            account,
            refresh_token,
            last_updated: String::new(),
        }
    }
}

/// Get the session file path under the given data directory.
pub fn session_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Load the session file.
///
/// Returns `None` if the file doesn't exist, is unreadable, or has an
/// unsupported version.
pub fn load_session(path: &Path) -> Option<SessionRecord> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read session file: {e}");
            return None;
        }
    };

    match serde_json::from_str::<SessionRecord>(&data) {
        Ok(record) if record.version == SESSION_VERSION => Some(record),
        Ok(record) => {
            tracing::warn!("unsupported session version: {}", record.version);
            None
        }
        Err(e) => {
            tracing::warn!("failed to parse session file: {e}");
            None
        }
    }
}

/// Save the session file.
///
/// Creates parent directories if needed. Sets file permissions to 0o600.
pub fn save_session(path: &Path, record: &mut SessionRecord) -> Result<(), AuthError> {
    record.last_updated = chrono::Utc::now().to_rfc3339();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, &json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(path, perms);
    }

    Ok(())
}

/// Delete the session file. A missing file is not an error.
pub fn clear_session(path: &Path) -> Result<(), AuthError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AuthError::Io(e)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_path(dir: &TempDir) -> PathBuf {
        dir.path().join("session.json")
    }

    fn account() -> Account {
        Account {
            home_account_id: "oid.tid".into(),
            username: "ada@contoso.com".into(),
            display_name: Some("Ada".into()),
            tenant_id: Some("tid".into()),
        }
    }

    #[test]
    fn session_file_path_construction() {
        let p = session_file_path(Path::new("/home/user/.planboard"));
        assert_eq!(p, PathBuf::from("/home/user/.planboard/session.json"));
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_session(&test_path(&dir)).is_none());
    }

    #[test]
    fn load_invalid_json_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        std::fs::write(&path, "not json").unwrap();
        assert!(load_session(&path).is_none());
    }

    #[test]
    fn load_wrong_version_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        std::fs::write(
            &path,
            r#"{"version":2,"account":{"homeAccountId":"a","username":"u"},"refreshToken":"r"}"#,
        )
        .unwrap();
        assert!(load_session(&path).is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut record = SessionRecord::new(account(), "refresh-1".into());
        save_session(&path, &mut record).unwrap();
        assert!(!record.last_updated.is_empty());

        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.account, account());
        assert_eq!(loaded.refresh_token, "refresh-1");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        save_session(&path, &mut SessionRecord::new(account(), "r".into())).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = test_path(&dir);
        save_session(&path, &mut SessionRecord::new(account(), "r".into())).unwrap();
        clear_session(&path).unwrap();
        assert!(!path.exists());
        clear_session(&path).unwrap();
    }
}
