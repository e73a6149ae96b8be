//! ID token claim decoding.
//!
//! The ID token arrives directly from the token endpoint over TLS, so only
//! the payload is decoded; the signature is not verified.

use base64::Engine as _;
use serde::Deserialize;

use crate::errors::AuthError;
use crate::types::Account;

#[derive(Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    oid: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    tid: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Decode the account described by an ID token.
pub fn account_from_id_token(id_token: &str) -> Result<Account, AuthError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidIdToken("not a JWT".into()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(to_standard_base64(payload))
        .map_err(|e| AuthError::InvalidIdToken(format!("payload is not base64: {e}")))?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::InvalidIdToken(format!("payload is not JSON: {e}")))?;

    let object_id = claims
        .oid
        .or(claims.sub)
        .ok_or_else(|| AuthError::InvalidIdToken("missing oid and sub claims".into()))?;
    let home_account_id = match &claims.tid {
        Some(tid) => format!("{object_id}.{tid}"),
        None => object_id.clone(),
    };

    Ok(Account {
        home_account_id,
        username: claims.preferred_username.unwrap_or(object_id),
        display_name: claims.name,
        tenant_id: claims.tid,
    })
}

/// Convert base64url encoding to standard base64 (with padding).
fn to_standard_base64(input: &str) -> String {
    let standard: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    match standard.len() % 4 {
        2 => format!("{standard}=="),
        3 => format!("{standard}="),
        _ => standard,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use assert_matches::assert_matches;

    use super::*;

    /// Build an unsigned JWT with the given payload.
    pub(crate) fn make_id_token(payload: &serde_json::Value) -> String {
        let enc = |s: &str| base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(s.as_bytes());
        format!(
            "{}.{}.sig",
            enc(r#"{"alg":"none"}"#),
            enc(&payload.to_string())
        )
    }

    #[test]
    fn decodes_standard_claims() {
        let token = make_id_token(&serde_json::json!({
            "oid": "oid-1",
            "tid": "tid-1",
            "preferred_username": "ada@contoso.com",
            "name": "Ada Lovelace"
        }));
        let account = account_from_id_token(&token).unwrap();
        assert_eq!(account.home_account_id, "oid-1.tid-1");
        assert_eq!(account.username, "ada@contoso.com");
        assert_eq!(account.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(account.tenant_id.as_deref(), Some("tid-1"));
    }

    #[test]
    fn falls_back_to_sub_without_oid() {
        let token = make_id_token(&serde_json::json!({"sub": "sub-9"}));
        let account = account_from_id_token(&token).unwrap();
        assert_eq!(account.home_account_id, "sub-9");
        assert_eq!(account.username, "sub-9");
    }

    #[test]
    fn rejects_non_jwt() {
        assert_matches!(
            account_from_id_token("opaque"),
            Err(AuthError::InvalidIdToken(_))
        );
    }

    #[test]
    fn rejects_missing_identity() {
        let token = make_id_token(&serde_json::json!({"name": "nobody"}));
        assert_matches!(
            account_from_id_token(&token),
            Err(AuthError::InvalidIdToken(_))
        );
    }

    #[test]
    fn standard_base64_padding() {
        assert_eq!(to_standard_base64("YQ"), "YQ==");
        assert_eq!(to_standard_base64("YWI"), "YWI=");
        assert_eq!(to_standard_base64("a-b_"), "a+b/");
    }
}
