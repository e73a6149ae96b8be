//! Bearer-authenticated Graph HTTP client.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use planboard_settings::GraphSettings;

use crate::errors::{GraphError, Result};
use crate::paging::{Page, drain_pages};

/// Thin JSON client for Graph.
///
/// Relative paths are joined onto the base URL; absolute URLs (such as
/// `@odata.nextLink` continuations) are used verbatim.
#[derive(Clone, Debug)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    /// Create a client with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("planboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `graph` settings section.
    pub fn from_settings(settings: &GraphSettings) -> Result<Self> {
        Self::new(
            settings.base_url.clone(),
            Duration::from_millis(settings.request_timeout_ms),
        )
    }

    /// The base URL relative paths are joined onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a relative path or pass an absolute URL through.
    pub fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else if path_or_url.starts_with('/') {
            format!("{}{path_or_url}", self.base_url)
        } else {
            format!("{}/{path_or_url}", self.base_url)
        }
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.http.get(&url).bearer_auth(token).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// GET one page of a collection.
    pub async fn get_page<T: DeserializeOwned>(&self, token: &str, url: &str) -> Result<Page<T>> {
        self.get_json(token, url).await
    }

    /// GET every page of a collection, in order.
    pub async fn get_all<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<Vec<T>> {
        drain_pages(self.url(path), move |url| async move {
            self.get_page::<T>(token, &url).await
        })
        .await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, token: &str, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}

/// Turn a non-success response into [`GraphError::Api`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let (code, message) = parse_error_envelope(&text);
    Err(GraphError::Api {
        status,
        code,
        message,
    })
}

/// Extract `error.code` / `error.message`, falling back to the raw body.
fn parse_error_envelope(body: &str) -> (String, String) {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let field = |name: &str| {
        error
            .and_then(|e| e.get(name))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    };
    match (field("code"), field("message")) {
        (Some(code), Some(message)) => (code, message),
        (Some(code), None) => (code, body.to_string()),
        (None, Some(message)) => ("unknown".to_string(), message),
        (None, None) => ("unknown".to_string(), body.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> GraphClient {
        GraphClient::new(format!("{}/v1.0/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn url_joining() {
        let c = GraphClient::new("https://graph.example.com/v1.0/", Duration::from_secs(1)).unwrap();
        assert_eq!(c.base_url(), "https://graph.example.com/v1.0");
        assert_eq!(c.url("/me"), "https://graph.example.com/v1.0/me");
        assert_eq!(c.url("me"), "https://graph.example.com/v1.0/me");
        assert_eq!(
            c.url("https://other.example.com/next?$skiptoken=x"),
            "https://other.example.com/next?$skiptoken=x"
        );
    }

    #[test]
    fn from_settings_uses_base_url() {
        let c = GraphClient::from_settings(&GraphSettings::default()).unwrap();
        assert_eq!(c.base_url(), "https://graph.microsoft.com/v1.0");
    }

    #[test]
    fn error_envelope_parsing() {
        let body = r#"{"error":{"code":"Forbidden","message":"Nope"}}"#;
        assert_eq!(
            parse_error_envelope(body),
            ("Forbidden".to_string(), "Nope".to_string())
        );
        assert_eq!(
            parse_error_envelope("gateway timeout"),
            ("unknown".to_string(), "gateway timeout".to_string())
        );
    }

    #[tokio::test]
    async fn get_json_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1"})))
            .mount(&server)
            .await;

        let me: serde_json::Value = client(&server).get_json("tok-1", "/me").await.unwrap();
        assert_eq!(me["id"], "u1");
    }

    #[tokio::test]
    async fn non_success_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/planner/plans/p1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "NotFound", "message": "The requested item is not found."}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_json::<serde_json::Value>("tok", "/planner/plans/p1")
            .await
            .unwrap_err();
        assert_matches!(err, GraphError::Api { status: 404, ref code, .. } if code == "NotFound");
    }

    #[tokio::test]
    async fn get_all_follows_next_link() {
        let server = MockServer::start().await;
        let next = format!("{}/v1.0/items?page=2", server.uri());
        Mock::given(method("GET"))
            .and(path("/v1.0/items"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "c"}]
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1.0/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "a"}, {"id": "b"}],
                "@odata.nextLink": next
            })))
            .mount(&server)
            .await;

        let items: Vec<serde_json::Value> = client(&server).get_all("tok", "/items").await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn get_all_page_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/items"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_all::<serde_json::Value>("tok", "/items")
            .await
            .unwrap_err();
        assert_matches!(err, GraphError::RemotePageFetchFailed { page: 1, .. });
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn post_json_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/planner/tasks"))
            .and(wiremock::matchers::body_partial_json(json!({"title": "Ship"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "t1", "title": "Ship"})))
            .mount(&server)
            .await;

        let created: serde_json::Value = client(&server)
            .post_json("tok", "/planner/tasks", &json!({"title": "Ship"}))
            .await
            .unwrap();
        assert_eq!(created["id"], "t1");
    }
}
