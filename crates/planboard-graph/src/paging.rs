//! Cursor-paginated listings.

use std::future::Future;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{GraphError, Result};

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default)]
    pub value: Vec<T>,
    /// Absolute URL of the next page, if any.
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Drain a paginated listing into one ordered sequence.
///
/// `fetch` is called with `first`, then with each returned continuation URL,
/// until a page carries none. Items keep response order across pages. Any
/// page failure aborts the drain with [`GraphError::RemotePageFetchFailed`]
/// and the items gathered so far are dropped.
pub async fn drain_pages<T, F, Fut>(first: String, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut next = Some(first);
    let mut page = 0usize;

    while let Some(url) = next.take() {
        page += 1;
        let current = fetch(url)
            .await
            .map_err(|e| GraphError::RemotePageFetchFailed {
                page,
                source: Box::new(e),
            })?;
        items.extend(current.value);
        next = current.next_link.filter(|link| !link.is_empty());
    }

    debug!(pages = page, items = items.len(), "listing drained");
    Ok(items)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn page(items: &[u32], next: Option<&str>) -> Page<u32> {
        Page {
            value: items.to_vec(),
            next_link: next.map(str::to_string),
        }
    }

    fn scripted(pages: Vec<(&'static str, Result<Page<u32>>)>) -> HashMap<String, Result<Page<u32>>> {
        pages
            .into_iter()
            .map(|(url, p)| (url.to_string(), p))
            .collect()
    }

    #[tokio::test]
    async fn single_page() {
        let items = drain_pages("p1".into(), |_| async { Ok(page(&[1, 2], None)) })
            .await
            .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn follows_continuations_in_order() {
        let mut script = scripted(vec![
            ("p1", Ok(page(&[1, 2], Some("p2")))),
            ("p2", Ok(page(&[], Some("p3")))),
            ("p3", Ok(page(&[3], None))),
        ]);
        let mut seen = Vec::new();
        let items = drain_pages("p1".into(), |url| {
            seen.push(url.clone());
            let next = script.remove(&url).unwrap();
            async move { next }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(seen, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn empty_next_link_terminates() {
        let items = drain_pages("p1".into(), |_| async { Ok(page(&[7], Some(""))) })
            .await
            .unwrap();
        assert_eq!(items, vec![7]);
    }

    #[tokio::test]
    async fn mid_drain_failure_discards_partial_results() {
        let mut script = scripted(vec![
            ("p1", Ok(page(&[1], Some("p2")))),
            (
                "p2",
                Err(GraphError::Api {
                    status: 500,
                    code: "unknown".into(),
                    message: "boom".into(),
                }),
            ),
        ]);
        let result = drain_pages("p1".into(), |url| {
            let next = script.remove(&url).unwrap();
            async move { next }
        })
        .await;

        assert_matches!(result, Err(GraphError::RemotePageFetchFailed { page: 2, .. }));
    }

    #[test]
    fn page_decodes_next_link() {
        let p: Page<serde_json::Value> = serde_json::from_str(
            r#"{"value":[{"id":"a"}],"@odata.nextLink":"https://graph/next"}"#,
        )
        .unwrap();
        assert_eq!(p.value.len(), 1);
        assert_eq!(p.next_link.as_deref(), Some("https://graph/next"));
    }

    #[test]
    fn page_without_value_is_empty() {
        let p: Page<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(p.value.is_empty());
        assert!(p.next_link.is_none());
    }
}
