//! Rate-limited paginated fetcher.
//!
//! Walks a cursor-paginated source page by page, strictly sequentially:
//!
//! - Waits `inter_request_delay` between successful pages (never before the first)
//! - On a rate-limit signal, waits `rate_limit_cooldown` and retries the same page
//! - Stops on an empty page, a missing/empty continuation token, or a record target
//! - Any other error aborts with [`FetchFailed`] carrying the partial items

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchFailed, SourceError};
use crate::source::PageSource;

/// Default pause between successful page requests.
pub const DEFAULT_INTER_REQUEST_DELAY: Duration = Duration::from_millis(1500);

/// Default pause after a rate-limit response.
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

/// Timing rules for talking to a rate-limited source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub inter_request_delay: Duration,
    pub rate_limit_cooldown: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            inter_request_delay: DEFAULT_INTER_REQUEST_DELAY,
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
        }
    }
}

impl FetchPolicy {
    /// No waiting at all. Useful for tests and local fixtures.
    pub fn immediate() -> Self {
        Self {
            inter_request_delay: Duration::ZERO,
            rate_limit_cooldown: Duration::ZERO,
        }
    }
}

/// Description of a paginated endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub endpoint: String,
    /// Parameters sent with every page
    pub params: Vec<(String, String)>,
    /// Query parameter that carries the continuation token
    pub cursor_param: String,
    /// Response field holding the page's items
    pub items_field: String,
    /// Response field holding the next continuation token
    pub cursor_field: String,
}

impl PageQuery {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
            cursor_param: "continuation".to_string(),
            items_field: "items".to_string(),
            cursor_field: "continuation".to_string(),
        }
    }

    /// Builder: add a fixed query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Builder: cursor is sent as `param` and read back from `field`.
    pub fn cursor(mut self, param: impl Into<String>, field: impl Into<String>) -> Self {
        self.cursor_param = param.into();
        self.cursor_field = field.into();
        self
    }

    /// Builder: items are read from `field`.
    pub fn items(mut self, field: impl Into<String>) -> Self {
        self.items_field = field.into();
        self
    }

    fn params_with_cursor(&self, cursor: Option<&str>) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        if let Some(cursor) = cursor {
            params.push((self.cursor_param.clone(), cursor.to_string()));
        }
        params
    }
}

/// Items accumulated by a completed fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pages {
    pub items: Vec<Value>,
    pub page_count: usize,
    /// True when the source ran out of pages, false when the record target stopped us
    pub exhausted: bool,
}

struct Page {
    items: Vec<Value>,
    next_cursor: Option<String>,
}

impl Page {
    fn extract(mut body: Value, query: &PageQuery) -> Result<Self, SourceError> {
        if !body.is_object() {
            return Err(SourceError::Malformed(format!(
                "expected a JSON object, got {}",
                kind(&body)
            )));
        }

        let items = match body.get_mut(&query.items_field).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(SourceError::Malformed(format!(
                    "'{}' is {}, expected an array",
                    query.items_field,
                    kind(&other)
                )))
            }
        };

        let next_cursor = body
            .get(&query.cursor_field)
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self { items, next_cursor })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Sequential, rate-limit aware page walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginatedFetcher {
    policy: FetchPolicy,
}

impl PaginatedFetcher {
    pub fn new(policy: FetchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetch pages until the source is exhausted or `target` items are collected.
    ///
    /// # Arguments
    ///
    /// * `source` - Where to send requests
    /// * `query` - Endpoint, fixed parameters and cursor/items field names
    /// * `target` - Optional number of items after which to stop early
    pub async fn fetch_all(
        &self,
        source: &dyn PageSource,
        query: &PageQuery,
        target: Option<usize>,
    ) -> Result<Pages, FetchFailed> {
        let mut pages = Pages::default();
        let mut cursor: Option<String> = None;

        loop {
            let params = query.params_with_cursor(cursor.as_deref());

            let body = match source.get(&query.endpoint, &params).await {
                Ok(body) => body,
                Err(SourceError::RateLimited) => {
                    warn!(
                        "{} rate limit hit, waiting {:?} before retrying",
                        source.name(),
                        self.policy.rate_limit_cooldown
                    );
                    tokio::time::sleep(self.policy.rate_limit_cooldown).await;
                    continue;
                }
                Err(source_err) => {
                    return Err(FetchFailed {
                        partial: pages.items,
                        source: source_err,
                    })
                }
            };

            let page = match Page::extract(body, query) {
                Ok(page) => page,
                Err(source_err) => {
                    return Err(FetchFailed {
                        partial: pages.items,
                        source: source_err,
                    })
                }
            };

            if page.items.is_empty() {
                debug!("{} returned an empty page", source.name());
                pages.exhausted = true;
                break;
            }

            pages.items.extend(page.items);
            pages.page_count += 1;
            debug!(
                "{} page {}: {} items so far",
                source.name(),
                pages.page_count,
                pages.items.len()
            );

            let Some(next) = page.next_cursor else {
                pages.exhausted = true;
                break;
            };

            if target.is_some_and(|t| pages.items.len() >= t) {
                break;
            }

            cursor = Some(next);
            tokio::time::sleep(self.policy.inter_request_delay).await;
        }

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceResult;
    use crate::source::SourceFuture;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses in order and records the params of each call.
    struct Script {
        responses: Mutex<VecDeque<SourceResult<Value>>>,
        calls: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl Script {
        fn new(responses: Vec<SourceResult<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|params| {
                    params
                        .iter()
                        .find(|(k, _)| k == "continuation")
                        .map(|(_, v)| v.clone())
                })
                .collect()
        }
    }

    impl PageSource for Script {
        fn get<'a>(&'a self, _endpoint: &'a str, params: &'a [(String, String)]) -> SourceFuture<'a> {
            self.calls.lock().unwrap().push(params.to_vec());
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SourceError::Transport("script exhausted".into())));
            Box::pin(async move { next })
        }

        fn name(&self) -> &str {
            "script"
        }
    }

    fn query() -> PageQuery {
        PageQuery::new("things")
            .param("limit", 2)
            .items("things")
            .cursor("continuation", "continuation")
    }

    fn page(items: &[i64], cursor: Option<&str>) -> SourceResult<Value> {
        Ok(json!({ "things": items, "continuation": cursor }))
    }

    #[tokio::test]
    async fn test_follows_cursor_until_absent() {
        let source = Script::new(vec![
            page(&[1, 2], Some("c1")),
            page(&[3, 4], Some("c2")),
            page(&[5], None),
        ]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let pages = fetcher.fetch_all(&source, &query(), None).await.unwrap();
        assert_eq!(pages.items, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
        assert_eq!(pages.page_count, 3);
        assert!(pages.exhausted);
        assert_eq!(
            source.cursors(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_cursor_ends_fetch() {
        let source = Script::new(vec![page(&[1], Some(""))]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let pages = fetcher.fetch_all(&source, &query(), None).await.unwrap();
        assert_eq!(pages.items.len(), 1);
        assert_eq!(source.cursors().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_page_ends_fetch() {
        let source = Script::new(vec![page(&[1, 2], Some("c1")), page(&[], Some("c2"))]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let pages = fetcher.fetch_all(&source, &query(), None).await.unwrap();
        assert_eq!(pages.items.len(), 2);
        assert_eq!(pages.page_count, 1);
        assert!(pages.exhausted);
    }

    #[tokio::test]
    async fn test_missing_items_field_is_empty_page() {
        let source = Script::new(vec![Ok(json!({ "continuation": "c1" }))]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let pages = fetcher.fetch_all(&source, &query(), None).await.unwrap();
        assert!(pages.items.is_empty());
        assert!(pages.exhausted);
    }

    #[tokio::test]
    async fn test_target_stops_early() {
        let source = Script::new(vec![
            page(&[1, 2], Some("c1")),
            page(&[3, 4], Some("c2")),
            page(&[5, 6], Some("c3")),
        ]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let pages = fetcher.fetch_all(&source, &query(), Some(3)).await.unwrap();
        assert_eq!(pages.items.len(), 4);
        assert!(!pages.exhausted);
        assert_eq!(source.cursors().len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_same_page() {
        let source = Script::new(vec![
            page(&[1], Some("c1")),
            Err(SourceError::RateLimited),
            Err(SourceError::RateLimited),
            page(&[2], None),
        ]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let pages = fetcher.fetch_all(&source, &query(), None).await.unwrap();
        assert_eq!(pages.items, vec![json!(1), json!(2)]);
        assert_eq!(
            source.cursors(),
            vec![
                None,
                Some("c1".to_string()),
                Some("c1".to_string()),
                Some("c1".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_carries_partial_results() {
        let source = Script::new(vec![
            page(&[1, 2], Some("c1")),
            Err(SourceError::Status {
                status: 500,
                body: "boom".into(),
            }),
        ]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let err = fetcher.fetch_all(&source, &query(), None).await.unwrap_err();
        assert_eq!(err.partial, vec![json!(1), json!(2)]);
        assert!(matches!(err.source, SourceError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_non_array_items_is_malformed() {
        let source = Script::new(vec![Ok(json!({ "things": "nope" }))]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let err = fetcher.fetch_all(&source, &query(), None).await.unwrap_err();
        assert!(matches!(err.source, SourceError::Malformed(_)));
        assert!(err.partial.is_empty());
    }

    #[tokio::test]
    async fn test_non_object_body_is_malformed() {
        let source = Script::new(vec![Ok(json!([1, 2, 3]))]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::immediate());

        let err = fetcher.fetch_all(&source, &query(), None).await.unwrap_err();
        assert!(matches!(err.source, SourceError::Malformed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_follow_policy() {
        let source = Script::new(vec![
            page(&[1], Some("c1")),
            Err(SourceError::RateLimited),
            page(&[2], Some("c2")),
            page(&[3], None),
        ]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::default());

        let start = tokio::time::Instant::now();
        fetcher.fetch_all(&source, &query(), None).await.unwrap();
        let elapsed = start.elapsed();

        // Two inter-page delays plus one cool-down; nothing before the first request
        let expected = DEFAULT_INTER_REQUEST_DELAY * 2 + DEFAULT_RATE_LIMIT_COOLDOWN;
        assert!(elapsed >= expected, "elapsed {:?}", elapsed);
        assert!(elapsed < expected + Duration::from_millis(100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_before_first_request() {
        let source = Script::new(vec![page(&[1], None)]);
        let fetcher = PaginatedFetcher::new(FetchPolicy::default());

        let start = tokio::time::Instant::now();
        fetcher.fetch_all(&source, &query(), None).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
