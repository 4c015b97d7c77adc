//! Page source trait and its HTTP implementation.
//!
//! A page source answers one GET request with a JSON body. Pagination,
//! back-off and accumulation live in the fetcher; the source only reports
//! what happened to a single call.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::{SourceError, SourceResult};

/// Boxed future returned by [`PageSource::get`].
pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = SourceResult<Value>> + Send + 'a>>;

/// A JSON-over-HTTP style data source.
///
/// Implementations must map HTTP 429 (or the equivalent) to
/// [`SourceError::RateLimited`] so the fetcher can back off and retry.
///
/// # Example
///
/// ```ignore
/// use nftnet_sources::source::{PageSource, SourceFuture};
///
/// struct Fixed(serde_json::Value);
///
/// impl PageSource for Fixed {
///     fn get<'a>(&'a self, _endpoint: &'a str, _params: &'a [(String, String)]) -> SourceFuture<'a> {
///         Box::pin(async move { Ok(self.0.clone()) })
///     }
///
///     fn name(&self) -> &str {
///         "fixed"
///     }
/// }
/// ```
pub trait PageSource: Send + Sync {
    /// Issue one GET against `endpoint` with the given query parameters.
    fn get<'a>(&'a self, endpoint: &'a str, params: &'a [(String, String)]) -> SourceFuture<'a>;

    /// Short label used in log messages.
    fn name(&self) -> &str;
}

/// Page source backed by a `reqwest` client.
pub struct HttpSource {
    name: String,
    base_url: String,
    client: Client,
}

impl HttpSource {
    /// Create a source rooted at `base_url` with a per-call timeout.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Full URL for an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send(&self, endpoint: &str, params: &[(String, String)]) -> SourceResult<Value> {
        let response = self
            .client
            .get(self.url(endpoint))
            .header("accept", "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

impl PageSource for HttpSource {
    fn get<'a>(&'a self, endpoint: &'a str, params: &'a [(String, String)]) -> SourceFuture<'a> {
        Box::pin(self.send(endpoint, params))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
