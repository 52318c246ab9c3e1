//! HTTP fetch collaborator.
//!
//! Provider parsers and the geocoding lookup consume the [`Fetch`] trait;
//! they never build their own HTTP client. The default implementation
//! wraps `reqwest`; tests substitute canned stubs.
//!
//! No retries happen here. Retry policy belongs to the caller.

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

/// Desktop browser user-agent pool; requests rotate through it.
const AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/93.0.4577.82 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_4_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/110.0",
    "Mozilla/4.0 (compatible; MSIE 9.0; Windows NT 6.1)",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.141 Safari/537.36 Edg/87.0.664.75",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.102 Safari/537.36 Edge/18.18363",
];

const CONNECT_TIMEOUT: Duration = Duration::from_millis(3050);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

/// A GET-a-JSON-document capability.
#[async_trait]
pub trait Fetch: Send + Sync + Debug {
    /// Fetch `url` and parse the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Default `reqwest`-backed fetcher.
#[derive(Debug)]
pub struct HttpFetcher {
    http: Client,
    agent_cursor: AtomicUsize,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, agent_cursor: AtomicUsize::new(0) }
    }

    fn next_agent(&self) -> &'static str {
        let idx = self.agent_cursor.fetch_add(1, Ordering::Relaxed);
        AGENTS[idx % AGENTS.len()]
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!(url, "fetching");
        let response = self
            .http
            .get(url)
            .header("User-Agent", self.next_agent())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = body.char_indices().take_while(|(i, _)| *i < MAX).last().map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! Canned fetcher used across the crate's tests.

    use super::*;
    use std::collections::HashMap;

    /// Serves canned JSON documents keyed by a URL substring.
    #[derive(Debug, Default)]
    pub struct StubFetcher {
        responses: HashMap<&'static str, Value>,
        pub delay: Option<Duration>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url_part: &'static str, body: Value) -> Self {
            self.responses.insert(url_part, body);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl Fetch for StubFetcher {
        async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .iter()
                .find(|(part, _)| url.contains(*part))
                .map(|(_, body)| Ok(body.clone()))
                .unwrap_or(Err(FetchError::Status { status: 404, body: format!("no stub for {url}") }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agents_rotate() {
        let fetcher = HttpFetcher::new();
        let first = fetcher.next_agent();
        let second = fetcher.next_agent();
        assert_ne!(first, second);

        // Wraps around the pool.
        for _ in 0..AGENTS.len() - 2 {
            fetcher.next_agent();
        }
        assert_eq!(fetcher.next_agent(), first);
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("ok"), "ok");
        let long = "x".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.len() < 300);
        assert!(cut.ends_with("..."));
    }
}
