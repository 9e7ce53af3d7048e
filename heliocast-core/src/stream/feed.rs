//! Upstream feed client
//!
//! Fetches and parses the JSON descriptor list for one animation product.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::error::StreamError;
use super::types::FrameDescriptor;

/// Shared HTTP client for all upstream requests (connection pooling).
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build shared upstream HTTP client")
});

/// Handle to the process-wide upstream client.
pub(crate) fn shared_client() -> Client {
    SHARED_CLIENT.clone()
}

/// One entry of an upstream animation feed. Extra metadata fields
/// (`time_tag` and friends) are ignored.
#[derive(Debug, Deserialize)]
struct FeedEntry {
    url: String,
}

/// Feed client: one request, one parse, no retries.
///
/// Retry policy belongs to the orchestrator, which performs none -- a
/// failed feed fails the session fast.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    timeout: Duration,
}

impl FeedClient {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: shared_client(),
            timeout,
        }
    }

    /// Fetch the feed and produce descriptors in publication order.
    ///
    /// `skip_header` drops element 0 before indexing, for feeds whose
    /// contract declares a header row.
    pub async fn fetch_feed(
        &self,
        feed_url: &str,
        skip_header: bool,
    ) -> Result<Vec<FrameDescriptor>, StreamError> {
        let response = self
            .client
            .get(feed_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StreamError::FeedUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::FeedUnavailable(format!(
                "feed returned status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StreamError::FeedUnavailable(e.to_string()))?;

        let descriptors = parse_feed(&body, skip_header)?;
        debug!(feed_url, frames = descriptors.len(), "feed fetched");
        Ok(descriptors)
    }
}

/// Parse a feed body into descriptors, index = position in the array.
fn parse_feed(body: &[u8], skip_header: bool) -> Result<Vec<FrameDescriptor>, StreamError> {
    let entries: Vec<FeedEntry> =
        serde_json::from_slice(body).map_err(|e| StreamError::FeedUnavailable(e.to_string()))?;

    Ok(entries
        .into_iter()
        .skip(usize::from(skip_header))
        .enumerate()
        .map(|(index, entry)| FrameDescriptor {
            index,
            source_path: entry.url,
        })
        .collect())
}
