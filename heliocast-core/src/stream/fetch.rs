//! Bounded-concurrency frame downloader
//!
//! Fan-out/fan-in stage: every descriptor is fetched under a fixed permit
//! bound, and completions land directly in a slot-indexed outcome vector so
//! no sort is needed afterwards.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::feed::shared_client;
use super::types::{FetchOutcome, FrameDescriptor};

/// Fetches one frame's binary content. `None` records a failed fetch; a
/// per-frame failure is never escalated beyond the outcome.
#[async_trait]
pub trait FrameFetcher: Send + Sync {
    async fn fetch_frame(&self, descriptor: &FrameDescriptor) -> Option<Bytes>;
}

/// Production fetcher: resolves `source_path` against the fixed base URL
/// and downloads with a bounded timeout.
pub struct HttpFrameFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpFrameFetcher {
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: shared_client(),
            base_url: base_url.into(),
            timeout,
        }
    }

    fn resolve(&self, source_path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            source_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl FrameFetcher for HttpFrameFetcher {
    async fn fetch_frame(&self, descriptor: &FrameDescriptor) -> Option<Bytes> {
        let url = self.resolve(&descriptor.source_path);

        let response = match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(index = descriptor.index, %url, error = %e, "frame fetch failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(index = descriptor.index, %url, %status, "frame fetch rejected");
            return None;
        }

        match response.bytes().await {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(index = descriptor.index, %url, error = %e, "frame body read failed");
                None
            }
        }
    }
}

/// Downloads every descriptor with at most `max_in_flight` simultaneous
/// fetches, regardless of list size.
pub struct FrameDownloader {
    fetcher: Arc<dyn FrameFetcher>,
    max_in_flight: usize,
}

impl FrameDownloader {
    #[must_use]
    pub fn new(fetcher: Arc<dyn FrameFetcher>, max_in_flight: usize) -> Self {
        Self {
            fetcher,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Fetch all descriptors and return outcomes slot-indexed by input
    /// position: slot i holds the outcome for `descriptors[i]`, whatever
    /// order the fetches completed in. Returns once every descriptor has an
    /// outcome.
    pub async fn download_all(&self, descriptors: &[FrameDescriptor]) -> Vec<FetchOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks: JoinSet<(usize, FetchOutcome)> = JoinSet::new();

        for (slot, descriptor) in descriptors.iter().cloned().enumerate() {
            let fetcher = self.fetcher.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let index = descriptor.index;
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (slot, FetchOutcome::failure(index));
                };
                let payload = fetcher.fetch_frame(&descriptor).await;
                let outcome = match payload {
                    Some(payload) => FetchOutcome::success(index, payload),
                    None => FetchOutcome::failure(index),
                };
                (slot, outcome)
            });
        }

        // Slots start as failures; a panicked task leaves its slot failed.
        let mut outcomes: Vec<FetchOutcome> = descriptors
            .iter()
            .map(|d| FetchOutcome::failure(d.index))
            .collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => outcomes[slot] = outcome,
                Err(e) => warn!(error = %e, "frame fetch task failed to join"),
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base: &str) -> HttpFrameFetcher {
        HttpFrameFetcher::new(base, Duration::from_secs(10))
    }

    #[test]
    fn test_resolve_joins_with_single_slash() {
        let f = fetcher("https://services.swpc.noaa.gov/");
        assert_eq!(
            f.resolve("images/animations/enlil/frame.jpg"),
            "https://services.swpc.noaa.gov/images/animations/enlil/frame.jpg"
        );
    }

    #[test]
    fn test_resolve_handles_leading_slash_in_path() {
        let f = fetcher("https://services.swpc.noaa.gov");
        assert_eq!(
            f.resolve("/images/frame.jpg"),
            "https://services.swpc.noaa.gov/images/frame.jpg"
        );
    }

    #[test]
    fn test_downloader_clamps_zero_bound() {
        struct NeverFetch;

        #[async_trait]
        impl FrameFetcher for NeverFetch {
            async fn fetch_frame(&self, _descriptor: &FrameDescriptor) -> Option<Bytes> {
                None
            }
        }

        let downloader = FrameDownloader::new(Arc::new(NeverFetch), 0);
        assert_eq!(downloader.max_in_flight, 1);
    }
}
