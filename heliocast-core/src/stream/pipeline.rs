//! Pipeline orchestration
//!
//! Binds one configured product (feed URL, diagnostic label, header flag)
//! to stream sessions: one independent session per incoming request, no
//! state shared between concurrent viewers.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::config::{ProductConfig, StreamConfig, UpstreamConfig};

use super::feed::FeedClient;
use super::fetch::{FrameDownloader, FrameFetcher, HttpFrameFetcher};
use super::session::{SessionState, StreamSession};

/// One product's replay pipeline, shared by all of its viewers.
///
/// Cheap to keep around for the server's lifetime: per-session state lives
/// entirely inside the sessions it spawns.
pub struct StreamPipeline {
    product: ProductConfig,
    upstream: UpstreamConfig,
    stream: StreamConfig,
    fetcher: Arc<dyn FrameFetcher>,
}

impl StreamPipeline {
    #[must_use]
    pub fn new(product: ProductConfig, upstream: UpstreamConfig, stream: StreamConfig) -> Self {
        let fetcher = Arc::new(HttpFrameFetcher::new(
            upstream.base_url.clone(),
            upstream.frame_timeout(),
        ));
        Self::with_fetcher(product, upstream, stream, fetcher)
    }

    /// Construct with a custom frame fetcher.
    #[must_use]
    pub fn with_fetcher(
        product: ProductConfig,
        upstream: UpstreamConfig,
        stream: StreamConfig,
        fetcher: Arc<dyn FrameFetcher>,
    ) -> Self {
        Self {
            product,
            upstream,
            stream,
            fetcher,
        }
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.product.slug
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.product.label
    }

    /// Spawn one independent session for an incoming request.
    ///
    /// Returns the byte-chunk receiver for the transport plus a handle for
    /// cancellation and state observation. The session fetches its own
    /// feed, owns its own sequence and cursor, and paces itself.
    #[must_use]
    pub fn open_session(&self) -> (mpsc::UnboundedReceiver<Result<Bytes, io::Error>>, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Initializing);
        let cancel = CancellationToken::new();

        let session = StreamSession::new(
            self.product.label.clone(),
            self.product.feed_url.clone(),
            self.product.skip_header,
            FeedClient::new(self.upstream.feed_timeout()),
            FrameDownloader::new(self.fetcher.clone(), self.upstream.max_concurrent_fetches),
            self.stream.frame_interval(),
            state_tx,
        );

        tokio::spawn(session.run(tx, cancel.clone()));

        (
            rx,
            SessionHandle {
                state: state_rx,
                cancel,
            },
        )
    }
}

/// Observer/controller handle for one spawned session.
pub struct SessionHandle {
    state: watch::Receiver<SessionState>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Request cooperative shutdown; honored at the next frame boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the session reaches its terminal state.
    pub async fn closed(&mut self) {
        let _ = self
            .state
            .wait_for(|state| *state == SessionState::Closed)
            .await;
    }
}
