//! Per-viewer stream session
//!
//! State machine driving one client's endless replay:
//! `Initializing -> Emitting -> Closed`, with `Initializing -> Closed` on
//! upstream failure. The session writes encoded multipart chunks into an
//! unbounded channel whose receiving end backs the HTTP response body;
//! a failed send means the viewer is gone.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::StreamError;
use super::feed::FeedClient;
use super::fetch::FrameDownloader;
use super::multipart;
use super::sequence;
use super::types::FrameSequence;

/// Outbound chunk channel. The `io::Error` slot exists for the transport's
/// sake; the session itself only ever sends `Ok` chunks.
pub type PartSender = mpsc::UnboundedSender<Result<Bytes, io::Error>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Emitting,
    Closed,
}

/// One client connection's replay session.
///
/// Owns its frame sequence and cursor exclusively; two simultaneous viewers
/// of the same product share nothing.
pub struct StreamSession {
    label: String,
    feed_url: String,
    skip_header: bool,
    feed: FeedClient,
    downloader: FrameDownloader,
    frame_interval: Duration,
    state_tx: watch::Sender<SessionState>,
}

impl StreamSession {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        label: String,
        feed_url: String,
        skip_header: bool,
        feed: FeedClient,
        downloader: FrameDownloader,
        frame_interval: Duration,
        state_tx: watch::Sender<SessionState>,
    ) -> Self {
        Self {
            label,
            feed_url,
            skip_header,
            feed,
            downloader,
            frame_interval,
            state_tx,
        }
    }

    /// Drive the session to its terminal state, writing multipart chunks
    /// into `sender`. Dropping the sender on return closes the response.
    pub async fn run(self, sender: PartSender, cancel: CancellationToken) {
        self.state_tx.send_replace(SessionState::Initializing);

        let sequence = match self.initialize().await {
            Ok(sequence) => sequence,
            Err(err) => {
                warn!(label = %self.label, error = %err, "stream session failed to initialize");
                let _ = sender.send(Ok(multipart::diagnostic_part(&self.diagnostic_message(&err))));
                self.state_tx.send_replace(SessionState::Closed);
                return;
            }
        };

        info!(
            label = %self.label,
            frames = sequence.len(),
            "stream session emitting"
        );
        self.state_tx.send_replace(SessionState::Emitting);

        self.emit(&sequence, &sender, &cancel).await;

        debug!(label = %self.label, "stream session closed");
        self.state_tx.send_replace(SessionState::Closed);
    }

    /// Feed fetch, fan-out download, assembly -- sequential from the
    /// session's point of view.
    async fn initialize(&self) -> Result<FrameSequence, StreamError> {
        let descriptors = self.feed.fetch_feed(&self.feed_url, self.skip_header).await?;
        let outcomes = self.downloader.download_all(&descriptors).await;
        sequence::assemble(outcomes)
    }

    /// Endless cursor walk with wraparound. Per frame boundary: check
    /// cancellation, emit, then pace. Send failure means the viewer
    /// disconnected; both exits are normal termination, not errors.
    async fn emit(
        &self,
        sequence: &FrameSequence,
        sender: &PartSender,
        cancel: &CancellationToken,
    ) {
        let mut cursor = 0usize;

        loop {
            if cancel.is_cancelled() {
                debug!(label = %self.label, "stream session cancelled");
                return;
            }

            let Some(frame) = sequence.get(cursor) else {
                // Unreachable: the cursor always wraps within bounds.
                return;
            };

            if sender.send(Ok(multipart::image_part(frame))).is_err() {
                debug!(label = %self.label, "viewer disconnected");
                return;
            }

            cursor = (cursor + 1) % sequence.len();

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(label = %self.label, "stream session cancelled during pacing");
                    return;
                }
                () = tokio::time::sleep(self.frame_interval) => {}
            }
        }
    }

    /// Terminal failures become exactly one viewer-visible text part.
    fn diagnostic_message(&self, err: &StreamError) -> String {
        match err {
            StreamError::FeedUnavailable(cause) => {
                format!("Failed to load {} data: {}", self.label, cause)
            }
            StreamError::NoFramesAvailable => {
                format!("no frames available for {}", self.label)
            }
        }
    }
}
