//! Pipeline error types

use thiserror::Error;

/// Terminal pipeline errors.
///
/// Both variants end the session before any image frame is emitted; the
/// session renders them as a single `text/plain` diagnostic part because the
/// multipart stream has no other channel to report failure once started.
/// Per-frame download failures are not represented here -- they are absorbed
/// by the downloader as absent payloads.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Feed request failed, timed out, or returned a malformed payload
    #[error("feed unavailable: {0}")]
    FeedUnavailable(String),

    /// Feed parsed but the frame list was empty or every download failed
    #[error("no frames available")]
    NoFramesAvailable,
}
