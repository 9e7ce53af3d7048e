//! Frame aggregation and replay pipeline
//!
//! One generic pipeline turns an upstream animation feed (a JSON list of
//! frame descriptors) into an endless `multipart/x-mixed-replace` byte
//! stream: fetch the feed, download every frame with bounded concurrency,
//! restore publication order, then replay the surviving frames forever at a
//! fixed pace until the viewer disconnects.

pub mod error;
pub mod feed;
pub mod fetch;
pub mod multipart;
pub mod pipeline;
pub mod sequence;
pub mod session;
pub mod types;

pub use error::StreamError;
pub use feed::FeedClient;
pub use fetch::{FrameDownloader, FrameFetcher, HttpFrameFetcher};
pub use pipeline::{SessionHandle, StreamPipeline};
pub use session::{PartSender, SessionState, StreamSession};
pub use types::{FetchOutcome, FrameDescriptor, FrameSequence};
