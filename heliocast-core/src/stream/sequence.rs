//! Sequence assembly
//!
//! Pure transform from fetch outcomes to the playable sequence. No I/O,
//! deterministic given the outcome set.

use super::error::StreamError;
use super::types::{FetchOutcome, FrameSequence};

/// Drop failed outcomes and produce the playable sequence.
///
/// Outcomes arrive slot-indexed from the downloader (ascending descriptor
/// index), so assembly is a single in-order filter pass -- the final order
/// depends only on descriptor indexes, never on completion timing. An empty
/// survivor set is reported as `NoFramesAvailable` so the session can tell
/// it apart from a valid sequence.
pub fn assemble(outcomes: Vec<FetchOutcome>) -> Result<FrameSequence, StreamError> {
    debug_assert!(outcomes.windows(2).all(|w| w[0].index < w[1].index));

    let frames: Vec<_> = outcomes
        .into_iter()
        .filter_map(|outcome| outcome.payload)
        .collect();

    if frames.is_empty() {
        return Err(StreamError::NoFramesAvailable);
    }

    Ok(FrameSequence::new(frames))
}
