//! Pipeline data model

use bytes::Bytes;

/// One frame's position and location in the upstream feed.
///
/// `index` is the frame's position in the feed's ordered list (its
/// publication order); `source_path` is a relative locator resolved against
/// the configured base URL. Created by the feed client, read-only afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub index: usize,
    pub source_path: String,
}

/// Result of downloading one descriptor's binary content.
///
/// An absent payload records a failed fetch. Produced once by the
/// downloader, consumed once by the assembler, never mutated.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub index: usize,
    pub payload: Option<Bytes>,
}

impl FetchOutcome {
    #[must_use]
    pub const fn success(index: usize, payload: Bytes) -> Self {
        Self {
            index,
            payload: Some(payload),
        }
    }

    #[must_use]
    pub const fn failure(index: usize) -> Self {
        Self {
            index,
            payload: None,
        }
    }

    #[must_use]
    pub const fn failed(&self) -> bool {
        self.payload.is_none()
    }
}

/// The playable sequence: surviving payloads in ascending descriptor-index
/// order, gaps removed.
///
/// Non-empty by construction -- assembly reports `NoFramesAvailable` instead
/// of producing an empty sequence. Owned by exactly one stream session,
/// which only reads it.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<Bytes>,
}

impl FrameSequence {
    /// Invariant: `frames` is non-empty and ordered by original descriptor
    /// index. Only the assembler constructs sequences.
    pub(crate) fn new(frames: Vec<Bytes>) -> Self {
        debug_assert!(!frames.is_empty());
        Self { frames }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn get(&self, cursor: usize) -> Option<&Bytes> {
        self.frames.get(cursor)
    }

    #[must_use]
    pub fn frames(&self) -> &[Bytes] {
        &self.frames
    }
}
