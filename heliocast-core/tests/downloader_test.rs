// Fan-out/fan-in downloader tests
//
// Verifies the two load-bearing properties of the fetch stage:
// - final order depends only on descriptor indexes, never on completion order
// - the in-flight bound holds regardless of list size

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use heliocast_core::stream::sequence::assemble;
use heliocast_core::stream::{FrameDescriptor, FrameDownloader, FrameFetcher, StreamError};

fn descriptors(n: usize) -> Vec<FrameDescriptor> {
    (0..n)
        .map(|index| FrameDescriptor {
            index,
            source_path: format!("images/frame{index}.jpg"),
        })
        .collect()
}

fn payload(index: usize) -> Bytes {
    Bytes::from(format!("frame-{index}"))
}

/// Completes fetches in reverse submission order and fails a scripted
/// subset of indexes.
struct ScriptedFetcher {
    total: usize,
    failing: HashSet<usize>,
}

#[async_trait]
impl FrameFetcher for ScriptedFetcher {
    async fn fetch_frame(&self, descriptor: &FrameDescriptor) -> Option<Bytes> {
        let rank = self.total - descriptor.index;
        tokio::time::sleep(Duration::from_millis(rank as u64 * 2)).await;
        if self.failing.contains(&descriptor.index) {
            None
        } else {
            Some(payload(descriptor.index))
        }
    }
}

/// Tracks how many fetches run at once.
struct InstrumentedFetcher {
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl InstrumentedFetcher {
    fn new() -> Self {
        Self {
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FrameFetcher for InstrumentedFetcher {
    async fn fetch_frame(&self, descriptor: &FrameDescriptor) -> Option<Bytes> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        Some(payload(descriptor.index))
    }
}

#[tokio::test]
async fn test_outcomes_are_slot_indexed_despite_reverse_completion() {
    let n = 12;
    let failing: HashSet<usize> = [2, 5, 9].into_iter().collect();
    let fetcher = Arc::new(ScriptedFetcher { total: n, failing: failing.clone() });

    // Wide enough bound that every fetch is in flight at once, so the
    // completion order really is reversed.
    let downloader = FrameDownloader::new(fetcher, n);
    let outcomes = downloader.download_all(&descriptors(n)).await;

    assert_eq!(outcomes.len(), n);
    for (slot, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.index, slot);
        assert_eq!(outcome.failed(), failing.contains(&slot));
    }
}

#[tokio::test]
async fn test_assembled_sequence_restores_publication_order() {
    let n = 12;
    let failing: HashSet<usize> = [2, 5, 9].into_iter().collect();
    let fetcher = Arc::new(ScriptedFetcher { total: n, failing: failing.clone() });

    let downloader = FrameDownloader::new(fetcher, n);
    let outcomes = downloader.download_all(&descriptors(n)).await;
    let sequence = assemble(outcomes).unwrap();

    assert_eq!(sequence.len(), n - failing.len());
    let expected: Vec<Bytes> = (0..n).filter(|i| !failing.contains(i)).map(payload).collect();
    assert_eq!(sequence.frames(), expected.as_slice());
}

#[tokio::test]
async fn test_in_flight_fetches_never_exceed_bound() {
    let fetcher = Arc::new(InstrumentedFetcher::new());
    let downloader = FrameDownloader::new(fetcher.clone(), 10);

    let outcomes = downloader.download_all(&descriptors(50)).await;

    assert_eq!(outcomes.len(), 50);
    assert!(outcomes.iter().all(|o| !o.failed()));
    let max_active = fetcher.max_active.load(Ordering::SeqCst);
    assert!(
        max_active <= 10,
        "observed {max_active} concurrent fetches, bound is 10"
    );
}

#[tokio::test]
async fn test_every_fetch_failing_assembles_to_no_frames() {
    let n = 6;
    let failing: HashSet<usize> = (0..n).collect();
    let fetcher = Arc::new(ScriptedFetcher { total: n, failing });

    let downloader = FrameDownloader::new(fetcher, 10);
    let outcomes = downloader.download_all(&descriptors(n)).await;

    assert_eq!(outcomes.len(), n);
    assert!(matches!(
        assemble(outcomes),
        Err(StreamError::NoFramesAvailable)
    ));
}

#[tokio::test]
async fn test_empty_descriptor_list_returns_no_outcomes() {
    let fetcher = Arc::new(InstrumentedFetcher::new());
    let downloader = FrameDownloader::new(fetcher, 10);

    let outcomes = downloader.download_all(&[]).await;
    assert!(outcomes.is_empty());
}
