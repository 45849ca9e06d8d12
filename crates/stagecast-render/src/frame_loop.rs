//! Display-refresh abstraction.
//!
//! A [`FrameScheduler`] hands out one-shot frame requests, like
//! `requestAnimationFrame`: each request fires at most once, with a
//! monotonic [`FrameTime`](stagecast_core::FrameTime), and can be cancelled
//! synchronously before it fires.

use std::collections::BTreeSet;

/// Token for one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Source of frame callbacks.
pub trait FrameScheduler {
    /// Ask for one callback on the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request. Unknown or already fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A scheduler driven by hand: requests queue up until [`take_due`] is
/// called. Used by tests, benches and offline rendering.
///
/// [`take_due`]: ManualScheduler::take_due
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: BTreeSet<FrameHandle>,
    requests: u64,
    cancellations: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every pending request: returns their handles in request order
    /// and forgets them.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Total requests made so far.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Total cancellations of still-pending requests.
    pub fn cancel_count(&self) -> u64 {
        self.cancellations
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.requests += 1;
        let handle = FrameHandle(self.next);
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending.remove(&handle) {
            self.cancellations += 1;
        }
    }
}
