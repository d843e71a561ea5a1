//! Frame scheduling.
//!
//! The engine never loops on its own. It asks the host for a callback on the
//! next display frame (`requestAnimationFrame` in a browser, a redraw request
//! in a native window), and the host calls
//! [`ParticleField::on_frame`](crate::ParticleField::on_frame) with the
//! [`FrameTask`] it asked for. Each tick reschedules itself while the field
//! is running.
//!
//! [`ManualScheduler`] is a deterministic in-memory implementation: frames
//! only happen when the caller drains them, which makes the whole engine
//! testable without a display.

/// What a scheduled frame callback should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTask {
    /// Apply the latest coalesced pointer position.
    PointerSync,
    /// Physics step, render step, reschedule.
    Tick,
}

/// Opaque id of a frame request, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host's animation-frame primitive.
pub trait FrameScheduler {
    /// Request one callback for `task` on the next frame.
    fn request_frame(&mut self, task: FrameTask) -> FrameHandle;

    /// Cancel an outstanding request. Unknown or already-run handles are
    /// ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Start/stop wrapper around a scheduler that keeps at most one tick and one
/// pointer sync outstanding.
#[derive(Debug)]
pub struct FrameLoop<S> {
    scheduler: S,
    tick: Option<FrameHandle>,
    sync: Option<FrameHandle>,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            tick: None,
            sync: None,
        }
    }

    /// Request a tick unless one is already outstanding.
    pub fn start(&mut self) {
        if self.tick.is_none() {
            self.tick = Some(self.scheduler.request_frame(FrameTask::Tick));
        }
    }

    /// Cancel the outstanding tick and pointer sync, if any.
    pub fn stop(&mut self) {
        for handle in [self.tick.take(), self.sync.take()].into_iter().flatten() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Whether a tick is outstanding.
    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    /// Mark the outstanding tick as delivered. Returns `false` for a stale
    /// callback (nothing was outstanding), which the caller must ignore.
    pub fn complete_tick(&mut self) -> bool {
        self.tick.take().is_some()
    }

    /// Request a pointer-sync frame unless one is already outstanding.
    /// Returns `true` if a new request was made.
    pub fn request_pointer_sync(&mut self) -> bool {
        if self.sync.is_some() {
            return false;
        }
        self.sync = Some(self.scheduler.request_frame(FrameTask::PointerSync));
        true
    }

    /// Whether a pointer sync is outstanding.
    pub fn is_sync_pending(&self) -> bool {
        self.sync.is_some()
    }

    /// Mark the outstanding pointer sync as delivered. Returns `false` for a
    /// stale callback.
    pub fn complete_pointer_sync(&mut self) -> bool {
        self.sync.take().is_some()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

/// Outstanding frame requests, in request order.
///
/// Shared by hosts whose frame primitive is a single wake-up (a redraw
/// request) rather than one callback per request.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: Vec<(FrameHandle, FrameTask)>,
    next_id: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: FrameTask) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push((handle, task));
        handle
    }

    /// Remove a request. Returns `false` if it was not outstanding.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|&(h, _)| h != handle);
        self.pending.len() != before
    }

    /// Drain every due task, pointer syncs first, in request order otherwise.
    pub fn take_due(&mut self) -> Vec<FrameTask> {
        let mut due = std::mem::take(&mut self.pending);
        due.sort_by_key(|&(handle, task)| (task != FrameTask::PointerSync, handle.0));
        due.into_iter().map(|(_, task)| task).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, task: FrameTask) -> bool {
        self.pending.iter().any(|&(_, t)| t == task)
    }
}

/// Queue-backed scheduler driven explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    queue: FrameQueue,
    requests: u64,
    cancellations: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain every due task, pointer syncs first.
    pub fn take_due(&mut self) -> Vec<FrameTask> {
        self.queue.take_due()
    }

    /// Number of outstanding requests.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, task: FrameTask) -> bool {
        self.queue.contains(task)
    }

    /// Total requests ever made.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Total cancellations of outstanding requests.
    pub fn cancellations(&self) -> u64 {
        self.cancellations
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, task: FrameTask) -> FrameHandle {
        self.requests += 1;
        self.queue.push(task)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.queue.cancel(handle) {
            self.cancellations += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_idempotent() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        frames.start();
        assert!(frames.is_running());
        assert_eq!(frames.scheduler().pending(), 1);
        assert_eq!(frames.scheduler().requests(), 1);
    }

    #[test]
    fn test_stop_cancels_outstanding_tick() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        frames.stop();
        assert!(!frames.is_running());
        assert_eq!(frames.scheduler().pending(), 0);
        assert_eq!(frames.scheduler().cancellations(), 1);

        // Stopping again has nothing to cancel.
        frames.stop();
        assert_eq!(frames.scheduler().cancellations(), 1);
    }

    #[test]
    fn test_complete_tick_detects_stale_callbacks() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        assert!(!frames.complete_tick());
        frames.start();
        assert!(frames.complete_tick());
        assert!(!frames.is_running());
    }

    #[test]
    fn test_pointer_sync_requests_dedupe() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        assert!(frames.request_pointer_sync());
        assert!(!frames.request_pointer_sync());
        assert_eq!(frames.scheduler().requests(), 1);

        assert!(frames.complete_pointer_sync());
        assert!(!frames.complete_pointer_sync());
        assert!(frames.request_pointer_sync());
        assert_eq!(frames.scheduler().requests(), 2);
    }

    #[test]
    fn test_stop_cancels_outstanding_sync() {
        let mut frames = FrameLoop::new(ManualScheduler::new());
        frames.start();
        frames.request_pointer_sync();
        assert_eq!(frames.scheduler().pending(), 2);

        frames.stop();
        assert!(!frames.is_sync_pending());
        assert_eq!(frames.scheduler().pending(), 0);
        assert_eq!(frames.scheduler().cancellations(), 2);
    }

    #[test]
    fn test_take_due_orders_pointer_sync_first() {
        let mut scheduler = ManualScheduler::new();
        scheduler.request_frame(FrameTask::Tick);
        scheduler.request_frame(FrameTask::PointerSync);
        assert_eq!(scheduler.take_due(), vec![FrameTask::PointerSync, FrameTask::Tick]);
        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.take_due().is_empty());
    }

    #[test]
    fn test_cancel_unknown_handle_is_ignored() {
        let mut scheduler = ManualScheduler::new();
        scheduler.request_frame(FrameTask::Tick);
        scheduler.cancel_frame(FrameHandle(999));
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.cancellations(), 0);
    }
}
