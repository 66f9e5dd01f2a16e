//! Platform capabilities: a monotonic clock and frame callbacks
//!
//! The scheduler never reaches for global time or a global frame source.
//! Both are handed in at construction so a run can be driven by the
//! terminal loop or stepped by hand in tests.

use std::time::Instant;

/// Monotonic time source in milliseconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Identifies one outstanding frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Request/cancel pair for display-refresh callbacks
pub trait FrameHost {
    /// Ask for one callback at the next refresh. `None` when the host has no
    /// frame source at all.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Device pixels per logical unit
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}

/// Wall clock backed by `Instant`
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualClock {
    now: f64,
}

#[cfg(test)]
impl ManualClock {
    pub fn at(now: f64) -> Self {
        Self { now }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now += ms;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }
}

/// Holds at most one outstanding frame request until the host loop takes it
#[derive(Debug)]
pub struct PendingFrames {
    next_id: u64,
    pending: Option<FrameHandle>,
    pixel_ratio: f64,
    requested: u64,
    cancelled: u64,
}

impl PendingFrames {
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            next_id: 1,
            pending: None,
            pixel_ratio,
            requested: 0,
            cancelled: 0,
        }
    }

    /// Take the outstanding request so its callback can be delivered
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

#[cfg(test)]
impl PendingFrames {
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl Default for PendingFrames {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FrameHost for PendingFrames {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.pending = Some(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled += 1;
        tracing::trace!(
            ?handle,
            requested = self.requested,
            cancelled = self.cancelled,
            "frame request cancelled"
        );
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

/// A host without any display refresh, such as print mode. Runs on it
/// never become active and are driven with `run_to_completion`.
#[derive(Clone, Copy, Debug)]
pub struct NoFrames {
    pixel_ratio: f64,
}

impl NoFrames {
    pub fn new(pixel_ratio: f64) -> Self {
        Self { pixel_ratio }
    }
}

impl Default for NoFrames {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FrameHost for NoFrames {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        None
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {}

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_frames_keeps_latest_request() {
        let mut frames = PendingFrames::default();
        let first = frames.request_frame().unwrap();
        let second = frames.request_frame().unwrap();
        assert_ne!(first, second);
        assert_eq!(frames.pending(), Some(second));
        assert_eq!(frames.take_pending(), Some(second));
        assert_eq!(frames.take_pending(), None);
    }

    #[test]
    fn cancelling_stale_handle_keeps_pending() {
        let mut frames = PendingFrames::default();
        let first = frames.request_frame().unwrap();
        let second = frames.request_frame().unwrap();
        frames.cancel_frame(first);
        assert_eq!(frames.pending(), Some(second));
        frames.cancel_frame(second);
        assert_eq!(frames.pending(), None);
        assert_eq!(frames.cancelled(), 2);
    }

    #[test]
    fn manual_clock_advances() {
        let mut clock = ManualClock::at(5.0);
        clock.advance(20.0);
        assert_eq!(clock.now(), 25.0);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
