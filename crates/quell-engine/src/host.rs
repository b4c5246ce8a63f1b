//! Host event-loop abstraction
//!
//! The engine never blocks and never spawns threads. It asks the host for a
//! yield point and the embedder calls back into [`crate::Engine::run_slot`]
//! once that slot fires.

use std::time::{Duration, Instant};

/// Event-loop primitives the engine needs from its environment
pub trait Host {
    /// Current time
    fn now(&self) -> Instant;

    /// Request an idle-time slot that fires no later than `timeout`.
    ///
    /// Returns false when the environment has no idle scheduling; the caller
    /// then falls back to [`Host::request_animation_frame`].
    fn request_idle_callback(&mut self, timeout: Duration) -> bool;

    /// Request a slot on the next frame
    fn request_animation_frame(&mut self);
}

/// Kind of slot a host was asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Idle,
    Frame,
}

/// Deterministic host with a hand-advanced clock.
///
/// Records slot requests instead of scheduling anything; the driver pops
/// them with [`ManualHost::take_slot`] and runs the engine.
#[derive(Debug, Clone)]
pub struct ManualHost {
    origin: Instant,
    elapsed: Duration,
    idle_supported: bool,
    pending: Option<SlotKind>,
    idle_requests: usize,
    frame_requests: usize,
    last_idle_timeout: Option<Duration>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Duration::ZERO,
            idle_supported: true,
            pending: None,
            idle_requests: 0,
            frame_requests: 0,
            last_idle_timeout: None,
        }
    }

    /// Host whose environment lacks idle callbacks
    pub fn without_idle() -> Self {
        Self {
            idle_supported: false,
            ..Self::new()
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }

    /// Time since the host was created
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn pending_slot(&self) -> Option<SlotKind> {
        self.pending
    }

    /// Fire the outstanding slot, if any
    pub fn take_slot(&mut self) -> Option<SlotKind> {
        self.pending.take()
    }

    pub fn idle_requests(&self) -> usize {
        self.idle_requests
    }

    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    /// Total slots requested so far
    pub fn slot_requests(&self) -> usize {
        self.idle_requests + self.frame_requests
    }

    pub fn last_idle_timeout(&self) -> Option<Duration> {
        self.last_idle_timeout
    }
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for ManualHost {
    fn now(&self) -> Instant {
        self.origin + self.elapsed
    }

    fn request_idle_callback(&mut self, timeout: Duration) -> bool {
        if !self.idle_supported {
            return false;
        }
        self.pending = Some(SlotKind::Idle);
        self.idle_requests += 1;
        self.last_idle_timeout = Some(timeout);
        true
    }

    fn request_animation_frame(&mut self) {
        self.pending = Some(SlotKind::Frame);
        self.frame_requests += 1;
    }
}
