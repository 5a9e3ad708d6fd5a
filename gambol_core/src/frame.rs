// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame context and delta-time bookkeeping.

use kurbo::Rect;

use crate::time::{Duration, HostTime};

/// What a frame knows about itself. Passed by reference to entity moves and
/// game hooks instead of living in shared mutable state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame, already capped.
    pub dt: f64,
    /// Viewport rectangle in target pixels.
    pub bounds: Rect,
    /// Monotonic frame counter, starting at 1 for the first frame.
    pub frame_index: u64,
}

impl FrameContext {
    /// A context for driving entities outside a frame loop.
    #[must_use]
    pub const fn new(dt: f64, bounds: Rect) -> Self {
        Self {
            dt,
            bounds,
            frame_index: 0,
        }
    }
}

/// The measured delta of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDelta {
    /// Time since the previous frame as measured.
    pub raw: Duration,
    /// The delta actually used, at most the configured cap.
    pub used: Duration,
}

impl FrameDelta {
    /// Whether the cap shortened this frame.
    #[must_use]
    pub fn capped(&self) -> bool {
        self.used < self.raw
    }
}

/// Turns clock readings into capped frame deltas.
///
/// The first reading after construction or [`resync`](Self::resync) yields a
/// zero delta, so time spent before the loop started (or while it was
/// paused) is never integrated.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    last: Option<HostTime>,
    max_tick: Duration,
}

impl FrameClock {
    /// A clock that caps deltas at `max_tick`.
    #[must_use]
    pub const fn new(max_tick: Duration) -> Self {
        Self {
            last: None,
            max_tick,
        }
    }

    /// Records `now` and returns the delta since the previous reading.
    pub fn tick(&mut self, now: HostTime) -> FrameDelta {
        let raw = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        FrameDelta {
            raw,
            used: raw.min(self.max_tick),
        }
    }

    /// Forgets the previous reading.
    pub fn resync(&mut self) {
        self.last = None;
    }

    /// The configured cap.
    #[must_use]
    pub const fn max_tick(&self) -> Duration {
        self.max_tick
    }
}
