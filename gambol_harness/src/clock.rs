// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clocks for hosts without a display.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use gambol_core::backend::Clock;
use gambol_core::time::{Duration, HostTime};

/// A clock that only moves when advanced, or when the loop waits on it.
///
/// Clones share the same time, so a test can keep a handle while the frame
/// loop owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// A clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock at `t`.
    #[must_use]
    pub fn starting_at(t: HostTime) -> Self {
        let clock = Self::new();
        clock.set(t);
        clock
    }

    /// Moves time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by.nanos()));
    }

    /// Jumps to `t`. Going backwards is allowed; the frame loop saturates
    /// negative deltas to zero.
    pub fn set(&self, t: HostTime) {
        self.now.set(t.nanos());
    }
}

impl Clock for ManualClock {
    fn now(&self) -> HostTime {
        HostTime(self.now.get())
    }

    fn wait_until(&mut self, deadline: HostTime) {
        if deadline.nanos() > self.now.get() {
            self.now.set(deadline.nanos());
        }
    }
}

/// The process's monotonic clock. Waiting sleeps the thread.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// A clock whose zero is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> HostTime {
        let nanos = self.epoch.elapsed().as_nanos();
        HostTime(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn wait_until(&mut self, deadline: HostTime) {
        let left = deadline.saturating_duration_since(self.now());
        if left.nanos() > 0 {
            std::thread::sleep(std::time::Duration::from_nanos(left.nanos()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_handles_share_time() {
        let a = ManualClock::new();
        let mut b = a.clone();
        a.advance(Duration::from_millis(5));
        assert_eq!(b.now(), HostTime(5_000_000));
        b.wait_until(HostTime(9_000_000));
        assert_eq!(a.now(), HostTime(9_000_000), "waiting moves every handle");
        b.wait_until(HostTime(1));
        assert_eq!(a.now(), HostTime(9_000_000), "past deadlines return at once");
    }

    #[test]
    fn system_clock_waits_at_least_until_the_deadline() {
        let mut clock = SystemClock::new();
        let deadline = clock.now() + Duration::from_millis(2);
        clock.wait_until(deadline);
        assert!(clock.now() >= deadline, "woke early");
    }
}
