// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling frame pacing statistics.

use gambol_core::trace::{FrameSummary, FrameTickEvent, TraceSink};

/// A [`TraceSink`] that keeps the last `N` frame deltas and counts frames
/// whose delta was capped.
#[derive(Debug)]
pub struct PacingStats<const N: usize> {
    deltas_ms: [f64; N],
    cursor: usize,
    frames: u64,
    capped: u64,
    dirty_rects: u64,
}

impl<const N: usize> Default for PacingStats<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PacingStats<N> {
    /// Empty statistics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deltas_ms: [0.0; N],
            cursor: 0,
            frames: 0,
            capped: 0,
            dirty_rects: 0,
        }
    }

    /// Frames observed.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames whose measured delta exceeded the cap.
    #[must_use]
    pub const fn capped(&self) -> u64 {
        self.capped
    }

    /// Dirty rectangles presented over all frames.
    #[must_use]
    pub const fn dirty_rects(&self) -> u64 {
        self.dirty_rects
    }

    /// Recorded deltas in milliseconds, oldest first. Shorter than `N`
    /// until `N` frames have run.
    #[must_use]
    pub fn frame_deltas(&self) -> Vec<f64> {
        let filled = usize::try_from(self.frames).map_or(N, |f| f.min(N));
        let start = if filled < N { 0 } else { self.cursor };
        (0..filled).map(|i| self.deltas_ms[(start + i) % N]).collect()
    }

    /// Mean of the recorded deltas in milliseconds, or `None` before the
    /// first frame.
    #[must_use]
    pub fn mean_delta_ms(&self) -> Option<f64> {
        let deltas = self.frame_deltas();
        (!deltas.is_empty()).then(|| deltas.iter().sum::<f64>() / deltas.len() as f64)
    }
}

impl<const N: usize> TraceSink for PacingStats<N> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        if N > 0 {
            self.deltas_ms[self.cursor] = e.dt.as_millis_f64();
            self.cursor = (self.cursor + 1) % N;
        }
        self.frames += 1;
        if e.raw_dt > e.dt {
            self.capped += 1;
        }
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.dirty_rects += u64::from(s.dirty_rects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambol_core::game::LoopState;
    use gambol_core::time::{Duration, HostTime};

    fn tick(raw_ms: u64, ms: u64) -> FrameTickEvent {
        FrameTickEvent {
            frame_index: 0,
            now: HostTime(0),
            raw_dt: Duration::from_millis(raw_ms),
            dt: Duration::from_millis(ms),
            state: LoopState::Running,
        }
    }

    #[test]
    fn ring_keeps_the_newest_deltas() {
        let mut stats = PacingStats::<3>::new();
        assert_eq!(stats.mean_delta_ms(), None);
        for ms in [10, 20, 30, 40] {
            stats.on_frame_tick(&tick(ms, ms));
        }
        assert_eq!(stats.frame_deltas(), [20.0, 30.0, 40.0]);
        assert_eq!(stats.mean_delta_ms(), Some(30.0));
        assert_eq!(stats.frames(), 4);
    }

    #[test]
    fn capped_frames_are_counted() {
        let mut stats = PacingStats::<4>::new();
        stats.on_frame_tick(&tick(16, 16));
        stats.on_frame_tick(&tick(500, 50));
        assert_eq!(stats.capped(), 1);
        assert_eq!(stats.frame_deltas(), [16.0, 50.0]);
    }
}
