// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-loop instrumentation.
//!
//! The [`FrameLoop`](crate::game::FrameLoop) reports each frame's tick, the
//! begin and end of every [`PhaseKind`], state changes, exhausted
//! trajectories, and the presented region to a [`TraceSink`]. A run is traced
//! by handing a [`Tracer`] to `tick_traced` or `run_traced`.
//!
//! [`FrameSummaryBuilder`] turns the phase timestamps of one frame into a
//! [`FrameSummary`].
//!
//! # Crate features
//!
//! - `trace`: without it, [`Tracer`] methods are empty.
//! - `trace-rich` (implies `trace`): adds per-frame [`DamageRect`] lists
//!   through [`TraceSink::on_dirty_rects`].

use crate::config::ExhaustionPolicy;
use crate::game::LoopState;
use crate::scene::EntityId;
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Restoring the background under last frame's sprites.
    Clear,
    /// Draining the input queue.
    Events,
    /// Advancing trajectories.
    Move,
    /// Game collision checks.
    Collide,
    /// Blitting sprites at their new positions.
    Draw,
    /// Handing dirty rectangles to the render target.
    Present,
}

impl PhaseKind {
    /// Every phase, in frame order.
    pub const ALL: [Self; 6] = [
        Self::Clear,
        Self::Events,
        Self::Move,
        Self::Collide,
        Self::Draw,
        Self::Present,
    ];

    /// Short lowercase name for trace output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Events => "events",
            Self::Move => "move",
            Self::Collide => "collide",
            Self::Draw => "draw",
            Self::Present => "present",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted at the start of every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTickEvent {
    /// 1-based index of the frame being run.
    pub frame_index: u64,
    /// Clock reading at the start of the frame.
    pub now: HostTime,
    /// Measured time since the previous frame.
    pub raw_dt: Duration,
    /// Delta handed to trajectories after capping.
    pub dt: Duration,
    /// Loop state the frame runs in.
    pub state: LoopState,
}

/// Marks the beginning of a frame phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseBeginEvent {
    /// Frame the event belongs to.
    pub frame_index: u64,
    /// The phase that begins.
    pub phase: PhaseKind,
    /// Clock reading when the phase began.
    pub timestamp: HostTime,
}

/// Marks the end of a frame phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseEndEvent {
    /// Frame the event belongs to.
    pub frame_index: u64,
    /// The phase that ends.
    pub phase: PhaseKind,
    /// Clock reading when the phase ended.
    pub timestamp: HostTime,
}

/// Emitted when the frame is presented.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentEvent {
    /// Frame the event belongs to.
    pub frame_index: u64,
    /// Host time of presentation.
    pub presented_at: HostTime,
    /// Number of dirty rectangles handed over.
    pub rect_count: u32,
    /// Whether the whole target was presented.
    pub full: bool,
}

/// Emitted when the loop changes state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateChangeEvent {
    /// Frame the event belongs to.
    pub frame_index: u64,
    /// Previous state.
    pub from: LoopState,
    /// New state.
    pub to: LoopState,
}

/// Emitted when an entity's trajectory exhausts inside the loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExhaustedEvent {
    /// Frame the event belongs to.
    pub frame_index: u64,
    /// The entity.
    pub entity: EntityId,
    /// What the loop did about it.
    pub policy: ExhaustionPolicy,
}

/// How long each phase of one frame took, built by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSummary {
    /// Frame the event belongs to.
    pub frame_index: u64,
    /// Clock reading at the start of the frame.
    pub now: HostTime,
    /// Delta handed to trajectories.
    pub dt: Duration,
    /// Clear phase duration in nanoseconds (0 if not measured).
    pub clear_ns: u64,
    /// Events phase duration in nanoseconds.
    pub events_ns: u64,
    /// Move phase duration in nanoseconds.
    pub move_ns: u64,
    /// Collide phase duration in nanoseconds.
    pub collide_ns: u64,
    /// Draw phase duration in nanoseconds.
    pub draw_ns: u64,
    /// Present phase duration in nanoseconds.
    pub present_ns: u64,
    /// Dirty rectangles presented.
    pub dirty_rects: u32,
    /// Trajectories that exhausted this frame.
    pub exhausted: u32,
}

/// An axis-aligned dirty rectangle in whole pixels.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

#[cfg(feature = "trace-rich")]
impl DamageRect {
    /// Snaps a kurbo rectangle outward to whole pixels.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "render targets are at most 4096 pixels on a side"
    )]
    #[must_use]
    pub fn from_rect(r: kurbo::Rect) -> Self {
        let r = crate::geometry::pixel_bounds(r);
        Self {
            x: r.x0 as i32,
            y: r.y0 as i32,
            width: r.width() as u32,
            height: r.height() as u32,
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Observer of frame-loop trace events.
///
/// Every method defaults to doing nothing; sinks implement only what they
/// record.
pub trait TraceSink {
    /// Called at the start of every frame.
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when the frame is presented.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called when the loop changes state.
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        _ = e;
    }

    /// Called when an entity's trajectory exhausts.
    fn on_exhausted(&mut self, e: &ExhaustedEvent) {
        _ = e;
    }

    /// Called with a per-frame timing summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with per-frame dirty rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_dirty_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        _ = (frame_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// The handle the frame loop emits events through.
///
/// Without the `trace` feature its methods are empty and inline away. With it,
/// each call costs one branch on whether a sink is attached.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($(#[$doc:meta])* $name:ident, $method:ident, $event:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Sends events to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// A tracer with no sink.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    emit!(
        /// Emits a [`FrameTickEvent`].
        frame_tick, on_frame_tick, FrameTickEvent
    );
    emit!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin, on_phase_begin, PhaseBeginEvent
    );
    emit!(
        /// Emits a [`PhaseEndEvent`].
        phase_end, on_phase_end, PhaseEndEvent
    );
    emit!(
        /// Emits a [`PresentEvent`].
        present, on_present, PresentEvent
    );
    emit!(
        /// Emits a [`StateChangeEvent`].
        state_change, on_state_change, StateChangeEvent
    );
    emit!(
        /// Emits an [`ExhaustedEvent`].
        exhausted, on_exhausted, ExhaustedEvent
    );
    emit!(
        /// Emits a [`FrameSummary`].
        frame_summary, on_frame_summary, FrameSummary
    );

    /// Emits dirty rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn dirty_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        if let Some(s) = &mut self.sink {
            s.on_dirty_rects(frame_index, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Accumulates phase begin and end times over one frame.
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    tick: FrameTickEvent,
    phase_starts: [Option<HostTime>; 6],
    phase_ends: [Option<HostTime>; 6],
    dirty_rects: u32,
    exhausted: u32,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given tick.
    #[must_use]
    pub fn new(tick: &FrameTickEvent) -> Self {
        Self {
            tick: *tick,
            phase_starts: [None; 6],
            phase_ends: [None; 6],
            dirty_rects: 0,
            exhausted: 0,
        }
    }

    /// Notes that `phase` began at `t`.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Notes that `phase` ended at `t`.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase_index(phase)] = Some(t);
    }

    /// Sets the number of presented dirty rectangles.
    pub fn set_dirty_rects(&mut self, count: u32) {
        self.dirty_rects = count;
    }

    /// Counts one exhausted trajectory.
    pub fn add_exhausted(&mut self) {
        self.exhausted += 1;
    }

    /// The finished [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.tick.frame_index,
            now: self.tick.now,
            dt: self.tick.dt,
            clear_ns: self.phase_duration(PhaseKind::Clear),
            events_ns: self.phase_duration(PhaseKind::Events),
            move_ns: self.phase_duration(PhaseKind::Move),
            collide_ns: self.phase_duration(PhaseKind::Collide),
            draw_ns: self.phase_duration(PhaseKind::Draw),
            present_ns: self.phase_duration(PhaseKind::Present),
            dirty_rects: self.dirty_rects,
            exhausted: self.exhausted,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).nanos(),
            _ => 0,
        }
    }
}

/// Slot of `phase` in the per-phase arrays.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Clear => 0,
        PhaseKind::Events => 1,
        PhaseKind::Move => 2,
        PhaseKind::Collide => 3,
        PhaseKind::Draw => 4,
        PhaseKind::Present => 5,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> FrameTickEvent {
        FrameTickEvent {
            frame_index: 42,
            now: HostTime(1_000_000),
            raw_dt: Duration::from_millis(16),
            dt: Duration::from_millis(16),
            state: LoopState::Running,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_tick(&sample_tick());
        sink.on_frame_summary(&FrameSummaryBuilder::new(&sample_tick()).finish());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame_tick(&sample_tick());
        tracer.state_change(&StateChangeEvent {
            frame_index: 1,
            from: LoopState::Running,
            to: LoopState::Quit,
        });
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(&sample_tick());
        let mut t = 1_000_000;
        for (i, phase) in PhaseKind::ALL.into_iter().enumerate() {
            builder.phase_begin(phase, HostTime(t));
            t += 100 * (i as u64 + 1);
            builder.phase_end(phase, HostTime(t));
        }
        builder.set_dirty_rects(3);
        builder.add_exhausted();

        let summary = builder.finish();
        assert_eq!(summary.clear_ns, 100);
        assert_eq!(summary.events_ns, 200);
        assert_eq!(summary.move_ns, 300);
        assert_eq!(summary.collide_ns, 400);
        assert_eq!(summary.draw_ns, 500);
        assert_eq!(summary.present_ns, 600);
        assert_eq!(summary.dirty_rects, 3);
        assert_eq!(summary.exhausted, 1);
        assert_eq!(summary.frame_index, 42);
    }

    #[test]
    fn summary_builder_missing_phases_are_zero() {
        let summary = FrameSummaryBuilder::new(&sample_tick()).finish();
        assert_eq!(summary.clear_ns, 0);
        assert_eq!(summary.present_ns, 0);
        assert_eq!(summary.dt, Duration::from_millis(16));
    }

    #[test]
    fn phase_names_are_distinct() {
        for (i, a) in PhaseKind::ALL.iter().enumerate() {
            for b in &PhaseKind::ALL[i + 1..] {
                assert_ne!(a.name(), b.name(), "{a:?} vs {b:?}");
            }
        }
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            ticks: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame_tick(&mut self, e: &FrameTickEvent) {
                self.ticks.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink { ticks: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame_tick(&sample_tick());
        drop(tracer);
        assert_eq!(sink.ticks, &[42]);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn damage_rect_snaps_outward() {
        let r = DamageRect::from_rect(kurbo::Rect::new(1.5, 2.0, 4.2, 6.0));
        assert_eq!(
            r,
            DamageRect {
                x: 1,
                y: 2,
                width: 4,
                height: 4
            }
        );
    }
}
