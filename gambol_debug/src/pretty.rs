// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use gambol_core::config::ExhaustionPolicy;
use gambol_core::trace::{
    DamageRect, ExhaustedEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent, PhaseEndEvent,
    PresentEvent, StateChangeEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    summaries_only: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("summaries_only", &self.summaries_only)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            summaries_only: false,
        }
    }

    /// Only print frame summaries, state changes, and exhaustions.
    #[must_use]
    pub fn summaries_only(mut self) -> Self {
        self.summaries_only = true;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn policy_name(policy: ExhaustionPolicy) -> &'static str {
    match policy {
        ExhaustionPolicy::Reset => "reset",
        ExhaustionPolicy::Freeze => "freeze",
        ExhaustionPolicy::Remove => "remove",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        if self.summaries_only {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[tick] frame={} now={:.1}µs dt={:.3}ms raw={:.3}ms state={:?}",
            e.frame_index,
            e.now.as_micros_f64(),
            e.dt.as_millis_f64(),
            e.raw_dt.as_millis_f64(),
            e.state,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        if self.summaries_only {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            e.timestamp.as_micros_f64(),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        if self.summaries_only {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            e.timestamp.as_micros_f64(),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        if self.summaries_only {
            return;
        }
        if e.full {
            let _ = writeln!(self.writer, "[present] frame={} full", e.frame_index);
        } else {
            let _ = writeln!(
                self.writer,
                "[present] frame={} rects={}",
                e.frame_index, e.rect_count,
            );
        }
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        let _ = writeln!(
            self.writer,
            "[state] frame={} {:?} -> {:?}",
            e.frame_index, e.from, e.to,
        );
    }

    fn on_exhausted(&mut self, e: &ExhaustedEvent) {
        let _ = writeln!(
            self.writer,
            "[exhausted] frame={} {:?} {}",
            e.frame_index,
            e.entity,
            policy_name(e.policy),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let ns_to_us = |ns: u64| ns as f64 / 1000.0;
        let _ = writeln!(
            self.writer,
            "[summary] frame={} dt={:.3}ms clear={:.1}µs events={:.1}µs move={:.1}µs \
             collide={:.1}µs draw={:.1}µs present={:.1}µs dirty={} exhausted={}",
            s.frame_index,
            s.dt.as_millis_f64(),
            ns_to_us(s.clear_ns),
            ns_to_us(s.events_ns),
            ns_to_us(s.move_ns),
            ns_to_us(s.collide_ns),
            ns_to_us(s.draw_ns),
            ns_to_us(s.present_ns),
            s.dirty_rects,
            s.exhausted,
        );
    }

    fn on_dirty_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        if self.summaries_only {
            return;
        }
        let _ = write!(self.writer, "[dirty] frame={frame_index}");
        for r in rects {
            let _ = write!(self.writer, " {}x{}+{}+{}", r.width, r.height, r.x, r.y);
        }
        let _ = writeln!(self.writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambol_core::game::LoopState;
    use gambol_core::scene::EntityId;
    use gambol_core::time::{Duration, HostTime};

    fn tick() -> FrameTickEvent {
        FrameTickEvent {
            frame_index: 1,
            now: HostTime(1_000_000),
            raw_dt: Duration::from_millis(40),
            dt: Duration::from_millis(33),
            state: LoopState::Running,
        }
    }

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_tick(&tick());
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[tick]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("dt=33.000ms"), "got: {output}");
    }

    #[test]
    fn dirty_rects_are_listed() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_dirty_rects(
            3,
            &[DamageRect {
                x: 10,
                y: 20,
                width: 8,
                height: 4,
            }],
        );
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "[dirty] frame=3 8x4+10+20\n");
    }

    #[test]
    fn summaries_only_skips_per_phase_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).summaries_only();
        sink.on_frame_tick(&tick());
        sink.on_exhausted(&ExhaustedEvent {
            frame_index: 2,
            entity: EntityId::from_raw(4, 1),
            policy: ExhaustionPolicy::Freeze,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(!output.contains("[tick]"), "got: {output}");
        assert!(output.contains("EntityId(4@gen1) freeze"), "got: {output}");
    }
}
