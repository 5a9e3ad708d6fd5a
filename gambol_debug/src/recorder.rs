// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] appends one tagged little-endian record per event to a
//! byte buffer. [`decode`] turns a buffer back into [`RecordedEvent`]s.
//! Dirty-rectangle records carry a count and are variable-sized.
//!
//! Dirty rectangles are stored in full, prefixed by their count.

use gambol_core::config::ExhaustionPolicy;
use gambol_core::game::LoopState;
use gambol_core::scene::EntityId;
use gambol_core::time::{Duration, HostTime};
use gambol_core::trace::{
    DamageRect, ExhaustedEvent, FrameSummary, FrameTickEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, PresentEvent, StateChangeEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_TICK: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_PRESENT: u8 = 4;
const TAG_STATE_CHANGE: u8 = 5;
const TAG_EXHAUSTED: u8 = 6;
const TAG_FRAME_SUMMARY: u8 = 7;
const TAG_DIRTY_RECTS: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that keeps a binary log of a run.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes recorded so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Takes the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- writers --

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_state(&mut self, s: LoopState) {
        self.write_u8(match s {
            LoopState::Running => 0,
            LoopState::Paused => 1,
            LoopState::AwaitingConfig => 2,
            LoopState::Stopped => 3,
            LoopState::Quit => 4,
        });
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Clear => 0,
            PhaseKind::Events => 1,
            PhaseKind::Move => 2,
            PhaseKind::Collide => 3,
            PhaseKind::Draw => 4,
            PhaseKind::Present => 5,
        });
    }

    fn write_policy(&mut self, p: ExhaustionPolicy) {
        self.write_u8(match p {
            ExhaustionPolicy::Reset => 0,
            ExhaustionPolicy::Freeze => 1,
            ExhaustionPolicy::Remove => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_tick(&mut self, e: &FrameTickEvent) {
        self.write_u8(TAG_FRAME_TICK);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.nanos());
        self.write_u64(e.raw_dt.nanos());
        self.write_u64(e.dt.nanos());
        self.write_state(e.state);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.nanos());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.nanos());
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.write_u8(TAG_PRESENT);
        self.write_u64(e.frame_index);
        self.write_u64(e.presented_at.nanos());
        self.write_u32(e.rect_count);
        self.write_u8(u8::from(e.full));
    }

    fn on_state_change(&mut self, e: &StateChangeEvent) {
        self.write_u8(TAG_STATE_CHANGE);
        self.write_u64(e.frame_index);
        self.write_state(e.from);
        self.write_state(e.to);
    }

    fn on_exhausted(&mut self, e: &ExhaustedEvent) {
        self.write_u8(TAG_EXHAUSTED);
        self.write_u64(e.frame_index);
        self.write_u32(e.entity.index());
        self.write_u32(e.entity.generation());
        self.write_policy(e.policy);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u64(s.now.nanos());
        self.write_u64(s.dt.nanos());
        self.write_u64(s.clear_ns);
        self.write_u64(s.events_ns);
        self.write_u64(s.move_ns);
        self.write_u64(s.collide_ns);
        self.write_u64(s.draw_ns);
        self.write_u64(s.present_ns);
        self.write_u32(s.dirty_rects);
        self.write_u32(s.exhausted);
    }

    fn on_dirty_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        self.write_u8(TAG_DIRTY_RECTS);
        self.write_u64(frame_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "dirty rect count capped at u32::MAX for recording"
        )]
        let count = rects.len().min(u32::MAX as usize) as u32;
        self.write_u32(count);
        for r in rects.iter().take(count as usize) {
            self.write_i32(r.x);
            self.write_i32(r.y);
            self.write_u32(r.width);
            self.write_u32(r.height);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// One event read back from a recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameTickEvent`].
    FrameTick(FrameTickEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// A [`StateChangeEvent`].
    StateChange(StateChangeEvent),
    /// An [`ExhaustedEvent`].
    Exhausted(ExhaustedEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Dirty rectangles for a frame.
    DirtyRects {
        /// Frame the rectangles were presented in.
        frame_index: u64,
        /// The rectangles, in presentation order.
        rects: Vec<DamageRect>,
    },
}

/// Reads the events out of a [`RecorderSink`] buffer.
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Events decoded from a recording, in order.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_state(&mut self) -> Option<LoopState> {
        Some(match self.read_u8()? {
            0 => LoopState::Running,
            1 => LoopState::Paused,
            2 => LoopState::AwaitingConfig,
            3 => LoopState::Stopped,
            _ => LoopState::Quit,
        })
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Clear,
            1 => PhaseKind::Events,
            2 => PhaseKind::Move,
            3 => PhaseKind::Collide,
            4 => PhaseKind::Draw,
            _ => PhaseKind::Present,
        })
    }

    fn read_policy(&mut self) -> Option<ExhaustionPolicy> {
        Some(match self.read_u8()? {
            0 => ExhaustionPolicy::Reset,
            1 => ExhaustionPolicy::Freeze,
            _ => ExhaustionPolicy::Remove,
        })
    }

    fn decode_frame_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameTick(FrameTickEvent {
            frame_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            raw_dt: Duration(self.read_u64()?),
            dt: Duration(self.read_u64()?),
            state: self.read_state()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_present(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Present(PresentEvent {
            frame_index: self.read_u64()?,
            presented_at: HostTime(self.read_u64()?),
            rect_count: self.read_u32()?,
            full: self.read_u8()? != 0,
        }))
    }

    fn decode_state_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StateChange(StateChangeEvent {
            frame_index: self.read_u64()?,
            from: self.read_state()?,
            to: self.read_state()?,
        }))
    }

    fn decode_exhausted(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(RecordedEvent::Exhausted(ExhaustedEvent {
            frame_index,
            entity: EntityId::from_raw(index, generation),
            policy: self.read_policy()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            dt: Duration(self.read_u64()?),
            clear_ns: self.read_u64()?,
            events_ns: self.read_u64()?,
            move_ns: self.read_u64()?,
            collide_ns: self.read_u64()?,
            draw_ns: self.read_u64()?,
            present_ns: self.read_u64()?,
            dirty_rects: self.read_u32()?,
            exhausted: self.read_u32()?,
        }))
    }

    fn decode_dirty_rects(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let count = self.read_u32()?;
        let mut rects = Vec::new();
        for _ in 0..count {
            rects.push(DamageRect {
                x: self.read_i32()?,
                y: self.read_i32()?,
                width: self.read_u32()?,
                height: self.read_u32()?,
            });
        }
        Some(RecordedEvent::DirtyRects { frame_index, rects })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_TICK => self.decode_frame_tick(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_PRESENT => self.decode_present(),
            TAG_STATE_CHANGE => self.decode_state_change(),
            TAG_EXHAUSTED => self.decode_exhausted(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_DIRTY_RECTS => self.decode_dirty_rects(),
            _ => None,
        }
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
            frame_index: 7,
            now: HostTime(1_000_000),
            raw_dt: Duration::from_millis(250),
            dt: Duration::from_millis(100),
            state: LoopState::Running,
        }
    }

    #[test]
    fn frame_tick_survives_recording() {
        let mut rec = RecorderSink::new();
        rec.on_frame_tick(&sample_tick());
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events, [RecordedEvent::FrameTick(sample_tick())]);
    }

    #[test]
    fn mixed_stream_keeps_order() {
        let mut rec = RecorderSink::new();
        rec.on_frame_tick(&sample_tick());
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 7,
            phase: PhaseKind::Move,
            timestamp: HostTime(1_000_100),
        });
        rec.on_exhausted(&ExhaustedEvent {
            frame_index: 7,
            entity: EntityId::from_raw(3, 2),
            policy: ExhaustionPolicy::Remove,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 7,
            phase: PhaseKind::Move,
            timestamp: HostTime(1_000_400),
        });
        rec.on_state_change(&StateChangeEvent {
            frame_index: 7,
            from: LoopState::Running,
            to: LoopState::AwaitingConfig,
        });
        rec.on_present(&PresentEvent {
            frame_index: 7,
            presented_at: HostTime(1_000_500),
            rect_count: 2,
            full: false,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], RecordedEvent::FrameTick(_)));
        match &events[2] {
            RecordedEvent::Exhausted(e) => {
                assert_eq!(e.entity, EntityId::from_raw(3, 2));
                assert_eq!(e.policy, ExhaustionPolicy::Remove);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        match &events[4] {
            RecordedEvent::StateChange(e) => assert_eq!(e.to, LoopState::AwaitingConfig),
            other => panic!("expected StateChange, got {other:?}"),
        }
        match &events[5] {
            RecordedEvent::Present(e) => {
                assert_eq!(e.rect_count, 2);
                assert!(!e.full, "partial present");
            }
            other => panic!("expected Present, got {other:?}"),
        }
    }

    #[test]
    fn dirty_rects_are_stored_in_full() {
        let rects = [
            DamageRect {
                x: -4,
                y: 0,
                width: 10,
                height: 12,
            },
            DamageRect {
                x: 100,
                y: 50,
                width: 1,
                height: 1,
            },
        ];
        let mut rec = RecorderSink::new();
        rec.on_dirty_rects(9, &rects);
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [RecordedEvent::DirtyRects {
                frame_index: 9,
                rects: rects.to_vec()
            }]
        );
    }

    #[test]
    fn truncated_record_ends_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_frame_tick(&sample_tick());
        rec.on_frame_tick(&sample_tick());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
