// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Phases become duration slices; everything else is an instant event.
/// Events without a timestamp of their own use the most recent frame tick.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameTick(e) => {
                last_ts = e.now.as_micros_f64();
                events.push(json!({
                    "ph": "i",
                    "name": "FrameTick",
                    "cat": "Loop",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "dt_ms": e.dt.as_millis_f64(),
                        "raw_dt_ms": e.raw_dt.as_millis_f64(),
                        "state": format!("{:?}", e.state),
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last_ts = e.timestamp.as_micros_f64();
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                last_ts = e.timestamp.as_micros_f64();
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::Present(e) => {
                last_ts = e.presented_at.as_micros_f64();
                events.push(json!({
                    "ph": "i",
                    "name": "Present",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "rects": e.rect_count,
                        "full": e.full,
                    }
                }));
            }
            RecordedEvent::StateChange(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "StateChange",
                    "cat": "Loop",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "from": format!("{:?}", e.from),
                        "to": format!("{:?}", e.to),
                    }
                }));
            }
            RecordedEvent::Exhausted(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Exhausted",
                    "cat": "Scene",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "entity": e.entity.index(),
                        "generation": e.entity.generation(),
                        "policy": format!("{:?}", e.policy),
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                let us = |ns: u64| ns as f64 / 1000.0;
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": s.now.as_micros_f64(),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "dt_ms": s.dt.as_millis_f64(),
                        "clear_us": us(s.clear_ns),
                        "events_us": us(s.events_ns),
                        "move_us": us(s.move_ns),
                        "collide_us": us(s.collide_ns),
                        "draw_us": us(s.draw_ns),
                        "present_us": us(s.present_ns),
                        "dirty_rects": s.dirty_rects,
                        "exhausted": s.exhausted,
                    }
                }));
            }
            RecordedEvent::DirtyRects { frame_index, rects } => {
                let rects: Vec<Value> = rects
                    .iter()
                    .map(|r| json!([r.x, r.y, r.width, r.height]))
                    .collect();
                events.push(json!({
                    "ph": "i",
                    "name": "DirtyRects",
                    "cat": "Rich",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": frame_index,
                        "rects": rects,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
