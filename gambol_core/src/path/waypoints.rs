// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Precomputed waypoint playback and the waypoint text format.

use alloc::string::ToString;
use alloc::vec::Vec;

use kurbo::Point;

use super::{Advance, LoopCount, Motion, Track};
use crate::error::{ConfigError, LoadError, LoadErrorKind};

/// Plays back an ordered list of positions.
///
/// Without a duration, each [`advance`](Motion::advance) consumes exactly one
/// waypoint regardless of `dt`. With a duration, each waypoint is held for
/// `1000 · duration / len` milliseconds of accumulated frame time, and a long
/// frame may skip several waypoints at once.
///
/// Running off the end consumes one loop. When the last loop is consumed the
/// position returns to the first waypoint and the path is exhausted.
#[derive(Clone, Debug)]
pub struct Waypoints {
    track: Track,
    places: Vec<Point>,
    /// Index of the current waypoint; `-1` before the first advance.
    cursor: isize,
    ms_per_place: Option<f64>,
    pending_ms: f64,
    loops: LoopCount,
    initial_loops: LoopCount,
}

impl Waypoints {
    /// Creates a waypoint path that plays once.
    ///
    /// `duration` is the playback time of one loop in seconds; `None` plays
    /// one waypoint per tick.
    pub fn new(places: Vec<Point>, duration: Option<f64>) -> Result<Self, ConfigError> {
        let Some(&first) = places.first() else {
            return Err(ConfigError::EmptyWaypoints);
        };
        let ms_per_place = match duration {
            None => None,
            Some(d) if d.is_finite() && d > 0.0 => Some(1000.0 * d / places.len() as f64),
            Some(duration) => return Err(ConfigError::InvalidDuration { duration }),
        };
        Ok(Self {
            track: Track::new(first),
            places,
            cursor: -1,
            ms_per_place,
            pending_ms: 0.0,
            loops: LoopCount::default(),
            initial_loops: LoopCount::default(),
        })
    }

    /// Sets how many times the list plays.
    pub fn with_loops(mut self, loops: LoopCount) -> Result<Self, ConfigError> {
        let loops = loops.validate()?;
        self.loops = loops;
        self.initial_loops = loops;
        Ok(self)
    }

    /// The waypoints.
    #[must_use]
    pub fn places(&self) -> &[Point] {
        &self.places
    }

    /// Loops remaining, including the current one.
    #[must_use]
    pub const fn loops_remaining(&self) -> LoopCount {
        self.loops
    }

    /// Index of the current waypoint, or `None` before the first advance.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.cursor).ok()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "skip counts are bounded by frame time divided by per-waypoint time"
    )]
    fn skip_count(&mut self, dt: f64, per: f64) -> isize {
        self.pending_ms += dt * 1000.0;
        let steps = libm::floor(self.pending_ms / per);
        self.pending_ms -= steps * per;
        steps as isize
    }
}

impl Motion for Waypoints {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, dt: f64) -> Advance {
        match self.ms_per_place {
            None => self.cursor += 1,
            Some(per) => {
                let skip = self.skip_count(dt, per);
                self.cursor = self.cursor.max(0) + skip;
            }
        }

        let len = self.places.len() as isize;
        while self.cursor >= len {
            if !self.loops.consume() {
                self.cursor = 0;
                self.track.move_to(self.places[0]);
                return Advance::Exhausted;
            }
            self.cursor -= len;
        }

        let p = self.places[self.cursor.unsigned_abs()];
        self.track.move_to(p);
        Advance::Position(p)
    }

    fn rewind(&mut self) {
        self.cursor = -1;
        self.pending_ms = 0.0;
        self.loops = self.initial_loops;
    }
}

/// Parses the waypoint text format: one `(x, y)` integer pair per line.
///
/// Blank lines are ignored. The first malformed line fails the whole parse,
/// reported against `name`.
pub fn parse_waypoints(text: &str, name: &str) -> Result<Vec<Point>, LoadError> {
    let mut out = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || LoadError::new(name.to_string(), LoadErrorKind::Malformed { line: i + 1 });
        let inner = line
            .strip_prefix('(')
            .and_then(|l| l.strip_suffix(')'))
            .ok_or_else(malformed)?;
        let (x, y) = inner.split_once(',').ok_or_else(malformed)?;
        let x: i64 = x.trim().parse().map_err(|_| malformed())?;
        let y: i64 = y.trim().parse().map_err(|_| malformed())?;
        out.push(Point::new(x as f64, y as f64));
    }
    Ok(out)
}

/// Reads and parses a waypoint file.
#[cfg(feature = "std")]
pub fn load_waypoints(path: &std::path::Path) -> Result<Vec<Point>, LoadError> {
    let name = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            LoadErrorKind::Missing
        } else {
            LoadErrorKind::Unreadable
        };
        log::debug!("waypoint file {name}: {e}");
        LoadError::new(name.clone(), kind)
    })?;
    parse_waypoints(&text, &name)
}
