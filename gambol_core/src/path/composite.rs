// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A sequence of sub-paths played one after another.

use alloc::vec::Vec;

use kurbo::Point;

use super::{Advance, LoopCount, Motion, Track, Trajectory};
use crate::error::ConfigError;

#[derive(Clone, Debug)]
struct Leg {
    path: Trajectory,
    repeats: u32,
}

/// Plays each sub-path until it exhausts, `repeats` times, then moves on to
/// the next. After the last sub-path one overall loop is consumed; the
/// composite exhausts when no loops remain.
///
/// A sub-path is reset before each replay.
#[derive(Clone, Debug)]
pub struct Composite {
    track: Track,
    legs: Vec<Leg>,
    current: usize,
    repeat: u32,
    loops: LoopCount,
    initial_loops: LoopCount,
}

impl Composite {
    /// Builds a composite from `(path, repeats)` pairs.
    pub fn new(
        legs: impl IntoIterator<Item = (Trajectory, u32)>,
        loops: LoopCount,
    ) -> Result<Self, ConfigError> {
        let legs: Vec<Leg> = legs
            .into_iter()
            .map(|(path, repeats)| Leg { path, repeats })
            .collect();
        if let Some(index) = legs.iter().position(|l| l.repeats == 0) {
            return Err(ConfigError::ZeroRepeat { index });
        }
        let Some(first) = legs.first() else {
            return Err(ConfigError::EmptyComposite);
        };
        let loops = loops.validate()?;
        Ok(Self {
            track: Track::new(first.path.position()),
            legs,
            current: 0,
            repeat: 0,
            loops,
            initial_loops: loops,
        })
    }

    /// Index of the sub-path currently playing.
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// How many times the current sub-path has completed this round.
    #[must_use]
    pub const fn repeat(&self) -> u32 {
        self.repeat
    }

    /// Moves on after the current leg exhausts. Returns `false` when the
    /// whole composite is done.
    fn finish_leg(&mut self) -> bool {
        self.legs[self.current].path.reset();
        self.repeat += 1;
        if self.repeat < self.legs[self.current].repeats {
            return true;
        }
        self.repeat = 0;
        self.current += 1;
        if self.current < self.legs.len() {
            return true;
        }
        self.current = 0;
        self.loops.consume()
    }

    /// Upper bound on leg completions in one step before concluding that
    /// every leg exhausts immediately.
    fn exhaust_budget(&self) -> usize {
        self.legs.iter().map(|l| l.repeats as usize).sum::<usize>() + 1
    }
}

impl Motion for Composite {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, dt: f64) -> Advance {
        let mut budget = self.exhaust_budget();
        loop {
            match self.legs[self.current].path.advance(dt) {
                Advance::Position(p) => {
                    self.track.move_to(p);
                    return Advance::Position(p);
                }
                Advance::Exhausted => {
                    if !self.finish_leg() || budget == 0 {
                        return Advance::Exhausted;
                    }
                    budget -= 1;
                }
            }
        }
    }

    fn rewind(&mut self) {
        for leg in &mut self.legs {
            leg.path.reset();
        }
        self.current = 0;
        self.repeat = 0;
        self.loops = self.initial_loops;
    }

    fn set_position(&mut self, p: Point) {
        self.track.move_to(p);
        self.legs[self.current].path.set_position(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Waypoints, shapes};
    use alloc::vec;

    fn dots(xs: &[f64]) -> Trajectory {
        Waypoints::new(xs.iter().map(|&x| Point::new(x, 0.0)).collect(), None)
            .unwrap()
            .into()
    }

    fn xs(path: &mut Composite, n: usize) -> Vec<Option<f64>> {
        (0..n).map(|_| path.advance(0.0).position().map(|p| p.x)).collect()
    }

    #[test]
    fn legs_repeat_then_advance() {
        let mut c = Composite::new(
            [(dots(&[1.0, 2.0]), 2), (dots(&[9.0]), 1)],
            LoopCount::Finite(1),
        )
        .unwrap();
        assert_eq!(
            xs(&mut c, 6),
            vec![Some(1.0), Some(2.0), Some(1.0), Some(2.0), Some(9.0), None]
        );
        assert!(c.is_exhausted(), "latched");
    }

    #[test]
    fn overall_loops_wrap() {
        let mut c = Composite::new([(dots(&[1.0]), 1), (dots(&[2.0]), 1)], LoopCount::Finite(2))
            .unwrap();
        assert_eq!(
            xs(&mut c, 5),
            vec![Some(1.0), Some(2.0), Some(1.0), Some(2.0), None]
        );
    }

    #[test]
    fn forever_keeps_going() {
        let line = shapes::line(Point::ZERO, Point::new(3.0, 0.0), 3, None).unwrap();
        let mut c = Composite::new([(line.into(), 1)], LoopCount::Forever).unwrap();
        for _ in 0..100 {
            assert!(!c.advance(0.0).is_exhausted(), "never exhausts");
        }
    }

    #[test]
    fn reset_restarts_first_leg() {
        let mut c = Composite::new([(dots(&[1.0]), 1), (dots(&[2.0]), 1)], LoopCount::Finite(1))
            .unwrap();
        let _ = xs(&mut c, 2);
        c.reset();
        assert_eq!(c.current(), 0);
        assert_eq!(xs(&mut c, 3), vec![Some(1.0), Some(2.0), None]);
    }

    #[test]
    fn construction_rejects_bad_legs() {
        assert_eq!(
            Composite::new(Vec::new(), LoopCount::Forever).unwrap_err(),
            ConfigError::EmptyComposite
        );
        assert_eq!(
            Composite::new([(dots(&[1.0]), 1), (dots(&[2.0]), 0)], LoopCount::Forever)
                .unwrap_err(),
            ConfigError::ZeroRepeat { index: 1 }
        );
    }

    #[test]
    fn degenerate_legs_do_not_spin() {
        let mut dead = dots(&[5.0]);
        dead.set_expiry(Some(1e-9)).unwrap();
        let mut c = Composite::new([(dead, 1)], LoopCount::Forever).unwrap();
        assert!(c.advance(1.0).is_exhausted(), "gives up instead of looping");
    }
}
