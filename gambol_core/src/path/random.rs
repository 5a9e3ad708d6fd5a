// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seeded random trajectories.
//!
//! All three variants draw from a [`SmallRng`] seeded at construction, so a
//! run is reproducible from its seed and [`reset`](Motion::reset) replays the
//! same sequence.

use core::f64::consts::TAU;

use kurbo::{Point, Rect, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::restriction::Restriction;
use super::{Advance, Motion, Track, along};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// RandomWalk
// ---------------------------------------------------------------------------

/// Brownian motion: each step moves by an independent whole-pixel amount in
/// `(-max_jump, max_jump)` on each axis.
#[derive(Clone, Debug)]
pub struct RandomWalk {
    track: Track,
    max_jump: i32,
    step_limit: Option<u32>,
    steps_taken: u32,
    seed: u64,
    rng: SmallRng,
}

impl RandomWalk {
    /// Creates a walk from `start`.
    ///
    /// `max_jump` must be at least 1; a jump of 1 never moves.
    pub fn new(start: Point, max_jump: i32, seed: u64) -> Result<Self, ConfigError> {
        if max_jump < 1 {
            return Err(ConfigError::InvalidJump);
        }
        Ok(Self {
            track: Track::new(start),
            max_jump,
            step_limit: None,
            steps_taken: 0,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Exhausts after `steps` moves.
    pub fn with_step_limit(mut self, steps: u32) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        self.step_limit = Some(steps);
        Ok(self)
    }

    /// Largest possible jump, exclusive.
    #[must_use]
    pub const fn max_jump(&self) -> i32 {
        self.max_jump
    }
}

impl Motion for RandomWalk {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, _dt: f64) -> Advance {
        if self.step_limit.is_some_and(|limit| self.steps_taken >= limit) {
            return Advance::Exhausted;
        }
        self.steps_taken += 1;
        let reach = self.max_jump - 1;
        let dx = self.rng.gen_range(-reach..=reach);
        let dy = self.rng.gen_range(-reach..=reach);
        let p = self.track.position() + Vec2::new(f64::from(dx), f64::from(dy));
        self.track.move_to(p);
        Advance::Position(p)
    }

    fn rewind(&mut self) {
        self.steps_taken = 0;
        self.rng = SmallRng::seed_from_u64(self.seed);
    }
}

// ---------------------------------------------------------------------------
// RandomDrift
// ---------------------------------------------------------------------------

/// Smooth wandering: each step applies a random acceleration of up to
/// `max_accel` px/s² in a random direction, then keeps the speed within
/// `[min_speed, max_speed]`.
///
/// Position bounds from the [`Restriction`] bounce the drift back inside.
#[derive(Clone, Debug)]
pub struct RandomDrift {
    track: Track,
    velocity: Vec2,
    initial_velocity: Vec2,
    min_speed: f64,
    max_speed: f64,
    max_accel: f64,
    restriction: Restriction,
    seed: u64,
    rng: SmallRng,
}

impl RandomDrift {
    /// Creates a drift from `start` with an initial random heading at
    /// `min_speed`.
    pub fn new(
        start: Point,
        min_speed: f64,
        max_speed: f64,
        max_accel: f64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if min_speed.is_nan() || max_speed.is_nan() || min_speed < 0.0 || min_speed > max_speed {
            return Err(ConfigError::InvalidSpeedRange {
                min: min_speed,
                max: max_speed,
            });
        }
        let mut rng = SmallRng::seed_from_u64(seed);
        let velocity = along(rng.gen_range(0.0..TAU), min_speed);
        Ok(Self {
            track: Track::new(start),
            velocity,
            initial_velocity: velocity,
            min_speed,
            max_speed,
            max_accel: max_accel.abs(),
            restriction: Restriction::default(),
            seed,
            rng,
        })
    }

    /// Keeps the drift inside `bounds`, reflecting off the edges.
    #[must_use]
    pub fn within(mut self, bounds: Rect) -> Self {
        self.restriction = Restriction::onscreen(bounds);
        self
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn bound_speed(&self, v: Vec2) -> Vec2 {
        let speed = v.hypot();
        if speed == 0.0 {
            return v;
        }
        let target = speed.clamp(self.min_speed, self.max_speed);
        v * (target / speed)
    }
}

impl Motion for RandomDrift {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, dt: f64) -> Advance {
        let magnitude = if self.max_accel > 0.0 {
            self.rng.gen_range(0.0..self.max_accel)
        } else {
            0.0
        };
        let accel = along(self.rng.gen_range(0.0..TAU), magnitude);
        self.velocity = self.bound_speed(self.velocity + accel * dt);

        let target = self.track.position() + self.velocity * dt;
        let (p, hits) = self.restriction.restrict_position(target);
        if hits.x {
            self.velocity.x = -self.velocity.x;
        }
        if hits.y {
            self.velocity.y = -self.velocity.y;
        }
        self.track.move_to(p);
        Advance::Position(p)
    }

    fn rewind(&mut self) {
        self.velocity = self.initial_velocity;
        self.rng = SmallRng::seed_from_u64(self.seed);
        // Skip the draw that chose the initial heading.
        let _: f64 = self.rng.gen_range(0.0..TAU);
    }
}

// ---------------------------------------------------------------------------
// RandomJump
// ---------------------------------------------------------------------------

/// Teleports to a random whole-pixel point inside `bounds`, holding each
/// point for `stay` seconds (or moving every step when `stay` is zero).
#[derive(Clone, Debug)]
pub struct RandomJump {
    track: Track,
    bounds: Rect,
    stay: f64,
    held: f64,
    seed: u64,
    rng: SmallRng,
}

impl RandomJump {
    /// Creates a jumper starting at `start`.
    pub fn new(start: Point, bounds: Rect, stay: f64, seed: u64) -> Result<Self, ConfigError> {
        if !stay.is_finite() || stay < 0.0 {
            return Err(ConfigError::InvalidDuration { duration: stay });
        }
        Ok(Self {
            track: Track::new(start),
            bounds: bounds.abs(),
            stay,
            held: 0.0,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    fn pick(&mut self) -> Point {
        let b = self.bounds;
        let coord = |rng: &mut SmallRng, lo: f64, hi: f64| {
            let (lo, hi) = (libm::ceil(lo), libm::floor(hi));
            if hi > lo { libm::floor(rng.gen_range(lo..hi + 1.0)) } else { lo }
        };
        let x = coord(&mut self.rng, b.x0, b.x1);
        let y = coord(&mut self.rng, b.y0, b.y1);
        Point::new(x, y)
    }
}

impl Motion for RandomJump {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, dt: f64) -> Advance {
        self.held += dt;
        if self.held >= self.stay {
            self.held = 0.0;
            let p = self.pick();
            self.track.move_to(p);
        }
        Advance::Position(self.track.position())
    }

    fn rewind(&mut self) {
        self.held = 0.0;
        self.rng = SmallRng::seed_from_u64(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn walk_jumps_are_bounded() {
        let start = Point::new(50.0, 50.0);
        let mut walk = RandomWalk::new(start, 3, 7).unwrap();
        let mut last = start;
        for _ in 0..500 {
            let p = walk.advance(0.016).position().unwrap();
            assert!((p.x - last.x).abs() <= 2.0, "x jump too big");
            assert!((p.y - last.y).abs() <= 2.0, "y jump too big");
            last = p;
        }
    }

    #[test]
    fn walk_step_limit_exhausts() {
        let mut walk = RandomWalk::new(Point::ZERO, 5, 1)
            .unwrap()
            .with_step_limit(3)
            .unwrap();
        for _ in 0..3 {
            assert!(!walk.advance(0.0).is_exhausted(), "within budget");
        }
        assert!(walk.advance(0.0).is_exhausted(), "budget spent");
    }

    #[test]
    fn walk_reset_replays_sequence() {
        let mut walk = RandomWalk::new(Point::ZERO, 10, 99).unwrap();
        let first: Vec<Point> = (0..20).filter_map(|_| walk.advance(0.0).position()).collect();
        walk.reset();
        let second: Vec<Point> = (0..20).filter_map(|_| walk.advance(0.0).position()).collect();
        assert_eq!(first, second, "same seed, same walk");
    }

    #[test]
    fn walk_rejects_zero_jump() {
        assert_eq!(
            RandomWalk::new(Point::ZERO, 0, 0).unwrap_err(),
            ConfigError::InvalidJump
        );
    }

    #[test]
    fn drift_speed_stays_in_range() {
        let bounds = Rect::new(0.0, 0.0, 200.0, 200.0);
        let mut drift = RandomDrift::new(Point::new(100.0, 100.0), 20.0, 80.0, 500.0, 3)
            .unwrap()
            .within(bounds);
        for _ in 0..600 {
            let p = drift.advance(1.0 / 60.0).position().unwrap();
            let s = drift.velocity().hypot();
            assert!((20.0 - 1e-9..=80.0 + 1e-9).contains(&s), "speed {s}");
            assert!(
                (0.0..=200.0).contains(&p.x) && (0.0..=200.0).contains(&p.y),
                "escaped to {p:?}"
            );
        }
    }

    #[test]
    fn drift_rejects_inverted_range() {
        assert!(matches!(
            RandomDrift::new(Point::ZERO, 10.0, 5.0, 1.0, 0),
            Err(ConfigError::InvalidSpeedRange { .. })
        ));
    }

    #[test]
    fn jump_holds_then_moves_inside_bounds() {
        let bounds = Rect::new(10.0, 10.0, 20.0, 20.0);
        let mut jump = RandomJump::new(Point::ZERO, bounds, 0.5, 11).unwrap();
        assert_eq!(jump.advance(0.25).position(), Some(Point::ZERO), "still holding");
        let p = jump.advance(0.25).position().unwrap();
        assert!(
            (10.0..=20.0).contains(&p.x) && (10.0..=20.0).contains(&p.y),
            "jumped to {p:?}"
        );
        assert_eq!(p.x, libm::floor(p.x), "whole pixels");
    }
}
