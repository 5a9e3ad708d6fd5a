// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Physics-driven trajectory: velocity, acceleration, gravity, turn rate.

use core::f64::consts::PI;

use kurbo::{Point, Vec2};

use super::restriction::{Boundary, Restriction};
use super::{Advance, Motion, Track, along, heading_between, normalize_angle};

/// Turn rate used by [`Kinematic::turn_left`] and [`Kinematic::turn_right`],
/// in radians per second.
pub const DEFAULT_TURN_RATE: f64 = 1.0;

/// Dead zone for [`Kinematic::turn_towards`], in radians.
const TURN_TOWARDS_THRESHOLD: f64 = 0.1;

/// Values restored by [`Motion::reset`].
#[derive(Clone, Copy, Debug, PartialEq)]
struct Initial {
    velocity: Vec2,
    acceleration: Vec2,
    gravity: Vec2,
    decelerating: (bool, bool),
    turn_rate: f64,
}

/// A trajectory integrated from velocity and acceleration.
///
/// Each [`advance`](Motion::advance) of `t` seconds:
///
/// 1. rotates the heading by `turn_rate · t` (keeping speed);
/// 2. computes `A = gravity + acceleration`, where decelerating axes use a
///    magnitude that opposes the current velocity sign;
/// 3. moves `x' = x + v·t + A·t²/2` using the velocity from before the step;
/// 4. updates `v' = v + A·t` and applies the [`Restriction`]'s velocity
///    limits and speed cap;
/// 5. clamps the position to the restriction's bounds and applies its
///    [`Boundary`] behavior.
///
/// Builder methods (`with_*`) define the constructed state that
/// [`reset`](Motion::reset) returns to. Setters (`set_*`) change only the
/// running state.
#[derive(Clone, Debug)]
pub struct Kinematic {
    track: Track,
    velocity: Vec2,
    acceleration: Vec2,
    gravity: Vec2,
    decelerating: (bool, bool),
    turn_rate: f64,
    reversing: bool,
    restriction: Restriction,
    initial: Initial,
}

impl Kinematic {
    /// A trajectory at rest at `start` with default restrictions.
    #[must_use]
    pub fn new(start: Point) -> Self {
        let initial = Initial {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            gravity: Vec2::ZERO,
            decelerating: (false, false),
            turn_rate: 0.0,
        };
        Self {
            track: Track::new(start),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            gravity: Vec2::ZERO,
            decelerating: (false, false),
            turn_rate: 0.0,
            reversing: false,
            restriction: Restriction::default(),
            initial,
        }
    }

    /// Sets the constructed velocity (restricted).
    #[must_use]
    pub fn with_velocity(mut self, v: Vec2) -> Self {
        self.set_velocity(v);
        self.initial.velocity = self.velocity;
        self.sync_origin_heading();
        self
    }

    /// Sets the constructed acceleration.
    #[must_use]
    pub fn with_acceleration(mut self, a: Vec2) -> Self {
        self.set_acceleration(a);
        self.initial.acceleration = self.acceleration;
        self.initial.decelerating = self.decelerating;
        self
    }

    /// Sets the constructed gravity.
    #[must_use]
    pub fn with_gravity(mut self, g: Vec2) -> Self {
        self.gravity = g;
        self.initial.gravity = g;
        self
    }

    /// Sets the constructed turn rate in radians per second.
    #[must_use]
    pub fn with_turn_rate(mut self, rate: f64) -> Self {
        self.turn_rate = rate;
        self.initial.turn_rate = rate;
        self
    }

    /// Sets the restriction and re-restricts the current velocity and
    /// position. The restricted state is what [`reset`](Motion::reset)
    /// returns to.
    #[must_use]
    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.set_restriction(restriction);
        self.initial.velocity = self.velocity;
        self.sync_origin_heading();
        self
    }

    /// Makes the current position and velocity the state that
    /// [`reset`](Motion::reset) returns to.
    pub fn set_start(&mut self, start: Point) {
        self.track.move_to(start);
        self.initial.velocity = self.velocity;
        self.track.set_origin(start, self.direction());
    }

    fn sync_origin_heading(&mut self) {
        let origin = self.track.position();
        self.track.set_origin(origin, self.direction());
        self.track.set_heading(self.direction());
    }

    // -- Restriction --

    /// Returns the restriction.
    #[must_use]
    pub const fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    /// Replaces the restriction and re-restricts velocity and position.
    pub fn set_restriction(&mut self, restriction: Restriction) {
        self.restriction = restriction;
        self.velocity = self.restriction.restrict_velocity(self.velocity);
        let (p, _) = self.restriction.restrict_position(self.track.position());
        if p != self.track.position() {
            self.track.move_to(p);
        }
    }

    // -- Velocity and heading --

    /// Current velocity in pixels per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Sets the velocity, applying component limits and the speed cap.
    pub fn set_velocity(&mut self, v: Vec2) {
        self.velocity = self.restriction.restrict_velocity(v);
        self.reversing = false;
    }

    /// Signed speed: negative while reversing (see [`set_speed`](Self::set_speed)).
    #[must_use]
    pub fn speed(&self) -> f64 {
        let s = self.velocity.hypot();
        if self.reversing { -s } else { s }
    }

    /// Sets the speed while keeping the heading.
    ///
    /// A negative speed moves backwards: the velocity points opposite the
    /// heading and [`direction`](Motion::direction) keeps reporting the
    /// forward heading.
    pub fn set_speed(&mut self, speed: f64) {
        let heading = self.direction();
        let reversing = speed < 0.0;
        let travel = if reversing { heading + PI } else { heading };
        self.velocity = self
            .restriction
            .restrict_velocity(along(travel, speed.abs()));
        self.reversing = reversing;
        self.track.set_heading(heading);
    }

    /// Points the velocity along `heading`, keeping the speed.
    pub fn set_direction(&mut self, heading: f64) {
        let speed = self.velocity.hypot();
        let travel = if self.reversing { heading + PI } else { heading };
        self.velocity = self.restriction.restrict_velocity(along(travel, speed));
        self.track.set_heading(normalize_angle(heading));
    }

    /// Rotates the heading by `radians` (counter-clockwise when positive).
    pub fn turn(&mut self, radians: f64) {
        self.set_direction(self.direction() + radians);
    }

    /// Current turn rate in radians per second.
    #[must_use]
    pub const fn turn_rate(&self) -> f64 {
        self.turn_rate
    }

    /// Sets the turn rate in radians per second.
    pub fn set_turn_rate(&mut self, rate: f64) {
        self.turn_rate = rate;
    }

    /// Turns counter-clockwise at [`DEFAULT_TURN_RATE`].
    pub fn turn_left(&mut self) {
        self.turn_rate = DEFAULT_TURN_RATE;
    }

    /// Turns clockwise at [`DEFAULT_TURN_RATE`].
    pub fn turn_right(&mut self) {
        self.turn_rate = -DEFAULT_TURN_RATE;
    }

    /// Stops turning.
    pub fn go_straight(&mut self) {
        self.turn_rate = 0.0;
    }

    /// Starts turning towards `target`, or goes straight when already within
    /// 0.1 rad of it.
    pub fn turn_towards(&mut self, target: Point) {
        let Some(to) = heading_between(self.track.position(), target) else {
            self.go_straight();
            return;
        };
        let mut diff = normalize_angle(to - self.direction());
        if diff > PI {
            diff -= 2.0 * PI;
        }
        if diff > TURN_TOWARDS_THRESHOLD {
            self.turn_left();
        } else if diff < -TURN_TOWARDS_THRESHOLD {
            self.turn_right();
        } else {
            self.go_straight();
        }
    }

    /// Distance from the current position to `p`.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> f64 {
        self.track.position().distance(p)
    }

    /// Heading from the current position to `p` (the current heading if
    /// `p` is the current position).
    #[must_use]
    pub fn direction_to(&self, p: Point) -> f64 {
        heading_between(self.track.position(), p).unwrap_or_else(|| self.direction())
    }

    /// Reverses horizontal velocity.
    pub fn bounce_x(&mut self) {
        self.velocity.x = -self.velocity.x;
    }

    /// Reverses vertical velocity.
    pub fn bounce_y(&mut self) {
        self.velocity.y = -self.velocity.y;
    }

    // -- Acceleration --

    /// Current acceleration (magnitudes on decelerating axes).
    #[must_use]
    pub const fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Sets a fixed acceleration, leaving deceleration mode.
    pub fn set_acceleration(&mut self, a: Vec2) {
        self.acceleration = a;
        self.decelerating = (false, false);
    }

    /// Accelerates by `magnitude` along the current heading.
    pub fn accelerate(&mut self, magnitude: f64) {
        self.set_acceleration(along(self.direction(), magnitude));
    }

    /// Decelerates with the given per-axis magnitudes.
    ///
    /// The sign is recomputed every step to oppose the velocity on that
    /// axis, and a decelerating axis stops at zero rather than reversing.
    pub fn set_deceleration(&mut self, d: Vec2) {
        self.acceleration = Vec2::new(d.x.abs(), d.y.abs());
        self.decelerating = (true, true);
    }

    /// Decelerates by `magnitude` split along the current heading.
    pub fn decelerate(&mut self, magnitude: f64) {
        let d = along(self.direction(), magnitude);
        self.set_deceleration(d);
    }

    /// Whether each axis is in deceleration mode.
    #[must_use]
    pub const fn is_decelerating(&self) -> (bool, bool) {
        self.decelerating
    }

    /// Current gravity.
    #[must_use]
    pub const fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Sets a constant bias added to the acceleration each step.
    pub fn set_gravity(&mut self, g: Vec2) {
        self.gravity = g;
    }

    fn total_acceleration(&self) -> Vec2 {
        let axis = |mag: f64, v: f64, decel: bool| {
            if !decel {
                mag
            } else if v > 0.0 {
                -mag
            } else if v < 0.0 {
                mag
            } else {
                0.0
            }
        };
        self.gravity
            + Vec2::new(
                axis(self.acceleration.x, self.velocity.x, self.decelerating.0),
                axis(self.acceleration.y, self.velocity.y, self.decelerating.1),
            )
    }
}

/// Zeroes `v` if deceleration pushed it through zero.
fn stop_at_zero(before: f64, after: f64, decel: bool) -> f64 {
    let crossed = (before > 0.0 && after < 0.0) || (before < 0.0 && after > 0.0);
    if decel && crossed {
        0.0
    } else {
        after
    }
}

impl Motion for Kinematic {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, t: f64) -> Advance {
        if self.turn_rate != 0.0 {
            self.turn(self.turn_rate * t);
        }

        let a = self.total_acceleration();
        let v0 = self.velocity;
        let raw = v0 + a * t;
        let v1 = Vec2::new(
            stop_at_zero(v0.x, raw.x, self.decelerating.0),
            stop_at_zero(v0.y, raw.y, self.decelerating.1),
        );
        let mut v1 = self.restriction.restrict_velocity(v1);

        let target = self.track.position() + v0 * t + a * (t * t / 2.0);
        let (clamped, hits) = self.restriction.restrict_position(target);

        match self.restriction.boundary() {
            Boundary::Clamp => {}
            Boundary::Bounce => {
                if hits.x {
                    v1.x = -v1.x;
                }
                if hits.y {
                    v1.y = -v1.y;
                }
            }
            Boundary::End if hits.any() => {
                self.velocity = v1;
                self.track.move_to(clamped);
                return Advance::Exhausted;
            }
            Boundary::End => {}
        }

        self.velocity = v1;
        let heading = self.direction();
        self.track.move_to(clamped);
        // Velocity defines the heading, not the clamped displacement.
        self.track.set_heading(heading);
        Advance::Position(clamped)
    }

    fn rewind(&mut self) {
        self.velocity = self.initial.velocity;
        self.acceleration = self.initial.acceleration;
        self.gravity = self.initial.gravity;
        self.decelerating = self.initial.decelerating;
        self.turn_rate = self.initial.turn_rate;
        self.reversing = false;
    }

    /// Heading of the velocity, or the last stored heading at rest.
    fn direction(&self) -> f64 {
        if self.velocity.x == 0.0 && self.velocity.y == 0.0 {
            return self.track.heading();
        }
        let travel = libm::atan2(-self.velocity.y, self.velocity.x);
        if self.reversing {
            normalize_angle(travel + PI)
        } else {
            normalize_angle(travel)
        }
    }
}
