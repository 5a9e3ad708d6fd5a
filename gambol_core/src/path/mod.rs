// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trajectories: stateful generators of successive positions.
//!
//! Every trajectory implements [`Motion`]. Callers drive it with
//! [`Motion::advance`], passing the elapsed frame time in seconds, and get
//! back either the next position or [`Advance::Exhausted`]:
//!
//! ```text
//!   advance(dt) ──► expired? ──yes──► Exhausted (terminal until reset)
//!                      │
//!                      no
//!                      ▼
//!                 step(dt) ──► Position(p) | Exhausted
//! ```
//!
//! Exhaustion is terminal: every later call returns `Exhausted` until
//! [`Motion::reset`] restores the constructed state.
//!
//! [`Trajectory`] is the tagged union entities own. Each variant is also a
//! standalone type:
//!
//! - [`Kinematic`]: velocity, acceleration, gravity, turn rate, bounded by a
//!   [`Restriction`].
//! - [`Waypoints`]: precomputed positions played back per tick or over a
//!   duration, with the [`shapes`] builders for lines, squares, and circles.
//! - [`RandomWalk`], [`RandomDrift`], [`RandomJump`]: seeded random motion.
//! - [`Composite`]: a sequence of sub-paths with repeat counts.
//! - [`Offset`]: another trajectory (or an external anchor) plus a constant
//!   offset, for formations.
//! - [`Turtle`]: heading-based movement driven by `forward` and `turn`.
//!
//! # Angles
//!
//! Headings are radians with 0 pointing right (+x) and positive angles
//! turning counter-clockwise on screen. Because screen y grows downward, a
//! heading `d` at speed `s` is the velocity `(s·cos d, −s·sin d)`.

mod composite;
mod kinematic;
mod offset;
mod random;
mod restriction;
pub mod shapes;
mod turtle;
mod waypoints;

use core::f64::consts::TAU;

use kurbo::{Point, Vec2};

use crate::error::ConfigError;

pub use composite::Composite;
pub use kinematic::{DEFAULT_TURN_RATE, Kinematic};
pub use offset::{Offset, OffsetSource};
pub use random::{RandomDrift, RandomJump, RandomWalk};
pub use restriction::{Boundary, Hits, Range, Restriction};
pub use turtle::Turtle;
#[cfg(feature = "std")]
pub use waypoints::load_waypoints;
pub use waypoints::{Waypoints, parse_waypoints};

// ---------------------------------------------------------------------------
// Advance
// ---------------------------------------------------------------------------

/// Result of advancing a trajectory by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    /// The trajectory moved (or stayed) at this position.
    Position(Point),
    /// The trajectory has completed its course.
    Exhausted,
}

impl Advance {
    /// Returns the position, or `None` if exhausted.
    #[inline]
    #[must_use]
    pub const fn position(self) -> Option<Point> {
        match self {
            Self::Position(p) => Some(p),
            Self::Exhausted => None,
        }
    }

    /// Returns `true` for [`Advance::Exhausted`].
    #[inline]
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

// ---------------------------------------------------------------------------
// LoopCount
// ---------------------------------------------------------------------------

/// How many times a looping trajectory plays through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopCount {
    /// Play this many times, then exhaust. Never zero.
    Finite(u32),
    /// Play forever.
    Forever,
}

impl Default for LoopCount {
    fn default() -> Self {
        Self::Finite(1)
    }
}

impl LoopCount {
    /// Converts the conventional signed form: `-1` is forever, `n >= 1` is
    /// finite, anything else is rejected.
    pub fn from_signed(n: i64) -> Result<Self, ConfigError> {
        match n {
            -1 => Ok(Self::Forever),
            n if n >= 1 => Ok(Self::Finite(u32::try_from(n).unwrap_or(u32::MAX))),
            _ => Err(ConfigError::ZeroLoops),
        }
    }

    pub(crate) fn validate(self) -> Result<Self, ConfigError> {
        match self {
            Self::Finite(0) => Err(ConfigError::ZeroLoops),
            other => Ok(other),
        }
    }

    /// Consumes one loop. Returns `false` once the count reaches zero.
    pub(crate) fn consume(&mut self) -> bool {
        match self {
            Self::Forever => true,
            Self::Finite(n) => {
                *n = n.saturating_sub(1);
                *n > 0
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// State shared by every trajectory: current and previous position, last
/// known heading, optional expiry, and the exhaustion flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    position: Point,
    previous: Point,
    heading: f64,
    origin: Point,
    origin_heading: f64,
    expiry: Option<Expiry>,
    exhausted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Expiry {
    after: f64,
    elapsed: f64,
}

impl Track {
    pub(crate) fn new(start: Point) -> Self {
        Self {
            position: start,
            previous: start,
            heading: 0.0,
            origin: start,
            origin_heading: 0.0,
            expiry: None,
            exhausted: false,
        }
    }

    /// Current position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Position before the most recent move.
    #[inline]
    #[must_use]
    pub const fn previous(&self) -> Point {
        self.previous
    }

    /// Heading of the last move with a nonzero delta.
    #[inline]
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Whether the trajectory is exhausted.
    #[inline]
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Seconds elapsed towards expiry, if an expiry is set.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Option<f64> {
        self.expiry.map(|e| e.elapsed)
    }

    pub(crate) fn move_to(&mut self, p: Point) {
        if let Some(h) = heading_between(self.position, p) {
            self.heading = h;
        }
        self.previous = self.position;
        self.position = p;
    }

    pub(crate) fn set_heading(&mut self, heading: f64) {
        self.heading = heading;
    }

    pub(crate) fn set_origin(&mut self, origin: Point, heading: f64) {
        self.origin = origin;
        self.origin_heading = heading;
    }

    pub(crate) fn set_expiry(&mut self, after: Option<f64>) -> Result<(), ConfigError> {
        self.expiry = match after {
            None => None,
            Some(after) if after.is_finite() && after > 0.0 => Some(Expiry {
                after,
                elapsed: 0.0,
            }),
            Some(duration) => return Err(ConfigError::InvalidDuration { duration }),
        };
        Ok(())
    }

    /// Accumulates `dt` and reports whether the expiry has passed.
    fn expire(&mut self, dt: f64) -> bool {
        match &mut self.expiry {
            Some(e) => {
                e.elapsed += dt;
                e.elapsed > e.after
            }
            None => false,
        }
    }

    fn rewind(&mut self) {
        self.position = self.origin;
        self.previous = self.origin;
        self.heading = self.origin_heading;
        if let Some(e) = &mut self.expiry {
            e.elapsed = 0.0;
        }
        self.exhausted = false;
    }
}

/// Screen heading from `from` to `to`, or `None` when they coincide.
#[must_use]
pub fn heading_between(from: Point, to: Point) -> Option<f64> {
    let d = to - from;
    if d.x == 0.0 && d.y == 0.0 {
        None
    } else {
        Some(libm::atan2(-d.y, d.x))
    }
}

/// Velocity vector for `speed` along screen heading `heading`.
#[inline]
#[must_use]
pub fn along(heading: f64, speed: f64) -> Vec2 {
    Vec2::new(speed * libm::cos(heading), -speed * libm::sin(heading))
}

/// Wraps an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(a: f64) -> f64 {
    let r = a % TAU;
    let r = if r < 0.0 { r + TAU } else { r };
    if r >= TAU { 0.0 } else { r }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// The contract every trajectory implements.
///
/// Implementors supply [`step`](Self::step) and [`rewind`](Self::rewind);
/// the provided methods handle expiry, the exhaustion latch, and reset.
pub trait Motion {
    /// Shared position state.
    fn track(&self) -> &Track;

    /// Mutable shared position state.
    fn track_mut(&mut self) -> &mut Track;

    /// Variant-specific update for one frame. Only called while not
    /// exhausted and not expired.
    fn step(&mut self, dt: f64) -> Advance;

    /// Restores variant-specific state to its constructed values. The shared
    /// [`Track`] is rewound separately.
    fn rewind(&mut self);

    /// Advances by `dt` seconds.
    fn advance(&mut self, dt: f64) -> Advance {
        if self.track().exhausted {
            return Advance::Exhausted;
        }
        if self.track_mut().expire(dt) {
            self.track_mut().exhausted = true;
            return Advance::Exhausted;
        }
        let out = self.step(dt);
        if out.is_exhausted() {
            self.track_mut().exhausted = true;
        }
        out
    }

    /// Restores the constructed initial state and clears exhaustion.
    fn reset(&mut self) {
        self.track_mut().rewind();
        self.rewind();
    }

    /// Current position.
    fn position(&self) -> Point {
        self.track().position()
    }

    /// Position before the most recent move.
    fn previous_position(&self) -> Point {
        self.track().previous()
    }

    /// Current heading in radians; the last nonzero-delta heading when the
    /// trajectory has not moved.
    fn direction(&self) -> f64 {
        self.track().heading()
    }

    /// Whether the trajectory has completed.
    fn is_exhausted(&self) -> bool {
        self.track().is_exhausted()
    }

    /// Moves the trajectory to `p` without advancing it.
    fn set_position(&mut self, p: Point) {
        self.track_mut().move_to(p);
    }

    /// Exhausts the trajectory `secs` seconds of accumulated frame time after
    /// the last reset, or never for `None`.
    fn set_expiry(&mut self, secs: Option<f64>) -> Result<(), ConfigError> {
        self.track_mut().set_expiry(secs)
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// A trajectory of any kind.
#[derive(Clone, Debug)]
pub enum Trajectory {
    /// Physics-driven motion.
    Kinematic(Kinematic),
    /// Precomputed positions.
    Waypoints(Waypoints),
    /// Bounded random displacement per step.
    RandomWalk(RandomWalk),
    /// Random acceleration with bounded speed.
    RandomDrift(RandomDrift),
    /// Random teleport inside a rectangle.
    RandomJump(RandomJump),
    /// A sequence of sub-paths.
    Composite(Composite),
    /// Another trajectory shifted by a constant offset.
    Offset(Offset),
    /// Heading-based movement.
    Turtle(Turtle),
}

macro_rules! dispatch {
    ($self:expr, $t:ident => $body:expr) => {
        match $self {
            Trajectory::Kinematic($t) => $body,
            Trajectory::Waypoints($t) => $body,
            Trajectory::RandomWalk($t) => $body,
            Trajectory::RandomDrift($t) => $body,
            Trajectory::RandomJump($t) => $body,
            Trajectory::Composite($t) => $body,
            Trajectory::Offset($t) => $body,
            Trajectory::Turtle($t) => $body,
        }
    };
}

impl Motion for Trajectory {
    fn track(&self) -> &Track {
        dispatch!(self, t => t.track())
    }

    fn track_mut(&mut self) -> &mut Track {
        dispatch!(self, t => t.track_mut())
    }

    fn step(&mut self, dt: f64) -> Advance {
        dispatch!(self, t => t.step(dt))
    }

    fn rewind(&mut self) {
        dispatch!(self, t => t.rewind());
    }

    fn direction(&self) -> f64 {
        dispatch!(self, t => t.direction())
    }

    fn set_position(&mut self, p: Point) {
        dispatch!(self, t => t.set_position(p));
    }
}

impl Trajectory {
    /// A kinematic trajectory at rest at `p`.
    #[must_use]
    pub fn at(p: Point) -> Self {
        Self::Kinematic(Kinematic::new(p))
    }

    /// Returns the kinematic state, if this is a [`Kinematic`] trajectory.
    #[must_use]
    pub fn as_kinematic_mut(&mut self) -> Option<&mut Kinematic> {
        match self {
            Self::Kinematic(k) => Some(k),
            _ => None,
        }
    }

    /// Returns the turtle state, if this is a [`Turtle`] trajectory.
    #[must_use]
    pub fn as_turtle_mut(&mut self) -> Option<&mut Turtle> {
        match self {
            Self::Turtle(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the offset state, if this is an [`Offset`] trajectory.
    #[must_use]
    pub fn as_offset_mut(&mut self) -> Option<&mut Offset> {
        match self {
            Self::Offset(o) => Some(o),
            _ => None,
        }
    }
}

macro_rules! from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Trajectory {
                fn from(t: $variant) -> Self {
                    Self::$variant(t)
                }
            }
        )*
    };
}

from_variant!(
    Kinematic,
    Waypoints,
    RandomWalk,
    RandomDrift,
    RandomJump,
    Composite,
    Offset,
    Turtle
);

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn heading_convention_is_screen_ccw() {
        let o = Point::new(10.0, 10.0);
        let right = heading_between(o, Point::new(20.0, 10.0)).unwrap();
        let up = heading_between(o, Point::new(10.0, 0.0)).unwrap();
        let down = heading_between(o, Point::new(10.0, 20.0)).unwrap();
        assert!(right.abs() < 1e-12, "right is 0");
        assert!((up - FRAC_PI_2).abs() < 1e-12, "up the screen is +pi/2");
        assert!((down + FRAC_PI_2).abs() < 1e-12, "down the screen is -pi/2");
        assert!(heading_between(o, o).is_none(), "no heading for zero delta");
    }

    #[test]
    fn direction_survives_zero_delta_moves() {
        let mut track = Track::new(Point::new(0.0, 0.0));
        track.move_to(Point::new(-5.0, 0.0));
        track.move_to(Point::new(-5.0, 0.0));
        assert!((track.heading() - PI).abs() < 1e-12, "keeps last heading");
    }

    #[test]
    fn normalize_wraps_into_range() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12, "negative wraps");
        assert!(normalize_angle(TAU).abs() < 1e-12, "full turn is zero");
        assert!((normalize_angle(5.0 * PI) - PI).abs() < 1e-9, "multiple turns wrap");
    }

    #[test]
    fn loop_count_signed_form() {
        assert_eq!(LoopCount::from_signed(-1), Ok(LoopCount::Forever));
        assert_eq!(LoopCount::from_signed(3), Ok(LoopCount::Finite(3)));
        assert_eq!(LoopCount::from_signed(0), Err(ConfigError::ZeroLoops));
        assert_eq!(LoopCount::from_signed(-2), Err(ConfigError::ZeroLoops));
    }

    #[test]
    fn expiry_is_terminal_until_reset() {
        let mut path = Trajectory::at(Point::new(1.0, 2.0));
        path.set_expiry(Some(0.1)).unwrap();
        assert!(!path.advance(0.05).is_exhausted(), "before expiry");
        assert!(path.advance(0.1).is_exhausted(), "after expiry");
        assert!(path.advance(0.0).is_exhausted(), "stays exhausted");
        path.reset();
        assert!(!path.is_exhausted(), "reset clears exhaustion");
        assert_eq!(path.advance(0.01), Advance::Position(Point::new(1.0, 2.0)));
    }

    #[test]
    fn invalid_expiry_is_rejected() {
        let mut path = Trajectory::at(Point::ZERO);
        assert_eq!(
            path.set_expiry(Some(0.0)),
            Err(ConfigError::InvalidDuration { duration: 0.0 })
        );
        assert!(path.set_expiry(Some(f64::INFINITY)).is_err(), "infinite");
    }
}
