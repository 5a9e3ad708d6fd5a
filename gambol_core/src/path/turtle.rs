// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Heading-based movement.

use core::f64::consts::PI;

use kurbo::Point;

use super::{Advance, Motion, Track, along, normalize_angle};

/// Headings closer to zero than this snap to exactly zero.
const SNAP: f64 = 1e-7;

/// A turtle: a position and a heading, moved by explicit commands.
///
/// [`forward`](Self::forward) and [`turn`](Self::turn) take effect
/// immediately. A turtle can also drive itself: each
/// [`advance`](Motion::advance) moves `speed · dt` forward and turns
/// `turn_rate · dt`. With both at zero (the default) it stays put.
#[derive(Clone, Debug)]
pub struct Turtle {
    track: Track,
    heading: f64,
    speed: f64,
    turn_rate: f64,
    initial: (f64, f64, f64),
}

impl Turtle {
    /// A turtle at `start` facing `heading` radians.
    #[must_use]
    pub fn new(start: Point, heading: f64) -> Self {
        let heading = snap(normalize_angle(heading));
        let mut track = Track::new(start);
        track.set_origin(start, heading);
        track.set_heading(heading);
        Self {
            track,
            heading,
            speed: 0.0,
            turn_rate: 0.0,
            initial: (heading, 0.0, 0.0),
        }
    }

    /// Sets the constructed self-driving speed and turn rate.
    #[must_use]
    pub fn driving(mut self, speed: f64, turn_rate: f64) -> Self {
        self.speed = speed;
        self.turn_rate = turn_rate;
        self.initial = (self.heading, speed, turn_rate);
        self
    }

    /// Heading in radians, in `[0, 2π)`.
    #[must_use]
    pub const fn heading(&self) -> f64 {
        self.heading
    }

    /// Heading in degrees, in `[0, 360)`.
    #[must_use]
    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees()
    }

    /// Faces `heading` radians.
    pub fn set_heading(&mut self, heading: f64) {
        self.heading = snap(normalize_angle(heading));
        self.track.set_heading(self.heading);
    }

    /// Rotates by `radians`, counter-clockwise when positive.
    pub fn turn(&mut self, radians: f64) {
        self.set_heading(self.heading + radians);
    }

    /// Turns left (counter-clockwise) by `degrees`.
    pub fn left(&mut self, degrees: f64) {
        self.turn(degrees.to_radians());
    }

    /// Turns right (clockwise) by `degrees`.
    pub fn right(&mut self, degrees: f64) {
        self.turn(-degrees.to_radians());
    }

    /// Moves `distance` along the heading.
    pub fn forward(&mut self, distance: f64) {
        let p = self.track.position() + along(self.heading, distance);
        self.track.move_to(p);
        self.track.set_heading(self.heading);
    }

    /// Moves `distance` against the heading, still facing forward.
    pub fn back(&mut self, distance: f64) {
        self.forward(-distance);
    }

    /// Sets the self-driving speed in pixels per second.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Sets the self-driving turn rate in radians per second.
    pub fn set_turn_rate(&mut self, rate: f64) {
        self.turn_rate = rate;
    }
}

fn snap(heading: f64) -> f64 {
    if heading.abs() < SNAP || (2.0 * PI - heading).abs() < SNAP {
        0.0
    } else {
        heading
    }
}

impl Motion for Turtle {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, dt: f64) -> Advance {
        if self.turn_rate != 0.0 {
            self.turn(self.turn_rate * dt);
        }
        if self.speed != 0.0 {
            self.forward(self.speed * dt);
        }
        Advance::Position(self.track.position())
    }

    fn rewind(&mut self) {
        (self.heading, self.speed, self.turn_rate) = self.initial;
    }

    fn direction(&self) -> f64 {
        self.heading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn square_walk_returns_home() {
        let start = Point::new(50.0, 50.0);
        let mut t = Turtle::new(start, 0.0);
        for _ in 0..4 {
            t.forward(10.0);
            t.right(90.0);
        }
        assert!(near(t.position(), start), "ended at {:?}", t.position());
        assert_eq!(t.heading(), 0.0, "snapped back to zero");
    }

    #[test]
    fn left_is_up_the_screen() {
        let mut t = Turtle::new(Point::ZERO, 0.0);
        t.left(90.0);
        t.forward(5.0);
        assert!(near(t.position(), Point::new(0.0, -5.0)), "{:?}", t.position());
        assert!((t.heading_degrees() - 90.0).abs() < 1e-9, "degrees");
    }

    #[test]
    fn back_keeps_heading() {
        let mut t = Turtle::new(Point::ZERO, PI);
        t.back(3.0);
        assert!(near(t.position(), Point::new(3.0, 0.0)), "{:?}", t.position());
        assert!((t.direction() - PI).abs() < 1e-12, "still facing left");
    }

    #[test]
    fn self_driving_and_reset() {
        let mut t = Turtle::new(Point::ZERO, 0.0).driving(10.0, 0.0);
        let p = t.advance(0.5).position().unwrap();
        assert!(near(p, Point::new(5.0, 0.0)), "{p:?}");
        t.set_heading(1.0);
        t.reset();
        assert_eq!(t.position(), Point::ZERO);
        assert_eq!(t.heading(), 0.0);
    }

    #[test]
    fn heading_stays_normalized() {
        let mut t = Turtle::new(Point::ZERO, -PI / 2.0);
        assert!((t.heading() - 1.5 * PI).abs() < 1e-12, "wrapped");
        t.turn(10.0 * PI);
        assert!((0.0..2.0 * PI).contains(&t.heading()), "in range");
    }
}
