// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset trajectories for formations.

use alloc::boxed::Box;

use kurbo::{Point, Vec2};

use super::{Advance, Motion, Track, Trajectory};

/// Where an [`Offset`] gets its base position from.
#[derive(Clone, Debug)]
pub enum OffsetSource {
    /// An owned trajectory, advanced along with the offset.
    Inner(Box<Trajectory>),
    /// A position supplied from outside each frame, typically a leader
    /// entity's position (see [`Scene::follow`](crate::scene::Scene::follow)).
    Anchor(Point),
}

/// A base position shifted by a constant offset.
#[derive(Clone, Debug)]
pub struct Offset {
    track: Track,
    source: OffsetSource,
    offset: Vec2,
    initial_offset: Vec2,
}

impl Offset {
    /// Wraps `inner`, shifting each of its positions by `offset`.
    #[must_use]
    pub fn wrapping(inner: Trajectory, offset: Vec2) -> Self {
        let start = inner.position() + offset;
        Self {
            track: Track::new(start),
            source: OffsetSource::Inner(Box::new(inner)),
            offset,
            initial_offset: offset,
        }
    }

    /// Follows an externally supplied anchor at `offset`.
    #[must_use]
    pub fn anchored(anchor: Point, offset: Vec2) -> Self {
        Self {
            track: Track::new(anchor + offset),
            source: OffsetSource::Anchor(anchor),
            offset,
            initial_offset: offset,
        }
    }

    /// The offset.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Changes the offset; takes effect on the next advance. A reset
    /// restores the constructed offset.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// The base position source.
    #[must_use]
    pub const fn source(&self) -> &OffsetSource {
        &self.source
    }

    /// Updates the anchor. Has no effect on a wrapping offset.
    pub fn follow(&mut self, anchor: Point) {
        if let OffsetSource::Anchor(a) = &mut self.source {
            *a = anchor;
        }
    }
}

impl Motion for Offset {
    fn track(&self) -> &Track {
        &self.track
    }

    fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    fn step(&mut self, dt: f64) -> Advance {
        let base = match &mut self.source {
            OffsetSource::Inner(inner) => match inner.advance(dt) {
                Advance::Position(p) => p,
                Advance::Exhausted => return Advance::Exhausted,
            },
            OffsetSource::Anchor(a) => *a,
        };
        let p = base + self.offset;
        self.track.move_to(p);
        Advance::Position(p)
    }

    fn rewind(&mut self) {
        self.offset = self.initial_offset;
        if let OffsetSource::Inner(inner) = &mut self.source {
            inner.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Kinematic;

    #[test]
    fn wrapping_tracks_inner_plus_offset() {
        let inner = Kinematic::new(Point::new(10.0, 10.0)).with_velocity(Vec2::new(60.0, 0.0));
        let mut o = Offset::wrapping(inner.into(), Vec2::new(0.0, -5.0));
        assert_eq!(o.position(), Point::new(10.0, 5.0));
        let p = o.advance(0.5).position().unwrap();
        assert_eq!(p, Point::new(40.0, 5.0));
    }

    #[test]
    fn wrapping_propagates_exhaustion() {
        let mut inner: Trajectory = Kinematic::new(Point::ZERO).into();
        inner.set_expiry(Some(0.1)).unwrap();
        let mut o = Offset::wrapping(inner, Vec2::new(1.0, 1.0));
        assert!(o.advance(0.2).is_exhausted(), "inner expired");
        o.reset();
        assert_eq!(o.advance(0.05).position(), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn reset_restores_the_constructed_offset() {
        let inner = Kinematic::new(Point::new(10.0, 10.0)).with_velocity(Vec2::new(10.0, 0.0));
        let mut o = Offset::wrapping(inner.into(), Vec2::new(0.0, 5.0));
        o.set_offset(Vec2::new(100.0, 0.0));
        assert_eq!(o.advance(1.0).position(), Some(Point::new(120.0, 10.0)));
        o.reset();
        assert_eq!(o.offset(), Vec2::new(0.0, 5.0));
        assert_eq!(o.position(), Point::new(10.0, 15.0));
        assert_eq!(o.advance(1.0).position(), Some(Point::new(20.0, 15.0)));
    }

    #[test]
    fn anchored_follows_updates() {
        let mut o = Offset::anchored(Point::new(0.0, 0.0), Vec2::new(3.0, 4.0));
        o.follow(Point::new(10.0, 10.0));
        assert_eq!(o.advance(0.016).position(), Some(Point::new(13.0, 14.0)));
    }
}
