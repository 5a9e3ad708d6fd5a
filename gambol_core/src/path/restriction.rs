// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position, velocity, and speed limits applied by kinematic paths.

use kurbo::{Point, Rect, Vec2};

use crate::error::{Axis, ConfigError};

/// What happens when a position bound is reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Clamp the position; velocity is left alone.
    #[default]
    Clamp,
    /// Clamp the position and reflect the velocity component that hit.
    Bounce,
    /// Clamp the position and exhaust the path.
    End,
}

/// An inclusive `[min, max]` range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Range {
    /// Creates a range, rejecting `min > max` or NaN bounds.
    pub fn new(axis: Axis, min: f64, max: f64) -> Result<Self, ConfigError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ConfigError::InvalidBounds { axis, min, max });
        }
        Ok(Self { min, max })
    }

    #[inline]
    fn clamp(self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

/// Which bounds were hit while restricting a position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hits {
    /// The x bound was hit.
    pub x: bool,
    /// The y bound was hit.
    pub y: bool,
}

impl Hits {
    /// Returns `true` if either axis was clamped.
    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.x || self.y
    }
}

/// Bounds applied to a kinematic path after every update.
///
/// Position bounds are optional; velocity component bounds and the speed cap
/// always apply. The speed cap rescales the whole velocity vector rather than
/// clipping components, so heading is preserved.
///
/// Restricting an already-restricted value is a no-op.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Restriction {
    x: Option<Range>,
    y: Option<Range>,
    vx: Range,
    vy: Range,
    speed_cap: f64,
    boundary: Boundary,
}

impl Default for Restriction {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            vx: Range {
                min: -Self::DEFAULT_VELOCITY_LIMIT,
                max: Self::DEFAULT_VELOCITY_LIMIT,
            },
            vy: Range {
                min: -Self::DEFAULT_VELOCITY_LIMIT,
                max: Self::DEFAULT_VELOCITY_LIMIT,
            },
            speed_cap: Self::DEFAULT_SPEED_CAP,
            boundary: Boundary::Clamp,
        }
    }
}

impl Restriction {
    /// Default overall speed cap in pixels per second.
    pub const DEFAULT_SPEED_CAP: f64 = 2000.0;
    /// Default per-component velocity limit in pixels per second.
    pub const DEFAULT_VELOCITY_LIMIT: f64 = 5000.0;

    /// Default limits plus position bounds covering `bounds`.
    #[must_use]
    pub fn onscreen(bounds: Rect) -> Self {
        let bounds = bounds.abs();
        Self {
            x: Some(Range {
                min: bounds.x0,
                max: bounds.x1,
            }),
            y: Some(Range {
                min: bounds.y0,
                max: bounds.y1,
            }),
            ..Self::default()
        }
    }

    /// Sets the horizontal position bounds.
    pub fn with_x(mut self, min: f64, max: f64) -> Result<Self, ConfigError> {
        self.x = Some(Range::new(Axis::X, min, max)?);
        Ok(self)
    }

    /// Sets the vertical position bounds.
    pub fn with_y(mut self, min: f64, max: f64) -> Result<Self, ConfigError> {
        self.y = Some(Range::new(Axis::Y, min, max)?);
        Ok(self)
    }

    /// Sets the horizontal velocity bounds.
    pub fn with_vx(mut self, min: f64, max: f64) -> Result<Self, ConfigError> {
        self.vx = Range::new(Axis::Vx, min, max)?;
        Ok(self)
    }

    /// Sets the vertical velocity bounds.
    pub fn with_vy(mut self, min: f64, max: f64) -> Result<Self, ConfigError> {
        self.vy = Range::new(Axis::Vy, min, max)?;
        Ok(self)
    }

    /// Sets the overall speed cap.
    pub fn with_speed_cap(mut self, cap: f64) -> Result<Self, ConfigError> {
        if cap.is_nan() || cap < 0.0 || cap.is_infinite() {
            return Err(ConfigError::NegativeSpeedCap { cap });
        }
        self.speed_cap = cap;
        Ok(self)
    }

    /// Removes the position bounds.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.x = None;
        self.y = None;
        self
    }

    /// Sets what happens when a position bound is hit.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Returns the boundary behavior.
    #[inline]
    #[must_use]
    pub const fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Returns the overall speed cap.
    #[inline]
    #[must_use]
    pub const fn speed_cap(&self) -> f64 {
        self.speed_cap
    }

    /// Clamps velocity components, then rescales to the speed cap.
    #[must_use]
    pub fn restrict_velocity(&self, v: Vec2) -> Vec2 {
        let v = Vec2::new(self.vx.clamp(v.x), self.vy.clamp(v.y));
        let speed = libm::hypot(v.x, v.y);
        if speed > self.speed_cap && speed > 0.0 {
            v * (self.speed_cap / speed)
        } else {
            v
        }
    }

    /// Clamps a position to the configured bounds and reports which axes hit.
    ///
    /// A position exactly on a bound is inside and does not count as a hit.
    #[must_use]
    pub fn restrict_position(&self, p: Point) -> (Point, Hits) {
        let mut out = p;
        let mut hits = Hits::default();
        if let Some(r) = self.x {
            out.x = r.clamp(p.x);
            hits.x = out.x != p.x;
        }
        if let Some(r) = self.y {
            out.y = r.clamp(p.y);
            hits.y = out.y != p.y;
        }
        (out, hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restriction_is_idempotent() {
        let r = Restriction::onscreen(Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_speed_cap(300.0)
            .unwrap();
        let samples = [
            (Point::new(-50.0, 700.0), Vec2::new(900.0, -10.0)),
            (Point::new(400.0, 300.0), Vec2::new(100.0, 100.0)),
            (Point::new(800.0, 0.0), Vec2::new(-6000.0, 6000.0)),
        ];
        for (p, v) in samples {
            let (p1, _) = r.restrict_position(p);
            let (p2, hits) = r.restrict_position(p1);
            assert_eq!(p1, p2, "position clamp must be idempotent");
            assert!(!hits.any(), "in-bounds position must not report a hit");

            let v1 = r.restrict_velocity(v);
            let v2 = r.restrict_velocity(v1);
            assert!((v1 - v2).hypot() < 1e-9, "velocity clamp must be idempotent");
        }
    }

    #[test]
    fn speed_cap_preserves_heading() {
        let r = Restriction::default().with_speed_cap(100.0).unwrap();
        let v = r.restrict_velocity(Vec2::new(300.0, 400.0));
        assert!((v.hypot() - 100.0).abs() < 1e-9, "speed should be capped");
        assert!((v.x / v.y - 0.75).abs() < 1e-9, "heading should be kept");
    }

    #[test]
    fn components_clamp_before_speed_cap() {
        let r = Restriction::default()
            .with_vx(-10.0, 10.0)
            .unwrap()
            .with_speed_cap(1000.0)
            .unwrap();
        let v = r.restrict_velocity(Vec2::new(50.0, 20.0));
        assert_eq!(v, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = Restriction::default().with_x(10.0, 0.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidBounds {
                axis: Axis::X,
                min: 10.0,
                max: 0.0
            }
        );
        assert!(Restriction::default().with_speed_cap(-1.0).is_err());
    }

    #[test]
    fn clamping_reports_hits() {
        let r = Restriction::default().with_y(0.0, 100.0).unwrap();
        let (p, hits) = r.restrict_position(Point::new(5000.0, 120.0));
        assert_eq!(p, Point::new(5000.0, 100.0));
        assert!(!hits.x && hits.y, "only y is bounded");
    }
}
