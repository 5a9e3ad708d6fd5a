// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waypoint paths computed from geometric parameters.
//!
//! All builders round coordinates to whole pixels and take an optional
//! `duration` (seconds per loop) with the same meaning as
//! [`Waypoints::new`]. Headings follow the screen convention described in
//! the [module docs](super).

use alloc::vec::Vec;
use core::f64::consts::{FRAC_PI_2, TAU};

use kurbo::Point;

use super::Waypoints;
use crate::error::ConfigError;

fn round(p: Point) -> Point {
    Point::new(libm::round(p.x), libm::round(p.y))
}

/// `steps + 1` evenly spaced points from `start` to `end`, inclusive.
pub fn line_points(start: Point, end: Point, steps: u32) -> Result<Vec<Point>, ConfigError> {
    if steps == 0 {
        return Err(ConfigError::ZeroSteps);
    }
    let delta = (end - start) / f64::from(steps);
    Ok((0..=steps)
        .map(|i| round(start + delta * f64::from(i)))
        .collect())
}

/// A straight line from `start` to `end`.
pub fn line(
    start: Point,
    end: Point,
    steps: u32,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    Waypoints::new(line_points(start, end, steps)?, duration)
}

/// A line out to `end` and back, using `steps` waypoints in total.
pub fn bounce_line(
    start: Point,
    end: Point,
    steps: u32,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    let mut places = line_points(start, end, steps / 2)?;
    there_and_back(&mut places);
    Waypoints::new(places, duration)
}

/// Appends the reverse of `places`, skipping both turning points.
fn there_and_back(places: &mut Vec<Point>) {
    if places.len() > 2 {
        let back: Vec<Point> = places[1..places.len() - 1].iter().rev().copied().collect();
        places.extend(back);
    }
}

/// Corner-to-corner points of a square whose first side leaves `start`
/// along `heading`.
pub fn square_points(
    start: Point,
    heading: f64,
    size: f64,
    steps: u32,
    clockwise: bool,
) -> Result<Vec<Point>, ConfigError> {
    let per_side = steps / 4;
    if per_side == 0 {
        return Err(ConfigError::ZeroSteps);
    }
    let turn = if clockwise { -FRAC_PI_2 } else { FRAC_PI_2 };
    let mut places = Vec::with_capacity(4 * per_side as usize + 1);
    places.push(round(start));
    let mut corner = round(start);
    let mut heading = heading;
    for _ in 0..4 {
        let next = round(Point::new(
            corner.x + libm::cos(heading) * size,
            corner.y - libm::sin(heading) * size,
        ));
        places.extend(line_points(corner, next, per_side)?.into_iter().skip(1));
        corner = next;
        heading += turn;
    }
    Ok(places)
}

/// A square traced once from `start`.
pub fn square(
    start: Point,
    heading: f64,
    size: f64,
    steps: u32,
    clockwise: bool,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    Waypoints::new(square_points(start, heading, size, steps, clockwise)?, duration)
}

/// Two squares sharing the start corner, traced in opposite directions.
pub fn square_eight(
    start: Point,
    heading: f64,
    size: f64,
    steps: u32,
    clockwise: bool,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    let mut places = square_points(start, heading, size, steps / 2, clockwise)?;
    let second = square_points(start, heading, size, steps / 2, !clockwise)?;
    places.extend_from_slice(&second[1..second.len() - 1]);
    Waypoints::new(places, duration)
}

/// `steps` points of a circle of `radius` passing through `start`, where the
/// path leaves `start` along `heading`.
pub fn circle_points(
    start: Point,
    heading: f64,
    radius: f64,
    steps: u32,
    clockwise: bool,
) -> Result<Vec<Point>, ConfigError> {
    if steps == 0 {
        return Err(ConfigError::ZeroSteps);
    }
    let (to_center, step) = if clockwise {
        (heading - FRAC_PI_2, -TAU / f64::from(steps))
    } else {
        (heading + FRAC_PI_2, TAU / f64::from(steps))
    };
    let center = Point::new(
        start.x + libm::cos(to_center) * radius,
        start.y - libm::sin(to_center) * radius,
    );
    // Angle of `start` as seen from the center.
    let first = to_center + core::f64::consts::PI;
    Ok((0..steps)
        .map(|i| {
            let a = first + step * f64::from(i);
            round(Point::new(
                center.x + libm::cos(a) * radius,
                center.y - libm::sin(a) * radius,
            ))
        })
        .collect())
}

/// A circle traced once from `start`.
pub fn circle(
    start: Point,
    heading: f64,
    radius: f64,
    steps: u32,
    clockwise: bool,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    Waypoints::new(circle_points(start, heading, radius, steps, clockwise)?, duration)
}

/// Half a circle out and the same half back.
pub fn bounce_circle(
    start: Point,
    heading: f64,
    radius: f64,
    steps: u32,
    clockwise: bool,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    let mut places = circle_points(start, heading, radius, steps / 2, clockwise)?;
    there_and_back(&mut places);
    Waypoints::new(places, duration)
}

/// `count` circles of growing radius, all tangent at `start`.
///
/// Radii run from `min_radius` in equal increments towards `max_radius`.
pub fn concentric_circles(
    start: Point,
    heading: f64,
    min_radius: f64,
    max_radius: f64,
    count: u32,
    steps: u32,
    clockwise: bool,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    if count == 0 {
        return Err(ConfigError::ZeroSteps);
    }
    let per_circle = steps / count;
    let increment = libm::floor((max_radius - min_radius) / f64::from(count));
    let mut places = Vec::new();
    let mut radius = min_radius;
    for _ in 0..count {
        places.extend(circle_points(start, heading, radius, per_circle, clockwise)?);
        radius += increment;
    }
    Waypoints::new(places, duration)
}

/// Two circles meeting at `start`, one in each direction.
pub fn figure_eight(
    start: Point,
    heading: f64,
    radius: f64,
    steps: u32,
    clockwise: bool,
    duration: Option<f64>,
) -> Result<Waypoints, ConfigError> {
    let mut places = circle_points(start, heading, radius, steps / 2, clockwise)?;
    places.extend(circle_points(start, heading, radius, steps / 2, !clockwise)?);
    Waypoints::new(places, duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{Advance, Motion};

    #[test]
    fn line_includes_both_ends() {
        let pts = line_points(Point::new(0.0, 0.0), Point::new(10.0, -5.0), 5).unwrap();
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], Point::new(0.0, 0.0));
        assert_eq!(pts[5], Point::new(10.0, -5.0));
        assert_eq!(pts[1], Point::new(2.0, -1.0));
    }

    #[test]
    fn zero_steps_fail_at_construction() {
        let o = Point::new(1.0, 1.0);
        assert_eq!(line(o, o, 0, None).unwrap_err(), ConfigError::ZeroSteps);
        assert_eq!(
            square(o, 0.0, 10.0, 3, true, None).unwrap_err(),
            ConfigError::ZeroSteps
        );
        assert_eq!(
            circle(o, 0.0, 10.0, 0, true, None).unwrap_err(),
            ConfigError::ZeroSteps
        );
    }

    #[test]
    fn bounce_line_turns_around() {
        let w = bounce_line(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 8, None).unwrap();
        let xs: Vec<f64> = w.places().iter().map(|p| p.x).collect();
        assert_eq!(xs, [0.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn clockwise_square_goes_right_then_down() {
        let pts = square_points(Point::new(100.0, 100.0), 0.0, 100.0, 800, true).unwrap();
        assert_eq!(pts.len(), 801);
        assert_eq!(pts[200], Point::new(200.0, 100.0), "first corner");
        assert_eq!(pts[400], Point::new(200.0, 200.0), "second corner is below");
        assert_eq!(pts[600], Point::new(100.0, 200.0), "third corner");
        assert_eq!(pts[800], Point::new(100.0, 100.0), "closes the loop");
    }

    #[test]
    fn square_traversal_returns_home() {
        let start = Point::new(100.0, 100.0);
        let mut path = square(start, 0.0, 100.0, 800, true, None).unwrap();
        let mut last = start;
        let mut calls = 0;
        while let Advance::Position(p) = path.advance(1.0 / 60.0) {
            last = p;
            calls += 1;
        }
        assert_eq!(calls, 801, "every waypoint visited once");
        assert!(last.distance(start) <= 1.0, "ended at {last:?}");
        assert!(path.position().distance(start) <= 1.0, "exhausted at start");
    }

    #[test]
    fn circle_starts_at_start_and_stays_on_radius() {
        let start = Point::new(100.0, 100.0);
        for clockwise in [true, false] {
            let pts = circle_points(start, 0.0, 50.0, 40, clockwise).unwrap();
            assert_eq!(pts[0], start, "clockwise={clockwise}");
            let center = if clockwise {
                Point::new(100.0, 150.0)
            } else {
                Point::new(100.0, 50.0)
            };
            for p in &pts {
                let r = p.distance(center);
                assert!((r - 50.0).abs() <= 1.0, "off radius: {p:?}");
            }
            // First step heads right in both cases.
            assert!(pts[1].x > start.x, "clockwise={clockwise}");
        }
    }

    #[test]
    fn figure_eight_visits_both_lobes() {
        let start = Point::new(200.0, 200.0);
        let w = figure_eight(start, 0.0, 40.0, 80, true, None).unwrap();
        assert_eq!(w.places().len(), 80);
        assert!(w.places().iter().any(|p| p.y > 250.0), "lower lobe");
        assert!(w.places().iter().any(|p| p.y < 150.0), "upper lobe");
    }

    #[test]
    fn square_eight_shares_start_corner() {
        let start = Point::new(50.0, 50.0);
        let w = square_eight(start, 0.0, 20.0, 16, true, None).unwrap();
        // 9 points for the first square, 7 interior points for the second.
        assert_eq!(w.places().len(), 16);
        assert_eq!(w.places()[0], start);
        assert_eq!(w.places()[8], start);
    }

    #[test]
    fn concentric_circles_grow() {
        let start = Point::new(0.0, 0.0);
        let w = concentric_circles(start, 0.0, 10.0, 40.0, 3, 60, false, Some(3.0)).unwrap();
        assert_eq!(w.places().len(), 60);
        let highest = w.places().iter().map(|p| -p.y).fold(0.0, f64::max);
        assert!((highest - 60.0).abs() <= 1.0, "largest radius 30: {highest}");
    }
}
