// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle predicates with the edge rules sprites need.
//!
//! `kurbo::Rect::overlaps` treats touching edges as overlapping and
//! `Rect::contains` excludes the max edges; sprite code wants the opposite
//! on both counts.

use kurbo::{Point, Rect};

/// Whether two rectangles overlap with positive area.
///
/// Rectangles that only share an edge do not collide, and a zero-area
/// rectangle never collides with anything.
#[must_use]
pub fn collide(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    if a.area() <= 0.0 || b.area() <= 0.0 {
        return false;
    }
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Whether `inner` lies entirely within `outer`, edges included.
#[must_use]
pub fn contains(outer: Rect, inner: Rect) -> bool {
    let (o, i) = (outer.abs(), inner.abs());
    i.x0 >= o.x0 && i.y0 >= o.y0 && i.x1 <= o.x1 && i.y1 <= o.y1
}

/// Whether `p` lies within `r`, edges included.
#[must_use]
pub fn contains_point(r: Rect, p: Point) -> bool {
    let r = r.abs();
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Bounding box of every rectangle in `rects`, or `None` if there are none.
#[must_use]
pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects.into_iter().fold(None, |acc, r| match acc {
        None => Some(*r),
        Some(u) => Some(u.union(*r)),
    })
}

/// Snaps a rectangle outward to whole pixels.
#[must_use]
pub fn pixel_bounds(r: Rect) -> Rect {
    let r = r.abs();
    Rect::new(
        libm::floor(r.x0),
        libm::floor(r.y0),
        libm::ceil(r.x1),
        libm::ceil(r.y1),
    )
}
