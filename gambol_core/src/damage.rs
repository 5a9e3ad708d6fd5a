// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-rectangle tracking for partial presentation.

use alloc::vec::Vec;

use kurbo::Rect;

/// The region of the render target touched during a frame.
///
/// Frames accumulate the rectangles returned by clears and draws; the
/// present step hands them to the render target so it only updates what
/// changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// Nothing changed; the previous frame can be reused.
    #[default]
    None,
    /// A list of touched rectangles in target pixels.
    Rects(Vec<Rect>),
    /// The entire target needs presenting.
    Full,
}

impl DamageRegion {
    /// Returns `true` if nothing needs presenting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Rects(r) => r.is_empty(),
            Self::Full => false,
        }
    }

    /// Adds one rectangle. Zero-area rectangles are dropped.
    pub fn push(&mut self, rect: Rect) {
        if rect.area() <= 0.0 {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rects(alloc::vec![rect]),
            Self::Rects(rects) => rects.push(rect),
        }
    }

    /// Adds every rectangle in `rects`.
    pub fn extend(&mut self, rects: impl IntoIterator<Item = Rect>) {
        for r in rects {
            self.push(r);
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }

    /// The touched rectangles, or `None` for a full present.
    #[must_use]
    pub fn rects(&self) -> Option<&[Rect]> {
        match self {
            Self::None => Some(&[]),
            Self::Rects(r) => Some(r),
            Self::Full => None,
        }
    }

    /// Bounding box of the touched rectangles, or `None` for empty and full
    /// regions.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rects(r) => crate::geometry::union_all(r),
            _ => None,
        }
    }

    /// Number of rectangles; zero for empty and full regions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Rects(r) => r.len(),
            _ => 0,
        }
    }

    /// Resets to [`DamageRegion::None`], keeping the allocation.
    pub fn clear(&mut self) {
        match self {
            Self::Rects(r) => r.clear(),
            other => *other = Self::None,
        }
    }
}
