// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts for the host collaborators.
//!
//! Gambol never creates a window, reads a device, or touches a wall clock
//! itself. A host supplies three pieces:
//!
//! - **Render target**: implements [`RenderTarget`]: blits images, presents
//!   dirty rectangles, and snapshots regions for background restoration.
//!
//! - **Input source**: implements [`InputSource`], a queue of typed
//!   [`InputEvent`]s drained once per frame.
//!
//! - **Clock**: implements [`Clock`], a monotonic time source that can also
//!   block until a deadline (frame pacing and modal waits).
//!
//! # Crate boundaries
//!
//! `gambol_core` owns trajectories, entities, the scene, and the frame loop.
//! `gambol_render` provides a software [`RenderTarget`]; `gambol_harness`
//! provides deterministic clocks and scripted input for tests. Application
//! code wires them together through [`FrameLoop`](crate::game::FrameLoop).

use kurbo::{Rect, Size};

use crate::image::{Color, Image};
use crate::input::InputEvent;
use crate::time::HostTime;

/// A pixel surface the frame loop draws on.
///
/// # Frame loop pseudocode
///
/// One frame touches the target in this order:
///
/// ```rust,ignore
/// fn frame(target: &mut impl RenderTarget) {
///     // Clear: every entity in every group restores the background under
///     // the rectangle it was last drawn at.
///     for rect in last_drawn { damage.push(layer.restore(target, rect)); }
///
///     // Events, move, collide: no target access.
///
///     // Draw: blit each entity at its new rectangle, lowest level first.
///     for e in by_level { damage.push(target.blit(&e.image, e.rect, None)); }
///
///     // Present: only the touched rectangles.
///     target.present(damage.rects());
/// }
/// ```
pub trait RenderTarget {
    /// Copies `image` (or its `src` sub-rectangle) to `dest.origin()`,
    /// clipped to `dest` and to the target. Transparent pixels are skipped.
    ///
    /// Returns the rectangle of the target that was touched, which may be
    /// empty.
    fn blit(&mut self, image: &Image, dest: Rect, src: Option<Rect>) -> Rect;

    /// Makes drawing visible: only the given rectangles, or everything for
    /// `None`.
    fn present(&mut self, rects: Option<&[Rect]>);

    /// Size of the target in pixels.
    fn size(&self) -> Size;

    /// Fills the whole target with `color`.
    fn fill(&mut self, color: Color);

    /// Copies the pixels under `region`, clipped to the target.
    fn snapshot(&self, region: Rect) -> Image;
}

/// A queue of input events.
pub trait InputSource {
    /// The next pending event, or `None` when the queue is empty.
    fn poll(&mut self) -> Option<InputEvent>;
}

/// A monotonic time source.
pub trait Clock {
    /// The current time.
    fn now(&self) -> HostTime;

    /// Blocks until `deadline`. Returns immediately if it has passed.
    fn wait_until(&mut self, deadline: HostTime);
}

impl<T: RenderTarget + ?Sized> RenderTarget for &mut T {
    fn blit(&mut self, image: &Image, dest: Rect, src: Option<Rect>) -> Rect {
        (**self).blit(image, dest, src)
    }

    fn present(&mut self, rects: Option<&[Rect]>) {
        (**self).present(rects);
    }

    fn size(&self) -> Size {
        (**self).size()
    }

    fn fill(&mut self, color: Color) {
        (**self).fill(color);
    }

    fn snapshot(&self, region: Rect) -> Image {
        (**self).snapshot(region)
    }
}
