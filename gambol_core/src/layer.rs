// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The background a set of entities is drawn over.

use alloc::rc::Rc;

use kurbo::{Rect, Size};

use crate::backend::RenderTarget;
use crate::image::{Color, Image};

/// A background image covering a viewport of the render target.
///
/// Entities clear themselves by asking the layer to restore the background
/// under their previous rectangle. The layer exclusively owns its background;
/// entities only ever read regions of it.
#[derive(Clone, Debug)]
pub struct Layer {
    background: Rc<Image>,
    viewport: Rect,
}

impl Layer {
    /// A layer at `viewport` whose background is a solid `color`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "viewports are at most 4096 pixels on a side"
    )]
    pub fn solid(viewport: Rect, color: Color) -> Self {
        let vp = crate::geometry::pixel_bounds(viewport);
        Self {
            background: Rc::new(Image::solid(
                vp.width() as u32,
                vp.height() as u32,
                color,
            )),
            viewport: vp,
        }
    }

    /// A layer with an explicit background image placed at `origin`.
    #[must_use]
    pub fn with_background(background: Rc<Image>, origin: kurbo::Point) -> Self {
        let viewport = Rect::from_origin_size(origin, background.size());
        Self {
            background,
            viewport,
        }
    }

    /// A full-target layer whose background is whatever is on `target` now.
    #[must_use]
    pub fn capture(target: &dyn RenderTarget) -> Self {
        let viewport = Rect::from_origin_size((0.0, 0.0), target.size());
        Self {
            background: Rc::new(target.snapshot(viewport)),
            viewport,
        }
    }

    /// The viewport in target pixels.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// The viewport size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.viewport.size()
    }

    /// The background image.
    #[must_use]
    pub fn background(&self) -> &Rc<Image> {
        &self.background
    }

    /// Replaces the background. Call [`paint`](Self::paint) to show it.
    pub fn set_background(&mut self, background: Rc<Image>) {
        self.viewport = Rect::from_origin_size(self.viewport.origin(), background.size());
        self.background = background;
    }

    /// Refills the background with `color`. Call [`paint`](Self::paint) to
    /// show it.
    pub fn fill(&mut self, color: Color) {
        Rc::make_mut(&mut self.background).fill(color);
    }

    /// Blits the whole background and returns the viewport.
    pub fn paint(&self, target: &mut dyn RenderTarget) -> Rect {
        target.blit(&self.background, self.viewport, None)
    }

    /// Restores the background under `rect` and returns the touched area.
    ///
    /// Parts of `rect` outside the viewport are left alone.
    pub fn restore(&self, target: &mut dyn RenderTarget, rect: Rect) -> Rect {
        let dest = crate::geometry::pixel_bounds(rect).intersect(self.viewport);
        if dest.area() <= 0.0 {
            return Rect::ZERO;
        }
        let src = dest - self.viewport.origin().to_vec2();
        target.blit(&self.background, dest, Some(src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Records blits without touching pixels.
    #[derive(Default)]
    struct Blits(Vec<(Rect, Option<Rect>)>);

    impl RenderTarget for Blits {
        fn blit(&mut self, _image: &Image, dest: Rect, src: Option<Rect>) -> Rect {
            self.0.push((dest, src));
            dest
        }
        fn present(&mut self, _rects: Option<&[Rect]>) {}
        fn size(&self) -> Size {
            Size::new(100.0, 100.0)
        }
        fn fill(&mut self, _color: Color) {}
        fn snapshot(&self, region: Rect) -> Image {
            Image::solid(10, 10, Color::BLUE).resized(
                region.width() as u32,
                region.height() as u32,
            )
        }
    }

    #[test]
    fn restore_maps_into_background_coordinates() {
        let layer = Layer::solid(Rect::new(20.0, 10.0, 120.0, 110.0), Color::BLACK);
        let mut t = Blits::default();
        let r = layer.restore(&mut t, Rect::new(30.0, 15.0, 40.0, 25.0));
        assert_eq!(r, Rect::new(30.0, 15.0, 40.0, 25.0));
        assert_eq!(t.0[0].1, Some(Rect::new(10.0, 5.0, 20.0, 15.0)), "source offset");
    }

    #[test]
    fn restore_clips_to_viewport() {
        let layer = Layer::solid(Rect::new(0.0, 0.0, 50.0, 50.0), Color::BLACK);
        let mut t = Blits::default();
        let r = layer.restore(&mut t, Rect::new(45.0, 45.0, 60.0, 60.0));
        assert_eq!(r, Rect::new(45.0, 45.0, 50.0, 50.0));
        assert_eq!(layer.restore(&mut t, Rect::new(70.0, 70.0, 80.0, 80.0)), Rect::ZERO);
        assert_eq!(t.0.len(), 1, "nothing blitted outside");
    }

    #[test]
    fn capture_snapshots_the_target() {
        let t = Blits::default();
        let layer = Layer::capture(&t);
        assert_eq!(layer.viewport(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(layer.background().pixel(99, 99), Some(Color::BLUE));
    }

    #[test]
    fn fill_copies_shared_backgrounds() {
        let shared = Rc::new(Image::solid(4, 4, Color::WHITE));
        let mut layer = Layer::with_background(Rc::clone(&shared), kurbo::Point::ZERO);
        layer.fill(Color::RED);
        assert_eq!(layer.background().pixel(0, 0), Some(Color::RED));
        assert_eq!(shared.pixel(0, 0), Some(Color::WHITE), "original untouched");
    }
}
