// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory pixel buffer.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use gambol_core::backend::RenderTarget;
use gambol_core::geometry::pixel_bounds;
use gambol_core::image::{Color, Image};
use kurbo::{Rect, Size};

/// One recorded `present` call.
#[derive(Clone, Debug, PartialEq)]
pub enum Presented {
    /// The whole canvas.
    Full,
    /// Only these rectangles.
    Rects(Vec<Rect>),
}

/// A render target backed by a `Vec` of ARGB pixels.
#[derive(Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    presented: Vec<Presented>,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("presented", &self.presented.len())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// A black canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::BLACK)
    }

    /// A canvas filled with `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
            presented: Vec::new(),
        }
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The color at `(x, y)`, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Copies the whole canvas into an image.
    #[must_use]
    pub fn to_image(&self) -> Image {
        Image::from_pixels(self.width, self.height, self.pixels.clone())
    }

    /// Every `present` call so far, oldest first.
    #[must_use]
    pub fn presented(&self) -> &[Presented] {
        &self.presented
    }

    /// Forgets recorded presents.
    pub fn clear_presented(&mut self) {
        self.presented.clear();
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl RenderTarget for Canvas {
    fn blit(&mut self, image: &Image, dest: Rect, src: Option<Rect>) -> Rect {
        let src = src
            .map_or(image.bounds(), pixel_bounds)
            .intersect(image.bounds());
        let dest = pixel_bounds(dest);
        let area = Rect::from_origin_size(dest.origin(), src.size())
            .intersect(dest)
            .intersect(self.bounds());
        if area.area() <= 0.0 {
            return Rect::ZERO;
        }
        // Offset from target pixels to image pixels.
        let (ox, oy) = (src.x0 - dest.x0, src.y0 - dest.y0);
        let w = self.width as usize;
        for ty in span(area.y0, area.y1) {
            for tx in span(area.x0, area.x1) {
                let ix = whole(f64::from(tx) + ox);
                let iy = whole(f64::from(ty) + oy);
                let Some(c) = image.pixel(ix, iy) else {
                    continue;
                };
                if !c.is_transparent() {
                    self.pixels[ty as usize * w + tx as usize] = c;
                }
            }
        }
        area
    }

    fn present(&mut self, rects: Option<&[Rect]>) {
        self.presented.push(match rects {
            Some(r) => Presented::Rects(r.to_vec()),
            None => Presented::Full,
        });
    }

    fn size(&self) -> Size {
        self.bounds().size()
    }

    fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "snapshots are at most the canvas size"
    )]
    fn snapshot(&self, region: Rect) -> Image {
        let region = pixel_bounds(region);
        let (w, h) = (region.width() as u32, region.height() as u32);
        let mut out = Image::new(w, h);
        let (xs, ys) = (span(region.x0, region.x1), span(region.y0, region.y1));
        for (oy, y) in ys.enumerate() {
            for (ox, x) in xs.clone().enumerate() {
                if let Some(c) = self.pixel(x, y) {
                    out.set_pixel(ox as u32, oy as u32, c);
                }
            }
        }
        out
    }
}

/// Whole-pixel range between two snapped, non-negative coordinates.
fn span(lo: f64, hi: f64) -> Range<u32> {
    whole(lo)..whole(hi)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "callers pass snapped coordinates inside an image or the canvas"
)]
fn whole(v: f64) -> u32 {
    v.max(0.0) as u32
}
