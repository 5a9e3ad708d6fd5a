// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel images and the shared image cache.
//!
//! Images are shared read-only through [`Rc`]. Editing helpers such as
//! [`Image::recolor`] act on an owned image; to edit a shared one, go through
//! [`Rc::make_mut`], which clones the pixels whenever anyone else (the
//! [`ImageCache`] in particular) still holds a reference.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Rect, Size};

use crate::error::LoadError;

/// A 32-bit ARGB color. Alpha 0 is fully transparent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    /// A color with explicit alpha.
    #[must_use]
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// The alpha channel.
    #[expect(clippy::cast_possible_truncation, reason = "shifted into range")]
    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Whether blitting this color leaves the destination untouched.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:08x})", self.0)
    }
}

/// An owned rectangle of [`Color`] pixels, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Image {
    /// A transparent image.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::solid(width, height, Color::TRANSPARENT)
    }

    /// An image filled with `color`.
    #[must_use]
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Wraps existing pixels.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len()` is not `width * height`.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        assert!(
            pixels.len() == width as usize * height as usize,
            "pixel count {} does not match {width}x{height}",
            pixels.len()
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Size as a kurbo [`Size`].
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// The whole image as a rectangle at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.size())
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// The pixel at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Sets the pixel at `(x, y)`; ignored outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    /// Fills every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Copies the part of the image under `region`, clipped to the image.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "clipped to image bounds")]
    pub fn crop(&self, region: Rect) -> Self {
        let r = crate::geometry::pixel_bounds(region).intersect(self.bounds());
        if r.area() <= 0.0 {
            return Self::new(0, 0);
        }
        let (x0, y0) = (r.x0 as u32, r.y0 as u32);
        let (w, h) = (r.width() as u32, r.height() as u32);
        let mut pixels = Vec::with_capacity(w as usize * h as usize);
        for y in y0..y0 + h {
            let row = y as usize * self.width as usize;
            pixels.extend_from_slice(&self.pixels[row + x0 as usize..row + (x0 + w) as usize]);
        }
        Self::from_pixels(w, h, pixels)
    }

    /// Replaces every `from` pixel with `to`.
    pub fn recolor(&mut self, from: Color, to: Color) {
        for p in &mut self.pixels {
            if *p == from {
                *p = to;
            }
        }
    }

    /// A nearest-neighbour scaled copy.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source coordinates are below the source dimensions"
    )]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut out = Self::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let sy = u64::from(y) * u64::from(self.height) / u64::from(height);
            for x in 0..width {
                let sx = u64::from(x) * u64::from(self.width) / u64::from(width);
                let src = sy as usize * self.width as usize + sx as usize;
                out.pixels[y as usize * width as usize + x as usize] = self.pixels[src];
            }
        }
        out
    }

    /// A copy turned `angle` radians counter-clockwise on screen, sized to
    /// the turned bounding box. Corners the source does not cover are
    /// transparent.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "bounding box and sample coordinates are non-negative and small"
    )]
    pub fn rotated(&self, angle: f64) -> Self {
        let (sin, cos) = (libm::sin(angle), libm::cos(angle));
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        // Shave rounding noise so quarter turns keep their exact size.
        let bw = libm::ceil(libm::fabs(w * cos) + libm::fabs(h * sin) - 1e-9).max(0.0);
        let bh = libm::ceil(libm::fabs(w * sin) + libm::fabs(h * cos) - 1e-9).max(0.0);
        let (ow, oh) = (bw as u32, bh as u32);
        let mut out = Self::new(ow, oh);
        for y in 0..oh {
            for x in 0..ow {
                let dx = f64::from(x) + 0.5 - bw / 2.0;
                let dy = f64::from(y) + 0.5 - bh / 2.0;
                let sx = dx * cos - dy * sin + w / 2.0;
                let sy = dx * sin + dy * cos + h / 2.0;
                if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                    let src = sy as usize * self.width as usize + sx as usize;
                    out.pixels[y as usize * ow as usize + x as usize] = self.pixels[src];
                }
            }
        }
        out
    }
}

/// Shared images keyed by name, each loaded at most once.
#[derive(Debug, Default)]
pub struct ImageCache {
    images: BTreeMap<String, Rc<Image>>,
}

impl ImageCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached image for `name`, calling `load` the first time.
    ///
    /// A failed load is not cached, so a later call retries.
    pub fn get_or_load(
        &mut self,
        name: &str,
        load: impl FnOnce(&str) -> Result<Image, LoadError>,
    ) -> Result<Rc<Image>, LoadError> {
        if let Some(image) = self.images.get(name) {
            return Ok(Rc::clone(image));
        }
        let image = Rc::new(load(name)?);
        log::debug!("cached image {name} ({}x{})", image.width, image.height);
        self.images.insert(String::from(name), Rc::clone(&image));
        Ok(image)
    }

    /// Stores `image` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, image: Image) -> Rc<Image> {
        let image = Rc::new(image);
        self.images.insert(name.into(), Rc::clone(&image));
        image
    }

    /// The cached image for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<Image>> {
        self.images.get(name).cloned()
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Drops every cached entry. Images still held elsewhere stay alive.
    pub fn clear(&mut self) {
        self.images.clear();
    }
}
