// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A render target decorator that logs every call.

use alloc::vec::Vec;

use gambol_core::backend::RenderTarget;
use gambol_core::image::{Color, Image};
use kurbo::{Rect, Size};

/// One logged blit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlitRecord {
    /// Size of the blitted image.
    pub image: Size,
    /// Requested destination.
    pub dest: Rect,
    /// Requested source sub-rectangle.
    pub src: Option<Rect>,
    /// What the inner target reported as touched.
    pub touched: Rect,
}

/// One logged call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    /// A blit.
    Blit(BlitRecord),
    /// A present of these rectangles, or of everything.
    Present(Option<Vec<Rect>>),
    /// A fill.
    Fill(Color),
}

/// Wraps a render target and records every call made to it, in order.
#[derive(Clone, Debug, Default)]
pub struct Recorder<T> {
    inner: T,
    calls: Vec<Call>,
}

impl<T: RenderTarget> Recorder<T> {
    /// Starts recording calls to `inner`.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    /// The wrapped target.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.inner
    }

    /// Mutable access to the wrapped target. Calls made through it are not
    /// recorded.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwraps the target.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Takes the log, leaving it empty.
    pub fn take_calls(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }

    /// Logged blits, oldest first.
    pub fn blits(&self) -> impl Iterator<Item = &BlitRecord> + '_ {
        self.calls.iter().filter_map(|c| match c {
            Call::Blit(b) => Some(b),
            _ => None,
        })
    }

    /// The calls of each frame: the log split after every present.
    pub fn frames(&self) -> impl Iterator<Item = &[Call]> + '_ {
        self.calls
            .split_inclusive(|c| matches!(c, Call::Present(_)))
    }
}

impl<T: RenderTarget> RenderTarget for Recorder<T> {
    fn blit(&mut self, image: &Image, dest: Rect, src: Option<Rect>) -> Rect {
        let touched = self.inner.blit(image, dest, src);
        self.calls.push(Call::Blit(BlitRecord {
            image: image.size(),
            dest,
            src,
            touched,
        }));
        touched
    }

    fn present(&mut self, rects: Option<&[Rect]>) {
        self.inner.present(rects);
        self.calls.push(Call::Present(rects.map(<[Rect]>::to_vec)));
    }

    fn size(&self) -> Size {
        self.inner.size()
    }

    fn fill(&mut self, color: Color) {
        self.inner.fill(color);
        self.calls.push(Call::Fill(color));
    }

    fn snapshot(&self, region: Rect) -> Image {
        self.inner.snapshot(region)
    }
}
