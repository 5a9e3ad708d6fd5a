// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame sets: several images for one entity.
//!
//! A [`Frames`] set either flips through its images on a timer or shows
//! the image whose heading is nearest the trajectory's direction. Attach
//! one with [`Entity::with_frames`](crate::entity::Entity::with_frames);
//! the entity picks its frame in [`advance`](crate::entity::Entity::advance),
//! so the draw that follows shows it.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::f64::consts::TAU;

use crate::error::ConfigError;
use crate::image::Image;
use crate::path::normalize_angle;

/// How a [`Frames`] set chooses its image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameSelect {
    /// Advance one image every `interval` seconds, wrapping at the end.
    Flip {
        /// Seconds each image is shown.
        interval: f64,
    },
    /// Image `i` of `n` faces heading `i * 2π / n`; the nearest one wins.
    Heading,
}

/// An ordered set of images and the rule that picks one.
#[derive(Clone, Debug)]
pub struct Frames {
    images: Vec<Rc<Image>>,
    select: FrameSelect,
    current: usize,
    until_flip: f64,
}

impl Frames {
    /// Images shown in turn, each for `interval` seconds.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyFrames`] for no images,
    /// [`ConfigError::InvalidDuration`] unless `interval` is positive and
    /// finite.
    pub fn flipping(images: Vec<Rc<Image>>, interval: f64) -> Result<Self, ConfigError> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ConfigError::InvalidDuration { duration: interval });
        }
        Self::build(images, FrameSelect::Flip { interval })
    }

    /// Images facing evenly spaced headings, the first facing heading 0.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyFrames`] for no images.
    pub fn by_heading(images: Vec<Rc<Image>>) -> Result<Self, ConfigError> {
        Self::build(images, FrameSelect::Heading)
    }

    /// `steps` precomputed turns of `image`, which is taken to face
    /// heading 0.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroSteps`] for zero steps.
    pub fn rotations(image: &Image, steps: usize) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        let images = (0..steps)
            .map(|i| Rc::new(image.rotated(TAU * i as f64 / steps as f64)))
            .collect();
        Self::by_heading(images)
    }

    fn build(images: Vec<Rc<Image>>, select: FrameSelect) -> Result<Self, ConfigError> {
        if images.is_empty() {
            return Err(ConfigError::EmptyFrames);
        }
        let mut frames = Self {
            images,
            select,
            current: 0,
            until_flip: 0.0,
        };
        frames.restart();
        Ok(frames)
    }

    /// Number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always false; a set holds at least one image.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The selection rule.
    #[must_use]
    pub const fn select(&self) -> FrameSelect {
        self.select
    }

    /// Index of the image currently shown.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The image currently shown.
    #[must_use]
    pub fn current(&self) -> &Rc<Image> {
        &self.images[self.current]
    }

    /// Back to the first image with a full interval ahead.
    pub fn restart(&mut self) {
        self.current = 0;
        self.until_flip = match self.select {
            FrameSelect::Flip { interval } => interval,
            FrameSelect::Heading => 0.0,
        };
    }

    /// Index of the image facing nearest `heading`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "rounded value lies in 0..=len"
    )]
    pub fn nearest(&self, heading: f64) -> usize {
        let n = self.images.len();
        let slot = libm::round(normalize_angle(heading) / TAU * n as f64);
        (slot as usize) % n
    }

    /// Steps the set by `dt` seconds with the trajectory facing
    /// `heading`. Returns the new image when the selection changed.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "remainder is below the frame count"
    )]
    pub fn update(&mut self, dt: f64, heading: f64) -> Option<Rc<Image>> {
        let next = match self.select {
            FrameSelect::Heading => self.nearest(heading),
            FrameSelect::Flip { interval } => {
                self.until_flip -= dt;
                if self.until_flip > 0.0 {
                    return None;
                }
                // Long frames may skip images.
                let flips = libm::floor(-self.until_flip / interval) + 1.0;
                self.until_flip += flips * interval;
                let n = self.images.len();
                (self.current + (flips % n as f64) as usize) % n
            }
        };
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(Rc::clone(&self.images[next]))
    }
}
