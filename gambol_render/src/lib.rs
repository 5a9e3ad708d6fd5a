// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Software render targets for gambol.
//!
//! - [`Canvas`]: an in-memory pixel buffer implementing
//!   [`RenderTarget`](gambol_core::backend::RenderTarget)
//! - [`Recorder`]: a decorator that logs every call made to another render
//!   target, in order

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod canvas;
mod recorder;

pub use canvas::{Canvas, Presented};
pub use recorder::{BlitRecord, Call, Recorder};
