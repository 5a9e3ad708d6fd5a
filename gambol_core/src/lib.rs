// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trajectories, sprites, and a dirty-rectangle frame loop for 2D games.
//!
//! `gambol_core` is `no_std` compatible (with `alloc`). It never opens a
//! window or reads a device; hosts inject a render target, an input source,
//! and a clock through the traits in [`backend`].
//!
//! # Architecture
//!
//! ```text
//!   Clock ──► FrameClock (capped dt) ──► FrameContext
//!                                            │
//!   InputSource ──► Game::handle_event       ▼
//!                                  Scene::move_groups ─► Trajectory::advance
//!                                            │
//!   Layer::restore ◄─ clear_groups ◄─────────┤
//!   RenderTarget::blit ◄─ draw_groups ◄──────┘
//!                              │
//!                              ▼
//!                DamageRegion ──► RenderTarget::present
//! ```
//!
//! **[`path`]**: Trajectories. The [`Motion`](path::Motion) contract and the
//! [`Trajectory`](path::Trajectory) union of kinematic, waypoint, random,
//! composite, offset, and turtle motion, plus [`Restriction`](path::Restriction)
//! bounds.
//!
//! **[`entity`]**: [`Entity`](entity::Entity), a sprite with a trajectory,
//! a shared image, and placement and collision rectangles. [`frames`] adds
//! animated and rotated image sets.
//!
//! **[`scene`]**: The entity arena with generational handles, leveled groups,
//! and formations tracked through `understory_dirty`.
//!
//! **[`game`]**: [`FrameLoop`](game::FrameLoop), its state machine, and the
//! [`Game`](game::Game) hooks.
//!
//! **[`layer`]**, **[`image`]**, **[`damage`]**, **[`geometry`]**: The
//! pixel-side pieces: background, images, dirty lists, rectangle tests.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies and
//!   [`load_waypoints`](path::load_waypoints).
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-frame
//!   dirty-rectangle events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod backend;
pub mod config;
pub mod damage;
pub mod dirty;
pub mod entity;
pub mod error;
pub mod frame;
pub mod frames;
pub mod game;
pub mod geometry;
pub mod image;
pub mod input;
pub mod layer;
pub mod path;
pub mod scene;
pub mod time;
pub mod trace;
