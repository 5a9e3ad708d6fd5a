// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless hosts for gambol frame loops.
//!
//! [`Headless`] wires a [`FrameLoop`] to a recorded [`Canvas`], a
//! [`ManualClock`], and [`ScriptedInput`], so games can run frame by frame in
//! tests and offline tools with fully deterministic timing:
//!
//! ```rust,ignore
//! let mut host = Headless::new(LoopConfig::headless())?;
//! let id = host.frame_loop_mut().spawn(sprite, 0);
//! host.run(&mut game, 61);
//! assert_eq!(host.frame_loop().scene().get(id).position().x, 110.0);
//! ```
//!
//! When the configuration does not pace, every frame advances the clock by a
//! fixed step (the nominal frame duration unless set with
//! [`Headless::with_step`]). When it paces, the loop's own waits move the
//! clock.

mod clock;
mod input;
mod stats;

pub use clock::{ManualClock, SystemClock};
pub use input::ScriptedInput;
pub use stats::PacingStats;

use gambol_core::config::LoopConfig;
use gambol_core::error::ConfigError;
use gambol_core::game::{FrameLoop, Game, LoopState};
use gambol_core::time::Duration;
use gambol_core::trace::Tracer;
use gambol_render::{Canvas, Recorder};

/// The frame loop type a [`Headless`] host drives.
pub type HeadlessLoop = FrameLoop<Recorder<Canvas>, ScriptedInput, ManualClock>;

/// A frame loop over an in-memory canvas with manual time.
#[derive(Debug)]
pub struct Headless {
    frame_loop: HeadlessLoop,
    clock: ManualClock,
    step: Duration,
}

impl Headless {
    /// Builds a host with a canvas the size of `config.window`.
    pub fn new(config: LoopConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let canvas = Canvas::new(px(config.window.width), px(config.window.height));
        let clock = ManualClock::new();
        let input = ScriptedInput::timed(clock.clone());
        let frame_loop = FrameLoop::new(config, Recorder::new(canvas), input, clock.clone())?;
        log::debug!(
            "headless host {}x{} at {} fps",
            config.window.width,
            config.window.height,
            config.max_fps
        );
        Ok(Self {
            frame_loop,
            clock,
            step: config.frame_duration(),
        })
    }

    /// Sets how far the clock moves per unpaced frame.
    #[must_use]
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// A handle to the host's clock.
    #[must_use]
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// The frame loop.
    #[must_use]
    pub fn frame_loop(&self) -> &HeadlessLoop {
        &self.frame_loop
    }

    /// Mutable access to the frame loop.
    #[must_use]
    pub fn frame_loop_mut(&mut self) -> &mut HeadlessLoop {
        &mut self.frame_loop
    }

    /// The input script.
    #[must_use]
    pub fn input(&mut self) -> &mut ScriptedInput {
        self.frame_loop.input_mut()
    }

    /// The call log of the render target.
    #[must_use]
    pub fn recorder(&self) -> &Recorder<Canvas> {
        self.frame_loop.target()
    }

    /// Mutable access to the call log.
    #[must_use]
    pub fn recorder_mut(&mut self) -> &mut Recorder<Canvas> {
        self.frame_loop.target_mut()
    }

    /// The pixels.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        self.recorder().inner()
    }

    /// Runs one frame.
    pub fn tick(&mut self, game: &mut impl Game) -> LoopState {
        self.tick_traced(game, &mut Tracer::none())
    }

    /// [`tick`](Self::tick) with tracing.
    pub fn tick_traced(&mut self, game: &mut impl Game, tracer: &mut Tracer<'_>) -> LoopState {
        let state = self.frame_loop.tick_traced(game, tracer);
        if !self.frame_loop.config().pace {
            self.clock.advance(self.step);
        }
        state
    }

    /// Runs up to `frames` frames, stopping early when the loop stops or
    /// quits.
    pub fn run(&mut self, game: &mut impl Game, frames: u64) -> LoopState {
        self.run_traced(game, frames, &mut Tracer::none())
    }

    /// [`run`](Self::run) with tracing.
    pub fn run_traced(
        &mut self,
        game: &mut impl Game,
        frames: u64,
        tracer: &mut Tracer<'_>,
    ) -> LoopState {
        for _ in 0..frames {
            if self.frame_loop.state().is_finished() {
                break;
            }
            let _ = self.tick_traced(game, tracer);
        }
        self.frame_loop.state()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "validated windows are at most 4096 pixels on a side"
)]
fn px(v: f64) -> u32 {
    v as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambol_core::backend::Clock;
    use gambol_core::time::HostTime;

    #[test]
    fn unpaced_frames_step_the_clock() {
        let mut host = Headless::new(LoopConfig::headless()).unwrap();
        assert_eq!(host.canvas().width(), 800);
        let _ = host.run(&mut (), 3);
        assert_eq!(host.clock().now(), HostTime(3 * 16_666_666));
        assert_eq!(host.frame_loop().frame_index(), 3);
    }

    #[test]
    fn paced_frames_wait_on_the_clock() {
        let mut host = Headless::new(LoopConfig::desktop()).unwrap();
        let _ = host.run(&mut (), 2);
        assert_eq!(host.clock().now(), HostTime(2 * 33_333_333));
    }

    #[test]
    fn invalid_window_is_rejected() {
        let err = Headless::new(LoopConfig::headless().with_window(10.0, 10.0)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidWindowSize { .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn quit_script_ends_the_run_early() {
        let mut host = Headless::new(LoopConfig::headless()).unwrap();
        host.input().push(gambol_core::input::InputEvent::Quit);
        assert_eq!(host.run(&mut (), 100), LoopState::Quit);
        assert_eq!(host.frame_loop().frame_index(), 1);
    }
}
