// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame loop configuration.

use kurbo::Size;

use crate::error::ConfigError;
use crate::input::Key;
use crate::time::Duration;

/// What the frame loop does with an entity whose trajectory exhausts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExhaustionPolicy {
    /// Restart the trajectory from its constructed state.
    #[default]
    Reset,
    /// Leave the entity where it is and stop moving it.
    Freeze,
    /// Kill the entity.
    Remove,
}

/// Settings for a [`FrameLoop`](crate::game::FrameLoop).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopConfig {
    /// Window (render target) size in pixels.
    pub window: Size,
    /// Frame rate cap. Also the nominal rate when pacing is off.
    pub max_fps: u32,
    /// Largest frame delta handed to trajectories.
    pub max_tick: Duration,
    /// Whether to wait for the clock between frames.
    pub pace: bool,
    /// Releasing this key opens the configuration loop.
    pub config_key: Option<Key>,
    /// Default handling of exhausted trajectories.
    pub exhaustion: ExhaustionPolicy,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

impl LoopConfig {
    /// Smallest accepted window.
    pub const MIN_WINDOW: Size = Size::new(320.0, 240.0);
    /// Largest accepted window.
    pub const MAX_WINDOW: Size = Size::new(4096.0, 4096.0);

    /// An 800×600 window paced at 30 frames per second.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            window: Size::new(800.0, 600.0),
            max_fps: 30,
            max_tick: Duration::from_millis(50),
            pace: true,
            config_key: Some(Key::ESCAPE),
            exhaustion: ExhaustionPolicy::Reset,
        }
    }

    /// No pacing and a nominal 60 frames per second, for tests and
    /// offline runs.
    #[must_use]
    pub const fn headless() -> Self {
        Self {
            max_fps: 60,
            pace: false,
            ..Self::desktop()
        }
    }

    /// Sets the window size.
    #[must_use]
    pub const fn with_window(mut self, width: f64, height: f64) -> Self {
        self.window = Size::new(width, height);
        self
    }

    /// Sets the exhaustion policy.
    #[must_use]
    pub const fn with_exhaustion(mut self, policy: ExhaustionPolicy) -> Self {
        self.exhaustion = policy;
        self
    }

    /// Nominal duration of one frame.
    ///
    /// # Panics
    ///
    /// Panics if `max_fps` is zero; [`validate`](Self::validate) rejects that.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        Duration::per_frame(self.max_fps)
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_fps == 0 {
            return Err(ConfigError::InvalidFrameRate);
        }
        let Size { width, height } = self.window;
        let fits = |v: f64, lo: f64, hi: f64| v.is_finite() && v >= lo && v <= hi;
        if !fits(width, Self::MIN_WINDOW.width, Self::MAX_WINDOW.width)
            || !fits(height, Self::MIN_WINDOW.height, Self::MAX_WINDOW.height)
        {
            return Err(ConfigError::InvalidWindowSize { width, height });
        }
        Ok(())
    }
}
