// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction and load errors.
//!
//! Path exhaustion is not an error: it is reported through
//! [`Advance::Exhausted`](crate::path::Advance::Exhausted). The types here
//! cover the two failure classes that abort setup: bad parameters and
//! resources that could not be loaded.

use alloc::string::String;

use thiserror::Error;

/// Which coordinate a bound applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Horizontal velocity.
    Vx,
    /// Vertical velocity.
    Vy,
}

impl core::fmt::Display for Axis {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Vx => "vx",
            Self::Vy => "vy",
        })
    }
}

/// Invalid parameters passed to a constructor or setter.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A parametric path was asked for zero steps.
    #[error("steps must be at least 1")]
    ZeroSteps,
    /// A waypoint path was given no waypoints.
    #[error("waypoint list is empty")]
    EmptyWaypoints,
    /// A duration was zero, negative, or not finite.
    #[error("duration must be positive and finite, got {duration}")]
    InvalidDuration {
        /// The rejected value, in seconds.
        duration: f64,
    },
    /// A restriction's minimum exceeds its maximum.
    #[error("{axis} bounds are inverted: min {min} > max {max}")]
    InvalidBounds {
        /// Which bound.
        axis: Axis,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// A speed cap was negative or not finite.
    #[error("speed cap must be non-negative, got {cap}")]
    NegativeSpeedCap {
        /// The rejected cap.
        cap: f64,
    },
    /// A random walk was given a jump size of zero.
    #[error("random walk jump size must be at least 1")]
    InvalidJump,
    /// A finite loop count of zero.
    #[error("loop count must be at least 1 (or forever)")]
    ZeroLoops,
    /// A composite entry was given a repeat count of zero.
    #[error("composite entry {index} has a repeat count of zero")]
    ZeroRepeat {
        /// Position of the entry in the composite.
        index: usize,
    },
    /// A composite path was given no sub-paths.
    #[error("composite path has no sub-paths")]
    EmptyComposite,
    /// A frame set was given no images.
    #[error("frame set has no images")]
    EmptyFrames,
    /// A random drift was given an inverted speed range.
    #[error("speed range is inverted: min {min} > max {max}")]
    InvalidSpeedRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// A frame rate of zero.
    #[error("max_fps must be at least 1")]
    InvalidFrameRate,
    /// A window size outside the supported range.
    #[error("window size {width}x{height} is outside 320x240..=4096x4096")]
    InvalidWindowSize {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
}

/// Why a resource failed to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The file does not exist.
    Missing,
    /// The file exists but could not be read.
    Unreadable,
    /// A line could not be parsed (1-based line number).
    Malformed {
        /// 1-based line number of the first bad line.
        line: usize,
    },
}

/// A resource (waypoint file, image) could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("could not load {name}: {}", describe(.kind))]
pub struct LoadError {
    /// The filename or cache key that failed.
    pub name: String,
    /// What went wrong.
    pub kind: LoadErrorKind,
}

impl LoadError {
    /// Creates a load error for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: LoadErrorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

fn describe(kind: &LoadErrorKind) -> String {
    use alloc::format;
    match kind {
        LoadErrorKind::Missing => String::from("file not found"),
        LoadErrorKind::Unreadable => String::from("file could not be read"),
        LoadErrorKind::Malformed { line } => format!("malformed line {line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn load_error_names_the_file() {
        let err = LoadError::new("square.pts", LoadErrorKind::Malformed { line: 3 });
        let msg = err.to_string();
        assert!(msg.contains("square.pts"), "message was {msg}");
        assert!(msg.contains("line 3"), "message was {msg}");
    }

    #[test]
    fn config_error_names_the_parameter() {
        let err = ConfigError::InvalidBounds {
            axis: Axis::X,
            min: 10.0,
            max: 0.0,
        };
        assert_eq!(err.to_string(), "x bounds are inverted: min 10 > max 0");
    }
}
