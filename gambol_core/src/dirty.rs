// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for formations.
//!
//! A [`Scene`](crate::scene::Scene) records "follower depends on leader"
//! edges in an [`understory_dirty`] tracker, one edge per channel below.
//! Both channels are marked with [`EagerPolicy`](understory_dirty::EagerPolicy),
//! so touching a leader marks every follower, transitively. Draining a channel
//! yields leaders before their followers, which is the order followers must
//! be synchronized in.

use understory_dirty::Channel;

/// Position changed; followers must be re-anchored.
pub const POSITION: Channel = Channel::new(0);

/// Hidden flag changed; followers inherit it.
pub const VISIBILITY: Channel = Channel::new(1);
