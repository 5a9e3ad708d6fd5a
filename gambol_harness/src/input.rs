// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted input.

use std::collections::VecDeque;

use gambol_core::backend::{Clock, InputSource};
use gambol_core::input::{InputEvent, Key};
use gambol_core::time::HostTime;

use crate::ManualClock;

/// A queue of input events, each optionally held back until a clock time.
///
/// Events are delivered in the order they were pushed. A held event also
/// holds back everything behind it.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    queue: VecDeque<(Option<HostTime>, InputEvent)>,
    clock: Option<ManualClock>,
}

impl ScriptedInput {
    /// An empty script whose events are all delivered at once.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty script that releases timed events by `clock`.
    #[must_use]
    pub fn timed(clock: ManualClock) -> Self {
        Self {
            queue: VecDeque::new(),
            clock: Some(clock),
        }
    }

    /// Queues an event for the next poll.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back((None, event));
    }

    /// Queues an event held until the clock reaches `at`. Without a clock
    /// the time is ignored.
    pub fn push_at(&mut self, at: HostTime, event: InputEvent) {
        self.queue.push_back((Some(at), event));
    }

    /// Queues a key press and release.
    pub fn tap(&mut self, key: Key) {
        self.push(InputEvent::KeyDown(key));
        self.push(InputEvent::KeyUp(key));
    }

    /// Events still queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether every event was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Extend<InputEvent> for ScriptedInput {
    fn extend<T: IntoIterator<Item = InputEvent>>(&mut self, iter: T) {
        self.queue.extend(iter.into_iter().map(|e| (None, e)));
    }
}

impl FromIterator<InputEvent> for ScriptedInput {
    fn from_iter<T: IntoIterator<Item = InputEvent>>(iter: T) -> Self {
        let mut input = Self::new();
        input.extend(iter);
        input
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<InputEvent> {
        let &(at, _) = self.queue.front()?;
        if let (Some(at), Some(clock)) = (at, &self.clock)
            && clock.now() < at
        {
            return None;
        }
        self.queue.pop_front().map(|(_, e)| e)
    }
}
