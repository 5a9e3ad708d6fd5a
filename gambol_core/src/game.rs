// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame loop.
//!
//! [`FrameLoop`] owns the host collaborators, a [`Scene`], and the [`Layer`]
//! everything is drawn over. Each [`tick`](FrameLoop::tick) runs one frame:
//!
//! ```text
//!   clear ──► events ──► move ──► collide ──► draw ──► present ──► pace
//! ```
//!
//! Clear runs for every driven group before any group draws, so a sprite
//! cleared late never erases pixels another sprite already drew this frame.
//!
//! # States
//!
//! ```text
//!             pause()                 config key released
//!   Paused ◄────────── Running ─────────────────────────► AwaitingConfig
//!      │   resume()      ▲  │                                  │
//!      └─────────────────┘  │ stop()        configure returns  │
//!                           ▼                                  │
//!                        Stopped        Running ◄──────────────┘
//!
//!   any state ── Quit event ──► Quit (terminal)
//! ```
//!
//! `Stopped` ends a finite sub-loop and can be resumed; `Quit` cannot.

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};

use crate::backend::{Clock, InputSource, RenderTarget};
use crate::config::{ExhaustionPolicy, LoopConfig};
use crate::damage::DamageRegion;
use crate::entity::Entity;
use crate::error::ConfigError;
use crate::frame::{FrameClock, FrameContext};
use crate::image::Color;
use crate::input::{InputEvent, Key};
use crate::layer::Layer;
use crate::scene::{EntityId, GroupId, Scene};
use crate::time::{Duration, HostTime};
use crate::trace::{
    ExhaustedEvent, FrameSummaryBuilder, FrameTickEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, PresentEvent, StateChangeEvent, Tracer,
};

// ---------------------------------------------------------------------------
// LoopState / Control
// ---------------------------------------------------------------------------

/// Where the frame loop is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Frames run normally.
    Running,
    /// Frames only drain input; nothing moves or draws.
    Paused,
    /// The game's configuration loop is running.
    AwaitingConfig,
    /// The loop ended and returned control to its caller. Can be resumed.
    Stopped,
    /// The user quit. Terminal.
    Quit,
}

impl LoopState {
    /// Whether [`FrameLoop::run`] returns in this state.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Stopped | Self::Quit)
    }
}

/// Requests a game hook makes of the loop. Applied after the hook returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Control {
    stop: bool,
    quit: bool,
    pause: bool,
    resume: bool,
}

impl Control {
    /// Ends the loop after this frame without quitting.
    pub fn stop(&mut self) {
        self.stop = true;
    }

    /// Quits.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Pauses the loop.
    pub fn pause(&mut self) {
        self.pause = true;
    }

    /// Resumes a paused loop.
    pub fn resume(&mut self) {
        self.resume = true;
    }

    /// The state these requests lead to from `from`.
    fn apply(self, from: LoopState) -> LoopState {
        if self.quit {
            LoopState::Quit
        } else if self.stop {
            LoopState::Stopped
        } else if self.pause {
            LoopState::Paused
        } else if self.resume && from == LoopState::Paused {
            LoopState::Running
        } else {
            from
        }
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Game logic plugged into a [`FrameLoop`]. Every hook defaults to doing
/// nothing.
pub trait Game {
    /// Called for every input event, in arrival order. The loop handles
    /// [`InputEvent::Quit`] and the config key itself; they are still
    /// passed on.
    fn handle_event(&mut self, event: &InputEvent, scene: &mut Scene, control: &mut Control) {
        _ = (event, scene, control);
    }

    /// Called once per frame after every group moved.
    fn check_collisions(&mut self, scene: &mut Scene, ctx: &FrameContext, control: &mut Control) {
        _ = (scene, ctx, control);
    }

    /// Runs the configuration loop. Entities are paused while this runs and
    /// the time spent is not integrated.
    fn configure(&mut self, session: &mut ConfigSession<'_>) {
        _ = session;
    }

    /// Overrides the loop's [`ExhaustionPolicy`] for one exhausted entity.
    fn on_exhausted(&mut self, scene: &mut Scene, id: EntityId) -> Option<ExhaustionPolicy> {
        _ = (scene, id);
        None
    }
}

impl Game for () {}

// ---------------------------------------------------------------------------
// ConfigSession
// ---------------------------------------------------------------------------

/// What [`Game::configure`] works with: the scene and a blocking event
/// queue.
pub struct ConfigSession<'a> {
    scene: &'a mut Scene,
    input: &'a mut dyn InputSource,
    clock: &'a mut dyn Clock,
    poll_interval: Duration,
    quit: bool,
}

impl fmt::Debug for ConfigSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSession")
            .field("poll_interval", &self.poll_interval)
            .field("quit", &self.quit)
            .finish_non_exhaustive()
    }
}

impl ConfigSession<'_> {
    /// The scene. Its groups do not move while the session runs.
    pub fn scene(&mut self) -> &mut Scene {
        self.scene
    }

    /// Waits up to `timeout` for the next input event.
    ///
    /// An [`InputEvent::Quit`] is returned like any other event and also
    /// makes the loop quit once the session ends.
    pub fn next_event(&mut self, timeout: Duration) -> Option<InputEvent> {
        next_event(
            self.input,
            self.clock,
            self.poll_interval,
            timeout,
            &mut self.quit,
        )
    }

    /// Quits the loop once the session ends.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Whether the loop will quit once the session ends.
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// Polls `input` until an event arrives or `timeout` passes, sleeping on
/// `clock` in `interval` steps.
fn next_event(
    input: &mut dyn InputSource,
    clock: &mut dyn Clock,
    interval: Duration,
    timeout: Duration,
    quit: &mut bool,
) -> Option<InputEvent> {
    let deadline = clock.now() + timeout;
    loop {
        if let Some(ev) = input.poll() {
            if ev == InputEvent::Quit {
                *quit = true;
            }
            return Some(ev);
        }
        let now = clock.now();
        if now >= deadline {
            return None;
        }
        clock.wait_until((now + interval).min(deadline));
    }
}

// ---------------------------------------------------------------------------
// FrameLoop
// ---------------------------------------------------------------------------

/// Drives a [`Scene`] one frame at a time.
pub struct FrameLoop<T, I, C> {
    config: LoopConfig,
    target: T,
    input: I,
    clock: C,
    scene: Scene,
    layer: Layer,
    stage: GroupId,
    groups: Vec<GroupId>,
    state: LoopState,
    frame_clock: FrameClock,
    frame_index: u64,
    deadline: Option<HostTime>,
    painted: bool,
    damage: DamageRegion,
    warned: BTreeSet<EntityId>,
}

impl<T, I, C> fmt::Debug for FrameLoop<T, I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("frame_index", &self.frame_index)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl<T: RenderTarget, I: InputSource, C: Clock> FrameLoop<T, I, C> {
    /// Creates a loop over a black background the size of the window.
    ///
    /// The loop starts `Running` with one driven group, the
    /// [`stage`](Self::stage).
    pub fn new(config: LoopConfig, target: T, input: I, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut scene = Scene::new();
        let stage = scene.create_group();
        let viewport = Rect::from_origin_size(Point::ZERO, config.window);
        log::debug!(
            "frame loop: {}x{} at {} fps, dt cap {:?}",
            config.window.width,
            config.window.height,
            config.max_fps,
            config.max_tick
        );
        Ok(Self {
            config,
            target,
            input,
            clock,
            scene,
            layer: Layer::solid(viewport, Color::BLACK),
            stage,
            groups: vec![stage],
            state: LoopState::Running,
            frame_clock: FrameClock::new(config.max_tick),
            frame_index: 0,
            deadline: None,
            painted: false,
            damage: DamageRegion::None,
            warned: BTreeSet::new(),
        })
    }

    // -- Accessors --

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Frames run so far.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene.
    #[must_use]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The background layer.
    #[must_use]
    pub const fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Replaces the background layer. It is painted in full on the next
    /// frame.
    pub fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
        self.painted = false;
    }

    /// Refills the background. It is painted in full on the next frame.
    pub fn fill_background(&mut self, color: Color) {
        self.layer.fill(color);
        self.painted = false;
    }

    /// The render target.
    #[must_use]
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Mutable access to the render target.
    #[must_use]
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Mutable access to the input source.
    #[must_use]
    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// The clock.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock.
    #[must_use]
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Gives back the collaborators.
    pub fn into_parts(self) -> (T, I, C) {
        (self.target, self.input, self.clock)
    }

    // -- Groups --

    /// The group created with the loop. Always driven.
    #[must_use]
    pub const fn stage(&self) -> GroupId {
        self.stage
    }

    /// Adds `entity` to the stage at `level`.
    pub fn spawn(&mut self, entity: Entity, level: i32) -> EntityId {
        let id = self.scene.spawn(entity);
        self.scene.add(self.stage, id, level);
        id
    }

    /// Has every frame clear, move, and draw `group`, after the groups
    /// already driven. Driving a group twice has no effect.
    pub fn drive(&mut self, group: GroupId) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    /// Stops driving `group`. The stage cannot be released.
    pub fn release(&mut self, group: GroupId) {
        if group != self.stage {
            self.groups.retain(|&g| g != group);
        }
    }

    /// Driven groups in frame order.
    #[must_use]
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    // -- State control --

    /// Ends the loop after the current frame. [`resume`](Self::resume)
    /// starts it again.
    pub fn stop(&mut self) {
        self.transition(LoopState::Stopped, &mut Tracer::none());
    }

    /// Pauses: frames drain input but nothing moves or draws.
    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            self.transition(LoopState::Paused, &mut Tracer::none());
        }
    }

    /// Resumes a paused or stopped loop. Time spent paused is discarded.
    pub fn resume(&mut self) {
        if matches!(self.state, LoopState::Paused | LoopState::Stopped) {
            self.frame_clock.resync();
            self.deadline = None;
            self.transition(LoopState::Running, &mut Tracer::none());
        }
    }

    // -- Running --

    /// Runs frames until the loop stops or quits, or `frames` frames have
    /// run. Returns the final state.
    pub fn run(&mut self, game: &mut impl Game, frames: Option<u64>) -> LoopState {
        self.run_traced(game, frames, &mut Tracer::none())
    }

    /// [`run`](Self::run) with tracing.
    pub fn run_traced(
        &mut self,
        game: &mut impl Game,
        frames: Option<u64>,
        tracer: &mut Tracer<'_>,
    ) -> LoopState {
        let mut ran = 0;
        while !self.state.is_finished() && frames.is_none_or(|n| ran < n) {
            let _ = self.tick_traced(game, tracer);
            ran += 1;
        }
        self.state
    }

    /// Runs one frame and returns the resulting state.
    pub fn tick(&mut self, game: &mut impl Game) -> LoopState {
        self.tick_traced(game, &mut Tracer::none())
    }

    /// [`tick`](Self::tick) with tracing.
    pub fn tick_traced(&mut self, game: &mut impl Game, tracer: &mut Tracer<'_>) -> LoopState {
        if self.state.is_finished() {
            return self.state;
        }

        let now = self.clock.now();
        let delta = self.frame_clock.tick(now);
        self.frame_index += 1;
        let ctx = FrameContext {
            dt: delta.used.as_secs_f64(),
            bounds: self.layer.viewport(),
            frame_index: self.frame_index,
        };
        let tick = FrameTickEvent {
            frame_index: self.frame_index,
            now,
            raw_dt: delta.raw,
            dt: delta.used,
            state: self.state,
        };
        tracer.frame_tick(&tick);
        let mut summary = FrameSummaryBuilder::new(&tick);

        if self.state == LoopState::Paused {
            self.phase(tracer, &mut summary, PhaseKind::Events, true);
            self.events(game, tracer);
            self.phase(tracer, &mut summary, PhaseKind::Events, false);
            if self.state == LoopState::Running {
                // Resumed by an event: the paused span is not integrated.
                self.frame_clock.resync();
            }
            tracer.frame_summary(&summary.finish());
            self.pace();
            return self.state;
        }

        // Clear every group before any group draws.
        self.phase(tracer, &mut summary, PhaseKind::Clear, true);
        if self.painted {
            let cleared = self
                .scene
                .clear_groups(&self.groups, &self.layer, &mut self.target);
            self.damage.merge(&cleared);
        } else {
            let _ = self.layer.paint(&mut self.target);
            self.damage = DamageRegion::Full;
            self.painted = true;
        }
        self.phase(tracer, &mut summary, PhaseKind::Clear, false);

        self.phase(tracer, &mut summary, PhaseKind::Events, true);
        self.events(game, tracer);
        self.phase(tracer, &mut summary, PhaseKind::Events, false);
        if self.state == LoopState::Quit {
            tracer.frame_summary(&summary.finish());
            return self.state;
        }

        self.phase(tracer, &mut summary, PhaseKind::Move, true);
        if self.state == LoopState::Running {
            self.move_groups(game, &ctx, tracer, &mut summary);
        }
        self.phase(tracer, &mut summary, PhaseKind::Move, false);

        self.phase(tracer, &mut summary, PhaseKind::Collide, true);
        if self.state == LoopState::Running {
            let mut control = Control::default();
            game.check_collisions(&mut self.scene, &ctx, &mut control);
            self.scene.propagate();
            let next = control.apply(self.state);
            self.transition(next, tracer);
        }
        self.phase(tracer, &mut summary, PhaseKind::Collide, false);

        // Draw even when the frame paused or stopped, so cleared sprites
        // do not vanish.
        self.phase(tracer, &mut summary, PhaseKind::Draw, true);
        let drawn = self.scene.draw_groups(&self.groups, &mut self.target);
        self.damage.merge(&drawn);
        self.phase(tracer, &mut summary, PhaseKind::Draw, false);

        self.phase(tracer, &mut summary, PhaseKind::Present, true);
        self.present(tracer, &mut summary);
        self.phase(tracer, &mut summary, PhaseKind::Present, false);

        tracer.frame_summary(&summary.finish());
        self.pace();
        self.state
    }

    /// Blocks until `key` is pressed or `timeout` passes. Returns whether
    /// the key arrived. A Quit event ends the wait and quits the loop; other
    /// events are discarded. Time spent waiting is not integrated.
    pub fn wait_for(&mut self, key: Key, timeout: Duration) -> bool {
        let deadline = self.clock.now() + timeout;
        let interval = self.config.frame_duration();
        let mut quit = false;
        let mut found = false;
        loop {
            let now = self.clock.now();
            let left = Duration(deadline.nanos().saturating_sub(now.nanos()));
            match next_event(&mut self.input, &mut self.clock, interval, left, &mut quit) {
                Some(InputEvent::KeyDown(k)) if k == key => {
                    found = true;
                    break;
                }
                Some(InputEvent::Quit) | None => break,
                Some(_) => {}
            }
        }
        if quit {
            self.transition(LoopState::Quit, &mut Tracer::none());
        }
        self.frame_clock.resync();
        self.deadline = None;
        found
    }

    // -- Phases --

    fn events(&mut self, game: &mut impl Game, tracer: &mut Tracer<'_>) {
        let mut control = Control::default();
        let mut configure = false;
        while let Some(ev) = self.input.poll() {
            game.handle_event(&ev, &mut self.scene, &mut control);
            match ev {
                InputEvent::Quit => {
                    control.quit();
                    break;
                }
                InputEvent::KeyUp(k) if Some(k) == self.config.config_key => {
                    // Later events belong to the configuration loop.
                    configure = true;
                    break;
                }
                _ => {}
            }
        }
        let next = control.apply(self.state);
        self.transition(next, tracer);
        if configure && self.state == LoopState::Running {
            self.configure(game, tracer);
        }
    }

    fn configure(&mut self, game: &mut impl Game, tracer: &mut Tracer<'_>) {
        self.transition(LoopState::AwaitingConfig, tracer);
        self.scene.pause();
        let mut session = ConfigSession {
            scene: &mut self.scene,
            input: &mut self.input,
            clock: &mut self.clock,
            poll_interval: self.config.frame_duration(),
            quit: false,
        };
        game.configure(&mut session);
        let quit = session.quit;
        self.scene.unpause();
        self.frame_clock.resync();
        self.deadline = None;
        let next = if quit {
            LoopState::Quit
        } else {
            LoopState::Running
        };
        self.transition(next, tracer);
    }

    fn move_groups(
        &mut self,
        game: &mut impl Game,
        ctx: &FrameContext,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
    ) {
        let exhausted = self.scene.move_groups(&self.groups, ctx).exhausted;
        for id in exhausted {
            if !self.scene.is_alive(id) {
                continue;
            }
            let policy = game
                .on_exhausted(&mut self.scene, id)
                .unwrap_or(self.config.exhaustion);
            if !self.scene.is_alive(id) {
                // The hook removed it.
                continue;
            }
            if self.warned.insert(id) {
                log::warn!("{id:?}: trajectory exhausted, applying {policy:?}");
            }
            match policy {
                ExhaustionPolicy::Reset => {
                    self.scene.get_mut(id).reset_path();
                    self.scene.touch(id);
                }
                ExhaustionPolicy::Freeze => self.scene.get_mut(id).pause(),
                ExhaustionPolicy::Remove => {
                    let _ = self.scene.kill(id);
                    self.warned.remove(&id);
                }
            }
            summary.add_exhausted();
            tracer.exhausted(&ExhaustedEvent {
                frame_index: self.frame_index,
                entity: id,
                policy,
            });
        }
        self.scene.propagate();
    }

    fn present(&mut self, tracer: &mut Tracer<'_>, summary: &mut FrameSummaryBuilder) {
        let rects = self.damage.rects();
        let count = rects.map_or(0, <[Rect]>::len);
        #[cfg(feature = "trace-rich")]
        if let Some(rects) = rects {
            let snapped: Vec<_> = rects
                .iter()
                .map(|&r| crate::trace::DamageRect::from_rect(r))
                .collect();
            tracer.dirty_rects(self.frame_index, &snapped);
        }
        self.target.present(rects);
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        summary.set_dirty_rects(count);
        tracer.present(&PresentEvent {
            frame_index: self.frame_index,
            presented_at: self.clock.now(),
            rect_count: count,
            full: rects.is_none(),
        });
        self.damage.clear();
    }

    /// Waits out the rest of the frame when pacing.
    fn pace(&mut self) {
        if !self.config.pace {
            return;
        }
        let now = self.clock.now();
        let frame = self.config.frame_duration();
        let deadline = self.deadline.unwrap_or(now) + frame;
        if deadline > now {
            self.clock.wait_until(deadline);
            self.deadline = Some(deadline);
        } else {
            // Behind schedule: start over instead of rushing to catch up.
            self.deadline = Some(now);
        }
    }

    fn phase(
        &self,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
        phase: PhaseKind,
        begin: bool,
    ) {
        let timestamp = self.clock.now();
        if begin {
            summary.phase_begin(phase, timestamp);
            tracer.phase_begin(&PhaseBeginEvent {
                frame_index: self.frame_index,
                phase,
                timestamp,
            });
        } else {
            summary.phase_end(phase, timestamp);
            tracer.phase_end(&PhaseEndEvent {
                frame_index: self.frame_index,
                phase,
                timestamp,
            });
        }
    }

    fn transition(&mut self, to: LoopState, tracer: &mut Tracer<'_>) {
        let from = self.state;
        if from == to || from == LoopState::Quit {
            return;
        }
        log::debug!("frame {}: {from:?} -> {to:?}", self.frame_index);
        self.state = to;
        tracer.state_change(&StateChangeEvent {
            frame_index: self.frame_index,
            from,
            to,
        });
    }
}
