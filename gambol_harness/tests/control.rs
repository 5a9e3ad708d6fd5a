// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loop states, input, and game hooks under scripted input.

use std::rc::Rc;

use gambol_core::backend::Clock;
use gambol_core::config::LoopConfig;
use gambol_core::entity::Entity;
use gambol_core::frame::FrameContext;
use gambol_core::game::{ConfigSession, Control, Game, LoopState};
use gambol_core::image::{Color, Image};
use gambol_core::input::{InputEvent, Key};
use gambol_core::path::Kinematic;
use gambol_core::scene::{EntityId, Scene};
use gambol_core::time::{Duration, HostTime};
use gambol_core::trace::Tracer;
use gambol_debug::recorder::{RecordedEvent, RecorderSink, decode};
use gambol_harness::{Headless, PacingStats};
use kurbo::{Point, Vec2};

fn sprite() -> Rc<Image> {
    Rc::new(Image::solid(8, 8, Color::WHITE))
}

fn mover(at: Point, v: Vec2) -> Entity {
    Entity::new(sprite(), Kinematic::new(at).with_velocity(v))
}

fn ms(n: u64) -> HostTime {
    HostTime(0) + Duration::from_millis(n)
}

fn state_changes(bytes: &[u8]) -> Vec<(LoopState, LoopState)> {
    decode(bytes)
        .filter_map(|e| match e {
            RecordedEvent::StateChange(e) => Some((e.from, e.to)),
            _ => None,
        })
        .collect()
}

#[test]
fn scripted_quit_ends_the_run() {
    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    host.input().push_at(ms(100), InputEvent::Quit);
    assert_eq!(host.run(&mut (), 1000), LoopState::Quit);
    // Frame 8 is the first to start after 100 ms.
    assert_eq!(host.frame_loop().frame_index(), 8);
}

#[test]
fn pause_key_freezes_the_scene() {
    /// `P` toggles pause.
    struct Pauser;
    impl Game for Pauser {
        fn handle_event(&mut self, event: &InputEvent, _: &mut Scene, control: &mut Control) {
            if *event == InputEvent::KeyDown(Key::from_char('p')) {
                control.pause();
            }
            if *event == InputEvent::KeyDown(Key::from_char('r')) {
                control.resume();
            }
        }
    }

    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    let id = host
        .frame_loop_mut()
        .spawn(mover(Point::new(100.0, 100.0), Vec2::new(60.0, 0.0)), 0);
    host.input()
        .push_at(ms(100), InputEvent::KeyDown(Key::from_char('p')));
    host.input()
        .push_at(ms(1100), InputEvent::KeyDown(Key::from_char('r')));

    let mut sink = RecorderSink::new();
    let mut tracer = Tracer::new(&mut sink);
    let _ = host.run_traced(&mut Pauser, 30, &mut tracer);
    assert_eq!(host.frame_loop().state(), LoopState::Paused);
    let held = host.frame_loop().scene().get(id).position();
    let _ = host.run_traced(&mut Pauser, 30, &mut tracer);
    assert_eq!(
        host.frame_loop().scene().get(id).position(),
        held,
        "nothing moves while paused"
    );
    let _ = host.run_traced(&mut Pauser, 30, &mut tracer);
    drop(tracer);

    assert_eq!(host.frame_loop().state(), LoopState::Running);
    // Resumed in frame 68; the first frame after that measures no delta,
    // and the 21 after it move a pixel each.
    let moved = host.frame_loop().scene().get(id).position().x - held.x;
    assert!(moved > 20.0 && moved < 22.0, "moved {moved}");
    assert_eq!(
        state_changes(sink.as_bytes()),
        [
            (LoopState::Running, LoopState::Paused),
            (LoopState::Paused, LoopState::Running),
        ]
    );
}

#[test]
fn config_key_runs_the_configuration_loop() {
    /// Records the keys it sees until Return.
    #[derive(Default)]
    struct Menu {
        keys: Vec<Key>,
        during: Option<bool>,
    }
    impl Game for Menu {
        fn configure(&mut self, session: &mut ConfigSession<'_>) {
            self.during = Some(session.scene().is_paused());
            while let Some(ev) = session.next_event(Duration::from_millis(2000)) {
                if let InputEvent::KeyDown(k) = ev {
                    if k == Key::RETURN {
                        break;
                    }
                    self.keys.push(k);
                }
            }
        }
    }

    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    let id = host
        .frame_loop_mut()
        .spawn(mover(Point::new(100.0, 100.0), Vec2::new(60.0, 0.0)), 0);
    host.input().push_at(ms(50), InputEvent::KeyUp(Key::ESCAPE));
    host.input().push_at(ms(300), InputEvent::KeyDown(Key::from_char('a')));
    host.input().push_at(ms(600), InputEvent::KeyDown(Key::RETURN));

    let mut menu = Menu::default();
    let mut sink = RecorderSink::new();
    let mut tracer = Tracer::new(&mut sink);
    let _ = host.run_traced(&mut menu, 10, &mut tracer);
    drop(tracer);

    assert_eq!(menu.keys, [Key::from_char('a')]);
    assert_eq!(menu.during, Some(true), "scene paused during configuration");
    assert!(!host.frame_loop().scene().is_paused(), "resumed afterwards");
    assert_eq!(host.frame_loop().state(), LoopState::Running);
    assert!(host.clock().now() >= ms(600), "configuration waited on the clock");

    // The half second spent configuring is not integrated.
    let x = host.frame_loop().scene().get(id).position().x;
    assert!(x < 110.0, "x = {x}");
    assert_eq!(
        state_changes(sink.as_bytes()),
        [
            (LoopState::Running, LoopState::AwaitingConfig),
            (LoopState::AwaitingConfig, LoopState::Running),
        ]
    );
}

#[test]
fn quitting_from_configuration_is_terminal() {
    struct Leave;
    impl Game for Leave {
        fn configure(&mut self, session: &mut ConfigSession<'_>) {
            let _ = session.next_event(Duration::from_millis(1000));
        }
    }

    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    host.input().push(InputEvent::KeyUp(Key::ESCAPE));
    host.input().push(InputEvent::Quit);
    assert_eq!(host.run(&mut Leave, 10), LoopState::Quit);
}

#[test]
fn stop_returns_control_and_resume_continues() {
    struct StopAt(u64);
    impl Game for StopAt {
        fn check_collisions(&mut self, _: &mut Scene, ctx: &FrameContext, control: &mut Control) {
            if ctx.frame_index == self.0 {
                control.stop();
            }
        }
    }

    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    assert_eq!(host.run(&mut StopAt(5), 100), LoopState::Stopped);
    assert_eq!(host.frame_loop().frame_index(), 5);
    host.frame_loop_mut().resume();
    assert_eq!(host.run(&mut StopAt(5), 10), LoopState::Running);
    assert_eq!(host.frame_loop().frame_index(), 15);
}

#[test]
fn solid_sprites_are_pushed_apart() {
    struct Walls(EntityId, EntityId, u32);
    impl Game for Walls {
        fn check_collisions(&mut self, scene: &mut Scene, _: &FrameContext, _: &mut Control) {
            if scene.collide(self.0, self.1) && scene.solid(self.0, self.1, false) {
                self.2 += 1;
            }
        }
    }

    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    let fl = host.frame_loop_mut();
    let runner = fl.spawn(mover(Point::new(100.0, 100.0), Vec2::new(120.0, 0.0)), 0);
    let wall = fl.spawn(Entity::at(sprite(), Point::new(130.0, 100.0)), 0);
    let mut game = Walls(runner, wall, 0);

    let _ = host.run(&mut game, 60);

    let scene = host.frame_loop().scene();
    assert!(game.2 > 0, "they met");
    assert!(!scene.collide(runner, wall), "still overlapping");
    assert_eq!(scene.get(wall).position(), Point::new(130.0, 100.0), "wall held");
    assert!(scene.get(runner).rect().x1 <= 130.0, "runner stopped at the wall");
}

#[test]
fn wait_for_key_with_timeout() {
    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    host.input().push_at(ms(250), InputEvent::KeyDown(Key::from_char('x')));
    host.input().push_at(ms(400), InputEvent::KeyDown(Key::SPACE));

    let fl = host.frame_loop_mut();
    assert!(fl.wait_for(Key::SPACE, Duration::from_millis(1000)), "pressed");
    assert!(fl.clock().now() >= ms(400), "waited for it");
    assert!(
        !fl.wait_for(Key::SPACE, Duration::from_millis(100)),
        "times out"
    );
    assert_eq!(fl.state(), LoopState::Running);
}

#[test]
fn stalls_are_capped() {
    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    let id = host
        .frame_loop_mut()
        .spawn(mover(Point::new(100.0, 100.0), Vec2::new(100.0, 0.0)), 0);
    let mut stats = PacingStats::<8>::new();

    let mut tracer = Tracer::new(&mut stats);
    let _ = host.tick_traced(&mut (), &mut tracer);
    host.clock().advance(Duration::from_millis(5000));
    let _ = host.tick_traced(&mut (), &mut tracer);
    drop(tracer);

    let x = host.frame_loop().scene().get(id).position().x;
    // A five second stall moves by at most the 50 ms cap.
    assert!((x - 105.0).abs() < 1e-6, "x = {x}");
    assert_eq!(stats.frames(), 2);
    assert_eq!(stats.capped(), 1);
}
