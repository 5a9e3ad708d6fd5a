// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waypoint files on disk.

use std::fs;
use std::rc::Rc;

use gambol_core::config::LoopConfig;
use gambol_core::entity::Entity;
use gambol_core::error::LoadErrorKind;
use gambol_core::image::{Color, Image};
use gambol_core::path::{Waypoints, load_waypoints};
use gambol_harness::Headless;
use kurbo::Point;

#[test]
fn loaded_waypoints_drive_an_entity() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("zigzag.txt");
    fs::write(&file, "(10, 20)\n(30, 40)\n\n(50,60)\n").unwrap();

    let places = load_waypoints(&file).unwrap();
    assert_eq!(
        places,
        [
            Point::new(10.0, 20.0),
            Point::new(30.0, 40.0),
            Point::new(50.0, 60.0),
        ]
    );

    let mut host = Headless::new(LoopConfig::headless()).unwrap();
    let path = Waypoints::new(places, None).unwrap();
    let id = host
        .frame_loop_mut()
        .spawn(Entity::new(Rc::new(Image::solid(4, 4, Color::WHITE)), path), 0);
    let _ = host.run(&mut (), 2);
    assert_eq!(
        host.frame_loop().scene().get(id).position(),
        Point::new(30.0, 40.0),
        "one waypoint per frame"
    );
}

#[test]
fn missing_file_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nowhere.txt");
    let err = load_waypoints(&file).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::Missing);
    assert!(
        err.to_string().contains("nowhere.txt"),
        "message was {err}"
    );
}

#[test]
fn malformed_line_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.txt");
    fs::write(&file, "(1, 2)\n(3; 4)\n(5, 6)\n").unwrap();
    let err = load_waypoints(&file).unwrap_err();
    assert_eq!(err.kind, LoadErrorKind::Malformed { line: 2 });
}
