// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Four dancers trace squares around a partner on a circle, with a
//! wingman trailing the lead.
//!
//! ```text
//! square_dance [--frames N] [--trace TRACE.json]
//! ```
//!
//! Runs headless for `N` frames (default 300). With `--trace` the run is
//! recorded and exported in Chrome trace format; otherwise frame summaries
//! go to stderr. Set `RUST_LOG=debug` for loop diagnostics.

use std::error::Error;
use std::f64::consts::FRAC_PI_2;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;

use gambol_core::config::LoopConfig;
use gambol_core::entity::Entity;
use gambol_core::frame::FrameContext;
use gambol_core::game::{Control, Game};
use gambol_core::image::{Color, Image};
use gambol_core::path::{LoopCount, shapes};
use gambol_core::scene::{EntityId, Scene};
use gambol_core::trace::Tracer;
use gambol_debug::chrome;
use gambol_debug::pretty::PrettyPrintSink;
use gambol_debug::recorder::RecorderSink;
use gambol_harness::Headless;
use kurbo::{Point, Vec2};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Frames to run
    #[arg(short, long, default_value_t = 300)]
    frames: u64,
    /// Write a Chrome trace of the run here instead of printing summaries
    #[arg(short, long)]
    trace: Option<PathBuf>,
}

/// Counts the frames on which any dancer touches the partner.
#[derive(Debug)]
struct Dance {
    dancers: Vec<EntityId>,
    partner: EntityId,
    touches: u64,
}

impl Game for Dance {
    fn check_collisions(&mut self, scene: &mut Scene, ctx: &FrameContext, _: &mut Control) {
        if self.dancers.iter().any(|&d| scene.collide(d, self.partner)) {
            self.touches += 1;
            log::trace!("frame {}: partner touched", ctx.frame_index);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Args { frames, trace } = Args::parse();

    let mut host = Headless::new(LoopConfig::headless())?;
    let mut dance = stage(&mut host)?;

    match trace {
        Some(path) => {
            let mut sink = RecorderSink::new();
            let mut tracer = Tracer::new(&mut sink);
            let _ = host.run_traced(&mut dance, frames, &mut tracer);
            drop(tracer);
            let mut out = BufWriter::new(File::create(&path)?);
            chrome::export(sink.as_bytes(), &mut out)?;
            log::info!(
                "recorded {} bytes of trace, exported to {}",
                sink.as_bytes().len(),
                path.display()
            );
        }
        None => {
            let mut sink = PrettyPrintSink::stderr().summaries_only();
            let mut tracer = Tracer::new(&mut sink);
            let _ = host.run_traced(&mut dance, frames, &mut tracer);
        }
    }

    let scene = host.frame_loop().scene();
    for &id in &dance.dancers {
        log::info!("{id:?} finished at {:?}", scene.get(id).position());
    }
    log::info!(
        "{} frames, partner touched on {} of them",
        host.frame_loop().frame_index(),
        dance.touches
    );
    Ok(())
}

/// Spawns the dancers and returns the game that watches them.
fn stage(host: &mut Headless) -> Result<Dance, Box<dyn Error>> {
    let colors = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE];
    let center = Point::new(400.0, 300.0);
    let fl = host.frame_loop_mut();

    let mut dancers = Vec::new();
    for (i, color) in colors.into_iter().enumerate() {
        // Each dancer starts on its own corner, facing the next one.
        let heading = FRAC_PI_2 * i as f64;
        let start = center + Vec2::from_angle(-heading) * 120.0;
        let path = shapes::square(start, heading + FRAC_PI_2, 120.0, 240, true, Some(4.0))?
            .with_loops(LoopCount::Forever)?;
        let sprite = Rc::new(Image::solid(12, 12, color));
        dancers.push(fl.spawn(Entity::new(sprite, path).centered(), 1));
    }

    let circle = shapes::circle(center, 0.0, 60.0, 180, false, Some(3.0))?
        .with_loops(LoopCount::Forever)?;
    let partner = fl.spawn(
        Entity::new(Rc::new(Image::solid(16, 16, Color::GREEN)), circle).centered(),
        0,
    );

    let wing = fl.spawn(
        Entity::at(Rc::new(Image::solid(6, 6, Color::RED)), Point::ZERO),
        0,
    );
    fl.scene_mut().follow(wing, dancers[0], Vec2::new(-16.0, 0.0));

    log::debug!("staged {} dancers around {center:?}", dancers.len());
    Ok(Dance {
        dancers,
        partner,
        touches: 0,
    })
}
