// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positioned, drawable, collidable sprites.
//!
//! An [`Entity`] owns one [`Trajectory`] and shares one [`Image`]. Its
//! *position* is a logical anchor; the *placement rectangle* is the image
//! rectangle whose top-left corner sits at `position - anchor`. A separate
//! *collision rectangle* (by default the placement rectangle) is centered on
//! the placement rectangle and is the only thing overlap tests look at.
//!
//! Per frame an entity is cleared, advanced, and drawn, in that order, and
//! every entity sharing a render target must be cleared before any is
//! drawn (see [`Scene`](crate::scene::Scene)).

use alloc::rc::Rc;

use kurbo::{Point, Rect, Size, Vec2};

use crate::backend::RenderTarget;
use crate::frames::Frames;
use crate::geometry;
use crate::image::Image;
use crate::layer::Layer;
use crate::path::{Advance, Motion, Trajectory, heading_between};

/// Edge rules for [`Entity::onscreen_with`].
///
/// Each `Some(slack)` edge is checked: the placement rectangle may extend
/// `slack` pixels past that edge of the viewport (negative slack keeps it
/// further inside). `None` edges are not checked.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    /// Allowed overhang past the left edge.
    pub left: Option<f64>,
    /// Allowed overhang past the right edge.
    pub right: Option<f64>,
    /// Allowed overhang past the top edge.
    pub top: Option<f64>,
    /// Allowed overhang past the bottom edge.
    pub bottom: Option<f64>,
    /// Move the entity back inside when an edge is violated.
    pub jail: bool,
}

impl Edges {
    /// The same slack on all four edges.
    #[must_use]
    pub const fn slack(slack: f64) -> Self {
        Self {
            left: Some(slack),
            right: Some(slack),
            top: Some(slack),
            bottom: Some(slack),
            jail: false,
        }
    }

    /// Also moves the entity back inside.
    #[must_use]
    pub const fn jailed(mut self) -> Self {
        self.jail = true;
        self
    }
}

/// A sprite.
#[derive(Clone, Debug)]
pub struct Entity {
    path: Option<Trajectory>,
    image: Rc<Image>,
    frames: Option<Frames>,
    anchor: Vec2,
    position: Point,
    rect: Rect,
    collision_size: Option<Size>,
    crect: Rect,
    paused: bool,
    hidden: bool,
    drawn: Option<Rect>,
}

impl Entity {
    /// An entity showing `image`, placed where `path` starts.
    ///
    /// The anchor defaults to the image's top-left corner.
    #[must_use]
    pub fn new(image: Rc<Image>, path: impl Into<Trajectory>) -> Self {
        let path = path.into();
        let mut e = Self {
            position: path.position(),
            path: Some(path),
            image,
            frames: None,
            anchor: Vec2::ZERO,
            rect: Rect::ZERO,
            collision_size: None,
            crect: Rect::ZERO,
            paused: false,
            hidden: false,
            drawn: None,
        };
        e.place(e.position);
        e
    }

    /// An entity at rest at `position`.
    #[must_use]
    pub fn at(image: Rc<Image>, position: Point) -> Self {
        Self::new(image, Trajectory::at(position))
    }

    /// Anchors the position at the image center.
    #[must_use]
    pub fn centered(mut self) -> Self {
        let s = self.image.size();
        self.set_anchor(Vec2::new(s.width / 2.0, s.height / 2.0));
        self
    }

    // -- Geometry --

    /// Logical position.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Placement rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Collision rectangle.
    #[must_use]
    pub const fn collision_rect(&self) -> Rect {
        self.crect
    }

    /// Offset from the placement rectangle's top-left corner to the position.
    #[must_use]
    pub const fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Moves the entity to `p`, and its trajectory with it.
    pub fn set_position(&mut self, p: Point) {
        if let Some(path) = &mut self.path {
            path.set_position(p);
        }
        self.place(p);
    }

    /// Moves the entity by `(dx, dy)`.
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        self.set_position(self.position + Vec2::new(dx, dy));
    }

    /// Centers the placement rectangle in `bounds`.
    pub fn center_in(&mut self, bounds: Rect) {
        let shift = bounds.center() - self.rect.center();
        self.set_position(self.position + shift);
    }

    /// Changes the anchor, keeping the position.
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
        self.place(self.position);
    }

    /// Sets the collision rectangle size, or `None` to use the placement
    /// rectangle.
    pub fn set_collision_size(&mut self, size: Option<Size>) {
        self.collision_size = size;
        self.place(self.position);
    }

    /// Distance from this entity's position to `p`.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> f64 {
        self.position.distance(p)
    }

    /// Screen heading from this entity's position to `p`, or `None` if they
    /// coincide.
    #[must_use]
    pub fn direction_to(&self, p: Point) -> Option<f64> {
        heading_between(self.position, p)
    }

    /// Updates the rectangles for position `p` without touching the path.
    fn place(&mut self, p: Point) {
        self.position = p;
        self.rect = Rect::from_origin_size(p - self.anchor, self.image.size());
        self.crect = match self.collision_size {
            Some(s) => Rect::from_center_size(self.rect.center(), s),
            None => self.rect,
        };
    }

    // -- Trajectory --

    /// The trajectory, unless it was taken.
    #[must_use]
    pub fn path(&self) -> Option<&Trajectory> {
        self.path.as_ref()
    }

    /// Mutable access to the trajectory.
    #[must_use]
    pub fn path_mut(&mut self) -> Option<&mut Trajectory> {
        self.path.as_mut()
    }

    /// Replaces the trajectory. The entity stays put until the next move.
    pub fn set_path(&mut self, path: impl Into<Trajectory>) {
        self.path = Some(path.into());
    }

    /// Removes and returns the trajectory.
    pub fn take_path(&mut self) -> Option<Trajectory> {
        self.path.take()
    }

    /// Advances the trajectory by `dt` seconds and moves to the result.
    ///
    /// A paused entity stays where it is. On [`Advance::Exhausted`] the
    /// entity does not move; the caller decides what happens next. With a
    /// frame set attached, the frame for this step is picked here, so the
    /// next draw shows it.
    ///
    /// # Panics
    ///
    /// Panics if the trajectory was taken with [`take_path`](Self::take_path).
    pub fn advance(&mut self, dt: f64) -> Advance {
        if self.paused {
            return Advance::Position(self.position);
        }
        let Some(path) = &mut self.path else {
            panic!("entity has no trajectory to advance");
        };
        let out = path.advance(dt);
        if let Advance::Position(p) = out {
            let heading = path.direction();
            if let Some(image) = self.frames.as_mut().and_then(|f| f.update(dt, heading)) {
                self.show_frame(image);
            }
            self.place(p);
        }
        out
    }

    /// Resets the trajectory and moves back to its start.
    pub fn reset_path(&mut self) {
        if let Some(path) = &mut self.path {
            path.reset();
            let p = path.position();
            self.place(p);
        }
    }

    /// Whether the trajectory has exhausted.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.path.as_ref().is_some_and(Motion::is_exhausted)
    }

    /// Stops [`advance`](Self::advance) from moving the entity.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Lets the entity move again.
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Whether the entity is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    // -- Drawing --

    /// The image.
    #[must_use]
    pub fn image(&self) -> &Rc<Image> {
        &self.image
    }

    /// Mutable access to the image, copying it first if it is shared.
    #[must_use]
    pub fn image_mut(&mut self) -> &mut Image {
        Rc::make_mut(&mut self.image)
    }

    /// Swaps the image. The rectangles follow the new size.
    pub fn set_image(&mut self, image: Rc<Image>) {
        self.image = image;
        self.place(self.position);
    }

    /// Attaches a frame set and shows its current image.
    #[must_use]
    pub fn with_frames(mut self, frames: Frames) -> Self {
        self.set_frames(Some(frames));
        self
    }

    /// Attaches or removes the frame set. A heading-selected set shows the
    /// frame for the trajectory's direction right away. Removing the set
    /// keeps the image last shown.
    pub fn set_frames(&mut self, frames: Option<Frames>) {
        self.frames = frames;
        let heading = self.path.as_ref().map_or(0.0, Motion::direction);
        if let Some(f) = &mut self.frames {
            let _ = f.update(0.0, heading);
            let image = Rc::clone(f.current());
            self.show_frame(image);
            self.place(self.position);
        }
    }

    /// The frame set, if any.
    #[must_use]
    pub fn frames(&self) -> Option<&Frames> {
        self.frames.as_ref()
    }

    /// Swaps in a frame, scaling the anchor with the image so it keeps its
    /// relative spot. Frames of different sizes turn about a centered
    /// anchor.
    fn show_frame(&mut self, image: Rc<Image>) {
        let (old, new) = (self.image.size(), image.size());
        if old.width > 0.0 && old.height > 0.0 {
            self.anchor = Vec2::new(
                self.anchor.x * new.width / old.width,
                self.anchor.y * new.height / old.height,
            );
        }
        self.image = image;
    }

    /// Hides or shows the entity. Hidden entities are not blitted but still
    /// report their rectangle as dirty, so they disappear on the next
    /// present.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Whether the entity is hidden.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Blits the image at the placement rectangle and returns the dirty
    /// rectangle.
    pub fn draw(&mut self, target: &mut dyn RenderTarget) -> Rect {
        self.drawn = Some(self.rect);
        if self.hidden {
            return self.rect;
        }
        target.blit(&self.image, self.rect, None)
    }

    /// Restores `layer`'s background under the rectangle this entity was
    /// last drawn at (or its current rectangle if it was never drawn) and
    /// returns the dirty rectangle.
    pub fn clear(&mut self, layer: &Layer, target: &mut dyn RenderTarget) -> Rect {
        let r = self.drawn.take().unwrap_or(self.rect);
        layer.restore(target, r)
    }

    /// Where the entity was last drawn, until the next clear.
    #[must_use]
    pub const fn drawn_rect(&self) -> Option<Rect> {
        self.drawn
    }

    // -- Collision and containment --

    /// Whether the collision rectangles overlap.
    #[must_use]
    pub fn collide(&self, other: &Self) -> bool {
        geometry::collide(self.crect, other.crect)
    }

    /// Pushes overlapping entities apart.
    ///
    /// If the entities collide, this one first returns to its previous
    /// trajectory position (and so does `other` when `move_both` is set).
    /// While they still overlap, it then steps one pixel per axis away from
    /// `other`'s collision center, and `other` steps away from it when
    /// `move_both` is set. Entities whose centers coincide separate along +x.
    ///
    /// The stepping stops after at most the combined collision extent plus
    /// one iterations. Returns `false` if the entities still overlap at that
    /// point, which only happens when a trajectory pins them together.
    pub fn solid(&mut self, other: &mut Self, move_both: bool) -> bool {
        if !self.collide(other) {
            return true;
        }
        self.step_back();
        if move_both {
            other.step_back();
        }

        let (a, b) = (self.crect, other.crect);
        let budget = (a.width() + b.width()).max(a.height() + b.height());
        let mut steps = 0.0;
        while self.collide(other) {
            if steps > budget {
                log::warn!(
                    "solid: still overlapping after {steps} steps at {:?} and {:?}",
                    self.position,
                    other.position
                );
                return false;
            }
            steps += 1.0;
            let (s, o) = (self.crect.center(), other.crect.center());
            let mut away = Vec2::new(step_away(s.x, o.x), step_away(s.y, o.y));
            if away == Vec2::ZERO {
                away.x = 1.0;
            }
            self.set_position(self.position + away);
            if move_both {
                other.set_position(other.position - away);
            }
        }
        true
    }

    fn step_back(&mut self) {
        if let Some(prev) = self.path.as_ref().map(Motion::previous_position) {
            self.set_position(prev);
        }
    }

    /// Whether the placement rectangle lies within `viewport`, edges
    /// included.
    #[must_use]
    pub fn onscreen(&self, viewport: Rect) -> bool {
        geometry::contains(viewport, self.rect)
    }

    /// Checks the edges named in `edges` and, when jailed, moves the entity
    /// back inside. Returns `true` if no checked edge was violated.
    pub fn onscreen_with(&mut self, viewport: Rect, edges: Edges) -> bool {
        let (w, h) = (self.rect.width(), self.rect.height());
        let (mut x, mut y) = (self.rect.x0, self.rect.y0);
        let mut inside = true;
        if let Some(s) = edges.left {
            if x < viewport.x0 - s {
                x = viewport.x0 - s;
                inside = false;
            }
        }
        if let Some(s) = edges.right {
            if x > viewport.x1 - w + s {
                x = viewport.x1 - w + s;
                inside = false;
            }
        }
        if let Some(s) = edges.top {
            if y < viewport.y0 - s {
                y = viewport.y0 - s;
                inside = false;
            }
        }
        if let Some(s) = edges.bottom {
            if y > viewport.y1 - h + s {
                y = viewport.y1 - h + s;
                inside = false;
            }
        }
        if edges.jail && !inside {
            self.nudge(x - self.rect.x0, y - self.rect.y0);
        }
        inside
    }
}

/// One pixel away from `other` along an axis, or zero when level.
fn step_away(mine: f64, other: f64) -> f64 {
    if mine < other {
        -1.0
    } else if mine > other {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Color;
    use alloc::vec;
    use crate::path::Kinematic;

    fn square(side: u32) -> Rc<Image> {
        Rc::new(Image::solid(side, side, Color::WHITE))
    }

    #[test]
    fn placement_follows_anchor() {
        let mut e = Entity::at(square(10), Point::new(50.0, 50.0));
        assert_eq!(e.rect(), Rect::new(50.0, 50.0, 60.0, 60.0), "top-left anchor");
        e = e.centered();
        assert_eq!(e.rect(), Rect::new(45.0, 45.0, 55.0, 55.0), "centered anchor");
        e.set_position(Point::new(0.0, 0.0));
        assert_eq!(e.rect().origin(), Point::new(-5.0, -5.0), "rect tracks position");
    }

    #[test]
    fn collision_rect_is_centered() {
        let mut e = Entity::at(square(20), Point::ZERO);
        e.set_collision_size(Some(Size::new(10.0, 4.0)));
        assert_eq!(e.collision_rect(), Rect::new(5.0, 8.0, 15.0, 12.0));
        e.nudge(1.0, 1.0);
        assert_eq!(e.collision_rect(), Rect::new(6.0, 9.0, 16.0, 13.0));
    }

    #[test]
    fn advance_moves_and_reports_exhaustion() {
        let mut path = Kinematic::new(Point::ZERO).with_velocity(Vec2::new(10.0, 0.0));
        path.set_expiry(Some(1.0)).unwrap();
        let mut e = Entity::new(square(4), path);
        assert_eq!(e.advance(0.5), Advance::Position(Point::new(5.0, 0.0)));
        assert_eq!(e.rect().x0, 5.0);
        assert!(e.advance(0.6).is_exhausted(), "expired");
        assert_eq!(e.position(), Point::new(5.0, 0.0), "stays put");
        e.reset_path();
        assert_eq!(e.position(), Point::ZERO);
        assert!(!e.is_exhausted(), "reset");
    }

    #[test]
    fn paused_entities_do_not_move() {
        let path = Kinematic::new(Point::ZERO).with_velocity(Vec2::new(10.0, 0.0));
        let mut e = Entity::new(square(4), path);
        e.pause();
        assert_eq!(e.advance(1.0).position(), Some(Point::ZERO));
        e.unpause();
        assert_eq!(e.advance(1.0).position(), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn advance_flips_frames_about_the_anchor() {
        let small = Rc::new(Image::solid(2, 2, Color::RED));
        let big = Rc::new(Image::solid(4, 4, Color::BLUE));
        let frames = Frames::flipping(vec![small, big], 0.5).unwrap();
        let path = Kinematic::new(Point::ZERO).with_velocity(Vec2::new(10.0, 0.0));
        let mut e = Entity::new(square(2), path).centered().with_frames(frames);
        assert_eq!(e.image().pixel(0, 0), Some(Color::RED), "first frame shown");

        let _ = e.advance(0.25);
        assert_eq!(e.image().pixel(0, 0), Some(Color::RED), "too early to flip");
        let _ = e.advance(0.25);
        assert_eq!(e.image().pixel(0, 0), Some(Color::BLUE));
        assert_eq!(e.anchor(), Vec2::new(2.0, 2.0), "still centered");
        assert_eq!(e.rect(), Rect::new(3.0, -2.0, 7.0, 2.0));

        e.pause();
        let _ = e.advance(0.5);
        assert_eq!(e.image().pixel(0, 0), Some(Color::BLUE), "paused entities hold");
    }

    #[test]
    fn heading_frames_follow_the_trajectory() {
        let frames = Frames::by_heading(
            [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE]
                .into_iter()
                .map(|c| Rc::new(Image::solid(1, 1, c)))
                .collect(),
        )
        .unwrap();
        let path = Kinematic::new(Point::ZERO).with_velocity(Vec2::new(0.0, -10.0));
        let mut e = Entity::new(square(1), path).with_frames(frames);
        assert_eq!(e.image().pixel(0, 0), Some(Color::GREEN), "facing up on attach");

        e.path_mut()
            .and_then(Trajectory::as_kinematic_mut)
            .unwrap()
            .set_velocity(Vec2::new(-10.0, 0.0));
        let _ = e.advance(0.1);
        assert_eq!(e.image().pixel(0, 0), Some(Color::BLUE), "turned west");
        assert_eq!(e.frames().unwrap().current_index(), 2);
    }

    #[test]
    #[should_panic(expected = "entity has no trajectory")]
    fn advance_without_path_panics() {
        let mut e = Entity::at(square(4), Point::ZERO);
        let _ = e.take_path();
        let _ = e.advance(0.1);
    }

    #[test]
    fn set_position_carries_the_path() {
        let path = Kinematic::new(Point::ZERO).with_velocity(Vec2::new(10.0, 0.0));
        let mut e = Entity::new(square(4), path);
        e.set_position(Point::new(100.0, 0.0));
        assert_eq!(e.advance(1.0).position(), Some(Point::new(110.0, 0.0)));
    }

    #[test]
    fn collide_uses_collision_rects() {
        let mut a = Entity::at(square(10), Point::new(0.0, 0.0));
        let b = Entity::at(square(10), Point::new(8.0, 0.0));
        assert!(a.collide(&b), "placement overlap");
        a.set_collision_size(Some(Size::new(2.0, 2.0)));
        assert!(!a.collide(&b), "shrunken collision rect");
        let c = Entity::at(square(10), Point::new(18.0, 0.0));
        assert!(!b.collide(&c), "edge contact is not a hit");
    }

    #[test]
    fn solid_separates() {
        let cases = [
            (Point::new(0.0, 0.0), Point::new(5.0, 3.0)),
            (Point::new(5.0, 3.0), Point::new(0.0, 0.0)),
            (Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
            (Point::new(0.0, 0.0), Point::new(0.0, 9.0)),
        ];
        for (pa, pb) in cases {
            for move_both in [false, true] {
                let mut a = Entity::at(square(10), pa);
                let mut b = Entity::at(square(10), pb);
                assert!(a.solid(&mut b, move_both), "{pa:?} {pb:?}");
                assert!(!a.collide(&b), "still overlapping: {pa:?} {pb:?} {move_both}");
            }
        }
    }

    #[test]
    fn solid_steps_back_first() {
        let path = Kinematic::new(Point::new(0.0, 0.0)).with_velocity(Vec2::new(20.0, 0.0));
        let mut mover = Entity::new(square(10), path);
        let mut wall = Entity::at(square(10), Point::new(25.0, 0.0));
        let _ = mover.advance(1.0);
        assert!(mover.collide(&wall), "moved into the wall");
        assert!(mover.solid(&mut wall, false), "separated");
        assert_eq!(mover.position(), Point::ZERO, "back where it came from");
        assert_eq!(wall.position(), Point::new(25.0, 0.0), "wall untouched");
    }

    #[test]
    fn onscreen_is_edge_inclusive() {
        let screen = Rect::new(0.0, 0.0, 100.0, 100.0);
        let e = Entity::at(square(10), Point::new(90.0, 90.0));
        assert!(e.onscreen(screen), "flush with the corner");
        let e = Entity::at(square(10), Point::new(91.0, 90.0));
        assert!(!e.onscreen(screen), "one pixel over");
    }

    #[test]
    fn onscreen_slack_and_jail() {
        let screen = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut e = Entity::at(square(10), Point::new(-5.0, 50.0));
        assert!(e.onscreen_with(screen, Edges::slack(5.0)), "within slack");
        assert!(!e.onscreen_with(screen, Edges::slack(0.0)), "past the edge");
        let only_right = Edges {
            right: Some(0.0),
            ..Edges::default()
        };
        assert!(e.onscreen_with(screen, only_right), "left edge not checked");
        assert!(!e.onscreen_with(screen, Edges::slack(0.0).jailed()), "was outside");
        assert_eq!(e.position(), Point::new(0.0, 50.0), "jailed back inside");
        assert!(e.onscreen(screen), "now inside");
    }

    #[test]
    fn image_edits_copy_on_write() {
        let shared = square(2);
        let mut e = Entity::at(Rc::clone(&shared), Point::ZERO);
        e.image_mut().recolor(Color::WHITE, Color::RED);
        assert_eq!(e.image().pixel(0, 0), Some(Color::RED));
        assert_eq!(shared.pixel(0, 0), Some(Color::WHITE), "shared copy untouched");
    }
}
