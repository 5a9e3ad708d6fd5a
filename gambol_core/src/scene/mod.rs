// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The entity arena: generational handles, groups, and formations.
//!
//! A [`Scene`] owns every [`Entity`] and hands out [`EntityId`] handles.
//! Groups never own entities; they hold handles in per-level buckets, and
//! each entity keeps a reverse index of the groups it belongs to, so killing
//! an entity removes it from all of them.
//!
//! # Formations
//!
//! [`Scene::follow`] makes one entity track another at a fixed offset. The
//! relation is recorded as a dependency edge in an [`understory_dirty`]
//! tracker on the [`POSITION`](crate::dirty::POSITION) and
//! [`VISIBILITY`](crate::dirty::VISIBILITY) channels. Moving or hiding a
//! leader marks it eagerly, which marks every follower transitively;
//! [`Scene::propagate`] then drains the channels leaders-first and snaps each
//! follower into place. [`Scene::move_group`] propagates on its own, so
//! followers are in formation before anything is drawn.

mod group;
mod id;

use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::entity::Entity;
use crate::path::{Offset, Trajectory};

use group::Group;
pub use group::MoveReport;
pub use id::{EntityId, GroupId};

/// Arena of entities and groups.
#[derive(Debug)]
pub struct Scene {
    // -- Entities --
    pub(crate) slots: Vec<Option<Entity>>,
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) memberships: Vec<Vec<GroupId>>,

    // -- Formations --
    pub(crate) leader: Vec<Option<EntityId>>,
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Groups --
    pub(crate) groups: Vec<Option<Group>>,
    pub(crate) group_generation: Vec<u32>,
    pub(crate) group_free: Vec<u32>,

    suspended: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            memberships: Vec::new(),
            leader: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            groups: Vec::new(),
            group_generation: Vec::new(),
            group_free: Vec::new(),
            suspended: false,
        }
    }

    // -- Entity lifecycle --

    /// Adds an entity and returns its handle.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "scenes hold far fewer than u32::MAX entities"
    )]
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(entity);
            idx
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Some(entity));
            self.generation.push(0);
            self.memberships.push(Vec::new());
            self.leader.push(None);
            idx
        };
        EntityId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Removes an entity from the scene and from every group, and returns
    /// it. Its followers stay where they are and stop following.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn kill(&mut self, id: EntityId) -> Entity {
        self.validate(id);
        let idx = id.idx as usize;

        for g in core::mem::take(&mut self.memberships[idx]) {
            if let Some(group) = self.group_slot_mut(g) {
                group.remove(id);
            }
        }
        for l in &mut self.leader {
            if *l == Some(id) {
                *l = None;
            }
        }
        self.leader[idx] = None;
        self.dirty.remove_key(id.idx);

        self.generation[idx] += 1;
        self.free_list.push(id.idx);
        match self.slots[idx].take() {
            Some(entity) => entity,
            None => self.stale(id),
        }
    }

    /// Returns whether the handle refers to a live entity.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.try_get(id).is_some()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Whether the scene has no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let e = slot.as_ref()?;
            let idx = u32::try_from(i).ok()?;
            Some((
                EntityId {
                    idx,
                    generation: self.generation[i],
                },
                e,
            ))
        })
    }

    // -- Entity access --

    /// The entity behind `id`, or `None` if the handle is stale.
    #[must_use]
    pub fn try_get(&self, id: EntityId) -> Option<&Entity> {
        let i = id.idx as usize;
        if self.generation.get(i) == Some(&id.generation) {
            self.slots[i].as_ref()
        } else {
            None
        }
    }

    /// Mutable access to the entity behind `id`, or `None` if stale.
    ///
    /// Moving or hiding a leader through this reference does not reach its
    /// followers until [`touch`](Self::touch) is called.
    #[must_use]
    pub fn try_get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let i = id.idx as usize;
        if self.generation.get(i) == Some(&id.generation) {
            self.slots[i].as_mut()
        } else {
            None
        }
    }

    /// The entity behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn get(&self, id: EntityId) -> &Entity {
        match self.try_get(id) {
            Some(e) => e,
            None => self.stale(id),
        }
    }

    /// Mutable access to the entity behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        self.validate(id);
        match self.slots[id.idx as usize].as_mut() {
            Some(e) => e,
            None => panic!("stale EntityId: {id:?} (slot is empty)"),
        }
    }

    /// Moves an entity and marks its followers.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_position(&mut self, id: EntityId, p: Point) {
        self.get_mut(id).set_position(p);
        self.dirty.mark_with(id.idx, dirty::POSITION, &EagerPolicy);
    }

    /// Hides or shows an entity and marks its followers.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_hidden(&mut self, id: EntityId, hidden: bool) {
        self.get_mut(id).set_hidden(hidden);
        self.dirty.mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
    }

    /// Marks an entity changed after editing it through
    /// [`get_mut`](Self::get_mut), so followers catch up on the next
    /// [`propagate`](Self::propagate).
    pub fn touch(&mut self, id: EntityId) {
        self.validate(id);
        self.dirty.mark_with(id.idx, dirty::POSITION, &EagerPolicy);
        self.dirty.mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
    }

    // -- Formations --

    /// Keeps `follower` at `leader`'s position plus `offset`.
    ///
    /// Replaces the follower's trajectory with an anchored
    /// [`Offset`] and snaps it into place immediately. A follower has one
    /// leader; following a new one drops the old.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if they are the same entity, or if
    /// the relation would make a leader follow itself through a chain.
    pub fn follow(&mut self, follower: EntityId, leader: EntityId, offset: Vec2) {
        self.validate(follower);
        self.validate(leader);
        assert!(follower != leader, "an entity cannot follow itself");
        if self.leader[follower.idx as usize].is_some() {
            self.unfollow(follower);
        }

        let (f, l) = (follower.idx, leader.idx);
        assert!(
            self.dirty.add_dependency(f, l, dirty::POSITION).is_ok(),
            "{follower:?} following {leader:?} would form a cycle"
        );
        let _ = self.dirty.add_dependency(f, l, dirty::VISIBILITY);
        self.leader[f as usize] = Some(leader);

        let anchor = self.get(leader).position();
        let hidden = self.get(leader).is_hidden();
        let e = self.get_mut(follower);
        e.set_path(Offset::anchored(anchor, offset));
        e.set_position(anchor + offset);
        e.set_hidden(hidden);
        // Followers of the follower move with it.
        self.touch(follower);
    }

    /// Stops `follower` from following. It keeps its current position and
    /// trajectory. Returns the former leader.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn unfollow(&mut self, follower: EntityId) -> Option<EntityId> {
        self.validate(follower);
        let leader = self.leader[follower.idx as usize].take()?;
        self.dirty
            .remove_dependency(follower.idx, leader.idx, dirty::POSITION);
        self.dirty
            .remove_dependency(follower.idx, leader.idx, dirty::VISIBILITY);
        Some(leader)
    }

    /// The entity `id` follows, if any.
    #[must_use]
    pub fn leader_of(&self, id: EntityId) -> Option<EntityId> {
        self.validate(id);
        self.leader[id.idx as usize]
    }

    /// Brings every marked follower into formation, leaders first.
    pub fn propagate(&mut self) {
        let moved: Vec<u32> = self
            .dirty
            .drain(dirty::POSITION)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in moved {
            let Some(anchor) = self.leader_position(idx) else {
                continue;
            };
            let Some(e) = self.slots[idx as usize].as_mut() else {
                continue;
            };
            let offset = e
                .path_mut()
                .and_then(Trajectory::as_offset_mut)
                .map(|o| {
                    o.follow(anchor);
                    o.offset()
                });
            if let Some(offset) = offset {
                e.set_position(anchor + offset);
            }
        }

        let shown: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in shown {
            let Some(hidden) = self
                .leader[idx as usize]
                .and_then(|l| self.try_get(l))
                .map(Entity::is_hidden)
            else {
                continue;
            };
            if let Some(e) = self.slots[idx as usize].as_mut() {
                e.set_hidden(hidden);
            }
        }
    }

    fn leader_position(&self, idx: u32) -> Option<Point> {
        let leader = self.leader.get(idx as usize).copied().flatten()?;
        self.try_get(leader).map(Entity::position)
    }

    // -- Interaction --

    /// Whether two entities' collision rectangles overlap.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    #[must_use]
    pub fn collide(&self, a: EntityId, b: EntityId) -> bool {
        self.get(a).collide(self.get(b))
    }

    /// Pushes `a` (and `b` when `move_both` is set) out of overlap. See
    /// [`Entity::solid`].
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or both name the same entity.
    pub fn solid(&mut self, a: EntityId, b: EntityId, move_both: bool) -> bool {
        self.validate(a);
        self.validate(b);
        assert!(a != b, "an entity cannot be solid against itself");
        let Ok([Some(ea), Some(eb)]) = self
            .slots
            .get_disjoint_mut([a.idx as usize, b.idx as usize])
        else {
            panic!("stale EntityId in solid: {a:?}, {b:?}");
        };
        let separated = ea.solid(eb, move_both);
        self.dirty.mark_with(a.idx, dirty::POSITION, &EagerPolicy);
        if move_both {
            self.dirty.mark_with(b.idx, dirty::POSITION, &EagerPolicy);
        }
        separated
    }

    /// Suspends [`move_group`](Self::move_group) for every group.
    pub fn pause(&mut self) {
        self.suspended = true;
    }

    /// Lets groups move again.
    pub fn unpause(&mut self) {
        self.suspended = false;
    }

    /// Whether the scene is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.suspended
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: EntityId) {
        if self.try_get(id).is_none() {
            self.stale(id);
        }
    }

    fn stale(&self, id: EntityId) -> ! {
        panic!(
            "stale EntityId: {id:?} (current gen: {})",
            self.generation
                .get(id.idx as usize)
                .copied()
                .unwrap_or(u32::MAX)
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use kurbo::Rect;

    use super::*;
    use crate::image::{Color, Image};
    use crate::path::{Kinematic, Motion};

    fn sprite(at: Point) -> Entity {
        Entity::at(Rc::new(Image::solid(10, 10, Color::WHITE)), at)
    }

    #[test]
    fn spawn_and_kill() {
        let mut scene = Scene::new();
        let a = scene.spawn(sprite(Point::ZERO));
        assert!(scene.is_alive(a));
        assert_eq!(scene.len(), 1);
        let e = scene.kill(a);
        assert_eq!(e.position(), Point::ZERO);
        assert!(!scene.is_alive(a));
        assert!(scene.is_empty());
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut scene = Scene::new();
        let a = scene.spawn(sprite(Point::ZERO));
        let _ = scene.kill(a);
        let b = scene.spawn(sprite(Point::new(5.0, 5.0)));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(scene.try_get(a).is_none(), "old handle is stale");
        assert_eq!(scene.get(b).position(), Point::new(5.0, 5.0));
    }

    #[test]
    #[should_panic(expected = "stale EntityId")]
    fn stale_get_panics() {
        let mut scene = Scene::new();
        let a = scene.spawn(sprite(Point::ZERO));
        let _ = scene.kill(a);
        let _ = scene.get(a);
    }

    #[test]
    fn followers_track_leaders_in_order() {
        let mut scene = Scene::new();
        let lead = scene.spawn(sprite(Point::new(100.0, 100.0)));
        let mid = scene.spawn(sprite(Point::ZERO));
        let tail = scene.spawn(sprite(Point::ZERO));
        // Followed out of order so slot order is not leaders-first.
        scene.follow(tail, mid, Vec2::new(0.0, 20.0));
        scene.follow(mid, lead, Vec2::new(20.0, 0.0));
        assert_eq!(scene.get(mid).position(), Point::new(120.0, 100.0));
        scene.propagate();
        assert_eq!(scene.get(tail).position(), Point::new(120.0, 120.0));

        scene.set_position(lead, Point::new(0.0, 0.0));
        scene.propagate();
        assert_eq!(scene.get(mid).position(), Point::new(20.0, 0.0));
        assert_eq!(scene.get(tail).position(), Point::new(20.0, 20.0));
    }

    #[test]
    fn visibility_follows_the_leader() {
        let mut scene = Scene::new();
        let lead = scene.spawn(sprite(Point::ZERO));
        let f = scene.spawn(sprite(Point::ZERO));
        scene.follow(f, lead, Vec2::ZERO);
        scene.set_hidden(lead, true);
        scene.propagate();
        assert!(scene.get(f).is_hidden(), "hidden with leader");
        scene.set_hidden(lead, false);
        scene.propagate();
        assert!(!scene.get(f).is_hidden(), "shown with leader");
    }

    #[test]
    #[should_panic(expected = "would form a cycle")]
    fn follow_cycles_panic() {
        let mut scene = Scene::new();
        let a = scene.spawn(sprite(Point::ZERO));
        let b = scene.spawn(sprite(Point::ZERO));
        scene.follow(b, a, Vec2::ZERO);
        scene.follow(a, b, Vec2::ZERO);
    }

    #[test]
    fn killing_a_leader_frees_followers() {
        let mut scene = Scene::new();
        let lead = scene.spawn(sprite(Point::ZERO));
        let f = scene.spawn(sprite(Point::ZERO));
        scene.follow(f, lead, Vec2::new(5.0, 0.0));
        let _ = scene.kill(lead);
        assert_eq!(scene.leader_of(f), None);
        scene.propagate();
        assert_eq!(scene.get(f).position(), Point::new(5.0, 0.0), "stays put");
    }

    #[test]
    fn unfollow_returns_the_leader() {
        let mut scene = Scene::new();
        let lead = scene.spawn(sprite(Point::ZERO));
        let f = scene.spawn(sprite(Point::ZERO));
        scene.follow(f, lead, Vec2::ZERO);
        assert_eq!(scene.unfollow(f), Some(lead));
        scene.set_position(lead, Point::new(50.0, 50.0));
        scene.propagate();
        assert_eq!(scene.get(f).position(), Point::ZERO, "no longer follows");
    }

    #[test]
    fn solid_separates_arena_entities() {
        let mut scene = Scene::new();
        let a = scene.spawn(sprite(Point::ZERO));
        let b = scene.spawn(sprite(Point::new(4.0, 4.0)));
        assert!(scene.collide(a, b), "overlapping");
        assert!(scene.solid(a, b, true), "separated");
        assert!(!scene.collide(a, b), "no longer overlapping");
        let ra: Rect = scene.get(a).rect();
        assert!(ra.x0 < 0.0 || ra.y0 < 0.0, "a moved away from b");
    }

    #[test]
    fn iter_skips_dead_slots() {
        let mut scene = Scene::new();
        let a = scene.spawn(sprite(Point::ZERO));
        let b = scene.spawn(sprite(Point::ZERO));
        let _ = scene.kill(a);
        let ids: Vec<_> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, [b]);
    }

    #[test]
    fn follower_path_is_an_anchored_offset() {
        let mut scene = Scene::new();
        let lead = scene.spawn(Entity::new(
            Rc::new(Image::solid(2, 2, Color::RED)),
            Kinematic::new(Point::ZERO).with_velocity(Vec2::new(10.0, 0.0)),
        ));
        let f = scene.spawn(sprite(Point::ZERO));
        scene.follow(f, lead, Vec2::new(0.0, 3.0));
        let path = scene.get_mut(f).path_mut().and_then(Trajectory::as_offset_mut);
        assert_eq!(path.map(|o| o.offset()), Some(Vec2::new(0.0, 3.0)));
        assert_eq!(scene.get(f).path().map(Motion::position), Some(Point::new(0.0, 3.0)));
    }
}
