// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leveled entity groups and the per-frame group passes.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use understory_dirty::EagerPolicy;

use super::{EntityId, GroupId, Scene};
use crate::backend::RenderTarget;
use crate::damage::DamageRegion;
use crate::dirty;
use crate::frame::FrameContext;
use crate::layer::Layer;
use crate::path::Advance;

/// Members of one group, bucketed by level.
///
/// Every member sits in exactly one level. Levels iterate ascending; within
/// a level members keep insertion order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Group {
    levels: BTreeMap<i32, Vec<EntityId>>,
}

impl Group {
    fn level_of(&self, id: EntityId) -> Option<i32> {
        self.levels
            .iter()
            .find(|(_, members)| members.contains(&id))
            .map(|(&level, _)| level)
    }

    /// Removes `id` and returns the level it was at.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<i32> {
        let level = self.level_of(id)?;
        if let Some(members) = self.levels.get_mut(&level) {
            members.retain(|&m| m != id);
            if members.is_empty() {
                self.levels.remove(&level);
            }
        }
        Some(level)
    }

    fn insert(&mut self, id: EntityId, level: i32) {
        self.levels.entry(level).or_default().push(id);
    }

    fn members(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.levels.values().flatten().copied()
    }

    fn len(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }
}

/// Outcome of [`Scene::move_group`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// Members whose trajectory advanced.
    pub moved: usize,
    /// Members whose trajectory is exhausted, in draw order. They did not
    /// move; what happens to them is up to the caller.
    pub exhausted: Vec<EntityId>,
}

impl Scene {
    // -- Group lifecycle --

    /// Creates an empty group.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "scenes hold far fewer than u32::MAX groups"
    )]
    pub fn create_group(&mut self) -> GroupId {
        let idx = if let Some(idx) = self.group_free.pop() {
            self.groups[idx as usize] = Some(Group::default());
            idx
        } else {
            let idx = self.groups.len() as u32;
            self.groups.push(Some(Group::default()));
            self.group_generation.push(0);
            idx
        };
        GroupId {
            idx,
            generation: self.group_generation[idx as usize],
        }
    }

    /// Removes the group. Its members stay alive.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_group(&mut self, group: GroupId) {
        let g = self.take_group(group);
        for id in g.members() {
            self.memberships[id.idx as usize].retain(|&m| m != group);
        }
    }

    /// Kills every member and removes the group.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn kill_group(&mut self, group: GroupId) {
        let g = self.take_group(group);
        for id in g.members() {
            if self.is_alive(id) {
                let _ = self.kill(id);
            }
        }
    }

    /// Whether the handle refers to a live group.
    #[must_use]
    pub fn group_exists(&self, group: GroupId) -> bool {
        self.group_slot(group).is_some()
    }

    // -- Membership --

    /// Puts `id` into `group` at `level`, moving it if it is already a
    /// member at another level.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add(&mut self, group: GroupId, id: EntityId, level: i32) {
        self.validate(id);
        let g = self.group_mut(group);
        let was_member = g.remove(id).is_some();
        g.insert(id, level);
        if !was_member {
            self.memberships[id.idx as usize].push(group);
        }
    }

    /// Takes `id` out of `group`. Returns `false` if it was not a member.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale.
    pub fn remove(&mut self, group: GroupId, id: EntityId) -> bool {
        let removed = self.group_mut(group).remove(id).is_some();
        if removed {
            if let Some(m) = self.memberships.get_mut(id.idx as usize) {
                m.retain(|&g| g != group);
            }
        }
        removed
    }

    /// Moves a member to another level.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `id` is not a member.
    pub fn change_level(&mut self, group: GroupId, id: EntityId, level: i32) {
        let g = self.group_mut(group);
        assert!(
            g.remove(id).is_some(),
            "{id:?} is not a member of {group:?}"
        );
        g.insert(id, level);
    }

    /// Level of `id` in `group`, if it is a member.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale.
    #[must_use]
    pub fn level_of(&self, group: GroupId, id: EntityId) -> Option<i32> {
        self.group(group).level_of(id)
    }

    /// Members in draw order: levels ascending, insertion order within a
    /// level.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale.
    pub fn members(&self, group: GroupId) -> impl Iterator<Item = EntityId> + '_ {
        self.group(group).members()
    }

    /// Number of members.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale.
    #[must_use]
    pub fn group_len(&self, group: GroupId) -> usize {
        self.group(group).len()
    }

    /// Groups `id` belongs to.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn groups_of(&self, id: EntityId) -> &[GroupId] {
        self.validate(id);
        &self.memberships[id.idx as usize]
    }

    // -- Frame passes --
    //
    // The `*_groups` passes visit every entity once even when it belongs to
    // several of the listed groups, at its first position in draw order.

    /// Restores the background under every member, levels ascending, and
    /// returns the restored rectangles.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale.
    pub fn clear_group(
        &mut self,
        group: GroupId,
        layer: &Layer,
        target: &mut dyn RenderTarget,
    ) -> DamageRegion {
        self.clear_groups(&[group], layer, target)
    }

    /// [`clear_group`](Self::clear_group) over several groups.
    ///
    /// # Panics
    ///
    /// Panics if any group handle is stale.
    pub fn clear_groups(
        &mut self,
        groups: &[GroupId],
        layer: &Layer,
        target: &mut dyn RenderTarget,
    ) -> DamageRegion {
        let mut damage = DamageRegion::None;
        for id in self.snapshot(groups) {
            if let Some(e) = self.try_get_mut(id) {
                damage.push(e.clear(layer, target));
            }
        }
        damage
    }

    /// Advances every member by `ctx.dt`, then brings followers into
    /// formation.
    ///
    /// Followers are skipped; their leaders move them. Exhausted members are
    /// reported, not handled. Does nothing while the scene is paused.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale, or if a member's trajectory was
    /// taken.
    pub fn move_group(&mut self, group: GroupId, ctx: &FrameContext) -> MoveReport {
        self.move_groups(&[group], ctx)
    }

    /// [`move_group`](Self::move_group) over several groups. A member of
    /// more than one of them still advances once.
    ///
    /// # Panics
    ///
    /// Panics if any group handle is stale, or if a member's trajectory was
    /// taken.
    pub fn move_groups(&mut self, groups: &[GroupId], ctx: &FrameContext) -> MoveReport {
        let mut report = MoveReport::default();
        if self.is_paused() {
            return report;
        }
        for id in self.snapshot(groups) {
            if self.leader[id.idx as usize].is_some() {
                continue;
            }
            let Some(e) = self.try_get_mut(id) else {
                continue;
            };
            match e.advance(ctx.dt) {
                Advance::Position(_) => {
                    report.moved += 1;
                    self.dirty.mark_with(id.idx, dirty::POSITION, &EagerPolicy);
                }
                Advance::Exhausted => report.exhausted.push(id),
            }
        }
        self.propagate();
        report
    }

    /// Draws every member, levels ascending, and returns the dirty
    /// rectangles.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale.
    pub fn draw_group(&mut self, group: GroupId, target: &mut dyn RenderTarget) -> DamageRegion {
        self.draw_groups(&[group], target)
    }

    /// [`draw_group`](Self::draw_group) over several groups, in list order.
    ///
    /// # Panics
    ///
    /// Panics if any group handle is stale.
    pub fn draw_groups(
        &mut self,
        groups: &[GroupId],
        target: &mut dyn RenderTarget,
    ) -> DamageRegion {
        let mut damage = DamageRegion::None;
        for id in self.snapshot(groups) {
            if let Some(e) = self.try_get_mut(id) {
                damage.push(e.draw(target));
            }
        }
        damage
    }

    // -- Internal helpers --

    /// Members of `groups` in draw order, each entity once.
    fn snapshot(&self, groups: &[GroupId]) -> Vec<EntityId> {
        let mut seen = BTreeSet::new();
        groups
            .iter()
            .flat_map(|&g| self.group(g).members())
            .filter(|&id| seen.insert(id))
            .collect()
    }

    pub(crate) fn group_slot(&self, group: GroupId) -> Option<&Group> {
        let i = group.idx as usize;
        if self.group_generation.get(i) == Some(&group.generation) {
            self.groups[i].as_ref()
        } else {
            None
        }
    }

    pub(crate) fn group_slot_mut(&mut self, group: GroupId) -> Option<&mut Group> {
        let i = group.idx as usize;
        if self.group_generation.get(i) == Some(&group.generation) {
            self.groups[i].as_mut()
        } else {
            None
        }
    }

    fn group(&self, group: GroupId) -> &Group {
        match self.group_slot(group) {
            Some(g) => g,
            None => panic!("stale GroupId: {group:?}"),
        }
    }

    fn group_mut(&mut self, group: GroupId) -> &mut Group {
        match self.group_slot_mut(group) {
            Some(g) => g,
            None => panic!("stale GroupId: {group:?}"),
        }
    }

    fn take_group(&mut self, group: GroupId) -> Group {
        let i = group.idx as usize;
        let g = match self.group_slot_mut(group) {
            Some(g) => core::mem::take(g),
            None => panic!("stale GroupId: {group:?}"),
        };
        self.groups[i] = None;
        self.group_generation[i] += 1;
        self.group_free.push(group.idx);
        g
    }
}
