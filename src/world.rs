// Actor arena and the transform hierarchy.
//
// Every actor lives in `World` and is addressed by a generational
// `ActorId`. Parents and children refer to each other by handle, so
// removing a node never leaves a dangling pointer: stale handles are
// rejected with `GameError::UnknownActor`. `Engine::despawn` also clears
// the handle from scenes, teams and player selections.
//
// World transforms are never stored. They are recomputed on every query by
// composing local transforms from the root down:
// `world(actor) = world(parent) * local(actor)`.

use std::fmt;

use log::debug;

use crate::actor::Actor;
use crate::collider::Collider;
use crate::error::{GameError, Result};
use crate::math::{look_rotation, Mat4, Quat, Transform, Vec3};

/// Stable handle to an actor in a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// Owns every actor. Scenes hold handles into it.
#[derive(Debug, Default)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live actors.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.actor = Some(actor);
            return ActorId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            actor: Some(actor),
        });
        ActorId {
            index,
            generation: 0,
        }
    }

    /// Remove an actor from the arena.
    ///
    /// The actor is detached from its parent and its children become roots;
    /// children are not destroyed with it.
    pub fn despawn(&mut self, id: ActorId) -> Result<Actor> {
        let (parent, children) = {
            let actor = self.get(id)?;
            (actor.parent, actor.children.clone())
        };
        if let Some(parent) = parent {
            if let Ok(parent) = self.get_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        for child in children {
            if let Ok(child) = self.get_mut(child) {
                child.parent = None;
            }
        }

        let slot = &mut self.slots[id.index as usize];
        let mut actor = slot.actor.take().ok_or(GameError::UnknownActor(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;

        actor.parent = None;
        actor.children.clear();
        debug!("despawned actor {} ({})", id, actor.name);
        Ok(actor)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: ActorId) -> Result<&Actor> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.actor.as_ref())
            .ok_or(GameError::UnknownActor(id))
    }

    pub fn get_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.actor.as_mut())
            .ok_or(GameError::UnknownActor(id))
    }

    /// Handles of all live actors in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.actor.as_ref().map(|_| ActorId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    // ---- hierarchy -------------------------------------------------------

    /// Make `child` a child of `parent`, detaching it from any previous parent.
    pub fn add_child(&mut self, parent: ActorId, child: ActorId) -> Result<()> {
        self.get(parent)?;
        let previous = self.get(child)?.parent;
        if parent == child || self.is_ancestor(child, parent)? {
            return Err(GameError::HierarchyCycle { parent, child });
        }
        if previous == Some(parent) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.get_mut(previous)?.children.retain(|c| *c != child);
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach `child` from `parent`. Reports whether the link existed.
    pub fn remove_child(&mut self, parent: ActorId, child: ActorId) -> Result<bool> {
        let parent_actor = self.get_mut(parent)?;
        let before = parent_actor.children.len();
        parent_actor.children.retain(|c| *c != child);
        let removed = parent_actor.children.len() != before;
        if removed {
            self.get_mut(child)?.parent = None;
        }
        Ok(removed)
    }

    /// Whether `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: ActorId, id: ActorId) -> Result<bool> {
        let mut current = self.get(id)?.parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return Ok(true);
            }
            current = self.get(parent)?.parent;
        }
        Ok(false)
    }

    pub fn parent(&self, id: ActorId) -> Result<Option<ActorId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: ActorId) -> Result<&[ActorId]> {
        Ok(self.get(id)?.children())
    }

    // ---- local transform ------------------------------------------------

    pub fn set_translation(&mut self, id: ActorId, position: Vec3) -> Result<()> {
        self.get_mut(id)?.transform.position = position;
        Ok(())
    }

    pub fn set_scale(&mut self, id: ActorId, scale: Vec3) -> Result<()> {
        self.get_mut(id)?.transform.scale = scale;
        Ok(())
    }

    pub fn set_rotation(&mut self, id: ActorId, rotation: Quat) -> Result<()> {
        self.get_mut(id)?.transform.rotation = rotation;
        Ok(())
    }

    /// Move the actor so its world position becomes `position`.
    pub fn set_world_position(&mut self, id: ActorId, position: Vec3) -> Result<()> {
        let local = match self.get(id)?.parent {
            Some(parent) => self.world_matrix(parent)?.inverse().transform_point3(position),
            None => position,
        };
        self.set_translation(id, local)
    }

    /// Add `delta` to the local position.
    pub fn translate(&mut self, id: ActorId, delta: Vec3) -> Result<()> {
        self.get_mut(id)?.transform.translate(delta);
        Ok(())
    }

    /// Turn the actor so its world forward points from its world position
    /// toward `point`. Looking at its own position leaves it unchanged.
    pub fn look_at(&mut self, id: ActorId, point: Vec3) -> Result<()> {
        let direction = point - self.world_position(id)?;
        let Some(world_rotation) = look_rotation(direction) else {
            return Ok(());
        };
        let parent_rotation = match self.get(id)?.parent {
            Some(parent) => self.world_rotation(parent)?,
            None => Quat::IDENTITY,
        };
        self.set_rotation(id, parent_rotation.inverse() * world_rotation)
    }

    // ---- world transform ------------------------------------------------

    /// Compose local transforms from the root down to `id`.
    pub fn world_matrix(&self, id: ActorId) -> Result<Mat4> {
        let actor = self.get(id)?;
        let mut matrix = actor.transform.matrix();
        let mut current = actor.parent;
        while let Some(parent) = current {
            let parent = self.get(parent)?;
            matrix = parent.transform.matrix() * matrix;
            current = parent.parent;
        }
        Ok(matrix)
    }

    pub fn world_transform(&self, id: ActorId) -> Result<Transform> {
        Ok(Transform::from_matrix(self.world_matrix(id)?))
    }

    pub fn world_position(&self, id: ActorId) -> Result<Vec3> {
        Ok(self.world_matrix(id)?.transform_point3(Vec3::ZERO))
    }

    pub fn world_rotation(&self, id: ActorId) -> Result<Quat> {
        Ok(self.world_transform(id)?.rotation)
    }

    pub fn world_scale(&self, id: ActorId) -> Result<Vec3> {
        Ok(self.world_transform(id)?.scale)
    }

    /// World-space +Z of the actor, normalized.
    pub fn forward(&self, id: ActorId) -> Result<Vec3> {
        Ok(self
            .world_matrix(id)?
            .transform_vector3(Vec3::Z)
            .normalize_or_zero())
    }

    /// Express a world-space displacement in the actor's parent space, so it
    /// can be fed to [`World::translate`].
    pub fn world_to_parent_vector(&self, id: ActorId, delta: Vec3) -> Result<Vec3> {
        match self.get(id)?.parent {
            Some(parent) => Ok(self
                .world_matrix(parent)?
                .inverse()
                .transform_vector3(delta)),
            None => Ok(delta),
        }
    }

    // ---- collision -------------------------------------------------------

    /// Attach `collider` to `id`, replacing any previous one.
    pub fn set_collider(&mut self, id: ActorId, mut collider: Collider) -> Result<()> {
        collider.set_owner(id);
        self.get_mut(id)?.collider = Some(collider);
        Ok(())
    }

    pub fn remove_collider(&mut self, id: ActorId) -> Result<Option<Collider>> {
        Ok(self.get_mut(id)?.collider.take())
    }

    /// Test `id`'s collider against `other`'s collider.
    pub fn check_for_collision(&self, id: ActorId, other: ActorId) -> Result<bool> {
        let collider = self
            .get(id)?
            .collider()
            .ok_or(GameError::MissingCollider(id))?;
        let other_collider = self
            .get(other)?
            .collider()
            .ok_or(GameError::MissingCollider(other))?;
        collider.check_collision(other_collider, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prop(world: &mut World, position: Vec3) -> ActorId {
        world.spawn(Actor::new("prop", position))
    }

    #[test]
    fn translation_chain_sums_ancestor_offsets() {
        let mut world = World::new();
        let offsets = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(2.5, -1.0, -3.0),
        ];
        let mut parent = None;
        let mut leaf = None;
        for offset in offsets {
            let id = prop(&mut world, offset);
            if let Some(parent) = parent {
                world.add_child(parent, id).unwrap();
            }
            parent = Some(id);
            leaf = Some(id);
        }
        let expected: Vec3 = offsets.iter().copied().sum();
        let actual = world.world_position(leaf.unwrap()).unwrap();
        assert!(actual.abs_diff_eq(expected, 1.0e-5), "{actual:?} != {expected:?}");
    }

    #[test]
    fn root_world_transform_is_local() {
        let mut world = World::new();
        let id = prop(&mut world, Vec3::new(3.0, 4.0, 5.0));
        world.set_scale(id, Vec3::new(1.0, 0.5, 1.0)).unwrap();
        assert_eq!(world.world_position(id).unwrap(), Vec3::new(3.0, 4.0, 5.0));
        assert!(world
            .world_scale(id)
            .unwrap()
            .abs_diff_eq(Vec3::new(1.0, 0.5, 1.0), 1.0e-6));
    }

    #[test]
    fn child_inherits_parent_scale_and_rotation() {
        let mut world = World::new();
        let parent = prop(&mut world, Vec3::new(10.0, 0.0, 0.0));
        world.set_scale(parent, Vec3::splat(2.0)).unwrap();
        world
            .set_rotation(parent, Quat::from_rotation_y(std::f32::consts::PI))
            .unwrap();
        let child = prop(&mut world, Vec3::new(1.0, 0.0, 0.0));
        world.add_child(parent, child).unwrap();

        let position = world.world_position(child).unwrap();
        assert_relative_eq!(position.x, 8.0, epsilon = 1.0e-5);
        assert_relative_eq!(world.world_scale(child).unwrap().x, 2.0, epsilon = 1.0e-5);
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut world = World::new();
        let first = prop(&mut world, Vec3::ZERO);
        world.despawn(first).unwrap();
        let second = prop(&mut world, Vec3::ONE);

        assert_ne!(first, second);
        assert_eq!(world.get(first).unwrap_err(), GameError::UnknownActor(first));
        assert_eq!(world.world_position(second).unwrap(), Vec3::ONE);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn despawn_orphans_children() {
        let mut world = World::new();
        let parent = prop(&mut world, Vec3::new(5.0, 0.0, 0.0));
        let child = prop(&mut world, Vec3::new(1.0, 0.0, 0.0));
        world.add_child(parent, child).unwrap();

        world.despawn(parent).unwrap();

        assert_eq!(world.parent(child).unwrap(), None);
        assert_eq!(world.world_position(child).unwrap(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn cycles_are_rejected() {
        let mut world = World::new();
        let a = prop(&mut world, Vec3::ZERO);
        let b = prop(&mut world, Vec3::ZERO);
        let c = prop(&mut world, Vec3::ZERO);
        world.add_child(a, b).unwrap();
        world.add_child(b, c).unwrap();

        assert_eq!(
            world.add_child(c, a),
            Err(GameError::HierarchyCycle { parent: c, child: a })
        );
        assert!(world.add_child(a, a).is_err());
    }

    #[test]
    fn reparenting_moves_the_child() {
        let mut world = World::new();
        let a = prop(&mut world, Vec3::ZERO);
        let b = prop(&mut world, Vec3::ZERO);
        let child = prop(&mut world, Vec3::ZERO);
        world.add_child(a, child).unwrap();
        world.add_child(b, child).unwrap();

        assert!(world.children(a).unwrap().is_empty());
        assert_eq!(world.children(b).unwrap(), &[child]);
        assert!(world.remove_child(b, child).unwrap());
        assert!(!world.remove_child(b, child).unwrap());
    }

    #[test]
    fn look_at_faces_world_point_through_rotated_parent() {
        let mut world = World::new();
        let parent = prop(&mut world, Vec3::ZERO);
        world
            .set_rotation(parent, Quat::from_rotation_y(1.2))
            .unwrap();
        let child = prop(&mut world, Vec3::new(0.0, 0.0, 2.0));
        world.add_child(parent, child).unwrap();

        let target = Vec3::new(-7.0, 0.0, 4.0);
        world.look_at(child, target).unwrap();

        let expected = (target - world.world_position(child).unwrap()).normalize();
        let forward = world.forward(child).unwrap();
        assert!(forward.abs_diff_eq(expected, 1.0e-4), "{forward:?} != {expected:?}");
    }

    #[test]
    fn set_world_position_accounts_for_parent() {
        let mut world = World::new();
        let parent = prop(&mut world, Vec3::new(4.0, 0.0, 0.0));
        world.set_scale(parent, Vec3::splat(2.0)).unwrap();
        let child = prop(&mut world, Vec3::ZERO);
        world.add_child(parent, child).unwrap();

        world.set_world_position(child, Vec3::new(0.0, 0.0, 6.0)).unwrap();

        assert!(world
            .world_position(child)
            .unwrap()
            .abs_diff_eq(Vec3::new(0.0, 0.0, 6.0), 1.0e-5));
        assert!(world
            .get(child)
            .unwrap()
            .local_position()
            .abs_diff_eq(Vec3::new(-2.0, 0.0, 3.0), 1.0e-5));
    }

    #[test]
    fn missing_collider_is_an_error() {
        let mut world = World::new();
        let a = prop(&mut world, Vec3::ZERO);
        let b = prop(&mut world, Vec3::ZERO);
        world.set_collider(a, Collider::sphere(1.0)).unwrap();
        assert_eq!(
            world.check_for_collision(a, b),
            Err(GameError::MissingCollider(b))
        );
    }

    #[test]
    fn colliders_can_be_resized_and_removed() {
        let mut world = World::new();
        let a = prop(&mut world, Vec3::ZERO);
        let b = prop(&mut world, Vec3::new(3.0, 0.0, 0.0));
        world.set_collider(a, Collider::sphere(1.0)).unwrap();
        world.set_collider(b, Collider::sphere(1.0)).unwrap();
        assert!(!world.check_for_collision(a, b).unwrap());

        if let Some(Collider::Sphere(sphere)) = world.get_mut(a).unwrap().collider_mut() {
            sphere.set_radius(2.0);
        }
        assert!(world.check_for_collision(a, b).unwrap());

        // Negative radii clamp to zero.
        if let Some(Collider::Sphere(sphere)) = world.get_mut(a).unwrap().collider_mut() {
            sphere.set_radius(-4.0);
            assert_eq!(sphere.radius(), 0.0);
        }
        assert!(!world.check_for_collision(a, b).unwrap());

        let removed = world.remove_collider(a).unwrap().unwrap();
        assert_eq!(removed.owner(), Some(a));
        assert!(world.get(a).unwrap().collider().is_none());
        assert_eq!(
            world.check_for_collision(a, b),
            Err(GameError::MissingCollider(a))
        );
    }
}
