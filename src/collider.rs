// Bounding volumes and overlap tests.

use crate::error::Result;
use crate::world::{ActorId, World};

/// A bounding volume attached to one actor.
///
/// Overlap tests dispatch on the variant of both operands, so a new volume
/// type has to be handled in [`Collider::check_collision`] before it compiles.
#[derive(Debug, Clone, PartialEq)]
pub enum Collider {
    Sphere(SphereCollider),
}

impl Collider {
    /// An unattached sphere; [`World::set_collider`] binds it to its owner.
    pub fn sphere(radius: f32) -> Self {
        Collider::Sphere(SphereCollider::new(radius))
    }

    pub fn owner(&self) -> Option<ActorId> {
        match self {
            Collider::Sphere(sphere) => sphere.owner,
        }
    }

    pub(crate) fn set_owner(&mut self, owner: ActorId) {
        match self {
            Collider::Sphere(sphere) => sphere.owner = Some(owner),
        }
    }

    /// Whether this volume overlaps `other`, both placed at their owners'
    /// world positions.
    pub fn check_collision(&self, other: &Collider, world: &World) -> Result<bool> {
        match (self, other) {
            (Collider::Sphere(a), Collider::Sphere(b)) => a.check_sphere_collision(b, world),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereCollider {
    radius: f32,
    owner: Option<ActorId>,
}

impl SphereCollider {
    /// Negative radii are treated as zero.
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            owner: None,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    /// Spheres touch when the distance between owners is at most the sum of
    /// the radii. A sphere never collides with one sharing its owner, and an
    /// unattached sphere collides with nothing.
    pub fn check_sphere_collision(&self, other: &SphereCollider, world: &World) -> Result<bool> {
        let (Some(owner), Some(other_owner)) = (self.owner, other.owner) else {
            return Ok(false);
        };
        if owner == other_owner {
            return Ok(false);
        }
        let distance = world
            .world_position(owner)?
            .distance(world.world_position(other_owner)?);
        Ok(distance <= self.radius + other.radius)
    }
}
