//! Collision listener
//!
//! Turns raw contact transitions into named records. It only ever appends
//! to its queue; the world manager drains the queue once the step has
//! returned and applies the side effects (brick removal) there.

use super::object::ObjectRole;
use super::physics::ContactListener;
use super::registry::{ObjectId, ObjectRegistry};

/// What a recorded contact means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// The ball started touching a brick; names are `(ball, brick)`
    BrickHit,
    /// Any other pair started touching
    Began,
    /// A pair stopped touching
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub kind: ContactKind,
    pub names: (String, String),
}

/// Pending contact records, filled during a step
#[derive(Debug, Default)]
pub struct CollisionListener {
    pending: Vec<ContactRecord>,
}

impl CollisionListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener view for one step, resolving ids through `registry`
    pub fn bind<'a>(&'a mut self, registry: &'a ObjectRegistry) -> BoundListener<'a> {
        BoundListener {
            pending: &mut self.pending,
            registry,
        }
    }

    pub fn pending(&self) -> &[ContactRecord] {
        &self.pending
    }

    /// Hand over everything recorded so far
    pub fn take_pending(&mut self) -> Vec<ContactRecord> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// [`CollisionListener`] bound to the registry for the length of a step
pub struct BoundListener<'a> {
    pending: &'a mut Vec<ContactRecord>,
    registry: &'a ObjectRegistry,
}

impl BoundListener<'_> {
    fn resolve(&self, id: ObjectId) -> Option<(&str, ObjectRole)> {
        let object = self.registry.get(id)?;
        Some((self.registry.name_of(id)?, object.role()))
    }
}

impl ContactListener for BoundListener<'_> {
    fn begin_contact(&mut self, a: ObjectId, b: ObjectId) {
        let (Some((name_a, role_a)), Some((name_b, role_b))) = (self.resolve(a), self.resolve(b))
        else {
            return;
        };

        let record = match (role_a, role_b) {
            (ObjectRole::Ball, ObjectRole::Brick { .. }) => ContactRecord {
                kind: ContactKind::BrickHit,
                names: (name_a.to_string(), name_b.to_string()),
            },
            (ObjectRole::Brick { .. }, ObjectRole::Ball) => ContactRecord {
                kind: ContactKind::BrickHit,
                names: (name_b.to_string(), name_a.to_string()),
            },
            _ => ContactRecord {
                kind: ContactKind::Began,
                names: (name_a.to_string(), name_b.to_string()),
            },
        };
        self.pending.push(record);
    }

    fn end_contact(&mut self, a: ObjectId, b: ObjectId) {
        let (Some((name_a, _)), Some((name_b, _))) = (self.resolve(a), self.resolve(b)) else {
            return;
        };
        let record = ContactRecord {
            kind: ContactKind::Ended,
            names: (name_a.to_string(), name_b.to_string()),
        };
        self.pending.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::object::{BrickColor, PhysicsLocation, PhysicsObject, WallSide};
    use glam::Vec2;

    fn registry() -> (ObjectRegistry, ObjectId, ObjectId, ObjectId) {
        let mut registry = ObjectRegistry::new();
        let loc = PhysicsLocation::default();
        let ball = registry
            .insert("Ball", PhysicsObject::circle(2.0, loc).with_role(ObjectRole::Ball))
            .unwrap();
        let brick = registry
            .insert(
                "Brick_0_3",
                PhysicsObject::brick(0, 3, Vec2::new(3.0, 1.5), loc, BrickColor::Red),
            )
            .unwrap();
        let wall = registry
            .insert(
                "Wall_Left",
                PhysicsObject::boxed(Vec2::new(0.5, 10.0), loc)
                    .with_role(ObjectRole::Wall(WallSide::Left)),
            )
            .unwrap();
        (registry, ball, brick, wall)
    }

    #[test]
    fn test_ball_brick_is_a_hit_in_either_order() {
        let (registry, ball, brick, _) = registry();
        let mut listener = CollisionListener::new();
        {
            let mut bound = listener.bind(&registry);
            bound.begin_contact(ball, brick);
            bound.begin_contact(brick, ball);
        }

        let records = listener.take_pending();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.kind, ContactKind::BrickHit);
            assert_eq!(record.names, ("Ball".to_string(), "Brick_0_3".to_string()));
        }
        assert!(listener.pending().is_empty());
    }

    #[test]
    fn test_other_pairs_and_ends() {
        let (registry, ball, brick, wall) = registry();
        let mut listener = CollisionListener::new();
        {
            let mut bound = listener.bind(&registry);
            bound.begin_contact(wall, ball);
            bound.end_contact(ball, brick);
        }

        let kinds: Vec<_> = listener.pending().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ContactKind::Began, ContactKind::Ended]);
        assert_eq!(listener.pending()[0].names.0, "Wall_Left");
    }

    #[test]
    fn test_unresolved_ids_are_dropped() {
        let (mut registry, ball, brick, _) = registry();
        registry.remove("Brick_0_3");

        let mut listener = CollisionListener::new();
        listener.bind(&registry).begin_contact(ball, brick);
        assert!(listener.pending().is_empty());
    }
}
