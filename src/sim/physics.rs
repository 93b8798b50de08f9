//! Rigid-body world
//!
//! Wraps the rapier2d pipeline. Each `step` is split into a fixed number
//! of sub-steps; collision events are gathered through a crossbeam channel
//! while the pipeline runs and handed to the [`ContactListener`] once it
//! returns.
//! Rapier only pairs colliders when at least one side is dynamic, so static
//! and kinematic bodies never push each other.

use std::num::NonZeroUsize;

use crossbeam_channel::Sender;
use glam::Vec2;
use rapier2d::prelude::{
    ActiveEvents, CCDSolver, CoefficientCombineRule, ColliderHandle, ColliderSet, CollisionEvent,
    ContactPair, DefaultBroadPhase, EventHandler, ImpulseJointSet, IntegrationParameters,
    IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Real, RigidBodyBuilder,
    RigidBodyHandle, RigidBodySet, Vector, vector,
};
use serde::{Deserialize, Serialize};

use super::body::{BodyDesc, BodyHandle, BodyType};
use super::registry::ObjectId;
use crate::consts::*;

fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_na(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Receives contact transitions from [`PhysicsWorld::step`]
///
/// Called after the pipeline has finished, in the order rapier raised the
/// events, once per transition rather than once per sub-step.
pub trait ContactListener {
    /// Two bodies started touching
    fn begin_contact(&mut self, a: ObjectId, b: ObjectId);

    /// Two bodies stopped touching
    fn end_contact(&mut self, _a: ObjectId, _b: ObjectId) {}
}

/// Forwards collision events to a channel; contact forces are not used
struct ChannelEventCollector {
    collision_events: Sender<CollisionEvent>,
}

impl EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Solver iteration counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Pipeline steps per `step` call
    pub sub_steps: u32,
    /// Rapier solver iterations per sub-step
    pub velocity_iterations: u32,
    /// Inner PGS iterations per solver iteration
    pub internal_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sub_steps: SUB_STEPS,
            velocity_iterations: VELOCITY_ITERATIONS,
            internal_iterations: INTERNAL_ITERATIONS,
        }
    }
}

/// The simulation world
pub struct PhysicsWorld {
    config: SolverConfig,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    time: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl PhysicsWorld {
    pub fn new(config: SolverConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations as usize).unwrap_or(NonZeroUsize::MIN);
        integration_parameters.num_internal_pgs_iterations = config.internal_iterations.max(1) as usize;

        Self {
            config,
            gravity: to_na(GRAVITY),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            time: 0.0,
        }
    }

    /// Create a body with one collider. Both carry the owner id in
    /// `user_data`.
    pub fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let user_data = desc.owner.to_user_data();
        let dynamic = desc.body_type == BodyType::Dynamic;

        let body = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(to_na(desc.position))
            .rotation(desc.angle)
            .linvel(to_na(desc.linear_velocity))
            .ccd_enabled(dynamic)
            .can_sleep(!dynamic)
            .user_data(user_data)
            .build();
        let body = self.bodies.insert(body);

        let collider = desc
            .shape
            .collider()
            .restitution(desc.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .user_data(user_data)
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        BodyHandle { body, collider }
    }

    /// Remove a body and its collider; contacts it was part of end without
    /// a callback
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.remove_rapier_body(handle.body)
    }

    fn remove_rapier_body(&mut self, body: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.body)
    }

    /// Position and rotation of a live body
    pub fn pose(&self, handle: BodyHandle) -> Option<(Vec2, f32)> {
        let body = self.bodies.get(handle.body)?;
        Some((from_na(body.translation()), body.rotation().angle()))
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        Some(from_na(self.bodies.get(handle.body)?.linvel()))
    }

    /// Teleport a body. Kinematic bodies also get the pose as their next
    /// target so the following step leaves them there.
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(handle.body) else {
            return false;
        };
        body.set_translation(to_na(position), true);
        if body.is_kinematic() {
            body.set_next_kinematic_translation(to_na(position));
        }
        true
    }

    /// Static bodies keep zero velocity
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        match self.bodies.get_mut(handle.body) {
            Some(body) if !body.is_fixed() => {
                body.set_linvel(to_na(velocity), true);
                true
            }
            _ => false,
        }
    }

    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Simulated seconds since creation or the last clear
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Whether the two bodies had an active contact after the last step
    pub fn is_touching(&self, a: BodyHandle, b: BodyHandle) -> bool {
        if !self.colliders.contains(a.collider) || !self.colliders.contains(b.collider) {
            return false;
        }
        self.narrow_phase
            .contact_pair(a.collider, b.collider)
            .is_some_and(|pair| pair.has_any_active_contact)
    }

    /// Drop every body. Handles issued before stay dead.
    pub fn clear(&mut self) {
        let handles: Vec<RigidBodyHandle> = self.bodies.iter().map(|(handle, _)| handle).collect();
        for handle in handles {
            self.remove_rapier_body(handle);
        }
        self.time = 0.0;
    }

    /// Advance by `dt` seconds; `dt <= 0` (or NaN) does nothing
    pub fn step(&mut self, dt: f32, listener: &mut dyn ContactListener) {
        if !(dt > 0.0) {
            return;
        }

        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        let sub_steps = self.config.sub_steps.max(1);
        self.integration_parameters.dt = dt / sub_steps as f32;
        for _ in 0..sub_steps {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &event_handler,
            );
        }
        self.time += dt;

        while let Ok(event) = collision_recv.try_recv() {
            // Removal stops carry no live collider to report against
            if event.removed() {
                continue;
            }
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };
            let (Some(a), Some(b)) = (self.owner_of(h1), self.owner_of(h2)) else {
                continue;
            };
            if started {
                listener.begin_contact(a, b);
            } else {
                listener.end_contact(a, b);
            }
        }
    }

    fn owner_of(&self, collider: ColliderHandle) -> Option<ObjectId> {
        self.colliders
            .get(collider)
            .map(|collider| ObjectId::from_user_data(collider.user_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::object::{PhysicsLocation, PhysicsObject, Shape};
    use crate::sim::registry::ObjectRegistry;

    /// Records transitions as (begin?, a, b)
    #[derive(Default)]
    struct Recorder {
        events: Vec<(bool, ObjectId, ObjectId)>,
    }

    impl ContactListener for Recorder {
        fn begin_contact(&mut self, a: ObjectId, b: ObjectId) {
            self.events.push((true, a, b));
        }

        fn end_contact(&mut self, a: ObjectId, b: ObjectId) {
            self.events.push((false, a, b));
        }
    }

    fn owner(registry: &mut ObjectRegistry, name: &str) -> ObjectId {
        registry
            .insert(name, PhysicsObject::circle(1.0, PhysicsLocation::default()))
            .unwrap()
    }

    fn ball_desc(owner: ObjectId, position: Vec2, velocity: Vec2) -> BodyDesc {
        BodyDesc::new(BodyType::Dynamic, Shape::Circle { radius: 2.0 }, owner)
            .with_position(position)
            .with_velocity(velocity)
            .with_restitution(1.0)
    }

    fn wall_desc(owner: ObjectId, position: Vec2) -> BodyDesc {
        BodyDesc::new(
            BodyType::Static,
            Shape::Box {
                half_extents: Vec2::new(0.5, 100.0),
            },
            owner,
        )
        .with_position(position)
        .with_restitution(1.0)
    }

    #[test]
    fn test_free_flight_is_linear() {
        let mut registry = ObjectRegistry::new();
        let mut world = PhysicsWorld::default();
        let ball = world.create_body(ball_desc(
            owner(&mut registry, "ball"),
            Vec2::ZERO,
            Vec2::new(3.0, 4.0),
        ));

        let mut recorder = Recorder::default();
        world.step(0.5, &mut recorder);

        let (pos, _) = world.pose(ball).unwrap();
        assert!((pos - Vec2::new(1.5, 2.0)).length() < 0.001);
        assert!(recorder.events.is_empty());
        assert!((world.time() - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_non_positive_dt_does_nothing() {
        let mut registry = ObjectRegistry::new();
        let mut world = PhysicsWorld::default();
        let ball = world.create_body(ball_desc(
            owner(&mut registry, "ball"),
            Vec2::ZERO,
            Vec2::X,
        ));

        let mut recorder = Recorder::default();
        world.step(0.0, &mut recorder);
        world.step(-1.0, &mut recorder);
        world.step(f32::NAN, &mut recorder);

        assert_eq!(world.pose(ball).map(|(p, _)| p), Some(Vec2::ZERO));
        assert_eq!(world.time(), 0.0);
    }

    #[test]
    fn test_elastic_bounce_off_static_wall() {
        let mut registry = ObjectRegistry::new();
        let ball_owner = owner(&mut registry, "ball");
        let wall_owner = owner(&mut registry, "wall");

        let mut world = PhysicsWorld::default();
        let ball = world.create_body(ball_desc(ball_owner, Vec2::ZERO, Vec2::new(10.0, 5.0)));
        let wall = world.create_body(wall_desc(wall_owner, Vec2::new(10.5, 0.0)));

        let mut recorder = Recorder::default();
        for _ in 0..120 {
            world.step(1.0 / 60.0, &mut recorder);
        }

        let velocity = world.linear_velocity(ball).unwrap();
        assert!(velocity.x < 0.0, "ball should be moving away");
        assert!((velocity.x + 10.0).abs() < 0.2);
        assert!((velocity.y - 5.0).abs() < 0.2);
        // Never tunnels through the wall's inner face
        assert!(world.pose(ball).unwrap().0.x < 10.0);
        assert!(!world.is_touching(ball, wall));

        // One begin and one end, despite several sub-steps in contact range
        let begins = recorder.events.iter().filter(|e| e.0).count();
        let ends = recorder.events.iter().filter(|e| !e.0).count();
        assert_eq!(begins, 1);
        assert_eq!(ends, 1);
        let (_, a, b) = recorder.events[0];
        assert!((a, b) == (ball_owner, wall_owner) || (a, b) == (wall_owner, ball_owner));
    }

    #[test]
    fn test_static_pairs_are_ignored() {
        let mut registry = ObjectRegistry::new();
        let mut world = PhysicsWorld::default();
        world.create_body(wall_desc(owner(&mut registry, "a"), Vec2::ZERO));
        world.create_body(wall_desc(owner(&mut registry, "b"), Vec2::new(0.5, 0.0)));

        let mut recorder = Recorder::default();
        world.step(1.0 / 60.0, &mut recorder);
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_removed_body_leaves_contacts() {
        let mut registry = ObjectRegistry::new();
        let mut world = PhysicsWorld::default();
        let ball = world.create_body(ball_desc(
            owner(&mut registry, "ball"),
            Vec2::new(8.6, 0.0),
            Vec2::ZERO,
        ));
        let wall = world.create_body(wall_desc(owner(&mut registry, "wall"), Vec2::new(10.5, 0.0)));

        let mut recorder = Recorder::default();
        world.step(1.0 / 60.0, &mut recorder);
        assert!(world.is_touching(ball, wall));

        assert!(world.remove_body(wall));
        assert!(!world.is_touching(ball, wall));
        assert!(!world.contains(wall));
        assert!(!world.remove_body(wall));
        assert_eq!(world.num_bodies(), 1);

        // The removal does not surface as an end contact
        let before = recorder.events.len();
        world.step(1.0 / 60.0, &mut recorder);
        assert_eq!(recorder.events.len(), before);
    }

    #[test]
    fn test_static_body_rejects_velocity() {
        let mut registry = ObjectRegistry::new();
        let mut world = PhysicsWorld::default();
        let wall = world.create_body(wall_desc(owner(&mut registry, "wall"), Vec2::ZERO));
        assert!(!world.set_linear_velocity(wall, Vec2::X));
        assert!(world.set_position(wall, Vec2::Y));
        assert_eq!(world.pose(wall).map(|(p, _)| p), Some(Vec2::Y));
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut registry = ObjectRegistry::new();
        let mut world = PhysicsWorld::default();
        let ball = world.create_body(ball_desc(owner(&mut registry, "ball"), Vec2::ZERO, Vec2::X));
        world.step(0.1, &mut Recorder::default());

        world.clear();
        assert_eq!(world.num_bodies(), 0);
        assert_eq!(world.time(), 0.0);

        let fresh = world.create_body(ball_desc(owner(&mut registry, "fresh"), Vec2::ZERO, Vec2::ZERO));
        assert_ne!(fresh, ball);
        assert!(world.pose(ball).is_none());
        assert!(world.pose(fresh).is_some());
    }
}
