//! Physics engine boundary
//!
//! The merge core only talks to [`PhysicsEngine`]. [`World`] is a small
//! fixed-timestep reference implementation used by the runner, the web
//! binding and the tests:
//! - Gravity along +y (screen coordinates)
//! - Static axis-aligned boxes for the container walls
//! - Dynamic circles with restitution
//! - Collision-start batches (a pair is reported once per contact)

pub mod body;
pub mod collision;
pub mod world;

pub use body::{Body, BodyHandle, Shape, Sprite};
pub use collision::{ContactResult, circle_box_contact, circle_circle_contact};
pub use world::World;

use glam::Vec2;
use serde::Serialize;

/// One side of a contact pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactBody {
    pub handle: BodyHandle,
    /// Circle radius as reported by the engine (None for non-circles)
    pub radius: Option<f32>,
}

/// Two bodies that started touching during a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactPair {
    pub a: ContactBody,
    pub b: ContactBody,
}

impl ContactPair {
    pub fn new(a: ContactBody, b: ContactBody) -> Self {
        Self { a, b }
    }
}

/// All collision-start pairs from one step, in delivery order
pub type CollisionBatch = Vec<ContactPair>;

/// Capabilities the merge core needs from a physics engine
pub trait PhysicsEngine {
    /// Add a static rectangular body centered at `center`
    fn add_boundary(&mut self, center: Vec2, size: Vec2) -> BodyHandle;

    /// Add a dynamic circle
    fn add_circle(&mut self, position: Vec2, radius: f32, restitution: f32) -> BodyHandle;

    /// Attach a sprite reference to a body. Returns false for unknown bodies.
    fn attach_sprite(&mut self, handle: BodyHandle, sprite: Sprite) -> bool;

    /// Remove a body from the world. Returns false if it was not present.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Current position of a body
    fn position(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Advance one fixed step and report the contacts that started during it
    fn step(&mut self, dt: f32) -> CollisionBatch;

    /// Stop stepping and release every body
    fn teardown(&mut self);
}
