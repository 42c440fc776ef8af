//! Reference physics world
//!
//! Semi-implicit Euler integration followed by one contact pass per step.
//! Bodies live in a `BTreeMap` so iteration (and therefore contact delivery
//! order) is stable by handle.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use super::body::{Body, BodyHandle, Shape, Sprite};
use super::collision::{circle_box_contact, circle_circle_contact};
use super::{CollisionBatch, ContactBody, ContactPair, PhysicsEngine};
use crate::consts::{GRAVITY, MAX_BODY_SPEED};

/// Distance within which touching bodies count as still in contact
const CONTACT_SLOP: f32 = 0.5;
/// Fraction of circle/circle overlap corrected per step
const POSITION_CORRECTION: f32 = 0.8;
/// Impacts slower than this do not bounce (keeps resting stacks quiet)
const REST_SPEED: f32 = 30.0;

type ContactKey = (BodyHandle, BodyHandle);

fn contact_key(a: BodyHandle, b: BodyHandle) -> ContactKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// Self-contained 2D world of static boxes and dynamic circles
#[derive(Debug, Clone)]
pub struct World {
    bodies: BTreeMap<BodyHandle, Body>,
    gravity: Vec2,
    /// Contacts touching at the end of the previous step
    active_contacts: BTreeSet<ContactKey>,
    next_id: u32,
    running: bool,
    time_ticks: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, GRAVITY))
    }
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravity,
            active_contacts: BTreeSet::new(),
            next_id: 1,
            running: true,
            time_ticks: 0,
        }
    }

    fn allocate_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    /// All bodies in handle order
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| !b.is_static) {
            body.vel += gravity * dt;
            body.vel = body.vel.clamp_length_max(MAX_BODY_SPEED);
            body.pos += body.vel * dt;
        }
    }

    /// Resolve every overlapping pair, returning the keys that touched
    fn resolve_contacts(&mut self) -> Vec<ContactKey> {
        let dynamic: Vec<BodyHandle> = self
            .bodies
            .values()
            .filter(|b| !b.is_static)
            .map(|b| b.handle)
            .collect();
        let statics: Vec<BodyHandle> = self
            .bodies
            .values()
            .filter(|b| b.is_static)
            .map(|b| b.handle)
            .collect();

        let mut touching = Vec::new();

        for (i, &ha) in dynamic.iter().enumerate() {
            for &hb in &dynamic[i + 1..] {
                if self.resolve_circle_pair(ha, hb) {
                    touching.push(contact_key(ha, hb));
                }
            }
            for &hs in &statics {
                if self.resolve_circle_static(ha, hs) {
                    touching.push(contact_key(ha, hs));
                }
            }
        }

        touching
    }

    fn resolve_circle_pair(&mut self, ha: BodyHandle, hb: BodyHandle) -> bool {
        let (Some(a), Some(b)) = (self.bodies.get(&ha), self.bodies.get(&hb)) else {
            return false;
        };
        let (Some(ra), Some(rb)) = (a.shape.circle_radius(), b.shape.circle_radius()) else {
            return false;
        };

        let contact = circle_circle_contact(a.pos, ra + CONTACT_SLOP, b.pos, rb);
        if !contact.hit {
            return false;
        }

        let penetration = contact.penetration - CONTACT_SLOP;
        let inv_a = a.inv_mass();
        let inv_b = b.inv_mass();
        let total = inv_a + inv_b;
        if penetration <= 0.0 || total <= 0.0 {
            return true;
        }

        let normal = contact.normal;
        let restitution = a.restitution.max(b.restitution);
        let correction = normal * (penetration * POSITION_CORRECTION / total);
        let rel_normal_vel = (b.vel - a.vel).dot(normal);
        let impulse = if rel_normal_vel < 0.0 {
            let bounce = if -rel_normal_vel < REST_SPEED { 0.0 } else { restitution };
            -(1.0 + bounce) * rel_normal_vel / total
        } else {
            0.0
        };

        if let Some(a) = self.bodies.get_mut(&ha) {
            a.pos -= correction * inv_a;
            a.vel -= normal * impulse * inv_a;
        }
        if let Some(b) = self.bodies.get_mut(&hb) {
            b.pos += correction * inv_b;
            b.vel += normal * impulse * inv_b;
        }

        true
    }

    fn resolve_circle_static(&mut self, hc: BodyHandle, hs: BodyHandle) -> bool {
        let Some(Shape::Box { half_extents }) = self.bodies.get(&hs).map(|s| s.shape) else {
            return false;
        };
        let Some(box_center) = self.bodies.get(&hs).map(|s| s.pos) else {
            return false;
        };
        let Some(circle) = self.bodies.get_mut(&hc) else {
            return false;
        };
        let Some(radius) = circle.shape.circle_radius() else {
            return false;
        };

        let contact =
            circle_box_contact(circle.pos, radius + CONTACT_SLOP, box_center, half_extents);
        if !contact.hit {
            return false;
        }

        let penetration = contact.penetration - CONTACT_SLOP;
        if penetration > 0.0 {
            circle.pos += contact.normal * penetration;
            let normal_vel = circle.vel.dot(contact.normal);
            if normal_vel < 0.0 {
                let bounce = if -normal_vel < REST_SPEED { 0.0 } else { circle.restitution };
                circle.vel -= (1.0 + bounce) * normal_vel * contact.normal;
            }
        }

        true
    }

    fn contact_body(&self, handle: BodyHandle) -> ContactBody {
        ContactBody {
            handle,
            radius: self.bodies.get(&handle).and_then(|b| b.shape.circle_radius()),
        }
    }
}

impl PhysicsEngine for World {
    fn add_boundary(&mut self, center: Vec2, size: Vec2) -> BodyHandle {
        let handle = self.allocate_handle();
        self.bodies
            .insert(handle, Body::new_static_box(handle, center, size));
        handle
    }

    fn add_circle(&mut self, position: Vec2, radius: f32, restitution: f32) -> BodyHandle {
        let handle = self.allocate_handle();
        self.bodies
            .insert(handle, Body::new_circle(handle, position, radius, restitution));
        handle
    }

    fn attach_sprite(&mut self, handle: BodyHandle, sprite: Sprite) -> bool {
        match self.bodies.get_mut(&handle) {
            Some(body) => {
                body.sprite = Some(sprite);
                true
            }
            None => false,
        }
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        if self.bodies.remove(&handle).is_none() {
            return false;
        }
        self.active_contacts
            .retain(|&(a, b)| a != handle && b != handle);
        true
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.pos)
    }

    fn step(&mut self, dt: f32) -> CollisionBatch {
        if !self.running {
            return Vec::new();
        }

        self.time_ticks += 1;
        self.integrate(dt);

        let touching = self.resolve_contacts();
        let batch: CollisionBatch = touching
            .iter()
            .filter(|key| !self.active_contacts.contains(*key))
            .map(|&(a, b)| ContactPair::new(self.contact_body(a), self.contact_body(b)))
            .collect();

        self.active_contacts = touching.into_iter().collect();
        batch
    }

    fn teardown(&mut self) {
        if self.running {
            log::debug!(
                "Physics world teardown ({} bodies, {} ticks)",
                self.bodies.len(),
                self.time_ticks
            );
        }
        self.running = false;
        self.bodies.clear();
        self.active_contacts.clear();
    }
}
