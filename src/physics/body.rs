//! Rigid bodies owned by the physics world

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque body identity. Only equality and ordering are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// Raw id, for exporting to a renderer
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned box, static only
    Box { half_extents: Vec2 },
}

impl Shape {
    pub fn circle_radius(&self) -> Option<f32> {
        match *self {
            Shape::Circle { radius } => Some(radius),
            Shape::Box { .. } => None,
        }
    }
}

/// Visual reference attached to a body, opaque to the simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sprite {
    /// Built-in per-tier asset path
    Asset(String),
    /// Player-supplied image payload (e.g. a data URI)
    Custom(String),
}

impl Sprite {
    /// Texture source as a renderer would consume it
    pub fn source(&self) -> &str {
        match self {
            Sprite::Asset(path) => path,
            Sprite::Custom(payload) => payload,
        }
    }
}

/// A body in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub handle: BodyHandle,
    pub shape: Shape,
    pub pos: Vec2,
    pub vel: Vec2,
    pub restitution: f32,
    pub is_static: bool,
    pub sprite: Option<Sprite>,
}

impl Body {
    pub fn new_static_box(handle: BodyHandle, center: Vec2, size: Vec2) -> Self {
        Self {
            handle,
            shape: Shape::Box {
                half_extents: size / 2.0,
            },
            pos: center,
            vel: Vec2::ZERO,
            restitution: 0.0,
            is_static: true,
            sprite: None,
        }
    }

    pub fn new_circle(handle: BodyHandle, pos: Vec2, radius: f32, restitution: f32) -> Self {
        Self {
            handle,
            shape: Shape::Circle { radius },
            pos,
            vel: Vec2::ZERO,
            restitution,
            is_static: false,
            sprite: None,
        }
    }

    /// Inverse mass (zero for static bodies). Mass scales with disc area.
    pub fn inv_mass(&self) -> f32 {
        if self.is_static {
            return 0.0;
        }
        match self.shape {
            Shape::Circle { radius } => 1.0 / (radius * radius).max(f32::EPSILON),
            Shape::Box { .. } => 0.0,
        }
    }
}
