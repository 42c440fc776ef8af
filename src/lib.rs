//! Fruit Merge - a physics-driven merge puzzle
//!
//! Core modules:
//! - `sim`: Merge rules and piece lifecycle (tiers, registry, resolver, score, skins, session)
//! - `physics`: Engine boundary trait plus a small reference world
//! - `share`: Share-link token codec
//! - `settings`: Persisted configuration
//! - `web`: wasm-bindgen entry points (wasm32 only)

pub mod error;
pub mod physics;
pub mod settings;
pub mod share;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{GameError, Result};
pub use settings::Settings;
pub use share::{SharePayload, ShareCodec};
pub use sim::{Piece, Session, Tier, TierTable};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Downward acceleration (units/s², +y is down)
    pub const GRAVITY: f32 = 980.0;
    /// Speed cap so small pieces cannot tunnel through walls
    pub const MAX_BODY_SPEED: f32 = 2000.0;
    /// Bounciness of every fruit
    pub const FRUIT_RESTITUTION: f32 = 0.5;

    /// Container walls sit just outside the visible arena
    pub const WALL_THICKNESS: f32 = 20.0;
    /// Pieces this far below the floor have left the container
    pub const ESCAPE_MARGIN: f32 = 200.0;
}

/// Arithmetic mean of two positions
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}
