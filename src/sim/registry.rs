//! Piece registry
//!
//! Owns the physics engine and the handle -> tier mapping, so the two can
//! never drift apart: every body creation or removal goes through here.
//! Dropping the registry tears the engine down.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::customize::CustomizationStore;
use super::tiers::TierTable;
use crate::consts::FRUIT_RESTITUTION;
use crate::error::{GameError, Result};
use crate::physics::{BodyHandle, CollisionBatch, PhysicsEngine};

/// A live fruit: a body plus the tier it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub handle: BodyHandle,
    pub tier: usize,
}

pub struct PieceRegistry<E: PhysicsEngine> {
    engine: E,
    tiers: TierTable,
    /// Default asset path pattern, `{index}` is replaced by the tier
    asset_pattern: String,
    pieces: BTreeMap<BodyHandle, usize>,
}

impl<E: PhysicsEngine> PieceRegistry<E> {
    pub fn new(engine: E, tiers: TierTable, asset_pattern: impl Into<String>) -> Self {
        Self {
            engine,
            tiers,
            asset_pattern: asset_pattern.into(),
            pieces: BTreeMap::new(),
        }
    }

    /// Create a body for a new piece and register it
    pub fn spawn(
        &mut self,
        tier: usize,
        position: Vec2,
        customization: &CustomizationStore,
    ) -> Result<Piece> {
        let radius = self
            .tiers
            .tier_at(tier)
            .map_err(|_| GameError::InvalidTier {
                index: tier,
                count: self.tiers.tier_count(),
            })?
            .radius;

        let handle = self.engine.add_circle(position, radius, FRUIT_RESTITUTION);
        let sprite = customization.sprite_for(tier, &self.asset_pattern);
        if !self.engine.attach_sprite(handle, sprite) {
            log::warn!("Engine rejected sprite for new body {handle:?}");
        }
        self.pieces.insert(handle, tier);

        log::debug!(
            "Spawned tier {tier} piece {handle:?} at ({:.1}, {:.1})",
            position.x,
            position.y
        );
        Ok(Piece { handle, tier })
    }

    /// Unregister a piece and remove its body. Repeat removals are rejected
    /// without touching the engine.
    pub fn remove(&mut self, piece: Piece) -> Result<()> {
        if self.pieces.remove(&piece.handle).is_none() {
            return Err(GameError::UnknownPiece(piece.handle));
        }
        if !self.engine.remove_body(piece.handle) {
            log::error!("Registered piece {:?} had no body in the engine", piece.handle);
        }
        Ok(())
    }

    pub fn lookup(&self, handle: BodyHandle) -> Result<Piece> {
        self.pieces
            .get(&handle)
            .map(|&tier| Piece { handle, tier })
            .ok_or(GameError::NotFound(handle))
    }

    /// Add a static container wall (not a piece)
    pub fn add_boundary(&mut self, center: Vec2, size: Vec2) -> BodyHandle {
        self.engine.add_boundary(center, size)
    }

    /// Advance the owned engine by one step
    pub fn step(&mut self, dt: f32) -> CollisionBatch {
        self.engine.step(dt)
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.engine.position(handle)
    }

    /// Live pieces in handle order
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces
            .iter()
            .map(|(&handle, &tier)| Piece { handle, tier })
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: PhysicsEngine> Drop for PieceRegistry<E> {
    fn drop(&mut self) {
        self.engine.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{Sprite, World};

    fn registry() -> PieceRegistry<World> {
        PieceRegistry::new(World::new(Vec2::ZERO), TierTable::default(), "fruit{index}.png")
    }

    #[test]
    fn test_spawn_registers_and_sizes_body() {
        let mut reg = registry();
        let custom = CustomizationStore::new(10);

        let piece = reg.spawn(3, Vec2::new(100.0, 50.0), &custom).unwrap();
        assert_eq!(piece.tier, 3);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.lookup(piece.handle), Ok(piece));

        let body = reg.engine().body(piece.handle).unwrap();
        assert_eq!(body.shape.circle_radius(), Some(35.0));
        assert_eq!(body.pos, Vec2::new(100.0, 50.0));
        assert_eq!(body.restitution, FRUIT_RESTITUTION);
        assert_eq!(body.sprite, Some(Sprite::Asset("fruit3.png".into())));
    }

    #[test]
    fn test_spawn_top_tier_is_legal() {
        let mut reg = registry();
        let custom = CustomizationStore::new(10);
        assert!(reg.spawn(9, Vec2::ZERO, &custom).is_ok());
    }

    #[test]
    fn test_spawn_invalid_tier() {
        let mut reg = registry();
        let custom = CustomizationStore::new(10);

        assert_eq!(
            reg.spawn(10, Vec2::ZERO, &custom),
            Err(GameError::InvalidTier { index: 10, count: 10 })
        );
        assert!(reg.is_empty());
        assert_eq!(reg.engine().body_count(), 0);
    }

    #[test]
    fn test_spawn_attaches_custom_image() {
        let mut reg = registry();
        let mut custom = CustomizationStore::new(10);
        custom.set_image(2, "X").unwrap();

        let two = reg.spawn(2, Vec2::ZERO, &custom).unwrap();
        let one = reg.spawn(1, Vec2::new(200.0, 0.0), &custom).unwrap();

        assert_eq!(
            reg.engine().body(two.handle).unwrap().sprite,
            Some(Sprite::Custom("X".into()))
        );
        assert_eq!(
            reg.engine().body(one.handle).unwrap().sprite,
            Some(Sprite::Asset("fruit1.png".into()))
        );
    }

    #[test]
    fn test_remove_twice_is_safe() {
        let mut reg = registry();
        let custom = CustomizationStore::new(10);
        let piece = reg.spawn(0, Vec2::ZERO, &custom).unwrap();

        assert_eq!(reg.remove(piece), Ok(()));
        assert_eq!(reg.remove(piece), Err(GameError::UnknownPiece(piece.handle)));
        assert_eq!(reg.lookup(piece.handle), Err(GameError::NotFound(piece.handle)));
        assert!(reg.engine().body(piece.handle).is_none());
    }

    #[test]
    fn test_boundaries_are_not_pieces() {
        let mut reg = registry();
        let wall = reg.add_boundary(Vec2::new(200.0, 610.0), Vec2::new(400.0, 20.0));
        assert!(reg.is_empty());
        assert_eq!(reg.lookup(wall), Err(GameError::NotFound(wall)));
        assert_eq!(reg.engine().body_count(), 1);
    }
}
