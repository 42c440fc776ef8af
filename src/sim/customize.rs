//! Per-tier custom skins
//!
//! Players may replace the image of any tier. Payloads are opaque strings
//! (usually data URIs); tiers without one use the built-in asset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::physics::Sprite;

/// Immutable, ordered copy of the store's contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomizationSnapshot(BTreeMap<usize, String>);

impl CustomizationSnapshot {
    pub fn new(images: BTreeMap<usize, String>) -> Self {
        Self(images)
    }

    pub fn get(&self, tier: usize) -> Option<&str> {
        self.0.get(&tier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending tier order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(&tier, payload)| (tier, payload.as_str()))
    }

    /// Check every key is a real tier and every payload is non-empty
    pub fn validate(&self, tier_count: usize) -> Result<()> {
        for (&tier, payload) in &self.0 {
            if tier >= tier_count {
                return Err(GameError::malformed(format!(
                    "custom image for tier {tier} but only {tier_count} tiers"
                )));
            }
            if payload.is_empty() {
                return Err(GameError::malformed(format!("empty custom image for tier {tier}")));
            }
        }
        Ok(())
    }
}

/// Mapping from tier index to an optional custom image
#[derive(Debug, Clone)]
pub struct CustomizationStore {
    tier_count: usize,
    images: BTreeMap<usize, String>,
}

impl CustomizationStore {
    pub fn new(tier_count: usize) -> Self {
        Self {
            tier_count,
            images: BTreeMap::new(),
        }
    }

    /// Rebuild a store from a decoded snapshot
    pub fn from_snapshot(tier_count: usize, snapshot: CustomizationSnapshot) -> Result<Self> {
        snapshot.validate(tier_count)?;
        Ok(Self {
            tier_count,
            images: snapshot.0,
        })
    }

    /// Set (or with an empty payload, clear) the custom image for a tier
    pub fn set_image(&mut self, tier: usize, payload: impl Into<String>) -> Result<()> {
        if tier >= self.tier_count {
            return Err(GameError::InvalidTier {
                index: tier,
                count: self.tier_count,
            });
        }

        let payload = payload.into();
        if payload.is_empty() {
            self.images.remove(&tier);
        } else {
            self.images.insert(tier, payload);
        }
        Ok(())
    }

    /// Custom payload for a tier, or None when the default asset applies
    pub fn get_image(&self, tier: usize) -> Option<&str> {
        self.images.get(&tier).map(String::as_str)
    }

    /// Sprite to attach to a freshly spawned piece of `tier`
    pub fn sprite_for(&self, tier: usize, asset_pattern: &str) -> Sprite {
        match self.get_image(tier) {
            Some(payload) => Sprite::Custom(payload.to_owned()),
            None => Sprite::Asset(default_asset(asset_pattern, tier)),
        }
    }

    pub fn snapshot(&self) -> CustomizationSnapshot {
        CustomizationSnapshot(self.images.clone())
    }

    pub fn custom_count(&self) -> usize {
        self.images.len()
    }
}

/// Expand `{index}` in the asset pattern
pub fn default_asset(pattern: &str, tier: usize) -> String {
    pattern.replace("{index}", &tier.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_image() {
        let mut store = CustomizationStore::new(3);
        assert_eq!(store.get_image(2), None);

        store.set_image(2, "X").unwrap();
        assert_eq!(store.get_image(2), Some("X"));

        store.set_image(2, "Y").unwrap();
        assert_eq!(store.get_image(2), Some("Y"));
        assert_eq!(store.get_image(1), None);
    }

    #[test]
    fn test_set_image_rejects_bad_tier() {
        let mut store = CustomizationStore::new(3);
        assert_eq!(
            store.set_image(3, "X"),
            Err(GameError::InvalidTier { index: 3, count: 3 })
        );
        assert_eq!(store.custom_count(), 0);
    }

    #[test]
    fn test_empty_payload_restores_default() {
        let mut store = CustomizationStore::new(3);
        store.set_image(0, "X").unwrap();
        store.set_image(0, "").unwrap();
        assert_eq!(store.get_image(0), None);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_sprite_falls_back_to_asset() {
        let mut store = CustomizationStore::new(3);
        store.set_image(1, "data:image/png;base64,AAAA").unwrap();

        assert_eq!(
            store.sprite_for(0, "fruit{index}.png"),
            Sprite::Asset("fruit0.png".into())
        );
        assert_eq!(
            store.sprite_for(1, "fruit{index}.png"),
            Sprite::Custom("data:image/png;base64,AAAA".into())
        );
    }

    #[test]
    fn test_from_snapshot_validates() {
        let mut images = BTreeMap::new();
        images.insert(5, "X".to_string());
        let snapshot = CustomizationSnapshot::new(images);

        assert!(matches!(
            CustomizationStore::from_snapshot(3, snapshot.clone()),
            Err(GameError::MalformedPayload(_))
        ));
        let store = CustomizationStore::from_snapshot(10, snapshot.clone()).unwrap();
        assert_eq!(store.snapshot(), snapshot);
    }
}
