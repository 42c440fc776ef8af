//! Merge resolution
//!
//! Applies the merge rule to one collision batch:
//! 1. Both bodies must still be registered pieces (first-seen pair wins)
//! 2. Tiers must match (registry tiers, not reported radii)
//! 3. The terminal tier never merges
//! 4. Two pieces of tier `i` become one of tier `i + 1` at their midpoint,
//!    crediting the score value of tier `i`
//!
//! Pieces spawned while resolving a batch only merge on a later batch. Handles
//! consumed or spawned earlier in the batch are skipped even if the engine has
//! already recycled them.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::Serialize;

use super::customize::CustomizationStore;
use super::registry::{Piece, PieceRegistry};
use super::score::ScoreLedger;
use super::tiers::TierTable;
use crate::midpoint;
use crate::physics::{BodyHandle, ContactPair, PhysicsEngine};

/// Allowed drift between a reported body radius and its tier radius
const RADIUS_TOLERANCE: f32 = 1e-3;

/// One completed merge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeEvent {
    /// The two bodies that merged away
    pub consumed: [BodyHandle; 2],
    /// Tier of the consumed pieces
    pub from_tier: usize,
    /// Replacement piece (tier `from_tier + 1`)
    pub spawned: Piece,
    pub position: Vec2,
    /// Score credited for this merge
    pub credited: u64,
}

/// Resolve every pair in `batch`, in order. Returns the merges performed.
pub fn resolve_batch<E: PhysicsEngine>(
    registry: &mut PieceRegistry<E>,
    ledger: &mut ScoreLedger,
    customization: &CustomizationStore,
    batch: &[ContactPair],
) -> Vec<MergeEvent> {
    let mut events = Vec::new();
    // Handles merged away or freshly spawned during this batch
    let mut touched: BTreeSet<BodyHandle> = BTreeSet::new();

    for pair in batch {
        if pair.a.handle == pair.b.handle {
            log::trace!("Ignoring self-contact on {:?}", pair.a.handle);
            continue;
        }
        if touched.contains(&pair.a.handle) || touched.contains(&pair.b.handle) {
            log::trace!(
                "Skipping stale contact {:?} / {:?}",
                pair.a.handle,
                pair.b.handle
            );
            continue;
        }

        // Walls are not pieces, and pieces merged earlier in this batch are gone
        let (Ok(a), Ok(b)) = (registry.lookup(pair.a.handle), registry.lookup(pair.b.handle))
        else {
            log::trace!(
                "Skipping contact {:?} / {:?}: not two live pieces",
                pair.a.handle,
                pair.b.handle
            );
            continue;
        };

        check_reported_radius(registry.tiers(), a, pair.a.radius);
        check_reported_radius(registry.tiers(), b, pair.b.radius);

        if a.tier != b.tier {
            continue;
        }

        let Some(next_tier) = registry.tiers().next(a.tier) else {
            log::trace!("Terminal tier contact {:?} / {:?}", a.handle, b.handle);
            continue;
        };

        touched.insert(a.handle);
        touched.insert(b.handle);
        if let Some(event) = merge_pair(registry, ledger, customization, a, b, next_tier) {
            touched.insert(event.spawned.handle);
            events.push(event);
        }
    }

    events
}

fn merge_pair<E: PhysicsEngine>(
    registry: &mut PieceRegistry<E>,
    ledger: &mut ScoreLedger,
    customization: &CustomizationStore,
    a: Piece,
    b: Piece,
    next_tier: usize,
) -> Option<MergeEvent> {
    let (Some(pos_a), Some(pos_b)) = (registry.position(a.handle), registry.position(b.handle))
    else {
        log::error!("Registered pieces {:?} / {:?} have no position", a.handle, b.handle);
        return None;
    };
    let score_value = match registry.tiers().tier_at(a.tier) {
        Ok(tier) => tier.score_value,
        Err(err) => {
            log::error!("Merge of {:?} / {:?} skipped: {err}", a.handle, b.handle);
            return None;
        }
    };

    let position = midpoint(pos_a, pos_b);

    for piece in [a, b] {
        if let Err(err) = registry.remove(piece) {
            log::error!("Merge removal failed: {err}");
        }
    }

    let spawned = match registry.spawn(next_tier, position, customization) {
        Ok(piece) => piece,
        Err(err) => {
            log::error!("Merge spawn failed: {err}");
            return None;
        }
    };

    ledger.credit(score_value);
    log::debug!(
        "Merged tier {} pieces {:?} + {:?} -> {:?} (+{score_value}, total {})",
        a.tier,
        a.handle,
        b.handle,
        spawned.handle,
        ledger.current()
    );

    Some(MergeEvent {
        consumed: [a.handle, b.handle],
        from_tier: a.tier,
        spawned,
        position,
        credited: score_value,
    })
}

/// Cross-check the engine's radius against the registry's tier.
/// A mismatch is an internal consistency error; the registry still wins.
fn check_reported_radius(tiers: &TierTable, piece: Piece, reported: Option<f32>) {
    let Ok(tier) = tiers.tier_at(piece.tier) else {
        log::error!("Piece {:?} registered at unknown tier {}", piece.handle, piece.tier);
        return;
    };
    match reported {
        Some(radius) if (radius - tier.radius).abs() <= RADIUS_TOLERANCE => {}
        Some(radius) => log::error!(
            "Consistency error: piece {:?} is tier {} (radius {}) but engine reports {radius}",
            piece.handle,
            piece.tier,
            tier.radius
        ),
        None => log::error!(
            "Consistency error: piece {:?} is not a circle in the engine",
            piece.handle
        ),
    }
}
