//! Merge core
//!
//! All game rules live here; the physics engine is reached only through the
//! registry. Everything runs on one logical thread:
//! - Collision batches are resolved in delivery order, one step at a time
//! - A body takes part in at most one merge per batch
//! - Registry tier indices are the source of truth for mergeability

pub mod customize;
pub mod merge;
pub mod registry;
pub mod score;
pub mod session;
pub mod tiers;

pub use customize::{CustomizationSnapshot, CustomizationStore};
pub use merge::{MergeEvent, resolve_batch};
pub use registry::{Piece, PieceRegistry};
pub use score::ScoreLedger;
pub use session::{Command, Session};
pub use tiers::{Tier, TierTable};
