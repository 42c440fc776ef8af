//! Error taxonomy for the merge core
//!
//! Every variant is recoverable. The stepping loop logs and skips rather
//! than propagating anything out of a collision batch.

use thiserror::Error;

use crate::physics::BodyHandle;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Tier table lookup outside `[0, tier_count)`
    #[error("tier index {index} out of range (tier count {count})")]
    OutOfRange { index: usize, count: usize },

    /// Spawn or customization requested for a tier that does not exist
    #[error("invalid tier {index} (tier count {count})")]
    InvalidTier { index: usize, count: usize },

    /// Removal of a piece the registry no longer tracks
    #[error("unknown piece {0:?}")]
    UnknownPiece(BodyHandle),

    /// Handle lookup for a body that is not a registered piece
    #[error("no piece registered for body {0:?}")]
    NotFound(BodyHandle),

    /// Share token could not be decoded into a valid payload
    #[error("malformed share payload: {0}")]
    MalformedPayload(String),

    /// Tier table failed validation at construction
    #[error("invalid tier table: {0}")]
    InvalidTierTable(String),

    /// Drop coordinate was not a finite number
    #[error("invalid drop coordinate {0}")]
    InvalidDrop(f32),

    /// Settings failed to parse or validate
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl GameError {
    /// Build a `MalformedPayload` from any displayable cause
    pub(crate) fn malformed(cause: impl std::fmt::Display) -> Self {
        GameError::MalformedPayload(cause.to_string())
    }

    /// Message suitable for showing to a player
    pub fn user_message(&self) -> &'static str {
        match self {
            GameError::MalformedPayload(_) => "Could not load shared game",
            GameError::InvalidTier { .. } | GameError::OutOfRange { .. } => "No such fruit",
            GameError::InvalidDrop(_) => "Cannot drop there",
            _ => "Something went wrong",
        }
    }
}
