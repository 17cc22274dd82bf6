use super::tracks::Track;
use thiserror::Error;

/// Rejections raised by the simulation engine.
///
/// All of them are recoverable: the caller keeps its original state and
/// reports the message to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{0} is already at the maximum level")]
    MaxLevelReached(Track),

    #[error("not enough moon dust: {required} needed, {available} available")]
    InsufficientFunds { required: u128, available: u128 },

    #[error("the route must reach its final stage before a rebirth")]
    RouteNotComplete,

    #[error("no prestige points to spend")]
    InsufficientPrestigePoints,

    #[error("unknown upgrade track: {0:?}")]
    UnknownTrack(String),
}
