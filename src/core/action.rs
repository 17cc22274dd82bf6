use super::error::GameError;
use super::game_logic::{handle_click, handle_upgrade};
use super::game_state::PlayerState;
use super::prestige::{handle_rebirth, handle_spend_prestige};
use super::tracks::Track;

/// A player-initiated action, as opposed to the scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Click,
    Upgrade(Track),
    Rebirth,
    SpendPrestige(Track),
}

impl Action {
    /// Runs the action against `state`. On error `state` is still valid and
    /// unchanged.
    pub fn apply(&self, state: &PlayerState) -> Result<PlayerState, GameError> {
        match *self {
            Action::Click => Ok(handle_click(state)),
            Action::Upgrade(track) => handle_upgrade(state, track),
            Action::Rebirth => handle_rebirth(state),
            Action::SpendPrestige(track) => handle_spend_prestige(state, track),
        }
    }

    /// Purchases and resets are saved right away; clicks wait for the
    /// periodic autosave.
    pub fn saves_immediately(&self) -> bool {
        !matches!(self, Action::Click)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Click => "click",
            Action::Upgrade(_) => "upgrade",
            Action::Rebirth => "rebirth",
            Action::SpendPrestige(_) => "spend_prestige",
        }
    }
}
