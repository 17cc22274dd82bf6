//! Rebirth (prestige reset) and prestige-point spending.

use super::constants::{PRESTIGE_MULTIPLIER_STEP, PRESTIGE_POINTS_PER_REBIRTH};
use super::error::GameError;
use super::game_logic::round2;
use super::game_state::PlayerState;
use super::tracks::{PerTrack, Track};

/// A rebirth needs the final stage of the route.
pub fn can_rebirth(state: &PlayerState) -> bool {
    state.at_final_stage()
}

/// Resets the run in exchange for a prestige point.
///
/// Currency, carry, levels and route position go back to zero. Prestige
/// multipliers and unspent points survive.
pub fn handle_rebirth(state: &PlayerState) -> Result<PlayerState, GameError> {
    if !can_rebirth(state) {
        return Err(GameError::RouteNotComplete);
    }

    Ok(PlayerState {
        currency: 0,
        fractional_carry: 0.0,
        levels: PerTrack::splat(0),
        prestige_multipliers: state.prestige_multipliers,
        route_index: 0,
        route_progress: 0.0,
        prestige_points: state
            .prestige_points
            .saturating_add(PRESTIGE_POINTS_PER_REBIRTH),
    })
}

/// Spends one prestige point on a permanent +0.1 bonus for `track`.
///
/// The result is rounded to two decimals and later purchases build on the
/// rounded value.
pub fn handle_spend_prestige(state: &PlayerState, track: Track) -> Result<PlayerState, GameError> {
    if state.prestige_points == 0 {
        return Err(GameError::InsufficientPrestigePoints);
    }

    let mut next = state.clone();
    next.prestige_points -= 1;
    let raised = round2(state.prestige_multiplier(track) + PRESTIGE_MULTIPLIER_STEP);
    next.prestige_multipliers.set(track, raised);
    Ok(next)
}
