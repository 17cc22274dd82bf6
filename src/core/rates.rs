use super::game_state::PlayerState;
use super::tables::level_multiplier;
use super::tracks::Track;
use serde::Serialize;

/// Live production and travel rates derived from levels and prestige bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rates {
    /// Moon dust per click.
    pub click_yield: f64,
    /// Moon dust per tick.
    pub passive_yield: f64,
    /// Distance travelled per tick.
    pub travel_speed: f64,
}

/// Derives the current rates. Always recomputed; levels and multipliers may
/// change between any two calls.
pub fn compute_rates(state: &PlayerState) -> Rates {
    Rates {
        click_yield: track_rate(state, Track::Collection),
        passive_yield: track_rate(state, Track::Probe),
        travel_speed: track_rate(state, Track::Engines),
    }
}

fn track_rate(state: &PlayerState, track: Track) -> f64 {
    level_multiplier(track, state.level(track)) * state.prestige_multiplier(track)
}
