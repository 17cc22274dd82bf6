//! Greedy player policy used by the simulator.

use crate::core::game_logic::{handle_upgrade, next_upgrade_cost};
use crate::core::prestige::handle_spend_prestige;
use crate::core::tracks::Track;
use crate::core::PlayerState;

/// Buys the cheapest affordable upgrade until nothing is affordable, and
/// spends prestige points on the tracks in turn.
#[derive(Debug, Clone, Default)]
pub struct Bot {
    next_spend: usize,
}

impl Bot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cheapest upgrade `state` can pay for right now. Ties go to the
    /// earlier track.
    pub fn cheapest_affordable(state: &PlayerState) -> Option<Track> {
        Track::all()
            .into_iter()
            .filter_map(|track| next_upgrade_cost(state, track).map(|cost| (track, cost)))
            .filter(|&(_, cost)| cost <= state.currency)
            .min_by_key(|&(_, cost)| cost)
            .map(|(track, _)| track)
    }

    /// Returns the new state and how many upgrades were bought.
    pub fn buy_upgrades(&self, state: &PlayerState) -> (PlayerState, u32) {
        let mut state = state.clone();
        let mut bought = 0;
        while let Some(track) = Self::cheapest_affordable(&state) {
            match handle_upgrade(&state, track) {
                Ok(next) => {
                    state = next;
                    bought += 1;
                }
                Err(_) => break,
            }
        }
        (state, bought)
    }

    /// Spends every prestige point, cycling Collection, Probe, Engines.
    pub fn spend_points(&mut self, state: &PlayerState) -> PlayerState {
        let tracks = Track::all();
        let mut state = state.clone();
        while state.prestige_points > 0 {
            let track = tracks[self.next_spend % tracks.len()];
            match handle_spend_prestige(&state, track) {
                Ok(next) => {
                    state = next;
                    self.next_spend += 1;
                }
                Err(_) => break,
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::MAX_UPGRADE_LEVEL;

    #[test]
    fn test_cheapest_affordable_prefers_lowest_cost() {
        let mut state = PlayerState::new();
        state.currency = 19;
        assert_eq!(Bot::cheapest_affordable(&state), None);

        state.currency = 60;
        assert_eq!(Bot::cheapest_affordable(&state), Some(Track::Collection));

        state.levels.set(Track::Collection, 1);
        // Collection now costs 100, Probe 50
        assert_eq!(Bot::cheapest_affordable(&state), Some(Track::Probe));
    }

    #[test]
    fn test_cheapest_affordable_skips_maxed_tracks() {
        let mut state = PlayerState::new();
        state.levels.set(Track::Collection, MAX_UPGRADE_LEVEL);
        state.currency = 50;
        assert_eq!(Bot::cheapest_affordable(&state), Some(Track::Probe));
    }

    #[test]
    fn test_buy_upgrades_spends_until_broke() {
        let mut state = PlayerState::new();
        state.currency = 170;

        let (state, bought) = Bot::new().buy_upgrades(&state);
        // 20 (collection) + 50 (probe) + 100 (collection or engines)
        assert_eq!(bought, 3);
        assert_eq!(state.currency, 0);
    }

    #[test]
    fn test_spend_points_round_robin() {
        let mut bot = Bot::new();
        let mut state = PlayerState::new();
        state.prestige_points = 4;

        let state = bot.spend_points(&state);
        assert_eq!(state.prestige_points, 0);
        assert_eq!(state.prestige_multiplier(Track::Collection), 1.2);
        assert_eq!(state.prestige_multiplier(Track::Probe), 1.1);
        assert_eq!(state.prestige_multiplier(Track::Engines), 1.1);

        let mut state = state;
        state.prestige_points = 1;
        let state = bot.spend_points(&state);
        assert_eq!(state.prestige_multiplier(Track::Probe), 1.2);
    }
}
