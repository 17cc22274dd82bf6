use super::constants::{BASE_PRESTIGE_MULTIPLIER, MAX_UPGRADE_LEVEL};
use super::tables::last_stage_index;
use super::tracks::{PerTrack, Track};
use crate::utils::serde_u128_string;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Economic state of one player.
///
/// The engine treats this as a value: every action takes a state and returns
/// a new one, so a rejected action never leaves a half-applied change behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Whole moon dust. Exact integer arithmetic only.
    #[serde(with = "serde_u128_string")]
    pub currency: u128,
    /// Sub-unit remainder of production carried between accruals, in [0, 1).
    pub fractional_carry: f64,
    pub levels: PerTrack<u32>,
    /// Permanent per-track bonus bought with prestige points, >= 1.0.
    pub prestige_multipliers: PerTrack<f64>,
    /// Index of the last stage reached.
    pub route_index: usize,
    /// Progress toward the next stage in [0, 1). Zero at the final stage.
    pub route_progress: f64,
    #[serde(with = "serde_u128_string")]
    pub prestige_points: u128,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerState {
    /// New-player defaults.
    pub fn new() -> Self {
        Self {
            currency: 0,
            fractional_carry: 0.0,
            levels: PerTrack::splat(0),
            prestige_multipliers: PerTrack::splat(BASE_PRESTIGE_MULTIPLIER),
            route_index: 0,
            route_progress: 0.0,
            prestige_points: 0,
        }
    }

    pub fn level(&self, track: Track) -> u32 {
        self.levels.get(track)
    }

    pub fn prestige_multiplier(&self, track: Track) -> f64 {
        self.prestige_multipliers.get(track)
    }

    pub fn at_final_stage(&self) -> bool {
        self.route_index >= last_stage_index()
    }

    /// Checks every state invariant. Used to reject corrupted saves.
    pub fn invariants_hold(&self) -> bool {
        let levels_ok = self.levels.iter().all(|(_, level)| level <= MAX_UPGRADE_LEVEL);
        let multipliers_ok = self
            .prestige_multipliers
            .iter()
            .all(|(_, m)| m.is_finite() && m >= BASE_PRESTIGE_MULTIPLIER);
        let carry_ok = (0.0..1.0).contains(&self.fractional_carry);
        let route_ok = self.route_index <= last_stage_index()
            && (0.0..1.0).contains(&self.route_progress)
            && (self.route_index < last_stage_index() || self.route_progress == 0.0);

        levels_ok && multipliers_ok && carry_ok && route_ok
    }
}

/// A persisted player: identity, credentials and economic state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: Uuid,
    pub nickname: String,
    /// Login token. Never sent to clients.
    pub token: String,
    pub state: PlayerState,
    pub last_save_time: i64,
}

impl PlayerRecord {
    /// Creates a fresh player with a random token.
    pub fn new(nickname: String, current_time: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname,
            token: Uuid::new_v4().simple().to_string(),
            state: PlayerState::new(),
            last_save_time: current_time,
        }
    }
}
