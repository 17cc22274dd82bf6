//! Static game data: the travel route and the per-track upgrade tables.

use super::constants::MAX_UPGRADE_LEVEL;
use super::tracks::Track;

/// A milestone on the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub name: &'static str,
    /// Distance travelled from the previous stage. Zero only for the start.
    pub distance_from_previous: f64,
}

const fn stage(name: &'static str, distance_from_previous: f64) -> Stage {
    Stage {
        name,
        distance_from_previous,
    }
}

pub const ROUTE: [Stage; 11] = [
    stage("Terra", 0.0),
    stage("Lua", 300.0),
    stage("Vênus", 1200.0),
    stage("Mercúrio", 1800.0),
    stage("Marte", 2700.0),
    stage("Júpiter", 6000.0),
    stage("Saturno", 9000.0),
    stage("Urano", 12000.0),
    stage("Netuno", 15000.0),
    stage("Plutão", 18000.0),
    stage("Sol", 30000.0),
];

const LEVELS: usize = MAX_UPGRADE_LEVEL as usize + 1;

// Multiplier at each level, 0 being un-upgraded
const COLLECTION_MULTIPLIERS: [f64; LEVELS] =
    [1.0, 1.5, 2.25, 3.5, 5.0, 7.5, 11.5, 17.0, 25.5, 38.5, 60.0];
const PROBE_MULTIPLIERS: [f64; LEVELS] =
    [0.0, 1.0, 2.0, 4.0, 8.0, 12.0, 18.0, 27.0, 40.0, 60.0, 100.0];
const ENGINES_MULTIPLIERS: [f64; LEVELS] =
    [1.0, 1.2, 1.4, 1.6, 1.8, 2.0, 2.4, 2.8, 3.2, 3.6, 4.0];

// Cost to reach level i + 1
const COLLECTION_COSTS: [u128; MAX_UPGRADE_LEVEL as usize] = [
    20, 100, 500, 2_500, 10_000, 50_000, 200_000, 800_000, 3_000_000, 12_000_000,
];
const PROBE_COSTS: [u128; MAX_UPGRADE_LEVEL as usize] = [
    50, 250, 1_200, 6_000, 20_000, 80_000, 300_000, 1_200_000, 4_500_000, 18_000_000,
];
const ENGINES_COSTS: [u128; MAX_UPGRADE_LEVEL as usize] = [
    100, 500, 2_500, 12_000, 50_000, 200_000, 800_000, 3_000_000, 12_000_000, 50_000_000,
];

/// Index of the final stage; a rebirth is only possible there.
pub fn last_stage_index() -> usize {
    ROUTE.len() - 1
}

pub fn stage_at(index: usize) -> Option<&'static Stage> {
    ROUTE.get(index)
}

fn multipliers(track: Track) -> &'static [f64; LEVELS] {
    match track {
        Track::Collection => &COLLECTION_MULTIPLIERS,
        Track::Probe => &PROBE_MULTIPLIERS,
        Track::Engines => &ENGINES_MULTIPLIERS,
    }
}

fn costs(track: Track) -> &'static [u128; MAX_UPGRADE_LEVEL as usize] {
    match track {
        Track::Collection => &COLLECTION_COSTS,
        Track::Probe => &PROBE_COSTS,
        Track::Engines => &ENGINES_COSTS,
    }
}

/// Base multiplier of `track` at `level`. Levels above the cap read the cap.
pub fn level_multiplier(track: Track, level: u32) -> f64 {
    let level = level.min(MAX_UPGRADE_LEVEL) as usize;
    multipliers(track)[level]
}

/// Cost to raise `track` to `target_level`, or `None` outside 1..=10.
pub fn upgrade_cost(track: Track, target_level: u32) -> Option<u128> {
    if target_level == 0 || target_level > MAX_UPGRADE_LEVEL {
        return None;
    }
    Some(costs(track)[target_level as usize - 1])
}
