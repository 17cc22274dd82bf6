//! Simulation configuration.

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of simulated players
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Maximum ticks per run before timeout
    pub max_ticks_per_run: u64,

    /// Rebirths a run must reach to count as completed
    pub target_rebirths: u32,

    /// Upper bound of the clicks made each tick; the bot picks 0..=N
    pub max_clicks_per_tick: u32,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            max_ticks_per_run: 1_000_000,
            target_rebirths: 3,
            max_clicks_per_tick: 5,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// A player who never clicks and relies on the route alone.
    pub fn idle_only() -> Self {
        Self {
            max_clicks_per_tick: 0,
            ..Default::default()
        }
    }

    /// Small batch for a fast sanity check.
    pub fn quick() -> Self {
        Self {
            num_runs: 10,
            target_rebirths: 1,
            ..Default::default()
        }
    }

    /// Long prestige grind to see how compounding bonuses pay off.
    pub fn long_prestige() -> Self {
        Self {
            num_runs: 20,
            target_rebirths: 30,
            max_ticks_per_run: 5_000_000,
            ..Default::default()
        }
    }
}
