//! Main simulation runner.
//!
//! Each simulated tick mirrors a live player's second: some clicks, any
//! affordable purchases, then the scheduled tick.

use super::bot::Bot;
use super::config::SimConfig;
use super::report::{RunStats, SimReport};
use crate::core::game_logic::{handle_click, handle_tick};
use crate::core::prestige::{can_rebirth, handle_rebirth};
use crate::core::PlayerState;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut all_runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(run_idx as u64)),
            None => ChaCha8Rng::from_entropy(),
        };

        let stats = simulate_single_run(config, &mut rng);
        if config.verbosity >= 2 {
            println!(
                "Run {}/{} - Ticks {}, Rebirths {}, Clicks {}, Upgrades {}",
                run_idx + 1,
                config.num_runs,
                stats.total_ticks,
                stats.rebirths,
                stats.total_clicks,
                stats.upgrades_bought
            );
        }
        all_runs.push(stats);
    }

    SimReport::from_runs(all_runs, config.max_ticks_per_run)
}

/// Plays one bot until it reaches the target rebirth count or times out.
pub fn simulate_single_run<R: Rng>(config: &SimConfig, rng: &mut R) -> RunStats {
    let mut bot = Bot::new();
    let mut state = PlayerState::new();
    let mut stats = RunStats {
        first_cycle_stage_ticks: vec![0],
        ..Default::default()
    };
    let mut cycle_start = 0;

    for tick in 1..=config.max_ticks_per_run {
        let clicks = rng.gen_range(0..=config.max_clicks_per_tick);
        for _ in 0..clicks {
            state = handle_click(&state);
        }
        stats.total_clicks += u64::from(clicks);

        let (bought, count) = bot.buy_upgrades(&state);
        state = bought;
        stats.upgrades_bought += count;

        let stage_before = state.route_index;
        state = handle_tick(&state);
        if stats.rebirths == 0 && state.route_index > stage_before {
            stats.first_cycle_stage_ticks.push(tick);
        }
        stats.total_ticks = tick;

        if can_rebirth(&state) {
            if let Ok(reborn) = handle_rebirth(&state) {
                state = bot.spend_points(&reborn);
                stats.rebirths += 1;
                stats.ticks_per_rebirth.push(tick - cycle_start);
                cycle_start = tick;
            }
        }

        if config.target_rebirths > 0 && stats.rebirths >= config.target_rebirths {
            stats.reached_target = true;
            break;
        }
    }

    stats.final_currency = state.currency;
    stats.final_levels = state.levels.to_array();
    stats.final_multipliers = state.prestige_multipliers.to_array();
    stats
}
