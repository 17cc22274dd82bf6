//! Headless balance simulator.
//!
//! Drives the real progression engine with a greedy bot to measure:
//! - Ticks needed for each rebirth
//! - When each stage of the route is first reached
//! - How prestige bonuses compound over many cycles
//!
//! Every state transition goes through `crate::core`, so results match what
//! a connected player would see.

mod bot;
mod config;
mod report;
mod runner;

pub use bot::Bot;
pub use config::SimConfig;
pub use report::{RunStats, SimReport};
pub use runner::{run_simulation, simulate_single_run};
