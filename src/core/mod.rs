//! Deterministic progression simulation: tables, state and transitions.
//!
//! Nothing in here performs I/O or holds process-wide state.

pub mod action;
pub mod constants;
pub mod error;
pub mod game_logic;
pub mod game_state;
pub mod prestige;
pub mod rates;
pub mod tables;
pub mod tracks;

pub use action::Action;
pub use constants::*;
pub use error::GameError;
pub use game_logic::{accrue, handle_click, handle_tick, handle_upgrade, next_upgrade_cost, round2};
pub use game_state::{PlayerRecord, PlayerState};
pub use prestige::{can_rebirth, handle_rebirth, handle_spend_prestige};
pub use rates::{compute_rates, Rates};
pub use tables::{last_stage_index, Stage, ROUTE};
pub use tracks::{PerTrack, Track};
