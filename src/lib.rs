//! Moondust - multiplayer idle space game server library.
//!
//! The pure progression engine lives in [`core`]; everything that touches
//! the network, the disk or the clock is layered on top of it.

pub mod build_info;
pub mod config;
pub mod core;
pub mod persistence;
pub mod session;
pub mod simulator;
pub mod utils;
pub mod web;

pub use crate::core::{Action, GameError, PlayerRecord, PlayerState, Track};
