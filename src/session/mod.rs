//! Live sessions: per-player locking, the tick clock and background saves.

pub mod game_loop;
pub mod registry;
pub mod saver;

pub use game_loop::{GameLoop, TickSummary};
pub use registry::{Outbox, Session, SessionId, SessionRegistry};
pub use saver::{SaveReport, Saver};
