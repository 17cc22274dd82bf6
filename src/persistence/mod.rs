//! Player storage: the store trait, its file and in-memory backends, and the
//! checksummed save format.

pub mod error;
pub mod save_file;
pub mod store;

pub use error::StoreError;
pub use store::{FileStore, MemoryStore, PlayerStore};

pub const MAX_NICKNAME_LEN: usize = 32;
