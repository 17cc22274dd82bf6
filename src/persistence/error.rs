use std::io;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("token index error: {0}")]
    Index(#[from] serde_json::Error),

    #[error("save encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("invalid save version: expected 0x{expected:016X}, got 0x{found:016X}")]
    BadMagic { expected: u64, found: u64 },

    #[error("unsupported save format version {0}")]
    UnsupportedVersion(u32),

    #[error("checksum verification failed")]
    ChecksumMismatch,

    #[error("save for player {0} violates state invariants")]
    Corrupted(Uuid),

    #[error("nickname must be between 1 and 32 characters")]
    InvalidNickname,
}
