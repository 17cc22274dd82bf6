//! Utility modules shared by the server and the store.

pub mod serde_u128_string;
