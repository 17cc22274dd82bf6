//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// One-line version banner printed by `--version`.
pub fn version_line(binary: &str) -> String {
    format!(
        "{} {} ({}, built {})",
        binary,
        env!("CARGO_PKG_VERSION"),
        BUILD_COMMIT,
        BUILD_DATE
    )
}
