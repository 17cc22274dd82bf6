// Tick and timing
pub const TICK_INTERVAL_MS: u64 = 1000;
pub const AUTOSAVE_INTERVAL_TICKS: u64 = 15;

// Server
pub const DEFAULT_PORT: u16 = 3000;

// Upgrade tracks
pub const NUM_TRACKS: usize = 3;
pub const MAX_UPGRADE_LEVEL: u32 = 10;

// Prestige
pub const BASE_PRESTIGE_MULTIPLIER: f64 = 1.0;
pub const PRESTIGE_MULTIPLIER_STEP: f64 = 0.1;
pub const PRESTIGE_POINTS_PER_REBIRTH: u128 = 1;

// Carry and multiplier values are kept to this many decimal places
pub const ROUNDING_SCALE: f64 = 100.0;
pub const ROUNDING_FACTOR: u128 = 100;

// Save system
pub const SAVE_VERSION_MAGIC: u64 = 0x4D4F4F4E44555354; // "MOONDUST" in hex
pub const SAVE_FORMAT_VERSION: u32 = 1;
