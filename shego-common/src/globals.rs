/// Wait after driving the select lines before a sample is valid.
pub const SELECT_SETTLE_US: u32 = 50;
/// Wait after switching the enabled multiplexer before a sample is valid.
pub const ENABLE_SETTLE_US: u32 = 100;
/// Minimum time between two accepted transitions of one channel.
pub const DEBOUNCE_MS: u32 = 5;
/// How often the key scanner runs a full scan.
pub const SCAN_INTERVAL_US: u32 = 1000;
/// Scans between two diagnostic dumps of the raw readings.
pub const DIAGNOSTICS_INTERVAL: u32 = 2000;

/// Full scale of a reading. Thresholds are calibrated against this scale.
pub const READING_MAX: u16 = 0x3ff;
pub const READING_BITS: u32 = 10;
