#![no_std]

#[cfg(feature = "rp")]
pub mod rp;

#[cfg(feature = "defmt")]
use defmt_rtt as _;

pub use embassy_sync::blocking_mutex::raw::NoopRawMutex;
pub use embassy_time::{Delay, Duration};
pub use shego_common;
pub use shego_firmware::*;
pub use static_cell::StaticCell;

use shego_common::globals::READING_BITS;

/// Resolution of the RP2040 ADC.
pub const ADC_BITS: u32 = 12;

/// Reduce a full resolution ADC sample to the range thresholds are calibrated in.
pub const fn scale_reading(sample: u16) -> u16 {
    sample >> (ADC_BITS - READING_BITS)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod test;
