#![no_std]
pub mod analog_matrix;
pub mod channel_filter;
pub mod diagnostics;
pub mod key_scanner;
pub mod mux;
pub mod sampler;
pub mod socd;

#[cfg(any(test, feature = "test-utils"))]
pub mod mux_test_stub;
#[cfg(any(test, feature = "test-utils"))]
pub mod time_driver_test_stub;

#[macro_use]
mod macros;

pub use shego_common::board::{self, BoardConfig, Channel, MuxId};

/// One row of the output matrix; bit `n` is column `n`.
pub type MatrixRow = u32;
