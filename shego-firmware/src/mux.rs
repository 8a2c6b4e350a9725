use embedded_hal::{delay::DelayNs, digital::OutputPin};
use shego_common::board::{Channel, MuxId, ScanTiming, MUX_CHANNELS, MUX_COUNT};

use crate::sampler::AnalogSampler;

pub const SELECT_LINES: usize = 4;

/// Walks two 16 channel multiplexers that share their select lines.
///
/// Only one multiplexer is ever enabled at a time; enables are active low. Settle waits are
/// blocking so that each sample completes before the next address is driven.
pub struct MuxSequencer<O: OutputPin, D: DelayNs> {
    /// S0 to S3, S0 is the least significant address bit.
    select: [O; SELECT_LINES],
    enable: [O; MUX_COUNT],
    delay: D,
    select_settle_us: u32,
    enable_settle_us: u32,
}

impl<O: OutputPin, D: DelayNs> MuxSequencer<O, D> {
    pub fn new(
        select: [O; SELECT_LINES],
        enable: [O; MUX_COUNT],
        delay: D,
        timing: &ScanTiming,
    ) -> Self {
        Self {
            select,
            enable,
            delay,
            select_settle_us: timing.select_settle_us,
            enable_settle_us: timing.enable_settle_us,
        }
    }

    /// Park the control lines: both multiplexers off, address 0.
    pub fn init(&mut self) {
        self.disable_all();
        self.drive_address(0);
    }

    pub fn select(&mut self, index: u8) {
        self.drive_address(index);
        self.delay.delay_us(self.select_settle_us);
    }

    /// Enable `mux` and disable the other one. The other one is switched off first so that the
    /// two outputs are never connected together.
    pub fn enable(&mut self, mux: MuxId) {
        for (m, pin) in MuxId::ALL.into_iter().zip(self.enable.iter_mut()) {
            if m != mux {
                let _ = pin.set_high();
            }
        }
        let _ = self.enable[mux.offset()].set_low();
        self.delay.delay_us(self.enable_settle_us);
    }

    pub fn disable_all(&mut self) {
        for pin in self.enable.iter_mut() {
            let _ = pin.set_high();
        }
    }

    /// Sample every channel in scan order, handing each reading to `visit`.
    pub fn sweep<S: AnalogSampler>(
        &mut self,
        sampler: &mut S,
        mut visit: impl FnMut(Channel, Result<u16, S::Error>),
    ) {
        for index in 0..MUX_CHANNELS as u8 {
            self.select(index);
            for mux in MuxId::ALL {
                self.enable(mux);
                visit(Channel::new(mux, index), sampler.sample(mux));
            }
            self.disable_all();
        }
    }

    fn drive_address(&mut self, index: u8) {
        for (bit, pin) in self.select.iter_mut().enumerate() {
            let _ = if index & (1 << bit) != 0 {
                pin.set_high()
            } else {
                pin.set_low()
            };
        }
    }
}

#[cfg(test)]
#[path = "mux_test.rs"]
mod test;
