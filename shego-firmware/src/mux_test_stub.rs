//! A simulated pair of multiplexers: select and enable pins, the analog sense lines and a
//! recording delay, all sharing one board state.

extern crate std;

use core::{cell::RefCell, convert::Infallible};
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, OutputPin},
};
use shego_common::board::{Channel, MuxId, CHANNEL_COUNT, MUX_COUNT};
use std::rc::Rc;
use std::vec::Vec;

use crate::{mux::SELECT_LINES, sampler::AnalogSampler};

/// What the sense line saw when a sample was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRecord {
    pub mux: MuxId,
    pub address: u8,
    pub enabled: Option<MuxId>,
    pub select_settled_ns: u64,
    pub enable_settled_ns: u64,
}
impl SampleRecord {
    pub fn channel(&self) -> Channel {
        Channel::new(self.mux, self.address)
    }
}

#[derive(Debug)]
pub struct SampleError;

#[derive(Debug)]
struct BoardInner {
    /// Pin levels, true is high. Pins start low as after reset.
    select: [bool; SELECT_LINES],
    enable: [bool; MUX_COUNT],
    levels: [u16; CHANNEL_COUNT],
    failing: [bool; CHANNEL_COUNT],
    samples: Vec<SampleRecord>,
    both_enabled: bool,
    select_settled_ns: u64,
    enable_settled_ns: u64,
    total_delay_ns: u64,
}
impl BoardInner {
    fn address(&self) -> u8 {
        self.select
            .iter()
            .enumerate()
            .fold(0, |a, (bit, high)| if *high { a | 1 << bit } else { a })
    }

    fn enabled(&self) -> Option<MuxId> {
        let mut ans = None;
        for mux in MuxId::ALL {
            if !self.enable[mux.offset()] {
                if ans.is_some() {
                    return None;
                }
                ans = Some(mux);
            }
        }
        ans
    }
}

#[derive(Clone)]
pub struct MuxBoard {
    inner: Rc<RefCell<BoardInner>>,
}
impl Default for MuxBoard {
    fn default() -> Self {
        Self::new()
    }
}
impl MuxBoard {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BoardInner {
                select: [false; SELECT_LINES],
                enable: [false; MUX_COUNT],
                levels: [0; CHANNEL_COUNT],
                failing: [false; CHANNEL_COUNT],
                samples: Vec::new(),
                both_enabled: false,
                select_settled_ns: 0,
                enable_settled_ns: 0,
                total_delay_ns: 0,
            })),
        }
    }

    pub fn select_pins(&self) -> [Pin; SELECT_LINES] {
        core::array::from_fn(|i| Pin {
            board: self.clone(),
            line: Line::Select(i),
        })
    }

    pub fn enable_pins(&self) -> [Pin; MUX_COUNT] {
        core::array::from_fn(|i| Pin {
            board: self.clone(),
            line: Line::Enable(i),
        })
    }

    pub fn sampler(&self) -> Sampler {
        Sampler(self.clone())
    }

    pub fn delay(&self) -> Delay {
        Delay(self.clone())
    }

    /// Set the magnitude a sensor currently produces.
    pub fn set_level(&self, channel: Channel, raw: u16) {
        self.inner.borrow_mut().levels[channel.global_index()] = raw;
    }

    pub fn set_all_levels(&self, raw: u16) {
        self.inner.borrow_mut().levels = [raw; CHANNEL_COUNT];
    }

    pub fn set_failing(&self, channel: Channel, failing: bool) {
        self.inner.borrow_mut().failing[channel.global_index()] = failing;
    }

    pub fn samples(&self) -> Vec<SampleRecord> {
        self.inner.borrow().samples.clone()
    }

    pub fn address(&self) -> u8 {
        self.inner.borrow().address()
    }

    pub fn enabled(&self) -> Option<MuxId> {
        self.inner.borrow().enabled()
    }

    pub fn is_disabled(&self, mux: MuxId) -> bool {
        self.inner.borrow().enable[mux.offset()]
    }

    /// Were both multiplexers ever enabled at the same moment?
    pub fn ever_both_enabled(&self) -> bool {
        self.inner.borrow().both_enabled
    }

    pub fn total_delay_us(&self) -> u64 {
        self.inner.borrow().total_delay_ns / 1000
    }
}

#[derive(Debug, Clone, Copy)]
enum Line {
    Select(usize),
    Enable(usize),
}

pub struct Pin {
    board: MuxBoard,
    line: Line,
}
impl Pin {
    fn set(&mut self, high: bool) {
        let mut inner = self.board.inner.borrow_mut();
        match self.line {
            Line::Select(i) => {
                if inner.select[i] != high {
                    inner.select[i] = high;
                    inner.select_settled_ns = 0;
                }
            }
            Line::Enable(i) => {
                if inner.enable[i] != high {
                    inner.enable[i] = high;
                    inner.enable_settled_ns = 0;
                    if inner.enable.iter().all(|h| !*h) {
                        inner.both_enabled = true;
                    }
                }
            }
        }
    }
}

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

/// Reads the sense line of the requested multiplexer. A multiplexer that is not the only one
/// enabled floats and reads 0.
pub struct Sampler(MuxBoard);

impl AnalogSampler for Sampler {
    type Error = SampleError;

    fn sample(&mut self, mux: MuxId) -> Result<u16, Self::Error> {
        let mut inner = self.0.inner.borrow_mut();
        let address = inner.address();
        let enabled = inner.enabled();
        let record = SampleRecord {
            mux,
            address,
            enabled,
            select_settled_ns: inner.select_settled_ns,
            enable_settled_ns: inner.enable_settled_ns,
        };
        inner.samples.push(record);

        let global = record.channel().global_index();
        if inner.failing[global] {
            return Err(SampleError);
        }
        if enabled == Some(mux) {
            Ok(inner.levels[global])
        } else {
            Ok(0)
        }
    }
}

/// Records blocking waits without moving the clock; tests set the time explicitly.
pub struct Delay(MuxBoard);

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        let mut inner = self.0.inner.borrow_mut();
        let ns = ns as u64;
        inner.select_settled_ns += ns;
        inner.enable_settled_ns += ns;
        inner.total_delay_ns += ns;
    }
}
