//! Wiring and calibration tables for a Hall-effect matrix read through two 16 channel analog
//! multiplexers.
//!
//! Everything here is immutable and `const` constructible so a keyboard can compile its tables
//! into flash. Changing how a sensor behaves means editing these tables, not the scanning code.

use crate::{globals, keycodes::KC_NO};

pub const MUX_COUNT: usize = 2;
pub const MUX_CHANNELS: usize = 16;
pub const CHANNEL_COUNT: usize = MUX_COUNT * MUX_CHANNELS;

/// Row or column value of a channel that has no key.
pub const UNUSED: u8 = 0xff;

/// Widest row bitmap supported by the matrix builder.
pub const MAX_COLS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuxId {
    Mux1,
    Mux2,
}
impl MuxId {
    pub const ALL: [MuxId; MUX_COUNT] = [MuxId::Mux1, MuxId::Mux2];

    pub const fn offset(self) -> usize {
        match self {
            MuxId::Mux1 => 0,
            MuxId::Mux2 => 1,
        }
    }

    /// The multiplexer's number as printed on the board (1 or 2).
    pub const fn number(self) -> u8 {
        self.offset() as u8 + 1
    }
}

/// One physical sensor: an input of one of the multiplexers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    mux: MuxId,
    index: u8,
}
impl Channel {
    /// `index` is taken modulo [MUX_CHANNELS].
    pub const fn new(mux: MuxId, index: u8) -> Self {
        Self {
            mux,
            index: index & (MUX_CHANNELS as u8 - 1),
        }
    }

    pub const fn mux(&self) -> MuxId {
        self.mux
    }

    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Position of this channel in the per-channel tables.
    pub const fn global_index(&self) -> usize {
        self.mux.offset() * MUX_CHANNELS + self.index as usize
    }

    /// Every channel in the order a scan samples them: multiplexer 1 and 2 interleaved for each
    /// select address.
    pub fn scan_order() -> impl Iterator<Item = Channel> {
        (0..MUX_CHANNELS as u8)
            .flat_map(|index| MuxId::ALL.into_iter().map(move |mux| Channel::new(mux, index)))
    }
}

/// Where a channel lands in the key matrix and which logical key it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMapping {
    pub row: u8,
    pub col: u8,
    pub key: u16,
}
impl KeyMapping {
    pub const fn new(row: u8, col: u8, key: u16) -> Self {
        Self { row, col, key }
    }

    pub const fn unused() -> Self {
        Self {
            row: UNUSED,
            col: UNUSED,
            key: KC_NO,
        }
    }

    pub const fn is_mapped(&self) -> bool {
        self.row != UNUSED && self.col != UNUSED && self.key != KC_NO
    }
}
impl Default for KeyMapping {
    fn default() -> Self {
        Self::unused()
    }
}

/// Press threshold per global channel index. 0 disables the channel.
pub type ThresholdTable = [u16; CHANNEL_COUNT];

/// Key mapping per global channel index.
pub type ChannelMap = [KeyMapping; CHANNEL_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PairMember {
    A,
    B,
}
impl PairMember {
    pub const fn other(self) -> Self {
        match self {
            PairMember::A => PairMember::B,
            PairMember::B => PairMember::A,
        }
    }
}

/// The two logical keys that may be held together but are only ever reported one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConflictPair {
    pub a: u16,
    pub b: u16,
}
impl ConflictPair {
    pub const fn new(a: u16, b: u16) -> Self {
        Self { a, b }
    }

    pub const fn member(&self, key: u16) -> Option<PairMember> {
        if key == KC_NO {
            None
        } else if key == self.a {
            Some(PairMember::A)
        } else if key == self.b {
            Some(PairMember::B)
        } else {
            None
        }
    }
}

/// Electrical and filtering timings. These depend on the sensors and multiplexers fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanTiming {
    pub select_settle_us: u32,
    pub enable_settle_us: u32,
    pub debounce_ms: u32,
    pub scan_interval_us: u32,
    pub diagnostics_interval: u32,
}
impl ScanTiming {
    pub const fn new() -> Self {
        Self {
            select_settle_us: globals::SELECT_SETTLE_US,
            enable_settle_us: globals::ENABLE_SETTLE_US,
            debounce_ms: globals::DEBOUNCE_MS,
            scan_interval_us: globals::SCAN_INTERVAL_US,
            diagnostics_interval: globals::DIAGNOSTICS_INTERVAL,
        }
    }
}
impl Default for ScanTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    pub thresholds: ThresholdTable,
    pub mapping: ChannelMap,
    pub conflict_pair: Option<ConflictPair>,
    pub timing: ScanTiming,
}
impl BoardConfig {
    /// Build a board from one mapping table per multiplexer, indexed by channel.
    pub const fn from_mux_tables(
        rows: usize,
        cols: usize,
        thresholds: ThresholdTable,
        mux1: [KeyMapping; MUX_CHANNELS],
        mux2: [KeyMapping; MUX_CHANNELS],
        conflict_pair: Option<ConflictPair>,
        timing: ScanTiming,
    ) -> Self {
        let mut mapping = [KeyMapping::unused(); CHANNEL_COUNT];
        let mut i = 0;
        while i < MUX_CHANNELS {
            mapping[i] = mux1[i];
            mapping[MUX_CHANNELS + i] = mux2[i];
            i += 1;
        }
        Self {
            rows,
            cols,
            thresholds,
            mapping,
            conflict_pair,
            timing,
        }
    }

    pub const fn threshold(&self, channel: Channel) -> u16 {
        self.thresholds[channel.global_index()]
    }

    pub const fn mapping(&self, channel: Channel) -> KeyMapping {
        self.mapping[channel.global_index()]
    }

    /// A channel takes part in scanning when it has a threshold and a key.
    pub const fn is_active(&self, channel: Channel) -> bool {
        self.threshold(channel) != 0 && self.mapping(channel).is_mapped()
    }

    /// Can `mapping` be represented in this board's matrix?
    pub const fn fits_matrix(&self, mapping: &KeyMapping) -> bool {
        (mapping.row as usize) < self.rows
            && (mapping.col as usize) < self.cols
            && (mapping.col as usize) < MAX_COLS
    }

    /// Which conflict pair member `channel` feeds, if any.
    pub const fn pair_member(&self, channel: Channel) -> Option<PairMember> {
        match self.conflict_pair {
            Some(pair) => pair.member(self.mapping(channel).key),
            None => None,
        }
    }

    /// Active channels in scan order.
    pub fn active_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::scan_order().filter(|c| self.is_active(*c))
    }
}

#[cfg(test)]
#[path = "board_test.rs"]
mod test;
