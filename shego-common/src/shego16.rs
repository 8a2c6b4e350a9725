//! Reference tables for the shego16 pad: a 4x4 ortho layout (15 keys, encoder at row 0 column 3)
//! with A and D as the conflict pair.

use crate::board::{BoardConfig, ConflictPair, KeyMapping, ScanTiming, CHANNEL_COUNT, MUX_CHANNELS};
use crate::keycodes::*;

pub const ROWS: usize = 4;
pub const COLS: usize = 4;

const T: u16 = 540;

#[rustfmt::skip]
pub const THRESHOLDS: [u16; CHANNEL_COUNT] = [
    // mux 1
    T, T, 0, 0, 0, 0, T, T, T, T, 0, 0, 0, 0, 0, T,
    // mux 2
    T, T, 0, 0, 0, 0, T, T, T, T, 0, 0, 0, 0, T, T,
];

const __: KeyMapping = KeyMapping::unused();

const fn k(row: u8, col: u8, key: u16) -> KeyMapping {
    KeyMapping::new(row, col, key)
}

#[rustfmt::skip]
pub const MUX1_KEYS: [KeyMapping; MUX_CHANNELS] = [
    k(0, 1, KC_2), k(0, 0, KC_1), __, __,
    __, __, k(1, 0, KC_Q), k(1, 1, KC_W),
    k(1, 2, KC_E), k(1, 3, KC_R), __, __,
    __, __, __, k(0, 2, KC_3),
];

#[rustfmt::skip]
pub const MUX2_KEYS: [KeyMapping; MUX_CHANNELS] = [
    k(2, 1, KC_S), k(2, 0, KC_A), __, __,
    __, __, k(3, 0, KC_Z), k(3, 1, KC_X),
    k(3, 2, KC_C), k(3, 3, KC_V), __, __,
    __, __, k(2, 3, KC_F), k(2, 2, KC_D),
];

pub const CONFLICT_PAIR: ConflictPair = ConflictPair::new(KC_A, KC_D);

pub const BOARD: BoardConfig = BoardConfig::from_mux_tables(
    ROWS,
    COLS,
    THRESHOLDS,
    MUX1_KEYS,
    MUX2_KEYS,
    Some(CONFLICT_PAIR),
    ScanTiming::new(),
);

#[cfg(test)]
#[path = "shego16_test.rs"]
mod test;
