//! USB HID usage codes used as logical key identifiers in the channel map.

pub const KC_NO: u16 = 0;

pub mod key_range {
    pub const BASIC_A: u16 = 0x4;
    pub const BASIC_Z: u16 = 0x1d;
    pub const BASIC_1: u16 = 0x1e;
    pub const BASIC_0: u16 = 0x27;
}

/// Usage code of a letter key. `c` must be an ascii letter; anything else maps to [KC_NO].
pub const fn letter(c: u8) -> u16 {
    match c {
        b'a'..=b'z' => key_range::BASIC_A + (c - b'a') as u16,
        b'A'..=b'Z' => key_range::BASIC_A + (c - b'A') as u16,
        _ => KC_NO,
    }
}

/// Usage code of a top-row digit key.
pub const fn digit(n: u8) -> u16 {
    match n {
        0 => key_range::BASIC_0,
        1..=9 => key_range::BASIC_1 + (n - 1) as u16,
        _ => KC_NO,
    }
}

pub const KC_1: u16 = digit(1);
pub const KC_2: u16 = digit(2);
pub const KC_3: u16 = digit(3);
pub const KC_Q: u16 = letter(b'q');
pub const KC_W: u16 = letter(b'w');
pub const KC_E: u16 = letter(b'e');
pub const KC_R: u16 = letter(b'r');
pub const KC_A: u16 = letter(b'a');
pub const KC_S: u16 = letter(b's');
pub const KC_D: u16 = letter(b'd');
pub const KC_F: u16 = letter(b'f');
pub const KC_Z: u16 = letter(b'z');
pub const KC_X: u16 = letter(b'x');
pub const KC_C: u16 = letter(b'c');
pub const KC_V: u16 = letter(b'v');

#[cfg(test)]
#[path = "keycodes_test.rs"]
mod test;
