extern crate std;

use super::*;
use crate::mux_test_stub::{Delay, MuxBoard, Pin, Sampler};
use crate::time_driver_test_stub::{set_time, set_time_ms};
use shego_common::{
    board::{ConflictPair, KeyMapping, MuxId, ScanTiming},
    keycodes::{KC_A, KC_D, KC_Q, KC_S, KC_W},
    shego16,
};

const ROWS: usize = 4;
const T: u16 = 500;

type Engine<'b> = AnalogMatrix<'b, Pin, Sampler, Delay, ROWS>;

fn engine<'b>(cfg: &'b BoardConfig, board: &MuxBoard) -> Engine<'b> {
    let mut m = AnalogMatrix::new(
        cfg,
        board.select_pins(),
        board.enable_pins(),
        board.sampler(),
        board.delay(),
    );
    m.init();
    m
}

fn scan_at(m: &mut Engine, ms: u64) -> ([MatrixRow; ROWS], bool) {
    set_time_ms(ms);
    let mut rows = [0xdead_beef; ROWS];
    let dirty = m.scan(&mut rows);
    (rows, dirty)
}

fn ch(mux: MuxId, index: u8) -> Channel {
    Channel::new(mux, index)
}

struct TestBoard {
    thresholds: [u16; CHANNEL_COUNT],
    mapping: [KeyMapping; CHANNEL_COUNT],
    pair: Option<ConflictPair>,
}
impl TestBoard {
    fn new() -> Self {
        Self {
            thresholds: [0; CHANNEL_COUNT],
            mapping: [KeyMapping::unused(); CHANNEL_COUNT],
            pair: Some(ConflictPair::new(KC_A, KC_D)),
        }
    }

    fn key(mut self, channel: Channel, threshold: u16, row: u8, col: u8, key: u16) -> Self {
        self.thresholds[channel.global_index()] = threshold;
        self.mapping[channel.global_index()] = KeyMapping::new(row, col, key);
        self
    }

    fn build(self) -> BoardConfig {
        BoardConfig {
            rows: ROWS,
            cols: 4,
            thresholds: self.thresholds,
            mapping: self.mapping,
            conflict_pair: self.pair,
            timing: ScanTiming::default(),
        }
    }
}

#[test]
fn full_row_scenario() {
    let cfg = TestBoard::new()
        .key(ch(MuxId::Mux1, 0), 0, 0, 0, KC_Q)
        .key(ch(MuxId::Mux1, 1), 0, 0, 1, KC_W)
        .key(ch(MuxId::Mux2, 0), 0, 1, 0, KC_S)
        .key(ch(MuxId::Mux2, 1), 0, 1, 1, KC_A)
        .key(ch(MuxId::Mux1, 4), T, 2, 1, KC_W)
        .build();
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    assert_eq!(m.active_channel_count(), 1);

    board.set_all_levels(0);
    assert_eq!(scan_at(&mut m, 100), ([0; ROWS], false));

    board.set_all_levels(900);
    let (rows, dirty) = scan_at(&mut m, 101);
    assert!(dirty);
    assert_eq!(rows, [0, 0, 0b10, 0]);

    // still held well past the dwell time
    assert_eq!(scan_at(&mut m, 120), ([0, 0, 0b10, 0], false));
    assert_eq!(m.last_reading(ch(MuxId::Mux1, 0)), 900);
}

#[test]
fn idempotent_without_threshold_crossings() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);

    let q = ch(MuxId::Mux1, 6);
    board.set_level(q, 700);
    let (first, dirty) = scan_at(&mut m, 100);
    assert!(dirty);
    assert_eq!(first, [0, 0b0001, 0, 0]);

    // readings move but stay on the same side of their thresholds
    board.set_level(q, 650);
    board.set_level(ch(MuxId::Mux1, 7), 539);
    assert_eq!(scan_at(&mut m, 101), (first, false));
    assert_eq!(scan_at(&mut m, 150), (first, false));
    assert_eq!(m.last_reading(q), 650);
}

#[test]
fn threshold_boundary() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let w = ch(MuxId::Mux1, 7);

    board.set_level(w, 540);
    assert_eq!(scan_at(&mut m, 100), ([0; ROWS], false));
    assert!(!m.is_pressed(w));

    board.set_level(w, 541);
    assert_eq!(scan_at(&mut m, 101), ([0, 0b0010, 0, 0], true));
    assert!(m.is_pressed(w));
}

#[test]
fn unused_channels_never_set_bits() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    assert_eq!(m.active_channel_count(), 15);

    for mux in MuxId::ALL {
        for index in 2..6 {
            board.set_level(ch(mux, index), 1023);
        }
    }
    assert_eq!(scan_at(&mut m, 100), ([0; ROWS], false));
    assert_eq!(scan_at(&mut m, 200), ([0; ROWS], false));
    assert!(!m.is_pressed(ch(MuxId::Mux1, 2)));
}

#[test]
fn debounce_through_the_engine() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let e = ch(MuxId::Mux1, 8);
    let pressed = [0, 0b0100, 0, 0];

    board.set_level(e, 800);
    assert_eq!(scan_at(&mut m, 100), (pressed, true));

    // release and press again 2ms apart: ignored
    board.set_level(e, 100);
    assert_eq!(scan_at(&mut m, 102), (pressed, false));
    board.set_level(e, 800);
    assert_eq!(scan_at(&mut m, 104), (pressed, false));

    // flips more than the dwell time apart are both accepted
    board.set_level(e, 100);
    assert_eq!(scan_at(&mut m, 106), ([0; ROWS], true));
    board.set_level(e, 800);
    assert_eq!(scan_at(&mut m, 112), (pressed, true));
}

#[test]
fn startup_holds_off_for_one_dwell() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    board.set_level(ch(MuxId::Mux1, 8), 800);

    // channel state starts released at t=0
    assert_eq!(scan_at(&mut m, 0), ([0; ROWS], false));
    assert_eq!(scan_at(&mut m, 5), ([0; ROWS], false));
    assert_eq!(scan_at(&mut m, 6), ([0, 0b0100, 0, 0], true));
}

#[test]
fn dwell_is_measured_in_microseconds() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let e = ch(MuxId::Mux1, 8);

    board.set_level(e, 800);
    set_time(0);
    let mut rows = [0; ROWS];
    assert!(!m.scan(&mut rows));

    set_time(5_000);
    assert!(!m.scan(&mut rows));
    set_time(5_001);
    assert!(m.scan(&mut rows));
    assert_eq!(rows, [0, 0b0100, 0, 0]);
}

const A_BIT: MatrixRow = 0b0001;
const D_BIT: MatrixRow = 0b0100;

#[test]
fn socd_last_input_priority() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let a = ch(MuxId::Mux2, 1);
    let d = ch(MuxId::Mux2, 15);

    board.set_level(a, 800);
    let (rows, _) = scan_at(&mut m, 100);
    assert_eq!(rows[2], A_BIT);

    board.set_level(d, 800);
    let (rows, dirty) = scan_at(&mut m, 110);
    assert_eq!(rows[2], A_BIT);
    assert!(!dirty);
    assert!(m.is_pressed(d), "suppressed, not released");

    board.set_level(a, 0);
    let (rows, dirty) = scan_at(&mut m, 120);
    assert_eq!(rows[2], D_BIT);
    assert!(dirty);
}

#[test]
fn socd_newer_press_takes_over_on_next_scan() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let a = ch(MuxId::Mux2, 1);
    let d = ch(MuxId::Mux2, 15);

    board.set_level(a, 800);
    scan_at(&mut m, 100);
    assert_eq!(m.favored(), PairMember::A);

    board.set_level(d, 800);
    assert_eq!(scan_at(&mut m, 110).0[2], A_BIT);
    assert_eq!(m.favored(), PairMember::B);
    assert_eq!(scan_at(&mut m, 111), ([0, 0, D_BIT, 0], true));

    // D released: A shows again without being debounced again
    board.set_level(d, 0);
    assert_eq!(scan_at(&mut m, 120), ([0, 0, A_BIT, 0], true));
    assert_eq!(m.favored(), PairMember::B);
}

#[test]
fn socd_simultaneous_edges_favor_b() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let a = ch(MuxId::Mux2, 1);
    let d = ch(MuxId::Mux2, 15);

    // make A the favoured member first
    board.set_level(a, 800);
    scan_at(&mut m, 100);
    board.set_level(a, 0);
    scan_at(&mut m, 110);
    assert_eq!(m.favored(), PairMember::A);

    board.set_level(a, 800);
    board.set_level(d, 800);
    let (rows, _) = scan_at(&mut m, 120);
    assert_eq!(rows[2], A_BIT);
    assert_eq!(m.favored(), PairMember::B);
    assert_eq!(scan_at(&mut m, 121).0[2], D_BIT);
}

#[test]
fn socd_member_wired_on_two_channels() {
    let a1 = ch(MuxId::Mux1, 2);
    let a2 = ch(MuxId::Mux2, 2);
    let d = ch(MuxId::Mux2, 5);
    let cfg = TestBoard::new()
        .key(a1, T, 2, 0, KC_A)
        .key(a2, T, 2, 0, KC_A)
        .key(d, T, 2, 2, KC_D)
        .key(ch(MuxId::Mux1, 4), T, 2, 1, KC_S)
        .build();
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);

    board.set_level(a1, 800);
    scan_at(&mut m, 100);
    board.set_level(d, 800);
    scan_at(&mut m, 110);
    assert_eq!(scan_at(&mut m, 111).0[2], D_BIT);

    // a second A sensor does not count as a new A press while the first is held
    board.set_level(a2, 800);
    assert_eq!(scan_at(&mut m, 120).0[2], D_BIT);

    // releasing one A sensor keeps A raw pressed
    board.set_level(a1, 0);
    assert_eq!(scan_at(&mut m, 130).0[2], D_BIT);

    board.set_level(d, 0);
    assert_eq!(scan_at(&mut m, 140).0[2], A_BIT);

    // keys outside the pair are never suppressed
    board.set_level(d, 800);
    board.set_level(ch(MuxId::Mux1, 4), 800);
    scan_at(&mut m, 150);
    assert_eq!(scan_at(&mut m, 151).0[2], D_BIT | 0b0010);
}

#[test]
fn no_conflict_pair() {
    let mut tb = TestBoard::new()
        .key(ch(MuxId::Mux2, 1), T, 2, 0, KC_A)
        .key(ch(MuxId::Mux2, 15), T, 2, 2, KC_D);
    tb.pair = None;
    let cfg = tb.build();
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);

    board.set_all_levels(800);
    assert_eq!(scan_at(&mut m, 100).0[2], A_BIT | D_BIT);
}

#[test]
fn out_of_range_mapping_is_ignored() {
    let cfg = TestBoard::new()
        .key(ch(MuxId::Mux1, 0), T, 7, 0, KC_Q)
        .key(ch(MuxId::Mux1, 1), T, 0, 9, KC_W)
        .key(ch(MuxId::Mux1, 2), T, 3, 3, KC_S)
        .build();
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    assert_eq!(m.active_channel_count(), 1);

    board.set_all_levels(800);
    assert_eq!(scan_at(&mut m, 100), ([0, 0, 0, 0b1000], true));
}

#[test]
fn sampler_errors_read_as_released() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let r = ch(MuxId::Mux1, 9);

    board.set_level(r, 800);
    assert_eq!(scan_at(&mut m, 100), ([0, 0b1000, 0, 0], true));

    board.set_failing(r, true);
    assert_eq!(scan_at(&mut m, 110), ([0; ROWS], true));
    assert_eq!(m.last_reading(r), 0);

    board.set_failing(r, false);
    assert_eq!(scan_at(&mut m, 120), ([0, 0b1000, 0, 0], true));
}

#[test]
fn scan_order_and_mux_exclusivity() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    assert!(board.is_disabled(MuxId::Mux1) && board.is_disabled(MuxId::Mux2));

    scan_at(&mut m, 100);
    let order: std::vec::Vec<Channel> = board.samples().iter().map(|s| s.channel()).collect();
    let expected: std::vec::Vec<Channel> = Channel::scan_order().collect();
    assert_eq!(order, expected);
    assert!(board.samples().iter().all(|s| s.enabled == Some(s.mux)));
    assert!(!board.ever_both_enabled());
    assert_eq!(board.enabled(), None);
}

#[test]
fn init_clears_state() {
    let cfg = shego16::BOARD;
    let board = MuxBoard::new();
    let mut m = engine(&cfg, &board);
    let a = ch(MuxId::Mux2, 1);

    board.set_level(a, 800);
    scan_at(&mut m, 100);
    assert!(m.is_pressed(a));
    assert_eq!(m.favored(), PairMember::A);

    m.init();
    assert!(!m.is_pressed(a));
    assert_eq!(m.favored(), PairMember::B);
    assert_eq!(m.last_reading(a), 0);
}

#[test]
fn diagnostics_follow_the_switch() {
    let mut cfg = shego16::BOARD;
    cfg.timing.diagnostics_interval = 2;
    let switch = DiagnosticsSwitch::new(false);
    let board = MuxBoard::new();
    let mut m = AnalogMatrix::<_, _, _, ROWS>::new(
        &cfg,
        board.select_pins(),
        board.enable_pins(),
        board.sampler(),
        board.delay(),
    )
    .with_diagnostics(&switch);
    m.init();

    board.set_level(ch(MuxId::Mux1, 6), 800);
    scan_at(&mut m, 100);
    assert_eq!(m.diagnostics().dumps(), 0);

    switch.set_enabled(true);
    for t in 101..105 {
        scan_at(&mut m, t);
    }
    assert_eq!(m.diagnostics().dumps(), 2);
    assert_eq!(m.diagnostics().interval(), 2);
}
