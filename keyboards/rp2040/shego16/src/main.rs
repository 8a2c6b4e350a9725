#![no_std]
#![no_main]

use panic_probe as _;

// mux1 sense on GP29, mux2 sense on GP28
shego_builder::rp_run_keyboard! {
    board: shego_builder::shego_common::shego16::BOARD,
    rows: shego_builder::shego_common::shego16::ROWS,
    select: [PIN_10, PIN_11, PIN_12, PIN_13],
    enable: [PIN_14, PIN_15],
    sense: [PIN_29, PIN_28],
}
