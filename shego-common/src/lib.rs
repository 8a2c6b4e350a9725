#![no_std]
pub mod board;
pub mod globals;
pub mod keycodes;
pub mod shego16;
