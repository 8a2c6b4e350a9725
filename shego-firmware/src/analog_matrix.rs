//! The scan engine: samples every multiplexer channel, debounces it, applies the conflict pair
//! rule and builds the row bitmap the rest of the firmware consumes.

use embassy_time::{Duration, Instant};
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use heapless::Vec;
use shego_common::board::{BoardConfig, Channel, PairMember, CHANNEL_COUNT, MUX_COUNT};

use crate::{
    channel_filter::{self, ChannelFilters},
    diagnostics::{DiagnosticsSwitch, ScanDiagnostics},
    mux::{MuxSequencer, SELECT_LINES},
    sampler::AnalogSampler,
    socd::{ConflictResolver, PairFlags},
    MatrixRow,
};

/// A channel that takes part in scanning, resolved once from the board tables.
#[derive(Debug, Clone, Copy)]
struct ActiveChannel {
    channel: Channel,
    threshold: u16,
    row: u8,
    col: u8,
    key: u16,
    member: Option<PairMember>,
}

pub struct AnalogMatrix<'b, O, S, D, const ROWS: usize>
where
    O: OutputPin,
    S: AnalogSampler,
    D: DelayNs,
{
    sequencer: MuxSequencer<O, D>,
    sampler: S,

    /// Active channels in scan order.
    plan: Vec<ActiveChannel, CHANNEL_COUNT>,

    filters: ChannelFilters,
    resolver: ConflictResolver,

    /// Most recent reading of every channel, active or not.
    readings: [u16; CHANNEL_COUNT],
    /// Bit per global channel index whose sampler is currently failing.
    failing: u32,

    previous: [MatrixRow; ROWS],
    diagnostics: ScanDiagnostics<'b>,
}

impl<'b, O, S, D, const ROWS: usize> AnalogMatrix<'b, O, S, D, ROWS>
where
    O: OutputPin,
    S: AnalogSampler,
    D: DelayNs,
{
    pub fn new(
        board: &'b BoardConfig,
        select: [O; SELECT_LINES],
        enable: [O; MUX_COUNT],
        sampler: S,
        delay: D,
    ) -> Self {
        let mut plan = Vec::new();
        for channel in board.active_channels() {
            let mapping = board.mapping(channel);
            if mapping.row as usize >= ROWS || !board.fits_matrix(&mapping) {
                crate::warn!(
                    "mux{} ch{} maps to {},{} outside the matrix; ignored",
                    channel.mux().number(),
                    channel.index(),
                    mapping.row,
                    mapping.col
                );
                continue;
            }
            // never more active channels than channels
            let _ = plan.push(ActiveChannel {
                channel,
                threshold: board.threshold(channel),
                row: mapping.row,
                col: mapping.col,
                key: mapping.key,
                member: board.pair_member(channel),
            });
        }

        let timing = &board.timing;
        Self {
            sequencer: MuxSequencer::new(select, enable, delay, timing),
            sampler,
            plan,
            filters: ChannelFilters::new(Duration::from_millis(timing.debounce_ms as u64)),
            resolver: ConflictResolver::new(),
            readings: [0; CHANNEL_COUNT],
            failing: 0,
            previous: [0; ROWS],
            diagnostics: ScanDiagnostics::new(None, timing.diagnostics_interval),
        }
    }

    /// Log readings and transitions while `switch` is on. See [ScanDiagnostics].
    pub fn with_diagnostics(mut self, switch: &'b DiagnosticsSwitch) -> Self {
        let interval = self.diagnostics.interval();
        self.diagnostics = ScanDiagnostics::new(Some(switch), interval);
        self
    }

    /// Park the multiplexers and forget all channel and conflict state. Call once before the
    /// first [Self::scan].
    pub fn init(&mut self) {
        self.sequencer.init();
        self.filters.reset();
        self.resolver.reset();
        self.readings = [0; CHANNEL_COUNT];
        self.failing = 0;
        self.previous = [0; ROWS];
        crate::info!("analog matrix: {} active channels", self.plan.len());
    }

    /// Run one full scan and overwrite `matrix` with the result. Returns true if any bit differs
    /// from the previous scan.
    pub fn scan(&mut self, matrix: &mut [MatrixRow; ROWS]) -> bool {
        let now = Instant::now();
        let Self {
            sequencer,
            sampler,
            plan,
            filters,
            resolver,
            readings,
            failing,
            previous,
            diagnostics,
        } = self;

        diagnostics.begin_scan();

        let mut pending = plan.iter().peekable();
        sequencer.sweep(sampler, |channel, reading| {
            let bit = 1u32 << channel.global_index();
            let raw = match reading {
                Ok(raw) => {
                    if *failing & bit != 0 {
                        *failing &= !bit;
                        crate::info!(
                            "mux{} ch{}: sampling recovered",
                            channel.mux().number(),
                            channel.index()
                        );
                    }
                    raw
                }
                Err(_) => {
                    if *failing & bit == 0 {
                        *failing |= bit;
                        crate::warn!(
                            "mux{} ch{}: sampling failed; reading as released",
                            channel.mux().number(),
                            channel.index()
                        );
                    }
                    0
                }
            };
            readings[channel.global_index()] = raw;

            let Some(active) = pending.next_if(|a| a.channel == channel) else {
                return;
            };

            if let Some(desired) = channel_filter::detect(raw, active.threshold) {
                if filters.update(channel, desired, now) {
                    diagnostics.transition(channel, desired, raw, active.threshold);
                }
            }
            diagnostics.reading(channel, raw, active.threshold, active.key);
        });

        let mut raw = PairFlags::default();
        for active in plan.iter() {
            if let Some(member) = active.member {
                if filters.is_pressed(active.channel) {
                    raw.set(member);
                }
            }
        }

        matrix.fill(0);
        for active in plan.iter() {
            if !filters.is_pressed(active.channel) {
                continue;
            }
            if let Some(member) = active.member {
                if !resolver.is_visible(member, raw) {
                    continue;
                }
            }
            let bit: MatrixRow = 1 << active.col;
            matrix[active.row as usize] |= bit;
        }

        if resolver.end_scan(raw) {
            diagnostics.favored(resolver.favored());
        }

        let dirty = *matrix != *previous;
        *previous = *matrix;
        dirty
    }

    /// Most recent raw reading of `channel`.
    pub fn last_reading(&self, channel: Channel) -> u16 {
        self.readings[channel.global_index()]
    }

    /// Debounced state of `channel`, regardless of conflict suppression.
    pub fn is_pressed(&self, channel: Channel) -> bool {
        self.filters.is_pressed(channel)
    }

    pub fn favored(&self) -> PairMember {
        self.resolver.favored()
    }

    pub fn active_channel_count(&self) -> usize {
        self.plan.len()
    }

    pub fn diagnostics(&self) -> &ScanDiagnostics<'b> {
        &self.diagnostics
    }
}

#[cfg(test)]
#[path = "analog_matrix_test.rs"]
mod test;
