//! Turns raw readings into per-channel pressed states.

use embassy_time::{Duration, Instant};
use shego_common::board::{Channel, CHANNEL_COUNT};

/// Is a reading pressed? `None` for a channel with threshold 0, which does not exist as far as
/// scanning is concerned.
#[inline]
pub fn detect(raw: u16, threshold: u16) -> Option<bool> {
    if threshold == 0 {
        None
    } else {
        Some(raw > threshold)
    }
}

/// Debounced state of one channel: a hold-off timer that only accepts a new state once the dwell
/// time has passed since the last accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    pressed: bool,
    last_change: Instant,
}
impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}
impl ChannelState {
    pub const fn new() -> Self {
        Self {
            pressed: false,
            last_change: Instant::from_ticks(0),
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn last_change(&self) -> Instant {
        self.last_change
    }

    /// Offer a new raw state. Returns true if it was accepted.
    pub fn update(&mut self, desired: bool, now: Instant, dwell: Duration) -> bool {
        if desired != self.pressed && now.saturating_duration_since(self.last_change) > dwell {
            self.pressed = desired;
            self.last_change = now;
            true
        } else {
            false
        }
    }
}

pub struct ChannelFilters {
    states: [ChannelState; CHANNEL_COUNT],
    dwell: Duration,
}
impl ChannelFilters {
    pub fn new(dwell: Duration) -> Self {
        Self {
            states: [ChannelState::new(); CHANNEL_COUNT],
            dwell,
        }
    }

    pub fn reset(&mut self) {
        self.states = [ChannelState::new(); CHANNEL_COUNT];
    }

    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    pub fn update(&mut self, channel: Channel, desired: bool, now: Instant) -> bool {
        self.states[channel.global_index()].update(desired, now, self.dwell)
    }

    pub fn is_pressed(&self, channel: Channel) -> bool {
        self.states[channel.global_index()].is_pressed()
    }

    pub fn state(&self, channel: Channel) -> &ChannelState {
        &self.states[channel.global_index()]
    }
}

#[cfg(test)]
#[path = "channel_filter_test.rs"]
mod test;
