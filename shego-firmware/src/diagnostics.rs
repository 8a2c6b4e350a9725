//! Calibration aid: periodically logs every active channel's reading against its threshold and
//! logs each accepted transition.

use core::sync::atomic::{AtomicBool, Ordering};

use shego_common::board::{Channel, PairMember};

/// Runtime on/off switch, shared between the scanner and whatever toggles it.
pub struct DiagnosticsSwitch(AtomicBool);

impl DiagnosticsSwitch {
    pub const fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct ScanDiagnostics<'c> {
    switch: Option<&'c DiagnosticsSwitch>,
    /// Scans between dumps.
    interval: u32,
    scan_count: u32,
    enabled: bool,
    dumping: bool,
    dumps: u32,
}

impl<'c> ScanDiagnostics<'c> {
    pub fn new(switch: Option<&'c DiagnosticsSwitch>, interval: u32) -> Self {
        Self {
            switch,
            interval: interval.max(1),
            scan_count: 0,
            enabled: false,
            dumping: false,
            dumps: 0,
        }
    }

    /// Called once at the start of every scan. Returns true if this scan dumps its readings.
    pub fn begin_scan(&mut self) -> bool {
        self.enabled = self.switch.is_some_and(|s| s.is_enabled());
        self.dumping = self.enabled && self.scan_count % self.interval == 0;
        if self.dumping {
            self.dumps = self.dumps.wrapping_add(1);
            crate::debug!("=== scan {} ===", self.scan_count);
        }
        self.scan_count = self.scan_count.wrapping_add(1);
        self.dumping
    }

    pub fn reading(&self, channel: Channel, raw: u16, threshold: u16, key: u16) {
        if self.dumping {
            crate::debug!(
                "mux{} ch{}: adc={} thresh={} key={}",
                channel.mux().number(),
                channel.index(),
                raw,
                threshold,
                key
            );
        }
    }

    pub fn transition(&self, channel: Channel, pressed: bool, raw: u16, threshold: u16) {
        if self.enabled {
            crate::debug!(
                "mux{} ch{}: {} (adc={} thresh={})",
                channel.mux().number(),
                channel.index(),
                if pressed { "press" } else { "release" },
                raw,
                threshold
            );
        }
    }

    pub fn favored(&self, member: PairMember) {
        if self.enabled {
            crate::debug!("socd favours {}", if member == PairMember::A { "A" } else { "B" });
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Number of scans that dumped their readings.
    pub fn dumps(&self) -> u32 {
        self.dumps
    }
}

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod test;
