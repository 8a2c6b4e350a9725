use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel};
use embassy_time::{Duration, Ticker};
use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::{analog_matrix::AnalogMatrix, sampler::AnalogSampler, MatrixRow};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanKey {
    row: u8,
    col: u8,
}
impl ScanKey {
    pub fn new(row: u8, col: u8, is_down: bool) -> Self {
        Self {
            row: row | if is_down { 0x80 } else { 0 },
            col,
        }
    }

    pub fn row(&self) -> usize {
        (self.row & 0x7f) as usize
    }

    pub fn column(&self) -> usize {
        self.col as usize
    }

    pub fn is_down(&self) -> bool {
        self.row & 0x80 == 0x80
    }
}

pub struct KeyScannerChannel<M: RawMutex, const N: usize>(Channel<M, ScanKey, N>);
impl<M: RawMutex, const N: usize> Default for KeyScannerChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}
impl<M: RawMutex, const N: usize> KeyScannerChannel<M, N> {
    pub async fn receive(&self) -> ScanKey {
        self.0.receive().await
    }

    pub fn try_receive(&self) -> Option<ScanKey> {
        self.0.try_receive().ok()
    }
}

/// Runs the analog matrix at a fixed rate and reports each key that changes as a [ScanKey].
pub struct KeyScanner<'c, 'b, O, S, D, M, const ROWS: usize, const PS: usize>
where
    O: OutputPin,
    S: AnalogSampler,
    D: DelayNs,
    M: RawMutex,
{
    channel: &'c KeyScannerChannel<M, PS>,
    matrix: AnalogMatrix<'b, O, S, D, ROWS>,

    /// Output of the latest scan.
    rows: [MatrixRow; ROWS],
    /// What has been sent down the channel so far.
    reported: [MatrixRow; ROWS],

    scan_interval: Duration,
}
impl<'c, 'b, O, S, D, M, const ROWS: usize, const PS: usize>
    KeyScanner<'c, 'b, O, S, D, M, ROWS, PS>
where
    O: OutputPin,
    S: AnalogSampler,
    D: DelayNs,
    M: RawMutex,
{
    pub fn new(
        matrix: AnalogMatrix<'b, O, S, D, ROWS>,
        channel: &'c KeyScannerChannel<M, PS>,
        scan_interval: Duration,
    ) -> Self {
        Self {
            channel,
            matrix,
            rows: [0; ROWS],
            reported: [0; ROWS],
            scan_interval,
        }
    }

    pub async fn run(&mut self) {
        self.matrix.init();
        self.reported = [0; ROWS];
        let mut ticker = Ticker::every(self.scan_interval);
        loop {
            self.scan().await;
            ticker.next().await;
        }
    }

    /// Scan once and send a [ScanKey] for every bit that changed, rows then columns ascending.
    /// Returns the number of keys sent.
    pub async fn scan(&mut self) -> usize {
        if !self.matrix.scan(&mut self.rows) {
            return 0;
        }

        let mut sent = 0;
        for (row, (now, reported)) in self.rows.iter().zip(self.reported.iter_mut()).enumerate() {
            let mut changed = *now ^ *reported;
            while changed != 0 {
                let col = changed.trailing_zeros();
                let bit: MatrixRow = 1 << col;
                changed &= !bit;
                let down = *now & bit != 0;
                crate::debug!("key {},{} {}", row, col, if down { "down" } else { "up" });
                self.channel
                    .0
                    .send(ScanKey::new(row as u8, col as u8, down))
                    .await;
                sent += 1;
            }
            *reported = *now;
        }
        sent
    }

    pub fn matrix(&self) -> &AnalogMatrix<'b, O, S, D, ROWS> {
        &self.matrix
    }

    /// Latest scan output.
    pub fn rows(&self) -> &[MatrixRow; ROWS] {
        &self.rows
    }
}

#[cfg(test)]
#[path = "key_scanner_test.rs"]
mod test;
