pub use embassy_rp::*;

use embassy_rp::adc::{Adc, Blocking, Channel as SenseChannel, Error as AdcError};
use shego_common::board::{MuxId, MUX_COUNT};
use shego_firmware::sampler::AnalogSampler;

/// Reads the two multiplexer sense lines with the on-chip ADC.
pub struct AdcSampler<'d> {
    adc: Adc<'d, Blocking>,
    /// Sense line per multiplexer, in [MuxId] order.
    sense: [SenseChannel<'d>; MUX_COUNT],
}

impl<'d> AdcSampler<'d> {
    pub fn new(adc: Adc<'d, Blocking>, mux1: SenseChannel<'d>, mux2: SenseChannel<'d>) -> Self {
        Self {
            adc,
            sense: [mux1, mux2],
        }
    }
}

impl AnalogSampler for AdcSampler<'_> {
    type Error = AdcError;

    fn sample(&mut self, mux: MuxId) -> Result<u16, Self::Error> {
        let sample = self.adc.blocking_read(&mut self.sense[mux.offset()])?;
        Ok(crate::scale_reading(sample))
    }
}

/// Configure and run a shego analog keyboard on an RP2040.
///
/// This macro adds a `main` function that sets up the multiplexer pins and the ADC, then spawns
/// the key scanner and a task that logs every key change.
///
/// # Example `main.rs`
///
/// ```rust
/// #![no_std]
/// #![no_main]
///
/// use panic_probe as _;
///
/// shego_builder::rp_run_keyboard! {
///     board: shego_builder::shego_common::shego16::BOARD,
///     rows: shego_builder::shego_common::shego16::ROWS,
///     select: [PIN_10, PIN_11, PIN_12, PIN_13],
///     enable: [PIN_14, PIN_15],
///     sense: [PIN_29, PIN_28],
/// }
/// ```
#[macro_export]
macro_rules! rp_run_keyboard {
    (
        board: $board:expr,
        rows: $rows:expr,
        select: [$s0:ident, $s1:ident, $s2:ident, $s3:ident],
        enable: [$e1:ident, $e2:ident],
        sense: [$a1:ident, $a2:ident] $(,)?
    ) => {
        use shego_builder::rp::{
            adc,
            gpio::{Level, Output, Pull},
        };
        use shego_builder::{
            analog_matrix::AnalogMatrix,
            diagnostics::DiagnosticsSwitch,
            key_scanner::{KeyScanner, KeyScannerChannel},
            rp::AdcSampler,
            BoardConfig, Delay, Duration, NoopRawMutex, StaticCell,
        };

        const ROWS: usize = $rows;
        const SCANNER_BUFFER_SIZE: usize = 32;

        type ScanChannel = KeyScannerChannel<NoopRawMutex, SCANNER_BUFFER_SIZE>;
        type Scanner = KeyScanner<
            'static,
            'static,
            Output<'static>,
            AdcSampler<'static>,
            Delay,
            NoopRawMutex,
            ROWS,
            SCANNER_BUFFER_SIZE,
        >;

        static BOARD: BoardConfig = $board;
        static KEY_SCAN_CHANNEL: StaticCell<ScanChannel> = StaticCell::new();
        static DIAGNOSTICS: DiagnosticsSwitch = DiagnosticsSwitch::new(cfg!(feature = "defmt"));

        #[embassy_executor::task]
        async fn scanner(mut scanner: Scanner) {
            scanner.run().await;
        }

        #[embassy_executor::task]
        async fn key_logger(key_scan_channel: &'static ScanChannel) {
            loop {
                let key = key_scan_channel.receive().await;
                shego_builder::info!(
                    "key {},{} {}",
                    key.row(),
                    key.column(),
                    if key.is_down() { "down" } else { "up" }
                );
            }
        }

        #[embassy_executor::main]
        async fn main(spawner: embassy_executor::Spawner) {
            let p = shego_builder::rp::init(Default::default());

            let select = [
                Output::new(p.$s0, Level::Low),
                Output::new(p.$s1, Level::Low),
                Output::new(p.$s2, Level::Low),
                Output::new(p.$s3, Level::Low),
            ];
            // enables are active low; start with both multiplexers off
            let enable = [
                Output::new(p.$e1, Level::High),
                Output::new(p.$e2, Level::High),
            ];

            let sampler = AdcSampler::new(
                adc::Adc::new_blocking(p.ADC, adc::Config::default()),
                adc::Channel::new_pin(p.$a1, Pull::Up),
                adc::Channel::new_pin(p.$a2, Pull::Up),
            );

            let matrix = AnalogMatrix::<_, _, _, ROWS>::new(&BOARD, select, enable, sampler, Delay)
                .with_diagnostics(&DIAGNOSTICS);

            let key_scan_channel: &'static ScanChannel =
                KEY_SCAN_CHANNEL.init(ScanChannel::default());
            let key_scanner = KeyScanner::new(
                matrix,
                key_scan_channel,
                Duration::from_micros(BOARD.timing.scan_interval_us as u64),
            );

            if spawner.spawn(key_logger(key_scan_channel)).is_err() {
                shego_builder::error!("unable to start key logger");
            }
            if spawner.spawn(scanner(key_scanner)).is_err() {
                shego_builder::error!("unable to start key scanner");
            }
        }
    };
}
