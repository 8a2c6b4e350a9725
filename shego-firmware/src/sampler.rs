use shego_common::board::MuxId;

/// Reads the common output of a multiplexer once its channel is selected and settled.
///
/// Readings are on the scale the board's thresholds were calibrated against
/// ([`shego_common::globals::READING_MAX`] for the reference tables). Conversions out of range are
/// clamped by the converter; nothing here validates them.
pub trait AnalogSampler {
    type Error: core::fmt::Debug;

    fn sample(&mut self, mux: MuxId) -> Result<u16, Self::Error>;
}

impl<T: AnalogSampler + ?Sized> AnalogSampler for &mut T {
    type Error = T::Error;

    fn sample(&mut self, mux: MuxId) -> Result<u16, Self::Error> {
        T::sample(self, mux)
    }
}
