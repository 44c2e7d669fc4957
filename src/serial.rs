//! Status reporting over the USB serial port.

use stm32f4xx_hal::otg_fs::UsbBusType;
use ufmt::uwriteln;
use usbd_serial::SerialPort;

use crate::config::{RangePreset, ResolutionPreset};
use crate::convert::Sample;
use crate::errors::Error;

// Configure serial buffer
pub const SERIAL_READ_BUFFER_BYTES: usize = 64;
pub const SERIAL_WRITE_BUFFER_BYTES: usize = 256;

/// Type alias for the serial port type
pub type SerialPortType = SerialPort<
    'static,
    UsbBusType,
    [u8; SERIAL_READ_BUFFER_BYTES],
    [u8; SERIAL_WRITE_BUFFER_BYTES],
>;

/// Wrapper for a `SerialPort` that supports ufmt
pub struct SerialWriter<'a>(pub &'a mut SerialPortType);

impl<'a> ufmt::uWrite for SerialWriter<'a> {
    type Error = Error;
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.0
            .write(s.as_bytes())
            .map(|_| ())
            .map_err(|_| Error::SerialWriteFailed)
    }
}

/// Announce a resolution change.
pub fn report_resolution(serial: &mut SerialPortType, preset: &ResolutionPreset) -> Result<(), Error> {
    uwriteln!(
        SerialWriter(serial),
        "resolution: {} bits (full scale {})",
        preset.bits,
        preset.full_scale as u32
    )
}

/// Announce an input range change.
pub fn report_range(serial: &mut SerialPortType, preset: &RangePreset) -> Result<(), Error> {
    uwriteln!(
        SerialWriter(serial),
        "range: {} ({} mV max)",
        preset.code.label(),
        preset.max_millivolts
    )
}

/// Periodic status line with both millivolt estimates and their difference.
pub fn report_sample(serial: &mut SerialPortType, sample: &Sample) -> Result<(), Error> {
    uwriteln!(
        SerialWriter(serial),
        "raw {} | adc {} mV | calc {} mV | delta {} mV",
        sample.raw,
        sample.adc_millivolts,
        sample.computed_millivolts,
        sample.discrepancy()
    )
}
