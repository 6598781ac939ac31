//! USB-Serial-JTAG byte port — the debug-bridge channel.
//!
//! Talks to the ESP-IDF `usb_serial_jtag` driver directly; the driver
//! (and its TX/RX buffer sizing) must already be installed by the caller.
//! Compiled for ESP-IDF targets only.

use core::ffi::c_void;

use esp_idf_svc::sys;

use super::serial::BytePort;
use crate::error::LinkError;

/// Write timeout: 100 ms at the default 100 Hz FreeRTOS tick.
const WRITE_TIMEOUT_TICKS: u32 = 10;

/// Byte port over the installed USB-Serial-JTAG driver.
pub struct UsbJtagPort;

impl UsbJtagPort {
    /// The driver must already be installed via
    /// `usb_serial_jtag_driver_install`.
    pub fn new() -> Self {
        Self
    }
}

impl BytePort for UsbJtagPort {
    fn available(&self) -> usize {
        // The driver exposes no buffered-count query; the zero-tick read
        // below stands in for the poll.
        1
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        let read = unsafe {
            sys::usb_serial_jtag_read_bytes(buf.as_mut_ptr().cast::<c_void>(), buf.len() as u32, 0)
        };
        if read < 0 {
            return Err(LinkError::Io);
        }
        Ok(read as usize)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, LinkError> {
        let written = unsafe {
            sys::usb_serial_jtag_write_bytes(
                data.as_ptr().cast::<c_void>(),
                data.len() as u32,
                WRITE_TIMEOUT_TICKS,
            )
        };
        if written < 0 {
            return Err(LinkError::Io);
        }
        Ok(written as usize)
    }
}
