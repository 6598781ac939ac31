//! UART byte port over a configured `esp-idf-hal` driver.
//!
//! Pin assignment, baud rate, and driver installation stay with the
//! caller; this wrapper only moves bytes. Compiled for ESP-IDF targets
//! only.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;

use super::serial::BytePort;
use crate::error::LinkError;

/// Byte port over an installed UART driver.
pub struct UartPort<'d> {
    driver: UartDriver<'d>,
}

impl<'d> UartPort<'d> {
    pub fn new(driver: UartDriver<'d>) -> Self {
        Self { driver }
    }

    /// Currently configured baud rate (0 when the query fails).
    pub fn baud_rate(&self) -> u32 {
        self.driver.baudrate().map(|hz| hz.0).unwrap_or(0)
    }
}

impl BytePort for UartPort<'_> {
    fn available(&self) -> usize {
        self.driver.remaining_read().unwrap_or(0)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        self.driver.read(buf, NON_BLOCK).map_err(LinkError::from)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, LinkError> {
        self.driver.write(data).map_err(LinkError::from)
    }
}
