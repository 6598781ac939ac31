//! Byte-stream link — any serial-style channel.
//!
//! [`BytePort`] is the byte-oriented seam: UART and the USB-Serial-JTAG
//! bridge both expose read/write/available over an already-configured
//! driver. [`SerialLink`] turns a port into a [`ChannelAdapter`]: a packet
//! goes out as its raw payload bytes (the wire container is the payload
//! itself on point-to-point serial links), and whatever the port has
//! buffered comes back in as one unaddressed packet per poll.

use log::{error, warn};

use crate::adapter::ChannelAdapter;
use crate::error::LinkError;
use crate::packet::{MAX_MTU, Packet};

/// Byte-oriented port over a configured serial driver.
pub trait BytePort: Send {
    /// Bytes currently buffered for reading (0 = nothing available).
    fn available(&self) -> usize;

    /// Read up to `buf.len()` bytes into `buf` without blocking past a
    /// dispatch tick. Returns the number of bytes actually read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;

    /// Write `data`; returns the number of bytes accepted by the driver.
    fn write(&mut self, data: &[u8]) -> Result<usize, LinkError>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}

/// Packet link over a byte stream.
pub struct SerialLink<P: BytePort> {
    tag: &'static str,
    port: P,
}

impl<P: BytePort> SerialLink<P> {
    pub fn new(tag: &'static str, port: P) -> Self {
        Self { tag, port }
    }
}

impl<P: BytePort> ChannelAdapter for SerialLink<P> {
    fn mtu_size(&self) -> usize {
        MAX_MTU
    }

    fn send_packet(&mut self, packet: &Packet) -> Result<(), LinkError> {
        let written = self.port.write(packet.payload())?;
        if written != packet.size() {
            error!(
                "{}: short write: {}/{} bytes",
                self.tag,
                written,
                packet.size()
            );
            return Err(LinkError::Io);
        }
        self.port.flush()
    }

    fn poll_receive(&mut self) -> Option<Packet> {
        if self.port.available() == 0 {
            return None;
        }

        let mut buf = [0u8; MAX_MTU];
        let read = match self.port.read(&mut buf) {
            Ok(n) => n,
            Err(err) => {
                warn!("{}: read failed: {err}", self.tag);
                return None;
            }
        };
        if read == 0 {
            return None;
        }
        Packet::with_payload(0, &buf[..read])
    }
}

// ── Tests ────────────────────────────────────────────────────
