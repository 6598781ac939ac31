//! Channel adapter capability — any physical link.
//!
//! Concrete implementations:
//! - BLE GATT notify/write (event-driven, mailbox-fed)
//! - UART serial
//! - USB-Serial-JTAG debug bridge
//!
//! The transport engine is generic over `ChannelAdapter`, so adding a new
//! physical channel requires zero changes to the dispatch logic. The
//! engine only asks three things of a link: report its MTU, attempt one
//! transmission without blocking past a dispatch tick, and optionally
//! yield one inbound packet per poll.

use crate::error::LinkError;
use crate::packet::{MAX_MTU, Packet};

/// One physical channel.
pub trait ChannelAdapter: Send {
    /// Maximum payload this channel currently supports. Queried by
    /// callers sizing their payloads; the engine itself only enforces the
    /// packet validity invariant.
    fn mtu_size(&self) -> usize;

    /// Attempt exactly one physical transmission of `packet`.
    /// Must not block beyond one dispatch tick's budget.
    fn send_packet(&mut self, packet: &Packet) -> Result<(), LinkError>;

    /// Poll the physical layer once; `Some` delivers one inbound packet
    /// to the bound receive handler. Event-driven links leave the default.
    fn poll_receive(&mut self) -> Option<Packet> {
        None
    }

    /// Whether construction-time bring-up succeeded. A not-ready adapter
    /// makes the engine reject every `send`.
    fn is_ready(&self) -> bool {
        true
    }
}

/// A null link that accepts every send and never yields inbound data.
/// Useful as a default when no physical channel is attached.
pub struct NullAdapter;

impl ChannelAdapter for NullAdapter {
    fn mtu_size(&self) -> usize {
        MAX_MTU
    }

    fn send_packet(&mut self, _packet: &Packet) -> Result<(), LinkError> {
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_adapter_swallows_sends() {
        let mut link = NullAdapter;
        let packet = Packet::with_payload(1, b"x").unwrap();
        assert!(link.send_packet(&packet).is_ok());
        assert!(link.poll_receive().is_none());
        assert!(link.is_ready());
        assert_eq!(link.mtu_size(), MAX_MTU);
    }
}
