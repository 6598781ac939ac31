//! BLE GATT link — packet exchange over write + notify characteristics.
//!
//! The Bluetooth stack delivers GATT/GAP events in its own task context,
//! never on the dispatch worker. Bring-up code registers a
//! [`BleEventSender`] (cloned from the link before it moves into the
//! engine) inside its GATT callbacks; connection lifecycle and inbound
//! writes then flow through the event mailbox and are applied on the
//! dispatch worker's poll. Outbound packets go through an injected notify
//! sink — the closure that performs the actual GATT notification, supplied
//! by the same bring-up code.
//!
//! Addressing: `packet.id` is the GATT connection id; `0` broadcasts to
//! every connected peer.

use std::sync::Arc;

use log::{error, info, warn};

use crate::adapter::ChannelAdapter;
use crate::error::LinkError;
use crate::mailbox::InboundMailbox;
use crate::packet::Packet;

const TAG: &str = "BLE";

/// MTU before any exchange completes (BLE 4.x minimum).
pub const DEFAULT_MTU: usize = 23;

/// ATT notification opcode + handle overhead per PDU.
pub const ATT_HEADER_SIZE: usize = 3;

/// Maximum simultaneously connected peers.
pub const MAX_CONNECTIONS: usize = 4;

const EVENT_DEPTH: usize = 8;

/// Performs one GATT notification to a connection. Registered by the
/// bring-up code that owns the Bluetooth stack handles.
pub type NotifySink = Box<dyn FnMut(u16, &[u8]) -> Result<(), LinkError> + Send>;

// ── Event hand-off ───────────────────────────────────────────

/// Connection lifecycle and data events from the Bluetooth task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BleEvent {
    Connected { conn_id: u16 },
    Disconnected { conn_id: u16 },
    MtuExchanged { conn_id: u16, mtu: u16 },
    Write { packet: Packet },
}

/// Cloneable producer half of the link's event mailbox. Safe to call
/// from the Bluetooth task context.
pub struct BleEventSender {
    mailbox: Arc<InboundMailbox<BleEvent, EVENT_DEPTH>>,
}

impl Clone for BleEventSender {
    fn clone(&self) -> Self {
        Self {
            mailbox: Arc::clone(&self.mailbox),
        }
    }
}

impl BleEventSender {
    pub fn connected(&self, conn_id: u16) -> bool {
        self.mailbox.post(BleEvent::Connected { conn_id })
    }

    pub fn disconnected(&self, conn_id: u16) -> bool {
        self.mailbox.post(BleEvent::Disconnected { conn_id })
    }

    pub fn mtu_exchanged(&self, conn_id: u16, mtu: u16) -> bool {
        self.mailbox.post(BleEvent::MtuExchanged { conn_id, mtu })
    }

    /// Hand off the payload of a GATT write characteristic event.
    pub fn write(&self, conn_id: u16, data: &[u8]) -> bool {
        let Some(packet) = Packet::with_payload(conn_id, data) else {
            warn!("{TAG}: discarding GATT write of {} bytes", data.len());
            return false;
        };
        self.mailbox.post(BleEvent::Write { packet })
    }
}

// ── Link ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Connection {
    conn_id: u16,
    mtu: u16,
}

/// GATT-notify channel with a per-connection MTU table.
pub struct BleLink {
    connections: heapless::Vec<Connection, MAX_CONNECTIONS>,
    mailbox: Arc<InboundMailbox<BleEvent, EVENT_DEPTH>>,
    notify: NotifySink,
}

impl BleLink {
    pub fn new(notify: NotifySink) -> Self {
        Self {
            connections: heapless::Vec::new(),
            mailbox: Arc::new(InboundMailbox::new()),
            notify,
        }
    }

    /// Producer handle for the Bluetooth task's GATT/GAP callbacks.
    /// Clone it out before the link moves into an engine.
    pub fn events(&self) -> BleEventSender {
        BleEventSender {
            mailbox: Arc::clone(&self.mailbox),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn apply_event(&mut self, event: BleEvent) -> Option<Packet> {
        match event {
            BleEvent::Connected { conn_id } => {
                let conn = Connection {
                    conn_id,
                    mtu: DEFAULT_MTU as u16,
                };
                if self.connections.push(conn).is_err() {
                    warn!("{TAG}: connection table full, ignoring conn {conn_id}");
                } else {
                    info!("{TAG}: conn {conn_id} connected (MTU={DEFAULT_MTU})");
                }
                None
            }
            BleEvent::Disconnected { conn_id } => {
                if let Some(pos) = self.connections.iter().position(|c| c.conn_id == conn_id) {
                    let _ = self.connections.swap_remove(pos);
                }
                info!("{TAG}: conn {conn_id} disconnected");
                None
            }
            BleEvent::MtuExchanged { conn_id, mtu } => {
                if let Some(conn) = self.connections.iter_mut().find(|c| c.conn_id == conn_id) {
                    conn.mtu = mtu;
                    info!("{TAG}: conn {conn_id} MTU={mtu}");
                }
                None
            }
            BleEvent::Write { packet } => Some(packet),
        }
    }

    fn notify_connection(
        notify: &mut NotifySink,
        conn: Connection,
        packet: &Packet,
    ) -> Result<(), LinkError> {
        let budget = (conn.mtu as usize).saturating_sub(ATT_HEADER_SIZE);
        if packet.size() > budget {
            error!(
                "{TAG}: {} exceeds conn {} payload budget ({budget} bytes)",
                packet, conn.conn_id
            );
            return Err(LinkError::Io);
        }
        notify(conn.conn_id, packet.payload())
    }
}

impl ChannelAdapter for BleLink {
    /// Smallest negotiated MTU across active connections; the BLE 4.x
    /// minimum while nothing is connected.
    fn mtu_size(&self) -> usize {
        self.connections
            .iter()
            .map(|c| c.mtu as usize)
            .min()
            .unwrap_or(DEFAULT_MTU)
    }

    fn send_packet(&mut self, packet: &Packet) -> Result<(), LinkError> {
        if self.connections.is_empty() {
            return Err(LinkError::NotConnected);
        }

        if packet.id() == 0 {
            // Broadcast: best-effort to every peer, ok if any succeeded.
            let mut delivered = 0usize;
            let mut last_err = LinkError::NotConnected;
            for conn in self.connections.iter().copied() {
                match Self::notify_connection(&mut self.notify, conn, packet) {
                    Ok(()) => delivered += 1,
                    Err(err) => {
                        warn!("{TAG}: notify to conn {} failed: {err}", conn.conn_id);
                        last_err = err;
                    }
                }
            }
            if delivered > 0 { Ok(()) } else { Err(last_err) }
        } else {
            let Some(conn) = self
                .connections
                .iter()
                .copied()
                .find(|c| c.conn_id == packet.id())
            else {
                return Err(LinkError::NotConnected);
            };
            Self::notify_connection(&mut self.notify, conn, packet)
        }
    }

    fn poll_receive(&mut self) -> Option<Packet> {
        // Apply queued control events until a data packet (or nothing)
        // surfaces; bookkeeping stays on the dispatch worker.
        while let Some(event) = self.mailbox.take() {
            if let Some(packet) = self.apply_event(event) {
                return Some(packet);
            }
        }
        None
    }
}

// ── Tests ────────────────────────────────────────────────────
