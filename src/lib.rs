//! PacketLink — channel-agnostic packet transport for ESP32-class links.
//!
//! One [`TransportEngine`] per physical channel (BLE, UART, USB-JTAG)
//! moves fixed-format [`Packet`]s through a bounded queue and a
//! rate-limited dispatch loop, retrying transient link failures and
//! reporting fatal ones. Channel specifics live behind the
//! [`ChannelAdapter`] capability; hardware bring-up belongs to the
//! caller. ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapter;
pub mod adapters;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod mailbox;
pub mod packet;
pub mod queue;
pub mod spawn;

pub use adapter::{ChannelAdapter, NullAdapter};
pub use config::LinkConfig;
pub use engine::{ErrorHandler, LinkState, ReceiveHandler, TransportEngine};
pub use error::{LinkError, SendError};
pub use packet::{MAX_MTU, Packet};
pub use queue::{MAX_QUEUE_SIZE, PacketQueue};
