//! Thread-safe hand-off for inbound link events.
//!
//! Hardware event callbacks (BLE GATT writes, connection events) arrive in
//! an external runtime context — the Bluetooth task, an ISR-adjacent
//! callback — never on the dispatch worker. A bounded `embassy-sync`
//! channel bridges the two without heap allocation:
//!
//! ```text
//! ┌──────────────┐   post()    ┌──────────────┐   take()   ┌───────────────┐
//! │ GATT handler │───────────▶│   Mailbox     │──────────▶│ dispatch tick  │
//! │ (BT task)    │            │  (bounded)    │            │ poll_receive() │
//! └──────────────┘            └──────────────┘            └───────────────┘
//! ```
//!
//! Each mailbox belongs to one adapter instance; there is no process-wide
//! event state.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

/// Default mailbox depth (pending events).
pub const MAILBOX_DEPTH: usize = 8;

/// Bounded MPMC hand-off from an event context to the dispatch worker.
pub struct InboundMailbox<T, const DEPTH: usize = { MAILBOX_DEPTH }> {
    inner: Channel<CriticalSectionRawMutex, T, DEPTH>,
}

impl<T, const DEPTH: usize> InboundMailbox<T, DEPTH> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Post an event; fails fast when the mailbox is full (the event is
    /// dropped, matching the drop-newest policy of the send queue).
    pub fn post(&self, event: T) -> bool {
        if self.inner.try_send(event).is_err() {
            warn!("mailbox full, inbound event dropped");
            return false;
        }
        true
    }

    /// Take the oldest pending event, if any.
    pub fn take(&self) -> Option<T> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T, const DEPTH: usize> Default for InboundMailbox<T, DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
