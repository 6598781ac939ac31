//! Error types for the transport layer.
//!
//! Two small `Copy` enums cover the whole surface: [`SendError`] is what a
//! caller of [`TransportEngine::send`](crate::engine::TransportEngine::send)
//! can see, and [`LinkError`] is what a channel adapter reports for one
//! physical transmission attempt. The engine classifies every `LinkError`
//! as transient (retried by requeue) or fatal (dropped and reported via the
//! bound error handler).

use core::fmt;

// ---------------------------------------------------------------------------
// Enqueue errors (synchronous, returned from `send`)
// ---------------------------------------------------------------------------

/// Why a packet was not accepted into the send queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The engine is not running, the adapter never came up, or the packet
    /// fails its validity invariant.
    InvalidArgument,
    /// The bounded send queue is at capacity; the packet was not enqueued
    /// (drop-newest backpressure).
    QueueFull,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "engine not ready or packet invalid"),
            Self::QueueFull => write!(f, "send queue full"),
        }
    }
}

// ---------------------------------------------------------------------------
// Link errors (asynchronous, produced during dispatch)
// ---------------------------------------------------------------------------

/// Outcome of one physical transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The link stack is temporarily out of buffer memory.
    NoMem,
    /// The link is momentarily in a state that cannot accept a write.
    InvalidState,
    /// The write did not complete within its time budget.
    Timeout,
    /// No peer is connected on this channel.
    NotConnected,
    /// The physical write failed or was short.
    Io,
}

impl LinkError {
    /// Transient errors are retried by requeueing the packet; everything
    /// else drops the packet and fires the error handler.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::NoMem | Self::InvalidState | Self::Timeout)
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMem => write!(f, "out of memory"),
            Self::InvalidState => write!(f, "invalid link state"),
            Self::Timeout => write!(f, "timed out"),
            Self::NotConnected => write!(f, "no peer connected"),
            Self::Io => write!(f, "I/O failure"),
        }
    }
}

#[cfg(target_os = "espidf")]
impl From<esp_idf_svc::sys::EspError> for LinkError {
    fn from(err: esp_idf_svc::sys::EspError) -> Self {
        use esp_idf_svc::sys;
        let code = err.code();
        if code == sys::ESP_ERR_NO_MEM as i32 {
            Self::NoMem
        } else if code == sys::ESP_ERR_INVALID_STATE as i32 {
            Self::InvalidState
        } else if code == sys::ESP_ERR_TIMEOUT as i32 {
            Self::Timeout
        } else {
            Self::Io
        }
    }
}

/// Transport-wide `Result` alias for enqueue operations.
pub type Result<T> = core::result::Result<T, SendError>;

// ── Tests ────────────────────────────────────────────────────
