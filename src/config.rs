//! Engine configuration
//!
//! Construction-time tunables for a transport engine. Values are fixed for
//! the lifetime of the engine; a provisioning layer may serialize them, but
//! a running engine never re-reads them.

use serde::{Deserialize, Serialize};

/// Dispatch-loop timing for one link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Minimum interval between successful sends (milliseconds).
    pub send_interval_ms: u32,
    /// Dispatch tick period (milliseconds) — how often the worker wakes to
    /// check the queue and poll for inbound data.
    pub tick_period_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: 20, // 50 packets/s ceiling per channel
            tick_period_ms: 1,
        }
    }
}
