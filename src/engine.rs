//! Transport dispatch engine — the channel-agnostic core.
//!
//! One engine instance owns one physical channel: a bounded outbound
//! queue, the adapter that talks to the link, and a single dedicated
//! worker running the cooperative dispatch loop. Producers enqueue from
//! any context via [`send`](TransportEngine::send); the worker drains the
//! queue at a rate-limited pace, classifies failures, and polls the link
//! for inbound data.
//!
//! ```text
//!  send() ──▶ ┌─────────────┐        ┌───────────────────────────────┐
//!  send() ──▶ │ PacketQueue │──pop──▶│ dispatch tick                  │
//!  send() ──▶ │ (bounded)   │◀─retry─│  rate gate → send_packet()     │
//!             └─────────────┘        │  poll_receive() → handler      │
//!                                    └───────────────────────────────┘
//! ```
//!
//! Per tick, at most one send attempt and one receive poll happen; they
//! share the worker and never run in parallel for a given channel.
//! Transient send failures are requeued and retried on a later tick;
//! fatal failures drop the packet and fire the bound error handler.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{error, info, trace, warn};

use crate::adapter::ChannelAdapter;
use crate::clock::MonotonicClock;
use crate::config::LinkConfig;
use crate::error::{LinkError, SendError};
use crate::packet::Packet;
use crate::queue::{MAX_QUEUE_SIZE, PacketQueue};
use crate::spawn::{Core, spawn_on_core};

/// Handler for inbound packets. The second argument is a reply function
/// that enqueues a packet on the same channel (enqueue failures are
/// logged, not surfaced — the reply happens after the caller returned).
pub type ReceiveHandler = Box<dyn FnMut(Packet, &mut dyn FnMut(Packet)) + Send>;

/// Handler for packets dropped after a fatal send failure.
pub type ErrorHandler = Box<dyn FnMut(&Packet, LinkError) + Send>;

/// Engine lifecycle. `Stopped` is terminal: a stopped channel needs a new
/// engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Created = 0,
    Running = 1,
    Stopped = 2,
}

#[derive(Default)]
struct Bindings {
    receive: Option<ReceiveHandler>,
    error: Option<ErrorHandler>,
}

fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Shared engine state ──────────────────────────────────────

struct Shared<A: ChannelAdapter, const N: usize> {
    tag: &'static str,
    adapter: Mutex<A>,
    queue: PacketQueue<N>,
    bindings: Mutex<Bindings>,
    state: AtomicU8,
    /// Captured from the adapter at construction; a failed hardware
    /// bring-up rejects every send with `InvalidArgument`.
    ready: bool,
    config: LinkConfig,
}

impl<A: ChannelAdapter, const N: usize> Shared<A, N> {
    fn state(&self) -> LinkState {
        match self.state.load(Ordering::Acquire) {
            0 => LinkState::Created,
            1 => LinkState::Running,
            _ => LinkState::Stopped,
        }
    }

    fn enqueue(&self, packet: &Packet) -> Result<(), SendError> {
        if self.state() != LinkState::Running || !self.ready || !packet.is_valid() {
            warn!(
                "{}: invalid send params: state={:?}, ready={}, {}",
                self.tag,
                self.state(),
                self.ready,
                packet
            );
            return Err(SendError::InvalidArgument);
        }

        if self.queue.push(packet, Duration::ZERO) {
            Ok(())
        } else {
            warn!("{}: send queue full, packet rejected", self.tag);
            Err(SendError::QueueFull)
        }
    }

    /// Send phase of one dispatch tick: honor the rate gate, attempt one
    /// transmission, classify the outcome.
    fn service_send_queue(&self, clock: &MonotonicClock, next_send_at: &mut u64) {
        if *next_send_at > clock.now_us() {
            return;
        }

        let Some(packet) = self.queue.pop(Duration::ZERO) else {
            return;
        };

        let result = lock_recover(&self.adapter).send_packet(&packet);
        match result {
            Ok(()) => {
                *next_send_at = clock.now_us() + u64::from(self.config.send_interval_ms) * 1_000;
                trace!("{}: sent {}", self.tag, packet);
            }
            Err(err) => self.handle_send_error(packet, err),
        }
    }

    fn handle_send_error(&self, packet: Packet, err: LinkError) {
        if err.is_transient() {
            warn!("{}: transient send failure ({err}), retrying", self.tag);
            // Back into the queue for another attempt on a later tick.
            if !self.queue.push(&packet, Duration::ZERO) {
                error!("{}: retry requeue failed, {} lost", self.tag, packet);
            }
        } else {
            error!("{}: fatal send failure ({err}), {} dropped", self.tag, packet);
            let mut bindings = lock_recover(&self.bindings);
            if let Some(handler) = bindings.error.as_mut() {
                handler(&packet, err);
            }
        }
    }

    /// Receive phase of one dispatch tick: one inbound poll, one handler
    /// invocation.
    fn service_inbound(&self) {
        let inbound = lock_recover(&self.adapter).poll_receive();
        let Some(packet) = inbound else {
            return;
        };
        trace!("{}: received {}", self.tag, packet);

        let mut bindings = lock_recover(&self.bindings);
        let Some(handler) = bindings.receive.as_mut() else {
            return;
        };
        let mut reply = |reply_packet: Packet| {
            if let Err(err) = self.enqueue(&reply_packet) {
                warn!("{}: reply rejected: {err}", self.tag);
            }
        };
        handler(packet, &mut reply);
    }
}

async fn dispatch_loop<A: ChannelAdapter, const N: usize>(shared: Arc<Shared<A, N>>) {
    let clock = MonotonicClock::new();
    let tick = Duration::from_millis(u64::from(shared.config.tick_period_ms.max(1)));
    let mut next_send_at: u64 = 0;

    while shared.state() == LinkState::Running {
        shared.service_send_queue(&clock, &mut next_send_at);
        shared.service_inbound();
        async_io_mini::Timer::after(tick).await;
    }
    trace!("{}: dispatch loop exited", shared.tag);
}

// ── Engine ───────────────────────────────────────────────────

/// Rate-limited dispatch engine for one physical channel.
///
/// `N` is the send-queue capacity (default 16). All public operations are
/// safe to call concurrently; none of them blocks the caller.
pub struct TransportEngine<A: ChannelAdapter + 'static, const N: usize = { MAX_QUEUE_SIZE }> {
    shared: Arc<Shared<A, N>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<A: ChannelAdapter + 'static, const N: usize> TransportEngine<A, N> {
    /// Wrap `adapter` with default timing ([`LinkConfig::default`]).
    pub fn new(tag: &'static str, adapter: A) -> Self {
        Self::with_config(tag, adapter, LinkConfig::default())
    }

    pub fn with_config(tag: &'static str, adapter: A, config: LinkConfig) -> Self {
        let ready = adapter.is_ready();
        if !ready {
            error!("{tag}: adapter failed bring-up, all sends will be rejected");
        }
        Self {
            shared: Arc::new(Shared {
                tag,
                adapter: Mutex::new(adapter),
                queue: PacketQueue::new(),
                bindings: Mutex::new(Bindings::default()),
                state: AtomicU8::new(LinkState::Created as u8),
                ready,
                config,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Bind the inbound and error handlers, atomically replacing any
    /// previous pair. Accepted in any lifecycle state; effective once
    /// the engine is running.
    pub fn bind(&self, receive: ReceiveHandler, error: Option<ErrorHandler>) {
        let mut bindings = lock_recover(&self.shared.bindings);
        bindings.receive = Some(receive);
        bindings.error = error;
    }

    /// Start the dispatch worker. Idempotent: returns `true` when already
    /// running, `false` once the engine has been stopped (terminal).
    pub fn start(&self) -> bool {
        match self.shared.state.compare_exchange(
            LinkState::Created as u8,
            LinkState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                let shared = Arc::clone(&self.shared);
                let handle = spawn_on_core(Core::Pro, 19, 8, "link-io\0", move || {
                    futures_lite::future::block_on(dispatch_loop(shared));
                });
                *lock_recover(&self.worker) = Some(handle);
                info!("{}: dispatch loop started", self.shared.tag);
                true
            }
            Err(current) if current == LinkState::Running as u8 => true,
            Err(_) => {
                warn!("{}: cannot restart a stopped link", self.shared.tag);
                false
            }
        }
    }

    /// Stop the dispatch worker and drain the queue. Idempotent; the
    /// engine stays stopped until a new instance is constructed.
    pub fn stop(&self) {
        let prev = self
            .shared
            .state
            .swap(LinkState::Stopped as u8, Ordering::AcqRel);

        if let Some(handle) = lock_recover(&self.worker).take() {
            if handle.join().is_err() {
                error!("{}: dispatch worker panicked", self.shared.tag);
            }
        }

        let drained = self.shared.queue.clear();
        if prev == LinkState::Running as u8 {
            info!("{}: stopped ({} pending packets discarded)", self.shared.tag, drained);
        }
    }

    /// Queue `packet` for transmission. Success means *accepted*, not
    /// *transmitted*: the worker sends it on a later tick.
    ///
    /// Fails with [`SendError::InvalidArgument`] when the engine is not
    /// running or the packet is invalid, and [`SendError::QueueFull`] when
    /// the bounded queue is at capacity (the packet is discarded —
    /// drop-newest backpressure).
    pub fn send(&self, packet: &Packet) -> Result<(), SendError> {
        self.shared.enqueue(packet)
    }

    /// Number of packets waiting for dispatch.
    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Discard every pending packet; returns how many were dropped.
    pub fn clear_queue(&self) -> usize {
        self.shared.queue.clear()
    }

    pub fn state(&self) -> LinkState {
        self.shared.state()
    }

    /// Current MTU of the underlying channel.
    pub fn mtu_size(&self) -> usize {
        lock_recover(&self.shared.adapter).mtu_size()
    }
}

impl<A: ChannelAdapter + 'static, const N: usize> Drop for TransportEngine<A, N> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Tests ────────────────────────────────────────────────────
