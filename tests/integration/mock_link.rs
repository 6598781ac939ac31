//! Mock channel adapter for integration tests.
//!
//! Records every transmission attempt (with its timestamp and packet) so
//! tests can assert on the full dispatch history, and plays back scripted
//! outcomes for successive attempts. A gate lets a test park the dispatch
//! worker inside `send_packet` to observe queue behavior deterministically.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use packetlink::adapter::ChannelAdapter;
use packetlink::error::LinkError;
use packetlink::packet::{MAX_MTU, Packet};

pub struct MockState {
    attempts: Mutex<Vec<(Instant, Packet)>>,
    script: Mutex<VecDeque<Result<(), LinkError>>>,
    inbound: Mutex<VecDeque<Packet>>,
    send_blocked: Mutex<bool>,
    gate: Condvar,
    ready: AtomicBool,
}

#[allow(dead_code)]
impl MockState {
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn attempts(&self) -> Vec<(Instant, Packet)> {
        self.attempts.lock().unwrap().clone()
    }

    /// Queue the outcome for the next transmission attempt. Attempts
    /// beyond the script succeed.
    pub fn script_outcome(&self, outcome: Result<(), LinkError>) {
        self.script.lock().unwrap().push_back(outcome);
    }

    /// Queue a packet for the next inbound poll.
    pub fn push_inbound(&self, packet: Packet) {
        self.inbound.lock().unwrap().push_back(packet);
    }

    /// Park the dispatch worker inside its next `send_packet` call.
    pub fn hold_sends(&self) {
        *self.send_blocked.lock().unwrap() = true;
    }

    pub fn release_sends(&self) {
        *self.send_blocked.lock().unwrap() = false;
        self.gate.notify_all();
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }
}

pub struct MockLink {
    state: Arc<MockState>,
}

impl MockLink {
    pub fn new() -> (Self, Arc<MockState>) {
        let state = Arc::new(MockState {
            attempts: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            inbound: Mutex::new(VecDeque::new()),
            send_blocked: Mutex::new(false),
            gate: Condvar::new(),
            ready: AtomicBool::new(true),
        });
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl ChannelAdapter for MockLink {
    fn mtu_size(&self) -> usize {
        MAX_MTU
    }

    fn send_packet(&mut self, packet: &Packet) -> Result<(), LinkError> {
        self.state
            .attempts
            .lock()
            .unwrap()
            .push((Instant::now(), *packet));

        let mut blocked = self.state.send_blocked.lock().unwrap();
        while *blocked {
            blocked = self.state.gate.wait(blocked).unwrap();
        }
        drop(blocked);

        self.state
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn poll_receive(&mut self) -> Option<Packet> {
        self.state.inbound.lock().unwrap().pop_front()
    }

    fn is_ready(&self) -> bool {
        self.state.ready.load(Ordering::Acquire)
    }
}
