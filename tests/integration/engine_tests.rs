//! End-to-end dispatch scenarios against the mock link.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use packetlink::config::LinkConfig;
use packetlink::engine::TransportEngine;
use packetlink::error::{LinkError, SendError};
use packetlink::packet::Packet;

use crate::mock_link::MockLink;

fn packet(id: u16) -> Packet {
    Packet::with_payload(id, &id.to_le_bytes()).unwrap()
}

/// Poll `cond` until it holds or `timeout` elapses.
fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn queue_fills_to_capacity_then_rejects() {
    let (link, state) = MockLink::new();
    let engine: TransportEngine<MockLink> = TransportEngine::new("MOCK", link);

    // Park the worker inside its first transmission attempt so the queue
    // state stays deterministic while we fill it.
    state.hold_sends();
    assert!(engine.start());
    assert!(engine.send(&packet(99)).is_ok());
    assert!(wait_until(Duration::from_secs(1), || state.attempt_count() == 1));

    for id in 0..16 {
        assert!(engine.send(&packet(id)).is_ok(), "send {id} should fit");
    }
    assert_eq!(engine.send(&packet(100)), Err(SendError::QueueFull));
    assert_eq!(engine.queue_len(), 16);

    state.release_sends();
    engine.stop();
}

#[test]
fn transient_failure_retries_same_packet() {
    let (link, state) = MockLink::new();
    let engine: TransportEngine<MockLink> = TransportEngine::new("MOCK", link);

    let reported = Arc::new(AtomicUsize::new(0));
    let reported_in_handler = Arc::clone(&reported);
    engine.bind(
        Box::new(|_packet: Packet, _reply: &mut dyn FnMut(Packet)| {}),
        Some(Box::new(move |_packet: &Packet, _err: LinkError| {
            reported_in_handler.fetch_add(1, Ordering::SeqCst);
        })),
    );

    state.script_outcome(Err(LinkError::Timeout));
    // Second attempt (and any after) succeeds.

    assert!(engine.start());
    let original = packet(7);
    assert!(engine.send(&original).is_ok());

    assert!(wait_until(Duration::from_secs(1), || {
        state.attempt_count() == 2
    }));
    std::thread::sleep(Duration::from_millis(50));

    let attempts = state.attempts();
    assert_eq!(attempts.len(), 2, "exactly two attempts for one packet");
    assert_eq!(attempts[0].1, original);
    assert_eq!(attempts[1].1, original);
    assert_eq!(reported.load(Ordering::SeqCst), 0, "transient is never reported");
    assert_eq!(engine.queue_len(), 0, "packet left the queue after success");

    engine.stop();
}

#[test]
fn fatal_failure_drops_and_reports_once() {
    let (link, state) = MockLink::new();
    let engine: TransportEngine<MockLink> = TransportEngine::new("MOCK", link);

    let reports: Arc<Mutex<Vec<(Packet, LinkError)>>> = Arc::new(Mutex::new(Vec::new()));
    let reports_in_handler = Arc::clone(&reports);
    engine.bind(
        Box::new(|_packet: Packet, _reply: &mut dyn FnMut(Packet)| {}),
        Some(Box::new(move |packet: &Packet, err: LinkError| {
            reports_in_handler.lock().unwrap().push((*packet, err));
        })),
    );

    state.script_outcome(Err(LinkError::Io));

    assert!(engine.start());
    let doomed = packet(3);
    assert!(engine.send(&doomed).is_ok());

    assert!(wait_until(Duration::from_secs(1), || {
        reports.lock().unwrap().len() == 1
    }));
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(state.attempt_count(), 1, "fatal outcomes are not retried");
    assert_eq!(engine.queue_len(), 0);
    let log = reports.lock().unwrap();
    assert_eq!(log.as_slice(), &[(doomed, LinkError::Io)]);

    engine.stop();
}

#[test]
fn send_interval_paces_successive_sends() {
    let (link, state) = MockLink::new();
    let engine: TransportEngine<MockLink> = TransportEngine::new("MOCK", link);

    assert!(engine.start());
    assert!(engine.send(&packet(1)).is_ok());
    assert!(engine.send(&packet(2)).is_ok());

    assert!(wait_until(Duration::from_secs(1), || {
        state.attempt_count() == 2
    }));

    let attempts = state.attempts();
    let gap = attempts[1].0.duration_since(attempts[0].0);
    assert!(
        gap >= Duration::from_millis(20),
        "second send after {gap:?}, expected >= 20ms"
    );

    engine.stop();
}

#[test]
fn stop_drains_pending_packets() {
    let (link, state) = MockLink::new();
    // A long send interval keeps everything after the first packet queued.
    let engine: TransportEngine<MockLink> = TransportEngine::with_config(
        "MOCK",
        link,
        LinkConfig {
            send_interval_ms: 10_000,
            tick_period_ms: 1,
        },
    );

    assert!(engine.start());
    for id in 0..4 {
        assert!(engine.send(&packet(id)).is_ok());
    }
    assert!(wait_until(Duration::from_secs(1), || state.attempt_count() == 1));
    assert_eq!(engine.queue_len(), 3);

    engine.stop();
    assert_eq!(engine.clear_queue(), 0, "stop already drained the queue");

    // Terminal and idempotent.
    engine.stop();
    assert!(!engine.start());
    assert_eq!(engine.send(&packet(9)), Err(SendError::InvalidArgument));
}

#[test]
fn unready_adapter_rejects_every_send() {
    let (link, state) = MockLink::new();
    state.set_ready(false);
    let engine: TransportEngine<MockLink> = TransportEngine::new("MOCK", link);

    assert!(engine.start());
    assert_eq!(engine.send(&packet(1)), Err(SendError::InvalidArgument));
    assert_eq!(engine.queue_len(), 0);

    engine.stop();
}

#[test]
fn inbound_packet_reaches_handler_and_reply_is_sent() {
    let (link, state) = MockLink::new();
    let engine: TransportEngine<MockLink> = TransportEngine::new("MOCK", link);

    let received: Arc<Mutex<Vec<Packet>>> = Arc::new(Mutex::new(Vec::new()));
    let received_in_handler = Arc::clone(&received);
    engine.bind(
        Box::new(move |incoming: Packet, reply: &mut dyn FnMut(Packet)| {
            received_in_handler.lock().unwrap().push(incoming);
            if let Some(pong) = Packet::with_payload(incoming.id(), b"pong") {
                reply(pong);
            }
        }),
        None,
    );

    state.push_inbound(Packet::with_payload(5, b"ping").unwrap());
    assert!(engine.start());

    assert!(wait_until(Duration::from_secs(1), || {
        state.attempt_count() == 1
    }));

    let inbound = received.lock().unwrap();
    assert_eq!(inbound.len(), 1);
    assert_eq!(inbound[0].payload(), b"ping");

    let attempts = state.attempts();
    assert_eq!(attempts[0].1.id(), 5);
    assert_eq!(attempts[0].1.payload(), b"pong");

    engine.stop();
}
