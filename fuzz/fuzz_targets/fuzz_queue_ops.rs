//! Fuzz target: `PacketQueue` operation sequences
//!
//! Interprets the input as a stream of push/pop/clear operations against
//! a small queue and checks FIFO order and capacity accounting against a
//! model deque.
//!
//! cargo fuzz run fuzz_queue_ops

#![no_main]

use std::collections::VecDeque;
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use packetlink::packet::Packet;
use packetlink::queue::PacketQueue;

fuzz_target!(|ops: &[u8]| {
    let queue: PacketQueue<8> = PacketQueue::new();
    let mut model: VecDeque<u8> = VecDeque::new();

    for op in ops {
        match op % 4 {
            // Bias toward pushes so the full state is exercised.
            0 | 1 => {
                let packet = Packet::with_payload(u16::from(*op), &[*op]).unwrap();
                if queue.push(&packet, Duration::ZERO) {
                    model.push_back(*op);
                } else {
                    assert_eq!(model.len(), 8, "push may only fail when full");
                }
            }
            2 => {
                let popped = queue.pop(Duration::ZERO).map(|p| p.payload()[0]);
                assert_eq!(popped, model.pop_front());
            }
            _ => {
                assert_eq!(queue.clear(), model.len());
                model.clear();
            }
        }
    }

    assert_eq!(queue.len(), model.len());
});
