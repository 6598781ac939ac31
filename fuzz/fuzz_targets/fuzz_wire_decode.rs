//! Fuzz target: `Packet::from_wire`
//!
//! Drives arbitrary byte sequences through the wire decoder and asserts
//! that it never panics, only yields valid packets, and round-trips
//! losslessly through `to_wire`.
//!
//! cargo fuzz run fuzz_wire_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use packetlink::packet::{MAX_MTU, Packet, WIRE_HEADER_SIZE};

fuzz_target!(|data: &[u8]| {
    if let Some(packet) = Packet::from_wire(data) {
        assert!(packet.is_valid(), "decoder must only yield valid packets");

        let mut buf = [0u8; WIRE_HEADER_SIZE + MAX_MTU];
        let n = packet.to_wire(&mut buf).expect("valid packet must encode");
        assert_eq!(n, WIRE_HEADER_SIZE + packet.size());

        let again = Packet::from_wire(&buf[..n]).expect("encoded form must decode");
        assert_eq!(again, packet);
    }
});
