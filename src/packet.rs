//! Fixed-format data packet shared by every link type.
//!
//! A packet is a plain value: 2-byte connection id, 2-byte payload length,
//! and a fixed 517-byte buffer (the largest MTU any supported channel can
//! negotiate — BLE 5.0). The same layout travels over BLE, UART, and the
//! USB-JTAG debug bridge, so the field order and sizes must never change.

use core::fmt;

/// Largest MTU any supported channel can negotiate (BLE 5.0).
pub const MAX_MTU: usize = 517;

/// Bytes of `id` + `size` header in the wire rendering.
pub const WIRE_HEADER_SIZE: usize = 4;

/// Universal data packet.
///
/// - `id` — connection/device identifier; `0` means broadcast/unaddressed.
///   BLE uses the GATT connection id, serial links a device number.
/// - `size` — number of valid bytes; data past `size` is meaningless.
/// - `buffer` — payload storage, fixed capacity.
///
/// Field order and sizes are frozen for cross-link binary compatibility.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct Packet {
    id: u16,
    size: u16,
    buffer: [u8; MAX_MTU],
}

const _: () = assert!(
    core::mem::size_of::<Packet>() == 2 + 2 + MAX_MTU,
    "Packet layout must stay contiguous and unpadded"
);

impl Packet {
    /// Zero-valued (invalid) packet.
    pub const fn new() -> Self {
        Self {
            id: 0,
            size: 0,
            buffer: [0; MAX_MTU],
        }
    }

    /// Build a packet addressed to `id` carrying `data`.
    /// `None` when `data` is empty or longer than [`MAX_MTU`].
    pub fn with_payload(id: u16, data: &[u8]) -> Option<Self> {
        let mut packet = Self::new();
        packet.id = id;
        if packet.set_payload(data) {
            Some(packet)
        } else {
            None
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn set_id(&mut self, id: u16) {
        self.id = id;
    }

    /// Number of valid payload bytes.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// A packet is valid iff `0 < size <= MAX_MTU`.
    pub fn is_valid(&self) -> bool {
        let size = self.size as usize;
        size > 0 && size <= MAX_MTU
    }

    /// The valid payload prefix of the buffer.
    pub fn payload(&self) -> &[u8] {
        let len = (self.size as usize).min(MAX_MTU);
        &self.buffer[..len]
    }

    /// Copy `data` into the buffer and mark it as the valid payload.
    /// Fails (leaving the packet unchanged) when `data` is empty or longer
    /// than [`MAX_MTU`].
    pub fn set_payload(&mut self, data: &[u8]) -> bool {
        if data.is_empty() || data.len() > MAX_MTU {
            return false;
        }
        self.buffer[..data.len()].copy_from_slice(data);
        self.size = data.len() as u16;
        true
    }

    /// Zero every field. Postcondition: `is_valid() == false`.
    pub fn clear(&mut self) {
        self.id = 0;
        self.size = 0;
        self.buffer = [0; MAX_MTU];
    }

    /// Render the little-endian wire form (`id`, `size`, payload) into
    /// `out`. Returns the number of bytes written, or `None` when the
    /// packet is invalid or `out` is too small.
    pub fn to_wire(&self, out: &mut [u8]) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        let total = WIRE_HEADER_SIZE + self.size();
        if out.len() < total {
            return None;
        }
        let id = self.id;
        let size = self.size;
        out[0..2].copy_from_slice(&id.to_le_bytes());
        out[2..4].copy_from_slice(&size.to_le_bytes());
        out[WIRE_HEADER_SIZE..total].copy_from_slice(self.payload());
        Some(total)
    }

    /// Parse the wire form produced by [`to_wire`](Self::to_wire).
    /// `None` on a short buffer or an out-of-range declared size.
    pub fn from_wire(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < WIRE_HEADER_SIZE {
            return None;
        }
        let id = u16::from_le_bytes([bytes[0], bytes[1]]);
        let size = u16::from_le_bytes([bytes[2], bytes[3]]) as usize;
        if size == 0 || size > MAX_MTU || bytes.len() < WIRE_HEADER_SIZE + size {
            return None;
        }
        let mut packet = Self::new();
        packet.id = id;
        if !packet.set_payload(&bytes[WIRE_HEADER_SIZE..WIRE_HEADER_SIZE + size]) {
            return None;
        }
        Some(packet)
    }
}

impl Default for Packet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.payload() == other.payload()
    }
}

impl Eq for Packet {}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id;
        let size = self.size;
        write!(f, "Packet[id={id}, size={size}, valid={}]", self.is_valid())
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ── Tests ────────────────────────────────────────────────────
