use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// One side of a TCP connection.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub struct Endpoint {
    pub ip:   Ipv4Addr,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Directed 4-tuple of a packet. A connection is stored under the tuple of
/// its first packet and found again through either [`FlowKey::reversed`]
/// form, so the lookup is effectively over the unordered endpoint pair.
#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy)]
pub struct FlowKey {
    pub src: Endpoint,
    pub dst: Endpoint,
}

impl FlowKey {
    pub fn reversed(&self) -> Self {
        Self { src: self.dst, dst: self.src }
    }
}

/// Fixed 14-byte Ethernet II header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: [u8; 6],
    pub source:      [u8; 6],
    pub ethertype:   u16,
}

/// The IPv4 fields the analyzer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpHeader {
    pub version:       u8,
    /// IHL × 4, in bytes.
    pub header_length: usize,
    pub total_length:  u16,
    pub protocol:      u8,
    pub source:        Ipv4Addr,
    pub destination:   Ipv4Addr,
}

/// The six classic TCP control bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpFlags {
    pub fin: bool,
    pub syn: bool,
    pub rst: bool,
    pub psh: bool,
    pub ack: bool,
    pub urg: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub source_port:      u16,
    pub destination_port: u16,
    pub sequence:         u32,
    pub acknowledgment:   u32,
    /// Data offset × 4, in bytes.
    pub header_length:    usize,
    pub flags:            TcpFlags,
    pub window_size:      u16,
}

/// Packet direction relative to the endpoint that opened the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
}

/// A decoded TCP segment as stored on its connection.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketEntry {
    pub timestamp:    f64,
    pub ip:           IpHeader,
    pub tcp:          TcpHeader,
    /// IP total length minus both header lengths. Negative on malformed
    /// input and kept that way.
    pub payload_size: i64,
    pub direction:    Direction,
}

/// A reconstructed bidirectional TCP connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id:          u64,
    /// Sender of the first packet seen for this flow.
    pub source:      Endpoint,
    pub destination: Endpoint,
    pub start_time:  f64,
    pub end_time:    f64,
    pub syn_count:   u32,
    pub fin_count:   u32,
    pub rst_count:   u32,

    /// Set once any forward packet carries SYN.
    pub syn_from_source: bool,
    /// Set once any forward packet carries ACK.
    pub ack_from_source: bool,

    /// Packets in capture order.
    pub packets: Vec<PacketEntry>,

    // Derived by `finalize` after the whole capture is consumed.
    pub complete:                   bool,
    pub established_before_capture: bool,
}

impl Connection {
    pub fn new(id: u64, source: Endpoint, destination: Endpoint, timestamp: f64) -> Self {
        Self {
            id,
            source,
            destination,
            start_time: timestamp,
            end_time: timestamp,
            syn_count: 0,
            fin_count: 0,
            rst_count: 0,
            syn_from_source: false,
            ack_from_source: false,
            packets: Vec::new(),
            complete: false,
            established_before_capture: false,
        }
    }

    /// Computes the terminal classification from the accumulated counters.
    pub fn finalize(&mut self) {
        self.complete = self.fin_count > 0;
        self.established_before_capture = !self.syn_from_source && self.ack_from_source;
    }

    pub fn is_reset(&self) -> bool {
        self.rst_count > 0
    }

    /// `S<syn>F<fin>`, with `/R` appended when any RST was seen.
    pub fn status(&self) -> String {
        let mut status = format!("S{}F{}", self.syn_count, self.fin_count);
        if self.is_reset() {
            status.push_str("/R");
        }
        status
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn packet_count(&self, direction: Direction) -> usize {
        self.packets.iter().filter(|p| p.direction == direction).count()
    }

    pub fn byte_count(&self, direction: Direction) -> i64 {
        self.packets
            .iter()
            .filter(|p| p.direction == direction)
            .map(|p| p.payload_size)
            .sum()
    }
}
