//! Wire-format constants for the capture file and the decoded protocols.

/// Size of the pcap global header that precedes all records.
pub const GLOBAL_HEADER_SIZE: usize = 24;

/// Size of the header in front of every captured record.
pub const RECORD_HEADER_SIZE: usize = 16;

/// Magic number of a capture written in little-endian order, as it reads
/// when the first four bytes are interpreted little-endian.
pub const MAGIC_LITTLE_ENDIAN: u32 = 0xa1b2_c3d4;

/// The same magic number as it reads when the file was written big-endian.
pub const MAGIC_BIG_ENDIAN: u32 = 0xd4c3_b2a1;

/// `LINKTYPE_ETHERNET`. Other link types are still walked but rarely decode.
pub const LINKTYPE_ETHERNET: u32 = 1;

/// Fixed Ethernet II header length (two MACs plus EtherType).
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// EtherType carried by IPv4 frames.
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// Smallest legal IPv4 header (IHL = 5).
pub const IPV4_HEADER_MIN_SIZE: usize = 20;

/// IP protocol number for TCP.
pub const IP_PROTO_TCP: u8 = 6;

/// Smallest legal TCP header (data offset = 5).
pub const TCP_HEADER_MIN_SIZE: usize = 20;

// TCP flag bits, low six bits of byte 13.
pub const TCP_FIN: u8 = 0x01;
pub const TCP_SYN: u8 = 0x02;
pub const TCP_RST: u8 = 0x04;
pub const TCP_PSH: u8 = 0x08;
pub const TCP_ACK: u8 = 0x10;
pub const TCP_URG: u8 = 0x20;
