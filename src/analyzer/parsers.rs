//! Stateless Ethernet, IPv4 and TCP header decoders.
//!
//! Each decoder returns the header, the bytes that follow it and the number
//! of bytes it consumed, or `None` when the slice is too short to hold the
//! header. `None` means "not classifiable"; callers skip the packet.
//! All fields are network byte order.
//!
//! Ethernet goes through `etherparse`. IPv4 and TCP are decoded by hand
//! because `etherparse` rejects headers this analyzer must still accept: an
//! IPv4 version nibble other than 4, an IHL below 5 and a TCP data offset
//! below 5.

use crate::analyzer::config::*;
use crate::analyzer::types::{EthernetHeader, IpHeader, TcpFlags, TcpHeader};
use etherparse::Ethernet2HeaderSlice;
use std::net::Ipv4Addr;

fn be_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn ipv4_at(data: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(data[offset], data[offset + 1], data[offset + 2], data[offset + 3])
}

/// Decodes the 14-byte Ethernet II header.
pub fn parse_ethernet(data: &[u8]) -> Option<(EthernetHeader, &[u8], usize)> {
    let eth = Ethernet2HeaderSlice::from_slice(data).ok()?;
    let consumed = eth.slice().len();

    let header = EthernetHeader {
        destination: eth.destination(),
        source:      eth.source(),
        ethertype:   eth.ether_type().0,
    };
    Some((header, &data[consumed..], consumed))
}

/// Decodes an IPv4 header.
///
/// Requires 20 bytes plus whatever IHL × 4 declares. An IHL below 5 is not
/// rejected; the declared length is taken as the header length.
pub fn parse_ipv4(data: &[u8]) -> Option<(IpHeader, &[u8], usize)> {
    if data.len() < IPV4_HEADER_MIN_SIZE {
        return None;
    }
    let header_length = usize::from(data[0] & 0x0f) * 4;
    if data.len() < header_length {
        return None;
    }

    let header = IpHeader {
        version:       data[0] >> 4,
        header_length,
        total_length:  be_u16(data, 2),
        protocol:      data[9],
        source:        ipv4_at(data, 12),
        destination:   ipv4_at(data, 16),
    };
    Some((header, &data[header_length..], header_length))
}

/// Decodes a TCP header, options skipped.
///
/// Requires 20 bytes plus whatever the data offset declares.
pub fn parse_tcp(data: &[u8]) -> Option<(TcpHeader, &[u8], usize)> {
    if data.len() < TCP_HEADER_MIN_SIZE {
        return None;
    }
    let header_length = usize::from(data[12] >> 4) * 4;
    if data.len() < header_length {
        return None;
    }

    let bits = data[13];
    let flags = TcpFlags {
        fin: bits & TCP_FIN != 0,
        syn: bits & TCP_SYN != 0,
        rst: bits & TCP_RST != 0,
        psh: bits & TCP_PSH != 0,
        ack: bits & TCP_ACK != 0,
        urg: bits & TCP_URG != 0,
    };

    let header = TcpHeader {
        source_port:      be_u16(data, 0),
        destination_port: be_u16(data, 2),
        sequence:         be_u32(data, 4),
        acknowledgment:   be_u32(data, 8),
        header_length,
        flags,
        window_size:      be_u16(data, 14),
    };
    Some((header, &data[header_length..], header_length))
}

/// Decodes a full Ethernet/IPv4/TCP frame, or `None` if any layer is
/// missing, short, or carries a different protocol.
pub fn parse_tcp_frame(frame: &[u8]) -> Option<(IpHeader, TcpHeader)> {
    let (eth, rest, _) = parse_ethernet(frame)?;
    if eth.ethertype != ETHERTYPE_IPV4 {
        return None;
    }
    let (ip, rest, _) = parse_ipv4(rest)?;
    if ip.protocol != IP_PROTO_TCP {
        return None;
    }
    let (tcp, _, _) = parse_tcp(rest)?;
    Some((ip, tcp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipv4_header(ihl: u8, total_len: u16, protocol: u8) -> Vec<u8> {
        let mut h = vec![
            0x40 | ihl, 0x00,
            (total_len >> 8) as u8, total_len as u8,
            0x00, 0x01, 0x40, 0x00,
            0x40, protocol, 0x00, 0x00,
            10, 0, 0, 1,
            10, 0, 0, 2,
        ];
        h.resize(usize::from(ihl.max(5)) * 4, 0);
        h
    }

    fn tcp_header(offset: u8, flags: u8) -> Vec<u8> {
        let mut h = vec![
            0xc0, 0x01, // Src port: 49153
            0x00, 0x50, // Dst port: 80
            0x00, 0x00, 0x00, 0x64, // Seq: 100
            0x00, 0x00, 0x01, 0x2c, // Ack: 300
            offset << 4,
            flags,
            0x72, 0x10, // Window: 29200
            0x00, 0x00, // Checksum
            0x00, 0x00, // Urgent pointer
        ];
        h.resize(usize::from(offset.max(5)) * 4, 0);
        h
    }

    #[test]
    fn test_parse_ethernet() {
        let mut frame = vec![0xff; 6];
        frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        frame.extend_from_slice(&[0x08, 0x00, 0xde, 0xad]);

        let (eth, rest, used) = parse_ethernet(&frame).unwrap();
        assert_eq!(eth.ethertype, ETHERTYPE_IPV4);
        assert_eq!(eth.source, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(used, 14);
        assert_eq!(rest, &[0xde, 0xad]);

        assert!(parse_ethernet(&frame[..13]).is_none());
    }

    #[test]
    fn test_parse_ipv4() {
        let mut data = ipv4_header(5, 60, IP_PROTO_TCP);
        data.extend_from_slice(&[1, 2, 3]);

        let (ip, rest, used) = parse_ipv4(&data).unwrap();
        assert_eq!(ip.version, 4);
        assert_eq!(ip.header_length, 20);
        assert_eq!(ip.total_length, 60);
        assert_eq!(ip.protocol, 6);
        assert_eq!(ip.source.to_string(), "10.0.0.1");
        assert_eq!(ip.destination.to_string(), "10.0.0.2");
        assert_eq!(used, 20);
        assert_eq!(rest, &[1, 2, 3]);
    }

    #[test]
    fn test_parse_ipv4_with_options_needs_declared_length() {
        let data = ipv4_header(6, 44, IP_PROTO_TCP);
        let (ip, rest, _) = parse_ipv4(&data).unwrap();
        assert_eq!(ip.header_length, 24);
        assert!(rest.is_empty());

        assert!(parse_ipv4(&data[..23]).is_none());
        assert!(parse_ipv4(&data[..19]).is_none());
    }

    #[test]
    fn test_parse_ipv4_accepts_any_version_nibble() {
        let mut data = ipv4_header(5, 40, IP_PROTO_TCP);
        data[0] = 0x65;
        let (ip, _, used) = parse_ipv4(&data).unwrap();
        assert_eq!(ip.version, 6);
        assert_eq!(used, 20);
    }

    #[test]
    fn test_parse_ipv4_accepts_short_ihl() {
        // IHL 4 declares a 16-byte header; the next layer starts there.
        let data = ipv4_header(4, 40, IP_PROTO_TCP);
        let (ip, rest, used) = parse_ipv4(&data).unwrap();
        assert_eq!(ip.header_length, 16);
        assert_eq!(used, 16);
        assert_eq!(rest, &data[16..]);
        assert_eq!(ip.destination.to_string(), "10.0.0.2");
    }

    #[test]
    fn test_parse_tcp_accepts_short_data_offset() {
        let data = tcp_header(4, TCP_ACK);
        let (tcp, rest, used) = parse_tcp(&data).unwrap();
        assert_eq!(tcp.header_length, 16);
        assert_eq!(used, 16);
        assert_eq!(rest.len(), 4);
        assert_eq!(tcp.window_size, 29200);
    }

    #[test]
    fn test_parse_tcp_flags_and_fields() {
        let data = tcp_header(5, TCP_SYN | TCP_ACK);
        let (tcp, rest, used) = parse_tcp(&data).unwrap();
        assert_eq!(tcp.source_port, 49153);
        assert_eq!(tcp.destination_port, 80);
        assert_eq!(tcp.sequence, 100);
        assert_eq!(tcp.acknowledgment, 300);
        assert_eq!(tcp.window_size, 29200);
        assert_eq!(used, 20);
        assert!(rest.is_empty());
        assert_eq!(
            tcp.flags,
            TcpFlags { syn: true, ack: true, ..TcpFlags::default() }
        );

        let all = parse_tcp(&tcp_header(5, 0x3f)).unwrap().0.flags;
        assert!(all.fin && all.syn && all.rst && all.psh && all.ack && all.urg);
    }

    #[test]
    fn test_parse_tcp_options_and_short_input() {
        let mut data = tcp_header(8, TCP_ACK);
        data.extend_from_slice(b"GET");
        let (tcp, rest, used) = parse_tcp(&data).unwrap();
        assert_eq!(tcp.header_length, 32);
        assert_eq!(used, 32);
        assert_eq!(rest, b"GET");

        assert!(parse_tcp(&data[..31]).is_none());
        assert!(parse_tcp(&data[..19]).is_none());
    }

    #[test]
    fn test_parse_tcp_frame_filters_protocols() {
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&[0x08, 0x00]);
        frame.extend(ipv4_header(5, 40, IP_PROTO_TCP));
        frame.extend(tcp_header(5, TCP_SYN));
        assert!(parse_tcp_frame(&frame).is_some());

        let mut arp = frame.clone();
        arp[12..14].copy_from_slice(&[0x08, 0x06]);
        assert!(parse_tcp_frame(&arp).is_none());

        let mut udp = frame.clone();
        udp[14 + 9] = 17;
        assert!(parse_tcp_frame(&udp).is_none());

        assert!(parse_tcp_frame(&frame[..14 + 20 + 10]).is_none());
    }
}
