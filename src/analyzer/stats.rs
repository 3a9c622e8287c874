//! Aggregate statistics over complete connections.

use crate::analyzer::types::{Connection, Direction};
use serde::Serialize;

/// Minimum, arithmetic mean and maximum of one sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub min:     f64,
    pub mean:    f64,
    pub max:     f64,
    pub samples: usize,
}

impl Summary {
    /// Summarises `values`; an empty set yields all zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self { min, mean, max, samples: values.len() }
    }
}

/// Statistics over every complete connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub duration:    Summary,
    pub rtt:         Summary,
    pub packets:     Summary,
    /// Advertised window of every packet, both directions pooled.
    pub window_size: Summary,
}

impl Aggregate {
    /// Computes the aggregate. Incomplete connections are ignored; the input
    /// is only read.
    pub fn compute(connections: &[Connection]) -> Self {
        let mut durations = Vec::new();
        let mut rtts = Vec::new();
        let mut packets = Vec::new();
        let mut windows = Vec::new();

        for conn in connections.iter().filter(|c| c.complete) {
            durations.push(conn.duration());
            packets.push(conn.packets.len() as f64);
            windows.extend(conn.packets.iter().map(|p| f64::from(p.tcp.window_size)));
            rtts.extend(handshake_rtts(conn));
        }

        Self {
            duration:    Summary::of(&durations),
            rtt:         Summary::of(&rtts),
            packets:     Summary::of(&packets),
            window_size: Summary::of(&windows),
        }
    }
}

/// RTT samples from SYN → SYN/ACK exchanges.
///
/// At most one forward SYN is pending at a time. A reverse SYN/ACK while one
/// is pending produces a sample (kept only if positive) and clears it.
/// The SYN/ACK is not matched against the pending SYN's sequence number.
/// Later ACKs are not used.
pub fn handshake_rtts(conn: &Connection) -> Vec<f64> {
    let mut samples = Vec::new();
    // Send time of the pending SYN.
    let mut pending: Option<f64> = None;

    for pkt in &conn.packets {
        let flags = pkt.tcp.flags;
        match (pkt.direction, pending) {
            (Direction::Forward, None) if flags.syn => {
                pending = Some(pkt.timestamp);
            }
            (Direction::Reverse, Some(sent)) if flags.syn && flags.ack => {
                let rtt = pkt.timestamp - sent;
                if rtt > 0.0 {
                    samples.push(rtt);
                }
                pending = None;
            }
            _ => {}
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::flow::tests::*;
    use crate::analyzer::flow::ConnectionTracker;
    use crate::logger::Logger;

    fn handshake_connection(syn_at: f64, synack_at: f64, close: bool) -> Vec<Connection> {
        let logger = Logger::null();
        let mut tracker = ConnectionTracker::new(&logger);
        let (ip, tcp) = segment(CLIENT, SERVER, SYN, 100, 0, 64240);
        tracker.process(syn_at, ip, tcp);
        let (ip, tcp) = segment(SERVER, CLIENT, SYN_ACK, 7000, 0, 65535);
        tracker.process(synack_at, ip, tcp);
        if close {
            let (ip, tcp) = segment(CLIENT, SERVER, FIN_ACK, 101, 0, 64240);
            tracker.process(synack_at + 1.0, ip, tcp);
        }
        tracker.finish()
    }

    #[test]
    fn test_summary_of_empty_is_zero() {
        assert_eq!(Summary::of(&[]), Summary { min: 0.0, mean: 0.0, max: 0.0, samples: 0 });
    }

    #[test]
    fn test_summary_values() {
        let s = Summary::of(&[3.0, 1.0, 2.0, 6.0]);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 6.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.samples, 4);
    }

    #[test]
    fn test_single_handshake_rtt() {
        let conns = handshake_connection(0.0, 0.05, false);
        let rtts = handshake_rtts(&conns[0]);
        assert_eq!(rtts.len(), 1);
        assert!((rtts[0] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_synack_is_not_matched_by_acknowledgment() {
        let logger = Logger::null();
        let mut tracker = ConnectionTracker::new(&logger);
        let (ip, tcp) = segment(CLIENT, SERVER, SYN, 100, 0, 1);
        tracker.process(0.0, ip, tcp);
        let (ip, mut tcp) = segment(SERVER, CLIENT, SYN_ACK, 7000, 0, 1);
        tcp.acknowledgment = 12345;
        tracker.process(0.25, ip, tcp);

        let rtts = handshake_rtts(&tracker.finish()[0]);
        assert_eq!(rtts, vec![0.25]);
    }

    #[test]
    fn test_non_positive_rtt_is_dropped() {
        let conns = handshake_connection(0.5, 0.5, false);
        assert!(handshake_rtts(&conns[0]).is_empty());
    }

    #[test]
    fn test_retransmitted_syn_keeps_first_send_time() {
        let logger = Logger::null();
        let mut tracker = ConnectionTracker::new(&logger);
        let (ip, tcp) = segment(CLIENT, SERVER, SYN, 100, 0, 1);
        tracker.process(0.0, ip, tcp);
        tracker.process(1.0, ip, tcp);
        let (ip, tcp) = segment(SERVER, CLIENT, SYN_ACK, 1, 0, 1);
        tracker.process(1.2, ip, tcp);

        let conns = tracker.finish();
        let rtts = handshake_rtts(&conns[0]);
        assert_eq!(rtts.len(), 1);
        assert!((rtts[0] - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_only_counts_complete_connections() {
        let open = handshake_connection(0.0, 0.05, false);
        assert_eq!(Aggregate::compute(&open), Aggregate::default());

        let closed = handshake_connection(0.0, 0.05, true);
        let agg = Aggregate::compute(&closed);
        assert_eq!(agg.packets.min, 3.0);
        assert_eq!(agg.packets.max, 3.0);
        assert!((agg.duration.mean - 1.05).abs() < 1e-12);
        assert!((agg.rtt.mean - 0.05).abs() < 1e-12);
        assert_eq!(agg.window_size.min, 64240.0);
        assert_eq!(agg.window_size.max, 65535.0);
        assert_eq!(agg.window_size.samples, 3);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let conns = handshake_connection(0.0, 0.05, true);
        let first = Aggregate::compute(&conns);
        let second = Aggregate::compute(&conns);
        assert_eq!(first, second);
    }
}
