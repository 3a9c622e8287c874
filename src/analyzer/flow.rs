//! Reconstruction of bidirectional TCP connections from decoded packets.
//!
//! Connections are never evicted. Each one accumulates monotone counters and
//! two direction-locked booleans; its classification is computed once, in
//! [`ConnectionTracker::finish`], after the capture is exhausted.

use crate::analyzer::types::*;
use crate::logger::{Event, Logger};
use std::collections::HashMap;

/// Owns every connection of one analysis run and the counter that numbers
/// them.
pub struct ConnectionTracker<'a> {
    /// Forward tuple of each connection's first packet → index into `connections`.
    index:       HashMap<FlowKey, usize>,
    connections: Vec<Connection>,
    next_id:     u64,
    negative_payloads: u64,
    logger:      &'a Logger,
}

impl<'a> ConnectionTracker<'a> {
    pub fn new(logger: &'a Logger) -> Self {
        Self {
            index: HashMap::new(),
            connections: Vec::new(),
            next_id: 1,
            negative_payloads: 0,
            logger,
        }
    }

    /// Packets seen so far whose computed payload size was negative.
    pub fn negative_payloads(&self) -> u64 {
        self.negative_payloads
    }

    /// Records one TCP segment. Must be called in capture order.
    pub fn process(&mut self, timestamp: f64, ip: IpHeader, tcp: TcpHeader) -> Direction {
        let key = FlowKey {
            src: Endpoint { ip: ip.source, port: tcp.source_port },
            dst: Endpoint { ip: ip.destination, port: tcp.destination_port },
        };

        let existing = self
            .index
            .get(&key)
            .or_else(|| self.index.get(&key.reversed()))
            .copied();

        let slot = match existing {
            Some(slot) => slot,
            None => {
                let slot = self.connections.len();
                self.connections
                    .push(Connection::new(self.next_id, key.src, key.dst, timestamp));
                self.next_id += 1;
                self.index.insert(key, slot);
                slot
            }
        };
        let conn = &mut self.connections[slot];

        if timestamp > conn.end_time {
            conn.end_time = timestamp;
        }

        let direction = if key.src == conn.source {
            Direction::Forward
        } else {
            Direction::Reverse
        };

        if tcp.flags.syn {
            conn.syn_count += 1;
            if direction == Direction::Forward {
                conn.syn_from_source = true;
            }
        }
        if tcp.flags.fin {
            conn.fin_count += 1;
        }
        if tcp.flags.rst {
            conn.rst_count += 1;
        }
        if tcp.flags.ack && direction == Direction::Forward {
            conn.ack_from_source = true;
        }

        let payload_size =
            i64::from(ip.total_length) - ip.header_length as i64 - tcp.header_length as i64;
        if payload_size < 0 {
            self.negative_payloads += 1;
            self.logger.log(&Event::NegativePayload {
                connection: conn.id,
                timestamp,
                payload_size,
            });
        }

        conn.packets.push(PacketEntry {
            timestamp,
            ip,
            tcp,
            payload_size,
            direction,
        });

        direction
    }

    /// Finalizes every connection and returns them in id order.
    pub fn finish(self) -> Vec<Connection> {
        let mut connections = self.connections;
        for conn in &mut connections {
            conn.finalize();
        }
        connections
    }
}
