//! Report model and its plain-text / JSON renderings.

use crate::analyzer::stats::Aggregate;
use crate::analyzer::types::{Connection, Direction};
use crate::analyzer::Analysis;
use serde::Serialize;
use std::fmt::Write;
use std::net::Ipv4Addr;

const RULE: &str = "________________________________________________";

/// Timing and volume of a complete connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteDetails {
    pub start_time:      f64,
    pub end_time:        f64,
    pub duration:        f64,
    pub packets_forward: usize,
    pub packets_reverse: usize,
    pub packets_total:   usize,
    pub bytes_forward:   i64,
    pub bytes_reverse:   i64,
    pub bytes_total:     i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionReport {
    pub id:                  u64,
    pub source_address:      Ipv4Addr,
    pub source_port:         u16,
    pub destination_address: Ipv4Addr,
    pub destination_port:    u16,
    pub status:              String,
    /// Present only for complete connections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete:            Option<CompleteDetails>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GeneralCounts {
    pub complete:                   usize,
    pub reset:                      usize,
    pub still_open:                 usize,
    pub established_before_capture: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub total_connections: usize,
    pub connections:       Vec<ConnectionReport>,
    pub general:           GeneralCounts,
    /// Scoped to complete connections.
    pub statistics:        Aggregate,
    pub skipped_records:   u64,
    pub negative_payloads: u64,
}

impl ConnectionReport {
    fn from_connection(conn: &Connection) -> Self {
        let complete = conn.complete.then(|| {
            let packets_forward = conn.packet_count(Direction::Forward);
            let packets_reverse = conn.packet_count(Direction::Reverse);
            let bytes_forward = conn.byte_count(Direction::Forward);
            let bytes_reverse = conn.byte_count(Direction::Reverse);
            CompleteDetails {
                start_time: conn.start_time,
                end_time: conn.end_time,
                duration: conn.duration(),
                packets_forward,
                packets_reverse,
                packets_total: packets_forward + packets_reverse,
                bytes_forward,
                bytes_reverse,
                bytes_total: bytes_forward + bytes_reverse,
            }
        });

        Self {
            id:                  conn.id,
            source_address:      conn.source.ip,
            source_port:         conn.source.port,
            destination_address: conn.destination.ip,
            destination_port:    conn.destination.port,
            status:              conn.status(),
            complete,
        }
    }
}

impl Report {
    pub fn build(
        connections: &[Connection],
        statistics: Aggregate,
        skipped_records: u64,
        negative_payloads: u64,
    ) -> Self {
        let mut general = GeneralCounts::default();
        for conn in connections {
            if conn.is_reset() {
                general.reset += 1;
            }
            if conn.complete {
                general.complete += 1;
            } else {
                general.still_open += 1;
            }
            if conn.established_before_capture {
                general.established_before_capture += 1;
            }
        }

        Self {
            total_connections: connections.len(),
            connections: connections.iter().map(ConnectionReport::from_connection).collect(),
            general,
            statistics,
            skipped_records,
            negative_payloads,
        }
    }

    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self::build(
            &analysis.connections,
            analysis.aggregate,
            analysis.skipped_records,
            analysis.negative_payloads,
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The four-section text report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "\nA) Total number of connections: {}", self.total_connections)?;
        writeln!(out, "{}\n", RULE)?;
        writeln!(out, "B) Connection's details\n")?;

        for conn in &self.connections {
            writeln!(out, "Connection {}:", conn.id)?;
            writeln!(out, "Source Address: {}", conn.source_address)?;
            writeln!(out, "Destination Address: {}", conn.destination_address)?;
            writeln!(out, "Source Port: {}", conn.source_port)?;
            writeln!(out, "Destination Port: {}", conn.destination_port)?;
            writeln!(out, "Status: {}", conn.status)?;
            if let Some(d) = &conn.complete {
                writeln!(out, "Start time: {:.6} seconds", d.start_time)?;
                writeln!(out, "End Time: {:.6} seconds", d.end_time)?;
                writeln!(out, "Duration: {:.6} seconds", d.duration)?;
                writeln!(out, "Number of packets sent from Source to Destination: {}", d.packets_forward)?;
                writeln!(out, "Number of packets sent from Destination to Source: {}", d.packets_reverse)?;
                writeln!(out, "Total number of packets: {}", d.packets_total)?;
                writeln!(out, "Number of data bytes sent from Source to Destination: {}", d.bytes_forward)?;
                writeln!(out, "Number of data bytes sent from Destination to Source: {}", d.bytes_reverse)?;
                writeln!(out, "Total number of data bytes: {}", d.bytes_total)?;
            }
            writeln!(out, "END")?;
            writeln!(out, "++++++++++++++++++++++++++++++++")?;
        }

        let g = &self.general;
        writeln!(out, "{}\n", RULE)?;
        writeln!(out, "C) General\n")?;
        writeln!(out, "Total number of complete TCP connections: {}", g.complete)?;
        writeln!(out, "Number of reset TCP connections: {}", g.reset)?;
        writeln!(
            out,
            "Number of TCP connections that were still open when the trace capture ended: {}",
            g.still_open
        )?;
        writeln!(
            out,
            "The number of TCP connections established before the capture started: {}",
            g.established_before_capture
        )?;
        if self.skipped_records > 0 {
            writeln!(out, "Truncated capture records skipped: {}", self.skipped_records)?;
        }
        if self.negative_payloads > 0 {
            writeln!(out, "Packets with negative payload size: {}", self.negative_payloads)?;
        }
        writeln!(out, "{}", RULE)?;

        let s = &self.statistics;
        writeln!(out, "\nD) Complete TCP connections\n")?;
        writeln!(out, "Minimum time duration: {:.6} seconds", s.duration.min)?;
        writeln!(out, "Mean time duration: {:.6} seconds", s.duration.mean)?;
        writeln!(out, "Maximum time duration: {:.6} seconds\n", s.duration.max)?;
        writeln!(out, "Minimum RTT value: {:.6}", s.rtt.min)?;
        writeln!(out, "Mean RTT value: {:.6}", s.rtt.mean)?;
        writeln!(out, "Maximum RTT value: {:.6}\n", s.rtt.max)?;
        writeln!(out, "Minimum number of packets including both send/received: {}", s.packets.min as u64)?;
        writeln!(out, "Mean number of packets including both send/received: {:.6}", s.packets.mean)?;
        writeln!(out, "Maximum number of packets including both send/received: {}\n", s.packets.max as u64)?;
        writeln!(
            out,
            "Minimum receive window size including both send/received: {} bytes",
            s.window_size.min as u64
        )?;
        writeln!(
            out,
            "Mean receive window size including both send/received: {:.6} bytes",
            s.window_size.mean
        )?;
        writeln!(
            out,
            "Maximum receive window size including both send/received: {} bytes",
            s.window_size.max as u64
        )?;
        writeln!(out, "{}\n", RULE)?;
        Ok(())
    }
}
