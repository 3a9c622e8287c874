//! Analysis pipeline entry point.
//!
//! Capture bytes flow through the record iterator, the header decoders and
//! the connection tracker in a single pass; the aggregate is computed over
//! the finished connection set.

pub mod config;
pub mod flow;
pub mod parsers;
pub mod stats;
pub mod types;

use crate::capture::{parse_capture, read_capture_file, CaptureHeader, RecordIter};
use crate::error::Result;
use crate::logger::{Event, Logger};
use crate::analyzer::flow::ConnectionTracker;
use crate::analyzer::parsers::parse_tcp_frame;
use crate::analyzer::stats::Aggregate;
use crate::analyzer::types::Connection;
use std::path::Path;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub header:            CaptureHeader,
    /// In id order, finalized.
    pub connections:       Vec<Connection>,
    pub aggregate:         Aggregate,
    /// Records emitted by the iterator.
    pub records:           u64,
    /// Records dropped because their body was truncated.
    pub skipped_records:   u64,
    /// Records that decoded as Ethernet/IPv4/TCP.
    pub tcp_packets:       u64,
    pub negative_payloads: u64,
}

/// Loads `path` and analyzes it.
pub fn analyze_file(path: &Path, logger: &Logger) -> Result<Analysis> {
    let data = read_capture_file(path)?;
    analyze_bytes(&data, &path.display().to_string(), logger)
}

/// Analyzes an in-memory capture. `label` names it in log events.
pub fn analyze_bytes(data: &[u8], label: &str, logger: &Logger) -> Result<Analysis> {
    let (header, body) = parse_capture(data)?;

    logger.log(&Event::CaptureOpened {
        path:       label,
        byte_order: header.byte_order.as_str(),
        version:    &header.version(),
        snaplen:    header.snaplen,
        linktype:   header.linktype,
    });
    if !header.is_ethernet() {
        logger.log(&Event::UnexpectedLinkType { linktype: header.linktype });
    }

    let mut records = RecordIter::new(body, header.byte_order, logger);
    let mut tracker = ConnectionTracker::new(logger);
    let mut emitted = 0u64;
    let mut tcp_packets = 0u64;

    for record in records.by_ref() {
        emitted += 1;
        // Anything that is not Ethernet/IPv4/TCP is skipped without comment.
        let Some((ip, tcp)) = parse_tcp_frame(record.data) else {
            continue;
        };
        tcp_packets += 1;
        tracker.process(record.timestamp, ip, tcp);
    }

    let skipped_records = records.skipped();
    let negative_payloads = tracker.negative_payloads();
    let connections = tracker.finish();
    let aggregate = Aggregate::compute(&connections);

    logger.log(&Event::AnalysisSummary {
        records: emitted,
        skipped_records,
        tcp_packets,
        connections: connections.len(),
    });

    Ok(Analysis {
        header,
        connections,
        aggregate,
        records: emitted,
        skipped_records,
        tcp_packets,
        negative_payloads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalyzerError, FormatError};

    #[test]
    fn test_empty_input_is_fatal() {
        let logger = Logger::null();
        let err = analyze_bytes(&[], "empty", &logger).unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::Format(FormatError::TruncatedGlobalHeader { .. })
        ));
    }

    #[test]
    fn test_header_only_capture() {
        let logger = Logger::null();
        let mut data = Vec::new();
        data.extend_from_slice(&config::MAGIC_LITTLE_ENDIAN.to_le_bytes());
        data.extend_from_slice(&[2, 0, 4, 0]);
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&65535u32.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes());

        let analysis = analyze_bytes(&data, "mem", &logger).unwrap();
        assert!(analysis.connections.is_empty());
        assert_eq!(analysis.records, 0);
        assert_eq!(analysis.aggregate, Aggregate::default());
    }
}
