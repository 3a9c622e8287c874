//! tcpscope: passive TCP connection analysis over classic pcap captures.
//!
//! The pipeline is single-pass: [`capture`] validates the file and walks its
//! records, [`analyzer`] decodes Ethernet/IPv4/TCP, rebuilds connections and
//! aggregates statistics, and [`report`] renders the result.

pub mod analyzer;
pub mod capture;
pub mod cli;
pub mod error;
pub mod logger;
pub mod report;

pub use analyzer::{analyze_bytes, analyze_file, Analysis};
pub use error::{AnalyzerError, FormatError};
pub use report::Report;
