//! Error types for tcpscope.
//!
//! Only malformed capture framing is fatal. Truncated records and packets
//! that cannot be classified are handled inside the pipeline and never
//! surface here.

use std::io;
use thiserror::Error;

/// Fatal problems with the capture file's framing.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The file ends before the 24-byte global header is complete.
    #[error("incomplete global header (need {needed} bytes, have {actual})")]
    TruncatedGlobalHeader { needed: usize, actual: usize },

    /// The magic number is neither byte order of `0xa1b2c3d4`.
    #[error("unknown magic number {0:#010x}, not a valid pcap file")]
    UnknownMagic(u32),
}

/// Top-level error returned by the analysis entry points.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("file {path} not found")]
    FileNotFound { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("format error: {0}")]
    Format(#[from] FormatError),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
