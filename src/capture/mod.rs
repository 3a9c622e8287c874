//! Classic pcap file access: global header validation and record iteration.

pub mod reader;
pub mod records;

pub use reader::{parse_capture, read_capture_file, ByteOrder, CaptureHeader};
pub use records::{PacketRecord, RecordIter};
