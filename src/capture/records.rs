//! Lazy walk over the per-record headers of a buffered capture.

use crate::analyzer::config::RECORD_HEADER_SIZE;
use crate::capture::reader::ByteOrder;
use crate::logger::{Event, Logger};

/// One captured frame, borrowed from the capture buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketRecord<'a> {
    /// 1-based position of the record in the file, counting skipped ones.
    pub index:        u64,
    /// Seconds since the first emitted record.
    pub timestamp:    f64,
    pub captured_len: u32,
    pub original_len: u32,
    pub data:         &'a [u8],
}

/// Iterator over the records following the global header.
///
/// Stops quietly on a partial trailing record header. A record whose body is
/// cut short is logged as a warning and skipped; the cursor moves past the
/// declared length, clamped to the end of the buffer.
pub struct RecordIter<'a> {
    data:       &'a [u8],
    offset:     usize,
    byte_order: ByteOrder,
    epoch:      Option<f64>,
    index:      u64,
    skipped:    u64,
    logger:     &'a Logger,
}

impl<'a> RecordIter<'a> {
    pub fn new(data: &'a [u8], byte_order: ByteOrder, logger: &'a Logger) -> Self {
        Self {
            data,
            offset: 0,
            byte_order,
            epoch: None,
            index: 0,
            skipped: 0,
            logger,
        }
    }

    /// Records dropped so far because their body was truncated.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = PacketRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.data.len() - self.offset < RECORD_HEADER_SIZE {
                return None;
            }

            let bo = self.byte_order;
            let ts_sec   = bo.u32_at(self.data, self.offset);
            let ts_usec  = bo.u32_at(self.data, self.offset + 4);
            let incl_len = bo.u32_at(self.data, self.offset + 8);
            let orig_len = bo.u32_at(self.data, self.offset + 12);
            self.offset += RECORD_HEADER_SIZE;
            self.index += 1;

            let available = self.data.len() - self.offset;
            let declared = incl_len as usize;
            if declared > available {
                self.logger.log(&Event::TruncatedRecord {
                    index: self.index,
                    declared: incl_len,
                    available,
                });
                self.skipped += 1;
                self.offset = self.data.len();
                continue;
            }

            let body = &self.data[self.offset..self.offset + declared];
            self.offset += declared;

            let absolute = f64::from(ts_sec) + f64::from(ts_usec) / 1e6;
            let epoch = *self.epoch.get_or_insert(absolute);

            return Some(PacketRecord {
                index:        self.index,
                timestamp:    absolute - epoch,
                captured_len: incl_len,
                original_len: orig_len,
                data:         body,
            });
        }
    }
}
