//! Structured logging for tcpscope.
//!
//! Provides a [`Logger`] that writes events to stderr and optionally to a log
//! file. Output can be formatted as human-readable plain text or as
//! newline-delimited JSON (NDJSON). Stdout is left to the report.

use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::sync::Mutex;

// ── Event types ──────────────────────────────────────────────────────────────

/// All distinct event kinds that tcpscope can emit.
///
/// The `#[serde(tag = "event")]` attribute ensures JSON output includes an
/// `"event"` key so consumers can filter by type without inspecting structure.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    /// Informational status message.
    Info { message: &'a str },

    /// The global header was accepted.
    CaptureOpened {
        path:        &'a str,
        byte_order:  &'a str,
        version:     &'a str,
        snaplen:     u32,
        linktype:    u32,
    },

    /// The capture is not Ethernet; frames will almost certainly be skipped.
    UnexpectedLinkType { linktype: u32 },

    /// A record declared more bytes than the file still holds.
    TruncatedRecord {
        index:     u64,
        declared:  u32,
        available: usize,
    },

    /// IP total length minus both header lengths came out negative.
    NegativePayload {
        connection:   u64,
        timestamp:    f64,
        payload_size: i64,
    },

    /// End-of-run counters.
    AnalysisSummary {
        records:         u64,
        skipped_records: u64,
        tcp_packets:     u64,
        connections:     usize,
    },
}

impl Event<'_> {
    /// Warnings are printed even in quiet mode.
    fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::UnexpectedLinkType { .. }
                | Event::TruncatedRecord { .. }
                | Event::NegativePayload { .. }
        )
    }
}

// ── Logger ───────────────────────────────────────────────────────────────────

/// Structured logger shared by reference through the pipeline.
pub struct Logger {
    /// Whether to format events as NDJSON instead of plain text.
    json:    bool,
    /// Suppress non-warning events on the console.
    quiet:   bool,
    /// Write to stderr at all. Off for [`Logger::null`].
    console: bool,
    /// Optional buffered file writer. `None` when `--log-file` was not given.
    file:    Option<Mutex<BufWriter<std::fs::File>>>,
}

impl Logger {
    /// Creates a new logger.
    ///
    /// # Arguments
    /// * `json`     - Emit NDJSON instead of plain text when `true`.
    /// * `quiet`    - Only warnings reach stderr; the log file still gets everything.
    /// * `log_path` - If `Some`, open (or create) this file for appended writes.
    ///
    /// # Errors
    /// Returns an `io::Error` if the log file cannot be opened or created.
    pub fn new(json: bool, quiet: bool, log_path: Option<&str>) -> io::Result<Self> {
        let file = match log_path {
            Some(path) => {
                let f = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                Some(Mutex::new(BufWriter::new(f)))
            }
            None => None,
        };

        Ok(Self { json, quiet, console: true, file })
    }

    /// A logger that discards every event.
    pub fn null() -> Self {
        Self { json: false, quiet: true, console: false, file: None }
    }

    /// Logs a single [`Event`] to stderr and, if configured, the log file.
    pub fn log(&self, event: &Event) {
        let to_console = self.console && (!self.quiet || event.is_warning());
        if !to_console && self.file.is_none() {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string();

        let line = if self.json {
            // Serialise to a Value so the timestamp can be injected.
            let mut val = serde_json::to_value(event).unwrap_or_default();
            if let Some(obj) = val.as_object_mut() {
                obj.insert(
                    "timestamp".to_string(),
                    serde_json::Value::String(timestamp.clone()),
                );
            }
            serde_json::to_string(&val).unwrap_or_default()
        } else {
            format!("[{}] {}", timestamp, self.plain_text(event))
        };

        if to_console {
            eprintln!("{}", line);
        }

        if let Some(mutex) = &self.file {
            if let Ok(mut writer) = mutex.lock() {
                let _ = writeln!(writer, "{}", line);
                let _ = writer.flush();
            }
        }
    }

    /// Formats an [`Event`] as a human-readable plain-text string (no timestamp).
    fn plain_text(&self, event: &Event) -> String {
        match event {
            Event::Info { message } =>
                format!("[INFO] {}", message),

            Event::CaptureOpened { path, byte_order, version, snaplen, linktype } =>
                format!(
                    "[CAPTURE] {} ({}, pcap v{}, snaplen {}, linktype {})",
                    path, byte_order, version, snaplen, linktype
                ),

            Event::UnexpectedLinkType { linktype } =>
                format!("[WARN] link type {} is not Ethernet; frames may not decode", linktype),

            Event::TruncatedRecord { index, declared, available } =>
                format!(
                    "[WARN] incomplete packet data in record {} ({} declared, {} available), skipping packet",
                    index, declared, available
                ),

            Event::NegativePayload { connection, timestamp, payload_size } =>
                format!(
                    "[WARN] connection {} at {:.6}s: negative payload size {}",
                    connection, timestamp, payload_size
                ),

            Event::AnalysisSummary { records, skipped_records, tcp_packets, connections } =>
                format!(
                    "[SUMMARY] records={} skipped={} tcp_packets={} connections={}",
                    records, skipped_records, tcp_packets, connections
                ),
        }
    }
}
