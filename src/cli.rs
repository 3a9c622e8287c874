use clap::Parser;

/// tcpscope — offline TCP connection analysis for pcap captures.
///
/// Reconstructs every TCP connection in a classic pcap file and reports
/// per-connection details plus duration, RTT, packet-count and window
/// statistics over the connections that were closed with a FIN.
#[derive(Parser, Debug, Clone)]
#[command(
    name    = "tcpscope",
    version,
    about   = "Offline TCP connection analyzer for pcap captures",
    long_about = None,
)]
pub struct Cli {
    /// Capture file to analyze (classic libpcap format, Ethernet link type).
    #[arg(value_name = "CAPTURE_FILE")]
    pub capture: String,

    // ── Report ───────────────────────────────────────────────────────────────

    /// Print the report as pretty JSON instead of the sectioned text layout.
    #[arg(long = "json-report")]
    pub json_report: bool,

    // ── Logging ──────────────────────────────────────────────────────────────

    /// Write log events to this file in addition to stderr.
    ///
    /// The file is created if it does not exist and appended to if it does.
    #[arg(short = 'o', long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,

    /// Emit log events as newline-delimited JSON (NDJSON).
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Only print warnings (truncated records, odd headers) to stderr.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_positional_argument() {
        let cli = Cli::try_parse_from(["tcpscope", "trace.pcap"]).unwrap();
        assert_eq!(cli.capture, "trace.pcap");
        assert!(!cli.json_report);
    }

    #[test]
    fn test_missing_or_extra_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["tcpscope"]).is_err());
        assert!(Cli::try_parse_from(["tcpscope", "a.pcap", "b.pcap"]).is_err());
    }

    #[test]
    fn test_logging_flags() {
        let cli = Cli::try_parse_from(["tcpscope", "-j", "-q", "-o", "run.log", "t.pcap"]).unwrap();
        assert!(cli.json && cli.quiet);
        assert_eq!(cli.log_file.as_deref(), Some("run.log"));
    }
}
