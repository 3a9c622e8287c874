use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tcpscope::cli::Cli;
use tcpscope::logger::{Event, Logger};
use tcpscope::{analyze_file, Report};

fn main() -> ExitCode {
    // Missing or extra arguments exit here with clap's usage message.
    let cli = Cli::parse();

    let logger = match Logger::new(cli.json, cli.quiet, cli.log_file.as_deref()) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Error: cannot open log file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let analysis = match analyze_file(Path::new(&cli.capture), &logger) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = Report::from_analysis(&analysis);
    if cli.json_report {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot serialise report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", report.render_text());
    }

    logger.log(&Event::Info { message: "Analysis complete" });
    ExitCode::SUCCESS
}
