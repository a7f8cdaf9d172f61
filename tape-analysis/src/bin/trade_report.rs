use std::{path::PathBuf, process::ExitCode};
use tape_analysis::report::analyze_file;
use tracing::{error, info};

fn main() -> ExitCode {
    init_logging();

    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        error!("usage: trade_report <input-tape> <output-report>");
        return ExitCode::FAILURE;
    };
    let input = PathBuf::from(input);
    let output = PathBuf::from(output);

    info!(input = %input.display(), "analyzing trade tape");
    match analyze_file(&input, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "analysis failed");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
