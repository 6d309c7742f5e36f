//! spaces - folder operations for S3-compatible object storage
//!
//! A command-line interface over sm-core's SpacesManager, for
//! DigitalOcean Spaces and other S3-compatible services.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod exit_code;
mod output;

use commands::Cli;

/// Crates whose logs `--verbose` and `--debug` turn up
const LOG_TARGETS: &[&str] = &["sm_core", "sm_s3", "spaces"];

fn log_filter(cli: &Cli) -> EnvFilter {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        return EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    };

    let directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    EnvFilter::new(format!("warn,{}", directives.join(",")))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so --json output on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color)
                .with_target(cli.debug),
        )
        .with(log_filter(&cli))
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
