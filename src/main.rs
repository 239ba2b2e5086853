use std::io::{self, BufRead};

use anyhow::{Context, Result};

use rootlog::{Config, Logger, Severity};

/// Settings file read from the working directory
const DOTENV_FILE: &str = ".env";

/// Split an optional `level:` prefix off an input line
fn parse_input(line: &str) -> (Severity, &str) {
    if let Some((head, rest)) = line.split_once(':') {
        match Severity::parse(head.trim()) {
            Severity::All => {}
            level => return (level, rest.trim_start()),
        }
    }
    (Severity::Info, line)
}

fn main() -> Result<()> {
    // Diagnostics about the logger itself go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rootlog=warn".into()),
        )
        .init();

    let config =
        Config::load_dotenv(DOTENV_FILE).context("Failed to load logger configuration")?;
    let logger = Logger::open(&config).context("Failed to open log file")?;

    tracing::debug!("Logging to: {}", config.file.display());

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let (level, message) = parse_input(&line);
        logger.log(level, format_args!("{}", message));
    }

    if logger.failed_writes() > 0 {
        anyhow::bail!("{} lines could not be written", logger.failed_writes());
    }
    Ok(())
}
