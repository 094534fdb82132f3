use clap::{ArgAction, Parser};
use log_tail::{DEFAULT_LINES, TailConfig, WatchInterrupter};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "log-tail",
    version,
    about = "A tail replacement",
    disable_version_flag = true
)]
struct Cli {
    /// Follow changes
    #[arg(short, long)]
    follow: bool,

    /// Show the last <lines> lines
    #[arg(short = 'n', long = "number", value_name = "lines", default_value_t = DEFAULT_LINES)]
    number: usize,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// File to tail
    file: PathBuf,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let config = match TailConfig::new(&cli.file)
        .and_then(|config| config.with_lines(cli.number))
        .map(|config| config.with_follow(cli.follow))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let handle = match log_tail::spawn(config, BufWriter::new(io::stdout())) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Some(interrupter) = handle.interrupter() {
        tokio::spawn(forward_hangups(interrupter));
    }

    // Exit explicitly: a following producer never returns on its own and
    // must not hold up runtime shutdown.
    match tokio::task::spawn_blocking(move || handle.join()).await {
        Ok(Ok(lines)) => {
            debug!(lines, "tail complete");
            process::exit(0);
        }
        Ok(Err(e)) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: tail task failed: {}", e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr; stdout carries the tail itself.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Turns SIGHUP into a watcher wake-up so the file is re-checked at once.
#[cfg(unix)]
async fn forward_hangups(interrupter: WatchInterrupter) {
    use tokio::signal::unix::{SignalKind, signal};
    use tokio_stream::StreamExt;
    use tokio_stream::wrappers::SignalStream;

    let mut hangups = match signal(SignalKind::hangup()) {
        Ok(stream) => SignalStream::new(stream),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGHUP");
            return;
        }
    };

    while hangups.next().await.is_some() {
        debug!("SIGHUP received, re-checking file");
        if !interrupter.interrupt() {
            break;
        }
    }
}

#[cfg(not(unix))]
async fn forward_hangups(_interrupter: WatchInterrupter) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["log-tail", "app.log"]).unwrap();

        assert!(!cli.follow);
        assert_eq!(cli.number, DEFAULT_LINES);
        assert_eq!(cli.file, PathBuf::from("app.log"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["log-tail", "-f", "-n", "20", "app.log"]).unwrap();

        assert!(cli.follow);
        assert_eq!(cli.number, 20);
    }

    #[test]
    fn test_cli_requires_exactly_one_file() {
        assert!(Cli::try_parse_from(["log-tail"]).is_err());
        assert!(Cli::try_parse_from(["log-tail", "a.log", "b.log"]).is_err());
    }

    #[test]
    fn test_cli_rejects_non_numeric_count() {
        assert!(Cli::try_parse_from(["log-tail", "-n", "many", "app.log"]).is_err());
    }

    #[test]
    fn test_cli_version_flag() {
        let err = Cli::try_parse_from(["log-tail", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
