//! `window` — resolve active windows from JSON window specifications.
//!
//! ```text
//! window resolve --spec freeze.json --at 2023-03-01T03:00:00Z
//! window resolve --timezone Europe/Berlin < maintenance.json
//! window validate --spec freeze.json
//! ```
//!
//! Specifications are read from `--spec` or stdin. Results are printed as
//! JSON on stdout; logs go to stderr and are controlled by `RUST_LOG`.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use window_engine::{resolve_window, TimeRange};

#[derive(Parser)]
#[command(name = "window", version, about = "Resolve active time windows")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether an instant is inside the window, and the next boundary
    Resolve {
        /// Window specification file (reads stdin if omitted)
        #[arg(short, long)]
        spec: Option<PathBuf>,
        /// Instant to evaluate, RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// IANA timezone the window's wall-clock times are in
        #[arg(short, long, default_value = "UTC")]
        timezone: String,
    },
    /// Check a window specification without resolving it
    Validate {
        /// Window specification file (reads stdin if omitted)
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    target: String,
    timezone: String,
    is_inside: bool,
    next_boundary: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Resolve { spec, at, timezone } => {
            let range = read_spec(spec.as_ref())?;
            let tz: Tz = timezone
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid timezone '{timezone}'"))?;
            let target = match at {
                Some(at) => DateTime::parse_from_rfc3339(&at)
                    .with_context(|| format!("invalid --at instant '{at}'"))?
                    .with_timezone(&tz),
                None => Utc::now().with_timezone(&tz),
            };
            debug!(at = %target.to_rfc3339(), timezone = %tz, "resolving");

            let state = resolve_window(&range, &target)?;
            let output = ResolveOutput {
                target: target.to_rfc3339(),
                timezone,
                is_inside: state.is_inside,
                next_boundary: state.next_boundary.map(|b| b.to_rfc3339()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Validate { spec } => {
            let range = read_spec(spec.as_ref())?;
            range.validate()?;
            println!("{}", serde_json::json!({ "valid": true }));
        }
    }
    Ok(())
}

fn read_spec(path: Option<&PathBuf>) -> Result<TimeRange> {
    let input = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&input).context("invalid window specification")
}
