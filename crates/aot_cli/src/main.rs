//! Stdio MCP server entry point.
//!
//! # Responsibility
//! - Parse flags, bootstrap logging and serve MCP over stdin/stdout.
//! - Keep stdout reserved for protocol messages; diagnostics go to the log.

mod server;

use aot_core::{default_log_level, init_logging, init_stderr_logging, is_valid_max_depth};
use aot_tools::ToolServer;
use clap::Parser;
use log::{error, info};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use server::AotServer;
use std::path::PathBuf;
use std::process::ExitCode;

/// Atom of Thoughts reasoning server over stdio
#[derive(Parser, Debug)]
#[command(name = "aot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Depth ceiling for the full engine, any positive number (default 5)
    #[arg(long, value_parser = parse_max_depth)]
    max_depth: Option<f64>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (stderr when omitted)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn parse_max_depth(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|depth| is_valid_max_depth(*depth))
        .ok_or_else(|| format!("`{raw}` is not a positive number"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level.as_deref().unwrap_or(default_log_level());
    let logging = match &args.log_dir {
        Some(dir) => init_logging(level, &dir.to_string_lossy()),
        None => init_stderr_logging(level),
    };
    if let Err(err) = logging {
        eprintln!("aot: {err}");
        return ExitCode::FAILURE;
    }

    let server = AotServer::new(ToolServer::new(args.max_depth));
    info!(
        "event=server_start module=cli status=ok name={} max_depth={}",
        server::SERVER_NAME,
        server.max_depth().await
    );

    let service = match server.serve(stdio()).await {
        Ok(service) => service,
        Err(err) => {
            error!("event=server_start module=cli status=error error={err}");
            return ExitCode::FAILURE;
        }
    };
    match service.waiting().await {
        Ok(reason) => {
            info!("event=server_stop module=cli status=ok reason={reason:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=server_stop module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}
