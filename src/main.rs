mod analytics;
mod auth;
mod db;
mod export;
mod ipc;
mod model;
mod report;
mod store;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scorebookd")]
#[command(about = "Exam score records and analytics sidecar (JSON lines over stdio)", version)]
struct Args {
    /// Workspace directory to open at startup
    #[arg(short, long, env = "SCOREBOOKD_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Tracing filter directive, e.g. "scorebookd=debug"
    #[arg(long, env = "SCOREBOOKD_LOG")]
    log_filter: Option<String>,
}

fn init_logging(directive: Option<&str>) -> anyhow::Result<()> {
    let filter = match directive {
        Some(d) => EnvFilter::try_new(d)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("scorebookd=info"))?,
    };
    // stdout carries responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_filter.as_deref())?;

    let mut state = ipc::AppState::default();
    if let Some(ws) = args.workspace.as_deref() {
        ipc::open_workspace(&mut state, ws)?;
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "scorebookd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request");
                let body = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", body);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
