// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `cidx`: the proxy-mode CLI. Federates `query`, `status`, `watch`,
//! `start`, `stop`, `uninstall`, and `fix-config` across every
//! sub-repository discovered under a proxy root (spec.md §6 "CLI surface
//! (proxy)").
//!
//! Exit codes: `0` all success, `1` at least one failure, `2` invalid
//! usage, `130` interrupted.

mod commands;
mod error_formatter;
mod exit_error;

use clap::{Args, Parser, Subcommand};
use exit_error::{ExitError, EXIT_SUCCESS, EXIT_USAGE};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cidx", about = "Proxy-mode federation across discovered code-indexer repositories")]
struct Cli {
    /// Proxy root (or any directory beneath one); defaults to the current directory.
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover sub-repositories under `--root` and write `.code-indexer/config.json`.
    Init {
        #[arg(long)]
        proxy_mode: bool,
    },
    /// Fan out a semantic query, merging hits by descending score.
    Query {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Fan out a read-only status check, one process per repository.
    Status {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run a long-lived watcher per repository with multiplexed output.
    Watch {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Start each repository's indexer, one at a time.
    Start {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Stop each repository's indexer, one at a time.
    Stop {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Uninstall each repository's indexer, one at a time.
    Uninstall {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Re-run discovery against an existing proxy config.
    FixConfig,
    /// Read-only admin queries against the local daemon (`cidxd`).
    Daemon(DaemonArgs),
}

#[derive(Args)]
struct DaemonArgs {
    #[command(subcommand)]
    command: DaemonCommand,
}

#[derive(Subcommand)]
enum DaemonCommand {
    /// Queue and resource statistics (spec.md §4.3).
    Status,
    /// Startup history (spec.md §4.18 StartupLogAPI).
    StartupLog {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let root = match cli.root.canonicalize() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("✗ {}: {e}", cli.root.display());
            return std::process::ExitCode::from(EXIT_USAGE as u8);
        }
    };

    match dispatch(&root, cli.command).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("✗ {e}");
            exit_code(e.code)
        }
    }
}

async fn dispatch(root: &std::path::Path, command: Command) -> Result<i32, ExitError> {
    match command {
        Command::Init { proxy_mode } => {
            if !proxy_mode {
                return Err(ExitError::usage("init requires --proxy-mode"));
            }
            commands::init::run(root)
        }
        Command::Query { limit, args } => commands::query::run(root, "query", limit, &args).await,
        Command::Status { args } => commands::parallel::run(root, "status", &args).await,
        Command::Watch { args } => commands::watch::run(root, &args).await,
        Command::Start { args } => commands::sequential::run(root, "start", &args).await,
        Command::Stop { args } => commands::sequential::run(root, "stop", &args).await,
        Command::Uninstall { args } => commands::sequential::run(root, "uninstall", &args).await,
        Command::FixConfig => commands::fix_config::run(root),
        Command::Daemon(DaemonArgs { command: DaemonCommand::Status }) => commands::daemon::status().await,
        Command::Daemon(DaemonArgs { command: DaemonCommand::StartupLog { limit } }) => commands::daemon::startup_log(limit).await,
    }
}

fn exit_code(code: i32) -> std::process::ExitCode {
    if code == EXIT_SUCCESS {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::from(code.clamp(0, 255) as u8)
    }
}
