// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Code Indexer Contributors

//! `cidx-bridge`: converts a local MCP JSON-RPC stream into authenticated
//! HTTPS calls against the code indexer server (spec.md §4.16).
//!
//! stdout is reserved for JSON-RPC responses; every diagnostic goes to
//! stderr, including this binary's own `tracing` output.

mod client;
mod config;
mod credentials;
mod diagnostics;
mod error;
mod rpc;

use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cidx-bridge", about = "MCP bridge for the code indexer server")]
struct Cli {
    /// Prompt for and store encrypted login credentials, then exit.
    #[arg(long)]
    setup_credentials: bool,

    /// Print resolved configuration, environment, and a reachability probe, then exit.
    #[arg(long)]
    diagnose: bool,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let result = if cli.setup_credentials {
        run_setup_credentials()
    } else if cli.diagnose {
        run_diagnose().await
    } else {
        run_bridge().await
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "cidx-bridge exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run_bridge() -> error::Result<()> {
    let config = config::load()?;
    let mut bridge = rpc::Bridge::new(config)?;
    bridge.run_stdio().await
}

fn run_setup_credentials() -> error::Result<()> {
    print!("Username: ");
    std::io::stdout().flush().ok();
    let mut username = String::new();
    std::io::stdin().read_line(&mut username).map_err(|e| error::BridgeError::Internal(e.to_string()))?;

    print!("Password: ");
    std::io::stdout().flush().ok();
    let mut password = String::new();
    std::io::stdin().read_line(&mut password).map_err(|e| error::BridgeError::Internal(e.to_string()))?;
    let password = password.trim_end_matches(['\n', '\r']).to_string();

    let key = credentials::load_or_create_key()?;
    let creds = credentials::Credentials { username: username.trim().to_string(), password };
    credentials::save(&creds, &key)?;

    println!("Credentials stored at {}", credentials::credentials_path().display());
    Ok(())
}

async fn run_diagnose() -> error::Result<()> {
    let report = diagnostics::run().await?;

    println!("Environment:");
    for (name, value) in &report.env {
        println!("  {name} = {value}");
    }

    println!("\nConfig file: {}", report.config_path);

    println!("\nEffective configuration:");
    for field in &report.effective {
        println!("  {:<13} = {:<40} [{}]", field.field, field.value, field.source);
    }

    println!(
        "\nReachability: {}",
        match report.reachable {
            Some(true) => "reachable",
            Some(false) => "unreachable",
            None => "unknown",
        }
    );

    Ok(())
}
