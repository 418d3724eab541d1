//! Aether CLI binary.
//!
//! A thin entrypoint over `aether-collector`/`aether-resolver`/`aether-sync`:
//! initializes logging via `tracing`, parses arguments with `clap`, and
//! dispatches to a command handler. Transport and descriptor parsing are out
//! of scope here, so `resolve` runs against a small built-in fixture graph
//! rather than a real repository.

mod cli;
mod commands;
mod demo;

use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(if args.verbose {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        })
        .init();

    commands::dispatch(args).await
}
