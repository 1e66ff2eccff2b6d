//! `scm-bridge` entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load `.scm/config.toml` (or `--config`),
//!    apply command-line and `SCM_TOKEN` overrides, and validate.
//! 2. **Wire observability**: install `tracing-subscriber` with an
//!    `EnvFilter` (`RUST_LOG`, default `info`) and a JSON layer on stderr.
//!    Spans and events from every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: build the `HttpTransport` and select the
//!    provider adapter by driver.
//! 4. **Dispatch**: run the subcommand under a [`scm::Context`] that Ctrl-C
//!    cancels, and print the result as JSON on stdout.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transport::{ClientConfig, ConfigError, DEFAULT_CONFIG_PATH, TOKEN_ENV};

mod args;
mod commands;

use args::Cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Resolves the effective configuration.
///
/// A missing default config file is tolerated when `--driver` is given, so
/// one-off invocations need no file. An explicit `--config` must exist.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = match ClientConfig::load(&path) {
        Ok(config) => config,
        Err(ConfigError::Read { .. }) if cli.config.is_none() && cli.driver.is_some() => {
            ClientConfig::new(cli.driver.unwrap_or(scm::Driver::Github), None)
                .with_token_override(std::env::var(TOKEN_ENV).ok())
        }
        Err(err) => {
            return Err(err).with_context(|| format!("loading {}", path.display()));
        }
    };

    if let Some(driver) = cli.driver {
        config.driver = driver;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = Some(base_url.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;
    let client = commands::connect(config)?;

    let (ctx, cancel) = scm::Context::background().with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, canceling in-flight request");
            cancel.cancel();
        }
    });

    let output = commands::run(&client, &ctx, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
