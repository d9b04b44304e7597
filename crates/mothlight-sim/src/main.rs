//! # Mothlight Sim
//!
//! Headless runner for the Mothlight flock.
//!
//! Usage:
//! - `mothlight-sim` plays the built-in demo level
//! - `mothlight-sim <scenario.toml>` plays a scenario file
//! - `mothlight-sim --write-demo <path>` writes the demo level as TOML
//!
//! The final flock snapshot is printed to stdout as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod runner;
mod scenario;

use anyhow::{bail, Context, Result};
use scenario::Scenario;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("mothlight=info".parse()?))
        .init();

    info!("Mothlight sim {}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let scenario = match args.as_slice() {
        [] => Scenario::default(),
        [flag, path] if flag == "--write-demo" => {
            Scenario::default()
                .save_to(path)
                .with_context(|| format!("writing demo scenario to {path}"))?;
            return Ok(());
        },
        [path] => Scenario::from_path(path).with_context(|| format!("loading scenario {path}"))?,
        _ => bail!("usage: mothlight-sim [scenario.toml | --write-demo <path>]"),
    };

    let report = runner::run(&scenario).context("running scenario")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
