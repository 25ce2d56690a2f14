// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitsieve: query git history with composable commit filters
//!
//! Reports go to stdout, as text or JSON. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use gitsieve_cli::config::Config;
use gitsieve_cli::query;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate().context("Invalid configuration")?;

    let report = query::run(&config).context("Query failed")?;
    let summary = report.summary();
    info!(
        repositories = summary.repositories,
        visited = summary.visited,
        matched = summary.matched,
        stopped = summary.stopped,
        "Walk complete"
    );

    if config.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{report}");
    }

    Ok(())
}
