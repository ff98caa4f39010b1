// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for evonet binaries.
//!
//! Library crates only emit `tracing` events; installing a subscriber is
//! the binary's job. `RUST_LOG` overrides the default filter.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install a console subscriber with the given default filter, e.g.
/// `"evonet=info"`. Safe to call once per process.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;
    Ok(())
}
