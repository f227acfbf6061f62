//! Namespace scan driver

use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::{debug, info, warn};

use nstree_namespace::{
    DiscoveryConfig, ProcFs, RenderOptions, TreeRenderer, UnreadablePolicy, discover,
    resolver_for,
};

use crate::cli::Cli;

/// Build the discovery configuration from command-line arguments
pub fn discovery_config(args: &Cli) -> DiscoveryConfig {
    let policy = if args.skip_unreadable {
        UnreadablePolicy::Skip
    } else {
        UnreadablePolicy::Abort
    };

    DiscoveryConfig::new()
        .with_kind(args.kind)
        .with_unreadable(policy)
}

/// Scan the system and print the namespace tree
///
/// Nothing is written to stdout unless the whole scan succeeds.
pub fn execute(args: &Cli) -> Result<()> {
    let options = RenderOptions::new().with_width(args.width);
    options.validate().context("Invalid display options")?;

    let config = discovery_config(args);
    debug!(config = ?config, "Starting scan");

    let procfs = ProcFs::new(&args.proc_root);
    let discovery = discover(&procfs, config)
        .with_context(|| format!("Failed to scan {} namespaces", args.kind))?;

    if discovery.registry.root().is_none() {
        warn!(root = %procfs.root().display(), "No namespaces found");
    }

    let resolver = resolver_for(args.kind, &procfs);
    let output = TreeRenderer::new(&discovery.registry, resolver.as_ref())
        .with_options(options)
        .render_to_string(&discovery.report);

    io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .context("Failed to write namespace tree")?;

    info!(
        namespaces = discovery.registry.len(),
        skipped = discovery.report.skipped(),
        "Done"
    );
    Ok(())
}
