//! nstree CLI
//!
//! Shows the hierarchy of PID or user namespaces on the running system
//! together with the processes that live in each one.

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;
mod scan;

use cli::Cli;

/// Exit status for a fatal error
const EXIT_FAILURE: i32 = 1;

/// Exit status when the kernel has no `NS_GET_PARENT`
const EXIT_UNSUPPORTED_KERNEL: i32 = 3;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Setup logging based on verbosity; RUST_LOG takes precedence
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = scan::execute(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(exit_code(&e));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    let unsupported = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<nstree_core::Error>(),
            Some(nstree_core::Error::UnsupportedKernel)
        )
    });

    if unsupported {
        EXIT_UNSUPPORTED_KERNEL
    } else {
        EXIT_FAILURE
    }
}
