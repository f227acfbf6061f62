//! CLI argument definitions

use clap::Parser;
use nstree_core::NamespaceKind;
use nstree_namespace::DEFAULT_PROC_ROOT;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nstree")]
#[command(about = "Show the hierarchy of PID or user namespaces and their member processes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Namespace kind to show (pid or user)
    #[arg(short, long, default_value_t = NamespaceKind::Pid)]
    pub kind: NamespaceKind,

    /// Skip processes whose namespace cannot be opened instead of aborting
    #[arg(long)]
    pub skip_unreadable: bool,

    /// Wrap member lists at this many columns
    #[arg(short, long, default_value_t = 80)]
    pub width: usize,

    /// Where procfs is mounted
    #[arg(long, default_value = DEFAULT_PROC_ROOT)]
    pub proc_root: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
