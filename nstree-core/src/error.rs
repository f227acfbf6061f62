//! Error types for nstree

use thiserror::Error;

use crate::types::{NamespaceId, ProcessId};

/// nstree error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Namespace operation failed
    #[error("Namespace error: {message}")]
    Namespace {
        /// Error message
        message: String,
    },

    /// Permission denied
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// System error from nix
    #[error("System error: {0}")]
    System(#[from] nix::Error),

    /// Process exited between enumeration and lookup
    #[error("Process {pid} no longer exists")]
    ProcessVanished {
        /// The process that disappeared
        pid: ProcessId,
    },

    /// The running kernel has no `NS_GET_PARENT` ioctl
    #[error("This kernel doesn't support namespace ioctl() operations")]
    UnsupportedKernel,

    /// Parent query failed for an unexpected reason
    #[error("ioctl(NS_GET_PARENT) failed for namespace {namespace}: {source}")]
    ParentQuery {
        /// Namespace whose parent was requested
        namespace: NamespaceId,
        /// Underlying OS error
        source: nix::Error,
    },

    /// A child was linked under a namespace the registry has never seen
    #[error("Internal error: parent namespace {parent} of {child} is not registered")]
    UnknownParent {
        /// Missing parent
        parent: NamespaceId,
        /// Child being linked
        child: NamespaceId,
    },
}

impl Error {
    /// Whether this error means the process went away mid-scan
    #[must_use]
    pub const fn is_vanished(&self) -> bool {
        matches!(self, Self::ProcessVanished { .. })
    }
}

/// Result type alias for nstree operations
pub type Result<T> = std::result::Result<T, Error>;
