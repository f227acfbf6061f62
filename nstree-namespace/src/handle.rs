//! Namespace handle and process source traits
//!
//! These are the OS-facing seams of discovery:
//! - [`ProcFs`](crate::ProcFs) - Production `/proc` + `ioctl(2)` backend
//! - [`MockTopology`](crate::MockTopology) - In-memory namespace tree for tests

use nix::errno::Errno;
use nstree_core::{NamespaceId, NamespaceKind, ProcessId, Result};
use thiserror::Error;

/// Outcome of a failed parent query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParentQueryError {
    /// No parent, or the parent is outside what the caller may see
    #[error("no visible parent namespace")]
    NoParent,

    /// The kernel does not implement the parent query
    #[error("parent query is not supported by this kernel")]
    Unsupported,

    /// Anything else
    #[error("parent query failed: {0}")]
    Other(Errno),
}

impl ParentQueryError {
    /// Classify the errno returned by `ioctl(NS_GET_PARENT)`
    #[must_use]
    pub const fn from_errno(errno: Errno) -> Self {
        match errno {
            Errno::EPERM => Self::NoParent,
            Errno::ENOTTY => Self::Unsupported,
            other => Self::Other(other),
        }
    }
}

/// An open reference to one namespace instance
///
/// Holding the handle pins the namespace (and therefore all of its
/// ancestors). Dropping it releases the reference.
pub trait NamespaceHandle: Sized {
    /// Identity of the referenced namespace
    ///
    /// # Errors
    /// Returns error if the handle cannot be inspected
    fn identity(&self) -> Result<NamespaceId>;

    /// Open a handle to the parent namespace
    ///
    /// # Errors
    /// See [`ParentQueryError`]
    fn parent(&self) -> std::result::Result<Self, ParentQueryError>;
}

/// Source of processes and their namespace handles
pub trait NamespaceSource {
    /// Handle type produced by this source
    type Handle: NamespaceHandle;

    /// Snapshot of the process list
    ///
    /// # Errors
    /// Returns error if the process table cannot be read
    fn processes(&self) -> Result<Vec<ProcessId>>;

    /// Open the namespace of `kind` that `pid` belongs to
    ///
    /// # Errors
    /// Returns [`Error::ProcessVanished`](nstree_core::Error::ProcessVanished)
    /// if the process is gone,
    /// [`Error::PermissionDenied`](nstree_core::Error::PermissionDenied) if the
    /// namespace file is not accessible, or another error otherwise.
    fn open(&self, pid: ProcessId, kind: NamespaceKind) -> Result<Self::Handle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_classification() {
        assert_eq!(
            ParentQueryError::from_errno(Errno::EPERM),
            ParentQueryError::NoParent
        );
        assert_eq!(
            ParentQueryError::from_errno(Errno::ENOTTY),
            ParentQueryError::Unsupported
        );
        assert_eq!(
            ParentQueryError::from_errno(Errno::EBADF),
            ParentQueryError::Other(Errno::EBADF)
        );
    }
}
