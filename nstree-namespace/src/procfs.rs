//! procfs-backed namespace source
//!
//! Namespace handles are `/proc/PID/ns/<kind>` files. Their identity comes
//! from `fstat(2)` and their parent from `ioctl(fd, NS_GET_PARENT)`, which
//! is why this module needs `unsafe`.

#![allow(unsafe_code)]

use nix::errno::Errno;
use std::fs::{self, File};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tracing::trace;

use nstree_core::{Error, NamespaceId, NamespaceKind, ProcessId, Result};

use crate::handle::{NamespaceHandle, NamespaceSource, ParentQueryError};
use crate::membership::{StatusReader, parse_nstgid};

/// Default procfs mount point
pub const DEFAULT_PROC_ROOT: &str = "/proc";

const NSIO: u8 = 0xb7;

nix::ioctl_none!(
    /// `NS_GET_PARENT`: returns a new fd for the parent namespace
    ns_get_parent,
    NSIO,
    0x2
);

/// Open namespace file
#[derive(Debug)]
pub struct NsFile {
    file: File,
}

impl NamespaceHandle for NsFile {
    fn identity(&self) -> Result<NamespaceId> {
        let meta = self.file.metadata()?;
        Ok(NamespaceId::new(meta.dev(), meta.ino()))
    }

    fn parent(&self) -> std::result::Result<Self, ParentQueryError> {
        // SAFETY: the descriptor is owned by `self.file` and stays open for
        // the duration of the call; NS_GET_PARENT takes no argument.
        let fd = unsafe { ns_get_parent(self.file.as_raw_fd()) }
            .map_err(ParentQueryError::from_errno)?;

        // SAFETY: on success the ioctl returns a fresh descriptor that
        // nothing else owns.
        let owned = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Self {
            file: File::from(owned),
        })
    }
}

/// Live system source reading a procfs mount
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    /// Use the procfs mounted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the procfs mount point
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `pid`'s namespace file for `kind`
    #[must_use]
    pub fn namespace_path(&self, pid: ProcessId, kind: NamespaceKind) -> PathBuf {
        self.root
            .join(pid.to_string())
            .join("ns")
            .join(kind.proc_entry())
    }

    /// Path of `pid`'s status record
    #[must_use]
    pub fn status_path(&self, pid: ProcessId) -> PathBuf {
        self.root.join(pid.to_string()).join("status")
    }
}

/// Map an `open(2)` failure on a per-process file to the discovery taxonomy
fn classify_open_error(pid: ProcessId, path: &Path, err: &io::Error) -> Error {
    match err.raw_os_error().map(Errno::from_raw) {
        Some(Errno::ENOENT | Errno::ESRCH) => Error::ProcessVanished { pid },
        Some(Errno::EACCES | Errno::EPERM) => Error::PermissionDenied {
            operation: format!("open {}", path.display()),
        },
        _ => Error::Namespace {
            message: format!("Failed to open {}: {err}", path.display()),
        },
    }
}

impl NamespaceSource for ProcFs {
    type Handle = NsFile;

    fn processes(&self) -> Result<Vec<ProcessId>> {
        let entries = fs::read_dir(&self.root).map_err(|e| Error::Namespace {
            message: format!("Failed to read {}: {e}", self.root.display()),
        })?;

        let mut pids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<ProcessId>().ok())
            {
                pids.push(pid);
            }
        }

        pids.sort_unstable();
        trace!(count = pids.len(), root = %self.root.display(), "Enumerated processes");
        Ok(pids)
    }

    fn open(&self, pid: ProcessId, kind: NamespaceKind) -> Result<NsFile> {
        let path = self.namespace_path(pid, kind);
        File::open(&path)
            .map(|file| NsFile { file })
            .map_err(|e| classify_open_error(pid, &path, &e))
    }
}

impl StatusReader for ProcFs {
    fn nested_pids(&self, pid: ProcessId) -> Result<Vec<i32>> {
        let path = self.status_path(pid);
        let content = fs::read_to_string(&path).map_err(|e| classify_open_error(pid, &path, &e))?;

        parse_nstgid(&content).ok_or_else(|| Error::Namespace {
            message: format!("No NStgid field in {}", path.display()),
        })
    }
}
