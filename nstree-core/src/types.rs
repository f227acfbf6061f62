//! Core type definitions with strong typing and validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Kind of namespace whose hierarchy is being inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    /// PID namespace
    #[default]
    Pid,
    /// User namespace
    User,
}

impl NamespaceKind {
    /// All supported kinds
    pub const ALL: [Self; 2] = [Self::Pid, Self::User];

    /// Name of the entry under `/proc/PID/ns/`
    #[must_use]
    pub const fn proc_entry(self) -> &'static str {
        match self {
            Self::Pid => "pid",
            Self::User => "user",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proc_entry())
    }
}

impl FromStr for NamespaceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.proc_entry().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidConfig {
                message: format!("Unknown namespace kind '{s}' (expected 'pid' or 'user')"),
            })
    }
}

/// Identity of one namespace instance: the device and inode of its nsfs file
///
/// Valid only while something keeps the namespace alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceId {
    /// Device ID (`st_dev`)
    pub device: u64,
    /// Inode number (`st_ino`)
    pub inode: u64,
}

impl NamespaceId {
    /// Create from device and inode numbers
    #[must_use]
    pub const fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device, self.inode)
    }
}

impl FromStr for NamespaceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidConfig {
            message: format!("Invalid namespace identity '{s}' (expected DEVICE:INODE)"),
        };

        let (device, inode) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            device: device.parse().map_err(|_| invalid())?,
            inode: inode.parse().map_err(|_| invalid())?,
        })
    }
}

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ProcessId(i32);

impl ProcessId {
    /// Create from raw PID
    #[must_use]
    pub const fn from_raw(pid: i32) -> Self {
        Self(pid)
    }

    /// Get the current process ID
    #[must_use]
    pub fn current() -> Self {
        Self::from(nix::unistd::getpid())
    }

    /// Convert to `nix::unistd::Pid`
    #[must_use]
    pub const fn as_nix_pid(self) -> nix::unistd::Pid {
        nix::unistd::Pid::from_raw(self.0)
    }

    /// Get raw PID value
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessId {
    type Err = Error;

    /// Parses a `/proc` directory name; only positive decimal PIDs are accepted
    fn from_str(s: &str) -> Result<Self> {
        if !s.starts_with(|c: char| matches!(c, '1'..='9')) {
            return Err(Error::InvalidConfig {
                message: format!("'{s}' is not a process ID"),
            });
        }

        s.parse().map(Self).map_err(|_| Error::InvalidConfig {
            message: format!("'{s}' is not a process ID"),
        })
    }
}

impl From<nix::unistd::Pid> for ProcessId {
    fn from(pid: nix::unistd::Pid) -> Self {
        Self(pid.as_raw())
    }
}

impl From<ProcessId> for nix::unistd::Pid {
    fn from(pid: ProcessId) -> Self {
        nix::unistd::Pid::from_raw(pid.0)
    }
}
