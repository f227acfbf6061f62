//! What to show for each member process
//!
//! User namespaces list plain PIDs. PID namespaces list each process's
//! nested PID mapping (`NStgid` in `/proc/PID/status`), read at render time.

use std::fmt;

use nstree_core::{NamespaceKind, ProcessId, Result};

/// Source of per-process status records
pub trait StatusReader {
    /// PIDs of `pid` in each PID namespace it belongs to, outermost first
    ///
    /// # Errors
    /// Returns error if the status record cannot be read or has no mapping
    fn nested_pids(&self, pid: ProcessId) -> Result<Vec<i32>>;
}

/// Extract the `NStgid:` field from a status record
#[must_use]
pub fn parse_nstgid(status: &str) -> Option<Vec<i32>> {
    let line = status.lines().find(|line| line.starts_with("NStgid:"))?;
    line["NStgid:".len()..]
        .split_whitespace()
        .map(|pid| pid.parse().ok())
        .collect::<Option<Vec<i32>>>()
        .filter(|pids| !pids.is_empty())
}

/// Display form of one member process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// The PID itself
    Pid(ProcessId),
    /// Nested PID mapping, outermost first
    Nested(Vec<i32>),
    /// The process went away before it could be looked up
    Unavailable(ProcessId),
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pid(pid) => write!(f, "{pid}"),
            Self::Nested(pids) => {
                f.write_str("[")?;
                for (i, pid) in pids.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{pid}")?;
                }
                f.write_str("]")
            }
            Self::Unavailable(pid) => write!(f, "[{pid} exited]"),
        }
    }
}

/// Per-kind membership lookup
pub trait MembershipResolver {
    /// Resolve the display form of member `pid`; never fails
    fn resolve(&self, pid: ProcessId) -> Membership;
}

/// User namespaces: members are shown as plain PIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMembership;

impl MembershipResolver for UserMembership {
    fn resolve(&self, pid: ProcessId) -> Membership {
        Membership::Pid(pid)
    }
}

/// PID namespaces: members are shown with their nested PID mapping
#[derive(Debug, Clone)]
pub struct PidMembership<'a, R: StatusReader> {
    reader: &'a R,
}

impl<'a, R: StatusReader> PidMembership<'a, R> {
    /// Read status records through `reader`
    #[must_use]
    pub const fn new(reader: &'a R) -> Self {
        Self { reader }
    }
}

impl<R: StatusReader> MembershipResolver for PidMembership<'_, R> {
    fn resolve(&self, pid: ProcessId) -> Membership {
        match self.reader.nested_pids(pid) {
            Ok(pids) => Membership::Nested(pids),
            Err(e) => {
                tracing::debug!(pid = %pid, error = %e, "Status unavailable");
                Membership::Unavailable(pid)
            }
        }
    }
}

/// Pick the resolver for `kind`
#[must_use]
pub fn resolver_for<'a, R: StatusReader>(
    kind: NamespaceKind,
    reader: &'a R,
) -> Box<dyn MembershipResolver + 'a> {
    match kind {
        NamespaceKind::Pid => Box::new(PidMembership::new(reader)),
        NamespaceKind::User => Box::new(UserMembership),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nstree_core::Error;

    struct FixedStatus;

    impl StatusReader for FixedStatus {
        fn nested_pids(&self, pid: ProcessId) -> Result<Vec<i32>> {
            match pid.as_raw() {
                9 => Err(Error::ProcessVanished { pid }),
                raw => Ok(vec![raw, 1]),
            }
        }
    }

    #[test]
    fn test_parse_nstgid() {
        let status = "Name:\tbash\nTgid:\t1234\nNStgid:\t1234\t56\t1\nNSpid:\t1234\t56\t1\n";
        assert_eq!(parse_nstgid(status), Some(vec![1234, 56, 1]));

        assert_eq!(parse_nstgid("NStgid:\t7\n"), Some(vec![7]));
        assert_eq!(parse_nstgid("Name:\tinit\nPid:\t1\n"), None);
        assert_eq!(parse_nstgid("NStgid:\n"), None);
        assert_eq!(parse_nstgid("NStgid:\t12\tx\n"), None);
    }

    #[test]
    fn test_membership_display() {
        let pid = ProcessId::from_raw(42);
        assert_eq!(Membership::Pid(pid).to_string(), "42");
        assert_eq!(Membership::Nested(vec![42, 3, 1]).to_string(), "[42 3 1]");
        assert_eq!(Membership::Unavailable(pid).to_string(), "[42 exited]");
    }

    #[test]
    fn test_user_resolver() {
        let resolver = resolver_for(NamespaceKind::User, &FixedStatus);
        let pid = ProcessId::from_raw(9);
        assert_eq!(resolver.resolve(pid), Membership::Pid(pid));
    }

    #[test]
    fn test_pid_resolver() {
        let resolver = resolver_for(NamespaceKind::Pid, &FixedStatus);
        assert_eq!(
            resolver.resolve(ProcessId::from_raw(30)),
            Membership::Nested(vec![30, 1])
        );
        assert_eq!(
            resolver.resolve(ProcessId::from_raw(9)),
            Membership::Unavailable(ProcessId::from_raw(9))
        );
    }
}
