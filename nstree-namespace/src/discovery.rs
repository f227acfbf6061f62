//! Namespace hierarchy discovery
//!
//! Every process's namespace is resolved to a registry node. The first time
//! a namespace is seen its ancestors are walked with the parent query until
//! the walk reaches a namespace that is already known, or one with no visible
//! parent (the root). Each distinct namespace is therefore queried once, no
//! matter how many processes live in it or below it.

use tracing::{debug, info, warn};

use nstree_core::{Error, NamespaceId, ProcessId, Result};

use crate::config::{DiscoveryConfig, UnreadablePolicy};
use crate::handle::{NamespaceHandle, NamespaceSource, ParentQueryError};
use crate::registry::NamespaceRegistry;

/// Counters for one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Processes in the snapshot
    pub processes: usize,
    /// Processes recorded as namespace members
    pub members: usize,
    /// Processes that exited before they could be resolved
    pub vanished: usize,
    /// Processes skipped because their namespace file was unreadable
    pub unreadable: usize,
    /// Distinct namespaces in the tree
    pub namespaces: usize,
    /// Parent queries issued
    pub parent_queries: usize,
}

impl ScanReport {
    /// Total processes left out of the tree
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.vanished + self.unreadable
    }
}

/// Result of a completed scan
#[derive(Debug)]
pub struct Discovery {
    /// The namespace tree
    pub registry: NamespaceRegistry,
    /// Scan counters
    pub report: ScanReport,
}

/// Builds a [`NamespaceRegistry`] from a [`NamespaceSource`]
#[derive(Debug)]
pub struct HierarchyDiscoverer<'a, S: NamespaceSource> {
    source: &'a S,
    config: DiscoveryConfig,
    registry: NamespaceRegistry,
    report: ScanReport,
}

impl<'a, S: NamespaceSource> HierarchyDiscoverer<'a, S> {
    /// Create a discoverer over `source`
    #[must_use]
    pub fn new(source: &'a S, config: DiscoveryConfig) -> Self {
        Self {
            source,
            config,
            registry: NamespaceRegistry::new(),
            report: ScanReport::default(),
        }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Get the registry built so far
    #[must_use]
    pub const fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Scan every process in the source and return the finished tree
    ///
    /// # Errors
    /// Returns error if the process list cannot be read, the kernel lacks the
    /// parent query, a parent query fails unexpectedly, or a namespace file is
    /// unreadable under [`UnreadablePolicy::Abort`].
    pub fn run(mut self) -> Result<Discovery> {
        let kind = self.config.kind;
        let pids = self.source.processes()?;
        self.report.processes = pids.len();

        info!(kind = %kind, processes = pids.len(), "Scanning namespaces");

        for pid in pids {
            self.add_process(pid)?;
        }
        self.report.namespaces = self.registry.len();

        info!(
            kind = %kind,
            namespaces = self.report.namespaces,
            members = self.report.members,
            skipped = self.report.skipped(),
            "Scan complete"
        );

        Ok(Discovery {
            registry: self.registry,
            report: self.report,
        })
    }

    /// Resolve one process, absorbing per-process failures
    fn add_process(&mut self, pid: ProcessId) -> Result<()> {
        let outcome = self
            .source
            .open(pid, self.config.kind)
            .and_then(|handle| self.resolve(&handle, Some(pid)));

        match outcome {
            Ok(_) => {
                self.report.members += 1;
                Ok(())
            }
            Err(Error::ProcessVanished { .. }) => {
                debug!(pid = %pid, "Process exited during scan; skipping");
                self.report.vanished += 1;
                Ok(())
            }
            Err(Error::PermissionDenied { operation })
                if self.config.unreadable == UnreadablePolicy::Skip =>
            {
                warn!(pid = %pid, operation = %operation, "Namespace not readable; skipping");
                self.report.unreadable += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Ensure the namespace behind `handle` and all its ancestors are in the
    /// registry, and record `pid` as a member if given
    ///
    /// # Errors
    /// Returns error if the handle cannot be inspected or a parent query
    /// fails with anything other than "no visible parent".
    pub fn resolve(&mut self, handle: &S::Handle, pid: Option<ProcessId>) -> Result<NamespaceId> {
        let id = handle.identity()?;

        let (_, created) = self.registry.get_or_create(id);
        if created {
            self.walk_ancestors(id, handle)?;
        }

        if let Some(pid) = pid {
            self.registry.add_member(id, pid);
        }

        Ok(id)
    }

    /// Walk upward from the freshly created node `id`, then link the chain
    /// root-to-leaf
    ///
    /// All parent handles opened on the way stay alive until the chain is
    /// linked, so no ancestor can be freed while its identity is in use.
    fn walk_ancestors(&mut self, id: NamespaceId, handle: &S::Handle) -> Result<()> {
        let mut chain = vec![id];
        let mut pins: Vec<S::Handle> = Vec::new();

        loop {
            let current = pins.last().unwrap_or(handle);
            let current_id = chain[chain.len() - 1];

            self.report.parent_queries += 1;
            let parent = match current.parent() {
                Ok(parent) => parent,
                Err(ParentQueryError::NoParent) => {
                    debug!(namespace = %current_id, "No visible parent; treating as root");
                    self.registry.set_root(current_id);
                    break;
                }
                Err(ParentQueryError::Unsupported) => return Err(Error::UnsupportedKernel),
                Err(ParentQueryError::Other(source)) => {
                    return Err(Error::ParentQuery {
                        namespace: current_id,
                        source,
                    });
                }
            };

            let parent_id = parent.identity()?;
            let (_, created) = self.registry.get_or_create(parent_id);
            chain.push(parent_id);
            pins.push(parent);

            if !created {
                break;
            }
        }

        for pair in chain.windows(2).rev() {
            self.registry.link_child(pair[1], pair[0])?;
        }

        debug!(namespace = %id, depth = chain.len() - 1, "Resolved ancestors");
        Ok(())
    }
}

/// Scan `source` with `config`
///
/// # Errors
/// See [`HierarchyDiscoverer::run`]
pub fn discover<S: NamespaceSource>(source: &S, config: DiscoveryConfig) -> Result<Discovery> {
    HierarchyDiscoverer::new(source, config).run()
}
