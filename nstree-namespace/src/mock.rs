//! In-memory namespace source for tests

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use nstree_core::{Error, NamespaceId, NamespaceKind, ProcessId, Result};

use crate::handle::{NamespaceHandle, NamespaceSource, ParentQueryError};
use crate::membership::StatusReader;

/// Mock namespace tree (doesn't touch procfs)
///
/// Counts parent queries and open handles so tests can check how the
/// discoverer uses the source.
///
/// # Example
/// ```
/// use nstree_core::NamespaceId;
/// use nstree_namespace::{DiscoveryConfig, MockTopology, discover};
///
/// let init = NamespaceId::new(4, 1);
/// let container = NamespaceId::new(4, 2);
///
/// let topology = MockTopology::new(init)
///     .with_namespace(container, init)
///     .with_process(1, init)
///     .with_process(100, container);
///
/// let discovery = discover(&topology, DiscoveryConfig::default()).unwrap();
/// assert_eq!(discovery.registry.root(), Some(init));
/// assert_eq!(topology.parent_queries(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockTopology {
    root: NamespaceId,
    graph: Rc<MockGraph>,
    processes: Vec<(ProcessId, MockProcess)>,
    memberships: HashMap<(ProcessId, NamespaceKind), NamespaceId>,
    status: HashMap<ProcessId, Option<Vec<i32>>>,
    counters: Rc<Counters>,
}

#[derive(Debug, Clone, Default)]
struct MockGraph {
    parents: HashMap<NamespaceId, NamespaceId>,
    hidden: HashSet<NamespaceId>,
    parent_error: Option<ParentQueryError>,
}

#[derive(Debug, Clone, Copy)]
enum MockProcess {
    Member,
    Vanished,
    Unreadable,
}

#[derive(Debug, Default)]
struct Counters {
    parent_queries: Cell<usize>,
    open: Cell<usize>,
    peak: Cell<usize>,
}

impl Counters {
    fn opened(&self) {
        let open = self.open.get() + 1;
        self.open.set(open);
        self.peak.set(self.peak.get().max(open));
    }

    fn closed(&self) {
        self.open.set(self.open.get().saturating_sub(1));
    }
}

impl MockTopology {
    /// Create a topology whose top namespace is `root`
    #[must_use]
    pub fn new(root: NamespaceId) -> Self {
        Self {
            root,
            graph: Rc::new(MockGraph::default()),
            processes: Vec::new(),
            memberships: HashMap::new(),
            status: HashMap::new(),
            counters: Rc::new(Counters::default()),
        }
    }

    /// Add `child` as a child namespace of `parent`
    #[must_use]
    pub fn with_namespace(mut self, child: NamespaceId, parent: NamespaceId) -> Self {
        Rc::make_mut(&mut self.graph).parents.insert(child, parent);
        self
    }

    /// Hide `id` from the scanner: its children report no visible parent
    #[must_use]
    pub fn with_hidden(mut self, id: NamespaceId) -> Self {
        Rc::make_mut(&mut self.graph).hidden.insert(id);
        self
    }

    /// Make every parent query fail with `error`
    #[must_use]
    pub fn with_parent_error(mut self, error: ParentQueryError) -> Self {
        Rc::make_mut(&mut self.graph).parent_error = Some(error);
        self
    }

    /// Add a process living in `namespace` for every namespace kind
    #[must_use]
    pub fn with_process(self, pid: i32, namespace: NamespaceId) -> Self {
        NamespaceKind::ALL
            .into_iter()
            .fold(self, |topology, kind| topology.with_process_in(pid, kind, namespace))
    }

    /// Add a process living in `namespace` for `kind` only
    ///
    /// Opening the process's namespace of any other kind fails as if the
    /// namespace file did not exist, unless that kind is added too.
    #[must_use]
    pub fn with_process_in(
        mut self,
        pid: i32,
        kind: NamespaceKind,
        namespace: NamespaceId,
    ) -> Self {
        let pid = ProcessId::from_raw(pid);
        if self.process(pid).is_none() {
            self.processes.push((pid, MockProcess::Member));
        }
        self.memberships.insert((pid, kind), namespace);
        self
    }

    /// Add a process that exits between enumeration and lookup
    #[must_use]
    pub fn with_vanished(mut self, pid: i32) -> Self {
        self.processes
            .push((ProcessId::from_raw(pid), MockProcess::Vanished));
        self
    }

    /// Add a process whose namespace file cannot be opened
    #[must_use]
    pub fn with_unreadable(mut self, pid: i32) -> Self {
        self.processes
            .push((ProcessId::from_raw(pid), MockProcess::Unreadable));
        self
    }

    /// Set the nested PID mapping reported for `pid`
    #[must_use]
    pub fn with_nested_pids(mut self, pid: i32, nested: &[i32]) -> Self {
        self.status
            .insert(ProcessId::from_raw(pid), Some(nested.to_vec()));
        self
    }

    /// Make `pid` exit after discovery: its status can no longer be read
    #[must_use]
    pub fn with_exited(mut self, pid: i32) -> Self {
        self.status.insert(ProcessId::from_raw(pid), None);
        self
    }

    /// The top namespace
    #[must_use]
    pub const fn root(&self) -> NamespaceId {
        self.root
    }

    /// Number of parent queries made so far
    #[must_use]
    pub fn parent_queries(&self) -> usize {
        self.counters.parent_queries.get()
    }

    /// Handles currently open
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.counters.open.get()
    }

    /// Most handles that were open at the same time
    #[must_use]
    pub fn peak_open_handles(&self) -> usize {
        self.counters.peak.get()
    }

    fn handle(&self, id: NamespaceId) -> MockHandle {
        MockHandle::new(id, Rc::clone(&self.graph), Rc::clone(&self.counters))
    }

    fn process(&self, pid: ProcessId) -> Option<MockProcess> {
        self.processes
            .iter()
            .find(|(p, _)| *p == pid)
            .map(|(_, process)| *process)
    }
}

/// Handle into a [`MockTopology`]
#[derive(Debug)]
pub struct MockHandle {
    id: NamespaceId,
    graph: Rc<MockGraph>,
    counters: Rc<Counters>,
}

impl MockHandle {
    fn new(id: NamespaceId, graph: Rc<MockGraph>, counters: Rc<Counters>) -> Self {
        counters.opened();
        Self {
            id,
            graph,
            counters,
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.counters.closed();
    }
}

impl NamespaceHandle for MockHandle {
    fn identity(&self) -> Result<NamespaceId> {
        Ok(self.id)
    }

    fn parent(&self) -> std::result::Result<Self, ParentQueryError> {
        let counters = &self.counters;
        counters.parent_queries.set(counters.parent_queries.get() + 1);

        if let Some(error) = self.graph.parent_error {
            return Err(error);
        }

        match self.graph.parents.get(&self.id) {
            Some(parent) if !self.graph.hidden.contains(parent) => Ok(Self::new(
                *parent,
                Rc::clone(&self.graph),
                Rc::clone(&self.counters),
            )),
            _ => Err(ParentQueryError::NoParent),
        }
    }
}

impl NamespaceSource for MockTopology {
    type Handle = MockHandle;

    fn processes(&self) -> Result<Vec<ProcessId>> {
        Ok(self.processes.iter().map(|(pid, _)| *pid).collect())
    }

    fn open(&self, pid: ProcessId, kind: NamespaceKind) -> Result<MockHandle> {
        match self.process(pid) {
            Some(MockProcess::Member) => self
                .memberships
                .get(&(pid, kind))
                .map(|id| self.handle(*id))
                .ok_or(Error::ProcessVanished { pid }),
            Some(MockProcess::Unreadable) => Err(Error::PermissionDenied {
                operation: format!("open /proc/{pid}/ns/{kind}"),
            }),
            Some(MockProcess::Vanished) | None => Err(Error::ProcessVanished { pid }),
        }
    }
}

impl StatusReader for MockTopology {
    fn nested_pids(&self, pid: ProcessId) -> Result<Vec<i32>> {
        match self.status.get(&pid) {
            Some(Some(nested)) => Ok(nested.clone()),
            Some(None) => Err(Error::ProcessVanished { pid }),
            None => match self.process(pid) {
                Some(MockProcess::Member) => Ok(vec![pid.as_raw()]),
                _ => Err(Error::ProcessVanished { pid }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: NamespaceId = NamespaceId::new(4, 1);
    const CHILD: NamespaceId = NamespaceId::new(4, 2);

    #[test]
    fn test_mock_parent_queries() {
        let topology = MockTopology::new(ROOT).with_namespace(CHILD, ROOT);
        let handle = topology.handle(CHILD);

        let parent = handle.parent().unwrap();
        assert_eq!(parent.identity().unwrap(), ROOT);
        assert_eq!(parent.parent().unwrap_err(), ParentQueryError::NoParent);
        assert_eq!(topology.parent_queries(), 2);
    }

    #[test]
    fn test_mock_handle_accounting() {
        let topology = MockTopology::new(ROOT).with_namespace(CHILD, ROOT);
        {
            let child = topology.handle(CHILD);
            let _parent = child.parent().unwrap();
            assert_eq!(topology.open_handles(), 2);
        }
        assert_eq!(topology.open_handles(), 0);
        assert_eq!(topology.peak_open_handles(), 2);
    }

    #[test]
    fn test_mock_open_errors() {
        let topology = MockTopology::new(ROOT)
            .with_vanished(5)
            .with_unreadable(6);

        let vanished = topology
            .open(ProcessId::from_raw(5), NamespaceKind::Pid)
            .unwrap_err();
        assert!(vanished.is_vanished());

        let unreadable = topology
            .open(ProcessId::from_raw(6), NamespaceKind::User)
            .unwrap_err();
        assert!(matches!(unreadable, Error::PermissionDenied { .. }));
    }

    #[test]
    fn test_mock_membership_per_kind() {
        let topology = MockTopology::new(ROOT)
            .with_namespace(CHILD, ROOT)
            .with_process_in(7, NamespaceKind::Pid, CHILD)
            .with_process_in(7, NamespaceKind::User, ROOT)
            .with_process_in(8, NamespaceKind::Pid, CHILD);

        let open = |raw, kind| topology.open(ProcessId::from_raw(raw), kind);
        assert_eq!(open(7, NamespaceKind::Pid).unwrap().identity().unwrap(), CHILD);
        assert_eq!(open(7, NamespaceKind::User).unwrap().identity().unwrap(), ROOT);
        assert!(open(8, NamespaceKind::User).unwrap_err().is_vanished());
        assert_eq!(topology.processes().unwrap().len(), 2);
    }

    #[test]
    fn test_mock_status() {
        let topology = MockTopology::new(ROOT)
            .with_process(10, ROOT)
            .with_process(11, ROOT)
            .with_nested_pids(11, &[11, 1])
            .with_exited(12);

        let status = |raw| topology.nested_pids(ProcessId::from_raw(raw));
        assert_eq!(status(10).unwrap(), vec![10]);
        assert_eq!(status(11).unwrap(), vec![11, 1]);
        assert!(status(12).unwrap_err().is_vanished());
        assert!(status(13).unwrap_err().is_vanished());
    }
}
