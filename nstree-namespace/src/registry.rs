//! In-memory graph of discovered namespaces

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use nstree_core::{Error, NamespaceId, ProcessId, Result};

/// One discovered namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceNode {
    children: Vec<NamespaceId>,
    members: Vec<ProcessId>,
}

impl NamespaceNode {
    /// Child namespaces, in the order they were linked
    #[must_use]
    pub fn children(&self) -> &[NamespaceId] {
        &self.children
    }

    /// Member processes, in the order they were recorded
    #[must_use]
    pub fn members(&self) -> &[ProcessId] {
        &self.members
    }
}

/// All namespaces seen during one scan, keyed by identity
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    nodes: HashMap<NamespaceId, NamespaceNode>,
    root: Option<NamespaceId>,
    extra_roots: Vec<NamespaceId>,
}

impl NamespaceRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `id`, creating an empty node for it if needed
    ///
    /// The flag is `true` only on the call that created the node.
    pub fn get_or_create(&mut self, id: NamespaceId) -> (&mut NamespaceNode, bool) {
        match self.nodes.entry(id) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => (entry.insert(NamespaceNode::default()), true),
        }
    }

    /// Make `child` a child of `parent`
    ///
    /// Linking the same pair twice is a no-op.
    ///
    /// # Errors
    /// Returns [`Error::UnknownParent`] if `parent` has no node
    pub fn link_child(&mut self, parent: NamespaceId, child: NamespaceId) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&parent)
            .ok_or(Error::UnknownParent { parent, child })?;

        if !node.children.contains(&child) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Record `pid` as a member of `id`
    pub fn add_member(&mut self, id: NamespaceId, pid: ProcessId) {
        match self.nodes.get_mut(&id) {
            Some(node) => node.members.push(pid),
            None => tracing::debug!(namespace = %id, pid = %pid, "Member for unknown namespace ignored"),
        }
    }

    /// Record the root namespace
    ///
    /// The first root wins. Any other identity reported later is kept in
    /// [`extra_roots`](Self::extra_roots).
    pub fn set_root(&mut self, id: NamespaceId) {
        match self.root {
            None => self.root = Some(id),
            Some(root) if root == id => {}
            Some(root) => {
                tracing::warn!(
                    root = %root,
                    other = %id,
                    "Multiple namespaces without a visible parent; keeping the first"
                );
                if !self.extra_roots.contains(&id) {
                    self.extra_roots.push(id);
                }
            }
        }
    }

    /// The root namespace, if one was found
    #[must_use]
    pub const fn root(&self) -> Option<NamespaceId> {
        self.root
    }

    /// Roots reported after the first one
    #[must_use]
    pub fn extra_roots(&self) -> &[NamespaceId] {
        &self.extra_roots
    }

    /// Get a node
    #[must_use]
    pub fn get(&self, id: NamespaceId) -> Option<&NamespaceNode> {
        self.nodes.get(&id)
    }

    /// Check whether `id` has a node
    #[must_use]
    pub fn contains(&self, id: NamespaceId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of distinct namespaces
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no namespace has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes (unordered)
    pub fn iter(&self) -> impl Iterator<Item = (NamespaceId, &NamespaceNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Find the namespace that lists `id` as a child
    #[must_use]
    pub fn parent_of(&self, id: NamespaceId) -> Option<NamespaceId> {
        self.iter()
            .find(|(_, node)| node.children.contains(&id))
            .map(|(parent, _)| parent)
    }

    /// Which namespace `pid` was recorded in
    #[must_use]
    pub fn namespace_of(&self, pid: ProcessId) -> Option<NamespaceId> {
        self.iter()
            .find(|(_, node)| node.members.contains(&pid))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: NamespaceId = NamespaceId::new(4, 100);
    const CHILD: NamespaceId = NamespaceId::new(4, 200);

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut registry = NamespaceRegistry::new();

        let (_, created) = registry.get_or_create(ROOT);
        assert!(created);
        registry.add_member(ROOT, ProcessId::from_raw(1));

        let (node, created) = registry.get_or_create(ROOT);
        assert!(!created);
        assert_eq!(node.members(), &[ProcessId::from_raw(1)]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_link_child() {
        let mut registry = NamespaceRegistry::new();
        registry.get_or_create(ROOT);
        registry.get_or_create(CHILD);

        registry.link_child(ROOT, CHILD).unwrap();
        registry.link_child(ROOT, CHILD).unwrap();

        assert_eq!(registry.get(ROOT).unwrap().children(), &[CHILD]);
        assert_eq!(registry.parent_of(CHILD), Some(ROOT));
        assert_eq!(registry.parent_of(ROOT), None);
    }

    #[test]
    fn test_link_child_unknown_parent() {
        let mut registry = NamespaceRegistry::new();
        registry.get_or_create(CHILD);

        let err = registry.link_child(ROOT, CHILD).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownParent { parent, child } if parent == ROOT && child == CHILD
        ));
    }

    #[test]
    fn test_add_member_unknown_namespace() {
        let mut registry = NamespaceRegistry::new();
        registry.add_member(ROOT, ProcessId::from_raw(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_set_root_keeps_first() {
        let mut registry = NamespaceRegistry::new();
        assert_eq!(registry.root(), None);

        registry.set_root(ROOT);
        registry.set_root(ROOT);
        assert!(registry.extra_roots().is_empty());

        registry.set_root(CHILD);
        registry.set_root(CHILD);
        assert_eq!(registry.root(), Some(ROOT));
        assert_eq!(registry.extra_roots(), &[CHILD]);
    }

    #[test]
    fn test_namespace_of() {
        let mut registry = NamespaceRegistry::new();
        registry.get_or_create(ROOT);
        registry.add_member(ROOT, ProcessId::from_raw(7));

        assert_eq!(registry.namespace_of(ProcessId::from_raw(7)), Some(ROOT));
        assert_eq!(registry.namespace_of(ProcessId::from_raw(8)), None);
    }
}
