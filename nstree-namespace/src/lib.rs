//! Namespace hierarchy discovery and rendering
//!
//! This crate reconstructs the tree of Linux namespaces of one kind:
//! - PID namespaces - members shown with their nested PID mapping
//! - User namespaces - members shown as plain PIDs
//!
//! Discovery goes through the [`NamespaceSource`] trait so it can run
//! against the live `/proc` ([`ProcFs`]) or an in-memory [`MockTopology`].

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod discovery;
pub mod handle;
pub mod membership;
pub mod mock;
pub mod procfs;
pub mod registry;
pub mod render;

pub use config::{DiscoveryConfig, RenderOptions, UnreadablePolicy};
pub use discovery::{Discovery, HierarchyDiscoverer, ScanReport, discover};
pub use handle::{NamespaceHandle, NamespaceSource, ParentQueryError};
pub use membership::{
    Membership, MembershipResolver, PidMembership, StatusReader, UserMembership, resolver_for,
};
pub use mock::{MockHandle, MockTopology};
pub use procfs::{DEFAULT_PROC_ROOT, NsFile, ProcFs};
pub use registry::{NamespaceNode, NamespaceRegistry};
pub use render::{RenderedTree, TreeRenderer};
