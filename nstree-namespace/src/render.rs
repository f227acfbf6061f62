//! Text rendering of the namespace tree

use std::fmt::{self, Write};

use nstree_core::{NamespaceId, ProcessId};

use crate::config::RenderOptions;
use crate::discovery::ScanReport;
use crate::membership::MembershipResolver;
use crate::registry::NamespaceRegistry;

const LABEL: &str = "PIDs: ";

/// Renders a [`NamespaceRegistry`] as an indented tree
///
/// Output format:
/// ```text
/// 4:4026531836
///             PIDs: [1] [2] [3]
///     4:4026532200
///                 PIDs: [412 1] [413 2]
/// ```
pub struct TreeRenderer<'a> {
    registry: &'a NamespaceRegistry,
    resolver: &'a dyn MembershipResolver,
    options: RenderOptions,
}

impl<'a> TreeRenderer<'a> {
    /// Create a renderer with default options
    #[must_use]
    pub fn new(registry: &'a NamespaceRegistry, resolver: &'a dyn MembershipResolver) -> Self {
        Self {
            registry,
            resolver,
            options: RenderOptions::default(),
        }
    }

    /// Use custom rendering options
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Write the tree below the registry's root, depth first
    ///
    /// Nothing is written when no root was found.
    ///
    /// # Errors
    /// Returns error if writing to `out` fails
    pub fn render(&self, out: &mut impl Write) -> fmt::Result {
        let Some(root) = self.registry.root() else {
            return Ok(());
        };

        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.registry.get(id) else {
                continue;
            };

            let indent = depth * self.options.indent_step;
            writeln!(out, "{:indent$}{id}", "")?;
            self.render_members(out, indent, node.members())?;

            stack.extend(node.children().iter().rev().map(|child| (*child, depth + 1)));
        }

        Ok(())
    }

    /// Write the sorted, wrapped member list of one node
    fn render_members(
        &self,
        out: &mut impl Write,
        indent: usize,
        members: &[ProcessId],
    ) -> fmt::Result {
        if members.is_empty() {
            return Ok(());
        }

        let mut sorted = members.to_vec();
        sorted.sort_unstable();

        let margin = indent + self.options.label_indent;
        let mut line = format!("{:margin$}{LABEL}", "");
        let mut line_has_entry = false;

        for pid in sorted {
            let entry = self.resolver.resolve(pid).to_string();

            if line_has_entry && line.len() + 1 + entry.len() > self.options.width {
                writeln!(out, "{line}")?;
                line = format!("{:width$}", "", width = margin + LABEL.len());
                line_has_entry = false;
            }

            if line_has_entry {
                line.push(' ');
            }
            line.push_str(&entry);
            line_has_entry = true;
        }

        writeln!(out, "{line}")
    }

    /// Write a footer describing anything left out of the tree
    ///
    /// # Errors
    /// Returns error if writing to `out` fails
    pub fn render_summary(&self, out: &mut impl Write, report: &ScanReport) -> fmt::Result {
        let extra_roots = self.registry.extra_roots();
        if report.skipped() == 0 && extra_roots.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        if report.skipped() > 0 {
            writeln!(
                out,
                "skipped {} process(es): {} vanished, {} unreadable",
                report.skipped(),
                report.vanished,
                report.unreadable
            )?;
        }
        if !extra_roots.is_empty() {
            let ids: Vec<String> = extra_roots.iter().map(NamespaceId::to_string).collect();
            writeln!(
                out,
                "ignored {} additional root namespace(s): {}",
                extra_roots.len(),
                ids.join(", ")
            )?;
        }

        Ok(())
    }

    /// Tree followed by the summary footer, as a [`fmt::Display`] value
    #[must_use]
    pub const fn display<'r>(&'r self, report: &'r ScanReport) -> RenderedTree<'r, 'a> {
        RenderedTree {
            renderer: self,
            report,
        }
    }

    /// Render the tree and the summary into a string
    #[must_use]
    pub fn render_to_string(&self, report: &ScanReport) -> String {
        self.display(report).to_string()
    }
}

/// Display adapter returned by [`TreeRenderer::display`]
pub struct RenderedTree<'r, 'a> {
    renderer: &'r TreeRenderer<'a>,
    report: &'r ScanReport,
}

impl fmt::Display for RenderedTree<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.renderer.render(f)?;
        self.renderer.render_summary(f, self.report)
    }
}

impl fmt::Debug for TreeRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeRenderer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
