//! Discovery and rendering configuration

use serde::{Deserialize, Serialize};

use nstree_core::{Error, NamespaceKind, Result};

/// What to do when a process's namespace file cannot be opened for a
/// reason other than the process having exited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnreadablePolicy {
    /// Abort the whole scan
    #[default]
    Abort,
    /// Skip the process and count it in the report
    Skip,
}

/// Discovery configuration
///
/// Where processes come from is decided by the [`NamespaceSource`] handed
/// to the discoverer, not by this configuration.
///
/// [`NamespaceSource`]: crate::NamespaceSource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Namespace kind to inspect
    pub kind: NamespaceKind,

    /// Policy for unreadable namespace handles
    pub unreadable: UnreadablePolicy,
}

impl DiscoveryConfig {
    /// Create a new discovery configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the namespace kind
    #[must_use]
    pub const fn with_kind(mut self, kind: NamespaceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Select the unreadable-handle policy
    #[must_use]
    pub const fn with_unreadable(mut self, policy: UnreadablePolicy) -> Self {
        self.unreadable = policy;
        self
    }
}

/// Tree rendering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Display width used for wrapping member lists
    pub width: usize,

    /// Spaces of indentation per tree level
    pub indent_step: usize,

    /// Spaces between a node's indentation and its member label
    pub label_indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 80,
            indent_step: 4,
            label_indent: 12,
        }
    }
}

impl RenderOptions {
    /// Narrowest width that still leaves room for the label column
    pub const MIN_WIDTH: usize = 40;

    /// Create default rendering options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wrap width
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set the per-level indentation
    #[must_use]
    pub const fn with_indent_step(mut self, step: usize) -> Self {
        self.indent_step = step;
        self
    }

    /// Check the options are usable
    ///
    /// # Errors
    /// Returns error if the width is too narrow or the indentation is zero
    pub fn validate(&self) -> Result<()> {
        if self.width < Self::MIN_WIDTH {
            return Err(Error::InvalidConfig {
                message: format!(
                    "Display width {} is too narrow (min {})",
                    self.width,
                    Self::MIN_WIDTH
                ),
            });
        }

        if self.indent_step == 0 {
            return Err(Error::InvalidConfig {
                message: "Indentation step must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.kind, NamespaceKind::Pid);
        assert_eq!(config.unreadable, UnreadablePolicy::Abort);
    }

    #[test]
    fn test_builder_pattern() {
        let config = DiscoveryConfig::new()
            .with_kind(NamespaceKind::User)
            .with_unreadable(UnreadablePolicy::Skip);

        assert_eq!(config.kind, NamespaceKind::User);
        assert_eq!(config.unreadable, UnreadablePolicy::Skip);
    }

    #[test]
    fn test_config_serde() {
        let config = DiscoveryConfig::new().with_unreadable(UnreadablePolicy::Skip);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"skip\""));
        assert!(json.contains("\"pid\""));

        let back: DiscoveryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_render_options_validation() {
        assert!(RenderOptions::default().validate().is_ok());
        assert!(RenderOptions::new().with_width(20).validate().is_err());
        assert!(RenderOptions::new().with_indent_step(0).validate().is_err());
        assert!(
            RenderOptions::new()
                .with_width(RenderOptions::MIN_WIDTH)
                .validate()
                .is_ok()
        );
    }
}
