//! Workbench configuration

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::CaseWorkbench`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// Delete a group automatically when a drag move empties it and it has
    /// no bindings. A bound group is never auto-deleted regardless of this
    /// setting.
    pub auto_delete_empty_groups: bool,
    /// Require confirmation for destructive edits to a group a caseworker
    /// has already marked reviewed, even when the group has no bindings.
    pub confirm_reviewed_group_edits: bool,
}

impl WorkbenchConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With auto-delete of emptied unbound groups
    #[inline]
    #[must_use]
    pub fn with_auto_delete_empty_groups(mut self, enabled: bool) -> Self {
        self.auto_delete_empty_groups = enabled;
        self
    }

    /// With confirmation on edits to reviewed groups
    #[inline]
    #[must_use]
    pub fn with_confirm_reviewed_group_edits(mut self, enabled: bool) -> Self {
        self.confirm_reviewed_group_edits = enabled;
        self
    }
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            auto_delete_empty_groups: true,
            confirm_reviewed_group_edits: true,
        }
    }
}
