//! Binding registry
//!
//! A binding is a reference from a [`GroupId`] to a consumer. The
//! distinguishing behavior between the two consumer kinds is only the
//! display label, so a tagged variant is all that is needed.

use casework_document::GroupId;
use casework_schema::SectionId;
use serde::{Deserialize, Serialize};

/// A consumer reference held against a document group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Binding {
    /// A named checklist section draws evidence from the group
    Section {
        /// The consuming section
        section: SectionId,
    },
    /// The overall case assessment draws on the group
    Assessment,
}

impl Binding {
    /// Binding to a checklist section
    #[inline]
    #[must_use]
    pub fn section(id: SectionId) -> Self {
        Self::Section { section: id }
    }

    /// Human-readable consumer label, used in confirmation prompts
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Section { section } => format!("checklist section \"{section}\""),
            Self::Assessment => "case assessment".to_string(),
        }
    }
}

/// Registry of group-to-consumer bindings
///
/// Many-to-many: a group may back multiple consumers and a consumer may
/// draw from multiple groups. Bindings are kept in recorded order per
/// group so invalidation and confirmation payloads are stable.
#[derive(Debug, Default, Clone)]
pub struct BindingRegistry {
    bindings: indexmap::IndexMap<GroupId, Vec<Binding>>,
}

impl BindingRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings held against a group, in recorded order
    ///
    /// Total: returns an empty slice when the group has none.
    #[inline]
    #[must_use]
    pub fn bindings_for(&self, group: GroupId) -> &[Binding] {
        self.bindings.get(&group).map_or(&[], Vec::as_slice)
    }

    /// Whether the group has at least one binding
    #[inline]
    #[must_use]
    pub fn is_bound(&self, group: GroupId) -> bool {
        !self.bindings_for(group).is_empty()
    }

    /// Record a binding; recording an existing (group, consumer) pair is a
    /// no-op
    ///
    /// Returns `true` if the binding was newly recorded.
    pub fn record(&mut self, group: GroupId, binding: Binding) -> bool {
        let entry = self.bindings.entry(group).or_default();
        if entry.contains(&binding) {
            return false;
        }
        tracing::debug!(group = %group, consumer = %binding.label(), "binding recorded");
        entry.push(binding);
        true
    }

    /// Release one binding
    ///
    /// Returns `true` if the binding existed.
    pub fn release(&mut self, group: GroupId, binding: &Binding) -> bool {
        let Some(entry) = self.bindings.get_mut(&group) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|b| b != binding);
        let released = entry.len() != before;
        if entry.is_empty() {
            self.bindings.shift_remove(&group);
        }
        if released {
            tracing::debug!(group = %group, consumer = %binding.label(), "binding released");
        }
        released
    }

    /// Consumers affected by a content change or rename of the group
    ///
    /// The bindings themselves stay in place; the caller forwards each
    /// returned consumer to the verification engine as a needs-re-analysis
    /// signal.
    #[must_use]
    pub fn invalidate(&self, group: GroupId) -> Vec<Binding> {
        let affected = self.bindings_for(group).to_vec();
        if !affected.is_empty() {
            tracing::debug!(group = %group, consumers = affected.len(), "invalidation raised");
        }
        affected
    }

    /// Deletion path: return every consumer (so each can be invalidated
    /// once before the reference disappears) and drop all bindings for the
    /// group
    pub fn release_group(&mut self, group: GroupId) -> Vec<Binding> {
        let released = self.bindings.shift_remove(&group).unwrap_or_default();
        if !released.is_empty() {
            tracing::debug!(group = %group, consumers = released.len(), "group bindings released");
        }
        released
    }

    /// Groups currently bound to a consumer, in registry order
    #[must_use]
    pub fn groups_for(&self, consumer: &Binding) -> Vec<GroupId> {
        self.bindings
            .iter()
            .filter(|(_, bindings)| bindings.contains(consumer))
            .map(|(group, _)| *group)
            .collect()
    }

    /// Number of groups with at least one binding
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no group is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
