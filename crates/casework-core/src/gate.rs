//! Confirmation/warning gate
//!
//! A stateless decision function consulted before any mutation that would
//! affect a bound or already-reviewed group. Binding warnings are always
//! soft (the user can override); [`GateDecision::Block`] is reserved for
//! structurally invalid requests.
//!
//! The two-phase request/accept protocol lives on the workbench: the gate
//! only decides, it never holds state, which keeps it drivable headlessly
//! in tests.

use casework_binding::Binding;
use casework_document::GroupId;
use casework_verify::ModuleId;

/// A mutation that may need confirmation before it applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationIntent {
    /// Rename a document group
    RenameGroup {
        /// Affected group
        group: GroupId,
        /// Requested title
        new_title: String,
    },
    /// Delete a document group and all its pages
    DeleteGroup {
        /// Affected group
        group: GroupId,
    },
    /// Complete review of an evidence module
    CompleteReview {
        /// Affected module
        module: ModuleId,
    },
}

impl MutationIntent {
    /// Short human-readable description for prompts
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::RenameGroup { new_title, .. } => {
                format!("rename document group to \"{new_title}\"")
            }
            Self::DeleteGroup { .. } => "delete document group".to_string(),
            Self::CompleteReview { .. } => "complete evidence review".to_string(),
        }
    }
}

/// Payload handed to the caller to render a confirmation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    /// The mutation awaiting confirmation
    pub intent: MutationIntent,
    /// Human-readable list of affected consumers
    pub affected: Vec<String>,
}

/// Why a request was rejected outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The named group does not exist
    GroupMissing(GroupId),
    /// The named module does not exist
    ModuleMissing(ModuleId),
}

/// Outcome of consulting the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Nothing depends on the target; apply silently
    Proceed,
    /// Soft warning; apply only after an explicit accept
    Confirm(ConfirmationRequest),
    /// Structurally invalid request; never used for binding warnings
    Block(BlockReason),
}

/// Decide whether a group mutation may proceed
///
/// `reviewed_guard` is whether already-reviewed groups warrant confirmation
/// even without bindings (configuration-driven). `remaining_pages` matters
/// only for deletion: a group still holding pages never deletes silently.
#[must_use]
pub fn evaluate_group_mutation(
    intent: MutationIntent,
    group_exists: bool,
    group_reviewed: bool,
    reviewed_guard: bool,
    remaining_pages: usize,
    bindings: &[Binding],
) -> GateDecision {
    let group = match &intent {
        MutationIntent::RenameGroup { group, .. } | MutationIntent::DeleteGroup { group } => *group,
        MutationIntent::CompleteReview { .. } => {
            // Review completion is gated by evaluate_review_completion.
            return GateDecision::Proceed;
        }
    };

    if !group_exists {
        return GateDecision::Block(BlockReason::GroupMissing(group));
    }

    let mut affected: Vec<String> = bindings.iter().map(Binding::label).collect();
    if group_reviewed && reviewed_guard {
        affected.push("reviewed document group".to_string());
    }
    if remaining_pages > 0 && matches!(intent, MutationIntent::DeleteGroup { .. }) {
        affected.push(format!("{remaining_pages} uploaded page(s)"));
    }

    if affected.is_empty() {
        GateDecision::Proceed
    } else {
        tracing::warn!(
            group = %group,
            consumers = affected.len(),
            "mutation requires confirmation"
        );
        GateDecision::Confirm(ConfirmationRequest { intent, affected })
    }
}

/// Decide whether completing review of a module may proceed
///
/// Confirming a module that carries stale fields or a pending re-analysis
/// flag is allowed, but only after the caseworker acknowledges what they
/// are signing off despite.
#[must_use]
pub fn evaluate_review_completion(
    intent: MutationIntent,
    module_exists: bool,
    stale_fields: usize,
    needs_reanalysis: bool,
) -> GateDecision {
    let MutationIntent::CompleteReview { module } = &intent else {
        return GateDecision::Proceed;
    };
    let module = *module;

    if !module_exists {
        return GateDecision::Block(BlockReason::ModuleMissing(module));
    }

    let mut affected = Vec::new();
    if stale_fields > 0 {
        affected.push(format!("{stale_fields} field(s) backed by removed pages"));
    }
    if needs_reanalysis {
        affected.push("source documents changed since extraction".to_string());
    }

    if affected.is_empty() {
        GateDecision::Proceed
    } else {
        tracing::warn!(module = %module, "review completion requires confirmation");
        GateDecision::Confirm(ConfirmationRequest { intent, affected })
    }
}
