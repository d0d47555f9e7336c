//! Module review lifecycle
//!
//! Transition legality is table-driven; anything not listed is illegal.
//! Modules are never reset to `Pending`; re-extraction replaces fields in
//! place (replace, don't resurrect).

use crate::error::VerifyError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an evidence module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleState {
    /// No extraction delivered yet
    Pending,
    /// Fields populated, nothing reviewed
    Extracted,
    /// Unresolved warning/error issues demand attention
    NeedsReview,
    /// Every field confirmed, rejected, or edited
    Reviewed,
    /// A bound source changed after review; trust is revoked
    Stale,
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: ModuleState) -> Vec<ModuleState> {
    use ModuleState::*;
    match from {
        Pending => vec![Extracted, NeedsReview],
        Extracted => vec![Extracted, NeedsReview, Reviewed],
        NeedsReview => vec![Extracted, NeedsReview, Reviewed],
        Reviewed => vec![Extracted, NeedsReview, Stale],
        Stale => vec![Extracted, NeedsReview, Reviewed],
    }
}

/// Validate a state transition
///
/// # Errors
/// [`VerifyError::IllegalTransition`] when the target is not reachable.
pub fn validate_transition(from: ModuleState, to: ModuleState) -> Result<(), VerifyError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(VerifyError::IllegalTransition { from, to })
    }
}

fn allowed(from: ModuleState, to: ModuleState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ModuleState::*;

    #[test]
    fn pending_reaches_extraction_only() {
        assert!(validate_transition(Pending, Extracted).is_ok());
        assert!(validate_transition(Pending, NeedsReview).is_ok());
        assert!(validate_transition(Pending, Reviewed).is_err());
        assert!(validate_transition(Pending, Stale).is_err());
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in [Extracted, NeedsReview, Reviewed, Stale] {
            assert!(
                validate_transition(from, Pending).is_err(),
                "{from:?} must not return to pending"
            );
        }
    }

    #[test]
    fn stale_only_from_reviewed() {
        assert!(validate_transition(Reviewed, Stale).is_ok());
        for from in [Pending, Extracted, NeedsReview, Stale] {
            assert!(validate_transition(from, Stale).is_err());
        }
    }

    #[test]
    fn stale_passes_back_through_review() {
        assert!(validate_transition(Stale, Reviewed).is_ok());
        assert!(validate_transition(Stale, Extracted).is_ok());
    }

    #[test]
    fn re_extraction_is_a_replace() {
        assert!(validate_transition(Extracted, Extracted).is_ok());
        assert!(validate_transition(Reviewed, Extracted).is_ok());
    }
}
