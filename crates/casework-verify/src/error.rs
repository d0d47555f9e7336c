//! Error types for the verification engine

use crate::module::{IssueId, ModuleId};
use crate::state::ModuleState;
use casework_schema::FieldKey;

/// Verification engine errors
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Referenced module no longer exists
    #[error("module not found: {0}")]
    ModuleNotFound(ModuleId),

    /// Field key is not part of the module
    #[error("field {key} not found on module {module}")]
    FieldNotFound { module: ModuleId, key: FieldKey },

    /// Issue id is not part of the module
    #[error("issue {issue} not found on module {module}")]
    IssueNotFound { module: ModuleId, issue: IssueId },

    /// Extraction delivered a field the template does not define
    #[error("extraction produced unknown field {key} for module {module}")]
    UnknownField { module: ModuleId, key: FieldKey },

    /// Review completion attempted with unverified fields remaining
    #[error("incomplete review on module {module}: {unverified:?} still unverified")]
    IncompleteReview {
        module: ModuleId,
        unverified: Vec<FieldKey>,
    },

    /// Target state is not reachable from the current state
    #[error("illegal state transition: {from:?} -> {to:?}")]
    IllegalTransition { from: ModuleState, to: ModuleState },

    /// `edited` verification requires a replacement value
    #[error("edited verification of {key} requires a value")]
    EditValueRequired { key: FieldKey },

    /// The schema marks this field as not caseworker-editable
    #[error("field {key} is not editable")]
    FieldNotEditable { key: FieldKey },

    /// Fields cannot be set back to unverified
    #[error("cannot set field {key} back to unverified")]
    InvalidVerification { key: FieldKey },
}
