//! Error type for the workbench facade
//!
//! Aggregates member-crate errors. Everything here is local and
//! recoverable: a failed operation leaves the workbench unchanged.

use casework_document::{DragError, StoreError};
use casework_schema::CatalogError;
use casework_verify::VerifyError;

/// Main workbench error type
#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    /// Document store rejected the operation
    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    /// Drag gesture could not be resolved
    #[error("drag resolution error: {0}")]
    Drag(#[from] DragError),

    /// Verification engine rejected the operation
    #[error("verification error: {0}")]
    Verify(#[from] VerifyError),

    /// Schema catalog lookup failed
    #[error("schema catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use casework_document::GroupId;

    #[test]
    fn store_error_display_passes_through() {
        let err = WorkbenchError::from(StoreError::GroupNotFound(GroupId::new()));
        assert!(err.to_string().starts_with("document store error"));
    }
}
