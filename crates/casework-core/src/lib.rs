//! Casework Core - Case Workbench
//!
//! The central facade over the document store, binding registry, and
//! verification engine:
//! - Routes destructive intents through the confirmation gate
//! - Applies store and engine mutations atomically
//! - Fans content changes out as binding invalidation
//! - Surfaces render snapshots and invalidation notices to the UI layer
//!
//! # Example
//!
//! ```rust,ignore
//! use casework_core::{CaseWorkbench, GateOutcome, WorkbenchConfig};
//! use casework_binding::Binding;
//! use casework_schema::SectionId;
//!
//! let mut bench = CaseWorkbench::new(WorkbenchConfig::new());
//! let group = bench.create_group(SectionId::new("employment"), "Payslips")?;
//! bench.bind(group, Binding::section(SectionId::new("employment")))?;
//!
//! // Deleting a bound group needs an explicit accept.
//! match bench.request_delete(group)? {
//!     GateOutcome::Pending(pending) => bench.accept(pending)?,
//!     GateOutcome::Applied => {}
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod gate;
pub mod snapshot;
pub mod workbench;

// Re-exports for convenience
pub use config::WorkbenchConfig;
pub use error::WorkbenchError;
pub use gate::{BlockReason, ConfirmationRequest, GateDecision, MutationIntent};
pub use snapshot::{CaseSnapshot, GroupView, PageView, SectionView};
pub use workbench::{
    CaseWorkbench, DragResolution, GateOutcome, InvalidationNotice, PendingMutation,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the case workbench
    pub use crate::{
        CaseWorkbench, DragResolution, GateOutcome, InvalidationNotice, WorkbenchConfig,
        WorkbenchError,
    };
    pub use casework_binding::Binding;
    pub use casework_document::{DragEvent, DragItem, DropPosition, DropTarget, PayloadRef};
    pub use casework_schema::SectionId;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use casework_binding::Binding;
    use casework_document::PayloadRef;
    use casework_schema::SectionId;

    #[test]
    fn workbench_full_flow() {
        let mut bench = CaseWorkbench::new(WorkbenchConfig::new());
        let section = SectionId::new("employment");

        let (group, _page) = bench
            .upload_to_new_group(
                section.clone(),
                "Payslips",
                "payslip-march.pdf",
                PayloadRef::new("blob:1"),
            )
            .unwrap();
        bench.bind(group, Binding::section(section)).unwrap();

        let snapshot = bench.snapshot();
        assert_eq!(snapshot.sections.len(), 1);
        assert!(snapshot.sections[0].groups[0].bound);
    }
}
