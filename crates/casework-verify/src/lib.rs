//! Casework Verification Engine
//!
//! Tracks per-module extraction and verification state: extracted fields,
//! their provenance, detected issues, and the review lifecycle.
//!
//! # Core Concepts
//!
//! - [`VerificationEngine`]: owner of every [`EvidenceModule`]
//! - [`ModuleState`]: `pending → extracted → needs-review → reviewed`,
//!   with `stale` re-entrant from `reviewed` on invalidation
//! - [`ExtractedField`] / [`FieldSource`]: a schema datum and its
//!   provenance; manual edits supersede provenance permanently
//! - [`PageIndex`]: caller-supplied page-existence lookup that realizes
//!   the engine's weak references into the document store
//!
//! Extraction itself (OCR/ML) happens outside this workspace; the engine
//! only accepts and stores delivered results.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod engine;
mod error;
mod module;
mod state;

pub use engine::VerificationEngine;
pub use error::VerifyError;
pub use module::{
    EvidenceModule, ExtractedField, ExtractionResult, FieldExtraction, FieldSnapshot,
    FieldSource, Issue, IssueId, IssueSeed, ModuleId, ModuleSnapshot, PageIndex, Region,
    Severity, VerificationStatus,
};
pub use state::{allowed_transitions, validate_transition, ModuleState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
