//! Casework Binding Registry
//!
//! Tracks which document groups back which checklist consumers, gates
//! destructive operations, and fans content changes out as invalidation.
//!
//! # Core Concepts
//!
//! - [`Binding`]: a reference from a group to a consumer (a checklist
//!   section or the case assessment)
//! - [`BindingRegistry`]: the per-case registry of those references
//!
//! The registry holds ids only; it never owns groups or modules. The facade
//! routes the consumers returned by [`BindingRegistry::invalidate`] into
//! the verification engine.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod registry;

pub use registry::{Binding, BindingRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
