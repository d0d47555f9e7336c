//! Casework Schema Catalogs
//!
//! Read-only catalogs describing what evidence a visa route requires:
//!
//! - [`VisaRoute`]: one immigration route with its checklist sections
//! - [`ChecklistSection`]: a named section drawing on evidence templates
//! - [`EvidenceTemplate`]: one document-type requirement with field specs
//! - [`SchemaCatalog`]: the loaded catalog, parsed from JSON
//!
//! The catalog is input data for the rest of the workspace. Nothing in this
//! crate mutates it after load.
//!
//! # Example
//!
//! ```rust,ignore
//! use casework_schema::SchemaCatalog;
//!
//! let catalog = SchemaCatalog::from_json(include_str!("routes.json"))?;
//! let route = catalog.route("skilled-worker")?;
//! for section in &route.sections {
//!     println!("{}: {} templates", section.title, section.templates.len());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod catalog;
mod route;
mod template;

pub use catalog::{CatalogError, SchemaCatalog};
pub use route::{ChecklistSection, RouteId, SectionId, VisaRoute};
pub use template::{DocTypeTag, EvidenceTemplate, FieldKey, FieldKind, FieldSpec};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
