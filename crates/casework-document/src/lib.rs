//! Casework Document Store
//!
//! Owns document group and page lifetimes and resolves drag-and-drop
//! gestures into store commands.
//!
//! # Core Concepts
//!
//! - [`DocumentStore`]: the single in-memory owner of groups and pages
//! - [`DocumentGroup`] / [`Page`]: a named category and its ordered uploads
//! - [`StoreEvent`]: mutation record drained by the facade for invalidation
//! - [`resolve_drag`]: pure drag-gesture resolution into a [`StoreCommand`]
//!
//! # Example
//!
//! ```rust,ignore
//! use casework_document::{DocumentStore, PayloadRef};
//! use casework_schema::SectionId;
//!
//! let mut store = DocumentStore::new();
//! let group = store.create_group(SectionId::new("identity"), "Passport")?;
//! store.add_page(group, "passport-photo.png", PayloadRef::new("blob:1"))?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod dnd;
mod error;
mod event;
mod group;
mod store;

pub use dnd::{
    resolve_drag, Cleanup, DragError, DragEvent, DragItem, DragOutcome, DropPosition,
    DropTarget, Layout, LayoutGroup, StoreCommand,
};
pub use error::StoreError;
pub use event::StoreEvent;
pub use group::{DocumentGroup, GroupId, Page, PageId, PayloadRef, ReviewStatus};
pub use store::DocumentStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
