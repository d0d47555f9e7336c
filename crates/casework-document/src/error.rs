//! Error types for the document store
//!
//! All store errors are local and recoverable: the store is unchanged when
//! an operation fails and the caller may re-issue with corrected input.

use crate::group::{GroupId, PageId};
use casework_schema::SectionId;

/// Document store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced group no longer exists
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// Referenced page no longer exists
    #[error("page not found: {0}")]
    PageNotFound(PageId),

    /// Page exists but is not owned by the named group
    #[error("page {page} is not in group {group}")]
    PageNotInGroup { page: PageId, group: GroupId },

    /// Title collides case-insensitively within the section
    #[error("duplicate title \"{title}\" in section {section}")]
    DuplicateTitle { section: SectionId, title: String },

    /// Reorder list omits, duplicates, or adds a section member
    #[error("reorder list must name every group in section {section} exactly once")]
    IncompleteSet { section: SectionId },

    /// Merge source and destination are the same group
    #[error("cannot merge group {0} into itself")]
    SameGroup(GroupId),

    /// Split was given no pages
    #[error("no pages selected")]
    EmptySelection,
}
