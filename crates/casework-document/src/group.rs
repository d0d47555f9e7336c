//! Document groups and pages
//!
//! A [`DocumentGroup`] is a named category of uploaded pages ("Passport",
//! "Bank Statements") scoped to a checklist section. Pages live inside
//! exactly one group; moving a page re-parents it, never duplicates it.

use casework_schema::SectionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique document group identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Ulid);

impl GroupId {
    /// Generate new group ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique page identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(pub Ulid);

impl PageId {
    /// Generate new page ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to externally stored file content
///
/// Upload transport and byte storage belong to the external upload
/// collaborator; this core only carries the reference around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadRef(String);

impl PayloadRef {
    /// Wrap an external payload reference
    #[inline]
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Reference as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Caseworker review status of a whole group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Not yet looked at
    #[default]
    Unreviewed,
    /// A caseworker has reviewed the group contents
    Reviewed,
}

/// One uploaded file/page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Page identifier
    pub id: PageId,
    /// Original filename as uploaded
    pub filename: String,
    /// Upload instant
    pub uploaded_at: DateTime<Utc>,
    /// External payload reference
    pub payload: PayloadRef,
}

impl Page {
    pub(crate) fn new(filename: impl Into<String>, payload: PayloadRef) -> Self {
        Self {
            id: PageId::new(),
            filename: filename.into(),
            uploaded_at: Utc::now(),
            payload,
        }
    }
}

/// A named category holding an ordered set of pages
///
/// # Invariants
/// - `title` is unique (case-insensitively) within `section`
/// - `rank` is unique among sibling groups in the same section
/// - pages are exclusively owned; the store enforces single ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentGroup {
    /// Group identifier
    pub id: GroupId,
    /// Section this group belongs to; groups never change section
    pub section: SectionId,
    /// Display title
    pub title: String,
    /// Position among sibling groups (strict total order, no ties)
    pub rank: u32,
    /// Ordered pages
    pub pages: Vec<Page>,
    /// Review status
    pub review: ReviewStatus,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last mutation instant
    pub modified_at: DateTime<Utc>,
}

impl DocumentGroup {
    pub(crate) fn new(section: SectionId, title: impl Into<String>, rank: u32) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            section,
            title: title.into(),
            rank,
            pages: Vec::new(),
            review: ReviewStatus::Unreviewed,
            created_at: now,
            modified_at: now,
        }
    }

    /// Ordered page ids
    #[must_use]
    pub fn page_ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|p| p.id).collect()
    }

    /// Index of a page within this group
    #[inline]
    #[must_use]
    pub fn page_index(&self, page: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == page)
    }

    /// Whether this group holds the page
    #[inline]
    #[must_use]
    pub fn contains_page(&self, page: PageId) -> bool {
        self.page_index(page).is_some()
    }

    /// Number of pages
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether the group has no pages left
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub(crate) fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_generation() {
        let a = GroupId::new();
        let b = GroupId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn new_group_is_empty_and_unreviewed() {
        let group = DocumentGroup::new(SectionId::new("identity"), "Passport", 0);
        assert!(group.is_empty());
        assert_eq!(group.review, ReviewStatus::Unreviewed);
        assert_eq!(group.created_at, group.modified_at);
    }

    #[test]
    fn page_index_tracks_order() {
        let mut group = DocumentGroup::new(SectionId::new("identity"), "Passport", 0);
        let first = Page::new("scan-1.png", PayloadRef::new("blob:1"));
        let second = Page::new("scan-2.png", PayloadRef::new("blob:2"));
        let first_id = first.id;
        let second_id = second.id;
        group.pages.push(first);
        group.pages.push(second);

        assert_eq!(group.page_index(first_id), Some(0));
        assert_eq!(group.page_index(second_id), Some(1));
        assert_eq!(group.page_index(PageId::new()), None);
    }
}
