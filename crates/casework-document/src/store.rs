//! The document store
//!
//! Owns every [`DocumentGroup`] and [`Page`] lifetime in the process. All
//! mutations are synchronous, validate before touching state, and push a
//! [`StoreEvent`] for the facade to drain.

use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::group::{DocumentGroup, GroupId, Page, PageId, PayloadRef, ReviewStatus};
use casework_schema::SectionId;
use indexmap::IndexMap;
use std::collections::HashSet;

/// In-memory store of document groups and their pages
///
/// The store enforces the structural invariants of the data model:
/// case-insensitive title uniqueness per section, strict total rank order
/// among siblings, and exclusive page ownership. Policy questions (which
/// mutations need confirmation) live above it in the gate.
#[derive(Debug, Default)]
pub struct DocumentStore {
    groups: IndexMap<GroupId, DocumentGroup>,
    events: Vec<StoreEvent>,
}

impl DocumentStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Look up a group
    #[inline]
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&DocumentGroup> {
        self.groups.get(&id)
    }

    /// Groups of a section in rank order
    #[must_use]
    pub fn groups_in_section(&self, section: &SectionId) -> Vec<&DocumentGroup> {
        let mut groups: Vec<_> = self
            .groups
            .values()
            .filter(|g| &g.section == section)
            .collect();
        groups.sort_by_key(|g| g.rank);
        groups
    }

    /// Sections in first-appearance order
    #[must_use]
    pub fn sections(&self) -> Vec<SectionId> {
        let mut seen = Vec::new();
        for group in self.groups.values() {
            if !seen.contains(&group.section) {
                seen.push(group.section.clone());
            }
        }
        seen
    }

    /// Find a page and the group that owns it
    #[must_use]
    pub fn find_page(&self, page: PageId) -> Option<(GroupId, &Page)> {
        self.groups.values().find_map(|g| {
            g.pages
                .iter()
                .find(|p| p.id == page)
                .map(|p| (g.id, p))
        })
    }

    /// Whether any group owns this page
    #[inline]
    #[must_use]
    pub fn contains_page(&self, page: PageId) -> bool {
        self.find_page(page).is_some()
    }

    /// Number of groups
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the store holds no groups
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Drain all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create an empty group in a section
    ///
    /// # Errors
    /// [`StoreError::DuplicateTitle`] if the title collides
    /// case-insensitively within the section.
    pub fn create_group(
        &mut self,
        section: SectionId,
        title: impl Into<String>,
    ) -> Result<GroupId, StoreError> {
        let title = title.into();
        self.check_title(&section, &title, None)?;

        let rank = self.next_rank(&section);
        let group = DocumentGroup::new(section.clone(), title, rank);
        let id = group.id;
        self.groups.insert(id, group);

        tracing::debug!(group = %id, section = %section, "group created");
        self.events.push(StoreEvent::GroupCreated { group: id, section });
        Ok(id)
    }

    /// Rename a group
    ///
    /// The store renames unconditionally once invoked; routing a rename of a
    /// bound group through the confirmation gate is the caller's job.
    ///
    /// # Errors
    /// [`StoreError::GroupNotFound`] or [`StoreError::DuplicateTitle`].
    pub fn rename_group(
        &mut self,
        id: GroupId,
        new_title: impl Into<String>,
    ) -> Result<(), StoreError> {
        let new_title = new_title.into();
        let section = self.get(id)?.section.clone();
        self.check_title(&section, &new_title, Some(id))?;

        let group = self.get_mut(id)?;
        group.title = new_title;
        group.touch();

        tracing::debug!(group = %id, "group renamed");
        self.events.push(StoreEvent::GroupRenamed { group: id });
        Ok(())
    }

    /// Append an uploaded page to a group
    ///
    /// # Errors
    /// [`StoreError::GroupNotFound`].
    pub fn add_page(
        &mut self,
        group: GroupId,
        filename: impl Into<String>,
        payload: PayloadRef,
    ) -> Result<PageId, StoreError> {
        let target = self.get_mut(group)?;
        let page = Page::new(filename, payload);
        let id = page.id;
        target.pages.push(page);
        target.touch();

        tracing::debug!(group = %group, page = %id, "page added");
        self.events.push(StoreEvent::GroupContentChanged { group });
        Ok(id)
    }

    /// Detach a single page from whichever group owns it
    ///
    /// # Errors
    /// [`StoreError::PageNotFound`].
    pub fn remove_page(&mut self, page: PageId) -> Result<Page, StoreError> {
        let owner = self
            .find_page(page)
            .map(|(g, _)| g)
            .ok_or(StoreError::PageNotFound(page))?;

        let group = self.get_mut(owner)?;
        let index = group
            .page_index(page)
            .ok_or(StoreError::PageNotFound(page))?;
        let removed = group.pages.remove(index);
        group.touch();

        tracing::debug!(group = %owner, page = %page, "page removed");
        self.events.push(StoreEvent::GroupContentChanged { group: owner });
        Ok(removed)
    }

    /// Re-parent a page, or reposition it when `from == to`
    ///
    /// `index` is the desired position in the destination's page list after
    /// the page has been detached; it is clamped to the list length.
    ///
    /// # Errors
    /// [`StoreError::GroupNotFound`], [`StoreError::PageNotFound`], or
    /// [`StoreError::PageNotInGroup`].
    pub fn move_page(
        &mut self,
        page: PageId,
        from: GroupId,
        to: GroupId,
        index: usize,
    ) -> Result<(), StoreError> {
        // Validate everything up front so a failure leaves no partial state.
        if !self.groups.contains_key(&to) {
            return Err(StoreError::GroupNotFound(to));
        }
        let source = self.get(from)?;
        if !source.contains_page(page) {
            return Err(if self.contains_page(page) {
                StoreError::PageNotInGroup { page, group: from }
            } else {
                StoreError::PageNotFound(page)
            });
        }

        let source = self.get_mut(from)?;
        let current = source
            .page_index(page)
            .ok_or(StoreError::PageNotFound(page))?;
        let moved = source.pages.remove(current);
        source.touch();

        let dest = self.get_mut(to)?;
        let index = index.min(dest.pages.len());
        dest.pages.insert(index, moved);
        dest.touch();

        tracing::debug!(page = %page, from = %from, to = %to, index, "page moved");
        self.events.push(StoreEvent::GroupContentChanged { group: from });
        if from != to {
            self.events.push(StoreEvent::GroupContentChanged { group: to });
        }
        Ok(())
    }

    /// Replace the rank of every group in a section atomically
    ///
    /// # Errors
    /// [`StoreError::IncompleteSet`] if the supplied list omits, duplicates,
    /// or adds a member.
    pub fn reorder_groups(
        &mut self,
        section: &SectionId,
        ordered: &[GroupId],
    ) -> Result<(), StoreError> {
        let members: HashSet<GroupId> = self
            .groups
            .values()
            .filter(|g| &g.section == section)
            .map(|g| g.id)
            .collect();

        let supplied: HashSet<GroupId> = ordered.iter().copied().collect();
        if supplied.len() != ordered.len() || supplied != members {
            return Err(StoreError::IncompleteSet {
                section: section.clone(),
            });
        }

        for (rank, id) in ordered.iter().enumerate() {
            let group = self.get_mut(*id)?;
            group.rank = rank as u32;
            group.touch();
        }

        tracing::debug!(section = %section, "groups reordered");
        self.events.push(StoreEvent::GroupsReordered {
            section: section.clone(),
        });
        Ok(())
    }

    /// Append all of `source`'s pages to `dest` and delete `source`
    ///
    /// Relative page order of the source is preserved; the source's pages
    /// land after the destination's existing pages.
    ///
    /// # Errors
    /// [`StoreError::SameGroup`] or [`StoreError::GroupNotFound`].
    pub fn merge_groups(&mut self, source: GroupId, dest: GroupId) -> Result<(), StoreError> {
        if source == dest {
            return Err(StoreError::SameGroup(source));
        }
        if !self.groups.contains_key(&dest) {
            return Err(StoreError::GroupNotFound(dest));
        }

        let mut removed = self
            .groups
            .shift_remove(&source)
            .ok_or(StoreError::GroupNotFound(source))?;
        let section = removed.section.clone();

        let target = self.get_mut(dest)?;
        target.pages.append(&mut removed.pages);
        target.touch();

        tracing::debug!(source = %source, dest = %dest, "groups merged");
        self.events.push(StoreEvent::GroupContentChanged { group: dest });
        // Pages were transferred, not destroyed, so the deletion event
        // carries none.
        self.events.push(StoreEvent::GroupDeleted {
            group: source,
            section,
            pages: Vec::new(),
        });
        Ok(())
    }

    /// Move the named pages out of `group` into a newly created group
    ///
    /// The new group is created in the same section with the supplied title;
    /// relative order of the moved pages is preserved.
    ///
    /// # Errors
    /// [`StoreError::EmptySelection`], [`StoreError::GroupNotFound`],
    /// [`StoreError::PageNotInGroup`], or [`StoreError::DuplicateTitle`].
    pub fn split_group(
        &mut self,
        group: GroupId,
        pages: &[PageId],
        new_title: impl Into<String>,
    ) -> Result<GroupId, StoreError> {
        if pages.is_empty() {
            return Err(StoreError::EmptySelection);
        }
        let new_title = new_title.into();

        let source = self.get(group)?;
        let section = source.section.clone();
        for page in pages {
            if !source.contains_page(*page) {
                return Err(StoreError::PageNotInGroup {
                    page: *page,
                    group,
                });
            }
        }
        self.check_title(&section, &new_title, None)?;

        let selected: HashSet<PageId> = pages.iter().copied().collect();
        let source = self.get_mut(group)?;
        let (moved, kept): (Vec<Page>, Vec<Page>) = source
            .pages
            .drain(..)
            .partition(|p| selected.contains(&p.id));
        source.pages = kept;
        source.touch();

        let rank = self.next_rank(&section);
        let mut new_group = DocumentGroup::new(section.clone(), new_title, rank);
        new_group.pages = moved;
        let new_id = new_group.id;
        self.groups.insert(new_id, new_group);

        tracing::debug!(source = %group, new = %new_id, count = pages.len(), "group split");
        self.events.push(StoreEvent::GroupCreated {
            group: new_id,
            section,
        });
        self.events.push(StoreEvent::GroupContentChanged { group });
        Ok(new_id)
    }

    /// Remove a group and all of its pages
    ///
    /// Returns the removed page ids. The emitted [`StoreEvent::GroupDeleted`]
    /// is consumed by the binding registry so downstream consumers can react
    /// before the reference disappears.
    ///
    /// # Errors
    /// [`StoreError::GroupNotFound`].
    pub fn delete_group(&mut self, id: GroupId) -> Result<Vec<PageId>, StoreError> {
        let removed = self
            .groups
            .shift_remove(&id)
            .ok_or(StoreError::GroupNotFound(id))?;
        let pages = removed.page_ids();

        tracing::info!(group = %id, pages = pages.len(), "group deleted");
        self.events.push(StoreEvent::GroupDeleted {
            group: id,
            section: removed.section,
            pages: pages.clone(),
        });
        Ok(pages)
    }

    /// Mark a group as reviewed
    ///
    /// # Errors
    /// [`StoreError::GroupNotFound`].
    pub fn mark_reviewed(&mut self, id: GroupId) -> Result<(), StoreError> {
        let group = self.get_mut(id)?;
        group.review = ReviewStatus::Reviewed;
        group.touch();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn get(&self, id: GroupId) -> Result<&DocumentGroup, StoreError> {
        self.groups.get(&id).ok_or(StoreError::GroupNotFound(id))
    }

    fn get_mut(&mut self, id: GroupId) -> Result<&mut DocumentGroup, StoreError> {
        self.groups
            .get_mut(&id)
            .ok_or(StoreError::GroupNotFound(id))
    }

    fn next_rank(&self, section: &SectionId) -> u32 {
        self.groups
            .values()
            .filter(|g| &g.section == section)
            .map(|g| g.rank + 1)
            .max()
            .unwrap_or(0)
    }

    fn check_title(
        &self,
        section: &SectionId,
        title: &str,
        exclude: Option<GroupId>,
    ) -> Result<(), StoreError> {
        let lowered = title.to_lowercase();
        let collides = self.groups.values().any(|g| {
            &g.section == section
                && Some(g.id) != exclude
                && g.title.to_lowercase() == lowered
        });
        if collides {
            return Err(StoreError::DuplicateTitle {
                section: section.clone(),
                title: title.to_string(),
            });
        }
        Ok(())
    }
}
