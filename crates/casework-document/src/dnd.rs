//! Drag-and-drop resolution
//!
//! [`resolve_drag`] is a pure transition function: it maps a drag gesture
//! onto a [`StoreCommand`] plus the layout that results from applying it.
//! It never mutates the store, which keeps every resolution rule testable
//! in isolation, and it reads no clock and no randomness, so identical
//! inputs always produce identical outcomes.

use crate::group::{GroupId, PageId};
use casework_schema::SectionId;

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragItem {
    /// A single page
    Page(PageId),
    /// A whole group (by its header)
    Group(GroupId),
}

/// What the item was dropped on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Another page
    Page(PageId),
    /// A group header
    Group(GroupId),
    /// The empty gutter of a section
    SectionGutter(SectionId),
}

/// Where relative to the target the item landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    /// Before the target
    Before,
    /// After the target
    After,
    /// Into the target container
    Into,
}

/// One complete drag gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEvent {
    /// Dragged item
    pub item: DragItem,
    /// Drop target
    pub target: DropTarget,
    /// Drop position
    pub position: DropPosition,
}

/// Value snapshot of one group for layout purposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutGroup {
    /// Group identifier
    pub id: GroupId,
    /// Owning section
    pub section: SectionId,
    /// Ordered page ids
    pub pages: Vec<PageId>,
    /// Whether the group has active bindings (supplied by the caller)
    pub bound: bool,
}

/// Value snapshot of the whole board: groups in section-major rank order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// Groups in display order
    pub groups: Vec<LayoutGroup>,
}

impl Layout {
    /// Build a layout from groups in display order
    #[inline]
    #[must_use]
    pub fn new(groups: Vec<LayoutGroup>) -> Self {
        Self { groups }
    }

    /// Look up a group by id
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&LayoutGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Locate a page: (group index in layout, page index in group)
    #[must_use]
    pub fn locate_page(&self, page: PageId) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(gi, g)| {
            g.pages.iter().position(|p| *p == page).map(|pi| (gi, pi))
        })
    }

    /// Group ids of a section in display order
    #[must_use]
    pub fn section_order(&self, section: &SectionId) -> Vec<GroupId> {
        self.groups
            .iter()
            .filter(|g| &g.section == section)
            .map(|g| g.id)
            .collect()
    }
}

/// Store mutation derived from a drag gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    /// Re-parent or reposition a page
    MovePage {
        /// Page to move
        page: PageId,
        /// Current owner
        from: GroupId,
        /// New owner (equal to `from` for a local reorder)
        to: GroupId,
        /// Post-detach insertion index in the destination
        index: usize,
    },
    /// Replace a section's group order
    ReorderGroups {
        /// Affected section
        section: SectionId,
        /// New complete order
        order: Vec<GroupId>,
    },
}

/// What to do with a group emptied by the move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Nothing was emptied
    None,
    /// The emptied group has no bindings: delete it after the move
    AutoDelete(GroupId),
    /// The emptied group is bound: deletion must go through the gate
    Deferred(GroupId),
}

/// Result of resolving a drag gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOutcome {
    /// Layout after the command (and any auto-delete) is applied
    pub next_layout: Layout,
    /// Command for the store
    pub command: StoreCommand,
    /// Cleanup intent for an emptied source group
    pub cleanup: Cleanup,
}

/// Drag resolution errors
#[derive(Debug, thiserror::Error)]
pub enum DragError {
    /// Dragged or targeted page is not in the layout
    #[error("page not found in layout: {0}")]
    PageNotFound(PageId),

    /// Dragged or targeted group is not in the layout
    #[error("group not found in layout: {0}")]
    GroupNotFound(GroupId),

    /// Groups are section-scoped; they cannot move across sections
    #[error("cannot move group across sections: {from} -> {to}")]
    CrossSectionMove {
        from: SectionId,
        to: SectionId,
    },

    /// The item/target combination has no resolution rule
    #[error("unsupported drop")]
    UnsupportedDrop,
}

/// Resolve a drag gesture against a layout snapshot
///
/// Resolution rules, in priority order:
/// 1. Page onto a page in a different group: move to that group at the
///    target's index, shifting siblings.
/// 2. Page onto a group header: move appended to the end of that group.
/// 3. Page within its own group: local reorder only.
/// 4. Group header onto a group header in the same section: reorder;
///    across sections the move is rejected.
/// 5. A move that empties an unbound group auto-deletes it; an emptied
///    bound group defers deletion to the confirmation gate.
///
/// A drop `Into` a container with no specific slot lands after the last
/// existing child.
///
/// # Errors
/// [`DragError`] for unknown items, cross-section group moves, and
/// unsupported combinations. The layout is never modified on error.
pub fn resolve_drag(layout: &Layout, event: &DragEvent) -> Result<DragOutcome, DragError> {
    match event.item {
        DragItem::Page(page) => resolve_page_drag(layout, page, event),
        DragItem::Group(group) => resolve_group_drag(layout, group, event),
    }
}

fn resolve_page_drag(
    layout: &Layout,
    page: PageId,
    event: &DragEvent,
) -> Result<DragOutcome, DragError> {
    let (src_idx, cur_idx) = layout
        .locate_page(page)
        .ok_or(DragError::PageNotFound(page))?;
    let source = &layout.groups[src_idx];

    let (dest_id, index) = match &event.target {
        DropTarget::Page(target) => {
            let (dst_idx, target_idx) = layout
                .locate_page(*target)
                .ok_or(DragError::PageNotFound(*target))?;
            let dest = &layout.groups[dst_idx];

            let slot = match event.position {
                DropPosition::Before => target_idx,
                DropPosition::After | DropPosition::Into => target_idx + 1,
            };
            if dest.id == source.id {
                // Rule 3: express the slot in post-detach coordinates.
                let slot = if slot > cur_idx { slot - 1 } else { slot };
                (source.id, slot)
            } else {
                // Rule 1
                (dest.id, slot)
            }
        }
        DropTarget::Group(target) => {
            // Rule 2: append to the end of the targeted group.
            let dest = layout
                .group(*target)
                .ok_or(DragError::GroupNotFound(*target))?;
            let end = if dest.id == source.id {
                dest.pages.len() - 1
            } else {
                dest.pages.len()
            };
            (dest.id, end)
        }
        DropTarget::SectionGutter(_) => return Err(DragError::UnsupportedDrop),
    };

    let command = StoreCommand::MovePage {
        page,
        from: source.id,
        to: dest_id,
        index,
    };

    // Rule 5: decide cleanup from the pre-move snapshot.
    let empties_source = dest_id != source.id && source.pages.len() == 1;
    let cleanup = if !empties_source {
        Cleanup::None
    } else if source.bound {
        Cleanup::Deferred(source.id)
    } else {
        Cleanup::AutoDelete(source.id)
    };

    let mut next = layout.clone();
    apply_move(&mut next, page, source.id, dest_id, index);
    if let Cleanup::AutoDelete(emptied) = cleanup {
        next.groups.retain(|g| g.id != emptied);
    }

    Ok(DragOutcome {
        next_layout: next,
        command,
        cleanup,
    })
}

fn resolve_group_drag(
    layout: &Layout,
    group: GroupId,
    event: &DragEvent,
) -> Result<DragOutcome, DragError> {
    let DropTarget::Group(target) = &event.target else {
        return Err(DragError::UnsupportedDrop);
    };

    let source = layout
        .group(group)
        .ok_or(DragError::GroupNotFound(group))?;
    let dest = layout
        .group(*target)
        .ok_or(DragError::GroupNotFound(*target))?;

    if source.section != dest.section {
        return Err(DragError::CrossSectionMove {
            from: source.section.clone(),
            to: dest.section.clone(),
        });
    }

    if source.id == dest.id {
        // Dropping a group on itself keeps the current order.
        return Ok(DragOutcome {
            next_layout: layout.clone(),
            command: StoreCommand::ReorderGroups {
                section: source.section.clone(),
                order: layout.section_order(&source.section),
            },
            cleanup: Cleanup::None,
        });
    }

    let mut order = layout.section_order(&source.section);
    order.retain(|id| *id != group);
    let anchor = order
        .iter()
        .position(|id| id == target)
        .unwrap_or(order.len());
    let slot = match event.position {
        DropPosition::Before => anchor,
        DropPosition::After | DropPosition::Into => anchor + 1,
    };
    order.insert(slot.min(order.len()), group);

    let command = StoreCommand::ReorderGroups {
        section: source.section.clone(),
        order: order.clone(),
    };

    let mut next = layout.clone();
    apply_section_order(&mut next, &source.section, &order);

    Ok(DragOutcome {
        next_layout: next,
        command,
        cleanup: Cleanup::None,
    })
}

/// Apply a page move to a layout value
fn apply_move(layout: &mut Layout, page: PageId, from: GroupId, to: GroupId, index: usize) {
    if let Some(group) = layout.groups.iter_mut().find(|g| g.id == from) {
        group.pages.retain(|p| *p != page);
    }
    if let Some(group) = layout.groups.iter_mut().find(|g| g.id == to) {
        let index = index.min(group.pages.len());
        group.pages.insert(index, page);
    }
}

/// Rewrite a section's groups into the given order, keeping their slots
/// within the overall layout
fn apply_section_order(layout: &mut Layout, section: &SectionId, order: &[GroupId]) {
    let slots: Vec<usize> = layout
        .groups
        .iter()
        .enumerate()
        .filter(|(_, g)| &g.section == section)
        .map(|(i, _)| i)
        .collect();

    let reordered: Vec<LayoutGroup> = order
        .iter()
        .filter_map(|id| layout.groups.iter().find(|g| g.id == *id).cloned())
        .collect();

    for (slot, group) in slots.into_iter().zip(reordered) {
        layout.groups[slot] = group;
    }
}
