//! Store events
//!
//! Every mutation pushes an event onto the store's internal queue. The
//! facade drains the queue after each operation and routes content changes
//! into binding invalidation.

use crate::group::{GroupId, PageId};
use casework_schema::SectionId;

/// A committed document store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A group was created
    GroupCreated {
        /// The new group
        group: GroupId,
        /// Section it was created in
        section: SectionId,
    },

    /// A group was renamed
    GroupRenamed {
        /// The renamed group
        group: GroupId,
    },

    /// A group's page membership or page order changed
    GroupContentChanged {
        /// The affected group
        group: GroupId,
    },

    /// Sibling group ranks in a section were replaced
    GroupsReordered {
        /// The affected section
        section: SectionId,
    },

    /// A group and all of its pages were removed
    GroupDeleted {
        /// The removed group
        group: GroupId,
        /// Section it belonged to
        section: SectionId,
        /// Pages that were removed with it
        pages: Vec<PageId>,
    },
}

impl StoreEvent {
    /// The group this event concerns, if it concerns a single group
    #[must_use]
    pub fn group(&self) -> Option<GroupId> {
        match self {
            Self::GroupCreated { group, .. }
            | Self::GroupRenamed { group }
            | Self::GroupContentChanged { group }
            | Self::GroupDeleted { group, .. } => Some(*group),
            Self::GroupsReordered { .. } => None,
        }
    }
}
