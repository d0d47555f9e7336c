//! Property tests for document store invariants
//!
//! Drives the store with arbitrary operation sequences and checks that the
//! structural invariants hold regardless of which operations succeeded:
//!
//! - title uniqueness (case-insensitive) within a section
//! - strict total rank order among sibling groups
//! - exclusive page ownership

use casework_document::{DocumentStore, GroupId, PageId, PayloadRef};
use casework_schema::SectionId;
use proptest::prelude::*;
use std::collections::HashSet;

/// One scripted operation; indices are resolved against live state modulo
/// the current population, so scripts stay valid as groups come and go.
#[derive(Debug, Clone)]
enum Op {
    Create { section: u8, title: u8 },
    Rename { group: u8, title: u8 },
    AddPage { group: u8 },
    MovePage { page: u8, dest: u8, index: u8 },
    Reorder { section: u8, rotation: u8 },
    Merge { source: u8, dest: u8 },
    Split { group: u8, title: u8 },
    Delete { group: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<u8>()).prop_map(|(section, title)| Op::Create { section, title }),
        (any::<u8>(), any::<u8>()).prop_map(|(group, title)| Op::Rename { group, title }),
        any::<u8>().prop_map(|group| Op::AddPage { group }),
        (any::<u8>(), any::<u8>(), any::<u8>())
            .prop_map(|(page, dest, index)| Op::MovePage { page, dest, index }),
        (any::<u8>(), any::<u8>()).prop_map(|(section, rotation)| Op::Reorder { section, rotation }),
        (any::<u8>(), any::<u8>()).prop_map(|(source, dest)| Op::Merge { source, dest }),
        (any::<u8>(), any::<u8>()).prop_map(|(group, title)| Op::Split { group, title }),
        any::<u8>().prop_map(|group| Op::Delete { group }),
    ]
}

const SECTIONS: &[&str] = &["identity", "finances", "employment"];
const TITLES: &[&str] = &[
    "Passport",
    "passport",
    "Bank Statements",
    "Payslips",
    "BRP Card",
    "Tenancy Agreement",
];

fn pick_section(index: u8) -> SectionId {
    SectionId::new(SECTIONS[index as usize % SECTIONS.len()])
}

fn pick_title(index: u8) -> &'static str {
    TITLES[index as usize % TITLES.len()]
}

fn pick_group(store: &DocumentStore, index: u8) -> Option<GroupId> {
    let mut ids: Vec<GroupId> = Vec::new();
    for section in store.sections() {
        ids.extend(store.groups_in_section(&section).iter().map(|g| g.id));
    }
    if ids.is_empty() {
        None
    } else {
        Some(ids[index as usize % ids.len()])
    }
}

fn pick_page(store: &DocumentStore, index: u8) -> Option<(GroupId, PageId)> {
    let mut pages: Vec<(GroupId, PageId)> = Vec::new();
    for section in store.sections() {
        for group in store.groups_in_section(&section) {
            pages.extend(group.page_ids().into_iter().map(|p| (group.id, p)));
        }
    }
    if pages.is_empty() {
        None
    } else {
        Some(pages[index as usize % pages.len()])
    }
}

/// Apply a script, ignoring recoverable errors: the invariants must hold
/// no matter which operations were rejected.
fn apply(store: &mut DocumentStore, ops: &[Op]) {
    let mut upload = 0u32;
    for op in ops {
        match op {
            Op::Create { section, title } => {
                let _ = store.create_group(pick_section(*section), pick_title(*title));
            }
            Op::Rename { group, title } => {
                if let Some(id) = pick_group(store, *group) {
                    let _ = store.rename_group(id, pick_title(*title));
                }
            }
            Op::AddPage { group } => {
                if let Some(id) = pick_group(store, *group) {
                    upload += 1;
                    let _ = store.add_page(
                        id,
                        format!("upload-{upload}.png"),
                        PayloadRef::new(format!("blob:{upload}")),
                    );
                }
            }
            Op::MovePage { page, dest, index } => {
                if let (Some((from, page)), Some(to)) =
                    (pick_page(store, *page), pick_group(store, *dest))
                {
                    let _ = store.move_page(page, from, to, *index as usize);
                }
            }
            Op::Reorder { section, rotation } => {
                let section = pick_section(*section);
                let mut order: Vec<GroupId> = store
                    .groups_in_section(&section)
                    .iter()
                    .map(|g| g.id)
                    .collect();
                if !order.is_empty() {
                    let len = order.len();
                    order.rotate_left(*rotation as usize % len);
                    let _ = store.reorder_groups(&section, &order);
                }
            }
            Op::Merge { source, dest } => {
                if let (Some(a), Some(b)) =
                    (pick_group(store, *source), pick_group(store, *dest))
                {
                    let _ = store.merge_groups(a, b);
                }
            }
            Op::Split { group, title } => {
                if let Some(id) = pick_group(store, *group) {
                    let pages = store.group(id).map(|g| g.page_ids()).unwrap_or_default();
                    let half: Vec<PageId> = pages.iter().take(pages.len() / 2).copied().collect();
                    let _ = store.split_group(id, &half, pick_title(*title));
                }
            }
            Op::Delete { group } => {
                if let Some(id) = pick_group(store, *group) {
                    let _ = store.delete_group(id);
                }
            }
        }
    }
}

proptest! {
    /// Property: no two groups in a section share a case-insensitive title.
    #[test]
    fn titles_stay_unique_per_section(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = DocumentStore::new();
        apply(&mut store, &ops);

        for section in store.sections() {
            let mut seen = HashSet::new();
            for group in store.groups_in_section(&section) {
                prop_assert!(
                    seen.insert(group.title.to_lowercase()),
                    "duplicate title {:?} in section {}",
                    group.title,
                    section
                );
            }
        }
    }

    /// Property: sibling ranks form a strict total order with no ties.
    #[test]
    fn ranks_stay_strictly_ordered(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = DocumentStore::new();
        apply(&mut store, &ops);

        for section in store.sections() {
            let mut seen = HashSet::new();
            for group in store.groups_in_section(&section) {
                prop_assert!(
                    seen.insert(group.rank),
                    "duplicate rank {} in section {}",
                    group.rank,
                    section
                );
            }
        }
    }

    /// Property: every page belongs to exactly one group at any instant.
    #[test]
    fn pages_have_exactly_one_owner(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = DocumentStore::new();
        apply(&mut store, &ops);

        let mut seen = HashSet::new();
        for section in store.sections() {
            for group in store.groups_in_section(&section) {
                for page in group.page_ids() {
                    prop_assert!(seen.insert(page), "page {page} owned by two groups");
                }
            }
        }
    }

    /// Property: after a successful move the prior group no longer lists
    /// the page.
    #[test]
    fn move_transfers_ownership(ops in prop::collection::vec(op_strategy(), 0..40), index in any::<u8>()) {
        let mut store = DocumentStore::new();
        apply(&mut store, &ops);

        if let (Some((from, page)), Some(to)) = (pick_page(&store, 7), pick_group(&store, 13)) {
            if store.move_page(page, from, to, index as usize).is_ok() && from != to {
                prop_assert!(!store.group(from).unwrap().contains_page(page));
                prop_assert!(store.group(to).unwrap().contains_page(page));
            }
        }
    }
}
