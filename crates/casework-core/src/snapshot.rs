//! Render snapshots for the UI layer
//!
//! Value views of the current board and modules. The core exposes these
//! and accepts operation calls; it renders nothing itself.

use casework_binding::BindingRegistry;
use casework_document::{DocumentStore, GroupId, PageId, ReviewStatus};
use casework_schema::SectionId;
use casework_verify::{ModuleSnapshot, PageIndex, VerificationEngine};
use serde::Serialize;

/// Page-existence lookup backed by the live document store
///
/// Realizes the engine's weak references: module snapshots re-validate
/// their page ids through this on every read, never from a cache.
pub(crate) struct StorePages<'a>(pub(crate) &'a DocumentStore);

impl PageIndex for StorePages<'_> {
    fn contains_page(&self, page: PageId) -> bool {
        self.0.contains_page(page)
    }
}

/// Render view of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub id: PageId,
    pub filename: String,
}

/// Render view of one document group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub id: GroupId,
    pub title: String,
    pub review: ReviewStatus,
    pub bound: bool,
    pub pages: Vec<PageView>,
}

/// Render view of one section and its groups in rank order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub id: SectionId,
    pub groups: Vec<GroupView>,
}

/// Complete render view of the case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSnapshot {
    pub sections: Vec<SectionView>,
    pub modules: Vec<ModuleSnapshot>,
}

pub(crate) fn build_snapshot(
    store: &DocumentStore,
    registry: &BindingRegistry,
    engine: &VerificationEngine,
) -> CaseSnapshot {
    let sections = store
        .sections()
        .into_iter()
        .map(|section| {
            let groups = store
                .groups_in_section(&section)
                .into_iter()
                .map(|g| GroupView {
                    id: g.id,
                    title: g.title.clone(),
                    review: g.review,
                    bound: registry.is_bound(g.id),
                    pages: g
                        .pages
                        .iter()
                        .map(|p| PageView {
                            id: p.id,
                            filename: p.filename.clone(),
                        })
                        .collect(),
                })
                .collect();
            SectionView {
                id: section,
                groups,
            }
        })
        .collect();

    let pages = StorePages(store);
    let modules = engine.modules().map(|m| m.snapshot(&pages)).collect();

    CaseSnapshot { sections, modules }
}
