//! Drag-and-drop flows through the workbench: resolution, cleanup, and
//! invalidation

use casework_binding::Binding;
use casework_core::{DragResolution, WorkbenchError};
use casework_document::{
    DragError, DragEvent, DragItem, DropPosition, DropTarget, PayloadRef,
};
use casework_schema::SectionId;
use casework_test_utils::{seeded_case, setup_workbench};
use casework_verify::ModuleState;

#[test]
fn page_drag_re_parents_and_auto_deletes_emptied_unbound_group() {
    let mut case = seeded_case();

    // A second, unbound group with a single page.
    let loose = case
        .bench
        .create_group(case.section.clone(), "Unsorted")
        .unwrap();
    let page = case
        .bench
        .add_page(loose, "unknown.pdf", PayloadRef::new("blob:x"))
        .unwrap();

    let resolution = case
        .bench
        .handle_drag(&DragEvent {
            item: DragItem::Page(page),
            target: DropTarget::Group(case.group),
            position: DropPosition::Into,
        })
        .unwrap();

    assert!(matches!(resolution, DragResolution::Applied));
    assert_eq!(case.bench.store().find_page(page).unwrap().0, case.group);
    // Rule 5: the emptied unbound group is gone.
    assert!(case.bench.store().group(loose).is_none());
}

#[test]
fn auto_delete_respects_configuration() {
    let mut bench = casework_core::CaseWorkbench::new(
        casework_core::WorkbenchConfig::new().with_auto_delete_empty_groups(false),
    );

    let section = SectionId::new("identity");
    let a = bench.create_group(section.clone(), "Passport").unwrap();
    let b = bench.create_group(section, "Visa").unwrap();
    let page = bench
        .add_page(a, "scan.png", PayloadRef::new("blob:1"))
        .unwrap();
    bench
        .add_page(b, "visa.png", PayloadRef::new("blob:2"))
        .unwrap();

    bench
        .handle_drag(&DragEvent {
            item: DragItem::Page(page),
            target: DropTarget::Group(b),
            position: DropPosition::Into,
        })
        .unwrap();

    // Move applied, but the emptied group survives.
    assert!(bench.store().group(a).is_some());
    assert!(bench.store().group(a).unwrap().is_empty());
}

#[test]
fn emptied_bound_group_comes_back_as_pending_delete() {
    let mut case = seeded_case();

    // Move both pages out of the bound group.
    let other = case
        .bench
        .create_group(case.section.clone(), "Archive")
        .unwrap();
    case.bench
        .add_page(other, "seed.pdf", PayloadRef::new("blob:seed"))
        .unwrap();
    case.bench
        .handle_drag(&DragEvent {
            item: DragItem::Page(case.pages[0]),
            target: DropTarget::Group(other),
            position: DropPosition::Into,
        })
        .unwrap();

    let resolution = case
        .bench
        .handle_drag(&DragEvent {
            item: DragItem::Page(case.pages[1]),
            target: DropTarget::Group(other),
            position: DropPosition::Into,
        })
        .unwrap();

    let DragResolution::AppliedWithPending(pending) = resolution else {
        panic!("emptied bound group must defer deletion to the gate");
    };
    // The move itself is committed either way.
    assert_eq!(case.bench.store().find_page(case.pages[1]).unwrap().0, other);
    assert!(case.bench.store().group(case.group).unwrap().is_empty());

    case.bench.accept(pending).unwrap();
    assert!(case.bench.store().group(case.group).is_none());
    assert!(case.bench.registry().bindings_for(case.group).is_empty());
}

#[test]
fn drag_out_of_bound_group_invalidates_its_consumers() {
    let mut case = seeded_case();
    for key in ["employer", "gross_pay"] {
        case.bench
            .set_field_verification(
                case.module,
                &casework_schema::FieldKey::new(key),
                casework_verify::VerificationStatus::Confirmed,
                None,
            )
            .unwrap();
    }
    case.bench.request_complete_review(case.module).unwrap();

    let other = case
        .bench
        .create_group(case.section.clone(), "Archive")
        .unwrap();
    case.bench
        .add_page(other, "seed.pdf", PayloadRef::new("blob:seed"))
        .unwrap();
    case.bench.take_notices();

    case.bench
        .handle_drag(&DragEvent {
            item: DragItem::Page(case.pages[0]),
            target: DropTarget::Group(other),
            position: DropPosition::Into,
        })
        .unwrap();

    assert_eq!(
        case.bench.engine().module(case.module).unwrap().state,
        ModuleState::Stale
    );
    let notices = case.bench.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].group, case.group);
}

#[test]
fn group_header_drag_reorders_section() {
    let mut bench = setup_workbench();
    let section = SectionId::new("identity");
    let a = bench.create_group(section.clone(), "Passport").unwrap();
    let b = bench.create_group(section.clone(), "Visa").unwrap();
    let c = bench.create_group(section.clone(), "BRP").unwrap();

    bench
        .handle_drag(&DragEvent {
            item: DragItem::Group(c),
            target: DropTarget::Group(a),
            position: DropPosition::Before,
        })
        .unwrap();

    let order: Vec<_> = bench
        .store()
        .groups_in_section(&section)
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(order, vec![c, a, b]);
}

#[test]
fn group_drag_across_sections_is_rejected_unchanged() {
    let mut bench = setup_workbench();
    let a = bench
        .create_group(SectionId::new("identity"), "Passport")
        .unwrap();
    let b = bench
        .create_group(SectionId::new("finances"), "Statements")
        .unwrap();

    let err = bench
        .handle_drag(&DragEvent {
            item: DragItem::Group(a),
            target: DropTarget::Group(b),
            position: DropPosition::After,
        })
        .unwrap_err();

    assert!(matches!(
        err,
        WorkbenchError::Drag(DragError::CrossSectionMove { .. })
    ));
    // Categories are section-scoped; nothing moved.
    assert_eq!(
        bench.store().group(a).unwrap().section,
        SectionId::new("identity")
    );
}

#[test]
fn page_reorder_within_bound_group_still_invalidates() {
    let mut case = seeded_case();
    case.bench.take_notices();

    case.bench
        .handle_drag(&DragEvent {
            item: DragItem::Page(case.pages[0]),
            target: DropTarget::Page(case.pages[1]),
            position: DropPosition::After,
        })
        .unwrap();

    // Same-group reorder is a content change for the binding registry.
    assert_eq!(
        case.bench.store().group(case.group).unwrap().page_ids(),
        vec![case.pages[1], case.pages[0]]
    );
    let notices = case.bench.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(case
        .bench
        .engine()
        .module(case.module)
        .unwrap()
        .needs_reanalysis);
}
