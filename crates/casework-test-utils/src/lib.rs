//! Testing utilities for the casework workspace
//!
//! Shared fixtures: a small schema catalog, templates, extraction
//! deliveries, and a pre-seeded workbench.

#![allow(missing_docs)]

use casework_binding::Binding;
use casework_core::{CaseWorkbench, WorkbenchConfig};
use casework_document::{GroupId, PageId, PayloadRef};
use casework_schema::{
    DocTypeTag, EvidenceTemplate, FieldKey, FieldKind, FieldSpec, RouteId, SchemaCatalog,
    SectionId,
};
use casework_verify::{ExtractionResult, FieldExtraction, ModuleId};

/// Initialize tracing for a test run; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn sample_catalog() -> SchemaCatalog {
    SchemaCatalog::from_json(
        r#"{
            "routes": [{
                "id": "skilled-worker",
                "name": "Skilled Worker",
                "sections": [
                    {
                        "id": "employment",
                        "title": "Employment Evidence",
                        "templates": [{
                            "doc_type": "payslip",
                            "title": "Payslip",
                            "fields": [
                                {"key": "employer", "label": "Employer", "kind": "text", "required": true},
                                {"key": "gross_pay", "label": "Gross pay", "kind": "currency", "required": true},
                                {"key": "pay_date", "label": "Pay date", "kind": "date", "required": false, "editable": false}
                            ]
                        }]
                    },
                    {
                        "id": "identity",
                        "title": "Identity Documents",
                        "templates": [{
                            "doc_type": "passport",
                            "title": "Passport",
                            "fields": [
                                {"key": "full_name", "label": "Full name", "kind": "text", "required": true},
                                {"key": "passport_number", "label": "Passport number", "kind": "text", "required": true}
                            ]
                        }]
                    }
                ]
            }]
        }"#,
    )
    .expect("sample catalog is valid")
}

pub fn skilled_worker_route() -> RouteId {
    RouteId::new("skilled-worker")
}

pub fn payslip_template() -> EvidenceTemplate {
    EvidenceTemplate {
        doc_type: DocTypeTag::new("payslip"),
        title: "Payslip".to_string(),
        fields: vec![
            FieldSpec {
                key: FieldKey::new("employer"),
                label: "Employer".to_string(),
                kind: FieldKind::Text,
                required: true,
                editable: true,
            },
            FieldSpec {
                key: FieldKey::new("gross_pay"),
                label: "Gross pay".to_string(),
                kind: FieldKind::Currency,
                required: true,
                editable: true,
            },
        ],
    }
}

pub fn payslip_extraction(page: PageId) -> ExtractionResult {
    ExtractionResult {
        fields: vec![
            FieldExtraction {
                key: FieldKey::new("employer"),
                value: "Acme Ltd".to_string(),
                page: Some(page),
                region: None,
            },
            FieldExtraction {
                key: FieldKey::new("gross_pay"),
                value: "2750.00".to_string(),
                page: Some(page),
                region: None,
            },
        ],
        issues: Vec::new(),
    }
}

pub fn setup_workbench() -> CaseWorkbench {
    CaseWorkbench::new(WorkbenchConfig::new())
}

/// A workbench seeded with one bound, extracted payslip group.
pub struct SeededCase {
    pub bench: CaseWorkbench,
    pub section: SectionId,
    pub group: GroupId,
    pub pages: Vec<PageId>,
    pub module: ModuleId,
}

/// Build a case with a two-page payslip group bound to the employment
/// section and a module with accepted extraction results.
pub fn seeded_case() -> SeededCase {
    let mut bench = setup_workbench();
    let section = SectionId::new("employment");

    let (group, first) = bench
        .upload_to_new_group(
            section.clone(),
            "Payslips",
            "payslip-march.pdf",
            PayloadRef::new("blob:payslip-1"),
        )
        .expect("seed group");
    let second = bench
        .add_page(group, "payslip-april.pdf", PayloadRef::new("blob:payslip-2"))
        .expect("seed page");

    let consumer = Binding::section(section.clone());
    let module = bench.instantiate_module(payslip_template(), consumer.clone());
    bench.bind(group, consumer).expect("seed binding");
    bench
        .accept_extraction(module, payslip_extraction(first))
        .expect("seed extraction");
    bench.take_notices();

    SeededCase {
        bench,
        section,
        group,
        pages: vec![first, second],
        module,
    }
}
