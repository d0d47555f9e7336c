//! The verification engine
//!
//! Holds every instantiated [`EvidenceModule`] and applies the review
//! lifecycle. The engine owns no documents: source groups and pages are
//! referenced by id and re-validated by the caller through [`PageIndex`]
//! when snapshots are taken.

use crate::error::VerifyError;
use crate::module::{
    EvidenceModule, ExtractedField, ExtractionResult, FieldSource, IssueId, IssueSeed, ModuleId,
    VerificationStatus,
};
use crate::state::{validate_transition, ModuleState};
use casework_binding::Binding;
use casework_document::{GroupId, PageId};
use casework_schema::{EvidenceTemplate, FieldKey};
use indexmap::IndexMap;

/// Engine tracking per-module extraction and verification state
#[derive(Debug, Default)]
pub struct VerificationEngine {
    modules: IndexMap<ModuleId, EvidenceModule>,
}

impl VerificationEngine {
    /// Create an empty engine
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Look up a module
    #[inline]
    #[must_use]
    pub fn module(&self, id: ModuleId) -> Option<&EvidenceModule> {
        self.modules.get(&id)
    }

    /// Modules in instantiation order
    pub fn modules(&self) -> impl Iterator<Item = &EvidenceModule> {
        self.modules.values()
    }

    /// Modules fulfilling a consumer
    #[must_use]
    pub fn modules_for(&self, consumer: &Binding) -> Vec<&EvidenceModule> {
        self.modules
            .values()
            .filter(|m| &m.consumer == consumer)
            .collect()
    }

    /// Number of modules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the engine holds no modules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Instantiate a pending module from a schema template
    pub fn instantiate(&mut self, template: EvidenceTemplate, consumer: Binding) -> ModuleId {
        let module = EvidenceModule::new(template, consumer);
        let id = module.id;
        tracing::debug!(module = %id, doc_type = %module.doc_type, "module instantiated");
        self.modules.insert(id, module);
        id
    }

    /// Link a source document group to a module
    ///
    /// # Errors
    /// [`VerifyError::ModuleNotFound`].
    pub fn link_source(&mut self, id: ModuleId, group: GroupId) -> Result<(), VerifyError> {
        let module = self.get_mut(id)?;
        if !module.sources.contains(&group) {
            module.sources.push(group);
        }
        Ok(())
    }

    /// Accept externally produced extraction results
    ///
    /// Replaces the module's fields and issues. The module lands in
    /// `Extracted`, or `NeedsReview` when the delivery carries unresolved
    /// warning/error issues. Allowed from any state except back to
    /// `Pending`: re-extraction replaces, it never resurrects.
    ///
    /// # Errors
    /// [`VerifyError::ModuleNotFound`], [`VerifyError::UnknownField`] for a
    /// field the template does not define, or
    /// [`VerifyError::IllegalTransition`].
    pub fn accept_extraction(
        &mut self,
        id: ModuleId,
        result: ExtractionResult,
    ) -> Result<(), VerifyError> {
        let module = self.get(id)?;

        // Validate the whole delivery before touching the module.
        for extraction in &result.fields {
            if module.template.field(&extraction.key).is_none() {
                return Err(VerifyError::UnknownField {
                    module: id,
                    key: extraction.key.clone(),
                });
            }
        }

        let blocking = result
            .issues
            .iter()
            .any(|i| i.severity >= crate::module::Severity::Warning);
        let target = if blocking {
            ModuleState::NeedsReview
        } else {
            ModuleState::Extracted
        };
        validate_transition(module.state, target)?;

        let module = self.get_mut(id)?;
        let mut fields: IndexMap<FieldKey, ExtractedField> =
            IndexMap::with_capacity(result.fields.len());
        for f in result.fields {
            let editable = module
                .template
                .field(&f.key)
                .is_some_and(|spec| spec.editable);
            let field = ExtractedField {
                key: f.key.clone(),
                value: f.value,
                source: FieldSource::extracted(f.page, f.region),
                status: VerificationStatus::Unverified,
                editable,
                stale: false,
                previous_value: None,
            };
            fields.insert(f.key, field);
        }
        module.fields = fields;
        module.issues = result.issues.into_iter().map(IssueSeed::into_issue).collect();
        module.state = target;

        tracing::info!(
            module = %id,
            fields = module.fields.len(),
            state = ?module.state,
            "extraction accepted"
        );
        Ok(())
    }

    /// Set the verification status of one field
    ///
    /// `Edited` requires `edited_value`; the field's provenance flips to
    /// manually-entered, permanently superseding the extracted source (the
    /// original value is retained for audit). Confirming a field resolves
    /// `info`/`warning` issues keyed to it but never `error` issues.
    ///
    /// # Errors
    /// [`VerifyError::ModuleNotFound`], [`VerifyError::FieldNotFound`],
    /// [`VerifyError::InvalidVerification`],
    /// [`VerifyError::EditValueRequired`], or
    /// [`VerifyError::FieldNotEditable`].
    pub fn set_field_verification(
        &mut self,
        id: ModuleId,
        key: &FieldKey,
        status: VerificationStatus,
        edited_value: Option<String>,
    ) -> Result<(), VerifyError> {
        let module = self.get_mut(id)?;
        let field = module
            .fields
            .get_mut(key)
            .ok_or_else(|| VerifyError::FieldNotFound {
                module: id,
                key: key.clone(),
            })?;

        match status {
            VerificationStatus::Unverified => {
                return Err(VerifyError::InvalidVerification { key: key.clone() });
            }
            VerificationStatus::Edited => {
                if !field.editable {
                    return Err(VerifyError::FieldNotEditable { key: key.clone() });
                }
                let Some(value) = edited_value else {
                    return Err(VerifyError::EditValueRequired { key: key.clone() });
                };
                field.previous_value.get_or_insert(field.value.clone());
                field.value = value;
                field.source.manually_entered = true;
                field.stale = false;
                field.status = VerificationStatus::Edited;
            }
            VerificationStatus::Confirmed => {
                field.status = VerificationStatus::Confirmed;
                // Soft issues keyed to the field resolve with it; hard
                // errors need an explicit resolve_issue call.
                for issue in module
                    .issues
                    .iter_mut()
                    .filter(|i| i.field.as_ref() == Some(key))
                {
                    if issue.severity < crate::module::Severity::Error {
                        issue.resolved = true;
                    }
                }
            }
            VerificationStatus::Rejected => {
                field.status = VerificationStatus::Rejected;
            }
        }

        tracing::debug!(module = %id, field = %key, status = ?status, "field verification set");
        self.refresh_review_state(id)?;
        Ok(())
    }

    /// Complete review of a module
    ///
    /// # Errors
    /// [`VerifyError::IncompleteReview`] if any field is still unverified,
    /// or [`VerifyError::IllegalTransition`] (e.g. on a `Pending` module).
    pub fn complete_review(&mut self, id: ModuleId) -> Result<(), VerifyError> {
        let module = self.get(id)?;
        validate_transition(module.state, ModuleState::Reviewed)?;

        let unverified = module.unverified_keys();
        if !unverified.is_empty() {
            return Err(VerifyError::IncompleteReview {
                module: id,
                unverified,
            });
        }

        let module = self.get_mut(id)?;
        module.state = ModuleState::Reviewed;
        module.needs_reanalysis = false;
        tracing::info!(module = %id, "review completed");
        Ok(())
    }

    /// Raise an issue on a module after extraction
    ///
    /// # Errors
    /// [`VerifyError::ModuleNotFound`].
    pub fn add_issue(&mut self, id: ModuleId, seed: IssueSeed) -> Result<IssueId, VerifyError> {
        let module = self.get_mut(id)?;
        let issue = seed.into_issue();
        let issue_id = issue.id;
        module.issues.push(issue);
        if module.has_blocking_issues()
            && matches!(module.state, ModuleState::Extracted)
        {
            module.state = ModuleState::NeedsReview;
        }
        Ok(issue_id)
    }

    /// Explicitly resolve an issue
    ///
    /// This is the only way to clear an `error` issue, modeling the
    /// requirement that hard errors need human acknowledgment distinct
    /// from field confirmation.
    ///
    /// # Errors
    /// [`VerifyError::ModuleNotFound`] or [`VerifyError::IssueNotFound`].
    pub fn resolve_issue(&mut self, id: ModuleId, issue: IssueId) -> Result<(), VerifyError> {
        let module = self.get_mut(id)?;
        let found = module
            .issues
            .iter_mut()
            .find(|i| i.id == issue)
            .ok_or(VerifyError::IssueNotFound { module: id, issue })?;
        found.resolved = true;
        tracing::debug!(module = %id, issue = %issue, "issue resolved");
        self.refresh_review_state(id)?;
        Ok(())
    }

    /// Raise needs-re-analysis on every module fulfilling a consumer
    ///
    /// A `Reviewed` module drops to `Stale`; other states keep their state
    /// and only carry the flag. Returns the affected module ids.
    pub fn mark_needs_reanalysis(&mut self, consumer: &Binding) -> Vec<ModuleId> {
        let mut affected = Vec::new();
        for module in self.modules.values_mut() {
            if &module.consumer != consumer {
                continue;
            }
            module.needs_reanalysis = true;
            if module.state == ModuleState::Reviewed {
                module.state = ModuleState::Stale;
                tracing::info!(module = %module.id, "reviewed module went stale");
            }
            affected.push(module.id);
        }
        affected
    }

    /// Flag fields whose provenance references a removed page
    ///
    /// Manually entered values are exempt: their provenance is already
    /// superseded. Returns the number of fields flagged.
    pub fn flag_stale_sources(&mut self, page: PageId) -> usize {
        let mut flagged = 0;
        for module in self.modules.values_mut() {
            for field in module.fields.values_mut() {
                if field.source.page == Some(page) && !field.source.manually_entered {
                    field.stale = true;
                    flagged += 1;
                }
            }
        }
        if flagged > 0 {
            tracing::debug!(page = %page, flagged, "fields flagged stale");
        }
        flagged
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn get(&self, id: ModuleId) -> Result<&EvidenceModule, VerifyError> {
        self.modules.get(&id).ok_or(VerifyError::ModuleNotFound(id))
    }

    fn get_mut(&mut self, id: ModuleId) -> Result<&mut EvidenceModule, VerifyError> {
        self.modules
            .get_mut(&id)
            .ok_or(VerifyError::ModuleNotFound(id))
    }

    /// Settle `NeedsReview` back to `Extracted` once no blocking issues
    /// remain (and the reverse when new ones appear via add_issue).
    fn refresh_review_state(&mut self, id: ModuleId) -> Result<(), VerifyError> {
        let module = self.get_mut(id)?;
        if module.state == ModuleState::NeedsReview && !module.has_blocking_issues() {
            module.state = ModuleState::Extracted;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{FieldExtraction, Severity};
    use casework_schema::{DocTypeTag, FieldKind, FieldSpec};
    use pretty_assertions::assert_eq;

    fn template() -> EvidenceTemplate {
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
                FieldSpec {
                    key: FieldKey::new("pay_date"),
                    label: "Pay date".to_string(),
                    kind: FieldKind::Date,
                    required: false,
                    editable: false,
                },
            ],
        }
    }

    fn extraction(page: PageId) -> ExtractionResult {
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
                FieldExtraction {
                    key: FieldKey::new("pay_date"),
                    value: "2024-03-28".to_string(),
                    page: Some(page),
                    region: None,
                },
            ],
            issues: Vec::new(),
        }
    }

    fn extracted_module(engine: &mut VerificationEngine) -> (ModuleId, PageId) {
        let id = engine.instantiate(template(), Binding::Assessment);
        let page = PageId::new();
        engine.accept_extraction(id, extraction(page)).unwrap();
        (id, page)
    }

    fn confirm_all(engine: &mut VerificationEngine, id: ModuleId) {
        for key in ["employer", "gross_pay", "pay_date"] {
            engine
                .set_field_verification(id, &FieldKey::new(key), VerificationStatus::Confirmed, None)
                .unwrap();
        }
    }

    #[test]
    fn extraction_populates_unverified_fields() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);

        let module = engine.module(id).unwrap();
        assert_eq!(module.state, ModuleState::Extracted);
        assert_eq!(module.fields.len(), 3);
        assert!(module
            .fields
            .values()
            .all(|f| f.status == VerificationStatus::Unverified));
    }

    #[test]
    fn extraction_with_warnings_needs_review() {
        let mut engine = VerificationEngine::new();
        let id = engine.instantiate(template(), Binding::Assessment);

        let mut result = extraction(PageId::new());
        result.issues.push(IssueSeed {
            severity: Severity::Warning,
            message: "low confidence on gross_pay".to_string(),
            field: Some(FieldKey::new("gross_pay")),
        });
        engine.accept_extraction(id, result).unwrap();

        assert_eq!(engine.module(id).unwrap().state, ModuleState::NeedsReview);
    }

    #[test]
    fn extraction_rejects_unknown_field() {
        let mut engine = VerificationEngine::new();
        let id = engine.instantiate(template(), Binding::Assessment);

        let mut result = extraction(PageId::new());
        result.fields.push(FieldExtraction {
            key: FieldKey::new("net_pay"),
            value: "2100.00".to_string(),
            page: None,
            region: None,
        });

        let err = engine.accept_extraction(id, result).unwrap_err();
        assert!(matches!(err, VerifyError::UnknownField { .. }));
        // Nothing applied.
        assert_eq!(engine.module(id).unwrap().state, ModuleState::Pending);
    }

    #[test]
    fn incomplete_review_names_unverified_fields() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);

        engine
            .set_field_verification(id, &FieldKey::new("employer"), VerificationStatus::Confirmed, None)
            .unwrap();
        engine
            .set_field_verification(id, &FieldKey::new("gross_pay"), VerificationStatus::Confirmed, None)
            .unwrap();

        let err = engine.complete_review(id).unwrap_err();
        let VerifyError::IncompleteReview { unverified, .. } = err else {
            panic!("expected IncompleteReview, got {err}");
        };
        assert_eq!(unverified, vec![FieldKey::new("pay_date")]);
    }

    #[test]
    fn review_completes_when_every_field_settled() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);

        engine
            .set_field_verification(id, &FieldKey::new("employer"), VerificationStatus::Confirmed, None)
            .unwrap();
        engine
            .set_field_verification(id, &FieldKey::new("gross_pay"), VerificationStatus::Rejected, None)
            .unwrap();
        engine
            .set_field_verification(
                id,
                &FieldKey::new("pay_date"),
                VerificationStatus::Confirmed,
                None,
            )
            .unwrap();

        engine.complete_review(id).unwrap();
        assert_eq!(engine.module(id).unwrap().state, ModuleState::Reviewed);
    }

    #[test]
    fn review_of_pending_module_is_illegal() {
        let mut engine = VerificationEngine::new();
        let id = engine.instantiate(template(), Binding::Assessment);

        let err = engine.complete_review(id).unwrap_err();
        assert!(matches!(err, VerifyError::IllegalTransition { .. }));
    }

    #[test]
    fn edit_requires_value_and_supersedes_provenance() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);
        let key = FieldKey::new("employer");

        let err = engine
            .set_field_verification(id, &key, VerificationStatus::Edited, None)
            .unwrap_err();
        assert!(matches!(err, VerifyError::EditValueRequired { .. }));

        engine
            .set_field_verification(
                id,
                &key,
                VerificationStatus::Edited,
                Some("Acme Limited".to_string()),
            )
            .unwrap();

        let field = engine.module(id).unwrap().field(&key).unwrap();
        assert_eq!(field.value, "Acme Limited");
        assert_eq!(field.previous_value.as_deref(), Some("Acme Ltd"));
        assert!(field.source.manually_entered);
        // Original page reference retained for audit.
        assert!(field.source.page.is_some());
    }

    #[test]
    fn non_editable_field_rejects_edit() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);

        let err = engine
            .set_field_verification(
                id,
                &FieldKey::new("pay_date"),
                VerificationStatus::Edited,
                Some("2024-04-01".to_string()),
            )
            .unwrap_err();
        assert!(matches!(err, VerifyError::FieldNotEditable { .. }));
    }

    #[test]
    fn unverified_is_not_a_settable_status() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);

        let err = engine
            .set_field_verification(
                id,
                &FieldKey::new("employer"),
                VerificationStatus::Unverified,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, VerifyError::InvalidVerification { .. }));
    }

    #[test]
    fn confirming_clears_soft_issues_but_not_errors() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);
        let key = FieldKey::new("gross_pay");

        engine
            .add_issue(
                id,
                IssueSeed {
                    severity: Severity::Warning,
                    message: "low confidence".to_string(),
                    field: Some(key.clone()),
                },
            )
            .unwrap();
        let error_issue = engine
            .add_issue(
                id,
                IssueSeed {
                    severity: Severity::Error,
                    message: "amount below threshold".to_string(),
                    field: Some(key.clone()),
                },
            )
            .unwrap();

        engine
            .set_field_verification(id, &key, VerificationStatus::Confirmed, None)
            .unwrap();

        let module = engine.module(id).unwrap();
        let open: Vec<_> = module.open_issues();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, error_issue);
        assert_eq!(open[0].severity, Severity::Error);

        // The hard error clears only through explicit resolution.
        engine.resolve_issue(id, error_issue).unwrap();
        assert!(engine.module(id).unwrap().open_issues().is_empty());
    }

    #[test]
    fn resolving_last_blocking_issue_settles_state() {
        let mut engine = VerificationEngine::new();
        let id = engine.instantiate(template(), Binding::Assessment);

        let mut result = extraction(PageId::new());
        result.issues.push(IssueSeed {
            severity: Severity::Error,
            message: "unreadable region".to_string(),
            field: None,
        });
        engine.accept_extraction(id, result).unwrap();
        assert_eq!(engine.module(id).unwrap().state, ModuleState::NeedsReview);

        let issue = engine.module(id).unwrap().issues[0].id;
        engine.resolve_issue(id, issue).unwrap();
        assert_eq!(engine.module(id).unwrap().state, ModuleState::Extracted);
    }

    #[test]
    fn reanalysis_marks_reviewed_module_stale() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);
        confirm_all(&mut engine, id);
        engine.complete_review(id).unwrap();

        let affected = engine.mark_needs_reanalysis(&Binding::Assessment);
        assert_eq!(affected, vec![id]);

        let module = engine.module(id).unwrap();
        assert_eq!(module.state, ModuleState::Stale);
        assert!(module.needs_reanalysis);
    }

    #[test]
    fn reanalysis_keeps_unreviewed_state_but_flags() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);

        engine.mark_needs_reanalysis(&Binding::Assessment);
        let module = engine.module(id).unwrap();
        assert_eq!(module.state, ModuleState::Extracted);
        assert!(module.needs_reanalysis);
    }

    #[test]
    fn stale_module_can_be_re_reviewed() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);
        confirm_all(&mut engine, id);
        engine.complete_review(id).unwrap();
        engine.mark_needs_reanalysis(&Binding::Assessment);

        engine.complete_review(id).unwrap();
        let module = engine.module(id).unwrap();
        assert_eq!(module.state, ModuleState::Reviewed);
        assert!(!module.needs_reanalysis);
    }

    #[test]
    fn removed_page_flags_fields_stale() {
        let mut engine = VerificationEngine::new();
        let (id, page) = extracted_module(&mut engine);

        let flagged = engine.flag_stale_sources(page);
        assert_eq!(flagged, 3);
        assert!(engine
            .module(id)
            .unwrap()
            .fields
            .values()
            .all(|f| f.stale));
    }

    #[test]
    fn re_extraction_replaces_fields() {
        let mut engine = VerificationEngine::new();
        let (id, _) = extracted_module(&mut engine);
        confirm_all(&mut engine, id);
        engine.complete_review(id).unwrap();

        let page = PageId::new();
        engine.accept_extraction(id, extraction(page)).unwrap();

        let module = engine.module(id).unwrap();
        assert_eq!(module.state, ModuleState::Extracted);
        assert!(module
            .fields
            .values()
            .all(|f| f.status == VerificationStatus::Unverified));
    }
}
