//! The case workbench
//!
//! The single mutation entry point: owns the document store, binding
//! registry, and verification engine, routes destructive intents through
//! the confirmation gate, and fans store events out as invalidation.
//!
//! All mutations are synchronous and run to completion; no operation
//! partially applies. Suspension for a confirmation dialog is the gap
//! between a returned [`PendingMutation`] and the [`CaseWorkbench::accept`]
//! call; cancellation is simply never calling accept.

use crate::config::WorkbenchConfig;
use crate::error::WorkbenchError;
use crate::gate::{
    self, BlockReason, ConfirmationRequest, GateDecision, MutationIntent,
};
use crate::snapshot::{build_snapshot, CaseSnapshot, StorePages};
use casework_binding::{Binding, BindingRegistry};
use casework_document::{
    resolve_drag, Cleanup, DocumentStore, DragEvent, GroupId, Layout, LayoutGroup, PageId,
    PayloadRef, ReviewStatus, StoreCommand, StoreError, StoreEvent,
};
use casework_schema::{EvidenceTemplate, FieldKey, RouteId, SchemaCatalog, SectionId};
use casework_verify::{
    ExtractionResult, IssueId, IssueSeed, ModuleId, ModuleSnapshot, VerificationEngine,
    VerificationStatus,
};

/// A gated mutation held by the caller until accepted or abandoned
///
/// Dropping the value cancels the mutation; prior state is unchanged.
#[derive(Debug)]
pub struct PendingMutation {
    request: ConfirmationRequest,
}

impl PendingMutation {
    /// The confirmation payload to render
    #[inline]
    #[must_use]
    pub fn request(&self) -> &ConfirmationRequest {
        &self.request
    }
}

/// Outcome of a gated request
#[derive(Debug)]
pub enum GateOutcome {
    /// No confirmation was needed; the mutation is committed
    Applied,
    /// The mutation is held; pass the token to `accept` to commit
    Pending(PendingMutation),
}

/// Outcome of a drag gesture
#[derive(Debug)]
pub enum DragResolution {
    /// The move (and any auto-delete) is committed
    Applied,
    /// The move is committed; deleting the emptied bound group awaits
    /// confirmation
    AppliedWithPending(PendingMutation),
}

/// Invalidation raised toward one consumer, surfaced to the embedder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationNotice {
    /// Group whose change triggered the invalidation
    pub group: GroupId,
    /// Consumer that was invalidated
    pub consumer: Binding,
    /// Modules flagged for re-analysis
    pub modules: Vec<ModuleId>,
}

/// The process-wide casework instance
///
/// # Workflow
/// 1. UI intent arrives (drag, rename, delete, field edit)
/// 2. Destructive intents consult the confirmation gate
/// 3. The store or engine mutation applies atomically
/// 4. Store events drain into binding invalidation
/// 5. Invalidation notices surface outward for rendering
#[derive(Debug, Default)]
pub struct CaseWorkbench {
    config: WorkbenchConfig,
    store: DocumentStore,
    registry: BindingRegistry,
    engine: VerificationEngine,
    notices: Vec<InvalidationNotice>,
}

impl CaseWorkbench {
    /// Create a new workbench
    #[inline]
    #[must_use]
    pub fn new(config: WorkbenchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// Read access to the document store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Read access to the binding registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Read access to the verification engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    /// Drain invalidation notices raised since the last drain
    pub fn take_notices(&mut self) -> Vec<InvalidationNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Current render snapshot
    #[must_use]
    pub fn snapshot(&self) -> CaseSnapshot {
        build_snapshot(&self.store, &self.registry, &self.engine)
    }

    /// Snapshot of one module with page references re-validated
    #[must_use]
    pub fn module_snapshot(&self, module: ModuleId) -> Option<ModuleSnapshot> {
        self.engine
            .module(module)
            .map(|m| m.snapshot(&StorePages(&self.store)))
    }

    /// Current drag layout: groups in section-major rank order with their
    /// binding flags
    #[must_use]
    pub fn layout(&self) -> Layout {
        let mut groups = Vec::new();
        for section in self.store.sections() {
            for group in self.store.groups_in_section(&section) {
                groups.push(LayoutGroup {
                    id: group.id,
                    section: group.section.clone(),
                    pages: group.page_ids(),
                    bound: self.registry.is_bound(group.id),
                });
            }
        }
        Layout::new(groups)
    }

    // ------------------------------------------------------------------
    // Document operations
    // ------------------------------------------------------------------

    /// Create an empty group (explicit "new category" action)
    pub fn create_group(
        &mut self,
        section: SectionId,
        title: impl Into<String>,
    ) -> Result<GroupId, WorkbenchError> {
        let id = self.store.create_group(section, title)?;
        self.pump_events();
        Ok(id)
    }

    /// Append an uploaded page to an existing group
    pub fn add_page(
        &mut self,
        group: GroupId,
        filename: impl Into<String>,
        payload: PayloadRef,
    ) -> Result<PageId, WorkbenchError> {
        let id = self.store.add_page(group, filename, payload)?;
        self.pump_events();
        Ok(id)
    }

    /// First-upload intake: create a group and place the upload in it
    pub fn upload_to_new_group(
        &mut self,
        section: SectionId,
        title: impl Into<String>,
        filename: impl Into<String>,
        payload: PayloadRef,
    ) -> Result<(GroupId, PageId), WorkbenchError> {
        let group = self.store.create_group(section, title)?;
        let page = self.store.add_page(group, filename, payload)?;
        self.pump_events();
        Ok((group, page))
    }

    /// Detach a single page
    pub fn remove_page(&mut self, page: PageId) -> Result<(), WorkbenchError> {
        self.store.remove_page(page)?;
        self.engine.flag_stale_sources(page);
        self.pump_events();
        Ok(())
    }

    /// Move or reposition a page directly (non-drag path)
    pub fn move_page(
        &mut self,
        page: PageId,
        from: GroupId,
        to: GroupId,
        index: usize,
    ) -> Result<(), WorkbenchError> {
        self.store.move_page(page, from, to, index)?;
        self.pump_events();
        Ok(())
    }

    /// Replace a section's group order
    pub fn reorder_groups(
        &mut self,
        section: &SectionId,
        ordered: &[GroupId],
    ) -> Result<(), WorkbenchError> {
        self.store.reorder_groups(section, ordered)?;
        self.pump_events();
        Ok(())
    }

    /// Merge one group into another
    pub fn merge_groups(&mut self, source: GroupId, dest: GroupId) -> Result<(), WorkbenchError> {
        self.store.merge_groups(source, dest)?;
        self.pump_events();
        Ok(())
    }

    /// Split pages out of a group into a new one
    pub fn split_group(
        &mut self,
        group: GroupId,
        pages: &[PageId],
        new_title: impl Into<String>,
    ) -> Result<GroupId, WorkbenchError> {
        let id = self.store.split_group(group, pages, new_title)?;
        self.pump_events();
        Ok(id)
    }

    /// Mark a group reviewed
    pub fn mark_group_reviewed(&mut self, group: GroupId) -> Result<(), WorkbenchError> {
        self.store.mark_reviewed(group)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Gated operations
    // ------------------------------------------------------------------

    /// Request a rename; applies immediately unless the group is bound or
    /// reviewed
    pub fn request_rename(
        &mut self,
        group: GroupId,
        new_title: impl Into<String>,
    ) -> Result<GateOutcome, WorkbenchError> {
        let intent = MutationIntent::RenameGroup {
            group,
            new_title: new_title.into(),
        };
        self.gate_group_mutation(group, intent)
    }

    /// Request a deletion; applies immediately unless the group is bound or
    /// reviewed
    pub fn request_delete(&mut self, group: GroupId) -> Result<GateOutcome, WorkbenchError> {
        let intent = MutationIntent::DeleteGroup { group };
        self.gate_group_mutation(group, intent)
    }

    /// Request review completion; warns when signing off over stale
    /// provenance
    pub fn request_complete_review(
        &mut self,
        module: ModuleId,
    ) -> Result<GateOutcome, WorkbenchError> {
        let intent = MutationIntent::CompleteReview { module };
        let (exists, stale_fields, needs_reanalysis) = match self.engine.module(module) {
            Some(m) => {
                let snapshot = m.snapshot(&StorePages(&self.store));
                (
                    true,
                    snapshot.fields.iter().filter(|f| f.stale).count(),
                    m.needs_reanalysis,
                )
            }
            None => (false, 0, false),
        };

        match gate::evaluate_review_completion(intent, exists, stale_fields, needs_reanalysis) {
            GateDecision::Proceed => {
                self.apply_intent(MutationIntent::CompleteReview { module })?;
                Ok(GateOutcome::Applied)
            }
            GateDecision::Confirm(request) => Ok(GateOutcome::Pending(PendingMutation { request })),
            GateDecision::Block(reason) => Err(Self::block_to_error(reason)),
        }
    }

    /// Commit a previously gated mutation
    ///
    /// The mutation was held, not applied; accepting runs the full apply
    /// pipeline including invalidation.
    pub fn accept(&mut self, pending: PendingMutation) -> Result<(), WorkbenchError> {
        tracing::info!(
            mutation = %pending.request.intent.describe(),
            "confirmed mutation accepted"
        );
        self.apply_intent(pending.request.intent)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    /// Resolve and apply a drag gesture
    ///
    /// Rule 5 cleanup: an emptied unbound group is deleted right after the
    /// move (subject to configuration); an emptied bound group is never
    /// auto-deleted; its deletion comes back as a pending confirmation.
    pub fn handle_drag(&mut self, event: &DragEvent) -> Result<DragResolution, WorkbenchError> {
        let layout = self.layout();
        let outcome = resolve_drag(&layout, event)?;

        match outcome.command {
            StoreCommand::MovePage {
                page,
                from,
                to,
                index,
            } => self.store.move_page(page, from, to, index)?,
            StoreCommand::ReorderGroups { section, order } => {
                self.store.reorder_groups(&section, &order)?;
            }
        }
        self.pump_events();

        match outcome.cleanup {
            Cleanup::None => Ok(DragResolution::Applied),
            Cleanup::AutoDelete(group) => {
                if self.config.auto_delete_empty_groups {
                    self.store.delete_group(group)?;
                    self.pump_events();
                }
                Ok(DragResolution::Applied)
            }
            Cleanup::Deferred(group) => {
                // The layout flagged the group bound before the move; gate
                // against current state in case bindings changed.
                let intent = MutationIntent::DeleteGroup { group };
                let reviewed = self
                    .store
                    .group(group)
                    .is_some_and(|g| g.review == ReviewStatus::Reviewed);
                // The group was just emptied by the move, so the page count
                // never adds to the prompt here.
                let decision = gate::evaluate_group_mutation(
                    intent,
                    self.store.group(group).is_some(),
                    reviewed,
                    self.config.confirm_reviewed_group_edits,
                    0,
                    self.registry.bindings_for(group),
                );
                match decision {
                    GateDecision::Confirm(request) => Ok(DragResolution::AppliedWithPending(
                        PendingMutation { request },
                    )),
                    GateDecision::Proceed => {
                        if self.config.auto_delete_empty_groups {
                            self.store.delete_group(group)?;
                            self.pump_events();
                        }
                        Ok(DragResolution::Applied)
                    }
                    GateDecision::Block(_) => Ok(DragResolution::Applied),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    /// Bind a group to a consumer; idempotent
    ///
    /// Modules fulfilling the consumer record the group as a linked source.
    pub fn bind(&mut self, group: GroupId, binding: Binding) -> Result<bool, WorkbenchError> {
        if self.store.group(group).is_none() {
            return Err(StoreError::GroupNotFound(group).into());
        }
        let recorded = self.registry.record(group, binding.clone());
        if recorded {
            let modules: Vec<ModuleId> = self
                .engine
                .modules_for(&binding)
                .iter()
                .map(|m| m.id)
                .collect();
            for module in modules {
                self.engine.link_source(module, group)?;
            }
        }
        Ok(recorded)
    }

    /// Release one binding
    pub fn unbind(&mut self, group: GroupId, binding: &Binding) -> bool {
        self.registry.release(group, binding)
    }

    // ------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------

    /// Instantiate one module from a template
    pub fn instantiate_module(
        &mut self,
        template: EvidenceTemplate,
        consumer: Binding,
    ) -> ModuleId {
        self.engine.instantiate(template, consumer)
    }

    /// Instantiate a module per template for every checklist section of a
    /// route
    pub fn instantiate_route_modules(
        &mut self,
        catalog: &SchemaCatalog,
        route: &RouteId,
    ) -> Result<Vec<ModuleId>, WorkbenchError> {
        let route = catalog.route(route)?;
        let mut modules = Vec::new();
        for section in &route.sections {
            for template in &section.templates {
                modules.push(
                    self.engine
                        .instantiate(template.clone(), Binding::section(section.id.clone())),
                );
            }
        }
        tracing::info!(route = %route.id, modules = modules.len(), "route modules instantiated");
        Ok(modules)
    }

    /// Accept externally produced extraction results for a module
    pub fn accept_extraction(
        &mut self,
        module: ModuleId,
        result: ExtractionResult,
    ) -> Result<(), WorkbenchError> {
        self.engine.accept_extraction(module, result)?;
        Ok(())
    }

    /// Set one field's verification status
    pub fn set_field_verification(
        &mut self,
        module: ModuleId,
        key: &FieldKey,
        status: VerificationStatus,
        edited_value: Option<String>,
    ) -> Result<(), WorkbenchError> {
        self.engine
            .set_field_verification(module, key, status, edited_value)?;
        Ok(())
    }

    /// Raise an issue on a module
    pub fn add_issue(
        &mut self,
        module: ModuleId,
        seed: IssueSeed,
    ) -> Result<IssueId, WorkbenchError> {
        Ok(self.engine.add_issue(module, seed)?)
    }

    /// Explicitly resolve an issue
    pub fn resolve_issue(
        &mut self,
        module: ModuleId,
        issue: IssueId,
    ) -> Result<(), WorkbenchError> {
        self.engine.resolve_issue(module, issue)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn gate_group_mutation(
        &mut self,
        group: GroupId,
        intent: MutationIntent,
    ) -> Result<GateOutcome, WorkbenchError> {
        let (exists, reviewed, pages) = match self.store.group(group) {
            Some(g) => (true, g.review == ReviewStatus::Reviewed, g.page_count()),
            None => (false, false, 0),
        };

        let decision = gate::evaluate_group_mutation(
            intent.clone(),
            exists,
            reviewed,
            self.config.confirm_reviewed_group_edits,
            pages,
            self.registry.bindings_for(group),
        );

        match decision {
            GateDecision::Proceed => {
                self.apply_intent(intent)?;
                Ok(GateOutcome::Applied)
            }
            GateDecision::Confirm(request) => Ok(GateOutcome::Pending(PendingMutation { request })),
            GateDecision::Block(reason) => Err(Self::block_to_error(reason)),
        }
    }

    fn apply_intent(&mut self, intent: MutationIntent) -> Result<(), WorkbenchError> {
        match intent {
            MutationIntent::RenameGroup { group, new_title } => {
                self.store.rename_group(group, new_title)?;
                self.pump_events();
            }
            MutationIntent::DeleteGroup { group } => {
                self.store.delete_group(group)?;
                self.pump_events();
            }
            MutationIntent::CompleteReview { module } => {
                self.engine.complete_review(module)?;
            }
        }
        Ok(())
    }

    fn block_to_error(reason: BlockReason) -> WorkbenchError {
        match reason {
            BlockReason::GroupMissing(group) => StoreError::GroupNotFound(group).into(),
            BlockReason::ModuleMissing(module) => {
                casework_verify::VerifyError::ModuleNotFound(module).into()
            }
        }
    }

    /// Drain store events and fan them out as invalidation
    fn pump_events(&mut self) {
        for event in self.store.drain_events() {
            match event {
                StoreEvent::GroupRenamed { group }
                | StoreEvent::GroupContentChanged { group } => {
                    self.invalidate_group(group);
                }
                StoreEvent::GroupDeleted { group, pages, .. } => {
                    // Invalidate each consumer once before the reference
                    // disappears, then release everything.
                    let consumers = self.registry.release_group(group);
                    for consumer in consumers {
                        let modules = self.engine.mark_needs_reanalysis(&consumer);
                        self.notices.push(InvalidationNotice {
                            group,
                            consumer,
                            modules,
                        });
                    }
                    for page in pages {
                        self.engine.flag_stale_sources(page);
                    }
                }
                StoreEvent::GroupCreated { .. } | StoreEvent::GroupsReordered { .. } => {}
            }
        }
    }

    fn invalidate_group(&mut self, group: GroupId) {
        for consumer in self.registry.invalidate(group) {
            let modules = self.engine.mark_needs_reanalysis(&consumer);
            self.notices.push(InvalidationNotice {
                group,
                consumer,
                modules,
            });
        }
    }
}
