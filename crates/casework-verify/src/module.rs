//! Evidence modules, extracted fields, and issues
//!
//! An [`EvidenceModule`] is one instantiated evidence requirement drawn
//! from a schema template. The module holds weak references (ids) into the
//! document store; [`EvidenceModule::snapshot`] re-validates them through a
//! caller-supplied [`PageIndex`] on every read.

use crate::state::ModuleState;
use casework_binding::Binding;
use casework_document::{GroupId, PageId};
use casework_schema::{DocTypeTag, EvidenceTemplate, FieldKey};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique evidence module identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId(pub Ulid);

impl ModuleId {
    /// Generate new module ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ModuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique issue identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueId(pub Ulid);

impl IssueId {
    /// Generate new issue ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note
    Info,
    /// Needs a look, does not block
    Warning,
    /// Hard problem; requires explicit human acknowledgment
    Error,
}

/// A detected problem on a module or one of its fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Issue identifier
    pub id: IssueId,
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Field this issue is keyed to, if any
    pub field: Option<FieldKey>,
    /// Whether the issue has been resolved
    pub resolved: bool,
}

/// Seed for an issue delivered with extraction results or raised later
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueSeed {
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Field this issue is keyed to, if any
    pub field: Option<FieldKey>,
}

impl IssueSeed {
    pub(crate) fn into_issue(self) -> Issue {
        Issue {
            id: IssueId::new(),
            severity: self.severity,
            message: self.message,
            field: self.field,
            resolved: false,
        }
    }
}

/// Verification status of one extracted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Not yet looked at
    Unverified,
    /// Value confirmed correct
    Confirmed,
    /// Value rejected
    Rejected,
    /// Value replaced by the caseworker
    Edited,
}

impl VerificationStatus {
    /// Whether this status counts toward review completion
    #[inline]
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Unverified)
    }
}

/// Bounding region on a source page, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Provenance of an extracted value
///
/// Once a field is manually edited the original page/region are retained
/// for audit but are no longer authoritative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSource {
    /// Source page the value was read from
    pub page: Option<PageId>,
    /// Bounding region on that page
    pub region: Option<Region>,
    /// The value was typed in by a caseworker
    pub manually_entered: bool,
}

impl FieldSource {
    /// Provenance for a machine-extracted value
    #[inline]
    #[must_use]
    pub fn extracted(page: Option<PageId>, region: Option<Region>) -> Self {
        Self {
            page,
            region,
            manually_entered: false,
        }
    }
}

/// One schema-defined datum with its current value and provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedField {
    /// Schema field key
    pub key: FieldKey,
    /// Current value
    pub value: String,
    /// Provenance
    pub source: FieldSource,
    /// Verification status
    pub status: VerificationStatus,
    /// Whether the caseworker may overwrite the value
    pub editable: bool,
    /// The backing page was removed after extraction
    pub stale: bool,
    /// Pre-edit value, kept for audit once the field is edited
    pub previous_value: Option<String>,
}

/// One field delivered by an extraction pass
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldExtraction {
    /// Schema field key
    pub key: FieldKey,
    /// Extracted value
    pub value: String,
    /// Source page
    pub page: Option<PageId>,
    /// Bounding region on the source page
    pub region: Option<Region>,
}

/// A complete extraction delivery for one module
///
/// Extraction itself happens outside this core; the engine only accepts
/// and stores the results.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractionResult {
    /// Extracted fields, in delivery order
    pub fields: Vec<FieldExtraction>,
    /// Problems detected during extraction
    pub issues: Vec<IssueSeed>,
}

/// Page-existence lookup supplied by the caller on every read
///
/// The engine never owns pages; this capability realizes its weak
/// references without caching.
pub trait PageIndex {
    /// Whether the page still exists in the document store
    fn contains_page(&self, page: PageId) -> bool;
}

/// One instantiated evidence requirement
#[derive(Debug, Clone)]
pub struct EvidenceModule {
    /// Module identifier
    pub id: ModuleId,
    /// Document type this module verifies
    pub doc_type: DocTypeTag,
    /// Display title from the template
    pub title: String,
    /// The checklist consumer this module fulfills
    pub consumer: Binding,
    /// Lifecycle state
    pub state: ModuleState,
    /// Raised by invalidation regardless of state
    pub needs_reanalysis: bool,
    /// Template this module was instantiated from
    pub template: EvidenceTemplate,
    /// Extracted fields in delivery order
    pub fields: IndexMap<FieldKey, ExtractedField>,
    /// Issues in raised order
    pub issues: Vec<Issue>,
    /// Linked source document groups (weak, by id)
    pub sources: Vec<GroupId>,
}

impl EvidenceModule {
    pub(crate) fn new(template: EvidenceTemplate, consumer: Binding) -> Self {
        Self {
            id: ModuleId::new(),
            doc_type: template.doc_type.clone(),
            title: template.title.clone(),
            consumer,
            state: ModuleState::Pending,
            needs_reanalysis: false,
            template,
            fields: IndexMap::new(),
            issues: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Look up a field
    #[inline]
    #[must_use]
    pub fn field(&self, key: &FieldKey) -> Option<&ExtractedField> {
        self.fields.get(key)
    }

    /// Keys of fields still unverified
    #[must_use]
    pub fn unverified_keys(&self) -> Vec<FieldKey> {
        self.fields
            .values()
            .filter(|f| !f.status.is_settled())
            .map(|f| f.key.clone())
            .collect()
    }

    /// Whether unresolved warning/error issues remain
    #[must_use]
    pub fn has_blocking_issues(&self) -> bool {
        self.issues
            .iter()
            .any(|i| !i.resolved && i.severity >= Severity::Warning)
    }

    /// Unresolved issues, most severe first
    #[must_use]
    pub fn open_issues(&self) -> Vec<&Issue> {
        let mut open: Vec<&Issue> = self.issues.iter().filter(|i| !i.resolved).collect();
        open.sort_by(|a, b| b.severity.cmp(&a.severity));
        open
    }

    /// Snapshot for rendering, with page references re-validated
    #[must_use]
    pub fn snapshot(&self, pages: &dyn PageIndex) -> ModuleSnapshot {
        let fields = self
            .fields
            .values()
            .map(|f| {
                let page_missing = f
                    .source
                    .page
                    .is_some_and(|p| !pages.contains_page(p));
                FieldSnapshot {
                    key: f.key.clone(),
                    value: f.value.clone(),
                    status: f.status,
                    stale: f.stale || (!f.source.manually_entered && page_missing),
                    manually_entered: f.source.manually_entered,
                    page: f.source.page,
                }
            })
            .collect();

        ModuleSnapshot {
            id: self.id,
            title: self.title.clone(),
            doc_type: self.doc_type.clone(),
            state: self.state,
            needs_reanalysis: self.needs_reanalysis,
            fields,
            open_issues: self.issues.iter().filter(|i| !i.resolved).count(),
        }
    }
}

/// Render view of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub key: FieldKey,
    pub value: String,
    pub status: VerificationStatus,
    pub stale: bool,
    pub manually_entered: bool,
    pub page: Option<PageId>,
}

/// Render view of one module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSnapshot {
    pub id: ModuleId,
    pub title: String,
    pub doc_type: DocTypeTag,
    pub state: ModuleState,
    pub needs_reanalysis: bool,
    pub fields: Vec<FieldSnapshot>,
    pub open_issues: usize,
}
