//! Evidence templates and field specifications
//!
//! An [`EvidenceTemplate`] describes one document-type requirement
//! ("Payslip", "Bank Statement") as a list of [`FieldSpec`] entries that an
//! extraction pass is expected to fill.

use serde::{Deserialize, Serialize};

/// Document-type tag ("payslip", "passport", "bank-statement")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocTypeTag(String);

impl DocTypeTag {
    /// Create a new tag
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocTypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Schema-defined field key ("employer", "gross_pay")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    /// Create a new field key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value kind of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text
    Text,
    /// Calendar date
    Date,
    /// Plain number
    Number,
    /// Monetary amount
    Currency,
}

/// One schema-defined datum an extraction pass should produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field key, unique within its template
    pub key: FieldKey,
    /// Human-readable label
    pub label: String,
    /// Value kind
    pub kind: FieldKind,
    /// Whether extraction must produce this field
    pub required: bool,
    /// Whether a caseworker may overwrite the extracted value
    #[serde(default = "default_editable")]
    pub editable: bool,
}

fn default_editable() -> bool {
    true
}

/// One document-type requirement within a checklist section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceTemplate {
    /// Document type this template applies to
    pub doc_type: DocTypeTag,
    /// Display title ("Payslip #2")
    pub title: String,
    /// Ordered field specifications
    pub fields: Vec<FieldSpec>,
}

impl EvidenceTemplate {
    /// Look up a field spec by key
    #[inline]
    #[must_use]
    pub fn field(&self, key: &FieldKey) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| &f.key == key)
    }

    /// Keys of all required fields
    pub fn required_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.iter().filter(|f| f.required).map(|f| &f.key)
    }
}
