//! Visa routes and checklist sections

use crate::template::EvidenceTemplate;
use serde::{Deserialize, Serialize};

/// Visa route identifier ("skilled-worker", "spouse")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Create a new route id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checklist section identifier ("employment", "identity", "finances")
///
/// Also used by the document store as the section label that scopes
/// document groups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Create a new section id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A checklist section: one evidence requirement area of a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSection {
    /// Section identifier, unique within the route
    pub id: SectionId,
    /// Human-readable title
    pub title: String,
    /// Evidence templates this section draws on
    pub templates: Vec<EvidenceTemplate>,
}

impl ChecklistSection {
    /// Look up a template by document type
    #[must_use]
    pub fn template_for(&self, doc_type: &str) -> Option<&EvidenceTemplate> {
        self.templates.iter().find(|t| t.doc_type.as_str() == doc_type)
    }
}

/// One visa route and its checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisaRoute {
    /// Route identifier
    pub id: RouteId,
    /// Display name
    pub name: String,
    /// Ordered checklist sections
    pub sections: Vec<ChecklistSection>,
}

impl VisaRoute {
    /// Look up a section by id
    #[inline]
    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<&ChecklistSection> {
        self.sections.iter().find(|s| &s.id == id)
    }
}
