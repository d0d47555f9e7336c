//! Schema catalog loading and lookup
//!
//! The catalog is parsed once from JSON and treated as immutable input for
//! the rest of the workspace.

use crate::route::{ChecklistSection, RouteId, SectionId, VisaRoute};
use indexmap::IndexMap;
use serde::Deserialize;

/// Errors raised while loading or querying the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog JSON failed to parse
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// Route id not present in the catalog
    #[error("unknown route: {0}")]
    UnknownRoute(RouteId),

    /// Section id not present on the route
    #[error("unknown section {section} on route {route}")]
    UnknownSection {
        route: RouteId,
        section: SectionId,
    },

    /// Two routes in the source document share an id
    #[error("duplicate route id: {0}")]
    DuplicateRoute(RouteId),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    routes: Vec<VisaRoute>,
}

/// Loaded schema catalog, keyed by route id in document order
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    routes: IndexMap<RouteId, VisaRoute>,
}

impl SchemaCatalog {
    /// Create an empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from its JSON source
    ///
    /// # Errors
    /// Returns [`CatalogError::Parse`] on malformed JSON and
    /// [`CatalogError::DuplicateRoute`] if two routes share an id.
    pub fn from_json(source: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(source)?;

        let mut routes = IndexMap::with_capacity(document.routes.len());
        for route in document.routes {
            if routes.contains_key(&route.id) {
                return Err(CatalogError::DuplicateRoute(route.id));
            }
            routes.insert(route.id.clone(), route);
        }

        Ok(Self { routes })
    }

    /// Look up a route
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownRoute`] if the id is absent.
    pub fn route(&self, id: &RouteId) -> Result<&VisaRoute, CatalogError> {
        self.routes
            .get(id)
            .ok_or_else(|| CatalogError::UnknownRoute(id.clone()))
    }

    /// Look up a checklist section on a route
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownRoute`] or
    /// [`CatalogError::UnknownSection`].
    pub fn section(
        &self,
        route: &RouteId,
        section: &SectionId,
    ) -> Result<&ChecklistSection, CatalogError> {
        self.route(route)?
            .section(section)
            .ok_or_else(|| CatalogError::UnknownSection {
                route: route.clone(),
                section: section.clone(),
            })
    }

    /// Iterate routes in document order
    pub fn routes(&self) -> impl Iterator<Item = &VisaRoute> {
        self.routes.values()
    }

    /// Number of routes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
