//! The schema-query façade: one request, one straight pass through the
//! engine.
//!
//! Per request the flow is resolve -> filter -> paginate -> execute ->
//! project, with the counter running on the same resolved filter,
//! independent of the window. Every rejection happens before the backend is
//! touched; the only failure past that point is `BackendUnavailable`.
//!
//! The service holds the process-wide read-only state (registry, species
//! catalog) behind `Arc` and is itself cheap to share across workers.

use std::sync::Arc;

use crate::error::SchemaQueryError;
use crate::filter::{ensure_reference_projectable, SpeciesFilter};
use crate::page::PageWindow;
use crate::projection::{project, ProjectedRecord, ProjectionLevel};
use crate::query::{QueryExecutor, SchemaBackend};
use crate::registry::{SchemaRegistry, TypeDescriptor};
use crate::species::SpeciesCatalog;

/// Projected page plus the filter-consistent total it was cut from.
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub records: Vec<ProjectedRecord>,
    /// Total records matching the filter, ignoring pagination.
    pub total: u64,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct SchemaQueryService<B> {
    registry: Arc<SchemaRegistry>,
    catalog: Arc<SpeciesCatalog>,
    backend: B,
}

impl<B: SchemaBackend> SchemaQueryService<B> {
    pub fn new(registry: Arc<SchemaRegistry>, catalog: Arc<SpeciesCatalog>, backend: B) -> Self {
        Self {
            registry,
            catalog,
            backend,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    fn resolve(&self, class: &str) -> Result<&TypeDescriptor, SchemaQueryError> {
        self.registry
            .resolve(class)
            .ok_or_else(|| SchemaQueryError::TypeNotFound {
                class: class.to_string(),
            })
    }

    /// Fetch one projected page for `class`.
    ///
    /// `species` is the raw request parameter (name or taxon id), `page` is
    /// 1-based, `size` is the requested page size before clamping. An empty
    /// `ResultSet` is a successful outcome here; the boundary decides its
    /// meaning.
    pub fn records(
        &self,
        class: &str,
        species: Option<&str>,
        page: i64,
        size: i64,
        level: ProjectionLevel,
    ) -> Result<ResultSet, SchemaQueryError> {
        let descriptor = self.resolve(class)?;
        if level == ProjectionLevel::Reference {
            ensure_reference_projectable(descriptor)?;
        }
        let filter = SpeciesFilter::build(descriptor, &self.catalog, species)?;
        let window = PageWindow::build(level, page, size)?;

        let executor = QueryExecutor::new(&self.backend);
        let raw = executor.run(descriptor, &filter, &window)?;
        let total = executor.count(descriptor, &filter)?;

        // Counter and executor share filter semantics by construction; a
        // disagreement means the backend broke the contract.
        if total == 0 && !raw.is_empty() {
            tracing::warn!(
                class = descriptor.name(),
                "backend count disagrees with scan under the same filter"
            );
        }

        let records: Vec<ProjectedRecord> =
            raw.iter().filter_map(|r| project(r, level)).collect();

        tracing::debug!(
            class = descriptor.name(),
            %level,
            page = window.page(),
            size = window.size(),
            returned = records.len(),
            total,
            "schema query executed"
        );

        Ok(ResultSet { records, total })
    }

    /// Exact count for `class` under the optional species filter, ignoring
    /// pagination entirely. Zero is a normal answer.
    pub fn count_entries(
        &self,
        class: &str,
        species: Option<&str>,
    ) -> Result<u64, SchemaQueryError> {
        let descriptor = self.resolve(class)?;
        let filter = SpeciesFilter::build(descriptor, &self.catalog, species)?;

        let executor = QueryExecutor::new(&self.backend);
        let total = executor.count(descriptor, &filter)?;

        tracing::debug!(class = descriptor.name(), total, "schema count executed");
        Ok(total)
    }
}
