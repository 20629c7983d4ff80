//! Query composition over the external graph backend.
//!
//! The engine owns filter/pagination composition and the ordering contract;
//! the backend owns storage and traversal. The split keeps the two
//! pagination-correctness hazards in one place:
//!
//! - the species filter is applied *before* the window, never after, and
//! - the scan order is pinned to ascending internal id, so page N followed by
//!   page N+1 over a static dataset never repeats or skips a record.
//!
//! Zero matches is a normal empty result. An I/O failure is
//! `BackendUnavailable` and is never converted into "no matches".

use thiserror::Error;

use crate::error::SchemaQueryError;
use crate::filter::SpeciesFilter;
use crate::page::PageWindow;
use crate::record::Record;
use crate::registry::TypeDescriptor;
use crate::species::SpeciesKey;

/// Failure inside the backend collaborator. Retry policy belongs to the
/// caller of the engine, not to the engine itself.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("i/o failure: {0}")]
    Io(String),

    #[error("query timed out")]
    Timeout,
}

/// The external graph store, as the engine sees it.
///
/// Contract for implementors:
/// - `scan` matches records whose concrete class is in `classes`, restricted
///   to `species` when given, ordered by ascending internal id, with `skip`
///   applied after the filter and `take` records returned at most;
/// - `count` uses the identical filter semantics, so `count == 0` exactly
///   when a scan under the same filter is empty at every window.
pub trait SchemaBackend: Send + Sync {
    fn scan(
        &self,
        classes: &[String],
        species: Option<SpeciesKey>,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Record>, BackendError>;

    fn count(&self, classes: &[String], species: Option<SpeciesKey>) -> Result<u64, BackendError>;
}

impl<B: SchemaBackend + ?Sized> SchemaBackend for &B {
    fn scan(
        &self,
        classes: &[String],
        species: Option<SpeciesKey>,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Record>, BackendError> {
        (**self).scan(classes, species, skip, take)
    }

    fn count(&self, classes: &[String], species: Option<SpeciesKey>) -> Result<u64, BackendError> {
        (**self).count(classes, species)
    }
}

/// Composes a resolved descriptor, a validated filter, and a validated window
/// into one backend scan.
pub struct QueryExecutor<'a, B: SchemaBackend> {
    backend: &'a B,
}

impl<'a, B: SchemaBackend> QueryExecutor<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Run the filtered, ordered, windowed scan.
    pub fn run(
        &self,
        descriptor: &TypeDescriptor,
        filter: &SpeciesFilter,
        window: &PageWindow,
    ) -> Result<Vec<Record>, SchemaQueryError> {
        self.backend
            .scan(
                descriptor.subclasses(),
                filter.species(),
                window.skip(),
                window.take(),
            )
            .map_err(SchemaQueryError::BackendUnavailable)
    }

    /// Exact count under the same filter, independent of any window.
    pub fn count(
        &self,
        descriptor: &TypeDescriptor,
        filter: &SpeciesFilter,
    ) -> Result<u64, SchemaQueryError> {
        self.backend
            .count(descriptor.subclasses(), filter.species())
            .map_err(SchemaQueryError::BackendUnavailable)
    }
}
