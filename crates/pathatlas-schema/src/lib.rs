//! Pathatlas schema engine: dynamic class resolution, species filtering,
//! pagination, and projection over a graph-structured pathway knowledgebase.
//!
//! The knowledgebase's class hierarchy is runtime data: a request names a
//! class as a string and the engine resolves it against a registry built once
//! at startup, composes an optionally species-filtered and paginated query,
//! and projects each matched record into one of three output shapes
//! (FULL / MINIMAL / REFERENCE), each with its own page-size ceiling.
//!
//! Storage is not here. The engine talks to the graph store through the
//! [`SchemaBackend`] trait and owns only the contracts that have to agree:
//! filter-before-pagination, stable ascending-id ordering, and
//! count/scan consistency.
//!
//! ## Module Organization
//!
//! - `registry`: closed class table with lineage tags, built at startup
//! - `species`: raw species strings to canonical taxon keys
//! - `filter`: validated filters and the lineage gates
//! - `page`: window validation and per-projection ceilings
//! - `projection`: the three pure output shapes
//! - `query`: backend trait plus executor/counter composition
//! - `service`: the per-request façade the HTTP layer calls

pub mod error;
pub mod filter;
pub mod page;
pub mod projection;
pub mod query;
pub mod record;
pub mod registry;
pub mod service;
pub mod species;

pub use error::SchemaQueryError;
pub use filter::{ensure_reference_projectable, FilterError, SpeciesFilter};
pub use page::{PageError, PageWindow};
pub use projection::{
    project, MinimalRecord, ProjectedRecord, ProjectionLevel, ReferenceRecord,
};
pub use query::{BackendError, QueryExecutor, SchemaBackend};
pub use record::Record;
pub use registry::{
    RegistryBuildError, SchemaRegistry, SchemaRegistryBuilder, TypeDescriptor,
};
pub use service::{ResultSet, SchemaQueryService};
pub use species::{SpeciesCatalog, SpeciesEntry, SpeciesKey};
