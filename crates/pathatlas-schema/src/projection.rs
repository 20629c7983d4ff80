//! Output shapes: FULL, MINIMAL, REFERENCE.
//!
//! Projection is a pure per-record mapping. It never touches the backend and
//! never mutates its input; a record that cannot satisfy the requested shape
//! (a missing display name, a missing external identifier) projects to `None`
//! and is omitted from the page instead of failing the whole request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// The three output shapes, each with its own page-size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionLevel {
    /// The entire record graph as resolved by the backend.
    Full,
    /// Fixed-width summary: id, stable id, display name, concrete class.
    Minimal,
    /// External cross-reference: id, identifier, database name.
    Reference,
}

impl ProjectionLevel {
    /// Hard cap on records per page for this shape. FULL records are
    /// expensive to assemble, so their cap is two orders of magnitude lower.
    pub const fn page_ceiling(self) -> u64 {
        match self {
            Self::Full => 25,
            Self::Minimal | Self::Reference => 20_000,
        }
    }
}

impl fmt::Display for ProjectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::Minimal => "minimal",
            Self::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// MINIMAL shape: exactly four fields, independent of the source class's
/// richness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalRecord {
    #[serde(rename = "dbId")]
    pub db_id: u64,
    #[serde(rename = "stId")]
    pub stable_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "className")]
    pub class_name: String,
}

/// REFERENCE shape: the external cross-reference triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(rename = "dbId")]
    pub db_id: u64,
    pub identifier: String,
    #[serde(rename = "databaseName")]
    pub database_name: String,
}

/// One projected record, in whichever shape the request asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectedRecord {
    Full(Record),
    Minimal(MinimalRecord),
    Reference(ReferenceRecord),
}

impl ProjectedRecord {
    pub fn db_id(&self) -> u64 {
        match self {
            Self::Full(r) => r.db_id,
            Self::Minimal(r) => r.db_id,
            Self::Reference(r) => r.db_id,
        }
    }
}

/// Map one record to the requested shape.
pub fn project(record: &Record, level: ProjectionLevel) -> Option<ProjectedRecord> {
    match level {
        ProjectionLevel::Full => Some(ProjectedRecord::Full(record.clone())),
        ProjectionLevel::Minimal => Some(ProjectedRecord::Minimal(MinimalRecord {
            db_id: record.db_id,
            stable_id: record.stable_id.clone()?,
            display_name: record.display_name.clone()?,
            class_name: record.class_name.clone(),
        })),
        ProjectionLevel::Reference => Some(ProjectedRecord::Reference(ReferenceRecord {
            db_id: record.db_id,
            identifier: record.external_identifier.clone()?,
            database_name: record.external_database.clone()?,
        })),
    }
}
