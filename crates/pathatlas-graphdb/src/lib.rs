//! In-memory graph snapshot store.
//!
//! A `GraphSnapshot` is a frozen view of the knowledgebase: records are
//! appended through the builder, then `freeze()` computes the membership
//! indexes and the snapshot is read-only for the rest of its life. Index
//! design:
//!
//! 1. **Per-class bitmaps**: one Roaring treemap of internal ids per concrete
//!    class; a scan for a supertype unions the bitmaps of the concrete
//!    classes under it.
//! 2. **Per-species bitmaps**: one treemap per taxon; the species filter is a
//!    single bitmap intersection, applied before any windowing.
//! 3. **Ordering for free**: Roaring iterates ids in ascending order, which
//!    is exactly the engine's stable-ordering contract, so pagination needs
//!    no sort step.
//!
//! The snapshot implements [`SchemaBackend`]; the engine never sees these
//! internals.

pub mod synthetic;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use roaring::RoaringTreemap;
use thiserror::Error;

use pathatlas_schema::{BackendError, Record, SchemaBackend, SpeciesKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("duplicate record id {0}")]
    DuplicateId(u64),
}

/// Append-only construction side of a snapshot.
#[derive(Debug, Default)]
pub struct GraphSnapshotBuilder {
    records: BTreeMap<u64, Record>,
}

impl GraphSnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: Record) -> Result<(), SnapshotError> {
        let db_id = record.db_id;
        if self.records.insert(db_id, record).is_some() {
            return Err(SnapshotError::DuplicateId(db_id));
        }
        Ok(())
    }

    /// Build the membership indexes and freeze the snapshot.
    pub fn freeze(self) -> GraphSnapshot {
        let mut by_class: AHashMap<String, RoaringTreemap> = AHashMap::new();
        let mut by_species: AHashMap<u32, RoaringTreemap> = AHashMap::new();

        for (id, record) in &self.records {
            by_class
                .entry(record.class_name.clone())
                .or_default()
                .insert(*id);
            if let Some(species) = record.species {
                by_species
                    .entry(species.taxon_id())
                    .or_default()
                    .insert(*id);
            }
        }

        let mut records = AHashMap::with_capacity(self.records.len());
        records.extend(self.records);

        tracing::debug!(
            records = records.len(),
            classes = by_class.len(),
            species = by_species.len(),
            "graph snapshot frozen"
        );

        GraphSnapshot {
            records,
            by_class,
            by_species,
        }
    }
}

/// Frozen, read-only snapshot. Safe to share by reference across workers;
/// nothing here mutates after `freeze()`.
#[derive(Debug)]
pub struct GraphSnapshot {
    records: AHashMap<u64, Record>,
    by_class: AHashMap<String, RoaringTreemap>,
    by_species: AHashMap<u32, RoaringTreemap>,
}

impl GraphSnapshot {
    pub fn builder() -> GraphSnapshotBuilder {
        GraphSnapshotBuilder::new()
    }

    /// Load a snapshot from a JSON array of records.
    pub fn from_json_reader(reader: impl Read) -> Result<Self> {
        let records: Vec<Record> =
            serde_json::from_reader(reader).context("snapshot JSON is not an array of records")?;
        let mut builder = Self::builder();
        for record in records {
            builder
                .add_record(record)
                .context("snapshot contains duplicate record ids")?;
        }
        Ok(builder.freeze())
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open snapshot {}", path.display()))?;
        Self::from_json_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn class_count(&self) -> usize {
        self.by_class.len()
    }

    pub fn species_count(&self) -> usize {
        self.by_species.len()
    }

    pub fn record(&self, db_id: u64) -> Option<&Record> {
        self.records.get(&db_id)
    }

    /// Membership set for a class list and optional species: union of the
    /// class bitmaps, then a single intersection for the species.
    fn membership(&self, classes: &[String], species: Option<SpeciesKey>) -> RoaringTreemap {
        let mut members = RoaringTreemap::new();
        for class in classes {
            if let Some(bitmap) = self.by_class.get(class) {
                members |= bitmap;
            }
        }
        if let Some(species) = species {
            match self.by_species.get(&species.taxon_id()) {
                Some(bitmap) => members &= bitmap,
                // Known species, but nothing annotated for it here.
                None => members.clear(),
            }
        }
        members
    }
}

impl SchemaBackend for GraphSnapshot {
    fn scan(
        &self,
        classes: &[String],
        species: Option<SpeciesKey>,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Record>, BackendError> {
        let members = self.membership(classes, species);
        // Treemap iteration is ascending by id: the stable ordering the
        // engine's pagination contract requires.
        Ok(members
            .iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(take).unwrap_or(usize::MAX))
            .map(|id| self.records[&id].clone())
            .collect())
    }

    fn count(&self, classes: &[String], species: Option<SpeciesKey>) -> Result<u64, BackendError> {
        Ok(self.membership(classes, species).len())
    }
}
