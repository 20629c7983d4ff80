//! Species catalog: raw filter strings to canonical taxon keys.
//!
//! Callers may name a species either by NCBI taxon id (`9606`) or by name
//! (`Homo sapiens`, `human`). The catalog is built once at startup alongside
//! the registry and resolves each raw string to exactly one canonical key, or
//! rejects it. "Unknown" and "ambiguous" are distinct failures: both are user
//! errors, but an ambiguous name means the request must be restated, not that
//! the organism is absent.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::FilterError;

/// Canonical species key: the NCBI taxonomy id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesKey(u32);

impl SpeciesKey {
    pub const fn new(taxon_id: u32) -> Self {
        Self(taxon_id)
    }

    pub const fn taxon_id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One catalog row: a taxon and the names it answers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub taxon_id: u32,
    pub scientific_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl SpeciesEntry {
    pub fn new(taxon_id: u32, scientific_name: &str, aliases: &[&str]) -> Self {
        Self {
            taxon_id,
            scientific_name: scientific_name.to_string(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// Startup-built, read-only species table.
///
/// Name lookup is case-insensitive on whole names and aliases; there is no
/// prefix or fuzzy matching. A name shared by several taxa resolves to none
/// of them.
#[derive(Debug, Default)]
pub struct SpeciesCatalog {
    entries: Vec<SpeciesEntry>,
    by_taxon: HashMap<u32, usize>,
    /// Lowercased name/alias -> every taxon claiming it.
    by_name: HashMap<String, BTreeSet<u32>>,
}

impl SpeciesCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: SpeciesEntry) {
        let idx = self.entries.len();
        self.by_taxon.insert(entry.taxon_id, idx);
        for name in std::iter::once(&entry.scientific_name).chain(entry.aliases.iter()) {
            self.by_name
                .entry(name.to_lowercase())
                .or_default()
                .insert(entry.taxon_id);
        }
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_taxon(&self, key: SpeciesKey) -> bool {
        self.by_taxon.contains_key(&key.taxon_id())
    }

    pub fn entry(&self, key: SpeciesKey) -> Option<&SpeciesEntry> {
        self.by_taxon.get(&key.taxon_id()).map(|&i| &self.entries[i])
    }

    /// Resolve a raw filter string to exactly one canonical key.
    ///
    /// All-digit input is treated as a taxon id; anything else as a name or
    /// alias. Unknown ids and names fail as `UnknownSpecies`; a name claimed
    /// by more than one taxon fails as `AmbiguousSpecies`.
    pub fn resolve(&self, raw: &str) -> Result<SpeciesKey, FilterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FilterError::UnknownSpecies { raw: raw.to_string() });
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            let taxon_id: u32 = trimmed.parse().map_err(|_| FilterError::UnknownSpecies {
                raw: raw.to_string(),
            })?;
            return if self.by_taxon.contains_key(&taxon_id) {
                Ok(SpeciesKey::new(taxon_id))
            } else {
                Err(FilterError::UnknownSpecies { raw: raw.to_string() })
            };
        }

        match self.by_name.get(&trimmed.to_lowercase()) {
            None => Err(FilterError::UnknownSpecies { raw: raw.to_string() }),
            Some(taxa) if taxa.len() == 1 => {
                Ok(SpeciesKey::new(*taxa.iter().next().expect("non-empty")))
            }
            Some(taxa) => Err(FilterError::AmbiguousSpecies {
                raw: raw.to_string(),
                candidates: taxa.len(),
            }),
        }
    }

    /// The model organisms the curated knowledgebase is annotated for.
    pub fn curated() -> Self {
        let mut catalog = Self::new();
        for entry in [
            SpeciesEntry::new(9606, "Homo sapiens", &["human"]),
            SpeciesEntry::new(10090, "Mus musculus", &["mouse", "house mouse"]),
            SpeciesEntry::new(10116, "Rattus norvegicus", &["rat"]),
            SpeciesEntry::new(7955, "Danio rerio", &["zebrafish"]),
            SpeciesEntry::new(7227, "Drosophila melanogaster", &["fruit fly"]),
            SpeciesEntry::new(6239, "Caenorhabditis elegans", &[]),
            SpeciesEntry::new(4932, "Saccharomyces cerevisiae", &["baker's yeast"]),
            SpeciesEntry::new(4896, "Schizosaccharomyces pombe", &["fission yeast"]),
            SpeciesEntry::new(9031, "Gallus gallus", &["chicken"]),
            SpeciesEntry::new(9913, "Bos taurus", &["cattle"]),
            SpeciesEntry::new(9823, "Sus scrofa", &["pig"]),
            SpeciesEntry::new(8355, "Xenopus laevis", &["african clawed frog"]),
            SpeciesEntry::new(9615, "Canis familiaris", &["dog"]),
        ] {
            catalog.insert(entry);
        }
        catalog
    }
}
