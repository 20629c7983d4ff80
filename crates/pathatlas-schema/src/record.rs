//! Raw knowledgebase records as delivered by the query backend.
//!
//! A `Record` is the backend's resolved view of one database object: the
//! stable identifiers, the concrete class it was stored under, and a free-form
//! attribute map holding the rest of the record graph. The engine never
//! interprets `attributes`; it only carries them through the FULL projection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::species::SpeciesKey;

/// One resolved database object.
///
/// Field naming on the wire follows the knowledgebase conventions (`dbId`,
/// `stId`, `displayName`, ...), so a FULL projection serializes byte-for-byte
/// the way the backend delivered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Internal numeric id. Opaque but stable; the engine's ordering key.
    #[serde(rename = "dbId")]
    pub db_id: u64,

    /// Human-durable stable identifier (e.g. `R-HSA-69278`).
    #[serde(rename = "stId", default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,

    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Concrete class the record was stored under (not a supertype).
    #[serde(rename = "className")]
    pub class_name: String,

    /// Canonical species key, when the record is species-scoped.
    #[serde(rename = "speciesTaxId", default, skip_serializing_if = "Option::is_none")]
    pub species: Option<SpeciesKey>,

    /// External identifier, for reference/ontology records (e.g. a ChEBI or
    /// UniProt accession).
    #[serde(rename = "identifier", default, skip_serializing_if = "Option::is_none")]
    pub external_identifier: Option<String>,

    /// Name of the external database the identifier belongs to.
    #[serde(rename = "databaseName", default, skip_serializing_if = "Option::is_none")]
    pub external_database: Option<String>,

    /// Remaining record graph, carried verbatim into FULL projections.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Record {
    pub fn new(db_id: u64, class_name: impl Into<String>) -> Self {
        Self {
            db_id,
            stable_id: None,
            display_name: None,
            class_name: class_name.into(),
            species: None,
            external_identifier: None,
            external_database: None,
            attributes: Map::new(),
        }
    }

    pub fn with_stable_id(mut self, st_id: impl Into<String>) -> Self {
        self.stable_id = Some(st_id.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_species(mut self, species: SpeciesKey) -> Self {
        self.species = Some(species);
        self
    }

    pub fn with_external_reference(
        mut self,
        identifier: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        self.external_identifier = Some(identifier.into());
        self.external_database = Some(database.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}
