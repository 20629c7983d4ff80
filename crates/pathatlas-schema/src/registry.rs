//! Schema class registry (explicit, data-driven).
//!
//! The knowledgebase's class hierarchy is runtime data, not a compile-time
//! enumeration: callers name a class in the request path and the engine must
//! resolve it without reflection. The registry is a closed, inspectable table
//! built once at startup:
//!
//! - `SchemaRegistryBuilder` takes declarative `(class, parent)` rows and
//!   validates the hierarchy (duplicates, unknown parents, cycles),
//! - `SchemaRegistry` is the frozen result: a name-keyed map of immutable
//!   `TypeDescriptor`s, shared by reference for the process lifetime,
//! - each descriptor carries its supertype chain, the set of concrete classes
//!   it covers, and the lineage-derived capability flags the filter layer
//!   checks before building a query.
//!
//! Name matching is exact and case-sensitive. An unresolvable name is a
//! distinct failure from a resolved-but-empty query; the two carry different
//! semantics at the HTTP boundary.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use thiserror::Error;

/// Lineage roots with query semantics attached to them.
///
/// Species filtering only makes sense for instance data scoped to an
/// organism; reference projection only makes sense for cross-reference
/// records pointing at external databases.
pub const EVENT: &str = "Event";
pub const PHYSICAL_ENTITY: &str = "PhysicalEntity";
pub const REFERENCE_ENTITY: &str = "ReferenceEntity";
pub const EXTERNAL_ONTOLOGY: &str = "ExternalOntology";

/// Immutable description of one schema class.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDescriptor {
    name: String,
    /// Supertype chain, nearest parent first, hierarchy root last.
    ancestors: Vec<String>,
    /// The class itself plus every class below it, sorted by name. A scan for
    /// `Event` must match records stored under `Pathway` or `Reaction`.
    subclasses: Vec<String>,
    species_filterable: bool,
    reference_projectable: bool,
}

impl TypeDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn subclasses(&self) -> &[String] {
        &self.subclasses
    }

    /// True when `name` is this class or one of its supertypes.
    pub fn has_ancestor_or_self(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| a == name)
    }

    /// Event / PhysicalEntity lineage: species filters are legal.
    pub fn is_species_filterable(&self) -> bool {
        self.species_filterable
    }

    /// ReferenceEntity / ExternalOntology lineage: REFERENCE projection is legal.
    pub fn is_reference_projectable(&self) -> bool {
        self.reference_projectable
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryBuildError {
    #[error("class `{0}` declared twice")]
    DuplicateClass(String),

    #[error("class `{class}` names unknown parent `{parent}`")]
    UnknownParent { class: String, parent: String },

    #[error("class `{0}` participates in a supertype cycle")]
    Cycle(String),
}

/// Declarative registry construction.
///
/// Row order is irrelevant; the builder resolves the hierarchy as a whole.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    rows: Vec<(String, Option<String>)>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a class. `parent = None` marks a hierarchy root.
    pub fn class(mut self, name: &str, parent: Option<&str>) -> Self {
        self.rows.push((name.to_string(), parent.map(str::to_string)));
        self
    }

    pub fn build(self) -> Result<SchemaRegistry, RegistryBuildError> {
        let mut parent_of: BTreeMap<String, Option<String>> = BTreeMap::new();
        for (name, parent) in &self.rows {
            if parent_of.insert(name.clone(), parent.clone()).is_some() {
                return Err(RegistryBuildError::DuplicateClass(name.clone()));
            }
        }

        // Validate every parent edge before walking chains.
        for (name, parent) in &parent_of {
            if let Some(parent) = parent {
                if !parent_of.contains_key(parent) {
                    return Err(RegistryBuildError::UnknownParent {
                        class: name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        // Ancestor chains, with cycle detection. The hierarchy is small, so a
        // plain walk per class is fine.
        let mut ancestors_of: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in parent_of.keys() {
            let mut chain = Vec::new();
            let mut seen = BTreeSet::new();
            seen.insert(name.clone());
            let mut cursor = parent_of[name].clone();
            while let Some(parent) = cursor {
                if !seen.insert(parent.clone()) {
                    return Err(RegistryBuildError::Cycle(name.clone()));
                }
                chain.push(parent.clone());
                cursor = parent_of[&parent].clone();
            }
            ancestors_of.insert(name.clone(), chain);
        }

        // Subclass sets: every class contributes itself to each ancestor.
        let mut subclasses_of: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (name, ancestors) in &ancestors_of {
            subclasses_of
                .entry(name.clone())
                .or_default()
                .insert(name.clone());
            for ancestor in ancestors {
                subclasses_of
                    .entry(ancestor.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }

        let mut by_name = HashMap::with_capacity(ancestors_of.len());
        for (name, ancestors) in ancestors_of {
            let subclasses: Vec<String> =
                subclasses_of.remove(&name).unwrap_or_default().into_iter().collect();
            let in_lineage = |root: &str| name == root || ancestors.iter().any(|a| a == root);
            let species_filterable = in_lineage(EVENT) || in_lineage(PHYSICAL_ENTITY);
            let reference_projectable =
                in_lineage(REFERENCE_ENTITY) || in_lineage(EXTERNAL_ONTOLOGY);
            let descriptor = TypeDescriptor {
                name: name.clone(),
                ancestors,
                subclasses,
                species_filterable,
                reference_projectable,
            };
            by_name.insert(name, descriptor);
        }

        Ok(SchemaRegistry { by_name })
    }
}

/// Frozen class table. Built once at startup, then shared read-only; resolve
/// never blocks and never mutates.
#[derive(Debug)]
pub struct SchemaRegistry {
    by_name: HashMap<String, TypeDescriptor>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Exact, case-sensitive lookup. `None` means the class does not exist in
    /// the schema at all ("bad request"), never "exists but has no records".
    pub fn resolve(&self, name: &str) -> Option<&TypeDescriptor> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Class names in sorted order, for diagnostics.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The curated pathway-domain hierarchy this service fronts.
    ///
    /// The table is the schema contract: adding a class here is the only way
    /// to make it resolvable.
    pub fn pathway_domain() -> Self {
        let rows: &[(&str, Option<&str>)] = &[
            ("DatabaseObject", None),
            // Events
            ("Event", Some("DatabaseObject")),
            ("Pathway", Some("Event")),
            ("TopLevelPathway", Some("Pathway")),
            ("ReactionLikeEvent", Some("Event")),
            ("Reaction", Some("ReactionLikeEvent")),
            ("BlackBoxEvent", Some("ReactionLikeEvent")),
            ("Polymerisation", Some("ReactionLikeEvent")),
            ("Depolymerisation", Some("ReactionLikeEvent")),
            ("FailedReaction", Some("ReactionLikeEvent")),
            // Physical entities
            ("PhysicalEntity", Some("DatabaseObject")),
            ("Complex", Some("PhysicalEntity")),
            ("Drug", Some("PhysicalEntity")),
            ("ChemicalDrug", Some("Drug")),
            ("ProteinDrug", Some("Drug")),
            ("EntitySet", Some("PhysicalEntity")),
            ("CandidateSet", Some("EntitySet")),
            ("DefinedSet", Some("EntitySet")),
            ("GenomeEncodedEntity", Some("PhysicalEntity")),
            ("EntityWithAccessionedSequence", Some("GenomeEncodedEntity")),
            ("Polymer", Some("PhysicalEntity")),
            ("SimpleEntity", Some("PhysicalEntity")),
            ("OtherEntity", Some("PhysicalEntity")),
            // Reference entities
            ("ReferenceEntity", Some("DatabaseObject")),
            ("ReferenceMolecule", Some("ReferenceEntity")),
            ("ReferenceSequence", Some("ReferenceEntity")),
            ("ReferenceDNASequence", Some("ReferenceSequence")),
            ("ReferenceRNASequence", Some("ReferenceSequence")),
            ("ReferenceGeneProduct", Some("ReferenceSequence")),
            ("ReferenceIsoform", Some("ReferenceGeneProduct")),
            ("ReferenceTherapeutic", Some("ReferenceEntity")),
            // External ontologies
            ("ExternalOntology", Some("DatabaseObject")),
            ("Disease", Some("ExternalOntology")),
            ("CellType", Some("ExternalOntology")),
            ("Compartment", Some("ExternalOntology")),
            // Species records themselves (not species-filterable)
            ("Taxon", Some("DatabaseObject")),
            ("Species", Some("Taxon")),
        ];

        let mut builder = Self::builder();
        for (name, parent) in rows {
            builder = builder.class(name, *parent);
        }
        builder
            .build()
            .expect("curated pathway-domain hierarchy is well-formed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_exact_and_case_sensitive() {
        let registry = SchemaRegistry::pathway_domain();
        assert!(registry.resolve("Pathway").is_some());
        assert!(registry.resolve("pathway").is_none());
        assert!(registry.resolve("Path").is_none());
        assert!(registry.resolve("Bogus").is_none());
    }

    #[test]
    fn ancestors_run_nearest_first() {
        let registry = SchemaRegistry::pathway_domain();
        let reaction = registry.resolve("Reaction").unwrap();
        assert_eq!(
            reaction.ancestors(),
            &["ReactionLikeEvent", "Event", "DatabaseObject"]
        );
        assert!(reaction.has_ancestor_or_self("Event"));
        assert!(reaction.has_ancestor_or_self("Reaction"));
        assert!(!reaction.has_ancestor_or_self("PhysicalEntity"));
    }

    #[test]
    fn subclasses_include_self_and_all_descendants() {
        let registry = SchemaRegistry::pathway_domain();
        let event = registry.resolve("Event").unwrap();
        for class in ["Event", "Pathway", "TopLevelPathway", "Reaction", "BlackBoxEvent"] {
            assert!(
                event.subclasses().iter().any(|c| c == class),
                "Event subclasses missing {class}"
            );
        }
        let leaf = registry.resolve("SimpleEntity").unwrap();
        assert_eq!(leaf.subclasses(), &["SimpleEntity"]);
    }

    #[test]
    fn lineage_flags_follow_the_roots() {
        let registry = SchemaRegistry::pathway_domain();

        let pathway = registry.resolve("Pathway").unwrap();
        assert!(pathway.is_species_filterable());
        assert!(!pathway.is_reference_projectable());

        let complex = registry.resolve("Complex").unwrap();
        assert!(complex.is_species_filterable());

        let molecule = registry.resolve("ReferenceMolecule").unwrap();
        assert!(!molecule.is_species_filterable());
        assert!(molecule.is_reference_projectable());

        let disease = registry.resolve("Disease").unwrap();
        assert!(disease.is_reference_projectable());

        let species = registry.resolve("Species").unwrap();
        assert!(!species.is_species_filterable());
        assert!(!species.is_reference_projectable());
    }

    #[test]
    fn builder_rejects_duplicate_classes() {
        let err = SchemaRegistry::builder()
            .class("A", None)
            .class("A", None)
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryBuildError::DuplicateClass("A".to_string()));
    }

    #[test]
    fn builder_rejects_unknown_parents() {
        let err = SchemaRegistry::builder()
            .class("A", Some("Missing"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryBuildError::UnknownParent {
                class: "A".to_string(),
                parent: "Missing".to_string(),
            }
        );
    }

    #[test]
    fn builder_rejects_cycles() {
        let err = SchemaRegistry::builder()
            .class("A", Some("B"))
            .class("B", Some("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryBuildError::Cycle(_)));
    }
}
