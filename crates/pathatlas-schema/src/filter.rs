//! Filter construction: raw request parameters to a validated query filter.
//!
//! All lineage rules are enforced here, before any query is composed:
//! a species filter against a class outside the Event / PhysicalEntity
//! lineages, or a REFERENCE projection against a class outside the
//! ReferenceEntity / ExternalOntology lineages, is rejected up front rather
//! than discovered (or silently ignored) at projection time.

use thiserror::Error;

use crate::projection::ProjectionLevel;
use crate::registry::TypeDescriptor;
use crate::species::{SpeciesCatalog, SpeciesKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown species `{raw}`")]
    UnknownSpecies { raw: String },

    #[error("species `{raw}` is ambiguous ({candidates} taxa share that name)")]
    AmbiguousSpecies { raw: String, candidates: usize },

    #[error(
        "class `{class}` does not support species filtering \
         (requires Event or PhysicalEntity lineage)"
    )]
    SpeciesUnsupported { class: String },

    #[error(
        "class `{class}` does not support {level} projection \
         (requires ReferenceEntity or ExternalOntology lineage)"
    )]
    ProjectionUnsupported { class: String, level: ProjectionLevel },
}

/// A validated species filter. Either absent, or exactly one canonical key;
/// nothing in between survives construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesFilter {
    Unfiltered,
    Species(SpeciesKey),
}

impl SpeciesFilter {
    /// Build a filter for `descriptor` from the raw request parameter.
    ///
    /// An absent parameter is the unfiltered marker, not an error. A present
    /// parameter must pass the lineage gate and resolve to exactly one
    /// canonical species.
    pub fn build(
        descriptor: &TypeDescriptor,
        catalog: &SpeciesCatalog,
        raw: Option<&str>,
    ) -> Result<Self, FilterError> {
        let Some(raw) = raw else {
            return Ok(Self::Unfiltered);
        };
        if !descriptor.is_species_filterable() {
            return Err(FilterError::SpeciesUnsupported {
                class: descriptor.name().to_string(),
            });
        }
        Ok(Self::Species(catalog.resolve(raw)?))
    }

    pub fn species(&self) -> Option<SpeciesKey> {
        match self {
            Self::Unfiltered => None,
            Self::Species(key) => Some(*key),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        matches!(self, Self::Unfiltered)
    }
}

/// Gate for the REFERENCE output shape. Rejection here, not a silent
/// downgrade to another shape.
pub fn ensure_reference_projectable(descriptor: &TypeDescriptor) -> Result<(), FilterError> {
    if descriptor.is_reference_projectable() {
        Ok(())
    } else {
        Err(FilterError::ProjectionUnsupported {
            class: descriptor.name().to_string(),
            level: ProjectionLevel::Reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistry;

    #[test]
    fn absent_species_is_unfiltered() {
        let registry = SchemaRegistry::pathway_domain();
        let catalog = SpeciesCatalog::curated();
        let pathway = registry.resolve("Pathway").unwrap();

        let filter = SpeciesFilter::build(pathway, &catalog, None).unwrap();
        assert!(filter.is_unfiltered());
        assert_eq!(filter.species(), None);
    }

    #[test]
    fn species_filter_resolves_to_one_key() {
        let registry = SchemaRegistry::pathway_domain();
        let catalog = SpeciesCatalog::curated();
        let pathway = registry.resolve("Pathway").unwrap();

        let filter = SpeciesFilter::build(pathway, &catalog, Some("Homo sapiens")).unwrap();
        assert_eq!(filter.species(), Some(SpeciesKey::new(9606)));
    }

    #[test]
    fn species_filter_outside_lineage_is_rejected_before_resolution() {
        let registry = SchemaRegistry::pathway_domain();
        let catalog = SpeciesCatalog::curated();
        let molecule = registry.resolve("ReferenceMolecule").unwrap();

        // Even a perfectly valid species string fails the lineage gate.
        let err = SpeciesFilter::build(molecule, &catalog, Some("Homo sapiens")).unwrap_err();
        assert_eq!(
            err,
            FilterError::SpeciesUnsupported {
                class: "ReferenceMolecule".to_string()
            }
        );
    }

    #[test]
    fn reference_projection_gate() {
        let registry = SchemaRegistry::pathway_domain();
        assert!(ensure_reference_projectable(registry.resolve("ReferenceMolecule").unwrap()).is_ok());
        assert!(ensure_reference_projectable(registry.resolve("Disease").unwrap()).is_ok());

        let err = ensure_reference_projectable(registry.resolve("Pathway").unwrap()).unwrap_err();
        assert!(matches!(err, FilterError::ProjectionUnsupported { .. }));
    }
}
