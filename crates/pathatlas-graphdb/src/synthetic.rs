//! Deterministic synthetic snapshot for demos and tests.
//!
//! The generated dataset is small but shaped like the real thing: two
//! annotated organisms, a pathway/reaction event tree, physical entities,
//! and species-less reference/ontology records. Ids are assigned from a
//! single counter in generation order, so scans interleave classes and
//! pagination tests exercise the ordering contract rather than an accident
//! of layout.

use serde_json::json;

use pathatlas_schema::{Record, SpeciesKey};

use crate::{GraphSnapshot, GraphSnapshotBuilder};

const HUMAN: u32 = 9606;
const MOUSE: u32 = 10090;

fn stable_prefix(taxon: u32) -> &'static str {
    match taxon {
        HUMAN => "R-HSA",
        MOUSE => "R-MMU",
        _ => "R-ALL",
    }
}

/// Build the synthetic snapshot. Deterministic: same records, same ids,
/// every call.
pub fn synthetic_snapshot() -> GraphSnapshot {
    let mut builder = GraphSnapshot::builder();
    let mut next_id = 1_000u64;
    let mut id = move || {
        let id = next_id;
        next_id += 1;
        id
    };

    let mut add = |builder: &mut GraphSnapshotBuilder, record: Record| {
        builder
            .add_record(record)
            .expect("synthetic ids are unique by construction");
    };

    // Event tree: pathways first, a few of them top-level, then reactions.
    for (taxon, pathways, reactions) in [(HUMAN, 40u32, 35u32), (MOUSE, 25, 20)] {
        let species = SpeciesKey::new(taxon);
        let prefix = stable_prefix(taxon);
        for i in 0..pathways {
            let db_id = id();
            let class = if i % 10 == 0 { "TopLevelPathway" } else { "Pathway" };
            add(
                &mut builder,
                Record::new(db_id, class)
                    .with_stable_id(format!("{prefix}-{db_id}"))
                    .with_display_name(format!("Signaling pathway {i}"))
                    .with_species(species)
                    .with_attribute("hasDiagram", json!(i % 3 == 0)),
            );
        }
        for i in 0..reactions {
            let db_id = id();
            let class = match i % 7 {
                0 => "BlackBoxEvent",
                1 => "Polymerisation",
                _ => "Reaction",
            };
            add(
                &mut builder,
                Record::new(db_id, class)
                    .with_stable_id(format!("{prefix}-{db_id}"))
                    .with_display_name(format!("Reaction step {i}"))
                    .with_species(species)
                    .with_attribute("isChimeric", json!(false)),
            );
        }
    }

    // Physical entities for both organisms.
    for (taxon, entities) in [(HUMAN, 30u32), (MOUSE, 18)] {
        let species = SpeciesKey::new(taxon);
        let prefix = stable_prefix(taxon);
        for i in 0..entities {
            let db_id = id();
            let class = match i % 5 {
                0 => "Complex",
                1 => "SimpleEntity",
                2 => "DefinedSet",
                _ => "EntityWithAccessionedSequence",
            };
            add(
                &mut builder,
                Record::new(db_id, class)
                    .with_stable_id(format!("{prefix}-{db_id}"))
                    .with_display_name(format!("Entity {i}"))
                    .with_species(species),
            );
        }
    }

    // Reference records: species-less, carrying external cross-references.
    for i in 0..20u32 {
        let db_id = id();
        add(
            &mut builder,
            Record::new(db_id, "ReferenceMolecule")
                .with_display_name(format!("Small molecule {i}"))
                .with_external_reference(format!("CHEBI:{}", 15_000 + i), "ChEBI"),
        );
    }
    for i in 0..15u32 {
        let db_id = id();
        add(
            &mut builder,
            Record::new(db_id, "ReferenceGeneProduct")
                .with_display_name(format!("Gene product {i}"))
                .with_external_reference(format!("P{:05}", 10_000 + i), "UniProt"),
        );
    }

    // Ontology terms.
    for (i, name) in ["glucose metabolism disorder", "neoplasm", "anemia"]
        .iter()
        .enumerate()
    {
        let db_id = id();
        add(
            &mut builder,
            Record::new(db_id, "Disease")
                .with_display_name((*name).to_string())
                .with_external_reference(format!("DOID:{}", 4_000 + i), "DO"),
        );
    }

    // One deliberately sparse record: present in counts, absent from MINIMAL
    // pages (no display name to project).
    add(
        &mut builder,
        Record::new(id(), "OtherEntity").with_species(SpeciesKey::new(HUMAN)),
    );

    builder.freeze()
}
