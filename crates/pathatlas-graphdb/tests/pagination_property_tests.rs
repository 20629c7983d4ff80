//! Pagination correctness properties over randomized snapshots.
//!
//! The core property: walking a filtered scan page by page visits exactly
//! the records of the unwindowed scan, in order, with no repeats and no
//! gaps — for any dataset, any filter, any page size.

use proptest::prelude::*;

use pathatlas_graphdb::GraphSnapshot;
use pathatlas_schema::{Record, SchemaBackend, SpeciesKey};

const CLASSES: &[&str] = &["Pathway", "Reaction", "Complex", "ReferenceMolecule"];
const TAXA: &[u32] = &[9606, 10090, 7955];

const MAX_RECORDS: usize = 60;

#[derive(Debug, Clone)]
struct SnapshotCase {
    /// (class_idx, species_idx: None = species-less record)
    rows: Vec<(usize, Option<usize>)>,
    query_classes: Vec<String>,
    query_species: Option<SpeciesKey>,
    page_size: u64,
}

fn snapshot_case_strategy() -> impl Strategy<Value = SnapshotCase> {
    (
        prop::collection::vec(
            (0..CLASSES.len(), prop::option::of(0..TAXA.len())),
            0..=MAX_RECORDS,
        ),
        prop::collection::vec(0..CLASSES.len(), 1..=CLASSES.len()),
        prop::option::of(0..TAXA.len()),
        1u64..=10,
    )
        .prop_map(|(rows, class_idxs, species_idx, page_size)| {
            let mut query_classes: Vec<String> = class_idxs
                .into_iter()
                .map(|i| CLASSES[i].to_string())
                .collect();
            query_classes.sort();
            query_classes.dedup();
            SnapshotCase {
                rows,
                query_classes,
                query_species: species_idx.map(|i| SpeciesKey::new(TAXA[i])),
                page_size,
            }
        })
}

fn build_snapshot(case: &SnapshotCase) -> GraphSnapshot {
    let mut builder = GraphSnapshot::builder();
    for (i, (class_idx, species_idx)) in case.rows.iter().enumerate() {
        // Spread ids so they are not contiguous; ordering must come from the
        // id values themselves.
        let db_id = 10 + (i as u64) * 7;
        let mut record = Record::new(db_id, CLASSES[*class_idx])
            .with_stable_id(format!("R-TST-{db_id}"))
            .with_display_name(format!("record {i}"));
        if let Some(sp) = species_idx {
            record = record.with_species(SpeciesKey::new(TAXA[*sp]));
        }
        builder.add_record(record).unwrap();
    }
    builder.freeze()
}

proptest! {
    #[test]
    fn paging_never_repeats_or_skips(case in snapshot_case_strategy()) {
        let snapshot = build_snapshot(&case);

        let full: Vec<u64> = snapshot
            .scan(&case.query_classes, case.query_species, 0, u64::MAX)
            .unwrap()
            .iter()
            .map(|r| r.db_id)
            .collect();

        let mut paged: Vec<u64> = Vec::new();
        let mut page = 0u64;
        loop {
            let chunk = snapshot
                .scan(
                    &case.query_classes,
                    case.query_species,
                    page * case.page_size,
                    case.page_size,
                )
                .unwrap();
            if chunk.is_empty() {
                break;
            }
            prop_assert!(chunk.len() as u64 <= case.page_size);
            paged.extend(chunk.iter().map(|r| r.db_id));
            page += 1;
        }

        prop_assert_eq!(&paged, &full);
    }

    #[test]
    fn scan_order_is_strictly_ascending(case in snapshot_case_strategy()) {
        let snapshot = build_snapshot(&case);
        let ids: Vec<u64> = snapshot
            .scan(&case.query_classes, case.query_species, 0, u64::MAX)
            .unwrap()
            .iter()
            .map(|r| r.db_id)
            .collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn count_is_zero_iff_scan_is_empty(case in snapshot_case_strategy()) {
        let snapshot = build_snapshot(&case);
        let count = snapshot
            .count(&case.query_classes, case.query_species)
            .unwrap();
        let scanned = snapshot
            .scan(&case.query_classes, case.query_species, 0, u64::MAX)
            .unwrap();
        prop_assert_eq!(count, scanned.len() as u64);
        prop_assert_eq!(count == 0, scanned.is_empty());
    }

    #[test]
    fn repeated_identical_queries_agree(case in snapshot_case_strategy()) {
        let snapshot = build_snapshot(&case);
        let a = snapshot
            .scan(&case.query_classes, case.query_species, case.page_size, case.page_size)
            .unwrap();
        let b = snapshot
            .scan(&case.query_classes, case.query_species, case.page_size, case.page_size)
            .unwrap();
        prop_assert_eq!(a, b);
    }
}
