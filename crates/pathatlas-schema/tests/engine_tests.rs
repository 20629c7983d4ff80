//! Engine tests over mock backends.
//!
//! The in-memory store crate has its own coverage; these tests pin the
//! engine-side contracts with backends small enough to reason about exactly.

use std::sync::Arc;

use pathatlas_schema::{
    BackendError, FilterError, PageError, ProjectedRecord, ProjectionLevel, Record,
    SchemaBackend, SchemaQueryError, SchemaQueryService, SchemaRegistry, SpeciesCatalog,
    SpeciesKey,
};

/// Sorted in-memory backend honoring the scan/count contract.
struct VecBackend {
    records: Vec<Record>,
}

impl VecBackend {
    fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.db_id);
        Self { records }
    }

    fn matching<'a>(
        &'a self,
        classes: &'a [String],
        species: Option<SpeciesKey>,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| {
            classes.iter().any(|c| *c == r.class_name)
                && species.map_or(true, |want| r.species == Some(want))
        })
    }
}

impl SchemaBackend for VecBackend {
    fn scan(
        &self,
        classes: &[String],
        species: Option<SpeciesKey>,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Record>, BackendError> {
        Ok(self
            .matching(classes, species)
            .skip(skip as usize)
            .take(take as usize)
            .cloned()
            .collect())
    }

    fn count(&self, classes: &[String], species: Option<SpeciesKey>) -> Result<u64, BackendError> {
        Ok(self.matching(classes, species).count() as u64)
    }
}

/// Backend whose I/O always fails.
struct FailingBackend;

impl SchemaBackend for FailingBackend {
    fn scan(
        &self,
        _classes: &[String],
        _species: Option<SpeciesKey>,
        _skip: u64,
        _take: u64,
    ) -> Result<Vec<Record>, BackendError> {
        Err(BackendError::Io("connection reset by peer".to_string()))
    }

    fn count(&self, _classes: &[String], _species: Option<SpeciesKey>) -> Result<u64, BackendError> {
        Err(BackendError::Io("connection reset by peer".to_string()))
    }
}

const HUMAN: SpeciesKey = SpeciesKey::new(9606);
const MOUSE: SpeciesKey = SpeciesKey::new(10090);

fn sample_records() -> Vec<Record> {
    let mut records = Vec::new();
    for i in 0..8u64 {
        records.push(
            Record::new(100 + i, "Pathway")
                .with_stable_id(format!("R-HSA-{}", 100 + i))
                .with_display_name(format!("Human pathway {i}"))
                .with_species(HUMAN),
        );
    }
    for i in 0..3u64 {
        records.push(
            Record::new(200 + i, "Pathway")
                .with_stable_id(format!("R-MMU-{}", 200 + i))
                .with_display_name(format!("Mouse pathway {i}"))
                .with_species(MOUSE),
        );
    }
    records.push(
        Record::new(300, "Reaction")
            .with_stable_id("R-HSA-300")
            .with_display_name("Human reaction")
            .with_species(HUMAN),
    );
    records.push(
        Record::new(400, "ReferenceMolecule")
            .with_display_name("ATP")
            .with_external_reference("CHEBI:30616", "ChEBI"),
    );
    records
}

fn service(records: Vec<Record>) -> SchemaQueryService<VecBackend> {
    SchemaQueryService::new(
        Arc::new(SchemaRegistry::pathway_domain()),
        Arc::new(SpeciesCatalog::curated()),
        VecBackend::new(records),
    )
}

#[test]
fn scan_through_a_supertype_matches_concrete_subclasses() {
    let service = service(sample_records());

    // `Event` covers Pathway and Reaction records.
    let result = service
        .records("Event", None, 1, 100, ProjectionLevel::Minimal)
        .unwrap();
    assert_eq!(result.total, 12);
    assert_eq!(result.records.len(), 12);

    // Querying the concrete class narrows it.
    let result = service
        .records("Reaction", None, 1, 100, ProjectionLevel::Minimal)
        .unwrap();
    assert_eq!(result.total, 1);
}

#[test]
fn species_filter_applies_before_pagination() {
    let service = service(sample_records());

    let result = service
        .records("Pathway", Some("Homo sapiens"), 1, 5, ProjectionLevel::Minimal)
        .unwrap();
    // Page 1 of the *human* pathways, not a filtered page 1 of everything.
    assert_eq!(result.records.len(), 5);
    assert_eq!(result.total, 8);
    let ids: Vec<u64> = result.records.iter().map(ProjectedRecord::db_id).collect();
    assert_eq!(ids, vec![100, 101, 102, 103, 104]);
}

#[test]
fn count_matches_scan_for_every_filter() {
    let service = service(sample_records());

    for (class, species) in [
        ("Pathway", None),
        ("Pathway", Some("Homo sapiens")),
        ("Pathway", Some("10090")),
        ("Event", None),
        ("ReferenceMolecule", None),
        ("TopLevelPathway", None),
    ] {
        let count = service.count_entries(class, species).unwrap();
        let scanned = service
            .records(class, species, 1, 20_000, ProjectionLevel::Minimal)
            .unwrap();
        assert_eq!(
            count,
            scanned.total,
            "count/scan disagree for {class} / {species:?}"
        );
        assert_eq!(count == 0, scanned.total == 0);
    }
}

#[test]
fn empty_result_is_ok_not_an_error() {
    let service = service(sample_records());

    // TopLevelPathway resolves but has no records.
    let result = service
        .records("TopLevelPathway", None, 1, 10, ProjectionLevel::Full)
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.total, 0);

    // A species with zero matches is likewise a normal empty result.
    let result = service
        .records("Pathway", Some("Danio rerio"), 1, 10, ProjectionLevel::Minimal)
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(service.count_entries("Pathway", Some("Danio rerio")).unwrap(), 0);
}

#[test]
fn unknown_class_is_type_not_found() {
    let service = service(sample_records());
    let err = service
        .records("Bogus", None, 1, 10, ProjectionLevel::Full)
        .unwrap_err();
    assert!(matches!(err, SchemaQueryError::TypeNotFound { ref class } if class == "Bogus"));

    let err = service.count_entries("Bogus", None).unwrap_err();
    assert!(matches!(err, SchemaQueryError::TypeNotFound { .. }));
}

#[test]
fn unknown_species_is_invalid_filter_not_zero_count() {
    let service = service(sample_records());
    let err = service.count_entries("Pathway", Some("Unknown Species")).unwrap_err();
    assert!(matches!(
        err,
        SchemaQueryError::InvalidFilter(FilterError::UnknownSpecies { .. })
    ));
}

#[test]
fn species_filter_outside_event_or_physical_entity_lineage_is_rejected() {
    let service = service(sample_records());
    let err = service
        .records(
            "ReferenceMolecule",
            Some("Homo sapiens"),
            1,
            10,
            ProjectionLevel::Minimal,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaQueryError::InvalidFilter(FilterError::SpeciesUnsupported { .. })
    ));
}

#[test]
fn reference_projection_outside_lineage_is_rejected_not_downgraded() {
    let service = service(sample_records());
    let err = service
        .records("Pathway", None, 1, 10, ProjectionLevel::Reference)
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaQueryError::InvalidFilter(FilterError::ProjectionUnsupported { .. })
    ));

    // The eligible lineage projects fine.
    let result = service
        .records("ReferenceMolecule", None, 1, 10, ProjectionLevel::Reference)
        .unwrap();
    assert_eq!(result.records.len(), 1);
    assert!(matches!(result.records[0], ProjectedRecord::Reference(_)));
}

#[test]
fn oversize_page_clamps_and_invalid_page_rejects() {
    let service = service(sample_records());

    // 30 requested against the FULL cap of 25: clamped, not an error.
    let result = service
        .records("Pathway", None, 1, 30, ProjectionLevel::Full)
        .unwrap();
    assert!(result.records.len() <= 25);

    let err = service
        .records("Pathway", None, 0, 10, ProjectionLevel::Full)
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaQueryError::InvalidPage(PageError::Page(0))
    ));

    let err = service
        .records("Pathway", None, 1, -5, ProjectionLevel::Full)
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaQueryError::InvalidPage(PageError::Size(-5))
    ));
}

#[test]
fn consecutive_pages_never_repeat_or_skip() {
    let service = service(sample_records());

    let mut seen: Vec<u64> = Vec::new();
    for page in 1..=4 {
        let result = service
            .records("Pathway", None, page, 3, ProjectionLevel::Minimal)
            .unwrap();
        seen.extend(result.records.iter().map(ProjectedRecord::db_id));
    }

    let full = service
        .records("Pathway", None, 1, 20_000, ProjectionLevel::Minimal)
        .unwrap();
    let expected: Vec<u64> = full.records.iter().map(ProjectedRecord::db_id).collect();
    assert_eq!(seen, expected);
}

#[test]
fn records_that_cannot_satisfy_the_shape_are_omitted() {
    let mut records = sample_records();
    // A pathway with no display name cannot satisfy MINIMAL.
    records.push(Record::new(500, "Pathway").with_stable_id("R-HSA-500").with_species(HUMAN));
    let service = service(records);

    let result = service
        .records("Pathway", None, 1, 20_000, ProjectionLevel::Minimal)
        .unwrap();
    // Total still counts it; the page omits it.
    assert_eq!(result.total, 12);
    assert_eq!(result.records.len(), 11);
    assert!(result.records.iter().all(|r| r.db_id() != 500));
}

#[test]
fn backend_failure_is_surfaced_never_conflated_with_empty() {
    let service = SchemaQueryService::new(
        Arc::new(SchemaRegistry::pathway_domain()),
        Arc::new(SpeciesCatalog::curated()),
        FailingBackend,
    );

    let err = service
        .records("Pathway", None, 1, 10, ProjectionLevel::Full)
        .unwrap_err();
    assert!(matches!(err, SchemaQueryError::BackendUnavailable(_)));
    assert!(!err.is_user_error());

    let err = service.count_entries("Pathway", None).unwrap_err();
    assert!(matches!(err, SchemaQueryError::BackendUnavailable(_)));

    // User errors still fail fast before the backend is touched.
    let err = service
        .records("Bogus", None, 1, 10, ProjectionLevel::Full)
        .unwrap_err();
    assert!(matches!(err, SchemaQueryError::TypeNotFound { .. }));
}
