use assembly_stats_db::aggregate::GroupAggregator;
use assembly_stats_db::domain::{AssemblyRecord, Metric, NamePolicy, TaxId};
use assembly_stats_db::parser::FieldIssue;
use assembly_stats_db::stats::{FilterSettings, summarize};

#[test]
fn record_without_size_feeds_other_buckets() {
    let taxid = TaxId::new(562);
    let mut aggregator = GroupAggregator::default();
    aggregator.ingest(
        AssemblyRecord::new(taxid, "Escherichia coli")
            .with_gc_percent(50.8)
            .with_cds_count(4300.0),
    );
    aggregator.ingest(AssemblyRecord::new(taxid, "Escherichia coli").with_genome_size(4_600_000.0));

    let aggregation = aggregator.finalize();
    let group = &aggregation.groups[&taxid];
    assert_eq!(group.bucket(Metric::GenomeSize).values(), &[4.6]);
    assert_eq!(group.bucket(Metric::GcPercent).values(), &[50.8]);
    assert_eq!(group.bucket(Metric::CdsCount).values(), &[4300.0]);
}

#[test]
fn record_without_taxid_never_creates_a_group() {
    let mut aggregator = GroupAggregator::default();
    aggregator.ingest(AssemblyRecord {
        taxonomy_id: None,
        organism_name: "Ghost species".to_string(),
        genome_size_bp: Some(1_000_000.0),
        gc_percent: Some(40.0),
        cds_count: Some(900.0),
    });
    assert_eq!(aggregator.group_count(), 0);

    let aggregation = aggregator.finalize();
    assert!(aggregation.groups.is_empty());
    assert_eq!(aggregation.quality.missing_taxid, 1);
    assert_eq!(aggregation.quality.records_accepted, 0);
}

#[test]
fn out_of_domain_values_are_dropped() {
    let taxid = TaxId::new(9);
    let mut aggregator = GroupAggregator::default();
    aggregator.ingest(
        AssemblyRecord::new(taxid, "Buchnera")
            .with_genome_size(-1.0)
            .with_gc_percent(100.5)
            .with_cds_count(-3.0),
    );
    aggregator.ingest(AssemblyRecord::new(taxid, "Buchnera").with_gc_percent(-0.1));
    aggregator.ingest(AssemblyRecord::new(taxid, "Buchnera").with_gc_percent(100.0));
    aggregator.ingest(AssemblyRecord::new(taxid, "Buchnera").with_gc_percent(0.0));

    let aggregation = aggregator.finalize();
    let group = &aggregation.groups[&taxid];
    assert!(group.bucket(Metric::GenomeSize).is_empty());
    assert!(group.bucket(Metric::CdsCount).is_empty());
    assert_eq!(group.bucket(Metric::GcPercent).values(), &[100.0, 0.0]);
    assert_eq!(aggregation.quality.negative_genome_size, 1);
    assert_eq!(aggregation.quality.gc_out_of_range, 2);
    assert_eq!(aggregation.quality.negative_cds_count, 1);
    assert_eq!(aggregation.quality.dropped_values(), 4);
}

#[test]
fn zero_values_are_valid() {
    let taxid = TaxId::new(10);
    let mut aggregator = GroupAggregator::default();
    aggregator.ingest(
        AssemblyRecord::new(taxid, "Empty")
            .with_genome_size(0.0)
            .with_cds_count(0.0),
    );
    let aggregation = aggregator.finalize();
    let group = &aggregation.groups[&taxid];
    assert_eq!(group.bucket(Metric::GenomeSize).len(), 1);
    assert_eq!(group.bucket(Metric::CdsCount).len(), 1);
}

#[test]
fn groups_are_ordered_by_taxid() {
    let mut aggregator = GroupAggregator::default();
    for id in [900, 3, 45, 12] {
        aggregator.ingest(AssemblyRecord::new(TaxId::new(id), format!("taxon {id}")));
    }
    let aggregation = aggregator.finalize();
    let keys = aggregation
        .groups
        .keys()
        .map(|taxid| taxid.get())
        .collect::<Vec<_>>();
    assert_eq!(keys, vec![3, 12, 45, 900]);
}

#[test]
fn name_policies_pick_labels() {
    let taxid = TaxId::new(1280);
    let names = [
        "Staphylococcus aureus subsp. aureus",
        "Staphylococcus aureus",
        "Staphylococcus aureus",
    ];

    let mut first = GroupAggregator::new(NamePolicy::FirstSeen);
    let mut frequent = GroupAggregator::new(NamePolicy::MostFrequent);
    for name in names {
        first.ingest(AssemblyRecord::new(taxid, name));
        frequent.ingest(AssemblyRecord::new(taxid, name));
    }

    assert_eq!(
        first.finalize().groups[&taxid].display_name(),
        "Staphylococcus aureus subsp. aureus"
    );
    let aggregation = frequent.finalize();
    assert_eq!(
        aggregation.groups[&taxid].display_name(),
        "Staphylococcus aureus"
    );
    assert_eq!(aggregation.quality.taxids_with_conflicting_names, 1);
}

#[test]
fn field_issues_are_counted() {
    let mut aggregator = GroupAggregator::default();
    aggregator.note_field_issues(&[
        FieldIssue {
            metric: Metric::GcPercent,
            raw: "abc".to_string(),
        },
        FieldIssue {
            metric: Metric::CdsCount,
            raw: "inf".to_string(),
        },
    ]);
    aggregator.note_malformed_row("too short");
    let quality = aggregator.finalize().quality;
    assert_eq!(quality.unparseable_fields, 2);
    assert_eq!(quality.malformed_rows, 1);
    assert_eq!(quality.dropped_rows(), 1);
}

#[test]
fn non_finite_values_are_dropped_without_failing_the_group() {
    let taxid = TaxId::new(1);
    let mut aggregator = GroupAggregator::default();
    aggregator.ingest(
        AssemblyRecord::new(taxid, "Infinite")
            .with_genome_size(f64::INFINITY)
            .with_gc_percent(f64::NAN)
            .with_cds_count(f64::INFINITY),
    );
    aggregator.ingest(AssemblyRecord::new(taxid, "Infinite").with_cds_count(f64::NEG_INFINITY));

    let aggregation = aggregator.finalize();
    let group = &aggregation.groups[&taxid];
    for metric in Metric::ALL {
        assert!(group.bucket(metric).is_empty());
    }
    assert_eq!(aggregation.quality.non_finite_values, 4);
    assert_eq!(aggregation.quality.negative_cds_count, 0);
    assert_eq!(aggregation.quality.dropped_values(), 4);

    let row = summarize(group, &FilterSettings::default()).unwrap();
    assert_eq!(row.cds_count.retained(), 0);
    assert_eq!(row.genome_size_mb.summary, None);
}
