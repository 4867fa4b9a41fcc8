use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{AssemblyRecord, Metric, NamePolicy, TaxId};
use crate::parser::FieldIssue;

pub const BP_PER_MB: f64 = 1_000_000.0;

/// Raw values of one metric for one taxid. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricBucket {
    values: Vec<f64>,
}

impl MetricBucket {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.values.push(value);
    }
}

impl FromIterator<f64> for MetricBucket {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Everything collected for one taxid. The size bucket holds megabase pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesGroup {
    taxid: TaxId,
    display_name: String,
    size_mb: MetricBucket,
    gc_percent: MetricBucket,
    cds_count: MetricBucket,
}

impl SpeciesGroup {
    pub(crate) fn new(taxid: TaxId, display_name: String) -> Self {
        Self {
            taxid,
            display_name,
            size_mb: MetricBucket::default(),
            gc_percent: MetricBucket::default(),
            cds_count: MetricBucket::default(),
        }
    }

    pub fn taxid(&self) -> TaxId {
        self.taxid
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bucket(&self, metric: Metric) -> &MetricBucket {
        match metric {
            Metric::GenomeSize => &self.size_mb,
            Metric::GcPercent => &self.gc_percent,
            Metric::CdsCount => &self.cds_count,
        }
    }

    pub(crate) fn bucket_mut(&mut self, metric: Metric) -> &mut MetricBucket {
        match metric {
            Metric::GenomeSize => &mut self.size_mb,
            Metric::GcPercent => &mut self.gc_percent,
            Metric::CdsCount => &mut self.cds_count,
        }
    }
}

/// Row- and field-level data problems seen during a run. None of them are fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQualityReport {
    pub lines_read: u64,
    pub records_accepted: u64,
    pub missing_taxid: u64,
    pub malformed_rows: u64,
    pub unparseable_fields: u64,
    pub non_finite_values: u64,
    pub negative_genome_size: u64,
    pub gc_out_of_range: u64,
    pub negative_cds_count: u64,
    pub taxids_with_conflicting_names: u64,
}

impl DataQualityReport {
    pub fn dropped_rows(&self) -> u64 {
        self.missing_taxid + self.malformed_rows
    }

    pub fn dropped_values(&self) -> u64 {
        self.unparseable_fields
            + self.non_finite_values
            + self.negative_genome_size
            + self.gc_out_of_range
            + self.negative_cds_count
    }
}

/// Result of a finished aggregation, keyed in ascending taxid order.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub groups: BTreeMap<TaxId, SpeciesGroup>,
    pub quality: DataQualityReport,
}

#[derive(Debug)]
struct GroupState {
    group: SpeciesGroup,
    // (name, occurrences) in first-seen order
    names: Vec<(String, u64)>,
}

impl GroupState {
    fn observe_name(&mut self, name: &str) {
        match self.names.iter_mut().find(|(seen, _)| seen == name) {
            Some((_, count)) => *count += 1,
            None => self.names.push((name.to_string(), 1)),
        }
    }

    fn resolve_name(&self, policy: NamePolicy) -> Option<String> {
        match policy {
            NamePolicy::FirstSeen => self.names.first().map(|(name, _)| name.clone()),
            NamePolicy::MostFrequent => self
                .names
                .iter()
                .max_by(|(a_name, a_count), (b_name, b_count)| {
                    a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
                })
                .map(|(name, _)| name.clone()),
        }
    }
}

/// Buckets metric values per taxid. Owns all state for the run.
#[derive(Debug, Default)]
pub struct GroupAggregator {
    groups: HashMap<TaxId, GroupState>,
    quality: DataQualityReport,
    name_policy: NamePolicy,
}

impl GroupAggregator {
    pub fn new(name_policy: NamePolicy) -> Self {
        Self {
            groups: HashMap::new(),
            quality: DataQualityReport::default(),
            name_policy,
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn ingest(&mut self, record: AssemblyRecord) {
        let Some(taxid) = record.taxonomy_id else {
            tracing::debug!(
                organism = %record.organism_name,
                "dropping record without a taxonomy id"
            );
            self.quality.missing_taxid += 1;
            return;
        };
        self.quality.records_accepted += 1;
        let genome_size_bp = self.finite_or_drop(taxid, Metric::GenomeSize, record.genome_size_bp);
        let gc_percent = self.finite_or_drop(taxid, Metric::GcPercent, record.gc_percent);
        let cds_count = self.finite_or_drop(taxid, Metric::CdsCount, record.cds_count);

        let state = self.groups.entry(taxid).or_insert_with(|| GroupState {
            group: SpeciesGroup::new(taxid, record.organism_name.clone()),
            names: Vec::new(),
        });
        if let Some((first, _)) = state.names.first()
            && *first != record.organism_name
        {
            tracing::debug!(
                %taxid,
                first = %first,
                other = %record.organism_name,
                "taxid has multiple organism names"
            );
        }
        state.observe_name(&record.organism_name);

        if let Some(bp) = genome_size_bp {
            if bp >= 0.0 {
                state
                    .group
                    .bucket_mut(Metric::GenomeSize)
                    .push(bp / BP_PER_MB);
            } else {
                tracing::debug!(%taxid, bp, "dropping negative genome size");
                self.quality.negative_genome_size += 1;
            }
        }

        if let Some(gc) = gc_percent {
            if (0.0..=100.0).contains(&gc) {
                state.group.bucket_mut(Metric::GcPercent).push(gc);
            } else {
                tracing::debug!(%taxid, gc, "dropping GC percent outside [0, 100]");
                self.quality.gc_out_of_range += 1;
            }
        }

        if let Some(cds) = cds_count {
            if cds >= 0.0 {
                state.group.bucket_mut(Metric::CdsCount).push(cds);
            } else {
                tracing::debug!(%taxid, cds, "dropping negative CDS count");
                self.quality.negative_cds_count += 1;
            }
        }
    }

    fn finite_or_drop(&mut self, taxid: TaxId, metric: Metric, value: Option<f64>) -> Option<f64> {
        let value = value?;
        if value.is_finite() {
            return Some(value);
        }
        tracing::debug!(%taxid, %metric, value, "dropping non-finite value");
        self.quality.non_finite_values += 1;
        None
    }

    pub fn note_field_issues(&mut self, issues: &[FieldIssue]) {
        for issue in issues {
            tracing::debug!(metric = %issue.metric, raw = %issue.raw, "unparseable numeric field");
        }
        self.quality.unparseable_fields += issues.len() as u64;
    }

    pub fn note_malformed_row(&mut self, reason: &str) {
        tracing::debug!("dropping malformed row: {reason}");
        self.quality.malformed_rows += 1;
    }

    pub fn finalize(self) -> Aggregation {
        let mut quality = self.quality;
        let policy = self.name_policy;
        let groups = self
            .groups
            .into_iter()
            .map(|(taxid, state)| {
                if state.names.len() > 1 {
                    quality.taxids_with_conflicting_names += 1;
                }
                let name = state.resolve_name(policy);
                let mut group = state.group;
                if let Some(name) = name {
                    group.display_name = name;
                }
                (taxid, group)
            })
            .collect();
        Aggregation { groups, quality }
    }
}
