use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// NCBI taxonomy identifier, the grouping key of the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaxId(u32);

impl TaxId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxId {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let is_valid = !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(StatsError::InvalidTaxId(value.to_string()));
        }
        trimmed
            .parse::<u32>()
            .map(Self)
            .map_err(|_| StatsError::InvalidTaxId(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    GenomeSize,
    GcPercent,
    CdsCount,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::GenomeSize, Metric::GcPercent, Metric::CdsCount];
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::GenomeSize => write!(f, "genome_size"),
            Metric::GcPercent => write!(f, "gc_percent"),
            Metric::CdsCount => write!(f, "cds_count"),
        }
    }
}

/// Which organism name labels a taxid whose assemblies disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamePolicy {
    FirstSeen,
    #[default]
    MostFrequent,
}

/// One parsed line of an assembly summary feed.
///
/// Numeric fields are taken as written; range checks happen at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyRecord {
    pub taxonomy_id: Option<TaxId>,
    pub organism_name: String,
    pub genome_size_bp: Option<f64>,
    pub gc_percent: Option<f64>,
    pub cds_count: Option<f64>,
}

impl AssemblyRecord {
    pub fn new(taxonomy_id: TaxId, organism_name: impl Into<String>) -> Self {
        Self {
            taxonomy_id: Some(taxonomy_id),
            organism_name: organism_name.into(),
            genome_size_bp: None,
            gc_percent: None,
            cds_count: None,
        }
    }

    pub fn with_genome_size(mut self, bp: f64) -> Self {
        self.genome_size_bp = Some(bp);
        self
    }

    pub fn with_gc_percent(mut self, gc: f64) -> Self {
        self.gc_percent = Some(gc);
        self
    }

    pub fn with_cds_count(mut self, cds: f64) -> Self {
        self.cds_count = Some(cds);
        self
    }
}
