//! IQR outlier filtering and descriptive statistics per metric.
//!
//! All order statistics (Q1, Q3, median) go through [`interpolated_quantile`],
//! the linear interpolation between order statistics at `p * (n - 1)`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::aggregate::{MetricBucket, SpeciesGroup};
use crate::domain::{Metric, TaxId};
use crate::error::StatsError;

pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_MIN_FILTER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Fence distance from the quartiles, in IQRs.
    pub multiplier: f64,
    /// Buckets smaller than this are never filtered.
    pub min_size: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_IQR_MULTIPLIER,
            min_size: DEFAULT_MIN_FILTER_SIZE,
        }
    }
}

/// Value at quantile `p` of an ascending slice. Returns `None` for an empty slice.
pub fn interpolated_quantile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = p.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    let low = sorted[lower];
    let high = sorted[upper.min(last)];
    Some(low + (high - low) * fraction)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Fences {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Tukey fences of an ascending slice with at least one value.
pub fn fences(sorted: &[f64], multiplier: f64) -> Option<Fences> {
    let q1 = interpolated_quantile(sorted, 0.25)?;
    let q3 = interpolated_quantile(sorted, 0.75)?;
    let iqr = q3 - q1;
    Some(Fences {
        q1,
        q3,
        lower: q1 - multiplier * iqr,
        upper: q3 + multiplier * iqr,
    })
}

/// Drops values outside the IQR fences of `sorted`.
///
/// Small buckets pass through untouched, and a filter that would keep
/// nothing falls back to the input.
pub fn iqr_filter(sorted: &[f64], settings: &FilterSettings) -> Vec<f64> {
    if sorted.len() < settings.min_size {
        return sorted.to_vec();
    }
    let Some(fences) = fences(sorted, settings.multiplier) else {
        return Vec::new();
    };
    let kept = sorted
        .iter()
        .copied()
        .filter(|value| fences.contains(*value))
        .collect::<Vec<_>>();
    if kept.is_empty() {
        tracing::warn!(
            lower = fences.lower,
            upper = fences.upper,
            "IQR filter rejected every value, keeping the unfiltered bucket"
        );
        return sorted.to_vec();
    }
    kept
}

/// Summary of one metric after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean: f64,
    pub stdev: f64,
    pub count: usize,
}

impl MetricSummary {
    /// Statistics of an ascending slice; `None` when it is empty.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let count = sorted.len();
        let median = interpolated_quantile(sorted, 0.5)?;
        // sums run on values divided by a power of two near the largest
        // magnitude: exact, and cannot overflow for finite input
        let scale = power_of_two_scale(min.abs().max(max.abs()));
        let scaled_mean = sorted.iter().map(|value| value / scale).sum::<f64>() / count as f64;
        let mean = scaled_mean * scale;
        let stdev = if count >= 2 {
            let squares = sorted
                .iter()
                .map(|value| (value / scale - scaled_mean).powi(2))
                .sum::<f64>();
            (squares / (count - 1) as f64).sqrt() * scale
        } else {
            0.0
        };
        Some(Self {
            min,
            max,
            median,
            mean,
            stdev,
            count,
        })
    }
}

fn power_of_two_scale(magnitude: f64) -> f64 {
    if !magnitude.is_normal() {
        return 1.0;
    }
    magnitude.log2().floor().exp2()
}

/// Filtered statistics for one metric. `summary` is `None` when the bucket was empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub raw_count: usize,
    pub summary: Option<MetricSummary>,
}

impl MetricStats {
    pub fn retained(&self) -> usize {
        self.summary.map(|summary| summary.count).unwrap_or(0)
    }

    pub fn excluded(&self) -> usize {
        self.raw_count - self.retained()
    }
}

/// One output line: a taxid and the statistics of its three metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub species: String,
    pub taxid: TaxId,
    pub genome_size_mb: MetricStats,
    pub gc_percent: MetricStats,
    pub cds_count: MetricStats,
}

impl SummaryRow {
    pub fn metric(&self, metric: Metric) -> &MetricStats {
        match metric {
            Metric::GenomeSize => &self.genome_size_mb,
            Metric::GcPercent => &self.gc_percent,
            Metric::CdsCount => &self.cds_count,
        }
    }
}

pub fn summarize_bucket(
    taxid: TaxId,
    metric: Metric,
    bucket: &MetricBucket,
    settings: &FilterSettings,
) -> Result<MetricStats, StatsError> {
    if let Some(bad) = bucket.values().iter().find(|value| !value.is_finite()) {
        return Err(StatsError::MalformedGroup {
            taxid: taxid.get(),
            reason: format!("non-finite {metric} value {bad}"),
        });
    }
    let mut sorted = bucket.values().to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let kept = iqr_filter(&sorted, settings);
    Ok(MetricStats {
        raw_count: sorted.len(),
        summary: MetricSummary::from_sorted(&kept),
    })
}

pub fn summarize(group: &SpeciesGroup, settings: &FilterSettings) -> Result<SummaryRow, StatsError> {
    let taxid = group.taxid();
    let stats = |metric: Metric| summarize_bucket(taxid, metric, group.bucket(metric), settings);
    Ok(SummaryRow {
        species: group.display_name().to_string(),
        taxid,
        genome_size_mb: stats(Metric::GenomeSize)?,
        gc_percent: stats(Metric::GcPercent)?,
        cds_count: stats(Metric::CdsCount)?,
    })
}
