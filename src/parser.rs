use serde::{Deserialize, Serialize};

use crate::domain::{AssemblyRecord, Metric, TaxId};
use crate::error::StatsError;

/// Zero-based column positions of the fields the aggregator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub taxid: usize,
    pub organism_name: usize,
    pub genome_size: usize,
    pub gc_percent: usize,
    pub cds_count: usize,
}

impl Default for ColumnLayout {
    /// Layout of NCBI `assembly_summary.txt` (RefSeq and GenBank).
    fn default() -> Self {
        Self {
            taxid: 5,
            organism_name: 7,
            genome_size: 25,
            gc_percent: 27,
            cds_count: 35,
        }
    }
}

impl ColumnLayout {
    pub const TAXID_COLUMN: &'static str = "taxid";
    pub const ORGANISM_COLUMN: &'static str = "organism_name";
    pub const GENOME_SIZE_COLUMN: &'static str = "genome_size";
    pub const GC_COLUMN: &'static str = "gc_percent";
    pub const CDS_COLUMN: &'static str = "protein_coding_gene_count";

    /// Resolves positions from a header line such as `#assembly_accession\tbioproject\t...`.
    pub fn from_header(line: &str) -> Result<Self, StatsError> {
        let names = line
            .trim_start_matches('#')
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(str::trim)
            .collect::<Vec<_>>();
        let find = |name: &str| {
            names
                .iter()
                .position(|column| *column == name)
                .ok_or_else(|| StatsError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            taxid: find(Self::TAXID_COLUMN)?,
            organism_name: find(Self::ORGANISM_COLUMN)?,
            genome_size: find(Self::GENOME_SIZE_COLUMN)?,
            gc_percent: find(Self::GC_COLUMN)?,
            cds_count: find(Self::CDS_COLUMN)?,
        })
    }

    fn min_columns(&self) -> usize {
        [
            self.taxid,
            self.organism_name,
            self.genome_size,
            self.gc_percent,
            self.cds_count,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

/// A numeric field that was present but could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub metric: Metric,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Skip,
    Header(ColumnLayout),
    Record(AssemblyRecord, Vec<FieldIssue>),
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct RecordParser {
    layout: ColumnLayout,
    follow_header: bool,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(ColumnLayout::default())
    }
}

impl RecordParser {
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            layout,
            follow_header: true,
        }
    }

    /// Keeps the configured layout even when the feed carries a header line.
    pub fn with_fixed_layout(mut self) -> Self {
        self.follow_header = false;
        self
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    pub fn parse_line(&mut self, line: &str) -> LineOutcome {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return LineOutcome::Skip;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if self.follow_header && is_header(comment) {
                match ColumnLayout::from_header(comment) {
                    Ok(layout) => {
                        self.layout = layout;
                        return LineOutcome::Header(layout);
                    }
                    Err(err) => {
                        tracing::debug!("ignoring header line: {err}");
                    }
                }
            }
            return LineOutcome::Skip;
        }

        let fields = line.split('\t').collect::<Vec<_>>();
        if fields.len() < self.layout.min_columns() {
            return LineOutcome::Malformed(format!(
                "expected at least {} columns, found {}",
                self.layout.min_columns(),
                fields.len()
            ));
        }

        let mut issues = Vec::new();
        let taxonomy_id = fields[self.layout.taxid].parse::<TaxId>().ok();
        let organism_name = fields[self.layout.organism_name].trim().to_string();
        let genome_size_bp = parse_number(
            fields[self.layout.genome_size],
            Metric::GenomeSize,
            &mut issues,
        );
        let gc_percent = parse_number(fields[self.layout.gc_percent], Metric::GcPercent, &mut issues);
        let cds_count = parse_number(fields[self.layout.cds_count], Metric::CdsCount, &mut issues)
            .map(f64::trunc);

        LineOutcome::Record(
            AssemblyRecord {
                taxonomy_id,
                organism_name,
                genome_size_bp,
                gc_percent,
                cds_count,
            },
            issues,
        )
    }
}

fn is_header(comment: &str) -> bool {
    comment.trim_start().starts_with("assembly_accession")
}

/// Reads a numeric cell. Missing-value sentinels are silently absent;
/// anything else that fails to parse, or is not finite, is recorded.
pub fn parse_number(raw: &str, metric: Metric, issues: &mut Vec<FieldIssue>) -> Option<f64> {
    let value = raw.trim();
    if is_missing_sentinel(value) {
        return None;
    }
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Some(number),
        _ => {
            issues.push(FieldIssue {
                metric,
                raw: value.to_string(),
            });
            None
        }
    }
}

fn is_missing_sentinel(value: &str) -> bool {
    value.is_empty() || value == "-" || value.eq_ignore_ascii_case("na")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn row(taxid: &str, name: &str, size: &str, gc: &str, cds: &str) -> String {
        let mut fields = vec!["x"; 38];
        fields[5] = taxid;
        fields[7] = name;
        fields[25] = size;
        fields[27] = gc;
        fields[35] = cds;
        fields.join("\t")
    }

    #[test]
    fn parse_default_layout() {
        let mut parser = RecordParser::default();
        let line = row("562", "Escherichia coli", "4641652", "50.5", "4300");
        let outcome = parser.parse_line(&line);
        assert_matches!(outcome, LineOutcome::Record(record, issues) => {
            assert_eq!(record.taxonomy_id, Some(TaxId::new(562)));
            assert_eq!(record.organism_name, "Escherichia coli");
            assert_eq!(record.genome_size_bp, Some(4641652.0));
            assert_eq!(record.gc_percent, Some(50.5));
            assert_eq!(record.cds_count, Some(4300.0));
            assert!(issues.is_empty());
        });
    }

    #[test]
    fn sentinels_are_silent() {
        let mut parser = RecordParser::default();
        let outcome = parser.parse_line(&row("562", "E. coli", "na", "", "-"));
        assert_matches!(outcome, LineOutcome::Record(record, issues) => {
            assert_eq!(record.genome_size_bp, None);
            assert_eq!(record.gc_percent, None);
            assert_eq!(record.cds_count, None);
            assert!(issues.is_empty());
        });
    }

    #[test]
    fn garbage_numbers_are_reported() {
        let mut parser = RecordParser::default();
        let outcome = parser.parse_line(&row("562", "E. coli", "4.6M", "nan", "12.9"));
        assert_matches!(outcome, LineOutcome::Record(record, issues) => {
            assert_eq!(record.genome_size_bp, None);
            assert_eq!(record.gc_percent, None);
            assert_eq!(record.cds_count, Some(12.0));
            assert_eq!(issues.len(), 2);
            assert_eq!(issues[0].metric, Metric::GenomeSize);
        });
    }

    #[test]
    fn short_rows_are_malformed() {
        let mut parser = RecordParser::default();
        assert_matches!(parser.parse_line("a\tb\tc"), LineOutcome::Malformed(_));
    }
}
