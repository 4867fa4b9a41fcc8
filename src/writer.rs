use std::fs;
use std::io::{self, BufWriter, Write};

use camino::Utf8Path;

use crate::domain::Metric;
use crate::error::StatsError;
use crate::stats::{MetricStats, SummaryRow};

pub const DEFAULT_PRECISION: usize = 2;

pub const HEADER: [&str; 20] = [
    "Species",
    "Min",
    "Max",
    "Median",
    "Mean",
    "StDev",
    "Assembly_count",
    "GC_Min",
    "GC_Max",
    "GC_Median",
    "GC_Mean",
    "GC_Stdev",
    "GC_count",
    "CDS_Min",
    "CDS_Max",
    "CDS_Median",
    "CDS_Mean",
    "CDS_Stdev",
    "CDS_count",
    "Consensus_TAXID",
];

/// Tab-separated summary table, one row per taxid.
#[derive(Debug, Clone, Copy)]
pub struct TableWriter {
    precision: usize,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl TableWriter {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn write_rows<W: Write>(&self, rows: &[SummaryRow], out: W) -> io::Result<()> {
        let mut out = BufWriter::new(out);
        writeln!(out, "{}", HEADER.join("\t"))?;
        for row in rows {
            writeln!(out, "{}", self.format_row(row).join("\t"))?;
        }
        out.flush()
    }

    pub fn format_row(&self, row: &SummaryRow) -> Vec<String> {
        let mut cells = Vec::with_capacity(HEADER.len());
        cells.push(sanitize_name(&row.species));
        for metric in Metric::ALL {
            self.push_metric(&mut cells, row.metric(metric));
        }
        cells.push(row.taxid.to_string());
        cells
    }

    fn push_metric(&self, cells: &mut Vec<String>, stats: &MetricStats) {
        match &stats.summary {
            Some(summary) => {
                for value in [
                    summary.min,
                    summary.max,
                    summary.median,
                    summary.mean,
                    summary.stdev,
                ] {
                    cells.push(self.format_value(value));
                }
            }
            None => cells.extend(std::iter::repeat_n(String::new(), 5)),
        }
        cells.push(stats.retained().to_string());
    }

    fn format_value(&self, value: f64) -> String {
        let text = format!("{value:.prec$}", prec = self.precision);
        // -0.00 -> 0.00
        if text.starts_with('-') && text[1..].chars().all(|ch| ch == '0' || ch == '.') {
            return text[1..].to_string();
        }
        text
    }

    /// Writes the table next to `path` and renames it into place once complete.
    pub fn write_to_path(&self, rows: &[SummaryRow], path: &Utf8Path) -> Result<(), StatsError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| StatsError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".assembly-stats")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| StatsError::Filesystem(err.to_string()))?;
        self.write_rows(rows, temp.as_file_mut())
            .map_err(|err| StatsError::Write(format!("{path}: {err}")))?;
        temp.persist(path.as_std_path())
            .map_err(|err| StatsError::Write(format!("{path}: {}", err.error)))?;
        Ok(())
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if matches!(ch, '\t' | '\n' | '\r') { ' ' } else { ch })
        .collect()
}
