use std::io::BufRead;
use std::time::Instant;

use serde::Serialize;

use crate::aggregate::{Aggregation, DataQualityReport, GroupAggregator};
use crate::config::ResolvedConfig;
use crate::error::StatsError;
use crate::parser::{LineOutcome, RecordParser};
use crate::stats::{SummaryRow, summarize};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub rows: Vec<SummaryRow>,
    pub quality: DataQualityReport,
}

/// Reader to summary rows in one pass. Depends only on the input bytes and the config.
pub struct Pipeline {
    config: ResolvedConfig,
}

impl Pipeline {
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    pub fn run<R: BufRead>(&self, reader: R) -> Result<PipelineOutput, StatsError> {
        let started = Instant::now();
        let aggregation = self.aggregate(reader)?;
        tracing::info!(
            taxids = aggregation.groups.len(),
            records = aggregation.quality.records_accepted,
            "collected assembly data"
        );
        let quality = aggregation.quality.clone();
        if quality.dropped_rows() > 0 || quality.dropped_values() > 0 {
            tracing::warn!(
                dropped_rows = quality.dropped_rows(),
                dropped_values = quality.dropped_values(),
                "some input could not be used; see the data-quality report"
            );
        }
        let rows = self.summarize_all(&aggregation)?;
        tracing::info!(
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "computed summary statistics"
        );
        Ok(PipelineOutput { rows, quality })
    }

    pub fn aggregate<R: BufRead>(&self, mut reader: R) -> Result<Aggregation, StatsError> {
        let mut parser = RecordParser::new(self.config.columns);
        if self.config.fixed_columns {
            parser = parser.with_fixed_layout();
        }
        let mut aggregator = GroupAggregator::new(self.config.name_policy);
        let mut lines_read = 0u64;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|err| StatsError::Read(format!("line {}: {err}", lines_read + 1)))?;
            if read == 0 {
                break;
            }
            lines_read += 1;
            // organism names occasionally carry Latin-1 bytes
            let line = String::from_utf8_lossy(&buf);
            match parser.parse_line(&line) {
                LineOutcome::Skip => {}
                LineOutcome::Header(layout) => {
                    tracing::debug!(?layout, "column layout taken from header");
                }
                LineOutcome::Record(record, issues) => {
                    aggregator.note_field_issues(&issues);
                    aggregator.ingest(record);
                }
                LineOutcome::Malformed(reason) => {
                    aggregator.note_malformed_row(&format!("line {lines_read}: {reason}"));
                }
            }
        }

        let mut aggregation = aggregator.finalize();
        aggregation.quality.lines_read = lines_read;
        Ok(aggregation)
    }

    pub fn summarize_all(&self, aggregation: &Aggregation) -> Result<Vec<SummaryRow>, StatsError> {
        aggregation
            .groups
            .values()
            .map(|group| summarize(group, &self.config.filter))
            .collect()
    }
}
