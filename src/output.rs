use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use serde::Serialize;

use crate::aggregate::DataQualityReport;
use crate::error::StatsError;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub taxids: usize,
    pub precision: usize,
    pub quality: &'a DataQualityReport,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary<'_>) -> io::Result<()> {
        let json = Self::to_json(summary)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_quality_report(
        report: &DataQualityReport,
        path: &Utf8Path,
    ) -> Result<(), StatsError> {
        let json = Self::to_json(report).map_err(|err| StatsError::Write(err.to_string()))?;
        fs::write(path.as_std_path(), format!("{json}\n"))
            .map_err(|err| StatsError::Write(format!("{path}: {err}")))
    }

    fn to_json<T: Serialize>(value: &T) -> io::Result<String> {
        serde_json::to_string_pretty(value).map_err(io::Error::other)
    }
}
