use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use assembly_stats_db::config::{ConfigLoader, ConfigOverrides};
use assembly_stats_db::domain::NamePolicy;
use assembly_stats_db::error::StatsError;
use assembly_stats_db::output::{JsonOutput, RunSummary};
use assembly_stats_db::pipeline::Pipeline;
use assembly_stats_db::source::{FeedHttpClient, open_source};
use assembly_stats_db::writer::TableWriter;

#[derive(Parser)]
#[command(name = "assembly-stats")]
#[command(
    about = "Generate a database with assembly statistics from a RefSeq assembly summary file"
)]
#[command(version, author)]
struct Cli {
    /// Path or URL of the assembly summary file (plain or gzip)
    #[arg(short = 'd', long = "path_database", alias = "path-database")]
    path_database: String,

    /// Output table (default: NCBI_Assembly_Stats_<YYYYMMDD>.txt)
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<String>,

    /// Decimal places for real-valued cells
    #[arg(long)]
    precision: Option<usize>,

    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Smallest bucket the IQR filter applies to
    #[arg(long)]
    min_filter_size: Option<usize>,

    #[arg(long, value_enum)]
    name_policy: Option<NamePolicy>,

    /// Write the data-quality report as JSON
    #[arg(long)]
    quality_report: Option<Utf8PathBuf>,

    /// Print a JSON run summary to stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<StatsError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &StatsError) -> u8 {
    match error {
        StatsError::InputNotFound(_)
        | StatsError::ConfigRead(_)
        | StatsError::ConfigParse(_)
        | StatsError::InvalidConfig(_) => 2,
        StatsError::Http(_) | StatsError::HttpStatus { .. } => 3,
        _ => 1,
    }
}

fn default_output_path() -> Utf8PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d");
    Utf8PathBuf::from(format!("NCBI_Assembly_Stats_{stamp}.txt"))
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        precision: cli.precision,
        iqr_multiplier: cli.iqr_multiplier,
        min_filter_size: cli.min_filter_size,
        name_policy: cli.name_policy,
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;
    let writer = TableWriter::new(config.precision);
    let pipeline = Pipeline::new(config);

    let client = FeedHttpClient::new()?;
    let reader = open_source(&cli.path_database, &client)?;
    let result = pipeline.run(reader)?;

    let output = cli.output.unwrap_or_else(default_output_path);
    tracing::info!(path = %output, "writing output file");
    writer.write_to_path(&result.rows, &output)?;

    if let Some(path) = &cli.quality_report {
        JsonOutput::write_quality_report(&result.quality, path)?;
    }

    if cli.json {
        let summary = RunSummary {
            input: &cli.path_database,
            output: output.as_str(),
            taxids: result.rows.len(),
            precision: writer.precision(),
            quality: &result.quality,
        };
        JsonOutput::print_summary(&summary).into_diagnostic()?;
    }
    Ok(())
}
