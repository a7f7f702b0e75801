//! findmeasure CLI - find unused columns and measures
//!
//! Usage:
//!   findmeasure analyze <report.pbix>... [--snapshot <metadata.json>] [--format table|json]
//!   findmeasure warnings <report.pbix>... [--snapshot <metadata.json>]
//!   findmeasure run [--config <findmeasure.toml>]
//!
//! Examples:
//!   findmeasure analyze "Store Sales.pbix" --snapshot sales-metadata.json
//!   findmeasure analyze a.pbix b.pbix --hidden-pages --format json
//!   findmeasure warnings "Store Sales.pbix" --snapshot sales-metadata.json
//!   FINDMEASURE_LOG=info findmeasure run --config findmeasure.toml

use clap::{Parser, Subcommand, ValueEnum};
use findmeasure::analysis::{render_table, Analysis, AnalysisResult, UsageSummary};
use findmeasure::config::Settings;
use findmeasure::metadata::MetadataSnapshot;
use findmeasure::report::{report_name, LoadOptions};
use findmeasure::warnings::LogSubscriber;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "findmeasure")]
#[command(about = "findmeasure - Usage analysis for semantic models and their reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the usage state of every column and measure
    Analyze {
        /// Report packages (.pbix)
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,

        /// Include hidden pages
        #[arg(long)]
        hidden_pages: bool,

        /// Include hidden visuals
        #[arg(long)]
        hidden_visuals: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// List references to columns and measures the model does not have
    Warnings {
        /// Report packages (.pbix)
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Analyse the reports listed in a settings file
    Run {
        /// Settings file (defaults to the standard search locations)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Metadata snapshot (JSON); without one every reference is accepted
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Model name (defaults to the snapshot or first report file name)
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Aligned text table
    Table,
    /// JSON array of usage rows
    Json,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            reports,
            model,
            hidden_pages,
            hidden_visuals,
            format,
        } => {
            let options = LoadOptions {
                include_hidden_pages: hidden_pages,
                include_hidden_visuals: hidden_visuals,
            };
            cmd_analyze(&reports, &model, &options, format)
        }
        Commands::Warnings { reports, model } => cmd_warnings(&reports, &model),
        Commands::Run { config, format } => cmd_run(config, format),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FINDMEASURE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_analysis(reports: &[PathBuf], args: &ModelArgs) -> AnalysisResult<Analysis> {
    match &args.snapshot {
        Some(path) => {
            let name = args.name.clone().unwrap_or_else(|| file_stem(path));
            let mut snapshot = MetadataSnapshot::from_path(path)?;
            Analysis::connected(name, "", &mut snapshot)
        }
        None => {
            let name = args
                .name
                .clone()
                .or_else(|| reports.first().map(|p| report_name(p)))
                .unwrap_or_default();
            Ok(Analysis::disconnected(name))
        }
    }
}

fn load_reports(
    analysis: &mut Analysis,
    reports: &[PathBuf],
    options: &LoadOptions,
) -> AnalysisResult<()> {
    for path in reports {
        analysis.load_report(path, options)?;
    }
    Ok(())
}

fn cmd_analyze(
    reports: &[PathBuf],
    args: &ModelArgs,
    options: &LoadOptions,
    format: OutputFormat,
) -> AnalysisResult<ExitCode> {
    let mut analysis = build_analysis(reports, args)?;
    analysis.warnings().subscribe(Arc::new(LogSubscriber));
    load_reports(&mut analysis, reports, options)?;

    print_summary(&analysis.summary(), format);
    Ok(ExitCode::SUCCESS)
}

fn cmd_warnings(reports: &[PathBuf], args: &ModelArgs) -> AnalysisResult<ExitCode> {
    let mut analysis = build_analysis(reports, args)?;
    load_reports(&mut analysis, reports, &LoadOptions::default())?;

    let warnings = analysis.warnings().warnings();
    if warnings.is_empty() {
        println!("No broken references.");
        return Ok(ExitCode::SUCCESS);
    }

    for warning in &warnings {
        println!("{}", warning);
        if let Some(sender) = warning.sender() {
            println!("  in {}", sender.description);
        }
    }
    println!();
    println!("{} broken reference(s)", warnings.len());
    Ok(ExitCode::FAILURE)
}

fn cmd_run(config: Option<PathBuf>, format: OutputFormat) -> AnalysisResult<ExitCode> {
    let settings = match &config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };

    if settings.reports.is_empty() {
        eprintln!("No reports configured.");
        return Ok(ExitCode::FAILURE);
    }

    // Reports sharing a model are analysed together.
    let mut analyses: Vec<(Option<String>, Analysis)> = Vec::new();
    for report in &settings.reports {
        let path = report.resolved_path()?;
        let options = report.load_options(&settings.analysis);

        let existing = report
            .model
            .as_ref()
            .and_then(|name| analyses.iter().position(|(key, _)| key.as_ref() == Some(name)));
        let index = match existing {
            Some(index) => index,
            None => {
                let analysis = match &report.model {
                    Some(name) => Analysis::from_settings(name, settings.get_model(name)?)?,
                    None => Analysis::disconnected(report_name(&path)),
                };
                analysis.warnings().subscribe(Arc::new(LogSubscriber));
                analyses.push((report.model.clone(), analysis));
                analyses.len() - 1
            }
        };
        analyses[index].1.load_report(&path, &options)?;
    }

    let rows: Vec<UsageSummary> = analyses
        .iter()
        .flat_map(|(_, analysis)| analysis.summary())
        .collect();
    print_summary(&rows, format);
    Ok(ExitCode::SUCCESS)
}

fn print_summary(rows: &[UsageSummary], format: OutputFormat) {
    match format {
        OutputFormat::Table => print!("{}", render_table(rows)),
        OutputFormat::Json => match serde_json::to_string_pretty(rows) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize summary: {}", e),
        },
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
