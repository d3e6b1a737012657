//! ocrsweep - batch OCR, text extraction and proofreading for PDF trees
//!
//! Walks an input tree, makes every PDF searchable, extracts its text and
//! writes proofreading artifacts into a mirrored output tree.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ocrsweep::config::{load_config, validate_config, Config, ExtractionBackend};
use ocrsweep::pipeline::{Collaborators, PipelineConfig};
use ocrsweep::startup;
use ocrsweep::worker::{BatchReport, Scheduler};

#[derive(Parser, Debug)]
#[command(
    name = "ocrsweep",
    version,
    about = "Batch OCR, text extraction and proofreading for PDF trees",
    after_help = "EXAMPLES:\n  \
                  ocrsweep run --input ./scans --output ./processed\n  \
                  ocrsweep run -i ./scans -o ./processed --workers 4 --dictionary terms.txt\n  \
                  ocrsweep run --config ocrsweep.json --report batch.json\n  \
                  ocrsweep check-tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every document under the input directory
    Run(RunArgs),

    /// Verify that the external tools the pipeline needs are on PATH
    CheckTools(ToolArgs),
}

#[derive(Args, Debug, Default)]
struct ToolArgs {
    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text extraction backend
    #[arg(long, value_enum)]
    extractor: Option<ExtractorArg>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    tools: ToolArgs,

    /// Input directory scanned recursively for PDFs
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output root; the input tree is mirrored beneath it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of documents processed concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Custom dictionary of domain terms, one per line
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// Extra word list merged into the built-in one
    #[arg(long)]
    wordlist: Option<PathBuf>,

    /// OCR language (repeatable), e.g. -l eng -l spa
    #[arg(short = 'l', long = "language")]
    languages: Vec<String>,

    /// Image DPI passed to the OCR engine
    #[arg(long)]
    dpi: Option<u32>,

    /// Timeout in seconds for each external tool invocation
    #[arg(long)]
    timeout: Option<u64>,

    /// Do not pass -layout to pdftotext
    #[arg(long)]
    no_layout: bool,

    /// Skip the .docx export
    #[arg(long)]
    skip_export: bool,

    /// Skip the spelling report
    #[arg(long)]
    skip_lint: bool,

    /// Write the batch report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExtractorArg {
    Lopdf,
    Pdftotext,
}

impl From<ExtractorArg> for ExtractionBackend {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::Lopdf => ExtractionBackend::Lopdf,
            ExtractorArg::Pdftotext => ExtractionBackend::Pdftotext,
        }
    }
}

impl ToolArgs {
    fn base_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(extractor) = self.extractor {
            config.extraction.backend = extractor.into();
        }
        Ok(config)
    }
}

impl RunArgs {
    /// Config file values with command-line flags applied on top.
    fn build_config(&self) -> Result<Config> {
        let mut config = self.tools.base_config()?;

        if let Some(input) = &self.input {
            config.input_directory = input.to_string_lossy().to_string();
        }
        if let Some(output) = &self.output {
            config.output_directory = output.to_string_lossy().to_string();
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(dictionary) = &self.dictionary {
            config.lint.custom_dictionary = Some(dictionary.to_string_lossy().to_string());
        }
        if let Some(wordlist) = &self.wordlist {
            config.lint.wordlist = Some(wordlist.to_string_lossy().to_string());
        }
        if !self.languages.is_empty() {
            config.ocr.languages = self.languages.clone();
        }
        if let Some(dpi) = self.dpi {
            config.ocr.dpi = dpi;
        }
        if let Some(timeout) = self.timeout {
            config.stage_timeout_secs = timeout;
        }
        if self.no_layout {
            config.extraction.layout = false;
        }
        if self.skip_export {
            config.stages.export = false;
        }
        if self.skip_lint {
            config.stages.lint = false;
        }

        if config.input_directory.is_empty() {
            bail!("No input directory given (use --input or set input_directory in the config)");
        }
        if config.output_directory.is_empty() {
            bail!("No output directory given (use --output or set output_directory in the config)");
        }

        validate_config(&config).context("Invalid configuration")?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    tracing_log::LogTracer::init().context("Failed to bridge log records")?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Run(args) => cmd_run(&args),
        Commands::CheckTools(args) => cmd_check_tools(&args),
    }
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let config = args.build_config()?;
    let pipeline_config = PipelineConfig::from_config(&config);

    startup::check_preconditions(&pipeline_config).context("Startup check failed")?;
    let collaborators =
        Collaborators::from_config(&pipeline_config).context("Failed to load dictionaries")?;

    let scheduler = Scheduler::new(pipeline_config, &collaborators);
    let report = scheduler.run_batch().context("Batch run failed")?;

    print_summary(&report);

    if let Some(path) = &args.report {
        write_report(&report, path);
    }

    Ok(())
}

/// Write failures are logged; the exit status only reflects startup checks.
fn write_report(report: &BatchReport, path: &Path) {
    match report.write_json(path) {
        Ok(()) => println!("Report written to {}", path.display()),
        Err(e) => tracing::error!("Failed to write report to {}: {}", path.display(), e),
    }
}

fn cmd_check_tools(args: &ToolArgs) -> Result<()> {
    let config = args.base_config()?;
    let tools = startup::required_tools(&PipelineConfig::from_config(&config));

    let mut missing = Vec::new();
    for tool in &tools {
        match startup::locate_tool(tool) {
            Some(path) => println!("[OK] {} ({})", tool, path.display()),
            None => {
                println!("[MISSING] {}", tool);
                missing.push(tool.as_str());
            }
        }
    }

    if !missing.is_empty() {
        bail!("Missing required tools: {}", missing.join(", "));
    }
    Ok(())
}

fn print_summary(report: &BatchReport) {
    println!();
    println!("Total documents: {}", report.total());
    println!("Succeeded:       {}", report.succeeded);
    println!("Failed:          {}", report.failed);

    let warned = report.warned().count();
    if warned > 0 {
        println!("With warnings:   {}", warned);
    }

    for failed in report.failures() {
        if let Some(stage) = failed.outcome.failed_stage() {
            println!("  - {} (at {})", failed.display_name(), stage);
        }
    }

    println!("Outputs in:      {}", report.output_root.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["ocrsweep", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_flags_build_config() {
        let args = run_args(&[
            "-i", "/scans", "-o", "/out", "-w", "4", "-l", "eng", "-l", "spa", "--dpi", "300",
            "--extractor", "pdftotext", "--no-layout", "--skip-lint",
        ]);
        let config = args.build_config().unwrap();

        assert_eq!(config.input_directory, "/scans");
        assert_eq!(config.output_directory, "/out");
        assert_eq!(config.workers, 4);
        assert_eq!(config.ocr.languages, vec!["eng", "spa"]);
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.extraction.backend, ExtractionBackend::Pdftotext);
        assert!(!config.extraction.layout);
        assert!(config.stages.export);
        assert!(!config.stages.lint);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("ocrsweep.json");
        std::fs::write(
            &path,
            r#"{ "input_directory": "/from-file", "output_directory": "/out", "workers": 6 }"#,
        )
        .unwrap();

        let args = run_args(&["--config", path.to_str().unwrap(), "--workers", "1"]);
        let config = args.build_config().unwrap();

        assert_eq!(config.input_directory, "/from-file");
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_missing_output_is_an_error() {
        let args = run_args(&["-i", "/scans"]);
        assert!(args.build_config().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let args = run_args(&["-i", "/scans", "-o", "/out", "-w", "0"]);
        let err = args.build_config().unwrap_err();
        assert!(format!("{:#}", err).contains("workers must be at least 1"));
    }

    #[test]
    fn test_unknown_extractor_rejected_by_parser() {
        assert!(Cli::try_parse_from(["ocrsweep", "run", "--extractor", "tika"]).is_err());
    }
}
