//! xlsxguard command-line front end
//!
//! Decodes a workbook, validates and converts the selected sheets, and writes
//! the resulting JSON files and violation log into an output directory.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use xlsxguard::{
    ConverterBuilder, EmitPolicy, OutputLayout, ProgressObserver, SheetProgress, SheetSelector,
    ValidationPolicy, XlsxGuardError,
};

#[derive(Parser, Debug)]
#[command(name = "xlsxguard")]
#[command(about = "Convert spreadsheet sheets to JSON, rejecting cells that fail the whitelist policy")]
#[command(version)]
struct Cli {
    /// Workbook to convert (xlsx, xlsm, xlsb, xls, ods)
    input: PathBuf,

    /// Directory receiving the JSON files and the violation log
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Sheet to convert by name (repeatable, processed in the given order)
    #[arg(short, long = "sheet", conflicts_with = "sheet_index")]
    sheets: Vec<String>,

    /// Sheet to convert by 0-based index (repeatable)
    #[arg(long = "sheet-index")]
    sheet_index: Vec<usize>,

    /// JSON file with the validation policy
    #[arg(short, long)]
    policy: Option<PathBuf>,

    /// Also allow common accented letters (ignored with --policy)
    #[arg(long, conflicts_with = "policy")]
    accented: bool,

    /// Emit sheets even when they contain violations
    #[arg(long)]
    best_effort: bool,

    /// Write one combined JSON file instead of one file per sheet
    #[arg(long)]
    combined: bool,

    /// List the sheets of the workbook and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "xlsxguard=debug"
    } else {
        "xlsxguard=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(true)` when every selected sheet passed validation.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let policy = load_policy(cli)?;

    let selector = if !cli.sheets.is_empty() {
        SheetSelector::Names(cli.sheets.clone())
    } else if !cli.sheet_index.is_empty() {
        SheetSelector::Indices(cli.sheet_index.clone())
    } else {
        SheetSelector::All
    };

    let converter = ConverterBuilder::new()
        .with_sheet_selector(selector)
        .with_policy(policy)
        .with_emit_policy(if cli.best_effort {
            EmitPolicy::BestEffort
        } else {
            EmitPolicy::AllOrNothing
        })
        .with_output_layout(if cli.combined {
            OutputLayout::PerWorkbook
        } else {
            OutputLayout::PerSheet
        })
        .build()?;

    let open_input = || {
        File::open(&cli.input).with_context(|| format!("cannot open {}", cli.input.display()))
    };

    if cli.list {
        for name in converter.list_sheets(open_input()?)? {
            println!("{}", name);
        }
        return Ok(true);
    }

    let summary = converter.convert_workbook_with_progress(open_input()?, &StderrProgress)?;

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("cannot create {}", cli.out_dir.display()))?;
    for artifact in converter.artifacts(&summary, &workbook_name(&cli.input))? {
        let path = artifact.write_to(&cli.out_dir)?;
        println!("{}", path.display());
    }

    Ok(summary.is_clean())
}

/// Prints one line per finished sheet.
struct StderrProgress;

impl ProgressObserver for StderrProgress {
    fn on_sheet_finished(&self, p: &SheetProgress<'_>) {
        eprintln!(
            "[{}/{}] {} {}",
            p.sheets_completed,
            p.total_sheets,
            p.sheet_name,
            if p.succeeded { "ok" } else { "FAILED" }
        );
    }
}

fn load_policy(cli: &Cli) -> anyhow::Result<ValidationPolicy> {
    match &cli.policy {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("invalid policy file {}", path.display()))
        }
        None if cli.accented => Ok(ValidationPolicy::with_accented_letters()),
        None => Ok(ValidationPolicy::default()),
    }
}

fn workbook_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string())
}

fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<XlsxGuardError>() {
        Some(XlsxGuardError::Parse(e)) => {
            eprintln!("Decode Error: {}", e);
            eprintln!("The file may not be a valid workbook or may be corrupted.");
        }
        Some(XlsxGuardError::Config(msg)) => {
            eprintln!("Configuration Error: {}", msg);
            eprintln!("Please check your sheet selection and policy.");
        }
        Some(XlsxGuardError::SecurityViolation(msg)) => {
            eprintln!("Security Violation: {}", msg);
        }
        Some(e) => eprintln!("Error: {}", e),
        None => eprintln!("Error: {:#}", error),
    }
}
