//! Basic Conversion Example
//!
//! This example demonstrates the most basic usage of xlsxguard:
//! converting every sheet of a workbook to JSON using the default policy.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_conversion -- input.xlsx output_dir
//! ```
//!
//! If no output directory is given, files are written to the current directory.

use std::fs::File;
use std::path::{Path, PathBuf};
use xlsxguard::ConverterBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get input file path from command line arguments
    let input_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: basic_conversion <input.xlsx> [output_dir]");
            std::process::exit(1);
        }
    };

    let output_dir = std::env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    println!("Converting {}...", input_path.display());

    // Create a converter with default settings
    let converter = ConverterBuilder::new().build()?;

    // Open input file
    let input = File::open(&input_path).map_err(|e| {
        eprintln!("Error: Could not open input file '{}'", input_path.display());
        eprintln!("  {}", e);
        e
    })?;

    let summary = converter.convert_workbook(input)?;

    for sheet in summary.sheets() {
        println!(
            "  {:<24} {:?} ({} violations)",
            sheet.sheet_name(),
            sheet.status(),
            sheet.violations().len()
        );
    }

    let workbook_name = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());

    std::fs::create_dir_all(&output_dir)?;
    for artifact in converter.artifacts(&summary, &workbook_name)? {
        let path = artifact.write_to(Path::new(&output_dir))?;
        println!("Wrote {}", path.display());
    }

    if !summary.is_clean() {
        println!("\n{}", summary.violations());
    }

    Ok(())
}
