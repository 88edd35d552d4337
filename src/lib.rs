//! xlsxguard - Pure-Rust spreadsheet to JSON converter with whitelist cell validation
//!
//! ワークブックの各シートを JSON の行配列に変換しつつ、すべての文字列セルを
//! ホワイトリストポリシー（許可文字、最大文字数、数式の禁止）で検証します。
//!
//! - 違反は1セルにつき1件の `Violation` として収集され、全シート分が
//!   `ViolationReport` にシート順・行順・列順で並びます。
//! - 既定の `EmitPolicy::AllOrNothing` では、違反が1件でもあるシートの JSON は出力されません。
//! - シートは互いに独立して並列に処理されます。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::path::Path;
//! use xlsxguard::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let summary = converter.convert_workbook(File::open("book.xlsx")?)?;
//!     for name in summary.failed() {
//!         eprintln!("sheet {} has violations", name);
//!     }
//!
//!     for artifact in converter.artifacts(&summary, "book")? {
//!         artifact.write_to(Path::new("."))?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Decoded Sheets
//!
//! デコード済みのデータは `Sheet` として直接渡せます。
//!
//! ```rust
//! use xlsxguard::{CellValue, ConverterBuilder, Sheet};
//!
//! # fn main() -> Result<(), xlsxguard::XlsxGuardError> {
//! let converter = ConverterBuilder::new().build()?;
//! let sheet = Sheet::new(
//!     "Codes",
//!     vec![
//!         vec!["Name".into(), "Code".into()],
//!         vec!["Alice".into(), "AB-12".into()],
//!     ],
//! );
//!
//! let summary = converter.convert_sheets(&[sheet]);
//! assert!(summary.is_clean());
//! assert_eq!(
//!     summary.sheet("Codes").and_then(|s| s.to_json()),
//!     Some(serde_json::json!([{ "Name": "Alice", "Code": "AB-12" }]))
//! );
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod converter;
mod error;
mod output;
mod parser;
mod policy;
mod report;
mod security;
mod types;
mod validator;

// 公開API
pub use api::{OutputLayout, ProgressObserver, SheetProgress, SheetSelector};
pub use builder::{Converter, ConverterBuilder};
pub use converter::{ConversionSummary, RowObject, SheetConversion, SheetConverter, SheetStatus};
pub use error::XlsxGuardError;
pub use output::{build_artifacts, ArtifactKind, OutputArtifact};
pub use policy::{EmitPolicy, ValidationPolicy, DEFAULT_ALLOWED_CHARACTERS, DEFAULT_MAX_LENGTH};
pub use report::{Violation, ViolationReport};
pub use security::DEFAULT_MAX_INPUT_SIZE;
pub use types::{Cell, CellCoord, CellValue, Sheet};
pub use validator::{first_disallowed_character, validate, validate_text, Findings, Reason, ValidationOutcome};
