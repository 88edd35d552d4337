//! Output Formatters Implementation
//!
//! 行配列の JSON 出力と、違反レポートのテキスト出力の実装を提供するモジュール。

use std::io::Write;

use crate::converter::{ConversionSummary, SheetConversion};
use crate::error::XlsxGuardError;
use crate::report::ViolationReport;

/// JSON形式のフォーマッター
///
/// 2スペースインデントで整形して出力します。
pub struct JsonFormatter;

impl JsonFormatter {
    /// 1シート分の行配列を出力する
    ///
    /// 出力が抑止されたシートの場合は何も書き込まず `Ok(false)` を返します。
    pub fn render_sheet<W: Write>(
        &self,
        sheet: &SheetConversion,
        writer: &mut W,
    ) -> Result<bool, XlsxGuardError> {
        let Some(json) = sheet.to_json() else {
            return Ok(false);
        };

        serde_json::to_writer_pretty(&mut *writer, &json)?;
        writeln!(writer)?;
        Ok(true)
    }

    /// 出力された全シートを、シート名をキーとする1つのオブジェクトとして出力する
    pub fn render_workbook<W: Write>(
        &self,
        summary: &ConversionSummary,
        writer: &mut W,
    ) -> Result<(), XlsxGuardError> {
        let mut object = serde_json::Map::new();
        for sheet in summary.emitted() {
            if let Some(json) = sheet.to_json() {
                object.insert(sheet.sheet_name().to_string(), json);
            }
        }

        serde_json::to_writer_pretty(&mut *writer, &serde_json::Value::Object(object))?;
        writeln!(writer)?;
        Ok(())
    }
}

/// 違反レポートのフォーマッター
///
/// 1行1違反のテキストとして出力します。
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn render<W: Write>(
        &self,
        report: &ViolationReport,
        writer: &mut W,
    ) -> Result<(), XlsxGuardError> {
        for violation in report {
            writeln!(writer, "{}", violation)?;
        }
        Ok(())
    }
}
