//! Output Module
//!
//! 変換結果を出力先（ファイルなど）に渡すための成果物を生成するモジュール。
//! 成果物はファイル名のヒントとバイト列の組で、書き込み先の選択は呼び出し側に委ねます。

mod formatters;

use std::path::{Path, PathBuf};

use crate::api::OutputLayout;
use crate::converter::ConversionSummary;
use crate::error::XlsxGuardError;

pub use formatters::*;

/// 出力成果物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// ファイル名のヒント（例: `book_Sheet1.json`）
    pub file_name: String,

    /// 内容
    pub bytes: Vec<u8>,

    /// 成果物の種類
    pub kind: ArtifactKind,
}

/// 成果物の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// 1シート分の行配列
    SheetJson,

    /// 全シートをまとめた JSON
    WorkbookJson,

    /// 違反レポート
    ViolationLog,
}

impl OutputArtifact {
    /// 指定ディレクトリに `file_name` で書き込み、書き込んだパスを返す
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, XlsxGuardError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// 変換結果から出力成果物を生成する
///
/// * `PerSheet` - 出力されたシートごとに `<workbookName>_<sheetName>.json`
/// * `PerWorkbook` - 出力されたシートをまとめた `<workbookName>.json`（出力シートが無ければ生成しない）
/// * 違反がある場合は `<workbookName>_violations.log`
pub fn build_artifacts(
    summary: &ConversionSummary,
    workbook_name: &str,
    layout: OutputLayout,
) -> Result<Vec<OutputArtifact>, XlsxGuardError> {
    let mut artifacts = Vec::new();

    match layout {
        OutputLayout::PerSheet => {
            for sheet in summary.emitted() {
                let mut bytes = Vec::new();
                JsonFormatter.render_sheet(sheet, &mut bytes)?;
                artifacts.push(OutputArtifact {
                    file_name: format!(
                        "{}_{}.json",
                        file_stem(workbook_name),
                        file_stem(sheet.sheet_name())
                    ),
                    bytes,
                    kind: ArtifactKind::SheetJson,
                });
            }
        }
        OutputLayout::PerWorkbook => {
            if summary.emitted().next().is_some() {
                let mut bytes = Vec::new();
                JsonFormatter.render_workbook(summary, &mut bytes)?;
                artifacts.push(OutputArtifact {
                    file_name: format!("{}.json", file_stem(workbook_name)),
                    bytes,
                    kind: ArtifactKind::WorkbookJson,
                });
            }
        }
    }

    if !summary.violations().is_empty() {
        let mut bytes = Vec::new();
        ReportFormatter.render(summary.violations(), &mut bytes)?;
        artifacts.push(OutputArtifact {
            file_name: format!("{}_violations.log", file_stem(workbook_name)),
            bytes,
            kind: ArtifactKind::ViolationLog,
        });
    }

    Ok(artifacts)
}

/// ファイル名に使えない文字を `_` に置き換える
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
