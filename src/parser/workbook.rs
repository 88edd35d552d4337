//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックレベルの操作（シート一覧、シート選択、
//! シートのグリッド化）を提供します。検証や変換のロジックは持ちません。

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use std::io::{Cursor, Read, Seek};

use crate::api::SheetSelector;
use crate::error::XlsxGuardError;
use crate::security::SecurityConfig;
use crate::types::{CellValue, Sheet};

/// ワークブックパーサー
///
/// calamineが自動判別できる形式（xlsx, xlsm, xlsb, xls, ods）を扱います。
pub(crate) struct WorkbookParser<RS: Read + Seek> {
    workbook: Sheets<RS>,
}

impl WorkbookParser<Cursor<Vec<u8>>> {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズ制限を確認してからデコーダーに渡します。
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックのバイト列を読み込むためのリーダー
    /// * `security` - 入力サイズ制限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - デコードに成功した場合
    /// * `Err(XlsxGuardError::SecurityViolation)` - 入力サイズが制限を超えた場合
    /// * `Err(XlsxGuardError::Parse)` - デコードに失敗した場合
    pub fn open<R: Read>(reader: R, security: &SecurityConfig) -> Result<Self, XlsxGuardError> {
        // 制限+1バイトまで読めば超過を判定できる
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(security.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        tracing::debug!(bytes = bytes_read, "workbook decoded");

        Ok(WorkbookParser { workbook })
    }
}

impl<RS: Read + Seek> WorkbookParser<RS> {
    /// すべてのシート名をワークブック内の順序で取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト（選択順）
    /// * `Err(XlsxGuardError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>, XlsxGuardError> {
        let all_sheet_names = self.sheet_names();

        let by_index = |index: usize| -> Result<String, XlsxGuardError> {
            all_sheet_names.get(index).cloned().ok_or_else(|| {
                XlsxGuardError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                ))
            })
        };

        let by_name = |name: &String| -> Result<String, XlsxGuardError> {
            if all_sheet_names.contains(name) {
                Ok(name.clone())
            } else {
                Err(XlsxGuardError::Config(format!("Sheet '{}' not found", name)))
            }
        };

        match selector {
            SheetSelector::All => Ok(all_sheet_names.clone()),
            SheetSelector::Index(index) => Ok(vec![by_index(*index)?]),
            SheetSelector::Name(name) => Ok(vec![by_name(name)?]),
            SheetSelector::Indices(indices) => indices.iter().map(|&i| by_index(i)).collect(),
            SheetSelector::Names(names) => names.iter().map(by_name).collect(),
        }
    }

    /// シートを読み込み、矩形グリッドに変換する
    ///
    /// グリッドはシートの使用範囲の左上を (0, 0) とします。
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<Sheet, XlsxGuardError> {
        let range = self.workbook.worksheet_range(sheet_name)?;

        let rows: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(convert_data).collect())
            .collect();

        tracing::debug!(
            sheet = sheet_name,
            rows = rows.len(),
            cols = range.width(),
            "sheet decoded"
        );

        Ok(Sheet::new(sheet_name, rows))
    }

    /// 選択されたシートを順に読み込む
    pub fn read_sheets(&mut self, names: &[String]) -> Result<Vec<Sheet>, XlsxGuardError> {
        names.iter().map(|name| self.read_sheet(name)).collect()
    }
}

/// calamineのセル値を `CellValue` に正規化する
///
/// 日時はExcelのシリアル値（数値）になります。エラー値（`#N/A` など）は値を持たないセルとして扱います。
fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}


// 実ファイルを使ったシート読み込みのテストは統合テスト（tests/）で実装します。
