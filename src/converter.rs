//! Sheet Converter Module
//!
//! シートごとに全セルを検証し、違反を集約したうえで JSON 出力の可否を決定する。
//! 複数シートは rayon で並列に処理し、結果は入力順に並べて返す。

use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::api::{ProgressObserver, SheetProgress};
use crate::policy::{EmitPolicy, ValidationPolicy};
use crate::report::{Violation, ViolationReport};
use crate::types::{Cell, CellCoord, Sheet};
use crate::validator::{validate, ValidationOutcome};

/// 1行分の JSON オブジェクト（キー順は列順）
pub type RowObject = serde_json::Map<String, serde_json::Value>;

/// シートの変換結果の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetStatus {
    /// 違反なしで出力された
    Clean,

    /// 違反があるが `EmitPolicy::BestEffort` により出力された
    Flagged,

    /// 違反があるため出力が抑止された
    Suppressed,
}

/// 1シート分の変換結果
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConversion {
    sheet_name: String,
    status: SheetStatus,
    rows: Option<Vec<RowObject>>,
    violations: Vec<Violation>,
}

impl SheetConversion {
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn status(&self) -> SheetStatus {
        self.status
    }

    /// 違反が1件も無かったか
    pub fn succeeded(&self) -> bool {
        self.violations.is_empty()
    }

    /// JSON 出力が生成されたか
    pub fn is_emitted(&self) -> bool {
        self.rows.is_some()
    }

    /// 行オブジェクトの配列（抑止された場合は `None`）
    pub fn rows(&self) -> Option<&[RowObject]> {
        self.rows.as_deref()
    }

    /// 行オブジェクトの配列を JSON 値として取得
    pub fn to_json(&self) -> Option<serde_json::Value> {
        self.rows.as_ref().map(|rows| {
            serde_json::Value::Array(
                rows.iter()
                    .cloned()
                    .map(serde_json::Value::Object)
                    .collect(),
            )
        })
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

/// 複数シートの変換結果
///
/// シートの並びと違反レポートの並びは、並列処理の有無に関わらず入力順です。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionSummary {
    sheets: Vec<SheetConversion>,
    report: ViolationReport,
}

impl ConversionSummary {
    pub(crate) fn from_sheets(sheets: Vec<SheetConversion>) -> Self {
        let report = sheets
            .iter()
            .flat_map(|sheet| sheet.violations.iter().cloned())
            .collect();
        Self { sheets, report }
    }

    /// シートごとの結果（入力順）
    pub fn sheets(&self) -> &[SheetConversion] {
        &self.sheets
    }

    /// 指定シートの結果
    pub fn sheet(&self, name: &str) -> Option<&SheetConversion> {
        self.sheets.iter().find(|s| s.sheet_name == name)
    }

    /// 全シートの違反レポート
    pub fn violations(&self) -> &ViolationReport {
        &self.report
    }

    /// 違反の無かったシート名
    pub fn succeeded(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .filter(|s| s.succeeded())
            .map(|s| s.sheet_name())
            .collect()
    }

    /// 違反のあったシート名
    pub fn failed(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .filter(|s| !s.succeeded())
            .map(|s| s.sheet_name())
            .collect()
    }

    /// 出力が生成されたシート
    pub fn emitted(&self) -> impl Iterator<Item = &SheetConversion> {
        self.sheets.iter().filter(|s| s.is_emitted())
    }

    /// 全シートに違反が無いか
    pub fn is_clean(&self) -> bool {
        self.report.is_empty()
    }

    /// 処理したシートが1つも無いか
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// シート単位の検証・変換器
///
/// ポリシーは変換処理の間固定で、シート間で可変状態を共有しません。
#[derive(Debug, Clone, Default)]
pub struct SheetConverter {
    policy: ValidationPolicy,
    emit_policy: EmitPolicy,
}

impl SheetConverter {
    pub fn new(policy: ValidationPolicy, emit_policy: EmitPolicy) -> Self {
        Self {
            policy,
            emit_policy,
        }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn emit_policy(&self) -> EmitPolicy {
        self.emit_policy
    }

    /// 1シートを変換する
    ///
    /// # 処理フロー
    ///
    /// 1. 0行目からヘッダーを解決
    /// 2. ヘッダー行を含む全セルを検証し、違反を収集
    /// 3. 出力ポリシーに従って行オブジェクト配列を生成、または抑止
    pub fn convert(&self, sheet: &Sheet) -> SheetConversion {
        let columns = ColumnNames::resolve(sheet);
        let violations = self.collect_violations(sheet, &columns);

        let status = match (violations.is_empty(), self.emit_policy) {
            (true, _) => SheetStatus::Clean,
            (false, EmitPolicy::BestEffort) => SheetStatus::Flagged,
            (false, EmitPolicy::AllOrNothing) => SheetStatus::Suppressed,
        };

        let rows = match status {
            SheetStatus::Suppressed => {
                tracing::warn!(
                    sheet = sheet.name(),
                    violations = violations.len(),
                    "sheet output suppressed"
                );
                None
            }
            SheetStatus::Clean | SheetStatus::Flagged => Some(rows_to_objects(sheet, &columns)),
        };

        tracing::debug!(
            sheet = sheet.name(),
            rows = sheet.height(),
            violations = violations.len(),
            ?status,
            "sheet converted"
        );

        SheetConversion {
            sheet_name: sheet.name().to_string(),
            status,
            rows,
            violations,
        }
    }

    /// 複数シートを並列に変換する
    ///
    /// 各シートは独立に処理され、あるシートの失敗が他のシートに影響することはありません。
    /// 空のスライスを渡した場合は空の結果を返します。
    pub fn convert_all(
        &self,
        sheets: &[Sheet],
        observer: Option<&dyn ProgressObserver>,
    ) -> ConversionSummary {
        let total = sheets.len();
        let completed = Mutex::new(0usize);

        // par_iter + collect は入力順を保持する
        let results: Vec<SheetConversion> = sheets
            .par_iter()
            .map(|sheet| {
                let result = self.convert(sheet);
                if let Some(observer) = observer {
                    // 通知順と完了数を一致させるため、通知中もロックを保持する
                    let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
                    *done += 1;
                    observer.on_sheet_finished(&SheetProgress {
                        sheets_completed: *done,
                        total_sheets: total,
                        sheet_name: result.sheet_name(),
                        succeeded: result.succeeded(),
                    });
                }
                result
            })
            .collect();

        let summary = ConversionSummary::from_sheets(results);
        tracing::info!(
            sheets = total,
            succeeded = summary.succeeded().len(),
            failed = summary.failed().len(),
            violations = summary.violations().len(),
            "conversion finished"
        );
        summary
    }

    fn collect_violations(&self, sheet: &Sheet, columns: &ColumnNames) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (row_idx, row) in sheet.rows().iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                let cell = Cell {
                    coord: CellCoord::new(row_idx as u32, col_idx as u32),
                    value,
                    header: columns.header(col_idx),
                };

                if let ValidationOutcome::Flagged(findings) = validate(cell.value, &self.policy) {
                    tracing::trace!(
                        sheet = sheet.name(),
                        cell = %cell.coord.to_a1_notation(),
                        ?findings,
                        "cell flagged"
                    );
                    violations.push(Violation::new(
                        sheet.name(),
                        cell.coord.row,
                        cell.header,
                        &findings,
                    ));
                }
            }
        }

        violations
    }
}

/// ヘッダーの無い列に割り当てるラベル
const EMPTY_HEADER: &str = "__EMPTY";

/// 0行目から解決した列名
///
/// 最後の空でないヘッダーセルまでを有効な列とし、それより右の列は出力しません。
/// 有効範囲内の空のヘッダーセルには `__EMPTY`, `__EMPTY_1`, ... を割り当てます。
struct ColumnNames {
    /// 違反レポートの `column`（ヘッダーテキスト、空なら割り当てたラベル）
    headers: Vec<String>,

    /// JSON のフィールド名（重複は接尾辞で区別）
    fields: Vec<String>,
}

impl ColumnNames {
    fn resolve(sheet: &Sheet) -> Self {
        let labels: Vec<Option<String>> = sheet
            .header_row()
            .map(|row| row.iter().map(|v| v.header_label()).collect())
            .unwrap_or_default();
        let width = labels.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        let labels = &labels[..width];

        let fields = field_names(
            &labels
                .iter()
                .map(|l| l.as_deref().unwrap_or(EMPTY_HEADER))
                .collect::<Vec<_>>(),
        );
        let headers = labels
            .iter()
            .zip(&fields)
            .map(|(label, field)| label.clone().unwrap_or_else(|| field.clone()))
            .collect();

        Self { headers, fields }
    }

    fn header(&self, col: usize) -> Option<&str> {
        self.headers.get(col).map(String::as_str)
    }
}

/// JSON のフィールド名を決める
///
/// 同じラベルが複数の列にある場合、2つ目以降に `_1`, `_2`, ... を付けて区別します。
fn field_names(labels: &[&str]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    labels
        .iter()
        .map(|&label| {
            let mut name = label.to_string();
            let mut suffix = 0;
            while used.contains(&name) {
                suffix += 1;
                name = format!("{}_{}", label, suffix);
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

/// 1行目以降を行オブジェクトの配列に変換する
///
/// 行が無いシート、ヘッダー行のみのシートは空配列です。
fn rows_to_objects(sheet: &Sheet, columns: &ColumnNames) -> Vec<RowObject> {
    sheet
        .rows()
        .iter()
        .skip(1)
        .map(|row| {
            columns
                .fields
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use std::sync::Mutex;

    fn sheet(name: &str, rows: Vec<Vec<CellValue>>) -> Sheet {
        Sheet::new(name, rows)
    }

    fn header_sheet(name: &str, data_row: Vec<CellValue>) -> Sheet {
        sheet(name, vec![vec!["Name".into(), "Code".into()], data_row])
    }

    #[test]
    fn test_clean_sheet() {
        let converter = SheetConverter::default();
        let result = converter.convert(&header_sheet("S", vec!["Alice".into(), "AB-12".into()]));

        assert_eq!(result.status(), SheetStatus::Clean);
        assert!(result.succeeded());
        assert!(result.violations().is_empty());
        assert_eq!(
            result.to_json().unwrap(),
            serde_json::json!([{ "Name": "Alice", "Code": "AB-12" }])
        );
    }

    #[test]
    fn test_formula_suppresses_sheet() {
        let converter = SheetConverter::default();
        let result =
            converter.convert(&header_sheet("S", vec!["Bob".into(), "=SUM(A1:A2)".into()]));

        assert_eq!(result.status(), SheetStatus::Suppressed);
        assert!(!result.is_emitted());
        assert_eq!(result.violations().len(), 1);

        let v = &result.violations()[0];
        assert_eq!(v.row, 2);
        assert_eq!(v.column.as_deref(), Some("Code"));
        assert!(v.is_formula);
    }

    #[test]
    fn test_long_value_violation() {
        let converter = SheetConverter::default();
        let result = converter.convert(&header_sheet(
            "S",
            vec!["C".repeat(130).into(), "x".into()],
        ));

        let v = &result.violations()[0];
        assert_eq!(v.row, 2);
        assert_eq!(v.column.as_deref(), Some("Name"));
        assert!(v.length_exceeded);
        assert!(!v.is_formula);
        assert_eq!(v.offending_character, None);
    }

    #[test]
    fn test_best_effort_emits_with_violations() {
        let converter = SheetConverter::new(ValidationPolicy::default(), EmitPolicy::BestEffort);
        let result =
            converter.convert(&header_sheet("S", vec!["Bob".into(), "=SUM(A1:A2)".into()]));

        assert_eq!(result.status(), SheetStatus::Flagged);
        assert!(!result.succeeded());
        assert_eq!(
            result.to_json().unwrap(),
            serde_json::json!([{ "Name": "Bob", "Code": "=SUM(A1:A2)" }])
        );
        assert_eq!(result.violations().len(), 1);
    }

    #[test]
    fn test_header_row_is_validated() {
        let converter = SheetConverter::default();
        let result = converter.convert(&sheet(
            "S",
            vec![vec!["E-mail@".into()], vec!["x".into()]],
        ));

        let v = &result.violations()[0];
        assert_eq!(v.row, 1);
        assert_eq!(v.column.as_deref(), Some("E-mail@"));
        assert_eq!(v.offending_character, Some('@'));
    }

    #[test]
    fn test_non_text_cells_never_violate() {
        let converter = SheetConverter::default();
        let result = converter.convert(&sheet(
            "S",
            vec![
                vec!["n".into(), "b".into(), "e".into()],
                vec![CellValue::Number(3.5), CellValue::Bool(false), CellValue::Empty],
            ],
        ));

        assert!(result.succeeded());
        assert_eq!(
            result.to_json().unwrap(),
            serde_json::json!([{ "n": 3.5, "b": false, "e": null }])
        );
    }

    #[test]
    fn test_headerless_column_has_null_column_and_is_dropped() {
        let converter = SheetConverter::new(ValidationPolicy::default(), EmitPolicy::BestEffort);
        let result = converter.convert(&sheet(
            "S",
            vec![
                vec!["A".into(), CellValue::Empty],
                vec!["1".into(), "bad!".into()],
            ],
        ));

        let v = &result.violations()[0];
        assert_eq!(v.column, None);
        assert_eq!(v.offending_character, Some('!'));
        assert_eq!(result.to_json().unwrap(), serde_json::json!([{ "A": "1" }]));
    }

    #[test]
    fn test_field_order_follows_columns() {
        let converter = SheetConverter::default();
        let result = converter.convert(&sheet(
            "S",
            vec![
                vec!["Zeta".into(), "Alpha".into(), "Mid".into()],
                vec!["1".into(), "2".into(), "3".into()],
            ],
        ));

        let json = serde_json::to_string(&result.to_json().unwrap()).unwrap();
        assert_eq!(json, r#"[{"Zeta":"1","Alpha":"2","Mid":"3"}]"#);
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        assert_eq!(
            field_names(&["A", "A", "__EMPTY", "A", "A_1", "__EMPTY"]),
            vec!["A", "A_1", "__EMPTY", "A_2", "A_1_1", "__EMPTY_1"]
        );
    }

    #[test]
    fn test_blank_header_between_named_columns_is_kept() {
        let converter = SheetConverter::new(ValidationPolicy::default(), EmitPolicy::BestEffort);
        let result = converter.convert(&sheet(
            "S",
            vec![
                vec!["A".into(), CellValue::Empty, "C".into(), CellValue::Empty],
                vec!["1".into(), "2".into(), "3".into(), "4".into()],
                vec!["x".into(), "bad!".into(), "y".into(), CellValue::Empty],
            ],
        ));

        let json = serde_json::to_string(&result.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"A":"1","__EMPTY":"2","C":"3"},{"A":"x","__EMPTY":"bad!","C":"y"}]"#
        );

        let v = &result.violations()[0];
        assert_eq!(v.row, 3);
        assert_eq!(v.column.as_deref(), Some("__EMPTY"));
    }

    #[test]
    fn test_multiple_blank_headers_get_distinct_names() {
        let converter = SheetConverter::default();
        let result = converter.convert(&sheet(
            "S",
            vec![
                vec![CellValue::Empty, CellValue::Empty, "Z".into()],
                vec!["a".into(), "b".into(), "c".into()],
            ],
        ));

        assert_eq!(
            result.to_json().unwrap(),
            serde_json::json!([{ "__EMPTY": "a", "__EMPTY_1": "b", "Z": "c" }])
        );
    }

    #[test]
    fn test_empty_and_header_only_sheets() {
        let converter = SheetConverter::default();

        let empty = converter.convert(&sheet("Empty", vec![]));
        assert_eq!(empty.to_json().unwrap(), serde_json::json!([]));

        let header_only = converter.convert(&sheet("H", vec![vec!["A".into()]]));
        assert_eq!(header_only.to_json().unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_one_violation_per_cell_in_row_column_order() {
        let converter = SheetConverter::default();
        let result = converter.convert(&sheet(
            "S",
            vec![
                vec!["A".into(), "B".into()],
                vec!["=x!".into(), "ok".into()],
                vec!["ok".into(), "#".into()],
            ],
        ));

        let positions: Vec<(u32, Option<&str>)> = result
            .violations()
            .iter()
            .map(|v| (v.row, v.column.as_deref()))
            .collect();
        assert_eq!(positions, vec![(2, Some("A")), (3, Some("B"))]);

        let first = &result.violations()[0];
        assert!(first.is_formula);
        assert_eq!(first.offending_character, Some('='));
    }

    #[test]
    fn test_convert_is_idempotent() {
        let converter = SheetConverter::new(ValidationPolicy::default(), EmitPolicy::BestEffort);
        let s = header_sheet("S", vec!["Bob".into(), "=1".into()]);

        let first = converter.convert(&s);
        let second = converter.convert(&s);
        assert_eq!(
            serde_json::to_vec(&first.to_json()).unwrap(),
            serde_json::to_vec(&second.to_json()).unwrap()
        );
        assert_eq!(first.violations(), second.violations());
    }

    #[test]
    fn test_convert_all_preserves_order_and_independence() {
        let converter = SheetConverter::default();
        let bad = header_sheet("Bad", vec!["Bob".into(), "=1".into()]);
        let good = header_sheet("Good", vec!["Alice".into(), "AB-12".into()]);

        for order in [vec![bad.clone(), good.clone()], vec![good.clone(), bad.clone()]] {
            let summary = converter.convert_all(&order, None);
            let names: Vec<&str> = summary.sheets().iter().map(|s| s.sheet_name()).collect();
            let expected: Vec<&str> = order.iter().map(|s| s.name()).collect();
            assert_eq!(names, expected);

            let good_result = summary.sheet("Good").unwrap();
            assert_eq!(
                good_result.to_json().unwrap(),
                serde_json::json!([{ "Name": "Alice", "Code": "AB-12" }])
            );
            assert!(!summary.sheet("Bad").unwrap().is_emitted());
            assert_eq!(summary.succeeded(), vec!["Good"]);
            assert_eq!(summary.failed(), vec!["Bad"]);
        }
    }

    #[test]
    fn test_convert_all_report_in_sheet_order() {
        let converter = SheetConverter::default();
        let sheets: Vec<Sheet> = (0..8)
            .map(|i| header_sheet(&format!("S{}", i), vec!["x".into(), "bad!".into()]))
            .collect();

        let summary = converter.convert_all(&sheets, None);
        let report_order: Vec<&str> = summary
            .violations()
            .iter()
            .map(|v| v.sheet_name.as_str())
            .collect();
        let expected: Vec<String> = (0..8).map(|i| format!("S{}", i)).collect();
        assert_eq!(report_order, expected);
    }

    #[test]
    fn test_convert_all_empty_selection() {
        let converter = SheetConverter::default();
        let summary = converter.convert_all(&[], None);
        assert!(summary.is_empty());
        assert!(summary.is_clean());
        assert_eq!(summary.emitted().count(), 0);
    }

    struct Recorder(Mutex<Vec<(usize, usize, String, bool)>>);

    impl ProgressObserver for Recorder {
        fn on_sheet_finished(&self, progress: &SheetProgress<'_>) {
            self.0.lock().unwrap().push((
                progress.sheets_completed,
                progress.total_sheets,
                progress.sheet_name.to_string(),
                progress.succeeded,
            ));
        }
    }

    #[test]
    fn test_progress_observer_notified_once_per_sheet() {
        let converter = SheetConverter::default();
        let sheets = vec![
            header_sheet("A", vec!["x".into(), "y".into()]),
            header_sheet("B", vec!["x".into(), "=y".into()]),
        ];
        let recorder = Recorder(Mutex::new(Vec::new()));

        converter.convert_all(&sheets, Some(&recorder));

        let events = recorder.0.into_inner().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, 1);
        assert_eq!(events[1].0, 2);
        assert!(events.iter().all(|e| e.1 == 2));

        let b = events.iter().find(|e| e.2 == "B").unwrap();
        assert!(!b.3);
        let a = events.iter().find(|e| e.2 == "A").unwrap();
        assert!(a.3);
    }

    /// 最初の通知で待機する観測者
    struct SlowFirst(Mutex<Vec<usize>>);

    impl ProgressObserver for SlowFirst {
        fn on_sheet_finished(&self, progress: &SheetProgress<'_>) {
            if progress.sheets_completed == 1 {
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
            self.0.lock().unwrap().push(progress.sheets_completed);
        }
    }

    #[test]
    fn test_progress_counts_arrive_in_order_across_threads() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .unwrap();
        let converter = SheetConverter::default();
        let sheets: Vec<Sheet> = (0..8)
            .map(|i| header_sheet(&format!("S{}", i), vec!["x".into(), "y".into()]))
            .collect();
        let observer = SlowFirst(Mutex::new(Vec::new()));

        pool.install(|| converter.convert_all(&sheets, Some(&observer)));

        assert_eq!(
            observer.0.into_inner().unwrap(),
            (1..=8).collect::<Vec<usize>>()
        );
    }
}
