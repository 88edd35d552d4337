//! Public API Types
//!
//! 公開APIで使用する列挙型とトレイトを定義するモジュール。

/// シート選択方式
///
/// 変換対象のシートを選択する方法を指定します。
/// 選択結果の順序がそのまま処理順・レポート順になります。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートを変換（デフォルト）
    #[default]
    All,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet1".to_string())`
    Name(String),

    /// 複数のインデックス指定
    ///
    /// 空のリストは「変換対象なし」として扱われ、エラーにはなりません。
    ///
    /// 例: `SheetSelector::Indices(vec![0, 2, 4])`
    Indices(Vec<usize>),

    /// 複数のシート名指定
    ///
    /// 空のリストは「変換対象なし」として扱われ、エラーにはなりません。
    ///
    /// 例: `SheetSelector::Names(vec!["Sheet1".to_string(), "Sheet2".to_string()])`
    Names(Vec<String>),
}

/// 出力ファイルの構成
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum OutputLayout {
    /// シートごとに1ファイル（デフォルト）
    ///
    /// ファイル名: `<workbookName>_<sheetName>.json`
    ///
    /// ```json
    /// [
    ///   { "Name": "Alice", "Code": "AB-12" }
    /// ]
    /// ```
    #[default]
    PerSheet,

    /// ワークブック全体で1ファイル
    ///
    /// ファイル名: `<workbookName>.json`。出力されたシートのみを、シート名をキーとして含みます。
    ///
    /// ```json
    /// {
    ///   "Sheet1": [
    ///     { "Name": "Alice", "Code": "AB-12" }
    ///   ]
    /// }
    /// ```
    PerWorkbook,
}

/// 1シートの処理完了通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetProgress<'a> {
    /// 完了したシート数（この通知のシートを含む）
    pub sheets_completed: usize,

    /// 処理対象の総シート数
    pub total_sheets: usize,

    /// 完了したシート名
    pub sheet_name: &'a str,

    /// 違反が無かったか
    pub succeeded: bool,
}

/// 進捗通知を受け取るオブザーバー
///
/// 通知は任意であり、変換結果の正しさには影響しません。
/// シートは並列に処理されるため、通知は処理を終えたワーカースレッドから届き、
/// その順序は入力順と一致しないことがあります。
pub trait ProgressObserver: Sync {
    fn on_sheet_finished(&self, progress: &SheetProgress<'_>);
}
