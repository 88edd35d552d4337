//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

/// セルの値を表す列挙型
///
/// ワークブックデコーダーから受け取る値は、この4種類のいずれかに正規化されます。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 文字列
    Text(String),

    /// 数値（f64）
    Number(f64),

    /// 論理値
    Bool(bool),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 文字列セルの場合のみ、その内容を返す
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON値に変換
    ///
    /// 整数値として表現できる数値は小数部なしで出力します（`42.0` ではなく `42`）。
    /// NaN や無限大は JSON で表現できないため `null` になります。
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Number(n) => number_to_json(*n),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Empty => Value::Null,
        }
    }

    /// ヘッダー行のラベルとして使用する文字列を取得
    ///
    /// 空セルはラベルを持ちません。
    pub fn header_label(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(number_to_json(*n).to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Empty => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// f64 が誤差なく i64 に収まる範囲（2^53）
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        // 非有限値は None となり null に落ちる
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// シート上の1セル
///
/// 読み込み後は不変です。`header` は同じシートの0行目から解決された列ラベルです。
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<'a> {
    /// セル座標
    pub coord: CellCoord,

    /// セルの値
    pub value: &'a CellValue,

    /// 列ヘッダー（ヘッダー行がない、または列がヘッダー行より右にある場合は `None`）
    pub header: Option<&'a str>,
}

/// 名前付きの矩形グリッド
///
/// 変換処理の入力であり、変換中に書き換えられることはありません。
/// 各行は `width()` と同じ長さに揃えられます（不足分は `CellValue::Empty`）。
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl Sheet {
    /// 行データからシートを生成
    ///
    /// 行の長さが不揃いな場合は、最長の行に合わせて空セルで埋めます。
    pub fn new(name: impl Into<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self {
            name: name.into(),
            rows,
            width,
        }
    }

    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 行数
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.width
    }

    /// 行データ
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// ヘッダー行（0行目）
    pub fn header_row(&self) -> Option<&[CellValue]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// 指定座標のセル値
    pub fn get(&self, coord: CellCoord) -> Option<&CellValue> {
        self.rows
            .get(coord.row as usize)
            .and_then(|row| row.get(coord.col as usize))
    }
}
