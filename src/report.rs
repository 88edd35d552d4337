//! Violation Report Module
//!
//! 違反レコードと、全シート分を連結した違反レポートを定義するモジュール。

use serde::Serialize;
use std::fmt;

use crate::validator::Findings;

/// 1セル分の違反レコード
///
/// 1つのセルが複数の規則に違反しても、レコードは1件だけ生成されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// シート名
    pub sheet_name: String,

    /// 行番号（1始まり）
    pub row: u32,

    /// 列ヘッダー（ヘッダーが無い場合は `None`）
    pub column: Option<String>,

    /// 最初の不許可文字
    pub offending_character: Option<char>,

    /// 最大文字数を超えたか
    pub length_exceeded: bool,

    /// 数式として検出されたか
    pub is_formula: bool,
}

impl Violation {
    /// 0始まりの行インデックスと検出結果からレコードを生成
    pub(crate) fn new(
        sheet_name: &str,
        row_index: u32,
        column: Option<&str>,
        findings: &Findings,
    ) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            row: row_index + 1,
            column: column.map(str::to_string),
            offending_character: findings.offending_character,
            length_exceeded: findings.length_exceeded,
            is_formula: findings.is_formula,
        }
    }
}

impl fmt::Display for Violation {
    /// `sheet: S, row: R, column: C[, character: "X"][, length exceeded][, formula detected]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet: {}, row: {}, column: ", self.sheet_name, self.row)?;
        match &self.column {
            Some(column) => write!(f, "{}", column)?,
            None => write!(f, "null")?,
        }
        if let Some(c) = self.offending_character {
            write!(f, ", character: \"{}\"", c)?;
        }
        if self.length_exceeded {
            write!(f, ", length exceeded")?;
        }
        if self.is_formula {
            write!(f, ", formula detected")?;
        }
        Ok(())
    }
}

/// 処理した全シートの違反をシート順・行順・列順に並べたレポート
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationReport {
    violations: Vec<Violation>,
}

impl ViolationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 別シートの違反を末尾に連結する
    pub fn extend<I: IntoIterator<Item = Violation>>(&mut self, violations: I) {
        self.violations.extend(violations);
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    pub fn as_slice(&self) -> &[Violation] {
        &self.violations
    }

    /// 指定シートの違反のみを返す
    pub fn for_sheet<'a>(&'a self, sheet_name: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |v| v.sheet_name == sheet_name)
    }

    /// 1行1違反のテキストに変換する（空の場合は空文字列）
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl FromIterator<Violation> for ViolationReport {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ViolationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationReport {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}
