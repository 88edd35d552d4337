//! Cell Validator Module
//!
//! 単一セルの値をホワイトリストポリシーに照らして分類する純粋関数群。
//! 状態もI/Oも持ちません。

use crate::policy::{ValidationPolicy, FORMULA_PREFIX};
use crate::types::CellValue;

/// 検証で検出された理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// 許可されていない文字（文字列中で最も左にあるもの）
    DisallowedCharacter(char),

    /// 最大文字数の超過
    LengthExceeded,

    /// `=` で始まる数式
    FormulaDetected,
}

/// 1セル分の検出結果
///
/// 同じセルが複数の規則に違反した場合も、1つの `Findings` にまとめられます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Findings {
    pub offending_character: Option<char>,
    pub length_exceeded: bool,
    pub is_formula: bool,
}

impl Findings {
    /// 違反が1つも無いか
    pub fn is_clean(&self) -> bool {
        self.offending_character.is_none() && !self.length_exceeded && !self.is_formula
    }

    /// 検出された理由を、文字・長さ・数式の順で列挙する
    pub fn reasons(&self) -> Vec<Reason> {
        let mut reasons = Vec::with_capacity(3);
        if let Some(c) = self.offending_character {
            reasons.push(Reason::DisallowedCharacter(c));
        }
        if self.length_exceeded {
            reasons.push(Reason::LengthExceeded);
        }
        if self.is_formula {
            reasons.push(Reason::FormulaDetected);
        }
        reasons
    }
}

/// 検証結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// ポリシーに適合
    Ok,

    /// 1つ以上の規則に違反（空になることはない）
    Flagged(Findings),
}

impl ValidationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationOutcome::Ok)
    }

    /// 違反内容（適合している場合は `None`）
    pub fn findings(&self) -> Option<&Findings> {
        match self {
            ValidationOutcome::Ok => None,
            ValidationOutcome::Flagged(findings) => Some(findings),
        }
    }
}

/// セル値を検証する
///
/// 文字列以外（数値、論理値、空セル）は常に `Ok` です。
/// 文字列については次の3規則を独立に評価します。
///
/// 1. 文字ホワイトリスト: ASCII英数字と許可文字以外を含む場合、最も左の文字を報告
/// 2. 文字数: `policy.max_length()` を超える場合（ちょうど同じ長さは適合）
/// 3. 数式: 先頭が `=` の場合
///
/// ```rust
/// use xlsxguard::{validate, CellValue, ValidationPolicy};
///
/// let policy = ValidationPolicy::default();
/// assert!(validate(&CellValue::from("AB-12"), &policy).is_ok());
/// assert!(!validate(&CellValue::from("=SUM(A1:A2)"), &policy).is_ok());
/// ```
pub fn validate(value: &CellValue, policy: &ValidationPolicy) -> ValidationOutcome {
    match value.as_text() {
        Some(text) => validate_text(text, policy),
        None => ValidationOutcome::Ok,
    }
}

/// 文字列を検証する
pub fn validate_text(text: &str, policy: &ValidationPolicy) -> ValidationOutcome {
    let findings = Findings {
        offending_character: first_disallowed_character(text, policy),
        length_exceeded: text.chars().count() > policy.max_length(),
        is_formula: policy.detects_formulas() && text.starts_with(FORMULA_PREFIX),
    };

    if findings.is_clean() {
        ValidationOutcome::Ok
    } else {
        ValidationOutcome::Flagged(findings)
    }
}

/// 許可されていない文字のうち、最も左にあるものを返す
pub fn first_disallowed_character(text: &str, policy: &ValidationPolicy) -> Option<char> {
    text.chars().find(|c| !policy.is_allowed(*c))
}
