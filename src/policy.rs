//! Policy Module
//!
//! セル内容のホワイトリスト検証ポリシーと、シート出力の可否を決める出力ポリシーを定義する。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::XlsxGuardError;

/// 既定で許可される英数字以外の文字（ハイフン、アンダースコア、空白、ピリオド）
pub const DEFAULT_ALLOWED_CHARACTERS: &str = "-_ .";

/// 既定の最大文字数
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// 数式とみなす先頭文字
pub const FORMULA_PREFIX: char = '=';

/// アクセント付き文字プリセット
const ACCENTED_LETTERS: &str = "áéíóúñüÁÉÍÓÚÑÜ";

/// ホワイトリスト検証ポリシー
///
/// 1回の変換処理の間は固定で、シートやセルごとに変わることはありません。
/// ASCII英数字は常に許可されるため、`allowed_characters` には
/// それ以外に許可する文字のみを指定します。
///
/// JSONから読み込む場合、省略したフィールドには既定値が使われます。
///
/// ```rust
/// use xlsxguard::ValidationPolicy;
///
/// let policy: ValidationPolicy =
///     serde_json::from_str(r#"{ "allowed_characters": "-_ .é" }"#).unwrap();
/// assert!(policy.is_allowed('é'));
/// assert_eq!(policy.max_length(), 128);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// ASCII英数字以外に許可する文字
    #[serde(with = "char_set")]
    allowed_characters: BTreeSet<char>,

    /// 文字列の最大文字数（Unicodeスカラー値単位）
    max_length: usize,

    /// `=` で始まる文字列を数式として検出するか
    detect_formulas: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allowed_characters: DEFAULT_ALLOWED_CHARACTERS.chars().collect(),
            max_length: DEFAULT_MAX_LENGTH,
            detect_formulas: true,
        }
    }
}

impl ValidationPolicy {
    /// 既定のポリシーを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 既定のポリシーにアクセント付き文字を加えたプリセット
    pub fn with_accented_letters() -> Self {
        Self::default().allow_characters(ACCENTED_LETTERS.chars())
    }

    /// 許可文字を追加する
    pub fn allow_characters<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
        self.allowed_characters.extend(chars);
        self
    }

    /// 許可文字の集合を置き換える
    pub fn with_allowed_characters<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
        self.allowed_characters = chars.into_iter().collect();
        self
    }

    /// 最大文字数を指定する
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// 数式検出の有効・無効を切り替える
    pub fn with_formula_detection(mut self, enabled: bool) -> Self {
        self.detect_formulas = enabled;
        self
    }

    /// 文字がポリシー上許可されているか
    pub fn is_allowed(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || self.allowed_characters.contains(&c)
    }

    /// ASCII英数字以外に許可されている文字
    pub fn allowed_characters(&self) -> &BTreeSet<char> {
        &self.allowed_characters
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn detects_formulas(&self) -> bool {
        self.detect_formulas
    }

    /// 設定値を検証する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxGuardError::Config` - 最大文字数が0、または制御文字が許可文字に含まれる場合
    pub(crate) fn validate(&self) -> Result<(), XlsxGuardError> {
        if self.max_length == 0 {
            return Err(XlsxGuardError::Config(
                "Invalid policy: max_length must be at least 1".to_string(),
            ));
        }

        if let Some(c) = self.allowed_characters.iter().find(|c| c.is_control()) {
            return Err(XlsxGuardError::Config(format!(
                "Invalid policy: control character U+{:04X} cannot be allowed",
                *c as u32
            )));
        }

        Ok(())
    }
}

/// 違反のあるシートを出力するかどうかの方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum EmitPolicy {
    /// 違反が1件でもあればシートのJSON出力を抑止する（デフォルト）
    ///
    /// 後続の表計算ソフトで開かれた際の数式インジェクションを防ぐため、
    /// 既定ではこちらを使用します。
    #[default]
    AllOrNothing,

    /// 違反の有無に関わらず常に出力し、違反は別途報告する
    BestEffort,
}

/// 許可文字集合を1つの文字列としてシリアライズする
mod char_set {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeSet;

    pub fn serialize<S: Serializer>(set: &BTreeSet<char>, serializer: S) -> Result<S::Ok, S::Error> {
        let s: String = set.iter().collect();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<char>, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.chars().collect())
    }
}
