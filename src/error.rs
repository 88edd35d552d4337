//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! セル単位の検証違反や、違反によるシート出力の抑止はエラーではありません。
//! それらは `Violation` と `SheetConversion` のデータとして呼び出し側に返されます。

use thiserror::Error;

/// xlsxguardクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み失敗など）
/// - `Parse`: ワークブックのデコード中に発生したエラー（calamine由来）
/// - `Json`: JSON のシリアライズに失敗したエラー
/// - `Config`: 設定の検証に失敗したエラー（無効なポリシー、存在しないシートなど）
/// - `SecurityViolation`: 入力サイズ制限などのセキュリティ制限に違反したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxguard::XlsxGuardError;
/// use std::fs::File;
///
/// fn read_workbook_file(path: &str) -> Result<(), XlsxGuardError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxGuardError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブックのデコード中に発生したエラー
    ///
    /// ファイル形式が不正、破損したファイル、サポートされていない形式などが
    /// 原因となります。このエラーが発生した場合、検証・変換処理は実行されません。
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to decode workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// JSON のシリアライズエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時の設定検証や、シート選択時に
    /// 存在しないシートが指定された場合などに発生します。
    ///
    /// # 例
    ///
    /// ```rust
    /// use xlsxguard::{ConverterBuilder, ValidationPolicy, XlsxGuardError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_policy(ValidationPolicy::default().with_max_length(0))
    ///     .build();
    ///
    /// assert!(matches!(result, Err(XlsxGuardError::Config(_))));
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// # 例
    ///
    /// ```rust
    /// use xlsxguard::XlsxGuardError;
    ///
    /// let error = XlsxGuardError::SecurityViolation(
    ///     "Input file size exceeds maximum".to_string()
    /// );
    /// assert!(error.to_string().starts_with("Security violation"));
    /// ```
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxGuardError = io_err.into();

        match error {
            XlsxGuardError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: XlsxGuardError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to decode workbook"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: XlsxGuardError = json_err.into();
        assert!(matches!(error, XlsxGuardError::Json(_)));
        assert!(error.to_string().starts_with("JSON serialization error"));
    }

    #[test]
    fn test_config_error_display() {
        let error = XlsxGuardError::Config("Sheet 'Missing' not found".to_string());
        let error_msg = error.to_string();

        assert!(error_msg.contains("Configuration error"));
        assert!(error_msg.contains("Sheet 'Missing' not found"));
    }

    // エラー変換のテスト（?演算子の動作確認）
    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxGuardError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(XlsxGuardError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }
}
