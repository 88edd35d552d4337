//! Security Module
//!
//! ワークブックをデコーダーに渡す前の入力制限を実装するモジュール。

use crate::error::XlsxGuardError;

/// 入力ファイルの最大サイズの既定値（2GB）
pub const DEFAULT_MAX_INPUT_SIZE: u64 = 2_147_483_648;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }
}

impl SecurityConfig {
    /// 入力サイズを検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 制限内の場合
    /// * `Err(XlsxGuardError::SecurityViolation)` - 制限を超えた場合
    pub fn check_input_size(&self, bytes: u64) -> Result<(), XlsxGuardError> {
        if bytes > self.max_input_file_size {
            return Err(XlsxGuardError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        assert_eq!(SecurityConfig::default().max_input_file_size, 2_147_483_648);
    }

    #[test]
    fn test_check_input_size_boundary() {
        let config = SecurityConfig {
            max_input_file_size: 10,
        };
        assert!(config.check_input_size(0).is_ok());
        assert!(config.check_input_size(10).is_ok());

        match config.check_input_size(11) {
            Err(XlsxGuardError::SecurityViolation(msg)) => {
                assert!(msg.contains("11 bytes"));
                assert!(msg.contains("max: 10 bytes"));
            }
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }
}
