//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::io::Read;

use crate::api::{OutputLayout, ProgressObserver, SheetSelector};
use crate::converter::{ConversionSummary, SheetConverter};
use crate::error::XlsxGuardError;
use crate::output::{build_artifacts, OutputArtifact};
use crate::parser::WorkbookParser;
use crate::policy::{EmitPolicy, ValidationPolicy};
use crate::security::SecurityConfig;
use crate::types::Sheet;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// セル検証ポリシー
    pub policy: ValidationPolicy,

    /// 違反のあるシートの出力方針
    pub emit_policy: EmitPolicy,

    /// 出力ファイルの構成
    pub output_layout: OutputLayout,

    /// 入力制限
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::All,
            policy: ValidationPolicy::default(),
            emit_policy: EmitPolicy::AllOrNothing,
            output_layout: OutputLayout::PerSheet,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxguard::{ConverterBuilder, EmitPolicy, SheetSelector, ValidationPolicy};
///
/// # fn main() -> Result<(), xlsxguard::XlsxGuardError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_policy(ValidationPolicy::with_accented_letters())
///     .with_emit_policy(EmitPolicy::BestEffort)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: すべてのシート
    /// - 検証ポリシー: 英数字と `- _ 空白 .`、最大128文字、数式検出あり
    /// - 出力方針: 違反があるシートは出力しない（All-or-nothing）
    /// - 出力構成: シートごとに1ファイル
    /// - 入力サイズ上限: 2GB
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換対象のシートを選択する
    ///
    /// ```rust
    /// use xlsxguard::{ConverterBuilder, SheetSelector};
    ///
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Names(vec!["Orders".to_string()]));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// セル検証ポリシーを指定する
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// 違反のあるシートの出力方針を指定する
    pub fn with_emit_policy(mut self, emit_policy: EmitPolicy) -> Self {
        self.config.emit_policy = emit_policy;
        self
    }

    /// 出力ファイルの構成を指定する
    pub fn with_output_layout(mut self, layout: OutputLayout) -> Self {
        self.config.output_layout = layout;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxGuardError::Config(String)`: 設定の検証に失敗した場合
    ///   * 最大文字数が0
    ///   * 許可文字に制御文字が含まれる
    ///   * 入力サイズ上限が0
    pub fn build(self) -> Result<Converter, XlsxGuardError> {
        self.config.policy.validate()?;

        if self.config.security.max_input_file_size == 0 {
            return Err(XlsxGuardError::Config(
                "Invalid max input size: must be greater than 0".to_string(),
            ));
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// `ConverterBuilder`で構築された設定に基づき、ワークブックのデコード、
/// シート選択、検証・変換、出力成果物の生成をまとめて行います。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxguard::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), xlsxguard::XlsxGuardError> {
/// let converter = ConverterBuilder::new().build()?;
/// let summary = converter.convert_workbook(File::open("book.xlsx")?)?;
///
/// for artifact in converter.artifacts(&summary, "book")? {
///     artifact.write_to(std::path::Path::new("out"))?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// シート変換器
    sheet_converter: SheetConverter,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            sheet_converter: SheetConverter::new(config.policy.clone(), config.emit_policy),
            config,
        }
    }

    /// 使用中の検証ポリシー
    pub fn policy(&self) -> &ValidationPolicy {
        &self.config.policy
    }

    /// ワークブック内のシート名を順に取得する
    pub fn list_sheets<R: Read>(&self, input: R) -> Result<Vec<String>, XlsxGuardError> {
        let parser = WorkbookParser::open(input, &self.config.security)?;
        Ok(parser.sheet_names())
    }

    /// ワークブックを検証・変換する
    ///
    /// # 処理フロー
    ///
    /// 1. 入力サイズの検証とデコード（失敗した場合は検証処理を行わずにエラー）
    /// 2. シート選択
    /// 3. 選択されたシートを選択順に読み込み
    /// 4. 各シートを並列に検証・変換（結果は選択順）
    ///
    /// シート単位の違反や出力抑止はエラーではなく、`ConversionSummary` に含まれます。
    pub fn convert_workbook<R: Read>(&self, input: R) -> Result<ConversionSummary, XlsxGuardError> {
        self.run(input, None)
    }

    /// 進捗通知付きでワークブックを検証・変換する
    pub fn convert_workbook_with_progress<R: Read>(
        &self,
        input: R,
        observer: &dyn ProgressObserver,
    ) -> Result<ConversionSummary, XlsxGuardError> {
        self.run(input, Some(observer))
    }

    /// デコード済みのシートを検証・変換する
    ///
    /// シート選択は適用されず、渡されたシートがそのまま順に処理されます。
    pub fn convert_sheets(&self, sheets: &[Sheet]) -> ConversionSummary {
        self.sheet_converter.convert_all(sheets, None)
    }

    /// 変換結果から、設定された出力構成で成果物を生成する
    pub fn artifacts(
        &self,
        summary: &ConversionSummary,
        workbook_name: &str,
    ) -> Result<Vec<OutputArtifact>, XlsxGuardError> {
        build_artifacts(summary, workbook_name, self.config.output_layout)
    }

    fn run<R: Read>(
        &self,
        input: R,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<ConversionSummary, XlsxGuardError> {
        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        let sheet_names = parser.select_sheets(&self.config.sheet_selector)?;

        if sheet_names.is_empty() {
            tracing::info!("no sheets selected");
            return Ok(ConversionSummary::default());
        }

        let sheets = parser.read_sheets(&sheet_names)?;
        Ok(self.sheet_converter.convert_all(&sheets, observer))
    }
}
