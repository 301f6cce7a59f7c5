//! Config Module
//!
//! 入力フォルダ、列名、出力シート名などの設定を保持する`MergeConfig`と、
//! それを段階的に構築する`MergeConfigBuilder`を提供するモジュール。
//!
//! 設定はプロセス全体の定数ではなく、`run()`に明示的に渡されます。

use crate::error::{Result, WorklogRatesError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Excelシート名に使用できない文字
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Excelシート名の最大長
const MAX_SHEET_NAME_LEN: usize = 31;

/// 統合処理の設定
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// ワークログのエクスポートが置かれるフォルダ
    pub worklog_dir: PathBuf,

    /// 要員計画（リソースプラン）のエクスポートが置かれるフォルダ
    pub resource_plan_dir: PathBuf,

    /// 探索対象の拡張子（ドットなし、大文字小文字を区別しない）
    pub extensions: Vec<String>,

    /// 出力シート名
    pub sheet_name: String,

    /// 社員を識別する列（両テーブル共通の結合キー）
    pub employee_column: String,

    /// 要員計画のレート列
    pub rate_column: String,

    /// ワークログの実績時間列
    pub hours_column: String,

    /// ワークログのタスク参照列（テキスト + ハイパーリンク）
    pub task_link_column: String,

    /// 出力に追加する確定レート列
    pub resolved_rate_column: String,

    /// 出力に追加するコスト列
    pub cost_column: String,

    /// 出力ファイル名のプレフィックス
    pub output_prefix: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            worklog_dir: PathBuf::from("WL"),
            resource_plan_dir: PathBuf::from("Data/Resource plan/Результат"),
            extensions: vec!["xlsx".to_string(), "xls".to_string()],
            sheet_name: "worklogs_with_rates".to_string(),
            employee_column: "Сотрудник".to_string(),
            rate_column: "Ставка".to_string(),
            hours_column: "Часы факт".to_string(),
            task_link_column: "Ссылка на задачу".to_string(),
            resolved_rate_column: "Ставка, ₽/ч".to_string(),
            cost_column: "Стоимость факт, ₽".to_string(),
            output_prefix: "worklogs_with_rates".to_string(),
        }
    }
}

impl MergeConfig {
    /// JSON設定ファイルを読み込む
    ///
    /// ファイルに記載されていない項目はデフォルト値になります。
    /// 読み込み後に`validate()`を通します。
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MergeConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定の整合性を検証する
    pub fn validate(&self) -> Result<()> {
        let columns = [
            ("employee_column", &self.employee_column),
            ("rate_column", &self.rate_column),
            ("hours_column", &self.hours_column),
            ("task_link_column", &self.task_link_column),
            ("resolved_rate_column", &self.resolved_rate_column),
            ("cost_column", &self.cost_column),
        ];
        for (field, value) in columns {
            if value.trim().is_empty() {
                return Err(WorklogRatesError::Config(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        if self.resolved_rate_column == self.cost_column {
            return Err(WorklogRatesError::Config(format!(
                "resolved_rate_column and cost_column must differ (both are '{}')",
                self.cost_column
            )));
        }

        if self.extensions.is_empty() {
            return Err(WorklogRatesError::Config(
                "At least one file extension is required".to_string(),
            ));
        }

        if self.output_prefix.is_empty() {
            return Err(WorklogRatesError::Config(
                "output_prefix must not be empty".to_string(),
            ));
        }

        validate_sheet_name(&self.sheet_name)
    }
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(WorklogRatesError::Config(format!(
            "Sheet name must be 1-{} characters: '{}'",
            MAX_SHEET_NAME_LEN, name
        )));
    }
    if name.contains(INVALID_SHEET_CHARS) {
        return Err(WorklogRatesError::Config(format!(
            "Sheet name contains an invalid character: '{}'",
            name
        )));
    }
    Ok(())
}

/// `MergeConfig`を段階的に構築するビルダー
///
/// すべての設定項目にデフォルト値が設定されており、必要な項目のみを
/// オーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use worklog_rates::MergeConfigBuilder;
///
/// # fn main() -> Result<(), worklog_rates::WorklogRatesError> {
/// let config = MergeConfigBuilder::new()
///     .with_worklog_dir("/data/WL")
///     .with_resource_plan_dir("/data/RP")
///     .with_sheet_name("report")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    /// デフォルト設定を持つビルダーを生成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の設定から開始する（設定ファイル + CLIオーバーライド用）
    pub fn from_config(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn with_worklog_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.worklog_dir = dir.into();
        self
    }

    pub fn with_resource_plan_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.resource_plan_dir = dir.into();
        self
    }

    /// 探索対象の拡張子を指定する（先頭のドットは除去されます）
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    pub fn with_employee_column(mut self, name: impl Into<String>) -> Self {
        self.config.employee_column = name.into();
        self
    }

    pub fn with_rate_column(mut self, name: impl Into<String>) -> Self {
        self.config.rate_column = name.into();
        self
    }

    pub fn with_hours_column(mut self, name: impl Into<String>) -> Self {
        self.config.hours_column = name.into();
        self
    }

    pub fn with_task_link_column(mut self, name: impl Into<String>) -> Self {
        self.config.task_link_column = name.into();
        self
    }

    pub fn with_resolved_rate_column(mut self, name: impl Into<String>) -> Self {
        self.config.resolved_rate_column = name.into();
        self
    }

    pub fn with_cost_column(mut self, name: impl Into<String>) -> Self {
        self.config.cost_column = name.into();
        self
    }

    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = prefix.into();
        self
    }

    /// 設定を検証して`MergeConfig`を生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(MergeConfig)` - 設定が有効な場合
    /// * `Err(WorklogRatesError::Config)` - 設定が無効な場合
    pub fn build(self) -> Result<MergeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
