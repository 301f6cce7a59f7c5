//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! 構造的なエラー（入力ファイルが見つからない、必須列がない）は致命的で、
//! 実行全体を中断します。データ品質のエラー（数値に変換できないセル、
//! 読み取れないハイパーリンク属性）はこの型には現れず、各モジュール内で
//! 「欠損」「リンクなし」として吸収されます。

use thiserror::Error;

/// worklog-ratesクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: 入力ワークブックの解析エラー（calamine由来）
/// - `Write`: 出力ワークブックの書き込みエラー（rust_xlsxwriter由来）
/// - `NotFound`: 入力フォルダに対象ファイルが存在しない
/// - `MissingColumn`: 必須列がテーブルに存在しない
///
/// # 使用例
///
/// ```rust,no_run
/// use worklog_rates::{MergeConfig, WorklogRatesError};
///
/// match worklog_rates::run(&MergeConfig::default(), None, None) {
///     Err(WorklogRatesError::MissingColumn { table, column }) => {
///         eprintln!("{} に列 {} がありません", table, column);
///     }
///     Err(e) => eprintln!("{}", e),
///     Ok(report) => println!("{}", report.output_path.display()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum WorklogRatesError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 入力ワークブックの解析中に発生したエラー
    ///
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to read workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// 出力ワークブックの書き込み中に発生したエラー
    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// UTF-8文字列の変換エラー
    ///
    /// パッケージXMLの属性値がUTF-8として不正な場合に発生します。
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブ（xlsxパッケージ）の解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// パッケージXMLの解析エラー
    #[error("XML parse error: {0}")]
    Xml(String),

    /// 設定ファイル（JSON）の解析エラー
    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `MergeConfigBuilder::build()`時に、空の列名や不正なシート名などが
    /// 検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 入力フォルダに対象拡張子のファイルが存在しない
    ///
    /// フォルダ自体が存在しない場合も含みます。処理開始前に実行を中断します。
    #[error("No {what} file found in directory: {dir}")]
    NotFound {
        /// 探していた入力の種類（"worklog" / "resource plan"）
        what: String,
        /// 探索したフォルダ
        dir: String,
    },

    /// 必須列がテーブルに存在しない
    #[error("Column \"{column}\" is missing from the {table} table")]
    MissingColumn {
        /// テーブルの種類（"worklog" / "resource plan"）
        table: String,
        /// 見つからなかった列名
        column: String,
    },

    /// 再オープンしたワークブックに指定シートが存在しない
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサルなど、パッケージ読み込み時の制限に
    /// 違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, WorklogRatesError>;

impl WorklogRatesError {
    pub(crate) fn missing_column(table: &str, column: &str) -> Self {
        WorklogRatesError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for WorklogRatesError {
    fn from(e: zip::result::ZipError) -> Self {
        WorklogRatesError::Zip(e.to_string())
    }
}

impl From<quick_xml::Error> for WorklogRatesError {
    fn from(e: quick_xml::Error) -> Self {
        WorklogRatesError::Xml(e.to_string())
    }
}
