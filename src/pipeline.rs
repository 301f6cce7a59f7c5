//! Pipeline Module
//!
//! 入力の探索から出力ファイルの書き込み、タスク参照列の再コピーまでを
//! 順に実行するエントリーポイント。

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::config::MergeConfig;
use crate::error::{Result, WorklogRatesError};
use crate::links::{copy_task_links, LinkCopyReport};
use crate::locator::latest_file;
use crate::merge::merge_worklog;
use crate::output::write_table;
use crate::parser::read_table;
use crate::rates::{resolve_rates, RateConflict};

/// 実行結果
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 使用したワークログファイル
    pub worklog_path: PathBuf,
    /// 使用した要員計画ファイル
    pub resource_plan_path: PathBuf,
    /// 書き込んだ出力ファイル
    pub output_path: PathBuf,
    /// 単価の競合（出力には影響しない）
    pub conflicts: Vec<RateConflict>,
    /// 出力のデータ行数
    pub rows: usize,
    /// 要員計画に単価がなかった社員
    pub unmatched_employees: Vec<String>,
    /// タスク参照列のコピー結果
    pub links: LinkCopyReport,
}

/// ワークログに単価とコストを付与した出力ファイルを作る
///
/// `worklog`/`resource_plan`を指定した場合はそのファイルを使い、`None`の場合は
/// 設定されたディレクトリから最も新しいファイルを探します。
///
/// # 戻り値
///
/// * `Ok(RunReport)` - 出力ファイルのパスと競合の一覧
/// * `Err(WorklogRatesError::NotFound)` - 入力ファイルが見つからない場合
/// * `Err(WorklogRatesError::MissingColumn)` - 必須列がない場合
pub fn run(
    config: &MergeConfig,
    worklog: Option<&Path>,
    resource_plan: Option<&Path>,
) -> Result<RunReport> {
    config.validate()?;

    let InputFiles {
        worklog: worklog_path,
        resource_plan: resource_plan_path,
    } = locate_inputs(config, worklog, resource_plan)?;
    tracing::info!(path = %worklog_path.display(), "worklog");
    tracing::info!(path = %resource_plan_path.display(), "resource plan");

    let worklog_table = read_table(&worklog_path, None)?;
    let plan_table = read_table(&resource_plan_path, None)?;

    let rates = resolve_rates(&plan_table, &config.employee_column, &config.rate_column)?;
    for conflict in rates.conflicts() {
        tracing::warn!(
            employee = %conflict.employee,
            distinct_rates = conflict.distinct_rates,
            "conflicting rates in resource plan"
        );
    }

    let merged = merge_worklog(&worklog_table, &rates, config)?;
    if !merged.has_hours {
        tracing::warn!(
            column = %config.hours_column,
            "hours column not found in worklog, costs left empty"
        );
    }

    let output_path = output_path_for(
        &worklog_path,
        &config.output_prefix,
        Local::now().naive_local(),
    );
    write_table(&merged.table, &output_path, &config.sheet_name)?;

    let links = copy_task_links(
        &worklog_path,
        &output_path,
        &config.sheet_name,
        &config.task_link_column,
    )?;

    tracing::info!(path = %output_path.display(), rows = merged.table.len(), "output written");

    Ok(RunReport {
        worklog_path,
        resource_plan_path,
        output_path,
        conflicts: rates.conflicts().to_vec(),
        rows: merged.table.len(),
        unmatched_employees: merged.unmatched_employees,
        links,
    })
}

/// 処理対象の入力ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFiles {
    pub worklog: PathBuf,
    pub resource_plan: PathBuf,
}

/// 入力ファイルを決定する（明示されたパス、なければ各フォルダの最新ファイル）
///
/// どちらかが見つからない場合は`WorklogRatesError::NotFound`。
pub fn locate_inputs(
    config: &MergeConfig,
    worklog: Option<&Path>,
    resource_plan: Option<&Path>,
) -> Result<InputFiles> {
    Ok(InputFiles {
        worklog: locate(worklog, &config.worklog_dir, &config.extensions, "worklog")?,
        resource_plan: locate(
            resource_plan,
            &config.resource_plan_dir,
            &config.extensions,
            "resource plan",
        )?,
    })
}

fn locate(
    explicit: Option<&Path>,
    dir: &Path,
    extensions: &[String],
    what: &'static str,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    latest_file(dir, extensions).ok_or_else(|| WorklogRatesError::NotFound {
        what: what.to_string(),
        dir: dir.display().to_string(),
    })
}

/// 出力ファイルのパス（ワークログと同じディレクトリ、`prefix_YYYYMMDD_HHMMSS.xlsx`）
pub fn output_path_for(worklog: &Path, prefix: &str, timestamp: NaiveDateTime) -> PathBuf {
    let dir = match worklog.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    dir.join(format!("{}_{}.xlsx", prefix, timestamp.format("%Y%m%d_%H%M%S")))
}
