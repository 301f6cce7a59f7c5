//! Merger Module
//!
//! ワークログテーブルに確定単価を左結合し、コスト列を計算するモジュール。
//!
//! 結合は行を増やしも減らしもしないため、出力の行`i`は常にワークログの行`i`に
//! 対応します。タスク参照列の再コピー（`links`モジュール）はこの対応に依存します。

use crate::config::MergeConfig;
use crate::error::{Result, WorklogRatesError};
use crate::numeric::to_number;
use crate::rates::RateTable;
use crate::types::{CellValue, Table};

/// 結合結果
#[derive(Debug, Clone)]
pub struct MergedTable {
    /// 出力テーブル（ワークログの列 + 単価列 + コスト列）
    pub table: Table,
    /// 単価が見つからなかった社員（初出順、重複なし）
    pub unmatched_employees: Vec<String>,
    /// 実績時間列が存在したかどうか
    pub has_hours: bool,
}

/// ワークログに単価とコストを付与する
///
/// - 社員列で左結合し、要員計画にない社員の単価は欠損
/// - 実績時間列があれば `コスト = 正規化(時間) × 単価`（どちらかが欠損なら欠損）
/// - 実績時間列がなければコスト列はすべて欠損
/// - 列順: ワークログの元の列、その後に新規の列（単価、コスト）
///
/// 単価列・コスト列がすでにワークログに存在する場合は、その位置の値を置き換えます。
///
/// # 戻り値
///
/// * `Ok(MergedTable)` - 結合結果
/// * `Err(WorklogRatesError::MissingColumn)` - ワークログに社員列がない場合
pub fn merge_worklog(worklog: &Table, rates: &RateTable, config: &MergeConfig) -> Result<MergedTable> {
    let employee_idx = worklog
        .column_index(&config.employee_column)
        .ok_or_else(|| WorklogRatesError::missing_column("worklog", &config.employee_column))?;
    let hours_idx = worklog.column_index(&config.hours_column);

    let mut headers = worklog.headers.clone();
    let rate_idx = column_or_append(&mut headers, &config.resolved_rate_column);
    let cost_idx = column_or_append(&mut headers, &config.cost_column);
    let width = headers.len();

    let mut unmatched_employees: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(worklog.rows.len());

    for source in &worklog.rows {
        let employee = source[employee_idx].as_key();
        let rate = employee.as_deref().and_then(|e| rates.rate_for(e));

        if rate.is_none() {
            if let Some(employee) = employee {
                if !unmatched_employees.contains(&employee) {
                    unmatched_employees.push(employee);
                }
            }
        }

        let cost = match (hours_idx.and_then(|h| to_number(&source[h])), rate) {
            (Some(hours), Some(rate)) => Some(hours * rate),
            _ => None,
        };

        let mut row = source.clone();
        row.resize(width, CellValue::Empty);
        row[rate_idx] = CellValue::from_number(rate);
        row[cost_idx] = CellValue::from_number(cost);
        rows.push(row);
    }

    tracing::debug!(
        rows = rows.len(),
        unmatched = unmatched_employees.len(),
        "merged worklog with rates"
    );

    Ok(MergedTable {
        table: Table { headers, rows },
        unmatched_employees,
        has_hours: hours_idx.is_some(),
    })
}

fn column_or_append(headers: &mut Vec<String>, name: &str) -> usize {
    match headers.iter().position(|h| h == name) {
        Some(idx) => idx,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    }
}
