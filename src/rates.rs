//! Rate Resolver Module
//!
//! 要員計画テーブルから社員ごとに一つの時間単価を確定するモジュール。
//!
//! 同じ社員に複数の行がある場合は最頻値を採用し、同数の場合は元の行順で
//! 最初に現れた値を採用します。異なる単価が複数ある社員は「競合」として
//! 報告しますが、処理は中断しません。

use crate::error::{Result, WorklogRatesError};
use crate::numeric::to_number;
use crate::types::Table;
use std::collections::HashMap;

/// 社員ごとに確定した単価
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRate {
    /// 社員（結合キー）
    pub employee: String,
    /// 単価（有効な値が一つもなければ`None`）
    pub rate: Option<f64>,
}

/// 単価の競合（同じ社員に異なる単価が複数ある）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateConflict {
    /// 社員
    pub employee: String,
    /// 欠損を除いた異なる単価の数（常に2以上）
    pub distinct_rates: usize,
}

/// 単価の確定結果
///
/// `rates`は社員が要員計画に最初に現れた順序を保持します。
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: Vec<ResolvedRate>,
    index: HashMap<String, usize>,
    conflicts: Vec<RateConflict>,
}

impl RateTable {
    /// 社員の単価を取得する
    ///
    /// 要員計画に存在しない社員、または有効な単価がない社員は`None`。
    pub fn rate_for(&self, employee: &str) -> Option<f64> {
        self.index.get(employee).and_then(|&i| self.rates[i].rate)
    }

    /// 社員が要員計画に存在するかどうか
    pub fn contains(&self, employee: &str) -> bool {
        self.index.contains_key(employee)
    }

    /// 確定した単価の一覧（1社員1行）
    pub fn rates(&self) -> &[ResolvedRate] {
        &self.rates
    }

    /// 競合の一覧（空の場合もある）
    pub fn conflicts(&self) -> &[RateConflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// 社員ごとに観測された単価（出現順）
#[derive(Debug, Default)]
struct RateObservations {
    values: Vec<f64>,
}

impl RateObservations {
    /// 異なる値の数
    fn distinct_count(&self) -> usize {
        self.frequencies().len()
    }

    /// 値ごとの出現回数（初出順）
    fn frequencies(&self) -> Vec<(f64, usize)> {
        let mut freq: Vec<(f64, usize)> = Vec::new();
        for &value in &self.values {
            match freq.iter_mut().find(|(v, _)| *v == value) {
                Some((_, count)) => *count += 1,
                None => freq.push((value, 1)),
            }
        }
        freq
    }

    /// 最頻値（同数なら初出の値）
    fn mode(&self) -> Option<f64> {
        let mut best: Option<(f64, usize)> = None;
        for (value, count) in self.frequencies() {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((value, count));
            }
        }
        best.map(|(value, _)| value)
    }
}

/// 要員計画テーブルから単価表を作る
///
/// # 引数
///
/// * `plan` - 要員計画テーブル
/// * `employee_column` - 社員列の名前
/// * `rate_column` - 単価列の名前
///
/// # 戻り値
///
/// * `Ok(RateTable)` - 確定した単価と競合の一覧
/// * `Err(WorklogRatesError::MissingColumn)` - 社員列または単価列がない場合
pub fn resolve_rates(plan: &Table, employee_column: &str, rate_column: &str) -> Result<RateTable> {
    let employee_idx = plan
        .column_index(employee_column)
        .ok_or_else(|| WorklogRatesError::missing_column("resource plan", employee_column))?;
    let rate_idx = plan
        .column_index(rate_column)
        .ok_or_else(|| WorklogRatesError::missing_column("resource plan", rate_column))?;

    // 1. 正規化しながら社員ごとにグループ化（初出順を保持）
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, RateObservations> = HashMap::new();

    for row in &plan.rows {
        // 社員が空の行はどのグループにも属さない
        let Some(employee) = row[employee_idx].as_key() else {
            continue;
        };
        let group = groups.entry(employee.clone()).or_insert_with(|| {
            order.push(employee);
            RateObservations::default()
        });
        if let Some(rate) = to_number(&row[rate_idx]) {
            group.values.push(rate);
        }
    }

    // 2. 競合検出と単価の確定
    let mut table = RateTable::default();
    for employee in order {
        let observations = &groups[&employee];

        let distinct = observations.distinct_count();
        if distinct > 1 {
            table.conflicts.push(RateConflict {
                employee: employee.clone(),
                distinct_rates: distinct,
            });
        }

        table.index.insert(employee.clone(), table.rates.len());
        table.rates.push(ResolvedRate {
            employee,
            rate: observations.mode(),
        });
    }

    tracing::debug!(
        employees = table.rates.len(),
        conflicts = table.conflicts.len(),
        "resolved rates"
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn plan(rows: &[(&str, CellValue)]) -> Table {
        Table::new(
            vec!["Сотрудник".into(), "Ставка".into()],
            rows.iter()
                .map(|(e, r)| vec![CellValue::String((*e).into()), r.clone()])
                .collect(),
        )
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.into())
    }

    #[test]
    fn test_single_rate() {
        let table = resolve_rates(&plan(&[("A", num(150.0))]), "Сотрудник", "Ставка").unwrap();
        assert_eq!(table.rate_for("A"), Some(150.0));
        assert!(table.conflicts().is_empty());
    }

    #[test]
    fn test_consistent_duplicates_are_not_conflicts() {
        let table = resolve_rates(
            &plan(&[("B", num(200.0)), ("B", text("200,00"))]),
            "Сотрудник",
            "Ставка",
        )
        .unwrap();
        assert_eq!(table.rate_for("B"), Some(200.0));
        assert!(table.conflicts().is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_mode_wins_and_conflict_recorded() {
        let table = resolve_rates(
            &plan(&[("A", num(100.0)), ("A", num(200.0)), ("A", num(100.0))]),
            "Сотрудник",
            "Ставка",
        )
        .unwrap();
        assert_eq!(table.rate_for("A"), Some(100.0));
        assert_eq!(
            table.conflicts(),
            &[RateConflict {
                employee: "A".into(),
                distinct_rates: 2
            }]
        );
    }

    #[test]
    fn test_tie_breaks_by_first_seen() {
        let table = resolve_rates(
            &plan(&[("A", num(300.0)), ("A", num(100.0))]),
            "Сотрудник",
            "Ставка",
        )
        .unwrap();
        assert_eq!(table.rate_for("A"), Some(300.0));

        let table = resolve_rates(
            &plan(&[
                ("A", num(100.0)),
                ("A", num(300.0)),
                ("A", num(300.0)),
                ("A", num(100.0)),
            ]),
            "Сотрудник",
            "Ставка",
        )
        .unwrap();
        assert_eq!(table.rate_for("A"), Some(100.0));
    }

    #[test]
    fn test_missing_rates_are_dropped() {
        let table = resolve_rates(
            &plan(&[("A", CellValue::Empty), ("A", text("н/д")), ("A", num(90.0))]),
            "Сотрудник",
            "Ставка",
        )
        .unwrap();
        assert_eq!(table.rate_for("A"), Some(90.0));
        assert!(table.conflicts().is_empty());
    }

    #[test]
    fn test_all_missing_rates_resolve_to_none() {
        let table = resolve_rates(
            &plan(&[("A", CellValue::Empty), ("A", text("—"))]),
            "Сотрудник",
            "Ставка",
        )
        .unwrap();
        assert!(table.contains("A"));
        assert_eq!(table.rate_for("A"), None);
    }

    #[test]
    fn test_blank_employee_rows_ignored() {
        let table = Table::new(
            vec!["Сотрудник".into(), "Ставка".into()],
            vec![vec![CellValue::Empty, num(500.0)]],
        );
        let rates = resolve_rates(&table, "Сотрудник", "Ставка").unwrap();
        assert!(rates.is_empty());
    }

    #[test]
    fn test_first_seen_employee_order() {
        let table = resolve_rates(
            &plan(&[("C", num(1.0)), ("A", num(2.0)), ("C", num(1.0)), ("B", num(3.0))]),
            "Сотрудник",
            "Ставка",
        )
        .unwrap();
        let employees: Vec<_> = table.rates().iter().map(|r| r.employee.as_str()).collect();
        assert_eq!(employees, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_missing_columns() {
        let table = Table::new(vec!["Сотрудник".into()], vec![]);
        match resolve_rates(&table, "Сотрудник", "Ставка") {
            Err(WorklogRatesError::MissingColumn { table, column }) => {
                assert_eq!(table, "resource plan");
                assert_eq!(column, "Ставка");
            }
            other => panic!("Expected MissingColumn, got {:?}", other),
        }

        let table = Table::new(vec!["Ставка".into()], vec![]);
        assert!(matches!(
            resolve_rates(&table, "Сотрудник", "Ставка"),
            Err(WorklogRatesError::MissingColumn { .. })
        ));
    }
}
