//! Numeric Normalizer Module
//!
//! ロケール書式の数値文字列（ノーブレークスペースによる桁区切り、
//! 小数点としてのカンマ、通貨記号など）を`f64`に変換するモジュール。
//!
//! 変換できない値はエラーにせず、欠損（`None`）として扱います。

use crate::types::CellValue;

/// セル値を数値に正規化する
///
/// - 空セル → `None`
/// - 数値・論理値 → そのまま`f64`
/// - 文字列 → 空白類を除去し、`,`を`.`に置換し、数字・`.`・`-`以外を除去してからパース
/// - それ以外（エラー値、日時） → `None`
///
/// # 使用例
///
/// ```rust
/// use worklog_rates::{to_number, CellValue};
///
/// assert_eq!(to_number(&CellValue::String("1 234,50".into())), Some(1234.5));
/// assert_eq!(to_number(&CellValue::String("n/a".into())), None);
/// assert_eq!(to_number(&CellValue::Number(-7.0)), Some(-7.0));
/// ```
pub fn to_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::String(s) => parse_localized(s),
        CellValue::Empty | CellValue::Error(_) | CellValue::DateTime(_) => None,
    }
}

/// ロケール書式の数値文字列をパースする
///
/// `"1\u{a0}234,50 ₽"` → `Some(1234.5)`
pub fn parse_localized(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
