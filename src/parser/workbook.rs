//! Workbook Reader Module
//!
//! calamineを使用してワークシートのセル値を読み込むモジュール。
//! xlsx/xlsm/xls/odsのいずれも読み込めます。

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

use crate::error::{Result, WorklogRatesError};
use crate::types::{CellValue, Table};

/// シートのセル値（A1を原点とする密なグリッド）
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SheetGrid {
    /// シート名
    pub name: String,
    /// 行ごとのセル値（すべての行は同じ長さ）
    pub cells: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    /// 1行目をヘッダーとしてテーブルに変換
    pub fn into_table(self) -> Table {
        let mut rows = self.cells.into_iter();
        let headers = rows
            .next()
            .map(|header| header.iter().map(CellValue::as_raw_string).collect())
            .unwrap_or_default();
        Table::new(headers, rows.collect())
    }
}

/// ワークブックを開き、シートのセル値を読み込む
///
/// # 引数
///
/// * `path` - 入力ファイル
/// * `sheet` - シート名（`None`の場合は先頭シート）
///
/// # 戻り値
///
/// * `Ok(SheetGrid)` - 読み込んだセル値
/// * `Err(WorklogRatesError::Parse)` - ファイルを解析できない場合
/// * `Err(WorklogRatesError::SheetNotFound)` - シートが存在しない場合
pub(crate) fn read_grid(path: &Path, sheet: Option<&str>) -> Result<SheetGrid> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();

    let name = match sheet {
        Some(name) if names.iter().any(|n| n == name) => name.to_string(),
        Some(name) => return Err(WorklogRatesError::SheetNotFound(name.to_string())),
        None => names
            .first()
            .cloned()
            .ok_or_else(|| WorklogRatesError::SheetNotFound("<first sheet>".to_string()))?,
    };

    let range = workbook.worksheet_range(&name)?;
    Ok(SheetGrid {
        cells: dense_cells(&range),
        name,
    })
}

/// calamineの範囲をA1原点の密なグリッドに展開
///
/// calamineの範囲は最初の非空セルから始まるため、絶対座標で取り出します。
fn dense_cells(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((last_row, last_col)) = range.end() else {
        return Vec::new();
    };

    (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(CellValue::from)
                        .unwrap_or(CellValue::Empty)
                })
                .collect()
        })
        .collect()
}

/// ファイルの先頭シート（またはシート名指定）をテーブルとして読み込む
pub(crate) fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    Ok(read_grid(path, sheet)?.into_table())
}
