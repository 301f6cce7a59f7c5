//! Output Module
//!
//! rust_xlsxwriterでワークシートを書き出すモジュール。
//! 統合結果の初回書き込みと、`SheetDocument`の上書き保存の両方で使用します。

mod relationships;

use rust_xlsxwriter::{Format, FormatBorder, Url, Workbook, Worksheet};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::types::{CellCoord, CellValue, Table};
use relationships::LinkTargets;

/// 日時セルの表示形式
const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// シートを1枚だけ持つワークブックとして保存する
///
/// 1行目はヘッダー書式で書き込みます。`hyperlinks`に含まれるセルは
/// ハイパーリンク（組み込みの"Hyperlink"セルスタイル）として書き込み、
/// ターゲットは検証やエンコードをせずそのまま保存します。
pub(crate) fn save_sheet(
    path: &Path,
    sheet_name: &str,
    cells: &[Vec<CellValue>],
    hyperlinks: &BTreeMap<CellCoord, String>,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let formats = SheetFormats::new();
    let mut targets = LinkTargets::default();

    for (row_idx, row) in cells.iter().enumerate() {
        let row_idx = row_idx as u32;
        for (col_idx, value) in row.iter().enumerate() {
            let coord = CellCoord::new(row_idx, col_idx as u32);
            match hyperlinks.get(&coord) {
                Some(target) => {
                    write_link(worksheet, coord, value, target, &formats, &mut targets)?
                }
                None => write_value(worksheet, coord, value, &formats, false)?,
            }
        }
    }

    // 値のないセルにだけ付いたハイパーリンク
    for (coord, target) in hyperlinks {
        let has_cell = cells
            .get(coord.row as usize)
            .is_some_and(|row| (coord.col as usize) < row.len());
        if !has_cell {
            write_link(worksheet, *coord, &CellValue::Empty, target, &formats, &mut targets)?;
        }
    }

    worksheet.autofit();
    let package = targets.restore(workbook.save_to_buffer()?)?;
    std::fs::write(path, package)?;
    Ok(())
}

/// テーブル（ヘッダー + データ行）をワークブックとして保存する
pub fn write_table(table: &Table, path: &Path, sheet_name: &str) -> Result<()> {
    let mut cells = Vec::with_capacity(table.rows.len() + 1);
    cells.push(
        table
            .headers
            .iter()
            .map(|h| CellValue::String(h.clone()))
            .collect::<Vec<_>>(),
    );
    cells.extend(table.rows.iter().cloned());

    save_sheet(path, sheet_name, &cells, &BTreeMap::new())
}

struct SheetFormats {
    header: Format,
    datetime: Format,
    link: Format,
    link_datetime: Format,
}

impl SheetFormats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold().set_border(FormatBorder::Thin),
            datetime: Format::new().set_num_format(DATETIME_NUM_FORMAT),
            link: Format::new().set_hyperlink(),
            link_datetime: Format::new()
                .set_hyperlink()
                .set_num_format(DATETIME_NUM_FORMAT),
        }
    }
}

/// セルの値を型を保って書き込む（`linked`の場合はハイパーリンク書式）
fn write_value(
    worksheet: &mut Worksheet,
    coord: CellCoord,
    value: &CellValue,
    formats: &SheetFormats,
    linked: bool,
) -> Result<()> {
    let (row, col) = (coord.row, coord.col as u16);

    if row == 0 {
        if !value.is_empty() {
            worksheet.write_string_with_format(row, col, value.as_raw_string(), &formats.header)?;
        }
        return Ok(());
    }

    let link = linked.then_some(&formats.link);
    match (value, link) {
        (CellValue::Number(n), Some(format)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::String(s), Some(format)) if !s.is_empty() => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        (CellValue::String(s), None) if !s.is_empty() => {
            worksheet.write_string(row, col, s)?;
        }
        (CellValue::Bool(b), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::DateTime(serial), _) => {
            let format = if linked {
                &formats.link_datetime
            } else {
                &formats.datetime
            };
            worksheet.write_number_with_format(row, col, *serial, format)?;
        }
        (CellValue::Error(e), Some(format)) => {
            worksheet.write_string_with_format(row, col, e, format)?;
        }
        (CellValue::Error(e), None) => {
            worksheet.write_string(row, col, e)?;
        }
        (CellValue::String(_), _) | (CellValue::Empty, _) => {}
    }
    Ok(())
}

/// ハイパーリンク付きセルを書き込む
///
/// リンクは仮のURLで登録し、保存後に元のターゲットへ置き換えます。
/// 値は元の型のまま書き直します。値のないセルにはターゲットを表示文字列として
/// 書き込みます。
fn write_link(
    worksheet: &mut Worksheet,
    coord: CellCoord,
    value: &CellValue,
    target: &str,
    formats: &SheetFormats,
    targets: &mut LinkTargets,
) -> Result<()> {
    let text = match value.as_raw_string() {
        text if text.is_empty() => target.to_string(),
        text => text,
    };
    let url = Url::new(targets.register(target)).set_text(text);
    worksheet.write_url(coord.row, coord.col as u16, url)?;

    if !matches!(value, CellValue::String(_) | CellValue::Empty) {
        write_value(worksheet, coord, value, formats, true)?;
    }
    Ok(())
}
