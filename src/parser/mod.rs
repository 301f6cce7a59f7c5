//! Parser Module
//!
//! 入力ワークブックの読み込み。セル値はcalamineで、ハイパーリンクと
//! セルスタイルはxlsxパッケージのXMLから直接取得します。

mod package;
mod workbook;

use package::XlsxPackage;
pub(crate) use workbook::{read_grid, read_table};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::types::CellCoord;

/// ファイルを開き、シートの外部ハイパーリンクを取得する
///
/// `sheet`が`None`の場合は先頭シート。
pub fn read_hyperlinks(path: &Path, sheet: Option<&str>) -> Result<BTreeMap<CellCoord, String>> {
    let mut package = XlsxPackage::open(BufReader::new(File::open(path)?))?;
    let part = package.sheet(sheet)?;
    package.hyperlinks(&part)
}

/// ファイルを開き、セルに適用されたセルスタイル名を取得する
///
/// ハイパーリンクとして書き込まれたセルは`"Hyperlink"`を返します。
pub fn cell_style_name(path: &Path, sheet: Option<&str>, coord: CellCoord) -> Result<Option<String>> {
    let mut package = XlsxPackage::open(BufReader::new(File::open(path)?))?;
    let part = package.sheet(sheet)?;
    package.cell_style_name(&part, coord)
}
