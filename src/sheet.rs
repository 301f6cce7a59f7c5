//! Sheet Document Module
//!
//! 保存済みのワークシートを開き直し、セル値とハイパーリンクを編集して
//! 上書き保存するためのメモリ上のモデル。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::output::save_sheet;
use crate::parser::{read_grid, read_hyperlinks};
use crate::types::{CellCoord, CellValue, TaskLinkCell};

/// 編集可能なワークシート
///
/// 1行目をヘッダー行として扱います。
#[derive(Debug, Clone)]
pub struct SheetDocument {
    path: PathBuf,
    name: String,
    cells: Vec<Vec<CellValue>>,
    hyperlinks: BTreeMap<CellCoord, String>,
}

impl SheetDocument {
    /// ファイルからシートを開く（`sheet`が`None`の場合は先頭シート）
    ///
    /// ハイパーリンク情報が読み取れない場合（.xls形式、壊れたパッケージXMLなど）は
    /// 警告を出し、すべてのセルを「リンクなし」として扱います。
    pub fn open(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let grid = read_grid(path, sheet)?;

        let hyperlinks = match read_hyperlinks(path, Some(&grid.name)) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    sheet = %grid.name,
                    error = %e,
                    "hyperlinks unavailable, treating cells as plain values"
                );
                BTreeMap::new()
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            name: grid.name,
            cells: grid.cells,
            hyperlinks,
        })
    }

    /// シート名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 読み込み元のファイル
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 値のある最終行までの行数（ヘッダー行を含む）
    pub fn row_count(&self) -> u32 {
        self.cells.len() as u32
    }

    /// ヘッダー行の列数
    pub fn header_width(&self) -> u32 {
        self.cells.first().map_or(0, |row| row.len() as u32)
    }

    /// ヘッダーが完全一致する最初の列
    pub fn find_column(&self, header: &str) -> Option<u32> {
        self.cells
            .first()?
            .iter()
            .position(|cell| matches!(cell, CellValue::String(s) if s == header))
            .map(|idx| idx as u32)
    }

    /// ヘッダー行の末尾に列を追加し、その列番号を返す
    pub fn append_column(&mut self, header: &str) -> u32 {
        let col = self.header_width();
        self.set_value(CellCoord::new(0, col), CellValue::String(header.to_string()));
        col
    }

    /// セルの値
    pub fn value(&self, coord: CellCoord) -> &CellValue {
        self.cells
            .get(coord.row as usize)
            .and_then(|row| row.get(coord.col as usize))
            .unwrap_or(&CellValue::Empty)
    }

    /// セルのハイパーリンク
    pub fn hyperlink(&self, coord: CellCoord) -> Option<&str> {
        self.hyperlinks.get(&coord).map(String::as_str)
    }

    /// セルの値とハイパーリンク
    pub fn task_cell(&self, coord: CellCoord) -> TaskLinkCell {
        TaskLinkCell {
            value: self.value(coord).clone(),
            hyperlink: self.hyperlink(coord).map(str::to_string),
        }
    }

    /// セルの値を設定する（範囲外の場合はグリッドを拡張）
    pub fn set_value(&mut self, coord: CellCoord, value: CellValue) {
        let (row, col) = (coord.row as usize, coord.col as usize);
        let width = self.header_width().max(coord.col + 1) as usize;

        if self.cells.len() <= row {
            self.cells.resize(row + 1, Vec::new());
        }
        for cells in &mut self.cells {
            if cells.len() < width {
                cells.resize(width, CellValue::Empty);
            }
        }
        self.cells[row][col] = value;
    }

    /// セルのハイパーリンクを設定または解除する
    ///
    /// `None`を渡すと既存のリンクを明示的に削除します。
    pub fn set_hyperlink(&mut self, coord: CellCoord, target: Option<String>) {
        match target {
            Some(target) if !target.is_empty() => {
                self.hyperlinks.insert(coord, target);
            }
            _ => {
                self.hyperlinks.remove(&coord);
            }
        }
    }

    /// セルの値とハイパーリンクをまとめて置き換える
    pub fn set_task_cell(&mut self, coord: CellCoord, cell: TaskLinkCell) {
        self.set_value(coord, cell.value);
        self.set_hyperlink(coord, cell.hyperlink);
    }

    /// 読み込み元のファイルへ上書き保存する
    pub fn save(&self) -> Result<()> {
        self.save_as(&self.path)
    }

    /// 指定したファイルへ保存する
    pub fn save_as(&self, path: &Path) -> Result<()> {
        save_sheet(path, &self.name, &self.cells, &self.hyperlinks)
    }
}
