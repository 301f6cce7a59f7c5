//! Task-Link Copier Module
//!
//! 書き出し済みの出力ファイルに、元のワークログからタスク参照列（テキスト +
//! ハイパーリンク）を行位置で再コピーするモジュール。
//!
//! 行`r`の対応は結合が行の順序と数を変えないことに依存します
//! （`merge`モジュール参照）。

use std::path::Path;

use crate::error::Result;
use crate::sheet::SheetDocument;
use crate::types::{CellCoord, TaskLinkCell};

/// タスク参照列のコピー結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCopyReport {
    /// 処理したデータ行数（ヘッダー行を除く）
    pub rows: u32,
    /// ハイパーリンク付きで書き込んだセル数
    pub linked: u32,
    /// 出力側に列を追加したかどうか
    pub column_appended: bool,
    /// 元のワークログに列が存在したかどうか
    pub source_column_found: bool,
}

/// 元のワークログから出力ファイルへタスク参照列をコピーする
///
/// # 引数
///
/// * `source` - 元のワークログ（先頭シートを読む）
/// * `destination` - 出力ファイル（上書き保存される）
/// * `sheet_name` - 出力ファイルのシート名
/// * `column` - タスク参照列のヘッダー（完全一致）
///
/// 処理する行数は両ファイルのデータ行数の小さいほうです。元のセルにリンクがない
/// 場合、出力セルに残っていた古いリンクは削除されます。
pub fn copy_task_links(
    source: &Path,
    destination: &Path,
    sheet_name: &str,
    column: &str,
) -> Result<LinkCopyReport> {
    let src = SheetDocument::open(source, None)?;
    let mut dst = SheetDocument::open(destination, Some(sheet_name))?;

    let mut report = LinkCopyReport::default();

    let src_col = src.find_column(column);
    report.source_column_found = src_col.is_some();
    if src_col.is_none() {
        tracing::warn!(
            column,
            path = %source.display(),
            "task column not found in worklog, clearing destination cells"
        );
    }

    let dst_col = match dst.find_column(column) {
        Some(col) => col,
        None => {
            report.column_appended = true;
            dst.append_column(column)
        }
    };

    let last_row = src.row_count().min(dst.row_count());
    for row in 1..last_row {
        let cell = match src_col {
            Some(col) => src.task_cell(CellCoord::new(row, col)),
            None => TaskLinkCell::empty(),
        };
        if cell.hyperlink.is_some() {
            report.linked += 1;
        }
        dst.set_task_cell(CellCoord::new(row, dst_col), cell);
        report.rows += 1;
    }

    dst.save()?;

    tracing::debug!(
        rows = report.rows,
        linked = report.linked,
        appended = report.column_appended,
        "copied task links"
    );

    Ok(report)
}
