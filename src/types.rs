//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use std::fmt;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// 日時（Excelシリアル値）
    DateTime(f64),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル（欠損値）
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 数値または欠損から値を生成
    pub fn from_number(value: Option<f64>) -> Self {
        match value {
            Some(n) => CellValue::Number(n),
            None => CellValue::Empty,
        }
    }

    /// 数値として取得（数値セル以外は`None`）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 結合キーとしての表現
    ///
    /// 空セルとエラーセルはキーを持たず、どの行とも一致しません。
    pub fn as_key(&self) -> Option<String> {
        match self {
            CellValue::Empty | CellValue::Error(_) => None,
            other => Some(other.as_raw_string()),
        }
    }

    /// 値を文字列として取得（書式適用前）
    pub fn as_raw_string(&self) -> String {
        match self {
            CellValue::Number(n) | CellValue::DateTime(n) => n.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

impl From<&calamine::Data> for CellValue {
    fn from(data: &calamine::Data) -> Self {
        use calamine::Data;

        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::String(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
            Data::Error(e) => CellValue::Error(format!("{:?}", e)),
            Data::Empty => CellValue::Empty,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_raw_string())
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        format!("{}{}", Self::col_index_to_letter(self.col), self.row + 1)
    }

    /// A1形式の文字列を座標に変換（例: "B3" -> (2, 1)）
    ///
    /// `$`による絶対参照記号は無視します。形式が不正な場合は`None`。
    pub fn from_a1_notation(a1: &str) -> Option<Self> {
        let a1 = a1.replace('$', "");
        let split = a1.find(|c: char| c.is_ascii_digit())?;
        let (col_str, row_str) = a1.split_at(split);

        if col_str.is_empty() || !col_str.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u32 = 0;
        for ch in col_str.chars() {
            let val = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            col = col.checked_mul(26)?.checked_add(val)?;
        }

        let row = row_str.parse::<u32>().ok()?.checked_sub(1)?;
        Some(Self::new(row, col - 1))
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// セル範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// `"A2"` または `"A2:C5"` 形式の参照を範囲に変換
    pub fn from_ref(reference: &str) -> Option<Self> {
        match reference.split_once(':') {
            Some((start, end)) => {
                let start = CellCoord::from_a1_notation(start)?;
                let end = CellCoord::from_a1_notation(end)?;
                Some(Self {
                    start: CellCoord::new(start.row.min(end.row), start.col.min(end.col)),
                    end: CellCoord::new(start.row.max(end.row), start.col.max(end.col)),
                })
            }
            None => {
                let coord = CellCoord::from_a1_notation(reference)?;
                Some(Self {
                    start: coord,
                    end: coord,
                })
            }
        }
    }

    /// 範囲内のすべての座標（行優先）
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellCoord::new(row, col))
        })
    }
}

/// タスク参照セル（テキスト + 任意のハイパーリンク）
///
/// 元のセルにハイパーリンクがなければ`hyperlink`は`None`で、
/// 書き込み先でも「リンクなし」として扱われます。
#[derive(Debug, Clone, PartialEq)]
pub struct TaskLinkCell {
    /// セルの値
    pub value: CellValue,
    /// ハイパーリンクのターゲット
    pub hyperlink: Option<String>,
}

impl TaskLinkCell {
    /// 空のセル（値なし、リンクなし）
    pub fn empty() -> Self {
        Self {
            value: CellValue::Empty,
            hyperlink: None,
        }
    }
}

/// ヘッダー行 + データ行からなるテーブル
///
/// 行の順序は入力ファイルの順序をそのまま保持します。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// 列名（1行目）
    pub headers: Vec<String>,
    /// データ行（各行の長さは`headers.len()`）
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 新しいテーブルを生成
    ///
    /// 各行は列数に合わせて空セルで補完、または切り詰められます。
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// 列名から列インデックスを取得（完全一致、最初に見つかった列）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 列の値を行順に取得
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// 列名で値を取得
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// データ行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// データ行がないかどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
