//! Security Module
//!
//! xlsxパッケージ（ZIPアーカイブ）を直接読む前に適用する制限。
//! ZIP bomb、パストラバーサルへの対策を提供します。

use crate::error::{Result, WorklogRatesError};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の合計最大サイズ（バイト）
    /// デフォルト: 1GB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824,
            max_file_count: 10_000,
            max_file_size: 104_857_600,
        }
    }
}

impl SecurityConfig {
    /// アーカイブ全体を検査する
    ///
    /// ファイル数、各エントリのパスとサイズ、展開後の合計サイズを確認します。
    pub fn check_archive<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<()> {
        if archive.len() > self.max_file_count {
            return Err(WorklogRatesError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total: u64 = 0;
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;

            validate_zip_path(file.name()).map_err(|e| {
                WorklogRatesError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            if file.size() > self.max_file_size {
                return Err(WorklogRatesError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file.name(),
                    file.size(),
                    self.max_file_size
                )));
            }

            total = total.checked_add(file.size()).ok_or_else(|| {
                WorklogRatesError::SecurityViolation(
                    "Total decompressed size calculation overflow".to_string(),
                )
            })?;
            if total > self.max_decompressed_size {
                return Err(WorklogRatesError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// アーカイブ内パスの検証
///
/// `..`、絶対パス、バックスラッシュを含むパスを拒否します。
pub(crate) fn validate_zip_path(path: &str) -> std::result::Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    let bytes = path.as_bytes();
    let drive_letter = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || drive_letter {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
