//! File Locator Module
//!
//! フォルダ内で最も新しく更新されたスプレッドシートを探すモジュール。

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// フォルダ直下で、指定拡張子のうち更新日時が最も新しいファイルを返す
///
/// フォルダが存在しない、または該当ファイルがない場合は`None`。
/// 拡張子は大文字小文字を区別せずに比較します（先頭のドットは不要）。
/// 更新日時が同じ場合はファイル名の辞書順で後のものを選びます。
pub fn latest_file<S: AsRef<str>>(folder: &Path, extensions: &[S]) -> Option<PathBuf> {
    let entries = std::fs::read_dir(folder).ok()?;

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, extensions))
        .map(|path| {
            let modified = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|e| e.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;

    const EXTS: &[&str] = &["xlsx", "xls"];

    fn touch(path: &Path, modified: SystemTime) {
        let file = File::create(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_missing_folder() {
        assert_eq!(latest_file(Path::new("/nonexistent/folder/12345"), EXTS), None);
    }

    #[test]
    fn test_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_file(dir.path(), EXTS), None);
    }

    #[test]
    fn test_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("data.csv"), "x").unwrap();
        assert_eq!(latest_file(dir.path(), EXTS), None);
    }

    #[test]
    fn test_picks_newest_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);

        touch(&dir.path().join("b_old.xlsx"), base);
        touch(&dir.path().join("a_new.xls"), base + Duration::from_secs(600));
        touch(&dir.path().join("c_mid.XLSX"), base + Duration::from_secs(300));

        let latest = latest_file(dir.path(), EXTS).unwrap();
        assert_eq!(latest.file_name().unwrap(), "a_new.xls");
    }

    #[test]
    fn test_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("REPORT.XLSX"), SystemTime::now());
        assert!(latest_file(dir.path(), &[".xlsx"]).is_some());
    }

    #[test]
    fn test_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("archive.xlsx")).unwrap();
        assert_eq!(latest_file(dir.path(), EXTS), None);
    }
}
