//! Relationship Patch Module
//!
//! rust_xlsxwriterはURLを検証・エンコードしてから書き込むため、相対パスや
//! 未知のスキーム、空白を含むターゲットをそのまま保存できない。
//! 書き込み時は仮のURLを使い、保存後にワークシートのリレーションシップ
//! パートの`Target`を元のターゲットに置き換える。

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use quick_xml::escape::escape;
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

use crate::error::{Result, WorklogRatesError};

const PLACEHOLDER_BASE: &str = "https://worklog-rates.invalid/link/";
const SHEET_RELS_PREFIX: &str = "xl/worksheets/_rels/";

/// 仮のURLと元のターゲットの対応
#[derive(Debug, Default)]
pub(super) struct LinkTargets {
    targets: BTreeMap<String, String>,
}

impl LinkTargets {
    /// ターゲットを登録し、書き込みに使う仮のURLを返す
    pub fn register(&mut self, target: &str) -> String {
        let placeholder = format!("{}{}", PLACEHOLDER_BASE, self.targets.len());
        self.targets.insert(placeholder.clone(), target.to_string());
        placeholder
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 保存済みパッケージの仮のURLを元のターゲットに置き換える
    ///
    /// 登録したすべての仮のURLが置き換えられなかった場合はエラー。
    pub fn restore(&self, package: Vec<u8>) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Ok(package);
        }

        let mut archive = ZipArchive::new(Cursor::new(package))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut restored = 0;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if !(file.name().starts_with(SHEET_RELS_PREFIX) && file.name().ends_with(".rels")) {
                writer.raw_copy_file(file)?;
                continue;
            }

            let name = file.name().to_string();
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;

            for (placeholder, target) in &self.targets {
                let from = format!("Target=\"{}\"", placeholder);
                if xml.contains(&from) {
                    xml = xml.replace(&from, &format!("Target=\"{}\"", escape(target.as_str())));
                    restored += 1;
                }
            }

            writer.start_file(name, options)?;
            writer.write_all(xml.as_bytes())?;
        }

        if restored != self.targets.len() {
            return Err(WorklogRatesError::Xml(format!(
                "Restored {} of {} hyperlink targets in the written package",
                restored,
                self.targets.len()
            )));
        }

        Ok(writer.finish()?.into_inner())
    }
}
