//! Package Reader Module
//!
//! xlsxパッケージ内のXMLを直接読み、calamineで取得できない情報を抽出する。
//! シート名とワークシートXMLパスの対応、セルのハイパーリンク、
//! セルに適用されたセルスタイル名を提供します。

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Result, WorklogRatesError};
use crate::security::SecurityConfig;
use crate::types::{CellCoord, CellRange};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const STYLES_PART: &str = "xl/styles.xml";

/// ワークブック内のシート（表示順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetPart {
    /// シート名
    pub name: String,
    /// ワークシートXMLのパッケージ内パス（例: "xl/worksheets/sheet1.xml"）
    pub path: String,
}

/// xlsxパッケージリーダー
pub(crate) struct XlsxPackage<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> XlsxPackage<R> {
    /// パッケージを開き、セキュリティ制限を検査する
    pub fn open(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        SecurityConfig::default().check_archive(&mut archive)?;
        Ok(Self { archive })
    }

    /// シート一覧をワークブックの表示順で取得
    pub fn sheets(&mut self) -> Result<Vec<SheetPart>> {
        let workbook = self.read_part(WORKBOOK_PART)?;
        let rels = match self.read_optional_part(WORKBOOK_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        let mut sheets = Vec::new();
        for (name, rel_id) in parse_workbook_sheets(&workbook)? {
            if let Some(target) = rels.get(&rel_id) {
                sheets.push(SheetPart {
                    name,
                    path: resolve_target("xl", target),
                });
            }
        }
        Ok(sheets)
    }

    /// シートを名前で選択（`None`の場合は先頭シート）
    pub fn sheet(&mut self, name: Option<&str>) -> Result<SheetPart> {
        let sheets = self.sheets()?;
        let found = match name {
            Some(name) => sheets.into_iter().find(|s| s.name == name),
            None => sheets.into_iter().next(),
        };
        found.ok_or_else(|| {
            WorklogRatesError::SheetNotFound(name.unwrap_or("<first sheet>").to_string())
        })
    }

    /// シートの外部ハイパーリンクを取得（セル座標 → ターゲット）
    ///
    /// `location`のみの内部リンクはターゲットを持たないため含まれません。
    /// 個々の`<hyperlink>`要素が解釈できない場合、そのセルは「リンクなし」になります。
    pub fn hyperlinks(&mut self, sheet: &SheetPart) -> Result<BTreeMap<CellCoord, String>> {
        let sheet_xml = self.read_part(&sheet.path)?;
        let rels = match self.read_optional_part(&rels_path_for(&sheet.path))? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        let mut hyperlinks = BTreeMap::new();
        for node in parse_hyperlink_nodes(&sheet_xml)? {
            let Some(rel_id) = node.rel_id else {
                continue;
            };
            let Some(target) = rels.get(&rel_id) else {
                tracing::debug!(
                    reference = %node.reference,
                    rel_id = %rel_id,
                    "hyperlink relationship not found"
                );
                continue;
            };
            let Some(range) = CellRange::from_ref(&node.reference) else {
                tracing::debug!(reference = %node.reference, "unparseable hyperlink reference");
                continue;
            };
            for coord in range.cells() {
                hyperlinks.insert(coord, target.clone());
            }
        }
        Ok(hyperlinks)
    }

    /// セルに適用されている名前付きセルスタイル（例: "Hyperlink"）を取得
    ///
    /// セルが存在しない、またはスタイル情報がない場合は`None`。
    pub fn cell_style_name(&mut self, sheet: &SheetPart, coord: CellCoord) -> Result<Option<String>> {
        let sheet_xml = self.read_part(&sheet.path)?;
        let Some(style_idx) = find_cell_style_index(&sheet_xml, coord)? else {
            return Ok(None);
        };
        let Some(styles_xml) = self.read_optional_part(STYLES_PART)? else {
            return Ok(None);
        };

        let styles = parse_styles(&styles_xml)?;
        let name = styles
            .cell_xf_parents
            .get(style_idx)
            .and_then(|xf_id| styles.named_styles.get(xf_id))
            .cloned();
        Ok(name)
    }

    fn read_part(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    fn read_optional_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        if !self.archive.file_names().any(|n| n == name) {
            return Ok(None);
        }
        self.read_part(name).map(Some)
    }
}

/// `<hyperlink>`要素の内容
#[derive(Debug)]
struct HyperlinkNode {
    reference: String,
    rel_id: Option<String>,
}

/// styles.xmlから抽出したスタイル対応表
#[derive(Debug, Default)]
struct StyleTable {
    /// cellXfsのインデックス → 親のcellStyleXfsインデックス（xfId）
    cell_xf_parents: Vec<u32>,
    /// cellStyleXfsのインデックス → セルスタイル名
    named_styles: HashMap<u32, String>,
}

/// ワークシートパスに対応するリレーションシップパス
///
/// "xl/worksheets/sheet1.xml" -> "xl/worksheets/_rels/sheet1.xml.rels"
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// リレーションシップのターゲットをパッケージ内パスに解決
///
/// 絶対パス（"/xl/worksheets/sheet1.xml"）と、基準フォルダからの
/// 相対パス（"worksheets/sheet1.xml"、"../x.xml"）に対応します。
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn xml_reader(xml: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);
    reader
}

/// 属性値を取得（名前空間プレフィックスの有無を指定）
fn attribute(e: &BytesStart<'_>, local: &[u8], prefixed: bool) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| WorklogRatesError::Xml(format!("XML attribute error: {}", e)))?;
        if attr.key.local_name().as_ref() == local && attr.key.prefix().is_some() == prefixed {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw)
                .map_err(|e| WorklogRatesError::Xml(format!("XML unescape error: {}", e)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// リレーションシップファイルを解析（Id → Target）
fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) =
                    (attribute(&e, b"Id", false)?, attribute(&e, b"Target", false)?)
                {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// workbook.xmlからシート名とリレーションシップIDを表示順に取得
fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<(String, String)>> {
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(rel_id)) =
                    (attribute(&e, b"name", false)?, attribute(&e, b"id", true)?)
                {
                    sheets.push((name, rel_id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// ワークシートXMLから`<hyperlinks>`内の`<hyperlink>`要素を取得
fn parse_hyperlink_nodes(xml: &[u8]) -> Result<Vec<HyperlinkNode>> {
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();
    let mut nodes = Vec::new();
    let mut in_hyperlinks = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"hyperlinks" => in_hyperlinks = true,
            Event::End(e) if e.local_name().as_ref() == b"hyperlinks" => in_hyperlinks = false,
            Event::Start(e) | Event::Empty(e)
                if in_hyperlinks && e.local_name().as_ref() == b"hyperlink" =>
            {
                // 属性が壊れている要素はそのセルだけ「リンクなし」
                let reference = attribute(&e, b"ref", false);
                let rel_id = attribute(&e, b"id", true);
                match (reference, rel_id) {
                    (Ok(Some(reference)), Ok(rel_id)) => {
                        nodes.push(HyperlinkNode { reference, rel_id })
                    }
                    (Ok(None), _) => {}
                    (Err(err), _) | (_, Err(err)) => {
                        tracing::debug!(error = %err, "skipping unreadable hyperlink element");
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(nodes)
}

/// ワークシートXMLから指定セルの`s`属性（cellXfsインデックス）を取得
fn find_cell_style_index(xml: &[u8], coord: CellCoord) -> Result<Option<usize>> {
    let target = coord.to_a1_notation();
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                if attribute(&e, b"r", false)?.as_deref() == Some(target.as_str()) {
                    let style = attribute(&e, b"s", false)?
                        .map(|s| s.parse::<usize>())
                        .transpose()
                        .map_err(|e| WorklogRatesError::Xml(format!("Invalid style index: {}", e)))?;
                    return Ok(Some(style.unwrap_or(0)));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(None)
}

/// styles.xmlを解析し、cellXfs → cellStyleXfs → cellStyle名の対応を取得
fn parse_styles(xml: &[u8]) -> Result<StyleTable> {
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();
    let mut styles = StyleTable::default();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = true,
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Event::Start(e) | Event::Empty(e) if in_cell_xfs && e.local_name().as_ref() == b"xf" => {
                let parent = attribute(&e, b"xfId", false)?
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(0);
                styles.cell_xf_parents.push(parent);
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cellStyle" => {
                let name = attribute(&e, b"name", false)?;
                let xf_id = attribute(&e, b"xfId", false)?.and_then(|v| v.parse::<u32>().ok());
                if let (Some(name), Some(xf_id)) = (name, xf_id) {
                    styles.named_styles.insert(xf_id, name);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}
