//! Integration Tests for worklog-rates
//!
//! Fixture workbooks are generated with rust_xlsxwriter into temporary
//! directories, the whole run is executed, and the output is read back with
//! calamine and the crate's own package reader.

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::*;
use std::path::{Path, PathBuf};
use worklog_rates::{
    cell_style_name, copy_task_links, read_hyperlinks, run, CellCoord, CellValue, MergeConfig,
    MergeConfigBuilder, SheetDocument, WorklogRatesError,
};

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// A worklog cell: plain text, a number, or text with a hyperlink
    pub enum Cell<'a> {
        Text(&'a str),
        Num(f64),
        Link(&'a str, &'a str),
        Blank,
    }

    /// Write a single-sheet workbook; the first row is the header row
    pub fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) -> PathBuf {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Num(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Link(text, url) => {
                        worksheet.write_url(r, c, Url::new(*url).set_text(*text)).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }

        workbook.save(path).unwrap();
        path.to_path_buf()
    }

    /// Worklog with employees A, B, C and hours 10, 5, missing
    pub fn worklog(dir: &Path) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        write_workbook(
            &dir.join("worklog.xlsx"),
            &["Ссылка на задачу", "Сотрудник", "Часы факт"],
            &[
                vec![Cell::Link("TASK-1", "https://x/1"), Cell::Text("A"), Cell::Num(10.0)],
                vec![Cell::Text("TASK-2"), Cell::Text("B"), Cell::Num(5.0)],
                vec![Cell::Link("TASK-3", "https://x/3"), Cell::Text("C"), Cell::Blank],
            ],
        )
    }

    /// Resource plan with A=100 and B=200 twice (numeric and locale text)
    pub fn resource_plan(dir: &Path) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        write_workbook(
            &dir.join("plan.xlsx"),
            &["Сотрудник", "Ставка"],
            &[
                vec![Cell::Text("A"), Cell::Num(100.0)],
                vec![Cell::Text("B"), Cell::Num(200.0)],
                vec![Cell::Text("B"), Cell::Text("200,00")],
            ],
        )
    }

    pub fn config(root: &Path) -> MergeConfig {
        MergeConfigBuilder::new()
            .with_worklog_dir(root.join("WL"))
            .with_resource_plan_dir(root.join("RP"))
            .build()
            .unwrap()
    }
}

use fixtures::Cell;

fn output_range(path: &Path) -> calamine::Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["worklogs_with_rates".to_string()]);
    workbook.worksheet_range("worklogs_with_rates").unwrap()
}

fn is_blank(value: Option<&Data>) -> bool {
    matches!(value, None | Some(Data::Empty))
}

#[test]
fn test_end_to_end_costs_and_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::worklog(&dir.path().join("WL"));
    fixtures::resource_plan(&dir.path().join("RP"));

    let report = run(&fixtures::config(dir.path()), None, None).unwrap();

    assert!(report.conflicts.is_empty());
    assert_eq!(report.rows, 3);
    assert_eq!(report.unmatched_employees, vec!["C".to_string()]);
    assert_eq!(report.output_path.parent(), Some(dir.path().join("WL").as_path()));
    let file_name = report.output_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("worklogs_with_rates_"));
    assert!(file_name.ends_with(".xlsx"));

    let range = output_range(&report.output_path);
    let headers: Vec<String> = (0..5)
        .map(|c| range.get_value((0, c)).map(|d| d.to_string()).unwrap_or_default())
        .collect();
    assert_eq!(
        headers,
        vec!["Ссылка на задачу", "Сотрудник", "Часы факт", "Ставка, ₽/ч", "Стоимость факт, ₽"]
    );

    assert_eq!(range.get_value((1, 3)), Some(&Data::Float(100.0)));
    assert_eq!(range.get_value((2, 3)), Some(&Data::Float(200.0)));
    assert!(is_blank(range.get_value((3, 3))));

    assert_eq!(range.get_value((1, 4)), Some(&Data::Float(1000.0)));
    assert_eq!(range.get_value((2, 4)), Some(&Data::Float(1000.0)));
    assert!(is_blank(range.get_value((3, 4))));
}

#[test]
fn test_end_to_end_task_links() {
    let dir = tempfile::tempdir().unwrap();
    let worklog = fixtures::worklog(&dir.path().join("WL"));
    let plan = fixtures::resource_plan(&dir.path().join("RP"));

    let report = run(&MergeConfig::default(), Some(&worklog), Some(&plan)).unwrap();
    assert_eq!(report.links.rows, 3);
    assert_eq!(report.links.linked, 2);
    assert!(!report.links.column_appended);

    let links = read_hyperlinks(&report.output_path, None).unwrap();
    assert_eq!(links.get(&CellCoord::new(1, 0)).map(String::as_str), Some("https://x/1"));
    assert_eq!(links.get(&CellCoord::new(2, 0)), None);
    assert_eq!(links.get(&CellCoord::new(3, 0)).map(String::as_str), Some("https://x/3"));

    assert_eq!(
        cell_style_name(&report.output_path, None, CellCoord::new(1, 0))
            .unwrap()
            .as_deref(),
        Some("Hyperlink")
    );

    let range = output_range(&report.output_path);
    assert_eq!(range.get_value((1, 0)), Some(&Data::String("TASK-1".into())));
    assert_eq!(range.get_value((2, 0)), Some(&Data::String("TASK-2".into())));
}

#[test]
fn test_output_rows_stay_aligned_with_worklog() {
    let dir = tempfile::tempdir().unwrap();
    let urls: Vec<String> = (0..30).map(|i| format!("https://tracker/T-{}", i)).collect();
    let texts: Vec<String> = (0..30).map(|i| format!("T-{}", i)).collect();
    let employees = ["A", "Z", "B", "A", "Q"];

    let rows: Vec<Vec<Cell>> = (0..30)
        .map(|i| {
            let task = if i % 3 == 0 {
                Cell::Text(texts[i].as_str())
            } else {
                Cell::Link(texts[i].as_str(), urls[i].as_str())
            };
            vec![Cell::Text(employees[i % employees.len()]), task, Cell::Num(i as f64)]
        })
        .collect();
    let worklog = fixtures::write_workbook(
        &dir.path().join("wl.xlsx"),
        &["Сотрудник", "Ссылка на задачу", "Часы факт"],
        &rows,
    );
    let plan = fixtures::resource_plan(dir.path());

    let report = run(&MergeConfig::default(), Some(&worklog), Some(&plan)).unwrap();
    assert_eq!(report.rows, 30);

    let out = SheetDocument::open(&report.output_path, Some("worklogs_with_rates")).unwrap();
    for i in 0..30u32 {
        let row = i + 1;
        assert_eq!(
            out.value(CellCoord::new(row, 0)),
            &CellValue::String(employees[i as usize % employees.len()].into())
        );
        let cell = out.task_cell(CellCoord::new(row, 1));
        assert_eq!(cell.value, CellValue::String(texts[i as usize].clone()));
        let expected = (i % 3 != 0).then(|| urls[i as usize].clone());
        assert_eq!(cell.hyperlink, expected, "row {}", row);
    }
}

#[test]
fn test_worklog_without_task_column() {
    let dir = tempfile::tempdir().unwrap();
    let worklog = fixtures::write_workbook(
        &dir.path().join("wl.xlsx"),
        &["Сотрудник", "Часы факт"],
        &[vec![Cell::Text("A"), Cell::Num(1.5)]],
    );
    let plan = fixtures::resource_plan(dir.path());

    let report = run(&MergeConfig::default(), Some(&worklog), Some(&plan)).unwrap();
    assert!(!report.links.source_column_found);
    assert!(report.links.column_appended);

    let out = SheetDocument::open(&report.output_path, None).unwrap();
    assert_eq!(out.find_column("Ссылка на задачу"), Some(4));
    assert_eq!(out.value(CellCoord::new(1, 3)), &CellValue::Number(150.0));
}

#[test]
fn test_conflicts_reported_without_changing_output() {
    let dir = tempfile::tempdir().unwrap();
    let worklog = fixtures::write_workbook(
        &dir.path().join("wl.xlsx"),
        &["Сотрудник", "Часы факт"],
        &[vec![Cell::Text("A"), Cell::Num(2.0)]],
    );
    let plan = fixtures::write_workbook(
        &dir.path().join("plan.xlsx"),
        &["Сотрудник", "Ставка"],
        &[
            vec![Cell::Text("A"), Cell::Num(100.0)],
            vec![Cell::Text("A"), Cell::Text("1 200,5")],
            vec![Cell::Text("A"), Cell::Num(100.0)],
        ],
    );

    let report = run(&MergeConfig::default(), Some(&worklog), Some(&plan)).unwrap();
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].employee, "A");
    assert_eq!(report.conflicts[0].distinct_rates, 2);

    let range = output_range(&report.output_path);
    assert_eq!(range.get_value((1, 2)), Some(&Data::Float(100.0)));
    assert_eq!(range.get_value((1, 3)), Some(&Data::Float(200.0)));
}

#[test]
fn test_missing_input_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::resource_plan(&dir.path().join("RP"));

    match run(&fixtures::config(dir.path()), None, None) {
        Err(WorklogRatesError::NotFound { what, .. }) => assert_eq!(what, "worklog"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_empty_resource_plan_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::worklog(&dir.path().join("WL"));
    std::fs::create_dir_all(dir.path().join("RP")).unwrap();
    std::fs::write(dir.path().join("RP").join("notes.txt"), "not a workbook").unwrap();

    match run(&fixtures::config(dir.path()), None, None) {
        Err(WorklogRatesError::NotFound { what, .. }) => assert_eq!(what, "resource plan"),
        other => panic!("Expected NotFound, got {:?}", other),
    }
    // nothing is written before the inputs are found
    let entries = std::fs::read_dir(dir.path().join("WL")).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_missing_rate_column() {
    let dir = tempfile::tempdir().unwrap();
    let worklog = fixtures::worklog(dir.path());
    let plan = fixtures::write_workbook(
        &dir.path().join("plan.xlsx"),
        &["Сотрудник", "Rate"],
        &[vec![Cell::Text("A"), Cell::Num(100.0)]],
    );

    match run(&MergeConfig::default(), Some(&worklog), Some(&plan)) {
        Err(WorklogRatesError::MissingColumn { table, column }) => {
            assert_eq!(table, "resource plan");
            assert_eq!(column, "Ставка");
        }
        other => panic!("Expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_missing_worklog_employee_column() {
    let dir = tempfile::tempdir().unwrap();
    let worklog = fixtures::write_workbook(
        &dir.path().join("wl.xlsx"),
        &["Employee", "Часы факт"],
        &[vec![Cell::Text("A"), Cell::Num(1.0)]],
    );
    let plan = fixtures::resource_plan(dir.path());

    let err = run(&MergeConfig::default(), Some(&worklog), Some(&plan)).unwrap_err();
    assert!(err.to_string().contains("Сотрудник"));
    assert!(err.to_string().contains("worklog"));
}

#[test]
fn test_copy_clears_stale_destination_link() {
    let dir = tempfile::tempdir().unwrap();
    let source = fixtures::write_workbook(
        &dir.path().join("wl.xlsx"),
        &["Ссылка на задачу"],
        &[vec![Cell::Text("TASK-1")]],
    );
    let destination = fixtures::write_workbook(
        &dir.path().join("out.xlsx"),
        &["Ссылка на задачу"],
        &[vec![Cell::Link("TASK-1", "https://stale/1")]],
    );

    // fixture sheet is "Sheet1"
    copy_task_links(&source, &destination, "Sheet1", "Ссылка на задачу").unwrap();

    let links = read_hyperlinks(&destination, Some("Sheet1")).unwrap();
    assert!(links.is_empty());
    let doc = SheetDocument::open(&destination, Some("Sheet1")).unwrap();
    assert_eq!(doc.value(CellCoord::new(1, 0)), &CellValue::String("TASK-1".into()));
}
