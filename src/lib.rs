//! worklog-rates - Attach hourly rates and costs to an Excel worklog
//!
//! This crate reads the latest worklog and resource-plan workbooks, resolves one
//! hourly rate per employee from the resource plan, joins it onto the worklog,
//! computes the actual cost per row, and writes the result as a new workbook.
//! The task-reference column (text plus hyperlink) is then copied from the
//! original worklog into the written file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use worklog_rates::MergeConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Latest files from the default "WL" and resource-plan folders
//!     let report = worklog_rates::run(&MergeConfig::default(), None, None)?;
//!
//!     for conflict in &report.conflicts {
//!         println!("{}: {} rates", conflict.employee, conflict.distinct_rates);
//!     }
//!     println!("{}", report.output_path.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::path::Path;
//! use worklog_rates::MergeConfigBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MergeConfigBuilder::new()
//!         .with_resource_plan_dir("/data/plan")
//!         .with_hours_column("Hours")
//!         .with_extensions(["xlsx"])
//!         .build()?;
//!
//!     // Explicit files override directory discovery
//!     let report = worklog_rates::run(&config, Some(Path::new("/data/wl.xlsx")), None)?;
//!     println!("{} rows", report.rows);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Individual Steps
//!
//! ```rust
//! use worklog_rates::{merge_worklog, resolve_rates, CellValue, MergeConfig, Table};
//!
//! # fn main() -> Result<(), worklog_rates::WorklogRatesError> {
//! let plan = Table::new(
//!     vec!["Сотрудник".into(), "Ставка".into()],
//!     vec![vec![CellValue::String("A".into()), CellValue::String("1 500,00".into())]],
//! );
//! let worklog = Table::new(
//!     vec!["Сотрудник".into(), "Часы факт".into()],
//!     vec![vec![CellValue::String("A".into()), CellValue::Number(2.0)]],
//! );
//!
//! let rates = resolve_rates(&plan, "Сотрудник", "Ставка")?;
//! let merged = merge_worklog(&worklog, &rates, &MergeConfig::default())?;
//! assert_eq!(merged.table.rows[0][3], CellValue::Number(3000.0));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod links;
mod locator;
mod merge;
mod numeric;
mod output;
mod parser;
mod pipeline;
mod rates;
mod security;
mod sheet;
mod types;

// 公開API
pub use config::{MergeConfig, MergeConfigBuilder};
pub use error::{Result, WorklogRatesError};
pub use links::{copy_task_links, LinkCopyReport};
pub use locator::latest_file;
pub use merge::{merge_worklog, MergedTable};
pub use numeric::{parse_localized, to_number};
pub use output::write_table;
pub use parser::{cell_style_name, read_hyperlinks};
pub use pipeline::{locate_inputs, output_path_for, run, InputFiles, RunReport};
pub use rates::{resolve_rates, RateConflict, RateTable, ResolvedRate};
pub use sheet::SheetDocument;
pub use types::{CellCoord, CellRange, CellValue, Table, TaskLinkCell};
