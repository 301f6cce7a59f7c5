use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unicode_width::UnicodeWidthStr;
use worklog_rates::{locate_inputs, MergeConfig, MergeConfigBuilder, RateConflict, Result};

#[derive(Parser)]
#[command(name = "worklog-rates")]
#[command(about = "ワークログに要員計画の単価とコストを付与する", long_about = None)]
struct Cli {
    /// JSON設定ファイル
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ワークログのフォルダ
    #[arg(long)]
    worklog_dir: Option<PathBuf>,

    /// 要員計画のフォルダ
    #[arg(long)]
    resource_plan_dir: Option<PathBuf>,

    /// ワークログファイル（フォルダ探索より優先）
    #[arg(long)]
    worklog: Option<PathBuf>,

    /// 要員計画ファイル（フォルダ探索より優先）
    #[arg(long)]
    resource_plan: Option<PathBuf>,

    /// 出力シート名
    #[arg(long)]
    sheet_name: Option<String>,

    /// 詳細ログを出力
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[x] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let inputs = locate_inputs(&config, cli.worklog.as_deref(), cli.resource_plan.as_deref())?;
    println!("[i] WL: {}", inputs.worklog.display());
    println!("[i] RP: {}", inputs.resource_plan.display());

    let report = worklog_rates::run(&config, Some(&inputs.worklog), Some(&inputs.resource_plan))?;

    if !report.conflicts.is_empty() {
        println!("[!] Конфликты ставок: {}", report.conflicts.len());
        print_conflicts(&report.conflicts);
    }

    println!("[✓] Готово: {}", report.output_path.display());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<MergeConfig> {
    let base = match &cli.config {
        Some(path) => MergeConfig::from_json_file(path)?,
        None => MergeConfig::default(),
    };

    let mut builder = MergeConfigBuilder::from_config(base);
    if let Some(dir) = &cli.worklog_dir {
        builder = builder.with_worklog_dir(dir);
    }
    if let Some(dir) = &cli.resource_plan_dir {
        builder = builder.with_resource_plan_dir(dir);
    }
    if let Some(name) = &cli.sheet_name {
        builder = builder.with_sheet_name(name);
    }
    builder.build()
}

/// 社員名の表示幅に合わせて競合を表形式で出力する
fn print_conflicts(conflicts: &[RateConflict]) {
    const HEADER: &str = "Сотрудник";

    let width = conflicts
        .iter()
        .map(|c| c.employee.width())
        .chain(std::iter::once(HEADER.width()))
        .max()
        .unwrap_or(0);

    println!("    {}  n_rates", pad(HEADER, width));
    for conflict in conflicts {
        println!("    {}  {}", pad(&conflict.employee, width), conflict.distinct_rates);
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}
