use anyhow::{bail, Result};
use colored::*;
use prettytable::{row, Table};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;
use crate::analyzer::discovery::IGNORED_DIRS;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::migration::{MigrationMode, ReportSummary};
use super::migrate::{build_options, deliver_report, execute, report_format};

/// 배치 실행 결과 한 줄
#[derive(Debug)]
pub struct BatchEntry {
    pub project: PathBuf,
    pub outcome: std::result::Result<ReportSummary, String>,
    pub report_path: Option<PathBuf>,
}

/// `root`와 그 바로 아래 디렉토리 중 package.json이 있는 곳을 프로젝트로 본다
pub fn find_projects(root: &Path) -> Result<Vec<PathBuf>> {
    let mut projects = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !IGNORED_DIRS.iter().any(|d| e.file_name() == *d)
        });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == "package.json" {
            if let Some(parent) = entry.path().parent() {
                projects.push(parent.to_path_buf());
            }
        }
    }
    Ok(projects)
}

/// 프로젝트를 하나씩 차례로 실행한다. 한 프로젝트의 실패가 나머지를 멈추지 않는다.
pub async fn run_batch(
    projects: &[PathBuf],
    args: &RunArgs,
    default_mode: MigrationMode,
    config: &Config,
) -> Result<Vec<BatchEntry>> {
    let options = build_options(args, default_mode)?;
    let format = report_format(args, config)?;
    let delay = Duration::from_millis(config.engine.batch_delay_ms);
    let mut entries = Vec::with_capacity(projects.len());

    for (index, project) in projects.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        println!(
            "\n{} [{}/{}] {}",
            "▶".bright_yellow(),
            index + 1,
            projects.len(),
            project.display().to_string().bright_blue()
        );

        let entry = match execute(project, options.clone(), args, config).await {
            Ok(report) => {
                let report_path = match deliver_report(&report, &options, format, project, config) {
                    Ok(path) => path,
                    Err(e) => {
                        tracing::warn!(project = %project.display(), error = %e, "보고서 저장 실패");
                        None
                    }
                };
                BatchEntry {
                    project: project.clone(),
                    outcome: Ok(report.summary),
                    report_path,
                }
            }
            Err(e) => {
                tracing::warn!(project = %project.display(), error = %e, "프로젝트 처리 실패");
                BatchEntry {
                    project: project.clone(),
                    outcome: Err(format!("{e:#}")),
                    report_path: None,
                }
            }
        };
        entries.push(entry);
    }

    Ok(entries)
}

fn print_batch_table(entries: &[BatchEntry]) {
    let mut table = Table::new();
    table.add_row(row![bFc => "프로젝트", "파일", "이슈", "변환", "상태"]);
    for entry in entries {
        let project = entry.project.display().to_string();
        match &entry.outcome {
            Ok(summary) => {
                table.add_row(row![
                    project,
                    summary.total_files,
                    summary.total_issues,
                    summary.total_transformations(),
                    "완료".green()
                ]);
            }
            Err(reason) => {
                table.add_row(row![project, "-", "-", "-", reason.red()]);
            }
        }
    }
    table.printstd();
}

/// `ngm batch`
pub async fn handle_batch(projects: Vec<PathBuf>, root: &Path, args: &RunArgs, config: &Config) -> Result<()> {
    let projects = if projects.is_empty() { find_projects(root)? } else { projects };
    if projects.is_empty() {
        bail!("package.json이 있는 프로젝트를 찾지 못했습니다: {}", root.display());
    }

    println!(
        "{} {}개 프로젝트",
        "📦 배치 마이그레이션:".bright_cyan().bold(),
        projects.len()
    );

    let entries = run_batch(&projects, args, MigrationMode::Migrate, config).await?;

    println!("\n{}", "📊 배치 결과".bright_cyan().bold());
    print_batch_table(&entries);
    for path in entries.iter().filter_map(|e| e.report_path.as_ref()) {
        println!("{} {}", "📄 보고서:".green(), path.display());
    }

    let failed = entries.iter().filter(|e| e.outcome.is_err()).count();
    if failed > 0 {
        bail!("{}개 프로젝트 중 {}개가 실패했습니다", entries.len(), failed);
    }
    Ok(())
}
