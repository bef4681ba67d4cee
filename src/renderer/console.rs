use colored::*;
use prettytable::{cell, row, Row, Table};
use crate::analyzer::Severity;
use crate::migration::ProjectReport;

fn paint_severity(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => severity.as_str().red().bold(),
        Severity::Warning => severity.as_str().yellow(),
        Severity::Info => severity.as_str().cyan(),
        Severity::Suggestion => severity.as_str().green(),
    }
}

/// 실행 결과 요약 표
pub fn print_summary(report: &ProjectReport) {
    let summary = &report.summary;

    println!("\n{}", "📊 마이그레이션 요약".bright_cyan().bold());
    println!("{}", "=".repeat(50).dimmed());

    let mut table = Table::new();
    table.add_row(row!["전체 파일", summary.total_files]);
    table.add_row(row!["변환된 파일", summary.modified_files]);
    table.add_row(row!["전체 이슈", summary.total_issues]);
    for severity in Severity::ALL {
        table.add_row(Row::new(vec![
            cell!(format!("  {}", paint_severity(severity))),
            cell!(summary.count(severity)),
        ]));
    }
    table.add_row(row!["적용된 변환", summary.applied_transformations.to_string().green()]);
    table.add_row(row!["대기 중인 변환", summary.pending_transformations]);
    table.add_row(row!["건너뛴 변환", summary.skipped_transformations.to_string().yellow()]);
    table.add_row(row!["실패한 변환", summary.failed_transformations.to_string().red()]);
    table.printstd();

    let meta = &report.metadata;
    println!(
        "{}",
        format!("모드: {} · 소요 시간: {}", meta.mode, meta.elapsed).dimmed()
    );
    if !meta.backends.is_empty() {
        println!("{} {}", "감지된 백엔드:".dimmed(), meta.backends.join(", "));
    }

    if !report.recommendations.is_empty() {
        println!("\n{}", "💡 권장 사항".bright_yellow().bold());
        for rec in &report.recommendations {
            println!("  • {}", rec);
        }
    }
}

/// 심각도 순으로 정렬한 이슈 목록 (최대 `limit`건)
pub fn print_issue_table(report: &ProjectReport, limit: usize) {
    let mut issues: Vec<_> = report
        .files_with_issues()
        .flat_map(|f| f.issues.iter().map(move |i| (f.path.as_str(), i)))
        .collect();
    if issues.is_empty() {
        println!("{}", "발견된 이슈가 없습니다.".green());
        return;
    }
    issues.sort_by_key(|(path, issue)| (issue.severity, *path, issue.line_number));

    let mut table = Table::new();
    table.add_row(Row::new(
        ["심각도", "파일", "줄", "메시지"]
            .iter()
            .map(|h| cell!(h.bright_cyan().bold()))
            .collect(),
    ));
    for (path, issue) in issues.iter().take(limit) {
        table.add_row(Row::new(vec![
            cell!(paint_severity(issue.severity)),
            cell!(path),
            cell!(issue.line_number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())),
            cell!(issue.message),
        ]));
    }
    table.printstd();

    if issues.len() > limit {
        println!("{}", format!("... 외 {}건 (전체 목록은 --report로 확인)", issues.len() - limit).dimmed());
    }
}
