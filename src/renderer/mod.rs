mod markdown;
mod html;
mod console;

pub use markdown::{to_markdown, MarkdownRenderer};
pub use html::to_html;
pub use console::{print_summary, print_issue_table};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use crate::error::{MigrationError, Result};
use crate::migration::ProjectReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Yaml,
    Markdown,
    Html,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 4] = [
        ReportFormat::Json,
        ReportFormat::Yaml,
        ReportFormat::Markdown,
        ReportFormat::Html,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
        };
        f.write_str(name)
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "yaml" | "yml" => Ok(ReportFormat::Yaml),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            other => Err(format!("지원하지 않는 보고서 형식: {} (json, yaml, markdown, html)", other)),
        }
    }
}

/// 보고서를 지정한 형식의 문자열로 만든다
pub fn render(report: &ProjectReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).map_err(|e| MigrationError::Report(e.to_string()))
        }
        ReportFormat::Yaml => serde_yaml::to_string(report).map_err(|e| MigrationError::Report(e.to_string())),
        ReportFormat::Markdown => Ok(to_markdown(report)),
        ReportFormat::Html => to_html(report).map_err(|e| MigrationError::Report(format!("{e:?}"))),
    }
}

/// `<dir>/migration-report-<타임스탬프>.<확장자>`로 저장하고 경로를 돌려준다
pub fn write_report(report: &ProjectReport, format: ReportFormat, dir: &Path) -> Result<PathBuf> {
    let body = render(report, format)?;
    std::fs::create_dir_all(dir)?;

    let file_name = format!(
        "migration-report-{}.{}",
        report.metadata.generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    );
    let path = dir.join(file_name);
    std::fs::write(&path, body)?;
    tracing::info!(path = %path.display(), format = %format, "보고서 저장");
    Ok(path)
}
