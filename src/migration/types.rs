use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use crate::analyzer::{AnalyzedFile, Severity};
use crate::error::MigrationError;
use crate::transformer::TransformationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationMode {
    /// 감지만 한다
    Analyze,
    /// 변환하고 파일에 쓴다
    Migrate,
    /// 변환 결과를 보고서에만 남긴다
    DryRun,
}

impl MigrationMode {
    pub fn transforms(&self) -> bool {
        !matches!(self, MigrationMode::Analyze)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationMode::Analyze => "analyze",
            MigrationMode::Migrate => "migrate",
            MigrationMode::DryRun => "dry-run",
        }
    }
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationMode {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "analyze" => Ok(MigrationMode::Analyze),
            "migrate" => Ok(MigrationMode::Migrate),
            "dry-run" | "dryrun" | "dry_run" => Ok(MigrationMode::DryRun),
            other => Err(MigrationError::InvalidMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    pub mode: MigrationMode,
    pub exclude: Vec<String>,
    pub include: Vec<String>,
    pub generate_report: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            mode: MigrationMode::Analyze,
            exclude: Vec::new(),
            include: Vec::new(),
            generate_report: false,
        }
    }
}

impl MigrationOptions {
    pub fn new(mode: MigrationMode) -> Self {
        Self { mode, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        if let Some(pattern) = self.include.iter().find(|p| self.exclude.contains(p)) {
            return Err(MigrationError::ConflictingPatterns { pattern: pattern.clone() });
        }
        Ok(())
    }

    /// include가 비어 있으면 모두 포함, exclude는 항상 우선. 둘 다 부분 문자열 비교.
    pub fn should_transform(&self, path: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| path.contains(p.as_str()));
        let excluded = self.exclude.iter().any(|p| path.contains(p.as_str()));
        included && !excluded
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_files: usize,
    pub modified_files: usize,
    pub total_issues: usize,
    pub applied_transformations: usize,
    pub failed_transformations: usize,
    pub pending_transformations: usize,
    pub skipped_transformations: usize,
    pub issues_by_severity: BTreeMap<Severity, usize>,
}

impl ReportSummary {
    pub fn from_files(files: &[AnalyzedFile]) -> Self {
        let mut summary = ReportSummary {
            total_files: files.len(),
            issues_by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
            ..Default::default()
        };

        for file in files {
            if !file.transformations.is_empty() {
                summary.modified_files += 1;
            }
            summary.total_issues += file.issues.len();
            for issue in &file.issues {
                *summary.issues_by_severity.entry(issue.severity).or_insert(0) += 1;
            }
            for record in &file.transformations {
                match record.status {
                    TransformationStatus::Applied => summary.applied_transformations += 1,
                    TransformationStatus::Failed => summary.failed_transformations += 1,
                    TransformationStatus::Pending => summary.pending_transformations += 1,
                    TransformationStatus::Skipped => summary.skipped_transformations += 1,
                }
            }
        }

        summary
    }

    pub fn total_transformations(&self) -> usize {
        self.applied_transformations
            + self.failed_transformations
            + self.pending_transformations
            + self.skipped_transformations
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues_by_severity.get(&severity).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub project_path: String,
    pub mode: MigrationMode,
    pub generated_at: DateTime<Local>,
    pub elapsed_ms: u64,
    pub elapsed: String,
    pub backends: Vec<String>,
    pub tool_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub summary: ReportSummary,
    pub file_details: Vec<AnalyzedFile>,
    pub recommendations: Vec<String>,
    pub metadata: ReportMetadata,
}

impl ProjectReport {
    pub fn files_with_issues(&self) -> impl Iterator<Item = &AnalyzedFile> {
        self.file_details.iter().filter(|f| !f.issues.is_empty())
    }

    pub fn modified_files(&self) -> impl Iterator<Item = &AnalyzedFile> {
        self.file_details.iter().filter(|f| !f.transformations.is_empty())
    }
}
