use serde::{Serialize, Deserialize};
use std::fmt;
use crate::analyzer::classifier::classify;
use crate::transformer::{TransformationRecord, TransformationStatus};

/// 파일의 역할 분류 (한 번 정해지면 바뀌지 않음)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    UiComponent,
    Service,
    ModuleDescriptor,
    Template,
    DependencyManifest,
    RoutingDescriptor,
    Other,
}

impl FileType {
    pub const ALL: [FileType; 7] = [
        FileType::UiComponent,
        FileType::Service,
        FileType::ModuleDescriptor,
        FileType::Template,
        FileType::DependencyManifest,
        FileType::RoutingDescriptor,
        FileType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::UiComponent => "ui-component",
            FileType::Service => "service",
            FileType::ModuleDescriptor => "module-descriptor",
            FileType::Template => "template",
            FileType::DependencyManifest => "dependency-manifest",
            FileType::RoutingDescriptor => "routing-descriptor",
            FileType::Other => "other",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    DeprecatedApi,
    MissingModernizationMarker,
    UntypedConstruct,
    VersionIncompatibility,
    BackendIntegrationNote,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::DeprecatedApi => "deprecated-api",
            IssueKind::MissingModernizationMarker => "missing-modernization-marker",
            IssueKind::UntypedConstruct => "untyped-construct",
            IssueKind::VersionIncompatibility => "version-incompatibility",
            IssueKind::BackendIntegrationNote => "backend-integration-note",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 심각도. 선언 순서가 곧 정렬 순서이며 Error가 가장 심각하다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Suggestion,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Suggestion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    pub line_number: Option<usize>,
    pub matched_text: String,
}

/// 마이그레이션 작업의 단위가 되는 파일
///
/// 각 단계는 값을 소비하고 새 값을 돌려준다 (`with_issues`, `with_transformations`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedFile {
    pub path: String,
    #[serde(rename = "type")]
    file_type: FileType,
    pub content: String,
    pub issues: Vec<MigrationIssue>,
    pub transformations: Vec<TransformationRecord>,
}

impl AnalyzedFile {
    /// 경로와 내용으로 파일을 만들고 즉시 분류한다
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let content = content.into();
        let file_type = classify(&path, &content);
        Self::with_type(path, content, file_type)
    }

    pub fn with_type(path: impl Into<String>, content: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            file_type,
            content: content.into(),
            issues: Vec::new(),
            transformations: Vec::new(),
        }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        name.rfind('.').map(|idx| &name[idx + 1..])
    }

    pub fn with_issues(mut self, issues: Vec<MigrationIssue>) -> Self {
        self.issues.extend(issues);
        self
    }

    /// 레코드를 이어 붙이고 마지막 `after`를 현재 내용으로 삼는다
    pub fn with_transformations(mut self, records: Vec<TransformationRecord>) -> Self {
        if let Some(last) = records.last() {
            self.content = last.after.clone();
        }
        self.transformations.extend(records);
        self
    }

    /// 내용을 실제로 바꾼 레코드의 상태만 갱신한다 (NgModule 자리표시 레코드는 그대로)
    pub fn with_transformation_status(mut self, status: TransformationStatus) -> Self {
        for record in self.transformations.iter_mut().filter(|t| t.changes_content()) {
            record.status = status;
        }
        self
    }

    /// 원본 내용 (첫 변환 이전)
    pub fn original_content(&self) -> &str {
        self.transformations
            .first()
            .map(|t| t.before.as_str())
            .unwrap_or(&self.content)
    }

    pub fn is_modified(&self) -> bool {
        self.original_content() != self.content
    }

    /// 디스크에 실제로 쓴 내용이 변환 결과와 다를 때 (사용자 편집) 마지막 변경 레코드를 맞춘다
    pub fn with_written_content(mut self, content: String) -> Self {
        if let Some(idx) = self.transformations.iter().rposition(|t| t.changes_content()) {
            self.transformations[idx].after = content.clone();
            for record in &mut self.transformations[idx + 1..] {
                record.before = content.clone();
                record.after = content.clone();
            }
        }
        self.content = content;
        self
    }
}
