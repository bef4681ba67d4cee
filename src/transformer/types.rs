use serde::{Serialize, Deserialize};
use std::fmt;
use crate::config::ManifestSettings;
use crate::error::TransformError;
use crate::logging::MigrationLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformationKind {
    ConvertToStandaloneEquivalent,
    ReplaceConstructorInjection,
    MigrateControlFlowDirective,
    AddGenericTypeToFormConstruct,
    UpdateImportPath,
    UpdateDependencyVersion,
    RemoveLegacyModuleWrapper,
}

impl TransformationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationKind::ConvertToStandaloneEquivalent => "convert-to-standalone-equivalent",
            TransformationKind::ReplaceConstructorInjection => "replace-constructor-injection",
            TransformationKind::MigrateControlFlowDirective => "migrate-control-flow-directive",
            TransformationKind::AddGenericTypeToFormConstruct => "add-generic-type-to-form-construct",
            TransformationKind::UpdateImportPath => "update-import-path",
            TransformationKind::UpdateDependencyVersion => "update-dependency-version",
            TransformationKind::RemoveLegacyModuleWrapper => "remove-legacy-module-wrapper",
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationStatus {
    Pending,
    Applied,
    Failed,
    Skipped,
}

impl fmt::Display for TransformationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TransformationStatus::Pending => "pending",
            TransformationStatus::Applied => "applied",
            TransformationStatus::Failed => "failed",
            TransformationStatus::Skipped => "skipped",
        };
        f.write_str(text)
    }
}

/// 규칙 하나가 만든 변경. `before`/`after`는 파일 전체 스냅샷이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationRecord {
    pub kind: TransformationKind,
    pub description: String,
    pub before: String,
    pub after: String,
    pub status: TransformationStatus,
}

impl TransformationRecord {
    pub fn pending(kind: TransformationKind, description: String, before: String, after: String) -> Self {
        Self {
            kind,
            description,
            before,
            after,
            status: TransformationStatus::Pending,
        }
    }

    pub fn changes_content(&self) -> bool {
        self.before != self.after
    }
}

/// 한 파일에 대한 변환 결과. 실패하면 그 전까지의 레코드만 남는다.
#[derive(Debug, Default)]
pub struct TransformOutcome {
    pub records: Vec<TransformationRecord>,
    pub error: Option<TransformError>,
}

/// 규칙이 성공했을 때 돌려주는 새 내용과 바뀐 지점 수
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub changes: usize,
}

impl Rewrite {
    pub fn new(content: String, changes: usize) -> Self {
        Self { content, changes }
    }
}

/// `Ok(None)`은 일치 없음 또는 이미 변환된 상태
pub type RuleResult = Result<Option<Rewrite>, TransformError>;

/// 규칙 실행에 필요한 주변 정보
pub struct RuleContext<'a> {
    pub path: &'a str,
    pub manifest: &'a ManifestSettings,
    pub logger: &'a dyn MigrationLogger,
}
