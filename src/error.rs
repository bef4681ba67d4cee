use std::path::PathBuf;
use thiserror::Error;

/// 실행 전체를 중단시키는 치명적 오류
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("프로젝트 경로를 찾을 수 없습니다: {}", path.display())]
    ProjectNotFound { path: PathBuf },

    #[error("프로젝트 경로가 디렉토리가 아닙니다: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("마이그레이션 대상 파일이 없습니다: {}", path.display())]
    NoMatchingFiles { path: PathBuf },

    #[error("지원하지 않는 모드: {0} (analyze, migrate, dry-run 중 하나)")]
    InvalidMode(String),

    #[error("include와 exclude에 같은 패턴이 있습니다: {pattern}")]
    ConflictingPatterns { pattern: String },

    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일 탐색 실패: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error("보고서 생성 실패: {0}")]
    Report(String),
}

/// 파일 단위 감지 실패. 해당 파일의 이슈 목록만 비워진다.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("{path}: 규칙 '{rule}' 실행 실패: {reason}")]
    Rule {
        path: String,
        rule: &'static str,
        reason: String,
    },
}

/// 파일 단위 변환 실패. 실패 이전에 만들어진 레코드는 유지된다.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("package.json 파싱 실패: {0}")]
    ManifestParse(#[source] serde_json::Error),

    #[error("package.json 직렬화 실패: {0}")]
    ManifestSerialize(#[source] serde_json::Error),

    #[error("{construct}의 괄호 짝이 맞지 않습니다 (offset {offset})")]
    Unbalanced { construct: &'static str, offset: usize },
}

pub type Result<T, E = MigrationError> = std::result::Result<T, E>;
