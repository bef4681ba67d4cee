mod file_modifier;

pub use file_modifier::{FileModifier, SafeFileModifier};

use anyhow::Result;
use std::path::PathBuf;

/// 디스크에 반영할 파일 하나의 변경
#[derive(Debug, Clone)]
pub struct FileChange {
    /// 실제로 쓸 경로
    pub path: PathBuf,
    /// 프로젝트 기준 상대 경로 (출력, 백업 위치 계산용)
    pub relative_path: String,
    pub original_content: String,
    pub new_content: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// 사용자가 편집한 내용을 썼다
    Edited(String),
    /// 사용자가 거절했거나 전체 취소된 경우
    Skipped,
}

/// migrate 모드에서 변환 결과를 파일에 쓰는 쪽
pub trait ChangeWriter: Send + Sync {
    fn write(&self, change: &FileChange) -> Result<WriteOutcome>;
}
