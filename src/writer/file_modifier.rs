use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Editor, Select};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use super::{ChangeWriter, FileChange, WriteOutcome};

/// diff를 보여주고 확인을 받은 뒤 파일을 쓴다
pub struct FileModifier {
    auto_confirm: bool,
    show_diff: bool,
    cancelled: AtomicBool,
}

#[derive(Debug, Clone, Copy)]
enum UserChoice {
    Apply,
    Skip,
    Edit,
    Cancel,
}

impl FileModifier {
    pub fn new(auto_confirm: bool) -> Self {
        Self {
            auto_confirm,
            show_diff: true,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn with_diff(mut self, show_diff: bool) -> Self {
        self.show_diff = show_diff;
        self
    }

    fn print_diff(&self, original: &str, new: &str) {
        let diff = TextDiff::from_lines(original, new);

        println!("\n{}", "변경사항:".yellow().bold());
        for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
            if idx > 0 {
                println!("{}", "...".dimmed());
            }
            for op in group {
                for change in diff.iter_changes(op) {
                    let line = change.to_string_lossy();
                    let formatted = match change.tag() {
                        ChangeTag::Delete => format!("- {}", line).red(),
                        ChangeTag::Insert => format!("+ {}", line).green(),
                        ChangeTag::Equal => format!("  {}", line).dimmed(),
                    };
                    print!("{}", formatted);
                    if change.missing_newline() {
                        println!();
                    }
                }
            }
        }
        println!();
    }

    fn ask_user_choice(&self, path: &str) -> Result<UserChoice> {
        let options = [
            "적용 (Apply)",
            "건너뛰기 (Skip)",
            "수정 후 적용 (Edit)",
            "나머지 모두 취소 (Cancel all)",
        ];

        let selection = Select::new()
            .with_prompt(format!("'{}' 변경을 어떻게 처리하시겠습니까?", path))
            .items(&options)
            .default(0)
            .interact()?;

        Ok(match selection {
            0 => UserChoice::Apply,
            1 => UserChoice::Skip,
            2 => UserChoice::Edit,
            _ => UserChoice::Cancel,
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content).with_context(|| format!("파일 쓰기 실패: {}", path.display()))?;
        Ok(())
    }
}

/// 사용자가 고른 처리 방식
#[derive(Debug, Clone, PartialEq, Eq)]
enum Confirmation {
    Accept,
    Edited(String),
    Reject,
}

impl FileModifier {
    /// diff를 보여주고 쓸지 묻는다. 전체 취소 뒤에는 묻지 않고 거절한다.
    fn confirm(&self, change: &FileChange) -> Result<Confirmation> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Ok(Confirmation::Reject);
        }

        if self.show_diff {
            println!("\n{}", change.relative_path.bright_blue().bold());
            println!("{}", format!("설명: {}", change.description).dimmed());
            self.print_diff(&change.original_content, &change.new_content);
        }

        if self.auto_confirm {
            return Ok(Confirmation::Accept);
        }

        Ok(match self.ask_user_choice(&change.relative_path)? {
            UserChoice::Apply => Confirmation::Accept,
            UserChoice::Skip => {
                println!("{}", "건너뛰었습니다.".yellow());
                Confirmation::Reject
            }
            UserChoice::Edit => match Editor::new().edit(&change.new_content)? {
                Some(edited) if edited == change.new_content => Confirmation::Accept,
                Some(edited) => Confirmation::Edited(edited),
                None => {
                    println!("{}", "편집이 저장되지 않아 건너뜁니다.".yellow());
                    Confirmation::Reject
                }
            },
            UserChoice::Cancel => {
                println!("{}", "남은 변경을 모두 취소했습니다.".red());
                self.cancelled.store(true, Ordering::SeqCst);
                Confirmation::Reject
            }
        })
    }

    fn commit(&self, change: &FileChange, confirmation: Confirmation) -> Result<WriteOutcome> {
        let outcome = match confirmation {
            Confirmation::Reject => return Ok(WriteOutcome::Skipped),
            Confirmation::Accept => {
                self.write_file(&change.path, &change.new_content)?;
                WriteOutcome::Written
            }
            Confirmation::Edited(content) => {
                self.write_file(&change.path, &content)?;
                WriteOutcome::Edited(content)
            }
        };
        if self.show_diff {
            println!("{}", format!("✓ {} 수정 완료", change.relative_path).green());
        }
        Ok(outcome)
    }
}

impl ChangeWriter for FileModifier {
    fn write(&self, change: &FileChange) -> Result<WriteOutcome> {
        let confirmation = self.confirm(change)?;
        self.commit(change, confirmation)
    }
}

/// 쓰기 전에 원본을 `<backup_dir>/<타임스탬프>/<상대 경로>`로 복사한다
pub struct SafeFileModifier {
    modifier: FileModifier,
    backup_root: PathBuf,
}

impl SafeFileModifier {
    pub fn new(modifier: FileModifier, backup_dir: impl AsRef<Path>) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self {
            modifier,
            backup_root: backup_dir.as_ref().join(timestamp),
        }
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    fn backup(&self, change: &FileChange) -> Result<()> {
        if !change.path.exists() {
            return Ok(());
        }
        let target = self.backup_root.join(&change.relative_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&change.path, &target)
            .with_context(|| format!("백업 실패: {}", change.path.display()))?;
        tracing::debug!(backup = %target.display(), "원본 백업");
        Ok(())
    }
}

impl ChangeWriter for SafeFileModifier {
    /// 확인을 받은 변경만 백업한 뒤 쓴다
    fn write(&self, change: &FileChange) -> Result<WriteOutcome> {
        let confirmation = self.modifier.confirm(change)?;
        if confirmation != Confirmation::Reject {
            self.backup(change)?;
        }
        self.modifier.commit(change, confirmation)
    }
}
