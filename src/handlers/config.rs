use anyhow::{bail, Context, Result};
use colored::*;
use std::path::{Path, PathBuf};
use crate::config::{get_config_path, Config, PROJECT_CONFIG_FILE};

#[derive(clap::Subcommand)]
pub enum ConfigAction {
    /// 설정 보기 (전역 + 프로젝트 설정을 합친 결과)
    Show {
        /// 프로젝트 루트
        #[clap(short, long, default_value = ".")]
        path: PathBuf,
    },
    /// 기본 설정 파일 만들기
    Init {
        /// 전역 설정 대신 프로젝트 루트에 ng-migrator.toml 생성
        #[clap(long)]
        project: Option<PathBuf>,
        /// 이미 있으면 덮어쓰기
        #[clap(short, long)]
        force: bool,
    },
    /// 전역 설정 초기화
    Reset,
    /// 전역 설정 파일 경로 출력
    Path,
}

/// 프로젝트 루트에 기본 설정을 쓴다
pub fn write_project_config(root: &Path, force: bool) -> Result<PathBuf> {
    let path = root.join(PROJECT_CONFIG_FILE);
    if path.exists() && !force {
        bail!("이미 설정 파일이 있습니다: {} (--force로 덮어쓰기)", path.display());
    }
    let content = toml::to_string_pretty(&Config::default()).context("설정 직렬화 실패")?;
    std::fs::write(&path, content)
        .with_context(|| format!("설정 파일 저장 실패: {}", path.display()))?;
    Ok(path)
}

pub fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { path } => {
            let config = Config::load(Some(&path))?;
            println!("{}", config.display());
        }
        ConfigAction::Init { project: Some(root), force } => {
            let path = write_project_config(&root, force)?;
            println!("{} {}", "프로젝트 설정 파일 생성:".green(), path.display());
        }
        ConfigAction::Init { project: None, force } => {
            let existing = get_config_path()?;
            if existing.exists() && !force {
                bail!("이미 설정 파일이 있습니다: {} (--force로 덮어쓰기)", existing.display());
            }
            let path = Config::default().save()?;
            println!("{} {}", "전역 설정 파일 생성:".green(), path.display());
        }
        ConfigAction::Reset => {
            Config::reset()?;
            println!("{}", "설정이 초기화되었습니다.".yellow());
        }
        ConfigAction::Path => {
            println!("{}", get_config_path()?.display());
        }
    }
    Ok(())
}
