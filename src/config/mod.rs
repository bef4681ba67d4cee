mod types;
mod loader;
mod validators;

pub use types::*;
pub use loader::{load_config, save_config, get_config_path, PROJECT_CONFIG_FILE};
pub use validators::validate_config;

use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};

impl Config {
    /// 전역 설정과 (있다면) 프로젝트 설정을 읽어 검증한다
    pub fn load(project: Option<&Path>) -> Result<Self> {
        let config = load_config(project)?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        save_config(self)
    }

    pub fn reset() -> Result<()> {
        let config_path = get_config_path()?;
        if config_path.exists() {
            std::fs::remove_file(&config_path)?;
        }
        Ok(())
    }

    pub fn display(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "현재 설정:".bright_cyan().bold()));
        output.push_str(&format!("{}\n", "=".repeat(50).dimmed()));

        output.push_str("package.json 정책:\n");
        output.push_str(&format!("  코어 패키지: {}\n", self.manifest.core_package.yellow()));
        output.push_str(&format!("  기대 메이저 버전: {}\n", self.manifest.expected_major.yellow()));
        output.push_str("  목표 버전:\n");
        for (name, version) in &self.manifest.target_versions {
            output.push_str(&format!("    {} → {}\n", name, version.green()));
        }
        output.push_str(&format!(
            "  제거 대상: {}\n",
            self.manifest.obsolete_packages.join(", ").red()
        ));

        output.push_str("\n엔진 설정:\n");
        output.push_str(&format!("  동시 처리 수: {}\n", self.engine.concurrency.to_string().yellow()));
        output.push_str(&format!("  배치 간격: {}ms\n", self.engine.batch_delay_ms.to_string().yellow()));

        output.push_str("\n출력 설정:\n");
        output.push_str(&format!("  보고서 디렉토리: {}\n", self.output.report_dir.display()));
        output.push_str(&format!("  백업 디렉토리: {}\n", self.output.backup_dir.display()));
        output.push_str(&format!("  기본 보고서 형식: {}\n", self.output.default_format.yellow()));

        output
    }
}
