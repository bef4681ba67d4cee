use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use crate::config::types::Config;

/// 프로젝트 루트에 두는 설정 파일 이름
pub const PROJECT_CONFIG_FILE: &str = "ng-migrator.toml";

/// 전역 설정 위에 프로젝트 설정을 덮어써서 읽는다
pub fn load_config(project: Option<&Path>) -> Result<Config> {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    if let Ok(global_path) = get_config_path() {
        if global_path.exists() {
            tracing::debug!(path = %global_path.display(), "전역 설정 파일 로드");
            merge_tables(&mut merged, read_toml(&global_path)?);
        }
    }

    if let Some(project) = project {
        let local_path = project.join(PROJECT_CONFIG_FILE);
        if local_path.exists() {
            tracing::debug!(path = %local_path.display(), "프로젝트 설정 파일 로드");
            merge_tables(&mut merged, read_toml(&local_path)?);
        }
    }

    merged.try_into::<Config>().context("설정 파일 파싱 실패")
}

pub fn save_config(config: &Config) -> Result<PathBuf> {
    let config_path = get_config_path()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .context("설정 디렉토리 생성 실패")?;
    }

    let content = toml::to_string_pretty(config)
        .context("설정 직렬화 실패")?;

    fs::write(&config_path, content)
        .context("설정 파일 저장 실패")?;

    Ok(config_path)
}

pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("설정 디렉토리를 찾을 수 없습니다")?;

    Ok(config_dir.join("ng-migrator").join("config.toml"))
}

fn read_toml(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("설정 파일 읽기 실패: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("설정 파일 파싱 실패: {}", path.display()))
}

/// 테이블은 재귀적으로 합치고 나머지 값은 덮어쓴다
fn merge_tables(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_tables(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
